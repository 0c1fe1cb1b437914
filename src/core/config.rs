// Copyright (c) 2026 Fixmerkle
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Configuration (TOML).
//!
//! ```text
//! [limits]
//! max_group_depth = 8
//! max_leaves = 65536
//! max_payload_bytes = 4194304
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every field is optional; missing fields take the defaults above.

use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Default maximum group nesting depth.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 8;
/// Default maximum number of leaves per descriptor.
pub const DEFAULT_MAX_LEAVES: usize = 65_536;
/// Default cap on decoded payload / leaf-set blobs (4 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cannot read config file.
    #[error("read config {path}: {source}")]
    Read {
        /// File that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Cannot parse TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// A limit is zero.
    #[error("invalid limit: {0} must be non-zero")]
    ZeroLimit(&'static str),
}

/// Configuration root.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixMerkleConfig {
    /// Resource limits applied to every pipeline invocation.
    pub limits: Limits,
    /// Logging settings (binary only).
    pub logging: LoggingConfig,
}

/// Resource limits guarding against adversarial input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum number of nested group levels (a top-level group is depth 1).
    pub max_group_depth: usize,
    /// Maximum number of leaves in one descriptor.
    pub max_leaves: usize,
    /// Maximum size of an encoded payload or leaf set accepted by decoders.
    pub max_payload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            max_leaves: DEFAULT_MAX_LEAVES,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl FixMerkleConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a file path.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_group_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_group_depth"));
        }
        if self.limits.max_leaves == 0 {
            return Err(ConfigError::ZeroLimit("max_leaves"));
        }
        if self.limits.max_payload_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_payload_bytes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = FixMerkleConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.limits, Limits::default());
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.json);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = FixMerkleConfig::from_toml_str(
            "[limits]\nmax_group_depth = 2\n\n[logging]\njson = true\n",
        )
        .unwrap();
        assert_eq!(cfg.limits.max_group_depth, 2);
        assert_eq!(cfg.limits.max_leaves, DEFAULT_MAX_LEAVES);
        assert!(cfg.logging.json);
    }

    #[test]
    fn zero_limits_and_unknown_keys_are_rejected() {
        assert!(matches!(
            FixMerkleConfig::from_toml_str("[limits]\nmax_leaves = 0\n"),
            Err(ConfigError::ZeroLimit("max_leaves"))
        ));
        assert!(matches!(
            FixMerkleConfig::from_toml_str("[limits]\nmax_depth = 3\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_keeps_io_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match FixMerkleConfig::load(path.to_str().unwrap()) {
            Err(ConfigError::Read { path: p, source }) => {
                assert!(p.ends_with("absent.toml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
