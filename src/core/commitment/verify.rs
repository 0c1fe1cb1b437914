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

//! Off-chain reference verifier and the proof wire shape.
//!
//! ```text
//! node = keccak256(encoded_path || value)
//! for (sibling, is_right) in proof:
//!     node = is_right ? keccak256(sibling || node) : keccak256(node || sibling)
//! valid = node == root
//! ```
//!
//! `core::onchain` implements the same fold over ABI calldata; the two must agree on
//! every input.

use crate::core::commitment::leaves::hash_leaf;
use crate::core::commitment::path::{decode_path, Path, PathCodecError};
use crate::core::commitment::merkle::hash_node;
use crate::core::types::{parse_hash32, Hash32};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed proof shape. A proof that merely fails is `Ok(false)`, not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// Sibling and direction lists differ in length.
    #[error("proof length mismatch: {siblings} siblings, {directions} directions")]
    LengthMismatch {
        /// Number of sibling hashes.
        siblings: usize,
        /// Number of direction flags.
        directions: usize,
    },
}

/// Verify one field against a root.
pub fn verify_proof(
    root: &Hash32,
    encoded_path: &[u8],
    value: &[u8],
    siblings: &[Hash32],
    directions: &[bool],
) -> Result<bool, VerifyError> {
    if siblings.len() != directions.len() {
        return Err(VerifyError::LengthMismatch {
            siblings: siblings.len(),
            directions: directions.len(),
        });
    }
    let mut node = hash_leaf(encoded_path, value);
    for (sibling, is_right) in siblings.iter().zip(directions.iter()) {
        node = if *is_right {
            hash_node(sibling, &node)
        } else {
            hash_node(&node, sibling)
        };
    }
    Ok(node == *root)
}

/// Inclusion proof for one field, ordered leaf to root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldProof {
    /// Field path.
    pub path: Path,
    /// Encoded path (hash preimage prefix).
    pub encoded_path: Vec<u8>,
    /// Raw value bytes.
    pub value: Vec<u8>,
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash32>,
    /// `true` where the proven node is the right operand at that level.
    pub directions: Vec<bool>,
}

impl FieldProof {
    /// Verify against `root`.
    pub fn verify(&self, root: &Hash32) -> Result<bool, VerifyError> {
        verify_proof(
            root,
            &self.encoded_path,
            &self.value,
            &self.siblings,
            &self.directions,
        )
    }

    /// Text-friendly wire form.
    pub fn to_wire(&self) -> ProofWire {
        ProofWire {
            path: Some(self.path.0.clone()),
            encoded_path: hex::encode(&self.encoded_path),
            value: hex::encode(&self.value),
            value_text: std::str::from_utf8(&self.value).ok().map(str::to_string),
            sibling_hashes: self.siblings.iter().map(hex::encode).collect(),
            directions: self.directions.clone(),
        }
    }

    /// Parse a wire proof. `encoded_path` is authoritative; a `path` hint must agree with it.
    pub fn from_wire(w: &ProofWire) -> Result<Self, ProofWireError> {
        let encoded_path = decode_hex(&w.encoded_path).ok_or(ProofWireError::Hex("encoded_path"))?;
        let value = decode_hex(&w.value).ok_or(ProofWireError::Hex("value"))?;
        let path = decode_path(&encoded_path)?;
        if let Some(hint) = &w.path {
            if hint != &path.0 {
                return Err(ProofWireError::PathMismatch);
            }
        }
        let siblings = w
            .sibling_hashes
            .iter()
            .map(|s| parse_hash32(s).ok_or(ProofWireError::Hex("sibling_hashes")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            path,
            encoded_path,
            value,
            siblings,
            directions: w.directions.clone(),
        })
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let s = s.trim();
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()
}

/// Wire shape `{ encodedPath, value, siblingHashes, directions }`, hex-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofWire {
    /// Decoded path (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<u64>>,
    /// Encoded path, hex.
    pub encoded_path: String,
    /// Value bytes, hex.
    pub value: String,
    /// Value as text when it is valid UTF-8 (informational, ignored on input).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,
    /// Sibling hashes, hex, leaf level first.
    pub sibling_hashes: Vec<String>,
    /// Direction flags.
    pub directions: Vec<bool>,
}

/// Errors turning a wire proof into a [`FieldProof`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofWireError {
    /// A hex field is malformed.
    #[error("bad hex in {0}")]
    Hex(&'static str),
    /// Encoded path is not canonical.
    #[error("encoded path: {0}")]
    Path(#[from] PathCodecError),
    /// `path` hint disagrees with `encoded_path`.
    #[error("path does not match encoded_path")]
    PathMismatch,
}
