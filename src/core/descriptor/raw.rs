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
#![warn(missing_docs)]

//! Untyped descriptor input, as handed over by an upstream FIX parser.
//!
//! Keys are kept as the strings the parser produced and maps are ordered pair lists,
//! so duplicates survive until [`CanonicalTree::build`](super::canonical::CanonicalTree::build)
//! rejects them.
//!
//! ## TOML form
//! ```text
//! 15 = "USD"
//! 223 = "4.250"
//!
//! [454]
//! tag = 454
//! [[454.entries]]
//! 455 = "A"
//! 456 = "1"
//! ```
//! A table with an `entries` array of tables is a group; `tag` is optional.

use thiserror::Error;

/// Raw map: ordered `(key, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMap(pub Vec<(String, RawValue)>);

/// Raw group node.
#[derive(Clone, Debug, PartialEq)]
pub struct RawGroup {
    /// Declared group tag, if the producer supplied one.
    pub tag: Option<i64>,
    /// Entries in document order.
    pub entries: Vec<RawMap>,
}

/// Raw value. Only `Text` and `Group` survive canonicalization.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// Scalar field text.
    Text(String),
    /// Repeating group.
    Group(RawGroup),
    /// Bare integer.
    Integer(i64),
    /// Bare float.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Array that is not a group entry list.
    List(Vec<RawValue>),
    /// Table that is not a well-formed group.
    Map(RawMap),
    /// Anything else the producer could not express (e.g. datetimes).
    Other,
}

impl RawValue {
    /// Short kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Text(_) => "string",
            RawValue::Group(_) => "group",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Boolean(_) => "boolean",
            RawValue::List(_) => "array",
            RawValue::Map(_) => "table",
            RawValue::Other => "unsupported value",
        }
    }
}

/// Input parsing errors (document syntax only; structure is checked later).
#[derive(Debug, Error)]
pub enum RawError {
    #[error("parse descriptor: {0}")]
    Parse(String),
}

impl RawMap {
    /// Empty map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style insert (does not deduplicate).
    pub fn with(mut self, key: impl Into<String>, value: RawValue) -> Self {
        self.0.push((key.into(), value));
        self
    }

    /// Parse a descriptor document in TOML form.
    pub fn from_toml_str(raw: &str) -> Result<Self, RawError> {
        let table: toml::Table = raw.parse().map_err(|e: toml::de::Error| RawError::Parse(e.to_string()))?;
        Ok(Self::from(table))
    }
}

impl RawGroup {
    /// Group with a declared tag.
    pub fn new(tag: i64, entries: Vec<RawMap>) -> Self {
        Self {
            tag: Some(tag),
            entries,
        }
    }
}

/// Shorthand for a scalar.
pub fn text(s: impl Into<String>) -> RawValue {
    RawValue::Text(s.into())
}

fn group_from_table(t: &toml::Table) -> Option<RawGroup> {
    let entries = t.get("entries")?.as_array()?;
    let tag = match t.get("tag") {
        None => None,
        Some(toml::Value::Integer(i)) => Some(*i),
        Some(_) => return None,
    };
    if t.keys().any(|k| k != "entries" && k != "tag") {
        return None;
    }
    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        out.push(RawMap::from(e.as_table()?.clone()));
    }
    Some(RawGroup { tag, entries: out })
}

impl From<toml::Value> for RawValue {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => RawValue::Text(s),
            toml::Value::Integer(i) => RawValue::Integer(i),
            toml::Value::Float(f) => RawValue::Float(f),
            toml::Value::Boolean(b) => RawValue::Boolean(b),
            toml::Value::Datetime(_) => RawValue::Other,
            toml::Value::Array(a) => RawValue::List(a.into_iter().map(RawValue::from).collect()),
            toml::Value::Table(t) => match group_from_table(&t) {
                Some(g) => RawValue::Group(g),
                None => RawValue::Map(RawMap::from(t)),
            },
        }
    }
}

impl From<toml::Table> for RawMap {
    fn from(t: toml::Table) -> Self {
        RawMap(t.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_groups_and_scalars() {
        let raw = RawMap::from_toml_str(
            r#"
15 = "USD"

[454]
tag = 454
[[454.entries]]
455 = "A"
[[454.entries]]
455 = "B"
"#,
        )
        .unwrap();
        let mut kinds: Vec<(String, &'static str)> =
            raw.0.iter().map(|(k, v)| (k.clone(), v.kind())).collect();
        kinds.sort();
        assert_eq!(
            kinds,
            vec![("15".to_string(), "string"), ("454".to_string(), "group")]
        );
        let g = raw.0.iter().find(|(k, _)| k == "454").unwrap();
        match &g.1 {
            RawValue::Group(g) => {
                assert_eq!(g.tag, Some(454));
                assert_eq!(g.entries.len(), 2);
                assert_eq!(g.entries[0].0[0], ("455".to_string(), text("A")));
                assert_eq!(g.entries[1].0[0], ("455".to_string(), text("B")));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn malformed_group_tables_stay_maps() {
        let raw = RawMap::from_toml_str("[454]\ntag = \"x\"\nentries = []\n").unwrap();
        assert_eq!(raw.0[0].1.kind(), "table");
        let raw = RawMap::from_toml_str("[454]\nentries = [1, 2]\n").unwrap();
        assert_eq!(raw.0[0].1.kind(), "table");
        let raw = RawMap::from_toml_str("[454]\nentries = []\nextra = 1\n").unwrap();
        assert_eq!(raw.0[0].1.kind(), "table");
    }

    #[test]
    fn syntax_errors_surface() {
        assert!(matches!(RawMap::from_toml_str("15 = "), Err(RawError::Parse(_))));
    }
}
