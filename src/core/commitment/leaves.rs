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

//! Leaf enumeration.
//!
//! leaf hash = keccak256( encode(path) || value )

use crate::core::commitment::path::Path;
use crate::core::descriptor::canonical::{CanonicalTree, FieldMap, Value};
use crate::core::types::{keccak256_concat, Hash32};

/// One addressable scalar: path plus raw value bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafEntry {
    /// Field path.
    pub path: Path,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

/// Materialized leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    /// Field path.
    pub path: Path,
    /// `cbor-uint-array-v1` encoding of `path`.
    pub encoded_path: Vec<u8>,
    /// Raw value bytes.
    pub value: Vec<u8>,
    /// `keccak256(encoded_path || value)`.
    pub hash: Hash32,
}

/// Leaf hash over an already-encoded path.
pub fn hash_leaf(encoded_path: &[u8], value: &[u8]) -> Hash32 {
    keccak256_concat(encoded_path, value)
}

impl Leaf {
    /// Encode the path and hash.
    pub fn new(path: Path, value: Vec<u8>) -> Self {
        let encoded_path = path.encode();
        let hash = hash_leaf(&encoded_path, &value);
        Self {
            path,
            encoded_path,
            value,
            hash,
        }
    }
}

impl From<LeafEntry> for Leaf {
    fn from(e: LeafEntry) -> Self {
        Leaf::new(e.path, e.value)
    }
}

fn walk(map: &FieldMap, prefix: &Path, out: &mut Vec<LeafEntry>) {
    for (tag, value) in map.ascending() {
        let here = prefix.child(tag);
        match value {
            Value::Scalar(bytes) => out.push(LeafEntry {
                path: here,
                value: bytes.clone(),
            }),
            Value::Group(g) => {
                for (i, entry) in g.entries.iter().enumerate() {
                    walk(entry, &here.child(i as u64), out);
                }
            }
        }
    }
}

/// Depth-first walk emitting one entry per scalar field.
///
/// Tags are visited in ascending order at each level and group entries in stored order.
/// Recursion depth is bounded by the tree's validated nesting limit.
pub fn enumerate_leaves(tree: &CanonicalTree) -> Vec<LeafEntry> {
    let mut out = Vec::new();
    walk(tree.fields(), &Path::root(), &mut out);
    out
}
