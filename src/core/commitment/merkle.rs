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

//! Deterministic Merkle tree over descriptor leaves.
//!
//! leaf = keccak256( encode(path) || value )
//! node = keccak256( left || right )
//!
//! Leaves are ordered by encoded path bytes. An unpaired last node is promoted to the
//! next level unchanged and contributes no proof step. Zero leaves is an error.

use crate::core::commitment::leaves::{enumerate_leaves, Leaf};
use crate::core::commitment::path::Path;
use crate::core::commitment::verify::FieldProof;
use crate::core::config::Limits;
use crate::core::descriptor::canonical::CanonicalTree;
use crate::core::types::{decode_canonical_limited, encode_canonical, keccak256_concat, Hash32};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

pub use crate::core::commitment::leaves::hash_leaf;

/// Commitment errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitmentError {
    /// No leaves to commit to.
    #[error("empty tree")]
    EmptyTree,
    /// Leaf count above the configured limit.
    #[error("too many leaves: {count} > {max}")]
    TooManyLeaves {
        /// Leaves found.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Two leaves share an encoded path.
    #[error("duplicate leaf path {path}")]
    DuplicatePath {
        /// Offending path.
        path: Path,
    },
    /// Leaf path does not have leaf shape (odd length).
    #[error("invalid leaf path {path}")]
    InvalidLeafPath {
        /// Offending path.
        path: Path,
    },
    /// A leaf lies under another leaf's path, i.e. one tag is both a scalar and a group.
    #[error("leaf {path} lies under scalar leaf {scalar}")]
    LeafUnderScalar {
        /// The nested leaf.
        path: Path,
        /// The scalar leaf whose path is a prefix of it.
        scalar: Path,
    },
    /// No leaf with this path.
    #[error("path not found: {path}")]
    PathNotFound {
        /// Requested path.
        path: Path,
    },
    /// Persisted leaf set could not be encoded or decoded.
    #[error("leaf set codec: {0}")]
    LeafSet(String),
}

/// Interior node hash.
pub fn hash_node(left: &Hash32, right: &Hash32) -> Hash32 {
    keccak256_concat(left, right)
}

/// Sort leaves by encoded path, lexicographic byte order.
pub fn sort_by_encoded_path(leaves: &mut [Leaf]) {
    leaves.sort_by(|a, b| a.encoded_path.cmp(&b.encoded_path));
}

fn check_sorted_unique(sorted: &[Leaf]) -> Result<(), CommitmentError> {
    if sorted.is_empty() {
        return Err(CommitmentError::EmptyTree);
    }
    for w in sorted.windows(2) {
        if w[0].encoded_path == w[1].encoded_path {
            return Err(CommitmentError::DuplicatePath {
                path: w[1].path.clone(),
            });
        }
    }
    Ok(())
}

// Every odd-length proper prefix of a leaf path names a field that must be a group.
fn check_no_leaf_under_scalar(leaves: &[Leaf]) -> Result<(), CommitmentError> {
    let scalars: BTreeSet<&[u64]> = leaves.iter().map(|l| l.path.segments()).collect();
    for l in leaves {
        let segs = l.path.segments();
        for end in (1..segs.len()).step_by(2) {
            if scalars.contains(&segs[..end]) {
                return Err(CommitmentError::LeafUnderScalar {
                    path: l.path.clone(),
                    scalar: Path(segs[..end].to_vec()),
                });
            }
        }
    }
    Ok(())
}

fn next_level(level: &[Hash32]) -> Vec<Hash32> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_node(left, right),
            _ => pair[0],
        })
        .collect()
}

fn root_of_sorted(sorted: &[Leaf]) -> Hash32 {
    let mut level: Vec<Hash32> = sorted.iter().map(|l| l.hash).collect();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

fn proof_of_sorted(sorted: &[Leaf], index: usize) -> FieldProof {
    let target = &sorted[index];
    let mut level: Vec<Hash32> = sorted.iter().map(|l| l.hash).collect();
    let mut idx = index;
    let mut siblings = Vec::new();
    let mut directions = Vec::new();

    while level.len() > 1 {
        let is_right = idx % 2 == 1;
        let sib_idx = if is_right { idx - 1 } else { idx + 1 };
        // Promoted node: no sibling at this level.
        if sib_idx < level.len() {
            siblings.push(level[sib_idx]);
            directions.push(is_right);
        }
        level = next_level(&level);
        idx /= 2;
    }

    FieldProof {
        path: target.path.clone(),
        encoded_path: target.encoded_path.clone(),
        value: target.value.clone(),
        siblings,
        directions,
    }
}

/// Root over an arbitrary leaf slice (sorted internally).
pub fn compute_root(leaves: &[Leaf]) -> Result<Hash32, CommitmentError> {
    let mut sorted = leaves.to_vec();
    sort_by_encoded_path(&mut sorted);
    check_sorted_unique(&sorted)?;
    Ok(root_of_sorted(&sorted))
}

/// Proof for `path` over an arbitrary leaf slice (sorted internally).
pub fn generate_proof(leaves: &[Leaf], path: &Path) -> Result<FieldProof, CommitmentError> {
    let mut sorted = leaves.to_vec();
    sort_by_encoded_path(&mut sorted);
    check_sorted_unique(&sorted)?;
    let key = path.encode();
    let idx = sorted
        .binary_search_by(|l| l.encoded_path.as_slice().cmp(&key))
        .map_err(|_| CommitmentError::PathNotFound { path: path.clone() })?;
    Ok(proof_of_sorted(&sorted, idx))
}

/// Committed descriptor: sorted leaf set plus root.
#[derive(Clone, Debug)]
pub struct Commitment {
    leaves: Vec<Leaf>,
    root: Hash32,
}

impl Commitment {
    /// Enumerate, hash and commit a canonical tree.
    pub fn from_tree(tree: &CanonicalTree, limits: &Limits) -> Result<Self, CommitmentError> {
        let entries = enumerate_leaves(tree);
        if entries.len() > limits.max_leaves {
            return Err(CommitmentError::TooManyLeaves {
                count: entries.len(),
                max: limits.max_leaves,
            });
        }
        Self::from_leaves(entries.into_iter().map(Leaf::from).collect())
    }

    /// Rebuild from persisted `(path, value)` pairs.
    ///
    /// Rejects sets no canonical tree can produce where a tag is both a scalar and a
    /// group. Gaps in entry indices are accepted: an empty entry map has no leaves.
    pub fn from_leaf_pairs(
        pairs: Vec<(Vec<u64>, Vec<u8>)>,
        limits: &Limits,
    ) -> Result<Self, CommitmentError> {
        if pairs.len() > limits.max_leaves {
            return Err(CommitmentError::TooManyLeaves {
                count: pairs.len(),
                max: limits.max_leaves,
            });
        }
        let mut leaves = Vec::with_capacity(pairs.len());
        for (p, v) in pairs {
            let path = Path(p);
            if !path.is_leaf_shape() {
                return Err(CommitmentError::InvalidLeafPath { path });
            }
            leaves.push(Leaf::new(path, v));
        }
        check_no_leaf_under_scalar(&leaves)?;
        Self::from_leaves(leaves)
    }

    fn from_leaves(mut leaves: Vec<Leaf>) -> Result<Self, CommitmentError> {
        sort_by_encoded_path(&mut leaves);
        check_sorted_unique(&leaves)?;
        let root = root_of_sorted(&leaves);
        debug!(leaves = leaves.len(), root = %hex::encode(root), "descriptor committed");
        Ok(Self { leaves, root })
    }

    /// Merkle root.
    pub fn root(&self) -> Hash32 {
        self.root
    }

    /// Leaves in commitment order.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Look up a leaf by path.
    pub fn leaf(&self, path: &Path) -> Option<&Leaf> {
        let key = path.encode();
        self.leaves
            .binary_search_by(|l| l.encoded_path.as_slice().cmp(&key))
            .ok()
            .map(|i| &self.leaves[i])
    }

    /// Inclusion proof for one field.
    pub fn prove(&self, path: &Path) -> Result<FieldProof, CommitmentError> {
        let key = path.encode();
        let idx = self
            .leaves
            .binary_search_by(|l| l.encoded_path.as_slice().cmp(&key))
            .map_err(|_| CommitmentError::PathNotFound { path: path.clone() })?;
        let proof = proof_of_sorted(&self.leaves, idx);
        debug!(path = %path, steps = proof.siblings.len(), "proof generated");
        Ok(proof)
    }

    /// `(path, value)` pairs in commitment order.
    pub fn leaf_pairs(&self) -> Vec<(Vec<u64>, Vec<u8>)> {
        self.leaves
            .iter()
            .map(|l| (l.path.0.clone(), l.value.clone()))
            .collect()
    }

    /// Canonical bytes of the leaf set, for off-chain retention.
    pub fn encode_leaf_set(&self) -> Result<Vec<u8>, CommitmentError> {
        encode_canonical(&self.leaf_pairs()).map_err(|e| CommitmentError::LeafSet(e.to_string()))
    }

    /// Rebuild from bytes produced by [`Commitment::encode_leaf_set`].
    pub fn decode_leaf_set(bytes: &[u8], limits: &Limits) -> Result<Self, CommitmentError> {
        let pairs: Vec<(Vec<u64>, Vec<u8>)> =
            decode_canonical_limited(bytes, limits.max_payload_bytes)
                .map_err(|e| CommitmentError::LeafSet(e.to_string()))?;
        Self::from_leaf_pairs(pairs, limits)
    }
}
