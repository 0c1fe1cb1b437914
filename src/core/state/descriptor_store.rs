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

//! Off-chain descriptor store using sled.
//!
//! Per descriptor id three keys are written in one transaction:
//! `<id>/root` (32 bytes), `<id>/payload` (canonical tree bytes) and `<id>/leaves`
//! (canonical leaf set). Records are write-once.

use crate::core::commitment::merkle::{Commitment, CommitmentError};
use crate::core::commitment::path::Path;
use crate::core::commitment::verify::FieldProof;
use crate::core::config::Limits;
use crate::core::descriptor::canonical::{CanonicalTree, DescriptorError};
use crate::core::types::Hash32;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use thiserror::Error;
use tracing::{debug, warn};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("invalid descriptor id")]
    InvalidId,
    #[error("descriptor not found: {0}")]
    NotFound(String),
    #[error("descriptor {0} already committed with a different root")]
    AlreadyCommitted(String),
    #[error("stored record corrupt: {0}")]
    Corrupt(String),
    #[error("stored root does not match recomputed root for {0}")]
    RootMismatch(String),
    #[error("{part} is {size} bytes, limit is {max}")]
    TooLarge {
        part: &'static str,
        size: usize,
        max: usize,
    },
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
}

/// Persistent descriptor store.
#[derive(Clone)]
pub struct DescriptorStore {
    db: sled::Db,
    limits: Limits,
}

fn key(id: &str, part: &str) -> Vec<u8> {
    format!("{id}/{part}").into_bytes()
}

fn check_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.contains('/') || id.len() > 128 {
        return Err(StoreError::InvalidId);
    }
    Ok(())
}

impl DescriptorStore {
    /// Open sled DB at path (directory).
    pub fn open(path: &str, limits: Limits) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|_| StoreError::DbOpen)?;
        Ok(Self { db, limits })
    }

    /// Commit a tree under `id`, returning its root.
    ///
    /// Re-committing the same content is a no-op; a different root for an existing id
    /// is refused. Records that exceed the store's size or depth limits are refused
    /// before anything is written.
    pub fn commit(&self, id: &str, tree: &CanonicalTree) -> Result<Hash32, StoreError> {
        check_id(id)?;
        let commitment = Commitment::from_tree(tree, &self.limits)?;
        let root = commitment.root();
        let payload = tree
            .to_payload()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let leaves = commitment.encode_leaf_set()?;

        // A record is only written if this store can read it back.
        for (part, bytes) in [("payload", &payload), ("leaves", &leaves)] {
            if bytes.len() > self.limits.max_payload_bytes {
                return Err(StoreError::TooLarge {
                    part,
                    size: bytes.len(),
                    max: self.limits.max_payload_bytes,
                });
            }
        }
        CanonicalTree::from_payload(&payload, &self.limits)?;

        let root_key = key(id, "root");
        let payload_key = key(id, "payload");
        let leaves_key = key(id, "leaves");

        let res: Result<(), TransactionError<StoreError>> = self.db.transaction(|t| {
            if let Some(existing) = t.get(&root_key)? {
                if &*existing == root.as_slice() {
                    return Ok(());
                }
                return Err(ConflictableTransactionError::Abort(
                    StoreError::AlreadyCommitted(id.to_string()),
                ));
            }
            t.insert(root_key.as_slice(), root.as_slice())?;
            t.insert(payload_key.as_slice(), payload.as_slice())?;
            t.insert(leaves_key.as_slice(), leaves.as_slice())?;
            Ok(())
        });

        match res {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(_)) => return Err(StoreError::DbIo),
        }
        self.db.flush().map_err(|_| StoreError::DbIo)?;
        debug!(id, root = %hex::encode(root), leaves = commitment.leaves().len(), "descriptor stored");
        Ok(root)
    }

    fn get(&self, id: &str, part: &str) -> Result<Vec<u8>, StoreError> {
        check_id(id)?;
        let v = self
            .db
            .get(key(id, part))
            .map_err(|_| StoreError::DbIo)?;
        v.map(|iv| iv.to_vec())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Stored root.
    pub fn root(&self, id: &str) -> Result<Hash32, StoreError> {
        let raw = self.get(id, "root")?;
        if raw.len() != 32 {
            return Err(StoreError::Corrupt(format!("{id}/root length {}", raw.len())));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&raw);
        Ok(out)
    }

    /// Decode the stored canonical tree.
    pub fn load_tree(&self, id: &str) -> Result<CanonicalTree, StoreError> {
        let raw = self.get(id, "payload")?;
        Ok(CanonicalTree::from_payload(&raw, &self.limits)?)
    }

    /// Rebuild the commitment from the stored leaf set and check it against the stored root.
    pub fn commitment(&self, id: &str) -> Result<Commitment, StoreError> {
        let root = self.root(id)?;
        let raw = self.get(id, "leaves")?;
        let c = Commitment::decode_leaf_set(&raw, &self.limits)?;
        if c.root() != root {
            warn!(id, stored = %hex::encode(root), recomputed = %hex::encode(c.root()), "leaf set does not match stored root");
            return Err(StoreError::RootMismatch(id.to_string()));
        }
        Ok(c)
    }

    /// Proof for one field of a stored descriptor, with the stored root.
    pub fn prove(&self, id: &str, path: &Path) -> Result<(Hash32, FieldProof), StoreError> {
        let c = self.commitment(id)?;
        let proof = c.prove(path)?;
        Ok((c.root(), proof))
    }

    /// Descriptor ids in key order.
    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        for item in self.db.iter() {
            let (k, _) = item.map_err(|_| StoreError::DbIo)?;
            if let Some(id) = k.strip_suffix(b"/root") {
                out.push(String::from_utf8_lossy(id).into_owned());
            }
        }
        Ok(out)
    }

    #[cfg(test)]
    fn overwrite_raw(&self, id: &str, part: &str, bytes: &[u8]) {
        self.db.insert(key(id, part), bytes).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::raw::{text, RawMap};

    fn tree(v: &str) -> CanonicalTree {
        let raw = RawMap::new().with("15", text("USD")).with("223", text(v));
        CanonicalTree::build(&raw, &Limits::default()).unwrap()
    }

    #[test]
    fn tampered_leaf_set_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let st = DescriptorStore::open(dir.path().to_str().unwrap(), Limits::default()).unwrap();
        st.commit("bond-1", &tree("4.250")).unwrap();

        let other = Commitment::from_tree(&tree("9.999"), &Limits::default()).unwrap();
        st.overwrite_raw("bond-1", "leaves", &other.encode_leaf_set().unwrap());
        assert!(matches!(
            st.prove("bond-1", &Path(vec![223])),
            Err(StoreError::RootMismatch(_))
        ));

        st.overwrite_raw("bond-1", "root", b"short");
        assert!(matches!(st.root("bond-1"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn ids_reject_separators() {
        let dir = tempfile::tempdir().unwrap();
        let st = DescriptorStore::open(dir.path().to_str().unwrap(), Limits::default()).unwrap();
        assert!(matches!(st.commit("a/b", &tree("1")), Err(StoreError::InvalidId)));
        assert!(matches!(st.commit("", &tree("1")), Err(StoreError::InvalidId)));
    }
}
