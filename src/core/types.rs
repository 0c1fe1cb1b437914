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

//! Shared primitives: hashes, tags, the Keccak-256 function and canonical encoding helpers.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// 32-byte hash (Merkle node, leaf hash or root).
pub type Hash32 = [u8; 32];

/// FIX field tag (business field number).
pub type Tag = u64;

/// Keccak-256, identical to the EVM `keccak256` opcode.
pub fn keccak256(data: &[u8]) -> Hash32 {
    let d = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(d.as_slice());
    out
}

/// Keccak-256 over the concatenation of two byte strings, without an intermediate buffer.
pub fn keccak256_concat(a: &[u8], b: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(a);
    hasher.update(b);
    let d = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(d.as_slice());
    out
}

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    // Fixint encoding provides a stable integer representation.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules. Callers are responsible for container ordering.
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    // The deserializer limit also bounds container length prefixes.
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// Parse a 32-byte hash from hex (optional `0x` prefix).
pub fn parse_hash32(s: &str) -> Option<Hash32> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_matches_known_vectors() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
        assert_eq!(keccak256_concat(b"ab", b"c"), keccak256(b"abc"));
    }

    #[test]
    fn parse_hash32_accepts_prefix_and_rejects_short() {
        let h = keccak256(b"abc");
        let s = format!("0x{}", hex::encode(h));
        assert_eq!(parse_hash32(&s), Some(h));
        assert_eq!(parse_hash32("abcd"), None);
        assert_eq!(parse_hash32("zz"), None);
    }

    #[test]
    fn decode_rejects_oversized_payload() {
        let bytes = encode_canonical(&vec![1u64, 2, 3]).unwrap();
        assert!(matches!(
            decode_canonical_limited::<Vec<u64>>(&bytes, 4),
            Err(CodecError::TooLarge)
        ));
        let back: Vec<u64> = decode_canonical_limited(&bytes, 1024).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
