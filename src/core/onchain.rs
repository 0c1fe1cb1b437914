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

//! Calldata-level verifier mirroring the on-chain contract.
//!
//! ## Call
//! ```text
//! verify(bytes32 root, bytes pathCBOR, bytes value, bytes32[] proof, bool[] directions)
//!     returns (bool)
//! ```
//!
//! Arguments use the standard ABI head/tail layout: a five-word head (`root` inline,
//! then four offsets relative to the start of the arguments) followed by
//! length-prefixed tails padded to 32 bytes.
//!
//! The contract computes
//! `node = keccak256(abi.encodePacked(pathCBOR, value))` and folds each proof word
//! through a 64-byte scratch buffer, `sibling || node` when the direction is `true`,
//! `node || sibling` otherwise.
//!
//! ## Outcomes
//! - Calldata that does not decode, or `proof.length != directions.length`: revert
//!   (`Err`).
//! - Anything else: `Ok(node == root)`.
//!
//! This module shares no code with `commitment::verify` beyond the hash
//! primitive; golden vectors in `tests/` pin both to the same results.

use crate::core::commitment::verify::FieldProof;
use crate::core::types::{keccak256, Hash32};
use thiserror::Error;

/// Canonical function signature.
pub const VERIFY_SIGNATURE: &str = "verify(bytes32,bytes,bytes,bytes32[],bool[])";

/// `keccak256(VERIFY_SIGNATURE)[..4]`.
pub const VERIFY_SELECTOR: [u8; 4] = [0xb6, 0xf2, 0x32, 0x81];

const WORD: usize = 32;
const HEAD_WORDS: usize = 5;

/// Reasons the contract would revert.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    /// Calldata shorter than a selector, or selector unknown.
    #[error("unknown selector")]
    Selector,
    /// A read ran past the end of calldata.
    #[error("calldata truncated")]
    Truncated,
    /// Offset or length word does not fit in memory.
    #[error("offset or length out of range")]
    OutOfRange,
    /// A `bool` word other than 0 or 1.
    #[error("invalid bool encoding")]
    InvalidBool,
    /// `proof.length != directions.length`.
    #[error("proof length mismatch: {proof} proof words, {directions} directions")]
    LengthMismatch {
        /// Proof array length.
        proof: usize,
        /// Directions array length.
        directions: usize,
    },
}

struct Calldata<'a> {
    args: &'a [u8],
}

impl<'a> Calldata<'a> {
    fn word(&self, at: usize) -> Result<&'a [u8], AbiError> {
        let end = at.checked_add(WORD).ok_or(AbiError::OutOfRange)?;
        self.args.get(at..end).ok_or(AbiError::Truncated)
    }

    fn word32(&self, at: usize) -> Result<Hash32, AbiError> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.word(at)?);
        Ok(out)
    }

    /// Offsets and lengths must fit in 8 bytes; the upper 24 bytes must be zero.
    fn usize_at(&self, at: usize) -> Result<usize, AbiError> {
        let w = self.word(at)?;
        if w[..24].iter().any(|b| *b != 0) {
            return Err(AbiError::OutOfRange);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&w[24..]);
        usize::try_from(u64::from_be_bytes(buf)).map_err(|_| AbiError::OutOfRange)
    }

    /// `(start, len)` of the element area of a dynamic argument.
    fn tail(&self, head_slot: usize, elem_size: usize) -> Result<(usize, usize), AbiError> {
        let off = self.usize_at(head_slot * WORD)?;
        let len = self.usize_at(off)?;
        let start = off.checked_add(WORD).ok_or(AbiError::OutOfRange)?;
        let bytes = len.checked_mul(elem_size).ok_or(AbiError::OutOfRange)?;
        let end = start.checked_add(bytes).ok_or(AbiError::OutOfRange)?;
        if end > self.args.len() {
            return Err(AbiError::Truncated);
        }
        Ok((start, len))
    }

    fn bytes_arg(&self, head_slot: usize) -> Result<&'a [u8], AbiError> {
        let (start, len) = self.tail(head_slot, 1)?;
        Ok(&self.args[start..start + len])
    }
}

/// Execute `verify` against raw calldata (selector included).
pub fn verify_call(calldata: &[u8]) -> Result<bool, AbiError> {
    if calldata.len() < 4 || calldata[..4] != VERIFY_SELECTOR {
        return Err(AbiError::Selector);
    }
    let cd = Calldata {
        args: &calldata[4..],
    };

    let root = cd.word32(0)?;
    let path_cbor = cd.bytes_arg(1)?;
    let value = cd.bytes_arg(2)?;
    let (proof_start, proof_len) = cd.tail(3, WORD)?;
    let (dirs_start, dirs_len) = cd.tail(4, WORD)?;

    let mut directions = Vec::with_capacity(dirs_len);
    for i in 0..dirs_len {
        let w = cd.word(dirs_start + i * WORD)?;
        if w[..31].iter().any(|b| *b != 0) || w[31] > 1 {
            return Err(AbiError::InvalidBool);
        }
        directions.push(w[31] == 1);
    }

    if proof_len != dirs_len {
        return Err(AbiError::LengthMismatch {
            proof: proof_len,
            directions: dirs_len,
        });
    }

    let mut packed = Vec::with_capacity(path_cbor.len() + value.len());
    packed.extend_from_slice(path_cbor);
    packed.extend_from_slice(value);
    let mut node = keccak256(&packed);

    let mut scratch = [0u8; 2 * WORD];
    for (i, is_right) in directions.iter().enumerate() {
        let sibling = cd.word(proof_start + i * WORD)?;
        if *is_right {
            scratch[..WORD].copy_from_slice(sibling);
            scratch[WORD..].copy_from_slice(&node);
        } else {
            scratch[..WORD].copy_from_slice(&node);
            scratch[WORD..].copy_from_slice(sibling);
        }
        node = keccak256(&scratch);
    }

    Ok(node == root)
}

fn push_usize(out: &mut Vec<u8>, v: usize) {
    let mut w = [0u8; WORD];
    w[24..].copy_from_slice(&(v as u64).to_be_bytes());
    out.extend_from_slice(&w);
}

fn push_padded(out: &mut Vec<u8>, data: &[u8]) {
    push_usize(out, data.len());
    out.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + (WORD - rem), 0);
    }
}

fn padded_tail_len(data_len: usize) -> usize {
    WORD + data_len.div_ceil(WORD) * WORD
}

/// Build raw-slice calldata. Array lengths are encoded as given, even when they differ.
pub fn encode_verify_call_raw(
    root: &Hash32,
    path_cbor: &[u8],
    value: &[u8],
    proof: &[Hash32],
    directions: &[bool],
) -> Vec<u8> {
    let off_path = HEAD_WORDS * WORD;
    let off_value = off_path + padded_tail_len(path_cbor.len());
    let off_proof = off_value + padded_tail_len(value.len());
    let off_dirs = off_proof + WORD + proof.len() * WORD;
    let total = off_dirs + WORD + directions.len() * WORD;

    let mut out = Vec::with_capacity(4 + total);
    out.extend_from_slice(&VERIFY_SELECTOR);
    out.extend_from_slice(root);
    push_usize(&mut out, off_path);
    push_usize(&mut out, off_value);
    push_usize(&mut out, off_proof);
    push_usize(&mut out, off_dirs);

    push_padded(&mut out, path_cbor);
    push_padded(&mut out, value);

    push_usize(&mut out, proof.len());
    for h in proof {
        out.extend_from_slice(h);
    }

    push_usize(&mut out, directions.len());
    for d in directions {
        push_usize(&mut out, usize::from(*d));
    }
    out
}

/// Calldata for verifying `proof` against `root`.
pub fn encode_verify_call(root: &Hash32, proof: &FieldProof) -> Vec<u8> {
    encode_verify_call_raw(
        root,
        &proof.encoded_path,
        &proof.value,
        &proof.siblings,
        &proof.directions,
    )
}

/// ABI return word for a `bool`.
pub fn encode_bool_result(v: bool) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[31] = u8::from(v);
    w
}

/// Run `verify` and return the ABI-encoded return data the contract would produce.
pub fn execute_call(calldata: &[u8]) -> Result<[u8; 32], AbiError> {
    verify_call(calldata).map(encode_bool_result)
}
