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

//! Fixmerkle - Merkle commitments over FIX-derived instrument descriptors.
//!
//! This crate provides:
//! - Strict validation of parsed FIX field trees into a canonical form
//! - Leaf enumeration with a frozen, prefix-free path encoding
//! - Deterministic Keccak-256 Merkle roots and per-field inclusion proofs
//! - Two proof verifiers (reference, and calldata-level as run on-chain) that agree bit-for-bit
//! - Write-once off-chain storage of committed descriptors
//! - Structured logging via tracing

/// Core pipeline (descriptor, commitment, verification, state).
pub mod core;
/// Observability (structured logging helpers).
pub mod monitoring;
