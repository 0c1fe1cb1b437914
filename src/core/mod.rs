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

/// Canonical descriptor tree and its raw input form.
pub mod descriptor;
/// Leaves, path encoding, Merkle root, proofs and the reference verifier.
pub mod commitment;
/// Calldata-level verifier matching the on-chain contract.
pub mod onchain;
/// Off-chain persistence of committed descriptors.
pub mod state;
/// Configuration (limits, logging).
pub mod config;
/// Hash, tag and codec primitives.
pub mod types;
