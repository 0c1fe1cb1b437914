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

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use fixmerkle::core::commitment::merkle::Commitment;
use fixmerkle::core::config::Limits;
use fixmerkle::core::onchain::{encode_verify_call, verify_call};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    leaves: Vec<(Vec<u64>, Vec<u8>)>,
    index: u16,
}

fuzz_target!(|inp: Input| {
    let Ok(c) = Commitment::from_leaf_pairs(inp.leaves, &Limits::default()) else {
        return;
    };
    let leaf = &c.leaves()[(inp.index as usize) % c.leaves().len()];
    let proof = c.prove(&leaf.path).expect("committed leaf has a proof");
    assert_eq!(proof.verify(&c.root()), Ok(true));
    assert_eq!(verify_call(&encode_verify_call(&c.root(), &proof)), Ok(true));
});
