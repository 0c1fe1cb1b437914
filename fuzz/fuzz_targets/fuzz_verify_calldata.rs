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
use fixmerkle::core::commitment::verify::verify_proof;
use fixmerkle::core::onchain::{encode_verify_call_raw, verify_call};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    root: [u8; 32],
    path: Vec<u8>,
    value: Vec<u8>,
    siblings: Vec<[u8; 32]>,
    directions: Vec<bool>,
    raw: Vec<u8>,
}

fuzz_target!(|inp: Input| {
    // arbitrary calldata must never panic
    let _ = verify_call(&inp.raw);

    let data = encode_verify_call_raw(&inp.root, &inp.path, &inp.value, &inp.siblings, &inp.directions);
    let onchain = verify_call(&data).ok();
    let reference = verify_proof(&inp.root, &inp.path, &inp.value, &inp.siblings, &inp.directions).ok();
    assert_eq!(onchain, reference);
});
