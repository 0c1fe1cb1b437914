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

use libfuzzer_sys::fuzz_target;
use fixmerkle::core::config::Limits;
use fixmerkle::core::descriptor::canonical::CanonicalTree;

// Accepted payloads are canonical: re-encoding reproduces the input.
fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = CanonicalTree::from_payload(data, &Limits::default()) {
        assert_eq!(tree.to_payload().expect("re-encode"), data);
    }
});
