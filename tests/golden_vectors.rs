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

// Fixed descriptors with their expected roots, proofs and calldata. Every vector runs
// through both the reference verifier and the calldata verifier.

use fixmerkle::core::commitment::merkle::Commitment;
use fixmerkle::core::commitment::path::Path;
use fixmerkle::core::commitment::verify::FieldProof;
use fixmerkle::core::config::Limits;
use fixmerkle::core::descriptor::canonical::CanonicalTree;
use fixmerkle::core::descriptor::raw::RawMap;
use fixmerkle::core::onchain::{encode_verify_call, verify_call};
use fixmerkle::core::types::{parse_hash32, Hash32};

fn commit(doc: &str) -> Commitment {
    let raw = RawMap::from_toml_str(doc).unwrap();
    let tree = CanonicalTree::build(&raw, &Limits::default()).unwrap();
    Commitment::from_tree(&tree, &Limits::default()).unwrap()
}

fn h(s: &str) -> Hash32 {
    parse_hash32(s).unwrap()
}

fn check_both(root: &Hash32, proof: &FieldProof) {
    assert_eq!(proof.verify(root), Ok(true), "reference verifier, {}", proof.path);
    assert_eq!(
        verify_call(&encode_verify_call(root, proof)),
        Ok(true),
        "calldata verifier, {}",
        proof.path
    );
}

const TWO_FIELDS: &str = r#"
15 = "USD"
223 = "4.250"
"#;

#[test]
fn two_scalar_fields() {
    let c = commit(TWO_FIELDS);
    assert_eq!(
        c.root(),
        h("84255b0338f3c7477772b16fa5118e661c07b51b871f0ab3c20be915a78b3089")
    );

    let p = c.prove(&Path(vec![15])).unwrap();
    assert_eq!(hex::encode(&p.encoded_path), "810f");
    assert_eq!(p.value, b"USD");
    assert_eq!(
        p.siblings,
        vec![h("1d7149568b6a125dc0144f36353012957e40d4c3684c63295e533a25f85ee6e1")]
    );
    assert_eq!(p.directions, vec![false]);
    check_both(&c.root(), &p);
}

#[test]
fn two_scalar_fields_calldata() {
    let c = commit(TWO_FIELDS);
    let p = c.prove(&Path(vec![15])).unwrap();
    let expected = concat!(
        "b6f23281",
        "84255b0338f3c7477772b16fa5118e661c07b51b871f0ab3c20be915a78b3089",
        "00000000000000000000000000000000000000000000000000000000000000a0",
        "00000000000000000000000000000000000000000000000000000000000000e0",
        "0000000000000000000000000000000000000000000000000000000000000120",
        "0000000000000000000000000000000000000000000000000000000000000160",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "810f000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000003",
        "5553440000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "1d7149568b6a125dc0144f36353012957e40d4c3684c63295e533a25f85ee6e1",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "0000000000000000000000000000000000000000000000000000000000000000",
    );
    assert_eq!(hex::encode(encode_verify_call(&c.root(), &p)), expected);
}

const GROUP: &str = r#"
[454]
tag = 454
entries = [ { 455 = "A", 456 = "1" }, { 455 = "B", 456 = "2" } ]
"#;

const GROUP_SWAPPED: &str = r#"
[454]
tag = 454
entries = [ { 455 = "B", 456 = "2" }, { 455 = "A", 456 = "1" } ]
"#;

#[test]
fn repeating_group() {
    let c = commit(GROUP);
    assert_eq!(
        c.root(),
        h("e7e1283cde379907179a1423a3dfa532160a47bc7d162af1d087504f9315d59a")
    );
    let paths: Vec<String> = c.leaves().iter().map(|l| l.path.to_string()).collect();
    assert_eq!(paths, vec!["454.0.455", "454.0.456", "454.1.455", "454.1.456"]);

    let p = c.prove(&Path(vec![454, 1, 455])).unwrap();
    assert_eq!(hex::encode(&p.encoded_path), "831901c6011901c7");
    assert_eq!(
        p.siblings,
        vec![
            h("94429b582e15225ce7970ee969d824ca5baf10d24dd1258c9ded06d387e51048"),
            h("1e67525d2a9028e08fa62760de7ed71990e9257de31fe0ce1f7817b378e26b1e"),
        ]
    );
    assert_eq!(p.directions, vec![false, true]);
    check_both(&c.root(), &p);
}

#[test]
fn swapping_group_entries_changes_root() {
    let swapped = commit(GROUP_SWAPPED);
    assert_eq!(
        swapped.root(),
        h("e7607f2e9cb08f98e1b557a1bc3ca070ddea26a523ffd0fb597b10bb11b2807b")
    );
    assert_ne!(swapped.root(), commit(GROUP).root());
}

#[test]
fn three_fields_promote_the_last_leaf() {
    let c = commit("15 = \"USD\"\n223 = \"4.250\"\n48 = \"US0378331005\"\n");
    assert_eq!(
        c.root(),
        h("9ee6808203ab676864642e33a62429e209835f2c07431f3538ec3da6047ae570")
    );
    // byte order of encodings: 810f < 811830 < 8118df
    let order: Vec<String> = c.leaves().iter().map(|l| l.path.to_string()).collect();
    assert_eq!(order, vec!["15", "48", "223"]);

    let promoted = c.prove(&Path(vec![223])).unwrap();
    assert_eq!(
        promoted.siblings,
        vec![h("025ee4866a2aa0c097208a0f021c3b3277828f58d4e365016fbe2671fb2384b1")]
    );
    assert_eq!(promoted.directions, vec![true]);
    check_both(&c.root(), &promoted);

    let paired = c.prove(&Path(vec![48])).unwrap();
    assert_eq!(
        paired.siblings,
        vec![
            h("53ddc2e2ca02af683115832c16b8b56c25da5b0000841d7034fd389b0c5a0681"),
            h("1d7149568b6a125dc0144f36353012957e40d4c3684c63295e533a25f85ee6e1"),
        ]
    );
    assert_eq!(paired.directions, vec![true, false]);
    check_both(&c.root(), &paired);
}

#[test]
fn nested_groups_and_empty_value() {
    let c = commit(
        r#"
48 = "US0378331005"
58 = ""

[453]
tag = 453
entries = [ { 448 = "ISSUER", 802 = { tag = 802, entries = [ { 523 = "X" }, { 523 = "Y" } ] } } ]
"#,
    );
    assert_eq!(
        c.root(),
        h("1bdde0442db5478bcd31bd98f6ce3b0e8998edb53f17ebc17c908e5047ed9628")
    );
    let encoded: Vec<String> = c.leaves().iter().map(|l| hex::encode(&l.encoded_path)).collect();
    assert_eq!(
        encoded,
        vec![
            "811830",
            "81183a",
            "831901c5001901c0",
            "851901c5001903220019020b",
            "851901c5001903220119020b",
        ]
    );

    let p = c.prove(&Path(vec![453, 0, 802, 1, 523])).unwrap();
    assert_eq!(
        p.siblings,
        vec![h("29d4ef5e9d20b70427553eec95cd4dc8f280106ac5238bf33c811b037bdebc8c")]
    );
    assert_eq!(p.directions, vec![true]);
    check_both(&c.root(), &p);

    let empty = c.prove(&Path(vec![58])).unwrap();
    assert!(empty.value.is_empty());
    check_both(&c.root(), &empty);
}

#[test]
fn every_leaf_of_every_vector_verifies_in_both() {
    for doc in [TWO_FIELDS, GROUP, GROUP_SWAPPED] {
        let c = commit(doc);
        for l in c.leaves() {
            check_both(&c.root(), &c.prove(&l.path).unwrap());
        }
    }
}
