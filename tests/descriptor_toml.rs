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

// Descriptors as producers hand them over: TOML documents with string keys.

use fixmerkle::core::commitment::merkle::{Commitment, CommitmentError};
use fixmerkle::core::commitment::path::Path;
use fixmerkle::core::config::Limits;
use fixmerkle::core::descriptor::canonical::{CanonicalTree, DescriptorError};
use fixmerkle::core::descriptor::raw::RawMap;

fn build(doc: &str, limits: &Limits) -> Result<CanonicalTree, DescriptorError> {
    CanonicalTree::build(&RawMap::from_toml_str(doc).unwrap(), limits)
}

#[test]
fn test_leading_zero_keys_collide() {
    let err = build("15 = \"USD\"\n015 = \"EUR\"\n", &Limits::default()).unwrap_err();
    assert_eq!(err, DescriptorError::DuplicateTag { path: Path(vec![15]) });
}

#[test]
fn test_non_integer_key_names_parent() {
    let doc = r#"
[454]
tag = 454
entries = [ { 455 = "A" }, { side = "B" } ]
"#;
    match build(doc, &Limits::default()).unwrap_err() {
        DescriptorError::NonIntegerTag { path, key } => {
            assert_eq!(path, Path(vec![454, 1]));
            assert_eq!(key, "side");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_bare_numbers_are_rejected() {
    let err = build("44 = 101.5\n", &Limits::default()).unwrap_err();
    assert!(matches!(err, DescriptorError::InvalidValue { path, .. } if path == Path(vec![44])));

    let err = build("44 = [\"a\", \"b\"]\n", &Limits::default()).unwrap_err();
    assert!(matches!(err, DescriptorError::InvalidValue { .. }));
}

#[test]
fn test_group_tag_must_match_key() {
    let doc = r#"
[454]
tag = 453
entries = [ { 455 = "A" } ]
"#;
    assert_eq!(
        build(doc, &Limits::default()).unwrap_err(),
        DescriptorError::GroupTagMismatch {
            path: Path(vec![454]),
            declared: 453
        }
    );
}

#[test]
fn test_depth_limit() {
    let doc = r#"
[1]
tag = 1
entries = [ { 2 = { tag = 2, entries = [ { 3 = "x" } ] } } ]
"#;
    let shallow = Limits {
        max_group_depth: 1,
        ..Limits::default()
    };
    assert!(matches!(
        build(doc, &shallow),
        Err(DescriptorError::DepthExceeded { max: 1, .. })
    ));
    assert!(build(doc, &Limits::default()).is_ok());
}

#[test]
fn test_leaf_limit_and_empty_tree() {
    let limits = Limits {
        max_leaves: 2,
        ..Limits::default()
    };
    let tree = build("1 = \"a\"\n2 = \"b\"\n3 = \"c\"\n", &limits).unwrap();
    assert_eq!(
        Commitment::from_tree(&tree, &limits).unwrap_err(),
        CommitmentError::TooManyLeaves { count: 3, max: 2 }
    );

    let empty = build("[454]\ntag = 454\nentries = []\n", &Limits::default()).unwrap();
    assert_eq!(
        Commitment::from_tree(&empty, &Limits::default()).unwrap_err(),
        CommitmentError::EmptyTree
    );
}

#[test]
fn test_empty_string_is_a_leaf() {
    let tree = build("58 = \"\"\n", &Limits::default()).unwrap();
    let c = Commitment::from_tree(&tree, &Limits::default()).unwrap();
    assert_eq!(c.leaves().len(), 1);
    assert!(c.leaf(&Path(vec![58])).unwrap().value.is_empty());
}
