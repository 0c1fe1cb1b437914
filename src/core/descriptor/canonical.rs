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

//! Canonical descriptor tree.
//!
//! Validation happens once, in [`CanonicalTree::build`]; everything downstream works on
//! the typed tree and never re-checks shape.
//!
//! Map keys are kept in input order here. The only key ordering that matters is imposed
//! by [`FieldMap::ascending`] when a map is walked or serialized. Group entries are never
//! reordered.
//!
//! ## Payload format (v1)
//! The canonical payload is a bincode (fixint) encoding of a flat pre-order item stream:
//!
//! ```text
//! map   := Map{len} field*len          (fields in ascending tag order)
//! field := Scalar{tag, value} | Group{tag, entries} map*entries
//! ```
//!
//! The stream is flat so that decoding never recurses deeper than `max_group_depth`.

use crate::core::commitment::path::Path;
use crate::core::config::Limits;
use crate::core::descriptor::raw::{RawMap, RawValue};
use crate::core::types::{decode_canonical_limited, encode_canonical, CodecError, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

const PAYLOAD_VERSION: u8 = 1;

/// Structural errors. Each names the offending location.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// A key does not coerce to a non-negative integer.
    #[error("non-integer tag {key:?} at {path}")]
    NonIntegerTag {
        /// Location of the map holding the key.
        path: Path,
        /// Key as supplied.
        key: String,
    },
    /// A tag appears twice in one map.
    #[error("duplicate tag at {path}")]
    DuplicateTag {
        /// Location of the repeated field.
        path: Path,
    },
    /// Value is neither a string nor a well-formed group.
    #[error("invalid value at {path}: {found}")]
    InvalidValue {
        /// Location of the value.
        path: Path,
        /// Kind of value found.
        found: &'static str,
    },
    /// Group's declared tag differs from the key it is stored under.
    #[error("group tag mismatch at {path}: declared {declared}")]
    GroupTagMismatch {
        /// Location of the group.
        path: Path,
        /// Declared tag.
        declared: i64,
    },
    /// Groups nest deeper than the configured maximum.
    #[error("group nesting deeper than {max} at {path}")]
    DepthExceeded {
        /// Location of the first group beyond the limit.
        path: Path,
        /// Configured maximum.
        max: usize,
    },
    /// Payload could not be decoded.
    #[error("payload codec: {0}")]
    Payload(String),
    /// Payload decoded but does not describe a tree.
    #[error("malformed payload at {path}: {reason}")]
    MalformedPayload {
        /// Location where decoding stopped.
        path: Path,
        /// What was wrong.
        reason: &'static str,
    },
    /// Payload map keys are not strictly ascending.
    #[error("non-canonical key order at {path}")]
    NonCanonicalOrder {
        /// Location of the out-of-order field.
        path: Path,
    },
}

impl From<CodecError> for DescriptorError {
    fn from(e: CodecError) -> Self {
        DescriptorError::Payload(e.to_string())
    }
}

/// Field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Raw UTF-8 bytes of a scalar field. Never coerced.
    Scalar(Vec<u8>),
    /// Repeating group.
    Group(Group),
}

/// Repeating group: ordered entries, each a field map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    /// Group tag (equal to the key it is stored under).
    pub tag: Tag,
    /// Entries in semantic (document) order.
    pub entries: Vec<FieldMap>,
}

/// One map level: tag -> value, unique tags.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    fields: Vec<(Tag, Value)>,
}

impl FieldMap {
    /// Fields sorted by ascending numeric tag.
    pub fn ascending(&self) -> Vec<(Tag, &Value)> {
        let mut out: Vec<(Tag, &Value)> = self.fields.iter().map(|(t, v)| (*t, v)).collect();
        out.sort_by_key(|(t, _)| *t);
        out
    }

    /// Lookup by tag.
    pub fn get(&self, tag: Tag) -> Option<&Value> {
        self.fields.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }
}

impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.ascending() == other.ascending()
    }
}

impl Eq for FieldMap {}

/// Validated descriptor tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalTree {
    root: FieldMap,
}

/// Coerce a raw key to a tag: non-empty ASCII digits that fit in `u64`.
pub fn coerce_tag(key: &str) -> Option<Tag> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u64>().ok()
}

fn build_map(
    raw: &RawMap,
    at: &Path,
    depth: usize,
    limits: &Limits,
) -> Result<FieldMap, DescriptorError> {
    let mut seen: BTreeSet<Tag> = BTreeSet::new();
    let mut fields = Vec::with_capacity(raw.0.len());

    for (key, value) in raw.0.iter() {
        let tag = coerce_tag(key).ok_or_else(|| DescriptorError::NonIntegerTag {
            path: at.clone(),
            key: key.clone(),
        })?;
        let here = at.child(tag);
        if !seen.insert(tag) {
            return Err(DescriptorError::DuplicateTag { path: here });
        }

        let v = match value {
            RawValue::Text(s) => Value::Scalar(s.as_bytes().to_vec()),
            RawValue::Group(g) => {
                if let Some(declared) = g.tag {
                    if u64::try_from(declared).ok() != Some(tag) {
                        return Err(DescriptorError::GroupTagMismatch {
                            path: here,
                            declared,
                        });
                    }
                }
                if depth + 1 > limits.max_group_depth {
                    return Err(DescriptorError::DepthExceeded {
                        path: here,
                        max: limits.max_group_depth,
                    });
                }
                let mut entries = Vec::with_capacity(g.entries.len());
                for (i, e) in g.entries.iter().enumerate() {
                    entries.push(build_map(e, &here.child(i as u64), depth + 1, limits)?);
                }
                Value::Group(Group { tag, entries })
            }
            other => {
                return Err(DescriptorError::InvalidValue {
                    path: here,
                    found: other.kind(),
                })
            }
        };
        fields.push((tag, v));
    }

    Ok(FieldMap { fields })
}

#[derive(Debug, Serialize, Deserialize)]
enum WireItem {
    Map { len: u64 },
    Scalar { tag: u64, value: Vec<u8> },
    Group { tag: u64, entries: u64 },
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePayload {
    version: u8,
    items: Vec<WireItem>,
}

fn flatten_map(map: &FieldMap, out: &mut Vec<WireItem>) {
    let fields = map.ascending();
    out.push(WireItem::Map {
        len: fields.len() as u64,
    });
    for (tag, v) in fields {
        match v {
            Value::Scalar(bytes) => out.push(WireItem::Scalar {
                tag,
                value: bytes.clone(),
            }),
            Value::Group(g) => {
                out.push(WireItem::Group {
                    tag,
                    entries: g.entries.len() as u64,
                });
                for e in g.entries.iter() {
                    flatten_map(e, out);
                }
            }
        }
    }
}

fn check_ascending(prev: &mut Option<Tag>, at: &Path, tag: Tag) -> Result<Path, DescriptorError> {
    let here = at.child(tag);
    if prev.is_some_and(|p| p >= tag) {
        return Err(DescriptorError::NonCanonicalOrder { path: here });
    }
    *prev = Some(tag);
    Ok(here)
}

struct WireReader<'a> {
    items: &'a [WireItem],
    pos: usize,
    limits: &'a Limits,
}

impl<'a> WireReader<'a> {
    fn next(&mut self, at: &Path) -> Result<&'a WireItem, DescriptorError> {
        let item = self
            .items
            .get(self.pos)
            .ok_or_else(|| DescriptorError::MalformedPayload {
                path: at.clone(),
                reason: "truncated item stream",
            })?;
        self.pos += 1;
        Ok(item)
    }

    fn remaining(&self) -> u64 {
        (self.items.len() - self.pos) as u64
    }

    fn read_map(&mut self, at: &Path, depth: usize) -> Result<FieldMap, DescriptorError> {
        let len = match self.next(at)? {
            WireItem::Map { len } => *len,
            _ => {
                return Err(DescriptorError::MalformedPayload {
                    path: at.clone(),
                    reason: "expected map header",
                })
            }
        };
        if len > self.remaining() {
            return Err(DescriptorError::MalformedPayload {
                path: at.clone(),
                reason: "map length exceeds stream",
            });
        }

        let mut fields = Vec::with_capacity(len as usize);
        let mut prev: Option<Tag> = None;
        for _ in 0..len {
            let (tag, v) = match self.next(at)? {
                WireItem::Scalar { tag, value } => {
                    check_ascending(&mut prev, at, *tag)?;
                    (*tag, Value::Scalar(value.clone()))
                }
                WireItem::Group { tag, entries } => {
                    let here = check_ascending(&mut prev, at, *tag)?;
                    if depth + 1 > self.limits.max_group_depth {
                        return Err(DescriptorError::DepthExceeded {
                            path: here,
                            max: self.limits.max_group_depth,
                        });
                    }
                    if *entries > self.remaining() {
                        return Err(DescriptorError::MalformedPayload {
                            path: here,
                            reason: "entry count exceeds stream",
                        });
                    }
                    let mut out = Vec::with_capacity(*entries as usize);
                    for i in 0..*entries {
                        out.push(self.read_map(&here.child(i), depth + 1)?);
                    }
                    (*tag, Value::Group(Group { tag: *tag, entries: out }))
                }
                WireItem::Map { .. } => {
                    return Err(DescriptorError::MalformedPayload {
                        path: at.clone(),
                        reason: "unexpected map header",
                    })
                }
            };
            fields.push((tag, v));
        }
        Ok(FieldMap { fields })
    }
}

impl CanonicalTree {
    /// Validate raw input into a canonical tree.
    pub fn build(raw: &RawMap, limits: &Limits) -> Result<Self, DescriptorError> {
        let root = build_map(raw, &Path::root(), 0, limits)?;
        Ok(Self { root })
    }

    /// Root-level field map.
    pub fn fields(&self) -> &FieldMap {
        &self.root
    }

    /// Deterministic byte payload of the whole tree.
    pub fn to_payload(&self) -> Result<Vec<u8>, CodecError> {
        let mut items = Vec::new();
        flatten_map(&self.root, &mut items);
        encode_canonical(&WirePayload {
            version: PAYLOAD_VERSION,
            items,
        })
    }

    /// Decode a payload produced by [`CanonicalTree::to_payload`], rejecting
    /// anything that is not in canonical form.
    pub fn from_payload(bytes: &[u8], limits: &Limits) -> Result<Self, DescriptorError> {
        let wire: WirePayload = decode_canonical_limited(bytes, limits.max_payload_bytes)?;
        if wire.version != PAYLOAD_VERSION {
            return Err(DescriptorError::MalformedPayload {
                path: Path::root(),
                reason: "unsupported payload version",
            });
        }
        let mut r = WireReader {
            items: &wire.items,
            pos: 0,
            limits,
        };
        let root = r.read_map(&Path::root(), 0)?;
        if r.pos != wire.items.len() {
            return Err(DescriptorError::MalformedPayload {
                path: Path::root(),
                reason: "trailing items",
            });
        }
        Ok(Self { root })
    }
}
