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

//! Field paths and their frozen wire encoding.
//!
//! ## Encoding `cbor-uint-array-v1`
//! A path `[p0, p1, ..]` is encoded as a canonical CBOR array of unsigned integers:
//!
//! ```text
//! head(4, n) || head(0, p0) || head(0, p1) || ...
//!
//! head(major, v) =
//!   v < 24          => (major << 5) | v
//!   v <= 0xff       => (major << 5) | 24, u8
//!   v <= 0xffff     => (major << 5) | 25, u16 big-endian
//!   v <= 0xffffffff => (major << 5) | 26, u32 big-endian
//!   otherwise       => (major << 5) | 27, u64 big-endian
//! ```
//!
//! The element count in the array head makes encodings prefix-free; the shortest-form
//! rule makes them injective. These bytes are part of every leaf hash preimage, so any
//! change here invalidates every root ever committed.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of the path encoding scheme.
pub const PATH_ENCODING_VERSION: &str = "cbor-uint-array-v1";

const MAJOR_UINT: u8 = 0;
const MAJOR_ARRAY: u8 = 4;

/// Path decoding / parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathCodecError {
    /// Input ended inside a head or before all elements were read.
    #[error("truncated path encoding")]
    Truncated,
    /// A head carried an unexpected CBOR major type.
    #[error("unexpected major type {0}")]
    MajorType(u8),
    /// Additional-info value not valid for an unsigned head (28..=31).
    #[error("unsupported additional info {0}")]
    AdditionalInfo(u8),
    /// An integer was not written in its shortest form.
    #[error("non-minimal integer encoding")]
    NonMinimal,
    /// Bytes remain after the declared number of elements.
    #[error("trailing bytes after path")]
    TrailingBytes,
    /// Text form is not a dot-separated list of integers.
    #[error("invalid path text {0:?}")]
    Text(String),
}

/// Ordered sequence of integers addressing one field.
///
/// Grammar for leaf paths: `[tag]`, `[group, index, tag]`,
/// `[group, index, nested_group, nested_index, tag]`, and so on.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(pub Vec<u64>);

impl Path {
    /// Empty path (the root map).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Borrow the integer segments.
    pub fn segments(&self) -> &[u64] {
        &self.0
    }

    /// Return a new path with `seg` appended.
    pub fn child(&self, seg: u64) -> Self {
        let mut v = Vec::with_capacity(self.0.len() + 1);
        v.extend_from_slice(&self.0);
        v.push(seg);
        Self(v)
    }

    /// True for paths that can address a scalar leaf (odd, non-zero length).
    pub fn is_leaf_shape(&self) -> bool {
        self.0.len() % 2 == 1
    }

    /// Wire encoding of this path.
    pub fn encode(&self) -> Vec<u8> {
        encode_path(&self.0)
    }
}

impl From<Vec<u64>> for Path {
    fn from(v: Vec<u64>) -> Self {
        Self(v)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathCodecError;

    /// Parse `454.0.455` (also accepts `454/0/455` and `[454,0,455]`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let t = t
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .unwrap_or(t);
        if t.is_empty() {
            return Err(PathCodecError::Text(s.to_string()));
        }
        t.split(['.', '/', ','])
            .map(|p| {
                p.trim()
                    .parse::<u64>()
                    .map_err(|_| PathCodecError::Text(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

fn push_head(out: &mut Vec<u8>, major: u8, v: u64) {
    let m = major << 5;
    if v < 24 {
        out.push(m | v as u8);
    } else if v <= u8::MAX as u64 {
        out.push(m | 24);
        out.push(v as u8);
    } else if v <= u16::MAX as u64 {
        out.push(m | 25);
        out.extend_from_slice(&(v as u16).to_be_bytes());
    } else if v <= u32::MAX as u64 {
        out.push(m | 26);
        out.extend_from_slice(&(v as u32).to_be_bytes());
    } else {
        out.push(m | 27);
        out.extend_from_slice(&v.to_be_bytes());
    }
}

/// Encode a path with `cbor-uint-array-v1`.
pub fn encode_path(segments: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + segments.len() * 3);
    push_head(&mut out, MAJOR_ARRAY, segments.len() as u64);
    for &s in segments {
        push_head(&mut out, MAJOR_UINT, s);
    }
    out
}

fn read_head(bytes: &[u8], pos: &mut usize, major: u8) -> Result<u64, PathCodecError> {
    let b = *bytes.get(*pos).ok_or(PathCodecError::Truncated)?;
    *pos += 1;
    if b >> 5 != major {
        return Err(PathCodecError::MajorType(b >> 5));
    }
    let info = b & 0x1f;
    let (width, min) = match info {
        0..=23 => return Ok(info as u64),
        24 => (1usize, 24u64),
        25 => (2, u8::MAX as u64 + 1),
        26 => (4, u16::MAX as u64 + 1),
        27 => (8, u32::MAX as u64 + 1),
        other => return Err(PathCodecError::AdditionalInfo(other)),
    };
    let end = pos.checked_add(width).ok_or(PathCodecError::Truncated)?;
    let raw = bytes.get(*pos..end).ok_or(PathCodecError::Truncated)?;
    *pos = end;
    let mut buf = [0u8; 8];
    buf[8 - width..].copy_from_slice(raw);
    let v = u64::from_be_bytes(buf);
    if v < min {
        return Err(PathCodecError::NonMinimal);
    }
    Ok(v)
}

/// Decode a `cbor-uint-array-v1` path, accepting only the canonical form.
pub fn decode_path(bytes: &[u8]) -> Result<Path, PathCodecError> {
    let mut pos = 0usize;
    let n = read_head(bytes, &mut pos, MAJOR_ARRAY)?;
    // Every element needs at least one byte, which bounds the allocation.
    if n > (bytes.len() - pos) as u64 {
        return Err(PathCodecError::Truncated);
    }
    let mut segs = Vec::with_capacity(n as usize);
    for _ in 0..n {
        segs.push(read_head(bytes, &mut pos, MAJOR_UINT)?);
    }
    if pos != bytes.len() {
        return Err(PathCodecError::TrailingBytes);
    }
    Ok(Path(segs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_encodings() {
        assert_eq!(hex::encode(encode_path(&[15])), "810f");
        assert_eq!(hex::encode(encode_path(&[223])), "8118df");
        assert_eq!(hex::encode(encode_path(&[454, 0, 455])), "831901c6001901c7");
        assert_eq!(hex::encode(encode_path(&[23, 24])), "82171818");
        assert_eq!(hex::encode(encode_path(&[65_536])), "811a00010000");
        assert_eq!(
            hex::encode(encode_path(&[u64::MAX])),
            "811bffffffffffffffff"
        );
        assert_eq!(hex::encode(encode_path(&[])), "80");
    }

    #[test]
    fn decode_inverts_encode_at_width_boundaries() {
        for v in [0u64, 23, 24, 255, 256, 65_535, 65_536, u32::MAX as u64, u32::MAX as u64 + 1, u64::MAX] {
            let p = Path(vec![v, 0, v]);
            assert_eq!(decode_path(&p.encode()).unwrap(), p);
        }
    }

    #[test]
    fn decode_rejects_non_canonical_forms() {
        // 15 written with a one-byte argument
        assert_eq!(decode_path(&[0x81, 0x18, 0x0f]), Err(PathCodecError::NonMinimal));
        // 255 written with a two-byte argument
        assert_eq!(
            decode_path(&[0x81, 0x19, 0x00, 0xff]),
            Err(PathCodecError::NonMinimal)
        );
        assert_eq!(decode_path(&[0x81, 0x0f, 0x00]), Err(PathCodecError::TrailingBytes));
        assert_eq!(decode_path(&[0x82, 0x0f]), Err(PathCodecError::Truncated));
        assert_eq!(decode_path(&[0x81, 0x19, 0x01]), Err(PathCodecError::Truncated));
        assert_eq!(decode_path(&[0x81, 0x20]), Err(PathCodecError::MajorType(1)));
        assert_eq!(decode_path(&[0x0f]), Err(PathCodecError::MajorType(0)));
        assert_eq!(decode_path(&[0x81, 0x1c]), Err(PathCodecError::AdditionalInfo(28)));
        assert_eq!(decode_path(&[]), Err(PathCodecError::Truncated));
    }

    #[test]
    fn text_form_round_trips() {
        let p: Path = "454.0.455".parse().unwrap();
        assert_eq!(p, Path(vec![454, 0, 455]));
        assert_eq!(p.to_string(), "454.0.455");
        assert_eq!("[454, 0, 455]".parse::<Path>().unwrap(), p);
        assert_eq!("454/0/455".parse::<Path>().unwrap(), p);
        assert!("454..455".parse::<Path>().is_err());
        assert!("-1".parse::<Path>().is_err());
        assert!("".parse::<Path>().is_err());
        assert_eq!(Path::root().to_string(), "<root>");
    }

    #[test]
    fn leaf_shape() {
        assert!(Path(vec![15]).is_leaf_shape());
        assert!(Path(vec![454, 0, 455]).is_leaf_shape());
        assert!(!Path(vec![454, 0]).is_leaf_shape());
        assert!(!Path::root().is_leaf_shape());
    }
}
