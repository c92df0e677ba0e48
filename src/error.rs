// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The structured error taxonomy shared by every parser in the crate.
//!
//! Parsing errors are never recovered from inside the core: each parser
//! either returns a fully formed table or surfaces the first `FontError` it
//! hits. Partially populated structures are never returned.

use std::fmt;

/// Every way a font load or atlas build can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FontError {
    /// A read would have crossed the end of the reader's bounded range.
    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEndOfData { needed: usize, available: usize },

    /// The sfnt/WOFF2/TTC container header failed validation.
    #[error("invalid container: {what}")]
    InvalidContainer { what: &'static str },

    /// A required invariant inside a specific table failed.
    #[error("invalid {tag} table: {reason}")]
    InvalidTable { tag: Tag, reason: &'static str },

    /// A WOFF2 variable-length integer was malformed.
    #[error("variable-length overflow decoding {encoding}")]
    VariableLengthOverflow { encoding: &'static str },

    /// Brotli decompression reported failure.
    #[error("brotli decompression failed: {0}")]
    CompressionFailure(String),

    /// A CFF CharString used an operator this interpreter doesn't implement.
    #[error("unimplemented CFF CharString operator {operator:#x}")]
    UnimplementedCffOperator { operator: u16 },
}

impl FontError {
    #[inline]
    pub(crate) fn eof(needed: usize, available: usize) -> FontError {
        FontError::UnexpectedEndOfData { needed, available }
    }

    #[inline]
    pub(crate) fn invalid_table(tag: Tag, reason: &'static str) -> FontError {
        FontError::InvalidTable { tag, reason }
    }
}

pub type Result<T> = std::result::Result<T, FontError>;

/// A 4-byte big-endian–packed sfnt tag (e.g. `cmap`, `glyf`).
///
/// Canonical rendering uses the raw bytes, so space-padded tags such as
/// `b"OS/2"` or `b"CFF "` retain their trailing spaces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Tag {
        Tag(((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32))
    }

    #[inline]
    pub const fn from_be_u32(value: u32) -> Tag {
        Tag(value)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [
            (self.0 >> 24) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        ]
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.to_bytes();
        match std::str::from_utf8(&bytes) {
            Ok(s) => write!(f, "Tag({:?})", s),
            Err(_) => write!(f, "Tag({:#010x})", self.0),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.to_bytes();
        match std::str::from_utf8(&bytes) {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "{:#010x}", self.0),
        }
    }
}

/// Shorthand for building a `Tag` from a 4-byte ASCII literal at compile time.
#[macro_export]
macro_rules! tag {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        $crate::error::Tag::from_bytes([$a, $b, $c, $d])
    };
}
