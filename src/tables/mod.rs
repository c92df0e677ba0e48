// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Table-tag constants and the per-table parsers.
//!
//! Tag constants were hand bit-shifted in the teacher
//! (`servo-pathfinder/src/otf/mod.rs`: `const CFF: u32 = ((b'C' as u32) << 24)
//! | ...`); we keep the same set of named constants but build them through
//! the `tag!` macro and the typed `Tag` wrapper instead of raw `u32`s.

pub mod cmap;
pub mod fvar;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod kern;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

use crate::error::Tag;
use crate::tag;

pub const TAG_HEAD: Tag = tag!(b'h', b'e', b'a', b'd');
pub const TAG_MAXP: Tag = tag!(b'm', b'a', b'x', b'p');
pub const TAG_HHEA: Tag = tag!(b'h', b'h', b'e', b'a');
pub const TAG_HMTX: Tag = tag!(b'h', b'm', b't', b'x');
pub const TAG_CMAP: Tag = tag!(b'c', b'm', b'a', b'p');
pub const TAG_NAME: Tag = tag!(b'n', b'a', b'm', b'e');
pub const TAG_POST: Tag = tag!(b'p', b'o', b's', b't');
pub const TAG_KERN: Tag = tag!(b'k', b'e', b'r', b'n');
pub const TAG_OS2: Tag = tag!(b'O', b'S', b'/', b'2');
pub const TAG_CFF: Tag = tag!(b'C', b'F', b'F', b' ');
pub const TAG_GLYF: Tag = tag!(b'g', b'l', b'y', b'f');
pub const TAG_LOCA: Tag = tag!(b'l', b'o', b'c', b'a');
pub const TAG_FVAR: Tag = tag!(b'f', b'v', b'a', b'r');
pub const TAG_AVAR: Tag = tag!(b'a', b'v', b'a', b'r');
pub const TAG_GVAR: Tag = tag!(b'g', b'v', b'a', b'r');
pub const TAG_MVAR: Tag = tag!(b'M', b'V', b'A', b'R');
pub const TAG_GDEF: Tag = tag!(b'G', b'D', b'E', b'F');
pub const TAG_BASE: Tag = tag!(b'B', b'A', b'S', b'E');
pub const TAG_JSTF: Tag = tag!(b'J', b'S', b'T', b'F');
pub const TAG_FPGM: Tag = tag!(b'f', b'p', b'g', b'm');
pub const TAG_PREP: Tag = tag!(b'p', b'r', b'e', b'p');
pub const TAG_CVT: Tag = tag!(b'c', b'v', b't', b' ');
pub const TAG_DSIG: Tag = tag!(b'D', b'S', b'I', b'G');
