// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The 63-entry "known tag" table a WOFF2 table-directory flag byte indexes
//! into (index 63 means "tag follows explicitly"). Grounded on
//! `nicoburns-wuff/src/table_tags.rs`'s `kKnownTags`.

use crate::error::Tag;
use crate::tag;

pub const KNOWN_TAGS: [Tag; 63] = [
    tag!(b'c', b'm', b'a', b'p'),
    tag!(b'h', b'e', b'a', b'd'),
    tag!(b'h', b'h', b'e', b'a'),
    tag!(b'h', b'm', b't', b'x'),
    tag!(b'm', b'a', b'x', b'p'),
    tag!(b'n', b'a', b'm', b'e'),
    tag!(b'O', b'S', b'/', b'2'),
    tag!(b'p', b'o', b's', b't'),
    tag!(b'c', b'v', b't', b' '),
    tag!(b'f', b'p', b'g', b'm'),
    tag!(b'g', b'l', b'y', b'f'),
    tag!(b'l', b'o', b'c', b'a'),
    tag!(b'p', b'r', b'e', b'p'),
    tag!(b'C', b'F', b'F', b' '),
    tag!(b'V', b'O', b'R', b'G'),
    tag!(b'E', b'B', b'D', b'T'),
    tag!(b'E', b'B', b'L', b'C'),
    tag!(b'g', b'a', b's', b'p'),
    tag!(b'h', b'd', b'm', b'x'),
    tag!(b'k', b'e', b'r', b'n'),
    tag!(b'L', b'T', b'S', b'H'),
    tag!(b'P', b'C', b'L', b'T'),
    tag!(b'V', b'D', b'M', b'X'),
    tag!(b'v', b'h', b'e', b'a'),
    tag!(b'v', b'm', b't', b'x'),
    tag!(b'B', b'A', b'S', b'E'),
    tag!(b'G', b'D', b'E', b'F'),
    tag!(b'G', b'P', b'O', b'S'),
    tag!(b'G', b'S', b'U', b'B'),
    tag!(b'E', b'B', b'S', b'C'),
    tag!(b'J', b'S', b'T', b'F'),
    tag!(b'M', b'A', b'T', b'H'),
    tag!(b'C', b'B', b'D', b'T'),
    tag!(b'C', b'B', b'L', b'C'),
    tag!(b'C', b'O', b'L', b'R'),
    tag!(b'C', b'P', b'A', b'L'),
    tag!(b'S', b'V', b'G', b' '),
    tag!(b's', b'b', b'i', b'x'),
    tag!(b'a', b'c', b'n', b't'),
    tag!(b'a', b'v', b'a', b'r'),
    tag!(b'b', b'd', b'a', b't'),
    tag!(b'b', b'l', b'o', b'c'),
    tag!(b'b', b's', b'l', b'n'),
    tag!(b'c', b'v', b'a', b'r'),
    tag!(b'f', b'd', b's', b'c'),
    tag!(b'f', b'e', b'a', b't'),
    tag!(b'f', b'm', b't', b'x'),
    tag!(b'f', b'v', b'a', b'r'),
    tag!(b'g', b'v', b'a', b'r'),
    tag!(b'h', b's', b't', b'y'),
    tag!(b'j', b'u', b's', b't'),
    tag!(b'l', b'c', b'a', b'r'),
    tag!(b'm', b'o', b'r', b't'),
    tag!(b'm', b'o', b'r', b'x'),
    tag!(b'o', b'p', b'b', b'd'),
    tag!(b'p', b'r', b'o', b'p'),
    tag!(b't', b'r', b'a', b'k'),
    tag!(b'Z', b'a', b'p', b'f'),
    tag!(b'S', b'i', b'l', b'f'),
    tag!(b'G', b'l', b'a', b't'),
    tag!(b'G', b'l', b'o', b'c'),
    tag!(b'F', b'e', b'a', b't'),
    tag!(b'S', b'i', b'l', b'l'),
];
