// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `loca` table: per-glyph byte offsets into `glyf`. Grounded on
//! `servo-pathfinder/src/otf/loca.rs`, generalized to both the short
//! (`indexToLocFormat == 0`, offsets stored halved) and long formats.

use crate::error::Result;
use crate::reader::Reader;
use crate::tables::head::IndexToLocFormat;

#[derive(Clone, Debug)]
pub struct LocaTable {
    offsets: Vec<u32>,
}

impl LocaTable {
    pub fn parse(reader: &mut Reader, format: IndexToLocFormat, num_glyphs: u16) -> Result<LocaTable> {
        let count = num_glyphs as usize + 1;
        let mut offsets = Vec::with_capacity(count);
        match format {
            IndexToLocFormat::Short => {
                for _ in 0..count {
                    offsets.push(reader.u16()? as u32 * 2);
                }
            }
            IndexToLocFormat::Long => {
                for _ in 0..count {
                    offsets.push(reader.u32()?);
                }
            }
        }
        Ok(LocaTable { offsets })
    }

    /// The `[start, end)` byte range of `glyph_id` within `glyf`, or `None`
    /// if the glyph has no outline (an empty range, e.g. the space glyph).
    pub fn glyph_range(&self, glyph_id: u16) -> Option<(u32, u32)> {
        let index = glyph_id as usize;
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        if end <= start {
            None
        } else {
            Some((start, end))
        }
    }
}
