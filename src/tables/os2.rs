// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `OS/2` table, grounded on `servo-pathfinder/src/otf/os_2.rs`. Only
//! the fields present in every version (0 through 5) are parsed; the
//! version-gated tail (version 1's code-page ranges, versions 2-5's x-height
//! and cap-height) is read when present and left absent otherwise, rather
//! than erroring out on older fonts.

use crate::error::Result;
use crate::reader::Reader;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Os2Table {
    pub version: u16,
    pub avg_char_width: i16,
    pub weight_class: u16,
    pub width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub family_class: i16,
    pub panose: [u8; 10],
    pub unicode_range: [u32; 4],
    pub ach_vend_id: [u8; 4],
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
}

impl Os2Table {
    pub fn parse(reader: &mut Reader) -> Result<Os2Table> {
        let version = reader.u16()?;
        let avg_char_width = reader.i16()?;
        let weight_class = reader.u16()?;
        let width_class = reader.u16()?;
        let fs_type = reader.u16()?;
        let y_subscript_x_size = reader.i16()?;
        let y_subscript_y_size = reader.i16()?;
        let y_subscript_x_offset = reader.i16()?;
        let y_subscript_y_offset = reader.i16()?;
        let _ = y_subscript_x_offset;
        let _ = y_subscript_y_offset;
        let y_superscript_x_size = reader.i16()?;
        let y_superscript_y_size = reader.i16()?;
        let _y_superscript_x_offset = reader.i16()?;
        let _y_superscript_y_offset = reader.i16()?;
        let y_strikeout_size = reader.i16()?;
        let y_strikeout_position = reader.i16()?;
        let family_class = reader.i16()?;
        let mut panose = [0u8; 10];
        for slot in panose.iter_mut() {
            *slot = reader.u8()?;
        }
        let mut unicode_range = [0u32; 4];
        for slot in unicode_range.iter_mut() {
            *slot = reader.u32()?;
        }
        let mut ach_vend_id = [0u8; 4];
        for slot in ach_vend_id.iter_mut() {
            *slot = reader.u8()?;
        }
        let fs_selection = reader.u16()?;
        let us_first_char_index = reader.u16()?;
        let us_last_char_index = reader.u16()?;
        let s_typo_ascender = reader.i16()?;
        let s_typo_descender = reader.i16()?;
        let s_typo_line_gap = reader.i16()?;
        let us_win_ascent = reader.u16()?;
        let us_win_descent = reader.u16()?;

        let mut x_height = None;
        let mut cap_height = None;
        if version >= 1 {
            reader.advance(8)?; // ulCodePageRange1/2
        }
        if version >= 2 {
            x_height = Some(reader.i16()?);
            cap_height = Some(reader.i16()?);
            reader.advance(2)?; // usDefaultChar
            reader.advance(2)?; // usBreakChar
            reader.advance(2)?; // usMaxContext
        }

        Ok(Os2Table {
            version,
            avg_char_width,
            weight_class,
            width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_superscript_x_size,
            y_superscript_y_size,
            y_strikeout_size,
            y_strikeout_position,
            family_class,
            panose,
            unicode_range,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            x_height,
            cap_height,
        })
    }
}
