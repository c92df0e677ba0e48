// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `head` table: font-wide metrics and the magic number every sfnt
//! decoder checks first. Grounded on `servo-pathfinder/src/otf/head.rs`.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_HEAD;

pub const MAGIC_NUMBER: u32 = 0x5F0F_3CF5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndexToLocFormat {
    Short,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: f32,
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: IndexToLocFormat,
    pub glyph_data_format: i16,
}

impl HeadTable {
    pub fn parse(reader: &mut Reader) -> Result<HeadTable> {
        let major_version = reader.u16()?;
        let minor_version = reader.u16()?;
        if major_version != 1 || minor_version != 0 {
            return Err(FontError::invalid_table(TAG_HEAD, "unsupported version"));
        }
        let font_revision = reader.fixed()?;
        let checksum_adjustment = reader.u32()?;
        let magic_number = reader.u32()?;
        if magic_number != MAGIC_NUMBER {
            return Err(FontError::invalid_table(TAG_HEAD, "bad magic number"));
        }
        let flags = reader.u16()?;
        let units_per_em = reader.u16()?;
        if units_per_em == 0 {
            return Err(FontError::invalid_table(TAG_HEAD, "unitsPerEm is zero"));
        }
        let created = reader.long_date_time()?;
        let modified = reader.long_date_time()?;
        let x_min = reader.i16()?;
        let y_min = reader.i16()?;
        let x_max = reader.i16()?;
        let y_max = reader.i16()?;
        let mac_style = reader.u16()?;
        let lowest_rec_ppem = reader.u16()?;
        let font_direction_hint = reader.i16()?;
        let index_to_loc_format = match reader.i16()? {
            0 => IndexToLocFormat::Short,
            1 => IndexToLocFormat::Long,
            _ => return Err(FontError::invalid_table(TAG_HEAD, "bad indexToLocFormat")),
        };
        let glyph_data_format = reader.i16()?;

        Ok(HeadTable {
            major_version,
            minor_version,
            font_revision,
            checksum_adjustment,
            magic_number,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&0x0001_0000i32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&MAGIC_NUMBER.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&1000u16.to_be_bytes());
        data.extend_from_slice(&0i64.to_be_bytes());
        data.extend_from_slice(&0i64.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&1000i16.to_be_bytes());
        data.extend_from_slice(&1000i16.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&9u16.to_be_bytes());
        data.extend_from_slice(&2i16.to_be_bytes());
        data.extend_from_slice(&1i16.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data
    }

    #[test]
    fn parses_minimal_head() {
        let data = build();
        let mut reader = Reader::new(&data);
        let head = HeadTable::parse(&mut reader).unwrap();
        assert_eq!(head.units_per_em, 1000);
        assert_eq!(head.index_to_loc_format, IndexToLocFormat::Long);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = build();
        data[8..12].copy_from_slice(&0u32.to_be_bytes());
        let mut reader = Reader::new(&data);
        assert!(matches!(
            HeadTable::parse(&mut reader),
            Err(FontError::InvalidTable { .. })
        ));
    }
}
