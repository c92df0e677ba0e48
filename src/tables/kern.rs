// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The legacy `kern` table, format 0 only (a sorted list of glyph-pair
//! kerning values). Grounded on `servo-pathfinder/src/otf/kern.rs`.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_KERN;

bitflags::bitflags! {
    pub struct SubtableCoverage: u8 {
        const HORIZONTAL = 1 << 0;
        const MINIMUM = 1 << 1;
        const CROSS_STREAM = 1 << 2;
        const OVERRIDE = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernPair {
    pub left: u16,
    pub right: u16,
    pub value: i16,
}

#[derive(Clone, Debug)]
pub struct KernTable {
    pairs: Vec<KernPair>,
}

impl KernTable {
    pub fn parse(reader: &mut Reader) -> Result<KernTable> {
        let version = reader.u16()?;
        if version != 0 {
            return Err(FontError::invalid_table(TAG_KERN, "unsupported version"));
        }
        let num_tables = reader.u16()?;
        let mut pairs = Vec::new();

        for _ in 0..num_tables {
            let _sub_version = reader.u16()?;
            let length = reader.u16()?;
            let coverage = reader.u16()?;
            let format = coverage >> 8;
            let sub_start = reader.position();

            if format == 0 {
                let num_pairs = reader.u16()?;
                reader.advance(6)?; // searchRange/entrySelector/rangeShift
                for _ in 0..num_pairs {
                    pairs.push(KernPair {
                        left: reader.u16()?,
                        right: reader.u16()?,
                        value: reader.i16()?,
                    });
                }
            }

            let consumed = reader.position() - sub_start + 6;
            if (length as usize) > consumed {
                reader.advance(length as usize - consumed)?;
            }
        }

        Ok(KernTable { pairs })
    }

    pub fn lookup(&self, left: u16, right: u16) -> Option<i16> {
        self.pairs
            .binary_search_by(|pair| (pair.left, pair.right).cmp(&(left, right)))
            .ok()
            .map(|index| self.pairs[index].value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format0_pairs() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_be_bytes()); // version
        data.extend_from_slice(&1u16.to_be_bytes()); // numTables
        data.extend_from_slice(&0u16.to_be_bytes()); // subVersion
        data.extend_from_slice(&(14 + 6u16).to_be_bytes()); // length
        data.extend_from_slice(&0u16.to_be_bytes()); // coverage: format 0
        data.extend_from_slice(&1u16.to_be_bytes()); // nPairs
        data.extend_from_slice(&[0u8; 6]); // searchRange etc
        data.extend_from_slice(&3u16.to_be_bytes()); // left
        data.extend_from_slice(&5u16.to_be_bytes()); // right
        data.extend_from_slice(&(-10i16).to_be_bytes()); // value

        let mut reader = Reader::new(&data);
        let kern = KernTable::parse(&mut reader).unwrap();
        assert_eq!(kern.lookup(3, 5), Some(-10));
        assert_eq!(kern.lookup(1, 1), None);
    }
}
