// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `maxp` table. Version 0.5 (CFF outlines) carries only `numGlyphs`;
//! version 1.0 (TrueType outlines) adds the hinting-interpreter limits.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_MAXP;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaxpTable {
    pub num_glyphs: u16,
    pub version_1: Option<MaxpVersion1>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaxpVersion1 {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_component_points: u16,
    pub max_component_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl MaxpTable {
    pub fn parse(reader: &mut Reader) -> Result<MaxpTable> {
        let version = reader.fixed()?;
        let num_glyphs = reader.u16()?;
        if (version - 0.5).abs() < 1e-6 {
            return Ok(MaxpTable { num_glyphs, version_1: None });
        }
        if (version - 1.0).abs() >= 1e-6 {
            return Err(FontError::invalid_table(TAG_MAXP, "unsupported version"));
        }
        let version_1 = MaxpVersion1 {
            max_points: reader.u16()?,
            max_contours: reader.u16()?,
            max_component_points: reader.u16()?,
            max_component_contours: reader.u16()?,
            max_zones: reader.u16()?,
            max_twilight_points: reader.u16()?,
            max_storage: reader.u16()?,
            max_function_defs: reader.u16()?,
            max_instruction_defs: reader.u16()?,
            max_stack_elements: reader.u16()?,
            max_size_of_instructions: reader.u16()?,
            max_component_elements: reader.u16()?,
            max_component_depth: reader.u16()?,
        };
        Ok(MaxpTable { num_glyphs, version_1: Some(version_1) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cff_style_maxp() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0000_8000u32.to_be_bytes());
        data.extend_from_slice(&42u16.to_be_bytes());
        let mut reader = Reader::new(&data);
        let maxp = MaxpTable::parse(&mut reader).unwrap();
        assert_eq!(maxp.num_glyphs, 42);
        assert!(maxp.version_1.is_none());
    }
}
