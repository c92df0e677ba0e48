// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Glyph outline providers: the two ways an sfnt font stores vector glyph
//! data. Both end up at the same `Outline`/`PathCommand` shape so the MSDF
//! rasterizer never needs to know which one produced it.

pub mod cff;
pub mod glyf;
pub mod loca;
pub mod path;

use crate::error::{FontError, Result};
use crate::outline::path::Outline;
use crate::reader::Reader;
use crate::tables::head::HeadTable;
use crate::tables::TAG_GLYF;

/// Either outline source a parsed font can use, selected by `sfntVersion`.
pub enum OutlineSource<'a> {
    TrueType { glyf: Reader<'a>, loca: loca::LocaTable },
    Cff(cff::CffTable<'a>),
}

impl<'a> OutlineSource<'a> {
    pub fn truetype(glyf: Reader<'a>, loca_reader: &mut Reader<'a>, head: &HeadTable, num_glyphs: u16) -> Result<OutlineSource<'a>> {
        let loca = loca::LocaTable::parse(loca_reader, head.index_to_loc_format, num_glyphs)?;
        Ok(OutlineSource::TrueType { glyf, loca })
    }

    pub fn cff(table: Reader<'a>) -> Result<OutlineSource<'a>> {
        Ok(OutlineSource::Cff(cff::CffTable::parse(table)?))
    }

    pub fn outline_for_glyph(&self, glyph_id: u16) -> Result<Outline> {
        match self {
            OutlineSource::TrueType { glyf, loca } => {
                glyf::outline_for_glyph(glyf, loca, glyph_id).map_err(|e| match e {
                    FontError::UnexpectedEndOfData { .. } => {
                        FontError::invalid_table(TAG_GLYF, "truncated glyph data")
                    }
                    other => other,
                })
            }
            OutlineSource::Cff(cff) => cff.outline_for_glyph(glyph_id),
        }
    }
}
