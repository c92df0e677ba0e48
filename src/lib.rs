// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A zero-copy sfnt/TrueType/OpenType/WOFF2 font reader, glyph outline
//! extractor, and CPU-side multi-channel signed-distance-field atlas
//! builder.
//!
//! `Font::load` borrows a raw sfnt or TrueType Collection buffer directly.
//! WOFF2 input decodes to an owned sfnt buffer first, via [`woff2::decode`];
//! call that, then `Font::load` on its output:
//!
//! ```no_run
//! # fn example(woff2_bytes: &[u8]) -> fontengine::error::Result<()> {
//! let sfnt_bytes = fontengine::woff2::decode(woff2_bytes)?;
//! let font = fontengine::Font::load(&sfnt_bytes)?;
//! # let _ = font;
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod error;
pub mod msdf;
pub mod outline;
pub mod reader;
pub mod sfnt;
pub mod tables;
pub mod woff2;

use log::debug;

use error::{FontError, Result, Tag};
use outline::path::Outline;
use outline::OutlineSource;
use sfnt::{FontCollection, FontDirectory};
use tables::cmap::CmapTable;
use tables::head::HeadTable;
use tables::hhea::HheaTable;
use tables::hmtx::{HmtxTable, LongHorMetric};
use tables::maxp::MaxpTable;
use tables::{TAG_CFF, TAG_CMAP, TAG_GLYF, TAG_HEAD, TAG_HHEA, TAG_HMTX, TAG_LOCA, TAG_MAXP};

/// A single parsed font, borrowing its sfnt bytes and holding the subset
/// of tables needed to extract glyph outlines and metrics.
///
/// For WOFF2 input, decode with [`woff2::decode`] first and load the
/// resulting sfnt bytes.
pub struct Font<'a> {
    directory_buffer: &'a [u8],
    pub head: HeadTable,
    pub hhea: HheaTable,
    pub maxp: MaxpTable,
    hmtx: HmtxTable,
    cmap: Option<CmapTable<'a>>,
    outline_source: OutlineSourceOwner,
}

/// Which table `Font::outline_for_glyph` should re-parse a fresh
/// `OutlineSource` from; kept separate from a borrowed `OutlineSource`
/// itself so `Font` doesn't need to self-reference `directory_buffer`.
enum OutlineSourceOwner {
    TrueType,
    Cff,
}

impl<'a> Font<'a> {
    /// Loads a font from `data`, a raw sfnt or TrueType Collection buffer.
    pub fn load(data: &'a [u8]) -> Result<Font<'a>> {
        let directory = if FontCollection::is_collection(data) {
            let collection = FontCollection::parse(data)?;
            collection.font_directory(0)?
        } else {
            FontDirectory::parse(data)?
        };

        let head = HeadTable::parse(&mut directory.require_table_reader(TAG_HEAD)?)?;
        let hhea = HheaTable::parse(&mut directory.require_table_reader(TAG_HHEA)?)?;
        let maxp = MaxpTable::parse(&mut directory.require_table_reader(TAG_MAXP)?)?;
        let hmtx = HmtxTable::parse(
            &mut directory.require_table_reader(TAG_HMTX)?,
            hhea.num_h_metrics,
            maxp.num_glyphs,
        )?;
        let cmap = match directory.table_reader(TAG_CMAP) {
            Some(reader) => Some(CmapTable::parse(reader)?),
            None => None,
        };

        let outline_source = if directory.has_table(TAG_GLYF) {
            OutlineSourceOwner::TrueType
        } else if directory.has_table(TAG_CFF) {
            OutlineSourceOwner::Cff
        } else {
            return Err(FontError::InvalidContainer { what: "font has no glyf or CFF outlines" });
        };

        debug!("loaded font: {} glyphs, unitsPerEm {}", maxp.num_glyphs, head.units_per_em);

        Ok(Font {
            directory_buffer: directory.buffer(),
            head,
            hhea,
            maxp,
            hmtx,
            cmap,
            outline_source,
        })
    }

    /// Looks up a glyph ID for a Unicode code point via the font's best
    /// available `cmap` subtable.
    pub fn glyph_for_char(&self, code_point: char) -> Option<u16> {
        let subtable = self.cmap.as_ref()?.best_subtable().ok().flatten()?;
        subtable.lookup(code_point as u32)
    }

    /// Advance width and left side bearing for `glyph_id`.
    pub fn metric_for(&self, glyph_id: u16) -> Option<LongHorMetric> {
        self.hmtx.metric_for(glyph_id)
    }

    /// Whether the font carries a table with this tag, without parsing its
    /// contents. Lets a caller detect layout/variation collaborator tables
    /// (`GDEF`, `BASE`, `JSTF`, `avar`, `gvar`, `MVAR`, ...) this crate
    /// doesn't itself interpret, and hand them to a collaborator.
    pub fn has_table(&self, tag: Tag) -> bool {
        FontDirectory::parse(self.directory_buffer).map(|d| d.has_table(tag)).unwrap_or(false)
    }

    /// The glyph outline for `glyph_id`, in font design units.
    pub fn outline_for_glyph(&self, glyph_id: u16) -> Result<Outline> {
        let directory = FontDirectory::parse(self.directory_buffer)?;
        let source = match self.outline_source {
            OutlineSourceOwner::TrueType => {
                let glyf = directory.require_table_reader(TAG_GLYF)?;
                let mut loca_reader = directory.require_table_reader(TAG_LOCA)?;
                OutlineSource::truetype(glyf, &mut loca_reader, &self.head, self.maxp.num_glyphs)?
            }
            OutlineSourceOwner::Cff => {
                let cff = directory.require_table_reader(TAG_CFF)?;
                OutlineSource::cff(cff)?
            }
        };
        source.outline_for_glyph(glyph_id)
    }

    /// Builds an MSDF atlas over `glyph_ids`, in the order given.
    pub fn build_atlas(&self, glyph_ids: &[u16], config: &msdf::AtlasConfig) -> Result<msdf::GlyphAtlas> {
        let mut inputs = Vec::with_capacity(glyph_ids.len());
        for &glyph_id in glyph_ids {
            let outline = self.outline_for_glyph(glyph_id)?;
            let metric = self.metric_for(glyph_id).unwrap_or(LongHorMetric { advance_width: 0, lsb: 0 });
            inputs.push(msdf::GlyphInput {
                glyph_id,
                outline,
                advance_width: metric.advance_width,
                left_side_bearing: metric.lsb,
            });
        }
        msdf::build_atlas(&inputs, &self.head, config)
    }
}

pub use error::FontError as Error;
pub type FontResult<T> = Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_truncated_input() {
        let data = [0u8; 2];
        assert!(Font::load(&data).is_err());
    }
}
