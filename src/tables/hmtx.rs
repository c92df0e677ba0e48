// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `hmtx` table: per-glyph advance widths and left side bearings.
//! Grounded on `servo-pathfinder/src/otf/hmtx.rs`, generalized to expose
//! random-access lookup instead of only a full-table scan.

use crate::error::Result;
use crate::reader::Reader;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

#[derive(Clone, Debug)]
pub struct HmtxTable {
    h_metrics: Vec<LongHorMetric>,
    left_side_bearings: Vec<i16>,
}

impl HmtxTable {
    pub fn parse(reader: &mut Reader, num_h_metrics: u16, num_glyphs: u16) -> Result<HmtxTable> {
        let mut h_metrics = Vec::with_capacity(num_h_metrics as usize);
        for _ in 0..num_h_metrics {
            h_metrics.push(LongHorMetric {
                advance_width: reader.u16()?,
                lsb: reader.i16()?,
            });
        }
        let remaining_glyphs = num_glyphs.saturating_sub(num_h_metrics);
        let mut left_side_bearings = Vec::with_capacity(remaining_glyphs as usize);
        for _ in 0..remaining_glyphs {
            left_side_bearings.push(reader.i16()?);
        }
        Ok(HmtxTable { h_metrics, left_side_bearings })
    }

    /// Advance width and left side bearing for `glyph_id`, following the
    /// sfnt convention that glyphs past the last `hMetrics` entry repeat its
    /// advance width.
    pub fn metric_for(&self, glyph_id: u16) -> Option<LongHorMetric> {
        if self.h_metrics.is_empty() {
            return None;
        }
        let glyph_id = glyph_id as usize;
        if glyph_id < self.h_metrics.len() {
            return Some(self.h_metrics[glyph_id]);
        }
        let last_advance = self.h_metrics.last().unwrap().advance_width;
        let extra_index = glyph_id - self.h_metrics.len();
        self.left_side_bearings.get(extra_index).map(|&lsb| LongHorMetric {
            advance_width: last_advance,
            lsb,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_glyphs_reuse_last_advance_width() {
        let mut data = Vec::new();
        data.extend_from_slice(&500u16.to_be_bytes());
        data.extend_from_slice(&10i16.to_be_bytes());
        data.extend_from_slice(&20i16.to_be_bytes()); // extra lsb only
        let mut reader = Reader::new(&data);
        let hmtx = HmtxTable::parse(&mut reader, 1, 2).unwrap();
        assert_eq!(hmtx.metric_for(0).unwrap().advance_width, 500);
        let second = hmtx.metric_for(1).unwrap();
        assert_eq!(second.advance_width, 500);
        assert_eq!(second.lsb, 20);
    }
}
