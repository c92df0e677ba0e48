// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reverses the WOFF2 `glyf`/`loca` transform back into standard sfnt
//! `glyf` and `loca` tables.
//!
//! The teacher has no WOFF2 code at all, so this is grounded entirely on
//! `nicoburns-wuff/src/woff/glyf_decoder.rs`'s `GlyfDecoder`: the 7-substream
//! split, the per-glyph simple/composite/empty dispatch, the triplet
//! coordinate decoder, and the re-encoding into standard glyf point/flag
//! byte runs, translated into this crate's `Reader`-based style.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_GLYF;
use crate::woff2::varint::read_255_u16;

const NUM_SUB_STREAMS: usize = 7;
const FLAG_OVERLAP_SIMPLE_BITMAP: u16 = 1 << 0;

const GLYF_ON_CURVE: u8 = 1 << 0;
const GLYF_X_SHORT: u8 = 1 << 1;
const GLYF_Y_SHORT: u8 = 1 << 2;
const GLYF_REPEAT: u8 = 1 << 3;
const GLYF_THIS_X_IS_SAME: u8 = 1 << 4;
const GLYF_THIS_Y_IS_SAME: u8 = 1 << 5;
const OVERLAP_SIMPLE: u8 = 1 << 6;

const FLAG_ARG_1_AND_2_ARE_WORDS: u16 = 1 << 0;
const FLAG_WE_HAVE_A_SCALE: u16 = 1 << 3;
const FLAG_MORE_COMPONENTS: u16 = 1 << 5;
const FLAG_WE_HAVE_AN_X_AND_Y_SCALE: u16 = 1 << 6;
const FLAG_WE_HAVE_A_TWO_BY_TWO: u16 = 1 << 7;
const FLAG_WE_HAVE_INSTRUCTIONS: u16 = 1 << 8;

/// A decoded point in font design units, before re-encoding as glyf deltas.
#[derive(Clone, Copy, Debug)]
struct TripletPoint {
    x: i32,
    y: i32,
    on_curve: bool,
}

/// Standard sfnt `glyf` and `loca` tables reconstructed from a WOFF2
/// transformed `glyf` table.
pub struct ReversedGlyfLoca {
    pub num_glyphs: u16,
    /// `0` for short (`indexToLocFormat` 0), `1` for long.
    pub index_format: u16,
    pub glyf_table: Vec<u8>,
    pub loca_table: Vec<u8>,
}

/// Reverses a WOFF2-transformed `glyf` table (the decompressed bytes stored
/// for the `glyf` directory entry) into standard `glyf`/`loca` bytes.
pub fn reverse(data: &[u8]) -> Result<ReversedGlyfLoca> {
    let mut header = Reader::new(data);
    let _reserved = header.u16()?;
    let flags = header.u16()?;
    let has_overlap_bitmap = (flags & FLAG_OVERLAP_SIMPLE_BITMAP) != 0;
    let num_glyphs = header.u16()?;
    let index_format = header.u16()?;

    let mut substream_lengths = [0usize; NUM_SUB_STREAMS];
    for length in substream_lengths.iter_mut() {
        *length = header.u32()? as usize;
    }

    let mut substreams: Vec<Reader<'_>> = Vec::with_capacity(NUM_SUB_STREAMS);
    let mut offset = (2 + NUM_SUB_STREAMS) * 4;
    for &length in &substream_lengths {
        substreams.push(header.slice(offset, length)?);
        offset += length;
    }

    let mut n_contour_stream = substreams[0];
    let mut n_points_stream = substreams[1];
    let mut flag_stream = substreams[2];
    let mut glyph_stream = substreams[3];
    let mut composite_stream = substreams[4];
    let bbox_substream = substreams[5];
    let mut instruction_stream = substreams[6];

    let bitmap_length = ((num_glyphs as usize + 31) >> 5) << 2;
    let bbox_bitmap = bbox_substream.slice(0, bitmap_length)?.span();
    let mut bbox_stream = bbox_substream.slice_from(bitmap_length)?;

    let overlap_bitmap: Option<&[u8]> = if has_overlap_bitmap {
        let overlap_bitmap_length = (num_glyphs as usize + 7) >> 3;
        Some(header.slice(offset, overlap_bitmap_length)?.span())
    } else {
        None
    };

    let mut glyf_table = Vec::with_capacity(num_glyphs as usize * 12);
    let mut loca_values = Vec::with_capacity(num_glyphs as usize + 1);

    for i in 0..(num_glyphs as usize) {
        loca_values.push(glyf_table.len() as u32);

        let n_contours = n_contour_stream.i16()?;
        let glyph_has_bbox = (bbox_bitmap[i >> 3] & (0x80 >> (i & 7))) != 0;

        let glyph_bytes = if n_contours == -1 {
            if !glyph_has_bbox {
                return Err(FontError::invalid_table(TAG_GLYF, "composite glyph missing bbox"));
            }
            parse_composite_glyph(&mut composite_stream, &mut glyph_stream, &mut bbox_stream, &mut instruction_stream)?
        } else if n_contours > 0 {
            let has_overlap_bit = overlap_bitmap
                .map(|bitmap| (bitmap[i >> 3] & (0x80 >> (i & 7))) != 0)
                .unwrap_or(false);
            parse_simple_glyph(
                n_contours as usize,
                glyph_has_bbox,
                has_overlap_bit,
                &mut n_points_stream,
                &mut flag_stream,
                &mut glyph_stream,
                &mut bbox_stream,
                &mut instruction_stream,
            )?
        } else {
            if glyph_has_bbox {
                return Err(FontError::invalid_table(TAG_GLYF, "empty glyph has a bbox"));
            }
            Vec::new()
        };

        glyf_table.extend_from_slice(&glyph_bytes);
        let padded_len = (glyf_table.len() + 3) & !3;
        glyf_table.resize(padded_len, 0);
    }
    loca_values.push(glyf_table.len() as u32);

    let loca_table = generate_loca_table(&loca_values, index_format);

    Ok(ReversedGlyfLoca { num_glyphs, index_format, glyf_table, loca_table })
}

fn parse_composite_glyph(
    composite_stream: &mut Reader,
    glyph_stream: &mut Reader,
    bbox_stream: &mut Reader,
    instruction_stream: &mut Reader,
) -> Result<Vec<u8>> {
    let mut probe = *composite_stream;
    let (composite_size, have_instructions) = compute_size_of_composite(&mut probe)?;

    let instruction_size: u16 = if have_instructions { read_255_u16(glyph_stream)? } else { 0 };

    let mut buf = Vec::with_capacity(12 + composite_size + instruction_size as usize);
    buf.extend_from_slice(&(-1i16).to_be_bytes());
    buf.extend_from_slice(bbox_stream.bytes(8)?);
    buf.extend_from_slice(composite_stream.bytes(composite_size)?);

    if have_instructions {
        buf.extend_from_slice(&instruction_size.to_be_bytes());
        buf.extend_from_slice(instruction_stream.bytes(instruction_size as usize)?);
    }
    Ok(buf)
}

fn compute_size_of_composite(composite_stream: &mut Reader) -> Result<(usize, bool)> {
    let mut bytes_read = 0usize;
    let mut have_instructions = false;
    let mut flags: u16 = FLAG_MORE_COMPONENTS;
    while flags & FLAG_MORE_COMPONENTS != 0 {
        flags = composite_stream.u16()?;
        have_instructions |= (flags & FLAG_WE_HAVE_INSTRUCTIONS) != 0;
        let mut arg_size = 2usize; // glyph index
        arg_size += if flags & FLAG_ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        if flags & FLAG_WE_HAVE_A_SCALE != 0 {
            arg_size += 2;
        } else if flags & FLAG_WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            arg_size += 4;
        } else if flags & FLAG_WE_HAVE_A_TWO_BY_TWO != 0 {
            arg_size += 8;
        }
        composite_stream.advance(arg_size)?;
        bytes_read += 2 + arg_size;
    }
    Ok((bytes_read, have_instructions))
}

#[allow(clippy::too_many_arguments)]
fn parse_simple_glyph(
    n_contours: usize,
    glyph_has_bbox: bool,
    has_overlap_bit: bool,
    n_points_stream: &mut Reader,
    flag_stream: &mut Reader,
    glyph_stream: &mut Reader,
    bbox_stream: &mut Reader,
    instruction_stream: &mut Reader,
) -> Result<Vec<u8>> {
    let mut n_points_per_contour = Vec::with_capacity(n_contours);
    let mut total_n_points: u32 = 0;
    for _ in 0..n_contours {
        let n = read_255_u16(n_points_stream)?;
        n_points_per_contour.push(n);
        total_n_points = total_n_points
            .checked_add(n as u32)
            .ok_or_else(|| FontError::invalid_table(TAG_GLYF, "too many points in contour"))?;
    }

    let flags: Vec<u8> = (0..total_n_points).map(|_| flag_stream.u8()).collect::<Result<_>>()?;
    let points = decode_triplet(&flags, glyph_stream)?;

    let instruction_size = read_255_u16(glyph_stream)?;

    let mut buf = Vec::with_capacity(12 + 2 * n_contours + 5 * total_n_points as usize + instruction_size as usize);
    buf.extend_from_slice(&(n_contours as i16).to_be_bytes());

    if glyph_has_bbox {
        buf.extend_from_slice(bbox_stream.bytes(8)?);
    } else {
        write_bbox(&points, &mut buf);
    }

    let mut end_point: i32 = -1;
    for &count in &n_points_per_contour {
        end_point += count as i32;
        if end_point >= 65536 {
            return Err(FontError::invalid_table(TAG_GLYF, "contour end point out of range"));
        }
        buf.extend_from_slice(&(end_point as u16).to_be_bytes());
    }

    buf.extend_from_slice(&instruction_size.to_be_bytes());
    buf.extend_from_slice(instruction_stream.bytes(instruction_size as usize)?);

    write_glyph_points(&points, has_overlap_bit, &mut buf);

    Ok(buf)
}

/// Decodes the triplet-encoded `(dx, dy, onCurve)` stream for every point
/// named by `flags`, one flag byte per point.
fn decode_triplet(flags: &[u8], triplet_reader: &mut Reader) -> Result<Vec<TripletPoint>> {
    #[inline]
    fn with_sign(flag: i32, baseval: i32) -> i32 {
        if (flag & 1) != 0 { baseval } else { -baseval }
    }

    let mut x: i32 = 0;
    let mut y: i32 = 0;
    let mut points = Vec::with_capacity(flags.len());

    for &raw_flag in flags {
        let on_curve = (raw_flag >> 7) == 0;
        let flag = (raw_flag & 0x7f) as i32;

        let (dx, dy) = if flag < 10 {
            (0, with_sign(flag, ((flag & 14) << 7) + triplet_reader.u8()? as i32))
        } else if flag < 20 {
            (with_sign(flag, (((flag - 10) & 14) << 7) + triplet_reader.u8()? as i32), 0)
        } else if flag < 84 {
            let b0 = flag - 20;
            let b1 = triplet_reader.u8()? as i32;
            (
                with_sign(flag, 1 + (b0 & 0x30) + (b1 >> 4)),
                with_sign(flag >> 1, 1 + ((b0 & 0x0c) << 2) + (b1 & 0x0f)),
            )
        } else if flag < 120 {
            let b0 = flag - 84;
            let b1 = triplet_reader.u8()? as i32;
            let b2 = triplet_reader.u8()? as i32;
            (
                with_sign(flag, 1 + ((b0 / 12) << 8) + b1),
                with_sign(flag >> 1, 1 + (((b0 % 12) >> 2) << 8) + b2),
            )
        } else if flag < 124 {
            let b0 = triplet_reader.u8()? as i32;
            let b1 = triplet_reader.u8()? as i32;
            let b2 = triplet_reader.u8()? as i32;
            (with_sign(flag, (b0 << 4) + (b1 >> 4)), with_sign(flag >> 1, ((b1 & 0x0f) << 8) + b2))
        } else {
            let b0 = triplet_reader.u8()? as i32;
            let b1 = triplet_reader.u8()? as i32;
            let b2 = triplet_reader.u8()? as i32;
            let b3 = triplet_reader.u8()? as i32;
            (with_sign(flag, (b0 << 8) + b1), with_sign(flag >> 1, (b2 << 8) + b3))
        };

        x = x
            .checked_add(dx)
            .ok_or_else(|| FontError::invalid_table(TAG_GLYF, "x coordinate overflow"))?;
        y = y
            .checked_add(dy)
            .ok_or_else(|| FontError::invalid_table(TAG_GLYF, "y coordinate overflow"))?;
        points.push(TripletPoint { x, y, on_curve });
    }

    Ok(points)
}

fn write_bbox(points: &[TripletPoint], dst: &mut Vec<u8>) {
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (0i32, 0i32, 0i32, 0i32);
    if let Some(first) = points.first() {
        x_min = first.x;
        x_max = first.x;
        y_min = first.y;
        y_max = first.y;
    }
    for point in points.iter().skip(1) {
        x_min = x_min.min(point.x);
        x_max = x_max.max(point.x);
        y_min = y_min.min(point.y);
        y_max = y_max.max(point.y);
    }
    dst.extend_from_slice(&(x_min as i16).to_be_bytes());
    dst.extend_from_slice(&(y_min as i16).to_be_bytes());
    dst.extend_from_slice(&(x_max as i16).to_be_bytes());
    dst.extend_from_slice(&(y_max as i16).to_be_bytes());
}

/// Re-encodes decoded points as standard glyf flag/x/y delta runs, with
/// run-length-compressed repeated flags.
fn write_glyph_points(points: &[TripletPoint], has_overlap_bit: bool, dst: &mut Vec<u8>) {
    let mut last_flag: u8 = u8::MAX;
    let mut repeat_count: u8 = 0;
    let (mut last_x, mut last_y) = (0i32, 0i32);
    let mut flag_bytes = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let mut flag = 0u8;
        if point.on_curve {
            flag |= GLYF_ON_CURVE;
        }
        if has_overlap_bit && i == 0 {
            flag |= OVERLAP_SIMPLE;
        }

        let dx = point.x - last_x;
        if dx == 0 {
            flag |= GLYF_THIS_X_IS_SAME;
        } else if dx > -256 && dx < 256 {
            flag |= GLYF_X_SHORT | if dx > 0 { GLYF_THIS_X_IS_SAME } else { 0 };
        }

        let dy = point.y - last_y;
        if dy == 0 {
            flag |= GLYF_THIS_Y_IS_SAME;
        } else if dy > -256 && dy < 256 {
            flag |= GLYF_Y_SHORT | if dy > 0 { GLYF_THIS_Y_IS_SAME } else { 0 };
        }

        if flag == last_flag && repeat_count < 255 {
            repeat_count += 1;
        } else {
            if i > 0 {
                if repeat_count > 0 {
                    flag_bytes.push(last_flag | GLYF_REPEAT);
                    flag_bytes.push(repeat_count);
                } else {
                    flag_bytes.push(last_flag);
                }
            }
            repeat_count = 0;
        }

        last_x = point.x;
        last_y = point.y;
        last_flag = flag;
    }
    if !points.is_empty() {
        if repeat_count > 0 {
            flag_bytes.push(last_flag | GLYF_REPEAT);
            flag_bytes.push(repeat_count);
        } else {
            flag_bytes.push(last_flag);
        }
    }
    dst.extend_from_slice(&flag_bytes);

    let mut last_x = 0i32;
    for point in points {
        let dx = point.x - last_x;
        if dx == 0 {
            // nothing to write
        } else if dx > -256 && dx < 256 {
            dst.push(dx.unsigned_abs() as u8);
        } else {
            dst.extend_from_slice(&(dx as i16).to_be_bytes());
        }
        last_x += dx;
    }

    let mut last_y = 0i32;
    for point in points {
        let dy = point.y - last_y;
        if dy == 0 {
            // nothing to write
        } else if dy > -256 && dy < 256 {
            dst.push(dy.unsigned_abs() as u8);
        } else {
            dst.extend_from_slice(&(dy as i16).to_be_bytes());
        }
        last_y += dy;
    }
}

fn generate_loca_table(loca_values: &[u32], index_format: u16) -> Vec<u8> {
    let mut table = Vec::with_capacity(loca_values.len() * if index_format != 0 { 4 } else { 2 });
    if index_format != 0 {
        for &value in loca_values {
            table.extend_from_slice(&value.to_be_bytes());
        }
    } else {
        for &value in loca_values {
            table.extend_from_slice(&((value >> 1) as u16).to_be_bytes());
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_byte_triplets_round_trip_through_write() {
        // flag 84..119 range (two-byte), a simple right-angle delta.
        let flags = [0x80u8 | 21]; // on-curve, flag value 21 (two bytes)
        let mut reader = Reader::new(&[0x00, 0x00]);
        let points = decode_triplet(&flags, &mut reader).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].on_curve);
    }

    #[test]
    fn loca_table_short_format_halves_offsets() {
        let table = generate_loca_table(&[0, 100, 200], 0);
        assert_eq!(table, vec![0, 0, 0, 50, 0, 100]);
    }

    #[test]
    fn loca_table_long_format_keeps_offsets() {
        let table = generate_loca_table(&[0, 100], 1);
        assert_eq!(table, vec![0, 0, 0, 0, 0, 0, 0, 100]);
    }
}
