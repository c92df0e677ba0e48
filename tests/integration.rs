// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end scenarios spanning more than one module: a minimal sfnt
//! built by hand and loaded through the public `Font` API, and the
//! reader/container invariants that have to hold across every parser.

use fontengine::error::FontError;
use fontengine::reader::Reader;
use fontengine::sfnt::FontDirectory;
use fontengine::tables::cmap::{CmapSubtable, CmapTable};
use fontengine::tables::head::{HeadTable, MAGIC_NUMBER};
use fontengine::woff2;
use fontengine::woff2::{TableDirectoryEntry, Woff2File, Woff2Header};

fn push_table(out: &mut Vec<u8>, tag: &[u8; 4], bytes: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&checksum(bytes).to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // offset patched later
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
}

fn checksum(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        sum = sum.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut last = [0u8; 4];
        last[..remainder.len()].copy_from_slice(remainder);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}

fn build_head_bytes(units_per_em: u16, index_to_loc_long: bool) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&0x0001_0000i32.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
    data.extend_from_slice(&MAGIC_NUMBER.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes()); // flags
    data.extend_from_slice(&units_per_em.to_be_bytes());
    data.extend_from_slice(&0i64.to_be_bytes());
    data.extend_from_slice(&0i64.to_be_bytes());
    data.extend_from_slice(&0i16.to_be_bytes());
    data.extend_from_slice(&0i16.to_be_bytes());
    data.extend_from_slice(&1000i16.to_be_bytes());
    data.extend_from_slice(&1000i16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&9u16.to_be_bytes());
    data.extend_from_slice(&2i16.to_be_bytes());
    data.extend_from_slice(&(if index_to_loc_long { 1i16 } else { 0i16 }).to_be_bytes());
    data.extend_from_slice(&0i16.to_be_bytes());
    data
}

fn build_hhea_bytes() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&1u16.to_be_bytes());
    d.extend_from_slice(&0u16.to_be_bytes());
    d.extend_from_slice(&800i16.to_be_bytes());
    d.extend_from_slice(&(-200i16).to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&1000u16.to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&1000i16.to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&[0u8; 8]);
    d.extend_from_slice(&0i16.to_be_bytes());
    d.extend_from_slice(&1u16.to_be_bytes()); // numHMetrics
    d
}

fn build_maxp_bytes() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&0x0000_8000u32.to_be_bytes()); // version 0.5
    d.extend_from_slice(&1u16.to_be_bytes()); // numGlyphs
    d
}

fn build_hmtx_bytes() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&500u16.to_be_bytes());
    d.extend_from_slice(&10i16.to_be_bytes());
    d
}

/// Scenario 3: a 54-byte head table with a bad magic number fails with
/// `InvalidTable { tag: head, .. }`, not a generic container error.
#[test]
fn head_magic_mismatch_is_an_invalid_table_error() {
    let mut data = build_head_bytes(1000, true);
    data[12..16].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
    let mut reader = Reader::new(&data);
    let err = HeadTable::parse(&mut reader).unwrap_err();
    assert!(matches!(err, FontError::InvalidTable { .. }));
}

/// Scenario 6: a buffer whose first four bytes aren't the WOFF2 signature
/// fails container validation rather than panicking or silently treating
/// it as sfnt.
#[test]
fn woff2_signature_mismatch_is_rejected() {
    let data = [0u8; 48];
    let err = woff2::parse(&data).unwrap_err();
    assert!(matches!(err, FontError::InvalidContainer { .. }));
}

/// Reader invariant: `peek` never advances the cursor, on success or
/// failure.
#[test]
fn peek_leaves_position_unchanged_on_success_and_failure() {
    let data = [0x12, 0x34, 0x56, 0x78];
    let mut reader = Reader::new(&data);

    let start = reader.position();
    let value = reader.peek(|r| r.u16()).unwrap();
    assert_eq!(value, 0x1234);
    assert_eq!(reader.position(), start);

    let failing = reader.peek(|r| {
        r.u32()?;
        r.u8() // one byte past the 4-byte buffer
    });
    assert!(failing.is_err());
    assert_eq!(reader.position(), start);
}

/// Slicing invariant: a sub-reader's length matches the requested span,
/// and reading through it doesn't move the parent's own cursor.
#[test]
fn slice_is_independent_of_the_parent_cursor() {
    let data = [0u8; 16];
    let mut parent = Reader::new(&data);
    parent.advance(4).unwrap();

    let mut sub = parent.slice(8, 4).unwrap();
    assert_eq!(sub.remaining(), 4);
    sub.advance(4).unwrap();

    assert_eq!(parent.position(), 4);
}

/// Directory round-trip: re-reading an sfnt directory preserves each
/// `(tag, offset, length)` triple exactly.
#[test]
fn sfnt_directory_preserves_table_records() {
    let head_bytes = build_head_bytes(2048, false);

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&1u16.to_be_bytes());
    font.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    push_table(&mut font, b"head", &head_bytes);
    let data_offset = font.len();
    font.extend_from_slice(&head_bytes);
    font[12 + 8..12 + 12].copy_from_slice(&(data_offset as u32).to_be_bytes());

    let directory = FontDirectory::parse(&font).unwrap();
    assert_eq!(directory.num_tables, 1);
    let tag = fontengine::error::Tag::from_bytes(*b"head");
    let record = directory.table_record(tag).unwrap();
    assert_eq!(record.offset as usize, data_offset);
    assert_eq!(record.length as usize, head_bytes.len());

    let reparsed = FontDirectory::parse(&font).unwrap();
    let record_again = reparsed.table_record(tag).unwrap();
    assert_eq!(record, record_again);
}

/// `Font::load` end-to-end over a minimal hand-built TrueType sfnt,
/// exercising the public API (not just individual table parsers).
#[test]
fn font_load_reads_units_per_em_from_a_minimal_sfnt() {
    let head_bytes = build_head_bytes(1000, false);
    let hhea_bytes = build_hhea_bytes();
    let maxp_bytes = build_maxp_bytes();
    let hmtx_bytes = build_hmtx_bytes();
    // A zero-length CFF table satisfies `Font::load`'s outline-source
    // check without needing a full CharString interpreter fixture.
    let cff_bytes: Vec<u8> = Vec::new();

    let mut tables: Vec<(&[u8; 4], &[u8])> =
        vec![(b"head", &head_bytes), (b"hhea", &hhea_bytes), (b"maxp", &maxp_bytes), (b"hmtx", &hmtx_bytes), (b"CFF ", &cff_bytes)];
    tables.sort_by_key(|&(tag, _)| *tag);

    let mut font = Vec::new();
    font.extend_from_slice(&0x4F54_544Fu32.to_be_bytes()); // "OTTO": CFF outlines
    font.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    font.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let directory_size = 12 + tables.len() * 16;
    let mut offsets = Vec::with_capacity(tables.len());
    let mut offset = directory_size;
    for &(_, bytes) in &tables {
        offsets.push(offset);
        offset += bytes.len();
    }

    for (&(tag, bytes), &off) in tables.iter().zip(&offsets) {
        font.extend_from_slice(tag);
        font.extend_from_slice(&checksum(bytes).to_be_bytes());
        font.extend_from_slice(&(off as u32).to_be_bytes());
        font.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    }
    for &(_, bytes) in &tables {
        font.extend_from_slice(bytes);
    }

    let loaded = fontengine::Font::load(&font).unwrap();
    assert_eq!(loaded.head.units_per_em, 1000);
    assert_eq!(loaded.maxp.num_glyphs, 1);
    assert_eq!(loaded.metric_for(0).unwrap().advance_width, 500);
}

fn build_cmap_bytes(subtables: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes()); // version
    data.extend_from_slice(&(subtables.len() as u16).to_be_bytes());

    let header_len = 4 + subtables.len() * 8;
    let mut offsets = Vec::with_capacity(subtables.len());
    let mut offset = header_len;
    for (_, _, bytes) in subtables {
        offsets.push(offset);
        offset += bytes.len();
    }

    for (&(platform_id, encoding_id, _), &sub_offset) in subtables.iter().zip(&offsets) {
        data.extend_from_slice(&platform_id.to_be_bytes());
        data.extend_from_slice(&encoding_id.to_be_bytes());
        data.extend_from_slice(&(sub_offset as u32).to_be_bytes());
    }
    for (_, _, bytes) in subtables {
        data.extend_from_slice(bytes);
    }
    data
}

fn build_format0_bytes(mapping: &[(u8, u8)]) -> Vec<u8> {
    let mut glyph_id_array = [0u8; 256];
    for &(code_point, glyph_id) in mapping {
        glyph_id_array[code_point as usize] = glyph_id;
    }
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes()); // format
    data.extend_from_slice(&262u16.to_be_bytes()); // length
    data.extend_from_slice(&0u16.to_be_bytes()); // language
    data.extend_from_slice(&glyph_id_array);
    data
}

fn build_format4_bytes(segments: &[(u16, u16, i16, u16)]) -> Vec<u8> {
    let seg_count_x2 = (segments.len() * 2) as u16;
    let mut data = Vec::new();
    data.extend_from_slice(&4u16.to_be_bytes()); // format
    data.extend_from_slice(&0u16.to_be_bytes()); // length (unused by the parser)
    data.extend_from_slice(&0u16.to_be_bytes()); // language
    data.extend_from_slice(&seg_count_x2.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes()); // searchRange
    data.extend_from_slice(&0u16.to_be_bytes()); // entrySelector
    data.extend_from_slice(&0u16.to_be_bytes()); // rangeShift
    for &(_, end, _, _) in segments {
        data.extend_from_slice(&end.to_be_bytes());
    }
    data.extend_from_slice(&0u16.to_be_bytes()); // reservedPad
    for &(start, _, _, _) in segments {
        data.extend_from_slice(&start.to_be_bytes());
    }
    for &(_, _, delta, _) in segments {
        data.extend_from_slice(&delta.to_be_bytes());
    }
    for &(_, _, _, range_offset) in segments {
        data.extend_from_slice(&range_offset.to_be_bytes());
    }
    data
}

fn build_format14_stub_bytes() -> Vec<u8> {
    14u16.to_be_bytes().to_vec()
}

/// Covers the exact regression this crate's platform/encoding preference
/// order exists to prevent: a `(3, 1)` Windows BMP subtable must win over
/// `(1, 0)` Macintosh Roman even when the Mac Roman encoding record is
/// listed first in the table, because selection follows `PREFERENCE_ORDER`,
/// not encoding-record order.
#[test]
fn best_subtable_prefers_windows_bmp_over_mac_roman() {
    let windows_bmp = build_format4_bytes(&[
        (0x41, 0x5A, 10i16.wrapping_sub(0x41), 0),
        (0xFFFF, 0xFFFF, 1, 0),
    ]);
    let mac_roman = build_format0_bytes(&[(b'A', 99)]);
    let data = build_cmap_bytes(&[(1, 0, mac_roman), (3, 1, windows_bmp)]);

    let table = CmapTable::parse(Reader::new(&data)).unwrap();
    let best = table.best_subtable().unwrap().expect("a selectable subtable");
    assert_eq!(best.lookup('A' as u32), Some(10));
}

/// Format 14 sits at `(0, 6)`, a preference-ordered slot, but can only
/// answer variation-sequence queries, not plain code-point lookups.
/// `best_subtable` must skip it and fall through to the next usable
/// subtable rather than returning a format 14 table that will silently
/// answer every lookup with `None`.
#[test]
fn best_subtable_skips_format14_even_when_preferred() {
    let variation_selectors = build_format14_stub_bytes();
    let mac_roman = build_format0_bytes(&[(b'A', 7)]);
    let data = build_cmap_bytes(&[(0, 6, variation_selectors), (1, 0, mac_roman)]);

    let table = CmapTable::parse(Reader::new(&data)).unwrap();
    let best = table.best_subtable().unwrap().expect("a selectable subtable");
    assert!(!matches!(best, CmapSubtable::Format14(_)));
    assert_eq!(best.lookup('A' as u32), Some(7));
}

/// A cmap with only a format 14 subtable has nothing `best_subtable` can
/// select.
#[test]
fn best_subtable_is_none_when_only_format14_is_present() {
    let data = build_cmap_bytes(&[(0, 6, build_format14_stub_bytes())]);
    let table = CmapTable::parse(Reader::new(&data)).unwrap();
    assert!(table.best_subtable().unwrap().is_none());
}

fn push_bits(bits: &mut Vec<bool>, mut value: u32, count: u32) {
    for _ in 0..count {
        bits.push(value & 1 == 1);
        value >>= 1;
    }
}

/// A minimal Brotli stream (RFC 7932) carrying `data` verbatim: one
/// uncompressed, non-final meta-block followed by an empty final
/// meta-block. Splitting it into two meta-blocks sidesteps ever needing to
/// know whether `ISUNCOMPRESSED` is read on a *last* meta-block, since the
/// data-carrying block here is never the last one.
fn brotli_uncompressed_stream(data: &[u8]) -> Vec<u8> {
    let mlen_minus_one = (data.len() - 1) as u32;

    let mut bits: Vec<bool> = Vec::with_capacity(24);
    push_bits(&mut bits, 0, 1); // WBITS selector: 0 => window size 16
    push_bits(&mut bits, 0, 1); // ISLAST = 0, more meta-blocks follow
    push_bits(&mut bits, 0, 2); // MNIBBLES selector: 0 => 4 nibbles (16-bit MLEN-1)
    push_bits(&mut bits, mlen_minus_one, 16);
    push_bits(&mut bits, 1, 1); // ISUNCOMPRESSED
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut out = Vec::with_capacity(bits.len() / 8 + data.len() + 1);
    for byte_bits in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in byte_bits.iter().enumerate() {
            if bit {
                byte |= 1 << i;
            }
        }
        out.push(byte);
    }
    out.extend_from_slice(data);
    out.push(0x03); // final meta-block: ISLAST = 1, ISLASTEMPTY = 1
    out
}

/// Scenario: a full WOFF2 file (signature, header, table directory, and a
/// Brotli-compressed table stream) decoded through the public
/// `woff2::decode` entry point and loaded through `Font::load`, exercising
/// header validation, directory parsing, Brotli inflation, and sfnt
/// reassembly together rather than each in isolation.
#[test]
fn woff2_decode_round_trips_through_font_load() {
    let head_bytes = build_head_bytes(1000, false);
    let hhea_bytes = build_hhea_bytes();
    let maxp_bytes = build_maxp_bytes();
    let hmtx_bytes = build_hmtx_bytes();
    let cff_bytes: Vec<u8> = Vec::new();

    // Directory order fixes the order tables are concatenated in the
    // decompressed stream: `split_table_stream` walks both in lockstep.
    let table_stream: Vec<u8> =
        [&head_bytes[..], &hhea_bytes[..], &maxp_bytes[..], &hmtx_bytes[..], &cff_bytes[..]].concat();

    let mut directory = Vec::new();
    for &(known_tag_index, orig_length) in &[
        (1u8, head_bytes.len()),
        (2u8, hhea_bytes.len()),
        (4u8, maxp_bytes.len()),
        (3u8, hmtx_bytes.len()),
        (13u8, cff_bytes.len()),
    ] {
        directory.push(known_tag_index); // flag byte: known tag index, untransformed
        directory.push(orig_length as u8); // UIntBase128, single byte since < 128
    }

    let compressed = brotli_uncompressed_stream(&table_stream);

    let mut woff2_bytes = Vec::new();
    woff2_bytes.extend_from_slice(&0x774F_4632u32.to_be_bytes()); // signature "wOF2"
    woff2_bytes.extend_from_slice(&0x4F54_544Fu32.to_be_bytes()); // flavor "OTTO"
    let reported_length_at = woff2_bytes.len();
    woff2_bytes.extend_from_slice(&0u32.to_be_bytes()); // length, patched below
    woff2_bytes.extend_from_slice(&5u16.to_be_bytes()); // numTables
    woff2_bytes.extend_from_slice(&0u16.to_be_bytes()); // reserved
    woff2_bytes.extend_from_slice(&196u32.to_be_bytes()); // totalSfntSize
    woff2_bytes.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    woff2_bytes.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    woff2_bytes.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    woff2_bytes.extend_from_slice(&[0u8; 20]); // meta/priv offset+length: unused
    woff2_bytes.extend_from_slice(&directory);
    woff2_bytes.extend_from_slice(&compressed);

    let total_len = woff2_bytes.len() as u32;
    woff2_bytes[reported_length_at..reported_length_at + 4].copy_from_slice(&total_len.to_be_bytes());

    let sfnt = woff2::decode(&woff2_bytes).unwrap();
    let font = fontengine::Font::load(&sfnt).unwrap();
    assert_eq!(font.head.units_per_em, 1000);
    assert_eq!(font.maxp.num_glyphs, 1);
    assert_eq!(font.metric_for(0).unwrap().advance_width, 500);
}

/// The same cross-module path as `woff2_decode_round_trips_through_font_load`
/// but built directly from a `Woff2File`, bypassing Brotli entirely: a
/// second, independent check on `assemble::build_sfnt` + `Font::load` that
/// doesn't depend on the hand-rolled Brotli fixture above being bit-exact.
#[test]
fn woff2_file_reassembles_into_a_loadable_sfnt() {
    use fontengine::tables::{TAG_CFF, TAG_HEAD, TAG_HHEA, TAG_HMTX, TAG_MAXP};

    let head_bytes = build_head_bytes(1000, false);
    let hhea_bytes = build_hhea_bytes();
    let maxp_bytes = build_maxp_bytes();
    let hmtx_bytes = build_hmtx_bytes();
    let cff_bytes: Vec<u8> = Vec::new();

    let entries = vec![
        TableDirectoryEntry { tag: TAG_HEAD, transformed: false, orig_length: head_bytes.len() as u32, transform_length: None },
        TableDirectoryEntry { tag: TAG_HHEA, transformed: false, orig_length: hhea_bytes.len() as u32, transform_length: None },
        TableDirectoryEntry { tag: TAG_MAXP, transformed: false, orig_length: maxp_bytes.len() as u32, transform_length: None },
        TableDirectoryEntry { tag: TAG_HMTX, transformed: false, orig_length: hmtx_bytes.len() as u32, transform_length: None },
        TableDirectoryEntry { tag: TAG_CFF, transformed: false, orig_length: cff_bytes.len() as u32, transform_length: None },
    ];
    let tables = vec![head_bytes, hhea_bytes, maxp_bytes, hmtx_bytes, cff_bytes];
    let header = Woff2Header {
        flavor: 0x4F54_544F,
        reported_length: 0,
        num_tables: entries.len() as u16,
        total_sfnt_size: 0,
        total_compressed_size: 0,
        major_version: 1,
        minor_version: 0,
        meta_offset: 0,
        meta_length: 0,
        meta_orig_length: 0,
        priv_offset: 0,
        priv_length: 0,
    };
    let file = Woff2File { header, entries, tables, ttc_fonts: Vec::new() };

    let sfnt = woff2::assemble::build_sfnt(&file).unwrap();
    let font = fontengine::Font::load(&sfnt).unwrap();
    assert_eq!(font.head.units_per_em, 1000);
    assert_eq!(font.maxp.num_glyphs, 1);
}
