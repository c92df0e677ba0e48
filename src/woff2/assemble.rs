// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reassembles a decoded WOFF2's tables into a standard sfnt byte stream:
//! table directory with `searchRange`/`entrySelector`/`rangeShift`, 4-byte
//! table padding, per-table and whole-file checksums, and the
//! `head.checkSumAdjustment` sentinel every sfnt carries.
//!
//! Grounded on `nicoburns-wuff/src/woff2_dec.rs`'s `StoreOffsetTable`/
//! `StoreTableEntry`/`ComputeOffsetToFirstTable`, translated out of its
//! byte-counting style into building a `Vec<u8>` directly.

use std::collections::BTreeMap;

use crate::error::{FontError, Result, Tag};
use crate::tables::{TAG_GLYF, TAG_HEAD, TAG_LOCA};
use crate::woff2::{transform, Woff2File};

const CHECKSUM_ADJUSTMENT_MAGIC: u32 = 0xB1B0_AFBA;
const HEAD_CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Rebuilds a complete sfnt byte stream from a decoded WOFF2 file's tables,
/// reversing the `glyf`/`loca` transform along the way.
pub fn build_sfnt(woff2: &Woff2File) -> Result<Vec<u8>> {
    let mut table_bytes: BTreeMap<Tag, Vec<u8>> = BTreeMap::new();

    let glyf_index = woff2.entries.iter().position(|e| e.tag == TAG_GLYF);
    if let Some(index) = glyf_index {
        let entry = woff2.entries[index];
        if entry.transformed {
            let reversed = transform::reverse(&woff2.tables[index])?;
            table_bytes.insert(TAG_GLYF, reversed.glyf_table);
            table_bytes.insert(TAG_LOCA, reversed.loca_table);
        }
    }

    for (index, entry) in woff2.entries.iter().enumerate() {
        if entry.tag == TAG_GLYF || entry.tag == TAG_LOCA {
            continue; // handled above, together
        }
        if entry.transformed {
            return Err(FontError::InvalidContainer {
                what: "WOFF2 table uses an unsupported transform",
            });
        }
        table_bytes.insert(entry.tag, woff2.tables[index].clone());
    }

    if !table_bytes.contains_key(&TAG_HEAD) {
        return Err(FontError::InvalidContainer { what: "WOFF2 font is missing the head table" });
    }

    let num_tables = table_bytes.len() as u16;
    let (search_range, entry_selector, range_shift) = directory_search_params(num_tables);

    let header_size = 12;
    let directory_size = 16 * table_bytes.len();
    let mut offset = header_size + directory_size;

    let mut records: Vec<(Tag, u32, u32)> = Vec::with_capacity(table_bytes.len()); // (tag, offset, length)
    for (&tag, bytes) in &table_bytes {
        records.push((tag, offset as u32, bytes.len() as u32));
        offset += (bytes.len() + 3) & !3;
    }

    let mut out = Vec::with_capacity(offset);
    out.extend_from_slice(&woff2.header.flavor.to_be_bytes());
    out.extend_from_slice(&num_tables.to_be_bytes());
    out.extend_from_slice(&search_range.to_be_bytes());
    out.extend_from_slice(&entry_selector.to_be_bytes());
    out.extend_from_slice(&range_shift.to_be_bytes());

    for &(tag, table_offset, length) in &records {
        let checksum = compute_checksum(&table_bytes[&tag]);
        out.extend_from_slice(&tag.to_bytes());
        out.extend_from_slice(&checksum.to_be_bytes());
        out.extend_from_slice(&table_offset.to_be_bytes());
        out.extend_from_slice(&length.to_be_bytes());
    }

    let mut head_data_offset = 0usize;
    for &(tag, table_offset, _) in &records {
        if tag == TAG_HEAD {
            head_data_offset = table_offset as usize;
        }
        let bytes = &table_bytes[&tag];
        out.extend_from_slice(bytes);
        let padded_len = (out.len() + 3) & !3;
        out.resize(padded_len, 0);
    }

    if head_data_offset + 12 > out.len() {
        return Err(FontError::invalid_table(TAG_HEAD, "head table too short for checksumAdjustment"));
    }
    out[head_data_offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET..head_data_offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4]
        .copy_from_slice(&0u32.to_be_bytes());
    let file_checksum = compute_checksum(&out);
    let adjustment = CHECKSUM_ADJUSTMENT_MAGIC.wrapping_sub(file_checksum);
    out[head_data_offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET..head_data_offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4]
        .copy_from_slice(&adjustment.to_be_bytes());

    Ok(out)
}

/// `searchRange`/`entrySelector`/`rangeShift`, the sfnt directory's binary-
/// search hints: `searchRange` is `16 * 2^floor(log2(numTables))`.
fn directory_search_params(num_tables: u16) -> (u16, u16, u16) {
    let mut entry_selector: u16 = 0;
    let mut max_power_of_two: u16 = 1;
    while max_power_of_two * 2 <= num_tables.max(1) {
        max_power_of_two *= 2;
        entry_selector += 1;
    }
    let search_range = max_power_of_two * 16;
    let range_shift = num_tables.wrapping_mul(16).wrapping_sub(search_range);
    (search_range, entry_selector, range_shift)
}

/// The sfnt table checksum: the buffer's bytes read as big-endian `u32`
/// words (zero-padded to a multiple of 4), summed with wrapping overflow.
pub fn compute_checksum(data: &[u8]) -> u32 {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_for_power_of_two_table_count() {
        let (search_range, entry_selector, range_shift) = directory_search_params(4);
        assert_eq!(search_range, 64);
        assert_eq!(entry_selector, 2);
        assert_eq!(range_shift, 0);
    }

    #[test]
    fn search_params_for_non_power_of_two_table_count() {
        let (search_range, entry_selector, range_shift) = directory_search_params(11);
        assert_eq!(search_range, 128);
        assert_eq!(entry_selector, 3);
        assert_eq!(range_shift, 11 * 16 - 128);
    }

    #[test]
    fn checksum_pads_partial_final_word() {
        assert_eq!(compute_checksum(&[0, 0, 0, 1, 0, 0]), 0x0000_0001 + 0x0000_0000);
    }
}
