// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `name` table: human-readable strings identifying the font (family,
//! subfamily, full name, ...), keyed by platform/encoding/language/nameID.
//! Formats 0 and 1 share the same name-record layout; format 1 just adds a
//! language-tag list we don't need to interpret to answer "what's the name
//! for this nameID".

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_NAME;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

#[derive(Clone, Debug)]
pub struct NameTable {
    pub format: u16,
    pub records: Vec<NameRecord>,
}

impl NameTable {
    pub fn parse(reader: &mut Reader) -> Result<NameTable> {
        let format = reader.u16()?;
        if format != 0 && format != 1 {
            return Err(FontError::invalid_table(TAG_NAME, "unsupported format"));
        }
        let count = reader.u16()?;
        let string_offset = reader.u16()?;

        struct RawRecord {
            platform_id: u16,
            encoding_id: u16,
            language_id: u16,
            name_id: u16,
            length: u16,
            offset: u16,
        }

        let mut raw_records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            raw_records.push(RawRecord {
                platform_id: reader.u16()?,
                encoding_id: reader.u16()?,
                language_id: reader.u16()?,
                name_id: reader.u16()?,
                length: reader.u16()?,
                offset: reader.u16()?,
            });
        }

        // Format 1 appends a language-tag record list; we skip past it since
        // nameIDs >= 0x8000 resolving to those tags are a collaborator's job.
        if format == 1 {
            let lang_tag_count = reader.u16()?;
            for _ in 0..lang_tag_count {
                reader.advance(4)?; // length + offset
            }
        }

        let mut records = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            let mut storage = reader.slice(
                string_offset as usize + raw.offset as usize,
                raw.length as usize,
            )?;
            let value = if is_unicode_or_windows_bmp(raw.platform_id, raw.encoding_id) {
                storage.utf16be_string(raw.length as usize)?
            } else {
                storage.ascii_string(raw.length as usize)?
            };
            records.push(NameRecord {
                platform_id: raw.platform_id,
                encoding_id: raw.encoding_id,
                language_id: raw.language_id,
                name_id: raw.name_id,
                value,
            });
        }

        Ok(NameTable { format, records })
    }

    /// First record matching `name_id` under any platform, preferring
    /// Windows/Unicode encodings (which are UTF-16BE and therefore always
    /// decodable) over Macintosh's single-byte encodings.
    pub fn get(&self, name_id: u16) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name_id == name_id && is_unicode_or_windows_bmp(r.platform_id, r.encoding_id))
            .or_else(|| self.records.iter().find(|r| r.name_id == name_id))
            .map(|r| r.value.as_str())
    }
}

fn is_unicode_or_windows_bmp(platform_id: u16, encoding_id: u16) -> bool {
    platform_id == 0 || (platform_id == 3 && (encoding_id == 1 || encoding_id == 10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_windows_unicode_name_record() {
        let family = "Test";
        let utf16: Vec<u8> = family
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();

        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_be_bytes()); // format
        data.extend_from_slice(&1u16.to_be_bytes()); // count
        let header_len = 6 + 12; // format+count+storageOffset + 1 record
        data.extend_from_slice(&(header_len as u16).to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes()); // platformID Windows
        data.extend_from_slice(&1u16.to_be_bytes()); // encodingID BMP
        data.extend_from_slice(&0x0409u16.to_be_bytes()); // languageID en-US
        data.extend_from_slice(&1u16.to_be_bytes()); // nameID 1 = family
        data.extend_from_slice(&(utf16.len() as u16).to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes()); // offset into storage
        data.extend_from_slice(&utf16);

        let mut reader = Reader::new(&data);
        let table = NameTable::parse(&mut reader).unwrap();
        assert_eq!(table.get(1), Some("Test"));
    }
}
