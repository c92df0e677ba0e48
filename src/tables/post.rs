// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `post` table. Only version 2.0 carries per-glyph names, drawn from
//! the 258-entry standard Macintosh glyph-name set plus any custom Pascal
//! strings; version 1.0 implies the standard set outright but exposes no
//! per-glyph lookup here (`PostTable::glyph_name` only answers for 2.0),
//! and 3.0 carries no names at all.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_POST;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostHeader {
    pub italic_angle: f32,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
}

#[derive(Clone, Debug)]
pub enum PostTable {
    Version1 { header: PostHeader },
    Version2 { header: PostHeader, glyph_names: Vec<String> },
    Version3 { header: PostHeader },
}

impl PostTable {
    pub fn parse(reader: &mut Reader) -> Result<PostTable> {
        let version = reader.fixed()?;
        let header = PostHeader {
            italic_angle: reader.fixed()?,
            underline_position: reader.i16()?,
            underline_thickness: reader.i16()?,
            is_fixed_pitch: reader.u32()?,
        };
        reader.advance(4 * 4)?; // min/maxMemType42, min/maxMemType1

        if (version - 1.0).abs() < 1e-6 {
            return Ok(PostTable::Version1 { header });
        }
        if (version - 3.0).abs() < 1e-6 {
            return Ok(PostTable::Version3 { header });
        }
        if (version - 2.0).abs() >= 1e-6 {
            return Err(FontError::invalid_table(TAG_POST, "unsupported version"));
        }

        let num_glyphs = reader.u16()?;
        let mut glyph_name_indices = Vec::with_capacity(num_glyphs as usize);
        for _ in 0..num_glyphs {
            glyph_name_indices.push(reader.u16()?);
        }

        let mut pascal_strings = Vec::new();
        while !reader.is_empty() {
            let length = reader.u8()? as usize;
            pascal_strings.push(reader.ascii_string(length)?);
        }

        let mut glyph_names = Vec::with_capacity(glyph_name_indices.len());
        for index in glyph_name_indices {
            let name = if index < 258 {
                standard_mac_glyph_name(index).to_string()
            } else {
                pascal_strings
                    .get(index as usize - 258)
                    .cloned()
                    .ok_or(FontError::invalid_table(TAG_POST, "glyph name index out of range"))?
            };
            glyph_names.push(name);
        }

        Ok(PostTable::Version2 { header, glyph_names })
    }

    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        match self {
            PostTable::Version2 { glyph_names, .. } => {
                glyph_names.get(glyph_id as usize).map(|s| s.as_str())
            }
            _ => None,
        }
    }
}

/// The 258 standard Macintosh glyph names, in their fixed `post` format
/// 1.0/2.0 index order (OpenType spec, `post` table, "Macintosh Ordering").
const STANDARD_MAC_GLYPH_NAMES: &[&str] = &[
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign",
    "dollar", "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk",
    "plus", "comma", "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five",
    "six", "seven", "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question",
    "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright",
    "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k",
    "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar",
    "braceright", "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis",
    "Udieresis", "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla",
    "eacute", "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis",
    "ntilde", "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave",
    "ucircumflex", "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet",
    "paragraph", "germandbls", "registered", "copyright", "trademark", "acute", "dieresis",
    "notequal", "AE", "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu",
    "partialdiff", "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine",
    "Omega", "ae", "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin",
    "approxequal", "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace",
    "Agrave", "Atilde", "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright",
    "quoteleft", "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction",
    "currency", "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered",
    "quotesinglbase", "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute",
    "Edieresis", "Egrave", "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex",
    "apple", "Ograve", "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde",
    "macron", "breve", "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron",
    "Lslash", "lslash", "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth",
    "Yacute", "yacute", "Thorn", "thorn", "minus", "multiply", "onesuperior", "twosuperior",
    "threesuperior", "onehalf", "onequarter", "threequarters", "franc", "Gbreve", "gbreve",
    "Idotaccent", "Scedilla", "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];

fn standard_mac_glyph_name(index: u16) -> &'static str {
    STANDARD_MAC_GLYPH_NAMES.get(index as usize).copied().unwrap_or(".notdef")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_3_carries_no_names() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0003_0000u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&[0u8; 16]);
        let mut reader = Reader::new(&data);
        let post = PostTable::parse(&mut reader).unwrap();
        assert!(matches!(post, PostTable::Version3 { .. }));
        assert_eq!(post.glyph_name(0), None);
    }
}
