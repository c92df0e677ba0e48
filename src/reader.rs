// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The zero-copy binary reader every table parser is built on.
//!
//! A `Reader` is a cursor into a borrowed `Byte View`: `start <= position <=
//! end` always holds, and every primitive read advances `position` by the
//! primitive's byte width or fails with `UnexpectedEndOfData`. Sub-readers
//! (`slice`, `slice_from`) share the same underlying buffer; nothing here
//! ever copies font bytes.

use byteorder::{BigEndian, ReadBytesExt};
use std::io;

use crate::error::{FontError, Result};

/// A cursor into a borrowed byte range.
///
/// This is the spiritual successor of the teacher's `util::Jump` trait
/// (`impl Jump for &[u8]`), generalized to the full read contract in
/// `spec.md` §4.1: bounded sub-slicing, `peek`, `readAt`, and typed
/// big-endian primitives, instead of just forward seeking.
#[derive(Clone, Copy, Debug)]
pub struct Reader<'a> {
    buffer: &'a [u8],
    start: usize,
    end: usize,
    position: usize,
}

impl<'a> Reader<'a> {
    /// Wraps an entire byte slice as a reader positioned at its start.
    #[inline]
    pub fn new(buffer: &'a [u8]) -> Reader<'a> {
        Reader {
            buffer,
            start: 0,
            end: buffer.len(),
            position: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position >= self.end
    }

    /// Moves the cursor forward `n` bytes from the current position.
    #[inline]
    pub fn advance(&mut self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(FontError::eof(n, remaining));
        }
        self.position += n;
        Ok(())
    }

    /// Jumps to an absolute position relative to this reader's `start`.
    #[inline]
    pub fn seek_to(&mut self, offset: usize) -> Result<()> {
        let target = self
            .start
            .checked_add(offset)
            .ok_or_else(|| FontError::eof(offset, self.end - self.start))?;
        if target > self.end {
            return Err(FontError::eof(offset, self.end - self.start));
        }
        self.position = target;
        Ok(())
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(FontError::eof(n, remaining));
        }
        let slice = &self.buffer[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16> {
        let mut bytes = self.take(2)?;
        bytes
            .read_u16::<BigEndian>()
            .map_err(|_| FontError::eof(2, 0))
    }

    #[inline]
    pub fn i16(&mut self) -> Result<i16> {
        let mut bytes = self.take(2)?;
        bytes
            .read_i16::<BigEndian>()
            .map_err(|_| FontError::eof(2, 0))
    }

    /// Three bytes assembled big-endian as `(b0<<16)|(b1<<8)|b2`.
    #[inline]
    pub fn u24(&mut self) -> Result<u32> {
        let bytes = self.take(3)?;
        Ok(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32))
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32> {
        let mut bytes = self.take(4)?;
        bytes
            .read_u32::<BigEndian>()
            .map_err(|_| FontError::eof(4, 0))
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32> {
        let mut bytes = self.take(4)?;
        bytes
            .read_i32::<BigEndian>()
            .map_err(|_| FontError::eof(4, 0))
    }

    /// 16.16 fixed-point: `i32 / 65536`.
    #[inline]
    pub fn fixed(&mut self) -> Result<f32> {
        Ok(self.i32()? as f32 / 65536.0)
    }

    /// 2.14 fixed-point: `i16 / 16384`.
    #[inline]
    pub fn f2dot14(&mut self) -> Result<f32> {
        Ok(self.i16()? as f32 / 16384.0)
    }

    /// Seconds since 1904-01-01 UTC.
    #[inline]
    pub fn long_date_time(&mut self) -> Result<i64> {
        let mut bytes = self.take(8)?;
        bytes
            .read_i64::<BigEndian>()
            .map_err(|_| FontError::eof(8, 0))
    }

    #[inline]
    pub fn tag(&mut self) -> Result<crate::error::Tag> {
        Ok(crate::error::Tag::from_be_u32(self.u32()?))
    }

    #[inline]
    pub fn offset16(&mut self) -> Result<u16> {
        self.u16()
    }

    #[inline]
    pub fn offset32(&mut self) -> Result<u32> {
        self.u32()
    }

    /// A sub-reader positioned at `[start+offset, start+offset+length)`.
    ///
    /// Does not mutate `self`'s cursor; the returned reader shares the
    /// underlying buffer.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Reader<'a>> {
        let sub_start = self
            .start
            .checked_add(offset)
            .ok_or_else(|| FontError::eof(offset, self.end - self.start))?;
        let sub_end = sub_start
            .checked_add(length)
            .ok_or_else(|| FontError::eof(length, self.end.saturating_sub(sub_start)))?;
        if sub_end > self.buffer.len() || sub_start > self.end {
            return Err(FontError::eof(length, self.end.saturating_sub(sub_start)));
        }
        Ok(Reader {
            buffer: self.buffer,
            start: sub_start,
            end: sub_end,
            position: sub_start,
        })
    }

    /// A sub-reader from `start+offset` to this reader's `end`.
    pub fn slice_from(&self, offset: usize) -> Result<Reader<'a>> {
        let sub_start = self
            .start
            .checked_add(offset)
            .ok_or_else(|| FontError::eof(offset, self.end - self.start))?;
        if sub_start > self.end {
            return Err(FontError::eof(offset, self.end - self.start));
        }
        Ok(Reader {
            buffer: self.buffer,
            start: sub_start,
            end: self.end,
            position: sub_start,
        })
    }

    /// Saves the cursor, runs `f`, restores the cursor, and returns `f`'s
    /// result — on success *and* on failure.
    pub fn peek<T>(&mut self, f: impl FnOnce(&mut Reader<'a>) -> Result<T>) -> Result<T> {
        let saved = self.position;
        let result = f(self);
        self.position = saved;
        result
    }

    /// Saves the cursor, jumps to `start+offset`, runs `f`, restores the
    /// cursor.
    pub fn read_at<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Reader<'a>) -> Result<T>,
    ) -> Result<T> {
        let saved = self.position;
        let result = (|| {
            self.seek_to(offset)?;
            f(self)
        })();
        self.position = saved;
        result
    }

    /// Borrows the next `length` bytes without copying, advancing the cursor.
    #[inline]
    pub fn bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.take(length)
    }

    /// The full span this reader was created over, ignoring the cursor.
    #[inline]
    pub fn span(&self) -> &'a [u8] {
        &self.buffer[self.start..self.end]
    }

    pub fn ascii_string(&mut self, length: usize) -> Result<String> {
        let bytes = self.bytes(length)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    pub fn utf16be_string(&mut self, length: usize) -> Result<String> {
        if length % 2 != 0 {
            return Err(FontError::InvalidContainer {
                what: "odd-length UTF-16BE string",
            });
        }
        let bytes = self.bytes(length)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }
}

impl<'a> io::Read for Reader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        let slice = &self.buffer[self.position..self.position + n];
        buf[..n].copy_from_slice(slice);
        self.position += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_primitives() {
        let mut reader = Reader::new(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.u16().unwrap(), 0x5678);

        let mut reader = Reader::new(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(reader.u32().unwrap(), 0x12345678);

        let mut reader = Reader::new(&[0x12, 0x34, 0x56, 0x78]);
        let fixed = reader.fixed().unwrap();
        assert!((fixed - (0x12345678i32 as f32 / 65536.0)).abs() < 1e-3);
    }

    #[test]
    fn f2dot14_values() {
        assert_eq!(Reader::new(&[0x40, 0x00]).f2dot14().unwrap(), 1.0);
        assert_eq!(Reader::new(&[0x60, 0x00]).f2dot14().unwrap(), 1.5);
        assert_eq!(Reader::new(&[0xC0, 0x00]).f2dot14().unwrap(), -1.0);
    }

    #[test]
    fn eof_on_short_read() {
        let mut reader = Reader::new(&[0x00]);
        assert!(matches!(
            reader.u16(),
            Err(FontError::UnexpectedEndOfData { .. })
        ));
    }

    #[test]
    fn peek_restores_position_on_success_and_failure() {
        let mut reader = Reader::new(&[1, 2, 3, 4]);
        reader.u8().unwrap();
        let pos_before = reader.position();
        let _ = reader.peek(|r| r.u16());
        assert_eq!(reader.position(), pos_before);

        let _ = reader.peek(|r| -> Result<()> {
            r.advance(100)?;
            Ok(())
        });
        assert_eq!(reader.position(), pos_before);
    }

    #[test]
    fn slice_is_independent_of_parent_cursor() {
        let mut reader = Reader::new(&[1, 2, 3, 4, 5, 6]);
        reader.advance(4).unwrap();
        let sub = reader.slice(0, 2).unwrap();
        assert_eq!(sub.remaining(), 2);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn read_at_restores_cursor() {
        let mut reader = Reader::new(&[1, 2, 3, 4]);
        reader.advance(1).unwrap();
        let value = reader.read_at(2, |r| r.u8()).unwrap();
        assert_eq!(value, 3);
        assert_eq!(reader.position(), 1);
    }
}
