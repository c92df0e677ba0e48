// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `fvar`: the variable-font axis list. This is the one variation-related
//! table parsed beyond a presence check, since every other variable-font
//! primitive (`avar` piecewise maps, `gvar` deltas, `MVAR` metric deltas)
//! needs an axis list as an input before it can do anything; parsing those
//! deltas and applying them is a shaping/UI layer's job, not this decoder's.

use crate::error::{FontError, Result};
use crate::reader::Reader;
use crate::tables::TAG_FVAR;

bitflags::bitflags! {
    pub struct AxisFlags: u16 {
        const HIDDEN_AXIS = 1 << 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariationAxisRecord {
    pub axis_tag: crate::error::Tag,
    pub min_value: f32,
    pub default_value: f32,
    pub max_value: f32,
    pub flags: u16,
    pub axis_name_id: u16,
}

#[derive(Clone, Debug)]
pub struct FvarTable {
    pub axes: Vec<VariationAxisRecord>,
    pub instance_count: u16,
    pub instance_size: u16,
}

impl FvarTable {
    pub fn parse(reader: &mut Reader) -> Result<FvarTable> {
        let major_version = reader.u16()?;
        let minor_version = reader.u16()?;
        if major_version != 1 || minor_version != 0 {
            return Err(FontError::invalid_table(TAG_FVAR, "unsupported version"));
        }
        let axes_array_offset = reader.offset16()?;
        let _reserved = reader.u16()?;
        let axis_count = reader.u16()?;
        let axis_size = reader.u16()?;
        let instance_count = reader.u16()?;
        let instance_size = reader.u16()?;

        let axes_reader = reader.slice_from(axes_array_offset as usize)?;
        let mut axes = Vec::with_capacity(axis_count as usize);
        for index in 0..axis_count {
            let mut axis_reader = axes_reader.slice(index as usize * axis_size as usize, axis_size as usize)?;
            axes.push(VariationAxisRecord {
                axis_tag: axis_reader.tag()?,
                min_value: axis_reader.fixed()?,
                default_value: axis_reader.fixed()?,
                max_value: axis_reader.fixed()?,
                flags: axis_reader.u16()?,
                axis_name_id: axis_reader.u16()?,
            });
        }

        Ok(FvarTable { axes, instance_count, instance_size })
    }
}
