// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CPU-side multi-channel signed-distance-field glyph atlas builder.
//!
//! Four stages, one module each: `edge` extracts and colors path edges,
//! `distance` computes signed per-channel distances and the inside/outside
//! test, `pack` shelf-packs rendered glyphs into a canvas, and `atlas`
//! ties them together into a `GlyphAtlas`.

pub mod atlas;
pub mod distance;
pub mod edge;
pub mod pack;

pub use atlas::{build_atlas, render_glyph_msdf, AtlasConfig, GlyphAtlas, GlyphInput, GlyphMetrics};
