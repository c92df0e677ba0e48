// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ties the four MSDF stages together into a CPU-rendered glyph atlas:
//! one RGB bitmap per glyph, shelf-packed into a single canvas, with the
//! per-glyph metrics a renderer needs to place and sample it.
//!
//! Public type names (`GlyphMetrics`, `GlyphAtlas`, `AtlasConfig`) follow
//! the shape of `other_examples`'s `FerrousEngine` asset-pipeline re-exports
//! for a font atlas builder, since that is the only naming precedent in the
//! retrieval pack for this kind of module; the rendering algorithm itself
//! has no corpus implementation to ground on and instead follows this
//! crate's own MSDF rasterizer specification directly.

use std::collections::HashMap;

use euclid::default::Point2D;

use crate::error::Result;
use crate::outline::path::Outline;
use crate::tables::head::HeadTable;

use super::distance::{encode_distance, point_is_inside, signed_channel_distance};
use super::edge::{assign_colors, extract_contours, Channel};
use super::pack::{shelf_pack, Placement};

/// Where a glyph's rendered bitmap landed in the atlas, and the metrics
/// needed to lay it out relative to a baseline.
#[derive(Clone, Copy, Debug)]
pub struct GlyphMetrics {
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub width: u32,
    pub height: u32,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub advance: f32,
}

/// Tunables for `build_atlas` and `render_glyph_msdf`.
#[derive(Clone, Copy, Debug)]
pub struct AtlasConfig {
    pub font_size: f32,
    pub padding: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub spread: f32,
}

impl Default for AtlasConfig {
    fn default() -> AtlasConfig {
        AtlasConfig { font_size: 32.0, padding: 2, max_width: 2048, max_height: 2048, spread: 4.0 }
    }
}

/// A packed multi-channel signed-distance-field atlas: one RGB bitmap and
/// a metrics table keyed by glyph ID.
pub struct GlyphAtlas {
    pub bitmap: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub glyphs: HashMap<u16, GlyphMetrics>,
    pub font_size: f32,
}

/// One glyph's rendered MSDF bitmap plus the pixel dimensions it occupies,
/// ready to be packed into an atlas canvas.
struct RenderedGlyph {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    bearing_x: f32,
    bearing_y: f32,
    advance: f32,
}

/// Renders one glyph's outline into an RGB MSDF bitmap sized to fit its
/// scaled bounding box plus `config.padding` on every side.
pub fn render_glyph_msdf(
    outline: &Outline,
    units_per_em: u16,
    advance_width: u16,
    left_side_bearing: i16,
    config: &AtlasConfig,
) -> RenderedGlyph {
    let scale = config.font_size / units_per_em as f32;
    let padding = config.padding as f32;

    let bounds = outline_bounds(outline);
    let scaled_width = (bounds.2 - bounds.0) * scale;
    let scaled_height = (bounds.3 - bounds.1) * scale;

    let width = (scaled_width + padding * 2.0).ceil().max(1.0) as u32;
    let height = (scaled_height + padding * 2.0).ceil().max(1.0) as u32;

    // Flip Y so pixel row 0 is the glyph's top, and shift so the glyph's
    // ink bounding box sits inside the padded canvas.
    let offset_x = padding - bounds.0 * scale;
    let offset_y = padding + bounds.3 * scale;

    let contours = extract_contours(outline, scale, offset_x, offset_y, true);
    let colored_contours = assign_colors(contours);
    let all_edges: Vec<_> = colored_contours.into_iter().flatten().collect();

    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let sample = Point2D::new(x as f32 + 0.5, y as f32 + 0.5);
            let inside = point_is_inside(&all_edges, sample);
            let r = encode_distance(signed_channel_distance(&all_edges, Channel::R, sample, inside), config.spread);
            let g = encode_distance(signed_channel_distance(&all_edges, Channel::G, sample, inside), config.spread);
            let b = encode_distance(signed_channel_distance(&all_edges, Channel::B, sample, inside), config.spread);
            let index = ((y * width + x) * 3) as usize;
            pixels[index] = r;
            pixels[index + 1] = g;
            pixels[index + 2] = b;
        }
    }

    RenderedGlyph {
        pixels,
        width,
        height,
        bearing_x: left_side_bearing as f32 * scale,
        bearing_y: bounds.3 * scale,
        advance: advance_width as f32 * scale,
    }
}

/// The glyph's bounding box in design units: `(min_x, min_y, max_x, max_y)`.
fn outline_bounds(outline: &Outline) -> (f32, f32, f32, f32) {
    use crate::outline::path::PathCommand;

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut seen = false;

    let mut visit = |p: Point2D<f32>| {
        seen = true;
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    };

    for command in &outline.commands {
        match *command {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => visit(p),
            PathCommand::QuadTo(c, p) => {
                visit(c);
                visit(p);
            }
            PathCommand::CubicTo(c1, c2, p) => {
                visit(c1);
                visit(c2);
                visit(p);
            }
            PathCommand::Close => {}
        }
    }

    if seen { (min_x, min_y, max_x, max_y) } else { (0.0, 0.0, 0.0, 0.0) }
}

/// One glyph's outline and metrics, as fed into `build_atlas`.
pub struct GlyphInput {
    pub glyph_id: u16,
    pub outline: Outline,
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// Renders and shelf-packs every glyph in `glyphs` into one atlas.
/// Glyphs that don't fit within `config.max_width`/`config.max_height` are
/// silently omitted from the returned metrics map, not an error.
pub fn build_atlas(glyphs: &[GlyphInput], head: &HeadTable, config: &AtlasConfig) -> Result<GlyphAtlas> {
    let rendered: Vec<RenderedGlyph> = glyphs
        .iter()
        .map(|g| render_glyph_msdf(&g.outline, head.units_per_em, g.advance_width, g.left_side_bearing, config))
        .collect();

    let rects: Vec<(u32, u32)> = rendered.iter().map(|r| (r.width, r.height)).collect();
    let packed = shelf_pack(&rects, config.max_width, config.max_height);

    let mut bitmap = vec![0u8; (packed.width * packed.height * 3) as usize];
    let mut metrics = HashMap::with_capacity(glyphs.len());

    for ((glyph, rendered), placement) in glyphs.iter().zip(&rendered).zip(&packed.placements) {
        let Placement { x: atlas_x, y: atlas_y } = match placement {
            Some(p) => *p,
            None => continue,
        };
        blit(&mut bitmap, packed.width, atlas_x, atlas_y, &rendered.pixels, rendered.width, rendered.height);
        metrics.insert(
            glyph.glyph_id,
            GlyphMetrics {
                atlas_x,
                atlas_y,
                width: rendered.width,
                height: rendered.height,
                bearing_x: rendered.bearing_x,
                bearing_y: rendered.bearing_y,
                advance: rendered.advance,
            },
        );
    }

    Ok(GlyphAtlas { bitmap, width: packed.width, height: packed.height, glyphs: metrics, font_size: config.font_size })
}

fn blit(dest: &mut [u8], dest_width: u32, x: u32, y: u32, src: &[u8], src_width: u32, src_height: u32) {
    for row in 0..src_height {
        let src_start = (row * src_width * 3) as usize;
        let src_row = &src[src_start..src_start + (src_width * 3) as usize];
        let dest_start = (((y + row) * dest_width + x) * 3) as usize;
        dest[dest_start..dest_start + src_row.len()].copy_from_slice(src_row);
    }
}
