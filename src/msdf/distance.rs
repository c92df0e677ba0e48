// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stage 3: per-pixel signed distance to the nearest edge of each color
//! channel, and the ray-casting inside/outside test used to fix up each
//! channel's sign.

use euclid::default::{Point2D, Vector2D};

use super::edge::{Channel, ColoredEdge, Edge};

const NEWTON_SEEDS: [f32; 6] = [1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0, 4.0 / 6.0, 5.0 / 6.0, 1.0];
const NEWTON_ITERATIONS: u32 = 3;
const NEWTON_DENOMINATOR_EPSILON: f32 = 1e-10;

#[inline]
fn dot(a: Vector2D<f32>, b: Vector2D<f32>) -> f32 {
    a.x * b.x + a.y * b.y
}

#[inline]
fn cross(a: Vector2D<f32>, b: Vector2D<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Unsigned-magnitude distance from `p` to a line edge, signed by which
/// side of the directed line `p` falls on (positive = left of travel).
fn line_distance(p0: Point2D<f32>, p1: Point2D<f32>, sample: Point2D<f32>) -> f32 {
    let dir = p1 - p0;
    let len_sq = dot(dir, dir);
    let t = if len_sq > NEWTON_DENOMINATOR_EPSILON {
        (dot(sample - p0, dir) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = p0 + dir * t;
    let offset = sample - closest;
    let magnitude = offset.length();
    let sign = cross(dir, offset);
    if sign >= 0.0 { magnitude } else { -magnitude }
}

fn newton_refine_quadratic(p0: Point2D<f32>, p1: Point2D<f32>, p2: Point2D<f32>, sample: Point2D<f32>, seed: f32) -> f32 {
    let mut t = seed;
    for _ in 0..NEWTON_ITERATIONS {
        let b = super::edge::quadratic_point(p0, p1, p2, t);
        let d1 = (p1 - p0) * 2.0 * (1.0 - t) + (p2 - p1) * 2.0 * t; // B'(t)
        let d2 = ((p2 - p1) - (p1 - p0)) * 2.0; // B''(t), constant for quadratics
        let offset = b - sample;
        let denom = dot(d1, d1) + dot(offset, d2);
        if denom.abs() < NEWTON_DENOMINATOR_EPSILON {
            break;
        }
        let numerator = dot(offset, d1);
        t = (t - numerator / denom).clamp(0.0, 1.0);
    }
    t
}

fn quadratic_distance(p0: Point2D<f32>, p1: Point2D<f32>, p2: Point2D<f32>, sample: Point2D<f32>) -> f32 {
    let mut best_dist_sq = f32::MAX;
    let mut best_offset = Vector2D::new(0.0, 0.0);
    let mut best_tangent = Vector2D::new(0.0, 0.0);
    for &seed in &NEWTON_SEEDS {
        let t = newton_refine_quadratic(p0, p1, p2, sample, seed);
        let b = super::edge::quadratic_point(p0, p1, p2, t);
        let offset = sample - b;
        let dist_sq = dot(offset, offset);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best_offset = offset;
            best_tangent = (p1 - p0) * 2.0 * (1.0 - t) + (p2 - p1) * 2.0 * t;
        }
    }
    let magnitude = best_dist_sq.sqrt();
    let sign = cross(best_tangent, best_offset);
    if sign >= 0.0 { magnitude } else { -magnitude }
}

fn newton_refine_cubic(
    p0: Point2D<f32>,
    p1: Point2D<f32>,
    p2: Point2D<f32>,
    p3: Point2D<f32>,
    sample: Point2D<f32>,
    seed: f32,
) -> f32 {
    let mut t = seed;
    for _ in 0..NEWTON_ITERATIONS {
        let b = super::edge::cubic_point(p0, p1, p2, p3, t);
        let mt = 1.0 - t;
        let d1 = (p1 - p0) * 3.0 * mt * mt + (p2 - p1) * 6.0 * mt * t + (p3 - p2) * 3.0 * t * t;
        let d2 = ((p2 - p1) - (p1 - p0)) * 6.0 * mt + ((p3 - p2) - (p2 - p1)) * 6.0 * t;
        let offset = b - sample;
        let denom = dot(d1, d1) + dot(offset, d2);
        if denom.abs() < NEWTON_DENOMINATOR_EPSILON {
            break;
        }
        let numerator = dot(offset, d1);
        t = (t - numerator / denom).clamp(0.0, 1.0);
    }
    t
}

fn cubic_distance(p0: Point2D<f32>, p1: Point2D<f32>, p2: Point2D<f32>, p3: Point2D<f32>, sample: Point2D<f32>) -> f32 {
    let mut best_dist_sq = f32::MAX;
    let mut best_offset = Vector2D::new(0.0, 0.0);
    let mut best_tangent = Vector2D::new(0.0, 0.0);
    for &seed in &NEWTON_SEEDS {
        let t = newton_refine_cubic(p0, p1, p2, p3, sample, seed);
        let b = super::edge::cubic_point(p0, p1, p2, p3, t);
        let offset = sample - b;
        let dist_sq = dot(offset, offset);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best_offset = offset;
            let mt = 1.0 - t;
            best_tangent = (p1 - p0) * 3.0 * mt * mt + (p2 - p1) * 6.0 * mt * t + (p3 - p2) * 3.0 * t * t;
        }
    }
    let magnitude = best_dist_sq.sqrt();
    let sign = cross(best_tangent, best_offset);
    if sign >= 0.0 { magnitude } else { -magnitude }
}

/// Signed distance from `sample` to a single edge, with the edge's own
/// local sign convention (positive = left of travel direction).
fn edge_distance(edge: &Edge, sample: Point2D<f32>) -> f32 {
    match *edge {
        Edge::Line(p0, p1) => line_distance(p0, p1, sample),
        Edge::Quadratic(p0, p1, p2) => quadratic_distance(p0, p1, p2, sample),
        Edge::Cubic(p0, p1, p2, p3) => cubic_distance(p0, p1, p2, p3, sample),
    }
}

/// The minimum-magnitude signed distance from `sample` to the edges of one
/// channel, falling back to the full edge set if that channel is empty in
/// this glyph (can happen for very simple shapes that never needed a third
/// color).
pub fn channel_distance(edges: &[ColoredEdge], channel: Channel, sample: Point2D<f32>) -> f32 {
    let mut best: Option<f32> = None;
    for colored in edges.iter().filter(|c| c.channel == channel) {
        let d = edge_distance(&colored.edge, sample);
        best = Some(match best {
            Some(current) if current.abs() <= d.abs() => current,
            _ => d,
        });
    }
    if best.is_none() {
        for colored in edges {
            let d = edge_distance(&colored.edge, sample);
            best = Some(match best {
                Some(current) if current.abs() <= d.abs() => current,
                _ => d,
            });
        }
    }
    best.unwrap_or(f32::MAX)
}

/// Ray-casting parity test: counts crossings of a rightward horizontal ray
/// from `sample` against every edge, flattening curves to 8 points first.
pub fn point_is_inside(edges: &[ColoredEdge], sample: Point2D<f32>) -> bool {
    let mut crossings = 0u32;
    for colored in edges {
        let points = colored.edge.flatten();
        for window in points.windows(2) {
            let (a, b) = (window[0], window[1]);
            if ray_crosses_segment(a, b, sample) {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

fn ray_crosses_segment(a: Point2D<f32>, b: Point2D<f32>, sample: Point2D<f32>) -> bool {
    if (a.y > sample.y) == (b.y > sample.y) {
        return false;
    }
    let t = (sample.y - a.y) / (b.y - a.y);
    let x_at_y = a.x + t * (b.x - a.x);
    x_at_y > sample.x
}

/// Applies the inside/outside sign to a channel's raw (edge-local-signed)
/// distance: positive inside the shape, negative outside, overriding
/// whatever sign the nearest edge's own convention produced.
pub fn signed_channel_distance(edges: &[ColoredEdge], channel: Channel, sample: Point2D<f32>, inside: bool) -> f32 {
    let magnitude = channel_distance(edges, channel, sample).abs();
    if inside { magnitude } else { -magnitude }
}

/// Encodes a signed distance in design-space units into the `[0, 255]`
/// byte range used by an MSDF texel channel.
pub fn encode_distance(signed_distance: f32, spread: f32) -> u8 {
    let value = 128.0 + (signed_distance / spread) * 127.0;
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_distance_is_zero_on_the_line() {
        let d = line_distance(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(5.0, 0.0));
        assert!(d.abs() < 1e-4);
    }

    #[test]
    fn line_distance_sign_flips_across_the_line() {
        let above = line_distance(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(5.0, 1.0));
        let below = line_distance(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(5.0, -1.0));
        assert!(above * below < 0.0);
    }

    #[test]
    fn ray_cast_square_interior_and_exterior() {
        let square = vec![
            ColoredEdge { edge: Edge::Line(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)), channel: Channel::R },
            ColoredEdge { edge: Edge::Line(Point2D::new(10.0, 0.0), Point2D::new(10.0, 10.0)), channel: Channel::R },
            ColoredEdge { edge: Edge::Line(Point2D::new(10.0, 10.0), Point2D::new(0.0, 10.0)), channel: Channel::R },
            ColoredEdge { edge: Edge::Line(Point2D::new(0.0, 10.0), Point2D::new(0.0, 0.0)), channel: Channel::R },
        ];
        assert!(point_is_inside(&square, Point2D::new(5.0, 5.0)));
        assert!(!point_is_inside(&square, Point2D::new(15.0, 5.0)));
    }

    #[test]
    fn encode_distance_midpoint_is_128() {
        assert_eq!(encode_distance(0.0, 4.0), 128);
    }

    #[test]
    fn encode_distance_saturates() {
        assert_eq!(encode_distance(1000.0, 4.0), 255);
        assert_eq!(encode_distance(-1000.0, 4.0), 0);
    }
}
