// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The path model shared by every outline provider and consumed by the
//! MSDF rasterizer: a flat command list in font design units, with no
//! notion of "contour" beyond the `Close` command that ends one.

use euclid::default::Point2D;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2D<f32>),
    LineTo(Point2D<f32>),
    QuadTo(Point2D<f32>, Point2D<f32>),
    CubicTo(Point2D<f32>, Point2D<f32>, Point2D<f32>),
    Close,
}

/// A glyph's outline: one or more closed contours expressed as path
/// commands, plus the bounding box the source table declared for it.
#[derive(Clone, Debug, Default)]
pub struct Outline {
    pub commands: Vec<PathCommand>,
}

impl Outline {
    pub fn new() -> Outline {
        Outline { commands: Vec::new() }
    }

    #[inline]
    pub fn move_to(&mut self, point: Point2D<f32>) {
        self.commands.push(PathCommand::MoveTo(point));
    }

    #[inline]
    pub fn line_to(&mut self, point: Point2D<f32>) {
        self.commands.push(PathCommand::LineTo(point));
    }

    #[inline]
    pub fn quad_to(&mut self, control: Point2D<f32>, point: Point2D<f32>) {
        self.commands.push(PathCommand::QuadTo(control, point));
    }

    #[inline]
    pub fn cubic_to(&mut self, control1: Point2D<f32>, control2: Point2D<f32>, point: Point2D<f32>) {
        self.commands.push(PathCommand::CubicTo(control1, control2, point));
    }

    #[inline]
    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
