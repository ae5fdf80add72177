//! The drawing surface the core issues calls against.
//!
//! The core never owns a window or a GPU context. Anything that can blit a
//! texture region and stroke a few debug shapes implements [`Surface`];
//! [`RecordingSurface`] captures calls for headless runs and tests.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::sprite::TextureHandle;

pub type Color = [f32; 4];

pub const RED: Color = [1.0, 0.0, 0.0, 1.0];
pub const GREEN: Color = [0.0, 1.0, 0.0, 1.0];
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Axis-aligned rectangle in pixels, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

pub trait Surface {
    /// Blit `src` from `texture` with its top-left corner at `(x, y)`.
    fn draw_image_region(&mut self, texture: TextureHandle, src: Rect, x: f32, y: f32);

    fn stroke_rect(&mut self, rect: Rect, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);

    /// Small pixel-aligned marker used for debug positions.
    fn draw_point(&mut self, x: f32, y: f32, color: Color) {
        self.stroke_rect(Rect::new((x - 1.0).floor(), (y - 1.0).floor(), 1.0, 1.0), color);
    }
}

/// One call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Image {
        texture: TextureHandle,
        src: Rect,
        x: f32,
        y: f32,
    },
    StrokeRect(Rect, Color),
    FillRect(Rect, Color),
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
}

/// Surface that stores every call in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of image blits recorded, ignoring debug shapes.
    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn draw_image_region(&mut self, texture: TextureHandle, src: Rect, x: f32, y: f32) {
        self.commands.push(DrawCommand::Image { texture, src, x, y });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::StrokeRect(rect, color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
        });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }
}
