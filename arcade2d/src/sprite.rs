use serde::{Deserialize, Serialize};

use crate::surface::{Rect, Surface, GREEN};

/// Opaque handle to an image owned by whoever loads assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Where the draw position sits relative to the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

/// A sprite sheet laid out as `frames_x * frames_y` equal frames, read
/// left to right, top to bottom.
///
/// Sprites are small `Copy` descriptors; many objects share one texture
/// through the handle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub frame_width: f32,
    pub frame_height: f32,
    #[serde(default = "one")]
    pub frames_x: u32,
    #[serde(default = "one")]
    pub frames_y: u32,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(skip)]
    pub offset_x: f32,
    #[serde(skip)]
    pub offset_y: f32,
}

fn one() -> u32 {
    1
}

impl Sprite {
    /// Sprite over an image of `image_width * image_height` pixels, centred.
    pub fn new(
        texture: TextureHandle,
        image_width: u32,
        image_height: u32,
        frames_x: u32,
        frames_y: u32,
    ) -> Self {
        let frames_x = frames_x.max(1);
        let frames_y = frames_y.max(1);
        let mut sprite = Self {
            texture,
            frame_width: (image_width / frames_x) as f32,
            frame_height: (image_height / frames_y) as f32,
            frames_x,
            frames_y,
            alignment: Alignment::Center,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        sprite.align(Alignment::Center);
        sprite
    }

    /// Recompute the draw offset for `alignment`.
    pub fn align(&mut self, alignment: Alignment) {
        let (w, h) = (self.frame_width, self.frame_height);
        let (ox, oy) = match alignment {
            Alignment::Center => (-w * 0.5, -h * 0.5),
            Alignment::TopLeft => (0.0, 0.0),
            Alignment::Top => (-w * 0.5, 0.0),
            Alignment::TopRight => (-w, 0.0),
            Alignment::Right => (-w, -h * 0.5),
            Alignment::BottomRight => (-w, -h),
            Alignment::Bottom => (-w * 0.5, -h),
            Alignment::BottomLeft => (0.0, -h),
            Alignment::Left => (0.0, -h * 0.5),
        };
        self.alignment = alignment;
        self.offset_x = ox;
        self.offset_y = oy;
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.align(alignment);
        self
    }

    pub fn num_frames(&self) -> u32 {
        self.frames_x * self.frames_y
    }

    /// Source rectangle for `frame`, or `None` when out of range.
    pub fn frame_rect(&self, frame: u32) -> Option<Rect> {
        if frame >= self.num_frames() {
            return None;
        }
        let fx = frame % self.frames_x;
        let fy = frame / self.frames_x;
        Some(Rect::new(
            fx as f32 * self.frame_width,
            fy as f32 * self.frame_height,
            self.frame_width,
            self.frame_height,
        ))
    }

    /// Draw `frame` at `(x, y)`. Out-of-range frames draw nothing.
    pub fn draw(&self, surface: &mut dyn Surface, x: f32, y: f32, frame: u32) {
        if let Some(src) = self.frame_rect(frame) {
            surface.draw_image_region(
                self.texture,
                src,
                (x + self.offset_x).floor(),
                (y + self.offset_y).floor(),
            );
        }
    }

    /// Outline of the frame at `(x, y)`.
    pub fn draw_debug(&self, surface: &mut dyn Surface, x: f32, y: f32) {
        surface.stroke_rect(
            Rect::new(
                (x + self.offset_x).floor(),
                (y + self.offset_y).floor(),
                self.frame_width,
                self.frame_height,
            ),
            GREEN,
        );
    }
}

/// Per-object animation cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimState {
    pub current_frame: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn frame_rect_walks_rows() {
        let sprite = Sprite::new(TextureHandle::new(1), 64, 32, 4, 2);
        assert_eq!(sprite.frame_rect(5), Some(Rect::new(16.0, 16.0, 16.0, 16.0)));
        assert_eq!(sprite.frame_rect(8), None);
    }

    #[test]
    fn centred_draw_subtracts_half_frame() {
        let sprite = Sprite::new(TextureHandle::new(3), 16, 8, 1, 1);
        let mut surface = RecordingSurface::new();
        sprite.draw(&mut surface, 100.0, 50.0, 0);
        assert_eq!(
            surface.commands,
            vec![DrawCommand::Image {
                texture: TextureHandle::new(3),
                src: Rect::new(0.0, 0.0, 16.0, 8.0),
                x: 92.0,
                y: 46.0,
            }]
        );
    }
}
