//! Stateless 2D overlap tests and the tagged [`CollisionBounds`] shape.
//!
//! AABBs are given as centre plus half extents. Touching counts as
//! overlapping everywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::surface::{Color, Rect, Surface};

pub fn test_aabb_point(x1: f32, y1: f32, hw1: f32, hh1: f32, x2: f32, y2: f32) -> bool {
    (x1 - x2).abs() <= hw1 && (y1 - y2).abs() <= hh1
}

#[allow(clippy::too_many_arguments)]
pub fn test_aabb_aabb(
    x1: f32,
    y1: f32,
    hw1: f32,
    hh1: f32,
    x2: f32,
    y2: f32,
    hw2: f32,
    hh2: f32,
) -> bool {
    (x1 - x2).abs() <= hw1 + hw2 && (y1 - y2).abs() <= hh1 + hh2
}

/// Which of the nine zones around an AABB contains `(x2, y2)`.
///
/// ```text
/// 0 | 1 | 2
/// --+---+--
/// 3 | 4 | 5
/// --+---+--
/// 6 | 7 | 8
/// ```
pub fn aabb_point_region(x1: f32, y1: f32, hw1: f32, hh1: f32, x2: f32, y2: f32) -> u8 {
    let xt = if x2 < x1 - hw1 {
        0
    } else if x2 > x1 + hw1 {
        2
    } else {
        1
    };
    let yt = if y2 < y1 - hh1 {
        0
    } else if y2 > y1 + hh1 {
        2
    } else {
        1
    };
    xt + 3 * yt
}

pub fn test_aabb_circle(x1: f32, y1: f32, hw1: f32, hh1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    match aabb_point_region(x1, y1, hw1, hh1, x2, y2) {
        4 => true,
        1 | 7 => (y2 - y1).abs() <= r2 + hh1,
        3 | 5 => (x2 - x1).abs() <= r2 + hw1,
        zone => {
            let cx = if zone == 0 || zone == 6 { x1 - hw1 } else { x1 + hw1 };
            let cy = if zone == 0 || zone == 2 { y1 - hh1 } else { y1 + hh1 };
            test_circle_point(x2, y2, r2, cx, cy)
        }
    }
}

pub fn test_circle_point(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy <= r1 * r1
}

pub fn test_circle_circle(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let r = r1 + r2;
    dx * dx + dy * dy <= r * r
}

/// True only when circle 2 lies strictly inside circle 1.
pub fn test_circle_inside_circle(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let dr = r1 - r2;
    dr > 0.0 && dx * dx + dy * dy < dr * dr
}

/// Segment `a0-a1` against segment `b0-b1`. Returns the intersection point.
///
/// Parallel and coincident segments report no intersection.
pub fn test_line_line(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<Vec2> {
    let denom = (b1.y - b0.y) * (a1.x - a0.x) - (b1.x - b0.x) * (a1.y - a0.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((b1.x - b0.x) * (a0.y - b0.y) - (b1.y - b0.y) * (a0.x - b0.x)) / denom;
    let ub = ((a1.x - a0.x) * (a0.y - b0.y) - (a1.y - a0.y) * (a0.x - b0.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(Vec2::new(a0.x + ua * (a1.x - a0.x), a0.y + ua * (a1.y - a0.y)))
    } else {
        None
    }
}

/// Clip segment `start-end` against an AABB (Liang–Barsky).
///
/// Returns the entry and exit points of the clipped segment.
pub fn test_aabb_line(
    bx: f32,
    by: f32,
    bhw: f32,
    bhh: f32,
    start: Vec2,
    end: Vec2,
) -> Option<(Vec2, Vec2)> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let mut tmin = 0.0_f32;
    let mut tmax = 1.0_f32;

    // left, right, top, bottom edges
    let edges = [
        (-dx, start.x - (bx - bhw)),
        (dx, (bx + bhw) - start.x),
        (-dy, start.y - (by - bhh)),
        (dy, (by + bhh) - start.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > tmax {
                return None;
            }
            tmin = tmin.max(r);
        } else {
            if r < tmin {
                return None;
            }
            tmax = tmax.min(r);
        }
    }

    Some((
        Vec2::new(start.x + dx * tmin, start.y + dy * tmin),
        Vec2::new(start.x + dx * tmax, start.y + dy * tmax),
    ))
}

/// Circle against segment `start-end`, via the closest point on the segment.
///
/// Returns that closest point when it lies within the circle.
pub fn test_circle_line(cx: f32, cy: f32, r: f32, start: Vec2, end: Vec2) -> Option<Vec2> {
    let seg = end - start;
    let len_sq = seg.length_squared();
    let t = if len_sq > 0.0 {
        (((cx - start.x) * seg.x + (cy - start.y) * seg.y) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = start + seg * t;
    if test_circle_point(cx, cy, r, closest.x, closest.y) {
        Some(closest)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsShape {
    /// Collision disabled.
    #[default]
    None,
    Point,
    Circle,
    Aabb,
}

/// Collision shape owned by an object.
///
/// `hw` doubles as the radius for circles; `hh` is only used by AABBs.
/// Both stay non-negative: the setters take absolute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionBounds {
    pub shape: BoundsShape,
    pub pos: Vec2,
    pub hw: f32,
    pub hh: f32,
}

impl CollisionBounds {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn point(px: f32, py: f32) -> Self {
        let mut b = Self::default();
        b.set_point(px, py);
        b
    }

    pub fn circle(px: f32, py: f32, radius: f32) -> Self {
        let mut b = Self::default();
        b.set_circle(px, py, radius);
        b
    }

    /// AABB from full `width` and `height`.
    pub fn aabb(px: f32, py: f32, width: f32, height: f32) -> Self {
        let mut b = Self::default();
        b.set_aabb(px, py, width, height);
        b
    }

    /// Raw setter taking half extents directly.
    pub fn set(&mut self, shape: BoundsShape, px: f32, py: f32, hw: f32, hh: f32) {
        self.shape = shape;
        self.pos.set(px, py);
        self.hw = hw.abs();
        self.hh = hh.abs();
    }

    pub fn set_point(&mut self, px: f32, py: f32) {
        self.set(BoundsShape::Point, px, py, 0.0, 0.0);
    }

    pub fn set_circle(&mut self, px: f32, py: f32, radius: f32) {
        self.set(BoundsShape::Circle, px, py, radius, 0.0);
    }

    /// Set an AABB from full `width` and `height`; halves are stored.
    pub fn set_aabb(&mut self, px: f32, py: f32, width: f32, height: f32) {
        self.set(BoundsShape::Aabb, px, py, width * 0.5, height * 0.5);
    }

    pub fn is_enabled(&self) -> bool {
        self.shape != BoundsShape::None
    }

    /// Overlap test against another shape. Symmetric in its arguments;
    /// anything involving a disabled shape is `false`.
    pub fn test_collision(&self, that: &CollisionBounds) -> bool {
        use BoundsShape::*;

        let (a, b) = (self, that);
        match (a.shape, b.shape) {
            (None, _) | (_, None) => false,
            (Point, Point) => a.pos == b.pos,
            (Circle, Circle) => test_circle_circle(a.pos.x, a.pos.y, a.hw, b.pos.x, b.pos.y, b.hw),
            (Aabb, Aabb) => {
                test_aabb_aabb(a.pos.x, a.pos.y, a.hw, a.hh, b.pos.x, b.pos.y, b.hw, b.hh)
            }
            (Point, Circle) => test_circle_point(b.pos.x, b.pos.y, b.hw, a.pos.x, a.pos.y),
            (Circle, Point) => test_circle_point(a.pos.x, a.pos.y, a.hw, b.pos.x, b.pos.y),
            (Point, Aabb) => test_aabb_point(b.pos.x, b.pos.y, b.hw, b.hh, a.pos.x, a.pos.y),
            (Aabb, Point) => test_aabb_point(a.pos.x, a.pos.y, a.hw, a.hh, b.pos.x, b.pos.y),
            (Circle, Aabb) => {
                test_aabb_circle(b.pos.x, b.pos.y, b.hw, b.hh, a.pos.x, a.pos.y, a.hw)
            }
            (Aabb, Circle) => {
                test_aabb_circle(a.pos.x, a.pos.y, a.hw, a.hh, b.pos.x, b.pos.y, b.hw)
            }
        }
    }

    /// Does the shape contain the point `(x, y)`?
    pub fn test_point(&self, x: f32, y: f32) -> bool {
        match self.shape {
            BoundsShape::None => false,
            BoundsShape::Point => self.pos.is_equal_to_xy(x, y),
            BoundsShape::Circle => test_circle_point(self.pos.x, self.pos.y, self.hw, x, y),
            BoundsShape::Aabb => test_aabb_point(self.pos.x, self.pos.y, self.hw, self.hh, x, y),
        }
    }

    /// Half extents of the box enclosing the shape.
    pub fn half_extents(&self) -> (f32, f32) {
        match self.shape {
            BoundsShape::None | BoundsShape::Point => (0.0, 0.0),
            BoundsShape::Circle => (self.hw, self.hw),
            BoundsShape::Aabb => (self.hw, self.hh),
        }
    }

    pub fn draw_debug(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32, color: Color) {
        let x = self.pos.x + xofs;
        let y = self.pos.y + yofs;
        match self.shape {
            BoundsShape::None => {}
            BoundsShape::Point => surface.draw_point(x, y, color),
            BoundsShape::Aabb => surface.stroke_rect(
                Rect::new(
                    (x - self.hw).floor(),
                    (y - self.hh).floor(),
                    (self.hw * 2.0).floor(),
                    (self.hh * 2.0).floor(),
                ),
                color,
            ),
            BoundsShape::Circle => surface.stroke_circle(Vec2::new(x, y), self.hw, color),
        }
    }
}

impl fmt::Display for CollisionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            BoundsShape::None => write!(f, "DISABLED"),
            BoundsShape::Point => write!(f, "POINT: {}", self.pos),
            BoundsShape::Circle => write!(f, "CIRCLE: {}, r = {}", self.pos, self.hw),
            BoundsShape::Aabb => {
                write!(f, "AABB: {}, hw = {}, hh = {}", self.pos, self.hw, self.hh)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_circle_corner_zone_uses_corner_distance() {
        // circle centre just past the corner diagonal
        assert!(!test_aabb_circle(0.0, 0.0, 10.0, 10.0, 14.0, 14.0, 5.0));
        assert!(test_aabb_circle(0.0, 0.0, 10.0, 10.0, 13.0, 13.0, 5.0));
    }

    #[test]
    fn region_numbering() {
        assert_eq!(aabb_point_region(0.0, 0.0, 1.0, 1.0, -5.0, -5.0), 0);
        assert_eq!(aabb_point_region(0.0, 0.0, 1.0, 1.0, 0.0, 0.0), 4);
        assert_eq!(aabb_point_region(0.0, 0.0, 1.0, 1.0, 5.0, 5.0), 8);
        assert_eq!(aabb_point_region(0.0, 0.0, 1.0, 1.0, 5.0, 0.0), 5);
    }

    #[test]
    fn crossing_segments_meet_in_the_middle() {
        let hit = test_line_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        assert_eq!(hit, Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn parallel_segments_never_meet() {
        let hit = test_line_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn aabb_line_clips_to_box_edges() {
        let (entry, exit) =
            test_aabb_line(0.0, 0.0, 5.0, 5.0, Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0))
                .expect("segment crosses the box");
        assert_eq!(entry, Vec2::new(-5.0, 0.0));
        assert_eq!(exit, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn aabb_line_misses_parallel_outside() {
        let hit = test_aabb_line(0.0, 0.0, 5.0, 5.0, Vec2::new(-10.0, 6.0), Vec2::new(10.0, 6.0));
        assert!(hit.is_none());
    }

    #[test]
    fn circle_line_reports_closest_point() {
        let hit = test_circle_line(0.0, 0.0, 2.0, Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0));
        assert_eq!(hit, Some(Vec2::new(0.0, 1.0)));
        assert!(test_circle_line(0.0, 0.0, 0.5, Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0)).is_none());
    }

    #[test]
    fn circle_inside_circle() {
        assert!(test_circle_inside_circle(0.0, 0.0, 10.0, 1.0, 1.0, 2.0));
        assert!(!test_circle_inside_circle(0.0, 0.0, 10.0, 9.0, 0.0, 2.0));
    }

    #[test]
    fn disabled_bounds_never_collide() {
        let none = CollisionBounds::none();
        let pt = CollisionBounds::point(0.0, 0.0);
        assert!(!none.test_collision(&pt));
        assert!(!pt.test_collision(&none));
        assert!(!none.test_point(0.0, 0.0));
    }

    #[test]
    fn set_aabb_stores_halves() {
        let b = CollisionBounds::aabb(1.0, 2.0, 32.0, 24.0);
        assert_eq!((b.hw, b.hh), (16.0, 12.0));
        assert_eq!(b.to_string(), "AABB: (1, 2), hw = 16, hh = 12");
    }
}
