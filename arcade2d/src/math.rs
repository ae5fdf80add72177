use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// 2D vector used for positions, velocities and collision extents.
///
/// Arithmetic comes in two flavours: the operator overloads return new
/// values, while the named methods (`add_xy`, `normalize`, `set_length`, ...)
/// mutate in place and return `&mut Self` so calls can be chained on a
/// scratch vector without allocating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a unit vector pointing in the given direction (angle in radians).
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn to_glam(&self) -> GlamVec2 {
        GlamVec2::new(self.x, self.y)
    }

    pub fn zero(&mut self) -> &mut Self {
        self.x = 0.0;
        self.y = 0.0;
        self
    }

    pub fn set(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn add_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.x += x;
        self.y += y;
        self
    }

    pub fn sub_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.x -= x;
        self.y -= y;
        self
    }

    pub fn scale(&mut self, s: f32) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the squared length of the vector (faster than `length()`).
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Scales the vector to unit length. A zero vector is left untouched.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            self.x *= inv;
            self.y *= inv;
        }
        self
    }

    /// Returns a unit-length copy, or zero for a zero vector.
    pub fn normalized(&self) -> Self {
        let mut v = *self;
        v.normalize();
        v
    }

    /// Rescales the vector to `len`. A zero vector has no direction and is left untouched.
    pub fn set_length(&mut self, len: f32) -> &mut Self {
        let current = self.length();
        if current > 0.0 {
            let s = len / current;
            self.x *= s;
            self.y *= s;
        }
        self
    }

    /// Overwrites this vector with the unit vector for `angle` (radians).
    pub fn set_angle(&mut self, angle: f32) -> &mut Self {
        self.x = angle.cos();
        self.y = angle.sin();
        self
    }

    /// Heading of the vector in radians, in `(-PI, PI]`.
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotates around `pivot` by `angle` radians.
    pub fn rotate(&mut self, angle: f32, pivot: Vec2) -> &mut Self {
        let (sin, cos) = angle.sin_cos();
        self.rotate_precalculated(sin, cos, pivot)
    }

    /// Same as [`Vec2::rotate`] with the sine and cosine already known, for
    /// rotating many points by the same angle.
    pub fn rotate_precalculated(&mut self, sin: f32, cos: f32, pivot: Vec2) -> &mut Self {
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        self.x = pivot.x + dx * cos - dy * sin;
        self.y = pivot.y + dx * sin + dy * cos;
        self
    }

    /// Computes the dot product of two vectors.
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Computes the distance between two points.
    pub fn distance(self, rhs: Self) -> f32 {
        (self - rhs).length()
    }

    /// Computes the squared distance between two points (faster than `distance()`).
    pub fn distance_squared(self, rhs: Self) -> f32 {
        (self - rhs).length_squared()
    }

    pub fn distance_squared_xy(self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }

    pub fn is_equal_to_xy(&self, x: f32, y: f32) -> bool {
        self.x == x && self.y == y
    }

    /// Linearly interpolates between two vectors.
    pub fn lerp(self, rhs: Self, t: f32) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
        )
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl From<GlamVec2> for Vec2 {
    fn from(value: GlamVec2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Camera offset applied to world-space draw calls.
///
/// No zoom or parallax: the render list only subtracts the position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

impl Camera2D {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }

    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        world_pos - self.position
    }

    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        screen_pos + self.position
    }
}

/// Maps `x` from `[min, max]` onto `[0, 1]`, clamping outside the range.
pub fn clamp_scaled(x: f32, min: f32, max: f32) -> f32 {
    if x < min {
        0.0
    } else if x > max {
        1.0
    } else if max > min {
        (x - min) / (max - min)
    } else {
        1.0
    }
}

/// Hermite smoothing `3x^2 - 2x^3`.
pub fn smooth_step(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

/// Picks a frame from a strip of `num_frames` images covering `arc` degrees
/// starting at `start_angle`. Angles are in degrees.
pub fn frame_from_angle(
    angle: f32,
    num_frames: u32,
    start_frame: u32,
    start_angle: f32,
    arc: f32,
) -> u32 {
    if num_frames == 0 || arc <= 0.0 {
        return start_frame;
    }
    let wrapped = angle.rem_euclid(arc);
    let frame = (((wrapped - start_angle) * num_frames as f32) / arc).round();
    if frame >= 0.0 && (frame as u32) < num_frames {
        start_frame + frame as u32
    } else {
        start_frame
    }
}
