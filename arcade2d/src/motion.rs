//! Small integrators for player-style movement.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Force-driven body with a speed cap and per-step friction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleBody {
    pub pos: Vec2,
    pub vel: Vec2,
    #[serde(skip)]
    pub acc: Vec2,
    /// Velocity multiplier applied after each step.
    pub friction: f32,
    pub max_speed: f32,
}

impl SimpleBody {
    pub fn new(friction: f32, max_speed: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            friction,
            max_speed,
        }
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.acc += force;
    }

    /// Integrate one step of `dt` seconds. Accumulated force is consumed.
    pub fn step(&mut self, dt: f32) {
        self.vel += self.acc * dt;
        if self.vel.length_squared() > self.max_speed * self.max_speed {
            self.vel.set_length(self.max_speed);
        }
        self.pos += self.vel * dt;
        self.vel *= self.friction;
        self.acc = Vec2::ZERO;
    }
}

/// Damped spring pulling a point mass toward `target`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassSpring {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Vec2,
    pub gravity: Vec2,
    mass: f32,
    friction: f32,
    stiffness: f32,
}

impl MassSpring {
    pub fn new(mass: f32, friction: f32, stiffness: f32) -> Self {
        let mut spring = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            target: Vec2::ZERO,
            gravity: Vec2::ZERO,
            mass: 1.0,
            friction: 0.0,
            stiffness: 0.0,
        };
        spring.set_spring_parameters(mass, friction, stiffness);
        spring
    }

    /// Non-positive masses fall back to 1.
    pub fn set_spring_parameters(&mut self, mass: f32, friction: f32, stiffness: f32) {
        self.mass = if mass > 0.0 { mass } else { 1.0 };
        self.friction = friction;
        self.stiffness = stiffness;
    }

    /// Semi-implicit Euler: velocity first, then position from the new velocity.
    pub fn step(&mut self, dt: f32) {
        let scale = dt / self.mass;
        let force = self.vel * -self.friction - (self.pos - self.target) * self.stiffness + self.gravity * self.mass;
        self.vel += force * scale;
        self.pos += self.vel * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_speed_is_capped_and_force_consumed() {
        let mut body = SimpleBody::new(1.0, 10.0);
        body.add_force(Vec2::new(1000.0, 0.0));
        body.step(1.0);
        assert!((body.vel.length() - 10.0).abs() < 1e-4);
        assert_eq!(body.acc, Vec2::ZERO);
        assert!((body.pos.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn friction_bleeds_velocity() {
        let mut body = SimpleBody::new(0.5, 100.0);
        body.vel = Vec2::new(8.0, 0.0);
        body.step(0.0);
        assert_eq!(body.vel, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn spring_settles_on_target() {
        let mut spring = MassSpring::new(0.5, 5.0, 100.0);
        spring.target = Vec2::new(16.0, 8.0);
        for _ in 0..600 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.pos.distance(spring.target) < 0.01);
    }
}
