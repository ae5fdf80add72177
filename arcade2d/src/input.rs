use std::collections::{HashMap, HashSet};

use crate::math::Vec2;

/// Opaque key identifier. The platform layer decides the numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u32);

/// Keyboard and mouse state as seen by one simulation tick.
///
/// The platform layer feeds events in between ticks; the simulation only
/// reads. Call [`begin_frame`](Self::begin_frame) after each tick to clear
/// the edge flags.
#[derive(Clone, Debug, Default)]
pub struct InputSnapshot {
    keys_down: HashSet<KeyId>,
    keys_pressed: HashSet<KeyId>,
    keys_released: HashSet<KeyId>,
    held_since_ms: HashMap<KeyId, u64>,

    mouse_delta: Vec2,
    mouse_left: bool,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags and the mouse delta.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Key went down at game time `now_ms`. Auto-repeat presses of a held key are ignored.
    pub fn press(&mut self, key: KeyId, now_ms: u64) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
            self.held_since_ms.insert(key, now_ms);
        }
    }

    pub fn release(&mut self, key: KeyId) {
        if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
            self.held_since_ms.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyId) -> bool {
        self.keys_down.contains(&key)
    }

    /// Went down since the last `begin_frame`.
    pub fn is_key_pressed(&self, key: KeyId) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyId) -> bool {
        self.keys_released.contains(&key)
    }

    /// How long `key` has been held at `now_ms`; 0 when it is up.
    pub fn held_duration_ms(&self, key: KeyId, now_ms: u64) -> u64 {
        self.held_since_ms
            .get(&key)
            .map_or(0, |&since| now_ms.saturating_sub(since))
    }

    /// Accumulate relative mouse motion for this frame.
    pub fn move_mouse(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.add_xy(dx, dy);
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn set_mouse_left(&mut self, down: bool) {
        self.mouse_left = down;
    }

    pub fn is_mouse_left_down(&self) -> bool {
        self.mouse_left
    }

    /// -1, 0 or 1 depending on which of the two keys are held.
    pub fn axis(&self, negative: KeyId, positive: KeyId) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        if self.is_key_down(positive) {
            value += 1.0;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRE: KeyId = KeyId(32);

    #[test]
    fn edge_flags_last_one_frame() {
        let mut input = InputSnapshot::new();
        input.press(FIRE, 100);
        assert!(input.is_key_pressed(FIRE));
        assert!(input.is_key_down(FIRE));

        input.begin_frame();
        input.press(FIRE, 117);
        assert!(!input.is_key_pressed(FIRE));
        assert_eq!(input.held_duration_ms(FIRE, 150), 50);

        input.release(FIRE);
        assert!(input.is_key_released(FIRE));
        assert_eq!(input.held_duration_ms(FIRE, 200), 0);
    }

    #[test]
    fn mouse_delta_accumulates_until_frame_start() {
        let mut input = InputSnapshot::new();
        input.move_mouse(2.0, -1.0);
        input.move_mouse(1.0, 3.0);
        assert_eq!(input.mouse_delta(), Vec2::new(3.0, 2.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn axis_cancels_when_both_held() {
        let (left, right) = (KeyId(1), KeyId(2));
        let mut input = InputSnapshot::new();
        input.press(left, 0);
        assert_eq!(input.axis(left, right), -1.0);
        input.press(right, 0);
        assert_eq!(input.axis(left, right), 0.0);
    }
}
