use std::time::Duration;

use crate::error::CoreError;

/// Game time advanced exactly once per tick by the driver.
///
/// Everything else reads it. `time_ms` starts one frame period in so that
/// objects activated on the first tick have a non-zero timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameClock {
    framerate: u32,
    frame_ms: u64,
    frame_s: f32,
    time_ms: u64,
    frames: u64,
}

impl GameClock {
    pub fn new(framerate: u32) -> Result<Self, CoreError> {
        if framerate == 0 {
            return Err(CoreError::ZeroFramerate);
        }
        let frame_ms = (1000 + u64::from(framerate) - 1) / u64::from(framerate);
        Ok(Self {
            framerate,
            frame_ms,
            frame_s: 1.0 / framerate as f32,
            time_ms: frame_ms,
            frames: 0,
        })
    }

    /// Step forward by one tick.
    pub fn advance(&mut self) {
        self.time_ms += self.frame_ms;
        self.frames += 1;
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    /// Frame period in whole milliseconds, rounded up.
    pub fn frame_ms(&self) -> u64 {
        self.frame_ms
    }

    /// Frame period in seconds, for integrating velocities.
    pub fn frame_s(&self) -> f32 {
        self.frame_s
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.framerate))
    }

    pub fn now_ms(&self) -> u64 {
        self.time_ms
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
