use std::time::Duration;

use anyhow::Result;

use crate::clock::GameClock;
use crate::config::CoreConfig;
use crate::surface::Surface;

/// Most ticks [`GameLoop::advance`] will run for one call before it drops
/// the remaining backlog.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;

/// Game-specific state driven by [`GameLoop`].
pub trait Simulation {
    /// Advance one tick. The clock has already moved to this tick.
    fn update(&mut self, clock: &GameClock) -> Result<()>;

    /// Render the state left by the preceding `update`.
    fn draw(&mut self, clock: &GameClock, surface: &mut dyn Surface) -> Result<()>;
}

/// Fixed-timestep driver: every tick advances the clock once, then runs
/// the whole update phase, then the whole draw phase.
#[derive(Debug)]
pub struct GameLoop {
    clock: GameClock,
    fixed_delta_time: Duration,
    fixed_time_accumulator: Duration,
    max_ticks_per_frame: u32,
    dropped_ticks: u64,
}

impl GameLoop {
    pub fn new(framerate: u32) -> Result<Self> {
        let clock = GameClock::new(framerate)?;
        Ok(Self {
            fixed_delta_time: clock.frame_duration(),
            clock,
            fixed_time_accumulator: Duration::ZERO,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            dropped_ticks: 0,
        })
    }

    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.framerate)
    }

    /// Cap on catch-up ticks per [`advance`](Self::advance). Zero is treated as one.
    #[must_use]
    pub fn with_max_ticks_per_frame(mut self, ticks: u32) -> Self {
        self.max_ticks_per_frame = ticks.max(1);
        self
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn fixed_delta_time(&self) -> Duration {
        self.fixed_delta_time
    }

    /// Ticks skipped because the backlog exceeded the per-frame cap.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Run exactly one tick.
    pub fn tick<S: Simulation + ?Sized>(&mut self, sim: &mut S, surface: &mut dyn Surface) -> Result<()> {
        self.clock.advance();
        sim.update(&self.clock)?;
        sim.draw(&self.clock, surface)
    }

    /// Run `ticks` ticks back to back, ignoring wall time.
    pub fn run_ticks<S: Simulation + ?Sized>(
        &mut self,
        sim: &mut S,
        surface: &mut dyn Surface,
        ticks: u32,
    ) -> Result<()> {
        for _ in 0..ticks {
            self.tick(sim, surface)?;
        }
        Ok(())
    }

    /// Feed `elapsed` wall time and run as many ticks as it covers.
    ///
    /// At most `max_ticks_per_frame` ticks run; a larger backlog is thrown
    /// away so a slow frame cannot snowball. Returns the ticks run.
    pub fn advance<S: Simulation + ?Sized>(
        &mut self,
        sim: &mut S,
        surface: &mut dyn Surface,
        elapsed: Duration,
    ) -> Result<u32> {
        self.fixed_time_accumulator += elapsed;
        let mut ran = 0;
        while ran < self.max_ticks_per_frame && self.should_run_fixed_update() {
            self.tick(sim, surface)?;
            ran += 1;
        }
        if self.fixed_time_accumulator >= self.fixed_delta_time {
            let backlog = self.fixed_time_accumulator.as_nanos() / self.fixed_delta_time.as_nanos().max(1);
            self.dropped_ticks += backlog as u64;
            log::debug!("game loop: dropping {backlog} ticks of backlog");
            self.fixed_time_accumulator = Duration::ZERO;
        }
        Ok(ran)
    }

    fn should_run_fixed_update(&mut self) -> bool {
        if self.fixed_time_accumulator >= self.fixed_delta_time {
            self.fixed_time_accumulator -= self.fixed_delta_time;
            true
        } else {
            false
        }
    }

    /// How far into the next tick the accumulator is, in `[0, 1]`.
    pub fn fixed_update_alpha(&self) -> f32 {
        if self.fixed_delta_time.as_secs_f32() > 0.0 {
            (self.fixed_time_accumulator.as_secs_f32() / self.fixed_delta_time.as_secs_f32()).min(1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[derive(Default)]
    struct Trace {
        calls: Vec<(&'static str, u64, u64)>,
    }

    impl Simulation for Trace {
        fn update(&mut self, clock: &GameClock) -> Result<()> {
            self.calls.push(("update", clock.frames(), clock.now_ms()));
            Ok(())
        }

        fn draw(&mut self, clock: &GameClock, _surface: &mut dyn Surface) -> Result<()> {
            self.calls.push(("draw", clock.frames(), clock.now_ms()));
            Ok(())
        }
    }

    #[test]
    fn ticks_advance_clock_then_update_then_draw() {
        let mut game_loop = GameLoop::new(60).unwrap();
        let mut sim = Trace::default();
        let mut surface = RecordingSurface::new();
        game_loop.run_ticks(&mut sim, &mut surface, 2).unwrap();
        assert_eq!(
            sim.calls,
            vec![
                ("update", 1, 34),
                ("draw", 1, 34),
                ("update", 2, 51),
                ("draw", 2, 51),
            ]
        );
    }

    #[test]
    fn advance_runs_whole_ticks_and_clamps_backlog() {
        let mut game_loop = GameLoop::new(50).unwrap().with_max_ticks_per_frame(3);
        let mut sim = Trace::default();
        let mut surface = RecordingSurface::new();

        assert_eq!(game_loop.advance(&mut sim, &mut surface, Duration::from_millis(30)).unwrap(), 1);
        assert_eq!(game_loop.advance(&mut sim, &mut surface, Duration::from_millis(10)).unwrap(), 1);
        assert_eq!(game_loop.advance(&mut sim, &mut surface, Duration::from_millis(200)).unwrap(), 3);
        assert_eq!(game_loop.dropped_ticks(), 7);
        assert_eq!(game_loop.clock().frames(), 5);
    }

    #[test]
    fn zero_framerate_is_rejected() {
        assert!(GameLoop::new(0).is_err());
    }
}
