//! Simulation clock with fixed-timestep accumulator

use crate::config::ClockConfig;
use std::time::{Duration, Instant};

/// Converts wall-clock time into a whole number of fixed simulation ticks.
///
/// Ticks run faster than the display refreshes; any number of ticks between
/// two frames collapse into one pending repaint.
pub struct SimulationClock {
    /// Total simulated time in seconds
    pub total_time: f64,
    /// Fixed timestep interval (default: 1/120 second)
    pub fixed_timestep: f64,
    /// Longest wall-clock gap accepted per advance
    pub max_frame_time: f64,
    /// Most ticks handed out per advance
    pub max_ticks_per_advance: u32,
    /// Accumulated wall time not yet consumed by ticks
    accumulator: f64,
    /// Last `tick_now` instant
    last_instant: Option<Instant>,
    /// Set by `record_ticks`, cleared by `take_repaint`
    repaint_pending: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

impl SimulationClock {
    /// Build from `config`; unusable rates fall back to the defaults
    pub fn new(config: &ClockConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            total_time: 0.0,
            fixed_timestep: 1.0 / config.tick_hz,
            max_frame_time: config.max_frame_time,
            max_ticks_per_advance: config.max_ticks_per_advance,
            accumulator: 0.0,
            last_instant: None,
            repaint_pending: false,
        }
    }

    /// Create a clock ticking `hz` times per second
    pub fn with_rate(hz: f64) -> Self {
        Self::new(&ClockConfig {
            tick_hz: hz,
            ..ClockConfig::default()
        })
    }

    pub fn dt(&self) -> f32 {
        self.fixed_timestep as f32
    }

    /// Feed `elapsed` seconds of wall time and return how many ticks are due.
    ///
    /// Large gaps (window dragged, debugger pause) are clamped so the
    /// simulation never tries to catch up on them.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed.min(self.max_frame_time);
        }

        let mut due = 0;
        while self.accumulator >= self.fixed_timestep && due < self.max_ticks_per_advance {
            self.accumulator -= self.fixed_timestep;
            self.total_time += self.fixed_timestep;
            due += 1;
        }
        if due == self.max_ticks_per_advance {
            // Drop whatever backlog is left rather than spiral
            self.accumulator = self.accumulator.min(self.fixed_timestep * 0.999);
        }
        due
    }

    /// Advance by the wall time since the previous call. The first call only
    /// starts the clock.
    pub fn tick_now(&mut self) -> u32 {
        let now = Instant::now();
        let Some(last) = self.last_instant.replace(now) else {
            return 0;
        };
        self.advance(now.duration_since(last).as_secs_f64())
    }

    /// When the next tick falls due, measured from the last `tick_now`
    pub fn next_deadline(&self) -> Option<Instant> {
        let last = self.last_instant?;
        let remaining = (self.fixed_timestep - self.accumulator).max(0.0);
        Some(last + Duration::from_secs_f64(remaining))
    }

    /// Note that ticks ran; a repaint is now owed
    pub fn record_ticks(&mut self, ticks: u32) {
        if ticks > 0 {
            self.repaint_pending = true;
        }
    }

    pub fn repaint_pending(&self) -> bool {
        self.repaint_pending
    }

    /// Consume the pending repaint, returning whether one was owed
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint_pending)
    }
}
