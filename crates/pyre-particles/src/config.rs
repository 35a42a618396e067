//! Simulation configuration, loadable from TOML
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes:
//!
//! ```toml
//! capacity = 4000
//!
//! [spawn]
//! base_rate = 300.0
//!
//! [physics]
//! buoyancy = [1.0, 4.0]
//! ```

use crate::color::ColorConfig;
use crate::particle::MAX_PARTICLES;
use crate::physics::PhysicsConfig;
use crate::spawn::SpawnConfig;
use pyre_core::{Result, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard upper bound on a configured store capacity
const CAPACITY_LIMIT: usize = 100_000;

/// Spawn region at the base of the flame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnerConfig {
    /// Disk center; the flame axis passes vertically through it
    pub origin: [f32; 3],
    /// Spawn disk radius
    pub radius: f32,
    /// Random upward offset added to each spawn position, in [0, jitter)
    pub vertical_jitter: f32,
}

impl Default for BurnerConfig {
    fn default() -> Self {
        Self {
            origin: [0.0, -1.0, 0.0],
            radius: 0.25,
            vertical_jitter: 0.05,
        }
    }
}

impl BurnerConfig {
    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }
}

/// Fixed-timestep clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulation ticks per second
    pub tick_hz: f64,
    /// Longest wall-clock gap accepted per advance, in seconds
    pub max_frame_time: f64,
    /// Most ticks run for a single advance
    pub max_ticks_per_advance: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_hz: 120.0,
            max_frame_time: 0.25,
            max_ticks_per_advance: 30,
        }
    }
}

impl ClockConfig {
    /// Fall back to the defaults for rates and gaps a clock cannot run at
    pub fn sanitized(mut self) -> Self {
        let d = ClockConfig::default();
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            self.tick_hz = d.tick_hz;
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            self.max_frame_time = d.max_frame_time;
        }
        self.max_ticks_per_advance = self.max_ticks_per_advance.max(1);
        self
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Particle store capacity
    pub capacity: usize,
    /// PRNG seed; equal seeds and inputs replay identically
    pub rng_seed: u32,
    pub burner: BurnerConfig,
    pub spawn: SpawnConfig,
    pub physics: PhysicsConfig,
    pub color: ColorConfig,
    pub clock: ClockConfig,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_PARTICLES,
            rng_seed: 0x5EED_F1AE,
            burner: BurnerConfig::default(),
            spawn: SpawnConfig::default(),
            physics: PhysicsConfig::default(),
            color: ColorConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl FireConfig {
    /// Parse from TOML text. The result is sanitized.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: FireConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    /// Load from a TOML file. The result is sanitized.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Clamp nonsensical values instead of rejecting them
    pub fn sanitized(mut self) -> Self {
        self.capacity = self.capacity.clamp(1, CAPACITY_LIMIT);

        let b = &mut self.burner;
        if !b.origin.iter().all(|v| v.is_finite()) {
            b.origin = BurnerConfig::default().origin;
        }
        b.radius = finite_non_negative(b.radius);
        b.vertical_jitter = finite_non_negative(b.vertical_jitter);

        self.clock = self.clock.sanitized();
        self.physics = self.physics.sanitized();
        self.spawn = self.spawn.sanitized(self.physics.max_radius);
        self.color = self.color.sanitized();
        self
    }
}

pub(crate) fn finite_non_negative(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Sanitize a `[low_energy, high_energy]` curve pair
pub(crate) fn finite_pair(pair: [f32; 2], fallback: [f32; 2]) -> [f32; 2] {
    if pair.iter().all(|v| v.is_finite()) {
        [pair[0].max(0.0), pair[1].max(0.0)]
    } else {
        fallback
    }
}
