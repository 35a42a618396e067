//! Energy-driven particle spawning
//!
//! Every curve below is written as a `[low, high]` pair: the value at
//! energy 0 and at energy 1, linearly interpolated in between.

use crate::config::{finite_non_negative, finite_pair, BurnerConfig};
use crate::particle::{Particle, ParticleStore, MIN_LIFETIME};
use crate::rand::ParticleRng;
use pyre_core::{Energy, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Particles per second at energy 0
    pub base_rate: f32,
    /// Extra particles per second at energy 1
    pub rate_gain: f32,
    /// Base upward launch speed
    pub up_speed: [f32; 2],
    /// Launch speed is sampled in `[lo * up, hi * up)`
    pub up_speed_scale: [f32; 2],
    /// Half-width of the sideways launch speed
    pub side_speed: [f32; 2],
    /// Lifetime at energy 0, before jitter
    pub life_base: f32,
    /// Lifetime added at energy 1
    pub life_energy_bonus: f32,
    /// Half-width of the lifetime jitter
    pub life_jitter: [f32; 2],
    /// Spawn radius range at energy 0
    pub radius_cold: [f32; 2],
    /// Spawn radius range at energy 1
    pub radius_hot: [f32; 2],
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_rate: 240.0,
            rate_gain: 960.0,
            up_speed: [0.9, 2.4],
            up_speed_scale: [0.6, 1.1],
            side_speed: [0.45, 0.9],
            life_base: 0.70,
            life_energy_bonus: 0.35,
            life_jitter: [0.15, 0.20],
            radius_cold: [0.045, 0.070],
            radius_hot: [0.030, 0.050],
        }
    }
}

impl SpawnConfig {
    /// Clamp to usable values; spawn radii never exceed `max_radius`
    pub fn sanitized(mut self, max_radius: f32) -> Self {
        let d = SpawnConfig::default();
        self.base_rate = finite_non_negative(self.base_rate);
        self.rate_gain = finite_non_negative(self.rate_gain);
        self.up_speed = finite_pair(self.up_speed, d.up_speed);
        self.up_speed_scale = ordered(finite_pair(self.up_speed_scale, d.up_speed_scale));
        self.side_speed = finite_pair(self.side_speed, d.side_speed);
        self.life_base = if self.life_base.is_finite() {
            self.life_base.max(MIN_LIFETIME)
        } else {
            d.life_base
        };
        self.life_energy_bonus = finite_non_negative(self.life_energy_bonus);
        self.life_jitter = finite_pair(self.life_jitter, d.life_jitter);
        let cap = |pair: [f32; 2]| [pair[0].min(max_radius), pair[1].min(max_radius)];
        self.radius_cold = cap(ordered(finite_pair(self.radius_cold, d.radius_cold)));
        self.radius_hot = cap(ordered(finite_pair(self.radius_hot, d.radius_hot)));
        self
    }
}

fn ordered(pair: [f32; 2]) -> [f32; 2] {
    if pair[0] <= pair[1] {
        pair
    } else {
        [pair[1], pair[0]]
    }
}

/// Outcome of one spawn call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub requested: usize,
    pub spawned: usize,
    /// Requests skipped because the store was full
    pub dropped: usize,
}

/// Decides how many particles to create per tick and their initial state
pub struct SpawnPolicy {
    config: SpawnConfig,
    burner: BurnerConfig,
    /// Fractional spawn count carried between ticks
    accumulator: f32,
}

impl SpawnPolicy {
    pub fn new(config: SpawnConfig, burner: BurnerConfig) -> Self {
        Self {
            config,
            burner,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Particles per second; non-decreasing in energy
    pub fn spawn_rate(&self, energy: Energy) -> f32 {
        self.config.base_rate + energy.value() * self.config.rate_gain
    }

    /// Carry-over fraction of a particle, always in [0, 1)
    pub fn pending_fraction(&self) -> f32 {
        self.accumulator
    }

    /// Spawn this tick's share of `spawn_rate(energy)`.
    ///
    /// A non-positive or non-finite `dt` spawns nothing. One call never
    /// requests more than the store can hold.
    pub fn spawn(
        &mut self,
        store: &mut ParticleStore,
        rng: &mut ParticleRng,
        energy: Energy,
        dt: f32,
    ) -> SpawnReport {
        if !(dt.is_finite() && dt > 0.0) {
            return SpawnReport::default();
        }

        self.accumulator += self.spawn_rate(energy) * dt;
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        if !(self.accumulator.is_finite() && (0.0..1.0).contains(&self.accumulator)) {
            log::warn!("spawn count overflowed at dt {dt}, dropping the carry");
            self.accumulator = 0.0;
        }

        let count = if whole.is_finite() {
            (whole as usize).min(store.capacity())
        } else {
            store.capacity()
        };
        self.spawn_burst(store, rng, energy, count)
    }

    /// Attempt `count` spawns right now; overflow beyond capacity is dropped
    pub fn spawn_burst(
        &self,
        store: &mut ParticleStore,
        rng: &mut ParticleRng,
        energy: Energy,
        count: usize,
    ) -> SpawnReport {
        let room = store.capacity() - store.len();
        let spawned = count.min(room);
        for _ in 0..spawned {
            let particle = self.make_particle(rng, energy);
            store.add(particle);
        }
        SpawnReport {
            requested: count,
            spawned,
            dropped: count - spawned,
        }
    }

    /// Initial state of one particle at the given energy
    pub fn make_particle(&self, rng: &mut ParticleRng, energy: Energy) -> Particle {
        let c = &self.config;
        let origin = self.burner.origin();

        let (dx, dz) = rng.disk_point(self.burner.radius);
        let dy = rng.range(0.0, self.burner.vertical_jitter);
        let position = origin + Vec3::new(dx, dy, dz);

        let up = energy.mix(c.up_speed[0], c.up_speed[1]);
        let vy = rng.range(up * c.up_speed_scale[0], up * c.up_speed_scale[1]);
        let side = energy.mix(c.side_speed[0], c.side_speed[1]);
        let velocity = Vec3::new(rng.symmetric(side), vy, rng.symmetric(side));

        let life_center = c.life_base + energy.value() * c.life_energy_bonus;
        let jitter = energy.mix(c.life_jitter[0], c.life_jitter[1]);
        let life0 = (life_center + rng.symmetric(jitter)).max(MIN_LIFETIME);

        let radius_lo = energy.mix(c.radius_cold[0], c.radius_hot[0]);
        let radius_hi = energy.mix(c.radius_cold[1], c.radius_hot[1]);
        let radius = rng.range(radius_lo, radius_hi);

        let seed = rng.range(0.0, std::f32::consts::TAU);

        Particle::new(position, velocity, life0, radius, seed)
    }
}
