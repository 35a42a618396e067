//! The fire simulation: store + spawner + integrator driven one tick at a time

use crate::clock::SimulationClock;
use crate::color::ColorMapper;
use crate::config::FireConfig;
use crate::particle::ParticleStore;
use crate::physics::PhysicsIntegrator;
use crate::rand::ParticleRng;
use crate::spawn::{SpawnPolicy, SpawnReport};
use pyre_core::Energy;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawn: SpawnReport,
    pub expired: usize,
    pub alive: usize,
}

/// Running totals since the simulation was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub ticks: u64,
    pub spawned: u64,
    pub dropped: u64,
    pub expired: u64,
    pub peak_alive: usize,
}

impl SimulationStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.spawned += report.spawn.spawned as u64;
        self.dropped += report.spawn.dropped as u64;
        self.expired += report.expired as u64;
        self.peak_alive = self.peak_alive.max(report.alive);
    }

    /// Totals accumulated after `earlier` was captured
    pub fn since(&self, earlier: &SimulationStats) -> SimulationStats {
        SimulationStats {
            ticks: self.ticks.saturating_sub(earlier.ticks),
            spawned: self.spawned.saturating_sub(earlier.spawned),
            dropped: self.dropped.saturating_sub(earlier.dropped),
            expired: self.expired.saturating_sub(earlier.expired),
            peak_alive: self.peak_alive,
        }
    }
}

/// Owns every particle and the components that create, move and cull them
pub struct FireSimulation {
    store: ParticleStore,
    spawner: SpawnPolicy,
    integrator: PhysicsIntegrator,
    colors: ColorMapper,
    rng: ParticleRng,
    stats: SimulationStats,
}

impl Default for FireSimulation {
    fn default() -> Self {
        Self::new(&FireConfig::default())
    }
}

impl FireSimulation {
    pub fn new(config: &FireConfig) -> Self {
        let config = config.clone().sanitized();
        let origin = config.burner.origin();
        Self {
            store: ParticleStore::new(config.capacity),
            spawner: SpawnPolicy::new(config.spawn, config.burner),
            integrator: PhysicsIntegrator::new(config.physics, origin),
            colors: ColorMapper::new(config.color),
            rng: ParticleRng::new(config.rng_seed),
            stats: SimulationStats::default(),
        }
    }

    /// One simulation step: spawn, then integrate (which culls expired
    /// particles). A non-positive `dt` does nothing.
    pub fn tick(&mut self, energy: Energy, dt: f32) -> TickReport {
        if !(dt.is_finite() && dt > 0.0) {
            return TickReport {
                alive: self.store.len(),
                ..TickReport::default()
            };
        }

        let spawn = self
            .spawner
            .spawn(&mut self.store, &mut self.rng, energy, dt);
        let expired = self.integrator.update(&mut self.store, energy, dt);

        let report = TickReport {
            spawn,
            expired,
            alive: self.store.len(),
        };
        self.stats.record(&report);
        report
    }

    /// Run every tick the clock says is due, then flag a repaint.
    ///
    /// `energy` is sampled once and shared by all ticks in the batch.
    pub fn run_due(&mut self, clock: &mut SimulationClock, elapsed: f64, energy: Energy) -> u32 {
        let due = clock.advance(elapsed);
        self.run_ticks(clock, due, energy);
        due
    }

    /// Run `count` fixed ticks at the clock's timestep
    pub fn run_ticks(&mut self, clock: &mut SimulationClock, count: u32, energy: Energy) {
        let dt = clock.dt();
        for _ in 0..count {
            self.tick(energy, dt);
        }
        clock.record_ticks(count);
    }

    /// Spawn `count` particles immediately, outside the regular rate
    pub fn burst(&mut self, energy: Energy, count: usize) -> SpawnReport {
        let report = self
            .spawner
            .spawn_burst(&mut self.store, &mut self.rng, energy, count);
        self.stats.spawned += report.spawned as u64;
        self.stats.dropped += report.dropped as u64;
        self.stats.peak_alive = self.stats.peak_alive.max(self.store.len());
        log::debug!(
            "burst of {}: {} spawned, {} dropped",
            count,
            report.spawned,
            report.dropped
        );
        report
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn color_mapper(&self) -> &ColorMapper {
        &self.colors
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }
}
