//! Per-tick particle integration: aging, buoyancy, turbulence, damping,
//! motion, growth and centering

use crate::config::{finite_non_negative, finite_pair};
use crate::particle::ParticleStore;
use pyre_core::{Energy, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Upward acceleration at energy 0 and 1
    pub buoyancy: [f32; 2],
    /// Turbulence amplitude at energy 0 and 1
    pub turbulence: [f32; 2],
    /// Damping coefficient (1/s) at energy 0 and 1
    pub damping: [f32; 2],
    /// Angular frequency of the turbulence clock term
    pub turbulence_frequency: f32,
    /// How far the turbulence phase advances over a particle's life
    pub turbulence_age_warp: f32,
    /// Radius growth per second
    pub growth_rate: f32,
    /// Upper bound on particle radius
    pub max_radius: f32,
    /// Horizontal spring pulling particles back toward the flame axis (1/s²)
    pub centering: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            buoyancy: [1.2, 3.2],
            turbulence: [0.8, 2.1],
            damping: [1.8, 0.96],
            turbulence_frequency: 3.0,
            turbulence_age_warp: 6.0,
            growth_rate: 0.015,
            max_radius: 0.12,
            centering: 1.2,
        }
    }
}

impl PhysicsConfig {
    pub fn sanitized(mut self) -> Self {
        let d = PhysicsConfig::default();
        self.buoyancy = finite_pair(self.buoyancy, d.buoyancy);
        self.turbulence = finite_pair(self.turbulence, d.turbulence);
        self.damping = finite_pair(self.damping, d.damping);
        self.turbulence_frequency = finite_non_negative(self.turbulence_frequency);
        self.turbulence_age_warp = finite_non_negative(self.turbulence_age_warp);
        self.growth_rate = finite_non_negative(self.growth_rate);
        self.max_radius = if self.max_radius.is_finite() && self.max_radius > 0.0 {
            self.max_radius
        } else {
            d.max_radius
        };
        self.centering = finite_non_negative(self.centering);
        self
    }
}

/// Advances every live particle by one timestep
pub struct PhysicsIntegrator {
    config: PhysicsConfig,
    /// Point on the flame axis; centering pulls x/z toward it
    axis: Vec3,
    /// Simulated seconds since creation, drives the turbulence phase
    elapsed: f32,
}

impl PhysicsIntegrator {
    pub fn new(config: PhysicsConfig, axis: Vec3) -> Self {
        Self {
            config,
            axis,
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn buoyancy_accel(&self, energy: Energy) -> f32 {
        energy.mix(self.config.buoyancy[0], self.config.buoyancy[1])
    }

    pub fn turb_amplitude(&self, energy: Energy) -> f32 {
        energy.mix(self.config.turbulence[0], self.config.turbulence[1])
    }

    pub fn damping_coefficient(&self, energy: Energy) -> f32 {
        energy.mix(self.config.damping[0], self.config.damping[1])
    }

    /// Advance all particles by `dt` and drop the ones that expired.
    ///
    /// Returns the number removed. A non-positive or non-finite `dt` is a
    /// no-op.
    pub fn update(&mut self, store: &mut ParticleStore, energy: Energy, dt: f32) -> usize {
        if !(dt.is_finite() && dt > 0.0) {
            return 0;
        }

        let c = &self.config;
        let buoyancy = self.buoyancy_accel(energy);
        let swirl = self.turb_amplitude(energy);
        let damping = (1.0 - self.damping_coefficient(energy) * dt).max(0.0);
        let clock_phase = c.turbulence_frequency * self.elapsed;

        for p in store.iter_mut() {
            p.life -= dt;
            if p.life <= 0.0 {
                continue;
            }

            p.velocity.y += buoyancy * dt;

            let phase = clock_phase + p.seed + c.turbulence_age_warp * p.age01();
            p.velocity.x += swirl * phase.sin() * dt;
            p.velocity.z += swirl * phase.cos() * dt;

            p.velocity *= damping;

            p.position += p.velocity * dt;

            p.radius = (p.radius + c.growth_rate * dt).min(c.max_radius).max(p.radius);

            p.velocity.x -= c.centering * (p.position.x - self.axis.x) * dt;
            p.velocity.z -= c.centering * (p.position.z - self.axis.z) * dt;
        }

        self.elapsed += dt;
        store.remove_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    fn integrator() -> PhysicsIntegrator {
        PhysicsIntegrator::new(PhysicsConfig::default(), Vec3::new(0.0, -1.0, 0.0))
    }

    fn still_particle(life0: f32) -> Particle {
        Particle::new(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, life0, 0.05, 0.0)
    }

    #[test]
    fn curves_rise_with_energy() {
        let phys = integrator();
        assert!(phys.buoyancy_accel(Energy::MIN) < phys.buoyancy_accel(Energy::MAX));
        assert!(phys.turb_amplitude(Energy::MIN) < phys.turb_amplitude(Energy::MAX));
        for i in 0..100 {
            let a = Energy::from_percent(i);
            let b = Energy::from_percent(i + 1);
            assert!(phys.buoyancy_accel(a) <= phys.buoyancy_accel(b));
            assert!(phys.turb_amplitude(a) <= phys.turb_amplitude(b));
            assert!(phys.damping_coefficient(a) >= phys.damping_coefficient(b));
        }
    }

    #[test]
    fn life_drops_by_dt_each_tick() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        store.add(still_particle(1.0));
        for step in 1..=5 {
            phys.update(&mut store, Energy::new(0.5), 0.1);
            let life = store.as_slice()[0].life;
            assert!((life - (1.0 - 0.1 * step as f32)).abs() < 1e-5);
        }
    }

    #[test]
    fn expired_particles_are_removed_in_the_same_pass() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        store.add(still_particle(2.0));
        for _ in 0..3 {
            assert_eq!(phys.update(&mut store, Energy::MIN, 0.5), 0);
            assert_eq!(store.len(), 1);
        }
        assert_eq!(phys.update(&mut store, Energy::MIN, 0.5), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn buoyancy_lifts_particles() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        store.add(still_particle(5.0));
        phys.update(&mut store, Energy::MAX, 1.0 / 120.0);
        let p = store.as_slice()[0];
        assert!(p.velocity.y > 0.0);
        assert!(p.position.y > -1.0);
    }

    #[test]
    fn radius_grows_monotonically_up_to_max() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        store.add(still_particle(100.0));
        let mut prev = store.as_slice()[0].radius;
        for _ in 0..1000 {
            phys.update(&mut store, Energy::new(0.5), 0.05);
            let r = store.as_slice()[0].radius;
            assert!(r >= prev);
            assert!(r <= 0.12 + 1e-6);
            prev = r;
        }
        assert!((prev - 0.12).abs() < 1e-6);
    }

    #[test]
    fn seeds_decorrelate_turbulence() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        let mut a = still_particle(5.0);
        let mut b = still_particle(5.0);
        a.seed = 0.0;
        b.seed = std::f32::consts::PI;
        store.add(a);
        store.add(b);
        phys.update(&mut store, Energy::MAX, 0.01);
        let (pa, pb) = (store.as_slice()[0], store.as_slice()[1]);
        // Opposite phases push in opposite directions
        assert!(pa.velocity.z * pb.velocity.z < 0.0);
    }

    #[test]
    fn centering_pulls_toward_axis() {
        let config = PhysicsConfig {
            turbulence: [0.0, 0.0],
            ..PhysicsConfig::default()
        };
        let mut phys = PhysicsIntegrator::new(config, Vec3::new(0.0, -1.0, 0.0));
        let mut store = ParticleStore::new(4);
        store.add(Particle::new(Vec3::new(0.5, -1.0, -0.5), Vec3::ZERO, 5.0, 0.05, 0.0));
        phys.update(&mut store, Energy::MIN, 0.1);
        let p = store.as_slice()[0];
        assert!(p.velocity.x < 0.0);
        assert!(p.velocity.z > 0.0);
    }

    #[test]
    fn one_step_follows_the_documented_order() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        // Run the turbulence clock to elapsed = 0.5 with nothing alive
        phys.update(&mut store, Energy::MIN, 0.5);
        assert!((phys.elapsed() - 0.5).abs() < 1e-6);

        store.add(Particle::new(Vec3::new(0.5, -1.0, 0.0), Vec3::ZERO, 1.0, 0.05, 0.2));
        phys.update(&mut store, Energy::MIN, 0.1);
        let p = store.as_slice()[0];

        // Energy 0: buoyancy 1.2, turbulence 0.8, damping factor 1 - 1.8 * 0.1.
        // After aging, age01 = 0.1, so phase = 3.0 * 0.5 + 0.2 + 6.0 * 0.1 = 2.3.
        // Damping acts before the move, centering after it.
        let close = |a: f32, b: f32| (a - b).abs() < 1e-5;
        assert!(close(p.life, 0.9), "life {}", p.life);
        assert!(close(p.position.x, 0.5048918), "x {}", p.position.x);
        assert!(close(p.position.y, -0.99016), "y {}", p.position.y);
        assert!(close(p.position.z, -0.0043708), "z {}", p.position.z);
        assert!(close(p.velocity.x, -0.0116688), "vx {}", p.velocity.x);
        assert!(close(p.velocity.y, 0.0984), "vy {}", p.velocity.y);
        assert!(close(p.velocity.z, -0.0431832), "vz {}", p.velocity.z);
        assert!(close(p.radius, 0.0515), "radius {}", p.radius);
    }

    #[test]
    fn damping_never_reverses_velocity() {
        let config = PhysicsConfig {
            buoyancy: [0.0, 0.0],
            turbulence: [0.0, 0.0],
            centering: 0.0,
            ..PhysicsConfig::default()
        };
        let mut phys = PhysicsIntegrator::new(config, Vec3::ZERO);
        let mut store = ParticleStore::new(4);
        store.add(Particle::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), 100.0, 0.05, 0.0));
        phys.update(&mut store, Energy::MIN, 10.0);
        let v = store.as_slice()[0].velocity;
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn bad_dt_is_a_no_op() {
        let mut phys = integrator();
        let mut store = ParticleStore::new(4);
        store.add(still_particle(1.0));
        for dt in [0.0, -0.5, f32::NAN] {
            assert_eq!(phys.update(&mut store, Energy::MAX, dt), 0);
        }
        assert_eq!(store.as_slice()[0], still_particle(1.0));
        assert_eq!(phys.elapsed(), 0.0);
    }
}
