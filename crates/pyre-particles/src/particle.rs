//! Particle state and the fixed-capacity particle store

use pyre_core::Vec3;

/// Default store capacity
pub const MAX_PARTICLES: usize = 2500;

/// Shortest lifetime a particle may be created with
pub const MIN_LIFETIME: f32 = 1e-3;

/// One fire particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining lifetime in seconds
    pub life: f32,
    /// Lifetime at spawn in seconds, always > 0
    pub life0: f32,
    pub radius: f32,
    /// Turbulence phase offset, fixed at spawn
    pub seed: f32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, life0: f32, radius: f32, seed: f32) -> Self {
        let life0 = if life0.is_finite() {
            life0.max(MIN_LIFETIME)
        } else {
            MIN_LIFETIME
        };
        Self {
            position,
            velocity,
            life: life0,
            life0,
            radius: radius.max(0.0),
            seed,
        }
    }

    fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0,
            life0: MIN_LIFETIME,
            radius: 0.0,
            seed: 0.0,
        }
    }

    /// Normalized age in [0, 1]: 0 = just spawned, 1 = expiring
    pub fn age01(&self) -> f32 {
        (1.0 - self.life / self.life0.max(1e-6)).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.life <= 0.0
    }
}

/// Swap-remove store for O(1) kill and contiguous live iteration.
///
/// Storage is allocated once at construction; `add` never grows it.
pub struct ParticleStore {
    particles: Vec<Particle>,
    alive_count: usize,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::dead(); capacity],
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    pub fn is_full(&self) -> bool {
        self.alive_count >= self.particles.len()
    }

    /// Insert a particle. Returns false (and drops it) when the store is full.
    pub fn add(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles[self.alive_count] = particle;
        self.alive_count += 1;
        true
    }

    /// Remove every particle with `life <= 0` in one pass. Returns how many went.
    pub fn remove_expired(&mut self) -> usize {
        let before = self.alive_count;
        let mut i = 0;
        while i < self.alive_count {
            if self.particles[i].is_expired() {
                self.alive_count -= 1;
                if i < self.alive_count {
                    self.particles.swap(i, self.alive_count);
                }
                // Re-check slot i, it now holds the swapped-in particle
            } else {
                i += 1;
            }
        }
        before - self.alive_count
    }

    pub fn clear(&mut self) {
        self.alive_count = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.as_mut_slice().iter_mut()
    }

    /// Live particles (first `len()` slots)
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles[..self.alive_count]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.alive_count]
    }

    /// Live particles ordered back-to-front along `forward` as seen from `eye`.
    ///
    /// Depth is the projection of `position - eye` onto the view direction;
    /// ties keep store order.
    pub fn snapshot_ordered_by_depth(&self, eye: Vec3, forward: Vec3) -> Vec<&Particle> {
        let mut keyed: Vec<(f32, &Particle)> = self
            .iter()
            .map(|p| ((p.position - eye).dot(&forward), p))
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        keyed.into_iter().map(|(_, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32, life: f32) -> Particle {
        let mut p = Particle::new(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, 1.0, 0.05, 0.0);
        p.life = life;
        p
    }

    #[test]
    fn store_add_and_remove() {
        let mut store = ParticleStore::new(4);
        assert!(store.is_empty());

        for i in 0..3 {
            assert!(store.add(particle_at(i as f32, 1.0)));
        }
        assert_eq!(store.len(), 3);

        // Expire the middle one
        store.as_mut_slice()[1].life = 0.0;
        assert_eq!(store.remove_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|p| p.position.x != 1.0));

        // Capacity 4: the fifth add is dropped
        assert!(store.add(particle_at(3.0, 1.0)));
        assert!(store.add(particle_at(4.0, 1.0)));
        assert!(store.is_full());
        assert!(!store.add(particle_at(5.0, 1.0)));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn remove_expired_checks_swapped_in_particles() {
        let mut store = ParticleStore::new(8);
        for (i, life) in [0.0, 1.0, -0.5, 0.0, 2.0, -1.0].iter().enumerate() {
            store.add(particle_at(i as f32, *life));
        }
        assert_eq!(store.remove_expired(), 4);
        let mut xs: Vec<f32> = store.iter().map(|p| p.position.x).collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, vec![1.0, 4.0]);
    }

    #[test]
    fn age01_spans_unit_interval() {
        let mut p = Particle::new(Vec3::ZERO, Vec3::ZERO, 2.0, 0.05, 0.0);
        assert_eq!(p.age01(), 0.0);
        p.life = 1.0;
        assert!((p.age01() - 0.5).abs() < 1e-6);
        p.life = -0.3;
        assert_eq!(p.age01(), 1.0);
    }

    #[test]
    fn lifetime_is_forced_positive() {
        let p = Particle::new(Vec3::ZERO, Vec3::ZERO, -1.0, -0.2, 0.0);
        assert!(p.life0 > 0.0);
        assert_eq!(p.life, p.life0);
        assert_eq!(p.radius, 0.0);
    }

    #[test]
    fn depth_snapshot_is_back_to_front() {
        let mut store = ParticleStore::new(8);
        for z in [0.5, -2.0, 1.5, 0.0] {
            store.add(Particle::new(Vec3::new(0.0, 0.0, z), Vec3::ZERO, 1.0, 0.05, 0.0));
        }
        // Eye at +z looking down -z: most negative z is farthest
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let ordered = store.snapshot_ordered_by_depth(eye, Vec3::FORWARD);
        let zs: Vec<f32> = ordered.iter().map(|p| p.position.z).collect();
        assert_eq!(zs, vec![-2.0, 0.0, 0.5, 1.5]);
    }
}
