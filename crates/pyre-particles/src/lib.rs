//! Pyre Particles - energy-driven fire particle simulation
//!
//! Provides the CPU-side simulation of a single burner flame:
//! - Swap-remove particle store with a hard capacity
//! - Energy-scaled spawning with a fractional accumulator
//! - Buoyancy, seeded turbulence, damping and centering integration
//! - Energy/age color mapping
//! - Fixed-timestep clock decoupled from repaint

pub mod clock;
pub mod color;
pub mod config;
pub mod curves;
pub mod particle;
pub mod physics;
pub mod rand;
pub mod simulation;
pub mod spawn;

pub use clock::SimulationClock;
pub use color::{ColorConfig, ColorMapper, Palette, PaletteStop};
pub use config::{BurnerConfig, ClockConfig, FireConfig};
pub use particle::{Particle, ParticleStore, MAX_PARTICLES};
pub use physics::{PhysicsConfig, PhysicsIntegrator};
pub use simulation::{FireSimulation, SimulationStats, TickReport};
pub use spawn::{SpawnConfig, SpawnPolicy, SpawnReport};
