//! Pyre Core - Foundational types for the Pyre fire simulation
//!
//! This crate provides the types that all other Pyre crates depend on:
//! - `Vec3`, `Color` - Spatial and color types
//! - `Energy`, `CameraAngles` - Per-tick/per-frame input snapshots
//! - `FireControls` - Lock-free slots the UI writes and the simulation reads
//! - Error types and Result alias

mod controls;
mod error;
mod types;

pub use controls::{CameraAngles, Energy, FireControls};
pub use error::{PyreError, Result};
pub use types::{mat4_mul, Color, Vec3, IDENTITY4};
