//! Live inputs: energy level and camera angles
//!
//! The UI writes into `FireControls` whenever a slider moves or the pointer
//! drags; ticks and frames read one immutable snapshot (`Energy`,
//! `CameraAngles`) and pass it down explicitly.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Normalized energy snapshot, always in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Energy(f32);

impl Energy {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(1.0);

    /// Clamp into [0, 1]; NaN maps to 0
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Energy from a 0..=100 slider position
    pub fn from_percent(percent: u32) -> Self {
        Self::new(percent as f32 / 100.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    /// Linear interpolation between `low` (energy 0) and `high` (energy 1)
    pub fn mix(self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.0
    }
}

impl From<f32> for Energy {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

/// Camera rotation in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraAngles {
    /// Rotation about the X axis
    pub pitch: f32,
    /// Rotation about the Y axis
    pub yaw: f32,
}

impl Default for CameraAngles {
    fn default() -> Self {
        Self {
            pitch: 18.0,
            yaw: 35.0,
        }
    }
}

impl CameraAngles {
    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }.sanitized()
    }

    /// Non-finite angles reset to 0; finite ones wrap into (-360, 360)
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v % 360.0 } else { 0.0 };
        Self {
            pitch: fix(self.pitch),
            yaw: fix(self.yaw),
        }
    }

    /// Apply a pointer drag of `(dx, dy)` pixels
    pub fn dragged(self, dx: f32, dy: f32, degrees_per_pixel: f32) -> Self {
        Self::new(
            self.pitch + dy * degrees_per_pixel,
            self.yaw + dx * degrees_per_pixel,
        )
    }

    fn pack(self) -> u64 {
        ((self.pitch.to_bits() as u64) << 32) | self.yaw.to_bits() as u64
    }

    fn unpack(bits: u64) -> Self {
        Self {
            pitch: f32::from_bits((bits >> 32) as u32),
            yaw: f32::from_bits(bits as u32),
        }
    }
}

/// Shared control slots, written by UI handlers and read once per tick/frame.
///
/// Both angles live in one 64-bit word so a frame never sees pitch from one
/// drag event and yaw from another.
#[derive(Debug)]
pub struct FireControls {
    energy: AtomicU32,
    camera: AtomicU64,
}

impl Default for FireControls {
    fn default() -> Self {
        Self::new(Energy::new(0.5), CameraAngles::default())
    }
}

impl FireControls {
    pub fn new(energy: Energy, camera: CameraAngles) -> Self {
        Self {
            energy: AtomicU32::new(energy.value().to_bits()),
            camera: AtomicU64::new(camera.sanitized().pack()),
        }
    }

    pub fn energy(&self) -> Energy {
        Energy(f32::from_bits(self.energy.load(Ordering::Relaxed)))
    }

    pub fn set_energy(&self, energy: Energy) {
        self.energy.store(energy.value().to_bits(), Ordering::Relaxed);
    }

    pub fn camera(&self) -> CameraAngles {
        CameraAngles::unpack(self.camera.load(Ordering::Relaxed))
    }

    pub fn set_camera(&self, angles: CameraAngles) {
        self.camera
            .store(angles.sanitized().pack(), Ordering::Relaxed);
    }

    /// Rotate the camera by a pointer drag; returns the new angles
    pub fn drag_camera(&self, dx: f32, dy: f32, degrees_per_pixel: f32) -> CameraAngles {
        let mut current = self.camera.load(Ordering::Relaxed);
        loop {
            let next = CameraAngles::unpack(current)
                .dragged(dx, dy, degrees_per_pixel)
                .pack();
            match self.camera.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return CameraAngles::unpack(next),
                Err(actual) => current = actual,
            }
        }
    }
}
