//! Player configuration loaded from a TOML file

use pyre_core::{CameraAngles, Energy, FireControls, Result};
use pyre_particles::FireConfig;
use pyre_render::RenderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Pyre - energy fire".to_string(),
            width: 1100,
            height: 750,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Energy at startup, 0..1
    pub initial_energy: f32,
    /// Camera pitch at startup, degrees
    pub initial_pitch: f32,
    /// Camera yaw at startup, degrees
    pub initial_yaw: f32,
    /// Degrees of rotation per pixel of mouse drag
    pub drag_sensitivity: f32,
    /// Energy change per Up/Down key press
    pub energy_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            initial_energy: 0.5,
            initial_pitch: 18.0,
            initial_yaw: 35.0,
            drag_sensitivity: 0.5,
            energy_step: 0.05,
        }
    }
}

impl ControlsConfig {
    /// Shared control slots seeded with the startup values
    pub fn to_controls(&self) -> FireControls {
        FireControls::new(
            Energy::new(self.initial_energy),
            CameraAngles::new(self.initial_pitch, self.initial_yaw),
        )
    }
}

/// Everything the `pyre` binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub window: WindowConfig,
    pub controls: ControlsConfig,
    pub render: RenderConfig,
    pub fire: FireConfig,
}

impl PlayerConfig {
    /// Parse from TOML text; missing sections keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn sanitized(mut self) -> Self {
        self.fire = self.fire.sanitized();
        self.render = self.render.sanitized();

        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);

        let c = &mut self.controls;
        let d = ControlsConfig::default();
        c.initial_energy = Energy::new(c.initial_energy).value();
        let angles = CameraAngles::new(c.initial_pitch, c.initial_yaw);
        c.initial_pitch = angles.pitch;
        c.initial_yaw = angles.yaw;
        if !c.drag_sensitivity.is_finite() {
            c.drag_sensitivity = d.drag_sensitivity;
        }
        if !(c.energy_step.is_finite() && c.energy_step > 0.0) {
            c.energy_step = d.energy_step;
        }
        self
    }
}
