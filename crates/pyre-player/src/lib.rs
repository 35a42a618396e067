//! Pyre Player - desktop shell for the fire simulation
//!
//! Provides the `FireApp` window handler, the player configuration file and
//! a windowless runner used for quick checks and benchmarks.

mod app;
mod config;
mod drag;
mod headless;
mod hud;

pub use app::FireApp;
pub use config::{ControlsConfig, PlayerConfig, WindowConfig};
pub use drag::DragTracker;
pub use headless::{run_headless, HeadlessSummary};
pub use hud::{readout, ControlBar, HINT};
