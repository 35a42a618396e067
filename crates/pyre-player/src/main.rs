//! Pyre - real-time particle fire driven by a single energy control
//!
//! Usage:
//!   pyre [--config <file.toml>] [--energy <0..1>] [--seed <n>] [--fullscreen]
//!   pyre --headless <seconds> [--warmup <count>]
//!   pyre --dump-config

use anyhow::{Context, Result};
use clap::Parser;
use pyre_player::{run_headless, FireApp, PlayerConfig};
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "pyre")]
#[command(about = "Particle fire whose color and motion follow an energy slider")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial energy, 0 (calm red) to 1 (violent blue)
    #[arg(long)]
    energy: Option<f32>,

    /// Seed for the particle random generator
    #[arg(long)]
    seed: Option<u32>,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,

    /// Simulate this many seconds without a window and print a summary
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f64>,

    /// Particles spawned in one burst before a headless run
    #[arg(long, value_name = "COUNT", default_value_t = 0, requires = "headless")]
    warmup: usize,

    /// Print the resolved configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn apply(&self, config: &mut PlayerConfig) {
        if let Some(energy) = self.energy {
            config.controls.initial_energy = energy;
        }
        if let Some(seed) = self.seed {
            config.fire.rng_seed = seed;
        }
        if self.fullscreen {
            config.window.fullscreen = true;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config = PlayerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => {
            log::info!("Using built-in config");
            PlayerConfig::default()
        }
    };
    args.apply(&mut config);
    let config = config.sanitized();

    if args.dump_config {
        print!("{}", config.to_toml_string().context("Failed to serialize config")?);
        return Ok(());
    }

    log::info!(
        "energy {:.2}, seed {:#x}, capacity {}, {} Hz ticks",
        config.controls.initial_energy,
        config.fire.rng_seed,
        config.fire.capacity,
        config.fire.clock.tick_hz
    );

    if let Some(seconds) = args.headless {
        run_headless(&config, seconds, args.warmup);
        return Ok(());
    }

    log::info!("Controls: drag to rotate, Up/Down to change energy, Escape to exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = FireApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
