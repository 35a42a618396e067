//! Windowless run: simulate a fixed span and summarize it

use crate::config::PlayerConfig;
use pyre_core::Energy;
use pyre_particles::{FireSimulation, SimulationClock, SimulationStats};
use pyre_render::{DrawList, RenderPipeline};

/// What a headless run did
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSummary {
    pub seconds: f64,
    pub energy: Energy,
    pub stats: SimulationStats,
    /// Live particles when the run ended
    pub alive: usize,
    /// Commands the final frame would have issued
    pub frame_commands: usize,
}

/// Simulate `seconds` of fire at the configured initial energy, then
/// record one frame of draw commands.
///
/// `warmup` particles are spawned in one burst before the first tick, so a
/// benchmark can start from a full store instead of an empty burner.
pub fn run_headless(config: &PlayerConfig, seconds: f64, warmup: usize) -> HeadlessSummary {
    let energy = Energy::new(config.controls.initial_energy);
    let mut simulation = FireSimulation::new(&config.fire);
    let mut clock = SimulationClock::new(&config.fire.clock);

    if warmup > 0 {
        simulation.burst(energy, warmup);
    }

    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let ticks = (seconds / clock.fixed_timestep).round() as u32;
    simulation.run_ticks(&mut clock, ticks, energy);

    let pipeline = RenderPipeline::new(config.render.clone(), config.fire.burner.origin());
    let camera = pipeline.camera(
        config.controls.to_controls().camera(),
        config.window.width,
        config.window.height,
    );
    let mut frame = DrawList::with_capacity(simulation.store().len() + 16);
    pipeline.draw(
        &mut frame,
        simulation.store(),
        simulation.color_mapper(),
        energy,
        &camera,
    );

    let summary = HeadlessSummary {
        seconds,
        energy,
        stats: simulation.stats(),
        alive: simulation.store().len(),
        frame_commands: frame.len(),
    };
    log::info!(
        "headless: {:.2}s at energy {:.2}: {} ticks, {} spawned, {} dropped, {} expired, {} alive (peak {}), {} draw commands",
        summary.seconds,
        summary.energy.value(),
        summary.stats.ticks,
        summary.stats.spawned,
        summary.stats.dropped,
        summary.stats.expired,
        summary.alive,
        summary.stats.peak_alive,
        summary.frame_commands
    );
    summary
}
