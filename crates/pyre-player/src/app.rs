//! Fire application implementing winit ApplicationHandler
//!
//! Ticks the simulation on a fixed clock, redraws when a tick has run, and
//! overlays the egui control bar.

use crate::config::PlayerConfig;
use crate::drag::DragTracker;
use crate::hud::ControlBar;
use anyhow::{Context, Result};
use pyre_core::{Energy, FireControls};
use pyre_particles::{FireSimulation, SimulationClock, SimulationStats};
use pyre_render::{DrawList, GpuRenderer, RenderContext, RenderPipeline};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

const STATS_INTERVAL: Duration = Duration::from_secs(1);

pub struct FireApp {
    config: PlayerConfig,

    // Simulation
    controls: FireControls,
    simulation: FireSimulation,
    clock: SimulationClock,
    stats_mark: SimulationStats,
    stats_at: Instant,

    // Rendering
    pipeline: RenderPipeline,
    draw_list: DrawList,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    gpu: Option<GpuRenderer>,

    // UI
    drag: DragTracker,
    control_bar: ControlBar,
    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    /// Startup failure reported back to `main` after the loop exits
    error: Option<anyhow::Error>,
}

impl FireApp {
    pub fn new(config: PlayerConfig) -> Self {
        let controls = config.controls.to_controls();
        let control_bar = ControlBar::new(controls.energy());
        let pipeline = RenderPipeline::new(config.render.clone(), config.fire.burner.origin());

        Self {
            controls,
            simulation: FireSimulation::new(&config.fire),
            clock: SimulationClock::new(&config.fire.clock),
            stats_mark: SimulationStats::default(),
            stats_at: Instant::now(),
            pipeline,
            draw_list: DrawList::with_capacity(config.fire.capacity + 16),
            window: None,
            render_context: None,
            gpu: None,
            drag: DragTracker::new(),
            control_bar,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            egui_renderer: None,
            error: None,
            config,
        }
    }

    pub fn controls(&self) -> &FireControls {
        &self.controls
    }

    /// Error that stopped the app, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );

        if window_config.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to initialize GPU")?;

        let gpu = GpuRenderer::new(
            &render_context.device,
            render_context.config.format,
            self.pipeline.config(),
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &render_context.device,
            render_context.config.format,
            None,
            1,
            false,
        );

        log::info!(
            "Window ready: {}x{}, energy {:.2}",
            render_context.config.width,
            render_context.config.height,
            self.controls.energy().value()
        );

        self.window = Some(window);
        self.render_context = Some(render_context);
        self.gpu = Some(gpu);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn set_energy(&mut self, energy: Energy) {
        if energy != self.controls.energy() {
            self.controls.set_energy(energy);
            log::debug!("energy -> {:.2}", energy.value());
        }
    }

    fn nudge_energy(&mut self, direction: f32) {
        let step = self.config.controls.energy_step * direction;
        self.set_energy(Energy::new(self.controls.energy().value() + step));
    }

    /// Run every tick that fell due since the last call
    fn tick(&mut self) {
        let due = self.clock.tick_now();
        if due > 0 {
            let energy = self.controls.energy();
            self.simulation.run_ticks(&mut self.clock, due, energy);
        }

        if self.stats_at.elapsed() >= STATS_INTERVAL {
            let stats = self.simulation.stats();
            let delta = stats.since(&self.stats_mark);
            log::debug!(
                "fire: {} alive, {} ticks, {} spawned, {} dropped, {} expired in the last {:.1}s",
                self.simulation.store().len(),
                delta.ticks,
                delta.spawned,
                delta.dropped,
                delta.expired,
                self.stats_at.elapsed().as_secs_f32()
            );
            self.stats_mark = stats;
            self.stats_at = Instant::now();
        }
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(context) = self.render_context.as_mut() else {
            return;
        };
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match context.acquire_frame() {
            Ok(Some(output)) => output,
            Ok(None) => return,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        let context = &*context;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let energy = self.controls.energy();
        let camera = self.pipeline.camera(
            self.controls.camera(),
            context.config.width,
            context.config.height,
        );
        self.draw_list.clear_commands();
        self.pipeline.draw(
            &mut self.draw_list,
            self.simulation.store(),
            self.simulation.color_mapper(),
            energy,
            &camera,
        );

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fire Encoder"),
            });

        gpu.render(
            &context.device,
            &context.queue,
            &mut encoder,
            &view,
            &context.depth_view,
            &self.draw_list,
        );

        // Control bar on top of the fire
        let mut slider_energy = None;
        let mut textures_to_free = Vec::new();
        if let (Some(egui_winit), Some(egui_renderer)) =
            (self.egui_winit.as_mut(), self.egui_renderer.as_mut())
        {
            let raw_input = egui_winit.take_egui_input(&window);
            let control_bar = &mut self.control_bar;
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                if let Some(e) = control_bar.show(ctx, energy) {
                    slider_energy = Some(e);
                }
            });

            egui_winit.handle_platform_output(&window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);

            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [context.config.width, context.config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(&context.device, &context.queue, *id, image_delta);
            }

            egui_renderer.update_buffers(
                &context.device,
                &context.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );

            {
                let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                let mut render_pass = render_pass.forget_lifetime();
                egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
            }

            textures_to_free = full_output.textures_delta.free;
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(egui_renderer) = self.egui_renderer.as_mut() {
            for id in &textures_to_free {
                egui_renderer.free_texture(id);
            }
        }

        if let Some(energy) = slider_energy {
            self.set_energy(energy);
        }
    }
}

impl ApplicationHandler for FireApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            log::error!("{e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Keep the drag anchor current even when egui claims the event
        if let WindowEvent::CursorMoved { position, .. } = &event {
            if let Some((dx, dy)) = self.drag.moved(position.x, position.y) {
                let angles =
                    self.controls
                        .drag_camera(dx, dy, self.config.controls.drag_sensitivity);
                log::trace!("camera pitch {:.1} yaw {:.1}", angles.pitch, angles.yaw);
            }
        }

        // Let egui handle the event first
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match key_code {
                        KeyCode::Escape => event_loop.exit(),
                        KeyCode::ArrowUp => self.nudge_energy(1.0),
                        KeyCode::ArrowDown => self.nudge_energy(-1.0),
                        _ => {}
                    }
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.drag.press(),
                ElementState::Released => self.drag.release(),
            },

            WindowEvent::CursorLeft { .. } => {
                self.drag.cursor_left();
            }

            WindowEvent::RedrawRequested => {
                self.clock.take_repaint();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.tick();

        if self.clock.repaint_pending() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        match self.clock.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Poll),
        }
    }
}
