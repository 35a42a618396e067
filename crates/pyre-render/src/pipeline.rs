//! Per-frame draw logic: camera, particle ordering, render state

use crate::camera::Camera;
use crate::draw::{BlendMode, DrawContext};
use pyre_core::{CameraAngles, Color, Energy, Vec3};
use pyre_particles::{ColorMapper, ParticleStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    /// Scene translation applied before the camera rotation
    pub camera_offset: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Longitude segments of the particle sphere mesh
    pub sphere_slices: u32,
    /// Latitude segments of the particle sphere mesh
    pub sphere_stacks: u32,
    pub burner_radius: f32,
    pub burner_segments: u32,
    pub burner_color: [f32; 4],
    pub box_half_extent: f32,
    pub box_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.02, 0.02, 0.05, 1.0],
            camera_offset: [0.0, -0.2, -5.0],
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            sphere_slices: 12,
            sphere_stacks: 12,
            burner_radius: 0.35,
            burner_segments: 40,
            burner_color: [0.6, 0.6, 0.7, 0.35],
            box_half_extent: 1.2,
            box_color: [0.6, 0.75, 1.0, 0.07],
        }
    }
}

impl RenderConfig {
    /// Clamp values a GPU backend cannot work with
    pub fn sanitized(mut self) -> Self {
        let d = RenderConfig::default();
        if !(self.fov.is_finite() && self.fov > 1.0 && self.fov < 179.0) {
            self.fov = d.fov;
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            self.near = d.near;
        }
        if !(self.far.is_finite() && self.far > self.near) {
            self.far = self.near.max(d.near) * 1000.0;
        }
        self.sphere_slices = self.sphere_slices.clamp(3, 128);
        self.sphere_stacks = self.sphere_stacks.clamp(2, 128);
        self.burner_segments = self.burner_segments.clamp(3, 512);
        if !(self.burner_radius.is_finite() && self.burner_radius >= 0.0) {
            self.burner_radius = d.burner_radius;
        }
        if !(self.box_half_extent.is_finite() && self.box_half_extent >= 0.0) {
            self.box_half_extent = d.box_half_extent;
        }
        self
    }
}

/// Issues one frame of the fire against a `DrawContext`
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    config: RenderConfig,
    burner_center: Vec3,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(RenderConfig::default(), Vec3::new(0.0, -1.0, 0.0))
    }
}

impl RenderPipeline {
    /// `burner_center` is where the reference disk is drawn (the spawn
    /// origin)
    pub fn new(config: RenderConfig, burner_center: Vec3) -> Self {
        Self {
            config: config.sanitized(),
            burner_center,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Camera for the given angles and viewport
    pub fn camera(&self, angles: CameraAngles, width: u32, height: u32) -> Camera {
        Camera {
            angles,
            offset: Vec3::from_array(self.config.camera_offset),
            fov: self.config.fov,
            near: self.config.near,
            far: self.config.far,
            ..Camera::default()
        }
        .with_viewport(width, height)
    }

    /// Draw the frame: particles back-to-front with additive blending and
    /// no depth writes, then the reference geometry with normal blending,
    /// then restore default state.
    pub fn draw<C: DrawContext + ?Sized>(
        &self,
        ctx: &mut C,
        store: &ParticleStore,
        colors: &ColorMapper,
        energy: Energy,
        camera: &Camera,
    ) {
        let eye = camera.eye_position();
        ctx.clear(Color::from_array(self.config.clear_color));
        ctx.set_view(camera.view_projection_matrix(), eye);

        ctx.set_blend(BlendMode::Additive);
        ctx.set_depth_write(false);
        for p in store.snapshot_ordered_by_depth(eye, camera.forward_vector()) {
            ctx.draw_sphere(p.position, p.radius, colors.color(energy, p.age01()));
        }

        ctx.set_depth_write(true);
        ctx.set_blend(BlendMode::Alpha);
        ctx.draw_disk(
            self.burner_center,
            self.config.burner_radius,
            Color::from_array(self.config.burner_color),
        );
        ctx.draw_wire_box(
            self.config.box_half_extent,
            Color::from_array(self.config.box_color),
        );

        ctx.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawCommand, DrawList, DrawState};
    use pyre_particles::Particle;

    fn store_with(points: &[Vec3]) -> ParticleStore {
        let mut store = ParticleStore::new(16);
        for (i, &p) in points.iter().enumerate() {
            store.add(Particle::new(p, Vec3::ZERO, 1.0, 0.05, i as f32));
        }
        store
    }

    fn frame(store: &ParticleStore, angles: CameraAngles) -> DrawList {
        let pipeline = RenderPipeline::default();
        let camera = pipeline.camera(angles, 1100, 750);
        let mut list = DrawList::new();
        pipeline.draw(
            &mut list,
            store,
            &ColorMapper::default(),
            Energy::new(0.5),
            &camera,
        );
        list
    }

    #[test]
    fn frame_starts_with_clear_and_view() {
        let list = frame(&store_with(&[]), CameraAngles::default());
        assert_eq!(
            list.commands()[0],
            DrawCommand::Clear(Color::new(0.02, 0.02, 0.05, 1.0))
        );
        assert!(matches!(list.commands()[1], DrawCommand::SetView { .. }));
    }

    #[test]
    fn particles_drawn_additive_without_depth_writes() {
        let store = store_with(&[Vec3::ZERO, Vec3::UP, Vec3::new(0.3, 0.2, 0.1)]);
        let list = frame(&store, CameraAngles::default());
        let spheres: Vec<DrawState> = list
            .with_state()
            .filter(|(_, c)| matches!(c, DrawCommand::Sphere { .. }))
            .map(|(s, _)| s)
            .collect();
        assert_eq!(spheres.len(), 3);
        for state in spheres {
            assert_eq!(state.blend, BlendMode::Additive);
            assert!(!state.depth_write);
        }
    }

    #[test]
    fn particles_ordered_back_to_front() {
        // Unrotated camera looks down -Z from z = 5
        let store = store_with(&[
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]);
        let list = frame(&store, CameraAngles::new(0.0, 0.0));
        let zs: Vec<f32> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sphere { center, .. } => Some(center.z),
                _ => None,
            })
            .collect();
        assert_eq!(zs, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn reference_geometry_after_particles_with_depth_writes() {
        let store = store_with(&[Vec3::ZERO]);
        let list = frame(&store, CameraAngles::default());
        let geometry: Vec<(DrawState, &DrawCommand)> = list.with_state().collect();
        assert_eq!(geometry.len(), 3);
        assert!(matches!(geometry[0].1, DrawCommand::Sphere { .. }));

        let (disk_state, disk) = geometry[1];
        assert!(matches!(disk, DrawCommand::Disk { radius, .. } if *radius == 0.35));
        assert_eq!(disk_state, DrawState::default());

        let (box_state, wire) = geometry[2];
        assert!(matches!(wire, DrawCommand::WireBox { half_extent, .. } if *half_extent == 1.2));
        assert_eq!(box_state, DrawState::default());
    }

    #[test]
    fn frame_ends_with_state_reset() {
        let list = frame(&store_with(&[Vec3::ZERO]), CameraAngles::default());
        assert_eq!(list.commands().last(), Some(&DrawCommand::ResetState));
        assert_eq!(list.final_state(), DrawState::default());
    }

    #[test]
    fn sphere_colors_follow_age() {
        let mut store = ParticleStore::new(4);
        let mut old = Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0, 0.05, 0.0);
        old.life = 0.1;
        store.add(old);
        let list = frame(&store, CameraAngles::default());
        let expected = ColorMapper::default().color(Energy::new(0.5), old.age01());
        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Sphere { color, .. } if *color == expected
        )));
    }

    #[test]
    fn camera_uses_configured_lens() {
        let pipeline = RenderPipeline::new(
            RenderConfig {
                fov: 60.0,
                far: 50.0,
                ..RenderConfig::default()
            },
            Vec3::ZERO,
        );
        let camera = pipeline.camera(CameraAngles::default(), 800, 400);
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.far, 50.0);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn sanitize_repairs_lens() {
        let config = RenderConfig {
            fov: f32::NAN,
            near: -1.0,
            far: 0.0,
            sphere_slices: 0,
            ..RenderConfig::default()
        }
        .sanitized();
        assert_eq!(config.fov, 45.0);
        assert_eq!(config.near, 0.1);
        assert!(config.far > config.near);
        assert_eq!(config.sphere_slices, 3);
    }
}
