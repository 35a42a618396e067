//! Draw-command abstraction between the frame logic and a graphics backend

use pyre_core::{Color, Vec3};

/// How fragments combine with what is already in the color buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`
    #[default]
    Alpha,
    /// `src * src_alpha + dst`
    Additive,
}

/// Fixed-function state a backend tracks between draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawState {
    pub blend: BlendMode,
    pub depth_write: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            blend: BlendMode::Alpha,
            depth_write: true,
        }
    }
}

/// A rendering context the frame is issued against
pub trait DrawContext {
    /// Clear color and depth buffers
    fn clear(&mut self, color: Color);
    /// Camera for subsequent geometry
    fn set_view(&mut self, view_projection: [[f32; 4]; 4], eye: Vec3);
    fn set_blend(&mut self, mode: BlendMode);
    fn set_depth_write(&mut self, enabled: bool);
    /// Shaded sphere at `center`
    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: Color);
    /// Flat disk in the XZ plane
    fn draw_disk(&mut self, center: Vec3, radius: f32, color: Color);
    /// Axis-aligned wireframe cube centered on the origin
    fn draw_wire_box(&mut self, half_extent: f32, color: Color);
    /// Back to `DrawState::default()`
    fn reset_state(&mut self);
}

/// One recorded call against a `DrawContext`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    SetView {
        view_projection: [[f32; 4]; 4],
        eye: Vec3,
    },
    SetBlend(BlendMode),
    SetDepthWrite(bool),
    Sphere {
        center: Vec3,
        radius: f32,
        color: Color,
    },
    Disk {
        center: Vec3,
        radius: f32,
        color: Color,
    },
    WireBox {
        half_extent: f32,
        color: Color,
    },
    ResetState,
}

impl DrawCommand {
    /// Whether this command produces geometry
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            DrawCommand::Sphere { .. } | DrawCommand::Disk { .. } | DrawCommand::WireBox { .. }
        )
    }
}

/// Records a frame's command stream
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty list with room for `capacity` commands
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forget recorded commands, keeping the allocation
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of particle spheres in the frame
    pub fn sphere_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sphere { .. }))
            .count()
    }

    /// Walk the stream and pair every geometry command with the state it
    /// is drawn under
    pub fn with_state(&self) -> impl Iterator<Item = (DrawState, &DrawCommand)> {
        let mut state = DrawState::default();
        self.commands.iter().filter_map(move |command| {
            match command {
                DrawCommand::SetBlend(mode) => state.blend = *mode,
                DrawCommand::SetDepthWrite(enabled) => state.depth_write = *enabled,
                DrawCommand::ResetState => state = DrawState::default(),
                _ => {}
            }
            command.is_geometry().then_some((state, command))
        })
    }

    /// State left in effect after the last command
    pub fn final_state(&self) -> DrawState {
        let mut state = DrawState::default();
        for command in &self.commands {
            match command {
                DrawCommand::SetBlend(mode) => state.blend = *mode,
                DrawCommand::SetDepthWrite(enabled) => state.depth_write = *enabled,
                DrawCommand::ResetState => state = DrawState::default(),
                _ => {}
            }
        }
        state
    }

    /// Re-issue the recorded stream against another context
    #[cfg(test)]
    pub fn replay<C: DrawContext + ?Sized>(&self, ctx: &mut C) {
        for command in &self.commands {
            match *command {
                DrawCommand::Clear(color) => ctx.clear(color),
                DrawCommand::SetView {
                    view_projection,
                    eye,
                } => ctx.set_view(view_projection, eye),
                DrawCommand::SetBlend(mode) => ctx.set_blend(mode),
                DrawCommand::SetDepthWrite(enabled) => ctx.set_depth_write(enabled),
                DrawCommand::Sphere {
                    center,
                    radius,
                    color,
                } => ctx.draw_sphere(center, radius, color),
                DrawCommand::Disk {
                    center,
                    radius,
                    color,
                } => ctx.draw_disk(center, radius, color),
                DrawCommand::WireBox { half_extent, color } => {
                    ctx.draw_wire_box(half_extent, color)
                }
                DrawCommand::ResetState => ctx.reset_state(),
            }
        }
    }
}

impl DrawContext for DrawList {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_view(&mut self, view_projection: [[f32; 4]; 4], eye: Vec3) {
        self.commands.push(DrawCommand::SetView {
            view_projection,
            eye,
        });
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::SetBlend(mode));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.commands.push(DrawCommand::SetDepthWrite(enabled));
    }

    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Sphere {
            center,
            radius,
            color,
        });
    }

    fn draw_disk(&mut self, center: Vec3, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Disk {
            center,
            radius,
            color,
        });
    }

    fn draw_wire_box(&mut self, half_extent: f32, color: Color) {
        self.commands
            .push(DrawCommand::WireBox { half_extent, color });
    }

    fn reset_state(&mut self) {
        self.commands.push(DrawCommand::ResetState);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let mut list = DrawList::new();
        list.clear(Color::BLACK);
        list.set_blend(BlendMode::Additive);
        list.draw_sphere(Vec3::ZERO, 0.1, Color::WHITE);
        list.reset_state();
        assert_eq!(list.len(), 4);
        assert_eq!(list.commands()[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(list.commands()[3], DrawCommand::ResetState);
        assert_eq!(list.sphere_count(), 1);
    }

    #[test]
    fn with_state_tracks_blend_and_depth() {
        let mut list = DrawList::new();
        list.draw_wire_box(1.0, Color::WHITE);
        list.set_blend(BlendMode::Additive);
        list.set_depth_write(false);
        list.draw_sphere(Vec3::ZERO, 0.1, Color::WHITE);
        list.reset_state();
        list.draw_disk(Vec3::ZERO, 0.3, Color::WHITE);

        let states: Vec<DrawState> = list.with_state().map(|(s, _)| s).collect();
        assert_eq!(
            states,
            vec![
                DrawState::default(),
                DrawState {
                    blend: BlendMode::Additive,
                    depth_write: false
                },
                DrawState::default(),
            ]
        );
    }

    #[test]
    fn final_state_after_reset_is_default() {
        let mut list = DrawList::new();
        list.set_blend(BlendMode::Additive);
        list.set_depth_write(false);
        assert_ne!(list.final_state(), DrawState::default());
        list.reset_state();
        assert_eq!(list.final_state(), DrawState::default());
    }

    #[test]
    fn replay_reproduces_the_stream() {
        let mut list = DrawList::new();
        list.clear(Color::new(0.1, 0.2, 0.3, 1.0));
        list.set_view(pyre_core::IDENTITY4, Vec3::new(0.0, 0.0, 5.0));
        list.set_depth_write(false);
        list.draw_sphere(Vec3::UP, 0.05, Color::WHITE);
        list.draw_disk(Vec3::ZERO, 0.35, Color::BLACK);
        list.draw_wire_box(1.2, Color::WHITE);
        list.reset_state();

        let mut copy = DrawList::new();
        list.replay(&mut copy);
        assert_eq!(copy.commands(), list.commands());
    }
}
