//! Pyre Render - draws the fire simulation
//!
//! The frame logic (`RenderPipeline`) issues commands against the
//! `DrawContext` trait. `DrawList` records them; `GpuRenderer` replays a
//! recorded list with wgpu, instancing every particle sphere from one mesh.

mod camera;
mod context;
mod draw;
mod gpu;
mod pipeline;
mod primitives;

pub use camera::{transform_point, Camera};
pub use context::{RenderContext, RenderError};
pub use draw::{BlendMode, DrawCommand, DrawContext, DrawList, DrawState};
pub use gpu::{Batch, FrameBatches, FrameUniforms, GpuRenderer, PipelineKey, Shape, SphereInstance};
pub use pipeline::{RenderConfig, RenderPipeline};
pub use primitives::{
    create_sphere_mesh, disk_vertices, wire_box_vertices, ColorVertex, Mesh, Vertex,
};

#[cfg(test)]
mod tests {
    #[test]
    fn sphere_shader_wgsl_parses() {
        let source = include_str!("sphere_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("sphere_shader.wgsl failed to parse");
    }

    #[test]
    fn reference_shader_wgsl_parses() {
        let source = include_str!("reference_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("reference_shader.wgsl failed to parse");
    }
}
