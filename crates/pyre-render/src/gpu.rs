//! wgpu backend that executes a recorded `DrawList`
//!
//! Geometry commands are grouped into batches sharing one pipeline (shape,
//! blend mode, depth-write flag). Spheres are instanced from a single unit
//! mesh; the burner disk and wireframe box are plain colored vertices.

use crate::draw::{BlendMode, DrawCommand, DrawList, DrawState};
use crate::pipeline::RenderConfig;
use crate::primitives::{create_sphere_mesh, disk_vertices, wire_box_vertices, ColorVertex, Vertex};
use bytemuck::{Pod, Zeroable};
use pyre_core::{Color, Vec3, IDENTITY4};
use std::collections::HashMap;
use std::ops::Range;
use wgpu::util::DeviceExt;

/// Per-sphere instance data, matches `InstanceInput` in the sphere shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereInstance {
    /// xyz = center, w = radius
    pub center_radius: [f32; 4],
    pub color: [f32; 4],
}

impl SphereInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
    ];

    pub fn new(center: Vec3, radius: f32, color: Color) -> Self {
        Self {
            center_radius: [center.x, center.y, center.z, radius],
            color: color.to_array(),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Uniforms shared by every draw in a frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    Triangles,
    Lines,
}

/// Everything that selects a distinct `wgpu::RenderPipeline`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shape: Shape,
    pub state: DrawState,
}

/// A run of consecutive geometry drawn with one pipeline.
///
/// `range` indexes `instances` for spheres and `reference_vertices`
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub key: PipelineKey,
    pub range: Range<u32>,
}

/// A `DrawList` flattened into GPU-ready arrays
#[derive(Debug, Clone)]
pub struct FrameBatches {
    pub clear_color: Color,
    pub view_projection: [[f32; 4]; 4],
    pub eye: Vec3,
    pub instances: Vec<SphereInstance>,
    pub reference_vertices: Vec<ColorVertex>,
    pub batches: Vec<Batch>,
}

impl Default for FrameBatches {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            view_projection: IDENTITY4,
            eye: Vec3::ZERO,
            instances: Vec::new(),
            reference_vertices: Vec::new(),
            batches: Vec::new(),
        }
    }
}

impl FrameBatches {
    /// Walk the list in order, tracking render state, and coalesce
    /// neighbouring geometry that shares a pipeline
    pub fn build(list: &DrawList, disk_segments: u32) -> Self {
        let mut frame = FrameBatches::default();
        let mut state = DrawState::default();

        for command in list.commands() {
            match *command {
                DrawCommand::Clear(color) => frame.clear_color = color,
                DrawCommand::SetView {
                    view_projection,
                    eye,
                } => {
                    frame.view_projection = view_projection;
                    frame.eye = eye;
                }
                DrawCommand::SetBlend(mode) => state.blend = mode,
                DrawCommand::SetDepthWrite(enabled) => state.depth_write = enabled,
                DrawCommand::ResetState => state = DrawState::default(),
                DrawCommand::Sphere {
                    center,
                    radius,
                    color,
                } => {
                    frame
                        .instances
                        .push(SphereInstance::new(center, radius, color));
                    frame.push(Shape::Sphere, state, 1);
                }
                DrawCommand::Disk {
                    center,
                    radius,
                    color,
                } => {
                    let vertices = disk_vertices(center, radius, disk_segments, color);
                    let count = vertices.len() as u32;
                    frame.reference_vertices.extend(vertices);
                    frame.push(Shape::Triangles, state, count);
                }
                DrawCommand::WireBox { half_extent, color } => {
                    let vertices = wire_box_vertices(half_extent, color);
                    let count = vertices.len() as u32;
                    frame.reference_vertices.extend(vertices);
                    frame.push(Shape::Lines, state, count);
                }
            }
        }
        frame
    }

    /// Record `count` items just appended for `shape`
    fn push(&mut self, shape: Shape, state: DrawState, count: u32) {
        let key = PipelineKey { shape, state };
        if let Some(last) = self.batches.last_mut() {
            if last.key == key {
                last.range.end += count;
                return;
            }
        }
        let end = match shape {
            Shape::Sphere => self.instances.len() as u32,
            Shape::Triangles | Shape::Lines => self.reference_vertices.len() as u32,
        };
        self.batches.push(Batch {
            key,
            range: end - count..end,
        });
    }

    /// Light from the eye's side of the scene (from above without a view)
    pub fn uniforms(&self) -> FrameUniforms {
        let mut l = self.eye.normalized();
        if l == Vec3::ZERO {
            l = Vec3::UP;
        }
        FrameUniforms {
            view_proj: self.view_projection,
            light_dir: [l.x, l.y, l.z, 0.0],
        }
    }
}

/// Executes draw lists against a color + depth target
pub struct GpuRenderer {
    format: wgpu::TextureFormat,
    disk_segments: u32,
    sphere_shader: wgpu::ShaderModule,
    reference_shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sphere_vertex_buffer: wgpu::Buffer,
    sphere_index_buffer: wgpu::Buffer,
    sphere_index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    reference_buffer: wgpu::Buffer,
    reference_capacity: usize,
}

impl GpuRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &RenderConfig) -> Self {
        let sphere_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sphere_shader.wgsl").into()),
        });
        let reference_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Reference Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("reference_shader.wgsl").into()),
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Frame Uniform Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fire Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FrameBatches::default().uniforms()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Frame Uniform Bind Group"),
        });

        let mesh = create_sphere_mesh(config.sphere_slices, config.sphere_stacks);
        let sphere_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = pyre_particles::MAX_PARTICLES;
        let instance_buffer = create_vertex_buffer(
            device,
            "Sphere Instance Buffer",
            instance_capacity * std::mem::size_of::<SphereInstance>(),
        );
        let reference_capacity = 256;
        let reference_buffer = create_vertex_buffer(
            device,
            "Reference Vertex Buffer",
            reference_capacity * std::mem::size_of::<ColorVertex>(),
        );

        log::debug!(
            "GPU renderer ready: {}x{} sphere ({} indices), format {:?}",
            config.sphere_slices,
            config.sphere_stacks,
            mesh.index_count(),
            format
        );

        Self {
            format,
            disk_segments: config.burner_segments,
            sphere_shader,
            reference_shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            uniform_buffer,
            uniform_bind_group,
            sphere_vertex_buffer,
            sphere_index_buffer,
            sphere_index_count: mesh.index_count() as u32,
            instance_buffer,
            instance_capacity,
            reference_buffer,
            reference_capacity,
        }
    }

    /// Record one render pass for `list` into `encoder`.
    ///
    /// Clears `color_view` and `depth_view` first; UI drawn afterward should
    /// load rather than clear.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        list: &DrawList,
    ) {
        let frame = FrameBatches::build(list, self.disk_segments);
        self.upload(device, queue, &frame);
        for batch in &frame.batches {
            if !self.pipelines.contains_key(&batch.key) {
                let pipeline = self.create_pipeline(device, batch.key);
                self.pipelines.insert(batch.key, pipeline);
            }
        }

        let c = frame.clear_color;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Fire Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: c.r as f64,
                        g: c.g as f64,
                        b: c.b as f64,
                        a: c.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for batch in &frame.batches {
            let Some(pipeline) = self.pipelines.get(&batch.key) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            match batch.key.shape {
                Shape::Sphere => {
                    pass.set_vertex_buffer(0, self.sphere_vertex_buffer.slice(..));
                    pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    pass.set_index_buffer(
                        self.sphere_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..self.sphere_index_count, 0, batch.range.clone());
                }
                Shape::Triangles | Shape::Lines => {
                    pass.set_vertex_buffer(0, self.reference_buffer.slice(..));
                    pass.draw(batch.range.clone(), 0..1);
                }
            }
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &FrameBatches) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[frame.uniforms()]),
        );

        if frame.instances.len() > self.instance_capacity {
            self.instance_capacity = frame.instances.len().next_power_of_two();
            self.instance_buffer = create_vertex_buffer(
                device,
                "Sphere Instance Buffer",
                self.instance_capacity * std::mem::size_of::<SphereInstance>(),
            );
            log::debug!("grew sphere instance buffer to {}", self.instance_capacity);
        }
        if !frame.instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&frame.instances),
            );
        }

        if frame.reference_vertices.len() > self.reference_capacity {
            self.reference_capacity = frame.reference_vertices.len().next_power_of_two();
            self.reference_buffer = create_vertex_buffer(
                device,
                "Reference Vertex Buffer",
                self.reference_capacity * std::mem::size_of::<ColorVertex>(),
            );
        }
        if !frame.reference_vertices.is_empty() {
            queue.write_buffer(
                &self.reference_buffer,
                0,
                bytemuck::cast_slice(&frame.reference_vertices),
            );
        }
    }

    fn create_pipeline(&self, device: &wgpu::Device, key: PipelineKey) -> wgpu::RenderPipeline {
        let blend = match key.state.blend {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            // src_alpha + One
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        };

        let (module, vs, fs, topology, label) = match key.shape {
            Shape::Sphere => (
                &self.sphere_shader,
                "vs_sphere",
                "fs_sphere",
                wgpu::PrimitiveTopology::TriangleList,
                "Sphere Pipeline",
            ),
            Shape::Triangles => (
                &self.reference_shader,
                "vs_reference",
                "fs_reference",
                wgpu::PrimitiveTopology::TriangleList,
                "Reference Fill Pipeline",
            ),
            Shape::Lines => (
                &self.reference_shader,
                "vs_reference",
                "fs_reference",
                wgpu::PrimitiveTopology::LineList,
                "Reference Line Pipeline",
            ),
        };

        let sphere_buffers = [Vertex::desc(), SphereInstance::desc()];
        let reference_buffers = [ColorVertex::desc()];
        let buffers: &[wgpu::VertexBufferLayout] = match key.shape {
            Shape::Sphere => &sphere_buffers,
            Shape::Triangles | Shape::Lines => &reference_buffers,
        };

        log::debug!("building {label} ({:?})", key.state);

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(vs),
                buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Depth test always on; only the write mask follows the draw state
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: key.state.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size.max(16) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawContext;
    use crate::pipeline::RenderPipeline;
    use pyre_core::{CameraAngles, Energy};
    use pyre_particles::{ColorMapper, Particle, ParticleStore};

    fn recorded_frame(particles: usize) -> DrawList {
        let mut store = ParticleStore::new(particles.max(1));
        for i in 0..particles {
            let p = Vec3::new(0.0, -1.0 + i as f32 * 0.01, 0.0);
            store.add(Particle::new(p, Vec3::ZERO, 1.0, 0.05, 0.0));
        }
        let pipeline = RenderPipeline::default();
        let camera = pipeline.camera(CameraAngles::default(), 1100, 750);
        let mut list = DrawList::new();
        pipeline.draw(
            &mut list,
            &store,
            &ColorMapper::default(),
            Energy::new(0.5),
            &camera,
        );
        list
    }

    #[test]
    fn gpu_structs_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<SphereInstance>(), 32);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<ColorVertex>(), 28);
    }

    #[test]
    fn frame_collapses_into_three_batches() {
        let frame = FrameBatches::build(&recorded_frame(50), 40);
        assert_eq!(frame.instances.len(), 50);
        assert_eq!(frame.reference_vertices.len(), 40 * 3 + 24);
        assert_eq!(frame.batches.len(), 3);

        let spheres = &frame.batches[0];
        assert_eq!(spheres.key.shape, Shape::Sphere);
        assert_eq!(spheres.key.state.blend, BlendMode::Additive);
        assert!(!spheres.key.state.depth_write);
        assert_eq!(spheres.range, 0..50);

        assert_eq!(frame.batches[1].key.shape, Shape::Triangles);
        assert_eq!(frame.batches[1].range, 0..120);
        assert_eq!(frame.batches[2].key.shape, Shape::Lines);
        assert_eq!(frame.batches[2].range, 120..144);
        assert!(frame.batches[1].key.state.depth_write);
    }

    #[test]
    fn empty_store_still_draws_reference_geometry() {
        let frame = FrameBatches::build(&recorded_frame(0), 40);
        assert!(frame.instances.is_empty());
        assert_eq!(frame.batches.len(), 2);
        assert_eq!(frame.clear_color, Color::new(0.02, 0.02, 0.05, 1.0));
    }

    #[test]
    fn state_change_splits_a_batch() {
        let mut list = DrawList::new();
        list.draw_sphere(Vec3::ZERO, 0.1, Color::WHITE);
        list.draw_sphere(Vec3::UP, 0.1, Color::WHITE);
        list.set_blend(BlendMode::Additive);
        list.draw_sphere(Vec3::ZERO, 0.1, Color::WHITE);
        let frame = FrameBatches::build(&list, 8);
        assert_eq!(frame.batches.len(), 2);
        assert_eq!(frame.batches[0].range, 0..2);
        assert_eq!(frame.batches[1].range, 2..3);
    }

    #[test]
    fn uniforms_carry_camera() {
        let frame = FrameBatches::build(&recorded_frame(1), 40);
        let uniforms = frame.uniforms();
        assert_ne!(uniforms.view_proj, IDENTITY4);
        let light = Vec3::new(uniforms.light_dir[0], uniforms.light_dir[1], uniforms.light_dir[2]);
        assert!((light.length() - 1.0).abs() < 1e-5);
    }
}
