//! Mesh primitives (unit sphere, burner disk, wireframe box)

use bytemuck::{Pod, Zeroable};
use pyre_core::{Color, Vec3};
use std::f32::consts::{PI, TAU};

/// Sphere mesh vertex; the instance supplies center, radius and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Flat-colored vertex for the reference geometry
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Unit-radius UV sphere centered on the origin
pub fn create_sphere_mesh(slices: u32, stacks: u32) -> Mesh {
    let slices = slices.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for stack in 0..=stacks {
        // Polar angle from +Y down to -Y
        let theta = PI * stack as f32 / stacks as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for slice in 0..=slices {
            let phi = TAU * slice as f32 / slices as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let p = [sin_t * cos_p, cos_t, sin_t * sin_p];
            vertices.push(Vertex {
                position: p,
                normal: p,
            });
        }
    }

    let ring = slices + 1;
    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * ring + slice;
            let b = a + ring;
            // Pole rows collapse to a point; skip their degenerate halves
            if stack != 0 {
                indices.extend_from_slice(&[a, a + 1, b]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[a + 1, b + 1, b]);
            }
        }
    }

    Mesh { vertices, indices }
}

/// Filled disk in the XZ plane as a triangle list
pub fn disk_vertices(center: Vec3, radius: f32, segments: u32, color: Color) -> Vec<ColorVertex> {
    let segments = segments.max(3);
    let color = color.to_array();
    let hub = ColorVertex {
        position: center.to_array(),
        color,
    };
    let rim = |i: u32| {
        let angle = TAU * i as f32 / segments as f32;
        ColorVertex {
            position: [
                center.x + radius * angle.cos(),
                center.y,
                center.z + radius * angle.sin(),
            ],
            color,
        }
    };

    (0..segments)
        .flat_map(|i| [hub, rim(i), rim(i + 1)])
        .collect()
}

/// The 12 edges of a cube with the given half-extent as a line list
pub fn wire_box_vertices(half_extent: f32, color: Color) -> Vec<ColorVertex> {
    let s = half_extent;
    let corners = [
        [-s, -s, -s],
        [s, -s, -s],
        [s, s, -s],
        [-s, s, -s],
        [-s, -s, s],
        [s, -s, s],
        [s, s, s],
        [-s, s, s],
    ];
    const EDGES: [(usize, usize); 12] = [
        // Bottom
        (0, 1),
        (1, 5),
        (5, 4),
        (4, 0),
        // Top
        (3, 2),
        (2, 6),
        (6, 7),
        (7, 3),
        // Vertical
        (0, 3),
        (1, 2),
        (5, 6),
        (4, 7),
    ];

    let color = color.to_array();
    EDGES
        .iter()
        .flat_map(|&(a, b)| {
            [
                ColorVertex {
                    position: corners[a],
                    color,
                },
                ColorVertex {
                    position: corners[b],
                    color,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let mesh = create_sphere_mesh(12, 12);
        assert_eq!(mesh.vertex_count(), 13 * 13);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 1.0).abs() < 1e-5);
            assert_eq!(v.position, v.normal);
        }
    }

    #[test]
    fn sphere_indices_form_triangles_in_range() {
        let mesh = create_sphere_mesh(12, 12);
        // Two triangles per quad, minus one per quad on each pole row
        assert_eq!(mesh.index_count(), (12 * 12 * 2 - 2 * 12) * 3);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn sphere_clamps_tessellation() {
        let mesh = create_sphere_mesh(0, 0);
        assert_eq!(mesh.vertex_count(), 4 * 3);
        assert!(mesh.index_count() > 0);
    }

    #[test]
    fn disk_is_a_flat_fan() {
        let center = Vec3::new(0.0, -1.0, 0.0);
        let verts = disk_vertices(center, 0.35, 40, Color::WHITE);
        assert_eq!(verts.len(), 40 * 3);
        for (i, v) in verts.iter().enumerate() {
            assert_eq!(v.position[1], -1.0);
            let d = Vec3::from_array(v.position).horizontal_distance(&center);
            if i % 3 == 0 {
                assert!(d < 1e-6);
            } else {
                assert!((d - 0.35).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn wire_box_has_twelve_axis_aligned_edges() {
        let verts = wire_box_vertices(1.2, Color::WHITE);
        assert_eq!(verts.len(), 24);
        for edge in verts.chunks(2) {
            let d = Vec3::from_array(edge[0].position) - Vec3::from_array(edge[1].position);
            // Exactly one axis differs, by the full edge length
            let changed = [d.x, d.y, d.z].iter().filter(|c| c.abs() > 1e-6).count();
            assert_eq!(changed, 1);
            assert!((d.length() - 2.4).abs() < 1e-5);
        }
    }
}
