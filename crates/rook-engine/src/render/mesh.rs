//! Vertex format and the shared unit quad.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // tex_coords
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit quad centered on the origin. Texture `v` grows upward, matching the
/// vertically flipped image rows.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { position: [0.5, 0.5, 0.0], tex_coords: [1.0, 1.0] },
    Vertex { position: [0.5, -0.5, 0.0], tex_coords: [1.0, 0.0] },
    Vertex { position: [-0.5, -0.5, 0.0], tex_coords: [0.0, 0.0] },
    Vertex { position: [-0.5, 0.5, 0.0], tex_coords: [0.0, 1.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 3, 1, 2, 3];

/// CPU-side mesh handed to [`Graphics::create_mesh`](super::Graphics::create_mesh).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn unit_quad() -> Self {
        Self {
            vertices: QUAD_VERTICES.to_vec(),
            indices: QUAD_INDICES.to_vec(),
        }
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 5 * 4);
        assert_eq!(Vertex::layout().array_stride, 20);
    }

    #[test]
    fn quad_spans_one_unit() {
        let xs = QUAD_VERTICES.map(|v| v.position[0]);
        let ys = QUAD_VERTICES.map(|v| v.position[1]);
        let span = |v: [f32; 4]| {
            v.iter().copied().fold(f32::MIN, f32::max) - v.iter().copied().fold(f32::MAX, f32::min)
        };
        assert_eq!(span(xs), 1.0);
        assert_eq!(span(ys), 1.0);
    }

    #[test]
    fn quad_is_two_triangles_over_four_vertices() {
        let mesh = MeshData::unit_quad();
        assert_eq!(mesh.index_count(), 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn texture_v_follows_position_y() {
        for v in QUAD_VERTICES {
            assert_eq!(v.tex_coords[0], v.position[0] + 0.5);
            assert_eq!(v.tex_coords[1], v.position[1] + 0.5);
        }
    }
}
