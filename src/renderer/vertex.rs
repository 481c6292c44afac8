//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.85, 0.1, 0.15, 1.0];
    pub const PLAYER_FROZEN: [f32; 4] = [0.6, 0.85, 1.0, 1.0];
    pub const SHIELD: [f32; 4] = [0.0, 1.0, 1.0, 0.5];
    pub const COMPANION: [f32; 4] = [0.3, 0.9, 0.3, 1.0];
    pub const ENEMY_BASIC: [f32; 4] = [0.55, 0.35, 0.8, 1.0];
    pub const ENEMY_FAST: [f32; 4] = [1.0, 0.5, 0.1, 1.0];
    pub const BOSS: [f32; 4] = [0.35, 0.4, 0.5, 1.0];
    pub const BULLET: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const BOTTLE: [f32; 4] = [0.96, 0.0, 0.035, 1.0];
    pub const SNOWBALL: [f32; 4] = [0.95, 0.97, 1.0, 1.0];
    pub const JUICE: [f32; 4] = [1.0, 0.6, 0.0, 1.0];
    pub const BEAM_TELEGRAPH: [f32; 4] = [1.0, 0.1, 0.1, 0.35];
    pub const BEAM: [f32; 4] = [0.0, 1.0, 1.0, 0.85];
    pub const HEALTH_BAR_BACK: [f32; 4] = [0.2, 0.2, 0.25, 0.9];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 24);
        assert_eq!(desc.attributes[1].offset, 8);
        let verts = [Vertex::new(1.0, 2.0, [0.5; 4])];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 24);
    }
}
