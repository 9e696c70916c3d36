//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
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
    /// Deep ink-blue void the field clears to
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
    /// Free particle of the unknown
    pub const PARTICLE: [f32; 4] = [0.45, 0.55, 0.75, 0.35];
    /// Particle currently pushed by a stroke
    pub const PARTICLE_INFLUENCED: [f32; 4] = [0.85, 0.65, 0.45, 0.55];
    /// Finalized stroke ink
    pub const STROKE: [f32; 4] = [0.92, 0.90, 0.85, 1.0];
    /// The stroke under the pointer, always at full strength
    pub const STROKE_ACTIVE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Detached fragment ghost
    pub const FRAGMENT: [f32; 4] = [0.75, 0.72, 0.68, 0.7];
    /// Unknown-curve hint layer
    pub const CURVE_HINT: [f32; 4] = [0.65, 0.45, 0.85, 0.8];
}
