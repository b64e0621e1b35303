//! Rendering module for the sphere visualizer
//!
//! The CPU side ([`renderer`]) turns the scene into a [`renderer::FramePlan`]
//! of per-body material bindings; the GPU side ([`gpu`]) owns the wgpu
//! surface, uploads the shared sphere mesh once and issues one indexed draw
//! per binding.

pub mod camera;
pub mod gpu;
pub mod lighting;
pub mod mesh;
pub mod renderer;
pub mod shaders;

// Re-export commonly used items
pub use camera::Camera;
pub use gpu::GpuBackend;
pub use lighting::{PhongModel, PointLight};
pub use mesh::{generate_sphere, Mesh, MeshError};
pub use renderer::{DrawBackend, FrameOutcome, FramePlan, MaterialBinding, Renderer};

use glam::Mat4;

/// Vertex layout shared by the mesh generator and the pipeline
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Get the vertex buffer layout for wgpu
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-draw uniform block, laid out to match `ObjectUniforms` in
/// `assets/shaders/phong.wgsl` (vec3 members padded to 16 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub _pad0: f32,
    pub light_color: [f32; 3],
    pub _pad1: f32,
    pub view_pos: [f32; 3],
    pub _pad2: f32,
    pub object_color: [f32; 3],
    pub _pad3: f32,
}

impl ObjectUniforms {
    pub const SIZE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;

    pub fn from_binding(binding: &MaterialBinding) -> Self {
        Self {
            model: binding.model.to_cols_array_2d(),
            view: binding.view.to_cols_array_2d(),
            projection: binding.projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(binding.normal_matrix).to_cols_array_2d(),
            light_pos: binding.light_position.to_array(),
            _pad0: 0.0,
            light_color: binding.light_color.to_array(),
            _pad1: 0.0,
            view_pos: binding.view_position.to_array(),
            _pad2: 0.0,
            object_color: binding.object_color.to_array(),
            _pad3: 0.0,
        }
    }
}

/// Rendering error types
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Surface creation error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No compatible GPU adapter found")]
    NoAdapter,
    #[error("Device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Shader compilation error: {0}")]
    Shader(String),
    #[error("Resource creation error: {0}")]
    Resource(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
