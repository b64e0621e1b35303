use super::mesh::Mesh;
use super::renderer::{DrawBackend, FrameOutcome, FramePlan};
use super::shaders::{ShaderManager, PHONG_WGSL};
use super::{ObjectUniforms, RenderError, RenderResult, Vertex};
use std::path::Path;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADER_NAME: &str = "phong";

/// Sphere geometry resident on the GPU. Only the handles survive the upload.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Takes the CPU mesh by value; its vertex and index vectors are freed
    /// as soon as the buffers are created.
    fn upload(device: &wgpu::Device, mesh: Mesh) -> RenderResult<Self> {
        let index_count = u32::try_from(mesh.index_count())
            .map_err(|_| RenderError::Resource("index count exceeds u32".into()))?;
        let limit = device.limits().max_buffer_size;
        check_buffer_size("sphere_vertices", std::mem::size_of_val(mesh.vertices.as_slice()) as u64, limit)?;
        check_buffer_size("sphere_indices", std::mem::size_of_val(mesh.indices.as_slice()) as u64, limit)?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count,
        })
    }
}

/// Reject a buffer the device cannot allocate before wgpu raises an
/// uncaptured validation error for it.
fn check_buffer_size(label: &str, bytes: u64, limit: u64) -> RenderResult<()> {
    if bytes > limit {
        return Err(RenderError::Resource(format!(
            "{label}: {bytes} bytes exceeds the device limit of {limit} bytes"
        )));
    }
    Ok(())
}

/// wgpu implementation of [`DrawBackend`].
///
/// One dynamic-offset uniform buffer holds a slot per body; each draw binds
/// its slot, so all uniforms for a draw change together.
pub struct GpuBackend {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pub shader_manager: ShaderManager,
    pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    mesh: GpuMesh,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_slots: usize,
    staging: Vec<u8>,
}

impl GpuBackend {
    pub async fn new(
        window: Arc<Window>,
        mesh: Mesh,
        body_count: usize,
        shader_path: Option<&Path>,
    ) -> RenderResult<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;
        let surface_caps = surface.get_capabilities(&adapter);
        let format = *surface_caps
            .formats
            .first()
            .ok_or_else(|| RenderError::Resource("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("Surface {}x{} format {:?}", config.width, config.height, format);

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let mut shader_manager = ShaderManager::new(device.clone());
        match shader_path {
            Some(path) => shader_manager.load_wgsl_file(SHADER_NAME, path)?,
            None => shader_manager.load_wgsl_str(SHADER_NAME, PHONG_WGSL)?,
        }

        let mesh = GpuMesh::upload(&device, mesh)?;

        // Uniform slots: one per body, each at an aligned dynamic offset
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = ObjectUniforms::SIZE.div_ceil(align) * align;
        let uniform_slots = body_count.max(1);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: uniform_stride * uniform_slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("object_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(ObjectUniforms::SIZE),
                    },
                    count: None,
                }],
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bg"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(ObjectUniforms::SIZE),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });
        let module = shader_manager
            .get(SHADER_NAME)
            .ok_or_else(|| RenderError::Shader("phong shader missing".into()))?;

        // Link step: entry point or interface mismatches surface here
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::Shader(format!("pipeline link failed: {err}")));
        }

        let depth_view = create_depth_view(&device, &config);
        let staging = vec![0u8; (uniform_stride as usize) * uniform_slots];

        Ok(Self {
            device,
            queue,
            surface,
            config,
            shader_manager,
            pipeline,
            depth_view,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_slots,
            staging,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count
    }

    fn write_uniforms(&mut self, frame: &FramePlan) {
        let size = ObjectUniforms::SIZE as usize;
        for (i, binding) in frame.bindings.iter().enumerate() {
            let offset = i * self.uniform_stride as usize;
            let uniforms = ObjectUniforms::from_binding(binding);
            self.staging[offset..offset + size].copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        let used = frame.bindings.len() * self.uniform_stride as usize;
        self.queue
            .write_buffer(&self.uniform_buffer, 0, &self.staging[..used]);
    }
}

impl DrawBackend for GpuBackend {
    fn framebuffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    fn submit(&mut self, frame: &FramePlan) -> RenderResult<FrameOutcome> {
        if frame.bindings.len() > self.uniform_slots {
            return Err(RenderError::Resource(format!(
                "{} draws but only {} uniform slots",
                frame.bindings.len(),
                self.uniform_slots
            )));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(FrameOutcome::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface acquire timed out, skipping frame");
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if !frame.bindings.is_empty() {
            self.write_uniforms(frame);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render"),
            });
        {
            let [r, g, b] = frame.clear_color;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spheres"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for i in 0..frame.bindings.len() {
                let offset = (i as u64 * self.uniform_stride) as wgpu::DynamicOffset;
                rpass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                rpass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(FrameOutcome::Presented)
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_within_limit() {
        assert!(check_buffer_size("v", 256, 256).is_ok());
        assert!(check_buffer_size("v", 0, 256).is_ok());
    }

    #[test]
    fn test_oversized_mesh_rejected() {
        // default wgpu max_buffer_size
        let limit = wgpu::Limits::default().max_buffer_size;
        // a 4000x4000 sphere has 4001 * 4001 vertices
        let bytes = 4001 * 4001 * std::mem::size_of::<Vertex>() as u64;
        assert!(bytes > limit);
        let err = check_buffer_size("sphere_vertices", bytes, limit).unwrap_err();
        assert!(matches!(err, RenderError::Resource(ref msg) if msg.contains("sphere_vertices")));
    }
}
