use super::{RenderError, RenderResult};
use std::{collections::HashMap, path::Path, sync::Arc};

/// Phong vertex + fragment stages, compiled into the binary.
pub const PHONG_WGSL: &str = include_str!("../../assets/shaders/phong.wgsl");

pub struct ShaderManager {
    device: Arc<wgpu::Device>,
    shader_modules: HashMap<String, wgpu::ShaderModule>,
}

impl ShaderManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device, shader_modules: HashMap::new() }
    }

    /// Compile a WGSL module. Validation failures are returned as
    /// [`RenderError::Shader`] instead of surfacing later as an invalid pipeline.
    pub fn load_wgsl_str(&mut self, name: &str, source: &str) -> RenderResult<()> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::Shader(format!("{name}: {err}")));
        }
        log::debug!("compiled shader module '{name}'");
        self.shader_modules.insert(name.to_string(), module);
        Ok(())
    }

    pub fn load_wgsl_file(&mut self, name: &str, path: &Path) -> RenderResult<()> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Shader(format!("{}: {e}", path.display())))?;
        self.load_wgsl_str(name, &src)
    }

    pub fn get(&self, name: &str) -> Option<&wgpu::ShaderModule> {
        self.shader_modules.get(name)
    }
}
