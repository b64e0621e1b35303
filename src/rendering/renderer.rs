//! Per-frame transform and material setup.
//!
//! [`Renderer::prepare`] does all the matrix work on the CPU and hands a
//! [`FramePlan`] to a [`DrawBackend`], which only has to clear, issue one
//! indexed draw per binding over the shared sphere mesh, and present.

use super::lighting::normal_matrix;
use super::{Camera, RenderResult};
use crate::physics::constants::{SPIN_AXIS, SPIN_RATE};
use crate::simulation::Scene;
use glam::{Mat3, Mat4, Vec3};

/// Every uniform the shading stage needs for one draw, set as a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialBinding {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub normal_matrix: Mat3,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub view_position: Vec3, // origin of the specular view direction
    pub object_color: Vec3,
}

/// Everything needed to draw one frame, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: [f32; 3],
    pub view: Mat4,
    pub projection: Mat4,
    pub bindings: Vec<MaterialBinding>,
}

/// Result of handing a frame to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The surface had to be reconfigured; nothing was drawn this frame.
    Skipped,
}

/// Graphics-API side of the renderer.
pub trait DrawBackend {
    /// Current framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    /// Clear color and depth, draw every binding in order, present.
    fn submit(&mut self, frame: &FramePlan) -> RenderResult<FrameOutcome>;
}

pub struct Renderer {
    pub spin_rate: f32,
    spin_axis: Vec3,
    pub clear_color: [f32; 3],
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(SPIN_RATE, Vec3::from(SPIN_AXIS), [0.2, 0.3, 0.3])
    }
}

impl Renderer {
    pub fn new(spin_rate: f32, spin_axis: Vec3, clear_color: [f32; 3]) -> Self {
        Self {
            spin_rate,
            spin_axis: spin_axis.try_normalize().unwrap_or(Vec3::Y),
            clear_color,
        }
    }

    #[inline]
    pub fn spin_axis(&self) -> Vec3 {
        self.spin_axis
    }

    /// `translate(position) * rotate(time * spin_rate, spin_axis)`. The spin is
    /// ornamental and driven by wall-clock time only.
    pub fn model_matrix(&self, position: Vec3, time: f32) -> Mat4 {
        Mat4::from_translation(position) * Mat4::from_axis_angle(self.spin_axis, time * self.spin_rate)
    }

    /// Build the frame for the current scene. View and projection are
    /// recomputed every call so a resize shows up on the next frame.
    pub fn prepare(&self, scene: &Scene, time: f32, width: u32, height: u32) -> FramePlan {
        let camera: &Camera = &scene.camera;
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(Camera::aspect_for(width, height));

        let bindings = scene
            .bodies
            .iter()
            .map(|body| {
                let model = self.model_matrix(body.position, time);
                MaterialBinding {
                    model,
                    view,
                    projection,
                    normal_matrix: normal_matrix(model),
                    light_position: scene.light.position,
                    light_color: scene.light.color,
                    view_position: camera.position(),
                    object_color: body.color,
                }
            })
            .collect();

        FramePlan {
            clear_color: self.clear_color,
            view,
            projection,
            bindings,
        }
    }
}
