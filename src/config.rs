//! Session configuration.
//!
//! [`SimConfig::default`] is the built-in scene. A JSON file passed with
//! `--config` can override any section; missing sections and fields keep
//! their defaults.

use crate::physics::constants::{
    DOMAIN_HALF_EXTENT, FORCE_MAGNITUDE, MESH_LAT_RES, MESH_LON_RES, MESH_RADIUS, SPIN_AXIS,
    SPIN_RATE,
};
use crate::physics::{Body, Integrator};
use crate::rendering::{Camera, PointLight, Renderer};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Physics Sim".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub lat_res: u32,
    pub lon_res: u32,
    pub radius: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            lat_res: MESH_LAT_RES,
            lon_res: MESH_LON_RES,
            radius: MESH_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub half_extent: f32,
    pub force_magnitude: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            half_extent: DOMAIN_HALF_EXTENT,
            force_magnitude: FORCE_MAGNITUDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 30.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0],
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 3],
    pub spin_rate: f32,
    pub spin_axis: [f32; 3],
    /// WGSL file to use instead of the built-in Phong shader
    pub shader: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3],
            spin_rate: SPIN_RATE,
            spin_axis: SPIN_AXIS,
            shader: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub acceleration: [f32; 3],
    #[serde(default = "unit")]
    pub mass: f32,
    #[serde(default = "unit")]
    pub radius: f32,
    pub restitution: f32,
    pub color: [f32; 3],
}

fn unit() -> f32 {
    1.0
}

impl BodyConfig {
    pub fn to_body(&self) -> Body {
        Body::new(
            Vec3::from(self.position),
            Vec3::from(self.velocity),
            Vec3::from(self.acceleration),
            self.mass,
            self.radius,
            self.restitution,
            Vec3::from(self.color),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub window: WindowConfig,
    pub mesh: MeshConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub render: RenderConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            mesh: MeshConfig::default(),
            physics: PhysicsConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            render: RenderConfig::default(),
            bodies: vec![
                // Red, at rest in the middle
                BodyConfig {
                    position: [0.0, 0.0, 0.0],
                    velocity: [0.0; 3],
                    acceleration: [0.0; 3],
                    mass: 1.0,
                    radius: 1.0,
                    restitution: 0.8,
                    color: [1.0, 0.0, 0.0],
                },
                // Blue, drifting and accelerating along +X
                BodyConfig {
                    position: [3.0, 2.0, 0.0],
                    velocity: [1.0, 0.0, 0.0],
                    acceleration: [1.0, 0.0, 0.0],
                    mass: 1.0,
                    radius: 1.0,
                    restitution: 0.9,
                    color: [0.0, 0.0, 1.0],
                },
                // Green
                BodyConfig {
                    position: [-3.0, -2.0, 0.0],
                    velocity: [0.0; 3],
                    acceleration: [0.0; 3],
                    mass: 1.0,
                    radius: 1.0,
                    restitution: 0.9,
                    color: [0.0, 1.0, 0.0],
                },
            ],
        }
    }
}

impl SimConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window size must be non-zero".into());
        }
        if self.mesh.lat_res == 0 || self.mesh.lon_res == 0 {
            return invalid(format!(
                "mesh resolution must be at least 1, got {}x{}",
                self.mesh.lat_res, self.mesh.lon_res
            ));
        }
        if !(self.mesh.radius.is_finite() && self.mesh.radius > 0.0) {
            return invalid(format!("mesh radius must be positive, got {}", self.mesh.radius));
        }
        let half = self.physics.half_extent;
        if !(half.is_finite() && half > 0.0) {
            return invalid(format!("half extent must be positive, got {half}"));
        }
        if self.bodies.is_empty() {
            return invalid("at least one body is required".into());
        }
        for (i, b) in self.bodies.iter().enumerate() {
            if !(b.mass > 0.0) {
                return invalid(format!("body {i}: mass must be positive, got {}", b.mass));
            }
            if !(b.radius > 0.0) {
                return invalid(format!("body {i}: radius must be positive, got {}", b.radius));
            }
            if b.radius >= half {
                return invalid(format!(
                    "body {i}: radius {} does not fit inside half extent {half}",
                    b.radius
                ));
            }
            if !(0.0..=1.0).contains(&b.restitution) {
                return invalid(format!(
                    "body {i}: restitution must be in [0, 1], got {}",
                    b.restitution
                ));
            }
        }
        let eye = Vec3::from(self.camera.eye);
        let target = Vec3::from(self.camera.target);
        if (target - eye).length_squared() == 0.0 {
            return invalid("camera eye and target coincide".into());
        }
        if (target - eye).cross(Vec3::from(self.camera.up)).length_squared() == 0.0 {
            return invalid("camera up vector is zero or parallel to the view direction".into());
        }
        let fov = self.camera.fov_y_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return invalid(format!("camera fov must be in (0, 180) degrees, got {fov}"));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got {} and {}",
                self.camera.near, self.camera.far
            ));
        }
        if Vec3::from(self.render.spin_axis).length_squared() == 0.0 {
            return invalid("spin axis must be non-zero".into());
        }
        Ok(())
    }

    pub fn bodies(&self) -> Vec<Body> {
        self.bodies.iter().map(BodyConfig::to_body).collect()
    }

    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        Camera {
            fov_y: c.fov_y_degrees.to_radians(),
            near: c.near,
            far: c.far,
            ..Camera::new(Vec3::from(c.eye), Vec3::from(c.target), Vec3::from(c.up))
        }
    }

    pub fn light(&self) -> PointLight {
        PointLight {
            position: Vec3::from(self.light.position),
            color: Vec3::from(self.light.color),
        }
    }

    pub fn integrator(&self) -> Integrator {
        Integrator::new(self.physics.half_extent)
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(
            self.render.spin_rate,
            Vec3::from(self.render.spin_axis),
            self.render.clear_color,
        )
    }
}
