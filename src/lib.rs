pub mod config;
pub mod physics;
pub mod rendering;
pub mod simulation;

pub use config::{ConfigError, SimConfig};
pub use physics::{Body, Integrator, PeerCoupling};
pub use rendering::{
    generate_sphere, Camera, FrameOutcome, GpuBackend, Mesh, MeshError, PhongModel, PointLight, Renderer,
};
pub use simulation::{FrameLoop, InputEvent, LoopState, Scene};
