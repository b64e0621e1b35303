//! Physics module for the sphere simulation
//!
//! Point-mass bodies advanced with semi-implicit Euler and reflected off the
//! faces of a cubic domain. No rotational dynamics and no sphere-sphere
//! collisions.

pub mod body;
pub mod constants;
pub mod integrator;

// Re-export commonly used items
pub use body::{Body, BodyState};
pub use constants::*;
pub use integrator::{Integrator, PeerCoupling};
