//! Default constants for the simulation.
//!
//! Values here are the literal session defaults; every one of them can be
//! overridden through the scene configuration.

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------
pub const DOMAIN_HALF_EXTENT: f32 = 7.0; // Cube [-B, B]^3 centered at the origin

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------
pub const FORCE_MAGNITUDE: f32 = 50.0; // Force applied per key press / repeat

// ---------------------------------------------------------------------------
// Ornamental spin (visual only, not angular velocity)
// ---------------------------------------------------------------------------
pub const SPIN_RATE: f32 = 0.5; // rad/s of wall-clock time
pub const SPIN_AXIS: [f32; 3] = [0.5, 1.0, 0.0];

// ---------------------------------------------------------------------------
// Sphere mesh
// ---------------------------------------------------------------------------
pub const MESH_LAT_RES: u32 = 30;
pub const MESH_LON_RES: u32 = 30;
pub const MESH_RADIUS: f32 = 1.0;
