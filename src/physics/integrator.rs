//! Per-frame kinematic integration for the sphere bodies.
//!
//! Semi-implicit Euler (velocity first, then position) followed by an
//! axis-aligned boundary response against a cube of half extent `B`.
//! Optional peer coupling terms can add acceleration for a single step;
//! none are registered by default.

use super::body::Body;
use super::constants::DOMAIN_HALF_EXTENT;
use glam::Vec3;

/// Extra acceleration derived from sibling bodies.
///
/// Implementations return a contribution that is added to the body's own
/// acceleration for the current step only. It never alters the stored
/// acceleration or the wall response.
pub trait PeerCoupling {
    fn acceleration(&self, body: &Body, peers: &[&Body]) -> Vec3;
}

pub struct Integrator {
    pub half_extent: f32,
    coupling: Vec<Box<dyn PeerCoupling>>,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(DOMAIN_HALF_EXTENT)
    }
}

impl Integrator {
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent,
            coupling: Vec::new(),
        }
    }

    /// Register a coupling term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: PeerCoupling + 'static,
    {
        self.coupling.push(Box::new(term));
        self
    }

    pub fn coupling_terms(&self) -> usize {
        self.coupling.len()
    }

    /// Advance `body` by `dt` seconds. Does nothing at all while `playback`
    /// is false, regardless of `dt` or accumulated forces.
    pub fn step(&self, body: &mut Body, peers: &[&Body], dt: f32, playback: bool) {
        if !playback {
            return;
        }

        let coupled: Vec3 = self
            .coupling
            .iter()
            .map(|term| term.acceleration(body, peers))
            .sum();

        // v_n+1 = v_n + a * dt, then x_n+1 = x_n + v_n+1 * dt
        body.velocity += (body.acceleration + coupled) * dt;
        body.position += body.velocity * dt;

        self.resolve_walls(body);
    }

    /// Clamp the body inside the domain and reflect every axis that crossed a
    /// face. Axes are independent, so a corner hit reflects on all of them.
    pub fn resolve_walls(&self, body: &mut Body) {
        let b = self.half_extent;
        let r = body.radius;
        for axis in 0..3 {
            if body.position[axis] + r > b {
                body.position[axis] = b - r;
                body.velocity[axis] = -body.velocity[axis] * body.restitution;
            }
            if body.position[axis] - r < -b {
                body.position[axis] = -b + r;
                body.velocity[axis] = -body.velocity[axis] * body.restitution;
            }
        }
    }
}
