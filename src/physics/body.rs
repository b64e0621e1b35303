use glam::Vec3;

/// Kinematic state captured at creation so a body can be reset later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// A simulated point-mass sphere with its visual material.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub mass: f32,
    pub radius: f32,
    pub restitution: f32, // fraction of axis velocity kept after a wall hit
    pub color: Vec3,      // normalized RGB, diffuse base color
    initial: BodyState,
}

impl Body {
    /// `mass` must be positive; [`Body::add_force`] divides by it.
    pub fn new(
        position: Vec3,
        velocity: Vec3,
        acceleration: Vec3,
        mass: f32,
        radius: f32,
        restitution: f32,
        color: Vec3,
    ) -> Self {
        debug_assert!(mass > 0.0, "body mass must be positive, got {mass}");
        Self {
            position,
            velocity,
            acceleration,
            mass,
            radius,
            restitution,
            color,
            initial: BodyState {
                position,
                velocity,
                acceleration,
            },
        }
    }

    /// Accumulate `force / mass` into the acceleration. The contribution
    /// persists until [`Body::clear_forces`] is called.
    pub fn add_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// Restore position and velocity to the values the body was created with.
    pub fn reset(&mut self) {
        self.position = self.initial.position;
        self.velocity = self.initial.velocity;
    }

    /// Drop every force added since creation.
    pub fn clear_forces(&mut self) {
        self.acceleration = self.initial.acceleration;
    }

    #[inline]
    pub fn initial_state(&self) -> BodyState {
        self.initial
    }
}
