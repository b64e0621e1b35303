use crate::config::SimConfig;
use crate::physics::{Body, Integrator};
use crate::rendering::{Camera, PointLight};
use crate::simulation::Action;

/// All simulation state for a session. Camera and light are fixed; only the
/// bodies, the playback flag and the selection change at runtime.
pub struct Scene {
    pub bodies: Vec<Body>,
    pub camera: Camera,
    pub light: PointLight,
    pub playback: bool,
    pub selected: usize,
    pub force_magnitude: f32,
}

impl Scene {
    pub fn new(bodies: Vec<Body>, camera: Camera, light: PointLight, force_magnitude: f32) -> Self {
        Self {
            bodies,
            camera,
            light,
            playback: true,
            selected: 0,
            force_magnitude,
        }
    }

    pub fn from_config(cfg: &SimConfig) -> Self {
        Self::new(
            cfg.bodies(),
            cfg.camera(),
            cfg.light(),
            cfg.physics.force_magnitude,
        )
    }

    /// Step every body in declaration order. Each body sees the others as
    /// peers, earlier ones already advanced this frame. Peers are only
    /// gathered when the integrator has coupling terms to feed.
    pub fn integrate(&mut self, integrator: &Integrator, dt: f32) {
        if !self.playback {
            return;
        }
        if integrator.coupling_terms() == 0 {
            for body in &mut self.bodies {
                integrator.step(body, &[], dt, self.playback);
            }
            return;
        }
        for i in 0..self.bodies.len() {
            let (before, rest) = self.bodies.split_at_mut(i);
            let Some((body, after)) = rest.split_first_mut() else {
                continue;
            };
            let peers: Vec<&Body> = before.iter().chain(after.iter()).collect();
            integrator.step(body, &peers, dt, self.playback);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::TogglePlayback => {
                self.playback = !self.playback;
                log::debug!("playback {}", if self.playback { "resumed" } else { "paused" });
            }
            Action::ApplyForce { axis, positive } => {
                let sign = if positive { 1.0 } else { -1.0 };
                let force = axis.unit() * sign * self.force_magnitude;
                if let Some(body) = self.bodies.get_mut(self.selected) {
                    body.add_force(force);
                    log::debug!("body {} force {:?} -> accel {:?}", self.selected, force, body.acceleration);
                }
            }
            Action::ResetBody => {
                if let Some(body) = self.bodies.get_mut(self.selected) {
                    body.reset();
                    log::debug!("body {} reset", self.selected);
                }
            }
            Action::ClearForces => {
                if let Some(body) = self.bodies.get_mut(self.selected) {
                    body.clear_forces();
                    log::debug!("body {} forces cleared", self.selected);
                }
            }
            Action::SelectNext => {
                if !self.bodies.is_empty() {
                    self.selected = (self.selected + 1) % self.bodies.len();
                    log::debug!("selected body {}", self.selected);
                }
            }
            // Loop termination belongs to the frame loop
            Action::Quit => {}
        }
    }

    pub fn title(&self, base: &str) -> String {
        if self.playback {
            base.to_string()
        } else {
            format!("{base} (paused)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PeerCoupling;
    use crate::simulation::Axis;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records the peer positions each step sees and adds no acceleration.
    struct PeerLog(Rc<RefCell<Vec<Vec<Vec3>>>>);

    impl PeerCoupling for PeerLog {
        fn acceleration(&self, _body: &Body, peers: &[&Body]) -> Vec3 {
            self.0.borrow_mut().push(peers.iter().map(|p| p.position).collect());
            Vec3::ZERO
        }
    }

    fn scene() -> Scene {
        Scene::from_config(&SimConfig::default())
    }

    #[test]
    fn test_default_scene_literals() {
        let s = scene();
        assert_eq!(s.bodies.len(), 3);
        assert_eq!(s.bodies[0].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(s.bodies[1].position, Vec3::new(3.0, 2.0, 0.0));
        assert_eq!(s.bodies[1].velocity, Vec3::X);
        assert_eq!(s.bodies[1].acceleration, Vec3::X);
        assert_eq!(s.bodies[2].restitution, 0.9);
        assert!(s.playback);
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn test_integrate_respects_playback() {
        let integ = Integrator::default();
        let mut s = scene();
        s.apply(Action::TogglePlayback);
        let before: Vec<Body> = s.bodies.clone();
        s.integrate(&integ, 0.5);
        assert_eq!(s.bodies, before);

        s.apply(Action::TogglePlayback);
        s.integrate(&integ, 0.5);
        // body 1 has v = (1,0,0), a = (1,0,0): v -> 1.5, x -> 3.75
        assert!((s.bodies[1].velocity.x - 1.5).abs() < 1e-6);
        assert!((s.bodies[1].position.x - 3.75).abs() < 1e-6);
        // body 0 is at rest with no forces
        assert_eq!(s.bodies[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_coupled_steps_see_updated_peers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let coupled = Integrator::default().with(PeerLog(log.clone()));
        let mut a = scene();
        let mut b = scene();
        a.integrate(&coupled, 0.5);
        b.integrate(&Integrator::default(), 0.5);
        // a zero coupling term must not change the trajectory
        assert_eq!(a.bodies, b.bodies);

        let seen = log.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|peers| peers.len() == 2));
        // body 2 sees body 1 after its step this frame
        assert!((seen[2][1].x - 3.75).abs() < 1e-6);
        // body 0 sees body 1 before its step
        assert_eq!(seen[0][0], Vec3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_force_targets_selected_body() {
        let mut s = scene();
        s.apply(Action::SelectNext);
        s.apply(Action::SelectNext);
        assert_eq!(s.selected, 2);
        s.apply(Action::ApplyForce { axis: Axis::Y, positive: false });
        assert_eq!(s.bodies[2].acceleration, Vec3::new(0.0, -50.0, 0.0));
        assert_eq!(s.bodies[0].acceleration, Vec3::ZERO);
        s.apply(Action::SelectNext);
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn test_reset_and_clear() {
        let integ = Integrator::default();
        let mut s = scene();
        s.apply(Action::ApplyForce { axis: Axis::X, positive: true });
        s.integrate(&integ, 0.1);
        assert!(s.bodies[0].position.x > 0.0);

        s.apply(Action::ResetBody);
        assert_eq!(s.bodies[0].position, Vec3::ZERO);
        assert_eq!(s.bodies[0].velocity, Vec3::ZERO);
        assert_eq!(s.bodies[0].acceleration.x, 50.0);

        s.apply(Action::ClearForces);
        assert_eq!(s.bodies[0].acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_title_tracks_playback() {
        let mut s = scene();
        assert_eq!(s.title("Physics Sim"), "Physics Sim");
        s.apply(Action::TogglePlayback);
        assert_eq!(s.title("Physics Sim"), "Physics Sim (paused)");
    }
}
