//! One iteration per displayed frame:
//! sample `dt`, integrate every body, clear, draw every body, present, then
//! drain the queued input events. Rendering happens whether or not the
//! simulation is paused.

use super::{Action, InputEvent, Scene, TimeState};
use crate::physics::Integrator;
use crate::rendering::renderer::{DrawBackend, FrameOutcome, Renderer};
use crate::rendering::RenderResult;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Closed,
}

pub struct FrameLoop {
    pub scene: Scene,
    integrator: Integrator,
    renderer: Renderer,
    time: TimeState,
    events: VecDeque<InputEvent>,
    closed: bool,
}

impl FrameLoop {
    pub fn new(scene: Scene, integrator: Integrator, renderer: Renderer) -> Self {
        Self {
            scene,
            integrator,
            renderer,
            time: TimeState::default(),
            events: VecDeque::new(),
            closed: false,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.closed {
            LoopState::Closed
        } else if self.scene.playback {
            LoopState::Running
        } else {
            LoopState::Paused
        }
    }

    #[inline]
    pub fn should_close(&self) -> bool {
        self.closed
    }

    /// Queue an event; it takes effect after the next present.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Run one frame on the wall clock.
    pub fn run_frame<B: DrawBackend>(&mut self, backend: &mut B) -> RenderResult<FrameOutcome> {
        let (dt, elapsed) = self.time.update();
        if let Some(fps) = self.time.fps_sample() {
            log::info!("FPS: {:.1}", fps);
        }
        self.frame(dt, elapsed, backend)
    }

    /// Run one frame with an explicit step and spin time.
    pub fn frame<B: DrawBackend>(
        &mut self,
        dt: f32,
        elapsed: f32,
        backend: &mut B,
    ) -> RenderResult<FrameOutcome> {
        self.scene.integrate(&self.integrator, dt);

        let (width, height) = backend.framebuffer_size();
        let plan = self.renderer.prepare(&self.scene, elapsed, width, height);
        let outcome = backend.submit(&plan)?;

        self.process_events(backend);
        Ok(outcome)
    }

    fn process_events<B: DrawBackend>(&mut self, backend: &mut B) {
        while let Some(event) = self.events.pop_front() {
            match event {
                InputEvent::KeyDown(key) | InputEvent::KeyRepeat(key) => match Action::for_key(key) {
                    Action::Quit => self.closed = true,
                    action => self.scene.apply(action),
                },
                InputEvent::Resize { width, height } => {
                    log::debug!("resize to {width}x{height}");
                    backend.resize(width, height);
                }
                InputEvent::CloseRequest => self.closed = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::rendering::{Camera, FramePlan};
    use crate::simulation::Key;
    use glam::Vec3;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Submit { positions: Vec<Vec3>, aspect_projection: glam::Mat4 },
        Resize(u32, u32),
    }

    struct RecordingBackend {
        size: (u32, u32),
        calls: Vec<Call>,
        skip: bool,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self { size: (800, 600), calls: Vec::new(), skip: false }
        }

        fn submitted(&self) -> Vec<&Vec<Vec3>> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Submit { positions, .. } => Some(positions),
                    _ => None,
                })
                .collect()
        }
    }

    impl DrawBackend for RecordingBackend {
        fn framebuffer_size(&self) -> (u32, u32) {
            self.size
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.calls.push(Call::Resize(width, height));
            if width > 0 && height > 0 {
                self.size = (width, height);
            }
        }

        fn submit(&mut self, frame: &FramePlan) -> RenderResult<FrameOutcome> {
            if self.skip {
                return Ok(FrameOutcome::Skipped);
            }
            self.calls.push(Call::Submit {
                positions: frame.bindings.iter().map(|b| b.model.w_axis.truncate()).collect(),
                aspect_projection: frame.projection,
            });
            Ok(FrameOutcome::Presented)
        }
    }

    fn frame_loop() -> FrameLoop {
        let cfg = SimConfig::default();
        FrameLoop::new(Scene::from_config(&cfg), cfg.integrator(), cfg.renderer())
    }

    #[test]
    fn test_integrates_before_drawing() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.frame(0.5, 0.0, &mut backend).unwrap();
        let drawn = backend.submitted();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].len(), 3);
        // body 1 moved this very frame
        assert!((drawn[0][1].x - 3.75).abs() < 1e-6);
    }

    #[test]
    fn test_paused_still_renders() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.push_event(InputEvent::KeyDown(Key::Space));
        // the toggle lands after this frame's present
        fl.frame(0.5, 0.0, &mut backend).unwrap();
        assert_eq!(fl.state(), LoopState::Paused);
        fl.frame(0.5, 0.5, &mut backend).unwrap();
        fl.frame(0.5, 1.0, &mut backend).unwrap();
        let drawn = backend.submitted();
        assert_eq!(drawn.len(), 3);
        assert_eq!(drawn[0], drawn[1]);
        assert_eq!(drawn[1], drawn[2]);

        fl.push_event(InputEvent::KeyRepeat(Key::Space));
        fl.frame(0.5, 1.5, &mut backend).unwrap();
        assert_eq!(fl.state(), LoopState::Running);
    }

    #[test]
    fn test_skipped_frame_reported_and_input_still_drained() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        backend.skip = true;
        fl.push_event(InputEvent::KeyDown(Key::Space));
        assert_eq!(fl.frame(0.016, 0.0, &mut backend).unwrap(), FrameOutcome::Skipped);
        assert!(backend.submitted().is_empty());
        assert_eq!(fl.state(), LoopState::Paused);

        backend.skip = false;
        assert_eq!(fl.frame(0.016, 0.016, &mut backend).unwrap(), FrameOutcome::Presented);
    }

    #[test]
    fn test_close_request_ends_loop() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.frame(0.016, 0.0, &mut backend).unwrap();
        assert!(!fl.should_close());
        fl.push_event(InputEvent::CloseRequest);
        fl.frame(0.016, 0.016, &mut backend).unwrap();
        assert!(fl.should_close());
        assert_eq!(fl.state(), LoopState::Closed);
    }

    #[test]
    fn test_escape_quits() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.push_event(InputEvent::KeyDown(Key::Escape));
        fl.frame(0.016, 0.0, &mut backend).unwrap();
        assert!(fl.should_close());
    }

    #[test]
    fn test_resize_applies_to_next_frame() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.push_event(InputEvent::Resize { width: 1600, height: 600 });
        fl.frame(0.016, 0.0, &mut backend).unwrap();
        fl.frame(0.016, 0.0, &mut backend).unwrap();

        let cam = Camera::default();
        let projections: Vec<_> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Submit { aspect_projection, .. } => Some(*aspect_projection),
                _ => None,
            })
            .collect();
        assert_eq!(projections[0], cam.projection_matrix(800.0 / 600.0));
        assert_eq!(projections[1], cam.projection_matrix(1600.0 / 600.0));
        assert!(matches!(backend.calls[1], Call::Resize(1600, 600)));
    }

    #[test]
    fn test_key_repeat_applies_force_each_time() {
        let mut fl = frame_loop();
        let mut backend = RecordingBackend::new();
        fl.push_event(InputEvent::KeyDown(Key::Right));
        fl.push_event(InputEvent::KeyRepeat(Key::Right));
        fl.frame(0.0, 0.0, &mut backend).unwrap();
        assert_eq!(fl.scene.bodies[0].acceleration, Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn test_fixed_inputs_reproduce_trajectory() {
        let run = || {
            let mut fl = frame_loop();
            let mut backend = RecordingBackend::new();
            for (i, dt) in [0.016f32, 0.02, 0.033, 0.016, 0.05].iter().enumerate() {
                if i == 1 {
                    fl.push_event(InputEvent::KeyDown(Key::Up));
                }
                fl.frame(*dt, i as f32, &mut backend).unwrap();
            }
            fl.scene.bodies.iter().map(|b| (b.position, b.velocity)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
