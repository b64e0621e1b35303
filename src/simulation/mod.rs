//! Simulation module for scene management and the frame loop
//!
//! This module owns the runtime state (bodies, camera, light, playback flag),
//! maps window input onto a small fixed set of events and actions, and drives
//! one integrate-then-render iteration per frame.

pub mod frame_loop;
pub mod scene;

// Re-export commonly used items
pub use frame_loop::{FrameLoop, LoopState};
pub use scene::Scene;

use glam::Vec3;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keys the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Escape,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Tab,
    R,
    C,
}

impl Key {
    pub fn from_keycode(code: KeyCode) -> Option<Key> {
        let key = match code {
            KeyCode::Space => Key::Space,
            KeyCode::Escape => Key::Escape,
            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::ArrowUp => Key::Up,
            KeyCode::ArrowDown => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Tab => Key::Tab,
            KeyCode::KeyR => Key::R,
            KeyCode::KeyC => Key::C,
            _ => return None,
        };
        Some(key)
    }
}

/// Everything the frame loop consumes from the window, queued per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyRepeat(Key),
    Resize { width: u32, height: u32 },
    CloseRequest,
}

impl InputEvent {
    /// Translate a winit window event. Releases and unbound keys yield `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequest),
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return None;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let key = Key::from_keycode(code)?;
                Some(if event.repeat {
                    InputEvent::KeyRepeat(key)
                } else {
                    InputEvent::KeyDown(key)
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// What a key press does to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePlayback,
    /// Fixed-magnitude push on the selected body
    ApplyForce { axis: Axis, positive: bool },
    ResetBody,
    ClearForces,
    SelectNext,
    Quit,
}

impl Action {
    /// Key bindings. Key-down and key-repeat map the same way.
    pub fn for_key(key: Key) -> Action {
        match key {
            Key::Space => Action::TogglePlayback,
            Key::Escape => Action::Quit,
            Key::Left => Action::ApplyForce { axis: Axis::X, positive: false },
            Key::Right => Action::ApplyForce { axis: Axis::X, positive: true },
            Key::Up => Action::ApplyForce { axis: Axis::Y, positive: true },
            Key::Down => Action::ApplyForce { axis: Axis::Y, positive: false },
            Key::PageUp => Action::ApplyForce { axis: Axis::Z, positive: true },
            Key::PageDown => Action::ApplyForce { axis: Axis::Z, positive: false },
            Key::Tab => Action::SelectNext,
            Key::R => Action::ResetBody,
            Key::C => Action::ClearForces,
        }
    }
}

/// Time management for the frame loop
#[derive(Debug, Clone)]
pub struct TimeState {
    pub start: std::time::Instant,
    pub last_frame_time: std::time::Instant,
    pub frame_count: u64,
    pub last_fps_instant: std::time::Instant,
}

impl Default for TimeState {
    fn default() -> Self {
        let now = std::time::Instant::now();
        Self {
            start: now,
            last_frame_time: now,
            frame_count: 0,
            last_fps_instant: now,
        }
    }
}

impl TimeState {
    /// Returns `(dt, elapsed)`: seconds since the previous call and since start.
    pub fn update(&mut self) -> (f32, f32) {
        let now = std::time::Instant::now();
        let dt = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.frame_count += 1;
        (dt, now.duration_since(self.start).as_secs_f32())
    }

    pub fn fps_sample(&mut self) -> Option<f32> {
        let now = std::time::Instant::now();
        let elapsed = now.duration_since(self.last_fps_instant).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.last_fps_instant = now;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn test_window_events_translate() {
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::CloseRequested),
            Some(InputEvent::CloseRequest)
        );
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::Resized(PhysicalSize::new(1024, 768))),
            Some(InputEvent::Resize { width: 1024, height: 768 })
        );
        assert_eq!(InputEvent::from_window_event(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn test_keycodes() {
        assert_eq!(Key::from_keycode(KeyCode::Space), Some(Key::Space));
        assert_eq!(Key::from_keycode(KeyCode::KeyR), Some(Key::R));
        assert_eq!(Key::from_keycode(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::for_key(Key::Space), Action::TogglePlayback);
        assert_eq!(Action::for_key(Key::Escape), Action::Quit);
        assert_eq!(
            Action::for_key(Key::Left),
            Action::ApplyForce { axis: Axis::X, positive: false }
        );
        assert_eq!(
            Action::for_key(Key::PageUp),
            Action::ApplyForce { axis: Axis::Z, positive: true }
        );
    }

    #[test]
    fn test_time_state_is_monotonic() {
        let mut time = TimeState::default();
        let (dt0, t0) = time.update();
        let (dt1, t1) = time.update();
        assert!(dt0 >= 0.0 && dt1 >= 0.0);
        assert!(t1 >= t0);
        assert_eq!(time.frame_count, 2);
    }
}
