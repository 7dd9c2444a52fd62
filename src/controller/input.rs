//! Platform-agnostic input handling

use std::collections::HashSet;

use winit::keyboard::KeyCode;

/// Things the demo's keys can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    PauseOrbits,
    ResumeOrbits,
    Quit,
}

/// Platform-independent input events, queued by the window layer and
/// consumed once per frame in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(Action),
    KeyUp(Action),
    /// Absolute cursor position in screen units
    CursorMoved { x: f64, y: f64 },
    /// Vertical scroll in lines; positive is away from the user
    Scroll { delta_y: f32 },
    FocusLost,
}

/// Held keys plus the events queued since the last frame
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed: HashSet<Action>,
    queue: Vec<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Take every event queued since the previous call
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.queue)
    }

    /// Update held-key state from an event
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(action) => {
                self.pressed.insert(*action);
            }
            InputEvent::KeyUp(action) => {
                self.pressed.remove(action);
            }
            InputEvent::FocusLost => self.clear_keys(),
            InputEvent::CursorMoved { .. } | InputEvent::Scroll { .. } => {}
        }
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    pub fn clear_keys(&mut self) {
        self.pressed.clear();
    }
}

/// Key mapping configuration
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub pause: KeyCode,
    pub resume: KeyCode,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            pause: KeyCode::KeyP,
            resume: KeyCode::KeyC,
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        [
            (self.forward, Action::Forward),
            (self.backward, Action::Backward),
            (self.left, Action::Left),
            (self.right, Action::Right),
            (self.pause, Action::PauseOrbits),
            (self.resume, Action::ResumeOrbits),
            (self.quit, Action::Quit),
        ]
        .into_iter()
        .find_map(|(bound, action)| (bound == code).then_some(action))
    }
}

/// Turns raw mouse motion into absolute positions.
///
/// With the cursor grabbed the OS stops reporting positions, so motion
/// deltas are summed from a starting point instead.
#[derive(Debug, Clone, Copy)]
pub struct VirtualCursor {
    pub x: f64,
    pub y: f64,
}

impl VirtualCursor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn apply_motion(&mut self, dx: f64, dy: f64) -> InputEvent {
        self.x += dx;
        self.y += dy;
        InputEvent::CursorMoved { x: self.x, y: self.y }
    }
}

pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent, MouseScrollDelta};
    use winit::keyboard::PhysicalKey;

    /// Pixels per scroll line for touchpads reporting pixel deltas
    const PIXELS_PER_LINE: f64 = 40.0;

    pub fn keyboard_event_to_input(event: &KeyEvent, bindings: &KeyBindings) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let action = bindings.action_for(code)?;
        Some(match event.state {
            ElementState::Pressed => InputEvent::KeyDown(action),
            ElementState::Released => InputEvent::KeyUp(action),
        })
    }

    pub fn mouse_wheel_to_input(delta: &MouseScrollDelta) -> InputEvent {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
        InputEvent::Scroll { delta_y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::MouseScrollDelta;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for(KeyCode::KeyW), Some(Action::Forward));
        assert_eq!(bindings.action_for(KeyCode::KeyS), Some(Action::Backward));
        assert_eq!(bindings.action_for(KeyCode::KeyA), Some(Action::Left));
        assert_eq!(bindings.action_for(KeyCode::KeyD), Some(Action::Right));
        assert_eq!(bindings.action_for(KeyCode::KeyP), Some(Action::PauseOrbits));
        assert_eq!(bindings.action_for(KeyCode::KeyC), Some(Action::ResumeOrbits));
        assert_eq!(bindings.action_for(KeyCode::Escape), Some(Action::Quit));
        assert_eq!(bindings.action_for(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_key_state_tracking() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(Action::Forward));
        input.process_event(&InputEvent::KeyDown(Action::Left));
        assert!(input.is_pressed(Action::Forward));
        assert!(input.is_pressed(Action::Left));

        input.process_event(&InputEvent::KeyUp(Action::Forward));
        assert!(!input.is_pressed(Action::Forward));

        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed.is_empty());
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut input = InputState::new();
        input.push(InputEvent::Scroll { delta_y: 1.0 });
        input.push(InputEvent::CursorMoved { x: 3.0, y: 4.0 });
        let events = input.drain();
        assert_eq!(
            events,
            vec![InputEvent::Scroll { delta_y: 1.0 }, InputEvent::CursorMoved { x: 3.0, y: 4.0 }]
        );
        assert!(input.drain().is_empty());
    }

    #[test]
    fn test_virtual_cursor_accumulates() {
        let mut cursor = VirtualCursor::new(700.0, 400.0);
        cursor.apply_motion(10.0, -5.0);
        let event = cursor.apply_motion(2.5, 1.0);
        assert_eq!(event, InputEvent::CursorMoved { x: 712.5, y: 396.0 });
    }

    #[test]
    fn test_scroll_deltas() {
        let line = native::mouse_wheel_to_input(&MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(line, InputEvent::Scroll { delta_y: -2.0 });

        let pixels = native::mouse_wheel_to_input(&MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 80.0),
        ));
        assert_eq!(pixels, InputEvent::Scroll { delta_y: 2.0 });
    }
}
