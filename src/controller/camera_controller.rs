use crate::controller::input::{Action, InputState};
use crate::model::{Camera, CameraMovement};

/// Bridges cursor, scroll and movement keys onto the camera
pub struct CameraController {
    first_mouse: bool,
    last_x: f64,
    last_y: f64,
}

impl CameraController {
    /// `start_x`/`start_y` is the assumed cursor position before any input,
    /// normally the window centre
    pub fn new(start_x: f64, start_y: f64) -> Self {
        Self {
            first_mouse: true,
            last_x: start_x,
            last_y: start_y,
        }
    }

    /// Apply an absolute cursor position. The first sample only sets the
    /// baseline and turns the camera by zero.
    pub fn apply_cursor(&mut self, camera: &mut Camera, x: f64, y: f64) {
        if self.first_mouse {
            self.last_x = x;
            self.last_y = y;
            self.first_mouse = false;
        }

        let x_offset = (x - self.last_x) as f32;
        // Reversed: screen y grows downward
        let y_offset = (self.last_y - y) as f32;
        self.last_x = x;
        self.last_y = y;

        camera.process_mouse_movement(x_offset, y_offset);
    }

    pub fn apply_scroll(&self, camera: &mut Camera, delta_y: f32) {
        camera.process_mouse_scroll(delta_y);
    }

    /// Move the camera for each held movement key
    pub fn update_movement(&self, camera: &mut Camera, input: &InputState, dt: f32) {
        let moves = [
            (Action::Forward, CameraMovement::Forward),
            (Action::Backward, CameraMovement::Backward),
            (Action::Left, CameraMovement::Left),
            (Action::Right, CameraMovement::Right),
        ];
        for (action, movement) in moves {
            if input.is_pressed(action) {
                camera.process_keyboard(movement, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use crate::model::camera::{DEFAULT_PITCH, DEFAULT_YAW};
    use glam::Vec3;

    fn camera() -> Camera {
        Camera::new(Vec3::ZERO, 1400, 800)
    }

    #[test]
    fn test_first_cursor_sample_is_baseline() {
        for (x, y) in [(0.0, 0.0), (700.0, 400.0), (1.0e6, -3.0e5)] {
            let mut cam = camera();
            let mut controller = CameraController::new(700.0, 400.0);
            controller.apply_cursor(&mut cam, x, y);
            assert_eq!(cam.yaw, DEFAULT_YAW);
            assert_eq!(cam.pitch, DEFAULT_PITCH);
        }
    }

    #[test]
    fn test_later_samples_turn_camera() {
        let mut cam = camera();
        let mut controller = CameraController::new(700.0, 400.0);
        controller.apply_cursor(&mut cam, 100.0, 100.0);
        controller.apply_cursor(&mut cam, 110.0, 90.0);

        // 10 units right and 10 units up at sensitivity 0.1
        assert!((cam.yaw - (DEFAULT_YAW + 1.0)).abs() < 1e-5);
        assert!((cam.pitch - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_scroll_both_bounds() {
        let mut cam = camera();
        let controller = CameraController::new(0.0, 0.0);
        controller.apply_scroll(&mut cam, 3.0);
        assert!((cam.zoom - 42.0).abs() < 1e-5);
        controller.apply_scroll(&mut cam, 500.0);
        assert_eq!(cam.zoom, 1.0);
        controller.apply_scroll(&mut cam, -500.0);
        assert_eq!(cam.zoom, 45.0);
    }

    #[test]
    fn test_movement_uses_held_keys() {
        let mut cam = camera();
        let controller = CameraController::new(0.0, 0.0);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(Action::Forward));

        controller.update_movement(&mut cam, &input, 0.5);
        assert!((cam.eye - Vec3::new(0.0, 0.0, -1.25)).length() < 1e-5);

        // Opposite keys cancel
        input.process_event(&InputEvent::KeyDown(Action::Backward));
        controller.update_movement(&mut cam, &input, 0.5);
        assert!((cam.eye - Vec3::new(0.0, 0.0, -1.25)).length() < 1e-5);
    }
}
