use std::collections::HashSet;
use std::time::Instant;

use glam::{Mat4, Vec3};
use tracing::info;

use crate::config::AppConfig;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{Action, InputEvent, InputState};
use crate::model::{Camera, CelestialBody, FrameClock, Scene};

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub frame: u32,
    pub delta: f32,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
    pub light_position: Vec3,
    /// One model matrix per body, in body-table order
    pub model_matrices: Vec<Mat4>,
    pub movement: bool,
    pub exit_requested: bool,
}

/// Main loop state and per-frame update logic
pub struct FrameLoopContext {
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub input: InputState,
    pub clock: FrameClock,
    pub scene: Scene,
    /// Orbits advance while set; P clears it, C sets it
    pub movement: bool,
}

impl FrameLoopContext {
    pub fn new(config: &AppConfig, bodies: Vec<CelestialBody>, start: Instant) -> Self {
        let (width, height) = (config.window.width, config.window.height);
        let mut camera = Camera::new(Vec3::ZERO, width, height);
        camera.z_near = config.projection.z_near;
        camera.z_far = config.projection.z_far;

        Self {
            camera,
            camera_controller: CameraController::new(width as f64 / 2.0, height as f64 / 2.0),
            input: InputState::new(),
            clock: FrameClock::new(start),
            scene: Scene::new(bodies, config.orbit),
            movement: true,
        }
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Run one frame: input, then camera, then orbits.
    pub fn update(&mut self, now: Instant) -> FrameOutput {
        self.clock.tick(now);
        let dt = self.clock.delta;

        // Queued mouse and key events, in arrival order
        let mut tapped = HashSet::new();
        for event in self.input.drain() {
            match &event {
                InputEvent::CursorMoved { x, y } => {
                    self.camera_controller.apply_cursor(&mut self.camera, *x, *y);
                }
                InputEvent::Scroll { delta_y } => {
                    self.camera_controller.apply_scroll(&mut self.camera, *delta_y);
                }
                InputEvent::KeyDown(action) => {
                    tapped.insert(*action);
                }
                InputEvent::KeyUp(_) | InputEvent::FocusLost => {}
            }
            self.input.process_event(&event);
        }
        // A key pressed and released within one frame still counts
        let active = |action: Action| self.input.is_pressed(action) || tapped.contains(&action);

        let exit_requested = active(Action::Quit);
        let mut movement = self.movement;
        if active(Action::PauseOrbits) {
            movement = false;
        }
        if active(Action::ResumeOrbits) {
            movement = true;
        }
        if movement != self.movement {
            info!(frame = self.clock.frame, "orbits {}", if movement { "resumed" } else { "paused" });
            self.movement = movement;
        }

        self.camera_controller.update_movement(&mut self.camera, &self.input, dt);

        self.scene.update(self.clock.frame, self.movement);

        FrameOutput {
            frame: self.clock.frame,
            delta: dt,
            view: self.camera.view(),
            projection: self.camera.projection(),
            view_position: self.camera.eye,
            light_position: self.scene.config().light_position,
            model_matrices: self.scene.transforms(),
            movement: self.movement,
            exit_requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::body::{solar_system, EARTH, MOON};
    use crate::model::camera::DEFAULT_YAW;
    use std::time::Duration;

    fn context(start: Instant) -> FrameLoopContext {
        FrameLoopContext::new(&AppConfig::default(), solar_system(), start)
    }

    fn at(start: Instant, frame: u64) -> Instant {
        start + Duration::from_millis(16 * frame)
    }

    #[test]
    fn test_first_frame_is_one() {
        let start = Instant::now();
        let mut ctx = context(start);
        let out = ctx.update(at(start, 1));
        assert_eq!(out.frame, 1);
        assert!(out.movement);
        assert!(!out.exit_requested);
        assert_eq!(out.model_matrices.len(), 3);
        assert!((ctx.scene.pose(EARTH).orbit_angle - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_pause_and_resume_keys() {
        let start = Instant::now();
        let mut ctx = context(start);
        ctx.update(at(start, 1));
        let before = ctx.scene.pose(EARTH);

        ctx.push_event(InputEvent::KeyDown(Action::PauseOrbits));
        let out = ctx.update(at(start, 2));
        assert!(!out.movement);
        assert_eq!(ctx.scene.pose(EARTH), before);

        // Releasing P keeps the paused state; the counter keeps running
        ctx.push_event(InputEvent::KeyUp(Action::PauseOrbits));
        for n in 3..10 {
            let out = ctx.update(at(start, n));
            assert!(!out.movement);
            assert_eq!(out.frame, n as u32);
            assert_eq!(ctx.scene.pose(EARTH), before);
            assert_eq!(out.model_matrices[MOON], ctx.scene.model_matrix(MOON));
        }

        ctx.push_event(InputEvent::KeyDown(Action::ResumeOrbits));
        ctx.push_event(InputEvent::KeyUp(Action::ResumeOrbits));
        let out = ctx.update(at(start, 10));
        assert!(out.movement);
        let angle = ctx.scene.pose(EARTH).orbit_angle;
        assert!((angle - 0.006 * 10.0 * 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_escape_requests_exit() {
        let start = Instant::now();
        let mut ctx = context(start);
        ctx.push_event(InputEvent::KeyDown(Action::Quit));
        ctx.push_event(InputEvent::KeyUp(Action::Quit));
        assert!(ctx.update(at(start, 1)).exit_requested);
        assert!(!ctx.update(at(start, 2)).exit_requested);
    }

    #[test]
    fn test_mouse_applied_before_view_is_built() {
        let start = Instant::now();
        let mut ctx = context(start);
        ctx.push_event(InputEvent::CursorMoved { x: 5.0, y: 5.0 });
        ctx.push_event(InputEvent::CursorMoved { x: 25.0, y: 5.0 });
        ctx.push_event(InputEvent::Scroll { delta_y: 5.0 });
        let out = ctx.update(at(start, 1));

        assert!((ctx.camera.yaw - (DEFAULT_YAW + 2.0)).abs() < 1e-5);
        assert!((ctx.camera.zoom - 40.0).abs() < 1e-5);
        assert_eq!(out.view, ctx.camera.view());
        assert_eq!(out.projection, ctx.camera.projection());
    }

    #[test]
    fn test_held_key_moves_by_elapsed_time() {
        let start = Instant::now();
        let mut ctx = context(start);
        ctx.push_event(InputEvent::KeyDown(Action::Forward));
        ctx.update(start + Duration::from_millis(500));
        ctx.update(start + Duration::from_millis(1000));
        // 2.5 units/s for one second, looking down -Z
        assert!((ctx.camera.eye - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-4);
    }

    #[test]
    fn test_resize_updates_projection_aspect() {
        let start = Instant::now();
        let mut ctx = context(start);
        ctx.resize(800, 800);
        assert!((ctx.camera.aspect - 1.0).abs() < 1e-6);
        let out = ctx.update(at(start, 1));
        let expected = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
        assert!(out.projection.abs_diff_eq(expected, 1e-6));
    }
}
