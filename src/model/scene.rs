use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use crate::config::OrbitConfig;
use crate::model::body::{BodyId, CelestialBody, Shading};

/// Where a body is this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    /// Scaled orbit radius used for this pose
    pub radius: f32,
    /// Orbital angle in degrees
    pub orbit_angle: f32,
    /// Self-rotation around Z in radians
    pub spin: f32,
}

impl BodyPose {
    const ORIGIN: BodyPose = BodyPose {
        position: Vec3::ZERO,
        radius: 0.0,
        orbit_angle: 0.0,
        spin: 0.0,
    };
}

/// Per-frame orbital animation of the scene's bodies.
///
/// Poses are recomputed from the frame counter every frame, never
/// integrated from the previous frame. While `movement` is off the last
/// computed poses are held as they are.
pub struct Scene {
    bodies: Vec<CelestialBody>,
    config: OrbitConfig,
    poses: Vec<BodyPose>,
}

impl Scene {
    pub fn new(bodies: Vec<CelestialBody>, config: OrbitConfig) -> Self {
        let poses = vec![BodyPose::ORIGIN; bodies.len()];
        let mut scene = Self { bodies, config, poses };
        scene.update(0, true);
        scene
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn poses(&self) -> &[BodyPose] {
        &self.poses
    }

    pub fn pose(&self, id: BodyId) -> BodyPose {
        self.poses[id]
    }

    /// Advance every body to frame `frame`. Bodies are visited in table
    /// order, so a parent's pose for this frame is ready before its children.
    pub fn update(&mut self, frame: u32, movement: bool) {
        for id in 0..self.bodies.len() {
            let body = &self.bodies[id];
            match body.shading {
                Shading::Emissive => {
                    self.poses[id] = BodyPose {
                        position: self.config.light_position,
                        ..BodyPose::ORIGIN
                    };
                }
                Shading::Lit if movement => {
                    let center = body
                        .parent
                        .map(|parent| self.poses[parent].position)
                        .unwrap_or(Vec3::ZERO);
                    self.poses[id] = orbit_pose(body, center, frame, &self.config);
                }
                // Paused: hold the last computed pose
                Shading::Lit => {}
            }
        }
    }

    /// Model matrix for a body: translate, then scale, then spin around Z.
    pub fn model_matrix(&self, id: BodyId) -> Mat4 {
        let body = &self.bodies[id];
        let pose = &self.poses[id];
        let scale = body.base_scale * self.config.scale;
        let mut model = Mat4::from_translation(pose.position) * Mat4::from_scale(Vec3::splat(scale));
        if body.spin_rate != 0.0 {
            model *= Mat4::from_rotation_z(pose.spin);
        }
        model
    }

    pub fn transforms(&self) -> Vec<Mat4> {
        (0..self.bodies.len()).map(|id| self.model_matrix(id)).collect()
    }
}

fn orbit_pose(body: &CelestialBody, center: Vec3, frame: u32, config: &OrbitConfig) -> BodyPose {
    let i = frame as f32;
    let orbit_angle = body.angular_speed * i * config.speed;
    let radius = body.orbit_radius * config.scale;
    let theta = orbit_angle * TAU / 360.0;
    BodyPose {
        position: center + Vec3::new(radius * theta.sin(), radius * theta.cos(), 0.0),
        radius,
        orbit_angle,
        spin: body.spin_rate * i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::body::{solar_system, EARTH, MOON, SUN};

    const EPS: f32 = 1e-4;

    fn scene() -> Scene {
        Scene::new(solar_system(), OrbitConfig::default())
    }

    #[test]
    fn test_sun_fixed_at_light() {
        let mut scene = scene();
        for i in [0, 1, 500, 100_000] {
            scene.update(i, i % 2 == 0);
            assert_eq!(scene.pose(SUN).position, Vec3::new(1.2, 1.0, 2.0));
        }
        let m = scene.model_matrix(SUN);
        assert!((m.w_axis.truncate() - Vec3::new(1.2, 1.0, 2.0)).length() < EPS);
        assert!((m.x_axis.x - 1.0).abs() < EPS, "sun scale should be 10 * 0.1");
    }

    #[test]
    fn test_earth_radius_and_circle() {
        let mut scene = scene();
        for i in (0..20_000).step_by(37) {
            scene.update(i, true);
            let earth = scene.pose(EARTH);
            assert_eq!(earth.radius, 9.0);
            let p = earth.position;
            assert!((p.x * p.x + p.y * p.y - 81.0).abs() < 1e-3, "frame {i}: {p:?}");
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_moon_follows_earth() {
        let mut scene = scene();
        for i in (0..5_000).step_by(13) {
            scene.update(i, true);
            let earth = scene.pose(EARTH);
            let moon = scene.pose(MOON);
            assert_eq!(moon.radius, earth.radius / 8.0);

            let theta = (0.050 * i as f32 * 30.0) * TAU / 360.0;
            let offset = Vec3::new(moon.radius * theta.sin(), moon.radius * theta.cos(), 0.0);
            assert!((moon.position - (earth.position + offset)).length() < EPS, "frame {i}");
        }
    }

    #[test]
    fn test_first_frames_closed_form() {
        let mut scene = scene();
        scene.update(0, true);
        let earth = scene.pose(EARTH);
        assert_eq!(earth.orbit_angle, 0.0);
        assert!(earth.position.x.abs() < 1e-6);
        assert!((earth.position.y - 9.0).abs() < 1e-6);

        scene.update(1, true);
        let earth = scene.pose(EARTH);
        assert!((earth.orbit_angle - 0.18).abs() < 1e-6);
        let theta = 0.18_f64.to_radians();
        let (x, y) = (9.0 * theta.sin(), 9.0 * theta.cos());
        assert!((earth.position.x as f64 - x).abs() < 1e-5);
        assert!((earth.position.y as f64 - y).abs() < 1e-5);
        assert!((earth.spin - 0.006).abs() < 1e-7);
    }

    #[test]
    fn test_pause_freezes_then_resumes() {
        let mut scene = scene();
        scene.update(100, true);
        let frozen = scene.poses().to_vec();
        let frozen_earth = scene.model_matrix(EARTH);

        for i in 101..150 {
            scene.update(i, false);
            assert_eq!(scene.pose(EARTH), frozen[EARTH]);
            assert_eq!(scene.pose(MOON), frozen[MOON]);
            assert_eq!(scene.model_matrix(EARTH), frozen_earth);
        }

        // Frame counter kept running while paused, so resuming jumps
        scene.update(150, true);
        let mut fresh = Scene::new(solar_system(), OrbitConfig::default());
        fresh.update(150, true);
        assert_eq!(scene.pose(EARTH), fresh.pose(EARTH));
        assert_ne!(scene.pose(EARTH).position, Vec3::ZERO);
        assert_ne!(scene.pose(EARTH), frozen[EARTH]);
    }

    #[test]
    fn test_paused_from_start_holds_frame_zero() {
        let mut scene = scene();
        scene.update(42, false);
        assert!((scene.pose(EARTH).position - Vec3::new(0.0, 9.0, 0.0)).length() < 1e-6);
        assert!((scene.pose(MOON).position - Vec3::new(0.0, 9.0 + 1.125, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_model_matrix_order() {
        let mut scene = scene();
        scene.update(250, true);
        let earth = scene.pose(EARTH);
        let expected = Mat4::from_translation(earth.position)
            * Mat4::from_scale(Vec3::splat(0.3))
            * Mat4::from_rotation_z(earth.spin);
        assert!(scene.model_matrix(EARTH).abs_diff_eq(expected, 1e-5));

        // Moon has no spin
        let moon = scene.pose(MOON);
        let expected = Mat4::from_translation(moon.position) * Mat4::from_scale(Vec3::splat(0.1));
        assert!(scene.model_matrix(MOON).abs_diff_eq(expected, 1e-6));
        assert_eq!(scene.transforms().len(), 3);
    }
}
