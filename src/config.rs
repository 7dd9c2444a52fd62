use std::path::PathBuf;

use glam::Vec3;

/// Top-level application configuration
///
/// Usage:
///   // Use the stock demo
///   let config = AppConfig::default();
///
///   // Or customize:
///   let mut config = AppConfig::default();
///   config.orbit.speed = 60.0;   // Faster orbits
///   config.orbit.scale = 0.2;    // Bigger system
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub orbit: OrbitConfig,
    pub lighting: LightingConfig,
    pub projection: ProjectionConfig,
    /// Directory holding `objects/<body>/planet.obj`
    pub resource_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            orbit: OrbitConfig::default(),
            lighting: LightingConfig::default(),
            projection: ProjectionConfig::default(),
            resource_root: PathBuf::from("resources"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            title: "Mini Solar System".to_string(),
        }
    }
}

/// Constants driving the orbital animation
#[derive(Clone, Copy, Debug)]
pub struct OrbitConfig {
    /// Multiplier on every orbital angular speed
    pub speed: f32,
    /// Global scale applied to body sizes and orbit radii
    pub scale: f32,
    /// Position of the single point light; the sun sits here
    pub light_position: Vec3,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            speed: 30.0,
            scale: 0.1,
            light_position: Vec3::new(1.2, 1.0, 2.0),
        }
    }
}

/// Point light and material coefficients; constant across frames
#[derive(Clone, Copy, Debug)]
pub struct LightingConfig {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub shininess: f32,
    pub clear_color: [f64; 4],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(1.0),
            constant: 1.0,
            linear: 0.05,
            quadratic: 0.012,
            shininess: 1.0,
            clear_color: [0.05, 0.05, 0.05, 1.0],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ProjectionConfig {
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { z_near: 0.1, z_far: 100.0 }
    }
}
