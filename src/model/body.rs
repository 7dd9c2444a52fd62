use std::path::{Path, PathBuf};

/// Index of a body in the scene's body table
pub type BodyId = usize;

pub const EARTH_ORBIT_RADIUS: f32 = 90.0;

/// How a body is shaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Unlit; the body is the scene's light and sits at the light position
    Emissive,
    /// Phong-lit by the emissive body
    Lit,
}

/// A body in the scene. Created once at startup and never changed;
/// only its derived pose is recomputed each frame.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub name: &'static str,
    /// Mesh file, relative to the resource root
    pub mesh: PathBuf,
    /// Size before the global scale is applied
    pub base_scale: f32,
    /// Orbit radius before the global scale is applied
    pub orbit_radius: f32,
    /// Degrees per frame, before the global speed multiplier
    pub angular_speed: f32,
    /// Self-rotation around Z, radians per frame
    pub spin_rate: f32,
    /// Body this one orbits; `None` orbits the world origin
    pub parent: Option<BodyId>,
    pub shading: Shading,
}

impl CelestialBody {
    pub fn mesh_path(&self, resource_root: &Path) -> PathBuf {
        resource_root.join(&self.mesh)
    }

    pub fn orbits(&self) -> bool {
        self.shading == Shading::Lit && self.orbit_radius > 0.0
    }
}

pub const SUN: BodyId = 0;
pub const EARTH: BodyId = 1;
pub const MOON: BodyId = 2;

/// The sun, earth and moon, parents listed before their children
pub fn solar_system() -> Vec<CelestialBody> {
    vec![
        CelestialBody {
            name: "sun",
            mesh: PathBuf::from("objects/sun/planet.obj"),
            base_scale: 10.0,
            orbit_radius: 0.0,
            angular_speed: 0.0,
            spin_rate: 0.0,
            parent: None,
            shading: Shading::Emissive,
        },
        CelestialBody {
            name: "earth",
            mesh: PathBuf::from("objects/earth/planet.obj"),
            base_scale: 3.0,
            orbit_radius: EARTH_ORBIT_RADIUS,
            angular_speed: 0.006,
            spin_rate: 0.006,
            parent: None,
            shading: Shading::Lit,
        },
        CelestialBody {
            name: "moon",
            mesh: PathBuf::from("objects/moon/planet.obj"),
            base_scale: 1.0,
            orbit_radius: EARTH_ORBIT_RADIUS / 8.0,
            angular_speed: 0.050,
            spin_rate: 0.0,
            parent: Some(EARTH),
            shading: Shading::Lit,
        },
    ]
}
