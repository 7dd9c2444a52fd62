// MODEL: Scene data and pure per-frame state
pub mod body;
pub mod camera;
pub mod clock;
pub mod scene;

pub use body::{solar_system, BodyId, CelestialBody, Shading};
pub use camera::{Camera, CameraMovement};
pub use clock::FrameClock;
pub use scene::{BodyPose, Scene};
