// CONTROLLER: Input, camera bridge and the per-frame update
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{Action, InputEvent, InputState, KeyBindings, VirtualCursor};
pub use camera_controller::CameraController;
pub use frame_loop::{FrameLoopContext, FrameOutput};
