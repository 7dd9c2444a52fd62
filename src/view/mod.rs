// VIEW: GPU setup, asset loading and drawing
pub mod gpu_init;
pub mod model_loader;
pub mod render;

pub use gpu_init::GpuContext;
pub use render::RenderState;
