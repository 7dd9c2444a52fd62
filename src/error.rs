use std::path::PathBuf;

/// Failures that abort startup before the first frame
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    Assets(#[from] AssetError),
}

impl StartupError {
    /// Process exit code for this failure.
    ///
    /// Window and graphics initialisation map to -1, asset failures to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Assets(_) => 1,
            _ => -1,
        }
    }
}

/// Errors raised while reading meshes, materials and textures from disk
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load mesh {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to load materials for {path}: {source}")]
    Material {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("mesh {path} contains no geometry")]
    EmptyModel { path: PathBuf },
}
