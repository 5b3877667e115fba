//! Error types for the diorama viewer
//!
//! Every failure that can stop the viewer from starting is a [`ViewerError`].
//! Failures that are tolerated at runtime (a missing skybox face, an absent
//! material texture, an unreadable state file) never reach this type; they
//! are logged where they happen and the viewer carries on.

use std::path::PathBuf;

/// Fatal viewer failures
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("rendering surface became unusable: {0}")]
    SurfaceLost(wgpu::SurfaceError),

    #[error("shader '{name}' failed to compile: {reason}")]
    Shader { name: String, reason: String },

    #[error("pipeline '{name}' could not be created: {reason}")]
    Pipeline { name: String, reason: String },

    #[error("failed to load model {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("failed to decode texture {}: {source}", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write program state to {}: {source}", path.display())]
    StateSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ViewerError {
    pub(crate) fn model(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
