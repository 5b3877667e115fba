//! Core rendering functionality
//!
//! Pipelines, the skybox and per-frame submission.

pub mod pipeline_manager;
pub mod render_engine;
pub mod skybox;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{FrameStatus, RenderEngine};
pub use skybox::{load_cube_faces, SkyboxRenderer, SkyboxUniform};
