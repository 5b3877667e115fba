//! # Graphics Module
//!
//! Everything between [`ProgramState`](crate::state::ProgramState) and the
//! screen.
//!
//! - **Camera** ([`camera`]) - first-person fly camera and matrix helpers
//! - **Lighting** ([`lighting`]) - the directional light and the two point lights
//! - **Scene** ([`scene`]) - the model catalog, model loading and GPU upload
//! - **Frame** ([`frame`]) - per-frame uniforms derived from the program state
//! - **Rendering** ([`rendering`]) - pipelines, skybox and frame submission
//! - **Resources** ([`resources`]) - textures, materials and the scene uniform

pub mod camera;
pub mod frame;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::FlyCamera;
pub use frame::{FramePlan, Viewport};
pub use rendering::RenderEngine;
