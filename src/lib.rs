//! Diorama viewer
//!
//! A single-scene 3D viewer: a fixed catalog of textured models lit by one
//! directional and two point lights, a cube-mapped sky, a fly camera and an
//! optional ImGui debug overlay. Camera pose, clear colour and the overlay
//! flag persist between runs in a ten-value text file.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod state;
pub mod timing;
pub mod ui;
pub mod wgpu_utils;

pub use app::DioramaApp;
pub use config::ViewerConfig;
pub use error::ViewerError;
pub use state::ProgramState;
