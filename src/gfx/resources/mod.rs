// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform layouts and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{SceneBindings, SceneUBO, SceneUniform};
pub use material::{Material, MaterialBindings};
pub use texture_resource::TextureResource;
