//! Small wgpu helpers shared by the scene, material and skybox bindings

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;
