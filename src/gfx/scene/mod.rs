//! # Scene Module
//!
//! The diorama's content: the fixed catalog of placed models, CPU-side model
//! loading and the GPU objects drawn each frame.
//!
//! - [`SceneCatalog`] - ordered model paths with transform recipes
//! - [`ModelData`] - meshes and materials read from `.obj` or `.gltf`
//! - [`Model`] - a model uploaded to the GPU
//! - [`Scene`] - every catalog model with its per-object transform uniform

pub mod catalog;
pub mod model;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use catalog::{Animation, Axis, ObjectTransform, Rotation, SceneCatalog, SceneEntry};
pub use model::ModelData;
pub use object::{DrawModel, Model};
pub use scene::Scene;
pub use vertex::{PositionVertex, Vertex3D};
