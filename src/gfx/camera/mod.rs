pub mod camera_utils;
pub mod fly_camera;

// Re-export main types
pub use camera_utils::{convert_matrix4_to_array, strip_translation};
pub use fly_camera::{CameraMovement, FlyCamera};
