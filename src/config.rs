//! Viewer configuration
//!
//! Startup settings for the window, asset locations and projection. Defaults
//! reproduce the stock diorama layout: an 800x600 window reading everything
//! from `resources/`.

use std::path::{Path, PathBuf};

/// Default location of the persisted camera/colour snapshot
pub const DEFAULT_STATE_FILE: &str = "resources/program_state.txt";

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Root directory holding `objects/` and `Skybox_textures/`
    pub resource_root: PathBuf,
    pub state_file: PathBuf,
    /// When false the snapshot is read at startup but never written back
    pub save_state_on_exit: bool,
    pub z_near: f32,
    pub z_far: f32,
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Diorama".to_string(),
            width: 800,
            height: 600,
            resource_root: PathBuf::from("resources"),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            save_state_on_exit: true,
            z_near: 0.1,
            z_far: 100.0,
            vsync: true,
        }
    }
}

impl ViewerConfig {
    /// Resolves a path relative to the resource root
    pub fn resource(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.resource_root.join(relative)
    }

    pub fn skybox_dir(&self) -> PathBuf {
        self.resource("Skybox_textures")
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_layout() {
        let config = ViewerConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.z_near, 0.1);
        assert_eq!(config.z_far, 100.0);
        assert!(config.save_state_on_exit);
    }

    #[test]
    fn test_resource_paths_follow_root() {
        let config = ViewerConfig::default().with_resource_root("/assets");
        assert_eq!(
            config.resource("objects/candle/scene.gltf"),
            PathBuf::from("/assets/objects/candle/scene.gltf")
        );
        assert_eq!(config.skybox_dir(), PathBuf::from("/assets/Skybox_textures"));
    }

    #[test]
    fn test_size_never_zero() {
        let config = ViewerConfig::default().with_size(0, 0);
        assert_eq!((config.width, config.height), (1, 1));
    }
}
