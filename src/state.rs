//! Mutable session state and its flat-text snapshot
//!
//! The snapshot holds ten whitespace-separated tokens in a fixed order:
//! clear colour r g b, debug-UI flag (0/1), camera position x y z and camera
//! front x y z. Nothing else is persisted.

use std::{collections::HashMap, fs, path::Path};

use cgmath::Vector3;
use log::{info, warn};

use crate::{
    error::ViewerError,
    gfx::{
        camera::FlyCamera,
        lighting::PointLight,
        scene::catalog::{ObjectTransform, SceneCatalog},
    },
};

/// Number of scalar fields in the snapshot
pub const PERSISTED_FIELD_COUNT: usize = 10;

pub const DEFAULT_CAMERA_POSITION: Vector3<f32> = Vector3::new(0.0, 0.0, 3.0);

#[derive(Debug, Clone)]
pub struct ProgramState {
    pub clear_color: Vector3<f32>,
    pub imgui_enabled: bool,
    pub camera: FlyCamera,
    /// Routes mouse look deltas to the camera when set
    pub camera_mouse_movement_enabled: bool,
    pub objects: HashMap<String, ObjectTransform>,
    /// Shared profile for both point-light slots
    pub point_light: PointLight,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new(&SceneCatalog::diorama())
    }
}

impl ProgramState {
    /// Defaults with one transform per catalog entry
    pub fn new(catalog: &SceneCatalog) -> Self {
        let objects = catalog
            .entries()
            .iter()
            .map(|entry| (entry.id.to_string(), entry.default_transform))
            .collect();

        Self {
            clear_color: Vector3::new(0.0, 0.0, 0.0),
            imgui_enabled: false,
            camera: FlyCamera::new(DEFAULT_CAMERA_POSITION),
            camera_mouse_movement_enabled: true,
            objects,
            point_light: PointLight::default(),
        }
    }

    pub fn transform(&self, id: &str) -> Option<&ObjectTransform> {
        self.objects.get(id)
    }

    pub fn transform_mut(&mut self, id: &str) -> Option<&mut ObjectTransform> {
        self.objects.get_mut(id)
    }

    /// The ten snapshot values in file order
    pub fn persisted_fields(&self) -> [f32; PERSISTED_FIELD_COUNT] {
        let position = self.camera.position;
        let front = self.camera.front;
        [
            self.clear_color.x,
            self.clear_color.y,
            self.clear_color.z,
            if self.imgui_enabled { 1.0 } else { 0.0 },
            position.x,
            position.y,
            position.z,
            front.x,
            front.y,
            front.z,
        ]
    }

    /// Renders the snapshot, one token per line
    pub fn to_snapshot(&self) -> String {
        let mut out = String::new();
        for (index, value) in self.persisted_fields().iter().enumerate() {
            if index == 3 {
                out.push_str(if self.imgui_enabled { "1" } else { "0" });
            } else {
                // Display for f32 is the shortest text that parses back bit-exact
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Overwrites `path` with the current snapshot
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        let path = path.as_ref();
        fs::write(path, self.to_snapshot()).map_err(|source| ViewerError::StateSave {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved program state to {}", path.display());
        Ok(())
    }

    /// Restores as many snapshot fields as `path` provides.
    ///
    /// A missing or unreadable file leaves everything at its current value.
    /// Reading stops at the first missing or malformed token, so a short file
    /// overwrites a prefix of the fields and keeps the rest. Returns how many
    /// fields were restored.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                info!("No program state restored from {}: {}", path.display(), err);
                return 0;
            }
        };

        let restored = self.apply_snapshot(&contents);
        if restored < PERSISTED_FIELD_COUNT {
            warn!(
                "Program state file {} is incomplete: restored {} of {} fields",
                path.display(),
                restored,
                PERSISTED_FIELD_COUNT
            );
        } else {
            info!("Restored program state from {}", path.display());
        }
        restored
    }

    /// Applies snapshot text in file order; returns the number of fields read
    pub fn apply_snapshot(&mut self, contents: &str) -> usize {
        let mut reader = TokenReader::new(contents);
        let _ = self.read_fields(&mut reader);

        // Any front component read means yaw/pitch must follow the new vector
        if reader.consumed > 7 {
            let front = self.camera.front;
            self.camera.set_front(front);
        }
        reader.consumed
    }

    fn read_fields(&mut self, reader: &mut TokenReader) -> Option<()> {
        self.clear_color.x = reader.float()?;
        self.clear_color.y = reader.float()?;
        self.clear_color.z = reader.float()?;
        self.imgui_enabled = reader.flag()?;
        self.camera.position.x = reader.float()?;
        self.camera.position.y = reader.float()?;
        self.camera.position.z = reader.float()?;
        self.camera.front.x = reader.float()?;
        self.camera.front.y = reader.float()?;
        self.camera.front.z = reader.float()?;
        Some(())
    }
}

struct TokenReader<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    consumed: usize,
}

impl<'a> TokenReader<'a> {
    fn new(contents: &'a str) -> Self {
        Self {
            tokens: contents.split_whitespace(),
            consumed: 0,
        }
    }

    fn float(&mut self) -> Option<f32> {
        let value = self.tokens.next()?.parse::<f32>().ok()?;
        self.consumed += 1;
        Some(value)
    }

    fn flag(&mut self) -> Option<bool> {
        let value = match self.tokens.next()? {
            "0" => false,
            "1" => true,
            _ => return None,
        };
        self.consumed += 1;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::io::Write;

    fn random_state(rng: &mut impl Rng) -> ProgramState {
        let mut state = ProgramState::default();
        state.clear_color = Vector3::new(rng.random(), rng.random(), rng.random());
        state.imgui_enabled = rng.random_bool(0.5);
        state.camera.position = Vector3::new(
            rng.random_range(-100.0..100.0),
            rng.random_range(-100.0..100.0),
            rng.random_range(-100.0..100.0),
        );
        state.camera.front = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        state
    }

    #[test]
    fn test_save_then_load_round_trips_exactly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("program_state.txt");
        let mut rng = rand::rng();

        for _ in 0..50 {
            let saved = random_state(&mut rng);
            saved.save_to_file(&path).expect("save");

            let mut loaded = ProgramState::default();
            assert_eq!(loaded.load_from_file(&path), PERSISTED_FIELD_COUNT);

            let expected = saved.persisted_fields();
            let actual = loaded.persisted_fields();
            for (a, b) in expected.iter().zip(actual.iter()) {
                assert_eq!(a.to_bits(), b.to_bits(), "{} != {}", a, b);
            }
        }
    }

    #[test]
    fn test_snapshot_layout() {
        let mut state = ProgramState::default();
        state.clear_color = Vector3::new(0.1, 0.2, 0.3);
        state.imgui_enabled = true;
        state.camera.front = Vector3::new(0.0, 0.0, -1.0);
        let text = state.to_snapshot();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), PERSISTED_FIELD_COUNT);
        assert_eq!(&lines[..7], &["0.1", "0.2", "0.3", "1", "0", "0", "3"]);
        assert_eq!(&lines[7..], &["0", "0", "-1"]);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = ProgramState::default();
        let restored = state.load_from_file(dir.path().join("does_not_exist.txt"));

        assert_eq!(restored, 0);
        assert_eq!(
            state.persisted_fields(),
            ProgramState::default().persisted_fields()
        );
        assert!(!state.imgui_enabled);
        assert_eq!(state.camera.position, DEFAULT_CAMERA_POSITION);
    }

    #[test]
    fn test_truncated_file_overwrites_prefix_only() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "0.5\n0.25\n0.125\n1").expect("write");

        let mut state = ProgramState::default();
        assert_eq!(state.load_from_file(file.path()), 4);

        assert_eq!(state.clear_color, Vector3::new(0.5, 0.25, 0.125));
        assert!(state.imgui_enabled);
        let defaults = ProgramState::default();
        assert_eq!(state.persisted_fields()[4..], defaults.persisted_fields()[4..]);
        assert_eq!(state.camera.yaw, defaults.camera.yaw);
    }

    #[test]
    fn test_malformed_token_stops_reading() {
        let mut state = ProgramState::default();
        let restored = state.apply_snapshot("0.5 0.5 0.5 0 1.0 oops 7.0 1 0 0");

        assert_eq!(restored, 5);
        assert_eq!(state.camera.position, Vector3::new(1.0, 0.0, 3.0));
        assert_eq!(state.camera.front, ProgramState::default().camera.front);
    }

    #[test]
    fn test_flag_accepts_only_zero_or_one() {
        let mut state = ProgramState::default();
        assert_eq!(state.apply_snapshot("0 0 0 true 1 1 1"), 3);
        assert!(!state.imgui_enabled);
    }

    #[test]
    fn test_restored_front_drives_camera_angles() {
        let mut state = ProgramState::default();
        state.apply_snapshot("0 0 0 0 0 0 3 1 0 0");
        assert_eq!(state.camera.front, Vector3::new(1.0, 0.0, 0.0));
        assert!(state.camera.yaw.abs() < 1e-5);
    }

    #[test]
    fn test_objects_seeded_from_catalog() {
        let catalog = SceneCatalog::diorama();
        let state = ProgramState::new(&catalog);
        assert_eq!(state.objects.len(), catalog.len());
        let notebook = state.transform("notebook").expect("notebook");
        assert_eq!(notebook.scale, 0.05);
        assert_eq!(notebook.position, Vector3::new(8.0, -0.8, 32.0));
    }
}
