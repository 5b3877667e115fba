//! The fixed diorama layout
//!
//! Each [`SceneEntry`] names a model file and a transform recipe. Positions and
//! scales live in [`ProgramState`](crate::state::ProgramState) so the debug UI
//! can move things around; the rotation list and animation never change.

use cgmath::{Deg, Matrix4, Vector3, Zero};

/// Axis for a fixed rotation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub angle: Deg<f32>,
    pub axis: Axis,
}

impl Rotation {
    pub const fn new(degrees: f32, axis: Axis) -> Self {
        Self {
            angle: Deg(degrees),
            axis,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match self.axis {
            Axis::X => Matrix4::from_angle_x(self.angle),
            Axis::Y => Matrix4::from_angle_y(self.angle),
            Axis::Z => Matrix4::from_angle_z(self.angle),
        }
    }
}

/// Time-driven motion layered on top of the stored position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Vertical oscillation `amplitude * cos(t)`
    Bob { amplitude: f32 },
}

impl Animation {
    pub fn offset(&self, time: f32) -> Vector3<f32> {
        match *self {
            Animation::Bob { amplitude } => bob_offset(amplitude, time),
        }
    }
}

pub fn bob_offset(amplitude: f32, time: f32) -> Vector3<f32> {
    Vector3::new(0.0, time.cos() * amplitude, 0.0)
}

/// Editable part of an object's placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub position: Vector3<f32>,
    /// Uniform scale factor
    pub scale: f32,
}

impl ObjectTransform {
    pub const fn new(position: Vector3<f32>, scale: f32) -> Self {
        Self { position, scale }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub id: &'static str,
    /// Path relative to the resource root
    pub model_path: String,
    /// Applied left to right after the translation
    pub rotations: Vec<Rotation>,
    pub animation: Option<Animation>,
    /// Exposed in the debug UI
    pub editable: bool,
    pub default_transform: ObjectTransform,
}

impl SceneEntry {
    fn new(id: &'static str, model_path: impl Into<String>, position: [f32; 3], scale: f32) -> Self {
        Self {
            id,
            model_path: model_path.into(),
            rotations: Vec::new(),
            animation: None,
            editable: false,
            default_transform: ObjectTransform::new(position.into(), scale),
        }
    }

    fn gltf(id: &'static str, dir: &str, position: [f32; 3], scale: f32) -> Self {
        Self::new(id, format!("objects/{dir}/scene.gltf"), position, scale)
    }

    fn rotate(mut self, degrees: f32, axis: Axis) -> Self {
        self.rotations.push(Rotation::new(degrees, axis));
        self
    }

    fn animated(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// World position at `time`, including any animation offset
    pub fn world_position(&self, transform: &ObjectTransform, time: f32) -> Vector3<f32> {
        let offset = self
            .animation
            .map(|animation| animation.offset(time))
            .unwrap_or_else(Vector3::zero);
        transform.position + offset
    }

    /// `T(position) * R1 * R2 * ... * S(scale)`
    pub fn model_matrix(&self, transform: &ObjectTransform, time: f32) -> Matrix4<f32> {
        let translation = Matrix4::from_translation(self.world_position(transform, time));
        let rotation = self
            .rotations
            .iter()
            .fold(translation, |model, rotation| model * rotation.matrix());
        rotation * Matrix4::from_scale(transform.scale)
    }
}

/// Ordered list of everything drawn in the main pass
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    entries: Vec<SceneEntry>,
    light_anchor: &'static str,
}

impl SceneCatalog {
    pub fn new(entries: Vec<SceneEntry>, light_anchor: &'static str) -> Self {
        Self {
            entries,
            light_anchor,
        }
    }

    /// The stock diorama in draw order
    pub fn diorama() -> Self {
        use Axis::{X, Y};

        let entries = vec![
            SceneEntry::gltf("hornet", "hornet_-_hollow_knight", [0.0, -0.15, 0.0], 0.7)
                .rotate(-90.0, X)
                .editable(),
            SceneEntry::new(
                "hollow_knight",
                "objects/hollowKnight/untitled.obj",
                [0.0, 0.3, 13.0],
                0.02,
            )
            .rotate(-180.0, Y),
            SceneEntry::gltf("table", "antique_wooden_desk", [-1.0, -3.9, 3.0], 40.0)
                .rotate(-90.0, X),
            SceneEntry::gltf("paintbrush", "cc0_-_paint_brush_3", [5.0, -0.85, -1.0], 1.5)
                .rotate(45.0, Y),
            SceneEntry::gltf("statue", "hollow_knight_statue_test", [-9.0, 4.5, 7.0], 6.0)
                .rotate(90.0, Y),
            SceneEntry::gltf("gem", "gem_pack", [7.0, 0.0, 15.6], 2.0).rotate(-90.0, X),
            SceneEntry::gltf("candle", "candle", [-9.0, 0.3, 22.0], 1.0),
            SceneEntry::gltf("books", "pile_of_books", [6.0, 2.75, -23.0], 0.2)
                .rotate(-30.0, Y)
                .rotate(-90.0, X),
            SceneEntry::gltf(
                "ghost",
                "hollow_knight_grimmchild_animation",
                [-5.0, 9.5, -8.0],
                11.0,
            )
            .rotate(45.0, Y)
            .animated(Animation::Bob { amplitude: 2.0 })
            .editable(),
            SceneEntry::gltf("rubiks_cube", "rubiks_cube", [-9.0, 0.3, 31.0], 0.5)
                .rotate(25.0, Y),
            SceneEntry::gltf("bush", "stylized_bush_v1", [10.0, 1.3, 19.0], 5.0).rotate(20.0, Y),
            SceneEntry::gltf("door", "wooden_door", [54.0, 76.0, 5.0], 20.0)
                .rotate(90.0, Y)
                .rotate(90.0, X),
            SceneEntry::new(
                "hk",
                "objects/hollowKnight2/untitled.obj",
                [-10.0, -1.2, -18.0],
                0.5,
            ),
            SceneEntry::gltf("notebook", "notebook", [8.0, -0.8, 32.0], 0.05)
                .rotate(-90.0, X)
                .editable(),
        ];

        Self::new(entries, "ghost")
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SceneEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn editable(&self) -> impl Iterator<Item = &SceneEntry> {
        self.entries.iter().filter(|entry| entry.editable)
    }

    /// Id of the object the animated point light follows
    pub fn light_anchor(&self) -> &'static str {
        self.light_anchor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self::diorama()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};
    use std::f32::consts::PI;

    const EPS: f32 = 1e-4;

    fn entry_with(rotations: Vec<Rotation>) -> SceneEntry {
        SceneEntry {
            id: "probe",
            model_path: "probe.obj".to_string(),
            rotations,
            animation: None,
            editable: false,
            default_transform: ObjectTransform::new(Vector3::zero(), 1.0),
        }
    }

    #[test]
    fn test_model_matrix_is_translate_rotate_scale() {
        let entry = entry_with(vec![Rotation::new(90.0, Axis::Y)]);
        let transform = ObjectTransform::new(Vector3::new(1.0, 2.0, 3.0), 2.0);
        let model = entry.model_matrix(&transform, 0.0);

        // Scale (1,0,0) to (2,0,0), rotate +90 about Y to (0,0,-2), then translate
        let point = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
        let expected = Vector3::new(1.0, 2.0, 1.0);
        assert!((point.truncate() - expected).magnitude() < EPS, "{:?}", point);

        let by_hand = Matrix4::from_translation(transform.position)
            * Matrix4::from_angle_y(Deg(90.0))
            * Matrix4::from_scale(2.0);
        assert_eq!(model, by_hand);
    }

    #[test]
    fn test_rotations_apply_in_listed_order() {
        let entry = entry_with(vec![Rotation::new(-30.0, Axis::Y), Rotation::new(-90.0, Axis::X)]);
        let transform = ObjectTransform::new(Vector3::zero(), 1.0);
        let expected = Matrix4::from_angle_y(Deg(-30.0)) * Matrix4::from_angle_x(Deg(-90.0));
        let model = entry.model_matrix(&transform, 0.0);
        for column in 0..4 {
            assert!((model[column] - expected[column]).magnitude() < EPS);
        }
    }

    #[test]
    fn test_bob_animation_offsets_translation() {
        let catalog = SceneCatalog::diorama();
        let ghost = catalog.get("ghost").expect("ghost entry");
        let transform = ghost.default_transform;

        let top = ghost.world_position(&transform, 0.0);
        let bottom = ghost.world_position(&transform, PI);
        assert!((top - Vector3::new(-5.0, 11.5, -8.0)).magnitude() < EPS);
        assert!((bottom - Vector3::new(-5.0, 7.5, -8.0)).magnitude() < EPS);
    }

    #[test]
    fn test_diorama_catalog_layout() {
        let catalog = SceneCatalog::diorama();
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                "hornet",
                "hollow_knight",
                "table",
                "paintbrush",
                "statue",
                "gem",
                "candle",
                "books",
                "ghost",
                "rubiks_cube",
                "bush",
                "door",
                "hk",
                "notebook",
            ]
        );

        let editable: Vec<&str> = catalog.editable().map(|e| e.id).collect();
        assert_eq!(editable, vec!["hornet", "ghost", "notebook"]);
        assert_eq!(catalog.light_anchor(), "ghost");
        assert!(catalog.get(catalog.light_anchor()).is_some());

        let door = catalog.get("door").expect("door entry");
        assert_eq!(door.rotations.len(), 2);
        assert_eq!(door.model_path, "objects/wooden_door/scene.gltf");
        assert!(catalog.get("candle").expect("candle").rotations.is_empty());
    }
}
