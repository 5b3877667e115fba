//! Per-frame render inputs
//!
//! [`FramePlan`] is everything one frame uploads to the GPU, derived from the
//! program state and the catalog without touching any GPU object. The render
//! engine consumes it in draw order.

use cgmath::{Matrix4, Vector3};

use crate::{
    gfx::{
        camera::strip_translation,
        lighting::FrameLights,
        rendering::skybox::SkyboxUniform,
        resources::global_bindings::SceneUniform,
        scene::catalog::SceneCatalog,
    },
    state::ProgramState,
};

/// Projection parameters for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

#[derive(Debug, Clone)]
pub struct FramePlan {
    pub clear_color: wgpu::Color,
    pub scene: SceneUniform,
    /// One model matrix per catalog entry, in draw order
    pub object_transforms: Vec<Matrix4<f32>>,
    pub skybox: SkyboxUniform,
}

impl FramePlan {
    pub fn build(
        state: &ProgramState,
        catalog: &SceneCatalog,
        viewport: Viewport,
        time: f32,
    ) -> Self {
        let camera = &state.camera;
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(viewport.aspect, viewport.z_near, viewport.z_far);

        let anchor = state
            .transform(catalog.light_anchor())
            .map(|transform| transform.position)
            .unwrap_or(Vector3::new(0.0, 0.0, 0.0));
        let lights = FrameLights::compute(&state.point_light, anchor, time);

        let object_transforms = catalog
            .entries()
            .iter()
            .map(|entry| {
                let transform = state
                    .transform(entry.id)
                    .copied()
                    .unwrap_or(entry.default_transform);
                entry.model_matrix(&transform, time)
            })
            .collect();

        Self {
            clear_color: wgpu::Color {
                r: state.clear_color.x as f64,
                g: state.clear_color.y as f64,
                b: state.clear_color.z as f64,
                a: 1.0,
            },
            scene: SceneUniform::new(view, projection, camera.position, &lights),
            object_transforms,
            skybox: SkyboxUniform::new(strip_translation(view), projection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::convert_matrix4_to_array;

    fn viewport() -> Viewport {
        Viewport {
            aspect: 800.0 / 600.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    #[test]
    fn test_plan_covers_catalog_in_order() {
        let catalog = SceneCatalog::diorama();
        let state = ProgramState::new(&catalog);
        let plan = FramePlan::build(&state, &catalog, viewport(), 0.0);

        assert_eq!(plan.object_transforms.len(), catalog.len());
        for (entry, model) in catalog.entries().iter().zip(&plan.object_transforms) {
            let transform = state.transform(entry.id).expect("seeded");
            assert_eq!(*model, entry.model_matrix(transform, 0.0));
        }
    }

    #[test]
    fn test_skybox_view_has_no_translation() {
        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        state.camera.position = Vector3::new(12.0, -3.0, 40.0);
        let plan = FramePlan::build(&state, &catalog, viewport(), 1.0);

        let view = plan.skybox.view();
        assert_eq!(view[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(plan.skybox.projection(), plan.scene.projection());
        assert_ne!(plan.scene.view()[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_projection_uses_camera_zoom() {
        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        state.camera.zoom = 30.0;
        let plan = FramePlan::build(&state, &catalog, viewport(), 0.0);
        let expected = state.camera.projection_matrix(800.0 / 600.0, 0.1, 100.0);
        assert_eq!(plan.scene.projection(), convert_matrix4_to_array(expected));
    }

    #[test]
    fn test_animated_light_follows_edited_anchor() {
        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        if let Some(ghost) = state.transform_mut("ghost") {
            ghost.position = Vector3::new(1.0, 1.0, 1.0);
        }
        let plan = FramePlan::build(&state, &catalog, viewport(), 0.0);
        assert_eq!(plan.scene.point_light_position(1), [1.0, 3.0, 1.0]);
        assert_eq!(plan.scene.point_light_position(0), [-9.0, 2.0, 22.0]);
    }

    #[test]
    fn test_clear_color_is_opaque() {
        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        state.clear_color = Vector3::new(0.25, 0.5, 1.0);
        let plan = FramePlan::build(&state, &catalog, viewport(), 0.0);
        assert_eq!(plan.clear_color.r, 0.25);
        assert_eq!(plan.clear_color.b, 1.0);
        assert_eq!(plan.clear_color.a, 1.0);
    }
}
