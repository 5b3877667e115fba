//! Debug panels
//!
//! Two windows: scene tweaks (clear colour, editable object positions, the
//! notebook's scale and the point-light attenuation) and a read-only camera
//! readout with the mouse-look toggle.

use cgmath::Vector3;

use crate::{
    gfx::{lighting::PointLight, scene::catalog::SceneCatalog},
    state::ProgramState,
};

/// Objects whose uniform scale gets a drag control
pub const SCALE_EDITABLE: &[&str] = &["notebook"];

const SCALE_DRAG_SPEED: f32 = 0.05;
const SCALE_RANGE: (f32, f32) = (0.1, 40.0);
const ATTENUATION_DRAG_SPEED: f32 = 0.05;
const ATTENUATION_RANGE: (f32, f32) = (0.0, 1.0);

/// Builds both debug windows, editing `state` in place
pub fn debug_panels(ui: &imgui::Ui, state: &mut ProgramState, catalog: &SceneCatalog) {
    scene_panel(ui, state, catalog);
    camera_panel(ui, state);
}

fn scene_panel(ui: &imgui::Ui, state: &mut ProgramState, catalog: &SceneCatalog) {
    ui.window("Hello window")
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            let mut clear_color: [f32; 3] = state.clear_color.into();
            if ui.color_edit3("Background color", &mut clear_color) {
                state.clear_color = clear_color.into();
            }

            ui.separator();
            for entry in catalog.editable() {
                let Some(transform) = state.transform_mut(entry.id) else {
                    continue;
                };
                drag_vector(ui, &format!("{} position", entry.id), &mut transform.position);
                if SCALE_EDITABLE.contains(&entry.id) {
                    imgui::Drag::new(format!("{} scale", entry.id))
                        .speed(SCALE_DRAG_SPEED)
                        .range(SCALE_RANGE.0, SCALE_RANGE.1)
                        .build(ui, &mut transform.scale);
                }
            }

            ui.separator();
            attenuation_controls(ui, &mut state.point_light);
        });
}

fn attenuation_controls(ui: &imgui::Ui, light: &mut PointLight) {
    let fields = [
        ("pointLight.constant", &mut light.constant),
        ("pointLight.linear", &mut light.linear),
        ("pointLight.quadratic", &mut light.quadratic),
    ];
    for (label, value) in fields {
        imgui::Drag::new(label)
            .speed(ATTENUATION_DRAG_SPEED)
            .range(ATTENUATION_RANGE.0, ATTENUATION_RANGE.1)
            .build(ui, value);
    }
}

fn camera_panel(ui: &imgui::Ui, state: &mut ProgramState) {
    ui.window("Camera info")
        .position([20.0, 360.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            let camera = &state.camera;
            ui.text(format!(
                "Camera position: ({:.6}, {:.6}, {:.6})",
                camera.position.x, camera.position.y, camera.position.z
            ));
            ui.text(format!(
                "(Yaw, Pitch): ({:.6}, {:.6})",
                camera.yaw, camera.pitch
            ));
            ui.text(format!(
                "Camera front: ({:.6}, {:.6}, {:.6})",
                camera.front.x, camera.front.y, camera.front.z
            ));
            ui.checkbox(
                "Camera mouse update",
                &mut state.camera_mouse_movement_enabled,
            );
        });
}

fn drag_vector(ui: &imgui::Ui, label: &str, value: &mut Vector3<f32>) -> bool {
    let mut components: [f32; 3] = (*value).into();
    let changed = imgui::Drag::new(label).build_array(ui, &mut components);
    if changed {
        *value = components.into();
    }
    changed
}
