//! Keyboard, mouse and scroll routing
//!
//! Translates window-system events into camera commands and debug-UI toggles.
//! Nothing here touches the window directly; cursor visibility changes come
//! back to the caller as [`InputAction::CursorModeChanged`].

use std::collections::HashSet;

use log::debug;
use winit::{event::MouseScrollDelta, keyboard::KeyCode};

use crate::{
    gfx::camera::{CameraMovement, FlyCamera},
    state::ProgramState,
};

pub const TOGGLE_UI_KEY: KeyCode = KeyCode::F1;
pub const QUIT_KEY: KeyCode = KeyCode::Escape;

/// Pixel scroll distance treated as one wheel notch
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Cursor hidden and grabbed, mouse drives the camera
    Captured,
    /// Cursor visible, debug UI interactive
    Free,
}

impl CursorMode {
    pub fn for_ui(imgui_enabled: bool) -> Self {
        if imgui_enabled {
            CursorMode::Free
        } else {
            CursorMode::Captured
        }
    }
}

/// Something the application has to act on after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    CursorModeChanged(CursorMode),
}

fn movement_for(code: KeyCode) -> Option<CameraMovement> {
    match code {
        KeyCode::KeyW => Some(CameraMovement::Forward),
        KeyCode::KeyS => Some(CameraMovement::Backward),
        KeyCode::KeyA => Some(CameraMovement::Left),
        KeyCode::KeyD => Some(CameraMovement::Right),
        _ => None,
    }
}

#[derive(Debug)]
pub struct InputRouter {
    mode: CursorMode,
    /// Next captured motion sample only sets the reference point
    first_mouse: bool,
    /// Unbounded cursor built from raw motion deltas
    cursor: (f64, f64),
    last: (f64, f64),
    held: HashSet<CameraMovement>,
    toggle_held: bool,
}

impl InputRouter {
    /// Starts in the cursor mode implied by the restored state
    pub fn new(state: &ProgramState) -> Self {
        Self {
            mode: CursorMode::for_ui(state.imgui_enabled),
            first_mouse: true,
            cursor: (0.0, 0.0),
            last: (0.0, 0.0),
            held: HashSet::new(),
            toggle_held: false,
        }
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Handles a key press or release.
    ///
    /// F1 flips the debug UI and cursor mode but leaves the "Camera mouse
    /// update" checkbox as it was; free mode already stops mouse look.
    pub fn on_key(
        &mut self,
        code: KeyCode,
        pressed: bool,
        state: &mut ProgramState,
    ) -> Option<InputAction> {
        if let Some(direction) = movement_for(code) {
            if pressed {
                self.held.insert(direction);
            } else {
                self.held.remove(&direction);
            }
            return None;
        }

        match code {
            QUIT_KEY if pressed => Some(InputAction::Quit),
            TOGGLE_UI_KEY => {
                // OS key repeat arrives as further presses while held
                let was_held = std::mem::replace(&mut self.toggle_held, pressed);
                if !pressed || was_held {
                    return None;
                }
                state.imgui_enabled = !state.imgui_enabled;
                self.set_mode(CursorMode::for_ui(state.imgui_enabled));
                debug!(
                    "Debug UI {}",
                    if state.imgui_enabled { "enabled" } else { "disabled" }
                );
                Some(InputAction::CursorModeChanged(self.mode))
            }
            _ => None,
        }
    }

    fn set_mode(&mut self, mode: CursorMode) {
        if mode == CursorMode::Captured && self.mode != CursorMode::Captured {
            self.first_mouse = true;
        }
        self.mode = mode;
    }

    /// Feeds a raw motion delta; returns the look delta handed to the camera
    pub fn on_mouse_motion(
        &mut self,
        dx: f64,
        dy: f64,
        state: &mut ProgramState,
    ) -> Option<(f32, f32)> {
        self.cursor.0 += dx;
        self.cursor.1 += dy;

        if self.mode != CursorMode::Captured {
            return None;
        }
        if self.first_mouse {
            self.last = self.cursor;
            self.first_mouse = false;
        }

        let x_offset = (self.cursor.0 - self.last.0) as f32;
        // Screen y grows downwards
        let y_offset = (self.last.1 - self.cursor.1) as f32;
        self.last = self.cursor;

        if !state.camera_mouse_movement_enabled {
            return None;
        }
        state.camera.process_mouse_movement(x_offset, y_offset);
        Some((x_offset, y_offset))
    }

    /// Zoom is adjusted in every cursor mode
    pub fn on_scroll(&mut self, delta: MouseScrollDelta, state: &mut ProgramState) {
        state.camera.process_mouse_scroll(scroll_lines(delta));
    }

    /// Applies every held movement key for this frame
    pub fn apply_movement(&self, camera: &mut FlyCamera, delta_time: f32) {
        for direction in [
            CameraMovement::Forward,
            CameraMovement::Backward,
            CameraMovement::Left,
            CameraMovement::Right,
        ] {
            if self.held.contains(&direction) {
                camera.process_keyboard(direction, delta_time);
            }
        }
    }

    /// Forgets held keys, e.g. when the window loses focus mid-press
    pub fn release_all(&mut self) {
        self.held.clear();
        self.toggle_held = false;
    }
}

pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};
    use winit::dpi::PhysicalPosition;

    fn setup() -> (InputRouter, ProgramState) {
        let state = ProgramState::default();
        (InputRouter::new(&state), state)
    }

    #[test]
    fn test_toggle_fires_once_while_held() {
        let (mut router, mut state) = setup();

        let action = router.on_key(TOGGLE_UI_KEY, true, &mut state);
        assert_eq!(action, Some(InputAction::CursorModeChanged(CursorMode::Free)));

        // Key held across frames: repeats and per-frame movement must not retoggle
        for _ in 0..30 {
            assert_eq!(router.on_key(TOGGLE_UI_KEY, true, &mut state), None);
            router.apply_movement(&mut state.camera, 0.016);
        }
        assert!(state.imgui_enabled);

        router.on_key(TOGGLE_UI_KEY, false, &mut state);
        let action = router.on_key(TOGGLE_UI_KEY, true, &mut state);
        assert_eq!(action, Some(InputAction::CursorModeChanged(CursorMode::Captured)));
        assert!(!state.imgui_enabled);
    }

    #[test]
    fn test_first_motion_sample_is_discarded() {
        let (mut router, mut state) = setup();
        let yaw = state.camera.yaw;

        // Large absolute position before the first sample
        assert_eq!(router.on_mouse_motion(500.0, -300.0, &mut state), Some((0.0, 0.0)));
        assert_eq!(state.camera.yaw, yaw);

        assert_eq!(router.on_mouse_motion(10.0, 4.0, &mut state), Some((10.0, -4.0)));
        assert!((state.camera.yaw - (yaw + 1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_recapture_rearms_first_sample() {
        let (mut router, mut state) = setup();
        router.on_mouse_motion(1.0, 1.0, &mut state);

        router.on_key(TOGGLE_UI_KEY, true, &mut state);
        router.on_key(TOGGLE_UI_KEY, false, &mut state);
        assert_eq!(router.on_mouse_motion(250.0, 250.0, &mut state), None);

        router.on_key(TOGGLE_UI_KEY, true, &mut state);
        assert_eq!(router.mode(), CursorMode::Captured);
        assert_eq!(router.on_mouse_motion(-40.0, 90.0, &mut state), Some((0.0, 0.0)));
    }

    #[test]
    fn test_mouse_look_respects_camera_toggle() {
        let (mut router, mut state) = setup();
        state.camera_mouse_movement_enabled = false;
        router.on_mouse_motion(0.0, 0.0, &mut state);
        assert_eq!(router.on_mouse_motion(50.0, 50.0, &mut state), None);
        assert_eq!(state.camera.pitch, 0.0);
    }

    #[test]
    fn test_toggle_keeps_mouse_update_checkbox() {
        let (mut router, mut state) = setup();
        state.camera_mouse_movement_enabled = true;

        router.on_key(TOGGLE_UI_KEY, true, &mut state);
        router.on_key(TOGGLE_UI_KEY, false, &mut state);
        assert!(state.imgui_enabled);
        assert!(state.camera_mouse_movement_enabled);
        assert_eq!(router.mode(), CursorMode::Free);

        router.on_key(TOGGLE_UI_KEY, true, &mut state);
        assert!(!state.imgui_enabled);
        assert!(state.camera_mouse_movement_enabled);
        assert_eq!(router.mode(), CursorMode::Captured);
    }

    #[test]
    fn test_starts_free_when_ui_restored() {
        let mut state = ProgramState::default();
        state.imgui_enabled = true;
        let mut router = InputRouter::new(&state);
        assert_eq!(router.mode(), CursorMode::Free);
        assert_eq!(router.on_mouse_motion(5.0, 5.0, &mut state), None);
    }

    #[test]
    fn test_scroll_zooms_in_any_mode() {
        let (mut router, mut state) = setup();
        router.on_key(TOGGLE_UI_KEY, true, &mut state);
        router.on_scroll(MouseScrollDelta::LineDelta(0.0, 5.0), &mut state);
        assert_eq!(state.camera.zoom, 40.0);
        router.on_scroll(
            MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0)),
            &mut state,
        );
        assert_eq!(state.camera.zoom, 42.0);
    }

    #[test]
    fn test_held_keys_move_diagonally() {
        let (mut router, mut state) = setup();
        let start = state.camera.position;
        router.on_key(KeyCode::KeyW, true, &mut state);
        router.on_key(KeyCode::KeyD, true, &mut state);
        router.apply_movement(&mut state.camera, 1.0);

        let moved = state.camera.position - start;
        assert!((moved - Vector3::new(2.5, 0.0, -2.5)).magnitude() < 1e-4);

        router.on_key(KeyCode::KeyW, false, &mut state);
        router.release_all();
        let before = state.camera.position;
        router.apply_movement(&mut state.camera, 1.0);
        assert_eq!(state.camera.position, before);
    }

    #[test]
    fn test_escape_requests_quit() {
        let (mut router, mut state) = setup();
        assert_eq!(router.on_key(QUIT_KEY, true, &mut state), Some(InputAction::Quit));
        assert_eq!(router.on_key(QUIT_KEY, false, &mut state), None);
    }
}
