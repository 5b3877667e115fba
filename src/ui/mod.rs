//! # Debug UI
//!
//! Dear ImGui overlay toggled with F1. [`UiManager`] wires ImGui into winit
//! and wgpu; [`debug_panels`] builds the two windows that edit the
//! [`ProgramState`](crate::state::ProgramState).

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::debug_panels;
