//! Window, event loop and the per-frame sequence
//!
//! [`DioramaApp`] owns the winit event loop. GPU objects are created on the
//! first `resumed` call; every redraw then runs input → state → uniforms →
//! scene → skybox → debug UI → present. The program state is written back to
//! disk once the loop ends, unless startup or rendering failed.

use std::{path::Path, sync::Arc, time::Instant};

use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::ViewerError,
    gfx::{
        frame::{FramePlan, Viewport},
        rendering::{load_cube_faces, FrameStatus, RenderEngine},
        scene::{Scene, SceneCatalog},
    },
    input::{CursorMode, InputAction, InputRouter},
    state::ProgramState,
    timing::FrameClock,
    ui::{debug_panels, UiManager},
};

pub struct DioramaApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    catalog: SceneCatalog,
    state: ProgramState,
    input: InputRouter,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Option<Scene>,
    ui_manager: Option<UiManager>,
    /// First fatal error; suppresses the state save on exit
    fatal: Option<ViewerError>,
}

impl DioramaApp {
    /// Creates the event loop and restores the persisted program state
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let event_loop = EventLoop::new()?;

        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        state.load_from_file(&config.state_file);
        let input = InputRouter::new(&state);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                catalog,
                state,
                input,
                clock: FrameClock::default(),
                window: None,
                render_engine: None,
                scene: None,
                ui_manager: None,
                fatal: None,
            },
        })
    }

    /// Runs until Escape, window close or a fatal error
    pub fn run(mut self) -> Result<(), ViewerError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        let app_state = self.app_state;
        if let Some(err) = app_state.fatal {
            return Err(err);
        }
        if app_state.config.save_state_on_exit {
            save_state(&app_state.state, &app_state.config.state_file);
        }
        Ok(())
    }
}

impl AppState {
    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(LogicalSize::new(self.config.width, self.config.height)),
            )?,
        );
        let (width, height) = window.inner_size().into();

        let faces = load_cube_faces(&self.config.skybox_dir());
        let window_clone = window.clone();
        let vsync = self.config.vsync;
        let mut render_engine = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, vsync, &faces).await
        })?;

        let scene = Scene::load(
            render_engine.device(),
            render_engine.queue(),
            &self.catalog,
            &self.config.resource_root,
        )?;
        render_engine.prepare_scene(&scene)?;
        info!("Loaded {} models", scene.objects().len());

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        apply_cursor_mode(&window, self.input.mode());

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.scene = Some(scene);
        self.ui_manager = Some(ui_manager);
        self.clock = FrameClock::new(Instant::now());
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("{}", err);
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match self
            .input
            .on_key(code, event.state.is_pressed(), &mut self.state)
        {
            Some(InputAction::Quit) => event_loop.exit(),
            Some(InputAction::CursorModeChanged(mode)) => {
                if let Some(window) = self.window.as_ref() {
                    apply_cursor_mode(window, mode);
                }
            }
            None => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(render_engine), Some(scene)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.scene.as_mut(),
        ) else {
            return;
        };

        let frame = self.clock.tick(Instant::now());
        self.input
            .apply_movement(&mut self.state.camera, frame.delta);

        let viewport = Viewport {
            aspect: render_engine.aspect(),
            z_near: self.config.z_near,
            z_far: self.config.z_far,
        };
        let plan = FramePlan::build(&self.state, &self.catalog, viewport, frame.time);

        // The UI frame is opened only once the surface texture is acquired;
        // panel edits land in the next frame's plan
        let ui_manager = self
            .ui_manager
            .as_mut()
            .filter(|_| self.state.imgui_enabled);
        let ui_callback = ui_manager.map(|ui_manager| {
            let state = &mut self.state;
            let catalog = &self.catalog;
            move |device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.update_logic(window, |ui| debug_panels(ui, state, catalog));
                ui_manager.render_display_only(device, queue, encoder, view);
            }
        });

        match render_engine.render_frame(scene, &plan, ui_callback) {
            Ok(FrameStatus::Presented) => {}
            Ok(FrameStatus::Skipped) => debug!("Frame skipped"),
            Err(err) => self.fail(event_loop, err),
        }
    }
}

/// Best-effort save: a missing parent directory is created, and any
/// remaining failure is logged without failing the session
fn save_state(state: &ProgramState, path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            warn!("Could not create {}: {}", parent.display(), err);
        }
    }
    if let Err(err) = state.save_to_file(path) {
        warn!("{}", err);
    }
}

fn apply_cursor_mode(window: &Window, mode: CursorMode) {
    match mode {
        CursorMode::Captured => {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                warn!("Could not grab the cursor: {}", err);
            }
            window.set_cursor_visible(false);
        }
        CursorMode::Free => {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!("Could not release the cursor: {}", err);
            }
            window.set_cursor_visible(true);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_gpu(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(ui_manager)) = (self.window.as_ref(), self.ui_manager.as_mut()) {
            // Camera input is routed regardless of what ImGui captures
            ui_manager.handle_input(window, window_id, &event);
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::MouseWheel { delta, .. } => self.input.on_scroll(delta, &mut self.state),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.on_mouse_motion(dx, dy, &mut self.state);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_creates_missing_state_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resources").join("program_state.txt");
        let catalog = SceneCatalog::diorama();
        let mut state = ProgramState::new(&catalog);
        state.imgui_enabled = true;

        save_state(&state, &path);

        let mut restored = ProgramState::new(&catalog);
        assert_eq!(restored.load_from_file(&path), 10);
        assert!(restored.imgui_enabled);
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").expect("write");
        let path = blocker.join("program_state.txt");

        save_state(&ProgramState::new(&SceneCatalog::diorama()), &path);
        assert!(!path.exists());
    }
}
