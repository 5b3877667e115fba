//! wgpu rendering engine for the diorama
//!
//! Owns the surface, device and queue, the depth buffer, the scene uniform,
//! the skybox and both render pipelines. Each frame is one render pass:
//! clear, every model with depth writes, then the skybox at the far plane.
//! The debug UI, when present, is recorded after that pass into the same
//! command encoder.

use std::sync::Arc;

use log::{info, warn};
use wgpu::{Device, TextureFormat};

use crate::{
    error::ViewerError,
    gfx::{
        frame::FramePlan,
        resources::{
            global_bindings::{SceneBindings, SceneUBO},
            texture_resource::{TextureResource, CUBE_FACES},
        },
        scene::{vertex::PositionVertex, vertex::Vertex3D, Scene},
    },
};

use super::{
    pipeline_manager::{PipelineConfig, PipelineManager},
    skybox::SkyboxRenderer,
};

pub const MODEL_PIPELINE: &str = "Model";
pub const SKYBOX_PIPELINE: &str = "Skybox";

const MODEL_SHADER: &str = "model_lighting";
const SKYBOX_SHADER: &str = "skybox";

/// Outcome of one [`RenderEngine::render_frame`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was reconfigured or timed out; nothing was drawn
    Skipped,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    scene_ubo: SceneUBO,
    scene_bindings: SceneBindings,
    skybox: SkyboxRenderer,
}

impl RenderEngine {
    /// Creates the GPU context for `window` and the skybox from `skybox_faces`.
    ///
    /// Model pipelines need the scene's bind group layouts, so they are built
    /// separately by [`prepare_scene`](Self::prepare_scene) once the scene is
    /// loaded.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        skybox_faces: &[Option<image::RgbaImage>; CUBE_FACES],
    ) -> Result<RenderEngine, ViewerError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                // Large material textures and sky faces need the adapter's full limits
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let Some(&first_format) = surface_capabilities.formats.first() else {
            return Err(ViewerError::Pipeline {
                name: "surface".to_string(),
                reason: "surface reports no supported formats".to_string(),
            });
        };
        // Colours are written as-is, so prefer a non-sRGB target
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(first_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::Immediate
            },
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let scene_ubo = SceneUBO::new(&device);
        let scene_bindings = SceneBindings::new(&device, &scene_ubo);
        let skybox = SkyboxRenderer::new(&device, &queue, skybox_faces);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader(MODEL_SHADER, include_str!("model_lighting.wgsl"))?;
        pipeline_manager.load_shader(SKYBOX_SHADER, include_str!("skybox.wgsl"))?;

        pipeline_manager.register_pipeline(
            SKYBOX_PIPELINE,
            skybox_pipeline_config(format, vec![skybox.bind_group_layout().clone()]),
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            scene_ubo,
            scene_bindings,
            skybox,
        })
    }

    /// Registers the model pipeline against `scene`'s layouts and creates
    /// every pending pipeline
    pub fn prepare_scene(&mut self, scene: &Scene) -> Result<(), ViewerError> {
        self.pipeline_manager.register_pipeline(
            MODEL_PIPELINE,
            model_pipeline_config(
                self.format,
                vec![
                    self.scene_bindings.bind_group_layout().clone(),
                    scene.object_layout().clone(),
                    scene.material_layout().clone(),
                ],
            ),
        );

        self.pipeline_manager.create_all_pipelines()
    }

    /// Uploads `plan` and draws one frame.
    ///
    /// `ui_callback` records the debug UI into the frame's encoder after the
    /// scene pass. A lost or outdated surface is reconfigured and the frame
    /// skipped; any other surface failure is returned.
    pub fn render_frame<F>(
        &mut self,
        scene: &mut Scene,
        plan: &FramePlan,
        ui_callback: Option<F>,
    ) -> Result<FrameStatus, ViewerError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring the next surface texture");
                return Ok(FrameStatus::Skipped);
            }
            Err(err) => return Err(ViewerError::SurfaceLost(err)),
        };

        self.scene_ubo.update_content(&self.queue, plan.scene);
        self.skybox.update(&self.queue, plan.skybox);
        scene.update_transforms(&self.queue, &plan.object_transforms);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(plan.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(MODEL_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.scene_bindings.bind_group(), &[]);
                scene.draw(&mut render_pass);
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SKYBOX_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                self.skybox.draw(&mut render_pass);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(FrameStatus::Presented)
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Aspect ratio of the current surface
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Models: group 0 scene, 1 object, 2 material; nearest fragment wins and
/// writes depth
pub fn model_pipeline_config(
    format: TextureFormat,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
) -> PipelineConfig {
    PipelineConfig::default_with_shader(MODEL_SHADER)
        .with_label("MODEL")
        .with_vertex_layouts(vec![Vertex3D::desc()])
        .with_bind_group_layouts(bind_group_layouts)
        .with_depth_stencil(TextureResource::DEPTH_FORMAT)
        .with_color_format(format, Some(wgpu::BlendState::ALPHA_BLENDING))
}

/// Skybox: drawn from inside the cube at the far plane, so no culling, a
/// `LessEqual` test and no depth writes
pub fn skybox_pipeline_config(
    format: TextureFormat,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
) -> PipelineConfig {
    PipelineConfig::default_with_shader(SKYBOX_SHADER)
        .with_label("SKYBOX")
        .with_vertex_layouts(vec![PositionVertex::desc()])
        .with_bind_group_layouts(bind_group_layouts)
        .with_cull_mode(None)
        .with_depth_stencil(TextureResource::DEPTH_FORMAT)
        .with_depth_state(false, wgpu::CompareFunction::LessEqual)
        .with_color_format(format, Some(wgpu::BlendState::REPLACE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: TextureFormat = TextureFormat::Bgra8Unorm;

    #[test]
    fn test_models_test_less_and_write_depth() {
        let config = model_pipeline_config(FORMAT, Vec::new());
        let depth = config.depth.expect("model depth state");
        assert_eq!(depth.format, TextureResource::DEPTH_FORMAT);
        assert_eq!(depth.compare, wgpu::CompareFunction::Less);
        assert!(depth.write_enabled);
        assert_eq!(config.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(config.shader, MODEL_SHADER);
    }

    #[test]
    fn test_skybox_draws_at_far_plane_without_depth_writes() {
        let config = model_pipeline_config(FORMAT, Vec::new());
        let sky = skybox_pipeline_config(FORMAT, Vec::new());
        let depth = sky.depth.expect("skybox depth state");
        assert_eq!(depth.format, TextureResource::DEPTH_FORMAT);
        assert_eq!(depth.compare, wgpu::CompareFunction::LessEqual);
        assert!(!depth.write_enabled);
        assert_eq!(sky.cull_mode, None);
        assert_eq!(sky.shader, SKYBOX_SHADER);
        assert_ne!(config.shader, sky.shader);
    }
}
