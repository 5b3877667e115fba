//! Render pipeline management for wgpu
//!
//! Shaders are registered by name, pipelines by name plus a [`PipelineConfig`].
//! Everything is created eagerly at startup so that a broken shader stops the
//! viewer before the first frame instead of silently drawing nothing.

use std::{collections::HashMap, sync::Arc};

use log::{debug, info};
use wgpu::*;

use crate::error::ViewerError;

/// Depth test settings for one pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConfig {
    pub format: TextureFormat,
    pub write_enabled: bool,
    pub compare: CompareFunction,
}

impl DepthConfig {
    /// Standard opaque geometry: depth written, nearer fragments win
    pub fn opaque(format: TextureFormat) -> Self {
        Self {
            format,
            write_enabled: true,
            compare: CompareFunction::Less,
        }
    }
}

/// Configuration for creating a render pipeline
///
/// Defines all parameters needed to create a wgpu render pipeline,
/// including shaders, vertex layouts, bind group layouts, and render state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_layouts: Vec<VertexBufferLayout<'static>>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth: Option<DepthConfig>,
    pub multisample: MultisampleState,
    pub color_targets: Vec<Option<ColorTargetState>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "shader.wgsl".to_string(),
            bind_group_layouts: Vec::new(),
            vertex_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth: None,
            multisample: MultisampleState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }
    }
}

impl PipelineConfig {
    /// Creates a new config with a specific shader
    pub fn default_with_shader(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Sets all bind group layouts at once, in group order
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_vertex_layouts(mut self, layouts: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_layouts = layouts;
        self
    }

    /// Enables depth testing against an attachment of `format`
    pub fn with_depth_stencil(mut self, format: TextureFormat) -> Self {
        self.depth = Some(DepthConfig::opaque(format));
        self
    }

    /// Overrides the depth write flag and compare function.
    ///
    /// Has no effect unless depth testing was enabled first.
    pub fn with_depth_state(mut self, write_enabled: bool, compare: CompareFunction) -> Self {
        if let Some(depth) = self.depth.as_mut() {
            depth.write_enabled = write_enabled;
            depth.compare = compare;
        }
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    /// Single colour target of `format` with the given blend state
    pub fn with_color_format(self, format: TextureFormat, blend: Option<BlendState>) -> Self {
        self.with_color_targets(vec![Some(ColorTargetState {
            format,
            blend,
            write_mask: ColorWrites::ALL,
        })])
    }
}

/// Owns every shader module and render pipeline, keyed by name
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Registers a pipeline configuration without creating it
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pending_pipelines.push(name.to_string());
    }

    /// Compiles a WGSL shader module.
    ///
    /// Validation errors are captured in an error scope and returned instead
    /// of reaching the device's uncaptured error handler.
    pub fn load_shader(&mut self, name: &str, source: &str) -> Result<(), ViewerError> {
        self.device.push_error_scope(ErrorFilter::Validation);
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ViewerError::Shader {
                name: name.to_string(),
                reason: error.to_string(),
            });
        }

        debug!("Compiled shader '{}'", name);
        self.shader_modules.insert(name.to_string(), shader_module);
        Ok(())
    }

    /// Returns a pipeline created by [`create_all_pipelines`](Self::create_all_pipelines)
    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Creates all pending pipelines, stopping at the first failure
    pub fn create_all_pipelines(&mut self) -> Result<(), ViewerError> {
        let pending = std::mem::take(&mut self.pending_pipelines);

        for name in pending {
            let Some(config) = self.pipeline_configs.get(&name) else {
                continue;
            };
            let pipeline = self.create_pipeline_from_config(&name, config)?;
            info!("Created pipeline '{}'", name);
            self.pipelines.insert(name, pipeline);
        }

        Ok(())
    }

    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, ViewerError> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| ViewerError::Pipeline {
                name: name.to_string(),
                reason: format!("shader '{}' not loaded", config.shader),
            })?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();

        self.device.push_error_scope(ErrorFilter::Validation);

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        let depth_stencil = config.depth.map(|depth| DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write_enabled,
            depth_compare: depth.compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &config.vertex_layouts,
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &config.color_targets,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: config.multisample,
                multiview: None,
                cache: None,
            });

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(ViewerError::Pipeline {
                name: name.to_string(),
                reason: error.to_string(),
            }),
            None => Ok(pipeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_state_requires_depth_stencil() {
        let config = PipelineConfig::default().with_depth_state(false, CompareFunction::LessEqual);
        assert!(config.depth.is_none());

        let config = PipelineConfig::default()
            .with_depth_stencil(TextureFormat::Depth32Float)
            .with_depth_state(false, CompareFunction::LessEqual);
        assert_eq!(
            config.depth,
            Some(DepthConfig {
                format: TextureFormat::Depth32Float,
                write_enabled: false,
                compare: CompareFunction::LessEqual,
            })
        );
    }

    #[test]
    fn test_color_format_replaces_targets() {
        let config = PipelineConfig::default_with_shader("model")
            .with_color_format(TextureFormat::Rgba8Unorm, Some(BlendState::ALPHA_BLENDING));
        assert_eq!(config.shader, "model");
        assert_eq!(config.color_targets.len(), 1);
        let target = config.color_targets[0].as_ref().map(|t| (t.format, t.blend));
        assert_eq!(
            target,
            Some((TextureFormat::Rgba8Unorm, Some(BlendState::ALPHA_BLENDING)))
        );
    }
}
