//! Model materials
//!
//! A material is a diffuse map, a specular map and a shared sampler bound at
//! group 2 of the model pipeline. Missing maps are replaced by 1x1 textures:
//! white for diffuse, black for specular.

use log::warn;
use wgpu::Device;

use crate::{
    gfx::scene::model::MaterialData,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
    },
};

use super::texture_resource::TextureResource;

pub const FALLBACK_DIFFUSE: [u8; 4] = [255, 255, 255, 255];
pub const FALLBACK_SPECULAR: [u8; 4] = [0, 0, 0, 255];

/// Bind group layout shared by every material
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d()) // diffuse
            .next_binding_fragment(binding_types::texture_2d()) // specular
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        MaterialBindings { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    fn create_bind_group(
        &self,
        device: &Device,
        diffuse: &TextureResource,
        specular: &TextureResource,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .texture(&diffuse.view)
            .texture(&specular.view)
            .sampler(&diffuse.sampler)
            .create(device, label)
    }
}

pub struct Material {
    pub name: String,
    pub diffuse: TextureResource,
    pub specular: TextureResource,
    bind_group: wgpu::BindGroup,
}

impl Material {
    /// Uploads a loaded material, substituting fallbacks for absent maps
    pub fn new(
        device: &Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
        data: &MaterialData,
    ) -> Self {
        let diffuse = match &data.diffuse {
            Some(image) => TextureResource::create_from_image(
                device,
                queue,
                image,
                &format!("{} Diffuse", data.name),
            ),
            None => {
                warn!("Material '{}' has no diffuse map, using white", data.name);
                TextureResource::create_solid_color(device, queue, FALLBACK_DIFFUSE, "Fallback Diffuse")
            }
        };

        let specular = match &data.specular {
            Some(image) => TextureResource::create_from_image(
                device,
                queue,
                image,
                &format!("{} Specular", data.name),
            ),
            None => TextureResource::create_solid_color(
                device,
                queue,
                FALLBACK_SPECULAR,
                "Fallback Specular",
            ),
        };

        Self::from_textures(device, bindings, data.name.clone(), diffuse, specular)
    }

    /// Material for meshes that reference none
    pub fn fallback(device: &Device, queue: &wgpu::Queue, bindings: &MaterialBindings) -> Self {
        let diffuse =
            TextureResource::create_solid_color(device, queue, FALLBACK_DIFFUSE, "Fallback Diffuse");
        let specular = TextureResource::create_solid_color(
            device,
            queue,
            FALLBACK_SPECULAR,
            "Fallback Specular",
        );
        Self::from_textures(device, bindings, "fallback".to_string(), diffuse, specular)
    }

    fn from_textures(
        device: &Device,
        bindings: &MaterialBindings,
        name: String,
        diffuse: TextureResource,
        specular: TextureResource,
    ) -> Self {
        let bind_group =
            bindings.create_bind_group(device, &diffuse, &specular, &format!("{} Material", name));
        Self {
            name,
            diffuse,
            specular,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
