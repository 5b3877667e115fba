use std::path::Path;

use cgmath::Matrix4;
use log::info;
use wgpu::Device;

use crate::{
    error::ViewerError,
    gfx::{
        camera::{camera_utils::normal_matrix, convert_matrix4_to_array},
        resources::MaterialBindings,
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::{
    catalog::SceneCatalog,
    model::ModelData,
    object::{DrawModel, Model},
};

/// Bind group slot of the per-object transform
pub const OBJECT_GROUP: u32 = 1;
/// Bind group slot of each mesh's material
pub const MATERIAL_GROUP: u32 = 2;

/// Per-object uniform, matching `Object` in `model_lighting.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`
    normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>) -> Self {
        Self {
            model: convert_matrix4_to_array(model),
            normal: convert_matrix4_to_array(normal_matrix(model)),
        }
    }
}

/// One catalog entry's model with its transform uniform
pub struct SceneObject {
    pub id: &'static str,
    pub model: Model,
    transform: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

/// Every catalog model on the GPU, in draw order
pub struct Scene {
    objects: Vec<SceneObject>,
    object_layout: BindGroupLayoutWithDesc,
    material_bindings: MaterialBindings,
}

impl Scene {
    /// Loads and uploads every catalog model; any failure aborts startup
    pub fn load(
        device: &Device,
        queue: &wgpu::Queue,
        catalog: &SceneCatalog,
        resource_root: &Path,
    ) -> Result<Self, ViewerError> {
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Object Bind Group Layout");
        let material_bindings = MaterialBindings::new(device);

        let mut objects = Vec::with_capacity(catalog.len());
        for (index, entry) in catalog.entries().iter().enumerate() {
            info!(
                "Loading model {}/{}: {}",
                index + 1,
                catalog.len(),
                entry.id
            );
            let data = ModelData::load(resource_root.join(&entry.model_path))?;
            let model = Model::upload(device, queue, &material_bindings, &data);

            let initial = ObjectUniform::new(entry.model_matrix(&entry.default_transform, 0.0));
            let transform = UniformBuffer::new_with_data(device, &initial);
            let bind_group = BindGroupBuilder::new(&object_layout)
                .resource(transform.binding_resource())
                .create(device, &format!("{} Object Bind Group", entry.id));

            objects.push(SceneObject {
                id: entry.id,
                model,
                transform,
                bind_group,
            });
        }

        Ok(Self {
            objects,
            object_layout,
            material_bindings,
        })
    }

    /// Uploads one model matrix per object, in catalog order
    pub fn update_transforms(&mut self, queue: &wgpu::Queue, transforms: &[Matrix4<f32>]) {
        for (object, model) in self.objects.iter_mut().zip(transforms) {
            object.transform.update_content(queue, ObjectUniform::new(*model));
        }
    }

    /// Issues every object's draws; the scene bind group must already be set
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        for object in &self.objects {
            render_pass.set_bind_group(OBJECT_GROUP, &object.bind_group, &[]);
            render_pass.draw_model(&object.model, MATERIAL_GROUP);
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout.layout
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        self.material_bindings.bind_group_layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_object_uniform_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }

    #[test]
    fn test_object_uniform_normal_ignores_translation() {
        let uniform = ObjectUniform::new(Matrix4::from_translation(Vector3::new(3.0, 4.0, 5.0)));
        assert_eq!(uniform.model[3], [3.0, 4.0, 5.0, 1.0]);
        // Normals are transformed with w = 0, so only the upper 3x3 matters
        assert_eq!(uniform.normal[0][..3], [1.0, 0.0, 0.0]);
        assert_eq!(uniform.normal[1][..3], [0.0, 1.0, 0.0]);
        assert_eq!(uniform.normal[2][..3], [0.0, 0.0, 1.0]);
    }
}
