use wgpu::{util::DeviceExt, Device};

use crate::gfx::resources::{Material, MaterialBindings};

use super::model::{MeshData, ModelData};

/// Vertex and index buffers for one mesh
pub struct Mesh {
    pub name: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// Index into the owning model's materials
    material: usize,
}

impl Mesh {
    fn upload(device: &Device, data: &MeshData, material: usize) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            material,
        }
    }
}

/// A loaded model living on the GPU.
///
/// The last material is always the fallback used by meshes that reference no
/// material or an out-of-range one.
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn upload(
        device: &Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
        data: &ModelData,
    ) -> Self {
        let mut materials: Vec<Material> = data
            .materials
            .iter()
            .map(|material| Material::new(device, queue, bindings, material))
            .collect();
        let fallback = materials.len();
        materials.push(Material::fallback(device, queue, bindings));

        let meshes = data
            .meshes
            .iter()
            .filter(|mesh| !mesh.indices.is_empty())
            .map(|mesh| {
                let material = mesh
                    .material
                    .filter(|&index| index < fallback)
                    .unwrap_or(fallback);
                Mesh::upload(device, mesh, material)
            })
            .collect();

        Self { meshes, materials }
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    /// Draws every mesh, binding its material at `material_group`
    fn draw_model(&mut self, model: &'a Model, material_group: u32);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_model(&mut self, model: &'b Model, material_group: u32) {
        for mesh in &model.meshes {
            let Some(material) = model.materials.get(mesh.material) else {
                continue;
            };
            self.set_bind_group(material_group, material.bind_group(), &[]);
            self.draw_mesh(mesh);
        }
    }
}
