//! Cube-mapped skybox
//!
//! A unit cube drawn around the camera after the scene. The vertex shader
//! pins every fragment to the far plane, so with a `LessEqual` depth test and
//! no depth writes the sky only shows where nothing else was drawn.

use std::path::Path;

use cgmath::Matrix4;
use image::{imageops, RgbaImage};
use log::info;
use wgpu::util::DeviceExt;

use crate::{
    gfx::{
        camera::convert_matrix4_to_array,
        resources::texture_resource::{TextureResource, CUBE_FACES},
        scene::{model::load_texture, vertex::PositionVertex},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Face image names in cube-map layer order.
///
/// Layer 0 holds `left.png`, layer 1 `right.png` and so on; the sky art is
/// authored for exactly this assignment.
pub const CUBE_FACE_FILES: [&str; CUBE_FACES] = [
    "left.png",
    "right.png",
    "bottom.png",
    "top.png",
    "back.png",
    "front.png",
];

const SKYBOX_VERTEX_COUNT: usize = 36;

#[rustfmt::skip]
pub const SKYBOX_VERTICES: [PositionVertex; SKYBOX_VERTEX_COUNT] = [
    PositionVertex { position: [-1.0,  1.0, -1.0] },
    PositionVertex { position: [-1.0, -1.0, -1.0] },
    PositionVertex { position: [ 1.0, -1.0, -1.0] },
    PositionVertex { position: [ 1.0, -1.0, -1.0] },
    PositionVertex { position: [ 1.0,  1.0, -1.0] },
    PositionVertex { position: [-1.0,  1.0, -1.0] },

    PositionVertex { position: [-1.0, -1.0,  1.0] },
    PositionVertex { position: [-1.0, -1.0, -1.0] },
    PositionVertex { position: [-1.0,  1.0, -1.0] },
    PositionVertex { position: [-1.0,  1.0, -1.0] },
    PositionVertex { position: [-1.0,  1.0,  1.0] },
    PositionVertex { position: [-1.0, -1.0,  1.0] },

    PositionVertex { position: [ 1.0, -1.0, -1.0] },
    PositionVertex { position: [ 1.0, -1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0, -1.0] },
    PositionVertex { position: [ 1.0, -1.0, -1.0] },

    PositionVertex { position: [-1.0, -1.0,  1.0] },
    PositionVertex { position: [-1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0, -1.0,  1.0] },
    PositionVertex { position: [-1.0, -1.0,  1.0] },

    PositionVertex { position: [-1.0,  1.0, -1.0] },
    PositionVertex { position: [ 1.0,  1.0, -1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [ 1.0,  1.0,  1.0] },
    PositionVertex { position: [-1.0,  1.0,  1.0] },
    PositionVertex { position: [-1.0,  1.0, -1.0] },

    PositionVertex { position: [-1.0, -1.0, -1.0] },
    PositionVertex { position: [-1.0, -1.0,  1.0] },
    PositionVertex { position: [ 1.0, -1.0, -1.0] },
    PositionVertex { position: [ 1.0, -1.0, -1.0] },
    PositionVertex { position: [-1.0, -1.0,  1.0] },
    PositionVertex { position: [ 1.0, -1.0,  1.0] },
];

/// Loads the six faces from `dir` in [`CUBE_FACE_FILES`] order.
///
/// Each face is flipped vertically before upload.
/// A face that is missing or fails to decode is logged and left as `None`.
pub fn load_cube_faces(dir: &Path) -> [Option<RgbaImage>; CUBE_FACES] {
    let faces = CUBE_FACE_FILES
        .map(|file| load_texture(&dir.join(file)).map(|face| imageops::flip_vertical(&face)));
    let loaded = faces.iter().filter(|face| face.is_some()).count();
    info!(
        "Loaded {}/{} skybox faces from {}",
        loaded,
        CUBE_FACES,
        dir.display()
    );
    faces
}

/// Skybox uniform, matching `Skybox` in `skybox.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyboxUniform {
    /// Camera view with the translation removed
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl SkyboxUniform {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        Self {
            view: convert_matrix4_to_array(view),
            projection: convert_matrix4_to_array(projection),
        }
    }

    pub fn view(&self) -> [[f32; 4]; 4] {
        self.view
    }

    pub fn projection(&self) -> [[f32; 4]; 4] {
        self.projection
    }
}

/// GPU side of the skybox: cube vertices, cube map and uniform
pub struct SkyboxRenderer {
    vertex_buffer: wgpu::Buffer,
    uniform: UniformBuffer<SkyboxUniform>,
    layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    _cube_map: TextureResource,
}

impl SkyboxRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[Option<RgbaImage>; CUBE_FACES],
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Vertex Buffer"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let cube_map = TextureResource::create_cube_map(device, queue, faces, "Skybox Cube Map");
        let uniform = UniformBuffer::new(device);

        let layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Skybox Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&layout)
            .resource(uniform.binding_resource())
            .texture(&cube_map.view)
            .sampler(&cube_map.sampler)
            .create(device, "Skybox Bind Group");

        Self {
            vertex_buffer,
            uniform,
            layout,
            bind_group,
            _cube_map: cube_map,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn update(&mut self, queue: &wgpu::Queue, uniform: SkyboxUniform) {
        self.uniform.update_content(queue, uniform);
    }

    /// Draws the cube; the skybox pipeline must already be set
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..SKYBOX_VERTEX_COUNT as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_face_files_follow_layer_order() {
        assert_eq!(CUBE_FACE_FILES[0], "left.png");
        assert_eq!(CUBE_FACE_FILES[1], "right.png");
        assert_eq!(CUBE_FACE_FILES[2], "bottom.png");
        assert_eq!(CUBE_FACE_FILES[3], "top.png");
        assert_eq!(CUBE_FACE_FILES[4], "back.png");
        assert_eq!(CUBE_FACE_FILES[5], "front.png");
    }

    #[test]
    fn test_cube_vertices_span_unit_cube() {
        assert_eq!(SKYBOX_VERTICES.len(), 36);
        assert!(SKYBOX_VERTICES
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 1.0)));
        // Each of the six faces lies on one axis-aligned plane
        for face in SKYBOX_VERTICES.chunks(6) {
            let shared = (0..3).any(|axis| {
                face.iter()
                    .all(|v| v.position[axis] == face[0].position[axis])
            });
            assert!(shared);
        }
    }

    #[test]
    fn test_missing_faces_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut top = RgbaImage::new(2, 2);
        top.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        top.save(dir.path().join("top.png")).expect("write face");

        let faces = load_cube_faces(dir.path());
        let present: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|_| i))
            .collect();
        assert_eq!(present, vec![3]);

        // Loaded faces are flipped vertically
        let top = faces[3].as_ref().expect("top face");
        assert_eq!(*top.get_pixel(0, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*top.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_corrupt_face_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("left.png"), b"not a png").expect("write");
        let faces = load_cube_faces(dir.path());
        assert!(faces.iter().all(Option::is_none));
    }
}
