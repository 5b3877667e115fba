//! Per-frame scene uniforms shared by every model draw
//!
//! Camera matrices, the eye position and all light values live in one uniform
//! buffer bound at group 0 of the model pipeline. The layout MUST match the
//! `Scene` struct in `model_lighting.wgsl`.

use cgmath::{Matrix4, Vector3};

use crate::{
    gfx::{
        camera::convert_matrix4_to_array,
        lighting::{DirectionalLight, FrameLights, PointLight, POINT_LIGHT_COUNT},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

fn vec4(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniform {
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl From<&DirectionalLight> for DirectionalLightUniform {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction: vec4(light.direction, 0.0),
            ambient: vec4(light.ambient, 0.0),
            diffuse: vec4(light.diffuse, 0.0),
            specular: vec4(light.specular, 0.0),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    /// constant, linear, quadratic, unused
    attenuation: [f32; 4],
}

impl From<&PointLight> for PointLightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: vec4(light.position, 1.0),
            ambient: vec4(light.ambient, 0.0),
            diffuse: vec4(light.diffuse, 0.0),
            specular: vec4(light.specular, 0.0),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_position: [f32; 4],
    dir_light: DirectionalLightUniform,
    point_lights: [PointLightUniform; POINT_LIGHT_COUNT],
    light_colors: [[f32; 4]; POINT_LIGHT_COUNT],
    /// x = shininess
    material: [f32; 4],
}
// 64 + 64 + 16 + 64 + 2*80 + 2*16 + 16 = 416 bytes

impl SceneUniform {
    pub fn new(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        view_position: Vector3<f32>,
        lights: &FrameLights,
    ) -> Self {
        Self {
            view: convert_matrix4_to_array(view),
            projection: convert_matrix4_to_array(projection),
            view_position: vec4(view_position, 1.0),
            dir_light: (&lights.directional).into(),
            point_lights: [
                (&lights.point_lights[0]).into(),
                (&lights.point_lights[1]).into(),
            ],
            light_colors: [vec4(lights.colors[0], 1.0), vec4(lights.colors[1], 1.0)],
            material: [lights.shininess, 0.0, 0.0, 0.0],
        }
    }

    pub fn view(&self) -> [[f32; 4]; 4] {
        self.view
    }

    pub fn projection(&self) -> [[f32; 4]; 4] {
        self.projection
    }

    pub fn point_light_position(&self, slot: usize) -> [f32; 3] {
        let p = self.point_lights[slot].position;
        [p[0], p[1], p[2]]
    }

    pub fn point_light_attenuation(&self, slot: usize) -> [f32; 3] {
        let a = self.point_lights[slot].attenuation;
        [a[0], a[1], a[2]]
    }
}

pub type SceneUBO = UniformBuffer<SceneUniform>;

/// Bind group for the scene uniform (group 0 of the model pipeline)
pub struct SceneBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl SceneBindings {
    pub fn new(device: &wgpu::Device, ubo: &SceneUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Scene Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Scene Bind Group");

        SceneBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn test_scene_uniform_matches_shader_size() {
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 80);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 416);
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }

    #[test]
    fn test_scene_uniform_packs_lights() {
        let lights = FrameLights::default();
        let uniform = SceneUniform::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Vector3::new(0.0, 0.0, 3.0),
            &lights,
        );

        assert_eq!(uniform.point_light_position(0), [-9.0, 2.0, 22.0]);
        assert_eq!(uniform.point_light_attenuation(1), [0.8, 0.01, 0.001]);
        assert_eq!(uniform.view_position, [0.0, 0.0, 3.0, 1.0]);
        assert_eq!(uniform.material[0], 32.0);
        assert_eq!(uniform.light_colors[1], [0.5, 0.0, 1.0, 1.0]);
        assert_eq!(uniform.dir_light.direction, [0.2, -0.7, 0.2, 0.0]);
    }
}
