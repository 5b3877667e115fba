//! Scene lighting
//!
//! One fixed directional light plus two point-light slots that share a single
//! photometric profile. Slot 0 sits next to the candle; slot 1 rides along
//! with the bobbing ghost.

use cgmath::{Vector3, Zero};

use crate::gfx::scene::catalog::bob_offset;

pub const POINT_LIGHT_COUNT: usize = 2;

/// Position of the static point light (slot 0)
pub const STATIC_LIGHT_POSITION: Vector3<f32> = Vector3::new(-9.0, 2.0, 22.0);

/// Per-slot tints, multiplied into each point light's contribution
pub const POINT_LIGHT_COLORS: [Vector3<f32>; POINT_LIGHT_COUNT] = [
    Vector3::new(1.0, 0.7, 0.0),
    Vector3::new(0.5, 0.0, 1.0),
];

/// Vertical amplitude of the animated light, matching the ghost it follows
pub const ANIMATED_LIGHT_AMPLITUDE: f32 = 2.0;

pub const MATERIAL_SHININESS: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.2, -0.7, 0.2),
            ambient: Vector3::new(0.25, 0.25, 0.25),
            diffuse: Vector3::new(0.35, 0.35, 0.35),
            specular: Vector3::new(0.45, 0.45, 0.45),
        }
    }
}

/// Photometric profile of a point light with attenuation
/// `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vector3::new(4.0, 4.0, 0.0),
            ambient: Vector3::new(0.15, 0.15, 0.15),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(1.0, 1.0, 1.0),
            constant: 0.8,
            linear: 0.01,
            quadratic: 0.001,
        }
    }
}

impl PointLight {
    /// Same profile placed at `position`
    pub fn at(&self, position: Vector3<f32>) -> Self {
        Self { position, ..*self }
    }
}

/// Position of the animated light: `anchor + (0, 2cos(t), 0)`.
///
/// Depends on the absolute time only, so any frame can be reproduced.
pub fn animated_light_position(anchor: Vector3<f32>, time: f32) -> Vector3<f32> {
    anchor + bob_offset(ANIMATED_LIGHT_AMPLITUDE, time)
}

/// Every light value the scene shader needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLights {
    pub directional: DirectionalLight,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    pub colors: [Vector3<f32>; POINT_LIGHT_COUNT],
    pub shininess: f32,
}

impl FrameLights {
    pub fn compute(profile: &PointLight, anchor: Vector3<f32>, time: f32) -> Self {
        Self {
            directional: DirectionalLight::default(),
            point_lights: [
                profile.at(STATIC_LIGHT_POSITION),
                profile.at(animated_light_position(anchor, time)),
            ],
            colors: POINT_LIGHT_COLORS,
            shininess: MATERIAL_SHININESS,
        }
    }
}

impl Default for FrameLights {
    fn default() -> Self {
        Self::compute(&PointLight::default(), Vector3::zero(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use std::f32::consts::PI;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_animated_light_at_time_zero_is_above_anchor() {
        let ghost = Vector3::new(-5.0, 9.5, -8.0);
        let position = animated_light_position(ghost, 0.0);
        assert!((position - (ghost + Vector3::new(0.0, 2.0, 0.0))).magnitude() < EPS);
    }

    #[test]
    fn test_animated_light_at_time_pi_is_below_anchor() {
        let ghost = Vector3::new(-5.0, 9.5, -8.0);
        let position = animated_light_position(ghost, PI);
        assert!((position - (ghost + Vector3::new(0.0, -2.0, 0.0))).magnitude() < EPS);
    }

    #[test]
    fn test_slots_share_profile_but_not_position() {
        let profile = PointLight {
            constant: 0.3,
            ..PointLight::default()
        };
        let lights = FrameLights::compute(&profile, Vector3::new(1.0, 1.0, 1.0), 0.0);

        assert_eq!(lights.point_lights[0].position, STATIC_LIGHT_POSITION);
        assert_eq!(lights.point_lights[1].position, Vector3::new(1.0, 3.0, 1.0));
        for light in &lights.point_lights {
            assert_eq!(light.constant, 0.3);
            assert_eq!(light.ambient, profile.ambient);
            assert_eq!(light.quadratic, profile.quadratic);
        }
        assert_eq!(lights.colors[0], Vector3::new(1.0, 0.7, 0.0));
        assert_eq!(lights.colors[1], Vector3::new(0.5, 0.0, 1.0));
        assert_eq!(lights.shininess, 32.0);
    }

    #[test]
    fn test_directional_light_is_fixed() {
        let a = FrameLights::compute(&PointLight::default(), Vector3::zero(), 0.0);
        let b = FrameLights::compute(&PointLight::default(), Vector3::zero(), 12.5);
        assert_eq!(a.directional, b.directional);
        assert_eq!(a.directional.direction, Vector3::new(0.2, -0.7, 0.2));
    }
}
