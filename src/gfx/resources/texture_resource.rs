//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views and samplers: the depth
//! buffer, material textures and the skybox cube map.

use std::borrow::Cow;

use image::{imageops, RgbaImage};
use log::warn;

/// Number of layers in a cube map
pub const CUBE_FACES: usize = 6;

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the viewer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Creates a repeating 2D texture from raw RGBA8 data
    pub fn create_from_rgba_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads `image`, downscaling it first if it exceeds the device limit
    pub fn create_from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let image = fit_to_limit(image, max_dimension);
        if let Cow::Owned(scaled) = &image {
            warn!(
                "Texture {} exceeds {} px, downscaled to {:?}",
                label,
                max_dimension,
                scaled.dimensions()
            );
        }
        let (width, height) = image.dimensions();
        Self::create_from_rgba_data(device, queue, image.as_raw(), width, height, label)
    }

    /// 1x1 texture of a single colour, used when a material lacks a map
    pub fn create_solid_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Self {
        Self::create_from_rgba_data(device, queue, &rgba, 1, 1, label)
    }

    /// Builds a cube map from faces in layer order +X, -X, +Y, -Y, +Z, -Z.
    ///
    /// Faces rejected by [`prepare_cube_faces`] stay zero-filled.
    pub fn create_cube_map(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[Option<RgbaImage>; CUBE_FACES],
        label: &str,
    ) -> Self {
        let (side, layers) = prepare_cube_faces(faces, device.limits().max_texture_dimension_2d);
        let size = wgpu::Extent3d {
            width: side,
            height: side,
            depth_or_array_layers: CUBE_FACES as u32,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in layers.iter().enumerate() {
            let Some(face) = face else { continue };
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * side),
                    rows_per_image: Some(side),
                },
                wgpu::Extent3d {
                    width: side,
                    height: side,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{} View", label)),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Downscales `image` so neither side exceeds `max_dimension`, keeping its
/// aspect ratio. Images within the limit are borrowed unchanged.
pub fn fit_to_limit(image: &RgbaImage, max_dimension: u32) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension {
        return Cow::Borrowed(image);
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let scaled_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    Cow::Owned(imageops::resize(
        image,
        scaled_width,
        scaled_height,
        imageops::FilterType::Triangle,
    ))
}

/// Picks the cube side and the faces that can be uploaded at it.
///
/// A cube view needs square layers of one size, so non-square faces and
/// faces whose side differs from the first usable one are logged and
/// dropped. The side is clamped to `max_dimension`, downscaling faces that
/// exceed it. With no usable face the cube is 1x1.
pub fn prepare_cube_faces(
    faces: &[Option<RgbaImage>; CUBE_FACES],
    max_dimension: u32,
) -> (u32, [Option<Cow<'_, RgbaImage>>; CUBE_FACES]) {
    let source_side = faces
        .iter()
        .flatten()
        .map(|face| face.dimensions())
        .find(|(width, height)| width == height)
        .map(|(width, _)| width);
    let Some(source_side) = source_side else {
        for (layer, face) in faces.iter().enumerate() {
            if let Some(face) = face {
                warn!("Cube map face {} is {:?}, not square; skipping", layer, face.dimensions());
            }
        }
        return (1, Default::default());
    };
    let side = source_side.min(max_dimension);

    let mut layer = 0;
    let layers = faces.each_ref().map(|face| {
        let index = layer;
        layer += 1;
        let face = face.as_ref()?;
        let (width, height) = face.dimensions();
        if width != height {
            warn!("Cube map face {} is {:?}, not square; skipping", index, (width, height));
            return None;
        }
        if width != source_side {
            warn!(
                "Cube map face {} is {:?}, expected {:?}; skipping",
                index,
                (width, height),
                (source_side, source_side)
            );
            return None;
        }
        Some(fit_to_limit(face, side))
    });
    (side, layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present_layers(layers: &[Option<Cow<'_, RgbaImage>>; CUBE_FACES]) -> Vec<usize> {
        layers
            .iter()
            .enumerate()
            .filter_map(|(i, layer)| layer.as_ref().map(|_| i))
            .collect()
    }

    #[test]
    fn test_cube_side_uses_first_present_face() {
        let mut faces: [Option<RgbaImage>; CUBE_FACES] = Default::default();
        let (side, layers) = prepare_cube_faces(&faces, 4096);
        assert_eq!(side, 1);
        assert!(present_layers(&layers).is_empty());

        faces[2] = Some(RgbaImage::new(64, 64));
        faces[4] = Some(RgbaImage::new(32, 32));
        let (side, layers) = prepare_cube_faces(&faces, 4096);
        assert_eq!(side, 64);
        assert_eq!(present_layers(&layers), vec![2]);
    }

    #[test]
    fn test_non_square_cube_face_is_skipped() {
        let mut faces: [Option<RgbaImage>; CUBE_FACES] = Default::default();
        faces[0] = Some(RgbaImage::new(64, 48));
        faces[1] = Some(RgbaImage::new(32, 32));
        faces[3] = Some(RgbaImage::new(32, 32));

        let (side, layers) = prepare_cube_faces(&faces, 4096);
        assert_eq!(side, 32);
        assert_eq!(present_layers(&layers), vec![1, 3]);

        let mut only_wide: [Option<RgbaImage>; CUBE_FACES] = Default::default();
        only_wide[5] = Some(RgbaImage::new(8, 4));
        let (side, layers) = prepare_cube_faces(&only_wide, 4096);
        assert_eq!(side, 1);
        assert!(present_layers(&layers).is_empty());
    }

    #[test]
    fn test_oversized_cube_faces_are_downscaled() {
        let mut faces: [Option<RgbaImage>; CUBE_FACES] = Default::default();
        faces[0] = Some(RgbaImage::new(64, 64));
        faces[4] = Some(RgbaImage::new(64, 64));

        let (side, layers) = prepare_cube_faces(&faces, 16);
        assert_eq!(side, 16);
        for layer in layers.iter().flatten() {
            assert_eq!(layer.dimensions(), (16, 16));
        }
    }

    #[test]
    fn test_fit_to_limit_keeps_aspect() {
        let small = RgbaImage::new(100, 50);
        assert!(matches!(fit_to_limit(&small, 100), Cow::Borrowed(_)));

        let wide = RgbaImage::new(800, 200);
        let fitted = fit_to_limit(&wide, 400);
        assert!(matches!(fitted, Cow::Owned(_)));
        assert_eq!(fitted.dimensions(), (400, 100));

        let sliver = RgbaImage::new(10000, 1);
        assert_eq!(fit_to_limit(&sliver, 100).dimensions(), (100, 1));
    }
}
