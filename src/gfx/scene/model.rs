//! CPU-side model loading
//!
//! Reads `.obj` (with its MTL) through `tobj` and `.gltf`/`.glb` through the
//! `gltf` crate into plain vertex/index/material data. Nothing here needs a
//! GPU; [`Model::upload`](super::object::Model::upload) turns the result into
//! buffers and bind groups.

use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

use crate::{error::ViewerError, gfx::camera::camera_utils::normal_matrix};

use super::vertex::Vertex3D;

pub struct MaterialData {
    pub name: String,
    pub diffuse: Option<RgbaImage>,
    pub specular: Option<RgbaImage>,
}

pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`]; `None` draws with the fallback material
    pub material: Option<usize>,
}

pub struct ModelData {
    pub path: PathBuf,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    /// Loads a model, choosing the reader from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ViewerError::model(path, "file not found"));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let model = match extension.as_deref() {
            Some("obj") => load_obj(path)?,
            Some("gltf") | Some("glb") => load_gltf(path)?,
            _ => return Err(ViewerError::model(path, "unsupported model format")),
        };

        info!(
            "Loaded {} ({} meshes, {} vertices, {} materials)",
            path.display(),
            model.meshes.len(),
            model.vertex_count(),
            model.materials.len()
        );
        Ok(model)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.indices.len() / 3).sum()
    }
}

/// Decodes an image file to RGBA8, logging and skipping failures
pub fn load_texture(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(image) => Some(image.to_rgba8()),
        Err(source) => {
            let err = ViewerError::Texture {
                path: path.to_path_buf(),
                source,
            };
            warn!("{}", err);
            None
        }
    }
}

fn load_obj(path: &Path) -> Result<ModelData, ViewerError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|err| ViewerError::model(path, err))?;

    let materials = materials.unwrap_or_else(|err| {
        warn!("No usable MTL for {}: {}", path.display(), err);
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let resolve = |texture: &Option<String>| {
        texture
            .as_deref()
            .filter(|name| !name.is_empty())
            .and_then(|name| load_texture(&base_dir.join(name.replace('\\', "/"))))
    };

    let materials = materials
        .iter()
        .map(|mtl| MaterialData {
            name: mtl.name.clone(),
            diffuse: resolve(&mtl.diffuse_texture),
            specular: resolve(&mtl.specular_texture),
        })
        .collect();

    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let vertex_count = mesh.positions.len() / 3;

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
            } else {
                debug!("Computing normals for '{}'", model.name);
                calculate_vertex_normals(&mesh.positions, &mesh.indices)
            };
            let has_tex_coords = mesh.texcoords.len() == vertex_count * 2;

            let vertices = (0..vertex_count)
                .map(|i| Vertex3D {
                    position: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                    // OBJ texture space starts bottom-left
                    tex_coords: if has_tex_coords {
                        [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                    } else {
                        [0.0, 0.0]
                    },
                })
                .collect();

            MeshData {
                name: model.name,
                vertices,
                indices: mesh.indices,
                material: mesh.material_id,
            }
        })
        .collect();

    Ok(ModelData {
        path: path.to_path_buf(),
        meshes,
        materials,
    })
}

fn load_gltf(path: &Path) -> Result<ModelData, ViewerError> {
    let (document, buffers, images) =
        gltf::import(path).map_err(|err| ViewerError::model(path, err))?;

    let materials = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            let diffuse = match pbr.base_color_texture() {
                Some(info) => images
                    .get(info.texture().source().index())
                    .and_then(gltf_image_to_rgba),
                None => Some(solid_pixel(pbr.base_color_factor())),
            };
            MaterialData {
                name: material.name().unwrap_or("unnamed").to_string(),
                diffuse,
                specular: None,
            }
        })
        .collect();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::model(path, "document has no scene"))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(path, &node, Matrix4::identity(), &buffers, &mut meshes)?;
    }

    Ok(ModelData {
        path: path.to_path_buf(),
        meshes,
        materials,
    })
}

/// Flattens a node subtree, baking each node's world transform into its vertices
fn collect_node(
    path: &Path,
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    meshes: &mut Vec<MeshData>,
) -> Result<(), ViewerError> {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed").to_string();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!("Skipping non-triangle primitive in '{}'", name);
                continue;
            }
            meshes.push(read_primitive(path, &name, &primitive, world, buffers)?);
        }
    }

    for child in node.children() {
        collect_node(path, &child, world, buffers, meshes)?;
    }
    Ok(())
}

fn read_primitive(
    path: &Path,
    name: &str,
    primitive: &gltf::Primitive,
    world: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, ViewerError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| ViewerError::model(path, format!("mesh '{}' has no positions", name)))?
        .collect();

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => {
            let flat: Vec<f32> = positions.iter().flatten().copied().collect();
            calculate_vertex_normals(&flat, &indices)
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect()
        }
    };

    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect())
        .unwrap_or_default();

    let normal_world = normal_matrix(world);
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let position = world * Vector4::new(p[0], p[1], p[2], 1.0);
            let n = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
            let normal = (normal_world * Vector4::new(n[0], n[1], n[2], 0.0)).truncate();
            let normal = if normal.magnitude2() > 0.0 {
                normal.normalize()
            } else {
                Vector3::unit_y()
            };
            Vertex3D {
                position: [position.x, position.y, position.z],
                normal: normal.into(),
                tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            }
        })
        .collect();

    Ok(MeshData {
        name: name.to_string(),
        vertices,
        indices,
        material: primitive.material().index(),
    })
}

fn solid_pixel(color: [f32; 4]) -> RgbaImage {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_pixel(
        1,
        1,
        Rgba([channel(color[0]), channel(color[1]), channel(color[2]), channel(color[3])]),
    )
}

fn gltf_image_to_rgba(image: &gltf::image::Data) -> Option<RgbaImage> {
    use gltf::image::Format;

    let pixels = &image.pixels;
    let rgba: Vec<u8> = match image.format {
        Format::R8G8B8A8 => pixels.clone(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&p| [p, p, p, 255]).collect(),
        other => {
            warn!("Unsupported embedded image format {:?}", other);
            return None;
        }
    };
    RgbaImage::from_raw(image.width, image.height, rgba)
}

/// Averages adjacent face normals per vertex; `positions` is flat xyz
pub fn calculate_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); vertex_count];
    let vertex = |i: usize| {
        Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
    };

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let (v0, v1, v2) = (vertex(i0), vertex(i1), vertex(i2));
        let face_normal = (v1 - v0).cross(v2 - v0);
        for i in [i0, i1, i2] {
            sums[i] += face_normal;
        }
    }

    sums.into_iter()
        .flat_map(|sum| {
            let normal = if sum.magnitude2() > 0.0 {
                sum.normalize()
            } else {
                Vector3::unit_y()
            };
            [normal.x, normal.y, normal.z]
        })
        .collect()
}
