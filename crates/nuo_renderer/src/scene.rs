//! Flattened scene buffers shared read-only by every work item.

use nuo_core::{Mesh, Sampler, Texture};
use nuo_math::{Aabb, Vec3};
use thiserror::Error;

use crate::material::{Color, RayTracingMaterial};
use crate::uniforms::SceneBounds;

/// Maximum number of diffuse textures bound to one dispatch.
pub const TEXTURE_BINDINGS_CAP: usize = 6;

/// Scene data that violates the kernels' preconditions.
#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("Index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("Index {index} at position {position} is out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{positions} positions but {materials} materials")]
    VertexCountMismatch { positions: usize, materials: usize },

    #[error("Vertex {vertex} uses diffuse texture {texture} but only {texture_count} are bound")]
    TextureOutOfRange {
        vertex: usize,
        texture: i32,
        texture_count: usize,
    },

    #[error("{count} textures exceed the binding cap of {cap}")]
    TooManyTextures { count: usize, cap: usize },

    #[error("Primitive count {0} does not fit the intersector's index type")]
    TooManyPrimitives(usize),
}

/// Surface description applied to every vertex of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDesc {
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub shininess: f32,
    pub dissolve: f32,
}

impl Default for SurfaceDesc {
    fn default() -> Self {
        Self {
            diffuse_color: Color::splat(0.5),
            specular_color: Color::ZERO,
            shininess: 1.0,
            dissolve: 1.0,
        }
    }
}

impl SurfaceDesc {
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse_color: color,
            ..Default::default()
        }
    }
}

/// Vertex, index, material and texture buffers of a scene.
///
/// Construction validates every precondition the kernels rely on, so the
/// per-ray code can index without checks failing.
#[derive(Debug, Clone)]
pub struct RayTracingScene {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    materials: Vec<RayTracingMaterial>,
    textures: Vec<Texture>,
    bounds: Aabb,
}

impl RayTracingScene {
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        materials: Vec<RayTracingMaterial>,
        textures: Vec<Texture>,
    ) -> Result<Self, SceneError> {
        validate(&positions, &indices, &materials, &textures)?;

        let bounds = Aabb::from_positions(&positions);
        let scene = Self {
            positions,
            indices,
            materials,
            textures,
            bounds,
        };

        if scene.bounds().span <= 0.0 {
            log::warn!("Scene has zero span; shadow rays will have zero length");
        }
        log::info!(
            "Scene: {} triangles, {} vertices, {} textures, span {:.3}",
            scene.triangle_count(),
            scene.positions.len(),
            scene.textures.len(),
            scene.bounds().span
        );

        Ok(scene)
    }

    /// Flatten meshes into one scene, one surface description per mesh.
    pub fn from_meshes(meshes: &[(Mesh, SurfaceDesc)]) -> Result<Self, SceneError> {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut materials = Vec::new();

        for (mesh, surface) in meshes {
            let base = positions.len() as u32;
            positions.extend_from_slice(&mesh.positions);
            indices.extend(mesh.indices.iter().map(|i| i + base));

            for i in 0..mesh.positions.len() {
                let normal = mesh.normals.get(i).copied().unwrap_or(Vec3::Y);
                materials.push(
                    RayTracingMaterial::new(normal, surface.diffuse_color)
                        .with_specular(surface.specular_color, surface.shininess)
                        .with_dissolve(surface.dissolve),
                );
            }
        }

        Self::new(positions, indices, materials, Vec::new())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn materials(&self) -> &[RayTracingMaterial] {
        &self.materials
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> SceneBounds {
        SceneBounds::from(&self.bounds)
    }

    /// Borrowed view handed to the kernels.
    pub fn view(&self, sampler: Sampler) -> SceneView<'_> {
        SceneView {
            index: &self.indices,
            materials: &self.materials,
            textures: &self.textures,
            sampler,
        }
    }
}

/// Read-only scene buffers plus the sampler for one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub index: &'a [u32],
    pub materials: &'a [RayTracingMaterial],
    pub textures: &'a [Texture],
    pub sampler: Sampler,
}

fn validate(
    positions: &[Vec3],
    indices: &[u32],
    materials: &[RayTracingMaterial],
    textures: &[Texture],
) -> Result<(), SceneError> {
    if indices.len() % 3 != 0 {
        return Err(SceneError::IndexCountNotTriangles(indices.len()));
    }
    if indices.len() / 3 > i32::MAX as usize {
        return Err(SceneError::TooManyPrimitives(indices.len() / 3));
    }
    if positions.len() != materials.len() {
        return Err(SceneError::VertexCountMismatch {
            positions: positions.len(),
            materials: materials.len(),
        });
    }
    if textures.len() > TEXTURE_BINDINGS_CAP {
        return Err(SceneError::TooManyTextures {
            count: textures.len(),
            cap: TEXTURE_BINDINGS_CAP,
        });
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= positions.len())
    {
        return Err(SceneError::IndexOutOfRange {
            position,
            index,
            vertex_count: positions.len(),
        });
    }

    if let Some((vertex, material)) = materials
        .iter()
        .enumerate()
        .find(|(_, m)| m.diffuse_tex >= 0 && m.diffuse_tex as usize >= textures.len())
    {
        return Err(SceneError::TextureOutOfRange {
            vertex,
            texture: material.diffuse_tex,
            texture_count: textures.len(),
        });
    }

    Ok(())
}
