//! Per-vertex ray-tracing materials and their interpolation at a hit.

use bytemuck::{Pod, Zeroable};
use nuo_core::{Sampler, Texture};
use nuo_math::{Vec2, Vec3};

use crate::Intersection;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Material attributes stored per vertex, addressed by the index buffer.
///
/// Every `Vec3` occupies a 16-byte slot so the record matches the GPU's
/// `float3` layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RayTracingMaterial {
    pub tex_coord: Vec3,
    /// Slot in the diffuse texture array; negative when untextured.
    pub diffuse_tex: i32,
    pub diffuse_color: Color,
    _pad0: f32,
    pub specular_color: Color,
    _pad1: f32,
    /// x: shininess, y: dissolve (1 = opaque), z: illumination model
    pub shininess_dissolve_illum: Vec3,
    _pad2: f32,
    pub normal: Vec3,
    _pad3: f32,
}

const _: () = assert!(std::mem::size_of::<RayTracingMaterial>() == 80);

impl RayTracingMaterial {
    /// Untextured, opaque, purely diffuse vertex.
    pub fn new(normal: Vec3, diffuse_color: Color) -> Self {
        Self {
            normal,
            diffuse_color,
            shininess_dissolve_illum: Vec3::new(1.0, 1.0, 0.0),
            ..Self::default()
        }
    }

    /// Builder method to set the specular lobe.
    pub fn with_specular(mut self, color: Color, shininess: f32) -> Self {
        self.specular_color = color;
        self.shininess_dissolve_illum.x = shininess;
        self
    }

    /// Builder method to bind a diffuse texture.
    pub fn with_texture(mut self, diffuse_tex: i32, tex_coord: Vec2) -> Self {
        self.diffuse_tex = diffuse_tex;
        self.tex_coord = tex_coord.extend(0.0);
        self
    }

    /// Builder method to set dissolve (opacity).
    pub fn with_dissolve(mut self, dissolve: f32) -> Self {
        self.shininess_dissolve_illum.y = dissolve.clamp(0.0, 1.0);
        self
    }

    pub fn shininess(&self) -> f32 {
        self.shininess_dissolve_illum.x
    }

    pub fn dissolve(&self) -> f32 {
        self.shininess_dissolve_illum.y
    }

    pub fn is_translucent(&self) -> bool {
        self.dissolve() < 1.0
    }
}

impl Default for RayTracingMaterial {
    fn default() -> Self {
        Self {
            diffuse_tex: -1,
            ..Zeroable::zeroed()
        }
    }
}

/// Shading attributes resolved at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedMaterial {
    /// Unit length.
    pub normal: Vec3,
    pub specular_color: Color,
    pub shininess: f32,
}

/// The three vertex materials of the hit triangle.
///
/// Panics if the primitive index or the index buffer entries are out of
/// range; the intersector guarantees both for hits.
#[inline]
fn hit_vertices<'a>(
    materials: &'a [RayTracingMaterial],
    index: &[u32],
    intersection: &Intersection,
) -> [&'a RayTracingMaterial; 3] {
    debug_assert!(intersection.is_hit(), "interpolating a missed ray");

    let triangle = intersection.primitive_index as usize * 3;
    let face = &index[triangle..triangle + 3];
    [
        &materials[face[0] as usize],
        &materials[face[1] as usize],
        &materials[face[2] as usize],
    ]
}

/// Barycentric blend of the hit triangle's normal, specular color and
/// shininess. The normal is renormalized after blending.
pub fn interpolate_material(
    materials: &[RayTracingMaterial],
    index: &[u32],
    intersection: &Intersection,
) -> ShadedMaterial {
    let uvw = intersection.barycentric();
    let [m0, m1, m2] = hit_vertices(materials, index, intersection);

    ShadedMaterial {
        normal: (uvw.x * m0.normal + uvw.y * m1.normal + uvw.z * m2.normal).normalize(),
        specular_color: uvw.x * m0.specular_color
            + uvw.y * m1.specular_color
            + uvw.z * m2.specular_color,
        shininess: uvw.x * m0.shininess() + uvw.y * m1.shininess() + uvw.z * m2.shininess(),
    }
}

/// Barycentric blend of the diffuse color, modulated by the diffuse texture.
///
/// Only the first vertex's texture slot is consulted: the three vertices of
/// a triangle always share one texture binding.
pub fn interpolate_color(
    materials: &[RayTracingMaterial],
    diffuse_tex: &[Texture],
    index: &[u32],
    intersection: &Intersection,
    sampler: &Sampler,
) -> Color {
    let uvw = intersection.barycentric();
    let [m0, m1, m2] = hit_vertices(materials, index, intersection);

    let mut color =
        uvw.x * m0.diffuse_color + uvw.y * m1.diffuse_color + uvw.z * m2.diffuse_color;

    if m0.diffuse_tex >= 0 {
        let texture = &diffuse_tex[m0.diffuse_tex as usize];
        let tex_coord = uvw.x * m0.tex_coord.truncate()
            + uvw.y * m1.tex_coord.truncate()
            + uvw.z * m2.tex_coord.truncate();

        color *= texture.sample(sampler, tex_coord).truncate();
    }

    color
}
