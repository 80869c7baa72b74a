//! The intersection engine boundary and a reference implementation.
//!
//! Production builds hand ray buffers to the GPU's acceleration structure.
//! [`BruteForceIntersector`] tests every triangle and exists so the pipeline
//! can run on the CPU for tests and previews.

use nuo_math::{Interval, Vec2, Vec3};
use rayon::prelude::*;

use crate::ray::ray_mask;
use crate::{Intersection, RayBuffer, RayTracingScene};

/// Closest-hit queries over a batch of rays.
///
/// Implementations write one record per ray: the closest triangle whose
/// mask overlaps the ray's mask with `0 < distance <= max_distance`, or
/// [`Intersection::MISS`]. Inactive rays always miss.
pub trait IntersectionEngine: Send + Sync {
    fn intersect(&self, rays: &[RayBuffer], intersections: &mut [Intersection]);
}

/// Pre-computed triangle edges for Möller-Trumbore.
#[derive(Debug, Clone, Copy)]
struct TriangleRecord {
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    mask: u32,
}

/// Tests every ray against every triangle.
#[derive(Debug, Clone)]
pub struct BruteForceIntersector {
    triangles: Vec<TriangleRecord>,
}

impl BruteForceIntersector {
    /// Triangles are masked translucent when their first vertex's material
    /// is not fully opaque.
    pub fn new(scene: &RayTracingScene) -> Self {
        let positions = scene.positions();
        let materials = scene.materials();

        let triangles = scene
            .indices()
            .chunks_exact(3)
            .map(|face| {
                let v0 = positions[face[0] as usize];
                let mask = if materials[face[0] as usize].is_translucent() {
                    ray_mask::TRANSLUCENT
                } else {
                    ray_mask::OPAQUE
                };
                TriangleRecord {
                    v0,
                    edge1: positions[face[1] as usize] - v0,
                    edge2: positions[face[2] as usize] - v0,
                    mask,
                }
            })
            .collect();

        Self { triangles }
    }

    /// Closest hit of a single ray.
    pub fn intersect_ray(&self, ray: &RayBuffer) -> Intersection {
        if !ray.is_active() {
            return Intersection::MISS;
        }

        let mut ray_t = Interval::new(0.0, ray.max_distance);
        let mut closest = Intersection::MISS;

        for (primitive, triangle) in self.triangles.iter().enumerate() {
            if triangle.mask & ray.mask == 0 {
                continue;
            }
            if let Some((t, b1, b2)) = hit_triangle(triangle, ray, ray_t) {
                ray_t.max = t;
                closest = Intersection::new(t, primitive as i32, Vec2::new(1.0 - b1 - b2, b1));
            }
        }

        closest
    }
}

impl IntersectionEngine for BruteForceIntersector {
    fn intersect(&self, rays: &[RayBuffer], intersections: &mut [Intersection]) {
        assert_eq!(rays.len(), intersections.len(), "ray and intersection buffers differ");

        rays.par_iter()
            .zip(intersections.par_iter_mut())
            .for_each(|(ray, out)| *out = self.intersect_ray(ray));
    }
}

/// Möller-Trumbore ray-triangle intersection, double sided.
///
/// Returns `(t, b1, b2)` with the hit at `(1-b1-b2)·v0 + b1·v1 + b2·v2`.
#[inline]
fn hit_triangle(tri: &TriangleRecord, ray: &RayBuffer, ray_t: Interval) -> Option<(f32, f32, f32)> {
    let h = ray.direction.cross(tri.edge2);
    let a = tri.edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - tri.v0;
    let b1 = f * s.dot(h);
    if !(0.0..=1.0).contains(&b1) {
        return None;
    }

    let q = s.cross(tri.edge1);
    let b2 = f * ray.direction.dot(q);
    if b2 < 0.0 || b1 + b2 > 1.0 {
        return None;
    }

    let t = f * tri.edge2.dot(q);
    // (min, max]: a hit exactly at max_distance still counts
    if t <= ray_t.min || !ray_t.contains(t) {
        return None;
    }

    Some((t, b1, b2))
}
