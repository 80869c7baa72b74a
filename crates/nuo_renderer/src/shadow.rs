//! Next-event estimation towards the infinite area lights.
//!
//! Every primary hit emits one shadow ray per light source. Light `i`
//! always writes slot `i`, and within a slot the work item `tid` writes
//! element `tid.y · width + tid.x`, so no two items share an output.

use nuo_math::{align_hemisphere_normal, sample_cone_uniform, UVec2, Vec3};
use rayon::prelude::*;

use crate::material::{interpolate_color, interpolate_material};
use crate::ray::ray_mask;
use crate::scene::SceneView;
use crate::uniforms::{RandomBuffer, RayTracingUniforms, RayVolumeUniform};
use crate::{Intersection, RayBuffer};

/// Number of shadow-ray slots, one per light source.
pub const SHADOW_RAY_SLOTS: usize = 2;

/// Shading normal at a hit, flipped to face the incoming ray.
#[inline]
pub(crate) fn facing_normal(normal: Vec3, incoming: Vec3) -> Vec3 {
    if normal.dot(incoming) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Build the shadow rays for one work item.
///
/// Returns one ray per light slot. A slot stays inactive when the path
/// missed, the light is disabled, or the sampled light direction is below
/// the surface.
pub fn shadow_ray_emit_infinite_area(
    tid: UVec2,
    ray: &RayBuffer,
    scene: &SceneView<'_>,
    intersection: &Intersection,
    tracing_uniforms: &RayTracingUniforms,
    random: &RandomBuffer,
) -> [RayBuffer; SHADOW_RAY_SLOTS] {
    let mut shadow_rays = [RayBuffer::inactive(); SHADOW_RAY_SLOTS];

    if !ray.is_active() || !intersection.is_hit() {
        return shadow_rays;
    }

    let intersection_point = ray.at(intersection.distance);
    let material = interpolate_material(scene.materials, scene.index, intersection);
    let normal = facing_normal(material.normal, ray.direction);
    let diffuse = interpolate_color(
        scene.materials,
        scene.textures,
        scene.index,
        intersection,
        &scene.sampler,
    );

    let random_unit = random.unit(tid, ray.bounce);
    let origin = intersection_point + normal * tracing_uniforms.surface_offset();
    let mask = if tracing_uniforms.shadow_on_translucent != 0 {
        ray_mask::ALL
    } else {
        ray_mask::OPAQUE
    };

    for (slot, (shadow_ray, light)) in shadow_rays
        .iter_mut()
        .zip(&tracing_uniforms.light_sources)
        .enumerate()
    {
        if !light.is_enabled() {
            continue;
        }

        let sample = sample_cone_uniform(random_unit.light_source[slot], light.cone_angle.cos());
        let shadow_vec = align_hemisphere_normal(sample, light.light_vector());

        let cos_theta = normal.dot(shadow_vec);
        if cos_theta <= 0.0 {
            continue;
        }

        // Lambertian f·cosθ/pdf against a light of unit solid-angle measure
        let mut emitted = RayBuffer::new(origin, shadow_vec, tracing_uniforms.bounds.span, mask);
        emitted.path_scatter = ray.path_scatter * diffuse * cos_theta * light.density;
        emitted.bounce = ray.bounce;
        emitted.set_ambient_illuminated(ray.is_ambient_illuminated());
        *shadow_ray = emitted;
    }

    shadow_rays
}

/// Output buffers for the shadow rays of a dispatch, one per slot.
#[derive(Debug, Clone)]
pub struct ShadowRayBuffers {
    slots: [Vec<RayBuffer>; SHADOW_RAY_SLOTS],
}

impl ShadowRayBuffers {
    pub fn new(ray_count: usize) -> Self {
        Self {
            slots: std::array::from_fn(|_| vec![RayBuffer::inactive(); ray_count]),
        }
    }

    pub fn slot(&self, slot: usize) -> &[RayBuffer] {
        &self.slots[slot]
    }

    /// Run [`shadow_ray_emit_infinite_area`] for every work item in parallel.
    pub fn emit(
        &mut self,
        volume: &RayVolumeUniform,
        rays: &[RayBuffer],
        intersections: &[Intersection],
        scene: &SceneView<'_>,
        tracing_uniforms: &RayTracingUniforms,
        random: &RandomBuffer,
    ) {
        let [slot0, slot1] = &mut self.slots;
        assert_eq!(rays.len(), slot0.len(), "shadow buffers sized for another viewport");

        slot0
            .par_iter_mut()
            .zip(slot1.par_iter_mut())
            .zip(rays.par_iter().zip(intersections.par_iter()))
            .enumerate()
            .for_each(|(ray_index, ((out0, out1), (ray, intersection)))| {
                let tid = volume.thread_id(ray_index);
                let [s0, s1] = shadow_ray_emit_infinite_area(
                    tid,
                    ray,
                    scene,
                    intersection,
                    tracing_uniforms,
                    random,
                );
                *out0 = s0;
                *out1 = s1;
            });
    }
}
