//! Per-work-item stages of the path tracing loop.
//!
//! Each function handles one ray and touches only that ray's records, so
//! the dispatcher can run them over whole buffers in parallel.

use nuo_math::{align_hemisphere_normal, sample_cosine_weighted_hemisphere, UVec2, Vec3};

use crate::material::{interpolate_color, interpolate_material, Color};
use crate::ray::ray_mask;
use crate::scene::SceneView;
use crate::shadow::facing_normal;
use crate::uniforms::{RandomBuffer, RayTracingUniforms, RayVolumeUniform};
use crate::{Intersection, RayBuffer};

/// Rec. 709 luma weights.
const LUMINANCE: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

#[inline]
pub fn luminance(color: Color) -> f32 {
    color.dot(LUMINANCE)
}

/// Camera ray through pixel `tid`, jittered within the pixel.
pub fn primary_ray_emit(tid: UVec2, volume: &RayVolumeUniform, random: &RandomBuffer) -> RayBuffer {
    let jitter = random.camera_unit(tid).uv;
    let width = volume.w_view_port.max(1) as f32;
    let height = volume.h_view_port.max(1) as f32;

    // Row 0 is the top of the image
    let x = (tid.x as f32 + jitter.x) / width * 2.0 - 1.0;
    let y = 1.0 - (tid.y as f32 + jitter.y) / height * 2.0;
    let local = Vec3::new(x * volume.u_range, y * volume.v_range, -1.0);

    let origin = volume.view_trans.transform_point3(Vec3::ZERO);
    let direction = volume.view_trans.transform_vector3(local).normalize();

    RayBuffer::new(origin, direction, f32::MAX, ray_mask::ALL)
}

/// Radiance from the sky for a path that escaped the scene.
///
/// Gathered at most once per path; the flag is set on the first escape.
pub fn accumulate_ambient(
    ray: &mut RayBuffer,
    intersection: &Intersection,
    ambient: Color,
) -> Color {
    if !ray.is_active() || intersection.is_hit() || ray.is_ambient_illuminated() {
        return Color::ZERO;
    }

    ray.set_ambient_illuminated(true);
    ray.path_scatter * ambient
}

/// Light carried by a shadow ray that reached its light unoccluded.
pub fn accumulate_shadow(
    shadow_ray: &RayBuffer,
    intersection: &Intersection,
    exposure: f32,
) -> Color {
    if !shadow_ray.is_active() || intersection.is_hit() {
        return Color::ZERO;
    }
    shadow_ray.path_scatter * exposure
}

/// Turn `ray` into the next section of its path.
///
/// The specular lobe is chosen with probability proportional to its
/// luminance share. Diffuse bounces sample the cosine hemisphere around
/// the normal; specular bounces sample the Phong lobe around the mirror
/// direction. The ray is terminated on a miss, at `max_bounces`, or when
/// the sampled direction falls below the surface.
pub fn scatter_ray(
    tid: UVec2,
    ray: &mut RayBuffer,
    intersection: &Intersection,
    scene: &SceneView<'_>,
    tracing_uniforms: &RayTracingUniforms,
    random: &RandomBuffer,
    max_bounces: u32,
) {
    if !ray.is_active() {
        return;
    }
    if !intersection.is_hit() || ray.bounce + 1 >= max_bounces as i32 {
        ray.terminate();
        return;
    }

    let material = interpolate_material(scene.materials, scene.index, intersection);
    let diffuse = interpolate_color(
        scene.materials,
        scene.textures,
        scene.index,
        intersection,
        &scene.sampler,
    );
    let incoming = ray.direction.normalize();
    let normal = facing_normal(material.normal, incoming);

    let specular_weight = luminance(material.specular_color);
    let diffuse_weight = luminance(diffuse);
    let total = specular_weight + diffuse_weight;
    if total <= 0.0 {
        ray.terminate();
        return;
    }
    let specular_probability = specular_weight / total;

    let random_unit = random.unit(tid, ray.bounce);
    let (direction, weight) = if random_unit.path_term_determinator < specular_probability {
        let m = material.shininess.max(1.0).round() as i32;
        let mirror = incoming - 2.0 * incoming.dot(normal) * normal;
        let sample = sample_cosine_weighted_hemisphere(random_unit.uv, m);
        let direction = align_hemisphere_normal(sample, mirror);

        // ks·(m+2)/2π·cos^m α · cosθ / ((m+1)/2π·cos^m α)
        let cos_theta = normal.dot(direction);
        let weight = material.specular_color * ((m as f32 + 2.0) / (m as f32 + 1.0)) * cos_theta
            / specular_probability;
        (direction, weight)
    } else {
        let sample = sample_cosine_weighted_hemisphere(random_unit.uv, 1);
        let direction = align_hemisphere_normal(sample, normal);

        // kd/π · cosθ / (cosθ/π)
        (direction, diffuse / (1.0 - specular_probability))
    };

    if normal.dot(direction) <= 0.0 {
        ray.terminate();
        return;
    }

    ray.origin = ray.at(intersection.distance) + normal * tracing_uniforms.surface_offset();
    ray.direction = direction;
    ray.path_scatter *= weight;
    ray.bounce += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::RayTracingMaterial;
    use crate::uniforms::{LightSource, SceneBounds};
    use crate::RayTracingScene;
    use nuo_core::Sampler;
    use nuo_math::{Mat4, Vec2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random() -> RandomBuffer {
        let mut random = RandomBuffer::new(4);
        random.regenerate(&mut StdRng::seed_from_u64(23));
        random
    }

    fn tracing() -> RayTracingUniforms {
        let off = LightSource::new(Mat4::IDENTITY, 0.0, 0.0);
        RayTracingUniforms::new(
            [off, off],
            SceneBounds {
                center: Vec3::ZERO,
                span: 2.0,
            },
            Color::splat(0.5),
            1.0,
            false,
        )
    }

    fn ground(material: RayTracingMaterial) -> RayTracingScene {
        let positions = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        RayTracingScene::new(positions, vec![0, 1, 2, 0, 2, 3], vec![material; 4], vec![]).unwrap()
    }

    fn downward() -> RayBuffer {
        RayBuffer::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, f32::MAX, ray_mask::ALL)
    }

    fn ground_hit() -> Intersection {
        Intersection::new(1.0, 0, Vec2::new(0.3, 0.3))
    }

    #[test]
    fn test_primary_rays_cover_view_volume() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let volume = RayVolumeUniform::look_at(eye, Vec3::ZERO, Vec3::Y, 90.0, 4, 4);
        let random = random();

        for i in 0..volume.pixel_count() {
            let tid = volume.thread_id(i);
            let ray = primary_ray_emit(tid, &volume, &random);

            assert!(ray.is_active());
            assert_eq!(ray.path_scatter, Vec3::ONE);
            assert!((ray.origin - eye).length() < 1e-5);
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
            assert!(ray.direction.z < 0.0);
            // 90 degree fov: |x| and |y| stay within the unit-depth frustum
            assert!(ray.direction.x.abs() <= -ray.direction.z + 1e-5);
            // top row looks up, left column looks left
            if tid.y == 0 {
                assert!(ray.direction.y > 0.0);
            }
            if tid.x == 0 {
                assert!(ray.direction.x < 0.0);
            }
        }
    }

    #[test]
    fn test_ambient_gathered_once() {
        let mut ray = downward();
        ray.path_scatter = Color::new(0.5, 1.0, 1.0);

        let first = accumulate_ambient(&mut ray, &Intersection::MISS, Color::ONE);
        assert_eq!(first, Color::new(0.5, 1.0, 1.0));
        assert!(ray.is_ambient_illuminated());

        let second = accumulate_ambient(&mut ray, &Intersection::MISS, Color::ONE);
        assert_eq!(second, Color::ZERO);
    }

    #[test]
    fn test_ambient_ignores_hits() {
        let mut ray = downward();
        assert_eq!(accumulate_ambient(&mut ray, &ground_hit(), Color::ONE), Color::ZERO);
        assert!(!ray.is_ambient_illuminated());
    }

    #[test]
    fn test_shadow_occlusion() {
        let mut shadow = RayBuffer::new(Vec3::ZERO, Vec3::Y, 2.0, ray_mask::OPAQUE);
        shadow.path_scatter = Color::splat(0.25);

        assert_eq!(accumulate_shadow(&shadow, &Intersection::MISS, 2.0), Color::splat(0.5));
        assert_eq!(accumulate_shadow(&shadow, &ground_hit(), 2.0), Color::ZERO);
        assert_eq!(accumulate_shadow(&RayBuffer::inactive(), &Intersection::MISS, 1.0), Color::ZERO);
    }

    #[test]
    fn test_diffuse_scatter_leaves_surface() {
        let scene = ground(RayTracingMaterial::new(Vec3::Y, Color::new(0.8, 0.4, 0.2)));
        let view = scene.view(Sampler::default());
        let tracing = tracing();
        let random = random();

        for i in 0..64u32 {
            let tid = UVec2::new(i % 16, i / 16);
            let mut ray = downward();
            scatter_ray(tid, &mut ray, &ground_hit(), &view, &tracing, &random, 4);

            assert!(ray.is_active());
            assert_eq!(ray.bounce, 1);
            assert!(ray.direction.y > 0.0);
            assert!(ray.origin.y > 0.0);
            // pure diffuse: throughput is the albedo
            assert!((ray.path_scatter - Color::new(0.8, 0.4, 0.2)).length() < 1e-5);
        }
    }

    #[test]
    fn test_specular_scatter_follows_mirror() {
        let mirror = RayTracingMaterial::new(Vec3::Y, Color::ZERO).with_specular(Color::ONE, 1000.0);
        let scene = ground(mirror);
        let view = scene.view(Sampler::default());
        let tracing = tracing();

        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mut ray = RayBuffer::new(Vec3::new(-1.0, 1.0, 0.0), incoming, f32::MAX, ray_mask::ALL);
        let hit = Intersection::new(2f32.sqrt(), 0, Vec2::new(0.3, 0.3));
        scatter_ray(UVec2::ZERO, &mut ray, &hit, &view, &tracing, &random(), 4);

        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!(ray.is_active());
        assert!(ray.direction.dot(expected) > 0.99);
    }

    #[test]
    fn test_scatter_terminates() {
        let scene = ground(RayTracingMaterial::new(Vec3::Y, Color::ONE));
        let view = scene.view(Sampler::default());
        let tracing = tracing();
        let random = random();

        let mut missed = downward();
        scatter_ray(UVec2::ZERO, &mut missed, &Intersection::MISS, &view, &tracing, &random, 4);
        assert!(!missed.is_active());

        let mut deep = downward();
        deep.bounce = 3;
        scatter_ray(UVec2::ZERO, &mut deep, &ground_hit(), &view, &tracing, &random, 4);
        assert!(!deep.is_active());

        let black = ground(RayTracingMaterial::new(Vec3::Y, Color::ZERO));
        let mut absorbed = downward();
        let black_view = black.view(Sampler::default());
        scatter_ray(UVec2::ZERO, &mut absorbed, &ground_hit(), &black_view, &tracing, &random, 4);
        assert!(!absorbed.is_active());
    }

    #[test]
    fn test_luminance() {
        assert!((luminance(Color::ONE) - 1.0).abs() < 1e-6);
        assert_eq!(luminance(Color::ZERO), 0.0);
    }
}
