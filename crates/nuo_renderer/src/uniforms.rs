//! Uniform blocks and random streams consumed by the tracing kernels.
//!
//! Everything here is `#[repr(C)]` and `Pod` so the host can upload the
//! structs into GPU buffers without conversion.

use bytemuck::{Pod, Zeroable};
use nuo_math::{Aabb, EulerRot, Mat4, UVec2, Vec2, Vec3};
use rand::Rng;

/// The view volume: one ray per viewport pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RayVolumeUniform {
    /// Half width of the view volume at unit distance.
    pub u_range: f32,
    /// Half height of the view volume at unit distance.
    pub v_range: f32,
    pub w_view_port: u32,
    pub h_view_port: u32,
    /// Camera-to-world transform. The camera looks down -Z.
    pub view_trans: Mat4,
}

impl RayVolumeUniform {
    /// Pinhole camera at `eye` looking at `target`.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        vfov_degrees: f32,
        width: u32,
        height: u32,
    ) -> Self {
        let v_range = (vfov_degrees.to_radians() / 2.0).tan();
        let aspect = width as f32 / height.max(1) as f32;

        Self {
            u_range: v_range * aspect,
            v_range,
            w_view_port: width,
            h_view_port: height,
            view_trans: Mat4::look_at_rh(eye, target, up).inverse(),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.w_view_port as usize * self.h_view_port as usize
    }

    /// Element of every per-ray buffer owned by the work item `tid`.
    #[inline]
    pub fn ray_index(&self, tid: UVec2) -> usize {
        tid.y as usize * self.w_view_port as usize + tid.x as usize
    }

    /// Inverse of [`Self::ray_index`].
    #[inline]
    pub fn thread_id(&self, ray_index: usize) -> UVec2 {
        let width = self.w_view_port.max(1) as usize;
        UVec2::new((ray_index % width) as u32, (ray_index / width) as u32)
    }
}

/// An infinitely distant area light seen as a cone of directions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightSource {
    /// Rotation taking +Z onto the direction towards the light.
    pub direction: Mat4,
    /// Radiance scale; zero disables the light.
    pub density: f32,
    /// Half angle of the light's cone, radians.
    pub cone_angle: f32,
    _pad: [f32; 2],
}

impl LightSource {
    pub fn new(direction: Mat4, density: f32, cone_angle: f32) -> Self {
        Self {
            direction,
            density,
            cone_angle,
            _pad: [0.0; 2],
        }
    }

    /// Light rotated by yaw (about Y) then pitch (about X), in degrees.
    pub fn from_euler_degrees(yaw: f32, pitch: f32, density: f32, cone_angle_degrees: f32) -> Self {
        let rotation = Mat4::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0);
        Self::new(rotation, density, cone_angle_degrees.to_radians())
    }

    /// Unit vector from the surface towards the light.
    pub fn light_vector(&self) -> Vec3 {
        self.direction.transform_vector3(Vec3::Z).normalize()
    }

    pub fn is_enabled(&self) -> bool {
        self.density > 0.0
    }
}

/// Scene extent used to size shadow rays and surface offsets.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneBounds {
    pub center: Vec3,
    pub span: f32,
}

impl From<&Aabb> for SceneBounds {
    fn from(aabb: &Aabb) -> Self {
        Self {
            center: aabb.centroid(),
            span: aabb.diagonal_length(),
        }
    }
}

/// Per-frame lighting parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RayTracingUniforms {
    /// One light per shadow-ray slot.
    pub light_sources: [LightSource; 2],
    pub bounds: SceneBounds,
    /// Radiance of the sky seen by escaping paths.
    pub ambient: Vec3,
    pub illuminance_exposure: f32,
    /// Non-zero: translucent geometry also blocks shadow rays.
    pub shadow_on_translucent: u32,
    _pad: [u32; 3],
}

impl RayTracingUniforms {
    pub fn new(
        light_sources: [LightSource; 2],
        bounds: SceneBounds,
        ambient: Vec3,
        illuminance_exposure: f32,
        shadow_on_translucent: bool,
    ) -> Self {
        Self {
            light_sources,
            bounds,
            ambient,
            illuminance_exposure,
            shadow_on_translucent: shadow_on_translucent as u32,
            _pad: [0; 3],
        }
    }

    /// Distance a secondary ray's origin is pushed off the surface.
    #[inline]
    pub fn surface_offset(&self) -> f32 {
        self.bounds.span / SURFACE_OFFSET_DIVISOR
    }
}

/// Secondary-ray origins move `span / SURFACE_OFFSET_DIVISOR` along the
/// normal. Relative to the scene so it survives any model scale.
pub const SURFACE_OFFSET_DIVISOR: f32 = 20000.0;

/// Uniform random numbers for one work item at one bounce.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RayTracingRandomUnit {
    /// Scatter direction (or pixel jitter for the camera layer).
    pub uv: Vec2,
    /// One cone sample per shadow-ray slot.
    pub light_source: [Vec2; 2],
    /// Chooses between the specular and diffuse lobes.
    pub path_term_determinator: f32,
    _pad: f32,
}

/// Side length of the square tile the random stream repeats over.
pub const RANDOM_TILE: u32 = 16;

/// Random units for a frame, laid out as layers of
/// `RANDOM_TILE × RANDOM_TILE` units.
///
/// Layer 0 jitters camera rays; layer `b + 1` serves bounce `b`. A work item
/// reads unit `(tid.y % 16)·16 + tid.x % 16` of its layer, so neighbouring
/// tiles share the stream but no item ever writes it.
#[derive(Debug, Clone)]
pub struct RandomBuffer {
    units: Vec<RayTracingRandomUnit>,
    layers: usize,
}

impl RandomBuffer {
    const LAYER_SIZE: usize = (RANDOM_TILE * RANDOM_TILE) as usize;

    /// Buffer for paths of up to `max_bounces` bounces.
    pub fn new(max_bounces: u32) -> Self {
        let layers = max_bounces as usize + 1;
        Self {
            units: vec![RayTracingRandomUnit::default(); layers * Self::LAYER_SIZE],
            layers,
        }
    }

    /// Refill every unit. Called once per frame.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) {
        for unit in &mut self.units {
            *unit = RayTracingRandomUnit {
                uv: Vec2::new(rng.gen(), rng.gen()),
                light_source: [
                    Vec2::new(rng.gen(), rng.gen()),
                    Vec2::new(rng.gen(), rng.gen()),
                ],
                path_term_determinator: rng.gen(),
                _pad: 0.0,
            };
        }
    }

    fn unit_in_layer(&self, tid: UVec2, layer: usize) -> &RayTracingRandomUnit {
        let tile = (tid.y % RANDOM_TILE) * RANDOM_TILE + tid.x % RANDOM_TILE;
        &self.units[layer % self.layers * Self::LAYER_SIZE + tile as usize]
    }

    /// Unit for camera-ray jitter.
    pub fn camera_unit(&self, tid: UVec2) -> &RayTracingRandomUnit {
        self.unit_in_layer(tid, 0)
    }

    /// Unit for scatter and light sampling at `bounce`.
    pub fn unit(&self, tid: UVec2, bounce: i32) -> &RayTracingRandomUnit {
        self.unit_in_layer(tid, bounce.max(0) as usize + 1)
    }

    /// Raw units, in upload order.
    pub fn as_slice(&self) -> &[RayTracingRandomUnit] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_sizes_are_gpu_friendly() {
        assert_eq!(std::mem::size_of::<RayVolumeUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightSource>(), 80);
        assert_eq!(std::mem::size_of::<RayTracingUniforms>(), 208);
        assert_eq!(std::mem::size_of::<RayTracingRandomUnit>(), 32);
    }

    #[test]
    fn test_ray_index_round_trip() {
        let volume = RayVolumeUniform::look_at(Vec3::Z, Vec3::ZERO, Vec3::Y, 60.0, 7, 5);
        for i in 0..volume.pixel_count() {
            assert_eq!(volume.ray_index(volume.thread_id(i)), i);
        }
        assert_eq!(volume.ray_index(UVec2::new(3, 2)), 17);
    }

    #[test]
    fn test_look_at_ranges() {
        let volume = RayVolumeUniform::look_at(Vec3::Z, Vec3::ZERO, Vec3::Y, 90.0, 200, 100);
        assert!((volume.v_range - 1.0).abs() < 1e-5);
        assert!((volume.u_range - 2.0).abs() < 1e-5);

        let eye = volume.view_trans.transform_point3(Vec3::ZERO);
        assert!((eye - Vec3::Z).length() < 1e-5);
        let forward = volume.view_trans.transform_vector3(-Vec3::Z);
        assert!((forward + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_light_vector() {
        let overhead = LightSource::from_euler_degrees(0.0, -90.0, 1.0, 5.0);
        assert!((overhead.light_vector() - Vec3::Y).length() < 1e-5);

        let front = LightSource::new(Mat4::IDENTITY, 1.0, 0.0);
        assert_eq!(front.light_vector(), Vec3::Z);
        assert!(!LightSource::new(Mat4::IDENTITY, 0.0, 0.0).is_enabled());
    }

    #[test]
    fn test_scene_bounds_from_aabb() {
        let aabb = Aabb::from_positions(&[Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)]);
        let bounds = SceneBounds::from(&aabb);
        assert_eq!(bounds.center, Vec3::new(1.5, 2.0, 0.0));
        assert!((bounds.span - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_units_tile_and_layer() {
        let mut buffer = RandomBuffer::new(2);
        buffer.regenerate(&mut StdRng::seed_from_u64(1));
        assert_eq!(buffer.as_slice().len(), 3 * 256);

        let a = UVec2::new(3, 4);
        let b = UVec2::new(3 + 16, 4 + 32);
        assert_eq!(buffer.unit(a, 0), buffer.unit(b, 0));
        assert_ne!(buffer.unit(a, 0), buffer.unit(a, 1));
        assert_ne!(buffer.camera_unit(a), buffer.unit(a, 0));

        for unit in buffer.as_slice() {
            assert!((0.0..1.0).contains(&unit.uv.x));
            assert!((0.0..1.0).contains(&unit.path_term_determinator));
        }
    }
}
