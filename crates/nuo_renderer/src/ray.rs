//! Ray records exchanged with the intersection engine.
//!
//! The leading fields match the intersector's
//! origin/mask/direction/max-distance layout; the integrator's path state
//! follows. The record is uploaded as-is, so the layout is fixed.

use bytemuck::{Pod, Zeroable};
use nuo_math::Vec3;

/// Geometry mask bits. A ray only sees triangles whose mask shares a bit
/// with the ray's mask.
pub mod ray_mask {
    pub const OPAQUE: u32 = 1;
    pub const TRANSLUCENT: u32 = 2;
    pub const ALL: u32 = OPAQUE | TRANSLUCENT;
}

/// A ray plus the path state carried across bounces.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RayBuffer {
    pub origin: Vec3,
    pub mask: u32,
    pub direction: Vec3,
    /// Negative for an inactive ray; the intersector reports a miss.
    pub max_distance: f32,

    /// Product of the `f·cosθ/pdf` terms of all previous path sections.
    pub path_scatter: Vec3,

    pub bounce: i32,

    /// Whether the ambient term was already gathered for this path.
    /// Independent from bounce termination. Stored as 0/1.
    ambient_illuminated: u32,
}

const _: () = assert!(std::mem::size_of::<RayBuffer>() == 52);

impl RayBuffer {
    /// Create a fresh path ray with unit throughput.
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> Self {
        Self {
            origin,
            mask,
            direction,
            max_distance,
            path_scatter: Vec3::ONE,
            bounce: 0,
            ambient_illuminated: 0,
        }
    }

    /// A ray that the intersector skips and that carries no energy.
    pub fn inactive() -> Self {
        Self {
            origin: Vec3::ZERO,
            mask: 0,
            direction: Vec3::Z,
            max_distance: -1.0,
            path_scatter: Vec3::ZERO,
            bounce: 0,
            ambient_illuminated: 0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.max_distance >= 0.0
    }

    /// Stop the path. Throughput is kept for inspection.
    #[inline]
    pub fn terminate(&mut self) {
        self.max_distance = -1.0;
    }

    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    #[inline]
    pub fn is_ambient_illuminated(&self) -> bool {
        self.ambient_illuminated != 0
    }

    #[inline]
    pub fn set_ambient_illuminated(&mut self, illuminated: bool) {
        self.ambient_illuminated = illuminated as u32;
    }
}

impl Default for RayBuffer {
    fn default() -> Self {
        Self::inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_layout_matches_intersector_abi() {
        assert_eq!(offset_of!(RayBuffer, origin), 0);
        assert_eq!(offset_of!(RayBuffer, mask), 12);
        assert_eq!(offset_of!(RayBuffer, direction), 16);
        assert_eq!(offset_of!(RayBuffer, max_distance), 28);
        assert_eq!(offset_of!(RayBuffer, path_scatter), 32);
        assert_eq!(offset_of!(RayBuffer, bounce), 44);
        assert_eq!(std::mem::align_of::<RayBuffer>(), 4);
    }

    #[test]
    fn test_ray_at() {
        let ray = RayBuffer::new(Vec3::ZERO, Vec3::X, 10.0, ray_mask::ALL);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_activity() {
        let mut ray = RayBuffer::new(Vec3::ZERO, Vec3::Y, 1.0, ray_mask::OPAQUE);
        assert!(ray.is_active());
        assert_eq!(ray.path_scatter, Vec3::ONE);

        ray.terminate();
        assert!(!ray.is_active());
        assert!(!RayBuffer::inactive().is_active());
    }

    #[test]
    fn test_ambient_flag_is_one_byte_bool_compatible() {
        let mut ray = RayBuffer::new(Vec3::ZERO, Vec3::Y, 1.0, ray_mask::OPAQUE);
        assert!(!ray.is_ambient_illuminated());

        ray.set_ambient_illuminated(true);
        assert!(ray.is_ambient_illuminated());

        let bytes = bytemuck::bytes_of(&ray);
        assert_eq!(bytes.len(), 52);
        assert_eq!(bytes[48], 1);
        assert_eq!(&bytes[49..], &[0, 0, 0]);
    }
}
