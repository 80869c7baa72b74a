//! Intersection records produced by the intersection engine.

use bytemuck::{Pod, Zeroable};
use nuo_math::{Vec2, Vec3};

/// Closest hit of one ray: distance, triangle, and barycentrics.
///
/// A miss is written as [`Intersection::MISS`]: negative distance and
/// primitive index `-1`. The hit point is
/// `u·p0 + v·p1 + (1 - u - v)·p2` for `coordinates = (u, v)` and the
/// triangle's vertices in index-buffer order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Intersection {
    pub distance: f32,
    pub primitive_index: i32,
    pub coordinates: Vec2,
}

const _: () = assert!(std::mem::size_of::<Intersection>() == 16);

impl Intersection {
    pub const MISS: Intersection = Intersection {
        distance: -1.0,
        primitive_index: -1,
        coordinates: Vec2::ZERO,
    };

    pub fn new(distance: f32, primitive_index: i32, coordinates: Vec2) -> Self {
        Self {
            distance,
            primitive_index,
            coordinates,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.distance >= 0.0 && self.primitive_index >= 0
    }

    /// Weights of the triangle's three vertices; they sum to one.
    #[inline]
    pub fn barycentric(&self) -> Vec3 {
        let uv = self.coordinates;
        Vec3::new(uv.x, uv.y, 1.0 - uv.x - uv.y)
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::MISS
    }
}
