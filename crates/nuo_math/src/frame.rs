//! Local shading frame around a surface normal.
//!
//! Samples are generated in a y-up hemisphere. These helpers map them onto
//! the hemisphere around an arbitrary world-space normal and back.

use glam::Vec3;

/// Primary reference direction for building the frame. Slightly off-axis so
/// that axis-aligned normals never produce an exactly degenerate cross
/// product.
const BASIS_REFERENCE: Vec3 = Vec3::new(0.0072, 1.0, 0.0034);

/// Fallback reference used when the normal is nearly parallel to
/// [`BASIS_REFERENCE`].
const BASIS_REFERENCE_FALLBACK: Vec3 = Vec3::new(0.0072, 0.0034, 1.0);

/// Cross products shorter than this are treated as degenerate.
const DEGENERATE_CROSS_LENGTH: f32 = 1e-3;

/// World-space basis vectors of a hemisphere coordinate system.
///
/// `up` is the surface normal, `right` is perpendicular to it and
/// `forward = right × up`. Local samples map as `x → right`, `y → up`,
/// `z → forward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereCoordinate {
    pub right: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl HemisphereCoordinate {
    /// Local → world.
    #[inline]
    pub fn to_world(&self, sample: Vec3) -> Vec3 {
        sample.x * self.right + sample.y * self.up + sample.z * self.forward
    }

    /// World → local.
    #[inline]
    pub fn to_local(&self, w: Vec3) -> Vec3 {
        Vec3::new(w.dot(self.right), w.dot(self.up), w.dot(self.forward))
    }
}

/// Build an orthonormal frame whose `up` is `normal`.
///
/// `normal` is expected to be unit length; the frame is orthonormal exactly
/// when it is.
pub fn hemi_sphere_basis(normal: Vec3) -> HemisphereCoordinate {
    // The length test runs on the unnormalized cross product; a normalized
    // vector would report length 1 (or NaN) and the fallback would never fire.
    let mut right = normal.cross(BASIS_REFERENCE);
    if right.length() < DEGENERATE_CROSS_LENGTH {
        right = normal.cross(BASIS_REFERENCE_FALLBACK);
    }
    let right = right.normalize();

    HemisphereCoordinate {
        right,
        forward: right.cross(normal),
        up: normal,
    }
}

/// Rotate a y-up hemisphere sample so its pole lines up with `n`.
#[inline]
pub fn align_hemisphere_normal(sample: Vec3, n: Vec3) -> Vec3 {
    hemi_sphere_basis(n).to_world(sample)
}

/// Express world direction `w` in the y-up frame around `n`.
///
/// Inverse of [`align_hemisphere_normal`]; used to evaluate pdfs for
/// directions that were not produced by the sampler.
#[inline]
pub fn relative_to_hemisphere_normal(w: Vec3, n: Vec3) -> Vec3 {
    hemi_sphere_basis(n).to_local(w)
}
