//! Nuo math - vectors, bounds, and the sampling toolkit shared by the
//! ray-tracing kernels.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod frame;
mod interval;
pub mod sampling;

pub use aabb::Aabb;
pub use frame::{
    align_hemisphere_normal, hemi_sphere_basis, relative_to_hemisphere_normal,
    HemisphereCoordinate,
};
pub use interval::Interval;
pub use sampling::{
    cone_uniform_pdf, cosine_pow_pdf, phong_brdf_normalization, sample_cone_uniform,
    sample_cosine_weighted_hemisphere,
};
