//! Nuo Renderer - ray-tracing kernels for the model viewer.
//!
//! The kernels operate on flat, GPU-layout buffers: one [`RayBuffer`] and
//! one [`Intersection`] per pixel, per-vertex [`RayTracingMaterial`]s, and
//! uniform blocks. Every kernel is a pure function of one work item, so a
//! dispatch is a rayon pass over the buffers.
//!
//! [`PathTracer`] strings the passes together on the CPU, using a
//! [`BruteForceIntersector`] or any other [`IntersectionEngine`].

mod config;
mod integrator;
mod intersection;
mod intersector;
mod material;
mod ray;
mod renderer;
mod scene;
mod shadow;
mod uniforms;

pub use config::{CameraConfig, ConfigError, LightConfig, RenderConfig};
pub use integrator::{
    accumulate_ambient, accumulate_shadow, luminance, primary_ray_emit, scatter_ray,
};
pub use intersection::Intersection;
pub use intersector::{BruteForceIntersector, IntersectionEngine};
pub use material::{
    interpolate_color, interpolate_material, Color, RayTracingMaterial, ShadedMaterial,
};
pub use ray::{ray_mask, RayBuffer};
pub use renderer::{color_to_rgba, linear_to_gamma, ImageBuffer, PathTracer};
pub use scene::{RayTracingScene, SceneError, SceneView, SurfaceDesc, TEXTURE_BINDINGS_CAP};
pub use shadow::{shadow_ray_emit_infinite_area, ShadowRayBuffers, SHADOW_RAY_SLOTS};
pub use uniforms::{
    LightSource, RandomBuffer, RayTracingRandomUnit, RayTracingUniforms, RayVolumeUniform,
    SceneBounds, RANDOM_TILE, SURFACE_OFFSET_DIVISOR,
};

/// Re-export the math types used in the public API.
pub use nuo_math::{Aabb, HemisphereCoordinate, Mat4, UVec2, Vec2, Vec3};
