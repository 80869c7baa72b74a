//! Nuo Core - scene data consumed by the ray-tracing kernels.
//!
//! This crate provides:
//!
//! - **Meshes**: flat triangle-list `Mesh` buffers with per-vertex normals
//! - **Procedural geometry**: the `ModelArrow` gizmo generator
//! - **Textures**: linear RGBA `Texture` images sampled through a `Sampler`
//!
//! # Example
//!
//! ```ignore
//! use nuo_core::ModelArrow;
//!
//! let mesh = ModelArrow::new(2.0, 1.0, 1.0, 2.0).create_buffer();
//! println!("arrow has {} triangles", mesh.triangle_count());
//! ```

pub mod arrow;
pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use arrow::{ModelArrow, K_NUM_OF_FINS};
pub use mesh::Mesh;
pub use texture::{AddressMode, Filter, Sampler, Texture, TextureError, TextureResult};
