//! Mesh geometry buffers.
//!
//! Meshes are stored as flat triangle lists: positions and normals are
//! appended vertex by vertex and every three consecutive indices form a
//! triangle. The renderer flattens them into its index and material
//! buffers; the viewport uploads `interleaved()` directly.

use nuo_math::{Aabb, Vec3};

/// Triangle-list mesh with one normal per vertex.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, parallel to `positions` once the mesh is complete
    pub normals: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create an empty mesh ready for accumulation.
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            bounds: Aabb::empty(),
        }
    }

    /// Create a mesh from complete buffers.
    pub fn from_buffers(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_positions(&positions);
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Append a vertex position. The vertex is referenced by the next
    /// sequential index.
    pub fn add_position(&mut self, position: Vec3) {
        self.indices.push(self.positions.len() as u32);
        self.positions.push(position);
        self.bounds = self.bounds.include_point(position);
    }

    /// Append the normal of the most recently added vertex.
    pub fn add_normal(&mut self, normal: Vec3) {
        self.normals.push(normal);
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex data as `[px, py, pz, nx, ny, nz]` per vertex.
    ///
    /// Vertices without a normal get a zero normal.
    pub fn interleaved(&self) -> Vec<f32> {
        if self.normals.len() != self.positions.len() {
            log::warn!(
                "Normal count ({}) doesn't match vertex count ({})",
                self.normals.len(),
                self.positions.len()
            );
        }

        let mut buffer = Vec::with_capacity(self.positions.len() * 6);
        for (i, p) in self.positions.iter().enumerate() {
            let n = self.normals.get(i).copied().unwrap_or(Vec3::ZERO);
            buffer.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        buffer
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            mesh.add_position(p);
            mesh.add_normal(Vec3::Z);
        }
        mesh
    }

    #[test]
    fn test_accumulation_builds_triangle_list() {
        let mesh = unit_triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_bounds_follow_positions() {
        let mesh = unit_triangle();

        assert_eq!(mesh.bounds.min(), Vec3::ZERO);
        assert_eq!(mesh.bounds.max(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_interleaved_layout() {
        let mesh = unit_triangle();
        let buffer = mesh.interleaved();

        assert_eq!(buffer.len(), 18);
        assert_eq!(&buffer[6..12], &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
