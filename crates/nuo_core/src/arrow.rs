//! Procedural arrow mesh used for the light-direction gizmos.
//!
//! The arrow points along +Z: a capped cylinder (the shaft) from z = 0 to
//! `body_length`, followed by a cone (the head) whose tip sits at
//! `body_length + head_length`.

use std::f32::consts::PI;

use nuo_math::Vec3;

use crate::mesh::Mesh;

/// Number of segments around the shaft axis.
pub const K_NUM_OF_FINS: usize = 36;

/// Shape parameters of an arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelArrow {
    body_length: f32,
    body_radius: f32,
    head_length: f32,
    head_radius: f32,
}

/// Which end of the shaft a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShaftEnd {
    Tail,
    Head,
}

impl ModelArrow {
    pub fn new(body_length: f32, body_radius: f32, head_length: f32, head_radius: f32) -> Self {
        Self {
            body_length,
            body_radius,
            head_length,
            head_radius,
        }
    }

    /// Build the full arrow: tail cap, shaft, and head.
    pub fn create_buffer(&self) -> Mesh {
        let mut mesh = Mesh::new();
        self.create_end_surface(&mut mesh);
        self.create_body_surface(&mut mesh);
        self.create_head_surface(&mut mesh);

        log::debug!(
            "Arrow mesh: {} triangles, {} vertices",
            mesh.triangle_count(),
            mesh.vertex_count()
        );
        mesh
    }

    /// Disc closing the shaft at z = 0, one triangle per fin.
    pub fn create_end_surface(&self, mesh: &mut Mesh) {
        let end_center = self.end_vertex(ShaftEnd::Tail);
        let normal = Vec3::new(0.0, 0.0, -1.0);

        for index in 0..K_NUM_OF_FINS {
            let edge_vertex1 = self.body_vertex(index, ShaftEnd::Tail);
            let edge_vertex2 = self.body_vertex(index + 1, ShaftEnd::Tail);

            for p in [end_center, edge_vertex1, edge_vertex2] {
                mesh.add_position(p);
                mesh.add_normal(normal);
            }
        }
    }

    /// Side of the shaft, two triangles per fin with smooth radial normals.
    pub fn create_body_surface(&self, mesh: &mut Mesh) {
        for index in 0..K_NUM_OF_FINS {
            let end_vertex1 = self.body_vertex(index, ShaftEnd::Tail);
            let end_vertex2 = self.body_vertex(index + 1, ShaftEnd::Tail);
            let head_vertex1 = self.body_vertex(index, ShaftEnd::Head);
            let head_vertex2 = self.body_vertex(index + 1, ShaftEnd::Head);

            let normal1 = Self::body_normal(index);
            let normal2 = Self::body_normal(index + 1);

            let triangles = [
                [
                    (head_vertex1, normal1),
                    (end_vertex1, normal1),
                    (head_vertex2, normal2),
                ],
                [
                    (head_vertex2, normal2),
                    (end_vertex1, normal1),
                    (end_vertex2, normal2),
                ],
            ];

            for (position, normal) in triangles.into_iter().flatten() {
                mesh.add_position(position);
                mesh.add_normal(normal);
            }
        }
    }

    /// Back ring between the shaft and the head rim, then the cone.
    ///
    /// Three triangles per fin: two for the ring, one for the cone.
    pub fn create_head_surface(&self, mesh: &mut Mesh) {
        let back = Vec3::new(0.0, 0.0, -1.0);
        let tip = self.end_vertex(ShaftEnd::Head);

        for index in 0..K_NUM_OF_FINS {
            let inner1 = self.body_vertex(index, ShaftEnd::Head);
            let inner2 = self.body_vertex(index + 1, ShaftEnd::Head);
            let outer1 = self.head_vertex(index);
            let outer2 = self.head_vertex(index + 1);

            for p in [inner1, outer1, outer2, inner1, outer2, inner2] {
                mesh.add_position(p);
                mesh.add_normal(back);
            }

            let normal1 = self.head_normal(index as f32);
            let normal2 = self.head_normal((index + 1) as f32);
            let tip_normal = self.head_normal(index as f32 + 0.5);

            for (position, normal) in [(outer1, normal1), (tip, tip_normal), (outer2, normal2)] {
                mesh.add_position(position);
                mesh.add_normal(normal);
            }
        }
    }

    fn arc(index: f32) -> f32 {
        index / K_NUM_OF_FINS as f32 * 2.0 * PI
    }

    fn body_vertex(&self, index: usize, end: ShaftEnd) -> Vec3 {
        let (sin, cos) = Self::arc(index as f32).sin_cos();
        let z = match end {
            ShaftEnd::Tail => 0.0,
            ShaftEnd::Head => self.body_length,
        };
        Vec3::new(cos * self.body_radius, sin * self.body_radius, z)
    }

    fn body_normal(index: usize) -> Vec3 {
        let (sin, cos) = Self::arc(index as f32).sin_cos();
        Vec3::new(cos, sin, 0.0)
    }

    fn end_vertex(&self, end: ShaftEnd) -> Vec3 {
        match end {
            ShaftEnd::Tail => Vec3::ZERO,
            ShaftEnd::Head => Vec3::new(0.0, 0.0, self.body_length + self.head_length),
        }
    }

    fn head_vertex(&self, index: usize) -> Vec3 {
        let (sin, cos) = Self::arc(index as f32).sin_cos();
        Vec3::new(cos * self.head_radius, sin * self.head_radius, self.body_length)
    }

    /// Outward normal of the cone's side at fractional fin position `index`.
    fn head_normal(&self, index: f32) -> Vec3 {
        let (sin, cos) = Self::arc(index).sin_cos();
        Vec3::new(cos * self.head_length, sin * self.head_length, self.head_radius).normalize()
    }
}
