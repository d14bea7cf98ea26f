//! CPU-side geometry resources.
//!
//! A [`Geometry`] is owned by exactly one mesh. It is deliberately not `Clone`:
//! regeneration always builds a fresh resource with a fresh [`GeometryId`],
//! and the renderer keys its GPU buffers by that id.

mod shapes;

pub use shapes::{
    cone, extruded_fan, icosahedron, uv_sphere, MAX_ICOSAHEDRON_DETAIL,
};

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a geometry resource; never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Vertex layout shared with the mesh shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: glam::Vec3, normal: glam::Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Which generator produced a geometry, with its tessellation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Icosahedron { detail: u32 },
    Sphere { width_segments: u32, height_segments: u32 },
    Cone { radial_segments: u32, height_segments: u32 },
    ExtrudedFan { divisions: u32 },
}

#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    kind: GeometryKind,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Geometry {
    pub(crate) fn new(kind: GeometryKind, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        Self {
            id: GeometryId::next(),
            kind,
            vertices,
            indices,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest distance of any vertex from the local origin
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| glam::Vec3::from_array(v.position).length())
            .fold(0.0, f32::max)
    }

    /// True when both geometries have the same kind, counts and extent.
    /// Ids are ignored: two builds from the same parameters are equivalent.
    pub fn same_shape(&self, other: &Geometry) -> bool {
        self.kind == other.kind
            && self.vertices == other.vertices
            && self.indices == other.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = uv_sphere(1.0, 8, 6).unwrap();
        let b = uv_sphere(1.0, 8, 6).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.same_shape(&b));
    }

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
