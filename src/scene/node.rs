use glam::Vec3;

use crate::geometry::Geometry;
use crate::math::{Rgb, Transform};

/// How the renderer lights a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Lambert with per-face normals
    Flat,
    /// Lambert with interpolated normals
    Smooth,
    /// Plain colour, ignores lights
    Unlit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub shading: Shading,
}

impl Material {
    pub fn flat(color: Rgb) -> Self {
        Self { color, shading: Shading::Flat }
    }

    pub fn smooth(color: Rgb) -> Self {
        Self { color, shading: Shading::Smooth }
    }

    pub fn unlit(color: Rgb) -> Self {
        Self { color, shading: Shading::Unlit }
    }
}

/// Renderable primitive: one geometry and one material.
///
/// The geometry can only be swapped through
/// [`SceneGraph::replace_geometry`](super::SceneGraph::replace_geometry), which
/// releases the old resource in the same call.
#[derive(Debug)]
pub struct Mesh {
    geometry: Geometry,
    pub material: Material,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(super) fn swap_geometry(&mut self, geometry: Geometry) -> Geometry {
        std::mem::replace(&mut self.geometry, geometry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Scene-wide light that is not part of the node tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in, world space
    pub direction: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Light shining from `position` towards the origin
    pub fn from_position(position: Vec3, color: Rgb, intensity: f32) -> Self {
        Self {
            direction: (-position).normalize_or_zero(),
            color,
            intensity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lighting {
    pub ambient: Option<Rgb>,
    pub directional: Vec<DirectionalLight>,
}

#[derive(Debug)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    PointLight(PointLight),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::PointLight(_) => "point light",
        }
    }
}

/// Detached node, built by the primitive factory and handed to
/// [`SceneGraph::add_child`](super::SceneGraph::add_child) together with its
/// subtree.
#[derive(Debug)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::IDENTITY,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    pub fn mesh(geometry: Geometry, material: Material) -> Self {
        Self::with_kind(NodeKind::Mesh(Mesh::new(geometry, material)))
    }

    pub fn point_light(light: PointLight) -> Self {
        Self::with_kind(NodeKind::PointLight(light))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Visit this node and its subtree, parents first
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}
