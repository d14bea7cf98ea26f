//! Scene graph store: an arena-backed tree of groups, meshes and point lights
//! with an O(1) name index.

mod graph;
mod node;
mod resources;

pub use graph::{GroupId, LightId, MeshId, NodeId, SceneGraph, SceneNode, ROOT_NAME};
pub use node::{
    DirectionalLight, Lighting, Material, Mesh, Node, NodeKind, PointLight, Shading,
};
pub use resources::ResourceLedger;
