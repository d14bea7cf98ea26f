use std::collections::{HashMap, HashSet};

use glam::Mat4;

use super::node::{Lighting, Mesh, Node, NodeKind, PointLight};
use super::resources::ResourceLedger;
use crate::error::{Result, SceneError};
use crate::geometry::{Geometry, GeometryId};
use crate::math::Transform;

/// Name of the root group every scene starts with
pub const ROOT_NAME: &str = "scene";

/// Generational index into the node arena. Stale ids never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NodeId);

        impl $name {
            pub fn node(self) -> NodeId {
                self.0
            }
        }
    };
}

typed_handle!(
    /// Node known to be a group
    GroupId
);
typed_handle!(
    /// Node known to be a mesh
    MeshId
);
typed_handle!(
    /// Node known to be a point light
    LightId
);

/// A node while it is attached to the graph
#[derive(Debug)]
pub struct SceneNode {
    name: Option<String>,
    pub transform: Transform,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&PointLight> {
        match &self.kind {
            NodeKind::PointLight(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut PointLight> {
        match &mut self.kind {
            NodeKind::PointLight(light) => Some(light),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Owner of every node in a scene.
///
/// Nodes live in an arena addressed by [`NodeId`]; named nodes are also
/// reachable through a name index that is updated on every add and remove.
/// Callers hold names or short-lived ids, never references.
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    names: HashMap<String, NodeId>,
    root: NodeId,
    resources: ResourceLedger,
    pub lighting: Lighting,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            names: HashMap::new(),
            root: NodeId { index: 0, generation: 0 },
            resources: ResourceLedger::default(),
            lighting: Lighting::default(),
        };
        graph.root = graph.alloc(SceneNode {
            name: Some(ROOT_NAME.to_string()),
            transform: Transform::IDENTITY,
            kind: NodeKind::Group,
            parent: None,
            children: Vec::new(),
        });
        graph.names.insert(ROOT_NAME.to_string(), graph.root);
        graph
    }

    pub fn root(&self) -> GroupId {
        GroupId(self.root)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Like [`find_by_name`](Self::find_by_name), failing with `MissingNode`
    pub fn lookup(&self, name: &str) -> Result<NodeId> {
        self.find_by_name(name).ok_or_else(|| SceneError::missing(name))
    }

    pub fn find_group(&self, name: &str) -> Result<GroupId> {
        let id = self.lookup(name)?;
        match self.node(id)?.kind {
            NodeKind::Group => Ok(GroupId(id)),
            _ => Err(Self::wrong_kind(name, "group")),
        }
    }

    pub fn find_mesh(&self, name: &str) -> Result<MeshId> {
        let id = self.lookup(name)?;
        match self.node(id)?.kind {
            NodeKind::Mesh(_) => Ok(MeshId(id)),
            _ => Err(Self::wrong_kind(name, "mesh")),
        }
    }

    pub fn find_light(&self, name: &str) -> Result<LightId> {
        let id = self.lookup(name)?;
        match self.node(id)?.kind {
            NodeKind::PointLight(_) => Ok(LightId(id)),
            _ => Err(Self::wrong_kind(name, "point light")),
        }
    }

    fn wrong_kind(name: &str, expected: &'static str) -> SceneError {
        SceneError::WrongNodeKind {
            name: name.to_string(),
            expected,
        }
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or_else(|| SceneError::missing(self.describe(id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        let label = self.describe(id);
        self.get_mut(id).ok_or_else(|| SceneError::missing(label))
    }

    /// Human-readable label for error messages
    pub fn describe(&self, id: NodeId) -> String {
        match self.get(id).and_then(SceneNode::name) {
            Some(name) => name.to_string(),
            None => format!("#{}v{}", id.index, id.generation),
        }
    }

    pub fn mesh(&self, id: MeshId) -> Result<&Mesh> {
        let label = self.describe(id.0);
        self.node(id.0)?
            .as_mesh()
            .ok_or_else(|| Self::wrong_kind(&label, "mesh"))
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Result<&mut Mesh> {
        let label = self.describe(id.0);
        self.node_mut(id.0)?
            .as_mesh_mut()
            .ok_or_else(|| Self::wrong_kind(&label, "mesh"))
    }

    pub fn light_mut(&mut self, id: LightId) -> Result<&mut PointLight> {
        let label = self.describe(id.0);
        self.node_mut(id.0)?
            .as_light_mut()
            .ok_or_else(|| Self::wrong_kind(&label, "point light"))
    }

    pub fn transform(&self, id: NodeId) -> Result<&Transform> {
        Ok(&self.node(id)?.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform> {
        Ok(&mut self.node_mut(id)?.transform)
    }

    /// Attach `node` (with its subtree) as the last child of `parent_name`
    pub fn add_child(&mut self, parent_name: &str, node: Node) -> Result<NodeId> {
        let parent = self.lookup(parent_name)?;
        self.add_child_to(parent, node)
    }

    pub fn add_child_to(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.node(parent)?;
        self.check_names(&node)?;
        Ok(self.insert(parent, node))
    }

    /// Every name in the subtree must be free, and unique within the subtree.
    /// Checked up front so a failed add leaves the graph untouched.
    fn check_names(&self, node: &Node) -> Result<()> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        node.walk(&mut |n| {
            if result.is_err() {
                return;
            }
            if let Some(name) = n.name.as_deref() {
                if self.names.contains_key(name) || !seen.insert(name) {
                    result = Err(SceneError::DuplicateName(name.to_string()));
                }
            }
        });
        result
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        let Node {
            name,
            transform,
            kind,
            children,
        } = node;

        if let NodeKind::Mesh(mesh) = &kind {
            self.resources.register(mesh.geometry().id());
        }

        let id = self.alloc(SceneNode {
            name: name.clone(),
            transform,
            kind,
            parent: Some(parent),
            children: Vec::with_capacity(children.len()),
        });
        if let Some(name) = name {
            self.names.insert(name, id);
        }
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }

        for child in children {
            self.insert(id, child);
        }
        id
    }

    fn alloc(&mut self, node: SceneNode) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId { index, generation: 0 }
            }
        }
    }

    /// Detach `child` from `parent_name` and destroy its subtree, releasing
    /// every geometry in it.
    pub fn remove_child(&mut self, parent_name: &str, child: NodeId) -> Result<usize> {
        let parent = self.lookup(parent_name)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild {
                parent: parent_name.to_string(),
                node: self.describe(child),
            });
        }
        self.node_mut(parent)?.children.retain(|&c| c != child);
        Ok(self.destroy(child))
    }

    /// Destroy every child of `parent_name`; returns the number of nodes removed
    pub fn clear_children(&mut self, parent_name: &str) -> Result<usize> {
        let parent = self.lookup(parent_name)?;
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        Ok(children.into_iter().map(|c| self.destroy(c)).sum())
    }

    fn destroy(&mut self, id: NodeId) -> usize {
        let Some(slot) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        else {
            return 0;
        };
        let Some(node) = slot.node.take() else {
            return 0;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let Some(name) = &node.name {
            if self.names.get(name) == Some(&id) {
                self.names.remove(name);
            }
        }
        if let NodeKind::Mesh(mesh) = &node.kind {
            self.resources.release(mesh.geometry().id());
        }

        1 + node
            .children
            .into_iter()
            .map(|c| self.destroy(c))
            .sum::<usize>()
    }

    /// Swap the geometry of `mesh`, releasing the previous resource in the
    /// same call. Node identity, parent, material and transform are kept.
    pub fn replace_geometry(&mut self, mesh: MeshId, geometry: Geometry) -> Result<GeometryId> {
        let new_id = geometry.id();
        let old = self.mesh_mut(mesh)?.swap_geometry(geometry);
        self.resources.register(new_id);
        self.resources.release(old.id());
        Ok(old.id())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(SceneNode::children).unwrap_or(&[])
    }

    pub fn for_each_child(
        &self,
        parent_name: &str,
        mut f: impl FnMut(NodeId, &SceneNode),
    ) -> Result<()> {
        let parent = self.lookup(parent_name)?;
        for &child in self.children(parent) {
            if let Some(node) = self.get(child) {
                f(child, node);
            }
        }
        Ok(())
    }

    /// Visit `id` and every descendant, parents first
    pub fn visit_subtree_mut(&mut self, id: NodeId, mut f: impl FnMut(&mut SceneNode)) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get_mut(current) {
                f(node);
                stack.extend(node.children.iter().rev());
            }
        }
    }

    /// Depth-first walk from the root in child order, with world matrices
    pub fn visit_world(&self, mut f: impl FnMut(NodeId, &SceneNode, Mat4)) {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            let world = parent_world * node.transform.matrix();
            f(id, node, world);
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Index entries that no longer point at a live node carrying that name.
    /// Always empty unless the index is corrupted.
    pub fn orphaned_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|(name, id)| self.get(**id).and_then(SceneNode::name) != Some(name.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn is_geometry_live(&self, id: GeometryId) -> bool {
        self.resources.is_live(id)
    }

    pub fn live_geometry_count(&self) -> usize {
        self.resources.live_count()
    }

    pub fn released_geometry_total(&self) -> u64 {
        self.resources.released_total()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
