use crate::geometry::Geometry;
use crate::helpers::LightHelper;
use crate::light::Light;
use crate::material::Material;
use cottage_common::{Color, NodeId, Transform};
use glam::Mat4;
use std::collections::BTreeMap;

/// Most events kept between drains; older ones are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// A record of every structural change to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added { id: NodeId, parent: Option<NodeId> },
    /// Node removed together with `descendants` other nodes.
    Removed { id: NodeId, descendants: usize },
    TransformUpdated { id: NodeId, old: Transform, new: Transform },
}

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node not found: {0:?}")]
    NotFound(NodeId),
}

/// Geometry plus material of a drawable node.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub material: Material,
}

/// What a node contributes to the rendered image.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
    Light(Light),
    Helper(LightHelper),
}

/// A node in the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh(MeshNode { geometry, material }))
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        }
    }
}

/// The scene: a forest of nodes under an implicit root, plus a background.
///
/// Nodes are stored in a BTreeMap; ordered traversal goes through `walk`,
/// which follows insertion order of roots and children.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    pub background: Color,
    event_log: Vec<SceneEvent>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            background: Color::from_hex(0x000000),
            event_log: Vec::new(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node directly under the scene root.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        self.roots.push(id);
        self.record(SceneEvent::Added { id, parent: None });
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::NotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        self.record(SceneEvent::Added {
            id,
            parent: Some(parent),
        });
        Ok(id)
    }

    /// Remove a node and its whole subtree. Returns the removed node.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut descendants = 0;
        let mut stack = node.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(c) = self.nodes.remove(&child) {
                stack.extend(c.children);
                descendants += 1;
            }
        }
        self.record(SceneEvent::Removed { id, descendants });
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Mutable access to a light node's light.
    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Light(l)) => Some(l),
            _ => None,
        }
    }

    /// Replace a node's local transform and log the change.
    pub fn set_transform(&mut self, id: NodeId, new: Transform) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        let old = node.transform;
        node.transform = new;
        self.record(SceneEvent::TransformUpdated { id, old, new });
        Ok(())
    }

    /// Model matrix of a node: its local transform composed with every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            m = node.transform.matrix() * m;
        }
        Some(m)
    }

    /// A node is drawn only if it and all its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            if !node.visible {
                return false;
            }
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        self.nodes.contains_key(&id)
    }

    /// Depth-first traversal in insertion order, with each node's depth.
    pub fn walk(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|r| (*r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push((id, depth));
                stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        out
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// First node with the given name in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.walk()
            .into_iter()
            .map(|(id, _)| id)
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn record(&mut self, event: SceneEvent) {
        if self.event_log.len() >= EVENT_LOG_CAPACITY {
            let excess = self.event_log.len() + 1 - EVENT_LOG_CAPACITY;
            self.event_log.drain(..excess);
        }
        self.event_log.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn group(name: &str) -> Node {
        Node::new(name, NodeKind::Group)
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new();
        assert_eq!(s.node_count(), 0);
        assert!(s.walk().is_empty());
    }

    #[test]
    fn add_child_links_parent() {
        let mut s = Scene::new();
        let house = s.add(group("house"));
        let roof = s.add_child(house, group("roof")).unwrap();
        assert_eq!(s.get(roof).unwrap().parent(), Some(house));
        assert_eq!(s.get(house).unwrap().children(), &[roof]);
        assert_eq!(s.roots(), &[house]);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut s = Scene::new();
        let result = s.add_child(NodeId::new(), group("orphan"));
        assert!(matches!(result, Err(SceneError::NotFound(_))));
        assert_eq!(s.node_count(), 0);
    }

    #[test]
    fn remove_takes_subtree() {
        let mut s = Scene::new();
        let house = s.add(group("house"));
        let roof = s.add_child(house, group("roof")).unwrap();
        s.add_child(roof, group("tile")).unwrap();
        let floor = s.add(group("floor"));

        s.remove(house).unwrap();
        assert_eq!(s.node_count(), 1);
        assert!(s.contains(floor));
        assert_eq!(
            s.events().last(),
            Some(&SceneEvent::Removed {
                id: house,
                descendants: 2
            })
        );
    }

    #[test]
    fn remove_child_detaches_from_parent() {
        let mut s = Scene::new();
        let house = s.add(group("house"));
        let door = s.add_child(house, group("door")).unwrap();
        s.remove(door);
        assert!(s.get(house).unwrap().children().is_empty());
        assert!(s.remove(door).is_none());
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut s = Scene::new();
        let house = s.add(group("house").with_transform(Transform::from_position(Vec3::new(2.0, 0.0, 0.0))));
        let roof = s
            .add_child(
                house,
                group("roof").with_transform(Transform::from_position(Vec3::new(0.0, 2.2, 0.0))),
            )
            .unwrap();
        let p = s.world_matrix(roof).unwrap().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 2.2, 0.0), 1e-6));
    }

    #[test]
    fn hidden_parent_hides_child() {
        let mut s = Scene::new();
        let house = s.add(group("house"));
        let roof = s.add_child(house, group("roof")).unwrap();
        assert!(s.is_visible(roof));
        s.get_mut(house).unwrap().visible = false;
        assert!(!s.is_visible(roof));
        assert!(!s.is_visible(NodeId::new()));
    }

    #[test]
    fn walk_follows_insertion_order() {
        let mut s = Scene::new();
        let a = s.add(group("a"));
        let a1 = s.add_child(a, group("a1")).unwrap();
        let a2 = s.add_child(a, group("a2")).unwrap();
        let b = s.add(group("b"));
        assert_eq!(s.walk(), vec![(a, 0), (a1, 1), (a2, 1), (b, 0)]);
        assert_eq!(s.find_by_name("a2"), Some(a2));
        assert_eq!(s.find_by_name("zzz"), None);
    }

    #[test]
    fn set_transform_logs_event() {
        let mut s = Scene::new();
        let id = s.add(group("house"));
        s.drain_events();
        let new = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        s.set_transform(id, new).unwrap();
        assert_eq!(s.get(id).unwrap().transform, new);
        assert_eq!(s.events().len(), 1);
        assert!(s.set_transform(NodeId::new(), new).is_err());
    }

    #[test]
    fn undrained_log_is_bounded() {
        let mut s = Scene::new();
        let id = s.add(group("house"));
        for i in 0..EVENT_LOG_CAPACITY + 10 {
            let t = Transform::from_position(Vec3::new(i as f32, 0.0, 0.0));
            s.set_transform(id, t).unwrap();
        }
        assert_eq!(s.events().len(), EVENT_LOG_CAPACITY);
        let last = Transform::from_position(Vec3::new((EVENT_LOG_CAPACITY + 9) as f32, 0.0, 0.0));
        assert!(matches!(
            s.events().last(),
            Some(SceneEvent::TransformUpdated { new, .. }) if *new == last
        ));
        assert!(!s.events().iter().any(|e| matches!(e, SceneEvent::Added { .. })));
    }
}
