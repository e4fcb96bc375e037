use std::collections::BTreeMap;
use glam::Vec2;
use crate::api::types::NodeId;
use crate::components::color::Color;
use crate::components::emitter::ParticleEmitter;
use crate::components::graphics::Graphics;
use crate::components::sprite::{ImageSprite, TextLabel};
use crate::core::node::{Node, NodeKind, NodeSnapshot, WorldTransform};

/// Retained display tree.
///
/// Nodes without a parent hang off the stage root. Only `Container` nodes
/// accept children. All setters are silent no-ops for unknown ids so callers
/// can hold stale handles without crashing a frame.
pub struct Stage {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u32,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Add a node at the stage root. Returns its id.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        id
    }

    /// Add a node directly under `parent`. Falls back to the root if the
    /// parent is missing or not a container.
    pub fn add_to(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.set_parent(id, Some(parent));
        id
    }

    /// Remove a node and its whole subtree. Returns false if it was not present.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for child in node.children {
            self.destroy(child);
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Find the first node with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    // -- Hierarchy --

    /// Move `child` under `parent` (or to the root with `None`).
    /// Refuses non-container parents and cycles; returns whether it moved.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> bool {
        if !self.nodes.contains_key(&child) {
            return false;
        }
        if let Some(p) = parent {
            let ok = self.nodes.get(&p).map(|n| n.is_container()).unwrap_or(false);
            if !ok || p == child || self.is_ancestor(child, p) {
                log::warn!("stage: refusing to move {:?} under {:?}", child, p);
                return false;
            }
        }

        let old_parent = self.nodes.get(&child).and_then(|n| n.parent);
        if let Some(old) = old_parent {
            if let Some(node) = self.nodes.get_mut(&old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(p) = parent {
            if let Some(node) = self.nodes.get_mut(&p) {
                node.children.push(child);
            }
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }
        true
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.nodes.get(&p).and_then(|n| n.parent);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    // -- Per-object mutators --

    pub fn set_position(&mut self, id: NodeId, pos: Vec2) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.pos = pos;
        }
    }

    pub fn set_depth(&mut self, id: NodeId, depth: f32) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.depth = depth;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.visible = visible;
        }
    }

    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.alpha = alpha;
        }
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.scale = scale;
        }
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: f32) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.rotation = rotation;
        }
    }

    pub fn set_tint(&mut self, id: NodeId, tint: Option<Color>) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.tint = tint;
        }
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.nodes.get(&id).map(|n| n.pos)
    }

    pub fn depth(&self, id: NodeId) -> Option<f32> {
        self.nodes.get(&id).map(|n| n.depth)
    }

    pub fn rotation(&self, id: NodeId) -> Option<f32> {
        self.nodes.get(&id).map(|n| n.rotation)
    }

    // -- Kind accessors --

    pub fn graphics(&self, id: NodeId) -> Option<&Graphics> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Graphics(g)) => Some(g),
            _ => None,
        }
    }

    pub fn graphics_mut(&mut self, id: NodeId) -> Option<&mut Graphics> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Graphics(g)) => Some(g),
            _ => None,
        }
    }

    pub fn emitter_mut(&mut self, id: NodeId) -> Option<&mut ParticleEmitter> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Emitter(e)) => Some(e),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&TextLabel> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut TextLabel> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    pub fn image_mut(&mut self, id: NodeId) -> Option<&mut ImageSprite> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Image(i)) => Some(i),
            _ => None,
        }
    }

    // -- Snapshots --

    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        self.nodes.get(&id).map(|n| n.snapshot())
    }

    /// Put a node back exactly as captured: parent first, then placement.
    pub fn restore(&mut self, id: NodeId, snapshot: &NodeSnapshot) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        if self.parent(id) != snapshot.parent {
            self.set_parent(id, snapshot.parent);
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.pos = snapshot.pos;
            n.scale = snapshot.scale;
            n.depth = snapshot.depth;
            n.alpha = snapshot.alpha;
            n.visible = snapshot.visible;
        }
    }

    // -- Transforms --

    /// Accumulated transform from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Option<WorldTransform> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.nodes.get(&cid)?;
            chain.push(node);
            current = node.parent;
        }
        let mut t = WorldTransform::IDENTITY;
        for node in chain.iter().rev() {
            t = t.then(node.pos, node.rotation, node.scale, node.alpha);
        }
        Some(t)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec2> {
        self.world_transform(id).map(|t| t.pos)
    }

    /// Convert a point in `space`'s local coordinates to stage coordinates.
    /// `None` means the point is already in stage coordinates.
    pub fn local_to_world(&self, space: Option<NodeId>, local: Vec2) -> Vec2 {
        match space.and_then(|id| self.world_transform(id)) {
            Some(t) => t.apply(local),
            None => local,
        }
    }

    /// Whether the node and all its ancestors are visible.
    pub fn is_shown(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.nodes.get(&cid) {
                Some(n) if n.visible => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn sorted(&self, ids: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = ids.collect();
        ids.sort_by(|a, b| {
            let da = self.nodes.get(a).map(|n| n.depth).unwrap_or(0.0);
            let db = self.nodes.get(b).map(|n| n.depth).unwrap_or(0.0);
            da.total_cmp(&db).then(a.cmp(b))
        });
        ids
    }

    /// Visit every visible drawable node back-to-front with its world transform.
    /// Siblings are ordered by depth, ties broken by creation order.
    pub fn walk_visible(&self, mut visit: impl FnMut(&Node, &WorldTransform)) {
        let roots = self.sorted(self.nodes.values().filter(|n| n.parent.is_none()).map(|n| n.id));
        for root in roots {
            self.walk_recursive(root, &WorldTransform::IDENTITY, &mut visit);
        }
    }

    fn walk_recursive(
        &self,
        id: NodeId,
        parent: &WorldTransform,
        visit: &mut impl FnMut(&Node, &WorldTransform),
    ) {
        let Some(node) = self.nodes.get(&id) else { return };
        if !node.visible || node.alpha <= 0.0 {
            return;
        }
        let world = parent.then(node.pos, node.rotation, node.scale, node.alpha);
        if node.is_container() {
            for child in self.sorted(node.children.iter().copied()) {
                self.walk_recursive(child, &world, visit);
            }
        } else {
            visit(node, &world);
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let mut stage = Stage::new();
        let id = stage.add(Node::circle(3.0, Color::RED).with_pos(Vec2::new(10.0, 20.0)));
        assert_eq!(stage.get(id).unwrap().pos, Vec2::new(10.0, 20.0));
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn destroy_removes_subtree_once() {
        let mut stage = Stage::new();
        let root = stage.add(Node::container());
        let child = stage.add_to(root, Node::graphics());
        assert!(stage.destroy(root));
        assert!(!stage.contains(child));
        assert!(!stage.destroy(root));
        assert!(stage.is_empty());
    }

    #[test]
    fn reparenting_updates_both_sides() {
        let mut stage = Stage::new();
        let a = stage.add(Node::container());
        let b = stage.add(Node::container());
        let child = stage.add_to(a, Node::circle(1.0, Color::WHITE));
        assert_eq!(stage.children(a), &[child]);

        assert!(stage.set_parent(child, Some(b)));
        assert!(stage.children(a).is_empty());
        assert_eq!(stage.children(b), &[child]);
        assert_eq!(stage.parent(child), Some(b));

        assert!(stage.set_parent(child, None));
        assert_eq!(stage.parent(child), None);
    }

    #[test]
    fn rejects_cycles_and_leaf_parents() {
        let mut stage = Stage::new();
        let outer = stage.add(Node::container());
        let inner = stage.add_to(outer, Node::container());
        let leaf = stage.add(Node::graphics());
        assert!(!stage.set_parent(outer, Some(inner)));
        assert!(!stage.set_parent(outer, Some(leaf)));
        assert!(!stage.set_parent(outer, Some(outer)));
    }

    #[test]
    fn world_position_accumulates() {
        let mut stage = Stage::new();
        let layer = stage.add(Node::container().with_pos(Vec2::new(100.0, 50.0)));
        let dot = stage.add_to(layer, Node::circle(1.0, Color::WHITE).with_pos(Vec2::new(5.0, 5.0)));
        assert_eq!(stage.world_position(dot), Some(Vec2::new(105.0, 55.0)));
        assert_eq!(stage.local_to_world(Some(layer), Vec2::new(1.0, 1.0)), Vec2::new(101.0, 51.0));
        assert_eq!(stage.local_to_world(None, Vec2::new(1.0, 1.0)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut stage = Stage::new();
        let home = stage.add(Node::container());
        let away = stage.add(Node::container());
        let n = stage.add_to(home, Node::graphics().with_pos(Vec2::new(3.0, 4.0)).with_depth(2.0).with_alpha(0.4));
        let snap = stage.snapshot(n).unwrap();

        stage.set_parent(n, Some(away));
        stage.set_position(n, Vec2::ZERO);
        stage.set_depth(n, 99.0);
        stage.set_alpha(n, 1.0);
        stage.set_visible(n, false);
        stage.set_scale(n, Vec2::splat(3.0));

        stage.restore(n, &snap);
        assert_eq!(stage.snapshot(n).unwrap(), snap);
        assert_eq!(stage.children(home), &[n]);
        assert!(stage.children(away).is_empty());
    }

    #[test]
    fn walk_orders_by_depth_and_skips_hidden() {
        let mut stage = Stage::new();
        let top = stage.add(Node::circle(1.0, Color::WHITE).with_depth(5.0));
        let bottom = stage.add(Node::circle(1.0, Color::WHITE).with_depth(-1.0));
        let _hidden = stage.add(Node::circle(1.0, Color::WHITE).with_visible(false));
        let mut order = Vec::new();
        stage.walk_visible(|n, _| order.push(n.id));
        assert_eq!(order, vec![bottom, top]);
    }

    #[test]
    fn setters_ignore_unknown_ids() {
        let mut stage = Stage::new();
        stage.set_position(NodeId(77), Vec2::ONE);
        stage.set_depth(NodeId(77), 1.0);
        assert!(stage.snapshot(NodeId(77)).is_none());
        assert!(!stage.is_shown(NodeId(77)));
    }
}
