//! Tree operations: create, append, detach, remove, walk, and counted mutation.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ElementData, NodeId, Rect};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Nodes may exist detached (no parent) until they are appended somewhere.
///
/// Every write that changes an observable value bumps [`mutation_count`]; writes
/// that store an identical value do not. Render passes rely on this to prove they
/// are idempotent.
///
/// [`mutation_count`]: Dom::mutation_count
pub struct Dom {
    nodes: SlotMap<NodeId, ElementData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    mutations: u64,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            mutations: 0,
        }
    }

    /// Create a detached node.
    pub fn create(&mut self, data: ElementData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// Returns `false` (and does nothing) if either node is missing or if the
    /// move would make a node its own ancestor.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return false;
        }
        self.unlink(child);
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(child);
        }
        self.mutations += 1;
        true
    }

    /// Detach a node (and its subtree) from its parent. Returns `true` if it had one.
    pub fn detach(&mut self, node: NodeId) -> bool {
        if self.unlink(node) {
            self.mutations += 1;
            true
        } else {
            false
        }
    }

    fn unlink(&mut self, node: NodeId) -> bool {
        match self.parent.remove(node) {
            Some(old_parent) => {
                if let Some(siblings) = self.children.get_mut(old_parent) {
                    siblings.retain(|&c| c != node);
                }
                true
            }
            None => false,
        }
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the ids of every removed node (the node itself first), or an
    /// empty vec if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }
        self.unlink(id);

        // Collect all descendants (BFS) to remove them.
        let mut removed = Vec::new();
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            if self.nodes.remove(current).is_some() {
                removed.push(current);
            }
        }
        self.mutations += 1;
        removed
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the topmost ancestor.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Topmost ancestor of `id` (or `id` itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).contains(&ancestor)
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    /// Iterate over all `(NodeId, &ElementData)` pairs in the arena.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ElementData)> {
        self.nodes.iter()
    }

    /// Number of nodes in the DOM.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start` (inclusive).
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // Counted writes
    // -----------------------------------------------------------------------

    /// Set an attribute. Returns `true` if the value changed.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|data| data.set_attr(name, value));
        self.count(changed)
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|data| data.remove_attr(name));
        self.count(changed)
    }

    /// Set an inline style property. Returns `true` if the value changed.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> bool {
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|data| data.set_style(property, value));
        self.count(changed)
    }

    /// Remove an inline style property. Returns `true` if it was present.
    pub fn remove_style(&mut self, id: NodeId, property: &str) -> bool {
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|data| data.remove_style(property));
        self.count(changed)
    }

    /// Replace the text content. Returns `true` if it changed.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let changed = match self.nodes.get_mut(id) {
            Some(data) if data.text != text => {
                text.clone_into(&mut data.text);
                true
            }
            _ => false,
        };
        self.count(changed)
    }

    /// Assign a layout box. Geometry is host input, not a DOM mutation.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.rect = rect;
        }
    }

    fn count(&mut self, changed: bool) -> bool {
        if changed {
            self.mutations += 1;
        }
        changed
    }

    /// Number of observable changes made so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create(ElementData::new("body"));
        let a = dom.create(ElementData::new("section").with_attr("id", "a"));
        let b = dom.create(ElementData::new("section").with_attr("id", "b"));
        let c = dom.create(ElementData::new("button").with_attr("id", "c"));
        let d = dom.create(ElementData::new("span").with_attr("id", "d"));
        dom.append_child(root, a);
        dom.append_child(root, b);
        dom.append_child(a, c);
        dom.append_child(a, d);
        (dom, root, a, b, c, d)
    }

    #[test]
    fn create_is_detached() {
        let mut dom = Dom::new();
        let id = dom.create(ElementData::new("div"));
        assert_eq!(dom.parent(id), None);
        assert_eq!(dom.root_of(id), id);
    }

    #[test]
    fn append_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn children_list() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn append_child_moves_existing_node() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        assert!(dom.append_child(b, c));
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn append_child_rejects_cycles() {
        let (mut dom, root, a, _b, c, _d) = build_tree();
        assert!(!dom.append_child(c, a));
        assert!(!dom.append_child(a, a));
        assert_eq!(dom.parent(a), Some(root));
    }

    #[test]
    fn ancestors_and_root_of() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.ancestors(root).is_empty());
        assert_eq!(dom.root_of(c), root);
        assert!(dom.is_inclusive_ancestor(a, c));
        assert!(dom.is_inclusive_ancestor(c, c));
        assert!(!dom.is_inclusive_ancestor(c, a));
    }

    #[test]
    fn detach_keeps_subtree() {
        let (mut dom, root, a, _b, c, _d) = build_tree();
        assert!(dom.detach(a));
        assert!(!dom.detach(a));
        assert_eq!(dom.parent(a), None);
        assert_eq!(dom.parent(c), Some(a));
        assert!(!dom.children(root).contains(&a));
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let removed = dom.remove(a);
        assert_eq!(removed, vec![a, c, d]);
        assert!(!dom.contains(c));
        assert!(dom.contains(b));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.create(ElementData::new("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_empty());
        assert!(dom.is_empty());
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }

    // ── Mutation counting ────────────────────────────────────────────

    #[test]
    fn identical_writes_are_not_counted() {
        let (mut dom, _root, a, ..) = build_tree();
        let before = dom.mutation_count();
        assert!(dom.set_attr(a, "data-state", "open"));
        assert!(!dom.set_attr(a, "data-state", "open"));
        assert!(!dom.remove_attr(a, "hidden"));
        assert!(dom.set_style(a, "width", "10%"));
        assert!(!dom.set_style(a, "width", "10%"));
        assert!(dom.set_text(a, "hi"));
        assert!(!dom.set_text(a, "hi"));
        assert_eq!(dom.mutation_count(), before + 3);
    }

    #[test]
    fn rect_is_not_a_mutation() {
        let (mut dom, _root, a, ..) = build_tree();
        let before = dom.mutation_count();
        dom.set_rect(a, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(dom.mutation_count(), before);
        assert_eq!(dom.get(a).unwrap().rect.width, 10.0);
    }

    #[test]
    fn writes_to_missing_nodes_are_ignored() {
        let mut dom = Dom::new();
        let id = dom.create(ElementData::new("x"));
        dom.remove(id);
        let before = dom.mutation_count();
        assert!(!dom.set_attr(id, "a", "b"));
        assert_eq!(dom.mutation_count(), before);
    }
}
