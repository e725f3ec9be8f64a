// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, layout queries, listeners, frames.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size, Vec2};

use crate::types::{
    EventKind, FrameCallback, Listener, ListenerId, LocalNode, NodeFlags, NodeId, NodeKind,
};

/// An in-memory retained document.
///
/// The document always has a root node of kind [`NodeKind::Document`] with one
/// `html` child, which in turn has one `body` child.
/// Other nodes are created detached with [`Document::create_element`] and attached
/// with [`Document::append_child`].
pub struct Document {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    document_element: NodeId,
    body: NodeId,
    viewport: Size,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
    next_listener: u64,
    frames: Vec<FrameCallback>,
    frames_enabled: bool,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners.len())
            .field("pending_frames", &self.frames.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
        }
    }
}

impl Document {
    /// Create a document whose viewport (and `html`/`body` boxes) have the given size.
    pub fn new(viewport: Size) -> Self {
        let placeholder = NodeId::new(0, 0);
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: placeholder,
            document_element: placeholder,
            body: placeholder,
            viewport,
            listeners: Vec::new(),
            next_listener: 1,
            frames: Vec::new(),
            frames_enabled: true,
        };
        let page = Rect::from_origin_size(Point::ZERO, viewport);
        let root = doc.create_element(LocalNode {
            kind: NodeKind::Document,
            tag: "#document",
            ..Default::default()
        });
        let html = doc.create_element(LocalNode::element("html", page));
        let body = doc.create_element(LocalNode::element("body", page));
        doc.link_parent(html, root);
        doc.link_parent(body, html);
        doc.root = root;
        doc.document_element = html;
        doc.body = body;
        doc
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `html` element.
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a new detached element.
    pub fn create_element(&mut self, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Append `child` as the last child of `parent`, moving it if it already has a parent.
    ///
    /// Returns false (and changes nothing) if either id is stale, if `child` is the
    /// document node, or if `child` contains `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) || child == self.root {
            return false;
        }
        if self.contains(child, parent) {
            return false;
        }
        if let Some(old) = self.node(child).parent {
            self.unlink_parent(child, old);
        }
        self.link_parent(child, parent);
        true
    }

    /// Detach `id` from its parent. The node (and its subtree) stay alive.
    ///
    /// Removing a node that has no parent is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
    }

    /// Detach and free a node and its subtree. Existing ids for them become stale.
    ///
    /// The document node cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.root {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.destroy(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Structural parent of `id`, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Children of `id` in order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// Local data of `id`.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node_opt(id).map(|n| &n.local)
    }

    /// True if `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// True if `id` is attached (transitively) to the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Path from the topmost ancestor to `id` (inclusive). Empty for stale ids.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = if self.is_alive(id) { Some(id) } else { None };
        while let Some(c) = cur {
            out.push(c);
            cur = self.parent(c);
        }
        out.reverse();
        out
    }

    /// Current viewport rectangle (always at the origin).
    pub fn viewport(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.viewport)
    }

    /// Resize the viewport without notifying listeners.
    ///
    /// See [`resize_viewport`](crate::resize_viewport) for the notifying variant.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        let page = Rect::from_origin_size(Point::ZERO, size);
        let (html, body) = (self.document_element, self.body);
        self.set_local_bounds(html, page);
        self.set_local_bounds(body, page);
    }

    /// Viewport-space rectangle of `id`. [`Rect::ZERO`] for stale ids.
    ///
    /// A node's origin is its local origin, plus its parent's origin, minus the
    /// parent's scroll offset, up to the first [`NodeFlags::FIXED`] node or the top.
    pub fn bounding_rect(&self, id: NodeId) -> Rect {
        let Some(node) = self.node_opt(id) else {
            return Rect::ZERO;
        };
        let size = node.local.local_bounds.size();
        let mut origin = Vec2::ZERO;
        let mut cur = node;
        loop {
            origin += cur.local.local_bounds.origin().to_vec2();
            if cur.local.flags.contains(NodeFlags::FIXED) {
                break;
            }
            let Some(parent) = cur.parent.and_then(|p| self.node_opt(p)) else {
                break;
            };
            origin -= parent.local.scroll_offset;
            cur = parent;
        }
        Rect::from_origin_size(origin.to_point(), size)
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_bounds = bounds;
        }
    }

    /// Move a node, keeping its size.
    pub fn set_origin(&mut self, id: NodeId, origin: Point) {
        if let Some(n) = self.node_opt_mut(id) {
            let size = n.local.local_bounds.size();
            n.local.local_bounds = Rect::from_origin_size(origin, size);
        }
    }

    /// Resize a node, keeping its origin.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(n) = self.node_opt_mut(id) {
            let origin = n.local.local_bounds.origin();
            n.local.local_bounds = Rect::from_origin_size(origin, size);
        }
    }

    /// Update scroll offset without notifying listeners.
    ///
    /// See [`scroll_to`](crate::scroll_to) for the notifying variant.
    pub fn set_scroll_offset(&mut self, id: NodeId, offset: Vec2) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.scroll_offset = offset;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.z_index = z;
        }
    }

    /// Replace the class list.
    pub fn set_class_name(&mut self, id: NodeId, class_name: Option<&str>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.class_name = class_name.map(String::from);
        }
    }

    /// Replace the node's own text.
    pub fn set_text(&mut self, id: NodeId, text: Option<&str>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.text = text.map(String::from);
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Concatenated text of `id` and its descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.walk(id, &mut |n| {
            if let Some(t) = &n.local.text {
                out.push_str(t);
            }
            false
        });
        out
    }

    /// First connected node, in document order, whose class list contains `class`.
    pub fn query_class(&self, class: &str) -> Option<NodeId> {
        self.query_class_in(self.root, class)
    }

    /// First node in the subtree of `scope` (inclusive) whose class list contains `class`.
    pub fn query_class_in(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk_ids(scope, &mut |id, n| {
            if n.local.has_class(class) {
                found = Some(id);
                return true;
            }
            false
        });
        found
    }

    // --- listeners and frames ---

    /// Register an event listener.
    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, kind, listener));
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// True while `id` is registered.
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(l, _, _)| *l == id)
    }

    /// Listeners registered for `kind`, in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<(ListenerId, Listener)> {
        self.listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(id, _, l)| (*id, l.clone()))
            .collect()
    }

    /// Queue a callback for the next animation frame.
    ///
    /// When frames are disabled the callback is handed back.
    pub fn request_animation_frame(
        &mut self,
        callback: FrameCallback,
    ) -> Result<(), FrameCallback> {
        if !self.frames_enabled {
            return Err(callback);
        }
        self.frames.push(callback);
        Ok(())
    }

    /// Enable or disable animation frames (see [`Document::request_animation_frame`]).
    pub fn set_frames_enabled(&mut self, enabled: bool) {
        self.frames_enabled = enabled;
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Take every callback queued for the next frame.
    ///
    /// Callbacks queued while running these belong to the following frame.
    pub fn take_frames(&mut self) -> Vec<FrameCallback> {
        core::mem::take(&mut self.frames)
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.generation()).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.generation() {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    /// Pre-order walk; `f` returns true to stop.
    fn walk(&self, id: NodeId, f: &mut dyn FnMut(&Node) -> bool) {
        self.walk_ids(id, &mut |_, n| f(n));
    }

    fn walk_ids(&self, id: NodeId, f: &mut dyn FnMut(NodeId, &Node) -> bool) {
        let mut stack = Vec::new();
        if self.is_alive(id) {
            stack.push(id);
        }
        while let Some(cur) = stack.pop() {
            let n = self.node(cur);
            if f(cur, n) {
                return;
            }
            stack.extend(n.children.iter().rev().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn skeleton() {
        let d = doc();
        assert_eq!(d.path(d.body()), [d.root(), d.document_element(), d.body()]);
        assert!(d.is_connected(d.body()));
        assert_eq!(d.viewport(), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(d.local(d.root()).map(|l| l.kind), Some(NodeKind::Document));
    }

    #[test]
    fn append_remove_and_contains() {
        let mut d = doc();
        let app = d.create_element(LocalNode::element("div", Rect::new(0.0, 0.0, 100.0, 100.0)));
        let a = d.create_element(LocalNode::element("span", Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!d.is_connected(app));

        assert!(d.append_child(d.body(), app));
        assert!(d.append_child(app, a));
        assert!(d.is_connected(a));
        assert!(d.contains(app, a));
        assert!(d.contains(a, a), "contains is inclusive");
        assert!(!d.contains(a, app));

        // Cycles are refused.
        assert!(!d.append_child(a, app));
        assert_eq!(d.parent(app), Some(d.body()));

        d.remove(app);
        assert!(!d.is_connected(a));
        assert!(d.is_alive(a), "remove keeps nodes alive");
        // Removing twice is fine.
        d.remove(app);
        assert_eq!(d.parent(app), None);
    }

    #[test]
    fn append_moves_between_parents() {
        let mut d = doc();
        let p1 = d.create_element(LocalNode::default());
        let p2 = d.create_element(LocalNode::default());
        let c = d.create_element(LocalNode::default());
        d.append_child(p1, c);
        d.append_child(p2, c);
        assert!(d.children(p1).is_empty());
        assert_eq!(d.children(p2), &[c]);
    }

    #[test]
    fn liveness_destroy_reuse() {
        let mut d = doc();
        let a = d.create_element(LocalNode::default());
        let child = d.create_element(LocalNode::default());
        d.append_child(d.body(), a);
        d.append_child(a, child);

        d.destroy(a);
        assert!(!d.is_alive(a));
        assert!(!d.is_alive(child), "destroy frees the subtree");
        assert!(d.children(d.body()).is_empty());

        let b = d.create_element(LocalNode::default());
        assert!(d.is_alive(b));
        assert!(!d.is_alive(a));
        if a.0 == b.0 || child.0 == b.0 {
            assert!(b.1 > 1, "generation must increase on reuse");
        }

        // The document node survives destroy.
        let root = d.root();
        d.destroy(root);
        assert!(d.is_alive(root));
    }

    #[test]
    fn bounding_rect_follows_parents_and_scroll() {
        let mut d = doc();
        let scroller =
            d.create_element(LocalNode::element("div", Rect::new(10.0, 20.0, 210.0, 220.0)));
        let item = d.create_element(LocalNode::element("div", Rect::new(5.0, 100.0, 55.0, 120.0)));
        d.append_child(d.body(), scroller);
        d.append_child(scroller, item);
        assert_eq!(d.bounding_rect(item), Rect::new(15.0, 120.0, 65.0, 140.0));

        d.set_scroll_offset(scroller, Vec2::new(0.0, 50.0));
        assert_eq!(d.bounding_rect(item), Rect::new(15.0, 70.0, 65.0, 90.0));

        // Fixed nodes ignore ancestors.
        let fixed = d.create_element(LocalNode {
            flags: NodeFlags::FIXED,
            ..LocalNode::element("div", Rect::new(300.0, 300.0, 320.0, 310.0))
        });
        d.append_child(scroller, fixed);
        assert_eq!(d.bounding_rect(fixed), Rect::new(300.0, 300.0, 320.0, 310.0));

        d.set_origin(item, Point::new(0.0, 0.0));
        d.set_size(item, Size::new(1.0, 2.0));
        d.set_scroll_offset(scroller, Vec2::ZERO);
        assert_eq!(d.bounding_rect(item), Rect::new(10.0, 20.0, 11.0, 22.0));

        d.set_flags(fixed, NodeFlags::empty());
        assert_eq!(d.bounding_rect(fixed), Rect::new(310.0, 320.0, 330.0, 330.0));
    }

    #[test]
    fn classes_and_text() {
        let mut d = doc();
        let outer = d.create_element(LocalNode::element("div", Rect::ZERO).with_class("menu open"));
        let inner = d.create_element(LocalNode::element("span", Rect::ZERO).with_text("foo"));
        let tail = d.create_element(LocalNode::element("span", Rect::ZERO).with_text("bar"));
        d.append_child(d.body(), outer);
        d.append_child(outer, inner);
        d.append_child(outer, tail);

        assert_eq!(d.query_class("open"), Some(outer));
        assert_eq!(d.query_class("men"), None);
        assert_eq!(d.text_content(outer), "foobar");

        d.set_class_name(outer, Some("closed"));
        assert_eq!(d.query_class("open"), None);
        d.set_text(inner, None);
        assert_eq!(d.text_content(outer), "bar");

        d.remove(outer);
        assert_eq!(d.query_class("closed"), None, "only connected nodes match");
        assert_eq!(d.query_class_in(outer, "closed"), Some(outer));
    }

    #[test]
    fn frames_can_be_disabled() {
        let mut d = doc();
        assert!(d.request_animation_frame(alloc::boxed::Box::new(|| {})).is_ok());
        assert_eq!(d.pending_frames(), 1);
        d.set_frames_enabled(false);
        assert!(d.request_animation_frame(alloc::boxed::Box::new(|| {})).is_err());
        assert_eq!(d.take_frames().len(), 1);
        assert_eq!(d.pending_frames(), 0);
    }

    #[test]
    fn viewport_resize_updates_page_boxes() {
        let mut d = doc();
        d.set_viewport(Size::new(1024.0, 768.0));
        assert_eq!(d.bounding_rect(d.body()), Rect::new(0.0, 0.0, 1024.0, 768.0));
    }
}
