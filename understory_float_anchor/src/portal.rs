// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Portal lifecycle: the container a float is rendered into.
//!
//! A [`Portal`] owns one container node. The container exists while a float is
//! present; it is attached to its mount target exactly while a usable anchor is known.
//! While attached, the portal holds one resize and one scroll listener on the host.

use alloc::vec::Vec;

use crate::anchors::AnchorMap;
use crate::error::FloatAnchorError;
use crate::host::{ContainerStyle, Host, HostListener, ListenKind};

/// A float container and its attachment state.
pub struct Portal<H: Host> {
    container: H::Node,
    mount_target: H::Node,
    attached: bool,
    listeners: Vec<H::ListenerKey>,
}

impl<H: Host> core::fmt::Debug for Portal<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Portal")
            .field("container", &self.container)
            .field("mount_target", &self.mount_target)
            .field("attached", &self.attached)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<H: Host> Portal<H> {
    /// Create a detached container destined for `mount_target`, styled with `style`.
    pub fn create(host: &mut H, mount_target: H::Node, style: &ContainerStyle) -> Self {
        let container = host.create_container();
        host.style_container(container, style);
        #[cfg(feature = "tracing")]
        tracing::debug!(?container, ?mount_target, "float container created");
        Self {
            container,
            mount_target,
            attached: false,
            listeners: Vec::new(),
        }
    }

    /// The container node.
    pub fn container(&self) -> H::Node {
        self.container
    }

    /// Where the container is mounted when attached.
    pub fn mount_target(&self) -> H::Node {
        self.mount_target
    }

    /// True while the container is mounted and listening.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Mount the container, record its anchor, and start listening.
    ///
    /// When already attached only the anchor is updated. Fails without side effects
    /// if the anchor is missing, the anchor lies inside this container, or the host
    /// refuses to mount the container.
    pub fn attach(
        &mut self,
        host: &mut H,
        anchors: &mut AnchorMap<H::Node>,
        anchor: Option<H::Node>,
        listener: HostListener<H::Node>,
    ) -> Result<(), FloatAnchorError> {
        let anchor = anchor.ok_or(FloatAnchorError::MissingAnchor)?;
        self.check_anchor(host, anchors, anchor)?;
        if !self.attached {
            if !host.append_child(self.mount_target, self.container) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    container = ?self.container,
                    mount_target = ?self.mount_target,
                    "mount target refused the float container"
                );
                return Err(FloatAnchorError::MountRejected);
            }
            self.listeners
                .push(host.listen(ListenKind::Resize, listener.clone()));
            self.listeners.push(host.listen(ListenKind::Scroll, listener));
            self.attached = true;
            #[cfg(feature = "tracing")]
            tracing::debug!(container = ?self.container, ?anchor, "float container attached");
        }
        anchors.set_anchor(self.container, Some(anchor));
        Ok(())
    }

    /// Point an attached container at a different anchor.
    ///
    /// An anchor inside this container is refused and the old anchor stays.
    pub fn rebind(
        &mut self,
        host: &H,
        anchors: &mut AnchorMap<H::Node>,
        anchor: H::Node,
    ) -> Result<(), FloatAnchorError> {
        if !self.attached {
            return Ok(());
        }
        self.check_anchor(host, anchors, anchor)?;
        anchors.set_anchor(self.container, Some(anchor));
        Ok(())
    }

    fn check_anchor(
        &self,
        host: &H,
        anchors: &AnchorMap<H::Node>,
        anchor: H::Node,
    ) -> Result<(), FloatAnchorError> {
        let parents = |n: &H::Node| host.parent_node(*n);
        if anchors.is_within(&parents, anchor, self.container) {
            return Err(FloatAnchorError::AnchorInsideFloat);
        }
        Ok(())
    }

    /// Unmount the container and stop listening. Idempotent.
    ///
    /// Listeners are removed before this returns, so no event reaches the owner afterwards.
    pub fn detach(&mut self, host: &mut H, anchors: &mut AnchorMap<H::Node>) {
        if !self.attached {
            return;
        }
        for key in self.listeners.drain(..) {
            host.unlisten(key);
        }
        host.remove_child(self.container);
        anchors.set_anchor(self.container, None);
        self.attached = false;
        #[cfg(feature = "tracing")]
        tracing::debug!(container = ?self.container, "float container detached");
    }

    /// Reapply cosmetic attributes.
    pub fn restyle(&self, host: &mut H, style: &ContainerStyle) {
        host.style_container(self.container, style);
    }

    /// Detach and free the container.
    pub fn destroy(mut self, host: &mut H, anchors: &mut AnchorMap<H::Node>) {
        self.detach(host, anchors);
        host.destroy_container(self.container);
        #[cfg(feature = "tracing")]
        tracing::debug!(container = ?self.container, "float container destroyed");
    }
}

#[cfg(all(test, feature = "float_tree_adapter"))]
mod tests {
    use super::*;
    use crate::host::HostEvent;
    use alloc::rc::Rc;
    use alloc::string::String;
    use kurbo::{Rect, Size};
    use understory_float_tree::{Document, LocalNode, NodeId};

    fn noop() -> HostListener<NodeId> {
        Rc::new(|_: &HostEvent<NodeId>| {})
    }

    fn doc_with_anchor() -> (Document, NodeId) {
        let mut doc = Document::new(Size::new(400.0, 300.0));
        let anchor =
            doc.create_element(LocalNode::element("button", Rect::new(10.0, 10.0, 60.0, 30.0)));
        let body = doc.body();
        doc.append_child(body, anchor);
        (doc, anchor)
    }

    fn style() -> ContainerStyle {
        ContainerStyle {
            z_index: Some(7),
            class_name: Some(String::from("popover")),
        }
    }

    #[test]
    fn attach_requires_an_anchor() {
        let (mut doc, _) = doc_with_anchor();
        let mut anchors = AnchorMap::new();
        let body = doc.body();
        let mut portal = Portal::create(&mut doc, body, &style());
        let err = portal.attach(&mut doc, &mut anchors, None, noop());
        assert_eq!(err, Err(FloatAnchorError::MissingAnchor));
        assert!(!portal.is_attached());
        assert!(!doc.is_connected(portal.container()));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn attach_and_detach_pair_up() {
        let (mut doc, anchor) = doc_with_anchor();
        let mut anchors = AnchorMap::new();
        let body = doc.body();
        let mut portal = Portal::create(&mut doc, body, &style());
        let c = portal.container();
        assert_eq!(doc.local(c).map(|l| l.z_index), Some(7));
        assert!(doc.local(c).is_some_and(|l| l.has_class("popover")));

        portal
            .attach(&mut doc, &mut anchors, Some(anchor), noop())
            .unwrap();
        portal
            .attach(&mut doc, &mut anchors, Some(anchor), noop())
            .unwrap();
        assert!(doc.is_connected(c));
        assert_eq!(doc.parent(c), Some(body));
        assert_eq!(anchors.anchor_of(c), Some(anchor));
        assert_eq!(doc.listener_count(), 2);

        portal.detach(&mut doc, &mut anchors);
        portal.detach(&mut doc, &mut anchors);
        assert!(!doc.is_connected(c));
        assert!(doc.is_alive(c));
        assert!(anchors.is_empty());
        assert_eq!(doc.listener_count(), 0);

        portal.destroy(&mut doc, &mut anchors);
        assert!(!doc.is_alive(c));
    }

    #[test]
    fn rebind_swaps_the_anchor() {
        let (mut doc, anchor) = doc_with_anchor();
        let other = doc.create_element(LocalNode::default());
        let body = doc.body();
        doc.append_child(body, other);
        let mut anchors = AnchorMap::new();
        let mut portal = Portal::create(&mut doc, body, &ContainerStyle::default());
        portal
            .attach(&mut doc, &mut anchors, Some(anchor), noop())
            .unwrap();
        portal.rebind(&doc, &mut anchors, other).unwrap();
        assert_eq!(anchors.anchor_of(portal.container()), Some(other));
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn refused_mount_leaves_the_portal_detached() {
        let (mut doc, anchor) = doc_with_anchor();
        let gone = doc.create_element(LocalNode::default());
        doc.destroy(gone);
        let mut anchors = AnchorMap::new();
        let mut portal = Portal::create(&mut doc, gone, &style());
        let err = portal.attach(&mut doc, &mut anchors, Some(anchor), noop());
        assert_eq!(err, Err(FloatAnchorError::MountRejected));
        assert!(!portal.is_attached());
        assert!(!doc.is_connected(portal.container()));
        assert!(anchors.is_empty());
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn anchors_inside_the_container_are_refused() {
        let (mut doc, anchor) = doc_with_anchor();
        let body = doc.body();
        let mut anchors = AnchorMap::new();
        let mut portal = Portal::create(&mut doc, body, &style());
        let c = portal.container();
        let inside = doc.create_element(LocalNode::default());
        doc.append_child(c, inside);

        let err = portal.attach(&mut doc, &mut anchors, Some(inside), noop());
        assert_eq!(err, Err(FloatAnchorError::AnchorInsideFloat));
        assert!(!portal.is_attached());
        assert_eq!(doc.listener_count(), 0);

        portal
            .attach(&mut doc, &mut anchors, Some(anchor), noop())
            .unwrap();
        let err = portal.rebind(&doc, &mut anchors, inside);
        assert_eq!(err, Err(FloatAnchorError::AnchorInsideFloat));
        assert_eq!(anchors.anchor_of(c), Some(anchor));
    }
}
