// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float tree adapter: run float anchors against an Understory Float Tree [`Document`].
//!
//! Containers are fixed-position `div`s. Float content is a [`FloatBody`]: text,
//! a size (the document does not measure text), and an optional class list. It is
//! rendered into a single content node, the container's first child, and the
//! container takes the content's size so the resolver can measure it.

use alloc::rc::Rc;
use alloc::string::String;

use kurbo::{Point, Rect, Size};
use understory_float_tree::{Document, Event, EventKind, ListenerId, LocalNode, NodeFlags, NodeId};

use crate::host::{ContainerStyle, FrameCallback, Host, HostEvent, HostListener, ListenKind};

/// Float content for a [`Document`] host.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatBody {
    /// Text of the content node.
    pub text: String,
    /// Size of the content node.
    pub size: Size,
    /// Class list of the content node.
    pub class_name: Option<String>,
}

impl FloatBody {
    /// Content with `text` laid out at `size`.
    pub fn new(text: &str, size: Size) -> Self {
        Self {
            text: text.into(),
            size,
            class_name: None,
        }
    }

    /// Set the class list.
    #[must_use]
    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

/// The node float content was rendered into, if any.
pub fn content_node(doc: &Document, container: NodeId) -> Option<NodeId> {
    doc.children(container).first().copied()
}

impl Host for Document {
    type Node = NodeId;
    type Content = FloatBody;
    type ListenerKey = ListenerId;

    fn body(&self) -> NodeId {
        Self::body(self)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        Self::contains(self, ancestor, node)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        Self::is_connected(self, node)
    }

    fn create_container(&mut self) -> NodeId {
        self.create_element(LocalNode {
            flags: NodeFlags::FIXED,
            ..LocalNode::element("div", Rect::ZERO)
        })
    }

    fn destroy_container(&mut self, container: NodeId) {
        self.destroy(container);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        Self::append_child(self, parent, child)
    }

    fn remove_child(&mut self, node: NodeId) {
        self.remove(node);
    }

    fn style_container(&mut self, container: NodeId, style: &ContainerStyle) {
        self.set_z_index(container, style.z_index.unwrap_or(0));
        self.set_class_name(container, style.class_name.as_deref());
    }

    fn render_into(&mut self, container: NodeId, content: &FloatBody) {
        let node = match content_node(self, container) {
            Some(n) => n,
            None => {
                let n = self.create_element(LocalNode::element("div", Rect::ZERO));
                let _ = Self::append_child(self, container, n);
                n
            }
        };
        self.set_local_bounds(node, Rect::from_origin_size(Point::ZERO, content.size));
        self.set_text(node, Some(content.text.as_str()));
        self.set_class_name(node, content.class_name.as_deref());
        self.set_size(container, content.size);
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        Self::bounding_rect(self, node)
    }

    fn viewport(&self) -> Rect {
        Self::viewport(self)
    }

    fn move_container(&mut self, container: NodeId, offset: Point) {
        self.set_origin(container, offset);
    }

    fn listen(&mut self, kind: ListenKind, listener: HostListener<NodeId>) -> ListenerId {
        let kind = match kind {
            ListenKind::Resize => EventKind::Resize,
            ListenKind::Scroll => EventKind::Scroll,
        };
        self.add_listener(
            kind,
            Rc::new(move |event: &Event| {
                let event = match *event {
                    Event::Resize => HostEvent::Resize,
                    Event::Scroll { target } => HostEvent::Scroll { target },
                };
                listener(&event);
            }),
        )
    }

    fn unlisten(&mut self, key: ListenerId) {
        self.remove_listener(key);
    }

    fn request_frame(&mut self, callback: FrameCallback) -> Result<(), FrameCallback> {
        self.request_animation_frame(callback)
    }
}
