// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document: node identifiers, flags, local data, and events.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use kurbo::{Rect, Vec2};

/// Identifier for a node in the document.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On destroy, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Document::is_alive`](crate::Document::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
///
/// The derived `Ord` only exists so ids can key ordered maps.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Node flags controlling layout.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is positioned against the viewport, ignoring ancestors and their scrolling.
        const FIXED = 0b0000_0001;
    }
}

/// What a node is. There is exactly one `Document` node per [`Document`](crate::Document).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum NodeKind {
    /// The root of the document.
    Document,
    /// Any other node.
    #[default]
    Element,
}

/// Local data for a node.
#[derive(Clone, Debug, Default)]
pub struct LocalNode {
    /// Node kind.
    pub kind: NodeKind,
    /// Tag name, for debugging and queries.
    pub tag: &'static str,
    /// Bounds relative to the parent's scrolled content origin.
    /// For [`NodeFlags::FIXED`] nodes the origin is in viewport coordinates.
    pub local_bounds: Rect,
    /// Current scroll offset of this node's content.
    pub scroll_offset: Vec2,
    /// Stacking order of [`NodeFlags::FIXED`] nodes, for renderers; higher is on top.
    pub z_index: i32,
    /// Space-separated class list.
    pub class_name: Option<String>,
    /// Text carried by this node.
    pub text: Option<String>,
    /// Layout flags.
    pub flags: NodeFlags,
}

impl LocalNode {
    /// An element with the given tag and bounds.
    pub fn element(tag: &'static str, local_bounds: Rect) -> Self {
        Self {
            tag,
            local_bounds,
            ..Default::default()
        }
    }

    /// Set the class list.
    #[must_use]
    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.into());
        self
    }

    /// True if the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name
            .as_deref()
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Kinds of events listeners can subscribe to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// Viewport resized.
    Resize,
    /// Some node scrolled. Listeners see scrolls of every node (capture phase).
    Scroll,
}

/// An event delivered to listeners.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// Viewport resized.
    Resize,
    /// `target` scrolled.
    Scroll {
        /// The node whose scroll offset changed.
        target: NodeId,
    },
}

impl Event {
    /// The kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Resize => EventKind::Resize,
            Self::Scroll { .. } => EventKind::Scroll,
        }
    }
}

/// Handle of a registered listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// An event listener.
pub type Listener = Rc<dyn Fn(&Event)>;

/// A single-shot animation frame callback.
pub type FrameCallback = Box<dyn FnOnce()>;
