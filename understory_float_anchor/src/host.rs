// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between float anchors and the node tree they live in.
//!
//! A [`Host`] owns nodes, measures them, delivers resize and scroll events, and
//! schedules animation frames. The engine never touches a tree any other way.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt::Debug;

use kurbo::{Point, Rect};

/// Kinds of host events a float anchor listens to while attached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ListenKind {
    /// The viewport changed size.
    Resize,
    /// Any node scrolled, seen before the node itself handles it.
    Scroll,
}

/// A host event as seen by a float anchor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HostEvent<N> {
    /// The viewport changed size.
    Resize,
    /// `target` scrolled.
    Scroll {
        /// The node that scrolled.
        target: N,
    },
}

/// Callback registered with [`Host::listen`].
pub type HostListener<N> = Rc<dyn Fn(&HostEvent<N>)>;

/// Single-shot callback for [`Host::request_frame`].
pub type FrameCallback = Box<dyn FnOnce()>;

/// Cosmetic attributes of a float container.
///
/// Containers are always positioned against the viewport; these only control
/// stacking and styling hooks.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ContainerStyle {
    /// Stacking order of the container.
    pub z_index: Option<i32>,
    /// Class list applied to the container.
    pub class_name: Option<String>,
}

/// A node tree that can host floating elements.
///
/// Implementations must not call back into the engine from any of these methods.
/// Listeners and frame callbacks are invoked later, by whoever drives the host,
/// and must be invoked without the host being borrowed.
pub trait Host {
    /// Node handle.
    type Node: Copy + Eq + Ord + Debug + 'static;
    /// Rendered float content.
    type Content: Clone + PartialEq + 'static;
    /// Handle returned by [`Host::listen`].
    type ListenerKey: Copy + Eq + Debug + 'static;

    /// Default mount target for containers.
    fn body(&self) -> Self::Node;
    /// Structural parent of `node`.
    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;
    /// True if `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;
    /// True if `node` is attached to the document.
    fn is_connected(&self, node: Self::Node) -> bool;

    /// Create a detached, viewport-positioned container.
    fn create_container(&mut self) -> Self::Node;
    /// Free a container created by [`Host::create_container`] and everything in it.
    fn destroy_container(&mut self, container: Self::Node);
    /// Append `child` to `parent`.
    ///
    /// Returns false, changing nothing, if the host refuses: a stale `parent`, or a
    /// `parent` inside `child`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> bool;
    /// Detach `node` from its parent. No-op when already detached.
    fn remove_child(&mut self, node: Self::Node);
    /// Apply cosmetic attributes to a container.
    fn style_container(&mut self, container: Self::Node, style: &ContainerStyle);
    /// Replace the content rendered inside `container`.
    fn render_into(&mut self, container: Self::Node, content: &Self::Content);

    /// Viewport-space rectangle of `node`.
    fn bounding_rect(&self, node: Self::Node) -> Rect;
    /// The viewport rectangle.
    fn viewport(&self) -> Rect;
    /// Move a container so its top-left corner sits at `offset` in viewport space.
    fn move_container(&mut self, container: Self::Node, offset: Point);

    /// Register `listener` for events of `kind`.
    fn listen(
        &mut self,
        kind: ListenKind,
        listener: HostListener<Self::Node>,
    ) -> Self::ListenerKey;
    /// Unregister a listener. Unknown keys are ignored.
    fn unlisten(&mut self, key: Self::ListenerKey);
    /// Schedule `callback` for the next animation frame.
    ///
    /// Hosts without frames hand the callback back and the engine falls back to
    /// its microtask queue.
    fn request_frame(&mut self, callback: FrameCallback) -> Result<(), FrameCallback>;
}
