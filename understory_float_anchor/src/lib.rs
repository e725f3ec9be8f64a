// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_float_anchor --heading-base-level=0

//! Understory Float Anchor: floating elements that stay next to their anchor.
//!
//! ## Overview
//!
//! A [`FloatAnchor`] pairs an anchor node with an optional floating element (a
//! tooltip, a menu, a popover). The float is rendered into its own container,
//! portaled under the body (or another mount target), positioned against the
//! viewport, and kept on screen next to its anchor as the page scrolls and resizes.
//!
//! Placement is delegated to [`understory_contain::resolve`]; this crate decides
//! *when* to place, and keeps the trees consistent while it does.
//!
//! ## Hosts
//!
//! Everything the engine does to nodes goes through the [`Host`](crate::host::Host)
//! trait. The `float_tree_adapter` feature (on by default) implements it for the
//! Understory Float Tree document; see [`adapters::float_tree`].
//!
//! ## Logical ancestry
//!
//! A portaled container is far from its anchor structurally. The
//! [`Runtime`] records each attached container's anchor, and
//! [`Runtime::ancestors_of`] walks that logical tree: a container's parent is its
//! anchor. Click-outside checks and similar queries should use it instead of the
//! structural parent chain.
//!
//! ## Batching and nesting
//!
//! [`FloatAnchor::reposition_async`] coalesces: any number of requests before the
//! next frame produce one placement. A float anchor mounted with a parent (for
//! example a submenu whose anchor lives in the parent menu's float) never places
//! itself ahead of a pending parent. The parent places first and then cascades, so
//! within a batch every descendant is placed exactly once, after its parent moved.
//! See [`coordinator`] for the state machine.
//!
//! ## Workflow
//!
//! 1) Wrap the host in a [`Runtime`].
//! 2) [`FloatAnchor::mount`] with [`Props`]; pass a parent for nested floats.
//! 3) Drive the host: dispatch resize and scroll events, run frames. Hosts without
//!    frames fall back to [`Runtime::run_microtasks`].
//! 4) [`FloatAnchor::update`] with new props as inputs change; [`FloatAnchor::unmount`]
//!    (or drop) when done.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_contain::{Options, Position, PositionPreference};
//! use understory_float_anchor::adapters::float_tree::FloatBody;
//! use understory_float_anchor::{Anchor, FloatAnchor, Props, Runtime};
//! use understory_float_tree::{Document, LocalNode, run_animation_frame};
//!
//! let rt = Runtime::new(Document::new(Size::new(800.0, 600.0)));
//! let button = {
//!     let mut doc = rt.host().borrow_mut();
//!     let button = doc.create_element(LocalNode::element("button", Rect::new(100.0, 100.0, 150.0, 120.0)));
//!     let body = doc.body();
//!     doc.append_child(body, button);
//!     button
//! };
//!
//! let tip = FloatAnchor::mount(
//!     &rt,
//!     Props::new(Anchor::Element(button))
//!         .float(FloatBody::new("Save", Size::new(200.0, 100.0)))
//!         .options(Options::at(PositionPreference::Bottom)),
//!     None,
//! )
//! .unwrap();
//!
//! run_animation_frame(rt.host());
//! assert_eq!(tip.last_choice().map(|c| c.position), Some(Position::Bottom));
//! let container = tip.container().unwrap();
//! assert_eq!(rt.host().borrow().bounding_rect(container), Rect::new(25.0, 120.0, 225.0, 220.0));
//! assert!(rt.is_within(container, button));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod anchors;
pub mod coordinator;
pub mod host;
pub mod portal;

mod error;
mod instance;
mod runtime;

pub use error::FloatAnchorError;
pub use instance::{Anchor, Changes, FloatAnchor, FloatContent, Props};
pub use runtime::{HostAncestors, HostParents, Runtime};
