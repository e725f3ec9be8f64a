// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_float_tree --heading-base-level=0

//! Understory Float Tree: a small, Kurbo-native retained document.
//!
//! Understory Float Tree is the headless document that floating-element code runs
//! against in tests, demos, and non-browser hosts.
//!
//! - A node tree with generational [`NodeId`]s, a document node, `html`, and `body`.
//! - Per-node local bounds, scroll offsets, fixed positioning, z-order, classes, and text.
//! - Viewport-space [`Document::bounding_rect`] with scroll offsets and fixed nodes.
//! - Resize and scroll listeners, plus single-shot animation frame callbacks.
//!
//! ## Not a layout engine
//!
//! This crate does not measure text or run flex/grid layout.
//! Callers set each node's local bounds; the document only composes them with
//! parent origins, scroll offsets, and fixed positioning.
//!
//! ## Driving the document
//!
//! Listener and frame callbacks usually need the document themselves, so the document
//! is shared as `RefCell<Document>` and driven through [`dispatch`],
//! [`run_animation_frame`], [`scroll_to`], and [`resize_viewport`], which never hold
//! a borrow while calling out.
//!
//! ## API overview
//!
//! - [`Document`]: node storage, structure, layout queries, listeners, frames.
//! - [`LocalNode`]: per-node local data. See [`NodeFlags`] for fixed positioning.
//! - [`NodeId`]: generational handle of a node.
//! - [`Event`] / [`EventKind`]: what listeners receive.
//!
//! # Example
//!
//! ```rust
//! use core::cell::RefCell;
//! use std::rc::Rc;
//! use kurbo::{Rect, Size, Vec2};
//! use understory_float_tree::{Document, Event, EventKind, LocalNode, scroll_to};
//!
//! let doc = RefCell::new(Document::new(Size::new(800.0, 600.0)));
//! let body = doc.borrow().body();
//!
//! let list = doc.borrow_mut().create_element(LocalNode::element("ul", Rect::new(0.0, 0.0, 200.0, 300.0)));
//! let item = doc.borrow_mut().create_element(LocalNode::element("li", Rect::new(0.0, 100.0, 200.0, 120.0)));
//! doc.borrow_mut().append_child(body, list);
//! doc.borrow_mut().append_child(list, item);
//!
//! let scrolled = Rc::new(RefCell::new(None));
//! let s = scrolled.clone();
//! doc.borrow_mut().add_listener(EventKind::Scroll, Rc::new(move |e: &Event| {
//!     *s.borrow_mut() = Some(*e);
//! }));
//!
//! scroll_to(&doc, list, Vec2::new(0.0, 40.0));
//! assert_eq!(doc.borrow().bounding_rect(item), Rect::new(0.0, 60.0, 200.0, 80.0));
//! assert_eq!(*scrolled.borrow(), Some(Event::Scroll { target: list }));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
mod events;
mod types;

pub use document::Document;
pub use events::{dispatch, resize_viewport, run_animation_frame, run_until_idle, scroll_to};
pub use types::{
    Event, EventKind, FrameCallback, Listener, ListenerId, LocalNode, NodeFlags, NodeId, NodeKind,
};
