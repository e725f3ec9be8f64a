// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_contain --heading-base-level=0

//! Understory Contain: keep a floating box next to its anchor and inside the viewport.
//!
//! Given the size of a floating box (tooltip, menu, dropdown), the rectangle of the
//! element it is anchored to, the viewport, and some [`Options`], [`resolve`] picks a
//! side and alignment and returns the rectangle the floating box should occupy.
//!
//! - Inputs are axis-aligned [`kurbo::Rect`]s in one shared coordinate space.
//! - The preferred placement is tried first, then a fixed list of fallbacks
//!   (see [`position_order`]). The first candidate that fits wins.
//! - When nothing fits, the candidate with the least overflow wins and is slid into
//!   the viewport. A box larger than the viewport keeps its top-left corner visible.
//! - The result carries a discrete [`Choice`] so content can adapt to where it
//!   landed, for example by flipping an arrow.
//!
//! The resolver is pure and deterministic. It does not measure or move anything; see
//! `understory_float_anchor` for the engine that drives it.
//!
//! # Example
//!
//! ```rust
//! use understory_contain::{resolve, Options, Position};
//! use kurbo::{Rect, Size};
//!
//! let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
//! let anchor = Rect::new(100.0, 100.0, 150.0, 120.0);
//!
//! let r = resolve(Size::new(200.0, 100.0), anchor, viewport, &Options::at(Position::Bottom));
//! assert_eq!(r.choice.position, Position::Bottom);
//! assert_eq!(r.offset().y, 120.0);
//!
//! // Near the bottom edge the box flips above the anchor.
//! let low = Rect::new(100.0, 520.0, 150.0, 540.0);
//! let r = resolve(Size::new(200.0, 100.0), low, viewport, &Options::at(Position::Bottom));
//! assert_eq!(r.choice.position, Position::Top);
//! assert_eq!(r.offset().y, 420.0);
//! ```
//!
//! This crate is `no_std` and does not allocate.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod resolve;
mod types;

pub use resolve::{PositionOrder, overflow, place, position_order, resolve};
pub use types::{Align, Choice, Margins, Options, Position, PositionPreference, Resolution};
