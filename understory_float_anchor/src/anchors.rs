// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchor tracking: logical parents for portaled containers.
//!
//! A float container is mounted under the body (or some other mount target), far
//! away from its anchor in the structural tree. Code that asks "is this node inside
//! that one?" usually means the logical tree, where the container hangs off its
//! anchor. [`AnchorMap`] records that link, and [`Ancestors`] walks it: at each
//! step the registered anchor wins over the structural parent.
//!
//! For a float nested in a container anchored to `anchor`, the walk from the float
//! content is `content, container, anchor, ..anchor's structural ancestors`.

use alloc::collections::BTreeMap;
use core::cell::RefCell;

/// Provides the structural parent of a node.
///
/// Implement this for whatever tree the nodes live in.
pub trait ParentLookup<N> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &N) -> Option<N>;
}

impl<N, F: Fn(&N) -> Option<N>> ParentLookup<N> for F {
    #[inline]
    fn parent_of(&self, node: &N) -> Option<N> {
        self(node)
    }
}

/// Container to anchor associations.
///
/// A container has at most one anchor. Setting a new anchor replaces the old one,
/// so observers never see a container with two anchors.
#[derive(Clone, Debug)]
pub struct AnchorMap<N> {
    anchors: BTreeMap<N, N>,
}

impl<N> Default for AnchorMap<N> {
    fn default() -> Self {
        Self {
            anchors: BTreeMap::new(),
        }
    }
}

impl<N: Copy + Ord> AnchorMap<N> {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `container` with `anchor`, or clear it with `None`.
    ///
    /// Returns the previous anchor.
    pub fn set_anchor(&mut self, container: N, anchor: Option<N>) -> Option<N> {
        match anchor {
            Some(a) => self.anchors.insert(container, a),
            None => self.anchors.remove(&container),
        }
    }

    /// The anchor of `container`, if any.
    pub fn anchor_of(&self, container: N) -> Option<N> {
        self.anchors.get(&container).copied()
    }

    /// Number of anchored containers.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// True if no container is anchored.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Logical parent of `node`: its anchor if it has one, otherwise its structural parent.
    pub fn logical_parent<P: ParentLookup<N>>(&self, parents: &P, node: N) -> Option<N> {
        self.anchor_of(node).or_else(|| parents.parent_of(&node))
    }

    /// True if `ancestor` is on the logical walk from `node` (inclusive).
    pub fn is_within<P: ParentLookup<N>>(&self, parents: &P, node: N, ancestor: N) -> bool {
        let mut jumps = 0;
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.step(parents, c, &mut jumps);
        }
        false
    }

    /// One step of a logical walk that has followed `jumps` anchor links so far.
    ///
    /// A walk without loops follows each link at most once, so a walk that wants
    /// more links than the map holds has entered a loop and ends.
    fn step<P: ParentLookup<N>>(&self, parents: &P, node: N, jumps: &mut usize) -> Option<N> {
        match self.anchor_of(node) {
            Some(anchor) if *jumps < self.len() => {
                *jumps += 1;
                Some(anchor)
            }
            Some(_) => None,
            None => parents.parent_of(&node),
        }
    }
}

/// Lazy walk up the logical tree, starting with the node itself.
///
/// Each step takes a short borrow of the anchor map, so the map may change between
/// steps; the walk always follows the current links. Clone it to restart from the
/// same point.
///
/// The walk is finite even if anchor links form a loop: it ends once it has followed
/// more links than the map holds.
pub struct Ancestors<'a, N, P> {
    anchors: &'a RefCell<AnchorMap<N>>,
    parents: P,
    next: Option<N>,
    jumps: usize,
}

impl<'a, N, P> Ancestors<'a, N, P> {
    /// Walk from `start` using `anchors` and `parents`.
    pub fn new(anchors: &'a RefCell<AnchorMap<N>>, parents: P, start: N) -> Self {
        Self {
            anchors,
            parents,
            next: Some(start),
            jumps: 0,
        }
    }
}

impl<N: Copy, P: Clone> Clone for Ancestors<'_, N, P> {
    fn clone(&self) -> Self {
        Self {
            anchors: self.anchors,
            parents: self.parents.clone(),
            next: self.next,
            jumps: self.jumps,
        }
    }
}

impl<N: core::fmt::Debug, P> core::fmt::Debug for Ancestors<'_, N, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ancestors").field("next", &self.next).finish_non_exhaustive()
    }
}

impl<N: Copy + Ord, P: ParentLookup<N>> Iterator for Ancestors<'_, N, P> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let cur = self.next?;
        self.next = self
            .anchors
            .borrow()
            .step(&self.parents, cur, &mut self.jumps);
        Some(cur)
    }
}

impl<N: Copy + Ord, P: ParentLookup<N>> core::iter::FusedIterator for Ancestors<'_, N, P> {}
