// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared state for every float anchor living in one host.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::anchors::{AnchorMap, Ancestors, ParentLookup};
use crate::host::{FrameCallback, Host};

pub(crate) struct Shared<H: Host> {
    pub(crate) host: RefCell<H>,
    pub(crate) anchors: RefCell<AnchorMap<H::Node>>,
    microtasks: RefCell<VecDeque<FrameCallback>>,
}

impl<H: Host> Shared<H> {
    /// Run `callback` on the next frame, or on the microtask queue when the host has no frames.
    pub(crate) fn defer(&self, callback: FrameCallback) {
        let rejected = self.host.borrow_mut().request_frame(callback);
        if let Err(callback) = rejected {
            self.microtasks.borrow_mut().push_back(callback);
        }
    }

    pub(crate) fn ancestors_of(&self, node: H::Node) -> HostAncestors<'_, H> {
        Ancestors::new(&self.anchors, HostParents(&self.host), node)
    }
}

/// Parent lookup backed by the host's structural tree.
pub struct HostParents<'a, H: Host>(&'a RefCell<H>);

impl<H: Host> Clone for HostParents<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: Host> Copy for HostParents<'_, H> {}

impl<H: Host> core::fmt::Debug for HostParents<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("HostParents").finish_non_exhaustive()
    }
}

impl<H: Host> ParentLookup<H::Node> for HostParents<'_, H> {
    fn parent_of(&self, node: &H::Node) -> Option<H::Node> {
        self.0.borrow().parent_node(*node)
    }
}

/// Logical ancestor walk over a runtime's host.
pub type HostAncestors<'a, H> = Ancestors<'a, <H as Host>::Node, HostParents<'a, H>>;

/// A host plus the bookkeeping shared by its float anchors.
///
/// The host sits in a [`RefCell`]; drive it (dispatch events, run frames) through
/// [`Runtime::host`] without holding a borrow across those calls.
pub struct Runtime<H: Host> {
    pub(crate) shared: Rc<Shared<H>>,
}

impl<H: Host> Clone for Runtime<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: Host> core::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runtime")
            .field("anchored", &self.shared.anchors.borrow().len())
            .field("microtasks", &self.shared.microtasks.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Runtime<H> {
    /// Wrap `host`.
    pub fn new(host: H) -> Self {
        Self {
            shared: Rc::new(Shared {
                host: RefCell::new(host),
                anchors: RefCell::new(AnchorMap::new()),
                microtasks: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// The host.
    pub fn host(&self) -> &RefCell<H> {
        &self.shared.host
    }

    /// Container to anchor associations of every attached float.
    pub fn anchors(&self) -> &RefCell<AnchorMap<H::Node>> {
        &self.shared.anchors
    }

    /// Walk from `node` up the logical tree: `node` first, then its anchor or parent, and so on.
    pub fn ancestors_of(&self, node: H::Node) -> HostAncestors<'_, H> {
        self.shared.ancestors_of(node)
    }

    /// True if `ancestor` appears on the logical walk from `node` (inclusive).
    pub fn is_within(&self, node: H::Node, ancestor: H::Node) -> bool {
        self.ancestors_of(node).any(|n| n == ancestor)
    }

    /// Callbacks waiting on the microtask queue.
    pub fn pending_microtasks(&self) -> usize {
        self.shared.microtasks.borrow().len()
    }

    /// Run microtasks until the queue is empty, including ones queued meanwhile.
    ///
    /// Returns the number of callbacks run.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.shared.microtasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}
