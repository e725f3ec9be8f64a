// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reposition coordination: batching and parent-first ordering.
//!
//! Every float anchor owns a [`Coordinator`]. Requests for a deferred reposition
//! coalesce into a single frame callback, and a float anchor whose ancestor has a
//! reposition pending leaves the work to that ancestor, which cascades down to it
//! once its own container has moved.
//!
//! ## States
//!
//! - [`CoordinatorState::Idle`]: nothing scheduled.
//! - [`CoordinatorState::AsyncPending`]: a frame callback is queued, or an ancestor
//!   has one queued and this anchor will be repositioned by its cascade.
//! - [`CoordinatorState::Computing`]: a synchronous reposition is running.
//!
//! ## Signals
//!
//! Parents talk to children through a [`Channel`]. The parent owns it; children only
//! subscribe. Pending state is broadcast on change, repositions after the parent's
//! container has moved, and the end of the parent's lifetime once.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// Observable coordinator state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CoordinatorState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// A reposition will happen on a later frame, here or in an ancestor.
    AsyncPending,
    /// A synchronous reposition is running.
    Computing,
}

/// What to do when a queued frame callback fires.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FrameAction {
    /// The callback is stale (already handled, or the owner ended).
    Ignore,
    /// An ancestor still has a reposition pending; its cascade will cover this one.
    DeferToAncestor,
    /// Reposition now.
    Reposition,
    /// Nothing left to do; the request was satisfied by a cascade in the meantime.
    Settle,
}

/// Per-anchor batching state machine.
///
/// This type performs no I/O: callers enqueue frames, run repositions, and publish
/// pending state according to the values it returns.
#[derive(Copy, Clone, Debug, Default)]
pub struct Coordinator {
    /// A frame callback of our own is queued.
    queued: bool,
    /// An ancestor has a reposition pending.
    inherited: bool,
    /// A synchronous reposition is running.
    computing: bool,
    /// A reposition was requested and has not happened yet.
    dirty: bool,
    /// The owner was torn down.
    ended: bool,
}

impl Coordinator {
    /// A fresh, idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        if self.computing {
            CoordinatorState::Computing
        } else if self.queued || self.inherited {
            CoordinatorState::AsyncPending
        } else {
            CoordinatorState::Idle
        }
    }

    /// True while a deferred reposition is outstanding here or in an ancestor.
    ///
    /// This is what descendants observe.
    pub fn is_pending(&self) -> bool {
        !self.ended && (self.queued || self.inherited)
    }

    /// True if a reposition was requested and has not happened yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True once [`Coordinator::end`] was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Record a request for a deferred reposition.
    ///
    /// Returns true when the caller must enqueue a frame callback. While already
    /// pending or computing the request is merged into the outstanding one.
    pub fn request(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.dirty = true;
        if self.state() != CoordinatorState::Idle {
            return false;
        }
        self.queued = true;
        true
    }

    /// Our queued frame callback fired. `ancestor_pending` is the nearest ancestor's
    /// pending state at this moment.
    pub fn on_frame(&mut self, ancestor_pending: bool) -> FrameAction {
        if self.ended || !self.queued {
            return FrameAction::Ignore;
        }
        self.queued = false;
        if ancestor_pending {
            self.inherited = true;
            FrameAction::DeferToAncestor
        } else if self.dirty {
            FrameAction::Reposition
        } else {
            FrameAction::Settle
        }
    }

    /// Enter [`CoordinatorState::Computing`]. Returns false if a reposition is already
    /// running (reentrant request) or the owner ended.
    pub fn begin(&mut self) -> bool {
        if self.computing || self.ended {
            return false;
        }
        self.computing = true;
        true
    }

    /// Leave [`CoordinatorState::Computing`]; the outstanding request is satisfied.
    pub fn finish(&mut self) {
        self.computing = false;
        self.dirty = false;
    }

    /// The parent's pending state changed.
    ///
    /// Returns true when the parent settled without reaching us through a cascade
    /// and we still owe a reposition; the caller must reposition now.
    pub fn inherit(&mut self, pending: bool) -> bool {
        if self.ended {
            return false;
        }
        if pending {
            self.inherited = true;
            self.dirty = true;
            return false;
        }
        self.inherited = false;
        self.dirty && !self.queued && !self.computing
    }

    /// The parent went away. Returns true when the caller must request a reposition
    /// of its own to honor a request that was waiting on the parent.
    pub fn parent_ended(&mut self) -> bool {
        let owed = self.inherited && self.dirty;
        self.inherited = false;
        owed && !self.queued && !self.ended
    }

    /// Tear down. Every later call is a no-op.
    pub fn end(&mut self) {
        *self = Self {
            ended: true,
            ..Self::default()
        };
    }
}

/// A signal from a parent float anchor to its children.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Signal {
    /// The parent's effective pending state changed.
    Pending(bool),
    /// The parent just repositioned; children must follow.
    Repositioned,
    /// The parent was unmounted. No further signals follow.
    Ended,
}

/// Receiver of parent signals.
pub(crate) trait Subscriber {
    fn on_signal(&self, signal: Signal);
}

/// Parent to children broadcast channel. Owned by the parent.
#[derive(Default)]
pub(crate) struct Channel {
    pending: Cell<bool>,
    ended: Cell<bool>,
    subscribers: RefCell<Vec<Weak<dyn Subscriber>>>,
}

impl core::fmt::Debug for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Channel")
            .field("pending", &self.pending.get())
            .field("ended", &self.ended.get())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl Channel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Last published pending state.
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Add a child. Returns false when the channel already ended.
    pub(crate) fn subscribe(&self, subscriber: Weak<dyn Subscriber>) -> bool {
        if self.ended.get() {
            return false;
        }
        let mut subs = self.subscribers.borrow_mut();
        subs.retain(|s| s.strong_count() > 0);
        subs.push(subscriber);
        true
    }

    pub(crate) fn unsubscribe(&self, subscriber: &Weak<dyn Subscriber>) {
        self.subscribers
            .borrow_mut()
            .retain(|s| s.strong_count() > 0 && !Weak::ptr_eq(s, subscriber));
    }

    /// Number of live children.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    /// Publish the owner's pending state; children hear about changes only.
    pub(crate) fn set_pending(&self, pending: bool) {
        if self.ended.get() || self.pending.replace(pending) == pending {
            return;
        }
        self.broadcast(Signal::Pending(pending));
    }

    /// Deliver `signal` to every live child, in subscription order.
    ///
    /// Children may subscribe or unsubscribe while the signal is delivered.
    pub(crate) fn broadcast(&self, signal: Signal) {
        if self.ended.get() {
            return;
        }
        let subs: Vec<Rc<dyn Subscriber>> = self
            .subscribers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for s in subs {
            s.on_signal(signal);
        }
    }

    /// Announce the end of the owner and drop every child.
    pub(crate) fn end(&self) {
        if self.ended.get() {
            return;
        }
        self.broadcast(Signal::Ended);
        self.ended.set(true);
        self.pending.set(false);
        self.subscribers.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn requests_coalesce_into_one_frame() {
        let mut c = Coordinator::new();
        assert!(c.request());
        for _ in 0..9 {
            assert!(!c.request());
        }
        assert_eq!(c.state(), CoordinatorState::AsyncPending);
        assert_eq!(c.on_frame(false), FrameAction::Reposition);
        assert!(c.begin());
        assert_eq!(c.state(), CoordinatorState::Computing);
        c.finish();
        assert_eq!(c.state(), CoordinatorState::Idle);
        assert_eq!(c.on_frame(false), FrameAction::Ignore);
    }

    #[test]
    fn request_during_compute_is_merged() {
        let mut c = Coordinator::new();
        assert!(c.begin());
        assert!(!c.request());
        assert!(!c.begin());
        c.finish();
        assert!(!c.is_dirty());
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn frame_defers_to_pending_ancestor() {
        let mut c = Coordinator::new();
        assert!(c.request());
        assert_eq!(c.on_frame(true), FrameAction::DeferToAncestor);
        assert_eq!(c.state(), CoordinatorState::AsyncPending);
        assert!(c.is_dirty());
        // The ancestor cascades to us before it settles.
        assert!(c.begin());
        c.finish();
        assert!(!c.inherit(false));
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn settling_ancestor_without_cascade_owes_a_reposition() {
        let mut c = Coordinator::new();
        assert!(!c.inherit(true));
        assert!(!c.request());
        assert!(c.inherit(false));
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn inherited_pending_satisfied_by_cascade_settles_quietly() {
        let mut c = Coordinator::new();
        c.inherit(true);
        assert!(c.begin());
        c.finish();
        assert!(!c.inherit(false));
    }

    #[test]
    fn own_frame_after_inherit_settles_if_cascaded() {
        let mut c = Coordinator::new();
        assert!(c.request());
        c.inherit(true);
        assert!(c.begin());
        c.finish();
        assert!(!c.inherit(false));
        assert_eq!(c.on_frame(false), FrameAction::Settle);
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn parent_ending_hands_work_back() {
        let mut c = Coordinator::new();
        c.inherit(true);
        assert!(c.parent_ended());
        assert!(c.request());
    }

    #[test]
    fn ended_coordinator_ignores_everything() {
        let mut c = Coordinator::new();
        assert!(c.request());
        c.end();
        assert!(c.is_ended());
        assert!(!c.is_pending());
        assert!(!c.request());
        assert!(!c.begin());
        assert_eq!(c.on_frame(false), FrameAction::Ignore);
        assert!(!c.inherit(false));
    }

    struct Recorder(RefCell<Vec<Signal>>);

    impl Subscriber for Recorder {
        fn on_signal(&self, signal: Signal) {
            self.0.borrow_mut().push(signal);
        }
    }

    #[test]
    fn channel_broadcasts_changes_and_end() {
        let ch = Channel::new();
        let rec = Rc::new(Recorder(RefCell::new(Vec::new())));
        let weak: Weak<dyn Subscriber> = Rc::downgrade(&rec) as Weak<dyn Subscriber>;
        assert!(ch.subscribe(weak.clone()));
        ch.set_pending(true);
        ch.set_pending(true);
        ch.broadcast(Signal::Repositioned);
        ch.set_pending(false);
        ch.end();
        ch.broadcast(Signal::Repositioned);
        assert_eq!(
            *rec.0.borrow(),
            vec![
                Signal::Pending(true),
                Signal::Repositioned,
                Signal::Pending(false),
                Signal::Ended
            ]
        );
        assert!(!ch.subscribe(weak));
        assert_eq!(ch.subscriber_count(), 0);
    }

    #[test]
    fn dropped_children_are_skipped() {
        let ch = Channel::new();
        let rec = Rc::new(Recorder(RefCell::new(Vec::new())));
        let weak: Weak<dyn Subscriber> = Rc::downgrade(&rec) as Weak<dyn Subscriber>;
        ch.subscribe(weak.clone());
        assert_eq!(ch.subscriber_count(), 1);
        ch.unsubscribe(&weak);
        assert_eq!(ch.subscriber_count(), 0);
        ch.subscribe(weak);
        drop(rec);
        assert_eq!(ch.subscriber_count(), 0);
        ch.broadcast(Signal::Repositioned);
    }
}
