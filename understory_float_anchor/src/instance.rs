// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float anchors: one anchor, one optional floating element.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use understory_contain::{Choice, Options, resolve};

use crate::coordinator::{Channel, Coordinator, CoordinatorState, FrameAction, Signal, Subscriber};
use crate::error::FloatAnchorError;
use crate::host::{ContainerStyle, Host, HostEvent, HostListener};
use crate::portal::Portal;
use crate::runtime::{HostAncestors, Runtime, Shared};

/// Where a float anchor finds its anchor node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Anchor<N> {
    /// A node known up front.
    Element(N),
    /// A node reported later through [`FloatAnchor::set_anchor_ref`].
    Ref,
}

/// Content rendered into the float container.
pub enum FloatContent<C> {
    /// Fixed content.
    Static(C),
    /// Content that depends on the placement it ends up in.
    ///
    /// Called with `None` before the first placement is known, then again whenever
    /// the placement changes.
    Adaptive(Rc<dyn Fn(Option<Choice>) -> C>),
}

impl<C> FloatContent<C> {
    /// Adaptive content from a closure.
    pub fn adaptive(render: impl Fn(Option<Choice>) -> C + 'static) -> Self {
        Self::Adaptive(Rc::new(render))
    }

    /// True for [`FloatContent::Adaptive`].
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Self::Adaptive(_))
    }
}

impl<C: Clone> FloatContent<C> {
    fn render(&self, choice: Option<Choice>) -> C {
        match self {
            Self::Static(c) => c.clone(),
            Self::Adaptive(f) => f(choice),
        }
    }
}

impl<C: PartialEq> FloatContent<C> {
    /// Identity comparison: equal static content, or the same adaptive closure.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) => a == b,
            (Self::Adaptive(a), Self::Adaptive(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<C: Clone> Clone for FloatContent<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(c) => Self::Static(c.clone()),
            Self::Adaptive(f) => Self::Adaptive(f.clone()),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for FloatContent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(c) => f.debug_tuple("Static").field(c).finish(),
            Self::Adaptive(_) => f.debug_tuple("Adaptive").finish_non_exhaustive(),
        }
    }
}

/// Inputs of a float anchor.
pub struct Props<H: Host> {
    /// The anchor.
    pub anchor: Anchor<H::Node>,
    /// The floating element. No container exists while this is `None`.
    pub float: Option<FloatContent<H::Content>>,
    /// Placement options.
    pub options: Options,
    /// Stacking order of the container.
    pub z_index: Option<i32>,
    /// Class list of the container.
    pub container_class: Option<String>,
    /// Mount target of the container. Defaults to the host's body.
    pub parent_element: Option<H::Node>,
}

impl<H: Host> Props<H> {
    /// Props for `anchor` with no float and default options.
    pub fn new(anchor: Anchor<H::Node>) -> Self {
        Self {
            anchor,
            float: None,
            options: Options::default(),
            z_index: None,
            container_class: None,
            parent_element: None,
        }
    }

    /// Set fixed float content.
    #[must_use]
    pub fn float(mut self, content: H::Content) -> Self {
        self.float = Some(FloatContent::Static(content));
        self
    }

    /// Set float content.
    #[must_use]
    pub fn float_content(mut self, content: FloatContent<H::Content>) -> Self {
        self.float = Some(content);
        self
    }

    /// Set placement options.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set the container's stacking order.
    #[must_use]
    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Set the container's class list.
    #[must_use]
    pub fn container_class(mut self, class: &str) -> Self {
        self.container_class = Some(class.into());
        self
    }

    /// Mount the container under `parent` instead of the body.
    #[must_use]
    pub fn parent_element(mut self, parent: H::Node) -> Self {
        self.parent_element = Some(parent);
        self
    }

    fn style(&self) -> ContainerStyle {
        ContainerStyle {
            z_index: self.z_index,
            class_name: self.container_class.clone(),
        }
    }
}

impl<H: Host> Clone for Props<H> {
    fn clone(&self) -> Self {
        Self {
            anchor: self.anchor,
            float: self.float.clone(),
            options: self.options,
            z_index: self.z_index,
            container_class: self.container_class.clone(),
            parent_element: self.parent_element,
        }
    }
}

impl<H: Host> fmt::Debug for Props<H>
where
    H::Content: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("anchor", &self.anchor)
            .field("float", &self.float)
            .field("options", &self.options)
            .field("z_index", &self.z_index)
            .field("container_class", &self.container_class)
            .field("parent_element", &self.parent_element)
            .finish()
    }
}

bitflags::bitflags! {
    /// Which inputs differ between two [`Props`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Changes: u8 {
        /// The anchor changed.
        const ANCHOR         = 0b0000_0001;
        /// The float content identity changed (including appearing or disappearing).
        const FLOAT          = 0b0000_0010;
        /// The float appeared or disappeared.
        const FLOAT_PRESENCE = 0b0000_0100;
        /// Placement options changed.
        const OPTIONS        = 0b0000_1000;
        /// Cosmetic container attributes changed.
        const STYLE          = 0b0001_0000;
        /// The mount target changed.
        const MOUNT_TARGET   = 0b0010_0000;
    }
}

impl Changes {
    /// Compare two sets of props.
    pub fn between<H: Host>(old: &Props<H>, new: &Props<H>) -> Self {
        let mut c = Self::empty();
        if old.anchor != new.anchor {
            c |= Self::ANCHOR;
        }
        match (&old.float, &new.float) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                if !a.same_as(b) {
                    c |= Self::FLOAT;
                }
            }
            _ => c |= Self::FLOAT | Self::FLOAT_PRESENCE,
        }
        if old.options != new.options {
            c |= Self::OPTIONS;
        }
        if old.z_index != new.z_index || old.container_class != new.container_class {
            c |= Self::STYLE;
        }
        if old.parent_element != new.parent_element {
            c |= Self::MOUNT_TARGET;
        }
        c
    }

    /// True when a change requires the float to be placed again.
    pub fn needs_reposition(self) -> bool {
        self.intersects(Self::ANCHOR | Self::FLOAT | Self::OPTIONS | Self::MOUNT_TARGET)
    }
}

struct State<H: Host> {
    props: Props<H>,
    anchor_ref: Option<H::Node>,
    portal: Option<Portal<H>>,
    last_choice: Option<Choice>,
    /// Placement the current content was rendered for; `None` when nothing is rendered.
    rendered: Option<Option<Choice>>,
    coordinator: Coordinator,
    mounted: bool,
    repositions: u64,
}

impl<H: Host> State<H> {
    fn anchor(&self) -> Option<H::Node> {
        match self.props.anchor {
            Anchor::Element(n) => Some(n),
            Anchor::Ref => self.anchor_ref,
        }
    }
}

struct Inner<H: Host> {
    shared: Rc<Shared<H>>,
    me: Weak<Self>,
    channel: Rc<Channel>,
    parent: RefCell<Option<Weak<Self>>>,
    state: RefCell<State<H>>,
}

/// A mounted anchor/float pair.
///
/// While a float is present its container exists, is mounted under the mount target
/// whenever the anchor is known, and is kept on screen next to the anchor. Deferred
/// repositions coalesce per frame, and nested float anchors (created with a parent)
/// reposition after their parent, once per batch.
///
/// Dropping a `FloatAnchor` unmounts it.
pub struct FloatAnchor<H: Host + 'static> {
    inner: Rc<Inner<H>>,
}

impl<H: Host + 'static> fmt::Debug for FloatAnchor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("FloatAnchor")
            .field("anchor", &st.anchor())
            .field("container", &st.portal.as_ref().map(Portal::container))
            .field("last_choice", &st.last_choice)
            .field("state", &st.coordinator.state())
            .field("mounted", &st.mounted)
            .finish_non_exhaustive()
    }
}

impl<H: Host + 'static> FloatAnchor<H> {
    /// Mount a float anchor in `runtime`.
    ///
    /// With a `parent`, this anchor joins the parent's batches: it repositions right
    /// after the parent does and never ahead of a pending parent.
    ///
    /// If a float is present its container is created and rendered (adaptive content
    /// sees `None`), and a first reposition is scheduled.
    pub fn mount(
        runtime: &Runtime<H>,
        props: Props<H>,
        parent: Option<&Self>,
    ) -> Result<Self, FloatAnchorError> {
        let inner = Rc::new_cyclic(|me| Inner {
            shared: runtime.shared.clone(),
            me: me.clone(),
            channel: Rc::new(Channel::new()),
            parent: RefCell::new(parent.map(|p| Rc::downgrade(&p.inner))),
            state: RefCell::new(State {
                props,
                anchor_ref: None,
                portal: None,
                last_choice: None,
                rendered: None,
                coordinator: Coordinator::new(),
                mounted: true,
                repositions: 0,
            }),
        });
        inner.join_parent();
        if let Err(err) = inner.sync_float() {
            inner.unmount();
            return Err(err);
        }
        inner.schedule();
        Ok(Self { inner })
    }

    /// Apply new props.
    ///
    /// Cosmetic changes apply immediately. Content changes re-render immediately.
    /// Anchor, content, option, or mount target changes schedule a reposition.
    pub fn update(&self, props: Props<H>) -> Result<(), FloatAnchorError> {
        let changes = {
            let mut st = self.inner.state.borrow_mut();
            if !st.mounted {
                return Ok(());
            }
            let changes = Changes::between(&st.props, &props);
            st.props = props;
            changes
        };
        if changes.is_empty() {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?changes, "float anchor props updated");
        if changes.contains(Changes::STYLE) {
            self.inner.restyle();
        }
        let rendered = if changes.intersects(Changes::FLOAT_PRESENCE | Changes::MOUNT_TARGET) {
            self.inner.sync_float()?
        } else {
            false
        };
        if changes.contains(Changes::FLOAT) && !rendered {
            self.inner.render_float(true)?;
        }
        if changes.contains(Changes::ANCHOR) {
            self.inner.sync_attachment()?;
        }
        if changes.needs_reposition() && self.has_float() {
            self.inner.schedule();
        }
        Ok(())
    }

    /// Report the anchor node for [`Anchor::Ref`] props, or `None` when it went away.
    pub fn set_anchor_ref(&self, node: Option<H::Node>) -> Result<(), FloatAnchorError> {
        let changed = {
            let mut st = self.inner.state.borrow_mut();
            if !st.mounted || st.anchor_ref == node {
                return Ok(());
            }
            st.anchor_ref = node;
            st.props.anchor == Anchor::Ref
        };
        if changed {
            self.inner.sync_attachment()?;
            if node.is_some() && self.has_float() {
                self.inner.schedule();
            }
        }
        Ok(())
    }

    /// Reposition now, then every descendant.
    ///
    /// Fails with [`FloatAnchorError::MissingAnchor`] when a float is present but
    /// the anchor is not known yet. Without a float this only cascades.
    pub fn reposition(&self) -> Result<(), FloatAnchorError> {
        {
            let st = self.inner.state.borrow();
            if !st.mounted {
                return Ok(());
            }
            if st.props.float.is_some() {
                if st.anchor().is_none() {
                    return Err(FloatAnchorError::MissingAnchor);
                }
                if st.portal.is_none() {
                    return Err(FloatAnchorError::MissingContainer);
                }
            }
        }
        self.inner.reposition_now();
        Ok(())
    }

    /// Schedule a reposition for the next frame. Calls before that frame coalesce.
    pub fn reposition_async(&self) {
        self.inner.schedule();
    }

    /// Tear down: destroy the container, stop listening, leave the parent, and
    /// release children. Idempotent.
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    /// True until [`FloatAnchor::unmount`].
    pub fn is_mounted(&self) -> bool {
        self.inner.state.borrow().mounted
    }

    /// True if a float is present.
    pub fn has_float(&self) -> bool {
        self.inner.state.borrow().props.float.is_some()
    }

    /// The anchor node, if known.
    pub fn anchor(&self) -> Option<H::Node> {
        self.inner.state.borrow().anchor()
    }

    /// The container node, while a float is present.
    pub fn container(&self) -> Option<H::Node> {
        self.inner.state.borrow().portal.as_ref().map(Portal::container)
    }

    /// True while the container is mounted and listening.
    pub fn is_attached(&self) -> bool {
        self.inner
            .state
            .borrow()
            .portal
            .as_ref()
            .is_some_and(Portal::is_attached)
    }

    /// The placement of the last reposition.
    pub fn last_choice(&self) -> Option<Choice> {
        self.inner.state.borrow().last_choice
    }

    /// Coordinator state.
    pub fn state(&self) -> CoordinatorState {
        self.inner.state.borrow().coordinator.state()
    }

    /// True while a deferred reposition is outstanding here or in an ancestor.
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().coordinator.is_pending()
    }

    /// Number of placements computed so far.
    pub fn repositions(&self) -> u64 {
        self.inner.state.borrow().repositions
    }

    /// Number of live float anchors mounted with this one as parent.
    pub fn child_count(&self) -> usize {
        self.inner.channel.subscriber_count()
    }

    /// Current props.
    pub fn props(&self) -> Props<H> {
        self.inner.state.borrow().props.clone()
    }

    /// Logical ancestor walk from `node`, through anchors of portaled containers.
    pub fn ancestors_of(&self, node: H::Node) -> HostAncestors<'_, H> {
        self.inner.shared.ancestors_of(node)
    }
}

impl<H: Host + 'static> Drop for FloatAnchor<H> {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

impl<H: Host + 'static> Inner<H> {
    fn subscriber(&self) -> Weak<dyn Subscriber> {
        self.me.clone() as Weak<dyn Subscriber>
    }

    fn parent_inner(&self) -> Option<Rc<Self>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn parent_channel(&self) -> Option<Rc<Channel>> {
        self.parent_inner().map(|p| p.channel.clone())
    }

    fn join_parent(&self) {
        let Some(parent) = self.parent_channel() else {
            return;
        };
        if !parent.subscribe(self.subscriber()) {
            *self.parent.borrow_mut() = None;
            return;
        }
        if parent.is_pending() {
            self.state.borrow_mut().coordinator.inherit(true);
            self.publish_pending();
        }
    }

    fn publish_pending(&self) {
        let pending = self.state.borrow().coordinator.is_pending();
        self.channel.set_pending(pending);
    }

    fn listener(&self) -> HostListener<H::Node> {
        let me = self.me.clone();
        Rc::new(move |event: &HostEvent<H::Node>| {
            if let Some(inner) = me.upgrade() {
                inner.on_host_event(event);
            }
        })
    }

    fn on_host_event(&self, event: &HostEvent<H::Node>) {
        let anchor = self.state.borrow().anchor();
        if !self.reacts_to(event, anchor) {
            return;
        }
        if self.parent_inner().is_some_and(|p| p.covers(event)) {
            #[cfg(feature = "tracing")]
            tracing::trace!("host event left to the parent cascade");
            return;
        }
        self.reposition_now();
    }

    fn reacts_to(&self, event: &HostEvent<H::Node>, anchor: Option<H::Node>) -> bool {
        match *event {
            HostEvent::Resize => true,
            HostEvent::Scroll { target } => {
                anchor.is_some_and(|a| self.shared.host.borrow().contains(target, a))
            }
        }
    }

    /// True if this anchor or one of its ancestors repositions on `event`, which
    /// cascades down to this anchor's children.
    fn covers(&self, event: &HostEvent<H::Node>) -> bool {
        let (listening, anchor) = {
            let st = self.state.borrow();
            let listening = st.mounted && st.portal.as_ref().is_some_and(Portal::is_attached);
            (listening, st.anchor())
        };
        (listening && self.reacts_to(event, anchor))
            || self.parent_inner().is_some_and(|p| p.covers(event))
    }

    fn restyle(&self) {
        let st = self.state.borrow();
        if let Some(portal) = &st.portal {
            portal.restyle(&mut *self.shared.host.borrow_mut(), &st.props.style());
        }
    }

    /// Make the container match the props: exists iff a float is present, lives
    /// under the current mount target, rendered, attached iff the anchor is known.
    ///
    /// Returns true if content was rendered.
    fn sync_float(&self) -> Result<bool, FloatAnchorError> {
        let stale = {
            let mut st = self.state.borrow_mut();
            let target = match st.props.parent_element {
                Some(t) => t,
                None => self.shared.host.borrow().body(),
            };
            let keep = st.props.float.is_some()
                && st.portal.as_ref().is_some_and(|p| p.mount_target() == target);
            let stale = if keep { None } else { st.portal.take() };
            if st.props.float.is_some() && st.portal.is_none() {
                let style = st.props.style();
                st.portal = Some(Portal::create(
                    &mut *self.shared.host.borrow_mut(),
                    target,
                    &style,
                ));
                st.rendered = None;
            }
            if st.portal.is_none() {
                st.rendered = None;
            }
            stale
        };
        if let Some(old) = stale {
            old.destroy(
                &mut *self.shared.host.borrow_mut(),
                &mut *self.shared.anchors.borrow_mut(),
            );
        }
        let rendered = self.render_float(false)?;
        self.sync_attachment()?;
        Ok(rendered)
    }

    /// Render the float into the container if it is not rendered for the current
    /// placement yet, or unconditionally with `force`.
    ///
    /// Returns true if content was rendered.
    fn render_float(&self, force: bool) -> Result<bool, FloatAnchorError> {
        let (float, choice) = {
            let st = self.state.borrow();
            let Some(float) = &st.props.float else {
                return Ok(false);
            };
            let due = force
                || match st.rendered {
                    None => true,
                    Some(prev) => float.is_adaptive() && prev != st.last_choice,
                };
            if !due {
                return Ok(false);
            }
            (float.clone(), st.last_choice)
        };
        let content = float.render(choice);
        let container = self
            .state
            .borrow()
            .portal
            .as_ref()
            .map(Portal::container)
            .ok_or(FloatAnchorError::MissingContainer)?;
        self.shared
            .host
            .borrow_mut()
            .render_into(container, &content);
        self.state.borrow_mut().rendered = Some(choice);
        Ok(true)
    }

    /// Keep "attached iff the anchor is known" true, rebinding in place on anchor swaps.
    ///
    /// An anchor the container cannot hang off leaves the container detached.
    fn sync_attachment(&self) -> Result<(), FloatAnchorError> {
        let listener = self.listener();
        let mut st = self.state.borrow_mut();
        let anchor = st.anchor();
        let Some(portal) = st.portal.as_mut() else {
            return Ok(());
        };
        let mut host = self.shared.host.borrow_mut();
        let mut anchors = self.shared.anchors.borrow_mut();
        let synced = match anchor {
            Some(a) if portal.is_attached() => portal.rebind(&*host, &mut *anchors, a),
            Some(a) => portal.attach(&mut *host, &mut *anchors, Some(a), listener),
            None => {
                portal.detach(&mut *host, &mut *anchors);
                Ok(())
            }
        };
        if synced.is_err() {
            portal.detach(&mut *host, &mut *anchors);
        }
        synced
    }

    /// Enqueue a deferred reposition unless one is already outstanding.
    fn schedule(&self) {
        let enqueue = self.state.borrow_mut().coordinator.request();
        if !enqueue {
            return;
        }
        self.publish_pending();
        let me = self.me.clone();
        self.shared.defer(Box::new(move || {
            if let Some(inner) = me.upgrade() {
                inner.on_frame();
            }
        }));
    }

    fn on_frame(&self) {
        let ancestor_pending = self.parent_channel().is_some_and(|p| p.is_pending());
        let action = self
            .state
            .borrow_mut()
            .coordinator
            .on_frame(ancestor_pending);
        match action {
            FrameAction::Ignore => return,
            FrameAction::DeferToAncestor => {
                #[cfg(feature = "tracing")]
                tracing::trace!("reposition deferred to a pending ancestor");
            }
            FrameAction::Reposition => self.reposition_now(),
            FrameAction::Settle => {}
        }
        self.publish_pending();
    }

    /// Place the float, re-render adaptive content if the placement changed, then
    /// cascade to children.
    fn reposition_now(&self) {
        if !self.state.borrow_mut().coordinator.begin() {
            return;
        }
        if self.place().is_some() {
            if let Err(_err) = self.render_float(false) {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "float content not re-rendered");
            }
        }
        self.state.borrow_mut().coordinator.finish();
        self.channel.broadcast(Signal::Repositioned);
    }

    /// Measure, resolve, and move the container. `None` when there is nothing to place.
    fn place(&self) -> Option<Choice> {
        let (container, anchor, options) = {
            let st = self.state.borrow();
            let portal = st.portal.as_ref().filter(|p| p.is_attached())?;
            (portal.container(), st.anchor()?, st.props.options)
        };
        let resolution = {
            let host = self.shared.host.borrow();
            resolve(
                host.bounding_rect(container).size(),
                host.bounding_rect(anchor),
                host.viewport(),
                &options,
            )
        };
        self.shared
            .host
            .borrow_mut()
            .move_container(container, resolution.offset());
        let mut st = self.state.borrow_mut();
        st.last_choice = Some(resolution.choice);
        st.repositions += 1;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?container,
            choice = ?resolution.choice,
            offset = ?resolution.offset(),
            fits = resolution.fits(),
            "float repositioned"
        );
        Some(resolution.choice)
    }

    fn unmount(&self) {
        let portal = {
            let mut st = self.state.borrow_mut();
            if !st.mounted {
                return;
            }
            st.mounted = false;
            st.coordinator.end();
            st.rendered = None;
            st.portal.take()
        };
        if let Some(portal) = portal {
            portal.destroy(
                &mut *self.shared.host.borrow_mut(),
                &mut *self.shared.anchors.borrow_mut(),
            );
        }
        if let Some(parent) = self.parent.borrow_mut().take().and_then(|p| p.upgrade()) {
            parent.channel.unsubscribe(&self.subscriber());
        }
        self.channel.end();
        #[cfg(feature = "tracing")]
        tracing::debug!("float anchor unmounted");
    }
}

impl<H: Host + 'static> Subscriber for Inner<H> {
    fn on_signal(&self, signal: Signal) {
        if !self.state.borrow().mounted {
            return;
        }
        match signal {
            Signal::Pending(true) => {
                self.state.borrow_mut().coordinator.inherit(true);
                self.publish_pending();
            }
            Signal::Pending(false) => {
                let owed = self.state.borrow_mut().coordinator.inherit(false);
                if owed {
                    self.reposition_now();
                }
                self.publish_pending();
            }
            Signal::Repositioned => self.reposition_now(),
            Signal::Ended => {
                *self.parent.borrow_mut() = None;
                let owed = self.state.borrow_mut().coordinator.parent_ended();
                if owed {
                    self.schedule();
                }
                self.publish_pending();
            }
        }
    }
}
