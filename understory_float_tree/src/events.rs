// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving a shared document: dispatching events and running frames.
//!
//! Listeners and frame callbacks usually need to reach back into the document.
//! These helpers take the document by `&RefCell` and never hold a borrow while a
//! callback runs.

use core::cell::RefCell;

use kurbo::{Size, Vec2};

use crate::document::Document;
use crate::types::{Event, NodeId};

/// Deliver `event` to every listener registered for its kind.
///
/// Returns the number of listeners invoked. A listener removed while the event is
/// being delivered is skipped; one added meanwhile waits for the next dispatch.
pub fn dispatch(doc: &RefCell<Document>, event: Event) -> usize {
    let listeners = doc.borrow().listeners_for(event.kind());
    let mut invoked = 0;
    for (id, l) in &listeners {
        if !doc.borrow().has_listener(*id) {
            continue;
        }
        l(&event);
        invoked += 1;
    }
    invoked
}

/// Run one animation frame: every callback queued so far, in request order.
///
/// Returns the number of callbacks run. Callbacks requested while the frame runs
/// are left for the next frame.
pub fn run_animation_frame(doc: &RefCell<Document>) -> usize {
    let frames = doc.borrow_mut().take_frames();
    let n = frames.len();
    for f in frames {
        f();
    }
    n
}

/// Run frames until none are queued, up to `max_frames`. Returns the frames run.
pub fn run_until_idle(doc: &RefCell<Document>, max_frames: usize) -> usize {
    let mut ran = 0;
    while ran < max_frames && doc.borrow().pending_frames() > 0 {
        run_animation_frame(doc);
        ran += 1;
    }
    ran
}

/// Set the scroll offset of `node` and dispatch a scroll event targeting it.
pub fn scroll_to(doc: &RefCell<Document>, node: NodeId, offset: Vec2) -> usize {
    doc.borrow_mut().set_scroll_offset(node, offset);
    dispatch(doc, Event::Scroll { target: node })
}

/// Resize the viewport and dispatch a resize event.
pub fn resize_viewport(doc: &RefCell<Document>, size: Size) -> usize {
    doc.borrow_mut().set_viewport(size);
    dispatch(doc, Event::Resize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventKind, LocalNode};
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use kurbo::Rect;

    #[test]
    fn dispatch_reaches_matching_listeners() {
        let doc = RefCell::new(Document::new(Size::new(100.0, 100.0)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let id = doc.borrow_mut().add_listener(
            EventKind::Scroll,
            Rc::new(move |e: &Event| s.borrow_mut().push(*e)),
        );
        let resizes = Rc::new(Cell::new(0));
        let r = resizes.clone();
        doc.borrow_mut()
            .add_listener(EventKind::Resize, Rc::new(move |_: &Event| r.set(r.get() + 1)));

        let body = doc.borrow().body();
        assert_eq!(scroll_to(&doc, body, Vec2::new(0.0, 10.0)), 1);
        assert_eq!(resize_viewport(&doc, Size::new(50.0, 50.0)), 1);
        assert_eq!(*seen.borrow(), [Event::Scroll { target: body }]);
        assert_eq!(resizes.get(), 1);
        assert_eq!(doc.borrow().viewport(), Rect::new(0.0, 0.0, 50.0, 50.0));

        assert!(doc.borrow_mut().remove_listener(id));
        assert!(!doc.borrow_mut().remove_listener(id));
        assert_eq!(scroll_to(&doc, body, Vec2::ZERO), 0);
    }

    #[test]
    fn listeners_removed_mid_dispatch_are_skipped() {
        let doc = Rc::new(RefCell::new(Document::new(Size::new(100.0, 100.0))));
        let second = Rc::new(Cell::new(None));
        let calls = Rc::new(Cell::new(0));
        let (d, s) = (Rc::downgrade(&doc), second.clone());
        doc.borrow_mut().add_listener(
            EventKind::Resize,
            Rc::new(move |_: &Event| {
                if let (Some(d), Some(id)) = (d.upgrade(), s.get()) {
                    d.borrow_mut().remove_listener(id);
                }
            }),
        );
        let c = calls.clone();
        let id = doc
            .borrow_mut()
            .add_listener(EventKind::Resize, Rc::new(move |_: &Event| c.set(c.get() + 1)));
        second.set(Some(id));

        assert_eq!(resize_viewport(&doc, Size::new(50.0, 50.0)), 1);
        assert_eq!(calls.get(), 0);
        assert!(!doc.borrow().has_listener(id));
    }

    #[test]
    fn listeners_may_touch_the_document() {
        let doc = Rc::new(RefCell::new(Document::new(Size::new(100.0, 100.0))));
        let d = Rc::downgrade(&doc);
        doc.borrow_mut().add_listener(
            EventKind::Resize,
            Rc::new(move |_: &Event| {
                if let Some(d) = d.upgrade() {
                    let n = d.borrow_mut().create_element(LocalNode::default());
                    let body = d.borrow().body();
                    d.borrow_mut().append_child(body, n);
                }
            }),
        );
        resize_viewport(&doc, Size::new(10.0, 10.0));
        let body = doc.borrow().body();
        assert_eq!(doc.borrow().children(body).len(), 1);
    }

    #[test]
    fn frames_requested_during_a_frame_wait() {
        let doc = Rc::new(RefCell::new(Document::new(Size::new(100.0, 100.0))));
        let count = Rc::new(Cell::new(0));
        let (d, c) = (Rc::downgrade(&doc), count.clone());
        let _ = doc.borrow_mut().request_animation_frame(Box::new(move || {
            c.set(c.get() + 1);
            let c2 = c.clone();
            if let Some(d) = d.upgrade() {
                let _ = d
                    .borrow_mut()
                    .request_animation_frame(Box::new(move || c2.set(c2.get() + 1)));
            }
        }));
        assert_eq!(run_animation_frame(&doc), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(doc.borrow().pending_frames(), 1);
        assert_eq!(run_until_idle(&doc, 8), 1);
        assert_eq!(count.get(), 2);
    }
}
