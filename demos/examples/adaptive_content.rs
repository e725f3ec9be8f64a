// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content that adapts to where it was placed.
//!
//! A popover draws an arrow pointing at its anchor. When scrolling pushes the
//! anchor to the bottom of the viewport the popover flips above it and the
//! content re-renders with the arrow on the other side.
//!
//! Run:
//! - `cargo run -p understory_demos --example adaptive_content`

use kurbo::{Rect, Size, Vec2};
use understory_contain::{Choice, Options, Position, PositionPreference};
use understory_float_anchor::adapters::float_tree::FloatBody;
use understory_float_anchor::{Anchor, FloatAnchor, FloatContent, Props, Runtime};
use understory_float_tree::{Document, LocalNode, run_until_idle, scroll_to};

fn arrow(choice: Option<Choice>) -> FloatBody {
    let text = match choice.map(|c| c.position) {
        None => "(measuring)",
        Some(Position::Bottom) => "^ popover",
        Some(Position::Top) => "popover v",
        Some(Position::Left) => "popover >",
        Some(Position::Right) => "< popover",
        Some(Position::Cover) => "popover",
    };
    FloatBody::new(text, Size::new(220.0, 80.0))
}

fn main() {
    let rt = Runtime::new(Document::new(Size::new(640.0, 480.0)));
    let (page, anchor) = {
        let mut doc = rt.host().borrow_mut();
        let body = doc.body();
        let page =
            doc.create_element(LocalNode::element("main", Rect::new(0.0, 0.0, 640.0, 480.0)));
        let anchor = doc.create_element(
            LocalNode::element("span", Rect::new(200.0, 120.0, 260.0, 140.0)).with_text("help"),
        );
        doc.append_child(body, page);
        doc.append_child(page, anchor);
        (page, anchor)
    };

    let popover = FloatAnchor::mount(
        &rt,
        Props::new(Anchor::Element(anchor))
            .float_content(FloatContent::adaptive(arrow))
            .options(Options::at(PositionPreference::Bottom)),
        None,
    )
    .expect("popover mounts");

    let show = |when: &str| {
        let doc = rt.host().borrow();
        let text = popover.container().map(|c| doc.text_content(c)).unwrap_or_default();
        println!("{when}: {text:?} ({:?})", popover.last_choice().map(|c| c.position));
    };

    show("mounted");
    run_until_idle(rt.host(), 4);
    show("first frame");
    scroll_to(rt.host(), page, Vec2::new(0.0, -300.0));
    show("anchor near the bottom");
    scroll_to(rt.host(), page, Vec2::ZERO);
    show("scrolled back");
}
