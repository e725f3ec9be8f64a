// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tooltip that follows its anchor.
//!
//! Mounts a float anchor over a button in a scrollable list, then scrolls the list
//! and resizes the viewport, printing where the tooltip container ends up and the
//! logical ancestor chain of the tooltip content.
//!
//! Run:
//! - `cargo run -p understory_demos --example tooltip`

use kurbo::{Rect, Size, Vec2};
use understory_contain::{Options, PositionPreference};
use understory_float_anchor::adapters::float_tree::{FloatBody, content_node};
use understory_float_anchor::{Anchor, FloatAnchor, Props, Runtime};
use understory_float_tree::{
    Document, LocalNode, NodeId, resize_viewport, run_animation_frame, scroll_to,
};

fn describe(doc: &Document, id: NodeId) -> String {
    let local = doc.local(id).cloned().unwrap_or_default();
    match (&local.class_name, &local.text) {
        (Some(class), _) => format!("{}.{}", local.tag, class),
        (None, Some(text)) => format!("{}({text})", local.tag),
        _ => local.tag.to_string(),
    }
}

fn report(rt: &Runtime<Document>, tip: &FloatAnchor<Document>, when: &str) {
    let doc = rt.host().borrow();
    let Some(container) = tip.container() else {
        println!("{when}: no tooltip");
        return;
    };
    let r = doc.bounding_rect(container);
    println!(
        "{when}: {:?} at ({:.0},{:.0}) size {:.0}x{:.0} (repositions: {})",
        tip.last_choice().map(|c| c.position),
        r.x0,
        r.y0,
        r.width(),
        r.height(),
        tip.repositions()
    );
}

fn main() {
    let rt = Runtime::new(Document::new(Size::new(800.0, 600.0)));
    let (list, button) = {
        let mut doc = rt.host().borrow_mut();
        let body = doc.body();
        let list = doc.create_element(
            LocalNode::element("ul", Rect::new(0.0, 0.0, 800.0, 600.0)).with_class("list"),
        );
        let button = doc.create_element(
            LocalNode::element("button", Rect::new(300.0, 200.0, 380.0, 224.0)).with_text("Save"),
        );
        doc.append_child(body, list);
        doc.append_child(list, button);
        (list, button)
    };

    let tip = FloatAnchor::mount(
        &rt,
        Props::new(Anchor::Element(button))
            .float(FloatBody::new("Saves the document", Size::new(180.0, 40.0)).with_class("tip"))
            .options(Options::at(PositionPreference::Top).gap(4.0))
            .z_index(10)
            .container_class("tooltip-layer"),
        None,
    )
    .expect("tooltip mounts");

    run_animation_frame(rt.host());
    report(&rt, &tip, "first frame");

    scroll_to(rt.host(), list, Vec2::new(0.0, 190.0));
    report(&rt, &tip, "scrolled to the top edge");

    resize_viewport(rt.host(), Size::new(420.0, 300.0));
    report(&rt, &tip, "narrow viewport");

    if let Some(content) = tip.container().and_then(|c| content_node(&rt.host().borrow(), c)) {
        let doc = rt.host().borrow();
        let chain: Vec<String> = rt.ancestors_of(content).map(|n| describe(&doc, n)).collect();
        println!("logical ancestors: {}", chain.join(" -> "));
        println!("inside the list: {}", rt.is_within(content, list));
    }

    tip.unmount();
    println!(
        "after unmount: listeners={} anchored={}",
        rt.host().borrow().listener_count(),
        rt.anchors().borrow().len()
    );
}
