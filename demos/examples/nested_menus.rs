// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested menus repositioned in one batch.
//!
//! A menu opens below a button and each level opens a submenu to the right of one
//! of its items. Every level asks for a reposition in the same frame; the output
//! shows each level placed once, parents first.
//!
//! Run:
//! - `cargo run -p understory_demos --example nested_menus`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size};
use understory_contain::{Choice, Options, PositionPreference};
use understory_float_anchor::adapters::float_tree::{FloatBody, content_node};
use understory_float_anchor::{Anchor, FloatAnchor, FloatContent, Props, Runtime};
use understory_float_tree::{Document, LocalNode, run_animation_frame};

fn main() {
    let rt = Runtime::new(Document::new(Size::new(1024.0, 768.0)));
    let button = {
        let mut doc = rt.host().borrow_mut();
        let body = doc.body();
        let b = doc.create_element(
            LocalNode::element("button", Rect::new(40.0, 40.0, 120.0, 64.0)).with_text("File"),
        );
        doc.append_child(body, b);
        b
    };

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut menus: Vec<FloatAnchor<Document>> = Vec::new();
    let mut anchor = button;
    for level in 0..3 {
        let log = log.clone();
        let content = FloatContent::adaptive(move |choice: Option<Choice>| {
            if let Some(choice) = choice {
                log.borrow_mut().push(format!("level {level}: {:?}", choice.position));
            }
            FloatBody::new("menu", Size::new(160.0, 96.0)).with_class("menu")
        });
        let position = if level == 0 {
            PositionPreference::Bottom
        } else {
            PositionPreference::Right
        };
        let menu = FloatAnchor::mount(
            &rt,
            Props::new(Anchor::Element(anchor))
                .float_content(content)
                .options(Options::at(position)),
            menus.last(),
        )
        .expect("menu mounts");
        anchor = {
            let mut doc = rt.host().borrow_mut();
            let items = content_node(&doc, menu.container().expect("menu has a container"))
                .expect("menu content is rendered");
            let item = doc.create_element(
                LocalNode::element("li", Rect::new(0.0, 32.0, 160.0, 56.0)).with_text("More"),
            );
            doc.append_child(items, item);
            item
        };
        menus.push(menu);
    }

    println!("pending before the first frame:");
    for (level, m) in menus.iter().enumerate() {
        println!("- level {level}: {:?}", m.state());
    }

    for m in menus.iter().rev() {
        m.reposition_async();
    }
    let ran = run_animation_frame(rt.host());
    println!("frame ran {ran} callback(s); placements in order:");
    for line in log.borrow().iter() {
        println!("- {line}");
    }
    for (level, m) in menus.iter().enumerate() {
        let r = rt.host().borrow().bounding_rect(m.container().expect("container"));
        println!(
            "- level {level}: at ({:.0},{:.0}), placed {} time(s)",
            r.x0,
            r.y0,
            m.repositions()
        );
    }
}
