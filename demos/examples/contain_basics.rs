// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containment basics.
//!
//! Resolves one floating box against anchors near each viewport edge and prints
//! where it lands, showing flips to the opposite side and slides back on screen.
//!
//! Run:
//! - `cargo run -p understory_demos --example contain_basics`

use kurbo::{Point, Rect, Size};
use understory_contain::{Align, Options, PositionPreference, position_order, resolve};

fn main() {
    let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
    let float = Size::new(200.0, 100.0);
    let options = Options::at(PositionPreference::Bottom).align(Align::Start, Align::Center);

    let anchors = [
        ("middle", Point::new(375.0, 290.0)),
        ("near bottom", Point::new(375.0, 560.0)),
        ("bottom right", Point::new(760.0, 560.0)),
        ("top left", Point::new(0.0, 0.0)),
    ];

    println!("float {}x{} preferring bottom/start", float.width, float.height);
    for (label, origin) in anchors {
        let anchor = Rect::from_origin_size(origin, Size::new(50.0, 20.0));
        let r = resolve(float, anchor, viewport, &options);
        println!(
            "- {label:<12} anchor=({:>5.1},{:>5.1}) -> {:?}/{:?} at ({:>5.1},{:>5.1}) {}",
            anchor.x0,
            anchor.y0,
            r.choice.position,
            r.choice.h_align,
            r.rect.x0,
            r.rect.y0,
            if r.fits() { "fits" } else { "slid" },
        );
    }

    let anchor = Rect::new(375.0, 500.0, 425.0, 520.0);
    let order = position_order(PositionPreference::Auto, anchor, viewport, false);
    println!("auto order for an anchor near the bottom: {:?}", order.as_slice());
}
