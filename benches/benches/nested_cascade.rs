// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use kurbo::{Rect, Size, Vec2};
use understory_contain::{Options, PositionPreference};
use understory_float_anchor::adapters::float_tree::{FloatBody, content_node};
use understory_float_anchor::{Anchor, FloatAnchor, Props, Runtime};
use understory_float_tree::{Document, LocalNode, NodeId, run_animation_frame, scroll_to};

struct Chain {
    rt: Runtime<Document>,
    scroller: NodeId,
    floats: Vec<FloatAnchor<Document>>,
}

/// A scrollable page with a menu nested `depth` levels deep.
fn build_chain(depth: usize) -> Chain {
    let rt = Runtime::new(Document::new(Size::new(1280.0, 800.0)));
    let (scroller, button) = {
        let mut doc = rt.host().borrow_mut();
        let body = doc.body();
        let scroller =
            doc.create_element(LocalNode::element("div", Rect::new(0.0, 0.0, 1280.0, 800.0)));
        let button =
            doc.create_element(LocalNode::element("button", Rect::new(20.0, 20.0, 100.0, 44.0)));
        doc.append_child(body, scroller);
        doc.append_child(scroller, button);
        (scroller, button)
    };
    let mut floats: Vec<FloatAnchor<Document>> = Vec::with_capacity(depth);
    let mut anchor = button;
    for level in 0..depth {
        let fa = FloatAnchor::mount(
            &rt,
            Props::new(Anchor::Element(anchor))
                .float(FloatBody::new("menu", Size::new(160.0, 120.0)))
                .options(Options::at(if level == 0 {
                    PositionPreference::Bottom
                } else {
                    PositionPreference::Right
                })),
            floats.last(),
        )
        .expect("mount");
        let item = {
            let mut doc = rt.host().borrow_mut();
            let content =
                content_node(&doc, fa.container().expect("container")).expect("content");
            let item =
                doc.create_element(LocalNode::element("li", Rect::new(0.0, 40.0, 160.0, 64.0)));
            doc.append_child(content, item);
            item
        };
        anchor = item;
        floats.push(fa);
    }
    run_animation_frame(rt.host());
    Chain {
        rt,
        scroller,
        floats,
    }
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    for depth in [1_usize, 4, 16] {
        let chain = build_chain(depth);
        group.bench_function(format!("reposition_depth{}", depth), |b| {
            b.iter(|| chain.floats[0].reposition().expect("reposition"));
        });
        let mut offset = 0.0;
        group.bench_function(format!("scroll_depth{}", depth), |b| {
            b.iter(|| {
                offset = if offset == 0.0 { 10.0 } else { 0.0 };
                scroll_to(chain.rt.host(), chain.scroller, Vec2::new(0.0, offset));
            });
        });
    }
    group.finish();
}

fn bench_batched(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched");
    group.bench_function("request_all_depth16_one_frame", |b| {
        b.iter_batched(
            || build_chain(16),
            |chain| {
                for fa in chain.floats.iter().rev() {
                    fa.reposition_async();
                }
                run_animation_frame(chain.rt.host());
                chain
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_cascade, bench_batched);
criterion_main!(benches);
