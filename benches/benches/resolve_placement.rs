// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size};
use understory_contain::{Align, Margins, Options, PositionPreference, resolve};

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 800.0);

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        // xorshift64*
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        let v = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        (v >> 11) as f64 / (1_u64 << 53) as f64
    }
}

fn gen_anchors(n: usize, seed: u64) -> Vec<Rect> {
    let mut rng = Rng::new(seed);
    (0..n)
        .map(|_| {
            let x = rng.next_f64() * VIEWPORT.width();
            let y = rng.next_f64() * VIEWPORT.height();
            Rect::from_origin_size(Point::new(x, y), Size::new(80.0, 24.0))
        })
        .collect()
}

fn bench_preferences(c: &mut Criterion) {
    let anchors = gen_anchors(1024, 0x5eed);
    let float = Size::new(240.0, 160.0);
    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(anchors.len() as u64));
    for (name, pref) in [
        ("top", PositionPreference::Top),
        ("bottom", PositionPreference::Bottom),
        ("right", PositionPreference::Right),
        ("cover", PositionPreference::Cover),
        ("auto", PositionPreference::Auto),
    ] {
        let options = Options::at(pref);
        group.bench_function(name, |b| {
            b.iter(|| {
                for a in &anchors {
                    black_box(resolve(black_box(float), *a, VIEWPORT, &options));
                }
            });
        });
    }
    group.finish();
}

fn bench_crowded(c: &mut Criterion) {
    // Floats larger than most of the free space force a scan of every candidate.
    let anchors = gen_anchors(1024, 0xc0ffee);
    let float = Size::new(900.0, 500.0);
    let options = Options::at(PositionPreference::Left)
        .align(Align::End, Align::Start)
        .margins(Margins::uniform(16.0))
        .gap(8.0);
    let mut group = c.benchmark_group("resolve_crowded");
    group.throughput(Throughput::Elements(anchors.len() as u64));
    group.bench_function("all_candidates", |b| {
        b.iter(|| {
            for a in &anchors {
                black_box(resolve(float, *a, VIEWPORT, &options));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_preferences, bench_crowded);
criterion_main!(benches);
