// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The containment resolver: candidate ordering, fitting, and sliding.

use kurbo::{Point, Rect, Size};

use crate::types::{Align, Choice, Options, Position, PositionPreference, Resolution};

/// Small fixed-capacity list; the resolver never needs more than five entries.
#[derive(Copy, Clone, Debug)]
struct Fixed<T: Copy, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + PartialEq, const N: usize> Fixed<T, N> {
    fn new(fill: T) -> Self {
        Self {
            items: [fill; N],
            len: 0,
        }
    }

    fn push_unique(&mut self, v: T) {
        if self.len < N && !self.as_slice().contains(&v) {
            self.items[self.len] = v;
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }
}

/// Resolve where a floating box of size `float` goes relative to `anchor`, inside
/// `viewport`.
///
/// All rectangles share one coordinate space. The result is deterministic for
/// identical inputs. Inputs are assumed to be finite (no NaNs).
///
/// Candidates are tried in a fixed order (see [`position_order`]); the first one that
/// fits inside the viewport (minus [`Options::margins`]) wins. When nothing fits, the
/// candidate with the least overflow wins, with ties going to the earlier candidate.
/// The winner is then slid into the viewport, keeping its top-left corner visible when
/// it is larger than the viewport.
pub fn resolve(float: Size, anchor: Rect, viewport: Rect, options: &Options) -> Resolution {
    let float = Size::new(float.width.max(0.0), float.height.max(0.0));
    let anchor = anchor.abs();
    let bounds = options.margins.inset(viewport.abs());
    let gap = options.gap.max(0.0);

    let mut best: Option<(Choice, Rect, f64)> = None;
    for &position in position_order(options.position, anchor, bounds, options.force_position)
        .as_slice()
    {
        let h_aligns = alignments(options.h_align, options.force_align || !varies_h(position));
        let v_aligns = alignments(options.v_align, options.force_align || !varies_v(position));
        for &h_align in h_aligns.as_slice() {
            for &v_align in v_aligns.as_slice() {
                let choice = Choice {
                    position,
                    h_align,
                    v_align,
                };
                let rect = place(choice, float, anchor, gap);
                let overflow = overflow(rect, bounds);
                if overflow <= 0.0 {
                    return Resolution {
                        choice,
                        rect,
                        overflow: 0.0,
                    };
                }
                match best {
                    Some((_, _, o)) if o <= overflow => {}
                    _ => best = Some((choice, rect, overflow)),
                }
            }
        }
    }

    // `position_order` always yields at least one candidate.
    let (choice, rect, overflow) = best.unwrap_or_else(|| {
        let choice = Choice {
            position: Position::Cover,
            h_align: options.h_align,
            v_align: options.v_align,
        };
        let rect = place(choice, float, anchor, gap);
        (choice, rect, overflow(rect, bounds))
    });
    Resolution {
        choice,
        rect: slide(rect, bounds),
        overflow,
    }
}

/// The order in which positions are tried for a given preference.
///
/// - `Top`: top, bottom, left, right.
/// - `Bottom`: bottom, top, left, right.
/// - `Left`: left, right, top, bottom.
/// - `Right`: right, left, top, bottom.
/// - `Cover`: cover, then top, bottom, left, right.
/// - `Auto`: the four sides by available space, largest first; equal space keeps the
///   top, bottom, left, right order.
///
/// With `force` only the first entry is kept.
pub fn position_order(
    preference: PositionPreference,
    anchor: Rect,
    bounds: Rect,
    force: bool,
) -> PositionOrder {
    use Position::*;
    let mut out = Fixed::new(Top);
    let preferred = match preference {
        PositionPreference::Auto => by_space(anchor, bounds)[0],
        PositionPreference::Top => Top,
        PositionPreference::Bottom => Bottom,
        PositionPreference::Left => Left,
        PositionPreference::Right => Right,
        PositionPreference::Cover => Cover,
    };
    out.push_unique(preferred);
    if !force {
        match preference {
            PositionPreference::Auto => {
                for p in by_space(anchor, bounds) {
                    out.push_unique(p);
                }
            }
            PositionPreference::Cover => {
                for p in [Top, Bottom, Left, Right] {
                    out.push_unique(p);
                }
            }
            _ => {
                out.push_unique(preferred.opposite());
                let perpendicular = if preferred.is_vertical() {
                    [Left, Right]
                } else {
                    [Top, Bottom]
                };
                for p in perpendicular {
                    out.push_unique(p);
                }
            }
        }
    }
    PositionOrder(out)
}

/// Ordered positions returned by [`position_order`].
#[derive(Copy, Clone, Debug)]
pub struct PositionOrder(Fixed<Position, 5>);

impl PositionOrder {
    /// The positions, most preferred first.
    pub fn as_slice(&self) -> &[Position] {
        self.0.as_slice()
    }
}

fn by_space(anchor: Rect, bounds: Rect) -> [Position; 4] {
    let space = |p: Position| match p {
        Position::Top => anchor.y0 - bounds.y0,
        Position::Bottom => bounds.y1 - anchor.y1,
        Position::Left => anchor.x0 - bounds.x0,
        Position::Right => bounds.x1 - anchor.x1,
        Position::Cover => 0.0,
    };
    let mut sides = [
        Position::Top,
        Position::Bottom,
        Position::Left,
        Position::Right,
    ];
    // Stable insertion sort, largest space first.
    for i in 1..sides.len() {
        let mut j = i;
        while j > 0 && space(sides[j]) > space(sides[j - 1]) {
            sides.swap(j, j - 1);
            j -= 1;
        }
    }
    sides
}

fn varies_h(p: Position) -> bool {
    matches!(p, Position::Top | Position::Bottom | Position::Cover)
}

fn varies_v(p: Position) -> bool {
    matches!(p, Position::Left | Position::Right | Position::Cover)
}

fn alignments(preferred: Align, force: bool) -> Fixed<Align, 3> {
    let mut out = Fixed::new(preferred);
    out.push_unique(preferred);
    if !force {
        out.push_unique(preferred.mirror());
        for a in [Align::Start, Align::Center, Align::End] {
            out.push_unique(a);
        }
    }
    out
}

/// Rectangle of the floating box for a given choice, before any sliding.
pub fn place(choice: Choice, float: Size, anchor: Rect, gap: f64) -> Rect {
    let x = match choice.h_align {
        Align::Start => anchor.x0,
        Align::Center => anchor.center().x - float.width / 2.0,
        Align::End => anchor.x1 - float.width,
    };
    let y = match choice.v_align {
        Align::Start => anchor.y0,
        Align::Center => anchor.center().y - float.height / 2.0,
        Align::End => anchor.y1 - float.height,
    };
    let origin = match choice.position {
        Position::Top => Point::new(x, anchor.y0 - gap - float.height),
        Position::Bottom => Point::new(x, anchor.y1 + gap),
        Position::Left => Point::new(anchor.x0 - gap - float.width, y),
        Position::Right => Point::new(anchor.x1 + gap, y),
        Position::Cover => Point::new(x, y),
    };
    Rect::from_origin_size(origin, float)
}

/// Sum of the distances by which `rect` crosses each edge of `bounds`.
pub fn overflow(rect: Rect, bounds: Rect) -> f64 {
    (bounds.x0 - rect.x0).max(0.0)
        + (rect.x1 - bounds.x1).max(0.0)
        + (bounds.y0 - rect.y0).max(0.0)
        + (rect.y1 - bounds.y1).max(0.0)
}

/// Move `rect` inside `bounds` on both axes. The start edges win when `rect` is larger.
fn slide(rect: Rect, bounds: Rect) -> Rect {
    let size = rect.size();
    let axis = |start: f64, len: f64, lo: f64, hi: f64| {
        let mut s = start;
        if s + len > hi {
            s = hi - len;
        }
        if s < lo {
            s = lo;
        }
        s
    };
    let x = axis(rect.x0, size.width, bounds.x0, bounds.x1);
    let y = axis(rect.y0, size.height, bounds.y0, bounds.y1);
    Rect::from_origin_size(Point::new(x, y), size)
}
