// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for containment: placement labels, options, and results.

use kurbo::{Point, Rect};

/// Side of the anchor a floating box is placed on.
///
/// Reported back to callers in [`Choice::position`] so content can adapt to where it
/// ended up (for example, flipping an arrow).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Position {
    /// Above the anchor.
    Top,
    /// Below the anchor.
    Bottom,
    /// Left of the anchor.
    Left,
    /// Right of the anchor.
    Right,
    /// Over the anchor, aligned on both axes.
    Cover,
}

impl Position {
    /// The position on the opposite side of the anchor.
    ///
    /// `Cover` is its own opposite.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Cover => Self::Cover,
        }
    }

    /// True for positions stacked along the vertical axis (`Top`, `Bottom`).
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Preferred position requested by the caller.
///
/// Unlike [`Position`], this can defer the decision to the resolver with
/// [`PositionPreference::Auto`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PositionPreference {
    /// Pick the side with the most available space.
    Auto,
    /// Prefer above the anchor.
    #[default]
    Top,
    /// Prefer below the anchor.
    Bottom,
    /// Prefer left of the anchor.
    Left,
    /// Prefer right of the anchor.
    Right,
    /// Prefer covering the anchor.
    Cover,
}

impl From<Position> for PositionPreference {
    fn from(p: Position) -> Self {
        match p {
            Position::Top => Self::Top,
            Position::Bottom => Self::Bottom,
            Position::Left => Self::Left,
            Position::Right => Self::Right,
            Position::Cover => Self::Cover,
        }
    }
}

/// Alignment of the floating box against the anchor on the cross axis.
///
/// `Start` lines up the leading edges (left or top), `End` the trailing edges.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Align {
    /// Leading edges aligned.
    Start,
    /// Centers aligned.
    #[default]
    Center,
    /// Trailing edges aligned.
    End,
}

impl Align {
    /// The mirrored alignment. `Center` mirrors to `Start`.
    pub const fn mirror(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End | Self::Center => Self::Start,
        }
    }
}

/// Space kept free between the floating box and each viewport edge.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Margins {
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

impl Margins {
    /// The same margin on every edge.
    pub const fn uniform(m: f64) -> Self {
        Self {
            top: m,
            right: m,
            bottom: m,
            left: m,
        }
    }

    /// Shrink `viewport` by these margins. Never produces an inverted rectangle.
    pub fn inset(&self, viewport: Rect) -> Rect {
        let x0 = viewport.x0 + self.left;
        let y0 = viewport.y0 + self.top;
        let x1 = (viewport.x1 - self.right).max(x0);
        let y1 = (viewport.y1 - self.bottom).max(y0);
        Rect::new(x0, y0, x1, y1)
    }
}

/// Placement configuration.
///
/// The defaults match what most tooltips want: above the anchor, centered, no
/// margins, no gap.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Preferred side.
    pub position: PositionPreference,
    /// Preferred horizontal alignment (used by `Top`, `Bottom` and `Cover`).
    pub h_align: Align,
    /// Preferred vertical alignment (used by `Left`, `Right` and `Cover`).
    pub v_align: Align,
    /// Viewport margins the floating box should stay clear of.
    pub margins: Margins,
    /// Distance between the anchor and the floating box along the main axis.
    pub gap: f64,
    /// Only consider the preferred position; never flip to another side.
    pub force_position: bool,
    /// Only consider the preferred alignments.
    pub force_align: bool,
}

impl Options {
    /// Options preferring `position`, everything else default.
    pub fn at(position: impl Into<PositionPreference>) -> Self {
        Self {
            position: position.into(),
            ..Self::default()
        }
    }

    /// Set the preferred alignments.
    #[must_use]
    pub fn align(mut self, h_align: Align, v_align: Align) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    /// Set the viewport margins.
    #[must_use]
    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the gap between anchor and floating box.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }
}

/// The discrete placement decision.
///
/// This is what adaptive content receives to decide how to render itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Choice {
    /// Side the floating box ended up on.
    pub position: Position,
    /// Horizontal alignment used.
    pub h_align: Align,
    /// Vertical alignment used.
    pub v_align: Align,
}

/// Output of [`resolve`](crate::resolve).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The placement that was chosen.
    pub choice: Choice,
    /// Final rectangle of the floating box, after sliding it into the viewport.
    pub rect: Rect,
    /// Total overflow of the chosen placement before sliding. Zero when it fit.
    pub overflow: f64,
}

impl Resolution {
    /// Top-left offset to apply to the floating box.
    pub fn offset(&self) -> Point {
        self.rect.origin()
    }

    /// True when the chosen placement fit without sliding.
    pub fn fits(&self) -> bool {
        self.overflow <= 0.0
    }
}
