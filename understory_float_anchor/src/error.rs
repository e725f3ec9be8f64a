// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by float anchors.

use core::fmt;

/// A float anchor was asked to do something its current state cannot support.
///
/// Every variant indicates a usage bug rather than a transient condition: the
/// asynchronous repositioning paths never produce them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FloatAnchorError {
    /// A floating element is present but no anchor node is known.
    MissingAnchor,
    /// Float content had to be rendered but the container does not exist.
    MissingContainer,
    /// The mount target refused the container, for example because it is gone or
    /// lives inside the container itself.
    MountRejected,
    /// The anchor lies inside the float's own container, directly or through other
    /// floats, so the logical tree would loop.
    AnchorInsideFloat,
}

impl fmt::Display for FloatAnchorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAnchor => write!(f, "float is present but the anchor is not set"),
            Self::MissingContainer => write!(f, "float container is missing"),
            Self::MountRejected => write!(f, "mount target refused the float container"),
            Self::AnchorInsideFloat => write!(f, "anchor is inside its own float container"),
        }
    }
}

impl core::error::Error for FloatAnchorError {}
