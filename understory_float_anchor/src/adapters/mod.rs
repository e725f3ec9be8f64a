// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters to integrate with other Understory crates.
//!
//! Enabled via feature flags so the core stays small and `no_std`.

#[cfg(feature = "float_tree_adapter")]
pub mod float_tree;
