// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation channel constants.
//!
//! A layout's cached geometry can go stale for several independent reasons.
//! Each reason is a separate channel in the layout's
//! [`understory_dirty`] tracker, so that
//! [`prepare_layout`](crate::layout::LayoutEngine::prepare_layout) can see
//! *why* it is running and restrict recomputation when it is able to.
//!
//! # Keys
//!
//! Whole-layout channels ([`EXPLICIT`], [`BOUNDS`], [`DATA`], [`DRAG`]) are
//! marked on the single key [`LAYOUT_KEY`]. [`SECTIONS`] is keyed by section
//! index.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`prepare_if_needed`](crate::layout::LayoutLifecycle::prepare_if_needed)
//! drains every channel and surfaces the result as an
//! [`Invalidation`](crate::layout::Invalidation) summary.

use understory_dirty::Channel;

/// Key used for channels that apply to the whole layout.
pub const LAYOUT_KEY: u32 = u32::MAX;

/// Explicit `invalidate_layout` call (also marked at construction).
pub const EXPLICIT: Channel = Channel::new(0);

/// The hosting view's bounds changed and the layout accepted the change.
pub const BOUNDS: Channel = Channel::new(1);

/// The data source was reloaded; section and item counts may differ.
pub const DATA: Channel = Channel::new(2);

/// Specific sections changed; keyed by section index.
pub const SECTIONS: Channel = Channel::new(3);

/// The resolved drop target changed during a displacement drag.
pub const DRAG: Channel = Channel::new(4);
