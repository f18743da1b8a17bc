// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout contract for virtualized, scrollable collection views.
//!
//! `trellis_core` defines the seam between a hosting collection view (which
//! renders, recycles, and routes events) and a pluggable layout (which decides
//! where every item goes). It is `no_std` compatible (with `alloc`) and never
//! materializes the whole collection: layouts answer queries on demand from a
//! cache they build in [`prepare_layout`](layout::LayoutEngine::prepare_layout).
//!
//! # Architecture
//!
//! A layout pass driven by the hosting view looks like this:
//!
//! ```text
//!   resize / reload / drag ──► LayoutLifecycle::invalidate_*()
//!                                         │
//!                 ┌───────────────────────┘
//!                 ▼
//!   resolve::layout_pass() ──► prepare_if_needed() ──► LayoutEngine::prepare_layout()
//!                 │
//!                 ▼
//!   index_paths_for_items_in_rect()  (or linear-scan fallback)
//!                 │
//!                 ▼
//!   LayoutPass { visible, entered, exited, reapply } ──► host renders
//! ```
//!
//! **[`attributes`]**: [`LayoutAttributes`](attributes::LayoutAttributes), the
//! placement value (frame, alpha, z-index) every query returns.
//!
//! **[`index`]**: Item and supplementary addressing.
//!
//! **[`host`]**: The [`HostView`](host::HostView) surface a layout may read
//! (bounds, data counts) and the non-owning [`HostHandle`](host::HostHandle).
//!
//! **[`layout`]**: The [`LayoutEngine`](layout::LayoutEngine) contract with
//! explicit defaults, the non-overridable
//! [`LayoutLifecycle`](layout::LayoutLifecycle), and the
//! [`LayoutCore`](layout::LayoutCore) base state.
//!
//! **[`dirty`]**: Invalidation channels tracked via `understory_dirty`.
//!
//! **[`drop`]**: Drag-and-drop presentation modes and drop targets.
//!
//! **[`resolve`]**: Host-side resolution: the fallbacks the contract obliges
//! the hosting view to perform when a layout answers "unknown".
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types with a
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attributes;
pub mod dirty;
pub mod drop;
pub mod host;
pub mod index;
pub mod layout;
pub mod resolve;
pub mod trace;

#[cfg(test)]
mod testing;
