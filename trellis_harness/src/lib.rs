// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test host and conformance checks for Trellis layouts.
//!
//! - [`StaticHost`]: an in-memory [`HostView`](trellis_core::host::HostView)
//!   with mutable bounds, counts, and selectability.
//! - [`conformance`]: checks that any
//!   [`LayoutEngine`](trellis_core::layout::LayoutEngine) honours the layout
//!   contract, reported as typed [`Violation`](conformance::Violation)s.

#![no_std]

extern crate alloc;

pub mod conformance;
mod host;

pub use host::StaticHost;
