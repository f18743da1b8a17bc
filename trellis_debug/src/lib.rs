// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for Trellis layout traces.
//!
//! This crate provides [`TraceSink`](trellis_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] writes one human-readable line per event.
//! - [`recorder::RecorderSink`] records compact binary, read back with
//!   [`recorder::decode`].
//! - [`json::export`] writes recorded bytes as a JSON array.

pub mod json;
pub mod pretty;
pub mod recorder;
