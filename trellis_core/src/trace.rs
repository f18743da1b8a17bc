// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for layout passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! host-side resolution functions in [`resolve`](crate::resolve) call as they
//! work. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::{Point, Rect, Size};

use crate::drop::{DropIndexPath, DropType};
use crate::index::IndexPath;
use crate::layout::{Direction, Invalidation};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a visible-range query was answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryStrategy {
    /// The layout answered from its own spatial index.
    Spatial,
    /// The layout declined and the host scanned every item.
    LinearScan,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a layout was prepared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrepareEvent {
    /// Generation the layout was prepared for.
    pub generation: u64,
    /// An explicit invalidation was pending.
    pub explicit: bool,
    /// A bounds change was pending.
    pub bounds: bool,
    /// A data reload was pending.
    pub data: bool,
    /// A displacement drag change was pending.
    pub drag: bool,
    /// Number of individually invalidated sections.
    pub invalidated_sections: u32,
    /// Number of sections in the data source at preparation time.
    pub section_count: u32,
}

impl PrepareEvent {
    /// Creates a `PrepareEvent` from an [`Invalidation`] plus the section
    /// count the layout was prepared against.
    #[must_use]
    pub fn new(invalidation: &Invalidation, section_count: u32) -> Self {
        Self {
            generation: invalidation.generation,
            explicit: invalidation.explicit,
            bounds: invalidation.bounds,
            data: invalidation.data,
            drag: invalidation.drag,
            invalidated_sections: u32::try_from(invalidation.sections.len()).unwrap_or(u32::MAX),
            section_count,
        }
    }
}

/// Emitted after a visible-range query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleQueryEvent {
    /// Queried rectangle.
    pub rect: Rect,
    /// How the answer was produced.
    pub strategy: QueryStrategy,
    /// Number of items returned.
    pub count: u32,
}

/// Emitted when a drag location is resolved to a drop target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropTargetEvent {
    /// Drag location in view-local coordinates.
    pub point: Point,
    /// Drop presentation mode in effect.
    pub drop_type: DropType,
    /// Resolved target, if any.
    pub target: Option<DropIndexPath>,
    /// Whether the target differs from the previous one in the session.
    pub changed: bool,
}

/// Emitted when a navigation request is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Requested direction.
    pub direction: Direction,
    /// Selection before the move.
    pub from: Option<IndexPath>,
    /// Selection after the move, if the move was possible.
    pub to: Option<IndexPath>,
}

/// Per-pass summary produced by [`resolve::layout_pass`](crate::resolve::layout_pass).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutPassSummary {
    /// Layout generation the pass observed.
    pub generation: u64,
    /// Visible rectangle.
    pub viewport: Rect,
    /// Whether the pass prepared the layout.
    pub prepared: bool,
    /// Number of visible items.
    pub visible: u32,
    /// Number of items that became visible.
    pub entered: u32,
    /// Number of items that stopped being visible.
    pub exited: u32,
    /// Whether the host must re-apply attributes to every visible item.
    pub reapply: bool,
    /// Resolved content size.
    pub content_size: Size,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from host-side layout resolution.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a layout was prepared.
    fn on_prepare(&mut self, e: &PrepareEvent) {
        _ = e;
    }

    /// Called after a visible-range query.
    fn on_visible_query(&mut self, e: &VisibleQueryEvent) {
        _ = e;
    }

    /// Called when a drag location is resolved.
    fn on_drop_target(&mut self, e: &DropTargetEvent) {
        _ = e;
    }

    /// Called when a navigation request is resolved.
    fn on_navigation(&mut self, e: &NavigationEvent) {
        _ = e;
    }

    /// Called with a per-pass summary.
    fn on_pass_summary(&mut self, s: &LayoutPassSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PrepareEvent`].
    #[inline]
    pub fn prepare(&mut self, e: &PrepareEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_prepare(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`VisibleQueryEvent`].
    #[inline]
    pub fn visible_query(&mut self, e: &VisibleQueryEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_visible_query(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DropTargetEvent`].
    #[inline]
    pub fn drop_target(&mut self, e: &DropTargetEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_drop_target(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NavigationEvent`].
    #[inline]
    pub fn navigation(&mut self, e: &NavigationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_navigation(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayoutPassSummary`].
    #[inline]
    pub fn pass_summary(&mut self, s: &LayoutPassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
