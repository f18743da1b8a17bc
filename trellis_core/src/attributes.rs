// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement values produced by layouts.

use kurbo::{Point, Rect, Size};

/// Height of the frame returned for a drop marker, in view-local units.
pub const DROP_MARKER_HEIGHT: f64 = 1.0;

/// The placement of one item or supplementary view.
///
/// Attributes are plain `Copy` values: once a query returns them they are a
/// snapshot of the layout at the time of the call, and mutating the copy has
/// no effect on the layout or on anything already rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutAttributes {
    /// Frame in view-local coordinates.
    pub frame: Rect,
    /// Opacity multiplier in `[0, 1]`.
    pub alpha: f64,
    /// Stacking order. Higher values draw on top; ties keep query order.
    pub z_index: i32,
}

impl Default for LayoutAttributes {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            alpha: 1.0,
            z_index: 0,
        }
    }
}

impl LayoutAttributes {
    /// Creates fully opaque attributes at z-index 0.
    #[inline]
    #[must_use]
    pub const fn new(frame: Rect) -> Self {
        Self {
            frame,
            alpha: 1.0,
            z_index: 0,
        }
    }

    /// Creates attributes from an origin and a size.
    #[must_use]
    pub fn from_origin_size(origin: impl Into<Point>, size: impl Into<Size>) -> Self {
        Self::new(Rect::from_origin_size(origin, size))
    }

    /// Returns a copy with the given opacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a copy with the given z-index.
    #[must_use]
    pub const fn with_z_index(self, z_index: i32) -> Self {
        Self { z_index, ..self }
    }

    /// Returns a copy whose frame keeps its origin and width but is exactly
    /// [`DROP_MARKER_HEIGHT`] tall.
    #[must_use]
    pub fn as_drop_marker(self) -> Self {
        Self {
            frame: Rect::from_origin_size(
                self.frame.origin(),
                (self.frame.width(), DROP_MARKER_HEIGHT),
            ),
            ..self
        }
    }

    /// Whether the frame overlaps `rect`.
    ///
    /// See [`rects_intersect`] for the edge semantics.
    #[inline]
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        rects_intersect(self.frame, rect)
    }
}

/// Whether two rectangles share interior area.
///
/// Rectangles that only touch along an edge do not intersect, so an item
/// spanning `y ∈ [40, 60)` is not visible in a viewport spanning `[0, 40)`.
#[inline]
#[must_use]
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Returns the smallest rectangle enclosing every rectangle in `rects`, or
/// `None` if the iterator is empty.
#[must_use]
pub fn union_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}
