// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-and-drop presentation modes and drop targets.
//!
//! The hosting view chooses how a drop location is presented by setting a
//! [`DropType`] on the layout's [`LayoutCore`](crate::layout::LayoutCore):
//!
//! - [`DropType::None`]: no drop support. Drop queries always answer `None`.
//! - [`DropType::Marker`]: items stay in place and a one-unit-tall marker is
//!   drawn at the drop location (like a text cursor).
//! - [`DropType::Displacement`]: items are displaced to open a gap at the
//!   drop location. The layout re-prepares whenever the resolved target
//!   changes. Displaced frames are read back through the ordinary item
//!   query, and the gap itself through
//!   [`drop_placeholder_attributes`](crate::layout::LayoutLifecycle::drop_placeholder_attributes).
//!
//! Targets are [`DropIndexPath`] values resolved by the layout from a point.
//! "No valid target" is `Option::None`.

use core::fmt;

use kurbo::Point;

use crate::index::IndexPath;

/// How the hosting view presents a drop location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropType {
    /// No support for drag and drop.
    #[default]
    None,
    /// Items stay in place; a marker is drawn at the drop location.
    Marker,
    /// Items are displaced and a (possibly empty) placeholder occupies the
    /// drop location.
    Displacement,
}

/// Where a drop lands relative to its item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropRelation {
    /// Onto the item itself.
    On,
    /// Immediately before the item.
    Before,
    /// Immediately after the item.
    After,
}

/// A resolved drop target.
///
/// Only layouts produce these, via
/// [`LayoutEngine::drop_index_path_at_point`](crate::layout::LayoutEngine::drop_index_path_at_point).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropIndexPath {
    index_path: IndexPath,
    relation: DropRelation,
}

impl DropIndexPath {
    /// A drop onto `index_path`.
    #[must_use]
    pub const fn on(index_path: IndexPath) -> Self {
        Self {
            index_path,
            relation: DropRelation::On,
        }
    }

    /// A drop immediately before `index_path`.
    #[must_use]
    pub const fn before(index_path: IndexPath) -> Self {
        Self {
            index_path,
            relation: DropRelation::Before,
        }
    }

    /// A drop immediately after `index_path`.
    #[must_use]
    pub const fn after(index_path: IndexPath) -> Self {
        Self {
            index_path,
            relation: DropRelation::After,
        }
    }

    /// The item the drop is relative to.
    #[must_use]
    pub const fn index_path(&self) -> IndexPath {
        self.index_path
    }

    /// Where the drop lands relative to [`index_path`](Self::index_path).
    #[must_use]
    pub const fn relation(&self) -> DropRelation {
        self.relation
    }

    /// The item index a dropped item would be inserted at, within
    /// [`index_path`](Self::index_path)'s section.
    ///
    /// `On` drops do not insert and return `None`.
    #[must_use]
    pub const fn insertion_item(&self) -> Option<u32> {
        match self.relation {
            DropRelation::On => None,
            DropRelation::Before => Some(self.index_path.item),
            DropRelation::After => Some(self.index_path.item.saturating_add(1)),
        }
    }
}

impl fmt::Debug for DropIndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rel = match self.relation {
            DropRelation::On => "on",
            DropRelation::Before => "before",
            DropRelation::After => "after",
        };
        write!(f, "DropIndexPath({rel} {})", self.index_path)
    }
}

/// State of an in-progress drag session, owned by the layout's core.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragSession {
    /// Most recent drag location, if the pointer has moved since the session
    /// began.
    pub location: Option<Point>,
    /// Target resolved at [`location`](Self::location).
    pub target: Option<DropIndexPath>,
}
