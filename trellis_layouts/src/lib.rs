// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference layouts for the Trellis layout contract.
//!
//! - [`ListLayout`]: a single column of full-width rows with optional
//!   section headers and footers.
//! - [`GridLayout`]: fixed-size cells flowing left to right, wrapping into
//!   as many columns as fit the hosting view's width.
//!
//! Both build a [`SectionTable`](section::SectionTable) in
//! [`prepare_layout`](trellis_core::layout::LayoutEngine::prepare_layout), so
//! preparation is O(sections) and item frames are computed on query. Visible
//! ranges and drop targets are found by binary search over section offsets.
//!
//! Both support every [`DropType`](trellis_core::drop::DropType). In
//! displacement mode, items at or after the insertion point move one slot
//! later to open a gap, whose frame is the drop placeholder. An empty section
//! accepts a drop before its (absent) first item.

#![no_std]

extern crate alloc;

mod grid;
mod list;
pub mod section;

pub use grid::{GridLayout, GridLayoutConfig};
pub use list::{ListLayout, ListLayoutConfig};

use trellis_core::drop::DropIndexPath;
use trellis_core::index::IndexPath;

/// Z-index given to drop markers so they draw above items.
pub const DROP_MARKER_Z_INDEX: i32 = 1_000;

/// Fraction of an item's extent, at each end, that resolves to a drop
/// between items rather than onto the item.
pub const DROP_EDGE_FRACTION: f64 = 0.25;

/// Drop target for a point at `fraction` of the way across `index_path`.
fn drop_for_fraction(index_path: IndexPath, fraction: f64) -> DropIndexPath {
    if fraction < DROP_EDGE_FRACTION {
        DropIndexPath::before(index_path)
    } else if fraction > 1.0 - DROP_EDGE_FRACTION {
        DropIndexPath::after(index_path)
    } else {
        DropIndexPath::on(index_path)
    }
}

/// Drop target for a point over the displacement gap at `gap` in `section`.
///
/// Keeps the current target while it still names the same insertion point,
/// so hovering over the gap does not flip between equivalent targets.
fn drop_for_gap(
    section: u32,
    gap: u32,
    item_count: u32,
    current: Option<DropIndexPath>,
) -> DropIndexPath {
    if let Some(current) = current
        && current.index_path().section == section
        && current.insertion_item() == Some(gap)
    {
        return current;
    }
    match item_count.checked_sub(1) {
        Some(last) if gap >= item_count => DropIndexPath::after(IndexPath::new(section, last)),
        _ => DropIndexPath::before(IndexPath::new(section, gap)),
    }
}

/// Drop target for any point over an empty `section`: an insertion at its
/// start.
fn drop_into_empty(section: u32) -> DropIndexPath {
    DropIndexPath::before(IndexPath::new(section, 0))
}
