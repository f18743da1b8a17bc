// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-section offsets along the main axis.
//!
//! A [`SectionTable`] stores one [`SectionMetrics`] entry per section, so it
//! costs O(sections) to build regardless of how many items there are. Entries
//! are monotonic, which lets point and range lookups use binary search.
//!
//! ```text
//!   start ─────────┐
//!                  │ header
//!   items_start ───┤
//!                  │ item slots
//!   items_end ─────┤
//!                  │ footer
//!   end ───────────┘
//!                    section spacing
//!   start (next) ──┐
//! ```
//!
//! Item slots include the displacement gap, if the section has one. See
//! [`Displacement`].

use alloc::vec::Vec;
use core::ops::Range;

use trellis_core::drop::DropIndexPath;

/// Main-axis geometry of one section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionMetrics {
    /// Leading edge of the section, including its header.
    pub start: f64,
    /// Leading edge of the first item slot.
    pub items_start: f64,
    /// Trailing edge of the last item slot.
    pub items_end: f64,
    /// Trailing edge of the section, including its footer.
    pub end: f64,
    /// Number of items in the data source.
    pub item_count: u32,
}

/// Monotonic per-section metrics with binary-search lookups.
#[derive(Clone, Debug, Default)]
pub struct SectionTable {
    entries: Vec<SectionMetrics>,
}

impl SectionTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keeps the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Appends the next section.
    ///
    /// # Panics
    ///
    /// Panics if `metrics` starts before the previous section ends.
    pub fn push(&mut self, metrics: SectionMetrics) {
        if let Some(last) = self.entries.last() {
            assert!(
                metrics.start >= last.end,
                "sections must be pushed in main-axis order"
            );
        }
        self.entries.push(metrics);
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metrics of `section`.
    #[must_use]
    pub fn get(&self, section: u32) -> Option<&SectionMetrics> {
        self.entries.get(section as usize)
    }

    /// Iterates over `(section, metrics)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SectionMetrics)> {
        (0_u32..).zip(self.entries.iter())
    }

    /// Trailing edge of the last section, or 0 if empty.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.entries.last().map_or(0.0, |m| m.end)
    }

    /// The section whose `[start, end)` span contains `pos`.
    ///
    /// `None` for positions in section spacing or outside all sections.
    #[must_use]
    pub fn section_at(&self, pos: f64) -> Option<u32> {
        let idx = self.entries.partition_point(|m| m.end <= pos);
        let metrics = self.entries.get(idx)?;
        if metrics.start <= pos {
            u32::try_from(idx).ok()
        } else {
            None
        }
    }

    /// Sections whose span overlaps the open interval `(lo, hi)`.
    #[must_use]
    pub fn sections_overlapping(&self, lo: f64, hi: f64) -> Range<u32> {
        let first = self.entries.partition_point(|m| m.end <= lo);
        let last = self.entries.partition_point(|m| m.start < hi);
        let clamp = |i: usize| u32::try_from(i).unwrap_or(u32::MAX);
        clamp(first)..clamp(last.max(first))
    }
}

/// A gap opened at `gap` within `section` while a displacement drag is in
/// progress.
///
/// Items are laid out in *slots*. Without displacement, item `i` occupies
/// slot `i`. With displacement, items at or after `gap` move one slot later
/// and slot `gap` stays empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Displacement {
    /// Section containing the gap.
    pub section: u32,
    /// Slot left empty.
    pub gap: u32,
}

/// What occupies a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// The item with this index.
    Item(u32),
    /// The displacement gap.
    Gap,
}

impl Displacement {
    /// The displacement for an insertion target, if it opens a gap.
    ///
    /// Drops onto an item do not insert and therefore do not displace.
    #[must_use]
    pub fn for_target(target: DropIndexPath) -> Option<Self> {
        Some(Self {
            section: target.index_path().section,
            gap: target.insertion_item()?,
        })
    }

    /// Number of slots needed for `item_count` items in `section`.
    #[must_use]
    pub fn slot_count(self, section: u32, item_count: u32) -> u32 {
        if section == self.section {
            item_count.saturating_add(1)
        } else {
            item_count
        }
    }

    /// Slot occupied by `item` in `section`.
    #[must_use]
    pub fn slot_of(self, section: u32, item: u32) -> u32 {
        if section == self.section && item >= self.gap {
            item.saturating_add(1)
        } else {
            item
        }
    }

    /// What occupies `slot` in `section`.
    #[must_use]
    pub fn occupant(self, section: u32, slot: u32) -> Slot {
        if section != self.section {
            return Slot::Item(slot);
        }
        match slot.cmp(&self.gap) {
            core::cmp::Ordering::Less => Slot::Item(slot),
            core::cmp::Ordering::Equal => Slot::Gap,
            core::cmp::Ordering::Greater => Slot::Item(slot - 1),
        }
    }
}

/// Index of the slot containing `offset` for slots `stride` apart, clamping
/// negative offsets to slot 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "non-negative quotient; float-to-int casts saturate"
)]
pub(crate) fn slot_index(offset: f64, stride: f64) -> u32 {
    if offset <= 0.0 || stride <= 0.0 {
        return 0;
    }
    (offset / stride) as u32
}
