// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-column list layout.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use trellis_core::attributes::{DROP_MARKER_HEIGHT, LayoutAttributes};
use trellis_core::drop::{DropIndexPath, DropRelation};
use trellis_core::index::{IndexPath, SUPPLEMENTARY_FOOTER, SUPPLEMENTARY_HEADER};
use trellis_core::layout::{
    Direction, InvalidationReason, LayoutCore, LayoutEngine, LayoutLifecycle, PrepareContext,
    ScrollDirection,
};

use crate::section::{Displacement, SectionMetrics, SectionTable, Slot, slot_index};
use crate::{DROP_MARKER_Z_INDEX, drop_for_fraction, drop_for_gap, drop_into_empty};

/// Configuration for a [`ListLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListLayoutConfig {
    /// Height of every row. Must be positive.
    pub row_height: f64,
    /// Height of each section header; 0 for none.
    pub header_height: f64,
    /// Height of each section footer; 0 for none.
    pub footer_height: f64,
    /// Gap between consecutive sections.
    pub section_spacing: f64,
    /// Horizontal inset of drop markers from both edges.
    pub marker_inset: f64,
}

impl ListLayoutConfig {
    /// Plain rows with no headers, footers, or gaps.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            row_height: 44.0,
            header_height: 0.0,
            footer_height: 0.0,
            section_spacing: 0.0,
            marker_inset: 0.0,
        }
    }

    /// Rows grouped under headers, with footers and gaps between sections.
    #[must_use]
    pub const fn grouped() -> Self {
        Self {
            row_height: 44.0,
            header_height: 28.0,
            footer_height: 8.0,
            section_spacing: 16.0,
            marker_inset: 12.0,
        }
    }

    /// Returns a copy with the given row height.
    #[must_use]
    pub const fn with_row_height(self, row_height: f64) -> Self {
        Self { row_height, ..self }
    }

    fn validate(&self) {
        assert!(
            self.row_height.is_finite() && self.row_height > 0.0,
            "row height must be positive and finite"
        );
        assert!(
            self.header_height >= 0.0 && self.footer_height >= 0.0 && self.section_spacing >= 0.0,
            "header, footer, and spacing must not be negative"
        );
    }
}

impl Default for ListLayoutConfig {
    fn default() -> Self {
        Self::plain()
    }
}

/// Full-width rows stacked vertically, section after section.
///
/// Preparation records one [`SectionMetrics`] per section; item frames are
/// computed on query. Bounds changes invalidate only when the width changes.
/// Targeted section invalidation re-measures from the first affected section
/// onwards and keeps the ones before it.
///
/// Navigation moves up and down through items in data order, crossing
/// section boundaries and skipping empty sections. Left and right have no
/// neighbours.
///
/// Drops resolve by position within a row: the top quarter drops before the
/// row, the bottom quarter after, and the middle onto it. Headers drop before
/// the section's first item, footers after its last.
#[derive(Debug)]
pub struct ListLayout {
    core: LayoutCore,
    config: ListLayoutConfig,
    width: f64,
    sections: SectionTable,
    displacement: Option<Displacement>,
}

impl Default for ListLayout {
    fn default() -> Self {
        Self::new(ListLayoutConfig::default())
    }
}

impl ListLayout {
    /// Creates an unbound list layout.
    ///
    /// # Panics
    ///
    /// Panics if the row height is not positive, or any other dimension is
    /// negative.
    #[must_use]
    pub fn new(config: ListLayoutConfig) -> Self {
        config.validate();
        Self {
            core: LayoutCore::new(),
            config,
            width: 0.0,
            sections: SectionTable::new(),
            displacement: None,
        }
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &ListLayoutConfig {
        &self.config
    }

    /// Replaces the configuration and invalidates.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`new`](Self::new).
    pub fn set_config(&mut self, config: ListLayoutConfig) {
        config.validate();
        self.config = config;
        self.invalidate_layout();
    }

    /// Per-section metrics from the last preparation.
    #[must_use]
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    fn slot_of(&self, index_path: IndexPath) -> u32 {
        self.displacement
            .map_or(index_path.item, |d| d.slot_of(index_path.section, index_path.item))
    }

    fn slot_count(&self, section: u32, item_count: u32) -> u32 {
        self.displacement
            .map_or(item_count, |d| d.slot_count(section, item_count))
    }

    fn occupant(&self, section: u32, slot: u32) -> Slot {
        self.displacement
            .map_or(Slot::Item(slot), |d| d.occupant(section, slot))
    }

    fn slot_frame(&self, metrics: &SectionMetrics, slot: u32) -> Rect {
        let top = metrics.items_start + f64::from(slot) * self.config.row_height;
        Rect::new(0.0, top, self.width, top + self.config.row_height)
    }

    fn measure(&self, section: u32, item_count: u32, start: f64) -> SectionMetrics {
        let items_start = start + self.config.header_height;
        let items_end =
            items_start + f64::from(self.slot_count(section, item_count)) * self.config.row_height;
        SectionMetrics {
            start,
            items_start,
            items_end,
            end: items_end + self.config.footer_height,
            item_count,
        }
    }

    fn first_item_from(&self, section: u32) -> Option<IndexPath> {
        self.sections
            .iter()
            .skip(section as usize)
            .find(|(_, m)| m.item_count > 0)
            .map(|(s, _)| IndexPath::new(s, 0))
    }

    fn last_item_before(&self, section: u32) -> Option<IndexPath> {
        self.sections
            .iter()
            .take(section as usize)
            .filter(|(_, m)| m.item_count > 0)
            .last()
            .map(|(s, m)| IndexPath::new(s, m.item_count - 1))
    }

    fn is_item(&self, index_path: IndexPath) -> bool {
        self.sections
            .get(index_path.section)
            .is_some_and(|m| index_path.item < m.item_count)
    }
}

impl LayoutEngine for ListLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn did_invalidate_layout(&mut self, reason: InvalidationReason) {
        match reason {
            InvalidationReason::Explicit
            | InvalidationReason::Bounds
            | InvalidationReason::Data => {
                self.sections.clear();
            }
            // Re-measured incrementally in prepare.
            InvalidationReason::Sections | InvalidationReason::Drag => {}
        }
    }

    fn prepare_layout(&mut self, cx: &PrepareContext<'_>) {
        let section_count = cx.host.number_of_sections();
        let previous = self.displacement;
        self.displacement = self
            .core
            .displacement_target()
            .and_then(Displacement::for_target);
        self.width = cx.host.bounds().width();

        let mut first_dirty =
            if cx.invalidation.is_full() || self.sections.len() != section_count as usize {
                0
            } else {
                cx.invalidation
                    .sections
                    .first()
                    .copied()
                    .unwrap_or(section_count)
            };
        if previous != self.displacement {
            for d in [previous, self.displacement].into_iter().flatten() {
                first_dirty = first_dirty.min(d.section);
            }
        }
        self.sections.truncate(first_dirty as usize);

        let kept = u32::try_from(self.sections.len()).unwrap_or(section_count);
        for section in kept..section_count {
            let start = if section == 0 {
                0.0
            } else {
                self.sections.extent() + self.config.section_spacing
            };
            let metrics = self.measure(section, cx.host.number_of_items_in_section(section), start);
            self.sections.push(metrics);
        }
    }

    fn layout_attributes_for_item(&self, index_path: IndexPath) -> LayoutAttributes {
        debug_assert!(
            !self.core.is_clean() || self.is_item(index_path),
            "{index_path:?} is outside the data source"
        );
        let Some(metrics) = self.sections.get(index_path.section) else {
            return LayoutAttributes::default();
        };
        LayoutAttributes::new(self.slot_frame(metrics, self.slot_of(index_path)))
    }

    fn layout_attributes_for_supplementary_item(
        &self,
        section: u32,
        kind: &str,
    ) -> Option<LayoutAttributes> {
        let m = self.sections.get(section)?;
        let frame = match kind {
            SUPPLEMENTARY_HEADER if self.config.header_height > 0.0 => {
                Rect::new(0.0, m.start, self.width, m.items_start)
            }
            SUPPLEMENTARY_FOOTER if self.config.footer_height > 0.0 => {
                Rect::new(0.0, m.items_end, self.width, m.end)
            }
            _ => return None,
        };
        Some(LayoutAttributes::new(frame))
    }

    fn index_paths_for_items_in_rect(&self, rect: Rect) -> Option<Vec<IndexPath>> {
        if self.sections.is_empty() && !self.core.is_clean() {
            return None;
        }
        let mut out = Vec::new();
        if rect.x1 <= 0.0 || rect.x0 >= self.width {
            return Some(out);
        }
        let row_height = self.config.row_height;
        for section in self.sections.sections_overlapping(rect.y0, rect.y1) {
            let Some(m) = self.sections.get(section) else {
                continue;
            };
            let slots = self.slot_count(section, m.item_count);
            let first = slot_index(rect.y0 - m.items_start, row_height);
            let last = slot_index(rect.y1 - m.items_start, row_height)
                .saturating_add(1)
                .min(slots);
            for slot in first..last {
                if let Slot::Item(item) = self.occupant(section, slot) {
                    let index_path = IndexPath::new(section, item);
                    if self.layout_attributes_for_item(index_path).intersects(rect) {
                        out.push(index_path);
                    }
                }
            }
        }
        Some(out)
    }

    fn rect_for_section(&self, section: u32) -> Option<Rect> {
        let m = self.sections.get(section)?;
        Some(Rect::new(0.0, m.start, self.width, m.end))
    }

    fn content_size(&self) -> Option<Size> {
        if self.sections.is_empty() && !self.core.is_clean() {
            return None;
        }
        Some(Size::new(self.width, self.sections.extent()))
    }

    fn scroll_direction(&self) -> ScrollDirection {
        ScrollDirection::Vertical
    }

    fn index_path_for_next_item(
        &self,
        direction: Direction,
        current: Option<IndexPath>,
    ) -> Option<IndexPath> {
        if current.is_some_and(|ip| !self.is_item(ip)) {
            return None;
        }
        match (direction, current) {
            (Direction::Left | Direction::Right, _) => None,
            (Direction::Down, None) => self.first_item_from(0),
            (Direction::Up, None) => {
                self.last_item_before(u32::try_from(self.sections.len()).unwrap_or(u32::MAX))
            }
            (Direction::Down, Some(ip)) => {
                if self.is_item(ip.next_item()) {
                    Some(ip.next_item())
                } else {
                    self.first_item_from(ip.section.checked_add(1)?)
                }
            }
            (Direction::Up, Some(ip)) => match ip.item.checked_sub(1) {
                Some(item) => Some(IndexPath::new(ip.section, item)),
                None => self.last_item_before(ip.section),
            },
        }
    }

    fn drop_index_path_at_point(&self, point: Point) -> Option<DropIndexPath> {
        if point.x < 0.0 || point.x >= self.width {
            return None;
        }
        let section = self.sections.section_at(point.y)?;
        let m = self.sections.get(section)?;
        let Some(last) = m.item_count.checked_sub(1) else {
            return Some(drop_into_empty(section));
        };
        if point.y < m.items_start {
            return Some(DropIndexPath::before(IndexPath::new(section, 0)));
        }
        if point.y >= m.items_end {
            return Some(DropIndexPath::after(IndexPath::new(section, last)));
        }
        let slot = slot_index(point.y - m.items_start, self.config.row_height);
        match self.occupant(section, slot) {
            Slot::Gap => {
                let current = self.core.drag_session().and_then(|s| s.target);
                Some(drop_for_gap(section, slot, m.item_count, current))
            }
            Slot::Item(item) => {
                let index_path = IndexPath::new(section, item.min(last));
                let frame = self.slot_frame(m, slot);
                let fraction = (point.y - frame.y0) / frame.height();
                Some(drop_for_fraction(index_path, fraction))
            }
        }
    }

    fn layout_attributes_for_drop_marker(&self, target: DropIndexPath) -> Option<LayoutAttributes> {
        let index_path = target.index_path();
        let y = if self.is_item(index_path) {
            let frame = self.layout_attributes_for_item(index_path).frame;
            match target.relation() {
                DropRelation::Before => frame.y0,
                DropRelation::After => frame.y1,
                DropRelation::On => frame.center().y,
            }
        } else if target == drop_into_empty(index_path.section) {
            let m = self.sections.get(index_path.section)?;
            if m.item_count > 0 {
                return None;
            }
            m.items_start
        } else {
            return None;
        };
        let inset = self.config.marker_inset.min(self.width / 2.0);
        let half = DROP_MARKER_HEIGHT / 2.0;
        Some(
            LayoutAttributes::new(Rect::new(inset, y - half, self.width - inset, y + half))
                .with_z_index(DROP_MARKER_Z_INDEX),
        )
    }

    fn layout_attributes_for_drop_placeholder(
        &self,
        target: DropIndexPath,
    ) -> Option<LayoutAttributes> {
        let d = self
            .displacement
            .filter(|&d| Displacement::for_target(target) == Some(d))?;
        let m = self.sections.get(d.section)?;
        Some(LayoutAttributes::new(self.slot_frame(m, d.gap)))
    }

    fn should_invalidate_layout_for_bounds_change(&self, new_bounds: Rect) -> bool {
        self.sections.is_empty() || new_bounds.width() != self.width
    }
}
