// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size cell grid layout.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use trellis_core::attributes::{DROP_MARKER_HEIGHT, LayoutAttributes};
use trellis_core::drop::{DropIndexPath, DropRelation};
use trellis_core::index::{IndexPath, SUPPLEMENTARY_HEADER};
use trellis_core::layout::{
    Direction, InvalidationReason, LayoutCore, LayoutEngine, LayoutLifecycle, PrepareContext,
    ScrollDirection,
};

use crate::section::{Displacement, SectionMetrics, SectionTable, Slot, slot_index};
use crate::{DROP_MARKER_Z_INDEX, drop_for_fraction, drop_for_gap, drop_into_empty};

/// Configuration for a [`GridLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayoutConfig {
    /// Size of every cell. Both dimensions must be positive.
    pub item_size: Size,
    /// Gap between cells on both axes, and between sections.
    pub spacing: f64,
    /// Height of each section header; 0 for none.
    pub header_height: f64,
}

impl GridLayoutConfig {
    /// Small square icons packed closely.
    #[must_use]
    pub const fn icons() -> Self {
        Self {
            item_size: Size::new(64.0, 64.0),
            spacing: 8.0,
            header_height: 0.0,
        }
    }

    /// Landscape thumbnails grouped under section headers.
    #[must_use]
    pub const fn thumbnails() -> Self {
        Self {
            item_size: Size::new(160.0, 120.0),
            spacing: 12.0,
            header_height: 24.0,
        }
    }

    /// Returns a copy with the given cell size.
    #[must_use]
    pub const fn with_item_size(self, item_size: Size) -> Self {
        Self { item_size, ..self }
    }

    /// Number of columns that fit in `width`. Always at least one.
    #[must_use]
    pub fn columns_for_width(&self, width: f64) -> u32 {
        slot_index(width + self.spacing, self.item_size.width + self.spacing).max(1)
    }

    fn stride(&self) -> Size {
        Size::new(
            self.item_size.width + self.spacing,
            self.item_size.height + self.spacing,
        )
    }

    fn validate(&self) {
        assert!(
            self.item_size.is_finite() && self.item_size.width > 0.0 && self.item_size.height > 0.0,
            "item size must be positive and finite"
        );
        assert!(
            self.spacing >= 0.0 && self.header_height >= 0.0,
            "spacing and header height must not be negative"
        );
    }
}

impl Default for GridLayoutConfig {
    fn default() -> Self {
        Self::icons()
    }
}

/// Fixed-size cells flowing left to right, top to bottom, section after
/// section.
///
/// The column count is the number of cells (plus spacing) that fit the
/// hosting view's width, never less than one. Bounds changes invalidate only
/// when the column count changes. Content is as wide as the columns it uses.
///
/// Navigation moves one cell in any direction. Left and right stop at row
/// edges. Up and down cross into the neighbouring non-empty section, keeping
/// the column where possible.
///
/// Drops resolve by horizontal position within a cell: the left quarter drops
/// before the cell, the right quarter (and the gutter after it) drops after,
/// and the middle onto it.
#[derive(Debug)]
pub struct GridLayout {
    core: LayoutCore,
    config: GridLayoutConfig,
    columns: u32,
    sections: SectionTable,
    displacement: Option<Displacement>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(GridLayoutConfig::default())
    }
}

impl GridLayout {
    /// Creates an unbound grid layout.
    ///
    /// # Panics
    ///
    /// Panics if the cell size is not positive, or the spacing or header
    /// height is negative.
    #[must_use]
    pub fn new(config: GridLayoutConfig) -> Self {
        config.validate();
        Self {
            core: LayoutCore::new(),
            config,
            columns: 1,
            sections: SectionTable::new(),
            displacement: None,
        }
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &GridLayoutConfig {
        &self.config
    }

    /// Replaces the configuration and invalidates.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`new`](Self::new).
    pub fn set_config(&mut self, config: GridLayoutConfig) {
        config.validate();
        self.config = config;
        self.invalidate_layout();
    }

    /// Column count from the last preparation.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Per-section metrics from the last preparation.
    #[must_use]
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    fn grid_width(&self) -> f64 {
        f64::from(self.columns) * self.config.stride().width - self.config.spacing
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

    fn rows_for(&self, slots: u32) -> u32 {
        slots.div_ceil(self.columns)
    }

    fn slot_frame(&self, metrics: &SectionMetrics, slot: u32) -> Rect {
        let stride = self.config.stride();
        let x = f64::from(slot % self.columns) * stride.width;
        let y = metrics.items_start + f64::from(slot / self.columns) * stride.height;
        Rect::from_origin_size((x, y), self.config.item_size)
    }

    fn measure(&self, section: u32, item_count: u32, start: f64) -> SectionMetrics {
        let items_start = start + self.config.header_height;
        let rows = self.rows_for(self.slot_count(section, item_count));
        let items_end = if rows == 0 {
            items_start
        } else {
            items_start + f64::from(rows) * self.config.stride().height - self.config.spacing
        };
        SectionMetrics {
            start,
            items_start,
            items_end,
            end: items_end,
            item_count,
        }
    }

    fn is_item(&self, index_path: IndexPath) -> bool {
        self.sections
            .get(index_path.section)
            .is_some_and(|m| index_path.item < m.item_count)
    }

    fn nonempty_after(&self, section: u32) -> Option<(u32, u32)> {
        self.sections
            .iter()
            .skip(section as usize + 1)
            .find(|(_, m)| m.item_count > 0)
            .map(|(s, m)| (s, m.item_count))
    }

    fn nonempty_before(&self, section: u32) -> Option<(u32, u32)> {
        self.sections
            .iter()
            .take(section as usize)
            .filter(|(_, m)| m.item_count > 0)
            .last()
            .map(|(s, m)| (s, m.item_count))
    }

    fn last_item(&self) -> Option<IndexPath> {
        let sections = u32::try_from(self.sections.len()).unwrap_or(u32::MAX);
        self.nonempty_before(sections)
            .map(|(s, count)| IndexPath::new(s, count - 1))
    }

    fn first_item(&self) -> Option<IndexPath> {
        self.sections
            .iter()
            .find(|(_, m)| m.item_count > 0)
            .map(|(s, _)| IndexPath::new(s, 0))
    }
}

impl LayoutEngine for GridLayout {
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
        let columns = self.config.columns_for_width(cx.host.bounds().width());

        let mut first_dirty = if cx.invalidation.is_full()
            || columns != self.columns
            || self.sections.len() != section_count as usize
        {
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
        self.columns = columns;
        self.sections.truncate(first_dirty as usize);

        let kept = u32::try_from(self.sections.len()).unwrap_or(section_count);
        for section in kept..section_count {
            let start = if section == 0 {
                0.0
            } else {
                self.sections.extent() + self.config.spacing
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
        if kind != SUPPLEMENTARY_HEADER || self.config.header_height <= 0.0 {
            return None;
        }
        let m = self.sections.get(section)?;
        Some(LayoutAttributes::new(Rect::new(
            0.0,
            m.start,
            self.grid_width(),
            m.items_start,
        )))
    }

    fn index_paths_for_items_in_rect(&self, rect: Rect) -> Option<Vec<IndexPath>> {
        if self.sections.is_empty() && !self.core.is_clean() {
            return None;
        }
        let mut out = Vec::new();
        if rect.x1 <= 0.0 || rect.x0 >= self.grid_width() {
            return Some(out);
        }
        let stride = self.config.stride();
        let first_col = slot_index(rect.x0, stride.width);
        let last_col = slot_index(rect.x1, stride.width)
            .saturating_add(1)
            .min(self.columns);
        for section in self.sections.sections_overlapping(rect.y0, rect.y1) {
            let Some(m) = self.sections.get(section) else {
                continue;
            };
            let slots = self.slot_count(section, m.item_count);
            let first_row = slot_index(rect.y0 - m.items_start, stride.height);
            let last_row = slot_index(rect.y1 - m.items_start, stride.height)
                .saturating_add(1)
                .min(self.rows_for(slots));
            for row in first_row..last_row {
                for col in first_col..last_col {
                    let slot = row * self.columns + col;
                    if slot >= slots {
                        break;
                    }
                    if let Slot::Item(item) = self.occupant(section, slot) {
                        let index_path = IndexPath::new(section, item);
                        if self.layout_attributes_for_item(index_path).intersects(rect) {
                            out.push(index_path);
                        }
                    }
                }
            }
        }
        Some(out)
    }

    fn rect_for_section(&self, section: u32) -> Option<Rect> {
        let m = self.sections.get(section)?;
        Some(Rect::new(0.0, m.start, self.grid_width(), m.end))
    }

    fn content_size(&self) -> Option<Size> {
        if self.sections.is_empty() && !self.core.is_clean() {
            return None;
        }
        Some(Size::new(self.grid_width(), self.sections.extent()))
    }

    fn scroll_direction(&self) -> ScrollDirection {
        ScrollDirection::Vertical
    }

    fn index_path_for_next_item(
        &self,
        direction: Direction,
        current: Option<IndexPath>,
    ) -> Option<IndexPath> {
        let Some(ip) = current else {
            return match direction {
                Direction::Right | Direction::Down => self.first_item(),
                Direction::Left | Direction::Up => self.last_item(),
            };
        };
        let count = self.sections.get(ip.section)?.item_count;
        if ip.item >= count {
            return None;
        }
        let columns = self.columns;
        let col = ip.item % columns;
        let row = ip.item / columns;
        let last_row = (count - 1) / columns;
        match direction {
            Direction::Left => (col > 0).then(|| IndexPath::new(ip.section, ip.item - 1)),
            Direction::Right => (col + 1 < columns && ip.item + 1 < count)
                .then(|| IndexPath::new(ip.section, ip.item + 1)),
            Direction::Up => {
                if row > 0 {
                    return Some(IndexPath::new(ip.section, ip.item - columns));
                }
                let (section, count) = self.nonempty_before(ip.section)?;
                let last_row_start = ((count - 1) / columns) * columns;
                Some(IndexPath::new(section, (last_row_start + col).min(count - 1)))
            }
            Direction::Down => {
                if row < last_row {
                    return Some(IndexPath::new(
                        ip.section,
                        ip.item.saturating_add(columns).min(count - 1),
                    ));
                }
                let (section, count) = self.nonempty_after(ip.section)?;
                Some(IndexPath::new(section, col.min(count - 1)))
            }
        }
    }

    fn drop_index_path_at_point(&self, point: Point) -> Option<DropIndexPath> {
        if point.x < 0.0 || point.x >= self.grid_width() {
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
        let stride = self.config.stride();
        let slots = self.slot_count(section, m.item_count);
        let row = slot_index(point.y - m.items_start, stride.height)
            .min(self.rows_for(slots).saturating_sub(1));
        let col = slot_index(point.x, stride.width).min(self.columns - 1);
        let slot = row * self.columns + col;
        if slot >= slots {
            return Some(DropIndexPath::after(IndexPath::new(section, last)));
        }
        match self.occupant(section, slot) {
            Slot::Gap => {
                let current = self.core.drag_session().and_then(|s| s.target);
                Some(drop_for_gap(section, slot, m.item_count, current))
            }
            Slot::Item(item) => {
                let frame = self.slot_frame(m, slot);
                let fraction = (point.x - frame.x0) / frame.width();
                Some(drop_for_fraction(
                    IndexPath::new(section, item.min(last)),
                    fraction,
                ))
            }
        }
    }

    fn layout_attributes_for_drop_marker(&self, target: DropIndexPath) -> Option<LayoutAttributes> {
        let index_path = target.index_path();
        if !self.is_item(index_path) {
            let m = self.sections.get(index_path.section)?;
            if m.item_count > 0 || target != drop_into_empty(index_path.section) {
                return None;
            }
            // Along the top of the first cell the section would hold.
            let cell = self.slot_frame(m, 0);
            let y = cell.y0 - DROP_MARKER_HEIGHT / 2.0;
            return Some(
                LayoutAttributes::new(Rect::new(cell.x0, y, cell.x1, y + DROP_MARKER_HEIGHT))
                    .with_z_index(DROP_MARKER_Z_INDEX),
            );
        }
        let cell = self.layout_attributes_for_item(index_path).frame;
        let half_width = cell.width() / 2.0;
        let (x0, x1) = match target.relation() {
            DropRelation::Before => (cell.x0, cell.x0 + half_width),
            DropRelation::After => (cell.x1 - half_width, cell.x1),
            DropRelation::On => (cell.x0, cell.x1),
        };
        // Centred in the gutter below the cell.
        let y = cell.y1 + self.config.spacing / 2.0 - DROP_MARKER_HEIGHT / 2.0;
        Some(
            LayoutAttributes::new(Rect::new(x0, y, x1, y + DROP_MARKER_HEIGHT))
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
        self.sections.is_empty()
            || self.config.columns_for_width(new_bounds.width()) != self.columns
    }
}
