// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by this crate's unit tests.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Point, Rect};

use crate::attributes::LayoutAttributes;
use crate::drop::DropIndexPath;
use crate::host::{HostSelection, HostView};
use crate::index::IndexPath;
use crate::layout::{
    Direction, Invalidation, InvalidationReason, LayoutCore, LayoutEngine, PrepareContext,
};

/// A host with mutable bounds and counts.
pub(crate) struct TestHost {
    bounds: Cell<Rect>,
    sections: RefCell<Vec<u32>>,
}

impl TestHost {
    pub(crate) fn new(width: f64, height: f64, sections: &[u32]) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(Rect::new(0.0, 0.0, width, height)),
            sections: RefCell::new(sections.to_vec()),
        })
    }

    pub(crate) fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
    }

    pub(crate) fn set_sections(&self, sections: &[u32]) {
        *self.sections.borrow_mut() = sections.to_vec();
    }
}

impl HostView for TestHost {
    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn number_of_sections(&self) -> u32 {
        u32::try_from(self.sections.borrow().len()).unwrap()
    }

    fn number_of_items_in_section(&self, section: u32) -> u32 {
        self.sections.borrow()[section as usize]
    }
}

impl HostSelection for TestHost {}

/// Single-column rows of fixed height, sections stacked with no gaps.
///
/// Answers spatial queries only when `spatial` is set, so tests can exercise
/// both the layout's answers and the host-side fallbacks. Drops resolve to
/// `Before` in the top half of a row and `After` in the bottom half.
pub(crate) struct FixedRows {
    core: LayoutCore,
    row_height: f64,
    width: f64,
    counts: Vec<u32>,
    offsets: Vec<f64>,
    displaced: Option<(u32, u32)>,
    pub(crate) spatial: bool,
    pub(crate) ignore_height_changes: bool,
    pub(crate) prepare_calls: u32,
    pub(crate) invalidate_hook_calls: u32,
    pub(crate) last_invalidation: Option<Invalidation>,
}

impl FixedRows {
    pub(crate) fn new(row_height: f64) -> Self {
        Self::with_core(LayoutCore::new(), row_height)
    }

    pub(crate) fn with_core(core: LayoutCore, row_height: f64) -> Self {
        Self {
            core,
            row_height,
            width: 0.0,
            counts: Vec::new(),
            offsets: Vec::new(),
            displaced: None,
            spatial: false,
            ignore_height_changes: false,
            prepare_calls: 0,
            invalidate_hook_calls: 0,
            last_invalidation: None,
        }
    }

    fn row_top(&self, index_path: IndexPath) -> f64 {
        let mut row = f64::from(index_path.item);
        if let Some((section, from)) = self.displaced
            && section == index_path.section
            && index_path.item >= from
        {
            row += 1.0;
        }
        self.offsets[index_path.section as usize] + row * self.row_height
    }

    fn section_height(&self, section: u32) -> f64 {
        let mut rows = f64::from(self.counts[section as usize]);
        if self.displaced.is_some_and(|(s, _)| s == section) {
            rows += 1.0;
        }
        rows * self.row_height
    }

    fn row_at(&self, y: f64) -> Option<IndexPath> {
        for (section, &top) in self.offsets.iter().enumerate() {
            let section = u32::try_from(section).unwrap();
            let count = self.counts[section as usize];
            if y >= top && y < top + f64::from(count) * self.row_height {
                #[expect(clippy::cast_possible_truncation, reason = "row within u32 count")]
                let item = ((y - top) / self.row_height) as u32;
                return Some(IndexPath::new(section, item));
            }
        }
        None
    }
}

impl LayoutEngine for FixedRows {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn did_invalidate_layout(&mut self, reason: InvalidationReason) {
        self.invalidate_hook_calls += 1;
        if reason != InvalidationReason::Drag {
            self.offsets.clear();
        }
    }

    fn prepare_layout(&mut self, cx: &PrepareContext<'_>) {
        self.prepare_calls += 1;
        self.last_invalidation = Some(cx.invalidation.clone());
        self.width = cx.host.bounds().width();
        self.counts = (0..cx.host.number_of_sections())
            .map(|s| cx.host.number_of_items_in_section(s))
            .collect();
        self.displaced = self.core.displacement_target().and_then(|target| {
            target
                .insertion_item()
                .map(|item| (target.index_path().section, item))
        });
        self.offsets.clear();
        let mut y = 0.0;
        for section in 0..cx.host.number_of_sections() {
            self.offsets.push(y);
            y += self.section_height(section);
        }
    }

    fn layout_attributes_for_item(&self, index_path: IndexPath) -> LayoutAttributes {
        if index_path.section as usize >= self.offsets.len() {
            return LayoutAttributes::default();
        }
        let top = self.row_top(index_path);
        LayoutAttributes::new(Rect::new(0.0, top, self.width, top + self.row_height))
    }

    fn index_paths_for_items_in_rect(&self, rect: Rect) -> Option<Vec<IndexPath>> {
        if !self.spatial {
            return None;
        }
        let mut out = Vec::new();
        for (section, &count) in self.counts.iter().enumerate() {
            let section = u32::try_from(section).unwrap();
            for item in 0..count {
                let ip = IndexPath::new(section, item);
                if self.layout_attributes_for_item(ip).intersects(rect) {
                    out.push(ip);
                }
            }
        }
        Some(out)
    }

    fn rect_for_section(&self, section: u32) -> Option<Rect> {
        if !self.spatial || section as usize >= self.offsets.len() {
            return None;
        }
        let top = self.offsets[section as usize];
        Some(Rect::new(
            0.0,
            top,
            self.width,
            top + self.section_height(section),
        ))
    }

    fn index_path_for_next_item(
        &self,
        direction: Direction,
        current: Option<IndexPath>,
    ) -> Option<IndexPath> {
        let current = current?;
        match direction {
            Direction::Down => Some(current.next_item()),
            Direction::Up => current.item.checked_sub(1).map(|item| IndexPath {
                item,
                ..current
            }),
            Direction::Left | Direction::Right => None,
        }
    }

    fn drop_index_path_at_point(&self, point: Point) -> Option<DropIndexPath> {
        let ip = self.row_at(point.y)?;
        let top = self.offsets[ip.section as usize] + f64::from(ip.item) * self.row_height;
        if point.y - top < self.row_height / 2.0 {
            Some(DropIndexPath::before(ip))
        } else {
            Some(DropIndexPath::after(ip))
        }
    }

    fn layout_attributes_for_drop_marker(&self, target: DropIndexPath) -> Option<LayoutAttributes> {
        let ip = target.index_path();
        let top = self.offsets.get(ip.section as usize)? + f64::from(ip.item) * self.row_height;
        let y = match target.insertion_item() {
            Some(item) if item == ip.item => top,
            _ => top + self.row_height,
        };
        // Deliberately taller than a marker; the lifecycle normalizes it.
        Some(LayoutAttributes::new(Rect::new(0.0, y, self.width, y + 4.0)))
    }

    fn layout_attributes_for_drop_placeholder(
        &self,
        target: DropIndexPath,
    ) -> Option<LayoutAttributes> {
        let (section, gap) = self.displaced?;
        if target.index_path().section != section || target.insertion_item() != Some(gap) {
            return None;
        }
        let top = self.offsets.get(section as usize)? + f64::from(gap) * self.row_height;
        Some(LayoutAttributes::new(Rect::new(
            0.0,
            top,
            self.width,
            top + self.row_height,
        )))
    }

    fn should_invalidate_layout_for_bounds_change(&self, new_bounds: Rect) -> bool {
        !self.ignore_height_changes || new_bounds.width() != self.width
    }
}
