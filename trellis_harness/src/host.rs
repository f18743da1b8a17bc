// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory hosting view.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Rect;
use trellis_core::host::{HostSelection, HostView};
use trellis_core::index::IndexPath;

/// A hosting view backed by plain values.
///
/// Created behind an [`Rc`] so layouts can hold it weakly. All setters take
/// `&self`; after changing counts, invalidate the layout with
/// [`invalidate_data`](trellis_core::layout::LayoutLifecycle::invalidate_data)
/// as a real host would.
#[derive(Debug)]
pub struct StaticHost {
    bounds: Cell<Rect>,
    counts: RefCell<Vec<u32>>,
    unselectable: RefCell<Vec<IndexPath>>,
}

impl StaticHost {
    /// Creates a host with the given bounds and per-section item counts.
    #[must_use]
    pub fn new(bounds: Rect, counts: &[u32]) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(bounds),
            counts: RefCell::new(counts.to_vec()),
            unselectable: RefCell::new(Vec::new()),
        })
    }

    /// Creates a host whose bounds start at the origin.
    #[must_use]
    pub fn with_size(width: f64, height: f64, counts: &[u32]) -> Rc<Self> {
        Self::new(Rect::new(0.0, 0.0, width, height), counts)
    }

    /// Sets the bounds.
    pub fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
    }

    /// Replaces the per-section item counts.
    pub fn set_counts(&self, counts: &[u32]) {
        *self.counts.borrow_mut() = counts.to_vec();
    }

    /// The per-section item counts.
    #[must_use]
    pub fn counts(&self) -> Vec<u32> {
        self.counts.borrow().clone()
    }

    /// Marks `index_path` as selectable or not. Everything starts selectable.
    pub fn set_selectable(&self, index_path: IndexPath, selectable: bool) {
        let mut unselectable = self.unselectable.borrow_mut();
        unselectable.retain(|ip| *ip != index_path);
        if !selectable {
            unselectable.push(index_path);
        }
    }

    /// Every item in data order.
    #[must_use]
    pub fn index_paths(&self) -> Vec<IndexPath> {
        let counts = self.counts.borrow();
        (0_u32..)
            .zip(counts.iter())
            .flat_map(|(section, &count)| (0..count).map(move |item| IndexPath::new(section, item)))
            .collect()
    }
}

impl HostView for StaticHost {
    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn number_of_sections(&self) -> u32 {
        u32::try_from(self.counts.borrow().len()).unwrap_or(u32::MAX)
    }

    fn number_of_items_in_section(&self, section: u32) -> u32 {
        self.counts
            .borrow()
            .get(section as usize)
            .copied()
            .unwrap_or(0)
    }
}

impl HostSelection for StaticHost {
    fn is_selectable(&self, index_path: IndexPath) -> bool {
        !self.unselectable.borrow().contains(&index_path)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn counts_and_paths() {
        let host = StaticHost::with_size(10.0, 10.0, &[2, 0, 1]);
        assert_eq!(host.number_of_sections(), 3);
        assert_eq!(host.number_of_items_in_section(1), 0);
        assert_eq!(host.number_of_items_in_section(9), 0);
        assert_eq!(
            host.index_paths(),
            vec![
                IndexPath::new(0, 0),
                IndexPath::new(0, 1),
                IndexPath::new(2, 0)
            ]
        );
        host.set_counts(&[1]);
        assert_eq!(host.index_paths(), vec![IndexPath::new(0, 0)]);
    }

    #[test]
    fn selectability_drives_walks() {
        let host = StaticHost::with_size(10.0, 10.0, &[3]);
        host.set_selectable(IndexPath::new(0, 1), false);
        assert_eq!(
            host.index_path_for_next_selectable_item_after(IndexPath::new(0, 0)),
            Some(IndexPath::new(0, 2))
        );
        host.set_selectable(IndexPath::new(0, 1), true);
        assert_eq!(
            host.index_path_for_next_selectable_item_after(IndexPath::new(0, 0)),
            Some(IndexPath::new(0, 1))
        );
    }

    #[test]
    fn bounds_are_mutable() {
        let host = StaticHost::with_size(10.0, 20.0, &[]);
        assert_eq!(host.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
        host.set_bounds(Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(host.bounds().width(), 5.0);
    }
}
