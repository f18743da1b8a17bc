// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hosting-view surface visible to layouts.
//!
//! A layout may read three things from its hosting view: the current bounds
//! and the data source's section and item counts ([`HostView`]). Everything
//! else about the hosting view (rendering, recycling, event routing) is
//! invisible to the layout.
//!
//! The layout holds its host through a [`HostHandle`], a weak reference that
//! never keeps the host alive. The host owns the layout, so a strong
//! back-reference would form a cycle.
//!
//! [`HostSelection`] holds host-owned selection helpers. They reason about
//! *selectability* in data order and are distinct from the layout's
//! geometric [`index_path_for_next_item`](crate::layout::LayoutEngine::index_path_for_next_item).

use alloc::rc::{Rc, Weak};

use kurbo::Rect;

use crate::index::IndexPath;

/// Read-only queries a layout may issue against its hosting view.
pub trait HostView {
    /// Current bounds of the hosting view, in view-local coordinates.
    fn bounds(&self) -> Rect;

    /// Number of sections in the data source.
    fn number_of_sections(&self) -> u32;

    /// Number of items in `section`.
    ///
    /// `section` must be less than [`number_of_sections`](Self::number_of_sections).
    fn number_of_items_in_section(&self, section: u32) -> u32;
}

/// Host-owned item validation and data-order selection walks.
///
/// All methods have default implementations driven by the [`HostView`]
/// counts; hosts override [`is_selectable`](Self::is_selectable) to skip
/// items that cannot be selected.
pub trait HostSelection: HostView {
    /// Whether `index_path` addresses an existing item.
    fn validate_index_path(&self, index_path: IndexPath) -> bool {
        index_path.section < self.number_of_sections()
            && index_path.item < self.number_of_items_in_section(index_path.section)
    }

    /// Whether the item at `index_path` may be selected.
    fn is_selectable(&self, index_path: IndexPath) -> bool {
        _ = index_path;
        true
    }

    /// The next selectable item after `index_path` in data order, or `None`
    /// past the last item.
    fn index_path_for_next_selectable_item_after(
        &self,
        index_path: IndexPath,
    ) -> Option<IndexPath> {
        let sections = self.number_of_sections();
        let mut section = index_path.section;
        let mut item = index_path.item.checked_add(1)?;
        while section < sections {
            let count = self.number_of_items_in_section(section);
            while item < count {
                let candidate = IndexPath::new(section, item);
                if self.is_selectable(candidate) {
                    return Some(candidate);
                }
                item += 1;
            }
            section += 1;
            item = 0;
        }
        None
    }

    /// The previous selectable item before `index_path` in data order, or
    /// `None` before the first item.
    fn index_path_for_next_selectable_item_before(
        &self,
        index_path: IndexPath,
    ) -> Option<IndexPath> {
        let sections = self.number_of_sections();
        let (mut section, mut end) = if index_path.section < sections {
            let count = self.number_of_items_in_section(index_path.section);
            (index_path.section, index_path.item.min(count))
        } else {
            // Past the end: the walk starts from the very last item.
            (sections, 0)
        };
        loop {
            while end > 0 {
                end -= 1;
                let candidate = IndexPath::new(section, end);
                if self.is_selectable(candidate) {
                    return Some(candidate);
                }
            }
            if section == 0 {
                return None;
            }
            section -= 1;
            end = self.number_of_items_in_section(section);
        }
    }
}

/// A non-owning handle from a layout to its hosting view.
///
/// The handle starts unbound. Hosts bind themselves when they adopt a layout;
/// once the host is dropped [`get`](Self::get) returns `None`.
#[derive(Clone, Debug, Default)]
pub struct HostHandle {
    host: Option<Weak<dyn HostView>>,
}

impl HostHandle {
    /// Creates an unbound handle.
    #[must_use]
    pub const fn new() -> Self {
        Self { host: None }
    }

    /// Binds the handle to `host` without taking ownership.
    pub fn bind<H: HostView + 'static>(&mut self, host: &Rc<H>) {
        let weak = Rc::downgrade(host);
        self.host = Some(weak);
    }

    /// Clears the binding.
    pub fn unbind(&mut self) {
        self.host = None;
    }

    /// Returns the host if it is bound and still alive.
    #[must_use]
    pub fn get(&self) -> Option<Rc<dyn HostView>> {
        self.host.as_ref().and_then(Weak::upgrade)
    }

    /// Whether the handle is bound to a host that is still alive.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.host.as_ref().is_some_and(|h| h.strong_count() > 0)
    }
}
