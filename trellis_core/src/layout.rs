// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout contract.
//!
//! A layout is split into two traits:
//!
//! - [`LayoutEngine`]: the overridable surface. Concrete layouts implement
//!   it: one required query ([`layout_attributes_for_item`]), a preparation
//!   hook, an invalidation extension point, and a set of optional queries
//!   whose defaults mean "unknown" rather than "empty".
//! - [`LayoutLifecycle`]: the non-overridable lifecycle, blanket-implemented
//!   for every [`LayoutEngine`]. It runs the base invalidation step before
//!   the extension point, so a layout cannot forget it, and it is the only
//!   way to reach [`prepare_layout`].
//!
//! Every layout embeds a [`LayoutCore`] that carries the host binding, the
//! invalidation state machine, and the drag-and-drop session.
//!
//! # Invalidation state machine
//!
//! ```text
//!             invalidate_*()               invalidate_*()
//!           ┌────────────────┐           ┌──────────────┐
//!           ▼                │           ▼              │
//!   ──► Invalidated ─── prepare_if_needed() ───► Clean ─┘
//! ```
//!
//! A layout starts [`Invalidated`](LayoutState::Invalidated). Invalidating
//! is idempotent. [`prepare_if_needed`](LayoutLifecycle::prepare_if_needed)
//! is a no-op while [`Clean`](LayoutState::Clean) and requires a bound host.
//!
//! Queries never trigger preparation. While invalidated they return the best
//! available answer, which for a layout that discarded its cache is the
//! conservative default.
//!
//! [`layout_attributes_for_item`]: LayoutEngine::layout_attributes_for_item
//! [`prepare_layout`]: LayoutEngine::prepare_layout

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::attributes::LayoutAttributes;
use crate::dirty;
use crate::drop::{DragSession, DropIndexPath, DropType};
use crate::host::{HostHandle, HostView};
use crate::index::IndexPath;

/// Which way the hosting view shows scroll indicators.
///
/// Advisory only: content larger than the viewport scrolls on any axis. A
/// layout that wants single-axis scrolling keeps its content size on the
/// other axis at or below the viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Vertical indicators.
    #[default]
    Vertical,
    /// Horizontal indicators.
    Horizontal,
    /// Both indicators.
    Both,
}

/// A direction for keyboard navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller x.
    Left,
    /// Towards larger x.
    Right,
    /// Towards smaller y.
    Up,
    /// Towards larger y.
    Down,
}

/// The two states of a layout's cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutState {
    /// Cached geometry matches the most recent invalidation.
    Clean,
    /// Cached geometry is stale or absent.
    Invalidated,
}

/// Why a layout was invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationReason {
    /// An explicit [`invalidate_layout`](LayoutLifecycle::invalidate_layout).
    Explicit,
    /// An accepted bounds change.
    Bounds,
    /// A data-source reload.
    Data,
    /// Targeted section invalidation.
    Sections,
    /// The displacement drop target changed.
    Drag,
}

/// Summary of everything that invalidated a layout since it was last
/// prepared, handed to [`LayoutEngine::prepare_layout`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Generation the layout is being prepared for.
    pub generation: u64,
    /// An explicit invalidation (or first preparation) is pending.
    pub explicit: bool,
    /// The hosting view's bounds changed.
    pub bounds: bool,
    /// The data source was reloaded.
    pub data: bool,
    /// The displacement drop target changed.
    pub drag: bool,
    /// Individually invalidated sections, sorted and deduplicated.
    pub sections: Vec<u32>,
}

impl Invalidation {
    /// Whether everything must be recomputed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.explicit || self.bounds || self.data
    }

    /// Whether geometry in `section` must be recomputed.
    ///
    /// Drag changes move items within a section, so a layout that cannot tell
    /// which sections a drag touched should treat them as affecting all.
    #[must_use]
    pub fn affects_section(&self, section: u32) -> bool {
        self.is_full() || self.drag || self.sections.binary_search(&section).is_ok()
    }
}

/// Inputs to [`LayoutEngine::prepare_layout`].
#[derive(Clone, Copy)]
pub struct PrepareContext<'a> {
    /// The hosting view, for bounds and data counts.
    pub host: &'a dyn HostView,
    /// Why the layout is being prepared.
    pub invalidation: &'a Invalidation,
}

impl core::fmt::Debug for PrepareContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrepareContext")
            .field("invalidation", self.invalidation)
            .finish_non_exhaustive()
    }
}

/// Base state embedded in every layout.
///
/// Owned and mutated by the layout itself; the hosting view only reaches it
/// through [`LayoutLifecycle`].
#[derive(Debug)]
pub struct LayoutCore {
    host: HostHandle,
    state: LayoutState,
    generation: u64,
    prepared_generation: Option<u64>,
    dirty: DirtyTracker<u32>,
    drop_type: DropType,
    drag: Option<DragSession>,
}

impl Default for LayoutCore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCore {
    /// Creates an unbound core in the [`Invalidated`](LayoutState::Invalidated)
    /// state.
    ///
    /// The hosting view binds itself later, through
    /// [`LayoutLifecycle::attach_host`].
    #[must_use]
    pub fn new() -> Self {
        let mut dirty = DirtyTracker::with_cycle_handling(CycleHandling::Error);
        dirty.mark(dirty::LAYOUT_KEY, dirty::EXPLICIT);
        Self {
            host: HostHandle::new(),
            state: LayoutState::Invalidated,
            generation: 0,
            prepared_generation: None,
            dirty,
            drop_type: DropType::None,
            drag: None,
        }
    }

    /// Creates a core already bound to `host`.
    #[deprecated(note = "use `LayoutCore::new` and let the host bind itself with `attach_host`")]
    #[must_use]
    pub fn with_host<H: HostView + 'static>(host: &Rc<H>) -> Self {
        let mut core = Self::new();
        core.bind_host(host);
        core
    }

    /// Binds `host` without taking ownership.
    ///
    /// Does not invalidate; hosts adopting a layout that may already be
    /// prepared use [`LayoutLifecycle::attach_host`].
    pub fn bind_host<H: HostView + 'static>(&mut self, host: &Rc<H>) {
        self.host.bind(host);
    }

    /// Clears the host binding.
    pub fn unbind_host(&mut self) {
        self.host.unbind();
    }

    /// Returns the bound host, if it is still alive.
    #[must_use]
    pub fn host(&self) -> Option<Rc<dyn HostView>> {
        self.host.get()
    }

    /// Returns the host handle.
    #[must_use]
    pub fn host_handle(&self) -> &HostHandle {
        &self.host
    }

    /// Returns the cache state.
    #[must_use]
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Whether the cache is valid.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.state == LayoutState::Clean
    }

    /// Invalidation generation. Bumped on every transition from
    /// [`Clean`](LayoutState::Clean) to [`Invalidated`](LayoutState::Invalidated).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the most recent completed preparation.
    #[must_use]
    pub fn prepared_generation(&self) -> Option<u64> {
        self.prepared_generation
    }

    /// The drop presentation mode imposed by the hosting view.
    #[must_use]
    pub fn drop_type(&self) -> DropType {
        self.drop_type
    }

    /// The active drag session, if any.
    #[must_use]
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// The target layouts should displace items around.
    ///
    /// `Some` only in [`DropType::Displacement`] mode during a session with a
    /// resolved target.
    #[must_use]
    pub fn displacement_target(&self) -> Option<DropIndexPath> {
        if self.drop_type != DropType::Displacement {
            return None;
        }
        self.drag.and_then(|session| session.target)
    }

    // -- Internal state machine --

    fn invalidate(&mut self, reason: InvalidationReason) {
        let channel = match reason {
            InvalidationReason::Explicit => dirty::EXPLICIT,
            InvalidationReason::Bounds => dirty::BOUNDS,
            InvalidationReason::Data => dirty::DATA,
            InvalidationReason::Sections => dirty::SECTIONS,
            InvalidationReason::Drag => dirty::DRAG,
        };
        debug_assert!(
            channel != dirty::SECTIONS,
            "section invalidation goes through invalidate_section"
        );
        self.dirty.mark(dirty::LAYOUT_KEY, channel);
        self.transition_to_invalidated();
    }

    fn invalidate_section(&mut self, section: u32) {
        self.dirty.mark(section, dirty::SECTIONS);
        self.transition_to_invalidated();
    }

    fn transition_to_invalidated(&mut self) {
        if self.state == LayoutState::Clean {
            self.generation += 1;
            self.state = LayoutState::Invalidated;
        }
    }

    fn drain_flag(&mut self, channel: understory_dirty::Channel) -> bool {
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .count()
            > 0
    }

    fn take_invalidation(&mut self) -> Invalidation {
        let explicit = self.drain_flag(dirty::EXPLICIT);
        let bounds = self.drain_flag(dirty::BOUNDS);
        let data = self.drain_flag(dirty::DATA);
        let drag = self.drain_flag(dirty::DRAG);
        let mut sections: Vec<u32> = self
            .dirty
            .drain(dirty::SECTIONS)
            .affected()
            .deterministic()
            .run()
            .collect();
        sections.sort_unstable();
        sections.dedup();
        Invalidation {
            generation: self.generation,
            explicit,
            bounds,
            data,
            drag,
            sections,
        }
    }

    fn mark_clean(&mut self, generation: u64) {
        self.prepared_generation = Some(generation);
        self.state = LayoutState::Clean;
    }
}

/// The overridable layout contract.
///
/// Implementors embed a [`LayoutCore`] and expose it through
/// [`core`](Self::core) / [`core_mut`](Self::core_mut). Every optional query
/// has an explicit default. `None` means "this layout does not know" and
/// makes the hosting view fall back to slower inference; it never means
/// "empty".
///
/// Hosts drive invalidation and preparation through [`LayoutLifecycle`],
/// never by calling [`prepare_layout`](Self::prepare_layout) directly.
pub trait LayoutEngine {
    /// The embedded base state.
    fn core(&self) -> &LayoutCore;

    /// The embedded base state, mutably.
    fn core_mut(&mut self) -> &mut LayoutCore;

    /// Extension point run after the base invalidation step.
    ///
    /// Discard cached geometry here. Must be idempotent: it runs on every
    /// invalidation, including repeated ones.
    fn did_invalidate_layout(&mut self, reason: InvalidationReason) {
        _ = reason;
    }

    /// Computes and caches geometry.
    ///
    /// Called only while invalidated, and only through
    /// [`LayoutLifecycle::prepare_if_needed`]. Must run to completion and
    /// leave the cache fully valid. Layouts expecting very large item counts
    /// should keep this O(sections) and compute per-item frames on query.
    fn prepare_layout(&mut self, cx: &PrepareContext<'_>) {
        _ = cx;
    }

    /// Attributes for exactly one item.
    ///
    /// `index_path` is within the data source's current counts; anything
    /// else is a caller bug with unspecified results.
    fn layout_attributes_for_item(&self, index_path: IndexPath) -> LayoutAttributes;

    /// Attributes for the supplementary view of `kind` in `section`, or
    /// `None` if the layout does not provide that kind there.
    fn layout_attributes_for_supplementary_item(
        &self,
        section: u32,
        kind: &str,
    ) -> Option<LayoutAttributes> {
        _ = (section, kind);
        None
    }

    /// Items whose frames intersect `rect`.
    ///
    /// The default `None` makes the hosting view scan every item. `Some` of
    /// an empty vector means "known: nothing here".
    fn index_paths_for_items_in_rect(&self, rect: Rect) -> Option<Vec<IndexPath>> {
        _ = rect;
        None
    }

    /// Bounding rectangle of `section`, including its supplementary views.
    ///
    /// Over-approximate if uncertain; a rectangle that is too small causes
    /// clipping. The default `None` makes the hosting view derive it.
    fn rect_for_section(&self, section: u32) -> Option<Rect> {
        _ = section;
        None
    }

    /// Size of all content. The default `None` makes the hosting view infer
    /// it from section rectangles and its own bounds.
    fn content_size(&self) -> Option<Size> {
        None
    }

    /// Scroll indicator presentation.
    fn scroll_direction(&self) -> ScrollDirection {
        ScrollDirection::Vertical
    }

    /// The item next to `current` in `direction`, or `None` at the edge of
    /// content. `current` is `None` when nothing is selected.
    ///
    /// The default disables arrow-key selection movement.
    fn index_path_for_next_item(
        &self,
        direction: Direction,
        current: Option<IndexPath>,
    ) -> Option<IndexPath> {
        _ = (direction, current);
        None
    }

    /// Drop target under `point`, or `None` outside droppable regions.
    ///
    /// Must be deterministic for unchanged geometry.
    fn drop_index_path_at_point(&self, point: Point) -> Option<DropIndexPath> {
        _ = point;
        None
    }

    /// Attributes for the marker drawn at `target` in
    /// [`DropType::Marker`] mode.
    ///
    /// Hosts read this through [`LayoutLifecycle::drop_marker_attributes`],
    /// which normalizes the height to exactly one unit.
    fn layout_attributes_for_drop_marker(&self, target: DropIndexPath) -> Option<LayoutAttributes> {
        _ = target;
        None
    }

    /// Attributes for the placeholder filling the gap opened for `target` in
    /// [`DropType::Displacement`] mode.
    ///
    /// Only insertion targets open a gap, so `target` is never an `On` drop.
    /// Hosts read this through
    /// [`LayoutLifecycle::drop_placeholder_attributes`].
    fn layout_attributes_for_drop_placeholder(
        &self,
        target: DropIndexPath,
    ) -> Option<LayoutAttributes> {
        _ = target;
        None
    }

    /// Whether a change to `new_bounds` invalidates this layout.
    fn should_invalidate_layout_for_bounds_change(&self, new_bounds: Rect) -> bool {
        _ = new_bounds;
        true
    }

    /// Whether the hosting view must re-apply attributes to visible items on
    /// every layout pass.
    fn should_apply_existing_layout_attributes_on_layout(&self) -> bool {
        false
    }
}

/// The non-overridable layout lifecycle.
///
/// Blanket-implemented for every [`LayoutEngine`], so the base steps always
/// run: invalidation updates [`LayoutCore`] before calling
/// [`LayoutEngine::did_invalidate_layout`], and preparation only happens when
/// the core says it is needed.
pub trait LayoutLifecycle: LayoutEngine {
    /// Binds the layout to `host` (without owning it) and invalidates.
    fn attach_host<H: HostView + 'static>(&mut self, host: &Rc<H>) {
        self.core_mut().bind_host(host);
        self.invalidate_layout();
    }

    /// Unbinds the layout from its host and invalidates.
    fn detach_host(&mut self) {
        self.core_mut().unbind_host();
        self.invalidate_layout();
    }

    /// Marks all cached geometry stale.
    fn invalidate_layout(&mut self) {
        self.core_mut().invalidate(InvalidationReason::Explicit);
        self.did_invalidate_layout(InvalidationReason::Explicit);
    }

    /// Invalidates for a resize if the layout accepts it; returns whether it
    /// did.
    fn invalidate_for_bounds_change(&mut self, new_bounds: Rect) -> bool {
        if !self.should_invalidate_layout_for_bounds_change(new_bounds) {
            return false;
        }
        self.core_mut().invalidate(InvalidationReason::Bounds);
        self.did_invalidate_layout(InvalidationReason::Bounds);
        true
    }

    /// Invalidates after a data-source reload.
    fn invalidate_data(&mut self) {
        self.core_mut().invalidate(InvalidationReason::Data);
        self.did_invalidate_layout(InvalidationReason::Data);
    }

    /// Invalidates specific sections.
    fn invalidate_sections(&mut self, sections: impl IntoIterator<Item = u32>) {
        let mut any = false;
        for section in sections {
            self.core_mut().invalidate_section(section);
            any = true;
        }
        if any {
            self.did_invalidate_layout(InvalidationReason::Sections);
        }
    }

    /// Prepares the layout if it is invalidated and a host is bound.
    ///
    /// Returns the consumed [`Invalidation`] when preparation ran.
    fn prepare_if_needed(&mut self) -> Option<Invalidation> {
        if self.core().is_clean() {
            return None;
        }
        let host = self.core().host()?;
        let invalidation = self.core_mut().take_invalidation();
        self.prepare_layout(&PrepareContext {
            host: &*host,
            invalidation: &invalidation,
        });
        self.core_mut().mark_clean(invalidation.generation);
        Some(invalidation)
    }

    /// Sets the drop presentation mode, ending any drag session in progress.
    fn set_drop_type(&mut self, drop_type: DropType) {
        if self.core().drop_type == drop_type {
            return;
        }
        self.end_drag();
        self.core_mut().drop_type = drop_type;
    }

    /// Starts a drag session. A session already in progress is kept.
    fn begin_drag(&mut self) {
        let core = self.core_mut();
        if core.drag.is_none() {
            core.drag = Some(DragSession::default());
        }
    }

    /// Resolves the drop target at `point` and records it in the session,
    /// starting one if needed.
    ///
    /// In [`DropType::Displacement`] mode a change of target invalidates the
    /// layout so displaced geometry is recomputed.
    fn drag_moved(&mut self, point: Point) -> Option<DropIndexPath> {
        let target = self.drop_target_at(point);
        let core = self.core_mut();
        let session = core.drag.get_or_insert_with(DragSession::default);
        let changed = session.target != target;
        session.location = Some(point);
        session.target = target;
        if changed && core.drop_type == DropType::Displacement {
            core.invalidate(InvalidationReason::Drag);
            self.did_invalidate_layout(InvalidationReason::Drag);
        }
        target
    }

    /// Ends the drag session and returns its final target.
    fn end_drag(&mut self) -> Option<DropIndexPath> {
        let core = self.core_mut();
        let session = core.drag.take()?;
        if session.target.is_some() && core.drop_type == DropType::Displacement {
            core.invalidate(InvalidationReason::Drag);
            self.did_invalidate_layout(InvalidationReason::Drag);
        }
        session.target
    }

    /// The drop target under `point`, or `None` when drops are disabled.
    fn drop_target_at(&self, point: Point) -> Option<DropIndexPath> {
        if self.core().drop_type == DropType::None {
            return None;
        }
        self.drop_index_path_at_point(point)
    }

    /// Marker attributes for the current drop location.
    ///
    /// `Some` only in [`DropType::Marker`] mode during a drag session with a
    /// resolved target; the frame is exactly one unit tall.
    fn drop_marker_attributes(&self) -> Option<LayoutAttributes> {
        let core = self.core();
        if core.drop_type != DropType::Marker {
            return None;
        }
        let target = core.drag.as_ref()?.target?;
        self.layout_attributes_for_drop_marker(target)
            .map(LayoutAttributes::as_drop_marker)
    }

    /// Placeholder attributes for the current drop location.
    ///
    /// `Some` only in [`DropType::Displacement`] mode during a drag session
    /// whose target inserts an item, and only once the layout has been
    /// prepared with the gap open.
    fn drop_placeholder_attributes(&self) -> Option<LayoutAttributes> {
        let core = self.core();
        let target = core.displacement_target()?;
        target.insertion_item()?;
        if !core.is_clean() {
            return None;
        }
        self.layout_attributes_for_drop_placeholder(target)
    }
}

impl<L: LayoutEngine + ?Sized> LayoutLifecycle for L {}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::attributes::DROP_MARKER_HEIGHT;
    use crate::testing::{FixedRows, TestHost};

    fn prepared(sections: &[u32]) -> (Rc<TestHost>, FixedRows) {
        let host = TestHost::new(100.0, 50.0, sections);
        let mut layout = FixedRows::new(20.0);
        layout.attach_host(&host);
        assert!(layout.prepare_if_needed().is_some());
        // Attaching ran the extension point once; count from here.
        layout.invalidate_hook_calls = 0;
        (host, layout)
    }

    #[test]
    fn attach_runs_extension_point() {
        let host = TestHost::new(100.0, 50.0, &[1]);
        let mut layout = FixedRows::new(20.0);
        layout.attach_host(&host);
        assert_eq!(layout.invalidate_hook_calls, 1);
        layout.detach_host();
        assert_eq!(layout.invalidate_hook_calls, 2);
    }

    #[test]
    fn starts_invalidated() {
        let layout = FixedRows::new(20.0);
        assert_eq!(layout.core().state(), LayoutState::Invalidated);
        assert_eq!(layout.core().prepared_generation(), None);
    }

    #[test]
    fn prepare_without_host_stays_invalidated() {
        let mut layout = FixedRows::new(20.0);
        assert!(layout.prepare_if_needed().is_none());
        assert_eq!(layout.core().state(), LayoutState::Invalidated);
        assert_eq!(layout.prepare_calls, 0);
    }

    #[test]
    fn first_prepare_is_full() {
        let (_host, layout) = prepared(&[3]);
        assert!(layout.core().is_clean());
        let inv = layout.last_invalidation.clone().unwrap();
        assert!(inv.is_full());
        assert!(inv.explicit);
    }

    #[test]
    fn prepare_when_clean_is_noop() {
        let (_host, mut layout) = prepared(&[3]);
        assert!(layout.prepare_if_needed().is_none());
        assert_eq!(layout.prepare_calls, 1);
    }

    #[test]
    fn invalidate_is_idempotent() {
        let (_host, mut layout) = prepared(&[3]);
        layout.invalidate_layout();
        let gen_once = layout.core().generation();
        layout.invalidate_layout();
        assert_eq!(layout.core().generation(), gen_once);
        assert_eq!(layout.core().state(), LayoutState::Invalidated);

        let inv = layout.prepare_if_needed().unwrap();
        assert!(inv.explicit);
        assert_eq!(inv.generation, gen_once);
        assert_eq!(layout.prepare_calls, 2);
    }

    #[test]
    fn invalidation_always_reaches_extension_point() {
        let (_host, mut layout) = prepared(&[3]);
        layout.invalidate_layout();
        layout.invalidate_layout();
        assert_eq!(layout.invalidate_hook_calls, 2);
        // The extension point discarded the cache; queries fall back to
        // defaults rather than stale geometry.
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 1)),
            LayoutAttributes::default()
        );
    }

    #[test]
    fn queries_after_prepare_reflect_latest_data() {
        let (host, mut layout) = prepared(&[3]);
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 2)).frame,
            Rect::new(0.0, 40.0, 100.0, 60.0)
        );
        host.set_bounds(Rect::new(0.0, 0.0, 60.0, 50.0));
        assert!(layout.invalidate_for_bounds_change(host.bounds()));
        let inv = layout.prepare_if_needed().unwrap();
        assert!(inv.bounds);
        assert!(!inv.explicit);
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 2)).frame,
            Rect::new(0.0, 40.0, 60.0, 60.0)
        );
    }

    #[test]
    fn declined_bounds_change_keeps_cache() {
        let (host, mut layout) = prepared(&[3]);
        layout.ignore_height_changes = true;
        host.set_bounds(Rect::new(0.0, 0.0, 100.0, 500.0));
        assert!(!layout.invalidate_for_bounds_change(host.bounds()));
        assert!(layout.core().is_clean());
        assert_eq!(layout.invalidate_hook_calls, 0);
    }

    #[test]
    fn section_invalidation_is_reported() {
        let (_host, mut layout) = prepared(&[3, 3, 3]);
        layout.invalidate_sections([2, 0, 2]);
        let inv = layout.prepare_if_needed().unwrap();
        assert!(!inv.is_full());
        assert_eq!(inv.sections, vec![0, 2]);
        assert!(inv.affects_section(0));
        assert!(!inv.affects_section(1));
    }

    #[test]
    fn empty_section_invalidation_is_noop() {
        let (_host, mut layout) = prepared(&[3]);
        layout.invalidate_sections(core::iter::empty());
        assert!(layout.core().is_clean());
        assert_eq!(layout.invalidate_hook_calls, 0);
    }

    #[test]
    fn data_reload_is_reported() {
        let (host, mut layout) = prepared(&[3]);
        host.set_sections(&[1, 1]);
        layout.invalidate_data();
        let inv = layout.prepare_if_needed().unwrap();
        assert!(inv.data);
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(1, 0)).frame,
            Rect::new(0.0, 20.0, 100.0, 40.0)
        );
    }

    #[test]
    fn dropped_host_blocks_preparation() {
        let (host, mut layout) = prepared(&[3]);
        drop(host);
        layout.invalidate_layout();
        assert!(layout.prepare_if_needed().is_none());
        assert_eq!(layout.core().state(), LayoutState::Invalidated);
    }

    #[test]
    #[expect(deprecated, reason = "exercises the legacy construction path")]
    fn legacy_construction_binds_host() {
        let host = TestHost::new(100.0, 50.0, &[2]);
        let mut layout = FixedRows::with_core(LayoutCore::with_host(&host), 20.0);
        assert!(layout.core().host_handle().is_bound());
        assert!(layout.prepare_if_needed().is_some());
    }

    #[test]
    fn drops_disabled_by_default() {
        let (_host, mut layout) = prepared(&[3]);
        assert_eq!(layout.drop_target_at(Point::new(10.0, 5.0)), None);
        assert_eq!(layout.drag_moved(Point::new(10.0, 5.0)), None);
        assert_eq!(layout.drop_marker_attributes(), None);
    }

    #[test]
    fn drop_resolution_is_deterministic() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Marker);
        let p = Point::new(10.0, 25.0);
        let a = layout.drop_target_at(p);
        let b = layout.drop_target_at(p);
        assert_eq!(a, b);
        assert_eq!(a, Some(DropIndexPath::before(IndexPath::new(0, 1))));
    }

    #[test]
    fn marker_requires_session_and_target() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Marker);
        assert_eq!(layout.drop_marker_attributes(), None);

        layout.begin_drag();
        assert_eq!(layout.drop_marker_attributes(), None);

        layout.drag_moved(Point::new(10.0, 35.0));
        let marker = layout.drop_marker_attributes().unwrap();
        assert_eq!(marker.frame.height(), DROP_MARKER_HEIGHT);
        assert_eq!(marker.frame.y0, 40.0);

        assert_eq!(
            layout.end_drag(),
            Some(DropIndexPath::after(IndexPath::new(0, 1)))
        );
        assert_eq!(layout.drop_marker_attributes(), None);
    }

    #[test]
    fn marker_absent_outside_marker_mode() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Displacement);
        layout.begin_drag();
        layout.drag_moved(Point::new(10.0, 35.0));
        assert_eq!(layout.drop_marker_attributes(), None);
    }

    #[test]
    fn marker_moves_do_not_invalidate() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Marker);
        layout.drag_moved(Point::new(10.0, 5.0));
        layout.drag_moved(Point::new(10.0, 45.0));
        assert!(layout.core().is_clean());
    }

    #[test]
    fn displacement_target_change_invalidates() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Displacement);
        layout.begin_drag();

        layout.drag_moved(Point::new(10.0, 25.0));
        assert!(!layout.core().is_clean());
        let inv = layout.prepare_if_needed().unwrap();
        assert!(inv.drag);
        assert!(!inv.is_full());
        // Item 1 and later moved down one row to open a gap.
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 1)).frame.y0,
            40.0
        );

        // Same target: nothing to redo.
        layout.drag_moved(Point::new(12.0, 26.0));
        assert!(layout.core().is_clean());

        layout.end_drag();
        assert!(layout.prepare_if_needed().is_some());
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 1)).frame.y0,
            20.0
        );
    }

    #[test]
    fn placeholder_fills_displacement_gap() {
        let (_host, mut layout) = prepared(&[4]);
        layout.set_drop_type(DropType::Displacement);
        assert_eq!(layout.drop_placeholder_attributes(), None);

        assert_eq!(
            layout.drag_moved(Point::new(50.0, 22.0)),
            Some(DropIndexPath::before(IndexPath::new(0, 1)))
        );
        // Not prepared with the gap yet.
        assert_eq!(layout.drop_placeholder_attributes(), None);
        layout.prepare_if_needed();

        let placeholder = layout.drop_placeholder_attributes().unwrap();
        assert_eq!(placeholder.frame, Rect::new(0.0, 20.0, 100.0, 40.0));
        for item in 0..4 {
            let frame = layout.layout_attributes_for_item(IndexPath::new(0, item)).frame;
            assert!(!placeholder.intersects(frame), "item {item} overlaps the gap");
        }

        layout.end_drag();
        layout.prepare_if_needed();
        assert_eq!(layout.drop_placeholder_attributes(), None);
    }

    #[test]
    fn placeholder_absent_outside_displacement_mode() {
        let (_host, mut layout) = prepared(&[4]);
        layout.set_drop_type(DropType::Marker);
        layout.drag_moved(Point::new(50.0, 22.0));
        assert_eq!(layout.drop_placeholder_attributes(), None);
    }

    #[test]
    fn changing_drop_type_ends_session() {
        let (_host, mut layout) = prepared(&[3]);
        layout.set_drop_type(DropType::Marker);
        layout.drag_moved(Point::new(10.0, 5.0));
        assert!(layout.core().drag_session().is_some());
        layout.set_drop_type(DropType::None);
        assert!(layout.core().drag_session().is_none());
    }

    #[test]
    fn defaults_are_unknown() {
        struct Bare(LayoutCore);
        impl LayoutEngine for Bare {
            fn core(&self) -> &LayoutCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut LayoutCore {
                &mut self.0
            }
            fn layout_attributes_for_item(&self, _: IndexPath) -> LayoutAttributes {
                LayoutAttributes::default()
            }
        }

        let bare = Bare(LayoutCore::new());
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bare.index_paths_for_items_in_rect(r), None);
        assert_eq!(bare.rect_for_section(0), None);
        assert_eq!(bare.content_size(), None);
        assert_eq!(bare.scroll_direction(), ScrollDirection::Vertical);
        assert_eq!(bare.index_path_for_next_item(Direction::Down, None), None);
        assert_eq!(bare.layout_attributes_for_supplementary_item(0, "header"), None);
        assert!(bare.should_invalidate_layout_for_bounds_change(r));
        assert!(!bare.should_apply_existing_layout_attributes_on_layout());
    }

    #[test]
    fn works_through_trait_objects() {
        let host = TestHost::new(100.0, 50.0, &[2]);
        let mut layout: alloc::boxed::Box<dyn LayoutEngine> =
            alloc::boxed::Box::new(FixedRows::new(10.0));
        layout.attach_host(&host);
        assert!(layout.prepare_if_needed().is_some());
        assert_eq!(
            layout.layout_attributes_for_item(IndexPath::new(0, 1)).frame,
            Rect::new(0.0, 10.0, 100.0, 20.0)
        );
    }
}
