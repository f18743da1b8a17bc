// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side resolution of layout queries.
//!
//! The layout contract lets a layout answer "unknown" to its optional
//! queries. The hosting view is then obliged to derive the answer itself.
//! These functions do that derivation once, so every host resolves layouts
//! the same way:
//!
//! | Layout says `None` for…              | Host falls back to…                          |
//! |--------------------------------------|----------------------------------------------|
//! | `index_paths_for_items_in_rect`      | scanning every item ([`scan_items_in_rect`]) |
//! | `rect_for_section`                   | union of item and supplementary frames       |
//! | `content_size`                       | far edges of the union of section rects      |
//!
//! Resolved content sizes are never smaller than the hosting view's bounds.
//!
//! [`layout_pass`] ties these together into one step per frame: prepare if
//! needed, query the viewport, diff against the previous visible set.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::attributes::{LayoutAttributes, union_rects};
use crate::drop::DropIndexPath;
use crate::host::{HostSelection, HostView};
use crate::index::IndexPath;
use crate::layout::{Direction, Invalidation, LayoutEngine, LayoutLifecycle};
use crate::trace::{
    DropTargetEvent, LayoutPassSummary, NavigationEvent, PrepareEvent, QueryStrategy, Tracer,
    VisibleQueryEvent,
};

/// Items intersecting `rect`, found by asking the layout about every item.
///
/// Correct for any layout, and O(total items). This is the reference answer
/// that spatial lookups must agree with.
#[must_use]
pub fn scan_items_in_rect<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &dyn HostView,
    rect: Rect,
) -> Vec<IndexPath> {
    let mut out = Vec::new();
    for section in 0..host.number_of_sections() {
        for item in 0..host.number_of_items_in_section(section) {
            let index_path = IndexPath::new(section, item);
            if layout
                .layout_attributes_for_item(index_path)
                .intersects(rect)
            {
                out.push(index_path);
            }
        }
    }
    out
}

/// Items intersecting `rect`, using the layout's spatial answer when it has
/// one and a full scan otherwise.
pub fn visible_index_paths<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &dyn HostView,
    rect: Rect,
    tracer: &mut Tracer<'_>,
) -> Vec<IndexPath> {
    let (paths, strategy) = match layout.index_paths_for_items_in_rect(rect) {
        Some(paths) => (paths, QueryStrategy::Spatial),
        None => (
            scan_items_in_rect(layout, host, rect),
            QueryStrategy::LinearScan,
        ),
    };
    tracer.visible_query(&VisibleQueryEvent {
        rect,
        strategy,
        count: u32::try_from(paths.len()).unwrap_or(u32::MAX),
    });
    paths
}

/// Bounding rectangle of `section`.
///
/// Falls back to the union of every item frame plus the supplementary views
/// of the given `kinds`. `None` if the layout does not know and the section
/// has no items and none of those supplementary views.
#[must_use]
pub fn section_rect<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &dyn HostView,
    section: u32,
    kinds: &[&str],
) -> Option<Rect> {
    if let Some(rect) = layout.rect_for_section(section) {
        return Some(rect);
    }
    let items = (0..host.number_of_items_in_section(section)).map(|item| {
        layout
            .layout_attributes_for_item(IndexPath::new(section, item))
            .frame
    });
    let supplementary = kinds
        .iter()
        .filter_map(|kind| layout.layout_attributes_for_supplementary_item(section, kind))
        .map(|attrs| attrs.frame);
    union_rects(items.chain(supplementary))
}

/// Content size inferred from section rectangles.
///
/// The far edges of the union of all section rects, measured from the view
/// origin so that leading insets count. [`Size::ZERO`] when no section has a
/// rect.
#[must_use]
pub fn inferred_content_size<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &dyn HostView,
    kinds: &[&str],
) -> Size {
    let rects = (0..host.number_of_sections())
        .filter_map(|section| section_rect(layout, host, section, kinds));
    match union_rects(rects) {
        Some(union) => Size::new(union.x1.max(0.0), union.y1.max(0.0)),
        None => Size::ZERO,
    }
}

/// Scrollable content size, never smaller than the host's bounds.
#[must_use]
pub fn content_size<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &dyn HostView,
    kinds: &[&str],
) -> Size {
    let size = layout
        .content_size()
        .unwrap_or_else(|| inferred_content_size(layout, host, kinds));
    let bounds = host.bounds().size();
    Size::new(size.width.max(bounds.width), size.height.max(bounds.height))
}

/// Prepares `layout` if needed and reports it.
pub fn prepare<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &dyn HostView,
    tracer: &mut Tracer<'_>,
) -> Option<Invalidation> {
    let invalidation = layout.prepare_if_needed()?;
    tracer.prepare(&PrepareEvent::new(&invalidation, host.number_of_sections()));
    Some(invalidation)
}

/// Result of one [`layout_pass`].
///
/// Reused across passes: the previous pass's [`visible`](Self::visible) set is
/// the baseline the next pass diffs against.
#[derive(Clone, Debug, Default)]
pub struct LayoutPass {
    /// Layout generation observed by this pass.
    pub generation: u64,
    /// What was consumed if the pass prepared the layout.
    pub prepared: Option<Invalidation>,
    /// Items intersecting the viewport, sorted.
    pub visible: Vec<IndexPath>,
    /// Items visible now but not in the previous pass, sorted.
    pub entered: Vec<IndexPath>,
    /// Items visible in the previous pass but not now, sorted.
    pub exited: Vec<IndexPath>,
    /// The host must re-apply attributes to every visible item, not only to
    /// [`entered`](Self::entered) ones.
    pub reapply: bool,
    /// Resolved content size.
    pub content_size: Size,
    /// Drop marker to draw, in [`DropType::Marker`](crate::drop::DropType::Marker) mode.
    pub marker: Option<LayoutAttributes>,
    /// Placeholder filling the displacement gap, in
    /// [`DropType::Displacement`](crate::drop::DropType::Displacement) mode.
    pub placeholder: Option<LayoutAttributes>,
}

impl LayoutPass {
    /// Clears all lists, forgetting the previous visible set.
    pub fn clear(&mut self) {
        self.generation = 0;
        self.prepared = None;
        self.visible.clear();
        self.entered.clear();
        self.exited.clear();
        self.reapply = false;
        self.content_size = Size::ZERO;
        self.marker = None;
        self.placeholder = None;
    }

    /// Builds the trace summary for this pass.
    #[must_use]
    pub fn summary(&self, viewport: Rect) -> LayoutPassSummary {
        let len = |v: &Vec<IndexPath>| u32::try_from(v.len()).unwrap_or(u32::MAX);
        LayoutPassSummary {
            generation: self.generation,
            viewport,
            prepared: self.prepared.is_some(),
            visible: len(&self.visible),
            entered: len(&self.entered),
            exited: len(&self.exited),
            reapply: self.reapply,
            content_size: self.content_size,
        }
    }
}

/// Runs one layout pass for `viewport`.
///
/// Prepares the layout if it is invalidated, resolves the visible set and
/// content size, and diffs the visible set against the one `pass` holds from
/// the previous call. Attributes must be re-applied to all visible items when
/// the layout was re-prepared or asks for it with
/// [`should_apply_existing_layout_attributes_on_layout`](LayoutEngine::should_apply_existing_layout_attributes_on_layout).
pub fn layout_pass<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &dyn HostView,
    viewport: Rect,
    kinds: &[&str],
    pass: &mut LayoutPass,
    tracer: &mut Tracer<'_>,
) {
    let previous = core::mem::take(&mut pass.visible);

    pass.prepared = prepare(layout, host, tracer);
    pass.generation = layout.core().generation();

    let mut visible = visible_index_paths(layout, host, viewport, tracer);
    visible.sort_unstable();
    visible.dedup();

    pass.entered.clear();
    pass.entered.extend(
        visible
            .iter()
            .filter(|ip| previous.binary_search(ip).is_err())
            .copied(),
    );
    pass.exited.clear();
    pass.exited.extend(
        previous
            .iter()
            .filter(|ip| visible.binary_search(ip).is_err())
            .copied(),
    );
    pass.visible = visible;
    pass.reapply =
        pass.prepared.is_some() || layout.should_apply_existing_layout_attributes_on_layout();
    pass.content_size = content_size(layout, host, kinds);
    pass.marker = layout.drop_marker_attributes();
    pass.placeholder = layout.drop_placeholder_attributes();

    tracer.pass_summary(&pass.summary(viewport));
}

/// The item selection moves to from `current` in `direction`.
///
/// Asks the layout for the geometric neighbour, then skips over items the
/// host reports as invalid or unselectable by continuing in the same
/// direction. `None` at the edge of content.
pub fn next_selection<L, H>(
    layout: &L,
    host: &H,
    direction: Direction,
    current: Option<IndexPath>,
    tracer: &mut Tracer<'_>,
) -> Option<IndexPath>
where
    L: LayoutEngine + ?Sized,
    H: HostSelection + ?Sized,
{
    let total: u64 = (0..host.number_of_sections())
        .map(|s| u64::from(host.number_of_items_in_section(s)))
        .sum();
    let mut from = current;
    let mut to = None;
    // Each step visits a distinct item unless the layout cycles, so `total`
    // steps are enough.
    for _ in 0..total {
        let Some(candidate) = layout.index_path_for_next_item(direction, from) else {
            break;
        };
        if host.validate_index_path(candidate) && host.is_selectable(candidate) {
            to = Some(candidate);
            break;
        }
        if !host.validate_index_path(candidate) {
            break;
        }
        from = Some(candidate);
    }
    tracer.navigation(&NavigationEvent {
        direction,
        from: current,
        to,
    });
    to
}

/// Feeds a drag location to `layout` and reports the resolved target.
pub fn drag_update<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    point: Point,
    tracer: &mut Tracer<'_>,
) -> Option<DropIndexPath> {
    let previous = layout.core().drag_session().and_then(|s| s.target);
    let target = layout.drag_moved(point);
    tracer.drop_target(&DropTargetEvent {
        point,
        drop_type: layout.core().drop_type(),
        target,
        changed: previous != target,
    });
    target
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::drop::DropType;
    use crate::index::SUPPLEMENTARY_HEADER;
    use crate::testing::{FixedRows, TestHost};

    fn prepared(sections: &[u32], spatial: bool) -> (alloc::rc::Rc<TestHost>, FixedRows) {
        let host = TestHost::new(100.0, 50.0, sections);
        let mut layout = FixedRows::new(20.0);
        layout.spatial = spatial;
        layout.attach_host(&host);
        assert!(layout.prepare_if_needed().is_some());
        (host, layout)
    }

    #[test]
    fn fallback_scan_matches_spatial_answer() {
        for rect in [
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 100.0, 40.0),
            Rect::new(0.0, 35.0, 100.0, 85.0),
            Rect::new(200.0, 0.0, 300.0, 50.0),
        ] {
            let (host, spatial) = prepared(&[3, 2], true);
            let (_, scanning) = prepared(&[3, 2], false);
            let a = visible_index_paths(&spatial, &*host, rect, &mut Tracer::none());
            let b = visible_index_paths(&scanning, &*host, rect, &mut Tracer::none());
            assert_eq!(a, b, "rect {rect:?}");
        }
    }

    #[test]
    fn visibility_excludes_touching_edges() {
        let (host, layout) = prepared(&[3], false);
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            visible_index_paths(&layout, &*host, rect, &mut Tracer::none()),
            vec![
                IndexPath::new(0, 0),
                IndexPath::new(0, 1),
                IndexPath::new(0, 2)
            ]
        );
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(
            visible_index_paths(&layout, &*host, rect, &mut Tracer::none()),
            vec![IndexPath::new(0, 0), IndexPath::new(0, 1)]
        );
    }

    #[test]
    fn section_rect_falls_back_to_item_union() {
        let (host, layout) = prepared(&[3, 0, 2], false);
        assert_eq!(
            section_rect(&layout, &*host, 2, &[SUPPLEMENTARY_HEADER]),
            Some(Rect::new(0.0, 60.0, 100.0, 100.0))
        );
        assert_eq!(section_rect(&layout, &*host, 1, &[]), None);
    }

    #[test]
    fn content_size_inferred_from_stacked_sections() {
        let (host, layout) = prepared(&[2, 2, 2, 2, 2], true);
        // Each section is 40 tall; the union of all five spans 200.
        assert_eq!(content_size(&layout, &*host, &[]), Size::new(100.0, 200.0));
    }

    #[test]
    fn content_size_never_below_bounds() {
        let (host, layout) = prepared(&[1], false);
        assert_eq!(content_size(&layout, &*host, &[]), Size::new(100.0, 50.0));

        let (host, empty) = prepared(&[], false);
        assert_eq!(inferred_content_size(&empty, &*host, &[]), Size::ZERO);
        assert_eq!(content_size(&empty, &*host, &[]), Size::new(100.0, 50.0));
    }

    #[test]
    fn layout_pass_diffs_visible_sets() {
        let (host, mut layout) = prepared(&[10], true);
        let mut pass = LayoutPass::default();

        layout_pass(
            &mut layout,
            &*host,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            &[],
            &mut pass,
            &mut Tracer::none(),
        );
        assert!(pass.prepared.is_none());
        assert!(!pass.reapply);
        assert_eq!(pass.entered.len(), 3);
        assert!(pass.exited.is_empty());

        layout_pass(
            &mut layout,
            &*host,
            Rect::new(0.0, 30.0, 100.0, 80.0),
            &[],
            &mut pass,
            &mut Tracer::none(),
        );
        assert_eq!(
            pass.visible,
            vec![
                IndexPath::new(0, 1),
                IndexPath::new(0, 2),
                IndexPath::new(0, 3)
            ]
        );
        assert_eq!(pass.entered, vec![IndexPath::new(0, 3)]);
        assert_eq!(pass.exited, vec![IndexPath::new(0, 0)]);
        assert_eq!(pass.content_size, Size::new(100.0, 200.0));
    }

    #[test]
    fn layout_pass_prepares_and_requests_reapply() {
        let (host, mut layout) = prepared(&[3], true);
        layout.invalidate_layout();
        let mut pass = LayoutPass::default();
        layout_pass(
            &mut layout,
            &*host,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            &[],
            &mut pass,
            &mut Tracer::none(),
        );
        assert!(pass.prepared.as_ref().is_some_and(Invalidation::is_full));
        assert!(pass.reapply);
        assert_eq!(pass.generation, layout.core().generation());
        assert_eq!(pass.summary(Rect::ZERO).visible, 3);
    }

    #[test]
    fn layout_pass_carries_displacement_gap() {
        let (host, mut layout) = prepared(&[4], true);
        layout.set_drop_type(DropType::Displacement);
        drag_update(&mut layout, Point::new(50.0, 22.0), &mut Tracer::none());

        let mut pass = LayoutPass::default();
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        layout_pass(&mut layout, &*host, viewport, &[], &mut pass, &mut Tracer::none());
        assert!(pass.prepared.is_some());
        assert_eq!(pass.marker, None);
        assert_eq!(pass.placeholder.map(|p| p.frame), Some(Rect::new(0.0, 20.0, 100.0, 40.0)));

        layout.end_drag();
        layout_pass(&mut layout, &*host, viewport, &[], &mut pass, &mut Tracer::none());
        assert_eq!(pass.placeholder, None);
    }

    #[test]
    fn navigation_stops_at_edges() {
        let (host, layout) = prepared(&[3], false);
        let mut tracer = Tracer::none();
        assert_eq!(
            next_selection(
                &layout,
                &*host,
                Direction::Up,
                Some(IndexPath::new(0, 0)),
                &mut tracer
            ),
            None
        );
        // The layout proposes 0:3, which the host rejects.
        assert_eq!(
            next_selection(
                &layout,
                &*host,
                Direction::Down,
                Some(IndexPath::new(0, 2)),
                &mut tracer
            ),
            None
        );
        assert_eq!(
            next_selection(
                &layout,
                &*host,
                Direction::Down,
                Some(IndexPath::new(0, 0)),
                &mut tracer
            ),
            Some(IndexPath::new(0, 1))
        );
    }

    #[test]
    fn drag_update_reports_target() {
        let (_host, mut layout) = prepared(&[3], false);
        layout.set_drop_type(DropType::Marker);
        let target = drag_update(&mut layout, Point::new(5.0, 5.0), &mut Tracer::none());
        assert_eq!(target, Some(DropIndexPath::before(IndexPath::new(0, 0))));
        assert_eq!(
            layout.core().drag_session().and_then(|s| s.location),
            Some(Point::new(5.0, 5.0))
        );
    }
}
