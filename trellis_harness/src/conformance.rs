// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout contract conformance checks.
//!
//! [`run_all`] attaches a layout to a [`StaticHost`], drives it through the
//! lifecycle, and checks the guarantees every layout owes its hosting view:
//!
//! - preparation follows invalidation, once, and reflects the latest data;
//! - spatial queries agree with a full scan of item frames;
//! - navigation stays inside the data source and stops at content edges;
//! - drop targets are deterministic and name real items;
//! - drop markers appear only in marker mode during a targeted drag, one
//!   unit tall;
//! - in displacement mode an insertion target has a placeholder that no item
//!   overlaps;
//! - content and section rectangles cover the frames inside them.
//!
//! Each check stops at its first [`Violation`]. The layout is left prepared,
//! with no drag session and its original drop type.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};
use thiserror::Error;
use trellis_core::attributes::{DROP_MARKER_HEIGHT, LayoutAttributes};
use trellis_core::drop::{DropIndexPath, DropType};
use trellis_core::host::{HostSelection, HostView};
use trellis_core::index::{IndexPath, SUPPLEMENTARY_FOOTER, SUPPLEMENTARY_HEADER};
use trellis_core::layout::{Direction, LayoutEngine, LayoutLifecycle};
use trellis_core::resolve;
use trellis_core::trace::Tracer;

use crate::StaticHost;

/// Supplementary kinds included in section and content rectangles.
const KINDS: &[&str] = &[SUPPLEMENTARY_HEADER, SUPPLEMENTARY_FOOTER];

const EPSILON: f64 = 1e-9;

const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// A broken layout guarantee.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Violation {
    /// Attaching a host did not lead to preparation.
    #[error("layout did not prepare after being attached to a host")]
    NotPrepared,
    /// Reloading unchanged data changed an item's attributes.
    #[error("attributes of {index_path} changed across a reload of unchanged data: {before:?} then {after:?}")]
    UnstableReload {
        /// The item.
        index_path: IndexPath,
        /// Attributes before the reload.
        before: LayoutAttributes,
        /// Attributes after the reload.
        after: LayoutAttributes,
    },
    /// An item added by a reload is not found within the content.
    #[error("item {index_path} added by a reload is not within the content")]
    MissingAfterReload {
        /// The added item.
        index_path: IndexPath,
    },
    /// Invalidating an already invalidated layout changed its generation.
    #[error("repeated invalidation moved the generation from {first} to {second}")]
    InvalidationNotIdempotent {
        /// Generation after the first invalidation.
        first: u64,
        /// Generation after the second invalidation.
        second: u64,
    },
    /// Invalidation did not lead to preparation.
    #[error("invalidation did not lead to preparation")]
    InvalidationIgnored,
    /// The layout prepared again without being invalidated.
    #[error("layout prepared again without being invalidated")]
    RedundantPrepare,
    /// The layout's spatial query disagrees with a scan of item frames.
    #[error("visible items in {rect:?} disagree with a full scan: missing {missing:?}, extra {extra:?}")]
    VisibleSetMismatch {
        /// The queried rectangle.
        rect: Rect,
        /// Intersecting items the layout left out.
        missing: Vec<IndexPath>,
        /// Items the layout returned that do not intersect.
        extra: Vec<IndexPath>,
    },
    /// Navigation returned an item outside the data source.
    #[error("moving {direction:?} from {from:?} gave {to}, which is outside the data source")]
    NavigationOutOfRange {
        /// Direction moved.
        direction: Direction,
        /// Starting item.
        from: Option<IndexPath>,
        /// Returned item.
        to: IndexPath,
    },
    /// Navigation moved past the edge of content.
    #[error("moving {direction:?} from {from}, already at the edge of content, gave {to}")]
    NavigationPastEdge {
        /// Direction moved.
        direction: Direction,
        /// Starting item, at the edge of content in `direction`.
        from: IndexPath,
        /// Returned item.
        to: IndexPath,
    },
    /// The drop target at a point changed without a data or geometry change.
    #[error("drop target at {point:?} changed from {first:?} to {second:?} across a re-preparation")]
    NondeterministicDrop {
        /// Sampled point.
        point: Point,
        /// Target before re-preparing.
        first: Option<DropIndexPath>,
        /// Target after re-preparing.
        second: Option<DropIndexPath>,
    },
    /// A drop target names an item outside the data source.
    #[error("drop target at {point:?} is {target:?}, which is outside the data source")]
    DropTargetOutOfRange {
        /// Sampled point.
        point: Point,
        /// Resolved target.
        target: DropIndexPath,
    },
    /// A drop marker is not exactly one unit tall.
    #[error("drop marker is {height} tall")]
    MarkerHeight {
        /// Observed height.
        height: f64,
    },
    /// A drop marker was produced where none is allowed.
    #[error("unexpected drop marker: {context}")]
    UnexpectedMarker {
        /// Situation in which the marker appeared.
        context: &'static str,
    },
    /// A targeted drag in marker mode produced no marker.
    #[error("no drop marker for {target:?} at {point:?}")]
    MissingMarker {
        /// Drag location.
        point: Point,
        /// Resolved target.
        target: DropIndexPath,
    },
    /// An insertion target in displacement mode produced no placeholder.
    #[error("no placeholder for {target:?} at {point:?}")]
    MissingPlaceholder {
        /// Drag location.
        point: Point,
        /// Resolved target.
        target: DropIndexPath,
    },
    /// An item overlaps the displacement placeholder.
    #[error("item {index_path} overlaps the placeholder {placeholder:?} for {target:?}")]
    PlaceholderOverlap {
        /// Resolved target.
        target: DropIndexPath,
        /// Placeholder frame.
        placeholder: Rect,
        /// Overlapping item.
        index_path: IndexPath,
    },
    /// A placeholder was produced where none is allowed.
    #[error("unexpected placeholder: {context}")]
    UnexpectedPlaceholder {
        /// Situation in which the placeholder appeared.
        context: &'static str,
    },
    /// The resolved content size does not cover a frame.
    #[error("content size {content:?} does not cover {frame:?}")]
    ContentTooSmall {
        /// Resolved content size.
        content: Size,
        /// Uncovered item or section frame.
        frame: Rect,
    },
    /// A section rectangle does not contain one of its frames.
    #[error("rect {rect:?} of section {section} does not contain {frame:?}")]
    SectionRectTooSmall {
        /// The section.
        section: u32,
        /// Resolved section rectangle.
        rect: Rect,
        /// Uncontained item or supplementary frame.
        frame: Rect,
    },
}

/// Outcome of [`run_all`].
#[derive(Clone, Debug, Default)]
pub struct ConformanceReport {
    checks_run: u32,
    violations: Vec<Violation>,
}

impl ConformanceReport {
    /// Records the outcome of one check.
    pub fn record(&mut self, result: Result<(), Violation>) {
        self.checks_run += 1;
        if let Err(violation) = result {
            self.violations.push(violation);
        }
    }

    /// Number of checks recorded.
    #[must_use]
    pub fn checks_run(&self) -> u32 {
        self.checks_run
    }

    /// Whether every check passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in the order the checks ran.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// `Ok` if every check passed, the violations otherwise.
    ///
    /// # Errors
    ///
    /// Returns every recorded violation if there is at least one.
    pub fn into_result(self) -> Result<(), Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checks, {} violations",
            self.checks_run,
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Attaches `layout` to `host` and runs every check.
///
/// If the layout does not prepare after attaching, that is the only check
/// reported.
pub fn run_all<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &Rc<StaticHost>,
) -> ConformanceReport {
    let mut report = ConformanceReport::default();
    layout.attach_host(host);
    if layout.prepare_if_needed().is_none() {
        report.record(Err(Violation::NotPrepared));
        return report;
    }
    report.record(Ok(()));

    let host: &StaticHost = host;
    report.record(check_reload(layout, host));
    report.record(check_idempotent_invalidation(layout));
    report.record(check_visible_sets(layout, host));
    report.record(check_navigation(layout, host));
    report.record(check_drop_targets(layout, host));
    report.record(check_drop_marker(layout, host));
    report.record(check_drop_placeholder(layout, host));
    report.record(check_content_size(layout, host));
    report.record(check_section_rects(layout, host));

    layout.prepare_if_needed();
    report
}

/// Reloading unchanged data reproduces every item's attributes, and an
/// added item shows up inside the content.
pub fn check_reload<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let before: Vec<_> = host
        .index_paths()
        .into_iter()
        .map(|ip| (ip, layout.layout_attributes_for_item(ip)))
        .collect();
    layout.invalidate_data();
    layout
        .prepare_if_needed()
        .ok_or(Violation::InvalidationIgnored)?;
    for (index_path, before) in before {
        let after = layout.layout_attributes_for_item(index_path);
        if after != before {
            return Err(Violation::UnstableReload {
                index_path,
                before,
                after,
            });
        }
    }

    let counts = host.counts();
    let mut grown = counts.clone();
    let Some(last) = grown.last_mut() else {
        return Ok(());
    };
    let added = IndexPath::new(host.number_of_sections() - 1, *last);
    *last += 1;

    host.set_counts(&grown);
    layout.invalidate_data();
    let prepared = layout.prepare_if_needed().is_some();
    let found = prepared && {
        let content = resolve::content_size(layout, host, KINDS);
        let rect = Rect::from_origin_size(Point::ORIGIN, content);
        resolve::visible_index_paths(layout, host, rect, &mut Tracer::none()).contains(&added)
    };
    host.set_counts(&counts);
    layout.invalidate_data();
    layout.prepare_if_needed();

    if !prepared {
        return Err(Violation::InvalidationIgnored);
    }
    if !found {
        return Err(Violation::MissingAfterReload { index_path: added });
    }
    Ok(())
}

/// Repeated invalidation is idempotent and leads to exactly one preparation.
pub fn check_idempotent_invalidation<L: LayoutEngine + ?Sized>(
    layout: &mut L,
) -> Result<(), Violation> {
    layout.invalidate_layout();
    let first = layout.core().generation();
    layout.invalidate_layout();
    let second = layout.core().generation();
    let prepared = layout.prepare_if_needed().is_some();
    let redundant = layout.prepare_if_needed().is_some();

    if first != second {
        return Err(Violation::InvalidationNotIdempotent { first, second });
    }
    if !prepared {
        return Err(Violation::InvalidationIgnored);
    }
    if redundant {
        return Err(Violation::RedundantPrepare);
    }
    Ok(())
}

/// Viewport-sized rectangles stepping down the content by half a viewport,
/// offset and not, plus one entirely left of the content.
fn sample_rects(bounds: Rect, content: Size) -> Vec<Rect> {
    let size = bounds.size();
    let step = (size.height / 2.0).max(1.0);
    let mut rects = Vec::new();
    let mut y = -step;
    while y < content.height + step {
        rects.push(Rect::from_origin_size((0.0, y), size));
        rects.push(Rect::from_origin_size((size.width / 2.0, y), size));
        y += step;
    }
    rects.push(Rect::from_origin_size((-size.width, 0.0), size));
    rects
}

/// The layout's spatial query agrees with a scan of item frames.
///
/// Layouts without a spatial query pass trivially.
pub fn check_visible_sets<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let content = resolve::content_size(layout, host, KINDS);
    for rect in sample_rects(host.bounds(), content) {
        let Some(mut spatial) = layout.index_paths_for_items_in_rect(rect) else {
            continue;
        };
        spatial.sort_unstable();
        spatial.dedup();
        let scanned = resolve::scan_items_in_rect(layout, host, rect);
        let missing: Vec<_> = scanned
            .iter()
            .filter(|ip| spatial.binary_search(ip).is_err())
            .copied()
            .collect();
        let extra: Vec<_> = spatial
            .iter()
            .filter(|ip| scanned.binary_search(ip).is_err())
            .copied()
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(Violation::VisibleSetMismatch {
                rect,
                missing,
                extra,
            });
        }
    }
    Ok(())
}

/// Navigation from every item (and from no selection) stays inside the data
/// source, and items already at an edge of the content have no neighbour
/// past it.
pub fn check_navigation<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let paths = host.index_paths();
    for from in core::iter::once(None).chain(paths.iter().copied().map(Some)) {
        for direction in DIRECTIONS {
            if let Some(to) = layout.index_path_for_next_item(direction, from)
                && !host.validate_index_path(to)
            {
                return Err(Violation::NavigationOutOfRange {
                    direction,
                    from,
                    to,
                });
            }
        }
    }

    let frames: Vec<_> = paths
        .iter()
        .map(|&ip| (ip, layout.layout_attributes_for_item(ip).frame))
        .collect();
    let Some(extent) = trellis_core::attributes::union_rects(frames.iter().map(|(_, f)| *f))
    else {
        return Ok(());
    };
    for &(from, frame) in &frames {
        for direction in DIRECTIONS {
            let at_edge = match direction {
                Direction::Up => frame.y0 <= extent.y0 + EPSILON,
                Direction::Down => frame.y1 >= extent.y1 - EPSILON,
                Direction::Left => frame.x0 <= extent.x0 + EPSILON,
                Direction::Right => frame.x1 >= extent.x1 - EPSILON,
            };
            if !at_edge {
                continue;
            }
            if let Some(to) = layout.index_path_for_next_item(direction, Some(from)) {
                return Err(Violation::NavigationPastEdge {
                    direction,
                    from,
                    to,
                });
            }
        }
    }
    Ok(())
}

/// Points spread over and just beyond the content.
fn sample_points(content: Size) -> Vec<Point> {
    const XS: [f64; 7] = [-0.1, 0.05, 0.3, 0.5, 0.7, 0.95, 1.1];
    const ROWS: u32 = 24;
    let mut points = Vec::new();
    for row in 0..=ROWS {
        let y = content.height * (f64::from(row) / f64::from(ROWS) * 1.1 - 0.05);
        points.extend(XS.iter().map(|fx| Point::new(content.width * fx, y)));
    }
    points
}

/// Drop targets are unchanged by re-preparing unchanged data, and name real
/// items or an insertion at the end of a section.
pub fn check_drop_targets<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let drop_type = layout.core().drop_type();
    layout.set_drop_type(DropType::Marker);
    let result = drop_targets_are_stable(layout, host);
    layout.set_drop_type(drop_type);
    result
}

fn drop_targets_are_stable<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let points = sample_points(resolve::content_size(layout, host, KINDS));
    let first: Vec<_> = points.iter().map(|&p| layout.drop_target_at(p)).collect();
    layout.invalidate_layout();
    layout
        .prepare_if_needed()
        .ok_or(Violation::InvalidationIgnored)?;
    for (&point, &first) in points.iter().zip(&first) {
        let second = layout.drop_target_at(point);
        if second != first {
            return Err(Violation::NondeterministicDrop {
                point,
                first,
                second,
            });
        }
        if let Some(target) = second
            && !names_position(host, target)
        {
            return Err(Violation::DropTargetOutOfRange { point, target });
        }
    }
    Ok(())
}

/// Whether `target` names an item, or inserts after the last item of a
/// section (the only target an empty section can offer).
fn names_position(host: &StaticHost, target: DropIndexPath) -> bool {
    let ip = target.index_path();
    host.validate_index_path(ip)
        || (target == DropIndexPath::before(ip)
            && ip.section < host.number_of_sections()
            && ip.item == host.number_of_items_in_section(ip.section))
}

fn expect_no_marker<L: LayoutEngine + ?Sized>(
    layout: &L,
    context: &'static str,
) -> Result<(), Violation> {
    match layout.drop_marker_attributes() {
        Some(_) => Err(Violation::UnexpectedMarker { context }),
        None => Ok(()),
    }
}

/// Drop markers appear only in marker mode during a drag with a target, and
/// are one unit tall.
pub fn check_drop_marker<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let drop_type = layout.core().drop_type();
    let result = drop_marker_matrix(layout, host);
    layout.end_drag();
    layout.set_drop_type(drop_type);
    layout.prepare_if_needed();
    result
}

fn drop_marker_matrix<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let Some(first) = host.index_paths().first().copied() else {
        return Ok(());
    };
    let inside = layout.layout_attributes_for_item(first).frame.center();
    let outside = Point::new(-1.0e6, -1.0e6);

    layout.end_drag();
    layout.set_drop_type(DropType::None);
    layout.drag_moved(inside);
    expect_no_marker(layout, "drops disabled")?;
    layout.end_drag();

    layout.set_drop_type(DropType::Marker);
    expect_no_marker(layout, "no drag session")?;
    layout.begin_drag();
    layout.drag_moved(outside);
    expect_no_marker(layout, "no drop target")?;
    if let Some(target) = layout.drag_moved(inside) {
        let marker = layout
            .drop_marker_attributes()
            .ok_or(Violation::MissingMarker {
                point: inside,
                target,
            })?;
        let height = marker.frame.height();
        if (height - DROP_MARKER_HEIGHT).abs() > EPSILON {
            return Err(Violation::MarkerHeight { height });
        }
    }
    layout.end_drag();
    expect_no_marker(layout, "drag ended")?;

    layout.set_drop_type(DropType::Displacement);
    layout.drag_moved(inside);
    layout.prepare_if_needed();
    expect_no_marker(layout, "displacement mode")
}

/// Placeholders appear only in displacement mode, for insertion targets, and
/// no item overlaps them.
pub fn check_drop_placeholder<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let drop_type = layout.core().drop_type();
    let result = placeholder_matrix(layout, host);
    layout.end_drag();
    layout.set_drop_type(drop_type);
    layout.prepare_if_needed();
    result
}

fn placeholder_matrix<L: LayoutEngine + ?Sized>(
    layout: &mut L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let points = sample_points(resolve::content_size(layout, host, KINDS));
    let items = host.index_paths();

    layout.end_drag();
    layout.set_drop_type(DropType::Marker);
    for &point in &points {
        layout.drag_moved(point);
        layout.prepare_if_needed();
        if layout.drop_placeholder_attributes().is_some() {
            return Err(Violation::UnexpectedPlaceholder {
                context: "marker mode",
            });
        }
    }

    layout.set_drop_type(DropType::Displacement);
    for &point in &points {
        let target = layout.drag_moved(point);
        layout.prepare_if_needed();
        let placeholder = layout.drop_placeholder_attributes();
        let Some(target) = target.filter(|t| t.insertion_item().is_some()) else {
            if placeholder.is_some() {
                return Err(Violation::UnexpectedPlaceholder {
                    context: "no insertion target",
                });
            }
            continue;
        };
        let placeholder = placeholder
            .ok_or(Violation::MissingPlaceholder { point, target })?
            .frame;
        if let Some(&index_path) = items
            .iter()
            .find(|&&ip| layout.layout_attributes_for_item(ip).intersects(placeholder))
        {
            return Err(Violation::PlaceholderOverlap {
                target,
                placeholder,
                index_path,
            });
        }
    }
    Ok(())
}

/// The resolved content size covers every item and section frame.
pub fn check_content_size<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &StaticHost,
) -> Result<(), Violation> {
    let content = resolve::content_size(layout, host, KINDS);
    let items = host
        .index_paths()
        .into_iter()
        .map(|ip| layout.layout_attributes_for_item(ip).frame);
    let sections = (0..host.number_of_sections())
        .filter_map(|s| resolve::section_rect(layout, host, s, KINDS));
    for frame in items.chain(sections) {
        if frame.x1 > content.width + EPSILON || frame.y1 > content.height + EPSILON {
            return Err(Violation::ContentTooSmall { content, frame });
        }
    }
    Ok(())
}

fn contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 + EPSILON
        && outer.y0 <= inner.y0 + EPSILON
        && outer.x1 >= inner.x1 - EPSILON
        && outer.y1 >= inner.y1 - EPSILON
}

/// Every resolved section rectangle contains the section's item and
/// supplementary frames.
pub fn check_section_rects<L: LayoutEngine + ?Sized>(
    layout: &L,
    host: &StaticHost,
) -> Result<(), Violation> {
    for section in 0..host.number_of_sections() {
        let Some(rect) = resolve::section_rect(layout, host, section, KINDS) else {
            continue;
        };
        let items = (0..host.number_of_items_in_section(section))
            .map(|item| layout.layout_attributes_for_item(IndexPath::new(section, item)).frame);
        let supplementary = KINDS
            .iter()
            .filter_map(|kind| layout.layout_attributes_for_supplementary_item(section, kind))
            .map(|attrs| attrs.frame);
        for frame in items.chain(supplementary) {
            if !contains(rect, frame) {
                return Err(Violation::SectionRectTooSmall {
                    section,
                    rect,
                    frame,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;

    use trellis_core::layout::{LayoutCore, PrepareContext};

    use super::*;

    const ROW: f64 = 10.0;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Fault {
        EmptySpatial,
        InsertsWithoutGap,
        NoMarker,
        RunsOffTheEnd,
        ShortContent,
        Unstable,
    }

    /// Full-width rows of height 10, all sections stacked without gaps.
    #[derive(Debug, Default)]
    struct Rows {
        core: LayoutCore,
        width: f64,
        starts: Vec<u32>,
        counts: Vec<u32>,
        prepares: u32,
        fault: Option<Fault>,
    }

    impl Rows {
        fn with_fault(fault: Fault) -> Self {
            Self {
                fault: Some(fault),
                ..Self::default()
            }
        }

        fn total(&self) -> u32 {
            self.counts.iter().sum()
        }

        fn row_of(&self, ip: IndexPath) -> u32 {
            self.starts[ip.section as usize] + ip.item
        }

        fn at_row(&self, row: u32) -> Option<IndexPath> {
            (0_u32..)
                .zip(self.starts.iter().zip(&self.counts))
                .find(|(_, (start, count))| row >= **start && row < **start + **count)
                .map(|(s, (start, _))| IndexPath::new(s, row - start))
        }

        fn items(&self) -> impl Iterator<Item = IndexPath> + '_ {
            (0..self.total()).filter_map(|r| self.at_row(r))
        }
    }

    impl LayoutEngine for Rows {
        fn core(&self) -> &LayoutCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut LayoutCore {
            &mut self.core
        }

        fn prepare_layout(&mut self, cx: &PrepareContext<'_>) {
            self.prepares += 1;
            self.width = cx.host.bounds().width();
            self.counts = (0..cx.host.number_of_sections())
                .map(|s| cx.host.number_of_items_in_section(s))
                .collect();
            self.starts = self
                .counts
                .iter()
                .scan(0, |acc, &c| {
                    let start = *acc;
                    *acc += c;
                    Some(start)
                })
                .collect();
        }

        fn layout_attributes_for_item(&self, ip: IndexPath) -> LayoutAttributes {
            let y = f64::from(self.row_of(ip)) * ROW;
            let shift = if self.fault == Some(Fault::Unstable) {
                f64::from(self.prepares)
            } else {
                0.0
            };
            LayoutAttributes::new(Rect::new(shift, y, self.width, y + ROW))
        }

        fn index_paths_for_items_in_rect(&self, rect: Rect) -> Option<Vec<IndexPath>> {
            if self.fault == Some(Fault::EmptySpatial) {
                return Some(Vec::new());
            }
            Some(
                self.items()
                    .filter(|&ip| self.layout_attributes_for_item(ip).intersects(rect))
                    .collect(),
            )
        }

        fn content_size(&self) -> Option<Size> {
            let height = if self.fault == Some(Fault::ShortContent) {
                0.0
            } else {
                f64::from(self.total()) * ROW
            };
            Some(Size::new(self.width, height))
        }

        fn index_path_for_next_item(
            &self,
            direction: Direction,
            current: Option<IndexPath>,
        ) -> Option<IndexPath> {
            let total = self.total();
            match (direction, current) {
                (Direction::Left | Direction::Right, _) => None,
                (Direction::Down, None) => self.at_row(0),
                (Direction::Up, None) => self.at_row(total.checked_sub(1)?),
                (Direction::Down, Some(ip)) => {
                    let row = self.row_of(ip) + 1;
                    if row == total && self.fault == Some(Fault::RunsOffTheEnd) {
                        return Some(ip.next_item());
                    }
                    self.at_row(row)
                }
                (Direction::Up, Some(ip)) => self.at_row(self.row_of(ip).checked_sub(1)?),
            }
        }

        fn drop_index_path_at_point(&self, point: Point) -> Option<DropIndexPath> {
            if point.x < 0.0 || point.x >= self.width {
                return None;
            }
            self.items()
                .find(|&ip| {
                    let frame = self.layout_attributes_for_item(ip).frame;
                    frame.y0 <= point.y && point.y < frame.y1
                })
                .map(|ip| {
                    if self.fault == Some(Fault::InsertsWithoutGap) {
                        DropIndexPath::before(ip)
                    } else {
                        DropIndexPath::on(ip)
                    }
                })
        }

        fn layout_attributes_for_drop_marker(
            &self,
            target: DropIndexPath,
        ) -> Option<LayoutAttributes> {
            if self.fault == Some(Fault::NoMarker) {
                return None;
            }
            Some(self.layout_attributes_for_item(target.index_path()))
        }
    }

    fn run(layout: &mut Rows, counts: &[u32]) -> ConformanceReport {
        let host = StaticHost::with_size(100.0, 30.0, counts);
        run_all(layout, &host)
    }

    #[test]
    fn well_behaved_layout_is_clean() {
        for counts in [&[3, 0, 4][..], &[], &[0, 0], &[1]] {
            let report = run(&mut Rows::default(), counts);
            assert!(report.is_clean(), "{counts:?}: {report}");
            assert_eq!(report.checks_run(), 10);
        }
    }

    #[test]
    fn layout_is_left_prepared_and_idle() {
        let mut layout = Rows::default();
        layout.set_drop_type(DropType::Displacement);
        let report = run(&mut layout, &[2, 2]);
        assert!(report.is_clean(), "{report}");
        assert!(layout.core().is_clean());
        assert_eq!(layout.core().drop_type(), DropType::Displacement);
        assert!(layout.core().drag_session().is_none());
        assert_eq!(layout.counts, vec![2, 2]);
    }

    #[test]
    fn empty_spatial_answer_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::EmptySpatial), &[4]);
        // The added item is looked up spatially too.
        assert!(
            report
                .violations()
                .contains(&Violation::MissingAfterReload {
                    index_path: IndexPath::new(0, 4)
                })
        );
        let mismatch = report.violations().iter().find_map(|v| match v {
            Violation::VisibleSetMismatch { missing, extra, .. } => Some((missing, extra)),
            _ => None,
        });
        match mismatch {
            Some((missing, extra)) => {
                assert!(!missing.is_empty());
                assert!(extra.is_empty());
            }
            None => panic!("expected VisibleSetMismatch, got {report}"),
        }
    }

    #[test]
    fn navigation_past_last_item_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::RunsOffTheEnd), &[2, 3]);
        assert_eq!(
            report.violations(),
            &[Violation::NavigationOutOfRange {
                direction: Direction::Down,
                from: Some(IndexPath::new(1, 2)),
                to: IndexPath::new(1, 3),
            }]
        );
    }

    #[test]
    fn short_content_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::ShortContent), &[5]);
        let too_small = report.violations().iter().find_map(|v| match v {
            Violation::ContentTooSmall { content, frame } => Some((*content, *frame)),
            _ => None,
        });
        let Some((content, frame)) = too_small else {
            panic!("expected ContentTooSmall, got {report}");
        };
        // Clamped up to the bounds, which still leaves rows 3 and 4 out.
        assert_eq!(content, Size::new(100.0, 30.0));
        assert_eq!(frame.y1, 40.0);
    }

    #[test]
    fn unstable_reload_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::Unstable), &[1]);
        assert!(matches!(
            report.violations().first(),
            Some(Violation::UnstableReload { index_path, .. }) if *index_path == IndexPath::new(0, 0)
        ));
    }

    #[test]
    fn missing_marker_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::NoMarker), &[3]);
        assert_eq!(
            report.violations(),
            &[Violation::MissingMarker {
                point: Point::new(50.0, 5.0),
                target: DropIndexPath::on(IndexPath::new(0, 0)),
            }]
        );
    }

    #[test]
    fn insertion_without_placeholder_is_caught() {
        let report = run(&mut Rows::with_fault(Fault::InsertsWithoutGap), &[3]);
        assert!(
            matches!(
                report.violations(),
                [Violation::MissingPlaceholder { target, .. }]
                    if target.insertion_item().is_some()
            ),
            "{report}"
        );
    }

    #[test]
    fn insertion_into_empty_section_is_in_range() {
        let host = StaticHost::with_size(100.0, 30.0, &[2, 0]);
        assert!(names_position(&host, DropIndexPath::before(IndexPath::new(1, 0))));
        assert!(names_position(&host, DropIndexPath::before(IndexPath::new(0, 2))));
        assert!(!names_position(&host, DropIndexPath::after(IndexPath::new(1, 0))));
        assert!(!names_position(&host, DropIndexPath::on(IndexPath::new(0, 2))));
        assert!(!names_position(&host, DropIndexPath::before(IndexPath::new(2, 0))));
    }

    #[test]
    fn report_lists_violations() {
        let mut report = ConformanceReport::default();
        report.record(Ok(()));
        report.record(Err(Violation::MarkerHeight { height: 4.0 }));
        assert_eq!(report.checks_run(), 2);
        assert_eq!(
            format!("{report}"),
            "2 checks, 1 violations\n  - drop marker is 4 tall"
        );
        assert_eq!(
            report.into_result(),
            Err(vec![Violation::MarkerHeight { height: 4.0 }])
        );
    }

    #[test]
    fn marker_matrix_accepts_normalized_markers() {
        let host = StaticHost::with_size(100.0, 30.0, &[3]);
        let mut layout = Rows::default();
        layout.attach_host(&host);
        layout.prepare_if_needed();
        assert_eq!(check_drop_marker(&mut layout, &host), Ok(()));
        assert_eq!(layout.core().drop_type(), DropType::None);
    }
}
