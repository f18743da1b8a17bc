// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::fmt;
use std::io::Write;

use kurbo::Rect;
use trellis_core::drop::{DropIndexPath, DropRelation, DropType};
use trellis_core::index::IndexPath;
use trellis_core::layout::Direction;
use trellis_core::trace::{
    DropTargetEvent, LayoutPassSummary, NavigationEvent, PrepareEvent, QueryStrategy, TraceSink,
    VisibleQueryEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct ShowRect(Rect);

impl fmt::Display for ShowRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(f, "({:.1},{:.1})-({:.1},{:.1})", r.x0, r.y0, r.x1, r.y1)
    }
}

struct ShowPath(Option<IndexPath>);

impl fmt::Display for ShowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{ip}"),
            None => f.write_str("-"),
        }
    }
}

struct ShowDrop(Option<DropIndexPath>);

impl fmt::Display for ShowDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(target) = self.0 else {
            return f.write_str("-");
        };
        let relation = match target.relation() {
            DropRelation::On => "on",
            DropRelation::Before => "before",
            DropRelation::After => "after",
        };
        write!(f, "{relation} {}", target.index_path())
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::Up => "up",
        Direction::Down => "down",
    }
}

fn drop_type_name(drop_type: DropType) -> &'static str {
    match drop_type {
        DropType::None => "none",
        DropType::Marker => "marker",
        DropType::Displacement => "displacement",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        let reasons: Vec<&str> = [
            (e.explicit, "explicit"),
            (e.bounds, "bounds"),
            (e.data, "data"),
            (e.drag, "drag"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        let reasons = if reasons.is_empty() {
            String::from("sections")
        } else {
            reasons.join(",")
        };
        let _ = writeln!(
            self.writer,
            "[prepare] gen={} reasons={reasons} dirty_sections={} sections={}",
            e.generation, e.invalidated_sections, e.section_count,
        );
    }

    fn on_visible_query(&mut self, e: &VisibleQueryEvent) {
        let strategy = match e.strategy {
            QueryStrategy::Spatial => "spatial",
            QueryStrategy::LinearScan => "scan",
        };
        let _ = writeln!(
            self.writer,
            "[visible] rect={} strategy={strategy} count={}",
            ShowRect(e.rect),
            e.count,
        );
    }

    fn on_drop_target(&mut self, e: &DropTargetEvent) {
        let changed = if e.changed { " (changed)" } else { "" };
        let _ = writeln!(
            self.writer,
            "[drop] at ({:.1},{:.1}) mode={} target={}{changed}",
            e.point.x,
            e.point.y,
            drop_type_name(e.drop_type),
            ShowDrop(e.target),
        );
    }

    fn on_navigation(&mut self, e: &NavigationEvent) {
        let _ = writeln!(
            self.writer,
            "[nav] {} {} -> {}",
            direction_name(e.direction),
            ShowPath(e.from),
            ShowPath(e.to),
        );
    }

    fn on_pass_summary(&mut self, s: &LayoutPassSummary) {
        let prepared = if s.prepared { " prepared" } else { "" };
        let reapply = if s.reapply { " reapply" } else { "" };
        let _ = writeln!(
            self.writer,
            "[pass] gen={} viewport={} visible={} +{} -{} content={:.1}x{:.1}{prepared}{reapply}",
            s.generation,
            ShowRect(s.viewport),
            s.visible,
            s.entered,
            s.exited,
            s.content_size.width,
            s.content_size.height,
        );
    }
}
