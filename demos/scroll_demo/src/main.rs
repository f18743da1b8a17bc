// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated hosting view that exercises a list layout and the tracing
//! pipeline.
//!
//! Scrolls a grouped [`ListLayout`] through its content, resizes it, grows a
//! section, walks the selection with arrow keys, and drags an item with
//! displacement. Events go to both a
//! [`PrettyPrintSink`](trellis_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](trellis_debug::recorder::RecorderSink), and the recording
//! is exported as JSON.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Point, Rect};
use trellis_core::drop::DropType;
use trellis_core::host::HostView;
use trellis_core::index::{IndexPath, SUPPLEMENTARY_FOOTER, SUPPLEMENTARY_HEADER};
use trellis_core::layout::{Direction, LayoutLifecycle};
use trellis_core::resolve::{self, LayoutPass};
use trellis_core::trace::{
    DropTargetEvent, LayoutPassSummary, NavigationEvent, PrepareEvent, TraceSink, Tracer,
    VisibleQueryEvent,
};
use trellis_debug::pretty::PrettyPrintSink;
use trellis_debug::recorder::RecorderSink;
use trellis_harness::StaticHost;
use trellis_layouts::{ListLayout, ListLayoutConfig};

const KINDS: &[&str] = &[SUPPLEMENTARY_HEADER, SUPPLEMENTARY_FOOTER];
const SCROLL_FRAMES: u32 = 24;
const SCROLL_STEP: f64 = 90.0;

/// Forwards every event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.pretty.on_prepare(e);
        self.recorder.on_prepare(e);
    }

    fn on_visible_query(&mut self, e: &VisibleQueryEvent) {
        self.pretty.on_visible_query(e);
        self.recorder.on_visible_query(e);
    }

    fn on_drop_target(&mut self, e: &DropTargetEvent) {
        self.pretty.on_drop_target(e);
        self.recorder.on_drop_target(e);
    }

    fn on_navigation(&mut self, e: &NavigationEvent) {
        self.pretty.on_navigation(e);
        self.recorder.on_navigation(e);
    }

    fn on_pass_summary(&mut self, s: &LayoutPassSummary) {
        self.pretty.on_pass_summary(s);
        self.recorder.on_pass_summary(s);
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();
    let mut tee = Tee {
        pretty: &mut pretty,
        recorder: &mut recorder,
    };
    let mut tracer = Tracer::new(&mut tee);

    // -- host and layout ---------------------------------------------------
    let host = StaticHost::with_size(320.0, 480.0, &[12, 0, 30, 8]);
    host.set_selectable(IndexPath::new(0, 2), false);
    let mut layout = ListLayout::new(ListLayoutConfig::grouped());
    layout.attach_host(&host);
    let mut pass = LayoutPass::default();

    // -- scroll through the content ----------------------------------------
    let mut y = 0.0;
    for _ in 0..SCROLL_FRAMES {
        let bounds = host.bounds();
        let viewport = Rect::from_origin_size((0.0, y), bounds.size());
        resolve::layout_pass(&mut layout, &*host, viewport, KINDS, &mut pass, &mut tracer);
        let max_y = (pass.content_size.height - bounds.height()).max(0.0);
        y = (y + SCROLL_STEP).min(max_y);
    }

    // -- resize: only a width change re-lays out a list --------------------
    for bounds in [
        Rect::new(0.0, 0.0, 320.0, 600.0),
        Rect::new(0.0, 0.0, 280.0, 600.0),
    ] {
        host.set_bounds(bounds);
        let accepted = layout.invalidate_for_bounds_change(bounds);
        println!(
            "resize to {:.0}x{:.0}: invalidated={accepted}",
            bounds.width(),
            bounds.height()
        );
        let viewport = Rect::from_origin_size((0.0, 0.0), bounds.size());
        resolve::layout_pass(&mut layout, &*host, viewport, KINDS, &mut pass, &mut tracer);
    }

    // -- grow one section ----------------------------------------------------
    host.set_counts(&[12, 0, 35, 8]);
    layout.invalidate_sections([2]);
    let viewport = Rect::from_origin_size((0.0, 0.0), host.bounds().size());
    resolve::layout_pass(&mut layout, &*host, viewport, KINDS, &mut pass, &mut tracer);

    // -- arrow-key navigation ------------------------------------------------
    let mut selection = None;
    for direction in [
        Direction::Down,
        Direction::Down,
        Direction::Down,
        Direction::Up,
        Direction::Left,
    ] {
        if let Some(next) =
            resolve::next_selection(&layout, &*host, direction, selection, &mut tracer)
        {
            selection = Some(next);
        }
    }
    println!("selection: {selection:?}");

    // -- drag with displacement ----------------------------------------------
    layout.set_drop_type(DropType::Displacement);
    for y in [40.0, 60.0, 90.0, 95.0, 200.0] {
        resolve::drag_update(&mut layout, Point::new(100.0, y), &mut tracer);
        resolve::layout_pass(&mut layout, &*host, viewport, KINDS, &mut pass, &mut tracer);
        if let Some(gap) = pass.placeholder {
            println!("gap at y {:.0}..{:.0}", gap.frame.y0, gap.frame.y1);
        }
    }
    let dropped = layout.end_drag();
    println!("dropped at: {dropped:?}");
    resolve::layout_pass(&mut layout, &*host, viewport, KINDS, &mut pass, &mut tracer);

    // -- export --------------------------------------------------------------
    let path = "layout_trace.json";
    let file = File::create(path).expect("failed to create layout_trace.json");
    let mut writer = BufWriter::new(file);
    trellis_debug::json::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write layout trace");

    println!("Wrote {path}");
}
