// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes them as a JSON
//! array, one object per event, for inspection with `jq` or a notebook.

use std::io::{self, Write};

use kurbo::{Rect, Size};
use serde_json::{Value, json};
use trellis_core::drop::{DropIndexPath, DropRelation};
use trellis_core::index::IndexPath;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a JSON array.
///
/// Every object has a `"seq"` (position in the recording) and an `"event"`
/// name; the remaining keys are the event's fields.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(seq, recorded)| event_json(seq, &recorded))
        .collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event_json(seq: usize, recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::Prepare(e) => json!({
            "seq": seq,
            "event": "Prepare",
            "generation": e.generation,
            "explicit": e.explicit,
            "bounds": e.bounds,
            "data": e.data,
            "drag": e.drag,
            "invalidated_sections": e.invalidated_sections,
            "section_count": e.section_count,
        }),
        RecordedEvent::VisibleQuery(e) => json!({
            "seq": seq,
            "event": "VisibleQuery",
            "rect": rect_json(e.rect),
            "strategy": format!("{:?}", e.strategy),
            "count": e.count,
        }),
        RecordedEvent::DropTarget(e) => json!({
            "seq": seq,
            "event": "DropTarget",
            "point": [e.point.x, e.point.y],
            "drop_type": format!("{:?}", e.drop_type),
            "target": e.target.map(drop_json),
            "changed": e.changed,
        }),
        RecordedEvent::Navigation(e) => json!({
            "seq": seq,
            "event": "Navigation",
            "direction": format!("{:?}", e.direction),
            "from": e.from.map(path_json),
            "to": e.to.map(path_json),
        }),
        RecordedEvent::PassSummary(s) => json!({
            "seq": seq,
            "event": "PassSummary",
            "generation": s.generation,
            "viewport": rect_json(s.viewport),
            "prepared": s.prepared,
            "visible": s.visible,
            "entered": s.entered,
            "exited": s.exited,
            "reapply": s.reapply,
            "content_size": size_json(s.content_size),
        }),
    }
}

fn rect_json(r: Rect) -> Value {
    json!({ "x0": r.x0, "y0": r.y0, "x1": r.x1, "y1": r.y1 })
}

fn size_json(s: Size) -> Value {
    json!({ "width": s.width, "height": s.height })
}

fn path_json(ip: IndexPath) -> Value {
    json!([ip.section, ip.item])
}

fn drop_json(target: DropIndexPath) -> Value {
    let relation = match target.relation() {
        DropRelation::On => "on",
        DropRelation::Before => "before",
        DropRelation::After => "after",
    };
    json!({ "relation": relation, "index_path": path_json(target.index_path()) })
}
