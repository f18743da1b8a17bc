// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use std::iter::FusedIterator;

use kurbo::{Point, Rect, Size};
use trellis_core::drop::{DropIndexPath, DropRelation, DropType};
use trellis_core::index::IndexPath;
use trellis_core::layout::Direction;
use trellis_core::trace::{
    DropTargetEvent, LayoutPassSummary, NavigationEvent, PrepareEvent, QueryStrategy, TraceSink,
    VisibleQueryEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PREPARE: u8 = 1;
const TAG_VISIBLE_QUERY: u8 = 2;
const TAG_DROP_TARGET: u8 = 3;
const TAG_NAVIGATION: u8 = 4;
const TAG_PASS_SUMMARY: u8 = 5;

const FLAG_EXPLICIT: u8 = 1 << 0;
const FLAG_BOUNDS: u8 = 1 << 1;
const FLAG_DATA: u8 = 1 << 2;
const FLAG_DRAG: u8 = 1 << 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_point(&mut self, p: Point) {
        self.write_f64(p.x);
        self.write_f64(p.y);
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_size(&mut self, s: Size) {
        self.write_f64(s.width);
        self.write_f64(s.height);
    }

    fn write_index_path(&mut self, ip: IndexPath) {
        self.write_u32(ip.section);
        self.write_u32(ip.item);
    }

    fn write_option_index_path(&mut self, v: Option<IndexPath>) {
        self.write_u8(u8::from(v.is_some()));
        self.write_index_path(v.unwrap_or_default());
    }

    /// Relation byte 0 means no target.
    fn write_option_drop(&mut self, v: Option<DropIndexPath>) {
        match v {
            Some(target) => {
                self.write_u8(match target.relation() {
                    DropRelation::On => 1,
                    DropRelation::Before => 2,
                    DropRelation::After => 3,
                });
                self.write_index_path(target.index_path());
            }
            None => {
                self.write_u8(0);
                self.write_index_path(IndexPath::default());
            }
        }
    }

    fn write_drop_type(&mut self, t: DropType) {
        self.write_u8(match t {
            DropType::None => 0,
            DropType::Marker => 1,
            DropType::Displacement => 2,
        });
    }

    fn write_direction(&mut self, d: Direction) {
        self.write_u8(match d {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_prepare(&mut self, e: &PrepareEvent) {
        self.write_u8(TAG_PREPARE);
        self.write_u64(e.generation);
        let mut flags = 0;
        for (set, flag) in [
            (e.explicit, FLAG_EXPLICIT),
            (e.bounds, FLAG_BOUNDS),
            (e.data, FLAG_DATA),
            (e.drag, FLAG_DRAG),
        ] {
            if set {
                flags |= flag;
            }
        }
        self.write_u8(flags);
        self.write_u32(e.invalidated_sections);
        self.write_u32(e.section_count);
    }

    fn on_visible_query(&mut self, e: &VisibleQueryEvent) {
        self.write_u8(TAG_VISIBLE_QUERY);
        self.write_rect(e.rect);
        self.write_u8(match e.strategy {
            QueryStrategy::Spatial => 0,
            QueryStrategy::LinearScan => 1,
        });
        self.write_u32(e.count);
    }

    fn on_drop_target(&mut self, e: &DropTargetEvent) {
        self.write_u8(TAG_DROP_TARGET);
        self.write_point(e.point);
        self.write_drop_type(e.drop_type);
        self.write_option_drop(e.target);
        self.write_u8(u8::from(e.changed));
    }

    fn on_navigation(&mut self, e: &NavigationEvent) {
        self.write_u8(TAG_NAVIGATION);
        self.write_direction(e.direction);
        self.write_option_index_path(e.from);
        self.write_option_index_path(e.to);
    }

    fn on_pass_summary(&mut self, s: &LayoutPassSummary) {
        self.write_u8(TAG_PASS_SUMMARY);
        self.write_u64(s.generation);
        self.write_rect(s.viewport);
        self.write_u8(u8::from(s.prepared));
        self.write_u32(s.visible);
        self.write_u32(s.entered);
        self.write_u32(s.exited);
        self.write_u8(u8::from(s.reapply));
        self.write_size(s.content_size);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PrepareEvent`].
    Prepare(PrepareEvent),
    /// A [`VisibleQueryEvent`].
    VisibleQuery(VisibleQueryEvent),
    /// A [`DropTargetEvent`].
    DropTarget(DropTargetEvent),
    /// A [`NavigationEvent`].
    Navigation(NavigationEvent),
    /// A [`LayoutPassSummary`].
    PassSummary(LayoutPassSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Once a record fails to decode, the rest of the buffer is skipped.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_point(&mut self) -> Option<Point> {
        Some(Point::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_size(&mut self) -> Option<Size> {
        Some(Size::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_index_path(&mut self) -> Option<IndexPath> {
        Some(IndexPath::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_option_index_path(&mut self) -> Option<Option<IndexPath>> {
        let present = self.read_bool()?;
        let ip = self.read_index_path()?;
        Some(present.then_some(ip))
    }

    fn read_option_drop(&mut self) -> Option<Option<DropIndexPath>> {
        let relation = self.read_u8()?;
        let ip = self.read_index_path()?;
        Some(match relation {
            0 => None,
            1 => Some(DropIndexPath::on(ip)),
            2 => Some(DropIndexPath::before(ip)),
            _ => Some(DropIndexPath::after(ip)),
        })
    }

    fn read_drop_type(&mut self) -> Option<DropType> {
        Some(match self.read_u8()? {
            0 => DropType::None,
            1 => DropType::Marker,
            _ => DropType::Displacement,
        })
    }

    fn read_direction(&mut self) -> Option<Direction> {
        Some(match self.read_u8()? {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Up,
            _ => Direction::Down,
        })
    }

    fn decode_prepare(&mut self) -> Option<RecordedEvent> {
        let generation = self.read_u64()?;
        let flags = self.read_u8()?;
        Some(RecordedEvent::Prepare(PrepareEvent {
            generation,
            explicit: flags & FLAG_EXPLICIT != 0,
            bounds: flags & FLAG_BOUNDS != 0,
            data: flags & FLAG_DATA != 0,
            drag: flags & FLAG_DRAG != 0,
            invalidated_sections: self.read_u32()?,
            section_count: self.read_u32()?,
        }))
    }

    fn decode_visible_query(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::VisibleQuery(VisibleQueryEvent {
            rect: self.read_rect()?,
            strategy: match self.read_u8()? {
                0 => QueryStrategy::Spatial,
                _ => QueryStrategy::LinearScan,
            },
            count: self.read_u32()?,
        }))
    }

    fn decode_drop_target(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DropTarget(DropTargetEvent {
            point: self.read_point()?,
            drop_type: self.read_drop_type()?,
            target: self.read_option_drop()?,
            changed: self.read_bool()?,
        }))
    }

    fn decode_navigation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Navigation(NavigationEvent {
            direction: self.read_direction()?,
            from: self.read_option_index_path()?,
            to: self.read_option_index_path()?,
        }))
    }

    fn decode_pass_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassSummary(LayoutPassSummary {
            generation: self.read_u64()?,
            viewport: self.read_rect()?,
            prepared: self.read_bool()?,
            visible: self.read_u32()?,
            entered: self.read_u32()?,
            exited: self.read_u32()?,
            reapply: self.read_bool()?,
            content_size: self.read_size()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let event = match tag {
            TAG_PREPARE => self.decode_prepare(),
            TAG_VISIBLE_QUERY => self.decode_visible_query(),
            TAG_DROP_TARGET => self.decode_drop_target(),
            TAG_NAVIGATION => self.decode_navigation(),
            TAG_PASS_SUMMARY => self.decode_pass_summary(),
            _ => None,
        };
        if event.is_none() {
            // Unknown tag or short record: the rest cannot be framed.
            self.pos = self.data.len();
        }
        event
    }
}

impl FusedIterator for DecodeIter<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
