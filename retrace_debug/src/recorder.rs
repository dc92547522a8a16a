// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use retrace_core::id::{NodeId, ViewHandle};
use retrace_core::time::Timestamp;
use retrace_core::trace::{
    CaptureSummaryEvent, DiffSummaryEvent, EmitEvent, EmitKind, FailureStage,
    IdentitySweepEvent, IntrospectionFailureEvent, LimitKind, SnapshotReason, TickBeginEvent,
    TraceSink, TruncationEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK_BEGIN: u8 = 1;
const TAG_INTROSPECTION_FAILURE: u8 = 2;
const TAG_TRUNCATION: u8 = 3;
const TAG_CAPTURE_SUMMARY: u8 = 4;
const TAG_IDENTITY_SWEEP: u8 = 5;
const TAG_DIFF_SUMMARY: u8 = 6;
const TAG_EMIT: u8 = 7;

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

    fn write_stage(&mut self, s: FailureStage) {
        self.write_u8(match s {
            FailureStage::Kind => 0,
            FailureStage::Geometry => 1,
            FailureStage::Paint => 2,
            FailureStage::Content => 3,
            FailureStage::UnknownKind => 4,
        });
    }

    fn write_limit(&mut self, l: LimitKind) {
        self.write_u8(match l {
            LimitKind::Depth => 0,
            LimitKind::NodeBudget => 1,
        });
    }

    fn write_emit_kind(&mut self, k: EmitKind) {
        self.write_u8(match k {
            EmitKind::Meta => 0,
            EmitKind::FullSnapshot => 1,
            EmitKind::Incremental => 2,
            EmitKind::Unchanged => 3,
            EmitKind::Pointer => 4,
        });
    }

    fn write_reason(&mut self, r: Option<SnapshotReason>) {
        self.write_u8(match r {
            None => 0,
            Some(SnapshotReason::NoPriorTree) => 1,
            Some(SnapshotReason::StructuralMismatch) => 2,
            Some(SnapshotReason::MutationOverflow) => 3,
            Some(SnapshotReason::IdentityExhausted) => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.write_u8(TAG_TICK_BEGIN);
        self.write_u64(e.tick_index);
        self.write_u64(e.timestamp.millis());
    }

    fn on_introspection_failure(&mut self, e: &IntrospectionFailureEvent) {
        self.write_u8(TAG_INTROSPECTION_FAILURE);
        self.write_u64(e.tick_index);
        self.write_u64(e.view.0);
        self.write_stage(e.stage);
    }

    fn on_truncation(&mut self, e: &TruncationEvent) {
        self.write_u8(TAG_TRUNCATION);
        self.write_u64(e.tick_index);
        self.write_u64(e.view.0);
        self.write_limit(e.limit);
        self.write_u32(e.depth);
    }

    fn on_capture_summary(&mut self, e: &CaptureSummaryEvent) {
        self.write_u8(TAG_CAPTURE_SUMMARY);
        self.write_u64(e.tick_index);
        self.write_u32(e.nodes);
        self.write_u32(e.max_depth);
        self.write_u32(e.placeholders);
        self.write_u8(u8::from(e.truncated));
    }

    fn on_identity_sweep(&mut self, e: &IdentitySweepEvent) {
        self.write_u8(TAG_IDENTITY_SWEEP);
        self.write_u64(e.tick_index);
        self.write_u32(e.live);
        self.write_u32(e.evicted);
        self.write_u32(e.next_id.0);
    }

    fn on_diff_summary(&mut self, e: &DiffSummaryEvent) {
        self.write_u8(TAG_DIFF_SUMMARY);
        self.write_u64(e.tick_index);
        self.write_u32(e.removes);
        self.write_u32(e.adds);
        self.write_u32(e.texts);
        self.write_u32(e.attributes);
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        self.write_u8(TAG_EMIT);
        self.write_u64(e.tick_index);
        self.write_u64(e.timestamp.millis());
        self.write_emit_kind(e.kind);
        self.write_reason(e.reason);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`TickBeginEvent`].
    TickBegin(TickBeginEvent),
    /// An [`IntrospectionFailureEvent`].
    IntrospectionFailure(IntrospectionFailureEvent),
    /// A [`TruncationEvent`].
    Truncation(TruncationEvent),
    /// A [`CaptureSummaryEvent`].
    CaptureSummary(CaptureSummaryEvent),
    /// An [`IdentitySweepEvent`].
    IdentitySweep(IdentitySweepEvent),
    /// A [`DiffSummaryEvent`].
    DiffSummary(DiffSummaryEvent),
    /// An [`EmitEvent`].
    Emit(EmitEvent),
}

impl RecordedEvent {
    /// The tick this event belongs to.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        match self {
            Self::TickBegin(e) => e.tick_index,
            Self::IntrospectionFailure(e) => e.tick_index,
            Self::Truncation(e) => e.tick_index,
            Self::CaptureSummary(e) => e.tick_index,
            Self::IdentitySweep(e) => e.tick_index,
            Self::DiffSummary(e) => e.tick_index,
            Self::Emit(e) => e.tick_index,
        }
    }
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
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_stage(&mut self) -> Option<FailureStage> {
        Some(match self.read_u8()? {
            0 => FailureStage::Kind,
            1 => FailureStage::Geometry,
            2 => FailureStage::Paint,
            3 => FailureStage::Content,
            _ => FailureStage::UnknownKind,
        })
    }

    fn read_limit(&mut self) -> Option<LimitKind> {
        Some(match self.read_u8()? {
            0 => LimitKind::Depth,
            _ => LimitKind::NodeBudget,
        })
    }

    fn read_emit_kind(&mut self) -> Option<EmitKind> {
        Some(match self.read_u8()? {
            0 => EmitKind::Meta,
            1 => EmitKind::FullSnapshot,
            2 => EmitKind::Incremental,
            3 => EmitKind::Unchanged,
            _ => EmitKind::Pointer,
        })
    }

    fn read_reason(&mut self) -> Option<Option<SnapshotReason>> {
        Some(match self.read_u8()? {
            0 => None,
            1 => Some(SnapshotReason::NoPriorTree),
            2 => Some(SnapshotReason::StructuralMismatch),
            3 => Some(SnapshotReason::MutationOverflow),
            _ => Some(SnapshotReason::IdentityExhausted),
        })
    }

    fn decode_tick_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickBegin(TickBeginEvent {
            tick_index: self.read_u64()?,
            timestamp: Timestamp(self.read_u64()?),
        }))
    }

    fn decode_introspection_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::IntrospectionFailure(
            IntrospectionFailureEvent {
                tick_index: self.read_u64()?,
                view: ViewHandle(self.read_u64()?),
                stage: self.read_stage()?,
            },
        ))
    }

    fn decode_truncation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Truncation(TruncationEvent {
            tick_index: self.read_u64()?,
            view: ViewHandle(self.read_u64()?),
            limit: self.read_limit()?,
            depth: self.read_u32()?,
        }))
    }

    fn decode_capture_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CaptureSummary(CaptureSummaryEvent {
            tick_index: self.read_u64()?,
            nodes: self.read_u32()?,
            max_depth: self.read_u32()?,
            placeholders: self.read_u32()?,
            truncated: self.read_u8()? != 0,
        }))
    }

    fn decode_identity_sweep(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::IdentitySweep(IdentitySweepEvent {
            tick_index: self.read_u64()?,
            live: self.read_u32()?,
            evicted: self.read_u32()?,
            next_id: NodeId(self.read_u32()?),
        }))
    }

    fn decode_diff_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DiffSummary(DiffSummaryEvent {
            tick_index: self.read_u64()?,
            removes: self.read_u32()?,
            adds: self.read_u32()?,
            texts: self.read_u32()?,
            attributes: self.read_u32()?,
        }))
    }

    fn decode_emit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Emit(EmitEvent {
            tick_index: self.read_u64()?,
            timestamp: Timestamp(self.read_u64()?),
            kind: self.read_emit_kind()?,
            reason: self.read_reason()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK_BEGIN => self.decode_tick_begin(),
            TAG_INTROSPECTION_FAILURE => self.decode_introspection_failure(),
            TAG_TRUNCATION => self.decode_truncation(),
            TAG_CAPTURE_SUMMARY => self.decode_capture_summary(),
            TAG_IDENTITY_SWEEP => self.decode_identity_sweep(),
            TAG_DIFF_SUMMARY => self.decode_diff_summary(),
            TAG_EMIT => self.decode_emit(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
