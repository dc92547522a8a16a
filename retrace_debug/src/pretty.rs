// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use retrace_core::trace::{
    CaptureSummaryEvent, DiffSummaryEvent, EmitEvent, EmitKind, FailureStage,
    IdentitySweepEvent, IntrospectionFailureEvent, LimitKind, SnapshotReason, TickBeginEvent,
    TraceSink, TruncationEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn stage_name(stage: FailureStage) -> &'static str {
    match stage {
        FailureStage::Kind => "kind",
        FailureStage::Geometry => "geometry",
        FailureStage::Paint => "paint",
        FailureStage::Content => "content",
        FailureStage::UnknownKind => "unknown-kind",
    }
}

fn limit_name(limit: LimitKind) -> &'static str {
    match limit {
        LimitKind::Depth => "depth",
        LimitKind::NodeBudget => "node-budget",
    }
}

fn emit_name(kind: EmitKind) -> &'static str {
    match kind {
        EmitKind::Meta => "meta",
        EmitKind::FullSnapshot => "full-snapshot",
        EmitKind::Incremental => "incremental",
        EmitKind::Unchanged => "unchanged",
        EmitKind::Pointer => "pointer",
    }
}

fn reason_name(reason: SnapshotReason) -> &'static str {
    match reason {
        SnapshotReason::NoPriorTree => "no-prior-tree",
        SnapshotReason::StructuralMismatch => "structural-mismatch",
        SnapshotReason::MutationOverflow => "mutation-overflow",
        SnapshotReason::IdentityExhausted => "identity-exhausted",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] #{} at {}ms",
            e.tick_index,
            e.timestamp.millis(),
        );
    }

    fn on_introspection_failure(&mut self, e: &IntrospectionFailureEvent) {
        let _ = writeln!(
            self.writer,
            "[failure] tick={} view={:?} stage={}",
            e.tick_index,
            e.view,
            stage_name(e.stage),
        );
    }

    fn on_truncation(&mut self, e: &TruncationEvent) {
        let _ = writeln!(
            self.writer,
            "[truncate] tick={} view={:?} limit={} depth={}",
            e.tick_index,
            e.view,
            limit_name(e.limit),
            e.depth,
        );
    }

    fn on_capture_summary(&mut self, e: &CaptureSummaryEvent) {
        let truncated = if e.truncated { " TRUNCATED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[capture] tick={} nodes={} depth={} placeholders={}{truncated}",
            e.tick_index, e.nodes, e.max_depth, e.placeholders,
        );
    }

    fn on_identity_sweep(&mut self, e: &IdentitySweepEvent) {
        let _ = writeln!(
            self.writer,
            "[identity] tick={} live={} evicted={} next={}",
            e.tick_index, e.live, e.evicted, e.next_id,
        );
    }

    fn on_diff_summary(&mut self, e: &DiffSummaryEvent) {
        let _ = writeln!(
            self.writer,
            "[diff] tick={} -{} +{} text={} attr={}",
            e.tick_index, e.removes, e.adds, e.texts, e.attributes,
        );
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        let reason = e
            .reason
            .map(|r| format!(" ({})", reason_name(r)))
            .unwrap_or_default();
        let _ = writeln!(
            self.writer,
            "[emit] tick={} {}{reason} at {}ms",
            e.tick_index,
            emit_name(e.kind),
            e.timestamp.millis(),
        );
    }
}
