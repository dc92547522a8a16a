// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the capture loop.
//!
//! This module provides a [`TraceSink`] trait with one method per event that
//! capture instrumentation emits. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::id::{NodeId, ViewHandle};
use crate::time::Timestamp;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which introspection query failed for a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// [`ViewIntrospector::kind`](crate::adapter::ViewIntrospector::kind).
    Kind,
    /// Frame or clip geometry.
    Geometry,
    /// Paint attributes.
    Paint,
    /// Text or image content.
    Content,
    /// The adapter reported a kind the capturer does not handle.
    UnknownKind,
}

/// Which capture ceiling was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Maximum nesting depth.
    Depth,
    /// Maximum node count for one tick.
    NodeBudget,
}

/// What the session produced for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmitKind {
    /// A meta event (viewport description).
    Meta,
    /// A full document snapshot.
    FullSnapshot,
    /// An incremental mutation event.
    Incremental,
    /// Nothing changed; no event was emitted.
    Unchanged,
    /// A pointer interaction event.
    Pointer,
}

/// Why the session chose a full snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapshotReason {
    /// No prior tree (first tick after start or reset).
    NoPriorTree,
    /// The prior and current roots disagree.
    StructuralMismatch,
    /// The mutation set exceeded the configured ceiling.
    MutationOverflow,
    /// The id space ran out and was restarted.
    IdentityExhausted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a capture tick starts.
#[derive(Clone, Copy, Debug)]
pub struct TickBeginEvent {
    /// Monotonic tick counter within the session.
    pub tick_index: u64,
    /// Wall-clock time of the tick.
    pub timestamp: Timestamp,
}

/// Emitted when the capturer could not describe a view.
#[derive(Clone, Copy, Debug)]
pub struct IntrospectionFailureEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// The view that failed.
    pub view: ViewHandle,
    /// Which query failed.
    pub stage: FailureStage,
}

/// Emitted when capture stops descending because of a ceiling.
#[derive(Clone, Copy, Debug)]
pub struct TruncationEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// The view replaced by a terminal node.
    pub view: ViewHandle,
    /// Which ceiling was hit.
    pub limit: LimitKind,
    /// Depth at which the cut happened (document = 0, root view = 1).
    pub depth: u32,
}

/// Emitted after a capture walk completes.
#[derive(Clone, Copy, Debug)]
pub struct CaptureSummaryEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Nodes in the produced tree.
    pub nodes: u32,
    /// Deepest level reached (document = 0, root view = 1).
    pub max_depth: u32,
    /// Views replaced by opaque placeholders.
    pub placeholders: u32,
    /// Whether any ceiling truncated the tree.
    pub truncated: bool,
}

/// Emitted after the registry's end-of-tick sweep.
#[derive(Clone, Copy, Debug)]
pub struct IdentitySweepEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Mappings kept alive this tick.
    pub live: u32,
    /// Mappings evicted (ids retired) this tick.
    pub evicted: u32,
    /// The id the next new view will receive.
    pub next_id: NodeId,
}

/// Emitted after diffing two trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffSummaryEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Remove records.
    pub removes: u32,
    /// Add records.
    pub adds: u32,
    /// Text change records.
    pub texts: u32,
    /// Attribute change records.
    pub attributes: u32,
}

/// Emitted when the session hands an event to the sink, or decides not to.
#[derive(Clone, Copy, Debug)]
pub struct EmitEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Event timestamp.
    pub timestamp: Timestamp,
    /// What was produced.
    pub kind: EmitKind,
    /// Why a full snapshot was taken, for [`EmitKind::FullSnapshot`].
    pub reason: Option<SnapshotReason>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the capture loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick starts.
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        _ = e;
    }

    /// Called when a view could not be introspected.
    fn on_introspection_failure(&mut self, e: &IntrospectionFailureEvent) {
        _ = e;
    }

    /// Called when a ceiling truncates the tree.
    fn on_truncation(&mut self, e: &TruncationEvent) {
        _ = e;
    }

    /// Called after a capture walk.
    fn on_capture_summary(&mut self, e: &CaptureSummaryEvent) {
        _ = e;
    }

    /// Called after the identity sweep.
    fn on_identity_sweep(&mut self, e: &IdentitySweepEvent) {
        _ = e;
    }

    /// Called after a diff.
    fn on_diff_summary(&mut self, e: &DiffSummaryEvent) {
        _ = e;
    }

    /// Called when the session emits (or skips) an event.
    fn on_emit(&mut self, e: &EmitEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Reborrows the tracer for a nested call.
    #[inline]
    #[must_use]
    pub fn reborrow(&mut self) -> Tracer<'_> {
        #[cfg(feature = "trace")]
        {
            Tracer {
                sink: self.sink.as_deref_mut().map(|s| s as &mut dyn TraceSink),
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            Tracer {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`TickBeginEvent`].
        tick_begin => on_tick_begin(TickBeginEvent)
    );
    dispatch!(
        /// Emits an [`IntrospectionFailureEvent`].
        introspection_failure => on_introspection_failure(IntrospectionFailureEvent)
    );
    dispatch!(
        /// Emits a [`TruncationEvent`].
        truncation => on_truncation(TruncationEvent)
    );
    dispatch!(
        /// Emits a [`CaptureSummaryEvent`].
        capture_summary => on_capture_summary(CaptureSummaryEvent)
    );
    dispatch!(
        /// Emits an [`IdentitySweepEvent`].
        identity_sweep => on_identity_sweep(IdentitySweepEvent)
    );
    dispatch!(
        /// Emits a [`DiffSummaryEvent`].
        diff_summary => on_diff_summary(DiffSummaryEvent)
    );
    dispatch!(
        /// Emits an [`EmitEvent`].
        emit => on_emit(EmitEvent)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> TickBeginEvent {
        TickBeginEvent {
            tick_index: 42,
            timestamp: Timestamp(1_700_000_000_000),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_tick_begin(&sample_tick());
        sink.on_diff_summary(&DiffSummaryEvent::default());
        sink.on_emit(&EmitEvent {
            tick_index: 0,
            timestamp: Timestamp(0),
            kind: EmitKind::Unchanged,
            reason: None,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.tick_begin(&sample_tick());
        tracer.reborrow().diff_summary(&DiffSummaryEvent::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_tick_begin(&mut self, e: &TickBeginEvent) {
                self.ticks.push(e.tick_index);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.tick_begin(&sample_tick());
        tracer.reborrow().tick_begin(&sample_tick());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.ticks, &[42, 42]);
    }
}
