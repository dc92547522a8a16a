// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capture session state machine.

use kurbo::Point;
use retrace_core::adapter::ViewIntrospector;
use retrace_core::capture::{CaptureLimits, TreeCapturer};
use retrace_core::diff::diff;
use retrace_core::id::{IdentityKey, NodeId, ViewHandle};
use retrace_core::identity::IdentityRegistry;
use retrace_core::mutation::{MutationCounts, MutationRecord};
use retrace_core::node::CaptureNode;
use retrace_core::time::Timestamp;
use retrace_core::trace::{
    DiffSummaryEvent, EmitEvent, EmitKind, SnapshotReason, TickBeginEvent, Tracer,
};
use retrace_wire::event::{EventData, IncrementalData};
use retrace_wire::{DocumentEncoder, PointerKind, TouchSample};

use crate::config::SessionConfig;
use crate::sink::EventSink;

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not capturing; ticks are ignored.
    #[default]
    Idle,
    /// Capturing on every tick.
    Capturing,
}

/// What a call to [`CaptureSession::tick`] produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is idle; nothing was captured.
    Idle,
    /// A meta event and a full snapshot were emitted.
    FullSnapshot(SnapshotReason),
    /// One incremental event with this many records was emitted.
    Incremental(usize),
    /// Nothing visible to the player changed; nothing was emitted.
    Unchanged,
}

/// Drives capture, diffing and encoding tick by tick.
///
/// ```text
///   Idle ──start()──► Capturing ──stop()──► Idle
///                      │   ▲
///                      └───┘ tick(): capture, then
///                            ids exhausted      → reset, meta + full snapshot
///                            no prior tree      → meta + full snapshot
///                            root mismatch      → meta + full snapshot
///                            too many records   → meta + full snapshot
///                            nothing to send    → nothing
///                            otherwise          → incremental
/// ```
///
/// The session owns the identity registry and the prior tree. Every emitted
/// event goes to the sink `S`.
///
/// Capture never walks deeper than the encoder serializes, so the retained
/// prior tree only holds nodes the player has received.
#[derive(Debug)]
pub struct CaptureSession<S> {
    config: SessionConfig,
    capturer: TreeCapturer,
    encoder: DocumentEncoder,
    registry: IdentityRegistry,
    state: SessionState,
    prior: Option<CaptureNode>,
    tick_index: u64,
    started_at: Option<Timestamp>,
    sink: S,
}

impl<S: EventSink> CaptureSession<S> {
    /// Creates an idle session.
    #[must_use]
    pub fn new(config: SessionConfig, sink: S) -> Self {
        let limits = CaptureLimits {
            max_depth: config.limits.max_depth.min(config.encoder.max_depth),
            ..config.limits
        };
        Self {
            capturer: TreeCapturer::new(config.rules.clone(), limits),
            encoder: DocumentEncoder::new(config.encoder.clone()),
            registry: IdentityRegistry::new(),
            state: SessionState::Idle,
            prior: None,
            tick_index: 0,
            started_at: None,
            sink,
            config,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is capturing.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.state == SessionState::Capturing
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The tree captured on the last tick, if any.
    #[must_use]
    pub fn prior(&self) -> Option<&CaptureNode> {
        self.prior.as_ref()
    }

    /// The identity registry.
    #[must_use]
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Ticks captured so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_index
    }

    /// When the current capture run started.
    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// The sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the session, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Enters [`SessionState::Capturing`]. The next tick takes a full
    /// snapshot. Does nothing when already capturing.
    pub fn start(&mut self, now: Timestamp) {
        if self.is_capturing() {
            return;
        }
        self.state = SessionState::Capturing;
        self.started_at = Some(now);
        self.prior = None;
    }

    /// Returns to [`SessionState::Idle`] and discards the prior tree.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        self.started_at = None;
        self.prior = None;
    }

    /// Starts a fresh identity space; the next tick takes a full snapshot.
    ///
    /// The state is unchanged.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.prior = None;
    }

    /// Captures one tick and emits at most two events.
    pub fn tick<A: ViewIntrospector + ?Sized>(
        &mut self,
        adapter: &A,
        root: ViewHandle,
        now: Timestamp,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome {
        if !self.is_capturing() {
            return TickOutcome::Idle;
        }
        self.tick_index += 1;
        let tick_index = self.tick_index;
        tracer.tick_begin(&TickBeginEvent {
            tick_index,
            timestamp: now,
        });

        let mut tree = self
            .capturer
            .capture(adapter, &mut self.registry, root, tick_index, tracer);
        let mut prior = self.prior.take();
        let mut reason = SnapshotReason::NoPriorTree;
        if self.registry.is_exhausted() {
            // Ids in `tree` may repeat; recapture in a fresh id space.
            self.registry.reset();
            tree = self
                .capturer
                .capture(adapter, &mut self.registry, root, tick_index, tracer);
            prior = None;
            reason = SnapshotReason::IdentityExhausted;
        }

        let outcome = match prior {
            None => self.full_snapshot(&tree, reason, now, tracer),
            Some(prior) => match diff(&prior, &tree) {
                Err(_) => self.full_snapshot(&tree, SnapshotReason::StructuralMismatch, now, tracer),
                Ok(records) => self.incremental(&tree, &records, now, tracer),
            },
        };
        self.prior = Some(tree);
        outcome
    }

    /// Emits a pointer interaction on the view under the pointer.
    ///
    /// Returns `false` (emitting nothing) when idle or when the view was not
    /// part of the last capture.
    pub fn record_pointer(
        &mut self,
        kind: PointerKind,
        target: ViewHandle,
        position: Point,
        now: Timestamp,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let Some(id) = self.pointer_target(target) else {
            return false;
        };
        let event = self
            .encoder
            .encode_mouse_interaction(kind, id, position, now);
        self.sink.emit(event);
        self.trace_emit(tracer, now, EmitKind::Pointer, None);
        true
    }

    /// Emits sampled touch movement. Samples over views that were not part
    /// of the last capture are dropped.
    ///
    /// Returns `false` when idle or when no sample survived.
    pub fn record_touch_move(
        &mut self,
        samples: &[(ViewHandle, Point, Timestamp)],
        now: Timestamp,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let samples: Vec<TouchSample> = samples
            .iter()
            .filter_map(|&(view, position, at)| {
                Some(TouchSample {
                    target: self.pointer_target(view)?,
                    position,
                    at,
                })
            })
            .collect();
        if samples.is_empty() {
            return false;
        }
        let event = self.encoder.encode_touch_move(&samples, now);
        self.sink.emit(event);
        self.trace_emit(tracer, now, EmitKind::Pointer, None);
        true
    }

    fn pointer_target(&self, view: ViewHandle) -> Option<NodeId> {
        if !self.is_capturing() || self.prior.is_none() {
            return None;
        }
        self.registry.get(IdentityKey::view(view))
    }

    fn full_snapshot(
        &mut self,
        tree: &CaptureNode,
        reason: SnapshotReason,
        now: Timestamp,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome {
        let (width, height) = viewport(tree);
        let meta = self
            .encoder
            .encode_meta(&self.config.href, width, height, now);
        self.sink.emit(meta);
        self.trace_emit(tracer, now, EmitKind::Meta, None);

        let snapshot = self.encoder.encode_full_snapshot(tree, now);
        self.sink.emit(snapshot);
        self.trace_emit(tracer, now, EmitKind::FullSnapshot, Some(reason));
        TickOutcome::FullSnapshot(reason)
    }

    fn incremental(
        &mut self,
        tree: &CaptureNode,
        records: &[MutationRecord],
        now: Timestamp,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome {
        let counts = MutationCounts::of(records);
        tracer.diff_summary(&DiffSummaryEvent {
            tick_index: self.tick_index,
            removes: saturate(counts.removes),
            adds: saturate(counts.adds),
            texts: saturate(counts.texts),
            attributes: saturate(counts.attributes),
        });

        if records.is_empty() {
            self.trace_emit(tracer, now, EmitKind::Unchanged, None);
            return TickOutcome::Unchanged;
        }
        if records.len() > self.config.max_mutations {
            return self.full_snapshot(tree, SnapshotReason::MutationOverflow, now, tracer);
        }
        let event = self.encoder.encode_incremental(records, now);
        if matches!(
            &event.data,
            EventData::Incremental(IncrementalData::Mutation(data)) if data.is_empty()
        ) {
            // e.g. a mask flip on an element with no content attributes.
            self.trace_emit(tracer, now, EmitKind::Unchanged, None);
            return TickOutcome::Unchanged;
        }
        self.sink.emit(event);
        self.trace_emit(tracer, now, EmitKind::Incremental, None);
        TickOutcome::Incremental(records.len())
    }

    fn trace_emit(
        &self,
        tracer: &mut Tracer<'_>,
        now: Timestamp,
        kind: EmitKind,
        reason: Option<SnapshotReason>,
    ) {
        tracer.emit(&EmitEvent {
            tick_index: self.tick_index,
            timestamp: now,
            kind,
            reason,
        });
    }
}

/// Viewport size from the document frame, in whole points.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped to the u32 range before casting"
)]
fn viewport(tree: &CaptureNode) -> (u32, u32) {
    let clamp = |v: f64| v.round().clamp(0.0, f64::from(u32::MAX)) as u32;
    (clamp(tree.frame.width()), clamp(tree.frame.height()))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "counts are capped at u32::MAX for tracing"
)]
fn saturate(n: usize) -> u32 {
    n.min(u32::MAX as usize) as u32
}
