// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated UI that mutates over a handful of ticks while a capture session
//! records it.
//!
//! Replay events are printed to stdout as one JSON object per line. Trace
//! diagnostics go to a [`PrettyPrintSink`] on stderr and to a
//! [`RecorderSink`], which is exported as `capture-trace.json` in Chrome
//! Trace Event Format at the end.

use std::fs::File;
use std::io::{self, BufWriter};

use kurbo::{Affine, Point, Rect};
use retrace_core::adapter::ViewKind;
use retrace_core::id::ViewHandle;
use retrace_core::mask::MaskingState;
use retrace_core::node::{Color, PaintAttributes};
use retrace_core::time::Timestamp;
use retrace_core::trace::{
    CaptureSummaryEvent, DiffSummaryEvent, EmitEvent, IdentitySweepEvent,
    IntrospectionFailureEvent, TickBeginEvent, TraceSink, Tracer, TruncationEvent,
};
use retrace_debug::pretty::PrettyPrintSink;
use retrace_debug::recorder::RecorderSink;
use retrace_harness::{Faults, ViewArena};
use retrace_session::{CaptureSession, SessionConfig, TickOutcome, VecSink};
use retrace_wire::PointerKind;

/// Start of the simulated clock, in milliseconds since the epoch.
const START_MS: u64 = 1_760_000_000_000;
const TICK_MS: u64 = 250;

/// Forwards every trace event to both diagnostics sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.pretty.on_tick_begin(e);
        self.recorder.on_tick_begin(e);
    }

    fn on_introspection_failure(&mut self, e: &IntrospectionFailureEvent) {
        self.pretty.on_introspection_failure(e);
        self.recorder.on_introspection_failure(e);
    }

    fn on_truncation(&mut self, e: &TruncationEvent) {
        self.pretty.on_truncation(e);
        self.recorder.on_truncation(e);
    }

    fn on_capture_summary(&mut self, e: &CaptureSummaryEvent) {
        self.pretty.on_capture_summary(e);
        self.recorder.on_capture_summary(e);
    }

    fn on_identity_sweep(&mut self, e: &IdentitySweepEvent) {
        self.pretty.on_identity_sweep(e);
        self.recorder.on_identity_sweep(e);
    }

    fn on_diff_summary(&mut self, e: &DiffSummaryEvent) {
        self.pretty.on_diff_summary(e);
        self.recorder.on_diff_summary(e);
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        self.pretty.on_emit(e);
        self.recorder.on_emit(e);
    }
}

/// Handles the simulation mutates after the first tick.
struct Inbox {
    root: ViewHandle,
    list: ViewHandle,
    title: ViewHandle,
    rows: Vec<ViewHandle>,
}

fn build_inbox(ui: &mut ViewArena) -> Inbox {
    let root = ui.container(None, Rect::new(0.0, 0.0, 390.0, 844.0));
    ui.update_paint(root, |p| p.background = Some(Color::rgb(255, 255, 255)));

    let title = ui.label(Some(root), Rect::new(16.0, 48.0, 300.0, 88.0), "Inbox");
    ui.text_field(
        Some(root),
        Rect::new(16.0, 96.0, 374.0, 132.0),
        "search: invoices",
    );
    ui.image_view(
        Some(root),
        Rect::new(330.0, 48.0, 374.0, 92.0),
        "asset://avatar.png",
    );

    // A platform view the adapter cannot classify; its subtree is still walked.
    let map = ui.create_view(
        ViewKind::Unknown("MKMapView".into()),
        Rect::new(0.0, 700.0, 390.0, 844.0),
    );
    ui.add_child(root, map);
    ui.label(Some(map), Rect::new(8.0, 8.0, 200.0, 28.0), "Cupertino");

    let list = ui.container(Some(root), Rect::new(0.0, 140.0, 390.0, 690.0));
    ui.set_clip(list, Some(Rect::new(0.0, 0.0, 390.0, 550.0)));
    let rows = [
        (0.0, "Lunch on Friday?"),
        (1.0, "Your receipt"),
        (2.0, "Build passed"),
    ]
    .into_iter()
    .map(|(slot, subject)| row(ui, list, slot, subject))
    .collect();

    Inbox {
        root,
        list,
        title,
        rows,
    }
}

/// Appends a 64pt row positioned at `slot` rows from the top of `list`.
fn row(ui: &mut ViewArena, list: ViewHandle, slot: f64, subject: &str) -> ViewHandle {
    let row = ui.container(Some(list), Rect::new(0.0, 0.0, 390.0, 64.0));
    ui.set_transform(row, Affine::translate((0.0, 64.0 * slot)));
    ui.set_paint(
        row,
        PaintAttributes {
            border_color: Some(Color::rgb(230, 230, 230)),
            border_width: 1.0,
            ..PaintAttributes::default()
        },
    );
    ui.label(Some(row), Rect::new(16.0, 12.0, 374.0, 52.0), subject);
    row
}

fn main() -> io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::stderr();
    let mut recorder = RecorderSink::new();

    // -- ui + session ------------------------------------------------------
    let mut ui = ViewArena::new();
    let mut inbox = build_inbox(&mut ui);
    let mut session = CaptureSession::new(SessionConfig::default(), VecSink::new());

    let mut now = Timestamp(START_MS);
    session.start(now);

    for step in 0..9_u32 {
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);

        match step {
            // 0: first tick, full snapshot.
            1 => ui.set_text(inbox.title, "Inbox (1)"),
            2 => {
                let added = row(&mut ui, inbox.list, 3.0, "New message");
                inbox.rows.push(added);
            }
            3 => {
                // Move the newest row to the top.
                if let Some(newest) = inbox.rows.pop() {
                    ui.insert_child(inbox.list, 0, newest);
                    inbox.rows.insert(0, newest);
                }
            }
            4 => ui.set_masking(inbox.list, Some(MaskingState::Masked)),
            // 5: nothing changed.
            6 => {
                ui.set_faults(
                    inbox.rows[1],
                    Faults {
                        paint: true,
                        ..Faults::default()
                    },
                );
            }
            7 => {
                let row = inbox.rows[0];
                let at = Point::new(120.0, 172.0);
                session.record_pointer(PointerKind::MouseDown, row, at, now, &mut tracer);
                session.record_pointer(PointerKind::Click, row, at, now, &mut tracer);
            }
            8 => {
                // Swap in a new window root; the diff cannot bridge it.
                let next = build_inbox(&mut ui);
                ui.destroy_view(inbox.root);
                inbox = next;
            }
            _ => {}
        }

        let outcome = session.tick(&ui, inbox.root, now, &mut tracer);
        if outcome == TickOutcome::Unchanged {
            eprintln!("  (step {step}: no change)");
        }

        for event in session.sink_mut().drain() {
            match event.to_json() {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("failed to encode event: {err}"),
            }
        }

        now = Timestamp(now.millis() + TICK_MS);
    }
    session.stop();

    // -- export Chrome trace -----------------------------------------------
    let path = "capture-trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    retrace_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    eprintln!("Wrote {path}");
    Ok(())
}
