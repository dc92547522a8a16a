// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Each tick becomes a `B`/`E` duration slice. It opens at the tick's start
/// timestamp and closes at the last emit seen for that tick. Events without
/// their own timestamp (failures, summaries) are placed at the most recent
/// known time. Millisecond timestamps become microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut now_ms = 0_u64;
    let mut open_tick: Option<u64> = None;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::TickBegin(e) => {
                if let Some(tick) = open_tick.take() {
                    events.push(tick_end(tick, now_ms));
                }
                now_ms = e.timestamp.millis();
                open_tick = Some(e.tick_index);
                events.push(json!({
                    "ph": "B",
                    "name": "Tick",
                    "cat": "Capture",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::IntrospectionFailure(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "IntrospectionFailure",
                    "cat": "Capture",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "tick_index": e.tick_index,
                        "view": e.view.0,
                        "stage": format!("{:?}", e.stage),
                    }
                }));
            }
            RecordedEvent::Truncation(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Truncation",
                    "cat": "Capture",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "tick_index": e.tick_index,
                        "view": e.view.0,
                        "limit": format!("{:?}", e.limit),
                        "depth": e.depth,
                    }
                }));
            }
            RecordedEvent::CaptureSummary(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Nodes",
                    "cat": "Summary",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "nodes": e.nodes,
                        "placeholders": e.placeholders,
                    }
                }));
                if e.truncated {
                    events.push(json!({
                        "ph": "i",
                        "name": "Truncated",
                        "cat": "Summary",
                        "ts": ms_to_us(now_ms),
                        "pid": 0,
                        "tid": 0,
                        "s": "t",
                        "args": {
                            "tick_index": e.tick_index,
                            "max_depth": e.max_depth,
                        }
                    }));
                }
            }
            RecordedEvent::IdentitySweep(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Identities",
                    "cat": "Summary",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "live": e.live,
                        "evicted": e.evicted,
                    }
                }));
            }
            RecordedEvent::DiffSummary(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Mutations",
                    "cat": "Summary",
                    "ts": ms_to_us(now_ms),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "removes": e.removes,
                        "adds": e.adds,
                        "texts": e.texts,
                        "attributes": e.attributes,
                    }
                }));
            }
            RecordedEvent::Emit(e) => {
                now_ms = now_ms.max(e.timestamp.millis());
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Emit",
                    "ts": ms_to_us(e.timestamp.millis()),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "tick_index": e.tick_index,
                        "reason": e.reason.map(|r| format!("{r:?}")),
                    }
                }));
            }
        }
    }

    if let Some(tick) = open_tick {
        events.push(tick_end(tick, now_ms));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn tick_end(tick_index: u64, ms: u64) -> Value {
    json!({
        "ph": "E",
        "name": "Tick",
        "cat": "Capture",
        "ts": ms_to_us(ms),
        "pid": 0,
        "tid": 0,
        "args": {
            "tick_index": tick_index,
        }
    })
}

fn ms_to_us(ms: u64) -> u64 {
    ms.saturating_mul(1000)
}
