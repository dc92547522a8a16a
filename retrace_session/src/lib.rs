// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture session for retrace.
//!
//! [`CaptureSession`] owns the identity registry and the previously
//! captured tree, and on every tick decides between a full snapshot, an
//! incremental mutation event, or nothing at all. Encoded events go to an
//! [`EventSink`].
//!
//! ```
//! use kurbo::Rect;
//! use retrace_core::time::Timestamp;
//! use retrace_core::trace::Tracer;
//! use retrace_harness::ViewArena;
//! use retrace_session::{CaptureSession, SessionConfig, TickOutcome, VecSink};
//!
//! let mut ui = ViewArena::new();
//! let root = ui.container(None, Rect::new(0.0, 0.0, 320.0, 480.0));
//! let title = ui.label(Some(root), Rect::new(8.0, 8.0, 200.0, 32.0), "Inbox");
//!
//! let mut session = CaptureSession::new(SessionConfig::default(), VecSink::new());
//! session.start(Timestamp(0));
//! session.tick(&ui, root, Timestamp(0), &mut Tracer::none());
//!
//! ui.set_text(title, "Inbox (1)");
//! let outcome = session.tick(&ui, root, Timestamp(16), &mut Tracer::none());
//! assert_eq!(outcome, TickOutcome::Incremental(1));
//! assert_eq!(session.sink().events.len(), 3);
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Forwards to `retrace_core/trace`.

mod config;
mod session;
mod sink;

pub use config::SessionConfig;
pub use session::{CaptureSession, SessionState, TickOutcome};
pub use sink::{EventSink, VecSink};
