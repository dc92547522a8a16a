// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-tree capture and diffing for session replay.
//!
//! `retrace_core` turns a live, platform-native view hierarchy into a
//! normalized document tree once per tick and computes the mutations between
//! consecutive trees. It is `no_std` compatible (with `alloc`); platform
//! access goes through the [`ViewIntrospector`](adapter::ViewIntrospector)
//! trait and wire encoding lives in `retrace_wire`.
//!
//! # Architecture
//!
//! ```text
//!   ViewIntrospector (platform adapter)
//!       │
//!       ▼
//!   TreeCapturer::capture() ──► CaptureNode tree
//!       │   ▲                         │
//!       │   └── IdentityRegistry      ▼
//!       │       MaskPolicyResolver  diff(prior, current) ──► Vec<MutationRecord>
//!       ▼                                                       │
//!   trace events                                replay::Document::apply()
//! ```
//!
//! **[`identity`]**: Stable node ids keyed by view handle and role, with
//! per-tick liveness sweeps. Ids of vanished views are never reused.
//!
//! **[`mask`]**: Privacy masking. The nearest explicit declaration on the
//! path to the root wins, otherwise a per-content default applies.
//!
//! **[`capture`]**: Depth-first walk that classifies views, accumulates
//! transforms and clips, and degrades failures to opaque placeholders.
//!
//! **[`node`]**: The captured document model (node kinds, paint, style maps).
//!
//! **[`diff`]**: Id-keyed tree diff producing ordered [`MutationRecord`]s.
//!
//! **[`replay`]**: Reference replayer that applies mutations to a document
//! mirror.
//!
//! **[`trace`]**: The [`TraceSink`](trace::TraceSink) trait and event types for
//! capture instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//!
//! [`MutationRecord`]: mutation::MutationRecord

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod adapter;
pub mod capture;
pub mod diff;
pub mod id;
pub mod identity;
pub mod mask;
pub mod mutation;
pub mod node;
pub mod replay;
pub mod time;
pub mod trace;
