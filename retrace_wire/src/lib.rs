// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay-event wire format for retrace captures.
//!
//! - [`event`]: serde-serializable event model (full snapshot, incremental,
//!   meta) with integer type tags.
//! - [`DocumentEncoder`]: builds events from captured trees, mutation
//!   records and pointer input, applying masking on the way out.
//!
//! ```
//! use retrace_core::node::{CaptureNode, Tag};
//! use retrace_core::time::Timestamp;
//! use retrace_wire::DocumentEncoder;
//!
//! let tree = CaptureNode::document(1)
//!     .with_child(CaptureNode::element(2, Tag::Div).with_child(CaptureNode::text(3, "hi")));
//! let event = DocumentEncoder::default().encode_full_snapshot(&tree, Timestamp(0));
//! assert!(event.to_json().unwrap().starts_with(r#"{"type":2"#));
//! ```

pub mod encode;
pub mod event;

pub use encode::{
    DocumentEncoder, EncoderConfig, ImageMasking, SYNTHETIC_ID_BASE, TouchSample,
    synthetic_wrapper_id, wire_id,
};
pub use event::{Event, PointerKind};
