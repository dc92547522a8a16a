// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event sinks.

use retrace_wire::Event;

/// Receives encoded events from a [`CaptureSession`](crate::CaptureSession).
///
/// Harvesting (batching, upload, persistence) happens behind this trait.
pub trait EventSink {
    /// Takes ownership of one event.
    fn emit(&mut self, event: Event);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}

/// Collects events in memory.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    /// Events in emission order.
    pub events: Vec<Event>,
}

impl VecSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all collected events.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
