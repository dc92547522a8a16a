// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use retrace_core::capture::CaptureLimits;
use retrace_core::mask::MaskRules;
use retrace_wire::EncoderConfig;

/// Everything a [`CaptureSession`](crate::CaptureSession) is configured with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capture ceilings.
    pub limits: CaptureLimits,
    /// Masking rules and defaults.
    pub rules: MaskRules,
    /// Encoder settings.
    pub encoder: EncoderConfig,
    /// Incremental events with more records than this are replaced by a
    /// full snapshot.
    pub max_mutations: usize,
    /// Location reported in meta events.
    pub href: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            limits: CaptureLimits::default(),
            rules: MaskRules::default(),
            encoder: EncoderConfig::default(),
            max_mutations: 1_000,
            href: "app://".into(),
        }
    }
}

impl SessionConfig {
    /// Masks all text, inputs and images.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            rules: MaskRules::mask_all(),
            ..Self::default()
        }
    }
}
