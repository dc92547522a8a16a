// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation records produced by the diff engine.

use alloc::string::String;

use crate::id::NodeId;
use crate::node::{CaptureNode, KeyDelta};

/// One change that turns a previous tree into the current tree.
///
/// Records are applied in order. An `Add` names its insertion point by the
/// following sibling, which always exists by the time the record is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum MutationRecord {
    /// Insert `node` (with its whole subtree) under `parent_id`.
    Add {
        /// Parent node.
        parent_id: NodeId,
        /// Sibling the node is inserted before; `None` appends.
        next_sibling_id: Option<NodeId>,
        /// The inserted subtree.
        node: CaptureNode,
    },
    /// Detach the node `id` (and its subtree) from `parent_id`.
    Remove {
        /// Parent node.
        parent_id: NodeId,
        /// Removed node.
        id: NodeId,
    },
    /// Replace the content of a text node.
    TextChange {
        /// Text node.
        id: NodeId,
        /// New, unredacted content.
        text: String,
        /// Resolved masking after the change.
        is_masked: bool,
    },
    /// Changed attribute and style keys of an element.
    AttributeChange {
        /// Element node.
        id: NodeId,
        /// Resolved masking after the change.
        is_masked: bool,
        /// Changed plain attributes.
        attributes: KeyDelta,
        /// Changed style properties.
        style: KeyDelta,
    },
}

impl MutationRecord {
    /// The node the record targets (the added node, for `Add`).
    #[must_use]
    pub fn target(&self) -> NodeId {
        match self {
            Self::Add { node, .. } => node.id,
            Self::Remove { id, .. }
            | Self::TextChange { id, .. }
            | Self::AttributeChange { id, .. } => *id,
        }
    }
}

/// Record counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationCounts {
    /// `Remove` records.
    pub removes: usize,
    /// `Add` records.
    pub adds: usize,
    /// `TextChange` records.
    pub texts: usize,
    /// `AttributeChange` records.
    pub attributes: usize,
}

impl MutationCounts {
    /// Counts records by kind.
    #[must_use]
    pub fn of(records: &[MutationRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record {
                MutationRecord::Remove { .. } => counts.removes += 1,
                MutationRecord::Add { .. } => counts.adds += 1,
                MutationRecord::TextChange { .. } => counts.texts += 1,
                MutationRecord::AttributeChange { .. } => counts.attributes += 1,
            }
        }
        counts
    }

    /// Total number of records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.removes + self.adds + self.texts + self.attributes
    }
}
