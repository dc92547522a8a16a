// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference replayer.
//!
//! [`Document`] mirrors what a replay player reconstructs from a snapshot:
//! node kinds, attributes, style, text, masking and child order. Geometry
//! only survives through the derived style. Applying a diff to the mirror of
//! the previous tree must yield the mirror of the current tree; the diff
//! tests rely on this.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::id::NodeId;
use crate::mutation::MutationRecord;
use crate::node::{CaptureNode, NodeKind, apply_key_delta};

/// Why a record could not be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// The record names a node that is not in the document.
    UnknownNode(NodeId),
    /// `next_sibling_id` is not a child of the named parent.
    UnknownSibling(NodeId),
    /// An added subtree contains an id already present.
    DuplicateNode(NodeId),
    /// A `TextChange` targets a non-text node.
    NotText(NodeId),
    /// An `AttributeChange` targets a non-element node.
    NotElement(NodeId),
    /// The record tries to remove the root or a node from the wrong parent.
    InvalidRemove(NodeId),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::UnknownSibling(id) => write!(f, "unknown next sibling {id}"),
            Self::DuplicateNode(id) => write!(f, "node {id} already exists"),
            Self::NotText(id) => write!(f, "node {id} is not a text node"),
            Self::NotElement(id) => write!(f, "node {id} is not an element"),
            Self::InvalidRemove(id) => write!(f, "cannot remove node {id}"),
        }
    }
}

impl core::error::Error for ReplayError {}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    kind: NodeKind,
    is_masked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Flat mirror of a replayed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: NodeId,
    nodes: BTreeMap<NodeId, Entry>,
}

impl Document {
    /// Builds the mirror of a captured tree.
    #[must_use]
    pub fn from_tree(tree: &CaptureNode) -> Self {
        let mut doc = Self {
            root: tree.id,
            nodes: BTreeMap::new(),
        };
        // Trees from the capturer have unique ids.
        _ = doc.insert(tree, None);
        doc
    }

    /// Root id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document is empty (never true for a built mirror).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Children of `id`, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&id).map(|e| e.children.as_slice())
    }

    /// Kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&id).map(|e| &e.kind)
    }

    /// Applies records in order.
    ///
    /// # Errors
    ///
    /// Stops at the first record that does not fit the document. Records
    /// before it stay applied.
    pub fn apply(&mut self, records: &[MutationRecord]) -> Result<(), ReplayError> {
        for record in records {
            self.apply_one(record)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, record: &MutationRecord) -> Result<(), ReplayError> {
        match record {
            MutationRecord::Add {
                parent_id,
                next_sibling_id,
                node,
            } => {
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or(ReplayError::UnknownNode(*parent_id))?;
                let index = match next_sibling_id {
                    Some(sibling) => parent
                        .children
                        .iter()
                        .position(|c| c == sibling)
                        .ok_or(ReplayError::UnknownSibling(*sibling))?,
                    None => parent.children.len(),
                };
                if let Some(dup) = node.descendants().find(|n| self.contains(n.id)) {
                    return Err(ReplayError::DuplicateNode(dup.id));
                }
                self.insert(node, Some(*parent_id))?;
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children.insert(index, node.id);
                }
            }
            MutationRecord::Remove { parent_id, id } => {
                let entry = self.nodes.get(id).ok_or(ReplayError::UnknownNode(*id))?;
                if entry.parent != Some(*parent_id) {
                    return Err(ReplayError::InvalidRemove(*id));
                }
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children.retain(|c| c != id);
                }
                self.drop_subtree(*id);
            }
            MutationRecord::TextChange {
                id,
                text,
                is_masked,
            } => {
                let entry = self.nodes.get_mut(id).ok_or(ReplayError::UnknownNode(*id))?;
                let NodeKind::Text { content, .. } = &mut entry.kind else {
                    return Err(ReplayError::NotText(*id));
                };
                content.clone_from(text);
                entry.is_masked = *is_masked;
            }
            MutationRecord::AttributeChange {
                id,
                is_masked,
                attributes,
                style,
            } => {
                let entry = self.nodes.get_mut(id).ok_or(ReplayError::UnknownNode(*id))?;
                let NodeKind::Element(element) = &mut entry.kind else {
                    return Err(ReplayError::NotElement(*id));
                };
                apply_key_delta(&mut element.attributes, attributes);
                apply_key_delta(element.style.as_map_mut(), style);
                entry.is_masked = *is_masked;
            }
        }
        Ok(())
    }

    fn insert(&mut self, node: &CaptureNode, parent: Option<NodeId>) -> Result<(), ReplayError> {
        if self.contains(node.id) {
            return Err(ReplayError::DuplicateNode(node.id));
        }
        self.nodes.insert(
            node.id,
            Entry {
                kind: node.kind.clone(),
                is_masked: node.is_masked,
                parent,
                children: node.children.iter().map(|c| c.id).collect(),
            },
        );
        for child in &node.children {
            self.insert(child, Some(node.id))?;
        }
        Ok(())
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&next) {
                stack.extend(entry.children);
            }
        }
    }
}
