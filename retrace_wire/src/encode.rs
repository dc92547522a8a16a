// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document encoder.
//!
//! Turns captured trees and mutation records into wire [`Event`]s. Masking
//! is applied here: trees and records carry unredacted content plus the
//! resolved `is_masked` flag, and the encoder decides what leaves the
//! process.

use std::collections::BTreeMap;

use kurbo::Point;
use retrace_core::id::NodeId;
use retrace_core::mutation::MutationRecord;
use retrace_core::node::{CaptureNode, KeyDelta, NodeKind, TRUNCATED_ATTRIBUTE};
use retrace_core::time::Timestamp;

use crate::event::{
    AddedNode, AttributeMutation, AttributeValue, Event, EventData, EventType, FullSnapshotData,
    IncrementalData, IncrementalSource, MetaData, MouseInteractionData, MutationData, NodeType,
    Offset, PointerKind, RemovedNode, SerializedNode, TextMutation, TouchMoveData, TouchPosition,
};

/// First id of the synthetic range; registry ids never reach it.
pub const SYNTHETIC_ID_BASE: u64 = 1 << 32;

/// Wire id of the synthetic element that wraps a bare document-level text
/// node.
#[must_use]
pub const fn synthetic_wrapper_id(text: NodeId) -> u64 {
    SYNTHETIC_ID_BASE | text.get() as u64
}

/// Wire id of a captured node.
#[must_use]
pub fn wire_id(id: NodeId) -> u64 {
    u64::from(id.get())
}

/// What happens to the `src` of a masked image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageMasking {
    /// Replace the source with this reference.
    Placeholder(String),
    /// Drop the source attribute.
    Omit,
}

impl Default for ImageMasking {
    fn default() -> Self {
        Self::Placeholder("retrace:masked-image".into())
    }
}

/// Encoder configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Character repeated in place of masked text.
    pub redaction_char: char,
    /// Treatment of masked image sources.
    pub image_masking: ImageMasking,
    /// Deepest serialized level (document = 0). Children below it are
    /// dropped and their parent is marked with [`TRUNCATED_ATTRIBUTE`].
    pub max_depth: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            redaction_char: '*',
            image_masking: ImageMasking::default(),
            max_depth: 256,
        }
    }
}

/// A touch sample for [`DocumentEncoder::encode_touch_move`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSample {
    /// Node under the touch.
    pub target: NodeId,
    /// Position in world space.
    pub position: Point,
    /// When the sample was taken.
    pub at: Timestamp,
}

/// Builds wire events from captured data.
///
/// Holds configuration only. Encoding never fails: nodes that do not fit
/// the wire model become minimal `div` elements.
#[derive(Clone, Debug, Default)]
pub struct DocumentEncoder {
    config: EncoderConfig,
}

impl DocumentEncoder {
    /// Creates an encoder.
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes a full snapshot (type 2).
    #[must_use]
    pub fn encode_full_snapshot(&self, tree: &CaptureNode, timestamp: Timestamp) -> Event {
        Event {
            event_type: EventType::FullSnapshot,
            data: EventData::FullSnapshot(FullSnapshotData {
                node: self.serialize_tree(tree),
                initial_offset: Offset::default(),
            }),
            timestamp: timestamp.millis(),
        }
    }

    /// Encodes mutation records as one incremental event (type 3, source 0).
    ///
    /// Record order is preserved within each list.
    #[must_use]
    pub fn encode_incremental(&self, mutations: &[MutationRecord], timestamp: Timestamp) -> Event {
        let mut data = MutationData {
            source: IncrementalSource::Mutation,
            adds: Vec::new(),
            removes: Vec::new(),
            texts: Vec::new(),
            attributes: Vec::new(),
        };
        for record in mutations {
            match record {
                MutationRecord::Add {
                    parent_id,
                    next_sibling_id,
                    node,
                } => data.adds.push(AddedNode {
                    parent_id: wire_id(*parent_id),
                    next_id: next_sibling_id.map(wire_id),
                    node: self.serialize(node, 0),
                }),
                MutationRecord::Remove { parent_id, id } => data.removes.push(RemovedNode {
                    parent_id: wire_id(*parent_id),
                    id: wire_id(*id),
                }),
                MutationRecord::TextChange {
                    id,
                    text,
                    is_masked,
                } => data.texts.push(TextMutation {
                    id: wire_id(*id),
                    value: if *is_masked {
                        self.redact(text)
                    } else {
                        text.clone()
                    },
                }),
                MutationRecord::AttributeChange {
                    id,
                    is_masked,
                    attributes,
                    style,
                } => {
                    let attributes = self.attribute_delta(attributes, style, *is_masked);
                    if !attributes.is_empty() {
                        data.attributes.push(AttributeMutation {
                            id: wire_id(*id),
                            attributes,
                        });
                    }
                }
            }
        }
        incremental(IncrementalData::Mutation(data), timestamp)
    }

    /// Encodes a meta event (type 4).
    #[must_use]
    pub fn encode_meta(&self, href: &str, width: u32, height: u32, timestamp: Timestamp) -> Event {
        Event {
            event_type: EventType::Meta,
            data: EventData::Meta(MetaData {
                href: href.into(),
                width,
                height,
            }),
            timestamp: timestamp.millis(),
        }
    }

    /// Encodes a pointer interaction (type 3, source 2).
    #[must_use]
    pub fn encode_mouse_interaction(
        &self,
        kind: PointerKind,
        target: NodeId,
        position: Point,
        timestamp: Timestamp,
    ) -> Event {
        incremental(
            IncrementalData::MouseInteraction(MouseInteractionData {
                source: IncrementalSource::MouseInteraction,
                kind,
                id: wire_id(target),
                x: position.x,
                y: position.y,
            }),
            timestamp,
        )
    }

    /// Encodes touch movement (type 3, source 6).
    ///
    /// Sample times become offsets relative to `timestamp`.
    #[must_use]
    pub fn encode_touch_move(&self, samples: &[TouchSample], timestamp: Timestamp) -> Event {
        let positions = samples
            .iter()
            .map(|s| TouchPosition {
                id: wire_id(s.target),
                x: s.position.x,
                y: s.position.y,
                time_offset: offset_millis(s.at, timestamp),
            })
            .collect();
        incremental(
            IncrementalData::TouchMove(TouchMoveData {
                source: IncrementalSource::TouchMove,
                positions,
            }),
            timestamp,
        )
    }

    /// Serializes a whole tree, rooted at depth 0.
    ///
    /// Text directly under the document is wrapped in a synthetic `div`
    /// (see [`synthetic_wrapper_id`]).
    #[must_use]
    pub fn serialize_tree(&self, tree: &CaptureNode) -> SerializedNode {
        if !matches!(tree.kind, NodeKind::Document) {
            return self.serialize(tree, 0);
        }
        let (children, _) = self.children(tree, 0, true);
        SerializedNode {
            node_type: NodeType::Document,
            id: wire_id(tree.id),
            tag_name: None,
            attributes: None,
            text_content: None,
            is_style: false,
            child_nodes: Some(children),
        }
    }

    /// Replaces every character of `text` with the redaction character.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        std::iter::repeat_n(self.config.redaction_char, text.chars().count()).collect()
    }

    fn serialize(&self, node: &CaptureNode, depth: u32) -> SerializedNode {
        let (tag, mut attributes) = match &node.kind {
            NodeKind::Text { content, is_style } => {
                return SerializedNode {
                    node_type: NodeType::Text,
                    id: wire_id(node.id),
                    tag_name: None,
                    attributes: None,
                    text_content: Some(if node.is_masked {
                        self.redact(content)
                    } else {
                        content.clone()
                    }),
                    is_style: *is_style,
                    child_nodes: None,
                };
            }
            NodeKind::Element(element) => {
                let mut attributes = element.attributes.clone();
                if node.is_masked {
                    self.mask_attributes(&mut attributes);
                }
                if !element.style.is_empty() {
                    attributes.insert("style".into(), element.style.to_css_text());
                }
                (element.tag.as_str(), attributes)
            }
            // A nested document has no wire form; keep its subtree under a
            // plain element.
            NodeKind::Document => ("div", BTreeMap::new()),
        };
        let (children, truncated) = self.children(node, depth, false);
        if truncated {
            attributes.insert(TRUNCATED_ATTRIBUTE.into(), "true".into());
        }
        SerializedNode {
            node_type: NodeType::Element,
            id: wire_id(node.id),
            tag_name: Some(tag.into()),
            attributes: Some(attributes),
            text_content: None,
            is_style: false,
            child_nodes: Some(children),
        }
    }

    /// Serializes children one level below `depth`; the flag reports
    /// children dropped by the depth ceiling.
    fn children(
        &self,
        node: &CaptureNode,
        depth: u32,
        wrap_text: bool,
    ) -> (Vec<SerializedNode>, bool) {
        if depth >= self.config.max_depth {
            return (Vec::new(), !node.children.is_empty());
        }
        let children = node
            .children
            .iter()
            .map(|child| match child.kind {
                NodeKind::Text { .. } if wrap_text => SerializedNode {
                    node_type: NodeType::Element,
                    id: synthetic_wrapper_id(child.id),
                    tag_name: Some("div".into()),
                    attributes: Some(BTreeMap::new()),
                    text_content: None,
                    is_style: false,
                    child_nodes: Some(vec![self.serialize(child, depth + 2)]),
                },
                _ => self.serialize(child, depth + 1),
            })
            .collect();
        (children, false)
    }

    fn mask_attributes(&self, attributes: &mut BTreeMap<String, String>) {
        for (name, value) in attributes.iter_mut() {
            if is_sensitive(name) {
                *value = self.redact(value);
            }
        }
        if attributes.contains_key("src") {
            match &self.config.image_masking {
                ImageMasking::Placeholder(reference) => {
                    attributes.insert("src".into(), reference.clone());
                }
                ImageMasking::Omit => {
                    attributes.remove("src");
                }
            }
        }
    }

    fn attribute_delta(
        &self,
        attributes: &KeyDelta,
        style: &KeyDelta,
        is_masked: bool,
    ) -> BTreeMap<String, AttributeValue> {
        let mut out = BTreeMap::new();
        for (name, value) in attributes {
            let value = match value {
                Some(v) if is_masked && is_sensitive(name) => Some(self.redact(v)),
                Some(_) if is_masked && name == "src" => match &self.config.image_masking {
                    ImageMasking::Placeholder(reference) => Some(reference.clone()),
                    ImageMasking::Omit => None,
                },
                other => other.clone(),
            };
            out.insert(name.clone(), AttributeValue::Text(value));
        }
        if !style.is_empty() {
            out.insert("style".into(), AttributeValue::Style(style.clone()));
        }
        out
    }
}

/// Attributes whose values are user content.
fn is_sensitive(name: &str) -> bool {
    matches!(name, "value" | "alt" | "placeholder")
}

fn incremental(data: IncrementalData, timestamp: Timestamp) -> Event {
    Event {
        event_type: EventType::Incremental,
        data: EventData::Incremental(data),
        timestamp: timestamp.millis(),
    }
}

fn offset_millis(at: Timestamp, base: Timestamp) -> i64 {
    let (a, b) = (i128::from(at.millis()), i128::from(base.millis()));
    i64::try_from(a - b).unwrap_or(if a < b { i64::MIN } else { i64::MAX })
}
