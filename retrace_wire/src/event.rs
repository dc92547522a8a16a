// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay-event wire model.
//!
//! Every event is `{type, data, timestamp}` with an integer type tag:
//!
//! | type | event         | data                                                  |
//! |------|---------------|-------------------------------------------------------|
//! | 2    | full snapshot | `{node, initialOffset: {top, left}}`                  |
//! | 3    | incremental   | `{source, ...}`; source 0 mutation, 2 mouse, 6 touch  |
//! | 4    | meta          | `{href, width, height}`                               |
//!
//! The structs here only describe the JSON shape; building them from
//! captured trees is the job of [`DocumentEncoder`](crate::DocumentEncoder).

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Integer event type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Full document snapshot.
    FullSnapshot,
    /// Incremental change (mutation or interaction).
    Incremental,
    /// Viewport description.
    Meta,
}

impl EventType {
    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::FullSnapshot => 2,
            Self::Incremental => 3,
            Self::Meta => 4,
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// One replay event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    /// Type tag.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Payload.
    pub data: EventData,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Event {
    /// Serializes the event as compact JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures; the wire model itself never produces
    /// one.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the event as a JSON value.
    ///
    /// # Errors
    ///
    /// See [`to_json`](Self::to_json).
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    /// Type 2.
    FullSnapshot(FullSnapshotData),
    /// Type 3.
    Incremental(IncrementalData),
    /// Type 4.
    Meta(MetaData),
}

/// Full snapshot payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSnapshotData {
    /// The serialized document.
    pub node: SerializedNode,
    /// Scroll offset of the document at snapshot time.
    pub initial_offset: Offset,
}

/// Scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Offset {
    /// Vertical offset.
    pub top: f64,
    /// Horizontal offset.
    pub left: f64,
}

/// Meta payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetaData {
    /// Location of the captured screen.
    pub href: String,
    /// Viewport width.
    pub width: u32,
    /// Viewport height.
    pub height: u32,
}

/// Node type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// The document root.
    Document,
    /// An element.
    Element,
    /// A text node.
    Text,
}

impl NodeType {
    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Document => 0,
            Self::Element => 2,
            Self::Text => 3,
        }
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A serialized node and its subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    /// Node type code.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Wire id. Synthetic wrappers use ids above `u32::MAX`.
    pub id: u64,
    /// Tag name, for elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Attributes, for elements. `style` is a `k: v;` list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    /// Content, for text nodes (redacted when masked).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Whether a text node holds style sheet source.
    #[serde(skip_serializing_if = "is_false")]
    pub is_style: bool,
    /// Children, for documents and elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_nodes: Option<Vec<SerializedNode>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Incremental payload; the `source` field discriminates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IncrementalData {
    /// Source 0.
    Mutation(MutationData),
    /// Source 2.
    MouseInteraction(MouseInteractionData),
    /// Source 6.
    TouchMove(TouchMoveData),
}

/// Incremental source code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncrementalSource {
    /// DOM mutation.
    Mutation,
    /// Pointer press, release or click.
    MouseInteraction,
    /// Touch movement.
    TouchMove,
}

impl IncrementalSource {
    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Mutation => 0,
            Self::MouseInteraction => 2,
            Self::TouchMove => 6,
        }
    }
}

impl Serialize for IncrementalSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Mutation payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MutationData {
    /// Always [`IncrementalSource::Mutation`].
    pub source: IncrementalSource,
    /// Nodes added, in application order.
    pub adds: Vec<AddedNode>,
    /// Nodes removed.
    pub removes: Vec<RemovedNode>,
    /// Text changes.
    pub texts: Vec<TextMutation>,
    /// Attribute changes.
    pub attributes: Vec<AttributeMutation>,
}

impl MutationData {
    /// Whether the payload carries no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty()
            && self.removes.is_empty()
            && self.texts.is_empty()
            && self.attributes.is_empty()
    }
}

/// An added subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedNode {
    /// Parent wire id.
    pub parent_id: u64,
    /// Following sibling, or `null` to append.
    pub next_id: Option<u64>,
    /// The subtree.
    pub node: SerializedNode,
}

/// A removed node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedNode {
    /// Parent wire id.
    pub parent_id: u64,
    /// Removed wire id.
    pub id: u64,
}

/// A text content change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextMutation {
    /// Text node wire id.
    pub id: u64,
    /// New content (redacted when masked).
    pub value: String,
}

/// Changed attributes of one element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeMutation {
    /// Element wire id.
    pub id: u64,
    /// Changed keys; `null` removes a key. `style` maps to an object of
    /// changed properties.
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Value of one changed attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// New value, or `None` when removed.
    Text(Option<String>),
    /// Changed style properties; `None` removes a property.
    Style(BTreeMap<String, Option<String>>),
}

/// Pointer interaction kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button or finger released.
    MouseUp,
    /// Button or finger pressed.
    MouseDown,
    /// Tap or click.
    Click,
    /// Secondary click or long press.
    ContextMenu,
    /// Double click or double tap.
    DoubleClick,
    /// Focus gained.
    Focus,
    /// Focus lost.
    Blur,
    /// Touch began.
    TouchStart,
    /// Touch ended.
    TouchEnd,
}

impl PointerKind {
    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::MouseUp => 0,
            Self::MouseDown => 1,
            Self::Click => 2,
            Self::ContextMenu => 3,
            Self::DoubleClick => 4,
            Self::Focus => 5,
            Self::Blur => 6,
            Self::TouchStart => 7,
            Self::TouchEnd => 9,
        }
    }
}

impl Serialize for PointerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Mouse interaction payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MouseInteractionData {
    /// Always [`IncrementalSource::MouseInteraction`].
    pub source: IncrementalSource,
    /// Interaction kind.
    #[serde(rename = "type")]
    pub kind: PointerKind,
    /// Target node wire id.
    pub id: u64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

/// Touch move payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchMoveData {
    /// Always [`IncrementalSource::TouchMove`].
    pub source: IncrementalSource,
    /// Sampled positions.
    pub positions: Vec<TouchPosition>,
}

/// One sampled touch position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPosition {
    /// Node under the touch.
    pub id: u64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Milliseconds relative to the event timestamp (usually negative).
    pub time_offset: i64,
}
