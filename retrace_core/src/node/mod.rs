// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized document tree for one capture tick.
//!
//! A [`CaptureNode`] tree is a plain owned value: it holds no references back
//! into the live UI, is never mutated after capture, and can be handed to
//! another thread for diffing and encoding.
//!
//! Each node has:
//!
//! - An identity ([`NodeId`]) from the
//!   [`IdentityRegistry`](crate::identity::IdentityRegistry).
//! - A [`NodeKind`]: the document root, an element (tag, attributes, style),
//!   or a text run.
//! - World-space `frame` and `clip` rects and the view's [`PaintAttributes`].
//! - The resolved masking flag.
//! - Children in paint order.

mod paint;
mod style;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

pub use paint::{Color, PaintAttributes, TextAlign, Typography};
pub use style::{StyleMap, derive_style, px};

use crate::id::NodeId;

/// Marker attribute set on nodes where capture or encoding stopped early.
pub const TRUNCATED_ATTRIBUTE: &str = "data-rt-truncated";

/// Plain (non-style) element attributes.
pub type Attributes = BTreeMap<String, String>;

/// Per-key changes between two string maps; `None` means the key was removed.
pub type KeyDelta = BTreeMap<String, Option<String>>;

/// Element tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Generic container, text wrapper or opaque placeholder.
    Div,
    /// Image.
    Img,
    /// Editable text field.
    Input,
}

impl Tag {
    /// Lowercase tag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Img => "img",
            Self::Input => "input",
        }
    }
}

/// Element payload of a [`NodeKind::Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Tag.
    pub tag: Tag,
    /// Attributes other than `style`.
    pub attributes: Attributes,
    /// Style properties.
    pub style: StyleMap,
}

impl Element {
    /// Creates an element with no attributes.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Attributes::new(),
            style: StyleMap::new(),
        }
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// An element.
    Element(Element),
    /// A run of text.
    Text {
        /// Unredacted content. Redaction happens at encoding time.
        content: String,
        /// Whether the text is style sheet source rather than visible text.
        is_style: bool,
    },
}

impl NodeKind {
    /// Whether both kinds are the same variant (and tag, for elements).
    ///
    /// Nodes that keep their id but change shape are replaced rather than
    /// patched.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Document, Self::Document) => true,
            (Self::Element(a), Self::Element(b)) => a.tag == b.tag,
            (Self::Text { is_style: a, .. }, Self::Text { is_style: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// One node of the captured document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureNode {
    /// Stable identity.
    pub id: NodeId,
    /// Kind and kind-specific payload.
    pub kind: NodeKind,
    /// World-space frame.
    pub frame: Rect,
    /// Intersection of all ancestor clips, in world space.
    pub clip: Rect,
    /// Paint attributes.
    pub paint: PaintAttributes,
    /// Resolved masking.
    pub is_masked: bool,
    /// Children in paint order.
    pub children: Vec<CaptureNode>,
}

impl CaptureNode {
    /// Creates a node with zero geometry, default paint and no children.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            frame: Rect::ZERO,
            clip: Rect::ZERO,
            paint: PaintAttributes::default(),
            is_masked: false,
            children: Vec::new(),
        }
    }

    /// Creates a document node.
    #[must_use]
    pub fn document(id: u32) -> Self {
        Self::new(NodeId(id), NodeKind::Document)
    }

    /// Creates an element node.
    #[must_use]
    pub fn element(id: u32, tag: Tag) -> Self {
        Self::new(NodeId(id), NodeKind::Element(Element::new(tag)))
    }

    /// Creates a visible text node.
    #[must_use]
    pub fn text(id: u32, content: impl Into<String>) -> Self {
        Self::new(
            NodeId(id),
            NodeKind::Text {
                content: content.into(),
                is_style: false,
            },
        )
    }

    /// Appends a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets an attribute. No effect on non-element nodes.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeKind::Element(el) = &mut self.kind {
            el.attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Sets a style property. No effect on non-element nodes.
    #[must_use]
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeKind::Element(el) = &mut self.kind {
            el.style.insert(name, value);
        }
        self
    }

    /// Sets the masking flag.
    #[must_use]
    pub fn with_masked(mut self, masked: bool) -> Self {
        self.is_masked = masked;
        self
    }

    /// Returns the element payload, if this is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the text content, if this is a text node.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Whether this node carries the truncation marker.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.as_element()
            .is_some_and(|el| el.attributes.contains_key(TRUNCATED_ATTRIBUTE))
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first pre-order iterator over this subtree.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: alloc::vec![self],
        }
    }

    /// Finds a node by id in this subtree.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Self> {
        self.descendants().find(|n| n.id == id)
    }
}

/// Pre-order iterator created by [`CaptureNode::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a CaptureNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a CaptureNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Computes per-key changes that turn `old` into `new`.
#[must_use]
pub fn key_delta(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>) -> KeyDelta {
    let mut delta = KeyDelta::new();
    for (key, value) in new {
        if old.get(key) != Some(value) {
            delta.insert(key.clone(), Some(value.clone()));
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            delta.insert(key.clone(), None);
        }
    }
    delta
}

/// Applies a [`KeyDelta`] in place.
pub fn apply_key_delta(map: &mut BTreeMap<String, String>, delta: &KeyDelta) {
    for (key, value) in delta {
        match value {
            Some(v) => {
                map.insert(key.clone(), v.clone());
            }
            None => {
                map.remove(key);
            }
        }
    }
}
