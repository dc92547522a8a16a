// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and view identity types.

use core::fmt;

/// Identity of a node in a captured document tree.
///
/// Ids are handed out by the [`IdentityRegistry`](crate::identity::IdentityRegistry)
/// from a monotonic counter starting at 1. Within one session an id is never
/// reassigned to a different view, even after the original view disappears.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An opaque reference to a live platform view.
///
/// Handles are created by the introspection adapter (e.g. from a pointer or
/// an accessibility element id). Core code compares and orders them but never
/// interprets the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewHandle(pub u64);

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewHandle({:#x})", self.0)
    }
}

/// Which document node a view handle stands for.
///
/// A single platform view can produce more than one document node: a text
/// view becomes an element wrapper plus a text child, and the root view also
/// anchors the document node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRole {
    /// The document root anchored at the captured root view.
    Document,
    /// The element node describing the view itself.
    View,
    /// The text child holding the view's text content.
    TextContent,
}

/// Key under which the registry stores an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    /// The originating view.
    pub handle: ViewHandle,
    /// The node role within that view.
    pub role: NodeRole,
}

impl IdentityKey {
    /// Key for the element node of `handle`.
    #[inline]
    #[must_use]
    pub const fn view(handle: ViewHandle) -> Self {
        Self {
            handle,
            role: NodeRole::View,
        }
    }

    /// Key for the text child of `handle`.
    #[inline]
    #[must_use]
    pub const fn text(handle: ViewHandle) -> Self {
        Self {
            handle,
            role: NodeRole::TextContent,
        }
    }

    /// Key for the document node anchored at `handle`.
    #[inline]
    #[must_use]
    pub const fn document(handle: ViewHandle) -> Self {
        Self {
            handle,
            role: NodeRole::Document,
        }
    }
}
