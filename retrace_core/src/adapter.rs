// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Introspection adapter contract.
//!
//! Platform integrations implement [`ViewIntrospector`] to describe their
//! live view tree one handle at a time. The capturer never touches platform
//! objects; it only consumes the values returned here, which keeps the core
//! testable with an in-memory fake.
//!
//! Every fallible query returns [`IntrospectionError`]. The capturer treats a
//! failure as local to that view and substitutes an opaque placeholder.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect};

use crate::id::ViewHandle;
use crate::mask::MaskingState;
use crate::node::{PaintAttributes, Typography};

/// Coarse view classification reported by the adapter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Plain container or decoration.
    Container,
    /// Static text label.
    Text,
    /// Editable text field.
    TextInput,
    /// Image view.
    Image,
    /// A view the adapter could not classify; carries the platform class name.
    Unknown(String),
}

/// Text displayed by a view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextContent {
    /// The string as displayed.
    pub text: String,
    /// Resolved font attributes.
    pub typography: Typography,
}

/// Reference to an image already resolved by the platform layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    /// Opaque resource reference the replay player can resolve.
    pub source: String,
    /// Accessibility label, if any.
    pub label: Option<String>,
}

/// Why a view could not be described.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntrospectionError {
    /// The handle no longer refers to a live view.
    Detached,
    /// The platform call failed or returned unusable data.
    Unavailable(String),
}

impl fmt::Display for IntrospectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "view is no longer attached"),
            Self::Unavailable(reason) => write!(f, "view introspection failed: {reason}"),
        }
    }
}

impl core::error::Error for IntrospectionError {}

/// Describes platform views to the capturer.
///
/// `frame` and `clip` are expressed in the parent's content space. The
/// view's `transform` maps its own content space (where its children's
/// frames live) into the parent's content space. The capturer composes
/// transforms from the root down to place every frame in world space.
pub trait ViewIntrospector {
    /// Classifies the view.
    fn kind(&self, view: ViewHandle) -> Result<ViewKind, IntrospectionError>;

    /// Local frame.
    fn frame(&self, view: ViewHandle) -> Result<Rect, IntrospectionError>;

    /// Local transform applied on top of the parent's accumulated transform.
    fn transform(&self, view: ViewHandle) -> Affine {
        _ = view;
        Affine::IDENTITY
    }

    /// Local clip applied to descendants, or `None` when the view does not
    /// clip.
    fn clip(&self, view: ViewHandle) -> Result<Option<Rect>, IntrospectionError>;

    /// Paint attributes.
    fn paint(&self, view: ViewHandle) -> Result<PaintAttributes, IntrospectionError>;

    /// Text content, for text and text-input views.
    fn text(&self, view: ViewHandle) -> Result<Option<TextContent>, IntrospectionError>;

    /// Image reference, for image views.
    fn image(&self, view: ViewHandle) -> Result<Option<ImageDescriptor>, IntrospectionError>;

    /// Children in paint order (back to front).
    fn children(&self, view: ViewHandle) -> Vec<ViewHandle>;

    /// Masking declared on the view itself.
    fn declared_masking(&self, view: ViewHandle) -> Option<MaskingState>;

    /// Extra attributes to carry on the element (e.g. an accessibility id or
    /// an inline `style` string).
    fn attributes(&self, view: ViewHandle) -> Vec<(String, String)> {
        _ = view;
        Vec::new()
    }
}
