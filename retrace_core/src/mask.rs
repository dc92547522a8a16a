// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Masking policy resolution.
//!
//! Views may carry a declared [`MaskingState`]. Resolution is a pure function
//! of the root-to-node path: the nearest declaration (the node itself first)
//! that reaches a decision wins. A [`MaskingState::Custom`] identifier decides
//! only if the [`MaskRules`] table has an entry for it; otherwise the walk
//! continues towards the root. When no declaration decides, the default for
//! the node's [`ContentKind`] applies.
//!
//! Siblings never influence each other and nothing is cached: declarations
//! can change between ticks, so every capture resolves afresh.

use alloc::collections::BTreeMap;
use alloc::string::String;

/// A masking declaration attached to a view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaskingState {
    /// Redact this view and, unless overridden, its descendants.
    Masked,
    /// Show this view and, unless overridden, its descendants.
    Unmasked,
    /// Defer to the rule registered for this identifier.
    Custom(String),
}

/// What a node displays, for picking the fallback default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Static text.
    Text,
    /// Editable text.
    Input,
    /// Bitmap or vector image.
    Image,
    /// Anything else (containers, opaque placeholders).
    Container,
}

/// Per-content defaults used when no declaration decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaskDefaults {
    /// Mask static text.
    pub text: bool,
    /// Mask editable text.
    pub input: bool,
    /// Mask images.
    pub image: bool,
    /// Mask containers.
    pub container: bool,
}

impl MaskDefaults {
    /// Returns the default for `kind`.
    #[must_use]
    pub const fn for_kind(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => self.text,
            ContentKind::Input => self.input,
            ContentKind::Image => self.image,
            ContentKind::Container => self.container,
        }
    }
}

impl Default for MaskDefaults {
    /// Masks user input only.
    fn default() -> Self {
        Self {
            text: false,
            input: true,
            image: false,
            container: false,
        }
    }
}

/// Rule table handed in by the configuration layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskRules {
    /// Decisions for [`MaskingState::Custom`] identifiers.
    pub custom: BTreeMap<String, bool>,
    /// Fallbacks when no declaration on the path decides.
    pub defaults: MaskDefaults,
}

impl MaskRules {
    /// Masks all text, input and image content by default.
    #[must_use]
    pub fn mask_all() -> Self {
        Self {
            custom: BTreeMap::new(),
            defaults: MaskDefaults {
                text: true,
                input: true,
                image: true,
                container: false,
            },
        }
    }

    /// Masks nothing by default.
    #[must_use]
    pub fn mask_nothing() -> Self {
        Self {
            custom: BTreeMap::new(),
            defaults: MaskDefaults {
                text: false,
                input: false,
                image: false,
                container: false,
            },
        }
    }

    /// Adds or replaces the decision for a custom identifier.
    #[must_use]
    pub fn with_rule(mut self, identifier: impl Into<String>, masked: bool) -> Self {
        self.custom.insert(identifier.into(), masked);
        self
    }
}

/// Resolves effective masking from a declaration chain.
#[derive(Clone, Debug, Default)]
pub struct MaskPolicyResolver {
    rules: MaskRules,
}

impl MaskPolicyResolver {
    /// Creates a resolver over the given rules.
    #[must_use]
    pub fn new(rules: MaskRules) -> Self {
        Self { rules }
    }

    /// Returns the rule table.
    #[must_use]
    pub fn rules(&self) -> &MaskRules {
        &self.rules
    }

    /// Decision of a single declaration, if it makes one.
    #[must_use]
    pub fn decide(&self, state: &MaskingState) -> Option<bool> {
        match state {
            MaskingState::Masked => Some(true),
            MaskingState::Unmasked => Some(false),
            MaskingState::Custom(identifier) => self.rules.custom.get(identifier).copied(),
        }
    }

    /// Resolves whether a node is masked.
    ///
    /// `chain` yields the declared states from the node itself towards the
    /// root, skipping undeclared views.
    pub fn resolve<'a, I>(&self, content: ContentKind, chain: I) -> bool
    where
        I: IntoIterator<Item = &'a MaskingState>,
    {
        chain
            .into_iter()
            .find_map(|state| self.decide(state))
            .unwrap_or_else(|| self.rules.defaults.for_kind(content))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn custom(id: &str) -> MaskingState {
        MaskingState::Custom(id.into())
    }

    #[test]
    fn custom_rule_overrides_masked_ancestor() {
        let resolver = MaskPolicyResolver::new(MaskRules::mask_nothing().with_rule("x", false));
        let chain = [custom("x"), MaskingState::Masked];
        assert!(!resolver.resolve(ContentKind::Text, &chain));
    }

    #[test]
    fn missing_custom_rule_falls_through_to_ancestor() {
        let resolver = MaskPolicyResolver::new(MaskRules::mask_nothing());
        let chain = [custom("x"), MaskingState::Masked];
        assert!(resolver.resolve(ContentKind::Text, &chain));
    }

    #[test]
    fn nearest_declaration_wins_regardless_of_depth() {
        let resolver = MaskPolicyResolver::new(MaskRules::mask_all());
        let chain = vec![
            MaskingState::Unmasked,
            MaskingState::Masked,
            MaskingState::Masked,
            MaskingState::Masked,
        ];
        assert!(!resolver.resolve(ContentKind::Text, &chain));
    }

    #[test]
    fn empty_chain_uses_content_default() {
        let resolver = MaskPolicyResolver::new(MaskRules::default());
        let none: [MaskingState; 0] = [];
        assert!(!resolver.resolve(ContentKind::Text, &none));
        assert!(resolver.resolve(ContentKind::Input, &none));
        assert!(!resolver.resolve(ContentKind::Image, &none));
        assert!(!resolver.resolve(ContentKind::Container, &none));
    }

    #[test]
    fn unresolved_custom_chain_uses_default() {
        let resolver = MaskPolicyResolver::new(MaskRules::mask_all());
        let chain = [custom("a"), custom("b")];
        assert!(resolver.resolve(ContentKind::Image, &chain));
    }

    #[test]
    fn custom_rule_can_mask_under_unmasked_ancestor() {
        let resolver = MaskPolicyResolver::new(MaskRules::mask_nothing().with_rule("pii", true));
        let chain = [custom("pii"), MaskingState::Unmasked];
        assert!(resolver.resolve(ContentKind::Container, &chain));
    }
}
