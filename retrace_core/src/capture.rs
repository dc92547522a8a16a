// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-tree capture.
//!
//! [`TreeCapturer::capture`] walks the live view tree depth-first through a
//! [`ViewIntrospector`] and produces one [`CaptureNode`] tree per tick:
//!
//! ```text
//!   registry.begin_tick()
//!   document ── root view ── children in paint order ...
//!   registry.end_tick()       (ids of vanished views are retired)
//! ```
//!
//! Per view the walk:
//!
//! 1. Classifies the view (container, text, text input, image, unknown).
//! 2. Maps its frame through the accumulated transform and records the
//!    running intersection of ancestor clips.
//! 3. Resolves masking from the declarations on the root-to-view path.
//! 4. Looks up (or allocates) the node id.
//! 5. Recurses into children.
//!
//! A view that cannot be described becomes an opaque `div` carrying only
//! geometry and paint; the walk continues with its siblings. Depth and node
//! ceilings ([`CaptureLimits`]) cut the walk short with a terminal node
//! marked by [`TRUNCATED_ATTRIBUTE`].

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use crate::adapter::{ViewIntrospector, ViewKind};
use crate::id::{IdentityKey, NodeId, ViewHandle};
use crate::identity::IdentityRegistry;
use crate::mask::{ContentKind, MaskPolicyResolver, MaskRules, MaskingState};
use crate::node::{
    Attributes, CaptureNode, Element, NodeKind, PaintAttributes, StyleMap, TRUNCATED_ATTRIBUTE,
    Tag, derive_style,
};
use crate::trace::{
    CaptureSummaryEvent, FailureStage, IdentitySweepEvent, IntrospectionFailureEvent, LimitKind,
    Tracer, TruncationEvent,
};

/// Ceilings that bound the cost of one capture walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureLimits {
    /// Views at this depth or deeper (root view = 1) become terminal nodes.
    pub max_depth: u32,
    /// Node budget for one tree, checked before each child view.
    ///
    /// The budget is soft. A text view admitted on the last slot still
    /// brings its text child, and each open level ends with one terminal
    /// node, so a tree can exceed it by at most its deepest level.
    pub max_nodes: u32,
}

impl CaptureLimits {
    /// No practical limit; for tests and offline tooling.
    pub const UNBOUNDED: Self = Self {
        max_depth: u32::MAX,
        max_nodes: u32::MAX,
    };
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 10_000,
        }
    }
}

/// Counters gathered during one walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Nodes in the produced tree.
    pub nodes: u32,
    /// Deepest level reached (document = 0).
    pub max_depth: u32,
    /// Views replaced by opaque placeholders.
    pub placeholders: u32,
    /// Whether a ceiling cut the walk short.
    pub truncated: bool,
}

/// Builds [`CaptureNode`] trees from an introspection adapter.
///
/// The capturer holds configuration only; all cross-tick state lives in the
/// [`IdentityRegistry`] passed to [`capture`](Self::capture).
#[derive(Clone, Debug, Default)]
pub struct TreeCapturer {
    resolver: MaskPolicyResolver,
    limits: CaptureLimits,
}

impl TreeCapturer {
    /// Creates a capturer.
    #[must_use]
    pub fn new(rules: MaskRules, limits: CaptureLimits) -> Self {
        Self {
            resolver: MaskPolicyResolver::new(rules),
            limits,
        }
    }

    /// Returns the masking resolver.
    #[must_use]
    pub fn resolver(&self) -> &MaskPolicyResolver {
        &self.resolver
    }

    /// Returns the ceilings.
    #[must_use]
    pub fn limits(&self) -> CaptureLimits {
        self.limits
    }

    /// Captures the tree rooted at `root`.
    ///
    /// Brackets the walk with [`IdentityRegistry::begin_tick`] and
    /// [`IdentityRegistry::end_tick`], so views not reached this tick lose
    /// their ids. Never fails: views that cannot be described degrade to
    /// placeholders.
    pub fn capture<A: ViewIntrospector + ?Sized>(
        &self,
        adapter: &A,
        registry: &mut IdentityRegistry,
        root: ViewHandle,
        tick_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> CaptureNode {
        self.capture_with_stats(adapter, registry, root, tick_index, tracer)
            .0
    }

    /// Like [`capture`](Self::capture), also returning the walk counters.
    pub fn capture_with_stats<A: ViewIntrospector + ?Sized>(
        &self,
        adapter: &A,
        registry: &mut IdentityRegistry,
        root: ViewHandle,
        tick_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> (CaptureNode, CaptureStats) {
        registry.begin_tick();

        let mut walk = Walk {
            capturer: self,
            adapter,
            registry,
            tracer: tracer.reborrow(),
            tick_index,
            declared: Vec::new(),
            stats: CaptureStats::default(),
        };
        let tree = walk.document(root);
        let stats = walk.stats;
        drop(walk);

        let evicted = registry.end_tick();
        tracer.identity_sweep(&IdentitySweepEvent {
            tick_index,
            live: saturate(registry.len()),
            evicted: saturate(evicted),
            next_id: registry.next_id(),
        });
        tracer.capture_summary(&CaptureSummaryEvent {
            tick_index,
            nodes: stats.nodes,
            max_depth: stats.max_depth,
            placeholders: stats.placeholders,
            truncated: stats.truncated,
        });
        (tree, stats)
    }
}

/// Geometry context inherited from the parent.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Parent content space → world.
    transform: Affine,
    /// Running intersection of ancestor clips.
    clip: Rect,
}

/// Per-walk mutable state.
struct Walk<'w, 't, A: ?Sized> {
    capturer: &'w TreeCapturer,
    adapter: &'w A,
    registry: &'w mut IdentityRegistry,
    tracer: Tracer<'t>,
    tick_index: u64,
    /// Declared masking, root first; `None` for views without a declaration.
    declared: Vec<Option<MaskingState>>,
    stats: CaptureStats,
}

impl<A: ViewIntrospector + ?Sized> Walk<'_, '_, A> {
    fn document(&mut self, root: ViewHandle) -> CaptureNode {
        let id = self.registry.id_for(IdentityKey::document(root));
        let root_frame = self
            .adapter
            .frame(root)
            .map(sanitize)
            .unwrap_or(Rect::ZERO);
        let mut doc = CaptureNode::new(id, NodeKind::Document);
        doc.frame = root_frame;
        doc.clip = root_frame;
        self.count(0);

        let ctx = Frame {
            transform: Affine::IDENTITY,
            clip: root_frame,
        };
        let child = self.visit(root, ctx, 1);
        doc.children.push(child);
        doc
    }

    fn visit(&mut self, view: ViewHandle, parent: Frame, depth: u32) -> CaptureNode {
        if depth >= self.capturer.limits.max_depth {
            return self.terminal(view, parent, depth, LimitKind::Depth);
        }
        self.count(depth);
        let id = self.registry.id_for(IdentityKey::view(view));

        let kind = match self.adapter.kind(view) {
            Ok(kind) => kind,
            Err(_) => {
                self.fail(view, FailureStage::Kind);
                return self.placeholder(view, id, parent, None);
            }
        };

        let local = self.geometry(view);
        let frame = sanitize(parent.transform.transform_rect_bbox(local));
        let paint = self.paint(view);
        let content_kind = match kind {
            ViewKind::Text => ContentKind::Text,
            ViewKind::TextInput => ContentKind::Input,
            ViewKind::Image => ContentKind::Image,
            ViewKind::Container | ViewKind::Unknown(_) => ContentKind::Container,
        };

        self.declared.push(self.adapter.declared_masking(view));
        let is_masked = self
            .capturer
            .resolver
            .resolve(content_kind, self.declared.iter().rev().flatten());

        let (mut attributes, mut style) = self.extra_attributes(view);
        let mut typography = None;
        let mut text_child = None;
        let tag = match kind {
            ViewKind::Container => Tag::Div,
            ViewKind::Unknown(_) => {
                // Opaque, but children are still walked.
                self.fail(view, FailureStage::UnknownKind);
                self.stats.placeholders += 1;
                attributes.clear();
                style = StyleMap::new();
                Tag::Div
            }
            ViewKind::Text => match self.adapter.text(view) {
                Ok(content) => {
                    let content = content.unwrap_or_default();
                    typography = Some(content.typography);
                    text_child = Some(content.text);
                    Tag::Div
                }
                Err(_) => {
                    self.fail(view, FailureStage::Content);
                    self.declared.pop();
                    return self.placeholder(view, id, parent, Some((frame, paint)));
                }
            },
            ViewKind::TextInput => match self.adapter.text(view) {
                Ok(content) => {
                    let content = content.unwrap_or_default();
                    attributes.insert("type".into(), "text".into());
                    attributes.insert("value".into(), content.text);
                    typography = Some(content.typography);
                    Tag::Input
                }
                Err(_) => {
                    self.fail(view, FailureStage::Content);
                    self.declared.pop();
                    return self.placeholder(view, id, parent, Some((frame, paint)));
                }
            },
            ViewKind::Image => match self.adapter.image(view) {
                Ok(image) => {
                    if let Some(image) = image {
                        attributes.insert("src".into(), image.source);
                        if let Some(label) = image.label {
                            attributes.insert("alt".into(), label);
                        }
                    }
                    Tag::Img
                }
                Err(_) => {
                    self.fail(view, FailureStage::Content);
                    self.declared.pop();
                    return self.placeholder(view, id, parent, Some((frame, paint)));
                }
            },
        };

        style.extend(derive_style(frame, parent.clip, &paint, typography.as_ref()));
        let mut node = CaptureNode {
            id,
            kind: NodeKind::Element(Element {
                tag,
                attributes,
                style,
            }),
            frame,
            clip: parent.clip,
            paint,
            is_masked,
            children: Vec::new(),
        };

        if let Some(text) = text_child {
            self.count(depth + 1);
            let text_id = self.registry.id_for(IdentityKey::text(view));
            let mut child = CaptureNode::new(
                text_id,
                NodeKind::Text {
                    content: text,
                    is_style: false,
                },
            );
            child.frame = frame;
            child.clip = parent.clip;
            child.is_masked = is_masked;
            node.children.push(child);
        }

        let child_ctx = Frame {
            transform: parent.transform * self.adapter.transform(view),
            clip: self.child_clip(view, parent),
        };
        self.children(view, child_ctx, depth, &mut node.children);

        self.declared.pop();
        node
    }

    fn children(&mut self, view: ViewHandle, ctx: Frame, depth: u32, out: &mut Vec<CaptureNode>) {
        for child in self.adapter.children(view) {
            if self.stats.nodes >= self.capturer.limits.max_nodes {
                out.push(self.terminal(child, ctx, depth + 1, LimitKind::NodeBudget));
                break;
            }
            out.push(self.visit(child, ctx, depth + 1));
        }
    }

    /// Opaque stand-in for a view that could not be described.
    ///
    /// `known` carries geometry and paint when they were already read.
    fn placeholder(
        &mut self,
        view: ViewHandle,
        id: NodeId,
        parent: Frame,
        known: Option<(Rect, PaintAttributes)>,
    ) -> CaptureNode {
        self.stats.placeholders += 1;
        let (frame, paint) = known.unwrap_or_else(|| {
            let local = self.geometry(view);
            (
                sanitize(parent.transform.transform_rect_bbox(local)),
                self.paint(view),
            )
        });
        let is_masked = self.resolve_with_own(view, ContentKind::Container);
        opaque_node(id, frame, parent.clip, paint, is_masked)
    }

    /// Terminal node emitted where a ceiling stops the walk.
    fn terminal(
        &mut self,
        view: ViewHandle,
        parent: Frame,
        depth: u32,
        limit: LimitKind,
    ) -> CaptureNode {
        self.count(depth);
        self.stats.truncated = true;
        self.tracer.truncation(&TruncationEvent {
            tick_index: self.tick_index,
            view,
            limit,
            depth,
        });
        let id = self.registry.id_for(IdentityKey::view(view));
        let frame = sanitize(
            parent
                .transform
                .transform_rect_bbox(self.adapter.frame(view).unwrap_or(Rect::ZERO)),
        );
        let paint = self.adapter.paint(view).unwrap_or_default();
        let is_masked = self.resolve_with_own(view, ContentKind::Container);
        opaque_node(id, frame, parent.clip, paint, is_masked)
            .with_attribute(TRUNCATED_ATTRIBUTE, "true")
    }

    fn resolve_with_own(&self, view: ViewHandle, content: ContentKind) -> bool {
        let own = self.adapter.declared_masking(view);
        let chain = own.iter().chain(self.declared.iter().rev().flatten());
        self.capturer.resolver.resolve(content, chain)
    }

    fn geometry(&mut self, view: ViewHandle) -> Rect {
        match self.adapter.frame(view) {
            Ok(rect) => rect,
            Err(_) => {
                self.fail(view, FailureStage::Geometry);
                Rect::ZERO
            }
        }
    }

    fn paint(&mut self, view: ViewHandle) -> PaintAttributes {
        match self.adapter.paint(view) {
            Ok(paint) => paint,
            Err(_) => {
                self.fail(view, FailureStage::Paint);
                PaintAttributes::default()
            }
        }
    }

    fn child_clip(&mut self, view: ViewHandle, parent: Frame) -> Rect {
        match self.adapter.clip(view) {
            Ok(Some(local)) => {
                let world = sanitize(parent.transform.transform_rect_bbox(local));
                parent.clip.intersect(world)
            }
            Ok(None) => parent.clip,
            Err(_) => {
                self.fail(view, FailureStage::Geometry);
                parent.clip
            }
        }
    }

    /// Splits adapter attributes into plain attributes and inline style.
    fn extra_attributes(&self, view: ViewHandle) -> (Attributes, StyleMap) {
        let mut attributes = Attributes::new();
        let mut style = StyleMap::new();
        for (name, value) in self.adapter.attributes(view) {
            if name == "style" {
                style.extend(StyleMap::parse(&value));
            } else if name != TRUNCATED_ATTRIBUTE {
                attributes.insert(name, value);
            }
        }
        (attributes, style)
    }

    fn fail(&mut self, view: ViewHandle, stage: FailureStage) {
        self.tracer
            .introspection_failure(&IntrospectionFailureEvent {
                tick_index: self.tick_index,
                view,
                stage,
            });
    }

    fn count(&mut self, depth: u32) {
        self.stats.nodes = self.stats.nodes.saturating_add(1);
        self.stats.max_depth = self.stats.max_depth.max(depth);
    }
}

fn opaque_node(
    id: NodeId,
    frame: Rect,
    clip: Rect,
    paint: PaintAttributes,
    is_masked: bool,
) -> CaptureNode {
    let style = derive_style(frame, clip, &paint, None);
    CaptureNode {
        id,
        kind: NodeKind::Element(Element {
            tag: Tag::Div,
            attributes: Attributes::new(),
            style,
        }),
        frame,
        clip,
        paint,
        is_masked,
        children: Vec::new(),
    }
}

/// Replaces non-finite rects with [`Rect::ZERO`] and normalizes orientation.
fn sanitize(rect: Rect) -> Rect {
    if rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite() {
        rect.abs()
    } else {
        Rect::ZERO
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "counts are capped at u32::MAX for tracing"
)]
fn saturate(n: usize) -> u32 {
    n.min(u32::MAX as usize) as u32
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{Affine, Rect};

    use super::*;
    use crate::adapter::{ImageDescriptor, IntrospectionError, TextContent};
    use crate::node::Typography;

    #[derive(Clone, Default)]
    struct MockView {
        kind: Option<ViewKind>,
        frame: Rect,
        transform: Affine,
        clip: Option<Rect>,
        text: Option<String>,
        image: Option<String>,
        children: Vec<u64>,
        mask: Option<MaskingState>,
        broken_paint: bool,
    }

    #[derive(Default)]
    struct Mock {
        views: BTreeMap<u64, MockView>,
    }

    impl Mock {
        fn add(&mut self, handle: u64, kind: ViewKind, frame: Rect) -> &mut MockView {
            self.views.entry(handle).or_default();
            let view = self.views.get_mut(&handle).unwrap();
            view.kind = Some(kind);
            view.frame = frame;
            view.transform = Affine::IDENTITY;
            view
        }

        fn view(&self, handle: ViewHandle) -> Result<&MockView, IntrospectionError> {
            self.views.get(&handle.0).ok_or(IntrospectionError::Detached)
        }
    }

    impl ViewIntrospector for Mock {
        fn kind(&self, view: ViewHandle) -> Result<ViewKind, IntrospectionError> {
            self.view(view)?
                .kind
                .clone()
                .ok_or_else(|| IntrospectionError::Unavailable("no kind".to_string()))
        }

        fn frame(&self, view: ViewHandle) -> Result<Rect, IntrospectionError> {
            Ok(self.view(view)?.frame)
        }

        fn transform(&self, view: ViewHandle) -> Affine {
            self.view(view).map(|v| v.transform).unwrap_or_default()
        }

        fn clip(&self, view: ViewHandle) -> Result<Option<Rect>, IntrospectionError> {
            Ok(self.view(view)?.clip)
        }

        fn paint(&self, view: ViewHandle) -> Result<PaintAttributes, IntrospectionError> {
            let v = self.view(view)?;
            if v.broken_paint {
                return Err(IntrospectionError::Unavailable("paint".to_string()));
            }
            Ok(PaintAttributes::default())
        }

        fn text(&self, view: ViewHandle) -> Result<Option<TextContent>, IntrospectionError> {
            Ok(self.view(view)?.text.clone().map(|text| TextContent {
                text,
                typography: Typography::default(),
            }))
        }

        fn image(&self, view: ViewHandle) -> Result<Option<ImageDescriptor>, IntrospectionError> {
            Ok(self.view(view)?.image.clone().map(|source| ImageDescriptor {
                source,
                label: None,
            }))
        }

        fn children(&self, view: ViewHandle) -> Vec<ViewHandle> {
            self.view(view)
                .map(|v| v.children.iter().copied().map(ViewHandle).collect())
                .unwrap_or_default()
        }

        fn declared_masking(&self, view: ViewHandle) -> Option<MaskingState> {
            self.view(view).ok().and_then(|v| v.mask.clone())
        }
    }

    const ROOT: ViewHandle = ViewHandle(1);

    fn screen() -> Mock {
        let mut mock = Mock::default();
        mock.add(1, ViewKind::Container, Rect::new(0.0, 0.0, 320.0, 480.0))
            .children = vec![2, 3];
        mock.add(2, ViewKind::Text, Rect::new(10.0, 10.0, 110.0, 30.0))
            .text = Some("Hello".into());
        mock.add(3, ViewKind::TextInput, Rect::new(10.0, 40.0, 210.0, 70.0))
            .text = Some("secret".into());
        mock
    }

    fn capture(capturer: &TreeCapturer, mock: &Mock, registry: &mut IdentityRegistry) -> CaptureNode {
        capturer.capture(mock, registry, ROOT, 0, &mut Tracer::none())
    }

    #[test]
    fn document_wraps_root_view() {
        let mock = screen();
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);

        assert_eq!(tree.kind, NodeKind::Document);
        assert_eq!(tree.children.len(), 1);
        let root = &tree.children[0];
        assert_eq!(root.as_element().map(|e| e.tag), Some(Tag::Div));
        assert_eq!(root.children.len(), 2);
        // document + root + (wrapper + text) + input
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn text_view_has_wrapper_and_text_child() {
        let mock = screen();
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);

        let wrapper = &tree.children[0].children[0];
        assert_eq!(wrapper.children.len(), 1);
        let text = &wrapper.children[0];
        assert_eq!(text.text_content(), Some("Hello"));
        assert_ne!(wrapper.id, text.id);
        assert_eq!(registry.get(IdentityKey::text(ViewHandle(2))), Some(text.id));
    }

    #[test]
    fn ids_are_stable_across_ticks() {
        let mock = screen();
        let capturer = TreeCapturer::default();
        let mut registry = IdentityRegistry::new();
        let first = capture(&capturer, &mock, &mut registry);
        let second = capture(&capturer, &mock, &mut registry);
        let ids = |t: &CaptureNode| t.descendants().map(|n| n.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn removed_view_id_is_retired() {
        let mut mock = screen();
        let capturer = TreeCapturer::default();
        let mut registry = IdentityRegistry::new();
        capture(&capturer, &mock, &mut registry);
        let old = registry.get(IdentityKey::view(ViewHandle(3))).unwrap();

        mock.views.get_mut(&1).unwrap().children = vec![2];
        capture(&capturer, &mock, &mut registry);
        assert_eq!(registry.get(IdentityKey::view(ViewHandle(3))), None);

        mock.views.get_mut(&1).unwrap().children = vec![2, 3];
        let tree = capture(&capturer, &mock, &mut registry);
        let new = tree.children[0].children[1].id;
        assert_ne!(new, old);
        assert!(new > old);
    }

    #[test]
    fn inputs_are_masked_by_default() {
        let mock = screen();
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);

        let root = &tree.children[0];
        assert!(!root.children[0].is_masked);
        let input = &root.children[1];
        assert!(input.is_masked);
        let el = input.as_element().unwrap();
        assert_eq!(el.tag, Tag::Input);
        // Content is kept; redaction happens at encoding time.
        assert_eq!(el.attributes.get("value").map(String::as_str), Some("secret"));
    }

    #[test]
    fn nearest_declaration_wins() {
        let mut mock = screen();
        mock.views.get_mut(&1).unwrap().mask = Some(MaskingState::Masked);
        mock.views.get_mut(&3).unwrap().mask = Some(MaskingState::Unmasked);
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);

        let root = &tree.children[0];
        assert!(root.is_masked);
        assert!(root.children[0].is_masked);
        assert!(root.children[0].children[0].is_masked);
        assert!(!root.children[1].is_masked);
    }

    #[test]
    fn custom_rule_resolves_through_policy() {
        let mut mock = screen();
        mock.views.get_mut(&2).unwrap().mask = Some(MaskingState::Custom("pii".into()));
        let capturer = TreeCapturer::new(
            MaskRules::default().with_rule("pii", true),
            CaptureLimits::default(),
        );
        let mut registry = IdentityRegistry::new();
        let tree = capture(&capturer, &mock, &mut registry);
        assert!(tree.children[0].children[0].is_masked);
    }

    #[test]
    fn failed_view_becomes_placeholder_and_siblings_survive() {
        let mut mock = screen();
        mock.views.get_mut(&2).unwrap().kind = None;
        mock.views.get_mut(&2).unwrap().children = vec![9];
        mock.add(9, ViewKind::Container, Rect::new(0.0, 0.0, 1.0, 1.0));
        let mut registry = IdentityRegistry::new();
        let (tree, stats) = TreeCapturer::default().capture_with_stats(
            &mock,
            &mut registry,
            ROOT,
            0,
            &mut Tracer::none(),
        );

        let root = &tree.children[0];
        let placeholder = &root.children[0];
        let el = placeholder.as_element().unwrap();
        assert_eq!(el.tag, Tag::Div);
        assert!(el.attributes.is_empty());
        assert!(placeholder.children.is_empty());
        assert_eq!(el.style.get("width"), Some("100px"));
        assert_eq!(root.children[1].as_element().unwrap().tag, Tag::Input);
        assert_eq!(stats.placeholders, 1);
    }

    #[test]
    fn paint_failure_keeps_node_kind() {
        let mut mock = screen();
        mock.views.get_mut(&3).unwrap().broken_paint = true;
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);
        let input = &tree.children[0].children[1];
        assert_eq!(input.as_element().unwrap().tag, Tag::Input);
        assert_eq!(input.paint, PaintAttributes::default());
    }

    #[test]
    fn unknown_kind_is_opaque_but_walked() {
        let mut mock = screen();
        mock.views.get_mut(&1).unwrap().kind = Some(ViewKind::Unknown("FancyView".into()));
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);
        let root = &tree.children[0];
        assert!(root.as_element().unwrap().attributes.is_empty());
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn image_carries_source() {
        let mut mock = screen();
        mock.add(4, ViewKind::Image, Rect::new(0.0, 100.0, 50.0, 150.0))
            .image = Some("asset://logo".into());
        mock.views.get_mut(&1).unwrap().children.push(4);
        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);
        let img = tree.children[0].children[2].as_element().unwrap();
        assert_eq!(img.tag, Tag::Img);
        assert_eq!(img.attributes.get("src").map(String::as_str), Some("asset://logo"));
    }

    #[test]
    fn transforms_and_clips_accumulate() {
        let mut mock = Mock::default();
        let root = mock.add(1, ViewKind::Container, Rect::new(0.0, 0.0, 100.0, 100.0));
        root.children = vec![2];
        let parent = mock.add(2, ViewKind::Container, Rect::new(10.0, 10.0, 60.0, 60.0));
        parent.transform = Affine::translate((10.0, 10.0));
        parent.clip = Some(Rect::new(10.0, 10.0, 60.0, 60.0));
        parent.children = vec![3];
        mock.add(3, ViewKind::Container, Rect::new(0.0, 0.0, 80.0, 20.0));

        let mut registry = IdentityRegistry::new();
        let tree = capture(&TreeCapturer::default(), &mock, &mut registry);
        let parent = &tree.children[0].children[0];
        let child = &parent.children[0];

        assert_eq!(parent.clip, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(child.frame, Rect::new(10.0, 10.0, 90.0, 30.0));
        assert_eq!(child.clip, Rect::new(10.0, 10.0, 60.0, 60.0));
    }

    #[test]
    fn depth_limit_emits_terminal_node() {
        let mut mock = Mock::default();
        for handle in 1..=6 {
            mock.add(handle, ViewKind::Container, Rect::new(0.0, 0.0, 10.0, 10.0))
                .children = if handle < 6 { vec![handle + 1] } else { vec![] };
        }
        let capturer = TreeCapturer::new(
            MaskRules::default(),
            CaptureLimits {
                max_depth: 3,
                max_nodes: u32::MAX,
            },
        );
        let mut registry = IdentityRegistry::new();
        let (tree, stats) =
            capturer.capture_with_stats(&mock, &mut registry, ROOT, 0, &mut Tracer::none());

        let terminal = &tree.children[0].children[0].children[0];
        assert!(terminal.is_truncated());
        assert!(terminal.children.is_empty());
        assert!(stats.truncated);
        assert_eq!(tree.node_count(), 4);
        // Document 0, root view 1, terminal 3.
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn node_budget_stops_after_one_terminal() {
        let mut mock = Mock::default();
        mock.add(1, ViewKind::Container, Rect::new(0.0, 0.0, 10.0, 10.0))
            .children = (2..12).collect();
        for handle in 2..12 {
            mock.add(handle, ViewKind::Container, Rect::new(0.0, 0.0, 1.0, 1.0));
        }
        let capturer = TreeCapturer::new(
            MaskRules::default(),
            CaptureLimits {
                max_depth: u32::MAX,
                max_nodes: 4,
            },
        );
        let mut registry = IdentityRegistry::new();
        let tree = capture(&capturer, &mock, &mut registry);
        let root = &tree.children[0];

        // document, root and two children fill the budget.
        assert_eq!(root.children.len(), 3);
        assert!(root.children[2].is_truncated());
        assert!(!root.children[1].is_truncated());
    }

    #[test]
    fn node_budget_overshoot_is_bounded_by_depth() {
        let mut mock = Mock::default();
        let frame = Rect::new(0.0, 0.0, 1.0, 1.0);
        mock.add(1, ViewKind::Container, frame).children = vec![2, 6];
        mock.add(2, ViewKind::Container, frame).children = vec![3, 7];
        mock.add(3, ViewKind::Container, frame).children = vec![4, 8];
        let label = mock.add(4, ViewKind::Text, frame);
        label.text = Some("x".into());
        label.children = vec![5];
        for handle in 5..=8 {
            mock.add(handle, ViewKind::Container, frame);
        }
        let limits = CaptureLimits {
            max_depth: u32::MAX,
            max_nodes: 5,
        };
        let capturer = TreeCapturer::new(MaskRules::default(), limits);
        let mut registry = IdentityRegistry::new();
        let (tree, stats) =
            capturer.capture_with_stats(&mock, &mut registry, ROOT, 0, &mut Tracer::none());

        // The label takes the last slot, its text child and four terminals
        // (one per open level) follow.
        assert_eq!(stats.nodes, 10);
        assert_eq!(tree.node_count(), 10);
        assert_eq!(stats.max_depth, 5);
        assert!(stats.nodes <= limits.max_nodes + stats.max_depth);

        let root = &tree.children[0];
        assert!(root.children[1].is_truncated());
        let label = &root.children[0].children[0].children[0];
        assert!(matches!(label.children[0].kind, NodeKind::Text { .. }));
        assert!(label.children[1].is_truncated());
    }

    #[test]
    fn inline_style_attribute_is_merged() {
        struct Styled(Mock);
        impl ViewIntrospector for Styled {
            fn kind(&self, v: ViewHandle) -> Result<ViewKind, IntrospectionError> {
                self.0.kind(v)
            }
            fn frame(&self, v: ViewHandle) -> Result<Rect, IntrospectionError> {
                self.0.frame(v)
            }
            fn clip(&self, v: ViewHandle) -> Result<Option<Rect>, IntrospectionError> {
                self.0.clip(v)
            }
            fn paint(&self, v: ViewHandle) -> Result<PaintAttributes, IntrospectionError> {
                self.0.paint(v)
            }
            fn text(&self, v: ViewHandle) -> Result<Option<TextContent>, IntrospectionError> {
                self.0.text(v)
            }
            fn image(&self, v: ViewHandle) -> Result<Option<ImageDescriptor>, IntrospectionError> {
                self.0.image(v)
            }
            fn children(&self, v: ViewHandle) -> Vec<ViewHandle> {
                self.0.children(v)
            }
            fn declared_masking(&self, v: ViewHandle) -> Option<MaskingState> {
                self.0.declared_masking(v)
            }
            fn attributes(&self, _: ViewHandle) -> Vec<(String, String)> {
                vec![
                    ("style".into(), "cursor: pointer; width: 1px".into()),
                    ("aria-label".into(), "card".into()),
                ]
            }
        }

        let mut mock = Mock::default();
        mock.add(1, ViewKind::Container, Rect::new(0.0, 0.0, 40.0, 40.0));
        let mut registry = IdentityRegistry::new();
        let tree = TreeCapturer::default().capture(
            &Styled(mock),
            &mut registry,
            ROOT,
            0,
            &mut Tracer::none(),
        );
        let el = tree.children[0].as_element().unwrap();
        assert_eq!(el.style.get("cursor"), Some("pointer"));
        assert_eq!(el.style.get("width"), Some("40px"));
        assert_eq!(el.attributes.get("aria-label").map(String::as_str), Some("card"));
        assert!(!el.attributes.contains_key("style"));
    }
}
