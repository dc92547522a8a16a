// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory view hierarchy for exercising the capture pipeline.
//!
//! [`ViewArena`] stores views in parallel arrays indexed by slot, the way a
//! toolkit keeps its widget tree, and implements
//! [`ViewIntrospector`] over them. Handles carry a generation so a recycled
//! slot never aliases a destroyed view, just like a platform reusing a
//! pointer for a new object.
//!
//! Introspection failures can be injected per view with [`Faults`].

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use retrace_core::adapter::{
    ImageDescriptor, IntrospectionError, TextContent, ViewIntrospector, ViewKind,
};
use retrace_core::id::ViewHandle;
use retrace_core::mask::MaskingState;
use retrace_core::node::{PaintAttributes, Typography};

const NO_PARENT: u32 = u32::MAX;

/// Introspection queries that fail on purpose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Faults {
    /// `kind` fails.
    pub kind: bool,
    /// `frame` and `clip` fail.
    pub geometry: bool,
    /// `paint` fails.
    pub paint: bool,
    /// `text` and `image` fail.
    pub content: bool,
}

impl Faults {
    /// Every query fails.
    pub const ALL: Self = Self {
        kind: true,
        geometry: true,
        paint: true,
        content: true,
    };
}

/// Struct-of-arrays view storage.
#[derive(Debug, Default)]
pub struct ViewArena {
    // -- Topology --
    parent: Vec<u32>,
    children: Vec<Vec<u32>>,

    // -- Properties --
    kind: Vec<ViewKind>,
    frame: Vec<Rect>,
    transform: Vec<Affine>,
    clip: Vec<Option<Rect>>,
    paint: Vec<PaintAttributes>,
    text: Vec<Option<TextContent>>,
    image: Vec<Option<ImageDescriptor>>,
    masking: Vec<Option<MaskingState>>,
    attributes: Vec<Vec<(String, String)>>,
    faults: Vec<Faults>,

    // -- Allocation --
    generation: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
}

impl ViewArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Whether the arena has no live views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Allocation API --

    /// Creates a detached view.
    pub fn create_view(&mut self, kind: ViewKind, frame: Rect) -> ViewHandle {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.alive[i] = true;
            self.parent[i] = NO_PARENT;
            self.children[i].clear();
            self.kind[i] = kind;
            self.frame[i] = frame;
            self.transform[i] = Affine::IDENTITY;
            self.clip[i] = None;
            self.paint[i] = PaintAttributes::default();
            self.text[i] = None;
            self.image[i] = None;
            self.masking[i] = None;
            self.attributes[i].clear();
            self.faults[i] = Faults::default();
            idx
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "arenas never approach u32::MAX views"
            )]
            let idx = self.alive.len() as u32;
            self.parent.push(NO_PARENT);
            self.children.push(Vec::new());
            self.kind.push(kind);
            self.frame.push(frame);
            self.transform.push(Affine::IDENTITY);
            self.clip.push(None);
            self.paint.push(PaintAttributes::default());
            self.text.push(None);
            self.image.push(None);
            self.masking.push(None);
            self.attributes.push(Vec::new());
            self.faults.push(Faults::default());
            self.generation.push(0);
            self.alive.push(true);
            idx
        };
        handle(idx, self.generation[idx as usize])
    }

    /// Detaches a view from its parent and destroys it with its subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_view(&mut self, view: ViewHandle) {
        let idx = self.validate(view);
        self.detach_idx(idx);
        let mut stack = alloc::vec![idx];
        while let Some(i) = stack.pop() {
            stack.append(&mut self.children[i as usize]);
            self.alive[i as usize] = false;
            self.parent[i as usize] = NO_PARENT;
            self.free_list.push(i);
        }
    }

    /// Whether the handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, view: ViewHandle) -> bool {
        self.slot(view).is_some()
    }

    // -- Topology API --

    /// Appends `child` to `parent`, detaching it from any previous parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child(&mut self, parent: ViewHandle, child: ViewHandle) {
        let len = self.children[self.validate(parent) as usize].len();
        self.insert_child(parent, len, child);
    }

    /// Inserts `child` at `index` among `parent`'s children (clamped to the
    /// end), detaching it from any previous parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if `child` is `parent` itself.
    pub fn insert_child(&mut self, parent: ViewHandle, index: usize, child: ViewHandle) {
        let p = self.validate(parent);
        let c = self.validate(child);
        assert_ne!(p, c, "a view cannot be its own child");
        self.detach_idx(c);
        let list = &mut self.children[p as usize];
        list.insert(index.min(list.len()), c);
        self.parent[c as usize] = p;
    }

    /// Detaches `view` from its parent without destroying it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn detach(&mut self, view: ViewHandle) {
        let idx = self.validate(view);
        self.detach_idx(idx);
    }

    /// Parent of `view`, if attached.
    #[must_use]
    pub fn parent(&self, view: ViewHandle) -> Option<ViewHandle> {
        let idx = self.slot(view)?;
        let p = self.parent[idx as usize];
        (p != NO_PARENT).then(|| handle(p, self.generation[p as usize]))
    }

    // -- Convenience constructors --

    /// Creates a container and appends it to `parent`, if any.
    pub fn container(&mut self, parent: Option<ViewHandle>, frame: Rect) -> ViewHandle {
        self.attached(parent, ViewKind::Container, frame)
    }

    /// Creates a text label.
    pub fn label(
        &mut self,
        parent: Option<ViewHandle>,
        frame: Rect,
        text: impl Into<String>,
    ) -> ViewHandle {
        let view = self.attached(parent, ViewKind::Text, frame);
        self.set_text(view, text);
        view
    }

    /// Creates an editable text field.
    pub fn text_field(
        &mut self,
        parent: Option<ViewHandle>,
        frame: Rect,
        text: impl Into<String>,
    ) -> ViewHandle {
        let view = self.attached(parent, ViewKind::TextInput, frame);
        self.set_text(view, text);
        view
    }

    /// Creates an image view.
    pub fn image_view(
        &mut self,
        parent: Option<ViewHandle>,
        frame: Rect,
        source: impl Into<String>,
    ) -> ViewHandle {
        let view = self.attached(parent, ViewKind::Image, frame);
        self.set_image(
            view,
            Some(ImageDescriptor {
                source: source.into(),
                label: None,
            }),
        );
        view
    }

    // -- Property API --
    //
    // Setters panic on stale handles.

    /// Sets the view kind.
    pub fn set_kind(&mut self, view: ViewHandle, kind: ViewKind) {
        let i = self.validate(view) as usize;
        self.kind[i] = kind;
    }

    /// Sets the frame (parent content space).
    pub fn set_frame(&mut self, view: ViewHandle, frame: Rect) {
        let i = self.validate(view) as usize;
        self.frame[i] = frame;
    }

    /// Sets the content transform.
    pub fn set_transform(&mut self, view: ViewHandle, transform: Affine) {
        let i = self.validate(view) as usize;
        self.transform[i] = transform;
    }

    /// Sets the clip applied to descendants.
    pub fn set_clip(&mut self, view: ViewHandle, clip: Option<Rect>) {
        let i = self.validate(view) as usize;
        self.clip[i] = clip;
    }

    /// Replaces the paint attributes.
    pub fn set_paint(&mut self, view: ViewHandle, paint: PaintAttributes) {
        let i = self.validate(view) as usize;
        self.paint[i] = paint;
    }

    /// Edits the paint attributes in place.
    pub fn update_paint(&mut self, view: ViewHandle, f: impl FnOnce(&mut PaintAttributes)) {
        let i = self.validate(view) as usize;
        f(&mut self.paint[i]);
    }

    /// Sets the displayed text, keeping the current typography.
    pub fn set_text(&mut self, view: ViewHandle, text: impl Into<String>) {
        let i = self.validate(view) as usize;
        let content = self.text[i].get_or_insert_with(TextContent::default);
        content.text = text.into();
    }

    /// Sets the typography of a text view.
    pub fn set_typography(&mut self, view: ViewHandle, typography: Typography) {
        let i = self.validate(view) as usize;
        let content = self.text[i].get_or_insert_with(TextContent::default);
        content.typography = typography;
    }

    /// Sets the image descriptor.
    pub fn set_image(&mut self, view: ViewHandle, image: Option<ImageDescriptor>) {
        let i = self.validate(view) as usize;
        self.image[i] = image;
    }

    /// Sets the declared masking.
    pub fn set_masking(&mut self, view: ViewHandle, masking: Option<MaskingState>) {
        let i = self.validate(view) as usize;
        self.masking[i] = masking;
    }

    /// Sets or replaces an extra attribute.
    pub fn set_attribute(
        &mut self,
        view: ViewHandle,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let i = self.validate(view) as usize;
        let (name, value) = (name.into(), value.into());
        let attributes = &mut self.attributes[i];
        match attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => attributes.push((name, value)),
        }
    }

    /// Removes an extra attribute.
    pub fn remove_attribute(&mut self, view: ViewHandle, name: &str) {
        let i = self.validate(view) as usize;
        self.attributes[i].retain(|(n, _)| n != name);
    }

    /// Injects introspection failures.
    pub fn set_faults(&mut self, view: ViewHandle, faults: Faults) {
        let i = self.validate(view) as usize;
        self.faults[i] = faults;
    }

    // -- Internals --

    fn attached(&mut self, parent: Option<ViewHandle>, kind: ViewKind, frame: Rect) -> ViewHandle {
        let view = self.create_view(kind, frame);
        if let Some(parent) = parent {
            self.add_child(parent, view);
        }
        view
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "handles pack slot and generation into the two halves of a u64"
    )]
    fn slot(&self, view: ViewHandle) -> Option<u32> {
        let idx = (view.0 & u64::from(u32::MAX)) as u32;
        let generation = (view.0 >> 32) as u32;
        let i = idx as usize;
        (i < self.alive.len() && self.alive[i] && self.generation[i] == generation).then_some(idx)
    }

    fn validate(&self, view: ViewHandle) -> u32 {
        match self.slot(view) {
            Some(idx) => idx,
            None => panic!("stale view handle {view:?}"),
        }
    }

    fn lookup(&self, view: ViewHandle) -> Result<usize, IntrospectionError> {
        self.slot(view)
            .map(|idx| idx as usize)
            .ok_or(IntrospectionError::Detached)
    }

    fn detach_idx(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p != NO_PARENT {
            self.children[p as usize].retain(|&c| c != idx);
            self.parent[idx as usize] = NO_PARENT;
        }
    }
}

fn handle(idx: u32, generation: u32) -> ViewHandle {
    ViewHandle((u64::from(generation) << 32) | u64::from(idx))
}

fn injected(query: &str) -> IntrospectionError {
    IntrospectionError::Unavailable(alloc::format!("injected {query} failure"))
}

impl ViewIntrospector for ViewArena {
    fn kind(&self, view: ViewHandle) -> Result<ViewKind, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].kind {
            return Err(injected("kind"));
        }
        Ok(self.kind[i].clone())
    }

    fn frame(&self, view: ViewHandle) -> Result<Rect, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].geometry {
            return Err(injected("frame"));
        }
        Ok(self.frame[i])
    }

    fn transform(&self, view: ViewHandle) -> Affine {
        self.lookup(view)
            .map(|i| self.transform[i])
            .unwrap_or(Affine::IDENTITY)
    }

    fn clip(&self, view: ViewHandle) -> Result<Option<Rect>, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].geometry {
            return Err(injected("clip"));
        }
        Ok(self.clip[i])
    }

    fn paint(&self, view: ViewHandle) -> Result<PaintAttributes, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].paint {
            return Err(injected("paint"));
        }
        Ok(self.paint[i].clone())
    }

    fn text(&self, view: ViewHandle) -> Result<Option<TextContent>, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].content {
            return Err(injected("text"));
        }
        Ok(self.text[i].clone())
    }

    fn image(&self, view: ViewHandle) -> Result<Option<ImageDescriptor>, IntrospectionError> {
        let i = self.lookup(view)?;
        if self.faults[i].content {
            return Err(injected("image"));
        }
        Ok(self.image[i].clone())
    }

    fn children(&self, view: ViewHandle) -> Vec<ViewHandle> {
        self.lookup(view)
            .map(|i| {
                self.children[i]
                    .iter()
                    .map(|&c| handle(c, self.generation[c as usize]))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn declared_masking(&self, view: ViewHandle) -> Option<MaskingState> {
        self.lookup(view).ok().and_then(|i| self.masking[i].clone())
    }

    fn attributes(&self, view: ViewHandle) -> Vec<(String, String)> {
        self.lookup(view)
            .map(|i| self.attributes[i].clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut arena = ViewArena::new();
        let root = arena.container(None, rect());
        let a = arena.container(Some(root), rect());
        let b = arena.container(Some(root), rect());
        let c = arena.create_view(ViewKind::Container, rect());
        arena.insert_child(root, 1, c);
        assert_eq!(arena.children(root), vec![a, c, b]);
        assert_eq!(arena.parent(c), Some(root));
    }

    #[test]
    fn reparenting_detaches_from_old_parent() {
        let mut arena = ViewArena::new();
        let root = arena.container(None, rect());
        let left = arena.container(Some(root), rect());
        let right = arena.container(Some(root), rect());
        let leaf = arena.label(Some(left), rect(), "x");
        arena.add_child(right, leaf);
        assert!(arena.children(left).is_empty());
        assert_eq!(arena.children(right), vec![leaf]);
    }

    #[test]
    fn recycled_slot_gets_new_handle() {
        let mut arena = ViewArena::new();
        let root = arena.container(None, rect());
        let old = arena.label(Some(root), rect(), "bye");
        arena.destroy_view(old);
        assert!(!arena.is_alive(old));
        assert_eq!(arena.kind(old), Err(IntrospectionError::Detached));

        let new = arena.label(Some(root), rect(), "hi");
        assert_ne!(old, new);
        assert_eq!(arena.children(root), vec![new]);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn destroy_takes_subtree() {
        let mut arena = ViewArena::new();
        let root = arena.container(None, rect());
        let branch = arena.container(Some(root), rect());
        let leaf = arena.container(Some(branch), rect());
        arena.destroy_view(branch);
        assert!(!arena.is_alive(leaf));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn faults_are_reported() {
        let mut arena = ViewArena::new();
        let view = arena.text_field(None, rect(), "secret");
        arena.set_faults(
            view,
            Faults {
                content: true,
                ..Faults::default()
            },
        );
        assert!(arena.text(view).is_err());
        assert_eq!(arena.kind(view), Ok(ViewKind::TextInput));
    }

    #[test]
    fn attributes_replace_by_name() {
        let mut arena = ViewArena::new();
        let view = arena.container(None, rect());
        arena.set_attribute(view, "aria-label", "a");
        arena.set_attribute(view, "aria-label", "b");
        assert_eq!(
            arena.attributes(view),
            vec![("aria-label".into(), "b".into())]
        );
        arena.remove_attribute(view, "aria-label");
        assert!(arena.attributes(view).is_empty());
    }
}
