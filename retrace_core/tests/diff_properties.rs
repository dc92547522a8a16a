// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the diff engine, checked against the reference
//! replayer.

use std::collections::BTreeSet;

use proptest::prelude::*;
use retrace_core::diff::diff;
use retrace_core::id::NodeId;
use retrace_core::mutation::{MutationCounts, MutationRecord};
use retrace_core::node::{CaptureNode, Tag};
use retrace_core::replay::Document;

const DOCUMENT_ID: u32 = 1_000;

#[derive(Clone, Debug)]
enum Shape {
    Text {
        id: u32,
        content: String,
        masked: bool,
    },
    Element {
        id: u32,
        tag: u8,
        label: Option<String>,
        style: Vec<(String, String)>,
        masked: bool,
        children: Vec<Shape>,
    },
}

fn style() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("(width|color|left)", "[0-9]{1,2}px"), 0..3)
}

fn element(children: impl Strategy<Value = Vec<Shape>>) -> impl Strategy<Value = Shape> {
    (
        1_u32..40,
        0_u8..3,
        proptest::option::of("[xy]{1,2}"),
        style(),
        any::<bool>(),
        children,
    )
        .prop_map(|(id, tag, label, style, masked, children)| Shape::Element {
            id,
            tag,
            label,
            style,
            masked,
            children,
        })
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (1_u32..40, "[a-c]{0,3}", any::<bool>()).prop_map(|(id, content, masked)| {
            Shape::Text {
                id,
                content,
                masked,
            }
        }),
        element(Just(Vec::new())),
    ];
    leaf.prop_recursive(4, 40, 5, |inner| {
        element(prop::collection::vec(inner, 0..5))
    })
}

/// Builds a tree from shapes; nodes reusing an id are dropped with their
/// subtree so ids stay unique.
fn build(shape: &Shape, used: &mut BTreeSet<u32>) -> Option<CaptureNode> {
    match shape {
        Shape::Text {
            id,
            content,
            masked,
        } => used
            .insert(*id)
            .then(|| CaptureNode::text(*id, content.clone()).with_masked(*masked)),
        Shape::Element {
            id,
            tag,
            label,
            style,
            masked,
            children,
        } => {
            if !used.insert(*id) {
                return None;
            }
            let tag = match tag {
                0 => Tag::Div,
                1 => Tag::Img,
                _ => Tag::Input,
            };
            let mut node = CaptureNode::element(*id, tag).with_masked(*masked);
            if let Some(label) = label {
                node = node.with_attribute("aria-label", label.clone());
            }
            for (name, value) in style {
                node = node.with_style(name.clone(), value.clone());
            }
            Some(node.with_children(children.iter().filter_map(|c| build(c, used))))
        }
    }
}

fn tree(children: &[Shape]) -> CaptureNode {
    let mut used = BTreeSet::new();
    CaptureNode::document(DOCUMENT_ID)
        .with_children(children.iter().filter_map(|c| build(c, &mut used)))
}

fn forest() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(shape(), 0..4)
}

fn rank(record: &MutationRecord) -> u8 {
    match record {
        MutationRecord::Remove { .. } => 0,
        MutationRecord::Add { .. } => 1,
        MutationRecord::TextChange { .. } => 2,
        MutationRecord::AttributeChange { .. } => 3,
    }
}

proptest! {
    #[test]
    fn applying_diff_reproduces_current(a in forest(), b in forest()) {
        let previous = tree(&a);
        let current = tree(&b);
        let records = diff(&previous, &current).unwrap();

        let mut mirror = Document::from_tree(&previous);
        mirror.apply(&records).unwrap();
        prop_assert_eq!(mirror, Document::from_tree(&current));
    }

    #[test]
    fn diff_of_same_tree_is_empty(a in forest()) {
        let tree = tree(&a);
        prop_assert!(diff(&tree, &tree).unwrap().is_empty());
    }

    #[test]
    fn records_are_grouped_by_kind(a in forest(), b in forest()) {
        let records = diff(&tree(&a), &tree(&b)).unwrap();
        let ranks: Vec<u8> = records.iter().map(rank).collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(MutationCounts::of(&records).total(), records.len());
    }
}

#[test]
fn text_change_scenario() {
    // Root [A: Text "hi"] → Root [A: Text "ho"]
    let previous = CaptureNode::document(1).with_child(CaptureNode::text(2, "hi"));
    let current = CaptureNode::document(1).with_child(CaptureNode::text(2, "ho"));
    assert_eq!(
        diff(&previous, &current).unwrap(),
        vec![MutationRecord::TextChange {
            id: NodeId(2),
            text: "ho".into(),
            is_masked: false,
        }]
    );
}

#[test]
fn add_scenario() {
    // Root [A] → Root [A, B]
    let a = || CaptureNode::element(2, Tag::Div);
    let b = CaptureNode::element(3, Tag::Div);
    let previous = CaptureNode::document(1).with_child(a());
    let current = CaptureNode::document(1).with_child(a()).with_child(b.clone());
    assert_eq!(
        diff(&previous, &current).unwrap(),
        vec![MutationRecord::Add {
            parent_id: NodeId(1),
            next_sibling_id: None,
            node: b,
        }]
    );
}

#[test]
fn cross_parent_move_round_trips() {
    let previous = CaptureNode::document(1).with_children([
        CaptureNode::element(2, Tag::Div).with_child(CaptureNode::text(4, "moving")),
        CaptureNode::element(3, Tag::Div),
    ]);
    let current = CaptureNode::document(1).with_children([
        CaptureNode::element(2, Tag::Div),
        CaptureNode::element(3, Tag::Div).with_child(CaptureNode::text(4, "moving")),
    ]);
    let records = diff(&previous, &current).unwrap();
    let mut mirror = Document::from_tree(&previous);
    mirror.apply(&records).unwrap();
    assert_eq!(mirror, Document::from_tree(&current));
}
