// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree diffing.
//!
//! [`diff`] compares two trees captured from the same identity space and
//! returns the [`MutationRecord`]s that turn the previous tree into the
//! current one. Node ids are the only matching key: a node is "the same" in
//! both trees iff it has the same id and the same shape (variant and tag).
//!
//! Per parent the children are reconciled like this:
//!
//! ```text
//!   previous:  a b c d          retained in current order: d a c
//!   current:   d a x c          previous positions:        3 0 2
//!                               longest increasing run:      0 2  (a, c)
//!   → Remove b, Remove d, Add d before a, Add x before c
//! ```
//!
//! Children on the longest increasing subsequence stay in place and are
//! diffed recursively. Retained children off that subsequence have moved and
//! are re-added wholesale, so a sequential replay of the records always
//! reproduces the current child order.
//!
//! Records come out grouped: every `Remove`, then every `Add` (each parent's
//! additions from last to first, so a `next_sibling_id` is always present
//! when its `Add` is applied), then `TextChange`s, then `AttributeChange`s.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::id::NodeId;
use crate::mutation::MutationRecord;
use crate::node::{CaptureNode, NodeKind, key_delta};

/// The two roots cannot be related by mutations.
///
/// Returned when the root ids or root kinds differ. The caller is expected
/// to fall back to a full snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuralMismatch {
    /// Root id of the previous tree.
    pub previous_root: NodeId,
    /// Root id of the current tree.
    pub current_root: NodeId,
}

impl fmt::Display for StructuralMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.previous_root == self.current_root {
            write!(f, "root {} changed kind", self.current_root)
        } else {
            write!(
                f,
                "root changed from {} to {}",
                self.previous_root, self.current_root
            )
        }
    }
}

impl core::error::Error for StructuralMismatch {}

/// Computes the mutations that turn `previous` into `current`.
///
/// `diff(a, a)` is always empty.
///
/// # Errors
///
/// Returns [`StructuralMismatch`] when the roots differ in id or kind.
pub fn diff(
    previous: &CaptureNode,
    current: &CaptureNode,
) -> Result<Vec<MutationRecord>, StructuralMismatch> {
    if previous.id != current.id || !previous.kind.same_shape(&current.kind) {
        return Err(StructuralMismatch {
            previous_root: previous.id,
            current_root: current.id,
        });
    }
    let mut out = Records::default();
    out.node(previous, current);
    Ok(out.finish())
}

#[derive(Default)]
struct Records {
    removes: Vec<MutationRecord>,
    adds: Vec<MutationRecord>,
    texts: Vec<MutationRecord>,
    attributes: Vec<MutationRecord>,
}

impl Records {
    fn finish(self) -> Vec<MutationRecord> {
        let mut all = self.removes;
        all.extend(self.adds);
        all.extend(self.texts);
        all.extend(self.attributes);
        all
    }

    /// Diffs two nodes known to share id and shape.
    fn node(&mut self, prev: &CaptureNode, cur: &CaptureNode) {
        match (&prev.kind, &cur.kind) {
            (NodeKind::Text { content: old, .. }, NodeKind::Text { content: new, .. }) => {
                if old != new || prev.is_masked != cur.is_masked {
                    self.texts.push(MutationRecord::TextChange {
                        id: cur.id,
                        text: new.clone(),
                        is_masked: cur.is_masked,
                    });
                }
            }
            (NodeKind::Element(old), NodeKind::Element(new)) => {
                let mut attributes = key_delta(&old.attributes, &new.attributes);
                let style = key_delta(old.style.as_map(), new.style.as_map());
                let mask_flipped = prev.is_masked != cur.is_masked;
                if mask_flipped {
                    // Masked values depend on the flag; resend them all.
                    for (key, value) in &new.attributes {
                        attributes.insert(key.clone(), Some(value.clone()));
                    }
                }
                if !attributes.is_empty() || !style.is_empty() || mask_flipped {
                    self.attributes.push(MutationRecord::AttributeChange {
                        id: cur.id,
                        is_masked: cur.is_masked,
                        attributes,
                        style,
                    });
                }
            }
            _ => {}
        }
        self.children(prev, cur);
    }

    fn children(&mut self, prev: &CaptureNode, cur: &CaptureNode) {
        let parent_id = cur.id;
        let prev_index: BTreeMap<NodeId, usize> = prev
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        // Current children that match a previous child: (current, previous).
        let mut retained: Vec<(usize, usize)> = Vec::new();
        for (ci, child) in cur.children.iter().enumerate() {
            if let Some(&pi) = prev_index.get(&child.id) {
                if prev.children[pi].kind.same_shape(&child.kind) {
                    retained.push((ci, pi));
                }
            }
        }

        let positions: Vec<usize> = retained.iter().map(|&(_, pi)| pi).collect();
        let stable = longest_increasing(&positions);

        let mut kept_prev = vec![false; prev.children.len()];
        let mut kept_cur = vec![false; cur.children.len()];
        for (&(ci, pi), &keep) in retained.iter().zip(&stable) {
            if keep {
                kept_prev[pi] = true;
                kept_cur[ci] = true;
            }
        }

        for (child, &kept) in prev.children.iter().zip(&kept_prev) {
            if !kept {
                self.removes.push(MutationRecord::Remove {
                    parent_id,
                    id: child.id,
                });
            }
        }

        for ci in (0..cur.children.len()).rev() {
            if !kept_cur[ci] {
                self.adds.push(MutationRecord::Add {
                    parent_id,
                    next_sibling_id: cur.children.get(ci + 1).map(|c| c.id),
                    node: cur.children[ci].clone(),
                });
            }
        }

        for (ci, pi) in retained
            .iter()
            .zip(&stable)
            .filter_map(|(&pair, &keep)| keep.then_some(pair))
        {
            self.node(&prev.children[pi], &cur.children[ci]);
        }
    }
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    // tails[k]: index into `seq` of the smallest tail of a run of length k+1.
    let mut tails: Vec<usize> = Vec::new();
    let mut back: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let k = tails.partition_point(|&t| seq[t] < value);
        back[i] = k.checked_sub(1).map(|p| tails[p]);
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = back[i];
    }
    keep
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::node::Tag;

    fn div(id: u32) -> CaptureNode {
        CaptureNode::element(id, Tag::Div)
    }

    fn root(children: impl IntoIterator<Item = CaptureNode>) -> CaptureNode {
        CaptureNode::document(1).with_child(div(2).with_children(children))
    }

    fn ids(records: &[MutationRecord]) -> Vec<NodeId> {
        records.iter().map(MutationRecord::target).collect()
    }

    #[test]
    fn identical_trees_produce_nothing() {
        let tree = root([div(3), CaptureNode::text(4, "hi")]);
        assert_eq!(diff(&tree, &tree), Ok(vec![]));
    }

    #[test]
    fn root_id_change_is_a_mismatch() {
        let a = CaptureNode::document(1);
        let b = CaptureNode::document(9);
        let err = diff(&a, &b).unwrap_err();
        assert_eq!(err.previous_root, NodeId(1));
        assert_eq!(err.current_root, NodeId(9));
    }

    #[test]
    fn root_kind_change_is_a_mismatch() {
        assert!(diff(&CaptureNode::document(1), &div(1)).is_err());
    }

    #[test]
    fn text_change_is_reported_alone() {
        let a = root([div(3).with_child(CaptureNode::text(4, "A"))]);
        let b = root([div(3).with_child(CaptureNode::text(4, "B"))]);
        assert_eq!(
            diff(&a, &b).unwrap(),
            vec![MutationRecord::TextChange {
                id: NodeId(4),
                text: "B".into(),
                is_masked: false,
            }]
        );
    }

    #[test]
    fn appended_child_names_no_sibling() {
        let a = root([div(3)]);
        let b = root([div(3), div(5)]);
        assert_eq!(
            diff(&a, &b).unwrap(),
            vec![MutationRecord::Add {
                parent_id: NodeId(2),
                next_sibling_id: None,
                node: div(5),
            }]
        );
    }

    #[test]
    fn inserted_child_names_following_sibling() {
        let a = root([div(3), div(4)]);
        let b = root([div(3), div(5), div(4)]);
        let records = diff(&a, &b).unwrap();
        assert!(matches!(
            &records[..],
            [MutationRecord::Add { next_sibling_id: Some(NodeId(4)), .. }]
        ));
    }

    #[test]
    fn adjacent_adds_come_last_to_first() {
        let a = root([div(3)]);
        let b = root([div(3), div(5), div(6)]);
        let records = diff(&a, &b).unwrap();
        assert_eq!(ids(&records), vec![NodeId(6), NodeId(5)]);
        assert!(matches!(
            records[1],
            MutationRecord::Add { next_sibling_id: Some(NodeId(6)), .. }
        ));
    }

    #[test]
    fn removal_does_not_descend() {
        let a = root([div(3).with_child(div(4)), div(5)]);
        let b = root([div(5)]);
        assert_eq!(
            diff(&a, &b).unwrap(),
            vec![MutationRecord::Remove {
                parent_id: NodeId(2),
                id: NodeId(3),
            }]
        );
    }

    #[test]
    fn only_changed_style_keys_are_sent() {
        let base = || div(3).with_style("width", "10px").with_style("color", "#000000");
        let a = root([base()]);
        let b = root([base().with_style("border-color", "#ff0000")]);
        let records = diff(&a, &b).unwrap();
        let [MutationRecord::AttributeChange {
            attributes, style, ..
        }] = &records[..]
        else {
            panic!("expected one attribute change, got {records:?}");
        };
        assert!(attributes.is_empty());
        assert_eq!(style.len(), 1);
        assert_eq!(style["border-color"].as_deref(), Some("#ff0000"));
    }

    #[test]
    fn removed_attribute_is_none() {
        let a = root([div(3).with_attribute("aria-label", "x")]);
        let b = root([div(3)]);
        let records = diff(&a, &b).unwrap();
        let [MutationRecord::AttributeChange { attributes, .. }] = &records[..] else {
            panic!("expected one attribute change");
        };
        assert_eq!(attributes.get("aria-label"), Some(&None));
    }

    #[test]
    fn mask_flip_on_text_is_a_text_change() {
        let a = root([CaptureNode::text(3, "pin")]);
        let b = root([CaptureNode::text(3, "pin").with_masked(true)]);
        assert_eq!(
            diff(&a, &b).unwrap(),
            vec![MutationRecord::TextChange {
                id: NodeId(3),
                text: "pin".into(),
                is_masked: true,
            }]
        );
    }

    #[test]
    fn mask_flip_on_element_resends_attributes() {
        let input = || CaptureNode::element(3, Tag::Input).with_attribute("value", "1234");
        let a = root([input()]);
        let b = root([input().with_masked(true)]);
        let records = diff(&a, &b).unwrap();
        let [MutationRecord::AttributeChange {
            is_masked,
            attributes,
            ..
        }] = &records[..]
        else {
            panic!("expected one attribute change");
        };
        assert!(is_masked);
        assert_eq!(attributes["value"].as_deref(), Some("1234"));
    }

    #[test]
    fn tag_change_replaces_node() {
        let a = root([div(3)]);
        let b = root([CaptureNode::element(3, Tag::Img)]);
        let records = diff(&a, &b).unwrap();
        assert!(matches!(records[0], MutationRecord::Remove { id: NodeId(3), .. }));
        assert!(matches!(records[1], MutationRecord::Add { .. }));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn swap_moves_one_child() {
        let a = root([div(3), div(4)]);
        let b = root([div(4), div(3)]);
        let records = diff(&a, &b).unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], MutationRecord::Remove { .. }));
        assert!(matches!(records[1], MutationRecord::Add { .. }));
    }

    #[test]
    fn lis_keeps_longest_run() {
        assert_eq!(
            longest_increasing(&[3, 0, 2, 1, 4]),
            vec![false, true, false, true, true]
        );
        assert_eq!(longest_increasing(&[]), Vec::<bool>::new());
    }

    #[test]
    fn mismatch_display() {
        let err = StructuralMismatch {
            previous_root: NodeId(1),
            current_root: NodeId(2),
        };
        assert_eq!(alloc::format!("{err}"), "root changed from #1 to #2");
    }
}
