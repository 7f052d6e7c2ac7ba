//! Tree diff engine.
//!
//! Compares two normalized contexts and produces a tagged difference tree.
//! Roots are matched by qualified name (functions additionally by signature,
//! so overload sets pair one-to-one); matched nodes recurse through
//! [`diff_nodes`], which partitions children into removed / added / common
//! and appends the per-node attribute diff.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::info;

use crate::diff::model::{DiffRecord, DiffTag};
use crate::errors::{ArmorError, Result};
use crate::model::{ApiNode, NodeKind, NormalizedContext};

/// Kinds whose child ordering matters for binary layout. `Enum` children
/// carry their own ordinal value, so reordering them is not a layout event.
/// Gates no emission today.
#[allow(dead_code)]
fn check_layout_change(node: &ApiNode) -> bool {
    node.kind != NodeKind::Enum
}

/// Attribute snapshot for a leaf node (field, enumerator, parameter, ...).
fn leaf_snapshot(node: &ApiNode, tag: DiffTag) -> DiffRecord {
    DiffRecord {
        qualified_name: node.qualified_name.clone(),
        node_type: node.kind.as_str().to_string(),
        data_type: node.data_type.clone(),
        value: node.value.clone(),
        tag: Some(tag),
        ..DiffRecord::default()
    }
}

/// Attribute snapshot for a function: carries the function-level attributes
/// the describer pairs up (storage, calling convention, inline).
fn function_snapshot(node: &ApiNode, tag: DiffTag) -> DiffRecord {
    DiffRecord {
        qualified_name: node.qualified_name.clone(),
        node_type: node.kind.as_str().to_string(),
        data_type: node.data_type.clone(),
        tag: Some(tag),
        storage_qualifier: Some(node.storage.as_keyword().to_string()),
        calling_convention: Some(node.function_calling_convention.clone()),
        is_inline: Some(node.is_inline),
        ..DiffRecord::default()
    }
}

/// Field-by-field comparison of two nodes with the same identity.
///
/// Functions compare only storage, calling convention, and the inline flag
/// (their return type and parameters diff through synthesised children) and
/// yield a bare removed/added snapshot pair for the describer to splice.
/// Any other kind compares the full attribute set and yields one `modified`
/// record wrapping the old/new snapshots.
fn node_attr_diff(a: &ApiNode, b: &ApiNode) -> Vec<DiffRecord> {
    if a.kind == NodeKind::Function {
        let changed = a.storage != b.storage
            || a.function_calling_convention != b.function_calling_convention
            || a.is_inline != b.is_inline;
        if !changed {
            return Vec::new();
        }
        return vec![
            function_snapshot(a, DiffTag::Removed),
            function_snapshot(b, DiffTag::Added),
        ];
    }

    let changed = a.type_name != b.type_name
        || a.data_type != b.data_type
        || a.value != b.value
        || a.access != b.access
        || a.storage != b.storage
        || a.const_qualifier != b.const_qualifier
        || a.virtual_qualifier != b.virtual_qualifier
        || a.function_calling_convention != b.function_calling_convention
        || a.is_inline != b.is_inline
        || a.is_pointer != b.is_pointer
        || a.is_reference != b.is_reference
        || a.is_r_value_ref != b.is_r_value_ref
        || a.is_packed != b.is_packed;
    if !changed {
        return Vec::new();
    }

    vec![DiffRecord {
        qualified_name: a.qualified_name.clone(),
        node_type: a.kind.as_str().to_string(),
        tag: Some(DiffTag::Modified),
        children: vec![
            leaf_snapshot(a, DiffTag::Removed),
            leaf_snapshot(b, DiffTag::Added),
        ],
        ..DiffRecord::default()
    }]
}

/// Split two child lists into (removed, added, common) by match key.
///
/// Duplicate keys pair positionally: each base child consumes the first
/// unconsumed head child with the same key.
#[allow(clippy::type_complexity)]
fn partition_children<'a>(
    a: &'a [Arc<ApiNode>],
    b: &'a [Arc<ApiNode>],
) -> (
    Vec<&'a ApiNode>,
    Vec<&'a ApiNode>,
    Vec<(&'a ApiNode, &'a ApiNode)>,
) {
    let mut by_key: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (idx, child) in b.iter().enumerate() {
        by_key.entry(child.match_key()).or_default().push_back(idx);
    }

    let mut used = vec![false; b.len()];
    let mut removed = Vec::new();
    let mut common = Vec::new();

    for child in a {
        let matched = by_key
            .get_mut(child.match_key())
            .and_then(|queue| queue.pop_front());
        match matched {
            Some(idx) => {
                used[idx] = true;
                common.push((child.as_ref(), b[idx].as_ref()));
            }
            None => removed.push(child.as_ref()),
        }
    }

    let added = b
        .iter()
        .enumerate()
        .filter(|(idx, _)| !used[*idx])
        .map(|(_, child)| child.as_ref())
        .collect();

    (removed, added, common)
}

/// Recursively diff two nodes matched by identity.
///
/// Returns an array of records: empty for no change, a single `modified`
/// wrapper when both sides have children and anything inside differs, or
/// the raw per-node attribute diff when either side is a leaf.
pub fn diff_nodes(
    a: &ApiNode,
    b: &ApiNode,
    base_exclude: &HashSet<String>,
    head_exclude: &HashSet<String>,
) -> Vec<DiffRecord> {
    if !(a.has_children() && b.has_children()) {
        return node_attr_diff(a, b);
    }

    let a_children: Vec<Arc<ApiNode>> = a
        .children
        .iter()
        .filter(|c| !base_exclude.contains(&c.qualified_name))
        .cloned()
        .collect();
    let b_children: Vec<Arc<ApiNode>> = b
        .children
        .iter()
        .filter(|c| !head_exclude.contains(&c.qualified_name))
        .cloned()
        .collect();

    let (removed, added, common) = partition_children(&a_children, &b_children);

    let mut children_diff = Vec::new();
    for node in removed {
        children_diff.push(DiffRecord::from_node_tagged(node, DiffTag::Removed));
    }
    for node in added {
        children_diff.push(DiffRecord::from_node_tagged(node, DiffTag::Added));
    }
    for (child_a, child_b) in common {
        children_diff.extend(diff_nodes(child_a, child_b, base_exclude, head_exclude));
    }

    children_diff.extend(node_attr_diff(a, b));

    if children_diff.is_empty() {
        return Vec::new();
    }

    vec![DiffRecord {
        qualified_name: a.qualified_name.clone(),
        node_type: a.kind.as_str().to_string(),
        tag: Some(DiffTag::Modified),
        children: children_diff,
        ..DiffRecord::default()
    }]
}

/// Find the head-side counterpart of a base root (and vice versa).
fn find_counterpart<'a>(
    node: &ApiNode,
    other: &'a NormalizedContext,
) -> Option<&'a Arc<ApiNode>> {
    if node.kind == NodeKind::Function {
        other.find_function(&node.qualified_name, &node.data_type)
    } else {
        other.find_by_qualified_name(&node.qualified_name)
    }
}

/// Diff two normalized contexts into the top-level difference array.
pub fn diff_trees(base: &NormalizedContext, head: &NormalizedContext) -> Vec<DiffRecord> {
    let mut diffs = Vec::new();

    for root in base.root_nodes() {
        if base.is_excluded(&root.qualified_name) {
            info!(qualified_name = %root.qualified_name, "excluding from diff");
            continue;
        }
        match find_counterpart(root, head) {
            None => diffs.push(DiffRecord::from_node_tagged(root, DiffTag::Removed)),
            Some(counterpart) => diffs.extend(diff_nodes(
                root,
                counterpart,
                &base.exclude_nodes,
                &head.exclude_nodes,
            )),
        }
    }

    for root in head.root_nodes() {
        if head.is_excluded(&root.qualified_name) {
            info!(qualified_name = %root.qualified_name, "excluding from diff");
            continue;
        }
        if find_counterpart(root, base).is_none() {
            diffs.push(DiffRecord::from_node_tagged(root, DiffTag::Added));
        }
    }

    diffs
}

/// Round-trip the diff tree through JSON and require an equal structure
/// back. The same inputs must always serialise to the same tree; a mismatch
/// is a logic error in the record model and aborts the run instead of
/// passing silently.
pub fn verify_diff_round_trip(diffs: &[DiffRecord]) -> Result<()> {
    let serialized = serde_json::to_string(diffs)?;
    let reparsed: Vec<DiffRecord> = serde_json::from_str(&serialized)?;
    if reparsed.as_slice() != diffs {
        return Err(ArmorError::Internal {
            message: "diff tree is not stable across a JSON round-trip".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(node: ApiNode) -> Arc<ApiNode> {
        Arc::new(node)
    }

    fn leaf(kind: NodeKind, qn: &str, data_type: &str) -> ApiNode {
        let mut node = ApiNode::new(kind, qn, qn);
        node.data_type = data_type.to_string();
        node
    }

    fn enum_node(qn: &str, enumerators: &[(&str, &str)]) -> ApiNode {
        let mut node = ApiNode::new(NodeKind::Enum, qn, format!("c:@E@{qn}"));
        for (name, value) in enumerators {
            let mut child = ApiNode::new(
                NodeKind::Enumerator,
                format!("{qn}.{name}"),
                format!("c:@E@{qn}@{name}"),
            );
            child.value = value.to_string();
            node.children.push(arc(child));
        }
        node
    }

    fn context_with_roots(roots: Vec<ApiNode>) -> NormalizedContext {
        let mut ctx = NormalizedContext::new();
        for root in roots {
            let shared = arc(root);
            ctx.add_node(&shared.usr.clone(), shared.clone());
            ctx.add_root_node(shared);
        }
        ctx
    }

    #[test]
    fn test_layout_change_excludes_enum_only() {
        assert!(!check_layout_change(&ApiNode::new(NodeKind::Enum, "E", "")));
        assert!(check_layout_change(&ApiNode::new(NodeKind::Struct, "S", "")));
        assert!(check_layout_change(&ApiNode::new(
            NodeKind::Function,
            "f",
            ""
        )));
    }

    #[test]
    fn test_reflexive_diff_is_empty() {
        let base = context_with_roots(vec![enum_node("E", &[("A", "0"), ("B", "1")])]);
        let head = context_with_roots(vec![enum_node("E", &[("A", "0"), ("B", "1")])]);
        assert!(diff_trees(&base, &head).is_empty());
    }

    #[test]
    fn test_removed_root_carries_full_subtree() {
        let base = context_with_roots(vec![enum_node("E", &[("A", "0")])]);
        let head = context_with_roots(vec![]);
        let diffs = diff_trees(&base, &head);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].tag, Some(DiffTag::Removed));
        assert_eq!(diffs[0].node_type, "Enum");
        assert_eq!(diffs[0].children.len(), 1);
        assert_eq!(diffs[0].children[0].qualified_name, "E.A");
    }

    #[test]
    fn test_enumerator_removed_and_added() {
        let base = context_with_roots(vec![enum_node("E", &[("A", "0"), ("B", "1"), ("C", "2")])]);
        let head = context_with_roots(vec![enum_node("E", &[("A", "0"), ("B", "1"), ("D", "2")])]);
        let diffs = diff_trees(&base, &head);

        assert_eq!(diffs.len(), 1);
        let modified = &diffs[0];
        assert_eq!(modified.tag, Some(DiffTag::Modified));
        assert_eq!(modified.qualified_name, "E");

        let tags: Vec<_> = modified
            .children
            .iter()
            .map(|c| (c.qualified_name.as_str(), c.tag))
            .collect();
        assert!(tags.contains(&("E.C", Some(DiffTag::Removed))));
        assert!(tags.contains(&("E.D", Some(DiffTag::Added))));
        assert_eq!(modified.children.len(), 2);
    }

    #[test]
    fn test_field_type_change_produces_nested_modified() {
        let mut s1 = ApiNode::new(NodeKind::Struct, "S", "c:@S@S");
        s1.children.push(arc(leaf(NodeKind::Field, "S.x", "int")));
        let mut s2 = ApiNode::new(NodeKind::Struct, "S", "c:@S@S");
        s2.children.push(arc(leaf(NodeKind::Field, "S.x", "long")));

        let diffs = diff_trees(
            &context_with_roots(vec![s1]),
            &context_with_roots(vec![s2]),
        );
        assert_eq!(diffs.len(), 1);
        let field_mod = &diffs[0].children[0];
        assert_eq!(field_mod.tag, Some(DiffTag::Modified));
        assert_eq!(field_mod.node_type, "Field");
        assert_eq!(field_mod.children[0].tag, Some(DiffTag::Removed));
        assert_eq!(field_mod.children[0].data_type, "int");
        assert_eq!(field_mod.children[1].tag, Some(DiffTag::Added));
        assert_eq!(field_mod.children[1].data_type, "long");
    }

    #[test]
    fn test_overloads_match_by_signature() {
        let mut f_int = leaf(NodeKind::Function, "f", "f(int)");
        f_int.usr = "u1".to_string();
        let mut f_long = leaf(NodeKind::Function, "f", "f(long)");
        f_long.usr = "u2".to_string();

        let base = context_with_roots(vec![f_int.clone(), f_long.clone()]);
        let head = context_with_roots(vec![f_long, f_int]);
        // Same overload set, different declaration order: no diff.
        assert!(diff_trees(&base, &head).is_empty());
    }

    #[test]
    fn test_overload_signature_change_is_remove_plus_add() {
        let mut f_int = leaf(NodeKind::Function, "f", "f(int)");
        f_int.usr = "u1".to_string();
        let mut f_char = leaf(NodeKind::Function, "f", "f(char)");
        f_char.usr = "u3".to_string();

        let diffs = diff_trees(
            &context_with_roots(vec![f_int]),
            &context_with_roots(vec![f_char]),
        );
        let tags: Vec<_> = diffs.iter().map(|d| d.tag).collect();
        assert_eq!(tags, vec![Some(DiffTag::Removed), Some(DiffTag::Added)]);
    }

    #[test]
    fn test_excluded_root_emits_nothing() {
        let mut base = context_with_roots(vec![enum_node("E", &[("A", "0")])]);
        base.exclude_nodes.insert("E".to_string());
        let head = context_with_roots(vec![]);
        assert!(diff_trees(&base, &head).is_empty());
    }

    #[test]
    fn test_excluded_child_emits_nothing() {
        let mut s1 = ApiNode::new(NodeKind::Struct, "S", "c:@S@S");
        s1.children.push(arc(leaf(NodeKind::Field, "S.x", "int")));
        s1.children.push(arc(leaf(NodeKind::Field, "S.y", "int")));
        let mut s2 = ApiNode::new(NodeKind::Struct, "S", "c:@S@S");
        s2.children.push(arc(leaf(NodeKind::Field, "S.x", "long")));

        let mut base = context_with_roots(vec![s1]);
        base.exclude_nodes.insert("S.x".to_string());
        base.exclude_nodes.insert("S.y".to_string());
        let mut head = context_with_roots(vec![s2]);
        head.exclude_nodes.insert("S.x".to_string());

        assert!(diff_trees(&base, &head).is_empty());
    }

    #[test]
    fn test_anti_symmetry_of_tags() {
        let base = context_with_roots(vec![enum_node("E", &[("A", "0"), ("C", "2")])]);
        let head = context_with_roots(vec![enum_node("E", &[("A", "0"), ("D", "2")])]);

        let forward = diff_trees(&base, &head);
        let backward = diff_trees(&head, &base);

        let collect_tags = |records: &[DiffRecord]| {
            let mut pairs: Vec<(String, DiffTag)> = Vec::new();
            let mut stack: Vec<&DiffRecord> = records.iter().collect();
            while let Some(record) = stack.pop() {
                if let Some(tag) = record.tag {
                    pairs.push((record.qualified_name.clone(), tag));
                }
                stack.extend(record.children.iter());
            }
            pairs.sort();
            pairs
        };

        let forward_inverted: Vec<_> = collect_tags(&forward)
            .into_iter()
            .map(|(qn, tag)| (qn, tag.inverted()))
            .collect();
        let mut backward_tags = collect_tags(&backward);
        backward_tags.sort();
        let mut forward_inverted = forward_inverted;
        forward_inverted.sort();
        assert_eq!(forward_inverted, backward_tags);
    }

    #[test]
    fn test_round_trip_guard_accepts_engine_output() {
        let base = context_with_roots(vec![enum_node("E", &[("A", "0"), ("C", "2")])]);
        let head = context_with_roots(vec![enum_node("E", &[("A", "0"), ("D", "2")])]);
        let diffs = diff_trees(&base, &head);
        assert!(verify_diff_round_trip(&diffs).is_ok());
        assert!(verify_diff_round_trip(&[]).is_ok());
    }

    #[test]
    fn test_function_attribute_snapshots() {
        let mut param = leaf(NodeKind::Parameter, "f.a", "int");
        param.usr = "p".to_string();

        let mut f1 = leaf(NodeKind::Function, "f", "f(int)");
        f1.storage = crate::model::StorageClass::None;
        f1.children.push(arc(param.clone()));
        let mut f2 = leaf(NodeKind::Function, "f", "f(int)");
        f2.storage = crate::model::StorageClass::Static;
        f2.children.push(arc(param));

        let diffs = diff_trees(
            &context_with_roots(vec![f1]),
            &context_with_roots(vec![f2]),
        );
        assert_eq!(diffs.len(), 1);
        let modified = &diffs[0];
        assert_eq!(modified.tag, Some(DiffTag::Modified));
        let snapshots: Vec<_> = modified
            .children
            .iter()
            .filter(|c| c.node_type == "Function")
            .collect();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].storage_qualifier.as_deref(), Some(""));
        assert_eq!(snapshots[1].storage_qualifier.as_deref(), Some("static"));
    }
}
