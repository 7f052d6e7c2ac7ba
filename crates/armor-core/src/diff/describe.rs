//! Change describer.
//!
//! Translates the difference tree into atomic change records: one
//! human-readable row per elementary change, each carrying the API identity
//! and the compatibility verdict.

use std::collections::{BTreeMap, BTreeSet};

use crate::diff::model::{DiffRecord, DiffTag};
use crate::qualname::{qname_leaf, qname_stem};

/// Change category of an atomic record.
///
/// Only a top-level addition counts as new functionality; everything else
/// (removal, modification, nested addition, attribute change) alters the
/// existing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCategory {
    FunctionalityChanged,
    CompatibilityChanged,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::FunctionalityChanged => "Functionality_changed",
            ChangeCategory::CompatibilityChanged => "Compatibility_changed",
        }
    }

    /// The compatibility verdict is a function of the category and nothing
    /// else; no caller overrides this mapping.
    pub fn compatibility(&self) -> &'static str {
        match self {
            ChangeCategory::FunctionalityChanged => "backward_compatible",
            ChangeCategory::CompatibilityChanged => "backward_incompatible",
        }
    }
}

/// A single human-readable row describing one elementary change.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicChange {
    pub headerfile: String,
    pub name: String,
    pub description: String,
    pub changetype: ChangeCategory,
}

impl AtomicChange {
    pub fn compatibility(&self) -> &'static str {
        self.changetype.compatibility()
    }
}

/// Raw change kind before categorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawChange {
    Added,
    Removed,
    Modified,
    AttrChanged,
}

fn categorise(raw: RawChange, top_level: bool) -> ChangeCategory {
    if raw == RawChange::Added && top_level {
        ChangeCategory::FunctionalityChanged
    } else {
        ChangeCategory::CompatibilityChanged
    }
}

fn record(
    headerfile: &str,
    name: &str,
    detail: String,
    raw: RawChange,
    top_level: bool,
) -> AtomicChange {
    AtomicChange {
        headerfile: headerfile.to_string(),
        name: name.to_string(),
        description: detail,
        changetype: categorise(raw, top_level),
    }
}

// ---------------------------------------------------------------------------
// Function-diff helpers
// ---------------------------------------------------------------------------

fn inline_to_str(snapshot: Option<&DiffRecord>) -> String {
    match snapshot.and_then(|s| s.is_inline) {
        Some(true) => "true".to_string(),
        Some(false) => "false".to_string(),
        None => String::new(),
    }
}

fn attr_change_row(
    rows: &mut Vec<AtomicChange>,
    headerfile: &str,
    func_name: &str,
    attr: &str,
    old: &str,
    new: &str,
) {
    if old == new {
        return;
    }
    let detail = if !old.is_empty() && new.is_empty() {
        format!("Function attribute {attr} removed '{old}'")
    } else if old.is_empty() && !new.is_empty() {
        format!("Function attribute {attr} added '{new}'")
    } else {
        format!("Function attribute {attr} changed from '{old}' to '{new}'")
    };
    rows.push(record(
        headerfile,
        func_name,
        detail,
        RawChange::AttrChanged,
        false,
    ));
}

/// Compare function-level attributes between the removed/added snapshots of
/// a modified function.
fn diff_function_attributes(
    headerfile: &str,
    func_name: &str,
    removed_fn: Option<&DiffRecord>,
    added_fn: Option<&DiffRecord>,
) -> Vec<AtomicChange> {
    let mut rows = Vec::new();
    fn get(snapshot: Option<&DiffRecord>, field: fn(&DiffRecord) -> Option<&String>) -> String {
        snapshot.and_then(field).cloned().unwrap_or_default()
    }

    attr_change_row(
        &mut rows,
        headerfile,
        func_name,
        "storageQualifier",
        &get(removed_fn, |s| s.storage_qualifier.as_ref()),
        &get(added_fn, |s| s.storage_qualifier.as_ref()),
    );
    attr_change_row(
        &mut rows,
        headerfile,
        func_name,
        "functionCallingConvention",
        &get(removed_fn, |s| s.calling_convention.as_ref()),
        &get(added_fn, |s| s.calling_convention.as_ref()),
    );
    attr_change_row(
        &mut rows,
        headerfile,
        func_name,
        "inline",
        &inline_to_str(removed_fn),
        &inline_to_str(added_fn),
    );
    rows
}

/// Describe a modified `Parameter`/`ReturnType` node carrying removed/added
/// snapshot children.
fn diff_nested_mod_node(
    headerfile: &str,
    api_name: &str,
    mod_node: &DiffRecord,
) -> Vec<AtomicChange> {
    let removed = mod_node
        .children
        .iter()
        .find(|c| c.tag == Some(DiffTag::Removed));
    let added = mod_node
        .children
        .iter()
        .find(|c| c.tag == Some(DiffTag::Added));

    let (removed, added) = match (removed, added) {
        (Some(r), Some(a)) => (r, a),
        _ => return Vec::new(),
    };

    let sub_type = if removed.node_type.is_empty() {
        mod_node.node_type.as_str()
    } else {
        removed.node_type.as_str()
    };
    let name_leaf = qname_leaf(&removed.qualified_name);
    let detail = if sub_type == "ReturnType" {
        format!(
            "Return type changed from '{}' to '{}'",
            removed.data_type, added.data_type
        )
    } else {
        format!(
            "{} '{}' type changed from '{}' to '{}'",
            sub_type, name_leaf, removed.data_type, added.data_type
        )
    };
    vec![record(
        headerfile,
        api_name,
        detail,
        RawChange::Modified,
        false,
    )]
}

fn looks_like_rename(removed: &DiffRecord, added: &DiffRecord) -> bool {
    removed.node_type == "Parameter"
        && added.node_type == "Parameter"
        && !removed.data_type.is_empty()
        && removed.data_type == added.data_type
}

/// Describe direct `Parameter` additions/removals under a modified function,
/// pairing same-typed remove/add as a rename.
fn diff_direct_param_nodes(
    headerfile: &str,
    api_name: &str,
    removed_params: &[&DiffRecord],
    added_params: &[&DiffRecord],
) -> Vec<AtomicChange> {
    let mut rows = Vec::new();

    // Deterministic processing order, keyed by data type.
    let mut removed_sorted: Vec<&DiffRecord> = removed_params.to_vec();
    removed_sorted.sort_by(|a, b| {
        (&a.data_type, &a.qualified_name).cmp(&(&b.data_type, &b.qualified_name))
    });
    let mut added_sorted: Vec<&DiffRecord> = added_params.to_vec();
    added_sorted.sort_by(|a, b| {
        (&a.data_type, &a.qualified_name).cmp(&(&b.data_type, &b.qualified_name))
    });

    let mut matched_removed = vec![false; removed_sorted.len()];
    let mut matched_added = vec![false; added_sorted.len()];

    for (r_idx, removed) in removed_sorted.iter().enumerate() {
        for (a_idx, added) in added_sorted.iter().enumerate() {
            if matched_added[a_idx] {
                continue;
            }
            if looks_like_rename(removed, added) {
                let old_name = qname_leaf(&removed.qualified_name);
                let new_name = qname_leaf(&added.qualified_name);
                rows.push(record(
                    headerfile,
                    api_name,
                    format!(
                        "Parameter renamed from '{}' to '{}' (type '{}')",
                        old_name, new_name, removed.data_type
                    ),
                    RawChange::Modified,
                    false,
                ));
                matched_removed[r_idx] = true;
                matched_added[a_idx] = true;
                break;
            }
        }
    }

    for (r_idx, removed) in removed_sorted.iter().enumerate() {
        if matched_removed[r_idx] {
            continue;
        }
        rows.push(record(
            headerfile,
            api_name,
            format!(
                "Parameter '{}' removed (type '{}')",
                qname_leaf(&removed.qualified_name),
                removed.data_type
            ),
            RawChange::Removed,
            false,
        ));
    }

    for (a_idx, added) in added_sorted.iter().enumerate() {
        if matched_added[a_idx] {
            continue;
        }
        rows.push(record(
            headerfile,
            api_name,
            format!(
                "Parameter '{}' added (type '{}')",
                qname_leaf(&added.qualified_name),
                added.data_type
            ),
            RawChange::Added,
            false,
        ));
    }

    rows
}

// ---------------------------------------------------------------------------
// Non-function recursive describer
// ---------------------------------------------------------------------------

fn added_removed_line(lines: &mut Vec<String>, verb: &str, record: &DiffRecord) {
    if record.data_type.is_empty() {
        lines.push(format!(
            "{} {}: '{}'",
            record.node_type, verb, record.qualified_name
        ));
    } else {
        lines.push(format!(
            "{} {}: '{}' with type '{}'",
            record.node_type, verb, record.qualified_name, record.data_type
        ));
    }
}

/// Enumerate the children of a wholly added/removed container. Children of
/// a projected subtree carry no tags of their own; they inherit the
/// parent's.
fn emit_added_removed_children(node: &DiffRecord, lines: &mut Vec<String>, parent_tag: DiffTag) {
    for child in &node.children {
        let effective = child.tag.unwrap_or(parent_tag);
        match effective {
            DiffTag::Added => added_removed_line(lines, "added", child),
            DiffTag::Removed => added_removed_line(lines, "removed", child),
            DiffTag::Modified => {
                // A tagged modification inside a projected subtree: pair its
                // removed/added grandchildren directly.
                describe_modified_children(child, lines);
                continue;
            }
        }
        if !child.children.is_empty() {
            emit_added_removed_children(child, lines, effective);
        }
    }
}

/// Pair the removed/added children of a modified node into type-change
/// lines, with relaxed stem-matching for renamed parameters.
fn describe_modified_children(node: &DiffRecord, lines: &mut Vec<String>) {
    type Key = (String, String);
    let mut removed_items: BTreeMap<Key, &DiffRecord> = BTreeMap::new();
    let mut added_items: BTreeMap<Key, &DiffRecord> = BTreeMap::new();

    for child in &node.children {
        let key = (child.qualified_name.clone(), child.node_type.clone());
        match child.tag {
            Some(DiffTag::Removed) => {
                removed_items.insert(key, child);
            }
            Some(DiffTag::Added) => {
                added_items.insert(key, child);
            }
            Some(DiffTag::Modified) => describe_modified_children(child, lines),
            None if !child.children.is_empty() => describe_modified_children(child, lines),
            None => {}
        }
    }

    let mut consumed_added: BTreeSet<Key> = BTreeSet::new();

    for (key, removed) in &removed_items {
        let sub_type = removed.node_type.as_str();
        let removed_qn = removed.qualified_name.as_str();

        // Exact (qualifiedName, nodeType) counterpart: a direct type change.
        if let Some(added) = added_items.get(key) {
            let display_qn = if sub_type == "ReturnType" {
                qname_stem(removed_qn)
            } else {
                removed_qn
            };
            if !removed.data_type.is_empty() && !added.data_type.is_empty() {
                lines.push(format!(
                    "{} '{}' type changed from '{}' to '{}'",
                    sub_type, display_qn, removed.data_type, added.data_type
                ));
            } else {
                lines.push(format!("{} modified: '{}'", sub_type, display_qn));
            }
            consumed_added.insert(key.clone());
            continue;
        }

        // Renamed parameter: same enclosing function, different leaf name.
        if sub_type == "Parameter" {
            let stem = qname_stem(removed_qn);
            let candidate = added_items.iter().find(|(a_key, added)| {
                added.node_type == "Parameter"
                    && !consumed_added.contains(*a_key)
                    && qname_stem(&added.qualified_name) == stem
            });
            if let Some((a_key, added)) = candidate {
                if !removed.data_type.is_empty() && !added.data_type.is_empty() {
                    lines.push(format!(
                        "Parameter modified: '{}' type changed from '{}' to '{}'",
                        stem, removed.data_type, added.data_type
                    ));
                } else {
                    lines.push(format!("Parameter modified: '{}'", stem));
                }
                consumed_added.insert(a_key.clone());
                continue;
            }
        }

        added_removed_line(lines, "removed", removed);
    }

    for (key, added) in &added_items {
        if removed_items.contains_key(key) || consumed_added.contains(key) {
            continue;
        }
        added_removed_line(lines, "added", added);
    }
}

/// Recursively generate description lines for a non-function change tree.
fn describe_non_function(node: &DiffRecord, lines: &mut Vec<String>) {
    match node.tag {
        Some(DiffTag::Added) => {
            added_removed_line(lines, "added", node);
            emit_added_removed_children(node, lines, DiffTag::Added);
        }
        Some(DiffTag::Removed) => {
            added_removed_line(lines, "removed", node);
            emit_added_removed_children(node, lines, DiffTag::Removed);
        }
        Some(DiffTag::Modified) => describe_modified_children(node, lines),
        None => {}
    }
}

fn generate_non_function_description(item: &DiffRecord) -> String {
    let mut lines = Vec::new();
    describe_non_function(item, &mut lines);
    if lines.is_empty() {
        let tag = item.tag.map(|t| t.as_str()).unwrap_or("");
        return format!("{} {}: '{}'", item.node_type, tag, item.qualified_name);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Turn the top-level difference array into atomic change records.
pub fn describe_changes(differences: &[DiffRecord], headerfile: &str) -> Vec<AtomicChange> {
    let mut processed = Vec::new();

    for change in differences {
        let api_name = if change.qualified_name.is_empty() {
            "Unknown"
        } else {
            change.qualified_name.as_str()
        };

        if change.node_type != "Function" {
            let raw = match change.tag {
                Some(DiffTag::Added) => RawChange::Added,
                Some(DiffTag::Removed) => RawChange::Removed,
                _ => RawChange::Modified,
            };
            processed.push(record(
                headerfile,
                api_name,
                generate_non_function_description(change),
                raw,
                change.tag == Some(DiffTag::Added),
            ));
            continue;
        }

        match change.tag {
            Some(DiffTag::Added) => {
                processed.push(record(
                    headerfile,
                    api_name,
                    "Function added".to_string(),
                    RawChange::Added,
                    true,
                ));
                continue;
            }
            Some(DiffTag::Removed) => {
                processed.push(record(
                    headerfile,
                    api_name,
                    "Function removed".to_string(),
                    RawChange::Removed,
                    false,
                ));
                continue;
            }
            _ => {}
        }

        // Modified function: inspect internals.
        let mut rows = Vec::new();
        let mut removed_fn = None;
        let mut added_fn = None;
        let mut direct_removed_params = Vec::new();
        let mut direct_added_params = Vec::new();

        for child in &change.children {
            match (child.node_type.as_str(), child.tag) {
                ("Function", Some(DiffTag::Removed)) => removed_fn = Some(child),
                ("Function", Some(DiffTag::Added)) => added_fn = Some(child),
                ("Parameter" | "ReturnType", Some(DiffTag::Modified)) => {
                    rows.extend(diff_nested_mod_node(headerfile, api_name, child));
                }
                ("Parameter", Some(DiffTag::Removed)) => direct_removed_params.push(child),
                ("Parameter", Some(DiffTag::Added)) => direct_added_params.push(child),
                _ => {}
            }
        }

        if removed_fn.is_some() || added_fn.is_some() {
            rows.extend(diff_function_attributes(
                headerfile, api_name, removed_fn, added_fn,
            ));
        }

        if !direct_removed_params.is_empty() || !direct_added_params.is_empty() {
            rows.extend(diff_direct_param_nodes(
                headerfile,
                api_name,
                &direct_removed_params,
                &direct_added_params,
            ));
        }

        if rows.is_empty() {
            rows.push(record(
                headerfile,
                api_name,
                "Function modified".to_string(),
                RawChange::Modified,
                false,
            ));
        }

        processed.extend(rows);
    }

    processed
}
