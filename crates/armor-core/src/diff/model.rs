//! Diff output types.
//!
//! The difference tree is a pure JSON value: records hold owned strings and
//! nested records, never references back into the contexts they were
//! computed from.

use serde::{Deserialize, Serialize};

use crate::model::ApiNode;

/// Tag describing what happened to a node between base and head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Added,
    Removed,
    Modified,
}

impl DiffTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffTag::Added => "added",
            DiffTag::Removed => "removed",
            DiffTag::Modified => "modified",
        }
    }

    /// The tag a record would carry if base and head were exchanged.
    pub fn inverted(&self) -> DiffTag {
        match self {
            DiffTag::Added => DiffTag::Removed,
            DiffTag::Removed => DiffTag::Added,
            DiffTag::Modified => DiffTag::Modified,
        }
    }
}

/// One record in the difference tree.
///
/// Only the top record of an emitted subtree carries a tag; untagged
/// children inherit their parent's meaning. The snapshot fields
/// (`storage_qualifier`, `calling_convention`, `is_inline`) appear only on
/// the attribute snapshots a modified `Function` carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiffRecord {
    #[serde(
        rename = "qualifiedName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub qualified_name: String,

    #[serde(rename = "nodeType")]
    pub node_type: String,

    #[serde(rename = "dataType", default, skip_serializing_if = "String::is_empty")]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<DiffTag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffRecord>,

    #[serde(
        rename = "storageQualifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_qualifier: Option<String>,

    #[serde(
        rename = "functionCallingConvention",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub calling_convention: Option<String>,

    #[serde(rename = "inline", default, skip_serializing_if = "Option::is_none")]
    pub is_inline: Option<bool>,
}

impl DiffRecord {
    /// Project a node and its whole subtree into an untagged record.
    pub fn from_node(node: &ApiNode) -> Self {
        DiffRecord {
            qualified_name: node.qualified_name.clone(),
            node_type: node.kind.as_str().to_string(),
            data_type: node.data_type.clone(),
            children: node.children.iter().map(|c| Self::from_node(c)).collect(),
            ..Self::default()
        }
    }

    /// Project a node subtree and tag the top record.
    pub fn from_node_tagged(node: &ApiNode, tag: DiffTag) -> Self {
        let mut record = Self::from_node(node);
        record.tag = Some(tag);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use std::sync::Arc;

    #[test]
    fn test_tag_serialization_is_lowercase() {
        assert_eq!(serde_json::to_string(&DiffTag::Added).unwrap(), "\"added\"");
        assert_eq!(
            serde_json::to_string(&DiffTag::Modified).unwrap(),
            "\"modified\""
        );
    }

    #[test]
    fn test_tag_inversion() {
        assert_eq!(DiffTag::Added.inverted(), DiffTag::Removed);
        assert_eq!(DiffTag::Removed.inverted(), DiffTag::Added);
        assert_eq!(DiffTag::Modified.inverted(), DiffTag::Modified);
    }

    #[test]
    fn test_from_node_carries_subtree_untagged() {
        let mut e = ApiNode::new(NodeKind::Enum, "E", "");
        let mut a = ApiNode::new(NodeKind::Enumerator, "E.A", "");
        a.value = "0".to_string();
        e.children.push(Arc::new(a));

        let record = DiffRecord::from_node_tagged(&e, DiffTag::Removed);
        assert_eq!(record.tag, Some(DiffTag::Removed));
        assert_eq!(record.node_type, "Enum");
        assert_eq!(record.children.len(), 1);
        assert_eq!(record.children[0].tag, None);
        assert_eq!(record.children[0].qualified_name, "E.A");
    }

    #[test]
    fn test_empty_fields_are_omitted_from_json() {
        let record = DiffRecord {
            qualified_name: "f".to_string(),
            node_type: "Function".to_string(),
            tag: Some(DiffTag::Added),
            ..DiffRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("dataType").is_none());
        assert!(json.get("children").is_none());
        assert!(json.get("storageQualifier").is_none());
        assert_eq!(json["tag"], "added");
    }

    #[test]
    fn test_round_trip() {
        let record = DiffRecord {
            qualified_name: "S".to_string(),
            node_type: "Struct".to_string(),
            tag: Some(DiffTag::Modified),
            children: vec![DiffRecord {
                qualified_name: "S.x".to_string(),
                node_type: "Field".to_string(),
                data_type: "int".to_string(),
                tag: Some(DiffTag::Removed),
                ..DiffRecord::default()
            }],
            ..DiffRecord::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: DiffRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
