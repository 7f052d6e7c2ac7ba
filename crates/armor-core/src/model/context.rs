use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::node::{ApiNode, NodeKind};

/// Central repository for all API nodes normalized out of one parsed header.
///
/// Two structures are maintained:
///
/// 1. A flat map from unique key (USR) to node, so each API entity is
///    represented by a single shared object.
/// 2. An ordered list of root nodes (entities declared directly in the
///    header: free functions, typedefs, records, variables, macros).
///
/// A qualified-name index sits next to the map so the diff engine can match
/// roots by name; functions keep one index entry per overload in insertion
/// order.
///
/// The context is populated once by the tree builder, then read-only until
/// it is dropped after diff emission.
#[derive(Debug, Default)]
pub struct NormalizedContext {
    nodes: HashMap<String, Arc<ApiNode>>,
    by_qualified_name: HashMap<String, Vec<String>>,
    roots: Vec<Arc<ApiNode>>,

    /// Qualified names suppressed from diff reporting.
    pub exclude_nodes: HashSet<String>,
}

impl NormalizedContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context with an exclusion list.
    pub fn with_exclusions(exclude: impl IntoIterator<Item = String>) -> Self {
        Self {
            exclude_nodes: exclude.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Register a node under its unique key.
    ///
    /// An existing entry is not replaced; returns false when the key was
    /// already present. The qualified-name index always records the key so
    /// overloads (distinct USRs, same name) stay reachable by name.
    pub fn add_node(&mut self, key: &str, node: Arc<ApiNode>) -> bool {
        let qn = node.qualified_name.clone();
        if self.nodes.contains_key(key) {
            return false;
        }
        self.by_qualified_name
            .entry(qn)
            .or_default()
            .push(key.to_string());
        self.nodes.insert(key.to_string(), node);
        true
    }

    /// Look up a node by unique key.
    pub fn get_node(&self, key: &str) -> Option<&Arc<ApiNode>> {
        self.nodes.get(key)
    }

    /// First node registered under the given qualified name.
    pub fn find_by_qualified_name(&self, qualified_name: &str) -> Option<&Arc<ApiNode>> {
        self.by_qualified_name
            .get(qualified_name)?
            .first()
            .and_then(|key| self.nodes.get(key))
    }

    /// Function node matching both qualified name and signature key.
    ///
    /// Overloads share a qualified name but never a signature, so this pairs
    /// them one-to-one across contexts.
    pub fn find_function(&self, qualified_name: &str, signature: &str) -> Option<&Arc<ApiNode>> {
        self.by_qualified_name
            .get(qualified_name)?
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .find(|n| n.kind == NodeKind::Function && n.data_type == signature)
    }

    /// Append a top-level node.
    pub fn add_root_node(&mut self, root: Arc<ApiNode>) {
        self.roots.push(root);
    }

    /// Root nodes in source declaration order.
    pub fn root_nodes(&self) -> &[Arc<ApiNode>] {
        &self.roots
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when neither the map nor the root list holds anything.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.roots.is_empty()
    }

    /// True when the qualified name is suppressed from diff reporting.
    pub fn is_excluded(&self, qualified_name: &str) -> bool {
        self.exclude_nodes.contains(qualified_name)
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_qualified_name.clear();
        self.roots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::NodeKind;

    fn node(kind: NodeKind, qn: &str, usr: &str) -> Arc<ApiNode> {
        Arc::new(ApiNode::new(kind, qn, usr))
    }

    #[test]
    fn test_add_and_get_node() {
        let mut ctx = NormalizedContext::new();
        let n = node(NodeKind::Struct, "Device", "c:@S@Device");
        assert!(ctx.add_node("c:@S@Device", n.clone()));
        assert!(!ctx.add_node("c:@S@Device", n));
        assert_eq!(ctx.len(), 1);
        assert_eq!(
            ctx.get_node("c:@S@Device").unwrap().qualified_name,
            "Device"
        );
    }

    #[test]
    fn test_find_by_qualified_name() {
        let mut ctx = NormalizedContext::new();
        ctx.add_node("k1", node(NodeKind::Enum, "PowerLevel", "k1"));
        assert!(ctx.find_by_qualified_name("PowerLevel").is_some());
        assert!(ctx.find_by_qualified_name("Missing").is_none());
    }

    #[test]
    fn test_find_function_by_signature() {
        let mut ctx = NormalizedContext::new();
        let mut f1 = ApiNode::new(NodeKind::Function, "f", "u1");
        f1.data_type = "f(int)".to_string();
        let mut f2 = ApiNode::new(NodeKind::Function, "f", "u2");
        f2.data_type = "f(long)".to_string();
        ctx.add_node("u1", Arc::new(f1));
        ctx.add_node("u2", Arc::new(f2));

        assert_eq!(ctx.find_function("f", "f(long)").unwrap().usr, "u2");
        assert!(ctx.find_function("f", "f(char)").is_none());
    }

    #[test]
    fn test_exclusions() {
        let ctx = NormalizedContext::with_exclusions(vec!["Internal".to_string()]);
        assert!(ctx.is_excluded("Internal"));
        assert!(!ctx.is_excluded("Device"));
    }

    #[test]
    fn test_clear() {
        let mut ctx = NormalizedContext::new();
        ctx.add_node("k", node(NodeKind::Struct, "S", "k"));
        ctx.add_root_node(node(NodeKind::Struct, "S", "k"));
        assert!(!ctx.is_empty());
        ctx.clear();
        assert!(ctx.is_empty());
    }
}
