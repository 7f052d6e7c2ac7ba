//! Tree builder: walks the front-end's declaration tree and populates a
//! normalized context.
//!
//! Dispatch is a match over the declaration kind. Containers (records,
//! enums, namespaces) push onto a name stack and a node stack, build their
//! children, then pop; functions synthesise `ReturnType` and `Parameter`
//! children from their signature; function-pointer-valued typedefs and
//! fields get a `FunctionPointer` child with the same synthesis.

use std::sync::Arc;

use tracing::debug;

use crate::model::{ApiNode, NodeKind, NormalizedContext};
use crate::qualname::QualifiedNameBuilder;
use crate::source::{DeclKind, FunctionSig, ParsedHeader, SourceDecl};
use crate::typeinfo::unwrap_type;

/// The signature key used for overload discrimination: leaf name plus
/// parameter types in declared order. The return type is excluded so a
/// return-type change diffs as a modification of the same function.
pub fn signature_key(name: &str, sig: &FunctionSig) -> String {
    let types: Vec<&str> = sig
        .params
        .iter()
        .map(|p| p.type_spelling.as_str())
        .collect();
    format!("{}({})", name, types.join(", "))
}

pub struct TreeBuilder<'ctx> {
    context: &'ctx mut NormalizedContext,
    qualified_names: QualifiedNameBuilder,
    node_stack: Vec<ApiNode>,
}

impl<'ctx> TreeBuilder<'ctx> {
    pub fn new(context: &'ctx mut NormalizedContext) -> Self {
        Self {
            context,
            qualified_names: QualifiedNameBuilder::new(),
            node_stack: Vec::new(),
        }
    }

    /// Populate the context from a parsed header. After this returns the
    /// context is complete and treated as read-only.
    pub fn build(&mut self, header: &ParsedHeader) {
        for decl in &header.decls {
            self.build_decl(decl);
        }
    }

    fn build_decl(&mut self, decl: &SourceDecl) {
        if !decl.is_main_file {
            return;
        }
        match decl.kind {
            DeclKind::Namespace => self.build_container(decl, NodeKind::Namespace),
            DeclKind::Class => self.build_container(decl, NodeKind::Class),
            DeclKind::Struct => self.build_container(decl, NodeKind::Struct),
            DeclKind::Union => self.build_container(decl, NodeKind::Union),
            DeclKind::Enum => self.build_container(decl, NodeKind::Enum),
            DeclKind::Function => self.build_function(decl, NodeKind::Function),
            DeclKind::Method => self.build_function(decl, NodeKind::Method),
            DeclKind::Typedef => self.build_aliased(decl, NodeKind::Typedef),
            DeclKind::TypeAlias => self.build_aliased(decl, NodeKind::TypeAlias),
            DeclKind::Field => self.build_aliased(decl, NodeKind::Field),
            DeclKind::Variable => self.build_aliased(decl, NodeKind::Variable),
            DeclKind::Enumerator => self.build_leaf(decl, NodeKind::Enumerator),
            DeclKind::Macro => self.build_leaf(decl, NodeKind::Macro),
            DeclKind::BaseClass => self.build_leaf(decl, NodeKind::BaseClass),
            DeclKind::Unknown => {
                debug!(name = %decl.name, "skipping declaration of unknown kind");
            }
        }
    }

    /// Common node construction: identity, type, attributes, flags.
    fn make_node(&self, decl: &SourceDecl, kind: NodeKind) -> ApiNode {
        let qualified_name = self.qualified_names.qualify(&decl.name);
        let usr = if decl.usr.is_empty() {
            qualified_name.clone()
        } else {
            decl.usr.clone()
        };

        let unwrapped = unwrap_type(&decl.type_spelling);
        let mut node = ApiNode::new(kind, qualified_name, usr);
        node.data_type = decl.type_spelling.clone();
        node.type_name = decl.underlying_type.clone();
        node.value = decl.value.clone();
        node.access = decl.access;
        node.storage = decl.storage;
        node.const_qualifier = decl.const_qualifier;
        node.virtual_qualifier = decl.virtual_qualifier;
        node.function_calling_convention = decl.calling_convention.clone();
        node.is_inline = decl.is_inline;
        node.is_packed = decl.is_packed;
        node.is_pointer = unwrapped.is_pointer;
        node.is_reference = unwrapped.is_reference;
        node.is_r_value_ref = unwrapped.is_rvalue_ref;
        node
    }

    /// Synthesised subtrees are attached to their parent directly, so the
    /// flat map registration happens here.
    fn register_synthesised(&mut self, children: &[Arc<ApiNode>]) {
        for child in children {
            let key = child.usr.clone();
            self.context.add_node(&key, child.clone());
            self.register_synthesised(&child.children);
        }
    }

    /// Register a finished node in the context map and attach it to its
    /// parent, or to the roots when no scope is open.
    fn attach(&mut self, node: ApiNode) {
        let shared = Arc::new(node);
        let key = shared.usr.clone();
        if !self.context.add_node(&key, shared.clone()) {
            debug!(key = %key, "duplicate unique key, keeping first registration");
        }
        match self.node_stack.last_mut() {
            Some(parent) => parent.children.push(shared),
            None => self.context.add_root_node(shared),
        }
    }

    fn build_container(&mut self, decl: &SourceDecl, kind: NodeKind) {
        let node = self.make_node(decl, kind);
        self.qualified_names.push(&decl.name);
        self.node_stack.push(node);

        for child in &decl.children {
            self.build_decl(child);
        }

        self.qualified_names.pop();
        let node = self
            .node_stack
            .pop()
            .unwrap_or_else(|| self.make_node(decl, kind));
        self.attach(node);
    }

    fn build_function(&mut self, decl: &SourceDecl, kind: NodeKind) {
        let mut node = self.make_node(decl, kind);
        let sig = match &decl.signature {
            Some(sig) => sig.clone(),
            None => FunctionSig::default(),
        };
        node.data_type = signature_key(&decl.name, &sig);

        self.qualified_names.push(&decl.name);
        node.children = self.synthesise_signature_children(&sig);
        self.qualified_names.pop();

        let synthesised = node.children.clone();
        self.register_synthesised(&synthesised);
        self.attach(node);
    }

    /// `ReturnType` plus one `Parameter` per declared parameter, built
    /// inside the function's (or function pointer's) name scope.
    fn synthesise_signature_children(&self, sig: &FunctionSig) -> Vec<Arc<ApiNode>> {
        let mut children = Vec::with_capacity(sig.params.len() + 1);

        let return_qn = self.qualified_names.qualify("return");
        let mut ret = ApiNode::new(NodeKind::ReturnType, return_qn.clone(), return_qn);
        ret.data_type = sig.return_type.clone();
        children.push(Arc::new(ret));

        for (index, param) in sig.params.iter().enumerate() {
            let leaf = if param.name.is_empty() {
                format!("param{index}")
            } else {
                param.name.clone()
            };
            let param_qn = self.qualified_names.qualify(&leaf);
            let mut node = ApiNode::new(NodeKind::Parameter, param_qn.clone(), param_qn);
            let unwrapped = unwrap_type(&param.type_spelling);
            node.data_type = param.type_spelling.clone();
            node.value = param.default_value.clone();
            node.is_pointer = unwrapped.is_pointer;
            node.is_reference = unwrapped.is_reference;
            node.is_r_value_ref = unwrapped.is_rvalue_ref;
            children.push(Arc::new(node));
        }

        children
    }

    /// Typedefs, type aliases, fields, and variables: plain leaves unless
    /// they carry a function-pointer declarator, in which case a
    /// `FunctionPointer` child with synthesised signature children hangs
    /// below them.
    fn build_aliased(&mut self, decl: &SourceDecl, kind: NodeKind) {
        let mut node = self.make_node(decl, kind);

        if let Some(sig) = &decl.signature {
            let fp_qn = node.qualified_name.clone();
            let mut fp = ApiNode::new(NodeKind::FunctionPointer, fp_qn, format!("c:@FP@{}", node.usr));
            fp.data_type = node.data_type.clone();

            self.qualified_names.push(&decl.name);
            fp.children = self.synthesise_signature_children(sig);
            self.qualified_names.pop();

            node.children.push(Arc::new(fp));
            let synthesised = node.children.clone();
            self.register_synthesised(&synthesised);
        }

        self.attach(node);
    }

    fn build_leaf(&mut self, decl: &SourceDecl, kind: NodeKind) {
        let node = self.make_node(decl, kind);
        self.attach(node);
    }
}

/// Build a populated context for one parsed header.
pub fn build_context(header: &ParsedHeader, exclude: Vec<String>) -> NormalizedContext {
    let mut context = NormalizedContext::with_exclusions(exclude);
    TreeBuilder::new(&mut context).build(header);
    context
}
