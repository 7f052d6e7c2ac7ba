//! CST-to-declaration extraction.
//!
//! Walks a tree-sitter parse tree and projects the declarations a header
//! exposes into the core's [`SourceDecl`] contract. Handles the dominant C
//! API idioms (typedef'd structs/enums/unions, nested types, arrays,
//! bit-fields, function pointers, macros) plus the C++ constructs a public
//! header commonly carries (namespaces, classes with access specifiers and
//! bases, using-aliases).

use std::collections::HashMap;

use tracing::{debug, warn};
use tree_sitter::Node;

use armor_core::build::signature_key;
use armor_core::model::{AccessSpec, ConstQualifier, StorageClass, VirtualQualifier};
use armor_core::source::{DeclKind, FunctionSig, ParamDecl, SourceDecl};

use crate::usr;

/// Calling conventions the front-end recognises; anything else is ignored.
const CALLING_CONVENTIONS: &[&str] = &[
    "__cdecl",
    "__stdcall",
    "__fastcall",
    "__thiscall",
    "__vectorcall",
    "__regcall",
    "__pascal",
];

/// Everything learned by walking one declarator chain.
#[derive(Default)]
struct DeclaratorInfo<'t> {
    name: String,
    pointers: usize,
    reference: Option<&'static str>,
    array_suffix: String,
    value: String,
    /// `parameter_list` of a function declarator, when one is in the chain.
    params: Option<Node<'t>>,
    is_function: bool,
    /// True for `(*name)(...)` shapes.
    is_fn_pointer: bool,
}

pub(crate) struct Extractor<'src> {
    source: &'src [u8],
    path: Vec<String>,
    anon_counter: u32,
    typedefs: HashMap<String, String>,
}

impl<'src> Extractor<'src> {
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            source,
            path: Vec::new(),
            anon_counter: 0,
            typedefs: HashMap::new(),
        }
    }

    pub fn extract_translation_unit(&mut self, root: Node) -> Vec<SourceDecl> {
        let mut decls = Vec::new();
        self.extract_scope_items(root, AccessSpec::None, &mut decls);
        decls
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn next_anon_name(&mut self) -> String {
        let name = format!("__anon{}", self.anon_counter);
        self.anon_counter += 1;
        name
    }

    fn extract_scope_items(&mut self, node: Node, access: AccessSpec, out: &mut Vec<SourceDecl>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.extract_item(child, access, out);
        }
    }

    fn extract_item(&mut self, node: Node, access: AccessSpec, out: &mut Vec<SourceDecl>) {
        match node.kind() {
            "preproc_def" | "preproc_function_def" => {
                if let Some(decl) = self.extract_macro(node) {
                    out.push(decl);
                }
            }
            // Conditional blocks (include guards above all) are transparent:
            // their contents surface as if unconditional.
            "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif"
            | "preproc_elifdef" => {
                self.extract_scope_items(node, access, out);
            }
            "type_definition" => self.extract_type_definition(node, access, out),
            "declaration" => self.extract_declaration(node, access, out),
            "function_definition" => {
                if let Some(decl) = self.extract_function(node, access, DeclKind::Function) {
                    out.push(decl);
                }
            }
            "struct_specifier" | "union_specifier" | "class_specifier" | "enum_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    let decl = self.extract_container(node, None, access);
                    out.push(decl);
                }
            }
            "namespace_definition" => self.extract_namespace(node, out),
            "alias_declaration" => {
                if let Some(decl) = self.extract_using_alias(node, access) {
                    out.push(decl);
                }
            }
            "template_declaration" => {
                debug!("skipping template declaration (templates are not normalized)");
            }
            "ERROR" => {
                warn!(snippet = %self.text(node).chars().take(48).collect::<String>(),
                      "skipping declaration the parser could not understand");
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------
    // Declarator and type plumbing
    // -----------------------------------------------------------------

    /// Base type text of a declaration-like node: qualifiers and specifiers
    /// joined, declarators excluded.
    fn base_type_text(&self, node: Node) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "primitive_type" | "type_identifier" | "sized_type_specifier"
                | "template_type" | "qualified_identifier" => {
                    parts.push(self.text(child).to_string());
                }
                "type_qualifier" => {
                    parts.push(self.text(child).to_string());
                }
                "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => {
                    let tag = match child.kind() {
                        "struct_specifier" => "struct",
                        "union_specifier" => "union",
                        "class_specifier" => "class",
                        _ => "enum",
                    };
                    match child.child_by_field_name("name") {
                        Some(name) => parts.push(format!("{} {}", tag, self.text(name))),
                        None => parts.push(tag.to_string()),
                    }
                }
                _ => {}
            }
        }
        parts.join(" ")
    }

    /// Walk a declarator chain collecting name, pointer levels, array
    /// extents, references, initialiser, and any function parameter list.
    fn declarator_info<'t>(&self, node: Node<'t>) -> DeclaratorInfo<'t> {
        let mut info = DeclaratorInfo::default();
        let mut current = Some(node);

        while let Some(node) = current {
            match node.kind() {
                "init_declarator" => {
                    if let Some(value) = node.child_by_field_name("value") {
                        info.value = self.text(value).to_string();
                    }
                    current = node.child_by_field_name("declarator");
                }
                "pointer_declarator" | "abstract_pointer_declarator" => {
                    info.pointers += 1;
                    current = node
                        .child_by_field_name("declarator")
                        .or_else(|| first_declarator_child(node));
                }
                "reference_declarator" | "abstract_reference_declarator" => {
                    info.reference = Some(if self.text(node).starts_with("&&") {
                        "&&"
                    } else {
                        "&"
                    });
                    current = node
                        .child_by_field_name("declarator")
                        .or_else(|| first_declarator_child(node));
                }
                "array_declarator" => {
                    match node.child_by_field_name("size") {
                        Some(size) => {
                            info.array_suffix =
                                format!("[{}]{}", self.text(size), info.array_suffix)
                        }
                        None => info.array_suffix = format!("[]{}", info.array_suffix),
                    }
                    current = node.child_by_field_name("declarator");
                }
                "function_declarator" => {
                    info.is_function = true;
                    info.params = node.child_by_field_name("parameters");
                    let inner = node.child_by_field_name("declarator");
                    if let Some(inner) = inner {
                        if inner.kind() == "parenthesized_declarator" {
                            info.is_fn_pointer = true;
                        }
                    }
                    current = inner;
                }
                "parenthesized_declarator" => {
                    current = first_declarator_child(node);
                }
                "identifier" | "field_identifier" | "type_identifier" => {
                    info.name = self.text(node).to_string();
                    current = None;
                }
                _ => {
                    current = first_declarator_child(node);
                }
            }
        }

        info
    }

    /// Full declared type spelling: base, pointers, reference, array
    /// extents.
    fn compose_type(&self, base: &str, info: &DeclaratorInfo) -> String {
        let mut spelling = base.to_string();
        if info.pointers > 0 {
            spelling.push(' ');
            spelling.push_str(&"*".repeat(info.pointers));
        }
        if let Some(reference) = info.reference {
            spelling.push(' ');
            spelling.push_str(reference);
        }
        spelling.push_str(&info.array_suffix);
        spelling
    }

    /// Typedef-resolved underlying spelling for a declared type, empty when
    /// the terminal type is not a known alias.
    fn resolve_underlying(&self, type_spelling: &str) -> String {
        let terminal = type_spelling
            .trim_end_matches(|c: char| c == '*' || c == '&' || c.is_whitespace())
            .trim();
        let terminal = match terminal.find('[') {
            Some(pos) => terminal[..pos].trim_end(),
            None => terminal,
        };
        self.typedefs.get(terminal).cloned().unwrap_or_default()
    }

    fn storage_class(&self, node: Node) -> StorageClass {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "storage_class_specifier" {
                return match self.text(child) {
                    "static" => StorageClass::Static,
                    "extern" => StorageClass::Extern,
                    "register" => StorageClass::Register,
                    "auto" => StorageClass::Auto,
                    _ => StorageClass::None,
                };
            }
        }
        StorageClass::None
    }

    fn const_qualifier(&self, node: Node) -> ConstQualifier {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "type_qualifier" if self.text(child) == "const" => return ConstQualifier::Const,
                "type_qualifier" | "storage_class_specifier"
                    if self.text(child) == "constexpr" =>
                {
                    return ConstQualifier::ConstExpr
                }
                _ => {}
            }
        }
        ConstQualifier::None
    }

    fn is_inline(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let result = node
            .children(&mut cursor)
            .any(|c| c.kind() == "storage_class_specifier" && self.text(c) == "inline");
        result
    }

    fn calling_convention(&self, node: Node) -> String {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "ms_call_modifier" {
                let text = self.text(child);
                if CALLING_CONVENTIONS.contains(&text) {
                    return text.to_string();
                }
            }
        }
        String::new()
    }

    fn is_packed(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let result = node.children(&mut cursor).any(|c| {
            matches!(c.kind(), "attribute_specifier" | "attribute_declaration")
                && self.text(c).contains("packed")
        });
        result
    }

    fn virtual_qualifier(&self, node: Node) -> VirtualQualifier {
        let mut saw_virtual = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "virtual" | "virtual_function_specifier" => saw_virtual = true,
                "virtual_specifier" if self.text(child) == "override" => {
                    return VirtualQualifier::Override;
                }
                _ => {}
            }
        }
        if saw_virtual {
            // `= 0` marks a pure virtual method
            if self.text(node).trim_end().trim_end_matches(';').trim_end().ends_with("= 0") {
                return VirtualQualifier::PureVirtual;
            }
            return VirtualQualifier::Virtual;
        }
        VirtualQualifier::None
    }

    // -----------------------------------------------------------------
    // Declaration kinds
    // -----------------------------------------------------------------

    fn extract_macro(&mut self, node: Node) -> Option<SourceDecl> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.text(name_node).to_string();
        let mut decl = SourceDecl::new(DeclKind::Macro, name.clone());
        decl.usr = usr::decl_usr(DeclKind::Macro, &self.path, &name);
        if let Some(value) = node.child_by_field_name("value") {
            decl.value = self.text(value).trim().to_string();
        }
        if node.kind() == "preproc_function_def" {
            if let Some(params) = node.child_by_field_name("parameters") {
                decl.type_spelling = self.text(params).to_string();
            }
        }
        Some(decl)
    }

    fn extract_namespace(&mut self, node: Node, out: &mut Vec<SourceDecl>) {
        let name = match node.child_by_field_name("name") {
            Some(name) => self.text(name).to_string(),
            None => self.next_anon_name(),
        };
        let mut decl = SourceDecl::new(DeclKind::Namespace, name.clone());
        decl.usr = usr::decl_usr(DeclKind::Namespace, &self.path, &name);

        if let Some(body) = node.child_by_field_name("body") {
            self.path.push(name);
            let mut children = Vec::new();
            self.extract_scope_items(body, AccessSpec::None, &mut children);
            self.path.pop();
            decl.children = children;
        }
        out.push(decl);
    }

    fn extract_using_alias(&mut self, node: Node, _access: AccessSpec) -> Option<SourceDecl> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.text(name_node).to_string();
        let underlying = node
            .child_by_field_name("type")
            .map(|t| self.text(t).to_string())
            .unwrap_or_default();

        let mut decl = SourceDecl::new(DeclKind::TypeAlias, name.clone());
        decl.usr = usr::decl_usr(DeclKind::TypeAlias, &self.path, &name);
        decl.type_spelling = underlying.clone();
        decl.underlying_type = self.resolve_underlying(&underlying);
        self.typedefs.insert(name, underlying);
        Some(decl)
    }

    /// `typedef` handling: named records/enums, function-pointer typedefs,
    /// and plain aliases.
    fn extract_type_definition(
        &mut self,
        node: Node,
        access: AccessSpec,
        out: &mut Vec<SourceDecl>,
    ) {
        // Direct type_identifier children are the declared alias names;
        // a specifier child carries the underlying definition.
        let mut specifier: Option<Node> = None;
        let mut alias: Option<String> = None;
        let mut fn_declarator: Option<Node> = None;
        let mut other_declarator: Option<Node> = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => {
                    specifier = Some(child);
                }
                "type_identifier" => alias = Some(self.text(child).to_string()),
                "function_declarator" => fn_declarator = Some(child),
                "pointer_declarator" | "array_declarator" => other_declarator = Some(child),
                _ => {}
            }
        }

        // typedef struct { ... } Name;  — the definition takes the alias name.
        if let Some(spec) = specifier {
            if spec.child_by_field_name("body").is_some() {
                let decl = self.extract_container(spec, alias, access);
                out.push(decl);
                return;
            }
            // typedef struct tag alias; — a plain alias of a named record.
            if let Some(alias_name) = alias {
                let tag = spec
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let underlying = format!(
                    "{} {}",
                    match spec.kind() {
                        "struct_specifier" => "struct",
                        "union_specifier" => "union",
                        "class_specifier" => "class",
                        _ => "enum",
                    },
                    tag
                );
                out.push(self.plain_typedef(alias_name, underlying));
            }
            return;
        }

        // typedef int (*fn)(int);  /  typedef int MyInt;  /  typedef char small[4];
        let base = self.base_type_text(node);
        let declarator = fn_declarator.or(other_declarator);
        let (name, underlying, signature) = match declarator {
            Some(declarator) => {
                let info = self.declarator_info(declarator);
                if info.is_fn_pointer && !info.name.is_empty() {
                    let sig = FunctionSig {
                        return_type: self.fn_ptr_return_type(&base, &info),
                        params: info
                            .params
                            .map(|p| self.extract_params(p))
                            .unwrap_or_default(),
                    };
                    (info.name.clone(), self.fn_ptr_spelling(&sig), Some(sig))
                } else {
                    (info.name.clone(), self.compose_type(&base, &info), None)
                }
            }
            None => match alias {
                Some(alias) => (alias, base, None),
                None => return,
            },
        };
        if name.is_empty() {
            return;
        }
        let mut decl = self.plain_typedef(name, underlying);
        decl.signature = signature;
        out.push(decl);
    }

    fn plain_typedef(&mut self, name: String, underlying: String) -> SourceDecl {
        let mut decl = SourceDecl::new(DeclKind::Typedef, name.clone());
        decl.usr = usr::decl_usr(DeclKind::Typedef, &self.path, &name);
        decl.type_spelling = underlying.clone();
        decl.underlying_type = self.resolve_underlying(&underlying);
        self.typedefs.insert(name, underlying);
        decl
    }

    /// Return type of a function-pointer declarator. One pointer level in
    /// the chain belongs to the `(*name)` itself; any further levels decorate
    /// the return type (`typedef int *(*fn)();`).
    fn fn_ptr_return_type(&self, base: &str, info: &DeclaratorInfo) -> String {
        let return_pointers = info.pointers.saturating_sub(1);
        if return_pointers > 0 {
            format!("{} {}", base, "*".repeat(return_pointers))
        } else {
            base.to_string()
        }
    }

    /// Canonical spelling of a function-pointer type.
    fn fn_ptr_spelling(&self, sig: &FunctionSig) -> String {
        format!(
            "{} (*)({})",
            sig.return_type,
            sig.params
                .iter()
                .map(|p| p.type_spelling.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    /// A `declaration` node: function prototype, function-pointer variable,
    /// or one or more plain variables.
    fn extract_declaration(&mut self, node: Node, access: AccessSpec, out: &mut Vec<SourceDecl>) {
        // A definition-carrying specifier may ride along: struct S { ... } g;
        let mut container_name: Option<String> = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier"
            ) && child.child_by_field_name("body").is_some()
            {
                let decl = self.extract_container(child, None, access);
                container_name = Some(decl.name.clone());
                out.push(decl);
            }
        }

        let base = match container_name {
            Some(name) => name,
            None => self.base_type_text(node),
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "function_declarator"
                | "pointer_declarator"
                | "array_declarator"
                | "init_declarator"
                | "identifier"
                | "reference_declarator" => {
                    let info = self.declarator_info(child);
                    if info.name.is_empty() {
                        continue;
                    }
                    if info.is_function && !info.is_fn_pointer {
                        if let Some(decl) = self.extract_function(node, access, DeclKind::Function)
                        {
                            out.push(decl);
                        }
                        return;
                    }
                    let mut decl = SourceDecl::new(DeclKind::Variable, info.name.clone());
                    if info.is_fn_pointer {
                        let sig = FunctionSig {
                            return_type: self.fn_ptr_return_type(&base, &info),
                            params: info
                                .params
                                .map(|p| self.extract_params(p))
                                .unwrap_or_default(),
                        };
                        decl.type_spelling = self.fn_ptr_spelling(&sig);
                        decl.signature = Some(sig);
                    } else {
                        decl.type_spelling = self.compose_type(&base, &info);
                        decl.underlying_type = self.resolve_underlying(&decl.type_spelling);
                    }
                    decl.usr = usr::decl_usr(DeclKind::Variable, &self.path, &info.name);
                    decl.value = info.value.clone();
                    decl.access = access;
                    decl.storage = self.storage_class(node);
                    decl.const_qualifier = self.const_qualifier(node);
                    out.push(decl);
                }
                _ => {}
            }
        }
    }

    /// A function prototype or definition.
    fn extract_function(
        &mut self,
        node: Node,
        access: AccessSpec,
        kind: DeclKind,
    ) -> Option<SourceDecl> {
        let declarator = node.child_by_field_name("declarator")?;
        let info = self.declarator_info(declarator);
        if info.name.is_empty() || info.is_fn_pointer {
            return None;
        }
        // Constructors and destructors are not part of the normalized
        // surface: a member function named after its enclosing record is
        // skipped.
        if self.path.last().map(String::as_str) == Some(info.name.trim_start_matches('~')) {
            return None;
        }

        let base = self.base_type_text(node);
        let return_type = if info.pointers > 0 {
            format!("{} {}", base, "*".repeat(info.pointers))
        } else {
            base
        };

        let sig = FunctionSig {
            return_type,
            params: info
                .params
                .map(|p| self.extract_params(p))
                .unwrap_or_default(),
        };

        let mut decl = SourceDecl::new(kind, info.name.clone());
        decl.usr = usr::function_usr(&self.path, &info.name, &signature_key(&info.name, &sig));
        decl.access = access;
        decl.storage = self.storage_class(node);
        decl.const_qualifier = self.const_qualifier(node);
        decl.is_inline = self.is_inline(node);
        decl.calling_convention = self.calling_convention(node);
        decl.virtual_qualifier = self.virtual_qualifier(node);
        decl.signature = Some(sig);
        Some(decl)
    }

    fn extract_params(&mut self, params: Node) -> Vec<ParamDecl> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for child in params.children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" | "optional_parameter_declaration" => {
                    let base = self.base_type_text(child);
                    let info = match child.child_by_field_name("declarator") {
                        Some(declarator) => self.declarator_info(declarator),
                        None => DeclaratorInfo::default(),
                    };
                    let type_spelling = self.compose_type(&base, &info);
                    // `f(void)` declares no parameters
                    if type_spelling == "void" && info.name.is_empty() {
                        continue;
                    }
                    let default_value = child
                        .child_by_field_name("default_value")
                        .map(|v| self.text(v).to_string())
                        .unwrap_or_default();
                    out.push(ParamDecl {
                        name: info.name,
                        type_spelling,
                        default_value,
                    });
                }
                "variadic_parameter" => {
                    out.push(ParamDecl {
                        name: String::new(),
                        type_spelling: "...".to_string(),
                        default_value: String::new(),
                    });
                }
                _ => {}
            }
        }
        out
    }

    /// A record or enum definition, named either by its tag, the typedef
    /// alias that wraps it, or a positional placeholder.
    fn extract_container(
        &mut self,
        spec: Node,
        alias: Option<String>,
        access: AccessSpec,
    ) -> SourceDecl {
        let kind = match spec.kind() {
            "struct_specifier" => DeclKind::Struct,
            "union_specifier" => DeclKind::Union,
            "class_specifier" => DeclKind::Class,
            _ => DeclKind::Enum,
        };
        let name = alias
            .or_else(|| {
                spec.child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
            })
            .unwrap_or_else(|| self.next_anon_name());

        let mut decl = SourceDecl::new(kind, name.clone());
        decl.usr = usr::decl_usr(kind, &self.path, &name);
        decl.access = access;
        decl.is_packed = self.is_packed(spec);

        if kind == DeclKind::Enum {
            if let Some(body) = spec.child_by_field_name("body") {
                self.path.push(name);
                decl.children = self.extract_enumerators(body);
                self.path.pop();
            }
            return decl;
        }

        self.path.push(name);
        let mut children = Vec::new();

        // Base classes precede members.
        let mut cursor = spec.walk();
        for child in spec.children(&mut cursor) {
            if child.kind() == "base_class_clause" {
                children.extend(self.extract_base_classes(child));
            }
        }

        if let Some(body) = spec.child_by_field_name("body") {
            let mut current_access = match kind {
                DeclKind::Class => AccessSpec::Private,
                DeclKind::Struct | DeclKind::Union => {
                    if self.is_cpp_record(body) {
                        AccessSpec::Public
                    } else {
                        AccessSpec::None
                    }
                }
                _ => AccessSpec::None,
            };
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                match member.kind() {
                    "access_specifier" => {
                        current_access = match self.text(member).trim_end_matches(':').trim() {
                            "public" => AccessSpec::Public,
                            "protected" => AccessSpec::Protected,
                            _ => AccessSpec::Private,
                        };
                    }
                    "field_declaration" => {
                        self.extract_field_declaration(member, current_access, &mut children);
                    }
                    "function_definition" => {
                        if let Some(method) =
                            self.extract_function(member, current_access, DeclKind::Method)
                        {
                            children.push(method);
                        }
                    }
                    _ => self.extract_item(member, current_access, &mut children),
                }
            }
        }

        self.path.pop();
        decl.children = children;
        decl
    }

    /// Heuristic: a record body containing access labels or member function
    /// declarators is C++ and defaults its members to public access.
    fn is_cpp_record(&self, body: Node) -> bool {
        let mut cursor = body.walk();
        let result = body
            .children(&mut cursor)
            .any(|c| c.kind() == "access_specifier");
        result
    }

    fn extract_base_classes(&mut self, clause: Node) -> Vec<SourceDecl> {
        let mut bases = Vec::new();
        let mut access = AccessSpec::None;
        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "access_specifier" => {
                    access = match self.text(child) {
                        "public" => AccessSpec::Public,
                        "protected" => AccessSpec::Protected,
                        _ => AccessSpec::Private,
                    };
                }
                "type_identifier" | "qualified_identifier" | "template_type" => {
                    let name = self.text(child).to_string();
                    let mut decl = SourceDecl::new(DeclKind::BaseClass, name.clone());
                    decl.usr = usr::decl_usr(DeclKind::BaseClass, &self.path, &name);
                    decl.type_spelling = name;
                    decl.access = access;
                    bases.push(decl);
                }
                _ => {}
            }
        }
        bases
    }

    fn extract_enumerators(&mut self, body: Node) -> Vec<SourceDecl> {
        let mut out = Vec::new();
        let mut next_value: i64 = 0;
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if child.kind() != "enumerator" {
                continue;
            }
            let name = match child.child_by_field_name("name") {
                Some(name) => self.text(name).to_string(),
                None => continue,
            };
            let value = match child.child_by_field_name("value") {
                Some(value) => {
                    let text = self.text(value).trim().to_string();
                    if let Ok(parsed) = text.parse::<i64>() {
                        next_value = parsed + 1;
                    } else {
                        next_value += 1;
                    }
                    text
                }
                None => {
                    let value = next_value.to_string();
                    next_value += 1;
                    value
                }
            };
            let mut decl = SourceDecl::new(DeclKind::Enumerator, name.clone());
            decl.usr = usr::decl_usr(DeclKind::Enumerator, &self.path, &name);
            decl.value = value;
            out.push(decl);
        }
        out
    }

    /// One `field_declaration`: nested type definitions, function-pointer
    /// fields, C++ method declarations, or one or more plain fields.
    fn extract_field_declaration(
        &mut self,
        node: Node,
        access: AccessSpec,
        out: &mut Vec<SourceDecl>,
    ) {
        // Nested record/enum defined inline in the field's type position.
        let mut nested_name: Option<String> = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier"
            ) && child.child_by_field_name("body").is_some()
            {
                let nested = self.extract_container(child, None, access);
                nested_name = Some(nested.name.clone());
                out.push(nested);
            }
        }

        let base = match nested_name {
            Some(name) => name,
            None => self.base_type_text(node),
        };

        let bitfield_width = self.bitfield_width(node);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "field_identifier"
                | "pointer_declarator"
                | "array_declarator"
                | "function_declarator"
                | "init_declarator"
                | "reference_declarator" => {
                    let info = self.declarator_info(child);
                    if info.name.is_empty() {
                        continue;
                    }

                    if info.is_function && !info.is_fn_pointer {
                        // C++ method declaration inside a record body.
                        if let Some(mut method) =
                            self.extract_function(node, access, DeclKind::Method)
                        {
                            method.virtual_qualifier = self.virtual_qualifier(node);
                            out.push(method);
                        }
                        continue;
                    }

                    let mut decl = SourceDecl::new(DeclKind::Field, info.name.clone());
                    decl.usr = usr::decl_usr(DeclKind::Field, &self.path, &info.name);
                    decl.access = access;
                    decl.storage = self.storage_class(node);
                    decl.const_qualifier = self.const_qualifier(node);
                    decl.value = info.value.clone();
                    if let Some(width) = &bitfield_width {
                        decl.value = width.clone();
                    }
                    if info.is_fn_pointer {
                        let sig = FunctionSig {
                            return_type: self.fn_ptr_return_type(&base, &info),
                            params: info
                                .params
                                .map(|p| self.extract_params(p))
                                .unwrap_or_default(),
                        };
                        decl.type_spelling = self.fn_ptr_spelling(&sig);
                        decl.signature = Some(sig);
                    } else {
                        decl.type_spelling = self.compose_type(&base, &info);
                        decl.underlying_type = self.resolve_underlying(&decl.type_spelling);
                    }
                    out.push(decl);
                }
                _ => {}
            }
        }

        // Anonymous member (unnamed struct/union field): the nested
        // container already carries a positional identity; nothing else to
        // emit.
    }

    fn bitfield_width(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "bitfield_clause" {
                let mut inner = child.walk();
                for c in child.children(&mut inner) {
                    if c.kind() == "number_literal" {
                        return Some(self.text(c).to_string());
                    }
                }
            }
        }
        None
    }
}

/// Find the first child that can continue a declarator chain.
fn first_declarator_child(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find(|c| {
        !matches!(
            c.kind(),
            "*" | "&" | "&&" | "(" | ")" | "type_qualifier" | "ms_call_modifier" | "comment"
        )
    })
}
