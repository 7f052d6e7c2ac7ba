use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kind of declared entity an [`ApiNode`] represents.
///
/// The preprocessor-directive variants (`If` through `Define`) are part of
/// the data model for forward compatibility; the tree builder does not emit
/// them today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NodeKind {
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Function,
    Method,
    Field,
    Typedef,
    TypeAlias,
    Parameter,
    TemplateParam,
    BaseClass,
    Variable,
    ReturnType,
    FunctionPointer,
    Enumerator,
    Macro,
    If,
    Elif,
    Ifdef,
    Ifndef,
    Elifndef,
    Else,
    Endif,
    Elifdef,
    Define,
    ConditionalCompilation,
    #[default]
    Unknown,
}

impl NodeKind {
    /// The string spelling used in diff records and report rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Namespace => "Namespace",
            NodeKind::Class => "Class",
            NodeKind::Struct => "Struct",
            NodeKind::Union => "Union",
            NodeKind::Enum => "Enum",
            NodeKind::Function => "Function",
            NodeKind::Method => "Method",
            NodeKind::Field => "Field",
            NodeKind::Typedef => "Typedef",
            NodeKind::TypeAlias => "TypeAlias",
            NodeKind::Parameter => "Parameter",
            NodeKind::TemplateParam => "TemplateParam",
            NodeKind::BaseClass => "BaseClass",
            NodeKind::Variable => "Variable",
            NodeKind::ReturnType => "ReturnType",
            NodeKind::FunctionPointer => "FunctionPointer",
            NodeKind::Enumerator => "Enumerator",
            NodeKind::Macro => "Macro",
            NodeKind::If => "If",
            NodeKind::Elif => "Elif",
            NodeKind::Ifdef => "Ifdef",
            NodeKind::Ifndef => "Ifndef",
            NodeKind::Elifndef => "Elifndef",
            NodeKind::Else => "Else",
            NodeKind::Endif => "Endif",
            NodeKind::Elifdef => "Elifdef",
            NodeKind::Define => "Define",
            NodeKind::ConditionalCompilation => "ConditionalCompilation",
            NodeKind::Unknown => "Unknown",
        }
    }
}

/// Member access of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccessSpec {
    Public,
    Protected,
    Private,
    #[default]
    None,
}

/// Storage class of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
    Register,
    Auto,
}

impl StorageClass {
    /// Keyword spelling, empty for `None`. Used in attribute snapshots.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            StorageClass::None => "",
            StorageClass::Static => "static",
            StorageClass::Extern => "extern",
            StorageClass::Register => "register",
            StorageClass::Auto => "auto",
        }
    }
}

/// Constness of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConstQualifier {
    #[default]
    None,
    Const,
    ConstExpr,
}

/// Virtual dispatch qualifier of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VirtualQualifier {
    #[default]
    None,
    Virtual,
    PureVirtual,
    Override,
}

/// One declared API entity, projected out of the front-end's AST.
///
/// Nodes are position-independent: identity is the unique key (`usr`) and
/// the dotted `qualified_name`; source locations are never stored. Children
/// are held in source declaration order and shared with the owning
/// context's flat map, so dropping the context drops every node exactly
/// once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiNode {
    pub kind: NodeKind,
    pub qualified_name: String,

    /// Spelled type after typedef peeling, when the declared type is an
    /// alias of something else. Empty otherwise.
    pub type_name: String,

    /// Declared type string (e.g. `int *`, `PowerLevel`, `Device[10]`).
    /// For a `Function` this is the signature key used for overload
    /// discrimination: `name(param-type, ...)`, return type excluded.
    pub data_type: String,

    /// Literal initialiser, default argument, enumerator value, or macro body.
    pub value: String,

    pub access: AccessSpec,
    pub storage: StorageClass,
    pub const_qualifier: ConstQualifier,
    pub virtual_qualifier: VirtualQualifier,

    /// Recognised calling convention spelling, empty when unspecified.
    pub function_calling_convention: String,

    pub is_inline: bool,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub is_r_value_ref: bool,
    pub is_packed: bool,

    /// Unique key assigned by the front-end. Stable across re-parses.
    #[serde(rename = "USR")]
    pub usr: String,

    /// Child nodes in source declaration order.
    pub children: Vec<Arc<ApiNode>>,

    // Conditional-compilation auxiliary attributes. Carried for forward
    // compatibility; the tree builder does not populate them.
    pub condition_string: String,
    pub body_string: String,
    pub hash: String,
    pub is_active: bool,
}

impl ApiNode {
    /// Create a node with the given kind, qualified name, and unique key.
    pub fn new(kind: NodeKind, qualified_name: impl Into<String>, usr: impl Into<String>) -> Self {
        Self {
            kind,
            qualified_name: qualified_name.into(),
            usr: usr.into(),
            ..Self::default()
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaf component of the qualified name (after the last `.`).
    pub fn leaf_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// The key under which this node is matched against its counterpart
    /// during child partitioning: signature for functions and methods (so
    /// overloads stay distinct), qualified name for everything else.
    pub fn match_key(&self) -> &str {
        if matches!(self.kind, NodeKind::Function | NodeKind::Method) {
            &self.data_type
        } else {
            &self.qualified_name
        }
    }
}
