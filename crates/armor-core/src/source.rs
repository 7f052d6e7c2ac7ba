//! Front-end contract: the declaration data the tree builder consumes.
//!
//! Any C/C++ parsing front-end that can produce a [`ParsedHeader`] can host
//! the core. The shipped front-end lives in the `armor-frontend` crate; the
//! core never sees tree-sitter (or any other parser) types.

use std::path::PathBuf;

use crate::model::{AccessSpec, ConstQualifier, StorageClass, VirtualQualifier};

/// Declaration kind as reported by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclKind {
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Enumerator,
    Function,
    Method,
    Field,
    Typedef,
    TypeAlias,
    Variable,
    Macro,
    BaseClass,
    #[default]
    Unknown,
}

/// One parameter of a function or function-pointer declarator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamDecl {
    /// Declared name; empty for unnamed parameters.
    pub name: String,
    pub type_spelling: String,
    /// Default argument spelling; empty when none.
    pub default_value: String,
}

/// Return type and parameters of a function declarator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionSig {
    pub return_type: String,
    pub params: Vec<ParamDecl>,
}

/// One declaration, with nested declarations in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceDecl {
    pub kind: DeclKind,

    /// Declared name; empty for anonymous entities (the front-end
    /// substitutes a positional placeholder before handing the tree over).
    pub name: String,

    /// Stable unique key; empty when the declaration has no identity of its
    /// own (the builder then synthesises one from the qualified name).
    pub usr: String,

    /// Full declared type spelling, pointer/array/qualifier decoration
    /// included (`int *`, `char[32]`). For typedefs, the underlying type.
    pub type_spelling: String,

    /// Typedef-resolved underlying spelling when `type_spelling` names an
    /// alias declared in this translation unit; empty otherwise.
    pub underlying_type: String,

    /// Initialiser, default argument, enumerator value, bit-field width, or
    /// macro body.
    pub value: String,

    pub access: AccessSpec,
    pub storage: StorageClass,
    pub const_qualifier: ConstQualifier,
    pub virtual_qualifier: VirtualQualifier,

    /// Recognised calling convention spelling, empty when unspecified.
    pub calling_convention: String,

    pub is_inline: bool,
    pub is_packed: bool,

    /// True when the declaration comes from the header under analysis (as
    /// opposed to an included file).
    pub is_main_file: bool,

    /// Present for functions, methods, and function-pointer-valued
    /// typedefs/fields.
    pub signature: Option<FunctionSig>,

    pub children: Vec<SourceDecl>,
}

impl SourceDecl {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            is_main_file: true,
            ..Self::default()
        }
    }
}

/// One parsed translation unit: the header path plus its declarations in
/// source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedHeader {
    pub path: PathBuf,
    pub decls: Vec<SourceDecl>,
}
