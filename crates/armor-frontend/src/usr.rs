//! Unique-key synthesis.
//!
//! tree-sitter has no symbol table, so the front-end derives each
//! declaration's unique key from its scope path; functions append a digest
//! of the signature so overloads get distinct keys. Keys are opaque to the
//! core and stable across re-parses of the same source.

use armor_core::source::DeclKind;
use sha2::{Digest, Sha256};

fn kind_tag(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Namespace => "N",
        DeclKind::Class => "C",
        DeclKind::Struct => "S",
        DeclKind::Union => "U",
        DeclKind::Enum => "E",
        DeclKind::Enumerator => "Ek",
        DeclKind::Function => "F",
        DeclKind::Method => "M",
        DeclKind::Field => "FI",
        DeclKind::Typedef => "T",
        DeclKind::TypeAlias => "TA",
        DeclKind::Variable => "V",
        DeclKind::Macro => "macro",
        DeclKind::BaseClass => "B",
        DeclKind::Unknown => "?",
    }
}

fn joined(path: &[String], name: &str) -> String {
    let mut out = String::new();
    for part in path {
        out.push_str(part);
        out.push('@');
    }
    out.push_str(name);
    out
}

/// Unique key for a named declaration at the given scope path.
pub fn decl_usr(kind: DeclKind, path: &[String], name: &str) -> String {
    format!("c:@{}@{}", kind_tag(kind), joined(path, name))
}

/// Unique key for a function: the scope path plus a short signature digest,
/// so `f(int)` and `f(long)` stay distinct.
pub fn function_usr(path: &[String], name: &str, signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();
    let mut short = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        short.push_str(&format!("{:02x}", byte));
    }
    format!("c:@F@{}#{}", joined(path, name), short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_usr_embeds_scope() {
        let path = vec!["System".to_string(), "systemDetails".to_string()];
        assert_eq!(
            decl_usr(DeclKind::Enum, &path, "systemStatus"),
            "c:@E@System@systemDetails@systemStatus"
        );
    }

    #[test]
    fn test_function_usr_distinguishes_overloads() {
        let path: Vec<String> = Vec::new();
        let a = function_usr(&path, "f", "f(int)");
        let b = function_usr(&path, "f", "f(long)");
        assert_ne!(a, b);
        // stable across calls
        assert_eq!(a, function_usr(&path, "f", "f(int)"));
    }
}
