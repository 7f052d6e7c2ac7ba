//! Header parsing: grammar selection, tree-sitter invocation, extraction.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tree_sitter::{Parser, Tree};

use armor_core::errors::{ArmorError, Result};
use armor_core::source::ParsedHeader;

use crate::extract::Extractor;
use crate::language::{classify, Language};

/// Parse configuration forwarded from the command line.
///
/// The tree-sitter front-end parses single files and does not expand
/// includes or evaluate macro definitions, but the options are recorded so
/// a semantic front-end can consume them without an interface change.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    pub include_dirs: Vec<PathBuf>,
    pub macro_defs: Vec<String>,
    pub resource_path: Option<PathBuf>,
}

/// The C/C++ parsing front-end.
#[derive(Debug, Default)]
pub struct HeaderParser {
    config: ParseConfig,
}

impl HeaderParser {
    pub fn new(config: ParseConfig) -> Self {
        if !config.include_dirs.is_empty() || !config.macro_defs.is_empty() {
            debug!(
                include_dirs = config.include_dirs.len(),
                macro_defs = config.macro_defs.len(),
                "parse options recorded (not consumed by the tree-sitter front-end)"
            );
        }
        Self { config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse a header file into its declaration tree.
    ///
    /// # Errors
    ///
    /// `Parse` when the file cannot be read or the grammar produces no tree.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedHeader> {
        let content = std::fs::read_to_string(path).map_err(|e| ArmorError::Parse {
            file: path.display().to_string(),
            message: format!("cannot read header: {e}"),
        })?;
        self.parse_source(path, &content)
    }

    /// Parse header text. `path` only names the translation unit in
    /// diagnostics and the resulting [`ParsedHeader`].
    pub fn parse_source(&self, path: &Path, content: &str) -> Result<ParsedHeader> {
        let language = classify(content);
        let mut tree = self.parse_with(language, content, path)?;

        // Headers classified as C but carrying C++-only members (nested
        // typedefs and the like) parse with errors; retry with the C++
        // grammar and keep whichever tree is clean.
        if tree.root_node().has_error() && language == Language::C {
            let retry = self.parse_with(Language::Cpp, content, path)?;
            if !retry.root_node().has_error() {
                debug!(file = %path.display(), "reparsed with the C++ grammar");
                tree = retry;
            } else {
                warn!(
                    file = %path.display(),
                    "header parses with errors; unparseable declarations will be skipped"
                );
            }
        } else if tree.root_node().has_error() {
            warn!(
                file = %path.display(),
                "header parses with errors; unparseable declarations will be skipped"
            );
        }

        let decls = Extractor::new(content.as_bytes()).extract_translation_unit(tree.root_node());
        Ok(ParsedHeader {
            path: path.to_path_buf(),
            decls,
        })
    }

    fn parse_with(&self, language: Language, content: &str, path: &Path) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ArmorError::Parse {
                file: path.display().to_string(),
                message: format!("cannot load grammar: {e}"),
            })?;
        parser.parse(content, None).ok_or_else(|| ArmorError::Parse {
            file: path.display().to_string(),
            message: "parser produced no tree".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armor_core::source::DeclKind;
    use std::path::PathBuf;

    fn parse(content: &str) -> ParsedHeader {
        HeaderParser::new(ParseConfig::default())
            .parse_source(&PathBuf::from("test.h"), content)
            .unwrap()
    }

    #[test]
    fn test_simple_function_prototype() {
        let header = parse("void f(int a);\n");
        assert_eq!(header.decls.len(), 1);
        let f = &header.decls[0];
        assert_eq!(f.kind, DeclKind::Function);
        assert_eq!(f.name, "f");
        let sig = f.signature.as_ref().unwrap();
        assert_eq!(sig.return_type, "void");
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "a");
        assert_eq!(sig.params[0].type_spelling, "int");
    }

    #[test]
    fn test_void_parameter_list_is_empty() {
        let header = parse("int g(void);\n");
        let sig = header.decls[0].signature.as_ref().unwrap();
        assert!(sig.params.is_empty());
        assert_eq!(sig.return_type, "int");
    }

    #[test]
    fn test_pointer_return_type() {
        let header = parse("char *name(void);\n");
        let sig = header.decls[0].signature.as_ref().unwrap();
        assert_eq!(sig.return_type, "char *");
    }

    #[test]
    fn test_typedef_enum() {
        let header = parse(
            "typedef enum {\n    POWER_LOW,\n    POWER_MEDIUM,\n    POWER_HIGH\n} PowerLevel;\n",
        );
        assert_eq!(header.decls.len(), 1);
        let e = &header.decls[0];
        assert_eq!(e.kind, DeclKind::Enum);
        assert_eq!(e.name, "PowerLevel");
        assert_eq!(e.children.len(), 3);
        assert_eq!(e.children[0].name, "POWER_LOW");
        assert_eq!(e.children[0].value, "0");
        assert_eq!(e.children[2].value, "2");
    }

    #[test]
    fn test_explicit_enumerator_values() {
        let header = parse("enum Flags { A = 4, B, C = 16 };\n");
        let e = &header.decls[0];
        assert_eq!(e.children[0].value, "4");
        assert_eq!(e.children[1].value, "5");
        assert_eq!(e.children[2].value, "16");
    }

    #[test]
    fn test_typedef_struct_with_fields() {
        let header = parse(
            "typedef struct {\n    int voltage;\n    PowerLevel level;\n} PowerConfig;\n",
        );
        let s = &header.decls[0];
        assert_eq!(s.kind, DeclKind::Struct);
        assert_eq!(s.name, "PowerConfig");
        assert_eq!(s.children.len(), 2);
        assert_eq!(s.children[0].name, "voltage");
        assert_eq!(s.children[0].type_spelling, "int");
        assert_eq!(s.children[1].type_spelling, "PowerLevel");
    }

    #[test]
    fn test_array_field() {
        let header = parse("typedef struct {\n    char label[32];\n} Device;\n");
        let field = &header.decls[0].children[0];
        assert_eq!(field.name, "label");
        assert_eq!(field.type_spelling, "char[32]");
    }

    #[test]
    fn test_nested_typedef_struct_and_enum() {
        let header = parse(
            r#"typedef struct {
    char systemName[64];
    int deviceCount;

    typedef struct {
        int year;
    } manufactureDate;

    typedef enum {
        STATUS_OK,
        STATUS_FAIL
    } systemStatus;

} System;
"#,
        );
        let system = &header.decls[0];
        assert_eq!(system.kind, DeclKind::Struct);
        assert_eq!(system.name, "System");

        let names: Vec<&str> = system.children.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"systemName"));
        assert!(names.contains(&"manufactureDate"));
        assert!(names.contains(&"systemStatus"));

        let status = system
            .children
            .iter()
            .find(|c| c.name == "systemStatus")
            .unwrap();
        assert_eq!(status.kind, DeclKind::Enum);
        assert_eq!(status.children.len(), 2);
    }

    #[test]
    fn test_simple_typedef_recorded_for_resolution() {
        let header = parse("typedef int MyInt;\nMyInt counter;\n");
        let td = &header.decls[0];
        assert_eq!(td.kind, DeclKind::Typedef);
        assert_eq!(td.type_spelling, "int");

        let var = &header.decls[1];
        assert_eq!(var.kind, DeclKind::Variable);
        assert_eq!(var.type_spelling, "MyInt");
        assert_eq!(var.underlying_type, "int");
    }

    #[test]
    fn test_function_pointer_typedef() {
        let header = parse("typedef int (*binary_op)(int, int);\n");
        let td = &header.decls[0];
        assert_eq!(td.kind, DeclKind::Typedef);
        assert_eq!(td.name, "binary_op");
        let sig = td.signature.as_ref().unwrap();
        assert_eq!(sig.return_type, "int");
        assert_eq!(sig.params.len(), 2);
        assert_eq!(td.type_spelling, "int (*)(int, int)");
    }

    #[test]
    fn test_function_pointer_field() {
        let header = parse("typedef struct {\n    void (*on_event)(int code);\n} Callbacks;\n");
        let field = &header.decls[0].children[0];
        assert_eq!(field.kind, DeclKind::Field);
        assert_eq!(field.name, "on_event");
        let sig = field.signature.as_ref().unwrap();
        assert_eq!(sig.return_type, "void");
        assert_eq!(sig.params[0].name, "code");
    }

    #[test]
    fn test_object_macro() {
        let header = parse("#define MAX_DEVICES 16\n");
        let m = &header.decls[0];
        assert_eq!(m.kind, DeclKind::Macro);
        assert_eq!(m.name, "MAX_DEVICES");
        assert_eq!(m.value, "16");
    }

    #[test]
    fn test_include_guard_is_transparent() {
        let header = parse("#ifndef MYLIB_H\n#define MYLIB_H\nvoid f(void);\n#endif\n");
        let names: Vec<&str> = header.decls.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"MYLIB_H"));
        assert!(names.contains(&"f"));
    }

    #[test]
    fn test_static_function_storage() {
        let header = parse("static int helper(void);\n");
        assert_eq!(
            header.decls[0].storage,
            armor_core::model::StorageClass::Static
        );
    }

    #[test]
    fn test_bitfield_width_in_value() {
        let header = parse("typedef struct {\n    unsigned flags : 3;\n} Packed;\n");
        let field = &header.decls[0].children[0];
        assert_eq!(field.name, "flags");
        assert_eq!(field.value, "3");
    }

    #[test]
    fn test_cpp_class_with_access_and_methods() {
        let header = parse(
            r#"class Device {
public:
    Device();
    virtual int id() const;
private:
    int id_;
};
"#,
        );
        let class = header.decls.iter().find(|d| d.name == "Device").unwrap();
        assert_eq!(class.kind, DeclKind::Class);
        let id_field = class.children.iter().find(|c| c.name == "id_").unwrap();
        assert_eq!(id_field.access, armor_core::model::AccessSpec::Private);
    }

    #[test]
    fn test_cpp_namespace() {
        let header = parse("namespace sys {\nvoid boot(void);\n}\n");
        let ns = &header.decls[0];
        assert_eq!(ns.kind, DeclKind::Namespace);
        assert_eq!(ns.name, "sys");
        assert_eq!(ns.children[0].name, "boot");
    }

    #[test]
    fn test_unreadable_file_is_parse_error() {
        let err = HeaderParser::new(ParseConfig::default())
            .parse_file(Path::new("/nonexistent/armor/test.h"))
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_variadic_parameter() {
        let header = parse("int printf_like(const char *fmt, ...);\n");
        let sig = header.decls[0].signature.as_ref().unwrap();
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[1].type_spelling, "...");
    }
}
