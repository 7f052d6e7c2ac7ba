//! Grammar selection for header files.

/// Source language a header is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

/// Detect whether a `.h` header contains C++ constructs.
///
/// Substring checks over the first 32 KiB for keywords and patterns that
/// are not valid C; a miss means the C grammar is tried first (with a C++
/// retry if the parse errors out).
pub fn is_cpp_header(content: &str) -> bool {
    let scan = &content[..content.len().min(32 * 1024)];

    if scan.contains("template<") || scan.contains("template <") {
        return true;
    }
    if scan.contains("constexpr ")
        || scan.contains("nullptr")
        || scan.contains("decltype")
        || scan.contains("typename ")
        || scan.contains("using namespace")
    {
        return true;
    }
    for label in ["public:", "private:", "protected:"] {
        if scan.contains(label) {
            return true;
        }
    }
    // `namespace x` / `class X` followed by an identifier
    for keyword in ["namespace ", "class "] {
        if let Some(pos) = scan.find(keyword) {
            let after = &scan[pos + keyword.len()..];
            if after
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
            {
                return true;
            }
        }
    }

    false
}

/// Pick the grammar for a header's contents.
pub fn classify(content: &str) -> Language {
    if is_cpp_header(content) {
        Language::Cpp
    } else {
        Language::C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_c_header() {
        let src = "typedef struct { int x; } S;\nvoid f(int a);\n";
        assert_eq!(classify(src), Language::C);
    }

    #[test]
    fn test_namespace_is_cpp() {
        assert!(is_cpp_header("namespace sys {\nclass Device;\n}\n"));
    }

    #[test]
    fn test_class_is_cpp() {
        assert!(is_cpp_header("class Device {\npublic:\n  int id;\n};\n"));
    }

    #[test]
    fn test_template_is_cpp() {
        assert!(is_cpp_header("template <typename T> T max(T a, T b);\n"));
    }

    #[test]
    fn test_struct_keyword_alone_is_not_cpp() {
        assert!(!is_cpp_header("struct Device { int id; };\n"));
    }
}
