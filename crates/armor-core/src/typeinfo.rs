//! Type unwrapper: reduces a declared type spelling to its terminal type
//! plus the peeled modifier tokens.

/// Result of peeling a type spelling.
///
/// `prefix` holds the peeled modifier tokens concatenated in reverse peel
/// order, so `prefix + terminal` re-spells the modifier structure of the
/// original type. Parentheses and array extents peel silently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnwrappedType {
    pub prefix: String,
    pub terminal: String,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub is_rvalue_ref: bool,
}

/// Strip a qualifier keyword from the head or tail of `s`.
///
/// The keyword must stand alone (`const int` or `int *const`, not
/// `constexpr`).
fn strip_qualifier<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    if let Some(rest) = s.strip_prefix(keyword) {
        if rest.is_empty() || !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            return Some(rest.trim_start());
        }
    }
    if let Some(rest) = s.strip_suffix(keyword) {
        if rest.is_empty() || !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
            return Some(rest.trim_end());
        }
    }
    None
}

/// Peel the outermost modifiers off a type spelling until only the terminal
/// type remains.
///
/// Per iteration the attempts run in a fixed order: qualifiers (`const`,
/// `volatile`, `restrict`), pointer (`*`), l-value reference (`&`), r-value
/// reference (`&&`), parentheses, array extent. The loop stops on the first
/// iteration that makes no progress.
pub fn unwrap_type(spelling: &str) -> UnwrappedType {
    let mut s = spelling.trim().to_string();
    let mut peeled: Vec<&'static str> = Vec::new();
    let mut is_pointer = false;
    let mut is_reference = false;
    let mut is_rvalue_ref = false;

    loop {
        let mut progressed = false;

        for keyword in ["const", "volatile", "restrict"] {
            while let Some(rest) = strip_qualifier(&s, keyword) {
                peeled.push(match keyword {
                    "const" => "const ",
                    "volatile" => "volatile ",
                    _ => "restrict ",
                });
                s = rest.to_string();
                progressed = true;
            }
        }

        if let Some(rest) = s.strip_suffix('*') {
            peeled.push("*");
            s = rest.trim_end().to_string();
            is_pointer = true;
            progressed = true;
        } else if let Some(rest) = s.strip_suffix("&&") {
            peeled.push("&&");
            s = rest.trim_end().to_string();
            is_rvalue_ref = true;
            progressed = true;
        } else if let Some(rest) = s.strip_suffix('&') {
            peeled.push("&");
            s = rest.trim_end().to_string();
            is_reference = true;
            progressed = true;
        } else if s.starts_with('(') && s.ends_with(')') {
            s = s[1..s.len() - 1].trim().to_string();
            progressed = true;
        } else if s.ends_with(']') {
            if let Some(open) = s.rfind('[') {
                s = s[..open].trim_end().to_string();
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    let mut prefix = String::new();
    for token in peeled.iter().rev() {
        prefix.push_str(token);
    }

    UnwrappedType {
        prefix,
        terminal: s,
        is_pointer,
        is_reference,
        is_rvalue_ref,
    }
}
