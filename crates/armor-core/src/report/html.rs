//! HTML report rendering.

use super::template::{HTML_EMPTY_PLACEHOLDER, HTML_FOOTER, HTML_HEADER};
use super::GroupedRecord;

/// Escape a string for inclusion in an HTML table cell.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then convert newlines to `<br/>` so multi-line descriptions
/// render as separate lines within one cell.
fn escape_nl2br(text: &str) -> String {
    html_escape(text).replace('\n', "<br/>")
}

/// Colour the compatibility verdict: incompatibility red, compatibility
/// green.
fn render_colored_compatibility(compatibility: &str) -> String {
    let color = if compatibility == "backward_incompatible" {
        "#d32f2f"
    } else {
        "#2e7d32"
    };
    format!(
        "<span style=\"color:{};font-weight:600\">{}</span>",
        color,
        escape_nl2br(compatibility)
    )
}

/// Render the grouped records as a complete HTML document.
///
/// An empty record set renders an informational placeholder instead of an
/// empty table.
pub fn render_html_report(grouped: &[GroupedRecord]) -> String {
    let mut html = String::new();

    if grouped.is_empty() {
        html.push_str(HTML_EMPTY_PLACEHOLDER);
        html.push_str(HTML_FOOTER);
        return html;
    }

    html.push_str(HTML_HEADER);
    for entry in grouped {
        html.push_str("<tr>\n");
        html.push_str(&format!("<td> {} </td>\n", escape_nl2br(&entry.headerfile)));
        html.push_str(&format!("<td> {} </td>\n", escape_nl2br(&entry.name)));
        html.push_str(&format!("<td> {} </td>\n", escape_nl2br(&entry.description)));
        html.push_str(&format!("<td> {} </td>\n", escape_nl2br(&entry.changetype)));
        html.push_str(&format!(
            "<td> {} </td>\n",
            render_colored_compatibility(&entry.compatibility)
        ));
        html.push_str("</tr>\n");
    }
    html.push_str(HTML_FOOTER);
    html
}
