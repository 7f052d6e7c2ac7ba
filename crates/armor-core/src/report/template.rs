//! HTML template literals for the report emitter.

pub const HTML_HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>ARMOR Report</title>
</head>
<body>
<h2 style="margin-bottom: 10px;">ARMOR Report</h2>
<table border="1" style="border-collapse: collapse; width: 100%;">
<tr style="background-color: #e8e8e8;">
<th style="padding: 6px;">Header File</th>
<th style="padding: 6px;">API</th>
<th style="padding: 6px;">Description</th>
<th style="padding: 6px;">Change Type</th>
<th style="padding: 6px;">Compatibility</th>
</tr>
"#;

pub const HTML_FOOTER: &str = "</table>\n</body>\n</html>\n";

pub const HTML_EMPTY_PLACEHOLDER: &str = r#"<h2 style="margin-bottom: 10px;">ARMOR Report</h2>
<table border="1" style="border-collapse: collapse; width: 100%; background-color: #f2f2f2;">
  <tr>
    <td style="text-align: center; padding: 10px;">
      No reportable API surface changes were detected for this header.
    </td>
  </tr>
</table>
"#;
