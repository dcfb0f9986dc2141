use serde_json::Value;

use crate::inventory::Record;

/// Escapes text for placement inside an HTML text node.
///
/// Quotes are left alone; they are inert outside attribute values.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Display text for one field, before escaping.
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(v @ Value::Array(_)) | Some(v @ Value::Object(_)) => v.to_string(),
    }
}

pub fn render_table(records: &[Record], columns: &[&str], title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h2>{}</h2><table><thead><tr>", escape_html(title)));
    for column in columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead><tbody>");
    for record in records {
        out.push_str("<tr>");
        for column in columns {
            let cell = render_cell(record.get(column));
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}
