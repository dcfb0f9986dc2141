use crate::display::DisplayContent;

const STYLE: &str = r#"    body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
    #inventory { margin-top: 20px; white-space: pre-wrap; }
    table { border-collapse: collapse; width: 100%; margin-top: 10px; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }"#;

/// Wraps the region in a standalone document with the table styling.
pub fn render_page(content: &DisplayContent) -> Vec<u8> {
    let body = content.to_html();
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>VPC &amp; Subnets Inventory</title>
  <style>
{STYLE}
  </style>
</head>
<body>
  <h1>VPC &amp; Subnets Inventory</h1>
  <div id="inventory">{body}</div>
</body>
</html>
"#
    );
    html.into_bytes()
}
