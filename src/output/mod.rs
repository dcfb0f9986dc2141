pub mod page;

use crate::display::DisplayContent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Fragment,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" | "htm" | "page" => Some(Self::Html),
            "fragment" | "frag" => Some(Self::Fragment),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Fragment => "fragment",
            OutputFormat::Json => "json",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".frag") || lower.ends_with(".inc") {
        return Some(OutputFormat::Fragment);
    }
    None
}

pub fn render_fragment(content: &DisplayContent) -> Vec<u8> {
    let mut out = content.to_html();
    out.push('\n');
    out.into_bytes()
}

pub fn render_json(content: &DisplayContent) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(content).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

pub fn render(content: &DisplayContent, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Html => page::render_page(content),
        OutputFormat::Fragment => render_fragment(content),
        OutputFormat::Json => render_json(content),
    }
}
