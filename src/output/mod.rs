pub mod console;
pub mod report;

use serde::Serialize;
use serde_json::Value;

use crate::password::Verdict;
use crate::table::collection::PaginatedCollection;
use crate::table::controls::{self, ControlLabels, PageControl};
use crate::table::render::{self, ColumnFormatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
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
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Snapshot of one rendered table page.
#[derive(Clone, Debug, Serialize)]
pub struct TablePage {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub matching_items: usize,
    pub info: String,
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub controls: Vec<PageControl>,
    #[serde(skip)]
    pub labels: ControlLabels,
}

pub fn build_page(
    collection: &PaginatedCollection<Value>,
    columns: &[String],
    window_size: usize,
    labels: &ControlLabels,
) -> TablePage {
    TablePage {
        page: collection.page(),
        page_size: collection.page_size().get(),
        total_pages: collection.total_pages(),
        total_items: collection.len(),
        matching_items: collection.filtered_len(),
        info: render::render_info(collection),
        columns: columns.to_vec(),
        rows: collection.current_slice().into_iter().cloned().collect(),
        controls: controls::controls(collection.page(), collection.total_pages(), window_size),
        labels: labels.clone(),
    }
}

pub fn render_text(page: &TablePage) -> Vec<u8> {
    let formatter = ColumnFormatter::new(page.columns.clone());
    let mut out = String::new();
    if !page.columns.is_empty() {
        out.push_str(&page.columns.join("\t"));
        out.push('\n');
    }
    if page.rows.is_empty() {
        out.push_str(&page.labels.no_data);
        out.push('\n');
    }
    for row in &page.rows {
        if page.columns.is_empty() {
            out.push_str(&row.to_string());
        } else {
            out.push_str(&formatter.cells(row).join("\t"));
        }
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&page.info);
    out.push('\n');
    out.push_str(&controls::render_controls_text(&page.controls));
    out.push('\n');
    out.into_bytes()
}

pub fn render_json(page: &TablePage) -> Vec<u8> {
    serde_json::to_vec_pretty(page).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(page: &TablePage) -> Vec<u8> {
    report::render_html(page)
}

/// One-line score summary followed by the checklist.
pub fn render_verdict_text(verdict: &Verdict) -> String {
    let c = verdict.checks;
    let mark = |met: bool| if met { "x" } else { " " };
    format!(
        "{:>3}/100 {:<6} {}
  [{}] length  [{}] upper  [{}] lower  [{}] digit  [{}] symbol
",
        verdict.score,
        verdict.tier.as_str(),
        verdict.message,
        mark(c.length),
        mark(c.uppercase),
        mark(c.lowercase),
        mark(c.digit),
        mark(c.special),
    )
}
