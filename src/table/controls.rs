use serde::{Deserialize, Serialize};

use crate::output::escape_html;

pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// One entry of the pagination bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageControl {
    Previous { target: usize, disabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { target: usize, disabled: bool },
}

/// Text used by the pagination bar and the empty table row.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlLabels {
    pub previous: String,
    pub next: String,
    pub ellipsis: String,
    pub no_data: String,
}

impl Default for ControlLabels {
    fn default() -> Self {
        Self {
            previous: "Previous".to_string(),
            next: "Next".to_string(),
            ellipsis: "...".to_string(),
            no_data: "No data".to_string(),
        }
    }
}

/// Derives the pagination bar for `current` out of `total` pages.
///
/// At most `window_size` numbered pages are shown around the current one; the
/// first and last page stay reachable, with an ellipsis when pages are skipped.
pub fn controls(current: usize, total: usize, window_size: usize) -> Vec<PageControl> {
    // a window wider than the page count shows every page either way
    let window_size = window_size.clamp(1, total.max(1));
    let mut start = current.saturating_sub(window_size / 2).max(1);
    let end = total.min(start.saturating_add(window_size - 1));
    if end < start || end - start < window_size - 1 {
        start = (end + 1).saturating_sub(window_size).max(1);
    }

    let mut out = Vec::with_capacity(window_size.saturating_add(6));
    out.push(PageControl::Previous {
        target: current.saturating_sub(1),
        disabled: current == 1,
    });

    if start > 1 {
        out.push(PageControl::Page {
            number: 1,
            active: false,
        });
        if start > 2 {
            out.push(PageControl::Ellipsis);
        }
    }

    for number in start..=end {
        out.push(PageControl::Page {
            number,
            active: number == current,
        });
    }

    if end < total {
        if end + 1 < total {
            out.push(PageControl::Ellipsis);
        }
        out.push(PageControl::Page {
            number: total,
            active: false,
        });
    }

    out.push(PageControl::Next {
        target: current + 1,
        disabled: current == total || total == 0,
    });
    out
}

pub fn render_controls(items: &[PageControl], labels: &ControlLabels) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            PageControl::Previous { target, disabled } => {
                out.push_str(&nav_item(*target, *disabled, &labels.previous))
            }
            PageControl::Next { target, disabled } => {
                out.push_str(&nav_item(*target, *disabled, &labels.next))
            }
            PageControl::Page { number, active } => {
                let class = if *active { " active" } else { "" };
                out.push_str(&format!(
                    "<li class=\"page-item{class}\"><a class=\"page-link\" href=\"#\" data-page=\"{number}\">{number}</a></li>\n"
                ));
            }
            PageControl::Ellipsis => {
                out.push_str(&format!(
                    "<li class=\"page-item disabled\"><span class=\"page-link\">{}</span></li>\n",
                    escape_html(&labels.ellipsis)
                ));
            }
        }
    }
    out
}

fn nav_item(target: usize, disabled: bool, label: &str) -> String {
    let class = if disabled { " disabled" } else { "" };
    format!(
        "<li class=\"page-item{class}\"><a class=\"page-link\" href=\"#\" data-page=\"{target}\">{}</a></li>\n",
        escape_html(label)
    )
}

/// Compact one-line form, e.g. `< 1 ... 3 4 [5] 6 7 ... 20 >`.
pub fn render_controls_text(items: &[PageControl]) -> String {
    items
        .iter()
        .map(|item| match item {
            PageControl::Previous { disabled, .. } => {
                if *disabled { "-" } else { "<" }.to_string()
            }
            PageControl::Next { disabled, .. } => {
                if *disabled { "-" } else { ">" }.to_string()
            }
            PageControl::Page { number, active: true } => format!("[{number}]"),
            PageControl::Page { number, .. } => number.to_string(),
            PageControl::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
