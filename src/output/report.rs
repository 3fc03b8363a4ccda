use super::{escape_html, TablePage};
use crate::table::controls;
use crate::table::render::{self, ColumnFormatter, RowFormatter};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn body_markup(page: &TablePage) -> String {
    if page.rows.is_empty() {
        return render::empty_row(&page.labels);
    }
    if page.columns.is_empty() {
        return page
            .rows
            .iter()
            .map(|row| {
                format!(
                    "<tr><td><code>{}</code></td></tr>\n",
                    escape_html(&row.to_string())
                )
            })
            .collect();
    }
    let formatter = ColumnFormatter::new(page.columns.clone());
    page.rows.iter().map(|row| formatter.format_row(row)).collect()
}

/// Standalone Bootstrap page holding the table, the info line and the pagination bar.
pub fn render_html(page: &TablePage) -> Vec<u8> {
    let header = ColumnFormatter::new(page.columns.clone()).header_row();
    let body = body_markup(page);
    let bar = controls::render_controls(&page.controls, &page.labels);
    let info = escape_html(&page.info);
    let json = serde_json::to_string(page).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Storeview</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet"/>
</head>
<body class="bg-light">
  <script type="application/json" id="page-data">{json}</script>
  <main class="container py-4">
    <div class="card shadow-sm">
      <div class="table-responsive">
        <table class="table table-hover mb-0">
          <thead>
{header}          </thead>
          <tbody id="tableBody">
{body}
          </tbody>
        </table>
      </div>
      <div class="card-footer d-flex justify-content-between align-items-center">
        <small id="paginationInfo" class="text-muted">{info}</small>
        <ul id="paginationControls" class="pagination pagination-sm mb-0">
{bar}        </ul>
      </div>
    </div>
  </main>
</body>
</html>
"####
    );
    html.into_bytes()
}
