use std::collections::BTreeMap;

use serde_json::Value;

use super::accessor;
use super::collection::PaginatedCollection;
use super::controls::ControlLabels;
use crate::output::escape_html;

/// A writable container on the page.
pub trait Sink {
    fn replace_markup(&mut self, markup: &str);
    fn set_text(&mut self, text: &str);
    fn set_data(&mut self, key: &str, value: &str);
}

/// Looks containers up by element id.
pub trait Document {
    fn element(&mut self, id: &str) -> Option<&mut dyn Sink>;
}

/// Maps one item to a row fragment. The markup is never inspected.
pub trait RowFormatter<T> {
    fn format_row(&self, item: &T) -> String;
}

impl<T, F> RowFormatter<T> for F
where
    F: Fn(&T) -> String,
{
    fn format_row(&self, item: &T) -> String {
        self(item)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub markup: String,
    pub data: BTreeMap<String, String>,
}

impl Sink for MemoryElement {
    fn replace_markup(&mut self, markup: &str) {
        self.markup = markup.to_string();
    }

    fn set_text(&mut self, text: &str) {
        self.markup = escape_html(text);
    }

    fn set_data(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }
}

/// Page surface kept in memory. Only registered ids resolve.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    elements: BTreeMap<String, MemoryElement>,
}

impl MemoryDocument {
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: ids
                .into_iter()
                .map(|id| (id.into(), MemoryElement::default()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MemoryElement> {
        self.elements.get(id)
    }

    pub fn markup(&self, id: &str) -> &str {
        self.elements
            .get(id)
            .map(|e| e.markup.as_str())
            .unwrap_or_default()
    }
}

impl Document for MemoryDocument {
    fn element(&mut self, id: &str) -> Option<&mut dyn Sink> {
        self.elements.get_mut(id).map(|e| e as &mut dyn Sink)
    }
}

/// Builds one `<td>` per dot path, escaping the resolved value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnFormatter {
    columns: Vec<String>,
}

impl ColumnFormatter {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn cells(&self, item: &Value) -> Vec<String> {
        self.columns
            .iter()
            .map(|path| {
                accessor::resolve(item, path)
                    .and_then(accessor::searchable_text)
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn header_row(&self) -> String {
        let mut out = String::from("<tr>");
        for c in &self.columns {
            out.push_str(&format!("<th>{}</th>", escape_html(c)));
        }
        out.push_str("</tr>\n");
        out
    }
}

impl RowFormatter<Value> for ColumnFormatter {
    fn format_row(&self, item: &Value) -> String {
        let mut out = String::from("<tr>");
        for cell in self.cells(item) {
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
        out
    }
}

pub fn empty_row(labels: &ControlLabels) -> String {
    format!(
        "<tr><td colspan=\"100\" class=\"text-center text-muted py-4\">{}</td></tr>",
        escape_html(&labels.no_data)
    )
}

/// Markup for the current page: one fragment per item, or the empty row.
pub fn table_markup<T, R>(
    collection: &PaginatedCollection<T>,
    formatter: &R,
    labels: &ControlLabels,
) -> (String, usize)
where
    R: RowFormatter<T> + ?Sized,
{
    let slice = collection.current_slice();
    if slice.is_empty() {
        return (empty_row(labels), 0);
    }
    let markup = slice
        .iter()
        .map(|item| formatter.format_row(item))
        .collect::<String>();
    (markup, slice.len())
}

/// Replaces the sink contents with the current page. Returns the rendered row count.
pub fn render<T, R>(
    collection: &PaginatedCollection<T>,
    formatter: &R,
    labels: &ControlLabels,
    sink: &mut dyn Sink,
) -> usize
where
    R: RowFormatter<T> + ?Sized,
{
    let (markup, rows) = table_markup(collection, formatter, labels);
    sink.replace_markup(&markup);
    rows
}

pub fn render_info<T>(collection: &PaginatedCollection<T>) -> String {
    let w = collection.window();
    format!("Showing {}-{} of {}", w.first, w.last, w.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::num::NonZeroUsize;

    fn orders(n: usize) -> PaginatedCollection<Value> {
        PaginatedCollection::new(
            (1..=n)
                .map(|i| json!({"id": i, "customer": {"name": format!("c{i}")}}))
                .collect(),
        )
    }

    #[test]
    fn renders_rows_in_order() {
        let c = orders(3);
        let mut sink = MemoryElement::default();
        let rows = render(
            &c,
            &|o: &Value| format!("<tr>{}</tr>", o["id"]),
            &ControlLabels::default(),
            &mut sink,
        );
        assert_eq!(rows, 3);
        assert_eq!(sink.markup, "<tr>1</tr><tr>2</tr><tr>3</tr>");
    }

    #[test]
    fn empty_page_writes_single_placeholder() {
        let mut c = orders(4);
        c.search("nobody", &["customer.name"]);
        let mut sink = MemoryElement {
            markup: "<tr>stale</tr><tr>stale</tr>".to_string(),
            ..Default::default()
        };
        let rows = render(
            &c,
            &|_: &Value| -> String { unreachable!() },
            &ControlLabels::default(),
            &mut sink,
        );
        assert_eq!(rows, 0);
        assert_eq!(sink.markup.matches("<tr>").count(), 1);
        assert!(sink.markup.contains("No data"));
        assert!(!sink.markup.contains("stale"));
    }

    #[test]
    fn info_line_tracks_the_page() {
        let mut c = orders(23);
        c.set_page_size(NonZeroUsize::new(10).unwrap());
        assert_eq!(render_info(&c), "Showing 1-10 of 23");
        c.go_to_page(3);
        assert_eq!(render_info(&c), "Showing 21-23 of 23");
        c.search("zzz", &["customer.name"]);
        assert_eq!(render_info(&c), "Showing 0-0 of 0");
    }

    #[test]
    fn column_formatter_escapes_cells() {
        let f = ColumnFormatter::new(vec!["name".to_string(), "shop.name".to_string()]);
        let row = f.format_row(&json!({"name": "<b>Tea</b>", "shop": {"name": "A & B"}}));
        assert_eq!(
            row,
            "<tr><td>&lt;b&gt;Tea&lt;/b&gt;</td><td>A &amp; B</td></tr>\n"
        );
        let row = f.format_row(&json!({"name": 3}));
        assert_eq!(row, "<tr><td>3</td><td></td></tr>\n");
    }

    #[test]
    fn memory_document_resolves_registered_ids_only() {
        let mut doc = MemoryDocument::with_elements(["orders-body"]);
        assert!(doc.element("missing").is_none());
        doc.element("orders-body").unwrap().set_text("a < b");
        assert_eq!(doc.markup("orders-body"), "a &lt; b");
    }
}
