pub mod accessor;
pub mod collection;
pub mod controls;
pub mod render;

use std::num::NonZeroUsize;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::output::console;
use collection::PaginatedCollection;
use controls::ControlLabels;
use render::{Document, RowFormatter};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid page size '{value}', expected a positive integer")]
    InvalidPageSize { value: String },

    #[error("invalid filter '{value}', expected PATH=REGEX")]
    InvalidFilter { value: String },

    #[error("invalid filter regex '{pattern}': {source}")]
    FilterRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Element ids of the three containers one table writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableIds {
    pub body: String,
    pub info: String,
    pub controls: String,
}

impl TableIds {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            info: "paginationInfo".to_string(),
            controls: "paginationControls".to_string(),
        }
    }
}

/// A table on a page: its items, how rows are formatted and where they go.
///
/// Every mutating call re-renders the body, the info line and the pagination
/// bar, so several tables can live on one page without sharing state.
pub struct DataTable<T, R> {
    collection: PaginatedCollection<T>,
    formatter: R,
    ids: TableIds,
    labels: ControlLabels,
    window_size: usize,
}

impl<T, R> DataTable<T, R>
where
    R: RowFormatter<T>,
{
    pub fn new(ids: TableIds, items: Vec<T>, formatter: R) -> Self {
        Self {
            collection: PaginatedCollection::new(items),
            formatter,
            ids,
            labels: ControlLabels::default(),
            window_size: controls::DEFAULT_WINDOW_SIZE,
        }
    }

    pub fn with_labels(mut self, labels: ControlLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_page_size(mut self, size: NonZeroUsize) -> Self {
        self.collection.set_page_size(size);
        self
    }

    pub fn collection(&self) -> &PaginatedCollection<T> {
        &self.collection
    }

    pub fn ids(&self) -> &TableIds {
        &self.ids
    }

    pub fn labels(&self) -> &ControlLabels {
        &self.labels
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn init(&mut self, doc: &mut dyn Document) {
        self.refresh(doc);
    }

    pub fn load(&mut self, doc: &mut dyn Document, items: Vec<T>) {
        self.collection.initialize(items);
        self.refresh(doc);
    }

    /// Redraws the body, info line and pagination bar from the current state.
    pub fn refresh(&self, doc: &mut dyn Document) {
        self.render_body(doc);
        self.render_pagination(doc);
    }

    fn render_body(&self, doc: &mut dyn Document) {
        let Some(body) = doc.element(&self.ids.body) else {
            console::warn(&format!("table element not found: {}", self.ids.body));
            return;
        };
        let rows = render::render(&self.collection, &self.formatter, &self.labels, body);
        if rows > 0 {
            console::debug(&format!("rendered {rows} rows into {}", self.ids.body));
        }
    }

    fn render_pagination(&self, doc: &mut dyn Document) {
        if let Some(info) = doc.element(&self.ids.info) {
            info.set_text(&render::render_info(&self.collection));
        }
        if let Some(bar) = doc.element(&self.ids.controls) {
            let items = controls::controls(
                self.collection.page(),
                self.collection.total_pages(),
                self.window_size,
            );
            bar.replace_markup(&controls::render_controls(&items, &self.labels));
        }
    }

    /// Out-of-range pages are ignored and nothing is redrawn.
    pub fn change_page(&mut self, doc: &mut dyn Document, page: usize) -> bool {
        if !self.collection.go_to_page(page) {
            return false;
        }
        self.refresh(doc);
        true
    }

    pub fn change_page_size(&mut self, doc: &mut dyn Document, size: NonZeroUsize) {
        self.collection.set_page_size(size);
        self.refresh(doc);
    }

    /// Page-size control input. Invalid values are logged and leave the table untouched.
    pub fn change_page_size_str(&mut self, doc: &mut dyn Document, raw: &str) -> bool {
        match collection::parse_page_size(raw) {
            Ok(size) => {
                self.change_page_size(doc, size);
                true
            }
            Err(e) => {
                console::warn(&e.to_string());
                false
            }
        }
    }

    pub fn filter<F>(&mut self, doc: &mut dyn Document, predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.collection.filter(predicate);
        self.refresh(doc);
    }
}

impl<T, R> DataTable<T, R>
where
    T: collection::Record,
    R: RowFormatter<T>,
{
    pub fn search<S: AsRef<str>>(&mut self, doc: &mut dyn Document, query: &str, fields: &[S]) {
        self.collection.search(query, fields);
        self.refresh(doc);
    }
}

/// `PATH=REGEX` predicate over a nested field, e.g. `status=^(paid|shipped)$`.
#[derive(Clone, Debug)]
pub struct FieldFilter {
    path: String,
    pattern: Regex,
}

impl FieldFilter {
    pub fn parse(raw: &str) -> Result<Self, TableError> {
        let (path, pattern) = raw
            .split_once('=')
            .map(|(p, r)| (p.trim(), r.trim()))
            .filter(|(p, _)| !p.is_empty())
            .ok_or_else(|| TableError::InvalidFilter {
                value: raw.to_string(),
            })?;
        let pattern = Regex::new(pattern).map_err(|source| TableError::FilterRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            path: path.to_string(),
            pattern,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matches(&self, item: &Value) -> bool {
        accessor::resolve(item, &self.path)
            .and_then(accessor::searchable_text)
            .is_some_and(|text| self.pattern.is_match(&text))
    }
}
