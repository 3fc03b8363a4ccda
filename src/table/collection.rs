use std::num::NonZeroUsize;

use serde_json::Value;

use super::accessor;
use super::TableError;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Items that can be searched by dot path.
pub trait Record {
    fn field(&self, path: &str) -> Option<&Value>;
}

impl Record for Value {
    fn field(&self, path: &str) -> Option<&Value> {
        accessor::resolve(self, path)
    }
}

/// 1-based item numbers shown on the current page, `(0, 0)` when nothing is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

/// Full item list plus the searched/filtered view backing one table.
///
/// `filtered` holds indices into `all` in their original order, so the view is
/// always a subsequence of the full list.
#[derive(Clone, Debug)]
pub struct PaginatedCollection<T = Value> {
    all: Vec<T>,
    filtered: Vec<usize>,
    page: usize,
    page_size: NonZeroUsize,
}

impl<T> Default for PaginatedCollection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> PaginatedCollection<T> {
    pub fn new(items: Vec<T>) -> Self {
        let filtered = (0..items.len()).collect();
        Self {
            all: items,
            filtered,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replaces the item list. Keeps the page size.
    pub fn initialize(&mut self, items: Vec<T>) {
        self.filtered = (0..items.len()).collect();
        self.all = items;
        self.page = 1;
    }

    pub fn all(&self) -> &[T] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(move |&i| &self.all[i])
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Keeps the items matching `predicate`. Replaces any earlier search or filter.
    pub fn filter<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.filtered = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, item)| predicate(item))
            .map(|(i, _)| i)
            .collect();
        self.page = 1;
    }

    pub fn clear_filter(&mut self) {
        self.filtered = (0..self.all.len()).collect();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, size: NonZeroUsize) {
        self.page_size = size;
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size.get())
    }

    /// Moves to `page` if it exists. Returns whether the move was accepted.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn current_slice(&self) -> Vec<&T> {
        let size = self.page_size.get();
        let start = (self.page - 1).saturating_mul(size);
        if start >= self.filtered.len() {
            return Vec::new();
        }
        let end = start.saturating_add(size).min(self.filtered.len());
        self.filtered[start..end]
            .iter()
            .map(|&i| &self.all[i])
            .collect()
    }

    pub fn window(&self) -> PageWindow {
        let total = self.filtered.len();
        let shown = self.current_slice().len();
        if shown == 0 {
            return PageWindow {
                first: 0,
                last: 0,
                total,
            };
        }
        let first = (self.page - 1) * self.page_size.get() + 1;
        PageWindow {
            first,
            last: first + shown - 1,
            total,
        }
    }
}

impl<T: Record> PaginatedCollection<T> {
    /// Case-insensitive substring search over the given dot paths.
    ///
    /// An empty query restores the full list. Replaces any earlier search or filter.
    pub fn search<S: AsRef<str>>(&mut self, query: &str, fields: &[S]) {
        if query.is_empty() {
            self.clear_filter();
            return;
        }
        let needle = query.to_lowercase();
        self.filter(|item| {
            fields.iter().any(|path| {
                item.field(path.as_ref())
                    .and_then(accessor::searchable_text)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        });
    }
}

/// Parses a page-size control value. Zero, negative and non-numeric input is rejected.
pub fn parse_page_size(raw: &str) -> Result<NonZeroUsize, TableError> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| TableError::InvalidPageSize {
            value: raw.to_string(),
        })
}
