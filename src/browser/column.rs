use std::cmp::Ordering;

use crate::sort_utils::SortSpec;

pub type Formatter<R> = fn(&R) -> String;
pub type Comparator<R> = fn(&R, &R) -> Ordering;
pub type CellClass<R> = fn(&R) -> &'static str;

/// Declarative description of one table column.
pub struct Column<R> {
    /// Stable identifier used in `sort=` query parameters.
    pub key: &'static str,
    pub label: &'static str,
    pub format: Formatter<R>,
    pub compare: Option<Comparator<R>>,
    pub class: Option<CellClass<R>>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> Column<R> {
    pub fn new(key: &'static str, label: &'static str, format: Formatter<R>) -> Self {
        Self {
            key,
            label,
            format,
            compare: None,
            class: None,
        }
    }

    pub fn sortable(mut self, compare: Comparator<R>) -> Self {
        self.compare = Some(compare);
        self
    }

    pub fn styled(mut self, class: CellClass<R>) -> Self {
        self.class = Some(class);
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.compare.is_some()
    }

    pub fn render(&self, record: &R) -> String {
        (self.format)(record)
    }

    pub fn cell_class(&self, record: &R) -> &'static str {
        self.class.map(|class| class(record)).unwrap_or("")
    }
}

/// A record type the browser can display, search and sort.
pub trait Record: Sized {
    fn columns() -> Vec<Column<Self>>;

    /// Texts the free-text filter looks through. Nested JSON payloads are
    /// included in serialized form so a term inside a body is found.
    fn search_fields(&self) -> Vec<String>;

    fn default_sort() -> Option<SortSpec> {
        None
    }

    fn sortable_keys() -> Vec<&'static str> {
        Self::columns()
            .iter()
            .filter(|c| c.is_sortable())
            .map(|c| c.key)
            .collect()
    }
}
