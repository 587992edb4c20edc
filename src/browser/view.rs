use super::column::{Column, Record};
use super::engine;
use super::page::{self, Page};
use crate::sort_utils::SortSpec;

/// One table's worth of state: the loaded records plus sort, filter and
/// page position. The same type backs every listing and the nested
/// related-logs panel; only the record type and page size differ.
///
/// A browser lives for one request. Overlapping fetches for the same view
/// are settled in the page itself: every form that triggers a fetch carries
/// `hx-sync="this:replace"`, so htmx aborts the older request and only the
/// newest response is swapped in. The previous table stays on screen until
/// that swap happens.
pub struct RecordBrowser<R: Record> {
    columns: Vec<Column<R>>,
    records: Vec<R>,
    sort: Option<SortSpec>,
    filter: String,
    page_index: usize,
    page_size: usize,
}

impl<R: Record> RecordBrowser<R> {
    pub fn new(page_size: usize) -> Self {
        Self {
            columns: R::columns(),
            records: Vec::new(),
            sort: R::default_sort(),
            filter: String::new(),
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Restore sort state, e.g. from a query string.
    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// The fetched record set, in store order.
    pub fn with_records(mut self, records: Vec<R>) -> Self {
        self.records = records;
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The filtered, sorted view over all loaded records.
    pub fn view(&self) -> Vec<&R> {
        engine::apply(&self.records, &self.columns, self.sort.as_ref(), &self.filter)
    }

    pub fn page_count(&self) -> usize {
        page::page_count(self.view().len(), self.page_size)
    }

    /// Index of the page that will be shown, clamped to the view.
    pub fn page_index(&self) -> usize {
        self.page_index.min(self.page_count() - 1)
    }

    /// Run `f` over the current page of the view.
    pub fn with_current_page<T>(&self, f: impl FnOnce(Page<'_, &R>) -> T) -> T {
        let view = self.view();
        f(page::paginate(&view, self.page_size, self.page_index))
    }
}
