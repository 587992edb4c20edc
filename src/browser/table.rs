//! Rendering of a [`RecordBrowser`] into plain rows and links for the shared
//! table template.

use super::column::Record;
use super::view::RecordBrowser;
use crate::sort_utils::next_sort;

#[derive(Debug, Clone, Default)]
pub struct HeaderCell {
    pub label: &'static str,
    pub sortable: bool,
    pub href: String,
    pub indicator: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct TableCell {
    pub text: String,
    pub class: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub href: String,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<TableRow>,
    pub page_number: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_href: String,
    pub next_href: String,
    /// Records left after filtering.
    pub matched: usize,
    /// Records loaded before filtering.
    pub loaded: usize,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the links a table needs while preserving the surrounding page
/// state. `prefix` namespaces the parameters so a nested table does not
/// clash with its parent (`logs_sort=` vs `sort=`).
#[derive(Debug, Clone)]
pub struct TableLinks {
    base: String,
    prefix: &'static str,
}

impl TableLinks {
    /// `base` is a path, optionally with a query string that must survive
    /// every link (e.g. `/logs?date=2024-01-01`).
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            prefix: "",
        }
    }

    pub fn nested(base: impl Into<String>, prefix: &'static str) -> Self {
        Self {
            base: base.into(),
            prefix,
        }
    }

    pub fn href(&self, params: &[(&str, String)]) -> String {
        let mut href = self.base.clone();
        let mut sep = if href.contains('?') { '&' } else { '?' };
        for (name, value) in params {
            if value.is_empty() {
                continue;
            }
            href.push(sep);
            href.push_str(self.prefix);
            href.push_str(name);
            href.push('=');
            href.push_str(&urlencoding::encode(value));
            sep = '&';
        }
        href
    }
}

/// Turn the browser's current page into a [`TableView`]. Sort links drop
/// the page parameter, so changing the sort always lands on page one.
pub fn table_view<R: Record>(
    browser: &RecordBrowser<R>,
    links: &TableLinks,
    row_href: impl Fn(&R) -> String,
) -> TableView {
    let current = browser.sort();
    let filter = browser.filter().to_string();

    let headers = browser
        .columns()
        .iter()
        .map(|column| {
            let indicator = match current {
                Some(spec) if spec.is_active(column.key) => spec.direction.indicator(),
                _ => "",
            };
            let href = if column.is_sortable() {
                let next = next_sort(current, column.key);
                links.href(&[
                    ("search", filter.clone()),
                    ("sort", next.key.to_string()),
                    ("dir", next.direction.as_str().to_string()),
                ])
            } else {
                String::new()
            };
            HeaderCell {
                label: column.label,
                sortable: column.is_sortable(),
                href,
                indicator,
            }
        })
        .collect();

    let state_params = |page_number: usize| -> Vec<(&'static str, String)> {
        let mut params = vec![("search", filter.clone())];
        if let Some(spec) = current {
            params.push(("sort", spec.key.to_string()));
            params.push(("dir", spec.direction.as_str().to_string()));
        }
        params.push(("page", page_number.to_string()));
        params
    };

    let loaded = browser.records().len();
    browser.with_current_page(|page| {
        let rows = page
            .items
            .iter()
            .map(|record| TableRow {
                href: row_href(*record),
                cells: browser
                    .columns()
                    .iter()
                    .map(|column| TableCell {
                        text: column.render(record),
                        class: column.cell_class(record),
                    })
                    .collect(),
            })
            .collect();

        TableView {
            headers,
            rows,
            page_number: page.number(),
            page_count: page.page_count,
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            prev_href: links.href(&state_params(page.number().saturating_sub(1))),
            next_href: links.href(&state_params(page.number() + 1)),
            matched: page.total,
            loaded,
        }
    })
}
