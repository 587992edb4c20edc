/// One page of an ordered view.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based index of the page actually returned (after clamping).
    pub index: usize,
    pub size: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.page_count
    }

    /// One-based page number for display.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Number of pages needed for `total` items; an empty view still has one
/// (empty) page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// Slice `view` into pages of `page_size` and return page `page_index`.
///
/// A zero page size is treated as one and an index past the end is clamped
/// to the last page, so this never panics.
pub fn paginate<T>(view: &[T], page_size: usize, page_index: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let count = page_count(view.len(), size);
    let index = page_index.min(count - 1);
    let start = (index * size).min(view.len());
    let end = (start + size).min(view.len());

    Page {
        items: &view[start..end],
        index,
        size,
        page_count: count,
        total: view.len(),
    }
}
