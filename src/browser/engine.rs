use super::column::{Column, Record};
use crate::sort_utils::{SortDirection, SortSpec};

/// Filter then sort `records` into a new view. The input is left untouched.
///
/// The sort is stable, so ties keep their source order in either direction.
/// A sort key that names no sortable column leaves the order as is.
pub fn apply<'a, R: Record>(
    records: &'a [R],
    columns: &[Column<R>],
    sort: Option<&SortSpec>,
    filter: &str,
) -> Vec<&'a R> {
    let needle = filter.to_lowercase();
    let mut view: Vec<&R> = records
        .iter()
        .filter(|record| matches_filter(*record, &needle))
        .collect();

    if let Some(spec) = sort {
        let compare = columns
            .iter()
            .find(|c| c.key == spec.key)
            .and_then(|c| c.compare);
        if let Some(compare) = compare {
            match spec.direction {
                SortDirection::Asc => view.sort_by(|a, b| compare(a, b)),
                SortDirection::Desc => view.sort_by(|a, b| compare(b, a)),
            }
        }
    }

    view
}

/// Case-insensitive substring match over the record's searchable fields.
/// `needle` must already be lowercased; an empty needle matches everything.
pub fn matches_filter<R: Record>(record: &R, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
