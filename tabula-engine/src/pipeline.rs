//! Query pipeline: derive the filtered, sorted view from the record store.
//!
//! Everything here is a pure function of the store and the query state. The
//! view is rebuilt from store order on every call, so ties in the sort always
//! resolve to insertion order and sorting is idempotent.

use crate::store::RecordStore;
use std::cmp::Ordering;
use tabula_core::{CellValue, QueryState, RecordId, SortDirection, SortKey};

/// Identities of records with any column containing `filter_text`
/// (case-insensitive), in store order.
pub fn filter_ids(store: &RecordStore, filter_text: &str) -> Vec<RecordId> {
    let needle = filter_text.to_lowercase();
    store
        .iter()
        .filter(|record| record.matches_text(&needle))
        .map(|record| record.id)
        .collect()
}

/// Stable sort of `ids` by the values in `key.column`.
///
/// Identities missing from the store or rows without the column sort as
/// empty values.
pub fn sort_ids(store: &RecordStore, ids: &mut [RecordId], key: SortKey) {
    let mut keyed: Vec<Keyed> = ids
        .iter()
        .map(|&id| {
            let cell = store
                .get(id)
                .and_then(|record| record.field(key.column))
                .map(SortCell::from_value)
                .unwrap_or_else(SortCell::empty);
            (cell, id)
        })
        .collect();

    match key.direction {
        SortDirection::Ascending => {
            merge_sort_by(&mut keyed, &mut |a: &Keyed, b: &Keyed| a.0.compare(&b.0))
        }
        SortDirection::Descending => {
            merge_sort_by(&mut keyed, &mut |a: &Keyed, b: &Keyed| b.0.compare(&a.0))
        }
    }

    for (slot, (_, id)) in ids.iter_mut().zip(keyed) {
        *slot = id;
    }
}

/// Full pipeline: filter, then sort if a key is set and in range.
pub fn compute_view(store: &RecordStore, query: &QueryState, column_count: usize) -> Vec<RecordId> {
    let mut view = filter_ids(store, &query.filter_text);
    if let Some(key) = query.sort.filter(|key| key.column < column_count) {
        sort_ids(store, &mut view, key);
    }
    view
}

type Keyed = (SortCell, RecordId);

/// Precomputed comparison key mirroring [`tabula_core::compare_cells`].
#[derive(Debug, Clone)]
struct SortCell {
    number: Option<f64>,
    folded: String,
}

impl SortCell {
    fn from_value(value: &CellValue) -> Self {
        Self {
            number: value.as_number(),
            folded: value.as_text().to_lowercase(),
        }
    }

    fn empty() -> Self {
        Self {
            number: None,
            folded: String::new(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => self.folded.cmp(&other.folded),
        }
    }
}

/// Top-down stable merge sort.
///
/// Mixed numeric/text columns make the pairwise rule non-transitive, so this
/// never relies on the comparator being a total order (std's sorts may panic
/// on such input). A right-hand element moves ahead only when strictly less.
fn merge_sort_by<T, F>(items: &mut [T], cmp: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    merge_sort_by(&mut items[..mid], cmp);
    merge_sort_by(&mut items[mid..], cmp);

    let mut merged = Vec::with_capacity(len);
    let (mut left, mut right) = (0, mid);
    while left < mid && right < len {
        if cmp(&items[right], &items[left]) == Ordering::Less {
            merged.push(items[right].clone());
            right += 1;
        } else {
            merged.push(items[left].clone());
            left += 1;
        }
    }
    merged.extend_from_slice(&items[left..mid]);
    merged.extend_from_slice(&items[right..]);
    items.clone_from_slice(&merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::compare_cells;

    fn store(rows: &[(&str, &str)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (name, dept) in rows {
            store.insert(vec![CellValue::text(*name), CellValue::text(*dept)]);
        }
        store
    }

    fn ids(raw: &[u64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId::new).collect()
    }

    #[test]
    fn test_filter_matches_any_column_ignoring_case() {
        let s = store(&[("Bob", "Engineering"), ("Ann", "Sales"), ("Cid", "ENG ops")]);
        assert_eq!(filter_ids(&s, "eng"), ids(&[1, 3]));
        assert_eq!(filter_ids(&s, ""), ids(&[1, 2, 3]));
        assert!(filter_ids(&s, "zzz").is_empty());
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let s = store(&[("Bob", ""), ("Ann", ""), ("Cid", "")]);
        let mut view = ids(&[1, 2, 3]);
        sort_ids(&s, &mut view, SortKey::ascending(0));
        assert_eq!(view, ids(&[2, 1, 3]));
        sort_ids(&s, &mut view, SortKey::descending(0));
        assert_eq!(view, ids(&[3, 1, 2]));
    }

    #[test]
    fn test_sort_ties_keep_store_order_in_both_directions() {
        let s = store(&[("x", "b"), ("y", "a"), ("z", "b"), ("w", "a")]);
        let query = QueryState {
            filter_text: String::new(),
            sort: Some(SortKey::ascending(1)),
        };
        assert_eq!(compute_view(&s, &query, 2), ids(&[2, 4, 1, 3]));

        let query = QueryState {
            filter_text: String::new(),
            sort: Some(SortKey::descending(1)),
        };
        assert_eq!(compute_view(&s, &query, 2), ids(&[1, 3, 2, 4]));
    }

    #[test]
    fn test_numeric_text_sorts_as_numbers() {
        let s = store(&[("10", ""), ("9", ""), ("100", "")]);
        let mut view = ids(&[1, 2, 3]);
        sort_ids(&s, &mut view, SortKey::ascending(0));
        assert_eq!(view, ids(&[2, 1, 3]));
    }

    #[test]
    fn test_non_transitive_mixed_column_does_not_panic() {
        let s = store(&[("2", ""), ("10", ""), ("1a", ""), ("2", ""), ("1a", "")]);
        let mut view = ids(&[1, 2, 3, 4, 5]);
        sort_ids(&s, &mut view, SortKey::ascending(0));
        let mut sorted = view.clone();
        sorted.sort();
        assert_eq!(sorted, ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_out_of_range_sort_column_is_ignored() {
        let s = store(&[("Bob", ""), ("Ann", "")]);
        let query = QueryState {
            filter_text: String::new(),
            sort: Some(SortKey::ascending(9)),
        };
        assert_eq!(compute_view(&s, &query, 2), ids(&[1, 2]));
    }

    #[test]
    fn test_sort_cell_agrees_with_compare_cells() {
        let values = [
            CellValue::text("Ann"),
            CellValue::text("bob"),
            CellValue::Integer(3),
            CellValue::Number(2.5),
            CellValue::text("10"),
            CellValue::Boolean(true),
            CellValue::Empty,
        ];
        for a in &values {
            for b in &values {
                assert_eq!(
                    SortCell::from_value(a).compare(&SortCell::from_value(b)),
                    compare_cells(a, b),
                    "{:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }
}
