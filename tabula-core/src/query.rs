//! Query and paging state shared between the engine and its consumers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: usize) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// Caller-controlled inputs to the query pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryState {
    pub filter_text: String,
    pub sort: Option<SortKey>,
}

impl QueryState {
    /// Sort key that results from clicking `column`'s header.
    pub fn toggled(&self, column: usize) -> SortKey {
        match self.sort {
            Some(key) if key.column == column => SortKey {
                column,
                direction: key.direction.flipped(),
            },
            _ => SortKey::ascending(column),
        }
    }
}

/// Status-label summary of the pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    /// Rows in the filtered view.
    pub total_count: usize,
    /// Rows in the record store, ignoring the filter.
    pub total_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_column_flips() {
        let state = QueryState {
            filter_text: String::new(),
            sort: Some(SortKey::ascending(2)),
        };
        assert_eq!(state.toggled(2), SortKey::descending(2));
    }

    #[test]
    fn test_toggle_new_column_starts_ascending() {
        let state = QueryState {
            filter_text: String::new(),
            sort: Some(SortKey::descending(2)),
        };
        assert_eq!(state.toggled(0), SortKey::ascending(0));
        assert_eq!(QueryState::default().toggled(1), SortKey::ascending(1));
    }
}
