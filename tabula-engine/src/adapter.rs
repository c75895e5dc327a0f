//! Virtualized model adapter: the pull contract a rendering surface consumes.
//!
//! The surface never receives the data set. It asks for the row count of the
//! visible window and then pulls individual cells by (window row, column).
//! Nothing is cached here; every answer is computed from the current window.

use crate::engine::GridEngine;
use tabula_core::{CellValue, ColumnType};

/// Whether the surface has been told about the latest window.
///
/// This tracks notification, not correctness: pulls are always answered from
/// the current window, even while `Stale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// The last `rows_changed` matches the current window.
    Clean,
    /// Something changed since the last `rows_changed`.
    Stale,
}

/// Pull-based table model: four reads and one write.
pub trait TableModel {
    fn column_count(&self) -> usize;

    /// `None` for an unknown column.
    fn column_type(&self, column: usize) -> Option<ColumnType>;

    /// Rows in the visible window, never the full view.
    fn row_count(&self) -> usize;

    /// Formatted value at (window row, column).
    ///
    /// A pull that no longer resolves (the surface may lag a frame behind a
    /// mutation) yields the column type's zero value.
    fn cell_value(&self, window_row: usize, column: usize) -> CellValue;

    /// In-place edit. Returns whether the write was applied; writes to
    /// read-only columns or vanished rows are dropped.
    fn set_cell_value(&mut self, window_row: usize, column: usize, value: CellValue) -> bool;
}

impl TableModel for GridEngine {
    fn column_count(&self) -> usize {
        self.schema().column_count()
    }

    fn column_type(&self, column: usize) -> Option<ColumnType> {
        self.schema().column_type(column)
    }

    fn row_count(&self) -> usize {
        self.visible_ids().len()
    }

    fn cell_value(&self, window_row: usize, column: usize) -> CellValue {
        let Some(descriptor) = self.schema().column(column) else {
            return CellValue::Empty;
        };
        self.visible_ids()
            .get(window_row)
            .and_then(|&id| self.record(id))
            .and_then(|record| record.field(column))
            .map(|value| descriptor.format(value))
            .unwrap_or_else(|| descriptor.declared_type.zero_value())
    }

    fn set_cell_value(&mut self, window_row: usize, column: usize, value: CellValue) -> bool {
        let Some(descriptor) = self.schema().column(column) else {
            tracing::debug!(column, "Dropped write to unknown column");
            return false;
        };
        if !descriptor.editable {
            tracing::debug!(column, "Dropped write to read-only column");
            return false;
        }
        let stored = descriptor.coerce(value);
        let Some(&id) = self.visible_ids().get(window_row) else {
            tracing::debug!(window_row, "Dropped write to row outside visible window");
            return false;
        };
        self.update_field(id, column, stored).is_applied()
    }
}

impl GridEngine {
    /// Surface event: a column header was clicked.
    pub fn on_header_clicked(&mut self, column: usize) -> bool {
        self.toggle_sort(column)
    }

    /// Surface event: a row was clicked.
    pub fn on_row_clicked(&mut self, window_row: usize) -> bool {
        self.select(window_row)
    }
}
