//! Mutation engine: create, update and delete against the record store.
//!
//! Every mutation is total. "Not found" is an ordinary outcome because the
//! caller's reference may have gone stale within the same event tick; only a
//! schema violation is an error.

use crate::engine::GridEngine;
use tabula_core::{CellValue, FieldPatch, GridResult, MutationOutcome, RecordId};

impl GridEngine {
    /// Append a record and return its new identity.
    ///
    /// If the window was on the last page and the insert adds a page, the
    /// window follows to the new last page (when `auto_advance_on_insert`).
    pub fn create(&mut self, fields: Vec<CellValue>) -> GridResult<RecordId> {
        if let Err(err) = self.schema.check_arity(&fields) {
            tracing::error!(error = %err, "Rejected record that does not match the schema");
            return Err(err.into());
        }

        let was_on_last_page = self.window.is_last_page();
        let pages_before = self.window.total_pages();

        let id = self.store.insert(fields);
        self.rebuild_view();

        if self.auto_advance_on_insert
            && was_on_last_page
            && self.window.total_pages() > pages_before
        {
            self.window.goto(self.window.total_pages());
            self.sync_selection();
        }

        tracing::debug!(record_id = %id, page = self.window.current_page(), "Record created");
        self.mark_changed();
        Ok(id)
    }

    /// Merge `patch` into the record with identity `id`.
    ///
    /// A patch naming an unknown column is rejected as a whole.
    pub fn update(&mut self, id: RecordId, patch: FieldPatch) -> MutationOutcome {
        let column_count = self.schema.column_count();
        if let Some(column) = patch.keys().copied().find(|&c| c >= column_count) {
            tracing::debug!(record_id = %id, column, "Rejected patch with unknown column");
            return MutationOutcome::Rejected;
        }

        let Some(record) = self.store.get_mut(id) else {
            tracing::debug!(record_id = %id, "Update target not found");
            return MutationOutcome::NotFound;
        };
        for (column, value) in patch {
            if let Some(slot) = record.fields.get_mut(column) {
                *slot = value;
            }
        }

        tracing::debug!(record_id = %id, "Record updated");
        self.rebuild_view();
        self.mark_changed();
        MutationOutcome::Applied
    }

    /// Single-field variant of [`GridEngine::update`], used by in-place edits.
    pub fn update_field(&mut self, id: RecordId, column: usize, value: CellValue) -> MutationOutcome {
        self.update(id, FieldPatch::from([(column, value)]))
    }

    /// Remove the record with identity `id` and clear the selection.
    pub fn delete(&mut self, id: RecordId) -> MutationOutcome {
        if self.store.remove(id).is_none() {
            tracing::debug!(record_id = %id, "Delete target not found");
            return MutationOutcome::NotFound;
        }

        self.selection.clear();
        self.rebuild_view();
        tracing::debug!(
            record_id = %id,
            page = self.window.current_page(),
            total_pages = self.window.total_pages(),
            "Record deleted"
        );
        self.mark_changed();
        MutationOutcome::Applied
    }

    /// Delete whatever is selected.
    pub fn delete_selected(&mut self) -> MutationOutcome {
        match self.selection.selected_id() {
            Some(id) => self.delete(id),
            None => MutationOutcome::NotFound,
        }
    }

    /// Patch whatever is selected.
    pub fn update_selected(&mut self, patch: FieldPatch) -> MutationOutcome {
        match self.selection.selected_id() {
            Some(id) => self.update(id, patch),
            None => MutationOutcome::NotFound,
        }
    }

    /// Replace the whole data set. New identities are issued in row order,
    /// above every identity the grid has handed out before.
    ///
    /// Every row is checked before anything is replaced.
    pub fn replace_all(&mut self, rows: Vec<Vec<CellValue>>) -> GridResult<Vec<RecordId>> {
        for (index, row) in rows.iter().enumerate() {
            if let Err(err) = self.schema.check_arity(row) {
                tracing::error!(row = index, error = %err, "Rejected data set that does not match the schema");
                return Err(err.into());
            }
        }

        self.store.clear();
        let ids: Vec<RecordId> = rows.into_iter().map(|row| self.store.insert(row)).collect();
        self.selection.clear();
        self.window.goto(1);
        self.rebuild_view();
        tracing::debug!(records = ids.len(), "Data set replaced");
        self.mark_changed();
        Ok(ids)
    }
}
