//! Identity-based selection over the visible window.

use tabula_core::RecordId;

/// Remembers the selected record by identity so the selection survives
/// reordering. The reported window row is re-derived after every recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<RecordId>,
    window_row: Option<usize>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn window_row(&self) -> Option<usize> {
        self.window_row
    }

    /// Select the record shown at `window_row`. Out-of-range rows are ignored.
    pub fn select(&mut self, visible: &[RecordId], window_row: usize) -> bool {
        match visible.get(window_row) {
            Some(&id) => {
                self.selected = Some(id);
                self.window_row = Some(window_row);
                true
            }
            None => false,
        }
    }

    /// Follow the selected identity into a new window, or drop it.
    pub fn remap(&mut self, visible: &[RecordId]) {
        let Some(id) = self.selected else {
            return;
        };
        match visible.iter().position(|&candidate| candidate == id) {
            Some(row) => self.window_row = Some(row),
            None => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.window_row = None;
    }
}
