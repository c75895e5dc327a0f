//! Records and mutation payloads

use crate::{CellValue, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One logical row with a stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Vec<CellValue>,
}

impl Record {
    pub fn new(id: RecordId, fields: Vec<CellValue>) -> Self {
        Self { id, fields }
    }

    pub fn field(&self, column: usize) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// True if any column's canonical text contains `needle_lower`.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        self.fields
            .iter()
            .any(|value| value.as_text().to_lowercase().contains(needle_lower))
    }
}

/// Partial update: column index to new value.
pub type FieldPatch = BTreeMap<usize, CellValue>;

/// Result of a mutation that may legitimately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MutationOutcome {
    Applied,
    /// The identity is not (or no longer) in the store.
    NotFound,
    /// The request was malformed and nothing was changed.
    Rejected,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}
