//! Column descriptors and the fixed grid schema

use crate::{CellValue, ColumnType, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Scale used by a progress column when none was supplied.
pub const DEFAULT_PROGRESS_MAX: f64 = 100.0;

/// Declaration of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub name: String,
    pub declared_type: ColumnType,
    pub editable: bool,
    /// Magnitude that renders as 100 in a `Progress` column.
    pub progress_max: Option<f64>,
}

impl ColumnDescriptor {
    /// Create a read-only column. The index is assigned by [`Schema::new`].
    pub fn new(name: impl Into<String>, declared_type: ColumnType) -> Self {
        Self {
            index: 0,
            name: name.into(),
            declared_type,
            editable: false,
            progress_max: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Opaque)
    }

    /// Progress column rendering `value / max` as a percentage.
    pub fn progress(name: impl Into<String>, max: f64) -> Self {
        Self {
            progress_max: Some(max),
            ..Self::new(name, ColumnType::Progress)
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Effective progress scale.
    pub fn scale(&self) -> f64 {
        self.progress_max.unwrap_or(DEFAULT_PROGRESS_MAX)
    }

    /// Value this column reports for the stored `value`.
    pub fn format(&self, value: &CellValue) -> CellValue {
        value.format_as(self.declared_type, self.scale())
    }

    /// Stored form of a value written through this column.
    pub fn coerce(&self, value: CellValue) -> CellValue {
        value.coerce_for_write(self.declared_type, self.scale())
    }
}

/// Ordered, immutable set of columns shared by every record of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    /// Build a schema, assigning each descriptor its positional index.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut seen = HashSet::new();
        let mut indexed = Vec::with_capacity(columns.len());
        for (index, mut column) in columns.into_iter().enumerate() {
            if !seen.insert(column.name.clone()) {
                return Err(SchemaError::DuplicateColumn { name: column.name });
            }
            if column.declared_type == ColumnType::Progress {
                let max = column.scale();
                if !max.is_finite() || max <= 0.0 {
                    return Err(SchemaError::InvalidProgressScale {
                        column: column.name,
                        max,
                    });
                }
            }
            column.index = index;
            indexed.push(column);
        }

        Ok(Self { columns: indexed })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.column(index).map(|c| c.declared_type)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Hard check for a full row of fields.
    pub fn check_arity(&self, fields: &[CellValue]) -> Result<(), SchemaError> {
        if fields.len() != self.columns.len() {
            return Err(SchemaError::FieldCountMismatch {
                expected: self.columns.len(),
                got: fields.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_assigns_positional_indexes() {
        let schema = Schema::new(vec![
            ColumnDescriptor::integer("id"),
            ColumnDescriptor::text("name").editable(),
        ])
        .unwrap();
        assert_eq!(schema.column(1).map(|c| c.index), Some(1));
        assert_eq!(schema.index_of("name"), Some(1));
        assert!(schema.column(1).unwrap().editable);
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert_eq!(Schema::new(vec![]), Err(SchemaError::EmptySchema));
    }

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let err = Schema::new(vec![
            ColumnDescriptor::text("name"),
            ColumnDescriptor::text("name"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_schema_rejects_non_positive_progress_scale() {
        let err = Schema::new(vec![ColumnDescriptor::progress("salary", 0.0)]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidProgressScale { .. }));
    }

    #[test]
    fn test_check_arity() {
        let schema = Schema::new(vec![ColumnDescriptor::text("a"), ColumnDescriptor::text("b")])
            .unwrap();
        assert!(schema.check_arity(&[CellValue::Empty, CellValue::Empty]).is_ok());
        assert_eq!(
            schema.check_arity(&[CellValue::Empty]),
            Err(SchemaError::FieldCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }
}
