//! TABULA Core - Grid Data Types
//!
//! Pure data structures shared by the engine and its consumers: record
//! identities, typed cell values, column schemas, query/page state, the error
//! taxonomy and grid configuration. No engine behaviour lives here.

pub mod column;
pub mod config;
pub mod error;
pub mod identity;
pub mod query;
pub mod record;
pub mod value;

pub use column::{ColumnDescriptor, Schema, DEFAULT_PROGRESS_MAX};
pub use config::{ColumnConfig, GridConfig, PageConfig};
pub use error::{ConfigError, GridError, GridResult, SchemaError};
pub use identity::RecordId;
pub use query::{PageInfo, QueryState, SortDirection, SortKey};
pub use record::{FieldPatch, MutationOutcome, Record};
pub use value::{compare_cells, progress_percent, CellValue, ColumnType};
