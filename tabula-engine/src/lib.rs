//! TABULA Engine - Virtualized Grid Engine
//!
//! Mediates between an identity-keyed record set and a pull-based rendering
//! surface. The surface asks for "row R, column C" of the visible page through
//! [`TableModel`]; the engine filters, sorts, paginates, tracks selection and
//! tells the surface via [`GridObserver`] when its window went stale.
//!
//! ```
//! use tabula_core::{CellValue, ColumnDescriptor, PageConfig, Schema, SortDirection};
//! use tabula_engine::{GridEngine, TableModel};
//!
//! let schema = Schema::new(vec![ColumnDescriptor::text("name")]).unwrap();
//! let rows = vec![
//!     vec![CellValue::text("Bob")],
//!     vec![CellValue::text("Ann")],
//! ];
//! let mut grid = GridEngine::with_records(schema, PageConfig::default(), rows).unwrap();
//! grid.apply_sort(0, SortDirection::Ascending);
//! assert_eq!(grid.cell_value(0, 0), CellValue::text("Ann"));
//! ```

pub mod adapter;
pub mod engine;
pub mod mutation;
pub mod observer;
pub mod pagination;
pub mod pipeline;
pub mod selection;
pub mod store;
pub mod telemetry;

pub use adapter::{ModelState, TableModel};
pub use engine::GridEngine;
pub use observer::{GridObserver, GridSignal, SubscriptionId};
pub use pagination::PaginationWindow;
pub use selection::SelectionTracker;
pub use store::RecordStore;
pub use telemetry::{init_tracing, TelemetryConfig};
