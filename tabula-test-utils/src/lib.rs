//! TABULA Test Utilities
//!
//! Shared test infrastructure for the TABULA workspace:
//! - A recording observer that captures engine signals
//! - Proptest generators for cell values, rows and grid operations
//! - Test fixtures for common grids
//! - Invariant checks and assertions over a live engine

pub use tabula_core::{
    CellValue, ColumnDescriptor, ColumnType, FieldPatch, GridConfig, GridError, GridResult,
    MutationOutcome, PageConfig, PageInfo, QueryState, Record, RecordId, Schema, SchemaError,
    SortDirection, SortKey,
};
pub use tabula_engine::{GridEngine, GridObserver, GridSignal, ModelState, TableModel};

use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// RECORDING OBSERVER
// ============================================================================

/// Observer that keeps every signal it receives.
///
/// Clones share one log, so a test keeps a handle and subscribes a clone.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    signals: Rc<RefCell<Vec<GridSignal>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a clone to `engine` and return this handle.
    pub fn attach(engine: &mut GridEngine) -> Self {
        let observer = Self::new();
        engine.subscribe(Box::new(observer.clone()));
        observer
    }

    pub fn signals(&self) -> Vec<GridSignal> {
        self.signals.borrow().clone()
    }

    pub fn rows_changed_count(&self) -> usize {
        self.signals
            .borrow()
            .iter()
            .filter(|s| matches!(s, GridSignal::RowsChanged))
            .count()
    }

    pub fn page_infos(&self) -> Vec<PageInfo> {
        self.signals
            .borrow()
            .iter()
            .filter_map(|s| match s {
                GridSignal::PageInfoChanged(info) => Some(*info),
                GridSignal::RowsChanged => None,
            })
            .collect()
    }

    pub fn last_page_info(&self) -> Option<PageInfo> {
        self.page_infos().last().copied()
    }

    pub fn clear(&self) {
        self.signals.borrow_mut().clear();
    }
}

impl GridObserver for RecordingObserver {
    fn rows_changed(&mut self) {
        self.signals.borrow_mut().push(GridSignal::RowsChanged);
    }

    fn page_info_changed(&mut self, info: PageInfo) {
        self.signals.borrow_mut().push(GridSignal::PageInfoChanged(info));
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for TABULA values and operation sequences.

    use super::*;
    use proptest::prelude::*;

    /// Short text drawn from a small alphabet so filters actually hit.
    pub fn arb_short_text() -> impl Strategy<Value = String> {
        "[a-cA-C0-9 ]{0,6}"
    }

    /// Generate any storable cell value.
    pub fn arb_cell_value() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Empty),
            arb_short_text().prop_map(CellValue::Text),
            (-1000i64..1000).prop_map(CellValue::Integer),
            (-1000.0f64..1000.0).prop_map(CellValue::Number),
            any::<bool>().prop_map(CellValue::Boolean),
            (0i64..10).prop_map(|n| CellValue::Opaque(serde_json::json!({ "n": n }))),
        ]
    }

    /// Generate a row with exactly `column_count` fields.
    pub fn arb_row(column_count: usize) -> impl Strategy<Value = Vec<CellValue>> {
        prop::collection::vec(arb_cell_value(), column_count)
    }

    /// Generate up to `max_rows` rows for a schema of `column_count` columns.
    pub fn arb_rows(column_count: usize, max_rows: usize) -> impl Strategy<Value = Vec<Vec<CellValue>>> {
        prop::collection::vec(arb_row(column_count), 0..=max_rows)
    }

    pub fn arb_sort_direction() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
    }

    /// One caller-side operation against a grid.
    ///
    /// Record targets are slots into the current store order, resolved at
    /// apply time, so a generated sequence stays meaningful as records come
    /// and go.
    #[derive(Debug, Clone)]
    pub enum GridOp {
        Create(Vec<CellValue>),
        Update { slot: usize, column: usize, value: CellValue },
        Delete { slot: usize },
        Filter(String),
        ClearFilter,
        Sort { column: usize, direction: SortDirection },
        ToggleSort(usize),
        ClearSort,
        GotoPage(usize),
        NextPage,
        PrevPage,
        SetPageSize(usize),
        Select(usize),
        DeleteSelected,
    }

    /// Generate an operation for a schema of `column_count` columns.
    ///
    /// Column indexes may run one past the schema so unknown-column paths
    /// get exercised too.
    pub fn arb_grid_op(column_count: usize) -> impl Strategy<Value = GridOp> {
        prop_oneof![
            3 => arb_row(column_count).prop_map(GridOp::Create),
            2 => (0usize..16, 0..=column_count, arb_cell_value())
                .prop_map(|(slot, column, value)| GridOp::Update { slot, column, value }),
            2 => (0usize..16).prop_map(|slot| GridOp::Delete { slot }),
            2 => arb_query_op(column_count),
            3 => arb_paging_op(),
            2 => (0usize..8).prop_map(GridOp::Select),
            1 => Just(GridOp::DeleteSelected),
        ]
    }

    fn arb_query_op(column_count: usize) -> impl Strategy<Value = GridOp> {
        prop_oneof![
            "[a-c0-9]{0,2}".prop_map(GridOp::Filter),
            Just(GridOp::ClearFilter),
            (0..=column_count, arb_sort_direction())
                .prop_map(|(column, direction)| GridOp::Sort { column, direction }),
            (0..=column_count).prop_map(GridOp::ToggleSort),
            Just(GridOp::ClearSort),
        ]
    }

    fn arb_paging_op() -> impl Strategy<Value = GridOp> {
        prop_oneof![
            (0usize..8).prop_map(GridOp::GotoPage),
            Just(GridOp::NextPage),
            Just(GridOp::PrevPage),
            (0usize..6).prop_map(GridOp::SetPageSize),
        ]
    }

    /// Generate a sequence of operations.
    pub fn arb_grid_ops(column_count: usize, max_len: usize) -> impl Strategy<Value = Vec<GridOp>> {
        prop::collection::vec(arb_grid_op(column_count), 0..=max_len)
    }

    fn id_at_slot(engine: &GridEngine, slot: usize) -> Option<RecordId> {
        let records = engine.records();
        if records.is_empty() {
            return None;
        }
        Some(records[slot % records.len()].id)
    }

    /// Apply `op` to `engine`. Creates use rows of the right arity.
    pub fn apply_op(engine: &mut GridEngine, op: &GridOp) {
        match op {
            GridOp::Create(row) => {
                engine.create(row.clone()).expect("generated row matches schema");
            }
            GridOp::Update { slot, column, value } => {
                if let Some(id) = id_at_slot(engine, *slot) {
                    let _ = engine.update_field(id, *column, value.clone());
                }
            }
            GridOp::Delete { slot } => {
                if let Some(id) = id_at_slot(engine, *slot) {
                    let _ = engine.delete(id);
                }
            }
            GridOp::Filter(text) => engine.apply_filter(text),
            GridOp::ClearFilter => engine.clear_filter(),
            GridOp::Sort { column, direction } => {
                engine.apply_sort(*column, *direction);
            }
            GridOp::ToggleSort(column) => {
                engine.toggle_sort(*column);
            }
            GridOp::ClearSort => engine.clear_sort(),
            GridOp::GotoPage(page) => engine.goto_page(*page),
            GridOp::NextPage => engine.next_page(),
            GridOp::PrevPage => engine.prev_page(),
            GridOp::SetPageSize(size) => engine.set_page_size(*size),
            GridOp::Select(row) => {
                engine.select(*row);
            }
            GridOp::DeleteSelected => {
                let _ = engine.delete_selected();
            }
        }
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built grids for common testing scenarios.

    use super::*;

    pub const DEPARTMENTS: [&str; 4] = ["Engineering", "Sales", "Support", "Marketing"];

    pub fn page(page_size: usize) -> PageConfig {
        PageConfig {
            page_size,
            auto_advance_on_insert: true,
        }
    }

    /// name, department, age, active, salary (progress out of 250000).
    pub fn employee_schema() -> Schema {
        Schema::new(vec![
            ColumnDescriptor::text("name").editable(),
            ColumnDescriptor::text("department"),
            ColumnDescriptor::integer("age"),
            ColumnDescriptor::boolean("active").editable(),
            ColumnDescriptor::progress("salary", 250_000.0).editable(),
        ])
        .expect("employee schema is valid")
    }

    /// Deterministic employee rows: `employee-1` .. `employee-n`.
    pub fn employee_rows(n: usize) -> Vec<Vec<CellValue>> {
        (1..=n)
            .map(|i| {
                vec![
                    CellValue::text(format!("employee-{}", i)),
                    CellValue::text(DEPARTMENTS[(i - 1) % DEPARTMENTS.len()]),
                    CellValue::Integer(20 + (i as i64 * 7) % 40),
                    CellValue::Boolean(i % 3 != 0),
                    CellValue::Integer(40_000 + (i as i64 * 9_000) % 200_000),
                ]
            })
            .collect()
    }

    pub fn employee_grid(n: usize, page_size: usize) -> GridEngine {
        GridEngine::with_records(employee_schema(), page(page_size), employee_rows(n))
            .expect("employee rows match schema")
    }

    /// Two columns: id (integer), name (text).
    pub fn people_schema() -> Schema {
        Schema::new(vec![
            ColumnDescriptor::integer("id"),
            ColumnDescriptor::text("name").editable(),
        ])
        .expect("people schema is valid")
    }

    /// Bob, Ann, Cid with ids 1..=3, page size 10.
    pub fn people_grid() -> GridEngine {
        let rows = ["Bob", "Ann", "Cid"]
            .iter()
            .enumerate()
            .map(|(i, name)| vec![CellValue::Integer(i as i64 + 1), CellValue::text(*name)])
            .collect();
        GridEngine::with_records(people_schema(), page(10), rows)
            .expect("people rows match schema")
    }

    /// One column of every type; paired with generated rows of arity 5.
    pub fn mixed_schema() -> Schema {
        Schema::new(vec![
            ColumnDescriptor::text("label").editable(),
            ColumnDescriptor::integer("count").editable(),
            ColumnDescriptor::boolean("flag").editable(),
            ColumnDescriptor::progress("done", 100.0).editable(),
            ColumnDescriptor::opaque("extra"),
        ])
        .expect("mixed schema is valid")
    }

    pub fn mixed_grid(rows: Vec<Vec<CellValue>>, page_size: usize) -> GridEngine {
        GridEngine::with_records(mixed_schema(), page(page_size), rows)
            .expect("generated rows match schema")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Invariant checks and assertions over a live engine.

    use super::*;
    use std::collections::HashSet;

    /// Check every structural invariant of the engine's derived state.
    ///
    /// - the view holds distinct identities, all present in the store
    /// - the view holds exactly the records matching the filter
    /// - without a sort, the view is in store order
    /// - `1 <= current_page <= total_pages`, with `total_pages >= 1`
    /// - the window holds at most `page_size` rows
    /// - a selected row is on the window and names the selected record
    pub fn check_invariants(engine: &GridEngine) -> Result<(), String> {
        let view = engine.view();
        let mut seen = HashSet::new();
        for id in view {
            if !seen.insert(*id) {
                return Err(format!("duplicate identity {} in view", id));
            }
            if engine.record(*id).is_none() {
                return Err(format!("view references missing record {}", id));
            }
        }

        let needle = engine.query_state().filter_text.to_lowercase();
        let expected: Vec<RecordId> = engine
            .records()
            .iter()
            .filter(|r| r.matches_text(&needle))
            .map(|r| r.id)
            .collect();
        if expected.len() != view.len() || expected.iter().any(|id| !seen.contains(id)) {
            return Err(format!(
                "view {:?} does not match filter result {:?}",
                view, expected
            ));
        }
        if engine.query_state().sort.is_none() && expected.as_slice() != view {
            return Err("unsorted view is not in store order".to_string());
        }

        let info = engine.page_info();
        if info.total_pages < 1 {
            return Err("total_pages is zero".to_string());
        }
        if info.current_page < 1 || info.current_page > info.total_pages {
            return Err(format!(
                "current_page {} outside 1..={}",
                info.current_page, info.total_pages
            ));
        }
        if info.total_count != view.len() || info.total_records != engine.len() {
            return Err(format!("page info {:?} disagrees with engine", info));
        }

        let visible = engine.visible_ids();
        if visible.len() > engine.page_size() {
            return Err(format!(
                "window holds {} rows with page size {}",
                visible.len(),
                engine.page_size()
            ));
        }
        if engine.row_count() != visible.len() {
            return Err("row_count disagrees with visible window".to_string());
        }

        if let Some(row) = engine.selected_row() {
            let Some(&id) = visible.get(row) else {
                return Err(format!("selected row {} outside window", row));
            };
            if engine.selected_id() != Some(id) {
                return Err(format!(
                    "selected row {} shows {} but selection is {:?}",
                    row,
                    id,
                    engine.selected_id()
                ));
            }
        }
        Ok(())
    }

    #[track_caller]
    pub fn assert_invariants(engine: &GridEngine) {
        if let Err(reason) = check_invariants(engine) {
            panic!("Grid invariant violated: {}\n{:?}", reason, engine);
        }
    }

    /// Assert the visible window's `column` renders as `expected` texts.
    #[track_caller]
    pub fn assert_visible_column(engine: &GridEngine, column: usize, expected: &[&str]) {
        let actual: Vec<String> = (0..engine.row_count())
            .map(|row| engine.cell_value(row, column).as_text().into_owned())
            .collect();
        assert_eq!(actual, expected, "Unexpected visible values in column {}", column);
    }

    /// Assert the engine's current page and page count.
    #[track_caller]
    pub fn assert_page(engine: &GridEngine, current_page: usize, total_pages: usize) {
        assert_eq!(
            (engine.current_page(), engine.total_pages()),
            (current_page, total_pages),
            "Unexpected (current_page, total_pages)"
        );
    }

    /// Assert a result is a field-count schema error.
    #[track_caller]
    pub fn assert_field_count_mismatch<T: std::fmt::Debug>(
        result: &GridResult<T>,
        expected: usize,
        got: usize,
    ) {
        match result {
            Err(GridError::Schema(SchemaError::FieldCountMismatch { expected: e, got: g })) => {
                assert_eq!(*e, expected, "Wrong expected field count");
                assert_eq!(*g, got, "Wrong got field count");
            }
            other => panic!(
                "Expected FieldCountMismatch({}, {}), got: {:?}",
                expected, got, other
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
