use tabula_core::{CellValue, FieldPatch, GridConfig, GridError, RecordId, SortDirection};
use tabula_engine::{GridEngine, TableModel};
use tabula_test_utils::assertions::{
    assert_field_count_mismatch, assert_invariants, assert_page, assert_visible_column,
};
use tabula_test_utils::fixtures;

#[test]
fn sort_by_name_orders_identities() {
    let mut grid = fixtures::people_grid();
    assert!(grid.apply_sort(1, SortDirection::Ascending));
    assert_eq!(
        grid.view(),
        &[RecordId::new(2), RecordId::new(1), RecordId::new(3)]
    );
    assert_visible_column(&grid, 1, &["Ann", "Bob", "Cid"]);
    assert_visible_column(&grid, 0, &["2", "1", "3"]);
    assert_invariants(&grid);
}

#[test]
fn last_page_holds_remainder_and_survives_delete() {
    let mut grid = fixtures::employee_grid(25, 10);
    grid.goto_page(3);
    assert_eq!(grid.row_count(), 5);

    let first = grid.view()[0];
    assert!(grid.delete(first).is_applied());
    assert_page(&grid, 3, 3);
    assert_eq!(grid.row_count(), 4);
    assert_invariants(&grid);
}

#[test]
fn current_page_clamps_when_pages_disappear() {
    let mut grid = fixtures::employee_grid(25, 10);
    grid.goto_page(3);
    let doomed: Vec<RecordId> = grid.view()[..5].to_vec();
    for id in doomed {
        assert!(grid.delete(id).is_applied());
    }
    assert_eq!(grid.len(), 20);
    assert_page(&grid, 2, 2);
    assert_eq!(grid.row_count(), 10);
    assert_invariants(&grid);
}

#[test]
fn filter_is_case_insensitive_substring() {
    let mut grid = fixtures::employee_grid(25, 10);
    grid.apply_filter("eng");
    assert_eq!(grid.page_info().total_count, 7);
    for row in 0..grid.row_count() {
        assert_eq!(grid.cell_value(row, 1), CellValue::text("Engineering"));
    }

    grid.apply_filter("ENG");
    assert_eq!(grid.page_info().total_count, 7);
    grid.clear_filter();
    assert_eq!(grid.page_info().total_count, 25);
    assert_invariants(&grid);
}

#[test]
fn create_on_full_last_page_advances() {
    let mut grid = fixtures::employee_grid(20, 10);
    grid.last_page();
    assert_page(&grid, 2, 2);

    let id = grid
        .create(fixtures::employee_rows(21).pop().unwrap())
        .unwrap();
    assert_page(&grid, 3, 3);
    assert_eq!(grid.visible_ids(), &[id]);
    assert_invariants(&grid);
}

#[test]
fn create_elsewhere_keeps_page() {
    let mut grid = fixtures::employee_grid(20, 10);
    grid.create(fixtures::employee_rows(21).pop().unwrap())
        .unwrap();
    assert_page(&grid, 1, 3);
}

#[test]
fn filtering_out_selection_clears_it() {
    let mut grid = fixtures::employee_grid(10, 10);
    assert!(grid.select(2));
    assert_eq!(grid.selected_id(), Some(RecordId::new(3)));

    grid.apply_filter("employee-1");
    assert!(grid.selected_record().is_none());
    assert_eq!(grid.selected_row(), None);
    assert_invariants(&grid);
}

#[test]
fn selection_follows_identity_through_sort() {
    let mut grid = fixtures::people_grid();
    grid.select(0);
    grid.apply_sort(1, SortDirection::Ascending);
    assert_eq!(grid.selected_row(), Some(1));
    assert_eq!(
        grid.selected_record().map(|r| r.fields[1].clone()),
        Some(CellValue::text("Bob"))
    );
}

#[test]
fn ids_are_not_reused_after_delete() {
    let mut grid = fixtures::people_grid();
    assert!(grid.delete(RecordId::new(3)).is_applied());
    let id = grid
        .create(vec![CellValue::Integer(4), CellValue::text("Dee")])
        .unwrap();
    assert_eq!(id, RecordId::new(4));
}

#[test]
fn empty_grid_has_one_empty_page() {
    let grid = GridEngine::new(fixtures::people_schema(), fixtures::page(10));
    assert_page(&grid, 1, 1);
    assert_eq!(grid.row_count(), 0);
    assert_eq!(grid.cell_value(0, 1), CellValue::text(""));
    assert_invariants(&grid);
}

#[test]
fn from_config_builds_schema_and_paging() {
    let config = GridConfig::from_toml_str(
        r#"
        [page]
        page_size = 2

        [[columns]]
        name = "task"
        type = "text"
        editable = true

        [[columns]]
        name = "done"
        type = "progress"
        progress_max = 8.0
        "#,
    )
    .unwrap();
    let mut grid = GridEngine::from_config(&config).unwrap();
    assert_eq!(grid.column_count(), 2);
    assert_eq!(grid.page_size(), 2);

    grid.create(vec![CellValue::text("write"), CellValue::Integer(2)])
        .unwrap();
    assert_eq!(grid.cell_value(0, 1), CellValue::Integer(25));
    assert!(!grid.set_cell_value(0, 1, CellValue::Integer(50)));
}

#[test]
fn from_config_rejects_invalid_config() {
    let config = GridConfig::from_toml_str(
        r#"
        [page]
        page_size = 0

        [[columns]]
        name = "task"
        type = "text"
        "#,
    )
    .unwrap();
    let err = GridEngine::from_config(&config).unwrap_err();
    assert!(matches!(err, GridError::Config(_)));
}

#[test]
fn from_config_rejects_duplicate_columns() {
    let config = GridConfig::from_toml_str(
        r#"
        [[columns]]
        name = "task"
        type = "text"

        [[columns]]
        name = "task"
        type = "integer"
        "#,
    )
    .unwrap();
    let err = GridEngine::from_config(&config).unwrap_err();
    assert!(matches!(err, GridError::Schema(_)));
}

#[test]
fn update_is_pulled_back_formatted_for_every_type() {
    let rows = (0..6)
        .map(|i| {
            vec![
                CellValue::text(format!("row-{}", i)),
                CellValue::Integer(i),
                CellValue::Boolean(true),
                CellValue::Integer(0),
                CellValue::Empty,
            ]
        })
        .collect();
    let mut grid = fixtures::mixed_grid(rows, 4);
    let id = RecordId::new(6);
    let patch = FieldPatch::from([
        (0, CellValue::Integer(7)),
        (1, CellValue::text("41")),
        (2, CellValue::text("false")),
        (3, CellValue::Number(62.4)),
        (4, CellValue::Opaque(serde_json::json!({"tag": "x"}))),
    ]);
    assert!(grid.update(id, patch).is_applied());

    assert_eq!(grid.window_row_of(id), None);
    grid.goto_page(2);
    let row = grid.window_row_of(id).unwrap();
    assert_eq!(row, 1);
    assert_eq!(grid.cell_value(row, 0), CellValue::text("7"));
    assert_eq!(grid.cell_value(row, 1), CellValue::Integer(41));
    assert_eq!(grid.cell_value(row, 2), CellValue::Boolean(false));
    assert_eq!(grid.cell_value(row, 3), CellValue::Integer(62));
    assert_eq!(
        grid.cell_value(row, 4),
        CellValue::Opaque(serde_json::json!({"tag": "x"}))
    );

    let shown: Vec<RecordId> = grid.visible_records().map(|r| r.id).collect();
    assert_eq!(shown, vec![RecordId::new(5), id]);
}

#[test]
fn create_with_wrong_arity_is_a_schema_error() {
    let mut grid = fixtures::people_grid();
    let result = grid.create(vec![CellValue::text("solo")]);
    assert_field_count_mismatch(&result, 2, 1);

    let result = grid.replace_all(vec![vec![CellValue::Empty; 3]]);
    assert_field_count_mismatch(&result, 2, 3);
    assert_eq!(grid.len(), 3);
}
