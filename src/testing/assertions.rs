//! Assertion functions for tables and output documents.

use crate::table::Table;
use crate::value::Value;

/// Assert that `table` has exactly `expected` columns, in order.
///
/// # Panics
///
/// Panics if the column lists differ.
pub fn assert_columns(table: &Table, expected: &[&str]) {
    let actual: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    assert_eq!(
        actual, expected,
        "Column mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that every cell of `column` equals `expected`.
///
/// # Panics
///
/// Panics if the column is missing or any cell differs.
pub fn assert_column_all(table: &Table, column: &str, expected: &Value) {
    let values = table
        .column_values(column)
        .unwrap_or_else(|| panic!("Column {column:?} not found in {:?}", table.columns()));
    for (i, v) in values.enumerate() {
        assert_eq!(
            v, expected,
            "Cell mismatch in column {column:?} at row {i}:\n  Expected: {expected:?}\n  Actual: {v:?}"
        );
    }
}

/// Assert that row `index` holds exactly the given `(column, value)` pairs.
///
/// The pairs must name every column of the table, in any order.
///
/// # Panics
///
/// Panics if the row is missing, a column is missing, or any value differs.
pub fn assert_row(table: &Table, index: usize, expected: &[(&str, Value)]) {
    assert_eq!(
        table.columns().len(),
        expected.len(),
        "Row {index} expectation names {} columns but the table has {:?}",
        expected.len(),
        table.columns()
    );
    for (column, value) in expected {
        let actual = table
            .get(index, column)
            .unwrap_or_else(|| panic!("No cell at row {index}, column {column:?}"));
        assert_eq!(
            actual, value,
            "Cell mismatch at row {index}, column {column:?}:\n  Expected: {value:?}\n  Actual: {actual:?}"
        );
    }
}
