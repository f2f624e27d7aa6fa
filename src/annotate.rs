//! Type-annotation row synthesis.

use crate::schema::{ColumnSchema, DataType};
use crate::table::Table;
use crate::value::Value;

/// A table whose first row declares the type of each column.
///
/// Built by [`annotate`]; the remaining rows are the data rows in their
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    table: Table,
}

impl OutputDocument {
    /// The full table, annotation row included.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    #[must_use]
    pub fn annotation_row(&self) -> &[Value] {
        &self.table.rows()[0]
    }

    #[must_use]
    pub fn data_rows(&self) -> &[Vec<Value>] {
        &self.table.rows()[1..]
    }

    /// Number of rows including the annotation row.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    #[must_use]
    pub fn data_row_count(&self) -> usize {
        self.row_count() - 1
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Prepend a row holding each column's declared type.
///
/// Columns missing from `schema` are declared [`DataType::String`]. Columns
/// and their order are unchanged.
#[must_use]
pub fn annotate(mut table: Table, schema: &ColumnSchema) -> OutputDocument {
    let row = declared_types(&table, schema)
        .into_iter()
        .map(|t| Value::text(t.as_str()))
        .collect();
    table.insert_first_row(row);
    OutputDocument { table }
}

/// Declared type per column of `table`, in column order.
#[must_use]
pub fn declared_types(table: &Table, schema: &ColumnSchema) -> Vec<DataType> {
    table.columns().iter().map(|c| schema.type_of(c)).collect()
}
