//! In-memory tabular data.
//!
//! A [`Table`] is an ordered list of uniquely named columns plus an ordered
//! list of rows. Rows are stored positionally, aligned with the column list,
//! so the "every row has a value for every column" rule holds by construction:
//! [`Table::push_row`] rejects rows of the wrong width.

use crate::value::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Structural errors raised while building or reshaping a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("row #{row} has {found} values but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Ordered columns and ordered rows of scalar values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// # Errors
    /// Returns [`TableError::DuplicateColumn`] if a name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(TableError::DuplicateColumn(c.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table and fill it with `rows`.
    ///
    /// # Errors
    /// See [`Table::new`] and [`Table::push_row`].
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = Self::new(columns)?;
        t.rows.reserve(rows.len());
        for row in rows {
            t.push_row(row)?;
        }
        Ok(t)
    }

    /// Append one row.
    ///
    /// # Errors
    /// Returns [`TableError::RowWidth`] when `row` does not have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub(crate) fn insert_first_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.insert(0, row);
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the column list.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value at (`row`, `column`), if both exist.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// All values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().filter_map(move |r| r.get(idx)))
    }

    /// Project onto `selection`, keeping row order and using the selection's
    /// column order.
    ///
    /// # Errors
    /// Returns [`TableError::UnknownColumn`] for a name the table lacks and
    /// [`TableError::DuplicateColumn`] if the selection repeats a name.
    pub fn project<S: AsRef<str>>(&self, selection: &[S]) -> Result<Table, TableError> {
        let indices = selection
            .iter()
            .map(|s| {
                let s = s.as_ref();
                self.column_index(s)
                    .ok_or_else(|| TableError::UnknownColumn(s.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Table::new(selection.iter().map(|s| s.as_ref().to_owned()))?;
        out.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(out)
    }

    /// Overwrite every cell of `column` with `value`.
    ///
    /// Returns `false` (and changes nothing) if the column does not exist.
    pub fn fill_column(&mut self, column: &str, value: &Value) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = value.clone();
        }
        true
    }
}
