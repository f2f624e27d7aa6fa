//! Spreadsheet source loader (first worksheet, first row is the header).

use crate::io::normalize_headers;
use crate::table::Table;
use crate::value::{MAX_EXACT_INTEGER, Value};
use anyhow::{Context, Result, bail};
use calamine::{Data, DataType as _, Reader, Xlsx};
use std::io::Cursor;

/// Read the first worksheet of an `.xlsx` workbook held in memory.
///
/// Integers and floats become [`Value::Number`], strings [`Value::Text`],
/// booleans [`Value::Boolean`] and empty cells [`Value::Null`]. Integers too
/// large for an exact [`Value::Number`] keep their digits as text. Date cells
/// become `YYYY-MM-DD HH:MM:SS` text; error cells keep their display text.
///
/// # Errors
/// Returns an error if the bytes are not a workbook, it has no worksheet,
/// or the first worksheet is empty.
pub fn read_xlsx_table(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).context("open workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("read first worksheet")?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        bail!("first worksheet is empty");
    };
    let columns = normalize_headers(
        header
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
    );

    let mut table = Table::new(columns)?;
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect())?;
    }
    Ok(table)
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) if i.unsigned_abs() <= MAX_EXACT_INTEGER => Value::Number(*i as f64),
        Data::Int(i) => Value::Text(i.to_string()),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Boolean(*b),
        Data::Empty => Value::Null,
        other => match other.as_datetime() {
            Some(dt) => Value::Text(dt.format(DATETIME_FORMAT).to_string()),
            None => Value::Text(other.to_string()),
        },
    }
}
