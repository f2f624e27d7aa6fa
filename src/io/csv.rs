//! Delimited-text source loader.
//!
//! Bytes are decoded as UTF-8 first (a leading BOM is dropped). Files saved by
//! Japanese desktop tools are often cp932, so a UTF-8 failure is retried once
//! as Shift_JIS before giving up.
//!
//! With [`LoadOptions::infer_types`] on, a column becomes Number when every
//! non-empty cell parses as a finite number, Boolean when every non-empty cell
//! is `true`/`false` (any case), and Text otherwise. Empty cells are Null.

use crate::encoding::decode_strict;
use crate::io::{LoadOptions, normalize_headers};
use crate::table::Table;
use crate::value::{MAX_EXACT_INTEGER, Value};
use anyhow::{Context, Result, bail};
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use std::borrow::Cow;
use tracing::debug;

/// Decode source bytes, trying UTF-8 and then Shift_JIS.
///
/// # Errors
/// Returns an error if neither encoding decodes `bytes` cleanly.
pub fn decode_source(bytes: &[u8]) -> Result<(Cow<'_, str>, &'static Encoding)> {
    if let Some(text) = decode_strict(bytes, UTF_8) {
        return Ok((text, UTF_8));
    }
    debug!("source is not UTF-8; retrying as Shift_JIS");
    match decode_strict(bytes, SHIFT_JIS) {
        Some(text) => Ok((text, SHIFT_JIS)),
        None => bail!("text is neither UTF-8 nor Shift_JIS"),
    }
}

/// Parse delimited bytes into a [`Table`], the first record being the header.
///
/// Short records are padded with nulls; records longer than the header are
/// rejected.
///
/// # Errors
/// Returns an error on undecodable bytes, a missing header, or malformed records.
pub fn read_csv_table(bytes: &[u8], delimiter: u8, options: &LoadOptions) -> Result<Table> {
    let (text, encoding) = decode_source(bytes)?;
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("read CSV header")?
        .iter()
        .map(str::to_owned)
        .collect();
    if headers.is_empty() {
        bail!("no columns found");
    }
    let columns = normalize_headers(headers);
    let width = columns.len();

    let mut cells: Vec<Vec<String>> = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        if rec.len() > width {
            bail!(
                "CSV record #{} has {} fields but the header has {}",
                i + 1,
                rec.len(),
                width
            );
        }
        let mut row: Vec<String> = rec.iter().map(str::to_owned).collect();
        row.resize(width, String::new());
        cells.push(row);
    }
    debug!(encoding = encoding.name(), rows = cells.len(), "delimited source parsed");

    let kinds: Vec<CellKind> = (0..width)
        .map(|c| {
            if options.infer_types {
                infer_kind(cells.iter().map(|r| r[c].as_str()))
            } else {
                CellKind::Text
            }
        })
        .collect();

    let rows = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect();
    Ok(Table::from_rows(columns, rows)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    Boolean,
    Text,
}

impl CellKind {
    fn convert(self, cell: String) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        match self {
            Self::Number => parse_number(&cell).map_or(Value::Text(cell), Value::Number),
            Self::Boolean => parse_bool(&cell).map_or(Value::Text(cell), Value::Boolean),
            Self::Text => Value::Text(cell),
        }
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> CellKind {
    let mut number = true;
    let mut boolean = true;
    let mut any = false;
    for cell in cells.filter(|c| !c.is_empty()) {
        any = true;
        number &= parse_number(cell).is_some();
        boolean &= parse_bool(cell).is_some();
        if !number && !boolean {
            return CellKind::Text;
        }
    }
    match (any, number, boolean) {
        (false, _, _) => CellKind::Text,
        (true, true, _) => CellKind::Number,
        (true, false, true) => CellKind::Boolean,
        _ => CellKind::Text,
    }
}

/// Parse a numeric cell, refusing anything `f64` would not hold exactly.
fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if !t.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if is_integer_lexeme(t) {
        let n = t.parse::<i64>().ok()?;
        return (n.unsigned_abs() <= MAX_EXACT_INTEGER).then_some(n as f64);
    }
    t.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && (n.fract() != 0.0 || n.abs() <= MAX_EXACT_INTEGER as f64))
}

fn is_integer_lexeme(t: &str) -> bool {
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_numbers_only_when_every_cell_parses() {
        assert_eq!(infer_kind(["1", "", "2.5"].into_iter()), CellKind::Number);
        assert_eq!(infer_kind(["1", "x"].into_iter()), CellKind::Text);
        assert_eq!(infer_kind(["TRUE", "false"].into_iter()), CellKind::Boolean);
        assert_eq!(infer_kind(["", ""].into_iter()), CellKind::Text);
    }

    #[test]
    fn nan_and_inf_stay_text() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 42 "), Some(42.0));
    }

    #[test]
    fn integers_beyond_f64_precision_are_not_numbers() {
        assert_eq!(parse_number("9007199254740992"), Some(9_007_199_254_740_992.0));
        assert_eq!(parse_number("-9007199254740992"), Some(-9_007_199_254_740_992.0));
        assert_eq!(parse_number("9007199254740993"), None);
        assert_eq!(parse_number("99999999999999999999"), None);
        assert_eq!(parse_number("1e20"), None);
        assert_eq!(parse_number("650.5"), Some(650.5));
    }
}
