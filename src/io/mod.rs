//! Source loading: turning uploaded bytes into a [`Table`].
//!
//! The format is chosen from the original file name (see [`SourceFormat`]).
//! Every loader failure becomes [`PrepError::SourceLoad`] with the loader's
//! context chain in the message.

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;

#[cfg_attr(docsrs, doc(cfg(feature = "io-xlsx")))]
#[cfg(feature = "io-xlsx")]
pub mod xlsx;

pub mod glob;

use crate::error::PrepError;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Input formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row.
    Delimited { delimiter: u8 },
    /// Spreadsheet workbook; the first worksheet is read.
    Spreadsheet,
}

impl SourceFormat {
    /// Pick a format from the extension of `name` (case-insensitive).
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Delimited { delimiter: b',' }),
            "tsv" => Some(Self::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Loader switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Give delimited columns a Number or Boolean type when every cell allows it.
    pub infer_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { infer_types: true }
    }
}

/// A loaded input together with the naming data the export needs.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Original file name as uploaded.
    pub name: String,
    /// `name` without its last extension.
    pub stem: String,
    pub table: Table,
}

impl LoadedSource {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }
}

/// `name` without directory and without its last extension.
#[must_use]
pub fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_owned(), |s| s.to_string_lossy().into_owned())
}

/// Load `bytes` uploaded under `name`.
///
/// # Errors
/// Returns [`PrepError::SourceLoad`] for an unsupported extension or any
/// parse failure.
pub fn load_source(name: &str, bytes: &[u8], options: &LoadOptions) -> Result<LoadedSource, PrepError> {
    let format = SourceFormat::from_filename(name).ok_or_else(|| PrepError::SourceLoad {
        name: name.to_owned(),
        reason: "unsupported file type (expected .csv, .tsv, .txt, .xlsx or .xlsm)".to_owned(),
    })?;
    let table = load_table(format, bytes, options).map_err(|e| PrepError::source_load(name, &e))?;
    info!(
        source = name,
        columns = table.columns().len(),
        rows = table.row_count(),
        "source loaded"
    );
    Ok(LoadedSource {
        name: name.to_owned(),
        stem: file_stem(name),
        table,
    })
}

#[allow(unused_variables)]
fn load_table(format: SourceFormat, bytes: &[u8], options: &LoadOptions) -> anyhow::Result<Table> {
    match format {
        #[cfg(feature = "io-csv")]
        SourceFormat::Delimited { delimiter } => self::csv::read_csv_table(bytes, delimiter, options),
        #[cfg(feature = "io-xlsx")]
        SourceFormat::Spreadsheet => self::xlsx::read_xlsx_table(bytes),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("{other:?} support is not compiled in"),
    }
}

/// Make header names usable as unique column names.
///
/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
#[must_use]
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut used = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for (i, h) in headers.into_iter().enumerate() {
        let base = if h.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            h
        };
        let mut name = base.clone();
        let mut k = 1;
        while used.contains(&name) {
            name = format!("{base}.{k}");
            k += 1;
        }
        used.insert(name.clone());
        out.push(name);
    }
    out
}
