//! Serialization of an [`OutputDocument`] into import-ready bytes.
//!
//! Every field, header included, is quoted. The text is encoded strictly: a
//! character the target encoding cannot hold fails the export instead of being
//! replaced. A UTF-8 BOM is written only when the [`EncodingPolicy`] asks for
//! it, which it can only do for UTF-8.
//!
//! File names follow
//! `<prefix>_<source stem>_<YYYYMMDD_HHMMSS>_<encoding label>[_<BOM label>].csv`,
//! where the BOM label is present for UTF-8 only.

use crate::annotate::OutputDocument;
use crate::encoding::{EncodingPolicy, OutputEncoding, UTF8_BOM, encode_strict};
use crate::error::PrepError;
use chrono::{Local, NaiveDateTime};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_FILENAME_PREFIX: &str = "インポート用";
pub const BOM_PRESENT_LABEL: &str = "BOM付き";
pub const BOM_ABSENT_LABEL: &str = "BOMなし";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Record terminator of the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    fn terminator(self) -> Terminator {
        match self {
            Self::Lf => Terminator::Any(b'\n'),
            Self::Crlf => Terminator::CRLF,
        }
    }
}

/// Naming and layout switches for [`export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub filename_prefix: String,
    pub line_ending: LineEnding,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_owned(),
            line_ending: LineEnding::default(),
        }
    }
}

/// A finished export, ready to be offered for download or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    /// `text/csv;charset=<encoding>`.
    pub mime_type: String,
    /// Data rows written, not counting the annotation row.
    pub data_rows: usize,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its own file name.
    ///
    /// Creates `dir` if needed.
    ///
    /// # Errors
    /// Returns [`PrepError::Io`] if the directory or file cannot be written.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PrepError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            create_dir_all(dir).map_err(|source| PrepError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let path = dir.join(&self.filename);
        let io_err = |source| PrepError::Io {
            path: path.clone(),
            source,
        };
        let mut f = File::create(&path).map_err(io_err)?;
        f.write_all(&self.bytes).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        Ok(path)
    }
}

/// Render `doc` as fully quoted delimited text.
///
/// # Errors
/// Returns [`PrepError::Render`] if the CSV writer fails.
pub fn render_csv(doc: &OutputDocument, line_ending: LineEnding) -> Result<String, PrepError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(line_ending.terminator())
        .from_writer(Vec::new());
    wtr.write_record(doc.columns())?;
    for row in doc.table().rows() {
        wtr.write_record(row.iter().map(|v| v.render()))?;
    }
    let buf = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.error().to_string())))?;
    String::from_utf8(buf)
        .map_err(|e| PrepError::Render(csv::Error::from(std::io::Error::other(e))))
}

/// Encode `doc` according to `policy`.
///
/// # Errors
/// Returns [`PrepError::Encode`] when a field cannot be represented in the
/// target encoding; no partial output is produced.
pub fn serialize(
    doc: &OutputDocument,
    policy: EncodingPolicy,
    line_ending: LineEnding,
) -> Result<Vec<u8>, PrepError> {
    let text = render_csv(doc, line_ending)?;
    let body = encode_strict(&text, policy.encoding())?;
    if !policy.writes_bom() {
        return Ok(body);
    }
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(&UTF8_BOM);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Build the output file name for a source with stem `stem`.
#[must_use]
pub fn output_filename(
    prefix: &str,
    stem: &str,
    policy: EncodingPolicy,
    at: NaiveDateTime,
) -> String {
    let mut segments = vec![
        prefix.to_owned(),
        stem.to_owned(),
        at.format(TIMESTAMP_FORMAT).to_string(),
        policy.encoding().label().to_owned(),
    ];
    if policy.encoding() == OutputEncoding::Utf8 {
        let bom = if policy.writes_bom() {
            BOM_PRESENT_LABEL
        } else {
            BOM_ABSENT_LABEL
        };
        segments.push(bom.to_owned());
    }
    format!("{}.csv", segments.join("_"))
}

/// Serialize and name `doc`, stamping the name with `at`.
///
/// # Errors
/// See [`serialize`].
pub fn export_at(
    doc: &OutputDocument,
    stem: &str,
    policy: EncodingPolicy,
    options: &ExportOptions,
    at: NaiveDateTime,
) -> Result<ExportArtifact, PrepError> {
    let bytes = serialize(doc, policy, options.line_ending)?;
    let filename = output_filename(&options.filename_prefix, stem, policy, at);
    info!(
        file = %filename,
        bytes = bytes.len(),
        rows = doc.data_row_count(),
        "export ready"
    );
    Ok(ExportArtifact {
        bytes,
        filename,
        mime_type: policy.mime_type(),
        data_rows: doc.data_row_count(),
    })
}

/// [`export_at`] using the current local time.
///
/// # Errors
/// See [`serialize`].
pub fn export(
    doc: &OutputDocument,
    stem: &str,
    policy: EncodingPolicy,
    options: &ExportOptions,
) -> Result<ExportArtifact, PrepError> {
    export_at(doc, stem, policy, options, Local::now().naive_local())
}
