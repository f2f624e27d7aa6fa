//! Column type registry.
//!
//! The registry is a Markdown pipe table maintained next to the importer:
//!
//! ```text
//! |項目|項目名|型|説明|
//! |--|--|--|--|
//! | 1 | content.id | string | 管理ID |
//! | 2 | content.price | number | 価格 |
//! ```
//!
//! Field 2 of each data line is the item name and field 3 its declared type.
//! Lines with an empty name or a type outside [`DataType`] are skipped.
//!
//! Loading the registry never fails the run. [`resolve_schema`] returns a
//! [`SchemaResolution`] whose fallback arm carries the reason and yields an
//! empty [`ColumnSchema`], so every column is typed `string`.

use crate::encoding::{decode_strict, detect_encoding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Well-known file name of the registry document.
pub const DEFAULT_REGISTRY_FILE: &str = "データ項目一覧.md";

/// Declared type of a column, as understood by the downstream importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Object,
        Self::Array,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

/// Column name to declared type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema(BTreeMap<String, DataType>);

impl ColumnSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, ty: DataType) {
        self.0.insert(column.into(), ty);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<DataType> {
        self.0.get(column).copied()
    }

    /// Declared type of `column`, defaulting to [`DataType::String`].
    #[must_use]
    pub fn type_of(&self, column: &str) -> DataType {
        self.get(column).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, DataType)> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = (S, DataType)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Line markers that identify the non-data rows of the registry table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryFormat {
    /// Prefix of the header line.
    pub header_marker: String,
    /// Prefix of the `|--|--|` separator line.
    pub separator_marker: String,
}

impl Default for RegistryFormat {
    fn default() -> Self {
        Self {
            header_marker: "|項目|".to_owned(),
            separator_marker: "|--".to_owned(),
        }
    }
}

/// Why the registry could not be used.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("cannot read registry {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {} is not valid {encoding}", path.display())]
    Decode { path: PathBuf, encoding: &'static str },
}

/// Outcome of resolving the registry: a schema, or the reason for falling back.
#[derive(Debug)]
pub enum SchemaResolution {
    Resolved(ColumnSchema),
    Fallback(SchemaLoadError),
}

impl SchemaResolution {
    /// The usable schema; empty for [`SchemaResolution::Fallback`].
    #[must_use]
    pub fn schema(&self) -> &ColumnSchema {
        static EMPTY: OnceLock<ColumnSchema> = OnceLock::new();
        match self {
            Self::Resolved(s) => s,
            Self::Fallback(_) => EMPTY.get_or_init(ColumnSchema::new),
        }
    }

    #[must_use]
    pub fn warning(&self) -> Option<&SchemaLoadError> {
        match self {
            Self::Resolved(_) => None,
            Self::Fallback(e) => Some(e),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Parse registry text into a schema.
///
/// Later lines win when an item name appears twice.
#[must_use]
pub fn parse_registry(text: &str, format: &RegistryFormat) -> ColumnSchema {
    let mut schema = ColumnSchema::new();
    for line in text.lines() {
        if !line.starts_with('|')
            || line.starts_with(&format.header_marker)
            || line.starts_with(&format.separator_marker)
        {
            continue;
        }
        let fields: Vec<&str> = line.trim().split('|').collect();
        if fields.len() < 4 {
            continue;
        }
        let name = fields[2].trim();
        let ty = fields[3].trim();
        match ty.parse::<DataType>() {
            Ok(ty) if !name.is_empty() => schema.insert(name, ty),
            _ => debug!(line, "skipping registry line"),
        }
    }
    schema
}

/// Read, decode and parse the registry at `path`.
///
/// # Errors
/// Returns [`SchemaLoadError`] when the file cannot be read or decoded.
pub fn load_registry(
    path: impl AsRef<Path>,
    format: &RegistryFormat,
) -> Result<ColumnSchema, SchemaLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SchemaLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encoding = detect_encoding(&bytes);
    let text = decode_strict(&bytes, encoding).ok_or_else(|| SchemaLoadError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })?;
    Ok(parse_registry(&text, format))
}

/// Resolve the registry, degrading to an empty schema on any failure.
pub fn resolve_schema(path: impl AsRef<Path>, format: &RegistryFormat) -> SchemaResolution {
    let path = path.as_ref();
    match load_registry(path, format) {
        Ok(schema) => {
            debug!(path = %path.display(), columns = schema.len(), "registry loaded");
            SchemaResolution::Resolved(schema)
        }
        Err(e) => {
            warn!(error = %e, "registry unavailable; every column defaults to string");
            SchemaResolution::Fallback(e)
        }
    }
}

/// Resolves the registry once and serves the cached result afterwards.
///
/// One resolver is shared by every file of a batch run.
#[derive(Debug)]
pub struct SchemaResolver {
    path: PathBuf,
    format: RegistryFormat,
    cache: OnceLock<SchemaResolution>,
}

impl SchemaResolver {
    pub fn new(path: impl Into<PathBuf>, format: RegistryFormat) -> Self {
        Self {
            path: path.into(),
            format,
            cache: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve(&self) -> &SchemaResolution {
        self.cache
            .get_or_init(|| resolve_schema(&self.path, &self.format))
    }

    pub fn schema(&self) -> &ColumnSchema {
        self.resolve().schema()
    }
}
