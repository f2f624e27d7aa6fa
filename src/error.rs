//! Error type for a processing run.
//!
//! Registry problems are deliberately absent: they never abort a run and are
//! reported through [`SchemaResolution`](crate::schema::SchemaResolution).
//! An empty column selection is not an error either; see
//! [`RunOutcome::NothingSelected`](crate::pipeline::RunOutcome).

use crate::encoding::EncodeError;
use crate::table::TableError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    /// The input bytes could not be turned into a table.
    #[error("failed to load {name}: {reason}")]
    SourceLoad { name: String, reason: String },

    /// A field cannot be represented in the chosen output encoding.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to render CSV: {0}")]
    Render(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("invalid rule for {column}: {reason}")]
    InvalidRule { column: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PrepError {
    /// Wrap a loader failure, keeping its whole context chain in the message.
    pub fn source_load(name: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::SourceLoad {
            name: name.into(),
            reason: format!("{err:#}"),
        }
    }
}

pub type Result<T, E = PrepError> = std::result::Result<T, E>;
