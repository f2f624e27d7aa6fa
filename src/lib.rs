//! # importprep
//!
//! Turns an uploaded spreadsheet or delimited file into a CSV the downstream
//! import system accepts: pick the output columns, overwrite whole columns with
//! constants, declare each column's type in a leading row, and encode the
//! result as fully quoted UTF-8 (with or without BOM) or Shift-JIS.
//!
//! ## Key Features
//!
//! - **Column projection** - output columns in the order the operator picked them
//! - **Bulk replacement** - whole-column constant overwrites, last rule wins
//! - **Type annotation** - a first row declaring `string`, `number`, `boolean`,
//!   `object` or `array` per column, read from a Markdown registry
//! - **Tolerant registry** - a missing or unreadable registry degrades to
//!   `string` for every column instead of failing the run
//! - **Strict encoding** - characters Shift-JIS cannot hold fail the export
//!   rather than being silently replaced
//! - **Deterministic naming** - `インポート用_<name>_<YYYYMMDD_HHMMSS>_<encoding>[_<BOM>].csv`
//!
//! ## Quick Start
//!
//! ```no_run
//! use importprep::*;
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::load(None)?;
//! let pipeline = Pipeline::new(&settings);
//!
//! let bytes = std::fs::read("会員一覧.csv")?;
//! let ctx = RunContext::new(EncodingPolicy::utf8(true))
//!     .select(["content.id", "content.title", "content.status"])
//!     .replace("content.status", "納品可");
//!
//! if let RunOutcome::Exported(artifact) = pipeline.run("会員一覧.csv", &bytes, &ctx)? {
//!     artifact.write_to("out")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! A run goes through these stages, each usable on its own:
//!
//! 1. [`load_source`] - decode and parse the upload into a [`Table`]
//! 2. [`project_and_replace`] - keep the selected columns and apply [`ReplacementRule`]s
//! 3. [`annotate`] - prepend the type row from the [`ColumnSchema`], giving an [`OutputDocument`]
//! 4. [`export`] - quote, encode and name the result as an [`ExportArtifact`]
//!
//! The schema comes from a [`SchemaResolver`], which reads the registry once and
//! caches the [`SchemaResolution`] for every later run.
//!
//! ## Errors
//!
//! Fallible operations return [`PrepError`]. Registry problems are never
//! errors; inspect [`SchemaResolution::warning`] to report them. An empty
//! selection is not an error either: [`Pipeline::run`] returns
//! [`RunOutcome::NothingSelected`].
//!
//! ## Feature Flags
//!
//! - `io-csv` - delimited source loader (UTF-8 with Shift-JIS fallback)
//! - `io-xlsx` - spreadsheet source loader
//! - `cli` - the `importprep` binary
//!
//! ## Module Overview
//!
//! - [`table`] / [`value`] - in-memory data model
//! - [`schema`] - registry parsing and resolution
//! - [`annotate`] - type-row synthesis
//! - [`replace`] - projection, replacement rules and presets
//! - [`encoding`] - encoding detection and output policy
//! - [`export`] - serialization and file naming
//! - [`io`] - source loaders and input expansion
//! - [`pipeline`] - end-to-end runs
//! - [`config`] - layered settings
//! - [`testing`] - fixtures and assertions for tests

pub mod annotate;
pub mod config;
pub mod encoding;
pub mod error;
pub mod export;
pub mod io;
pub mod pipeline;
pub mod replace;
pub mod schema;
pub mod table;
pub mod testing;
pub mod value;

#[cfg(feature = "cli")]
pub mod logging;

// General re-exports
pub use annotate::{OutputDocument, annotate};
pub use config::Settings;
pub use encoding::{EncodeError, EncodingPolicy, OutputEncoding, detect_encoding};
pub use error::{PrepError, Result};
pub use export::{ExportArtifact, ExportOptions, LineEnding, export, export_at, output_filename};
pub use io::{LoadOptions, LoadedSource, SourceFormat, load_source};
pub use pipeline::{Pipeline, RunContext, RunOutcome};
pub use replace::{ColumnPreset, ReplacementRule, project_and_replace};
pub use schema::{
    ColumnSchema, DataType, RegistryFormat, SchemaResolution, SchemaResolver, parse_registry,
    resolve_schema,
};
pub use table::{Table, TableError};
pub use value::Value;
