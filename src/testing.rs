//! Testing utilities for import-preparation runs.
//!
//! This module ships with the library so that callers embedding the pipeline
//! can test their own selections and rules the same way the crate does:
//!
//! - **Fixtures**: small source tables and registry documents
//! - **Assertions**: compare column lists and cell values with readable panics
//! - **Mock I/O**: temporary registry files in UTF-8 or Shift_JIS
//!
//! # Quick Start
//!
//! ```
//! use importprep::testing::*;
//! use importprep::{project_and_replace, ReplacementRule, Value};
//!
//! let table = abc_table();
//! let rules = [ReplacementRule::new("C", "done")];
//! let out = project_and_replace(&table, &["A", "C"], &rules).unwrap().unwrap();
//!
//! assert_columns(&out, &["A", "C"]);
//! assert_column_all(&out, "C", &Value::text("done"));
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
