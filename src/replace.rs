//! Column projection and bulk constant replacement.
//!
//! [`project_and_replace`] keeps only the selected columns, in selection order,
//! then applies each [`ReplacementRule`] as a whole-column overwrite. Rules run
//! in list order, so the last rule for a column decides its value.

use crate::error::PrepError;
use crate::table::{Table, TableError};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Overwrite every cell of `column` with `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub column: String,
    pub value: String,
}

impl ReplacementRule {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Rules with an empty column or an empty value do nothing.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.column.is_empty() || self.value.is_empty()
    }
}

/// Parses `COLUMN=VALUE`; a bare `COLUMN` yields an empty value.
///
/// Only the first `=` separates, so values may contain `=`.
impl FromStr for ReplacementRule {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once('=') {
            Some((column, value)) => Self::new(column.trim(), value),
            None => Self::new(s.trim(), ""),
        })
    }
}

impl fmt::Display for ReplacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

/// Operator-facing defaults for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPreset {
    pub column: String,
    /// Value used when a rule names the column without a value.
    #[serde(default)]
    pub default_value: Option<String>,
    /// When non-empty, the only values a rule may set.
    #[serde(default)]
    pub choices: Vec<String>,
}

/// The presets the import desk has always used.
#[must_use]
pub fn default_presets() -> Vec<ColumnPreset> {
    vec![
        ColumnPreset {
            column: "content.id".to_owned(),
            default_value: Some("納品可".to_owned()),
            choices: Vec::new(),
        },
        ColumnPreset {
            column: "content.status".to_owned(),
            default_value: Some("納品可".to_owned()),
            choices: vec!["納品可".to_owned(), "チェック可".to_owned()],
        },
    ]
}

/// Fill empty rule values from preset defaults and check preset choice lists.
///
/// # Errors
/// Returns [`PrepError::InvalidRule`] when a rule sets a value outside its
/// column's `choices`.
pub fn apply_presets(
    rules: Vec<ReplacementRule>,
    presets: &[ColumnPreset],
) -> Result<Vec<ReplacementRule>, PrepError> {
    rules
        .into_iter()
        .map(|mut rule| {
            let Some(preset) = presets.iter().find(|p| p.column == rule.column) else {
                return Ok(rule);
            };
            if rule.value.is_empty()
                && let Some(default) = &preset.default_value
            {
                rule.value.clone_from(default);
            }
            if !rule.value.is_empty()
                && !preset.choices.is_empty()
                && !preset.choices.contains(&rule.value)
            {
                return Err(PrepError::InvalidRule {
                    column: rule.column,
                    reason: format!(
                        "{:?} is not one of {}",
                        rule.value,
                        preset.choices.join(", ")
                    ),
                });
            }
            Ok(rule)
        })
        .collect()
}

/// Project `table` onto `selection` and apply `rules`.
///
/// Returns `Ok(None)` when `selection` is empty: nothing is produced until at
/// least one column is selected. Inert rules and rules for columns outside the
/// selection are ignored.
///
/// # Errors
/// Returns [`TableError`] if `selection` names an unknown column or repeats one.
pub fn project_and_replace<S: AsRef<str>>(
    table: &Table,
    selection: &[S],
    rules: &[ReplacementRule],
) -> Result<Option<Table>, TableError> {
    if selection.is_empty() {
        debug!("no output columns selected");
        return Ok(None);
    }
    let mut out = table.project(selection)?;
    for rule in rules {
        if rule.is_inert() {
            debug!(%rule, "inert rule ignored");
            continue;
        }
        if !out.fill_column(&rule.column, &Value::text(&rule.value)) {
            debug!(%rule, "rule targets an unselected column; ignored");
        }
    }
    Ok(Some(out))
}
