//! Scalar cell values.
//!
//! Every cell of a [`Table`](crate::Table) holds one [`Value`]. The set of
//! variants is closed so that replacement and serialization are total over the
//! data they see.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integral numbers below this magnitude render without a fractional part.
const INTEGRAL_RENDER_LIMIT: f64 = 1e15;

/// Largest integer magnitude a [`Value::Number`] holds exactly. Loaders keep
/// larger integers as text.
pub const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Free text.
    Text(String),
    /// Any numeric cell; integers are stored as `f64` as spreadsheets do.
    Number(f64),
    /// A boolean cell.
    Boolean(bool),
    /// An empty cell.
    #[default]
    Null,
}

impl Value {
    /// Shorthand for [`Value::Text`].
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a [`Value::Text`] cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell the way it is written into a delimited file.
    ///
    /// `Null` renders as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < INTEGRAL_RENDER_LIMIT {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Boolean(true) => f.write_str("True"),
            Self::Boolean(false) => f.write_str("False"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
