//! Cell values and per-column type inference.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single cell of a table.
///
/// `Missing` is the explicit missing-value sentinel. It is distinct from an
/// empty string and from zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    #[default]
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The integer equal to `value`, when it is integral and in `i64` range.
    /// Numeric cells compare by value, so `Integer(2) == Float(2.0)`.
    fn integral(value: f64) -> Option<i64> {
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        (value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value)).then_some(value as i64)
    }

    /// Canonical bit pattern used for float equality: `-0.0 == 0.0`, and all
    /// NaNs compare equal to each other.
    fn float_key(value: f64) -> u64 {
        if value == 0.0 {
            0.0f64.to_bits()
        } else if value.is_nan() {
            f64::NAN.to_bits()
        } else {
            value.to_bits()
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::float_key(*a) == Self::float_key(*b),
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                Self::integral(*f) == Some(*i)
            }
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Missing, Self::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // integral floats hash like the equal integer
        if let Self::Float(value) = self
            && let Some(integer) = Self::integral(*value)
        {
            std::mem::discriminant(&Self::Integer(0)).hash(state);
            integer.hash(state);
            return;
        }
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Text(value) => value.hash(state),
            Self::Integer(value) => value.hash(state),
            Self::Float(value) => Self::float_key(*value).hash(state),
            Self::Bool(value) => value.hash(state),
            Self::DateTime(value) => value.hash(state),
            Self::Missing => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            // Integral floats print without decimals
            Self::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::DateTime(value) if value.num_seconds_from_midnight() == 0 => {
                write!(f, "{}", value.format("%Y-%m-%d"))
            }
            Self::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// The dominant type of a column, inferred from its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    DateTime,
    Text,
    Mixed,
    /// Every cell is missing (or the column has no rows).
    Empty,
}

impl ColumnType {
    /// Infers the column type. Integers and floats together widen to `Float`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut current: Option<Self> = None;
        for value in values {
            let kind = match value {
                CellValue::Missing => continue,
                CellValue::Text(_) => Self::Text,
                CellValue::Integer(_) => Self::Integer,
                CellValue::Float(_) => Self::Float,
                CellValue::Bool(_) => Self::Boolean,
                CellValue::DateTime(_) => Self::DateTime,
            };
            current = Some(match current {
                None => kind,
                Some(seen) if seen == kind => seen,
                Some(Self::Integer | Self::Float)
                    if matches!(kind, Self::Integer | Self::Float) =>
                {
                    Self::Float
                }
                Some(_) => return Self::Mixed,
            });
        }
        current.unwrap_or(Self::Empty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Text => "text",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
