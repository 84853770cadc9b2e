//! Column types and the value codec attached to them.

use core::fmt;

use crate::error::{BuildError, Result};
use crate::value::SqlValue;

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    // Integer types
    /// Small integer (2 bytes).
    SmallInt,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    BigInt,

    // Floating point and exact numerics
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Exact numeric.
    Numeric,

    /// Boolean.
    Boolean,

    // String types
    /// Fixed-length character string.
    Char(u32),
    /// Variable-length character string with an optional limit.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    /// Binary large object.
    Blob,

    // Date/time types
    /// Date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp.
    Timestamp,

    /// JSON document, bound as serialized text.
    Json,
}

/// Coarse classification used for operator checks and operand
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Integers, floats and exact numerics.
    Numeric,
    /// Character strings.
    Text,
    /// Booleans and predicates.
    Boolean,
    /// Byte strings.
    Binary,
    /// Dates, times and timestamps.
    Temporal,
    /// JSON documents.
    Json,
}

impl TypeClass {
    /// Returns a human-readable name for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Binary => "binary",
            Self::Temporal => "temporal",
            Self::Json => "json",
        }
    }

    /// Classifies a raw value. NULL has no class.
    #[must_use]
    pub const fn of_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(Self::Boolean),
            SqlValue::Int(_) | SqlValue::Float(_) => Some(Self::Numeric),
            SqlValue::Text(_) => Some(Self::Text),
            SqlValue::Blob(_) => Some(Self::Binary),
            SqlValue::Timestamp(_) => Some(Self::Temporal),
        }
    }
}

impl SqlType {
    /// Returns the class of this type.
    #[must_use]
    pub const fn class(self) -> TypeClass {
        match self {
            Self::SmallInt
            | Self::Integer
            | Self::BigInt
            | Self::Real
            | Self::Double
            | Self::Numeric => TypeClass::Numeric,
            Self::Boolean => TypeClass::Boolean,
            Self::Char(_) | Self::Varchar(_) | Self::Text => TypeClass::Text,
            Self::Blob => TypeClass::Binary,
            Self::Date | Self::Time | Self::Timestamp => TypeClass::Temporal,
            Self::Json => TypeClass::Json,
        }
    }

    /// Encodes a raw value for a column of this type.
    ///
    /// Integers widen to floats for floating point columns; everything else
    /// must already have the matching kind. NULL passes through, nullability
    /// is checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeMismatch`] when the value kind does not fit
    /// the type and [`BuildError::ValueOutOfRange`] when it fits but exceeds
    /// the declared range or length.
    pub fn encode(self, column: &str, value: SqlValue) -> Result<SqlValue> {
        match (self, value) {
            (_, SqlValue::Null) => Ok(SqlValue::Null),
            (Self::SmallInt, SqlValue::Int(n)) => {
                check_int_range(column, n, i64::from(i16::MIN), i64::from(i16::MAX))
            }
            (Self::Integer, SqlValue::Int(n)) => {
                check_int_range(column, n, i64::from(i32::MIN), i64::from(i32::MAX))
            }
            (Self::BigInt | Self::Numeric, v @ SqlValue::Int(_))
            | (Self::Real | Self::Double | Self::Numeric, v @ SqlValue::Float(_))
            | (Self::Boolean, v @ SqlValue::Bool(_))
            | (Self::Text | Self::Json | Self::Varchar(None), v @ SqlValue::Text(_))
            | (Self::Blob, v @ SqlValue::Blob(_))
            | (Self::Date | Self::Time | Self::Timestamp, v @ SqlValue::Timestamp(_)) => Ok(v),
            #[allow(clippy::cast_precision_loss)]
            (Self::Real | Self::Double, SqlValue::Int(n)) => Ok(SqlValue::Float(n as f64)),
            (Self::Char(limit) | Self::Varchar(Some(limit)), SqlValue::Text(s)) => {
                let len = s.chars().count();
                if len > limit as usize {
                    return Err(BuildError::ValueOutOfRange {
                        column: String::from(column),
                        reason: format!("{len} characters exceed the limit of {limit}"),
                    });
                }
                Ok(SqlValue::Text(s))
            }
            (ty, other) => Err(BuildError::TypeMismatch {
                context: format!("column {column}"),
                expected: ty.to_string(),
                found: String::from(other.kind()),
            }),
        }
    }
}

fn check_int_range(column: &str, n: i64, min: i64, max: i64) -> Result<SqlValue> {
    if n < min || n > max {
        return Err(BuildError::ValueOutOfRange {
            column: String::from(column),
            reason: format!("{n} is outside [{min}, {max}]"),
        });
    }
    Ok(SqlValue::Int(n))
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Real => write!(f, "REAL"),
            Self::Double => write!(f, "DOUBLE PRECISION"),
            Self::Numeric => write!(f, "NUMERIC"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Char(n) => write!(f, "CHAR({n})"),
            Self::Varchar(Some(n)) => write!(f, "VARCHAR({n})"),
            Self::Varchar(None) => write!(f, "VARCHAR"),
            Self::Text => write!(f, "TEXT"),
            Self::Blob => write!(f, "BLOB"),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ranges() {
        assert_eq!(
            SqlType::SmallInt.encode("t.c", SqlValue::Int(300)),
            Ok(SqlValue::Int(300))
        );
        assert!(matches!(
            SqlType::SmallInt.encode("t.c", SqlValue::Int(40_000)),
            Err(BuildError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            SqlType::Integer.encode("t.c", SqlValue::Int(i64::MAX)),
            Err(BuildError::ValueOutOfRange { .. })
        ));
        assert_eq!(
            SqlType::BigInt.encode("t.c", SqlValue::Int(i64::MAX)),
            Ok(SqlValue::Int(i64::MAX))
        );
    }

    #[test]
    fn test_floats_accept_integers() {
        assert_eq!(
            SqlType::Double.encode("t.c", SqlValue::Int(3)),
            Ok(SqlValue::Float(3.0))
        );
        assert!(matches!(
            SqlType::Integer.encode("t.c", SqlValue::Float(1.5)),
            Err(BuildError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_varchar_limit() {
        let ok = SqlType::Varchar(Some(5)).encode("t.c", SqlValue::Text(String::from("héllo")));
        assert_eq!(ok, Ok(SqlValue::Text(String::from("héllo"))));
        let too_long = SqlType::Char(2).encode("t.c", SqlValue::Text(String::from("abc")));
        assert!(matches!(too_long, Err(BuildError::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_mismatch_reports_kinds() {
        let err = SqlType::Boolean
            .encode("users.active", SqlValue::Text(String::from("yes")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch for column users.active: expected BOOLEAN, found TEXT"
        );
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(SqlType::Json.encode("t.c", SqlValue::Null), Ok(SqlValue::Null));
    }

    #[test]
    fn test_classes() {
        assert_eq!(SqlType::Varchar(None).class(), TypeClass::Text);
        assert_eq!(SqlType::Date.class(), TypeClass::Temporal);
        assert_eq!(TypeClass::of_value(&SqlValue::Float(1.0)), Some(TypeClass::Numeric));
        assert_eq!(TypeClass::of_value(&SqlValue::Null), None);
    }
}
