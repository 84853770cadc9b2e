//! SQLite dialect.

use super::Dialect;
use crate::expr::Function;

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn supports_returning(&self) -> bool {
        true // SQLite 3.35.0+
    }

    fn supports_nulls_ordering(&self) -> bool {
        true // SQLite 3.30.0+
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("-1")
    }

    fn function_name(&self, func: Function) -> &'static str {
        // Multi-argument MIN/MAX are the scalar forms.
        match func {
            Function::Greatest => "MAX",
            Function::Least => "MIN",
            Function::StringAgg => "GROUP_CONCAT",
            Function::ArrayAgg => "JSON_GROUP_ARRAY",
            other => other.name(),
        }
    }

    fn supports_quantified_subqueries(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.identifier_quote(), '"');
        assert_eq!(dialect.boolean_literal(true), "1");
        assert!(dialect.supports_returning());
        assert!(!dialect.supports_ilike());
        assert_eq!(dialect.unbounded_limit(), Some("-1"));
        assert_eq!(dialect.function_name(Function::Greatest), "MAX");
        assert_eq!(dialect.function_name(Function::Avg), "AVG");
        assert!(!dialect.supports_quantified_subqueries());
    }
}
