//! MySQL dialect.

use super::Dialect;
use crate::expr::Function;

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        // Largest BIGINT UNSIGNED, as recommended by the MySQL manual.
        Some("18446744073709551615")
    }

    fn function_name(&self, func: Function) -> &'static str {
        match func {
            Function::StringAgg => "GROUP_CONCAT",
            Function::ArrayAgg => "JSON_ARRAYAGG",
            other => other.name(),
        }
    }

    fn string_agg_separator_clause(&self) -> bool {
        true
    }
}
