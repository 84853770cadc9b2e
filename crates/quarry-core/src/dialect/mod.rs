//! SQL dialect support.
//!
//! Engines differ in placeholder syntax, identifier quoting, boolean
//! spelling and a handful of optional features. The renderer asks the
//! [`Dialect`] for each of these and emulates missing features where it
//! can.

mod config;
mod generic;
mod mysql;
mod postgres;
mod sqlite;

pub use config::{DialectConfig, DialectKind};
pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use serde::Deserialize;

use crate::expr::Function;

/// How positional parameters are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` for every parameter.
    QuestionMark,
    /// `$1`, `$2`, ... numbered from one.
    Numbered,
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder style.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }

    /// Renders the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String {
        match self.placeholder_style() {
            PlaceholderStyle::QuestionMark => String::from("?"),
            PlaceholderStyle::Numbered => format!("${index}"),
        }
    }

    /// Returns the spelling of a boolean constant, used for statically
    /// decided predicates such as an empty IN list.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Returns whether the dialect supports RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Returns whether the dialect has a native `ILIKE` operator.
    fn supports_ilike(&self) -> bool {
        false
    }

    /// Returns whether `NULLS FIRST`/`NULLS LAST` are understood.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// The LIMIT value meaning "no limit", for engines that cannot express
    /// OFFSET without LIMIT. `None` when a bare OFFSET is valid.
    fn unbounded_limit(&self) -> Option<&'static str> {
        None
    }

    /// Returns the name `func` is spelled with.
    fn function_name(&self, func: Function) -> &'static str {
        func.name()
    }

    /// Whether string aggregation takes its separator as a trailing
    /// `SEPARATOR '...'` clause instead of a second argument.
    fn string_agg_separator_clause(&self) -> bool {
        false
    }

    /// Returns whether `= ANY`/`> ALL` style subquery comparisons are
    /// understood.
    fn supports_quantified_subqueries(&self) -> bool {
        true
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }
}
