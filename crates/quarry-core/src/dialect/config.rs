//! Dialect selection from configuration.
//!
//! ```rust
//! use quarry_core::dialect::DialectConfig;
//!
//! let config = DialectConfig::from_json(
//!     r#"{ "dialect": "sqlite", "placeholder": "numbered" }"#,
//! )
//! .unwrap();
//! let dialect = config.into_dialect().unwrap();
//! assert_eq!(dialect.name(), "sqlite");
//! assert_eq!(dialect.placeholder(2), "$2");
//! ```

use serde::Deserialize;
use tracing::debug;

use super::{
    Dialect, GenericDialect, MySqlDialect, PlaceholderStyle, PostgresDialect, SqliteDialect,
};
use crate::error::ConfigError;
use crate::expr::Function;

/// Built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    /// [`GenericDialect`]
    Generic,
    /// [`PostgresDialect`]
    Postgres,
    /// [`SqliteDialect`]
    Sqlite,
    /// [`MySqlDialect`]
    Mysql,
}

impl DialectKind {
    /// Returns the built-in dialect.
    #[must_use]
    pub fn dialect(self) -> Box<dyn Dialect + Send + Sync> {
        match self {
            Self::Generic => Box::new(GenericDialect::new()),
            Self::Postgres => Box::new(PostgresDialect::new()),
            Self::Sqlite => Box::new(SqliteDialect::new()),
            Self::Mysql => Box::new(MySqlDialect::new()),
        }
    }
}

/// Dialect configuration: a built-in dialect plus optional overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    /// Base dialect.
    pub dialect: DialectKind,
    /// Overrides the placeholder style.
    #[serde(default)]
    pub placeholder: Option<PlaceholderStyle>,
    /// Overrides the identifier quote character.
    #[serde(default)]
    pub identifier_quote: Option<char>,
}

impl DialectConfig {
    /// Configuration for a built-in dialect without overrides.
    #[must_use]
    pub const fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            placeholder: None,
            identifier_quote: None,
        }
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents, unknown
    /// dialect names or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the configured dialect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidQuote`] when the quote override is not
    /// an ASCII punctuation character.
    pub fn into_dialect(self) -> Result<Box<dyn Dialect + Send + Sync>, ConfigError> {
        if let Some(quote) = self.identifier_quote {
            if !quote.is_ascii_punctuation() {
                return Err(ConfigError::InvalidQuote(quote));
            }
        }

        let base = self.dialect.dialect();
        debug!(
            dialect = base.name(),
            placeholder = ?self.placeholder,
            identifier_quote = ?self.identifier_quote,
            "dialect configured"
        );

        if self.placeholder.is_none() && self.identifier_quote.is_none() {
            return Ok(base);
        }
        Ok(Box::new(ConfiguredDialect {
            base,
            placeholder: self.placeholder,
            identifier_quote: self.identifier_quote,
        }))
    }
}

/// A built-in dialect with overridden placeholder or quote.
struct ConfiguredDialect {
    base: Box<dyn Dialect + Send + Sync>,
    placeholder: Option<PlaceholderStyle>,
    identifier_quote: Option<char>,
}

impl Dialect for ConfiguredDialect {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn identifier_quote(&self) -> char {
        self.identifier_quote
            .unwrap_or_else(|| self.base.identifier_quote())
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder
            .unwrap_or_else(|| self.base.placeholder_style())
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        self.base.boolean_literal(value)
    }

    fn supports_returning(&self) -> bool {
        self.base.supports_returning()
    }

    fn supports_ilike(&self) -> bool {
        self.base.supports_ilike()
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.base.supports_nulls_ordering()
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        self.base.unbounded_limit()
    }

    fn function_name(&self, func: Function) -> &'static str {
        self.base.function_name(func)
    }

    fn string_agg_separator_clause(&self) -> bool {
        self.base.string_agg_separator_clause()
    }

    fn supports_quantified_subqueries(&self) -> bool {
        self.base.supports_quantified_subqueries()
    }
}
