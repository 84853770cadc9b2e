//! Engine-neutral dialect.

use super::Dialect;

/// ANSI-style SQL with `?` placeholders, double-quoted identifiers and
/// `TRUE`/`FALSE`. It claims none of the optional capabilities, so ILIKE
/// is always emulated and RETURNING logs a warning.
///
/// Suited to logging and snapshot tests where no particular engine is
/// targeted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenericDialect;

impl GenericDialect {
    /// Returns the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PlaceholderStyle;

    #[test]
    fn test_defaults_only() {
        let generic = GenericDialect::new();
        assert_eq!(generic.placeholder_style(), PlaceholderStyle::QuestionMark);
        assert_eq!(generic.placeholder(7), "?");
        assert_eq!(generic.quote_identifier("say \"hi\""), r#""say ""hi""""#);
        assert_eq!(
            (generic.boolean_literal(true), generic.boolean_literal(false)),
            ("TRUE", "FALSE")
        );
        assert!(!generic.supports_returning() && !generic.supports_ilike());
        assert!(generic.supports_nulls_ordering());
        assert_eq!(generic.unbounded_limit(), None);
    }
}
