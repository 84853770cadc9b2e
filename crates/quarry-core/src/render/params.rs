//! Positional parameter registry.

use crate::value::SqlValue;

/// Ordered parameter values collected during one compilation.
///
/// A fresh registry is created per compilation; the placeholder index of a
/// value is its 1-based position.
#[derive(Debug, Default)]
pub(crate) struct ParamRegistry {
    values: Vec<SqlValue>,
}

impl ParamRegistry {
    pub(crate) const fn new() -> Self {
        Self { values: vec![] }
    }

    /// Appends a value and returns its 1-based placeholder index.
    pub(crate) fn register(&mut self, value: SqlValue) -> usize {
        self.values.push(value);
        self.values.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}
