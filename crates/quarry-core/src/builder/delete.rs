//! DELETE statement builder using the typestate pattern.
//!
//! A DELETE compiles only after it was either filtered with
//! `where_clause()` or explicitly confirmed with `all_rows()`.

use std::marker::PhantomData;

use super::{check_bound, returning_columns};
use crate::error::Result;
use crate::expr::Expr;
use crate::schema::{Column, Table};

// Typestate markers

/// Marker: neither filtered nor confirmed.
#[derive(Debug, Clone, Copy)]
pub struct NoFilter;
/// Marker: a WHERE clause is present.
#[derive(Debug, Clone, Copy)]
pub struct Filtered;
/// Marker: deleting every row was confirmed.
#[derive(Debug, Clone, Copy)]
pub struct AllRows;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::NoFilter {}
    impl Sealed for super::Filtered {}
    impl Sealed for super::AllRows {}
}

/// States in which a DELETE may be compiled.
pub trait Confirmed: sealed::Sealed {}

impl Confirmed for Filtered {}
impl Confirmed for AllRows {}

/// States that accept a WHERE clause.
pub trait Filterable: sealed::Sealed {}

impl Filterable for NoFilter {}
impl Filterable for Filtered {}

/// A DELETE statement.
#[derive(Debug, Clone)]
pub struct Delete<State> {
    pub(crate) table: Table,
    pub(crate) where_clause: Option<Expr>,
    pub(crate) returning: Vec<Column>,
    _state: PhantomData<State>,
}

impl Delete<NoFilter> {
    /// Starts a DELETE from `table`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(table: &Table) -> Self {
        Self {
            table: table.clone(),
            where_clause: None,
            returning: vec![],
            _state: PhantomData,
        }
    }

    /// Confirms that every row of the table is deleted.
    #[must_use]
    pub fn all_rows(self) -> Delete<AllRows> {
        Delete {
            table: self.table,
            where_clause: None,
            returning: self.returning,
            _state: PhantomData,
        }
    }
}

// Transition: NoFilter -> Filtered
impl<State: Filterable> Delete<State> {
    /// Adds a WHERE predicate. A second call ANDs onto the first.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeMismatch`](crate::BuildError::TypeMismatch)
    /// for non-boolean expressions and
    /// [`BuildError::UnboundColumn`](crate::BuildError::UnboundColumn) for
    /// columns of other tables.
    pub fn where_clause(self, expr: Expr) -> Result<Delete<Filtered>> {
        expr.expect_predicate("WHERE")?;
        check_bound(&expr, &[self.table.ident()])?;
        let where_clause = match self.where_clause {
            Some(existing) => existing.and(expr)?,
            None => expr,
        };
        Ok(Delete {
            table: self.table,
            where_clause: Some(where_clause),
            returning: self.returning,
            _state: PhantomData,
        })
    }
}

impl<State: Confirmed> Delete<State> {
    /// Adds a RETURNING clause.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnboundColumn`](crate::BuildError::UnboundColumn)
    /// for columns of another table.
    pub fn returning<'a, I>(mut self, cols: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Column>,
    {
        self.returning = returning_columns(&self.table, cols)?;
        Ok(self)
    }
}
