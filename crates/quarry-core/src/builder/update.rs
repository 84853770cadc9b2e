//! UPDATE statement builder using the typestate pattern.

use std::marker::PhantomData;

use super::{check_assignable, check_bound, check_column, returning_columns};
use crate::error::{BuildError, Result};
use crate::expr::{resolve, Expr, IntoOperand, Operand};
use crate::schema::{Column, Table};

// Typestate markers

/// Marker: No SET clause specified yet.
#[derive(Debug, Clone, Copy)]
pub struct NoSet;
/// Marker: SET clause has been specified.
#[derive(Debug, Clone, Copy)]
pub struct HasSet;

/// An UPDATE statement.
///
/// `compile` is only available after at least one `set()`. Assigned values
/// may reference columns of the target table (`SET n = n + 1`).
#[derive(Debug, Clone)]
pub struct Update<Set> {
    pub(crate) table: Table,
    pub(crate) assignments: Vec<(Column, Expr)>,
    pub(crate) where_clause: Option<Expr>,
    pub(crate) returning: Vec<Column>,
    _state: PhantomData<Set>,
}

impl Update<NoSet> {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: vec![],
            where_clause: None,
            returning: vec![],
            _state: PhantomData,
        }
    }

    /// Builds an UPDATE from a list of assignments.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyAssignment`] when `assignments` is empty,
    /// otherwise see [`Update::set`].
    pub fn with_assignments<I, V>(table: &Table, assignments: I) -> Result<Update<HasSet>>
    where
        I: IntoIterator<Item = (Column, V)>,
        V: IntoOperand,
    {
        let mut assignments = assignments.into_iter();
        let Some((column, value)) = assignments.next() else {
            return Err(BuildError::EmptyAssignment {
                table: String::from(table.name()),
            });
        };
        let update = Self::table(table).set(&column, value)?;
        assignments.try_fold(update, |update, (column, value)| update.set(&column, value))
    }
}

// Transition: NoSet -> HasSet
impl<Set> Update<Set> {
    /// Assigns a value or expression to a column. Assigning the same column
    /// again keeps its position and replaces the value.
    ///
    /// # Errors
    ///
    /// - [`BuildError::UnboundColumn`] for columns of another table.
    /// - [`BuildError::NotNullable`] when NULL is assigned to a NOT NULL
    ///   column.
    /// - [`BuildError::TypeMismatch`] or [`BuildError::ValueOutOfRange`] for
    ///   values that do not fit the column.
    pub fn set(self, column: &Column, value: impl IntoOperand) -> Result<Update<HasSet>> {
        let sources = [self.table.ident()];
        check_column(column, &sources)?;

        let operand: Operand = value.into_operand();
        if operand.is_null() && !column.is_nullable() {
            return Err(BuildError::NotNullable {
                column: column.describe(),
            });
        }
        let value = resolve(&Expr::from(column), operand)?;
        check_bound(&value, &sources)?;
        check_assignable(column, &value, "SET")?;

        let mut assignments = self.assignments;
        match assignments.iter_mut().find(|(c, _)| c.same_as(column)) {
            Some(slot) => slot.1 = value,
            None => assignments.push((column.clone(), value)),
        }

        Ok(Update {
            table: self.table,
            assignments,
            where_clause: self.where_clause,
            returning: self.returning,
            _state: PhantomData,
        })
    }

    /// Adds a WHERE predicate. A second call ANDs onto the first.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeMismatch`] for non-boolean expressions and
    /// [`BuildError::UnboundColumn`] for columns of other tables.
    pub fn where_clause(mut self, expr: Expr) -> Result<Self> {
        expr.expect_predicate("WHERE")?;
        check_bound(&expr, &[self.table.ident()])?;
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(expr)?,
            None => expr,
        });
        Ok(self)
    }

    /// Adds a RETURNING clause.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnboundColumn`] for columns of another table.
    pub fn returning<'a, I>(mut self, cols: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Column>,
    {
        self.returning = returning_columns(&self.table, cols)?;
        Ok(self)
    }
}
