//! INSERT statement builder using the typestate pattern.

use std::marker::PhantomData;

use super::{check_assignable, check_bound, check_column, returning_columns};
use crate::error::{BuildError, Result};
use crate::expr::{resolve, Expr, IntoOperand, Operand};
use crate::schema::{Column, Table};

// Typestate markers

/// Marker: No rows added yet.
#[derive(Debug, Clone, Copy)]
pub struct NoValues;
/// Marker: At least one row has been added.
#[derive(Debug, Clone, Copy)]
pub struct HasValues;

/// One row of an INSERT: column to value assignments in the order given.
#[derive(Debug, Clone, Default)]
pub struct InsertRow {
    values: Vec<(Column, Operand)>,
}

impl InsertRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a value or expression to a column.
    #[must_use]
    pub fn set(mut self, column: &Column, value: impl IntoOperand) -> Self {
        self.values.push((column.clone(), value.into_operand()));
        self
    }

    /// Fills every column of `table` that declares a default and is not
    /// assigned yet.
    #[must_use]
    pub fn with_defaults(mut self, table: &Table) -> Self {
        for column in table.columns() {
            let Some(default) = column.default_value() else {
                continue;
            };
            if self.values.iter().any(|(c, _)| c.same_as(column)) {
                continue;
            }
            self.values
                .push((column.clone(), Operand::Value(default.clone())));
        }
        self
    }

    fn names(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(c, _)| String::from(c.name()))
            .collect()
    }
}

/// An INSERT statement.
///
/// `compile` is only available once at least one row was added.
#[derive(Debug, Clone)]
pub struct Insert<Values> {
    pub(crate) table: Table,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Vec<Expr>>,
    pub(crate) returning: Vec<Column>,
    _state: PhantomData<Values>,
}

impl Insert<NoValues> {
    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn into_table(table: &Table) -> Self {
        Self {
            table: table.clone(),
            columns: vec![],
            rows: vec![],
            returning: vec![],
            _state: PhantomData,
        }
    }

    /// Builds a multi-row INSERT in one step.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyInsert`] when `rows` is empty, otherwise
    /// see [`Insert::values`].
    pub fn from_rows<I>(table: &Table, rows: I) -> Result<Insert<HasValues>>
    where
        I: IntoIterator<Item = InsertRow>,
    {
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else {
            return Err(BuildError::EmptyInsert {
                table: String::from(table.name()),
            });
        };
        rows.try_fold(
            Self::into_table(table).values(first)?,
            Insert::<HasValues>::values,
        )
    }
}

impl<Values> Insert<Values> {
    /// Encodes one row against the column types.
    fn encode_row(&self, row: &InsertRow) -> Result<Vec<(Column, Expr)>> {
        if row.values.is_empty() {
            return Err(BuildError::EmptyAssignment {
                table: String::from(self.table.name()),
            });
        }

        let sources = [self.table.ident()];
        let mut encoded: Vec<(Column, Expr)> = Vec::with_capacity(row.values.len());
        for (column, operand) in &row.values {
            check_column(column, &sources)?;
            if encoded.iter().any(|(c, _)| c.same_as(column)) {
                return Err(BuildError::DuplicateColumn {
                    column: String::from(column.name()),
                });
            }
            if operand.is_null() && !column.is_nullable() {
                return Err(BuildError::NotNullable {
                    column: column.describe(),
                });
            }
            let value = resolve(&Expr::from(column), operand.clone())?;
            // VALUES has no row in scope for column references.
            check_bound(&value, &[])?;
            check_assignable(column, &value, "VALUES for")?;
            encoded.push((column.clone(), value));
        }
        Ok(encoded)
    }

    /// Adds a row. The first row fixes the column list; later rows must
    /// assign the same set of columns, in any order.
    ///
    /// # Errors
    ///
    /// - [`BuildError::EmptyAssignment`] for a row without values.
    /// - [`BuildError::DuplicateColumn`] when a row assigns a column twice.
    /// - [`BuildError::ColumnSetMismatch`] when the column set differs from
    ///   the first row.
    /// - [`BuildError::UnboundColumn`] for columns of another table.
    /// - [`BuildError::NotNullable`], [`BuildError::TypeMismatch`] or
    ///   [`BuildError::ValueOutOfRange`] for values that do not fit.
    pub fn values(self, row: InsertRow) -> Result<Insert<HasValues>> {
        let encoded = self.encode_row(&row)?;
        let Self {
            table,
            mut columns,
            mut rows,
            returning,
            ..
        } = self;

        if columns.is_empty() {
            columns = encoded.iter().map(|(c, _)| c.clone()).collect();
            rows.push(encoded.into_iter().map(|(_, v)| v).collect());
        } else {
            let mismatch = || BuildError::ColumnSetMismatch {
                expected: columns.iter().map(|c| String::from(c.name())).collect(),
                found: row.names(),
            };
            if encoded.len() != columns.len() {
                return Err(mismatch());
            }
            let mut ordered = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = encoded
                    .iter()
                    .find(|(c, _)| c.same_as(column))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(mismatch)?;
                ordered.push(value);
            }
            rows.push(ordered);
        }

        Ok(Insert {
            table,
            columns,
            rows,
            returning,
            _state: PhantomData,
        })
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

impl Insert<HasValues> {
    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, PostgresDialect};
    use crate::schema::{ColumnDef, SqlType};
    use crate::value::SqlValue;
    use crate::Compile;

    fn pairs() -> Table {
        Table::builder("pairs")
            .column(ColumnDef::new("a", SqlType::Integer))
            .column(ColumnDef::new("b", SqlType::Integer))
            .column(ColumnDef::new("note", SqlType::Text).nullable())
            .column(ColumnDef::new("weight", SqlType::Double).default(1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_multi_row_insert() {
        let t = pairs();
        let (a, b) = (t.col("a").unwrap(), t.col("b").unwrap());
        let insert = Insert::from_rows(
            &t,
            [
                InsertRow::new().set(&a, 1).set(&b, 2),
                // Later rows may list columns in another order.
                InsertRow::new().set(&b, 4).set(&a, 3),
            ],
        )
        .unwrap();
        assert_eq!(insert.row_count(), 2);
        let (sql, params) = insert.compile(&GenericDialect::new());
        assert_eq!(
            sql,
            r#"INSERT INTO "pairs" ("a", "b") VALUES (?, ?), (?, ?)"#
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
    }

    #[test]
    fn test_column_set_mismatch() {
        let t = pairs();
        let (a, b) = (t.col("a").unwrap(), t.col("b").unwrap());
        let err = Insert::into_table(&t)
            .values(InsertRow::new().set(&a, 1).set(&b, 2))
            .unwrap()
            .values(InsertRow::new().set(&a, 3))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::ColumnSetMismatch {
                expected: vec![String::from("a"), String::from("b")],
                found: vec![String::from("a")],
            }
        );
    }

    #[test]
    fn test_duplicate_column_in_row() {
        let t = pairs();
        let a = t.col("a").unwrap();
        let err = Insert::into_table(&t)
            .values(InsertRow::new().set(&a, 1).set(&a, 2))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_row_level_errors() {
        let t = pairs();
        let a = t.col("a").unwrap();
        assert!(matches!(
            Insert::into_table(&t).values(InsertRow::new()).unwrap_err(),
            BuildError::EmptyAssignment { .. }
        ));
        assert!(matches!(
            Insert::into_table(&t)
                .values(InsertRow::new().set(&a, None::<i32>))
                .unwrap_err(),
            BuildError::NotNullable { .. }
        ));
        assert!(matches!(
            Insert::from_rows(&t, Vec::new()).unwrap_err(),
            BuildError::EmptyInsert { .. }
        ));
        // A column reference has no row to read from inside VALUES.
        assert!(matches!(
            Insert::into_table(&t)
                .values(InsertRow::new().set(&a, t.col("b").unwrap()))
                .unwrap_err(),
            BuildError::UnboundColumn { .. }
        ));
    }

    #[test]
    fn test_defaults_and_returning() {
        let t = pairs();
        let row = InsertRow::new()
            .set(&t.col("a").unwrap(), 1)
            .set(&t.col("b").unwrap(), 2)
            .set(&t.col("note").unwrap(), None::<String>)
            .with_defaults(&t);
        let insert = Insert::into_table(&t)
            .values(row)
            .unwrap()
            .returning([&t.col("a").unwrap()])
            .unwrap();
        let (sql, params) = insert.compile(&PostgresDialect::new());
        assert_eq!(
            sql,
            r#"INSERT INTO "pairs" ("a", "b", "note", "weight") VALUES ($1, $2, $3, $4) RETURNING "a""#
        );
        assert_eq!(params[2], SqlValue::Null);
        assert_eq!(params[3], SqlValue::Float(1.0));
    }
}
