//! Statement builders.
//!
//! Builders consume `self` and return the next state, so a half-built
//! statement can be cloned and extended in different directions. INSERT,
//! UPDATE and DELETE use the typestate pattern to keep incomplete
//! statements from compiling.
//!
//! # Example
//!
//! ```rust
//! use quarry_core::builder::{Delete, Update};
//! use quarry_core::dialect::SqliteDialect;
//! use quarry_core::schema::{ColumnDef, SqlType, Table};
//! use quarry_core::Compile;
//!
//! let jobs = Table::builder("jobs")
//!     .column(ColumnDef::new("id", SqlType::BigInt))
//!     .column(ColumnDef::new("done", SqlType::Boolean))
//!     .build()
//!     .unwrap();
//! let id = jobs.col("id").unwrap();
//! let done = jobs.col("done").unwrap();
//!
//! let (sql, params) = Update::table(&jobs)
//!     .set(&done, true)
//!     .unwrap()
//!     .where_clause(id.eq(3).unwrap())
//!     .unwrap()
//!     .compile(&SqliteDialect::new());
//! assert_eq!(sql, r#"UPDATE "jobs" SET "done" = ? WHERE "id" = ?"#);
//! assert_eq!(params.len(), 2);
//!
//! // Deleting without a filter needs an explicit confirmation.
//! let (sql, _) = Delete::from(&jobs).all_rows().compile(&SqliteDialect::new());
//! assert_eq!(sql, r#"DELETE FROM "jobs""#);
//! ```

mod compound;
mod delete;
mod insert;
mod select;
mod statement;
mod update;

pub use compound::{CompoundSelect, SetOperator};
pub use delete::{AllRows, Confirmed, Delete, Filterable, Filtered, NoFilter};
pub use insert::{HasValues, Insert, InsertRow, NoValues};
pub use select::Select;
pub use statement::{Compile, CompiledQuery, Statement};
pub use update::{HasSet, NoSet, Update};

use crate::error::{BuildError, Result};
use crate::expr::Expr;
use crate::schema::{Column, Table, TableIdent};

fn unbound(column: &Column) -> BuildError {
    BuildError::UnboundColumn {
        column: String::from(column.name()),
        table: String::from(column.qualifier()),
    }
}

/// Checks that a column belongs to one of `sources`.
pub(crate) fn check_column(column: &Column, sources: &[&TableIdent]) -> Result<()> {
    if sources.contains(&column.ident()) {
        Ok(())
    } else {
        Err(unbound(column))
    }
}

/// Checks that every column referenced by `expr` belongs to one of
/// `sources`. Nested subqueries contribute their references to correlated
/// tables, which the enclosing statement has to provide.
pub(crate) fn check_bound(expr: &Expr, sources: &[&TableIdent]) -> Result<()> {
    let mut first_unbound = None;
    expr.walk_columns(&mut |column| {
        if first_unbound.is_none() && !sources.contains(&column.ident()) {
            first_unbound = Some(column);
        }
    });
    first_unbound.map_or(Ok(()), |column| Err(unbound(column)))
}

/// Checks that an assigned expression produces the column's type class.
pub(crate) fn check_assignable(column: &Column, value: &Expr, clause: &str) -> Result<()> {
    let expected = column.sql_type().class();
    match value.class() {
        Some(found) if found != expected => Err(BuildError::TypeMismatch {
            context: format!("{clause} {}", column.describe()),
            expected: String::from(expected.name()),
            found: String::from(found.name()),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn returning_columns<'a, I>(table: &Table, cols: I) -> Result<Vec<Column>>
where
    I: IntoIterator<Item = &'a Column>,
{
    let sources = [table.ident()];
    cols.into_iter()
        .map(|c| check_column(c, &sources).map(|()| c.clone()))
        .collect()
}
