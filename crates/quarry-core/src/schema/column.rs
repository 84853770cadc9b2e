//! Column declarations and column references.

use std::sync::Arc;

use super::table::TableIdent;
use super::types::SqlType;
use crate::value::{SqlValue, ToSqlValue};

/// Declaration of a column, consumed by [`TableBuilder::column`].
///
/// [`TableBuilder::column`]: super::TableBuilder::column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub(crate) name: String,
    pub(crate) ty: SqlType,
    pub(crate) nullable: bool,
    pub(crate) default: Option<SqlValue>,
}

impl ColumnDef {
    /// Declares a NOT NULL column without default.
    #[must_use]
    pub fn new(name: &str, ty: SqlType) -> Self {
        Self {
            name: String::from(name),
            ty,
            nullable: false,
            default: None,
        }
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value used by [`InsertRow::with_defaults`].
    ///
    /// [`InsertRow::with_defaults`]: crate::builder::InsertRow::with_defaults
    #[must_use]
    pub fn default<T: ToSqlValue>(mut self, value: T) -> Self {
        self.default = Some(value.to_sql_value());
        self
    }
}

/// A typed column bound to its table.
///
/// Columns are obtained from a declared [`Table`](super::Table) and are
/// cheap to clone. Operator methods (`eq`, `gt`, `like`, ...) live in the
/// [`expr`](crate::expr) module and return new expressions; the column is
/// never modified.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) table: Arc<TableIdent>,
    pub(crate) def: Arc<ColumnDef>,
}

impl Column {
    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        self.def.ty
    }

    /// Returns whether the column accepts NULL.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.def.nullable
    }

    /// Returns the declared default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&SqlValue> {
        self.def.default.as_ref()
    }

    /// Returns the name of the table the column belongs to.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// Returns the name used to qualify this column in SQL: the table
    /// alias when set, otherwise the table name.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        self.table.qualifier()
    }

    /// Returns `qualifier.name`, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}.{}", self.qualifier(), self.name())
    }

    /// Returns true when both references point at the same column of the
    /// same table source.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.def.name == other.def.name && self.table == other.table
    }

    pub(crate) fn ident(&self) -> &TableIdent {
        &self.table
    }
}
