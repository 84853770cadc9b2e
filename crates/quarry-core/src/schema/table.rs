//! Table descriptors and their builder.

use std::collections::HashSet;
use std::sync::Arc;

use super::column::{Column, ColumnDef};
use crate::error::{BuildError, Result};

/// Identity of a table source inside a statement.
///
/// Two columns bind to the same source when their idents are equal; an
/// aliased copy of a table is a distinct source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TableIdent {
    pub(crate) schema: Option<String>,
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

impl TableIdent {
    pub(crate) fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug)]
struct TableInner {
    ident: Arc<TableIdent>,
    columns: Vec<Column>,
}

/// An immutable, shareable table descriptor.
///
/// Declared once through [`Table::builder`] and cloned freely; clones share
/// the same column metadata.
///
/// ```rust
/// use quarry_core::schema::{ColumnDef, SqlType, Table};
///
/// let users = Table::builder("users")
///     .column(ColumnDef::new("id", SqlType::BigInt))
///     .column(ColumnDef::new("email", SqlType::Text).nullable())
///     .build()
///     .unwrap();
///
/// assert_eq!(users.columns().len(), 2);
/// assert!(users.col("missing").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    /// Starts declaring a table.
    #[must_use]
    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder {
            name: String::from(name),
            schema: None,
            columns: vec![],
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.ident.name
    }

    /// Returns the schema, if declared.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.inner.ident.schema.as_deref()
    }

    /// Returns the alias, if this is an aliased copy.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.inner.ident.alias.as_deref()
    }

    /// Returns all columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.inner.columns
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownColumn`] if the table has no such column.
    pub fn col(&self, name: &str) -> Result<Column> {
        self.inner
            .columns
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownColumn {
                table: String::from(self.name()),
                column: String::from(name),
            })
    }

    /// Returns a copy of this table under an alias, for self joins or
    /// shorter qualifiers. Columns of the copy bind to the alias.
    #[must_use]
    pub fn aliased(&self, alias: &str) -> Self {
        let ident = Arc::new(TableIdent {
            schema: self.inner.ident.schema.clone(),
            name: self.inner.ident.name.clone(),
            alias: Some(String::from(alias)),
        });
        let columns = self
            .inner
            .columns
            .iter()
            .map(|c| Column {
                table: Arc::clone(&ident),
                def: Arc::clone(&c.def),
            })
            .collect();
        Self {
            inner: Arc::new(TableInner { ident, columns }),
        }
    }

    pub(crate) fn ident(&self) -> &TableIdent {
        &self.inner.ident
    }
}

/// Builder for [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    schema: Option<String>,
    columns: Vec<ColumnDef>,
}

impl TableBuilder {
    /// Places the table in a schema.
    #[must_use]
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(String::from(schema));
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    /// Validates the declaration and freezes it.
    ///
    /// # Errors
    ///
    /// - [`BuildError::EmptyTable`] when no column was declared.
    /// - [`BuildError::DuplicateColumnDeclaration`] for repeated names.
    /// - [`BuildError::NotNullable`], [`BuildError::TypeMismatch`] or
    ///   [`BuildError::ValueOutOfRange`] when a default does not fit its
    ///   column.
    pub fn build(self) -> Result<Table> {
        if self.columns.is_empty() {
            return Err(BuildError::EmptyTable(self.name));
        }

        let mut seen = HashSet::new();
        for def in &self.columns {
            if !seen.insert(def.name.as_str()) {
                return Err(BuildError::DuplicateColumnDeclaration {
                    table: self.name.clone(),
                    column: def.name.clone(),
                });
            }
        }

        let ident = Arc::new(TableIdent {
            schema: self.schema,
            name: self.name,
            alias: None,
        });

        let mut columns = Vec::with_capacity(self.columns.len());
        for mut def in self.columns {
            let qualified = format!("{}.{}", ident.name, def.name);
            if let Some(default) = def.default.take() {
                if default.is_null() && !def.nullable {
                    return Err(BuildError::NotNullable { column: qualified });
                }
                def.default = Some(def.ty.encode(&qualified, default)?);
            }
            columns.push(Column {
                table: Arc::clone(&ident),
                def: Arc::new(def),
            });
        }

        Ok(Table {
            inner: Arc::new(TableInner { ident, columns }),
        })
    }
}
