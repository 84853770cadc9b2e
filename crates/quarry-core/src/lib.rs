//! # quarry-core
//!
//! Typed SQL query building with deterministic, parameterized output.
//!
//! This crate provides:
//! - Table declarations with typed columns and per-type value encoding
//! - Composable expression trees checked when they are built
//! - SELECT, INSERT, UPDATE and DELETE builders using the typestate pattern
//! - A renderer producing dialect-correct SQL plus ordered parameters
//!
//! ## Building a query
//!
//! ```rust
//! use quarry_core::builder::Select;
//! use quarry_core::dialect::GenericDialect;
//! use quarry_core::schema::{ColumnDef, SqlType, Table};
//! use quarry_core::{Compile, SqlValue};
//!
//! let users = Table::builder("users")
//!     .column(ColumnDef::new("id", SqlType::BigInt))
//!     .column(ColumnDef::new("name", SqlType::Varchar(Some(64))))
//!     .column(ColumnDef::new("active", SqlType::Boolean))
//!     .build()
//!     .unwrap();
//! let id = users.col("id").unwrap();
//! let active = users.col("active").unwrap();
//!
//! let query = Select::from(&users)
//!     .columns([&id])
//!     .unwrap()
//!     .where_clause(active.eq(true).unwrap())
//!     .unwrap();
//!
//! let (sql, params) = query.compile(&GenericDialect::new());
//! assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "active" = ?"#);
//! assert_eq!(params, vec![SqlValue::Bool(true)]);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Literals are always bound as parameters, never spliced into the text:
//!
//! ```rust
//! use quarry_core::builder::Select;
//! use quarry_core::dialect::PostgresDialect;
//! use quarry_core::schema::{ColumnDef, SqlType, Table};
//! use quarry_core::{Compile, SqlValue};
//!
//! let users = Table::builder("users")
//!     .column(ColumnDef::new("name", SqlType::Text))
//!     .build()
//!     .unwrap();
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = Select::from(&users)
//!     .where_clause(users.col("name").unwrap().eq(user_input).unwrap())
//!     .unwrap()
//!     .compile(&PostgresDialect::new());
//!
//! assert_eq!(sql, r#"SELECT "name" FROM "users" WHERE "name" = $1"#);
//! assert_eq!(params, vec![SqlValue::Text(String::from(user_input))]);
//! ```
//!
//! ## Errors
//!
//! Every structural problem (type mismatches, unbound columns, mismatched
//! insert rows, ...) is a [`BuildError`] returned while the statement is
//! built. Compiling a finished statement cannot fail.

pub mod builder;
pub mod clause;
pub mod dialect;
pub mod error;
pub mod expr;
mod render;
pub mod schema;
pub mod value;

pub use builder::{Compile, CompiledQuery, Delete, Insert, InsertRow, Select, Statement, Update};
pub use dialect::Dialect;
pub use error::{BuildError, ConfigError, Result};
pub use expr::Expr;
pub use schema::{Column, ColumnDef, SqlType, Table};
pub use value::{SqlValue, ToSqlValue};
