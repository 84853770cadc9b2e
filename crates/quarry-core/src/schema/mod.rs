//! Table and column declarations.
//!
//! Tables are declared once through an explicit builder and then shared,
//! read-only, by every statement that references them.

mod column;
mod table;
mod types;

pub use column::{Column, ColumnDef};
pub use table::{Table, TableBuilder};
pub use types::{SqlType, TypeClass};

pub(crate) use table::TableIdent;
