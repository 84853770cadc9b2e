//! The compilation entry point shared by all statements.

use serde::Serialize;

use super::compound::CompoundSelect;
use super::delete::{AllRows, Confirmed, Delete, Filtered};
use super::insert::{HasValues, Insert};
use super::select::Select;
use super::update::{HasSet, Update};
use crate::dialect::Dialect;
use crate::render::Renderer;
use crate::value::SqlValue;

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// The SQL text with placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<SqlValue>,
}

impl CompiledQuery {
    /// Splits into SQL text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

/// Statements that compile to SQL.
///
/// Compilation never fails and never mutates the statement: every error
/// is reported while the statement is built, and compiling twice yields
/// identical output.
pub trait Compile {
    /// Renders SQL for `dialect` with parameters in placeholder order.
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>);

    /// Same as [`Compile::compile`], as a struct.
    fn to_query(&self, dialect: &dyn Dialect) -> CompiledQuery {
        let (sql, params) = self.compile(dialect);
        CompiledQuery { sql, params }
    }
}

impl Compile for Select {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::new(dialect);
        renderer.select(self);
        renderer.finish("SELECT")
    }
}

impl Compile for CompoundSelect {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::new(dialect);
        renderer.compound(self);
        renderer.finish("SELECT")
    }
}

impl Compile for Insert<HasValues> {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::new(dialect);
        renderer.insert(self);
        renderer.finish("INSERT")
    }
}

impl Compile for Update<HasSet> {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::new(dialect);
        renderer.update(self);
        renderer.finish("UPDATE")
    }
}

impl<State: Confirmed> Compile for Delete<State> {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::new(dialect);
        renderer.delete(self);
        renderer.finish("DELETE")
    }
}

/// Any finished statement.
#[derive(Debug, Clone)]
pub enum Statement {
    /// A SELECT.
    Select(Select),
    /// A compound SELECT.
    Compound(CompoundSelect),
    /// An INSERT with at least one row.
    Insert(Insert<HasValues>),
    /// An UPDATE with at least one assignment.
    Update(Update<HasSet>),
    /// A filtered DELETE.
    DeleteWhere(Delete<Filtered>),
    /// A DELETE of every row.
    DeleteAll(Delete<AllRows>),
}

impl Compile for Statement {
    fn compile(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        match self {
            Self::Select(s) => s.compile(dialect),
            Self::Compound(c) => c.compile(dialect),
            Self::Insert(i) => i.compile(dialect),
            Self::Update(u) => u.compile(dialect),
            Self::DeleteWhere(d) => d.compile(dialect),
            Self::DeleteAll(d) => d.compile(dialect),
        }
    }
}

impl From<Select> for Statement {
    fn from(s: Select) -> Self {
        Self::Select(s)
    }
}

impl From<CompoundSelect> for Statement {
    fn from(c: CompoundSelect) -> Self {
        Self::Compound(c)
    }
}

impl From<Insert<HasValues>> for Statement {
    fn from(i: Insert<HasValues>) -> Self {
        Self::Insert(i)
    }
}

impl From<Update<HasSet>> for Statement {
    fn from(u: Update<HasSet>) -> Self {
        Self::Update(u)
    }
}

impl From<Delete<Filtered>> for Statement {
    fn from(d: Delete<Filtered>) -> Self {
        Self::DeleteWhere(d)
    }
}

impl From<Delete<AllRows>> for Statement {
    fn from(d: Delete<AllRows>) -> Self {
        Self::DeleteAll(d)
    }
}
