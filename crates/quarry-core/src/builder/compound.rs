//! Compound selects: UNION, UNION ALL, INTERSECT and EXCEPT.

use super::check_bound;
use super::select::Select;
use crate::clause::OrderBy;
use crate::error::{BuildError, Result};

/// Set operators combining two selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    /// `UNION`
    Union,
    /// `UNION ALL`
    UnionAll,
    /// `INTERSECT`
    Intersect,
    /// `EXCEPT`
    Except,
}

impl SetOperator {
    /// Returns the SQL keyword sequence.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// Selects combined with set operators, evaluated left to right.
///
/// Members may not carry their own ORDER BY, LIMIT or OFFSET; those apply
/// to the combined result and are set on the compound itself.
#[derive(Debug, Clone)]
pub struct CompoundSelect {
    pub(crate) first: Select,
    pub(crate) rest: Vec<(SetOperator, Select)>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl CompoundSelect {
    pub(crate) fn new(first: Select) -> Result<Self> {
        if first.has_paging_or_order() {
            return Err(BuildError::CompoundMemberClause);
        }
        Ok(Self {
            first,
            rest: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        })
    }

    pub(crate) fn push(mut self, op: SetOperator, member: Select) -> Result<Self> {
        if member.has_paging_or_order() {
            return Err(BuildError::CompoundMemberClause);
        }
        let (left, right) = (self.first.output_width(), member.output_width());
        if left != right {
            return Err(BuildError::ProjectionMismatch { left, right });
        }
        self.rest.push((op, member));
        Ok(self)
    }

    /// Appends `UNION other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn union(self, other: Select) -> Result<Self> {
        self.push(SetOperator::Union, other)
    }

    /// Appends `UNION ALL other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn union_all(self, other: Select) -> Result<Self> {
        self.push(SetOperator::UnionAll, other)
    }

    /// Appends `INTERSECT other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn intersect(self, other: Select) -> Result<Self> {
        self.push(SetOperator::Intersect, other)
    }

    /// Appends `EXCEPT other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn except(self, other: Select) -> Result<Self> {
        self.push(SetOperator::Except, other)
    }

    /// Orders the combined result. Terms name result columns of the first
    /// member and render unqualified.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnboundColumn`] for columns that are not from
    /// the first member's FROM table and [`BuildError::CompoundOrderTerm`]
    /// for anything but a column the first member projects under its own
    /// name.
    pub fn order_by(mut self, order: impl Into<OrderBy>) -> Result<Self> {
        let order = order.into();
        check_bound(&order.expr, &[self.first.from.ident()])?;
        let projected = order
            .expr
            .as_column()
            .is_some_and(|column| self.first.projects(column));
        if !projected {
            return Err(BuildError::CompoundOrderTerm {
                term: order.expr.describe(),
            });
        }
        self.order_by.push(order);
        Ok(self)
    }

    /// Limits the combined result.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips rows of the combined result.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Number of columns the compound produces.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.first.output_width()
    }

    /// Number of parameters registered when compiled.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.first.param_count()
            + self
                .rest
                .iter()
                .map(|(_, member)| member.param_count())
                .sum::<usize>()
            + self
                .order_by
                .iter()
                .map(|o| o.expr.param_count())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::schema::{ColumnDef, SqlType, Table};
    use crate::Compile;

    fn staff() -> (Table, Table) {
        let employees = Table::builder("employees")
            .column(ColumnDef::new("email", SqlType::Text))
            .column(ColumnDef::new("active", SqlType::Boolean))
            .build()
            .unwrap();
        let contractors = Table::builder("contractors")
            .column(ColumnDef::new("email", SqlType::Text))
            .build()
            .unwrap();
        (employees, contractors)
    }

    #[test]
    fn test_union_all_renders_members_in_order() {
        let (e, c) = staff();
        let active = Select::from(&e)
            .column(&e.col("email").unwrap())
            .unwrap()
            .where_clause(e.col("active").unwrap().eq(true).unwrap())
            .unwrap();
        let query = active
            .union_all(Select::from(&c))
            .unwrap()
            .order_by(e.col("email").unwrap())
            .unwrap()
            .limit(10);
        let (sql, params) = query.compile(&GenericDialect::new());
        assert_eq!(
            sql,
            r#"SELECT "email" FROM "employees" WHERE "active" = ? UNION ALL SELECT "email" FROM "contractors" ORDER BY "email" ASC LIMIT 10"#
        );
        assert_eq!(params.len(), 1);
        assert_eq!(query.param_count(), 1);
    }

    #[test]
    fn test_width_mismatch() {
        let (e, c) = staff();
        let err = Select::from(&e).except(Select::from(&c)).unwrap_err();
        assert_eq!(err, BuildError::ProjectionMismatch { left: 2, right: 1 });
    }

    #[test]
    fn test_member_paging_rejected() {
        let (_, c) = staff();
        let err = Select::from(&c)
            .union(Select::from(&c).limit(1))
            .unwrap_err();
        assert_eq!(err, BuildError::CompoundMemberClause);
    }
}
