//! SELECT statement builder.

use super::compound::{CompoundSelect, SetOperator};
use super::{check_bound, check_column};
use crate::clause::{Join, JoinKind, OrderBy};
use crate::error::{BuildError, Result};
use crate::expr::Expr;
use crate::schema::{Column, Table, TableIdent, TypeClass};

/// One projected expression with an optional output alias.
#[derive(Debug, Clone)]
pub(crate) struct SelectItem {
    pub(crate) expr: Expr,
    pub(crate) alias: Option<String>,
}

/// A SELECT statement.
///
/// Every clause checks its column references against the sources bound so
/// far (the FROM table, earlier joins and correlated outer tables), so
/// joins must be attached before the clauses that reference them. Clauses
/// render in SQL order regardless of the order they were attached in.
///
/// ```rust
/// use quarry_core::builder::Select;
/// use quarry_core::dialect::PostgresDialect;
/// use quarry_core::schema::{ColumnDef, SqlType, Table};
/// use quarry_core::Compile;
///
/// let users = Table::builder("users")
///     .column(ColumnDef::new("id", SqlType::BigInt))
///     .column(ColumnDef::new("name", SqlType::Text))
///     .build()
///     .unwrap();
/// let id = users.col("id").unwrap();
///
/// let query = Select::from(&users)
///     .where_clause(id.gt(10).unwrap())
///     .unwrap()
///     .order_by(id.desc())
///     .unwrap()
///     .limit(5);
///
/// let (sql, params) = query.compile(&PostgresDialect::new());
/// assert_eq!(
///     sql,
///     r#"SELECT "id", "name" FROM "users" WHERE "id" > $1 ORDER BY "id" DESC LIMIT 5"#
/// );
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    pub(crate) distinct: bool,
    pub(crate) projection: Vec<SelectItem>,
    pub(crate) from: Table,
    pub(crate) correlated: Vec<Table>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_clause: Option<Expr>,
    pub(crate) group_by: Vec<Column>,
    pub(crate) having: Option<Expr>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl Select {
    /// Starts a SELECT over `table`. Without explicit columns the table's
    /// full column list is projected.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(table: &Table) -> Self {
        Self {
            distinct: false,
            projection: vec![],
            from: table.clone(),
            correlated: vec![],
            joins: vec![],
            where_clause: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    fn sources(&self) -> Vec<&TableIdent> {
        std::iter::once(self.from.ident())
            .chain(self.joins.iter().map(|j| j.table.ident()))
            .chain(self.correlated.iter().map(Table::ident))
            .collect()
    }

    /// Appends projected columns or expressions.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnboundColumn`] for columns of tables that are
    /// not sources of the query.
    pub fn columns<I>(mut self, items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        for item in items {
            let expr = item.into();
            check_bound(&expr, &self.sources())?;
            self.projection.push(SelectItem { expr, alias: None });
        }
        Ok(self)
    }

    /// Appends one projected column or expression.
    ///
    /// # Errors
    ///
    /// See [`Select::columns`].
    pub fn column(self, item: impl Into<Expr>) -> Result<Self> {
        self.columns([item.into()])
    }

    /// Appends a projected expression under an output alias.
    ///
    /// # Errors
    ///
    /// See [`Select::columns`].
    pub fn expr_as(mut self, expr: impl Into<Expr>, alias: &str) -> Result<Self> {
        let expr = expr.into();
        check_bound(&expr, &self.sources())?;
        self.projection.push(SelectItem {
            expr,
            alias: Some(String::from(alias)),
        });
        Ok(self)
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Allows clauses to reference columns of an enclosing query's table,
    /// for correlated subqueries. The table is not added to FROM.
    #[must_use]
    pub fn correlate(mut self, outer: &Table) -> Self {
        self.correlated.push(outer.clone());
        self
    }

    fn add_join(mut self, kind: JoinKind, table: &Table, on: Option<Expr>) -> Result<Self> {
        if self.sources().contains(&table.ident()) {
            return Err(BuildError::DuplicateSource {
                table: String::from(table.ident().qualifier()),
            });
        }
        self.joins.push(Join {
            kind,
            table: table.clone(),
            on: None,
        });
        if let Some(on) = on {
            on.expect_predicate("JOIN ON")?;
            check_bound(&on, &self.sources())?;
            if let Some(join) = self.joins.last_mut() {
                join.on = Some(on);
            }
        }
        Ok(self)
    }

    /// Adds an INNER JOIN.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateSource`] when `table` is already a
    /// source (alias it for a self join), [`BuildError::UnboundColumn`]
    /// when the condition references other tables and
    /// [`BuildError::TypeMismatch`] when it is not a predicate.
    pub fn join(self, table: &Table, on: Expr) -> Result<Self> {
        self.add_join(JoinKind::Inner, table, Some(on))
    }

    /// Adds a LEFT JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
    pub fn left_join(self, table: &Table, on: Expr) -> Result<Self> {
        self.add_join(JoinKind::Left, table, Some(on))
    }

    /// Adds a RIGHT JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
    pub fn right_join(self, table: &Table, on: Expr) -> Result<Self> {
        self.add_join(JoinKind::Right, table, Some(on))
    }

    /// Adds a FULL OUTER JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
    pub fn full_join(self, table: &Table, on: Expr) -> Result<Self> {
        self.add_join(JoinKind::Full, table, Some(on))
    }

    /// Adds a CROSS JOIN.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateSource`] when `table` is already a
    /// source.
    pub fn cross_join(self, table: &Table) -> Result<Self> {
        self.add_join(JoinKind::Cross, table, None)
    }

    /// Adds a WHERE predicate. A second call ANDs onto the first.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeMismatch`] for non-boolean expressions and
    /// [`BuildError::UnboundColumn`] for columns outside the query's
    /// sources.
    pub fn where_clause(mut self, expr: Expr) -> Result<Self> {
        expr.expect_predicate("WHERE")?;
        check_bound(&expr, &self.sources())?;
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(expr)?,
            None => expr,
        });
        Ok(self)
    }

    /// Sets the GROUP BY columns, replacing earlier ones.
    ///
    /// # Errors
    ///
    /// See [`Select::columns`].
    pub fn group_by<'a, I>(mut self, cols: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Column>,
    {
        let cols = {
            let sources = self.sources();
            cols.into_iter()
                .map(|c| check_column(c, &sources).map(|()| c.clone()))
                .collect::<Result<Vec<_>>>()?
        };
        self.group_by = cols;
        Ok(self)
    }

    /// Adds a HAVING predicate. A second call ANDs onto the first.
    ///
    /// # Errors
    ///
    /// See [`Select::where_clause`].
    pub fn having(mut self, expr: Expr) -> Result<Self> {
        expr.expect_predicate("HAVING")?;
        check_bound(&expr, &self.sources())?;
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(expr)?,
            None => expr,
        });
        Ok(self)
    }

    /// Appends an ORDER BY entry.
    ///
    /// # Errors
    ///
    /// See [`Select::columns`].
    pub fn order_by(mut self, order: impl Into<OrderBy>) -> Result<Self> {
        let order = order.into();
        check_bound(&order.expr, &self.sources())?;
        self.order_by.push(order);
        Ok(self)
    }

    /// Sets LIMIT, replacing an earlier value.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets OFFSET, replacing an earlier value.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Expressions of every clause, in render order.
    fn clause_exprs(&self) -> impl Iterator<Item = &Expr> {
        self.projection
            .iter()
            .map(|item| &item.expr)
            .chain(self.joins.iter().filter_map(|j| j.on.as_ref()))
            .chain(self.where_clause.as_ref())
            .chain(self.having.as_ref())
            .chain(self.order_by.iter().map(|o| &o.expr))
    }

    /// Number of parameters registered when the query is compiled. Dialect
    /// emulation of `NULLS FIRST`/`NULLS LAST` repeats the ordering
    /// expression and is not counted.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.clause_exprs().map(Expr::param_count).sum()
    }

    /// Visits the column references that point outside FROM and the joins,
    /// i.e. into correlated tables, including those made by nested
    /// subqueries.
    pub(crate) fn walk_outer_columns<'a>(&'a self, visit: &mut dyn FnMut(&'a Column)) {
        let local: Vec<&TableIdent> = std::iter::once(self.from.ident())
            .chain(self.joins.iter().map(|j| j.table.ident()))
            .collect();
        let mut outer = |column: &'a Column| {
            if !local.contains(&column.ident()) {
                visit(column);
            }
        };
        for expr in self.clause_exprs() {
            expr.walk_columns(&mut outer);
        }
        for column in &self.group_by {
            outer(column);
        }
    }

    /// Number of columns the query produces.
    #[must_use]
    pub fn output_width(&self) -> usize {
        if self.projection.is_empty() {
            self.from.columns().len()
        } else {
            self.projection.len()
        }
    }

    pub(crate) fn output_classes(&self) -> Vec<Option<TypeClass>> {
        if self.projection.is_empty() {
            self.from
                .columns()
                .iter()
                .map(|c| Some(c.sql_type().class()))
                .collect()
        } else {
            self.projection.iter().map(|item| item.expr.class()).collect()
        }
    }

    /// Whether `column` is a result column under its own name.
    pub(crate) fn projects(&self, column: &Column) -> bool {
        if self.projection.is_empty() {
            return self.from.columns().iter().any(|c| c.same_as(column));
        }
        self.projection.iter().any(|item| {
            item.alias.is_none() && item.expr.as_column().is_some_and(|c| c.same_as(column))
        })
    }

    pub(crate) fn has_paging_or_order(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some()
    }

    /// Columns are qualified once more than one table is in scope.
    pub(crate) fn needs_qualification(&self) -> bool {
        !self.joins.is_empty() || !self.correlated.is_empty()
    }

    fn combine(self, op: SetOperator, other: Self) -> Result<CompoundSelect> {
        CompoundSelect::new(self)?.push(op, other)
    }

    /// `self UNION other`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ProjectionMismatch`] when the widths differ and
    /// [`BuildError::CompoundMemberClause`] when either side carries
    /// ORDER BY, LIMIT or OFFSET.
    pub fn union(self, other: Self) -> Result<CompoundSelect> {
        self.combine(SetOperator::Union, other)
    }

    /// `self UNION ALL other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn union_all(self, other: Self) -> Result<CompoundSelect> {
        self.combine(SetOperator::UnionAll, other)
    }

    /// `self INTERSECT other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn intersect(self, other: Self) -> Result<CompoundSelect> {
        self.combine(SetOperator::Intersect, other)
    }

    /// `self EXCEPT other`.
    ///
    /// # Errors
    ///
    /// See [`Select::union`].
    pub fn except(self, other: Self) -> Result<CompoundSelect> {
        self.combine(SetOperator::Except, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::{count_all, exists};
    use crate::schema::{ColumnDef, SqlType};
    use crate::value::SqlValue;
    use crate::Compile;

    fn users() -> Table {
        Table::builder("users")
            .column(ColumnDef::new("id", SqlType::BigInt))
            .column(ColumnDef::new("name", SqlType::Text))
            .column(ColumnDef::new("age", SqlType::Integer).nullable())
            .build()
            .unwrap()
    }

    fn posts() -> Table {
        Table::builder("posts")
            .column(ColumnDef::new("id", SqlType::BigInt))
            .column(ColumnDef::new("user_id", SqlType::BigInt))
            .column(ColumnDef::new("title", SqlType::Text))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_projection() {
        let (sql, params) = Select::from(&users()).compile(&GenericDialect::new());
        assert_eq!(sql, r#"SELECT "id", "name", "age" FROM "users""#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_where_calls_are_anded() {
        let t = users();
        let query = Select::from(&t)
            .column(&t.col("id").unwrap())
            .unwrap()
            .where_clause(t.col("age").unwrap().gt(18).unwrap())
            .unwrap()
            .where_clause(t.col("name").unwrap().like("A%").unwrap())
            .unwrap();
        let (sql, params) = query.compile(&GenericDialect::new());
        assert_eq!(
            sql,
            r#"SELECT "id" FROM "users" WHERE "age" > ? AND "name" LIKE ?"#
        );
        assert_eq!(
            params,
            vec![SqlValue::Int(18), SqlValue::Text(String::from("A%"))]
        );
    }

    #[test]
    fn test_unbound_column_rejected() {
        let err = Select::from(&users())
            .where_clause(posts().col("id").unwrap().eq(1).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::UnboundColumn {
                column: String::from("id"),
                table: String::from("posts"),
            }
        );
    }

    #[test]
    fn test_non_predicate_where_rejected() {
        let t = users();
        let err = Select::from(&t)
            .where_clause(Expr::from(t.col("age").unwrap()))
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn test_join_qualifies_columns() {
        let u = users();
        let p = posts();
        let query = Select::from(&u)
            .join(
                &p,
                p.col("user_id").unwrap().eq(u.col("id").unwrap()).unwrap(),
            )
            .unwrap()
            .columns([&u.col("name").unwrap(), &p.col("title").unwrap()])
            .unwrap()
            .where_clause(p.col("title").unwrap().like("%rust%").unwrap())
            .unwrap();
        let (sql, _) = query.compile(&GenericDialect::new());
        assert_eq!(
            sql,
            r#"SELECT "users"."name", "posts"."title" FROM "users" INNER JOIN "posts" ON "posts"."user_id" = "users"."id" WHERE "posts"."title" LIKE ?"#
        );
    }

    #[test]
    fn test_duplicate_join_needs_alias() {
        let u = users();
        let err = Select::from(&u).cross_join(&u).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateSource { .. }));

        let other = u.aliased("other");
        let query = Select::from(&u).cross_join(&other).unwrap();
        let (sql, _) = query.compile(&GenericDialect::new());
        assert!(sql.ends_with(r#"FROM "users" CROSS JOIN "users" AS "other""#));
    }

    #[test]
    fn test_group_by_having() {
        let p = posts();
        let user_id = p.col("user_id").unwrap();
        let query = Select::from(&p)
            .column(&user_id)
            .unwrap()
            .expr_as(count_all(), "total")
            .unwrap()
            .group_by([&user_id])
            .unwrap()
            .having(count_all().gt(2).unwrap())
            .unwrap();
        let (sql, params) = query.compile(&PostgresDialect::new());
        assert_eq!(
            sql,
            r#"SELECT "user_id", COUNT(*) AS "total" FROM "posts" GROUP BY "user_id" HAVING COUNT(*) > $1"#
        );
        assert_eq!(params, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn test_offset_without_limit() {
        let query = Select::from(&users()).offset(20);
        assert!(query
            .compile(&GenericDialect::new())
            .0
            .ends_with("OFFSET 20"));
        assert!(query
            .compile(&SqliteDialect::new())
            .0
            .ends_with("LIMIT -1 OFFSET 20"));
        assert!(query
            .compile(&MySqlDialect::new())
            .0
            .ends_with("LIMIT 18446744073709551615 OFFSET 20"));
    }

    #[test]
    fn test_correlated_exists() {
        let u = users();
        let p = posts();
        let has_posts = Select::from(&p)
            .correlate(&u)
            .column(&p.col("id").unwrap())
            .unwrap()
            .where_clause(p.col("user_id").unwrap().eq(u.col("id").unwrap()).unwrap())
            .unwrap();
        let query = Select::from(&u)
            .column(&u.col("name").unwrap())
            .unwrap()
            .where_clause(exists(has_posts))
            .unwrap();
        let (sql, _) = query.compile(&GenericDialect::new());
        assert_eq!(
            sql,
            r#"SELECT "name" FROM "users" WHERE EXISTS (SELECT "posts"."id" FROM "posts" WHERE "posts"."user_id" = "users"."id")"#
        );

        // Without the correlation the outer column is rejected.
        assert!(Select::from(&p)
            .where_clause(p.col("user_id").unwrap().eq(u.col("id").unwrap()).unwrap())
            .is_err());
    }

    #[test]
    fn test_output_width() {
        let t = users();
        assert_eq!(Select::from(&t).output_width(), 3);
        let narrowed = Select::from(&t).column(&t.col("id").unwrap()).unwrap();
        assert_eq!(narrowed.output_width(), 1);
    }
}
