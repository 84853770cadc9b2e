//! SQL rendering.
//!
//! A single recursive-descent pass over the statement. Literals are
//! registered in visit order (pre-order, operands left to right), so the
//! placeholder index of a value always matches its position in the
//! parameter list.

mod params;

use tracing::{debug, trace, warn};

use self::params::ParamRegistry;
use crate::builder::{CompoundSelect, Delete, Insert, Select, Update};
use crate::clause::{Nulls, OrderBy};
use crate::dialect::Dialect;
use crate::expr::{BinaryOp, Expr, Function, Node, Quantifier, UnaryOp};
use crate::schema::{Column, Table};
use crate::value::SqlValue;

pub(crate) struct Renderer<'d> {
    dialect: &'d dyn Dialect,
    params: ParamRegistry,
    sql: String,
    /// Whether column references carry their table qualifier.
    qualify: bool,
}

impl<'d> Renderer<'d> {
    pub(crate) fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            params: ParamRegistry::new(),
            sql: String::new(),
            qualify: false,
        }
    }

    pub(crate) fn finish(self, statement: &'static str) -> (String, Vec<SqlValue>) {
        debug!(
            statement,
            dialect = self.dialect.name(),
            params = self.params.len(),
            "compiled statement"
        );
        trace!(sql = %self.sql, "rendered SQL");
        (self.sql, self.params.into_values())
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn ident(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    fn comma_separated<T>(
        &mut self,
        items: impl IntoIterator<Item = T>,
        mut render: impl FnMut(&mut Self, T),
    ) {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            render(self, item);
        }
    }

    fn table_name(&mut self, table: &Table) {
        if let Some(schema) = table.schema() {
            self.ident(schema);
            self.push(".");
        }
        self.ident(table.name());
    }

    fn table_source(&mut self, table: &Table) {
        self.table_name(table);
        if let Some(alias) = table.alias() {
            self.push(" AS ");
            self.ident(alias);
        }
    }

    fn column(&mut self, column: &Column) {
        if self.qualify {
            self.ident(column.qualifier());
            self.push(".");
        }
        self.ident(column.name());
    }

    fn param(&mut self, value: &SqlValue) {
        let index = self.params.register(value.clone());
        let placeholder = self.dialect.placeholder(index);
        self.push(&placeholder);
    }

    pub(crate) fn expr(&mut self, expr: &Expr) {
        match &expr.0 {
            Node::Column(c) => self.column(c),
            Node::Literal { value, .. } => self.param(value),
            Node::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    self.push("NOT (");
                    self.expr(operand);
                    self.push(")");
                }
                UnaryOp::Neg => {
                    self.push("-");
                    self.operand(operand);
                }
                UnaryOp::IsNull => {
                    self.operand(operand);
                    self.push(" IS NULL");
                }
                UnaryOp::IsNotNull => {
                    self.operand(operand);
                    self.push(" IS NOT NULL");
                }
            },
            Node::Binary { left, op, right } => self.binary(left, *op, right),
            Node::And(parts) => self.connective(parts, " AND ", true),
            Node::Or(parts) => self.connective(parts, " OR ", false),
            Node::Function {
                func,
                args,
                distinct,
            } => self.function(*func, args, *distinct),
            Node::InList {
                expr,
                list,
                negated,
            } => {
                if list.is_empty() {
                    let literal = self.dialect.boolean_literal(*negated);
                    self.push(literal);
                    return;
                }
                self.operand(expr);
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                self.comma_separated(list, Self::expr);
                self.push(")");
            }
            Node::InSelect {
                expr,
                query,
                negated,
            } => {
                self.operand(expr);
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                self.select(query);
                self.push(")");
            }
            Node::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.operand(expr);
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.operand(low);
                self.push(" AND ");
                self.operand(high);
            }
            Node::Exists { query, negated } => {
                self.push(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                self.select(query);
                self.push(")");
            }
            Node::Quantified {
                expr,
                op,
                quantifier,
                query,
            } => {
                self.operand(expr);
                self.quantifier(*op, *quantifier);
                self.select(query);
                self.push(")");
            }
        }
    }

    fn function(&mut self, func: Function, args: &[Expr], distinct: bool) {
        let name = self.dialect.function_name(func);
        self.push(name);
        self.push("(");
        if args.is_empty() {
            self.push("*");
        }
        if distinct {
            self.push("DISTINCT ");
        }
        if func == Function::StringAgg && self.dialect.string_agg_separator_clause() {
            if let [value, separator] = args {
                self.expr(value);
                self.push(" SEPARATOR ");
                self.string_literal(separator);
                self.push(")");
                return;
            }
        }
        self.comma_separated(args, Self::expr);
        self.push(")");
    }

    /// Inlines a text literal as a quoted SQL string.
    fn string_literal(&mut self, expr: &Expr) {
        match &expr.0 {
            Node::Literal {
                value: SqlValue::Text(text),
                ..
            } => {
                self.push("'");
                for c in text.chars() {
                    match c {
                        '\'' => self.push("''"),
                        '\\' => self.push("\\\\"),
                        c => self.sql.push(c),
                    }
                }
                self.push("'");
            }
            _ => self.expr(expr),
        }
    }

    /// Pushes ` <op> ANY (` or its emulation, leaving the subquery open.
    fn quantifier(&mut self, op: BinaryOp, quantifier: Quantifier) {
        if !self.dialect.supports_quantified_subqueries() {
            // = ANY and != ALL are exactly IN and NOT IN.
            let emulated = match (op, quantifier) {
                (BinaryOp::Eq, Quantifier::Any) => Some(" IN ("),
                (BinaryOp::NotEq, Quantifier::All) => Some(" NOT IN ("),
                _ => None,
            };
            if let Some(emulated) = emulated {
                self.push(emulated);
                return;
            }
            warn!(
                dialect = self.dialect.name(),
                "rendering {} {} for a dialect that does not advertise support",
                op.as_sql(),
                quantifier.as_sql()
            );
        }
        self.push(" ");
        self.push(op.as_sql());
        self.push(" ");
        self.push(quantifier.as_sql());
        self.push(" (");
    }

    /// Renders an expression in operand position, parenthesized unless it
    /// is a leaf.
    fn operand(&mut self, expr: &Expr) {
        if expr.is_atomic() {
            self.expr(expr);
        } else {
            self.push("(");
            self.expr(expr);
            self.push(")");
        }
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) {
        if matches!(op, BinaryOp::ILike | BinaryOp::NotILike) && !self.dialect.supports_ilike() {
            debug!(
                dialect = self.dialect.name(),
                "ILIKE not supported, comparing lower-cased operands"
            );
            self.push("LOWER(");
            self.expr(left);
            self.push(if op == BinaryOp::ILike {
                ") LIKE LOWER("
            } else {
                ") NOT LIKE LOWER("
            });
            self.expr(right);
            self.push(")");
            return;
        }

        self.operand(left);
        self.push(" ");
        self.push(op.as_sql());
        self.push(" ");
        self.operand(right);
    }

    fn connective(&mut self, parts: &[Expr], separator: &str, conjunction: bool) {
        if parts.is_empty() {
            let literal = self.dialect.boolean_literal(conjunction);
            self.push(literal);
            return;
        }
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            if matches!(part.0, Node::And(_) | Node::Or(_)) {
                self.push("(");
                self.expr(part);
                self.push(")");
            } else {
                self.expr(part);
            }
        }
    }

    fn order_item(&mut self, order: &OrderBy) {
        let direction = order.direction.as_sql();
        match order.nulls {
            Some(nulls) if !self.dialect.supports_nulls_ordering() => {
                debug!(
                    dialect = self.dialect.name(),
                    "NULLS FIRST/LAST not supported, sorting on IS NULL first"
                );
                self.operand(&order.expr);
                self.push(match nulls {
                    Nulls::First => " IS NULL DESC, ",
                    Nulls::Last => " IS NULL ASC, ",
                });
                self.expr(&order.expr);
                self.push(" ");
                self.push(direction);
            }
            Some(nulls) => {
                self.expr(&order.expr);
                self.push(" ");
                self.push(direction);
                self.push(match nulls {
                    Nulls::First => " NULLS FIRST",
                    Nulls::Last => " NULLS LAST",
                });
            }
            None => {
                self.expr(&order.expr);
                self.push(" ");
                self.push(direction);
            }
        }
    }

    fn order_and_page(&mut self, order_by: &[OrderBy], limit: Option<u64>, offset: Option<u64>) {
        if !order_by.is_empty() {
            self.push(" ORDER BY ");
            self.comma_separated(order_by, Self::order_item);
        }
        match (limit, offset) {
            (Some(limit), _) => self.push(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    self.push(" LIMIT ");
                    self.push(unbounded);
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = offset {
            self.push(&format!(" OFFSET {offset}"));
        }
    }

    fn returning(&mut self, columns: &[Column]) {
        if columns.is_empty() {
            return;
        }
        if !self.dialect.supports_returning() {
            warn!(
                dialect = self.dialect.name(),
                "rendering RETURNING for a dialect that does not advertise support"
            );
        }
        self.push(" RETURNING ");
        self.comma_separated(columns, Self::column);
    }

    fn where_clause(&mut self, predicate: Option<&Expr>) {
        if let Some(predicate) = predicate {
            self.push(" WHERE ");
            self.expr(predicate);
        }
    }

    pub(crate) fn select(&mut self, select: &Select) {
        let outer = self.qualify;
        self.qualify = select.needs_qualification();

        self.push("SELECT ");
        if select.distinct {
            self.push("DISTINCT ");
        }
        if select.projection.is_empty() {
            self.comma_separated(select.from.columns(), Self::column);
        } else {
            self.comma_separated(&select.projection, |r, item| {
                r.expr(&item.expr);
                if let Some(alias) = &item.alias {
                    r.push(" AS ");
                    r.ident(alias);
                }
            });
        }

        self.push(" FROM ");
        self.table_source(&select.from);
        for join in &select.joins {
            self.push(" ");
            self.push(join.kind.as_sql());
            self.push(" ");
            self.table_source(&join.table);
            if let Some(on) = &join.on {
                self.push(" ON ");
                self.expr(on);
            }
        }

        self.where_clause(select.where_clause.as_ref());
        if !select.group_by.is_empty() {
            self.push(" GROUP BY ");
            self.comma_separated(&select.group_by, Self::column);
        }
        if let Some(having) = &select.having {
            self.push(" HAVING ");
            self.expr(having);
        }
        self.order_and_page(&select.order_by, select.limit, select.offset);

        self.qualify = outer;
    }

    pub(crate) fn compound(&mut self, compound: &CompoundSelect) {
        self.select(&compound.first);
        for (op, member) in &compound.rest {
            self.push(" ");
            self.push(op.as_sql());
            self.push(" ");
            self.select(member);
        }
        // Terms of a compound ORDER BY name result columns.
        self.qualify = false;
        self.order_and_page(&compound.order_by, compound.limit, compound.offset);
    }

    pub(crate) fn insert<Values>(&mut self, insert: &Insert<Values>) {
        self.push("INSERT INTO ");
        self.table_name(&insert.table);
        self.push(" (");
        self.comma_separated(&insert.columns, |r, c| r.ident(c.name()));
        self.push(") VALUES ");
        self.comma_separated(&insert.rows, |r, row| {
            r.push("(");
            r.comma_separated(row, Self::expr);
            r.push(")");
        });
        self.returning(&insert.returning);
    }

    pub(crate) fn update<Set>(&mut self, update: &Update<Set>) {
        self.push("UPDATE ");
        self.table_source(&update.table);
        self.push(" SET ");
        self.comma_separated(&update.assignments, |r, (column, value)| {
            r.ident(column.name());
            r.push(" = ");
            r.expr(value);
        });
        self.where_clause(update.where_clause.as_ref());
        self.returning(&update.returning);
    }

    pub(crate) fn delete<State>(&mut self, delete: &Delete<State>) {
        self.push("DELETE FROM ");
        self.table_source(&delete.table);
        self.where_clause(delete.where_clause.as_ref());
        self.returning(&delete.returning);
    }
}
