//! Ordering and join clauses shared by the statement builders.

use crate::expr::Expr;
use crate::schema::{Column, Table};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    pub(crate) const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Placement of NULLs in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

/// One ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub(crate) expr: Expr,
    pub(crate) direction: Direction,
    pub(crate) nulls: Option<Nulls>,
}

impl OrderBy {
    /// Orders ascending.
    #[must_use]
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: Direction::Asc,
            nulls: None,
        }
    }

    /// Orders descending.
    #[must_use]
    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: Direction::Desc,
            nulls: None,
        }
    }

    /// Sorts NULLs before other values.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    /// Sorts NULLs after other values.
    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }
}

impl From<Column> for OrderBy {
    fn from(col: Column) -> Self {
        Self::asc(col)
    }
}

impl From<&Column> for OrderBy {
    fn from(col: &Column) -> Self {
        Self::asc(col)
    }
}

impl From<Expr> for OrderBy {
    fn from(expr: Expr) -> Self {
        Self::asc(expr)
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `FULL OUTER JOIN`
    Full,
    /// `CROSS JOIN`, which takes no condition.
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword sequence.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A joined table with its condition.
#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) table: Table,
    pub(crate) on: Option<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, SqlType};

    #[test]
    fn test_order_by_builders() {
        let t = Table::builder("t")
            .column(ColumnDef::new("a", SqlType::Integer).nullable())
            .build()
            .unwrap();
        let a = t.col("a").unwrap();

        let plain = OrderBy::from(&a);
        assert_eq!(plain.direction, Direction::Asc);
        assert_eq!(plain.nulls, None);

        let ordered = a.desc().nulls_last();
        assert_eq!(ordered.direction, Direction::Desc);
        assert_eq!(ordered.nulls, Some(Nulls::Last));
    }

    #[test]
    fn test_join_keywords() {
        assert_eq!(JoinKind::Full.as_sql(), "FULL OUTER JOIN");
        assert_eq!(JoinKind::Cross.as_sql(), "CROSS JOIN");
    }
}
