//! Expression trees.
//!
//! An [`Expr`] is an immutable tree built from columns, literals and
//! operators. Every operator method consumes its inputs and returns a new
//! tree, so sub-expressions can be cloned and reused across statements.
//! Type errors surface when the tree is built, never when it is rendered.
//!
//! ```rust
//! use quarry_core::schema::{ColumnDef, SqlType, Table};
//!
//! let users = Table::builder("users")
//!     .column(ColumnDef::new("age", SqlType::Integer))
//!     .column(ColumnDef::new("name", SqlType::Text))
//!     .build()
//!     .unwrap();
//! let age = users.col("age").unwrap();
//! let name = users.col("name").unwrap();
//!
//! let adults = age.gt_eq(18).unwrap().and(name.like("A%").unwrap()).unwrap();
//! assert_eq!(adults.param_count(), 2);
//!
//! // Pattern matching on a numeric column is rejected up front.
//! assert!(age.like("1%").is_err());
//! ```

mod function;
mod ops;

pub use function::{
    array_agg, avg, coalesce, count, count_all, count_distinct, greatest, least, lower, max,
    min, string_agg, sum, upper, Function,
};
pub use ops::{exists, not_exists};

pub(crate) use ops::resolve;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::builder::Select;
use crate::schema::{Column, SqlType, TypeClass};
use crate::value::{SqlValue, ToSqlValue};

/// A composable SQL expression.
#[derive(Debug, Clone)]
pub struct Expr(pub(crate) Node);

/// Tree nodes. Kept crate-private so that every tree is built through the
/// checked constructors.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Column(Column),
    Literal {
        value: SqlValue,
        ty: Option<SqlType>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Function {
        func: Function,
        args: Vec<Expr>,
        distinct: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSelect {
        expr: Box<Expr>,
        query: Box<Select>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Exists {
        query: Box<Select>,
        negated: bool,
    },
    Quantified {
        expr: Box<Expr>,
        op: BinaryOp,
        quantifier: Quantifier,
        query: Box<Select>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Boolean negation.
    Not,
    /// Arithmetic negation.
    Neg,
    /// `IS NULL`.
    IsNull,
    /// `IS NOT NULL`.
    IsNotNull,
}

/// How a comparison against a subquery combines the subquery's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// True when the comparison holds for at least one row.
    Any,
    /// True when the comparison holds for every row.
    All,
}

impl Quantifier {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::All => "ALL",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `ILIKE` (case-insensitive)
    ILike,
    /// `NOT ILIKE`
    NotILike,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    pub(crate) const fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq) || self.is_ordering()
    }

    pub(crate) const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::LtEq | Self::Gt | Self::GtEq)
    }

    pub(crate) const fn is_pattern(self) -> bool {
        matches!(self, Self::Like | Self::NotLike | Self::ILike | Self::NotILike)
    }

    pub(crate) const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }
}

/// The right-hand side of an operator: a column, an expression or a raw
/// value that is encoded against the left-hand side's type.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A column reference.
    Column(Column),
    /// A nested expression.
    Expr(Expr),
    /// A raw value.
    Value(SqlValue),
}

impl Operand {
    pub(crate) fn is_null(&self) -> bool {
        match self {
            Self::Value(v) => v.is_null(),
            Self::Expr(e) => e.is_null_literal(),
            Self::Column(_) => false,
        }
    }
}

/// Conversion into an [`Operand`].
pub trait IntoOperand {
    /// Performs the conversion.
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

impl IntoOperand for Column {
    fn into_operand(self) -> Operand {
        Operand::Column(self)
    }
}

impl IntoOperand for &Column {
    fn into_operand(self) -> Operand {
        Operand::Column(self.clone())
    }
}

impl IntoOperand for Expr {
    fn into_operand(self) -> Operand {
        Operand::Expr(self)
    }
}

impl<T: ToSqlValue> IntoOperand for Option<T> {
    fn into_operand(self) -> Operand {
        Operand::Value(self.to_sql_value())
    }
}

macro_rules! impl_value_operand {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self) -> Operand {
                    Operand::Value(self.to_sql_value())
                }
            }
        )+
    };
}

impl_value_operand!(
    SqlValue,
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    Vec<u8>,
    &[u8],
    NaiveDateTime,
    DateTime<Utc>,
    serde_json::Value,
);

impl From<Column> for Expr {
    fn from(col: Column) -> Self {
        Self(Node::Column(col))
    }
}

impl From<&Column> for Expr {
    fn from(col: &Column) -> Self {
        Self(Node::Column(col.clone()))
    }
}

impl Expr {
    /// Creates an untyped literal. It is always bound as a parameter.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self(Node::Literal {
            value: value.to_sql_value(),
            ty: None,
        })
    }

    /// Returns the number of parameters this expression registers when
    /// rendered.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match &self.0 {
            Node::Column(_) => 0,
            Node::Literal { .. } => 1,
            Node::Unary { operand, .. } => operand.param_count(),
            Node::Binary { left, right, .. } => left.param_count() + right.param_count(),
            Node::And(parts) | Node::Or(parts) => parts.iter().map(Self::param_count).sum(),
            Node::Function { args, .. } => args.iter().map(Self::param_count).sum(),
            // An empty list renders as a constant without its left side.
            Node::InList { list, .. } if list.is_empty() => 0,
            Node::InList { expr, list, .. } => {
                expr.param_count() + list.iter().map(Self::param_count).sum::<usize>()
            }
            Node::InSelect { expr, query, .. } => expr.param_count() + query.param_count(),
            Node::Between {
                expr, low, high, ..
            } => expr.param_count() + low.param_count() + high.param_count(),
            Node::Exists { query, .. } => query.param_count(),
            Node::Quantified { expr, query, .. } => expr.param_count() + query.param_count(),
        }
    }

    /// Returns the class of the value this expression produces, or `None`
    /// for an untyped NULL literal.
    #[must_use]
    pub fn class(&self) -> Option<TypeClass> {
        match &self.0 {
            Node::Column(c) => Some(c.sql_type().class()),
            Node::Literal { value, ty } => ty.map_or_else(|| TypeClass::of_value(value), |t| Some(t.class())),
            Node::Unary { op: UnaryOp::Neg, .. } => Some(TypeClass::Numeric),
            Node::Binary { op, .. } if op.is_arithmetic() => Some(TypeClass::Numeric),
            Node::Function { func, args, .. } => func.result_class(args),
            Node::Unary { .. }
            | Node::Binary { .. }
            | Node::And(_)
            | Node::Or(_)
            | Node::InList { .. }
            | Node::InSelect { .. }
            | Node::Between { .. }
            | Node::Exists { .. }
            | Node::Quantified { .. } => Some(TypeClass::Boolean),
        }
    }

    /// The declared type raw values are encoded with when they meet this
    /// expression.
    pub(crate) fn value_type(&self) -> Option<SqlType> {
        match &self.0 {
            Node::Column(c) => Some(c.sql_type()),
            Node::Literal { ty, .. } => *ty,
            Node::Function { func, args, .. } if func.preserves_type() => {
                args.first().and_then(Self::value_type)
            }
            _ => None,
        }
    }

    pub(crate) const fn as_column(&self) -> Option<&Column> {
        match &self.0 {
            Node::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Leaves render without surrounding parentheses in operand position.
    pub(crate) const fn is_atomic(&self) -> bool {
        matches!(
            self.0,
            Node::Column(_) | Node::Literal { .. } | Node::Function { .. }
        )
    }

    pub(crate) const fn is_null_literal(&self) -> bool {
        matches!(
            self.0,
            Node::Literal {
                value: SqlValue::Null,
                ..
            }
        )
    }

    /// Returns a short description for error messages.
    pub(crate) fn describe(&self) -> String {
        match &self.0 {
            Node::Column(c) => format!("column {}", c.describe()),
            Node::Function { func, .. } => format!("{}(...)", func.name()),
            _ => String::from("expression"),
        }
    }

    /// Visits every column reference the enclosing statement must bind.
    /// Inside a nested subquery only the references to its correlated
    /// outer tables are visited; its own sources bind the rest.
    pub(crate) fn walk_columns<'a>(&'a self, visit: &mut dyn FnMut(&'a Column)) {
        match &self.0 {
            Node::Column(c) => visit(c),
            Node::Literal { .. } => {}
            Node::Exists { query, .. } => query.walk_outer_columns(visit),
            Node::Unary { operand, .. } => operand.walk_columns(visit),
            Node::Binary { left, right, .. } => {
                left.walk_columns(visit);
                right.walk_columns(visit);
            }
            Node::And(parts) | Node::Or(parts) | Node::Function { args: parts, .. } => {
                for part in parts {
                    part.walk_columns(visit);
                }
            }
            Node::InList { expr, list, .. } => {
                expr.walk_columns(visit);
                for item in list {
                    item.walk_columns(visit);
                }
            }
            Node::InSelect { expr, query, .. } | Node::Quantified { expr, query, .. } => {
                expr.walk_columns(visit);
                query.walk_outer_columns(visit);
            }
            Node::Between {
                expr, low, high, ..
            } => {
                expr.walk_columns(visit);
                low.walk_columns(visit);
                high.walk_columns(visit);
            }
        }
    }
}
