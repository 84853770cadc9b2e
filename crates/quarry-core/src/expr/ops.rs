//! Operator methods on expressions and columns.
//!
//! Each method validates its operands against the declared types before
//! building the node. Comparing against NULL with `eq`/`not_eq` is
//! rewritten to `IS NULL`/`IS NOT NULL`; any other operator rejects NULL.

use super::{BinaryOp, Expr, IntoOperand, Node, Operand, Quantifier, UnaryOp};
use crate::builder::Select;
use crate::clause::OrderBy;
use crate::error::{BuildError, Result};
use crate::schema::{Column, TypeClass};

pub(super) const ORDERABLE: &[TypeClass] = &[TypeClass::Numeric, TypeClass::Text, TypeClass::Temporal];
pub(super) const TEXTUAL: &[TypeClass] = &[TypeClass::Text];
pub(super) const NUMERIC: &[TypeClass] = &[TypeClass::Numeric];
const PREDICATE: &[TypeClass] = &[TypeClass::Boolean];

pub(super) fn expect_class(expr: &Expr, allowed: &[TypeClass], operator: &'static str) -> Result<()> {
    match expr.class() {
        Some(class) if allowed.contains(&class) => Ok(()),
        Some(class) => Err(BuildError::TypeMismatch {
            context: format!("{operator} on {}", expr.describe()),
            expected: allowed
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(" or "),
            found: String::from(class.name()),
        }),
        None => Err(BuildError::NullOperand { operator }),
    }
}

fn expect_same_class(
    left: &Expr,
    right: Option<TypeClass>,
    right_desc: &str,
    operator: &'static str,
) -> Result<()> {
    match (left.class(), right) {
        (Some(l), Some(r)) if l != r => Err(BuildError::TypeMismatch {
            context: format!("{operator} between {} and {right_desc}", left.describe()),
            expected: String::from(l.name()),
            found: String::from(r.name()),
        }),
        _ => Ok(()),
    }
}

pub(super) fn expect_comparable(left: &Expr, right: &Expr, operator: &'static str) -> Result<()> {
    expect_same_class(left, right.class(), &right.describe(), operator)
}

/// Turns an operand into an expression placed next to `anchor`. Raw values
/// and untyped literals are encoded with the anchor's declared type so the
/// literal carries it.
pub(crate) fn resolve(anchor: &Expr, operand: Operand) -> Result<Expr> {
    match operand {
        Operand::Column(c) => Ok(Expr::from(c)),
        Operand::Expr(Expr(Node::Literal { value, ty: None })) => {
            resolve(anchor, Operand::Value(value))
        }
        Operand::Expr(e) => Ok(e),
        Operand::Value(value) => match anchor.value_type() {
            Some(ty) => {
                let target = match &anchor.0 {
                    Node::Column(c) => c.describe(),
                    _ => anchor.describe(),
                };
                let value = ty.encode(&target, value)?;
                Ok(Expr(Node::Literal {
                    value,
                    ty: Some(ty),
                }))
            }
            None => Ok(Expr(Node::Literal { value, ty: None })),
        },
    }
}

impl Expr {
    /// Checks that the expression is usable as a clause predicate.
    pub(crate) fn expect_predicate(&self, clause: &'static str) -> Result<()> {
        expect_class(self, PREDICATE, clause)
    }

    fn binary(self, op: BinaryOp, other: Operand) -> Result<Self> {
        if self.is_null_literal() {
            return Err(BuildError::NullOperand {
                operator: op.as_sql(),
            });
        }
        if other.is_null() {
            return match op {
                BinaryOp::Eq => Ok(self.is_null()),
                BinaryOp::NotEq => Ok(self.is_not_null()),
                _ => Err(BuildError::NullOperand {
                    operator: op.as_sql(),
                }),
            };
        }

        let allowed = if op.is_ordering() {
            Some(ORDERABLE)
        } else if op.is_pattern() {
            Some(TEXTUAL)
        } else if op.is_arithmetic() {
            Some(NUMERIC)
        } else {
            None
        };

        if let Some(allowed) = allowed {
            expect_class(&self, allowed, op.as_sql())?;
        }
        let right = resolve(&self, other)?;
        if let Some(allowed) = allowed {
            expect_class(&right, allowed, op.as_sql())?;
        }
        expect_comparable(&self, &right, op.as_sql())?;

        Ok(Self(Node::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }))
    }

    /// Creates an equality expression. Comparing with NULL yields `IS NULL`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeMismatch`] for operands of different type
    /// classes or values the left side's type cannot encode.
    pub fn eq(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Eq, other.into_operand())
    }

    /// Creates an inequality expression. Comparing with NULL yields
    /// `IS NOT NULL`.
    ///
    /// # Errors
    ///
    /// See [`Expr::eq`].
    pub fn not_eq(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::NotEq, other.into_operand())
    }

    /// Creates a less-than expression.
    ///
    /// # Errors
    ///
    /// Ordering requires numeric, text or temporal operands; NULL is
    /// rejected with [`BuildError::NullOperand`].
    pub fn lt(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Lt, other.into_operand())
    }

    /// Creates a less-than-or-equal expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::lt`].
    pub fn lt_eq(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::LtEq, other.into_operand())
    }

    /// Creates a greater-than expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::lt`].
    pub fn gt(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Gt, other.into_operand())
    }

    /// Creates a greater-than-or-equal expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::lt`].
    pub fn gt_eq(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::GtEq, other.into_operand())
    }

    /// Creates a LIKE expression.
    ///
    /// # Errors
    ///
    /// Pattern matching requires text operands.
    pub fn like(self, pattern: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Like, pattern.into_operand())
    }

    /// Creates a NOT LIKE expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::like`].
    pub fn not_like(self, pattern: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::NotLike, pattern.into_operand())
    }

    /// Creates a case-insensitive LIKE. Dialects without `ILIKE` compare
    /// lower-cased operands instead.
    ///
    /// # Errors
    ///
    /// See [`Expr::like`].
    pub fn ilike(self, pattern: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::ILike, pattern.into_operand())
    }

    /// Creates a case-insensitive NOT LIKE.
    ///
    /// # Errors
    ///
    /// See [`Expr::like`].
    pub fn not_ilike(self, pattern: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::NotILike, pattern.into_operand())
    }

    /// Adds two numeric operands.
    ///
    /// # Errors
    ///
    /// Arithmetic requires numeric operands.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Add, other.into_operand())
    }

    /// Subtracts two numeric operands.
    ///
    /// # Errors
    ///
    /// See [`Expr::add`].
    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Sub, other.into_operand())
    }

    /// Multiplies two numeric operands.
    ///
    /// # Errors
    ///
    /// See [`Expr::add`].
    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Mul, other.into_operand())
    }

    /// Divides two numeric operands.
    ///
    /// # Errors
    ///
    /// See [`Expr::add`].
    #[allow(clippy::should_implement_trait)]
    pub fn div(self, other: impl IntoOperand) -> Result<Self> {
        self.binary(BinaryOp::Div, other.into_operand())
    }

    /// Negates a numeric expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::add`].
    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Result<Self> {
        expect_class(&self, NUMERIC, "-")?;
        Ok(Self(Node::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }))
    }

    /// Creates an IS NULL expression. Registers no parameter.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self(Node::Unary {
            op: UnaryOp::IsNull,
            operand: Box::new(self),
        })
    }

    /// Creates an IS NOT NULL expression. Registers no parameter.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self(Node::Unary {
            op: UnaryOp::IsNotNull,
            operand: Box::new(self),
        })
    }

    fn between_impl(self, low: Operand, high: Operand, negated: bool) -> Result<Self> {
        let operator = if negated { "NOT BETWEEN" } else { "BETWEEN" };
        if self.is_null_literal() || low.is_null() || high.is_null() {
            return Err(BuildError::NullOperand { operator });
        }
        expect_class(&self, ORDERABLE, operator)?;
        let low = resolve(&self, low)?;
        let high = resolve(&self, high)?;
        expect_comparable(&self, &low, operator)?;
        expect_comparable(&self, &high, operator)?;
        Ok(Self(Node::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        }))
    }

    /// Creates a BETWEEN expression (inclusive on both ends).
    ///
    /// # Errors
    ///
    /// See [`Expr::lt`].
    pub fn between(self, low: impl IntoOperand, high: impl IntoOperand) -> Result<Self> {
        self.between_impl(low.into_operand(), high.into_operand(), false)
    }

    /// Creates a NOT BETWEEN expression.
    ///
    /// # Errors
    ///
    /// See [`Expr::lt`].
    pub fn not_between(self, low: impl IntoOperand, high: impl IntoOperand) -> Result<Self> {
        self.between_impl(low.into_operand(), high.into_operand(), true)
    }

    fn in_list_impl<I>(self, values: I, negated: bool) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        let operator = if negated { "NOT IN" } else { "IN" };
        if self.is_null_literal() {
            return Err(BuildError::NullOperand { operator });
        }
        let list = values
            .into_iter()
            .map(|value| {
                let operand = value.into_operand();
                if operand.is_null() {
                    return Err(BuildError::NullOperand { operator });
                }
                let item = resolve(&self, operand)?;
                expect_comparable(&self, &item, operator)?;
                Ok(item)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(Node::InList {
            expr: Box::new(self),
            list,
            negated,
        }))
    }

    /// Creates an IN expression. An empty list is statically false.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NullOperand`] for NULL elements and
    /// [`BuildError::TypeMismatch`] for elements of another type class.
    pub fn in_list<I>(self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        self.in_list_impl(values, false)
    }

    /// Creates a NOT IN expression. An empty list is statically true.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_list`].
    pub fn not_in_list<I>(self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        self.in_list_impl(values, true)
    }

    fn in_select_impl(self, query: Select, negated: bool) -> Result<Self> {
        let operator = if negated { "NOT IN" } else { "IN" };
        let classes = query.output_classes();
        if classes.len() != 1 {
            return Err(BuildError::ProjectionMismatch {
                left: 1,
                right: classes.len(),
            });
        }
        expect_same_class(&self, classes[0], "subquery", operator)?;
        Ok(Self(Node::InSelect {
            expr: Box::new(self),
            query: Box::new(query),
            negated,
        }))
    }

    /// Creates `expr IN (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ProjectionMismatch`] unless the subquery
    /// projects exactly one column, and [`BuildError::TypeMismatch`] when
    /// that column has another type class.
    pub fn in_select(self, query: Select) -> Result<Self> {
        self.in_select_impl(query, false)
    }

    /// Creates `expr NOT IN (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_select`].
    pub fn not_in_select(self, query: Select) -> Result<Self> {
        self.in_select_impl(query, true)
    }

    fn quantified(self, op: BinaryOp, quantifier: Quantifier, query: Select) -> Result<Self> {
        let operator = op.as_sql();
        if !op.is_comparison() {
            return Err(BuildError::TypeMismatch {
                context: format!("{operator} {} (SELECT ...)", quantifier.as_sql()),
                expected: String::from("comparison operator"),
                found: String::from(operator),
            });
        }
        if self.is_null_literal() {
            return Err(BuildError::NullOperand { operator });
        }
        if op.is_ordering() {
            expect_class(&self, ORDERABLE, operator)?;
        }
        let classes = query.output_classes();
        if classes.len() != 1 {
            return Err(BuildError::ProjectionMismatch {
                left: 1,
                right: classes.len(),
            });
        }
        expect_same_class(&self, classes[0], "subquery", operator)?;
        Ok(Self(Node::Quantified {
            expr: Box::new(self),
            op,
            quantifier,
            query: Box::new(query),
        }))
    }

    /// Creates `expr <op> ANY (SELECT ...)`, true when the comparison holds
    /// for some row of the subquery.
    ///
    /// # Errors
    ///
    /// `op` must be a comparison (`=`, `!=`, `<`, `<=`, `>`, `>=`); the
    /// subquery must project one column of the same type class.
    pub fn cmp_any(self, op: BinaryOp, query: Select) -> Result<Self> {
        self.quantified(op, Quantifier::Any, query)
    }

    /// Creates `expr <op> ALL (SELECT ...)`, true when the comparison holds
    /// for every row of the subquery.
    ///
    /// # Errors
    ///
    /// See [`Expr::cmp_any`].
    pub fn cmp_all(self, op: BinaryOp, query: Select) -> Result<Self> {
        self.quantified(op, Quantifier::All, query)
    }

    fn connective<I>(exprs: I, operator: &'static str, conjunction: bool) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut parts = vec![];
        for expr in exprs {
            expect_class(&expr, PREDICATE, operator)?;
            match expr.0 {
                Node::And(inner) if conjunction => parts.extend(inner),
                Node::Or(inner) if !conjunction => parts.extend(inner),
                other => parts.push(Self(other)),
            }
        }
        Ok(Self(if conjunction {
            Node::And(parts)
        } else {
            Node::Or(parts)
        }))
    }

    /// Joins predicates with AND. Nested AND chains are flattened and an
    /// empty input is statically true.
    ///
    /// # Errors
    ///
    /// Every input must be boolean.
    pub fn all<I>(exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        Self::connective(exprs, "AND", true)
    }

    /// Joins predicates with OR. Nested OR chains are flattened and an
    /// empty input is statically false.
    ///
    /// # Errors
    ///
    /// Every input must be boolean.
    pub fn any<I>(exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        Self::connective(exprs, "OR", false)
    }

    /// Creates an AND expression.
    ///
    /// # Errors
    ///
    /// Both sides must be boolean.
    pub fn and(self, other: Self) -> Result<Self> {
        Self::all([self, other])
    }

    /// Creates an OR expression.
    ///
    /// # Errors
    ///
    /// Both sides must be boolean.
    pub fn or(self, other: Self) -> Result<Self> {
        Self::any([self, other])
    }

    /// Negates the expression with NOT.
    ///
    /// # Errors
    ///
    /// The operand must be boolean.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Result<Self> {
        expect_class(&self, PREDICATE, "NOT")?;
        Ok(Self(Node::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }))
    }

    /// Orders ascending by this expression.
    #[must_use]
    pub fn asc(self) -> OrderBy {
        OrderBy::asc(self)
    }

    /// Orders descending by this expression.
    #[must_use]
    pub fn desc(self) -> OrderBy {
        OrderBy::desc(self)
    }
}

/// `EXISTS (SELECT ...)`.
#[must_use]
pub fn exists(query: Select) -> Expr {
    Expr(Node::Exists {
        query: Box::new(query),
        negated: false,
    })
}

/// `NOT EXISTS (SELECT ...)`.
#[must_use]
pub fn not_exists(query: Select) -> Expr {
    Expr(Node::Exists {
        query: Box::new(query),
        negated: true,
    })
}

macro_rules! column_binary_ops {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// See the method of the same name on [`Expr`].
            #[allow(clippy::should_implement_trait)]
            pub fn $name(&self, other: impl IntoOperand) -> Result<Expr> {
                Expr::from(self).$name(other)
            }
        )+
    };
}

impl Column {
    column_binary_ops!(
        /// `column = other`; NULL becomes `IS NULL`.
        eq,
        /// `column != other`; NULL becomes `IS NOT NULL`.
        not_eq,
        /// `column < other`.
        lt,
        /// `column <= other`.
        lt_eq,
        /// `column > other`.
        gt,
        /// `column >= other`.
        gt_eq,
        /// `column LIKE pattern`.
        like,
        /// `column NOT LIKE pattern`.
        not_like,
        /// Case-insensitive `LIKE`.
        ilike,
        /// Case-insensitive `NOT LIKE`.
        not_ilike,
        /// `column + other`.
        add,
        /// `column - other`.
        sub,
        /// `column * other`.
        mul,
        /// `column / other`.
        div,
    );

    /// `column IS NULL`.
    #[must_use]
    pub fn is_null(&self) -> Expr {
        Expr::from(self).is_null()
    }

    /// `column IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(&self) -> Expr {
        Expr::from(self).is_not_null()
    }

    /// `column BETWEEN low AND high`.
    ///
    /// # Errors
    ///
    /// See [`Expr::between`].
    pub fn between(&self, low: impl IntoOperand, high: impl IntoOperand) -> Result<Expr> {
        Expr::from(self).between(low, high)
    }

    /// `column NOT BETWEEN low AND high`.
    ///
    /// # Errors
    ///
    /// See [`Expr::between`].
    pub fn not_between(&self, low: impl IntoOperand, high: impl IntoOperand) -> Result<Expr> {
        Expr::from(self).not_between(low, high)
    }

    /// `column IN (...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_list`].
    pub fn in_list<I>(&self, values: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        Expr::from(self).in_list(values)
    }

    /// `column NOT IN (...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_list`].
    pub fn not_in_list<I>(&self, values: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        Expr::from(self).not_in_list(values)
    }

    /// `column IN (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_select`].
    pub fn in_select(&self, query: Select) -> Result<Expr> {
        Expr::from(self).in_select(query)
    }

    /// `column NOT IN (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::in_select`].
    pub fn not_in_select(&self, query: Select) -> Result<Expr> {
        Expr::from(self).not_in_select(query)
    }

    /// `column <op> ANY (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::cmp_any`].
    pub fn cmp_any(&self, op: BinaryOp, query: Select) -> Result<Expr> {
        Expr::from(self).cmp_any(op, query)
    }

    /// `column <op> ALL (SELECT ...)`.
    ///
    /// # Errors
    ///
    /// See [`Expr::cmp_any`].
    pub fn cmp_all(&self, op: BinaryOp, query: Select) -> Result<Expr> {
        Expr::from(self).cmp_all(op, query)
    }

    /// Orders ascending by this column.
    #[must_use]
    pub fn asc(&self) -> OrderBy {
        OrderBy::asc(self)
    }

    /// Orders descending by this column.
    #[must_use]
    pub fn desc(&self) -> OrderBy {
        OrderBy::desc(self)
    }
}
