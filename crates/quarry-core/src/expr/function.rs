//! Aggregate and scalar SQL functions.

use super::ops::{expect_class, expect_comparable, resolve, NUMERIC, ORDERABLE, TEXTUAL};
use super::{Expr, IntoOperand, Node};
use crate::error::{BuildError, Result};
use crate::schema::TypeClass;
use crate::value::SqlValue;

/// SQL functions known to the expression builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// `COUNT`; without arguments it renders `COUNT(*)`.
    Count,
    /// `SUM`
    Sum,
    /// `AVG`
    Avg,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
    /// `COALESCE`
    Coalesce,
    /// `LOWER`
    Lower,
    /// `UPPER`
    Upper,
    /// `GREATEST`
    Greatest,
    /// `LEAST`
    Least,
    /// `STRING_AGG`
    StringAgg,
    /// `ARRAY_AGG`
    ArrayAgg,
}

impl Function {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Coalesce => "COALESCE",
            Self::Lower => "LOWER",
            Self::Upper => "UPPER",
            Self::Greatest => "GREATEST",
            Self::Least => "LEAST",
            Self::StringAgg => "STRING_AGG",
            Self::ArrayAgg => "ARRAY_AGG",
        }
    }

    /// Returns whether the result has the type of the first argument.
    pub(crate) const fn preserves_type(self) -> bool {
        matches!(
            self,
            Self::Min | Self::Max | Self::Coalesce | Self::Greatest | Self::Least
        )
    }

    pub(crate) fn result_class(self, args: &[Expr]) -> Option<TypeClass> {
        match self {
            Self::Count | Self::Sum | Self::Avg => Some(TypeClass::Numeric),
            Self::Lower | Self::Upper | Self::StringAgg => Some(TypeClass::Text),
            Self::ArrayAgg => Some(TypeClass::Json),
            Self::Min | Self::Max | Self::Coalesce | Self::Greatest | Self::Least => {
                args.iter().find_map(Expr::class)
            }
        }
    }
}

fn call(func: Function, args: Vec<Expr>, distinct: bool) -> Expr {
    Expr(Node::Function {
        func,
        args,
        distinct,
    })
}

/// `COUNT(*)`
#[must_use]
pub fn count_all() -> Expr {
    call(Function::Count, vec![], false)
}

/// `COUNT(expr)`
#[must_use]
pub fn count(expr: impl Into<Expr>) -> Expr {
    call(Function::Count, vec![expr.into()], false)
}

/// `COUNT(DISTINCT expr)`
#[must_use]
pub fn count_distinct(expr: impl Into<Expr>) -> Expr {
    call(Function::Count, vec![expr.into()], true)
}

/// `MIN(expr)`
#[must_use]
pub fn min(expr: impl Into<Expr>) -> Expr {
    call(Function::Min, vec![expr.into()], false)
}

/// `MAX(expr)`
#[must_use]
pub fn max(expr: impl Into<Expr>) -> Expr {
    call(Function::Max, vec![expr.into()], false)
}

/// `SUM(expr)`
///
/// # Errors
///
/// The argument must be numeric.
pub fn sum(expr: impl Into<Expr>) -> Result<Expr> {
    let expr = expr.into();
    expect_class(&expr, NUMERIC, "SUM")?;
    Ok(call(Function::Sum, vec![expr], false))
}

/// `AVG(expr)`
///
/// # Errors
///
/// The argument must be numeric.
pub fn avg(expr: impl Into<Expr>) -> Result<Expr> {
    let expr = expr.into();
    expect_class(&expr, NUMERIC, "AVG")?;
    Ok(call(Function::Avg, vec![expr], false))
}

/// `LOWER(expr)`
///
/// # Errors
///
/// The argument must be text.
pub fn lower(expr: impl Into<Expr>) -> Result<Expr> {
    let expr = expr.into();
    expect_class(&expr, TEXTUAL, "LOWER")?;
    Ok(call(Function::Lower, vec![expr], false))
}

/// `UPPER(expr)`
///
/// # Errors
///
/// The argument must be text.
pub fn upper(expr: impl Into<Expr>) -> Result<Expr> {
    let expr = expr.into();
    expect_class(&expr, TEXTUAL, "UPPER")?;
    Ok(call(Function::Upper, vec![expr], false))
}

/// `COALESCE(expr, fallback)`. A raw fallback is encoded with the type of
/// `expr`.
///
/// # Errors
///
/// Returns [`BuildError::TypeMismatch`](crate::BuildError::TypeMismatch)
/// when the fallback has another type class or does not fit the type.
pub fn coalesce(expr: impl Into<Expr>, fallback: impl IntoOperand) -> Result<Expr> {
    let expr = expr.into();
    let fallback = resolve(&expr, fallback.into_operand())?;
    expect_comparable(&expr, &fallback, "COALESCE")?;
    Ok(call(Function::Coalesce, vec![expr, fallback], false))
}

fn extremum<I>(func: Function, first: Expr, others: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: IntoOperand,
{
    let operator = func.name();
    expect_class(&first, ORDERABLE, operator)?;
    let mut args = vec![];
    for other in others {
        let operand = other.into_operand();
        if operand.is_null() {
            return Err(BuildError::NullOperand { operator });
        }
        let arg = resolve(&first, operand)?;
        expect_comparable(&first, &arg, operator)?;
        args.push(arg);
    }
    if args.is_empty() {
        return Ok(first);
    }
    args.insert(0, first);
    Ok(call(func, args, false))
}

/// `GREATEST(first, others...)`. Raw values are encoded with the type of
/// `first`; without others the result is `first` itself.
///
/// # Errors
///
/// Arguments must be orderable, of one type class and not NULL.
pub fn greatest<I>(first: impl Into<Expr>, others: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: IntoOperand,
{
    extremum(Function::Greatest, first.into(), others)
}

/// `LEAST(first, others...)`.
///
/// # Errors
///
/// See [`greatest`].
pub fn least<I>(first: impl Into<Expr>, others: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: IntoOperand,
{
    extremum(Function::Least, first.into(), others)
}

/// `STRING_AGG(expr, separator)`: concatenates the group's values.
///
/// The separator is bound as a parameter, except on dialects whose
/// aggregate only takes a `SEPARATOR` string literal (MySQL). It is a
/// `'static` string so that it never carries user input.
///
/// # Errors
///
/// The argument must be text.
pub fn string_agg(expr: impl Into<Expr>, separator: &'static str) -> Result<Expr> {
    let expr = expr.into();
    expect_class(&expr, TEXTUAL, "STRING_AGG")?;
    let separator = Expr(Node::Literal {
        value: SqlValue::Text(String::from(separator)),
        ty: None,
    });
    Ok(call(Function::StringAgg, vec![expr, separator], false))
}

/// `ARRAY_AGG(expr)`: collects the group's values into an array, or a
/// JSON array where the engine has no array type.
#[must_use]
pub fn array_agg(expr: impl Into<Expr>) -> Expr {
    call(Function::ArrayAgg, vec![expr.into()], false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::schema::{ColumnDef, SqlType, Table};
    use crate::value::SqlValue;

    fn sales() -> Table {
        Table::builder("sales")
            .column(ColumnDef::new("region", SqlType::Text))
            .column(ColumnDef::new("amount", SqlType::Integer).nullable())
            .build()
            .unwrap()
    }

    #[test]
    fn test_aggregate_classes() {
        let t = sales();
        let amount = t.col("amount").unwrap();
        assert_eq!(count_all().class(), Some(TypeClass::Numeric));
        assert_eq!(sum(&amount).unwrap().class(), Some(TypeClass::Numeric));
        assert_eq!(
            max(t.col("region").unwrap()).class(),
            Some(TypeClass::Text)
        );
        assert!(sum(t.col("region").unwrap()).is_err());
        assert!(upper(&amount).is_err());
    }

    #[test]
    fn test_min_max_encode_against_argument_type() {
        let amount = sales().col("amount").unwrap();
        // MAX keeps the INTEGER codec, so out-of-range values still fail.
        assert!(matches!(
            max(&amount).gt(i64::MAX).unwrap_err(),
            BuildError::ValueOutOfRange { .. }
        ));
        assert!(count(&amount).gt(i64::MAX).is_ok());
    }

    #[test]
    fn test_coalesce_fallback() {
        let amount = sales().col("amount").unwrap();
        let expr = coalesce(&amount, 0).unwrap();
        assert_eq!(expr.param_count(), 1);
        let Node::Function { args, .. } = &expr.0 else {
            panic!("expected function");
        };
        assert!(matches!(
            args[1].0,
            Node::Literal {
                value: SqlValue::Int(0),
                ty: Some(SqlType::Integer),
            }
        ));
        assert!(coalesce(&amount, "none").is_err());
    }

    #[test]
    fn test_distinct_flag() {
        let region = sales().col("region").unwrap();
        assert!(matches!(
            count_distinct(region).0,
            Node::Function {
                func: Function::Count,
                distinct: true,
                ..
            }
        ));
    }

    #[test]
    fn test_greatest_and_least() {
        let t = sales();
        let amount = t.col("amount").unwrap();
        let expr = greatest(&amount, [10, 20]).unwrap();
        assert_eq!(expr.param_count(), 2);
        assert_eq!(expr.class(), Some(TypeClass::Numeric));
        // The INTEGER codec of the first argument applies to the rest.
        assert!(matches!(
            least(&amount, [i64::MAX]).unwrap_err(),
            BuildError::ValueOutOfRange { .. }
        ));
        assert!(matches!(
            greatest(&amount, [t.col("region").unwrap()]).unwrap_err(),
            BuildError::TypeMismatch { .. }
        ));
        assert_eq!(
            least(&amount, [None::<i32>]).unwrap_err(),
            BuildError::NullOperand { operator: "LEAST" }
        );
        let single = greatest(&amount, Vec::<i32>::new()).unwrap();
        assert!(matches!(single.0, Node::Column(_)));
    }

    #[test]
    fn test_group_aggregates() {
        let t = sales();
        let joined = string_agg(t.col("region").unwrap(), ", ").unwrap();
        assert_eq!(joined.class(), Some(TypeClass::Text));
        assert_eq!(joined.param_count(), 1);
        assert!(string_agg(t.col("amount").unwrap(), ",").is_err());
        assert_eq!(
            array_agg(t.col("amount").unwrap()).class(),
            Some(TypeClass::Json)
        );
    }
}
