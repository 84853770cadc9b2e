//! Error types for statement construction and configuration.

use thiserror::Error;

/// Errors raised while declaring tables or building expressions and
/// statements.
///
/// Every structural problem is reported here, at construction time. A
/// statement that was built successfully always compiles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An operator or value is not valid for the operand's type.
    #[error("type mismatch for {context}: expected {expected}, found {found}")]
    TypeMismatch {
        /// What was being built (operator and operand).
        context: String,
        /// The accepted type(s).
        expected: String,
        /// The type that was supplied.
        found: String,
    },

    /// A value has the right kind but does not fit the column type.
    #[error("value out of range for column {column}: {reason}")]
    ValueOutOfRange {
        /// Qualified column name.
        column: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// NULL was used with an operator that cannot compare against it.
    #[error("NULL is not a valid operand for {operator}")]
    NullOperand {
        /// The SQL operator.
        operator: &'static str,
    },

    /// NULL was assigned to a column declared NOT NULL.
    #[error("column {column} is not nullable")]
    NotNullable {
        /// Qualified column name.
        column: String,
    },

    /// Rows of a multi-row INSERT supply different column sets.
    #[error(
        "insert rows supply different columns: expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    ColumnSetMismatch {
        /// Columns of the first row.
        expected: Vec<String>,
        /// Columns of the offending row.
        found: Vec<String>,
    },

    /// The same column appears twice in one INSERT row.
    #[error("column {column} is assigned more than once in the same row")]
    DuplicateColumn {
        /// Column name.
        column: String,
    },

    /// An UPDATE (or INSERT row) with nothing to assign.
    #[error("no assignments for table {table}")]
    EmptyAssignment {
        /// Target table.
        table: String,
    },

    /// An INSERT with no rows.
    #[error("INSERT into {table} has no rows")]
    EmptyInsert {
        /// Target table.
        table: String,
    },

    /// An expression references a column whose table is not a source of
    /// the statement.
    #[error("column {column} belongs to {table}, which is not a source of this statement")]
    UnboundColumn {
        /// Column name.
        column: String,
        /// Qualifier of the column's table.
        table: String,
    },

    /// A column lookup by name failed.
    #[error("table {table} has no column named {column}")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Requested column name.
        column: String,
    },

    /// A table declaration repeats a column name.
    #[error("table {table} declares column {column} more than once")]
    DuplicateColumnDeclaration {
        /// Table name.
        table: String,
        /// Repeated column name.
        column: String,
    },

    /// A table declaration without columns.
    #[error("table {0} declares no columns")]
    EmptyTable(String),

    /// The same table (or alias) is joined twice.
    #[error("table {table} is already a source of this statement; alias it to join again")]
    DuplicateSource {
        /// Table qualifier.
        table: String,
    },

    /// Projections of combined queries have different widths.
    #[error("projection width mismatch: {left} column(s) vs {right} column(s)")]
    ProjectionMismatch {
        /// Width of the left/outer side.
        left: usize,
        /// Width of the right/inner side.
        right: usize,
    },

    /// A member of a compound select carries its own ordering or paging.
    #[error("ORDER BY, LIMIT and OFFSET are not allowed on a member of a compound select")]
    CompoundMemberClause,

    /// A compound select is ordered by something its result does not
    /// carry.
    #[error("{term} is not a result column of the compound select")]
    CompoundOrderTerm {
        /// Description of the offending term.
        term: String,
    },
}

/// Errors raised while loading a dialect configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid dialect configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The identifier quote would not delimit identifiers.
    #[error("identifier quote {0:?} is not a punctuation character")]
    InvalidQuote(char),
}

/// Result type alias for statement construction.
pub type Result<T> = std::result::Result<T, BuildError>;
