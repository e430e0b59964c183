//! Error types for the query parser.

use thiserror::Error;

use super::ast::ComparisonOp;

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while parsing a query.
///
/// Every variant is detected by [`parse_query`](super::parse_query); evaluation
/// itself never fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A token appeared where it is not allowed.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The offending source fragment.
        token: String,
        /// Byte offset of the token in the query.
        position: usize,
    },

    /// The query ended where an operand was required.
    #[error("unexpected end of query")]
    UnexpectedEndOfInput,

    /// An operator has nothing to apply to (`a +`, `-`, `a | `).
    #[error("missing operand after '{operator}' at position {position}")]
    MissingOperand {
        /// The operator lacking an operand.
        operator: String,
        /// Byte offset of the operator.
        position: usize,
    },

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis at position {position}")]
    UnclosedParenthesis {
        /// Byte offset of the `(`.
        position: usize,
    },

    /// A filter prefix with nothing after it (`@`, `~`, `child:`).
    #[error("empty filter: {filter}")]
    EmptyFilter {
        /// The filter fragment as written.
        filter: String,
    },

    /// `d:` value that is not a non-negative integer.
    #[error("invalid depth value: {value}")]
    InvalidDepth {
        /// The rejected value.
        value: String,
    },

    /// `children:` value that is not a non-negative integer.
    #[error("invalid children count: {value}")]
    InvalidChildrenCount {
        /// The rejected value.
        value: String,
    },

    /// An attribute filter with a malformed operator (`@a!b`).
    #[error("invalid operator in filter: {fragment}")]
    InvalidOperator {
        /// The filter fragment as written.
        fragment: String,
    },

    /// An attribute filter with an operator but no value (`@status=`).
    #[error("missing value for attribute '{key}'")]
    MissingValue {
        /// The attribute key.
        key: String,
    },

    /// An ordering operator used with a value that is not a date.
    #[error("operator '{op}' on attribute '{key}' requires a date value, got '{value}'")]
    UnsupportedOperator {
        /// The operator that was used.
        op: ComparisonOp,
        /// The attribute key.
        key: String,
        /// The non-date value.
        value: String,
    },

    /// A string that does not satisfy the date literal grammar.
    #[error("invalid date value: {value} (expected YYYY-MM-DD or [+-]N[hdwmy])")]
    InvalidDate {
        /// The rejected literal.
        value: String,
    },

    /// A regular expression that failed to compile.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern source.
        pattern: String,
        /// The compiler's message.
        message: String,
    },
}

impl QueryError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        QueryError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates a missing operand error.
    pub fn missing_operand(operator: impl Into<String>, position: usize) -> Self {
        QueryError::MissingOperand {
            operator: operator.into(),
            position,
        }
    }

    /// Creates an empty filter error.
    pub fn empty_filter(filter: impl Into<String>) -> Self {
        QueryError::EmptyFilter {
            filter: filter.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        QueryError::InvalidDate {
            value: value.into(),
        }
    }
}
