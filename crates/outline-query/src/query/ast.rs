//! Abstract Syntax Tree (AST) for search queries.

use std::fmt;

use regex::Regex;

use super::dates::DateValue;
use super::error::{QueryError, QueryResult};

/// Comparison operator used by numeric, attribute and date filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `=`
    Eq,
    /// `!=`
    Neq,
}

impl ComparisonOp {
    /// Returns the operator's source form.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "!=",
        }
    }

    /// Evaluates `lhs op rhs`.
    pub fn compare<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Gte => lhs >= rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Lte => lhs <= rhs,
            ComparisonOp::Eq => lhs == rhs,
            ComparisonOp::Neq => lhs != rhs,
        }
    }

    /// Splits a leading operator off `input`.
    ///
    /// Two-character operators win over their one-character prefixes.
    pub fn split_prefix(input: &str) -> Option<(ComparisonOp, &str)> {
        const OPERATORS: [(&str, ComparisonOp); 6] = [
            (">=", ComparisonOp::Gte),
            ("<=", ComparisonOp::Lte),
            ("!=", ComparisonOp::Neq),
            (">", ComparisonOp::Gt),
            ("<", ComparisonOp::Lt),
            ("=", ComparisonOp::Eq),
        ];
        OPERATORS
            .iter()
            .find_map(|(symbol, op)| input.strip_prefix(symbol).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How many members of a related set must satisfy the inner filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    /// At least one member matches.
    #[default]
    Some,
    /// Every member matches.
    All,
    /// No member matches.
    None,
}

impl Quantifier {
    pub fn name(self) -> &'static str {
        match self {
            Quantifier::Some => "some",
            Quantifier::All => "all",
            Quantifier::None => "none",
        }
    }
}

/// Which item timestamp a [`FilterExpr::Date`] filter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Created,
    Modified,
}

impl DateField {
    pub fn name(self) -> &'static str {
        match self {
            DateField::Created => "created",
            DateField::Modified => "modified",
        }
    }
}

/// A compiled regular expression compared by its source pattern.
#[derive(Debug, Clone)]
pub struct RegexPattern(Regex);

impl RegexPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidRegex`] if the pattern does not compile.
    pub fn new(pattern: &str) -> QueryResult<Self> {
        Regex::new(pattern)
            .map(RegexPattern)
            .map_err(|e| QueryError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RegexPattern {}

/// A parsed search query.
///
/// The tree is immutable once built and evaluation never mutates the outline,
/// so one expression can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// Matches every item (the empty query).
    AlwaysMatch,

    /// Case-insensitive substring of the item text.
    Text(String),

    /// Case-insensitive subsequence of the item text (`~term`).
    Fuzzy(String),

    /// Regular expression over the item text. Built programmatically only.
    Regex(RegexPattern),

    /// Attribute existence (`op` is `None`) or string (in)equality.
    Attribute {
        key: String,
        op: Option<ComparisonOp>,
        value: String,
    },

    /// Attribute value interpreted as a date.
    AttributeDate {
        key: String,
        op: ComparisonOp,
        value: DateValue,
    },

    /// Distance from the root (`d:>2`).
    Depth { op: ComparisonOp, value: usize },

    /// Number of direct children (`children:>=3`).
    Children { op: ComparisonOp, count: usize },

    /// Creation or modification timestamp (`@created>-7d`).
    Date {
        field: DateField,
        op: ComparisonOp,
        value: DateValue,
    },

    /// The immediate parent matches (`parent:`).
    Parent(Box<FilterExpr>),

    /// Quantified over the parent chain (`parent*:`).
    Ancestor(Box<FilterExpr>, Quantifier),

    /// Quantified over direct children (`child:`).
    Child(Box<FilterExpr>, Quantifier),

    /// Quantified over the whole subtree (`child*:`).
    Descendant(Box<FilterExpr>, Quantifier),

    /// Quantified over the other children of the same parent (`sibling:`).
    Sibling(Box<FilterExpr>, Quantifier),

    /// Logical AND of two filters.
    And(Box<FilterExpr>, Box<FilterExpr>),

    /// Logical OR of two filters.
    Or(Box<FilterExpr>, Box<FilterExpr>),

    /// Logical NOT of a filter.
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    /// Creates an AND filter from two filters.
    ///
    /// # Example
    ///
    /// ```
    /// use outline_query_rs::FilterExpr;
    ///
    /// let filter = FilterExpr::and(FilterExpr::text("a"), FilterExpr::text("b"));
    /// assert!(matches!(filter, FilterExpr::And(_, _)));
    /// ```
    pub fn and(left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR filter from two filters.
    pub fn or(left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT filter from another filter.
    pub fn negate(inner: FilterExpr) -> Self {
        FilterExpr::Not(Box::new(inner))
    }

    pub fn text(term: impl Into<String>) -> Self {
        FilterExpr::Text(term.into())
    }

    pub fn fuzzy(term: impl Into<String>) -> Self {
        FilterExpr::Fuzzy(term.into())
    }

    /// Creates a regex filter.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidRegex`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> QueryResult<Self> {
        RegexPattern::new(pattern).map(FilterExpr::Regex)
    }

    /// Creates an attribute-date filter from a date literal.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] if `literal` is not a date literal.
    pub fn attribute_date(
        key: impl Into<String>,
        op: ComparisonOp,
        literal: &str,
    ) -> QueryResult<Self> {
        Ok(FilterExpr::AttributeDate {
            key: key.into(),
            op,
            value: DateValue::parse(literal)?,
        })
    }

    /// Creates a created/modified date filter from a date literal.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] if `literal` is not a date literal.
    pub fn date(field: DateField, op: ComparisonOp, literal: &str) -> QueryResult<Self> {
        Ok(FilterExpr::Date {
            field,
            op,
            value: DateValue::parse(literal)?,
        })
    }
}

/// Compact single-line form, for logs and error messages.
impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::AlwaysMatch => write!(f, "AlwaysMatch"),
            FilterExpr::Text(term) => write!(f, "Text({term:?})"),
            FilterExpr::Fuzzy(term) => write!(f, "Fuzzy({term:?})"),
            FilterExpr::Regex(pattern) => write!(f, "Regex({:?})", pattern.as_str()),
            FilterExpr::Attribute { key, op: None, .. } => write!(f, "Attribute({key})"),
            FilterExpr::Attribute {
                key,
                op: Some(op),
                value,
            } => write!(f, "Attribute({key} {op} {value:?})"),
            FilterExpr::AttributeDate { key, op, value } => {
                write!(f, "AttributeDate({key} {op} {value})")
            }
            FilterExpr::Depth { op, value } => write!(f, "Depth({op} {value})"),
            FilterExpr::Children { op, count } => write!(f, "Children({op} {count})"),
            FilterExpr::Date { field, op, value } => {
                write!(f, "Date({} {op} {value})", field.name())
            }
            FilterExpr::Parent(inner) => write!(f, "Parent({inner})"),
            FilterExpr::Ancestor(inner, q) => write!(f, "Ancestor[{}]({inner})", q.name()),
            FilterExpr::Child(inner, q) => write!(f, "Child[{}]({inner})", q.name()),
            FilterExpr::Descendant(inner, q) => write!(f, "Descendant[{}]({inner})", q.name()),
            FilterExpr::Sibling(inner, q) => write!(f, "Sibling[{}]({inner})", q.name()),
            FilterExpr::And(left, right) => write!(f, "And({left}, {right})"),
            FilterExpr::Or(left, right) => write!(f, "Or({left}, {right})"),
            FilterExpr::Not(inner) => write!(f, "Not({inner})"),
        }
    }
}
