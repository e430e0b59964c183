//! Search query language for outlines.
//!
//! A query is parsed once into a [`FilterExpr`] and then evaluated against
//! any number of items.
//!
//! # Supported Syntax
//!
//! ## Text
//! - `word` - Case-insensitive substring of the item text
//! - `"two words"` - Quoted phrase
//! - `~tsk` - Fuzzy (in-order subsequence) match
//!
//! ## Attributes and Dates
//! - `@key` - Attribute exists
//! - `@key=value`, `@key!=value` - Attribute equals / differs
//! - `@key>-7d`, `@key<=2025-01-01` - Attribute compared as a date
//! - `@created>-1w`, `@modified=2025-10-10` - Item timestamps
//!
//! Dates are `YYYY-MM-DD` or a relative offset `[+-]N` followed by `h`, `d`,
//! `w`, `m` or `y`. Without a sign the offset points into the past.
//!
//! ## Structure
//! - `d:>2` - Depth (roots are 0); operators `= != > >= < <=`, default `=`
//! - `children:>=3` - Number of direct children
//!
//! ## Relationships
//! - `parent:term` - Immediate parent matches
//! - `parent*:term` - Some ancestor matches
//! - `child:term` - Some direct child matches
//! - `child*:term` - Some descendant matches
//! - `sibling:term` - Some sibling matches
//!
//! Prefix a relationship (other than `parent:`) with `+` to require that all
//! related items match, or with `-` to require that none do. The term may
//! itself be a filter: `+child:@status=done`.
//!
//! ## Boolean Operators
//! - `a b` or `a + b` - AND
//! - `a | b` - OR
//! - `-a` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use outline_query_rs::{get_matching_items, parse_query, Item, Outline};
//!
//! let mut outline = Outline::new();
//! let project = outline.push_root(Item::new("Project"));
//! outline.push_child(project, Item::new("task").with_attribute("status", "done"));
//! outline.push_child(project, Item::new("another task"));
//!
//! let expr = parse_query("task -@status=done").unwrap();
//! let texts: Vec<_> = get_matching_items(&outline, &expr)
//!     .into_iter()
//!     .map(|item| item.text())
//!     .collect();
//! assert_eq!(texts, vec!["another task"]);
//! ```

mod ast;
mod dates;
mod error;
mod evaluator;
mod explain;
mod lexer;
mod parser;

pub use ast::{ComparisonOp, DateField, FilterExpr, Quantifier, RegexPattern};
pub use dates::{DateUnit, DateValue};
pub use error::{QueryError, QueryResult};
pub use evaluator::fuzzy_match_positions;
pub use explain::{debug_match, expression_string, format_debug_info, MatchDebug};
pub use lexer::{tokenize, LeadSign, Token, TokenKind};
pub use parser::QueryParser;

use crate::outline::{ItemRef, Outline};

/// Parses a query string.
///
/// Empty input yields [`FilterExpr::AlwaysMatch`].
///
/// # Errors
///
/// Returns the first [`QueryError`] encountered.
pub fn parse_query(query: &str) -> QueryResult<FilterExpr> {
    match QueryParser::parse(query) {
        Ok(expr) => {
            tracing::debug!(query, %expr, "parsed query");
            Ok(expr)
        }
        Err(err) => {
            tracing::debug!(query, error = %err, "query rejected");
            Err(err)
        }
    }
}

/// Every item of `outline` matching `expr`, in traversal order.
pub fn get_matching_items<'a>(outline: &'a Outline, expr: &FilterExpr) -> Vec<ItemRef<'a>> {
    let matches: Vec<_> = outline
        .all_items()
        .into_iter()
        .filter(|item| expr.matches(*item))
        .collect();
    tracing::debug!(total = outline.len(), matched = matches.len(), "evaluated query");
    matches
}

/// The first item of `outline` (in traversal order) matching `expr`.
pub fn get_first_matching_item<'a>(
    outline: &'a Outline,
    expr: &FilterExpr,
) -> Option<ItemRef<'a>> {
    outline
        .all_items()
        .into_iter()
        .find(|item| expr.matches(*item))
}

#[cfg(test)]
mod evaluator_tests;
