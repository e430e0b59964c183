//! Recursive descent parser for search queries.

use super::ast::{ComparisonOp, DateField, FilterExpr, Quantifier};
use super::dates::DateValue;
use super::error::{QueryError, QueryResult};
use super::lexer::{self, LeadSign, Token, TokenKind};

/// Parser for search queries.
///
/// # Grammar
///
/// ```text
/// query    ::= or_expr EOF
/// or_expr  ::= and_expr ("|" and_expr)*
/// and_expr ::= unary ("+"? unary)*
/// unary    ::= "-" unary | primary
/// primary  ::= "(" or_expr ")" | FILTER | TEXT
/// ```
///
/// Two operands with no operator between them are ANDed.
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `-` (NOT) - unary
/// 2. `+` or adjacency (AND) - binary, left-associative
/// 3. `|` (OR) - binary, left-associative
///
/// # Example
///
/// ```
/// use outline_query_rs::{FilterExpr, QueryParser};
///
/// let filter = QueryParser::parse("task d:>0").unwrap();
/// assert!(matches!(filter, FilterExpr::And(_, _)));
///
/// assert_eq!(QueryParser::parse("").unwrap(), FilterExpr::AlwaysMatch);
/// ```
pub struct QueryParser {
    tokens: Vec<Token>,
    position: usize,
}

impl QueryParser {
    /// Parses a query string into a [`FilterExpr`].
    ///
    /// An empty or whitespace-only query yields [`FilterExpr::AlwaysMatch`].
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] describing the first syntax or value error;
    /// no partial tree is produced.
    pub fn parse(input: &str) -> QueryResult<FilterExpr> {
        let tokens = lexer::tokenize(input);
        if tokens.first().map(|t| t.kind) == Some(TokenKind::Eof) {
            return Ok(FilterExpr::AlwaysMatch);
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };
        let filter = parser.parse_or_expr()?;

        let trailing = parser.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(QueryError::unexpected_token(
                trailing.text.clone(),
                trailing.pos,
            ));
        }

        Ok(filter)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> &Token {
        // The token list always ends with Eof and the cursor never moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// True if the current token can begin an operand.
    fn at_operand_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Text | TokenKind::Filter | TokenKind::Not | TokenKind::LParen
        )
    }

    /// Parses OR expressions: `and_expr ("|" and_expr)*`
    fn parse_or_expr(&mut self) -> QueryResult<FilterExpr> {
        let mut left = self.parse_and_expr()?;

        while self.check(TokenKind::Or) {
            let op = self.advance();
            if !self.at_operand_start() {
                return Err(QueryError::missing_operand(op.text, op.pos));
            }
            let right = self.parse_and_expr()?;
            left = FilterExpr::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary ("+"? unary)*`
    fn parse_and_expr(&mut self) -> QueryResult<FilterExpr> {
        let mut left = self.parse_unary()?;

        loop {
            if self.check(TokenKind::And) {
                let op = self.advance();
                if !self.at_operand_start() {
                    return Err(QueryError::missing_operand(op.text, op.pos));
                }
            } else if !self.at_operand_start() {
                break;
            }
            let right = self.parse_unary()?;
            left = FilterExpr::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"-" unary | primary`
    fn parse_unary(&mut self) -> QueryResult<FilterExpr> {
        if self.check(TokenKind::Not) {
            let op = self.advance();
            if !self.at_operand_start() {
                return Err(QueryError::missing_operand(op.text, op.pos));
            }
            let inner = self.parse_unary()?;
            return Ok(FilterExpr::negate(inner));
        }

        self.parse_primary()
    }

    /// Parses primary expressions: `"(" or_expr ")" | FILTER | TEXT`
    fn parse_primary(&mut self) -> QueryResult<FilterExpr> {
        let token = self.advance();

        match token.kind {
            TokenKind::LParen => {
                let inner = self.parse_or_expr()?;
                if !self.check(TokenKind::RParen) {
                    return Err(QueryError::UnclosedParenthesis {
                        position: token.pos,
                    });
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Text => Ok(FilterExpr::Text(token.text)),
            TokenKind::Filter => parse_filter(&token.text, token.sign),
            TokenKind::Eof => Err(QueryError::UnexpectedEndOfInput),
            TokenKind::And | TokenKind::Or | TokenKind::Not | TokenKind::RParen => {
                Err(QueryError::unexpected_token(token.text, token.pos))
            }
        }
    }
}

/// Parses the raw text of a filter token, prefix included.
fn parse_filter(raw: &str, sign: Option<LeadSign>) -> QueryResult<FilterExpr> {
    let quantifier = match sign {
        Some(LeadSign::Plus) => Quantifier::All,
        Some(LeadSign::Minus) => Quantifier::None,
        None => Quantifier::Some,
    };

    if let Some(rest) = raw.strip_prefix("parent*:") {
        let inner = parse_inner(raw, rest)?;
        Ok(FilterExpr::Ancestor(Box::new(inner), quantifier))
    } else if let Some(rest) = raw.strip_prefix("parent:") {
        let inner = parse_inner(raw, rest)?;
        Ok(FilterExpr::Parent(Box::new(inner)))
    } else if let Some(rest) = raw.strip_prefix("child*:") {
        let inner = parse_inner(raw, rest)?;
        Ok(FilterExpr::Descendant(Box::new(inner), quantifier))
    } else if let Some(rest) = raw.strip_prefix("child:") {
        let inner = parse_inner(raw, rest)?;
        Ok(FilterExpr::Child(Box::new(inner), quantifier))
    } else if let Some(rest) = raw.strip_prefix("sibling:") {
        let inner = parse_inner(raw, rest)?;
        Ok(FilterExpr::Sibling(Box::new(inner), quantifier))
    } else if let Some(rest) = raw.strip_prefix("children:") {
        let (op, count) = parse_count(raw, rest)
            .map_err(|value| QueryError::InvalidChildrenCount { value })?;
        Ok(FilterExpr::Children { op, count })
    } else if let Some(rest) = raw.strip_prefix("d:") {
        let (op, value) =
            parse_count(raw, rest).map_err(|value| QueryError::InvalidDepth { value })?;
        Ok(FilterExpr::Depth { op, value })
    } else if let Some(rest) = raw.strip_prefix('~') {
        if rest.is_empty() {
            return Err(QueryError::empty_filter(raw));
        }
        Ok(FilterExpr::Fuzzy(rest.to_string()))
    } else if let Some(rest) = raw.strip_prefix('@') {
        parse_attribute(raw, rest)
    } else {
        Ok(FilterExpr::Text(raw.to_string()))
    }
}

/// Parses the payload of a relationship filter. A payload that is itself a
/// filter (`+child:@status=done`) nests; anything else is a text term.
fn parse_inner(raw: &str, payload: &str) -> QueryResult<FilterExpr> {
    if payload.is_empty() {
        return Err(QueryError::empty_filter(raw));
    }

    let mut chars = payload.chars();
    let sign = match chars.next() {
        Some('+') => Some(LeadSign::Plus),
        Some('-') => Some(LeadSign::Minus),
        _ => None,
    };
    if let Some(sign) = sign {
        let unsigned = chars.as_str();
        if lexer::starts_with_signed_filter(unsigned) {
            return parse_filter(unsigned, Some(sign));
        }
    }

    if lexer::starts_with_filter(payload) {
        parse_filter(payload, None)
    } else {
        Ok(FilterExpr::Text(payload.to_string()))
    }
}

/// Parses `OP? NUMBER` for `d:` and `children:`. The error carries the
/// rejected text.
fn parse_count(raw: &str, payload: &str) -> Result<(ComparisonOp, usize), String> {
    let (op, number) = ComparisonOp::split_prefix(payload).unwrap_or((ComparisonOp::Eq, payload));
    if number.is_empty() {
        return Err(raw.to_string());
    }
    number
        .parse::<usize>()
        .map(|n| (op, n))
        .map_err(|_| number.to_string())
}

/// Parses `@KEY` or `@KEY OP VALUE`.
fn parse_attribute(raw: &str, payload: &str) -> QueryResult<FilterExpr> {
    let Some(op_start) = payload.find(['=', '!', '<', '>']) else {
        if payload.is_empty() {
            return Err(QueryError::empty_filter(raw));
        }
        return Ok(FilterExpr::Attribute {
            key: payload.to_string(),
            op: None,
            value: String::new(),
        });
    };

    let key = &payload[..op_start];
    if key.is_empty() {
        return Err(QueryError::empty_filter(raw));
    }
    let (op, value) = ComparisonOp::split_prefix(&payload[op_start..]).ok_or_else(|| {
        QueryError::InvalidOperator {
            fragment: raw.to_string(),
        }
    })?;
    if value.is_empty() {
        return Err(QueryError::MissingValue {
            key: key.to_string(),
        });
    }

    if DateValue::has_literal_shape(value) {
        return Ok(date_filter(key, op, DateValue::parse(value)?));
    }
    match op {
        ComparisonOp::Eq | ComparisonOp::Neq => Ok(FilterExpr::Attribute {
            key: key.to_string(),
            op: Some(op),
            value: value.to_string(),
        }),
        _ => Err(QueryError::UnsupportedOperator {
            op,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// `@created` and `@modified` compare item timestamps; any other key compares
/// the attribute value.
fn date_filter(key: &str, op: ComparisonOp, value: DateValue) -> FilterExpr {
    let field = match key {
        "created" => Some(DateField::Created),
        "modified" => Some(DateField::Modified),
        _ => None,
    };
    match field {
        Some(field) => FilterExpr::Date { field, op, value },
        None => FilterExpr::AttributeDate {
            key: key.to_string(),
            op,
            value,
        },
    }
}
