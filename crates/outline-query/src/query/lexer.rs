//! Lexer (tokenizer) for search queries.
//!
//! Tokenization never fails. Anything the parser cannot use surfaces later as
//! an unexpected token.

/// Kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word or a double-quoted phrase.
    Text,
    /// A prefixed filter (`@key=value`, `d:>2`, `child:term`, ...).
    Filter,
    /// Explicit `+` between two operands.
    And,
    /// `|`
    Or,
    /// Leading `-`.
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// End of input; always the last token.
    Eof,
}

/// A `+`/`-` written directly before a relationship filter (`+child:x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadSign {
    Plus,
    Minus,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Unquoted text for `Text`, the raw filter (prefix included) for
    /// `Filter`, the symbol for operators, empty for `Eof`.
    pub text: String,
    /// Byte position where the token starts (0-indexed).
    pub pos: usize,
    /// Lead sign of a relationship filter.
    pub sign: Option<LeadSign>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
            sign: None,
        }
    }
}

/// Prefixes that start a filter token. Longer prefixes sharing a start with a
/// shorter one come first.
pub(crate) const FILTER_PREFIXES: [&str; 9] = [
    "parent*:",
    "parent:",
    "child*:",
    "child:",
    "children:",
    "sibling:",
    "d:",
    "@",
    "~",
];

/// Relationship prefixes that accept a `+`/`-` quantifier sign.
const SIGNED_PREFIXES: [&str; 4] = ["parent*:", "child*:", "child:", "sibling:"];

/// Returns true if `input` starts with a filter prefix.
pub(crate) fn starts_with_filter(input: &str) -> bool {
    FILTER_PREFIXES.iter().any(|p| input.starts_with(p))
}

/// Returns true if `input` starts with a relationship prefix that takes a sign.
pub(crate) fn starts_with_signed_filter(input: &str) -> bool {
    SIGNED_PREFIXES.iter().any(|p| input.starts_with(p))
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')' || c == '|'
}

/// Lexer for tokenizing search queries.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Reads the interior of a double-quoted run, the opening quote already
    /// consumed. `\"` and `\\` are unescaped; a missing closing quote ends the
    /// run at end of input.
    fn read_quoted(&mut self, out: &mut String) {
        while let Some(c) = self.next_char() {
            match c {
                '"' => return,
                '\\' => {
                    if let Some(escaped) = self.next_char() {
                        out.push(escaped);
                    }
                }
                _ => out.push(c),
            }
        }
    }

    /// Reads up to the next delimiter. Quoted segments are kept whole, without
    /// their quotes.
    fn read_run(&mut self) -> String {
        let mut run = String::new();
        while let Some(c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            self.next_char();
            if c == '"' {
                self.read_quoted(&mut run);
            } else {
                run.push(c);
            }
        }
        run
    }

    fn filter(&mut self, start: usize, sign: Option<LeadSign>) -> Token {
        let text = self.read_run();
        Token {
            kind: TokenKind::Filter,
            text,
            pos: start,
            sign,
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let c = self.peek()?;
        let start = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                Token::new(TokenKind::LParen, "(", start)
            }
            ')' => {
                self.next_char();
                Token::new(TokenKind::RParen, ")", start)
            }
            '|' => {
                self.next_char();
                Token::new(TokenKind::Or, "|", start)
            }
            '+' | '-' => {
                self.next_char();
                let sign = if c == '+' {
                    LeadSign::Plus
                } else {
                    LeadSign::Minus
                };
                if starts_with_signed_filter(self.rest()) {
                    self.filter(start, Some(sign))
                } else if c == '+' {
                    Token::new(TokenKind::And, "+", start)
                } else {
                    Token::new(TokenKind::Not, "-", start)
                }
            }
            '"' => {
                self.next_char();
                let mut text = String::new();
                self.read_quoted(&mut text);
                Token::new(TokenKind::Text, text, start)
            }
            _ if starts_with_filter(self.rest()) => self.filter(start, None),
            _ => {
                let word = self.read_run();
                Token::new(TokenKind::Text, word, start)
            }
        };

        Some(token)
    }

    /// Collects all tokens, terminated by [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.input.len()));
        tracing::trace!(count = tokens.len(), "tokenized query");
        tokens
    }
}

/// Splits `input` into tokens. The result always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_tokenize_words() {
        assert_eq!(
            kinds("task project"),
            vec![TokenKind::Text, TokenKind::Text, TokenKind::Eof]
        );
        assert_eq!(texts("task project"), vec!["task", "project", ""]);
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("(a | b) + -c"),
            vec![
                TokenKind::LParen,
                TokenKind::Text,
                TokenKind::Or,
                TokenKind::Text,
                TokenKind::RParen,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_parens_split_words() {
        assert_eq!(texts("(a|b)"), vec!["(", "a", "|", "b", ")", ""]);
    }

    #[test]
    fn test_tokenize_quoted_phrase() {
        let tokens = tokenize(r#""buy milk" now"#);
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, "buy milk");
        assert_eq!(tokens[1].text, "now");
        assert_eq!(tokens[1].pos, 11);
    }

    #[test]
    fn test_tokenize_quoted_escapes() {
        let tokens = tokenize(r#""say \"hi\"""#);
        assert_eq!(tokens[0].text, r#"say "hi""#);
    }

    #[test]
    fn test_tokenize_unterminated_quote_runs_to_end() {
        let tokens = tokenize(r#""open ended"#);
        assert_eq!(tokens[0].text, "open ended");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_tokenize_filters() {
        for input in [
            "@status=done",
            "d:>2",
            "children:>=3",
            "~tsk",
            "parent:project",
            "parent*:project",
            "child:task",
            "child*:task",
            "sibling:note",
        ] {
            let tokens = tokenize(input);
            assert_eq!(tokens[0].kind, TokenKind::Filter, "{input}");
            assert_eq!(tokens[0].text, input);
            assert_eq!(tokens[0].sign, None);
        }
    }

    #[test]
    fn test_tokenize_filter_with_quoted_value() {
        let tokens = tokenize(r#"@status="in progress" x"#);
        assert_eq!(tokens[0].kind, TokenKind::Filter);
        assert_eq!(tokens[0].text, "@status=in progress");
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_tokenize_lead_sign_on_relationship() {
        let tokens = tokenize("+child:task -sibling:x");
        assert_eq!(tokens[0].kind, TokenKind::Filter);
        assert_eq!(tokens[0].text, "child:task");
        assert_eq!(tokens[0].sign, Some(LeadSign::Plus));
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].kind, TokenKind::Filter);
        assert_eq!(tokens[1].sign, Some(LeadSign::Minus));
        assert_eq!(tokens[1].pos, 12);
    }

    #[test]
    fn test_tokenize_sign_before_plain_filter_is_operator() {
        assert_eq!(
            kinds("-d:>2"),
            vec![TokenKind::Not, TokenKind::Filter, TokenKind::Eof]
        );
        assert_eq!(
            kinds("-parent:x"),
            vec![TokenKind::Not, TokenKind::Filter, TokenKind::Eof]
        );
        assert_eq!(
            kinds("a +@x"),
            vec![
                TokenKind::Text,
                TokenKind::And,
                TokenKind::Filter,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_filter_prefix_must_lead() {
        // "kid:" is a word, "children" without colon is a word.
        assert_eq!(kinds("kid:x children"), vec![TokenKind::Text, TokenKind::Text, TokenKind::Eof]);
    }

    #[test]
    fn test_tokenize_positions_are_bytes() {
        let tokens = tokenize("café | x");
        assert_eq!(tokens[1].pos, 6);
        assert_eq!(tokens[2].pos, 8);
        assert_eq!(tokens[3].pos, 9);
    }
}
