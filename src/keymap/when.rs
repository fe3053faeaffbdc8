//! When-clause expressions for conditional keybindings
//!
//! A when-clause is a boolean expression over context keys, written in the familiar
//! `editorFocus && !inputFocus` syntax. Parsing produces a small tagged tree whose
//! canonical string form is used for every equality comparison; evaluation is left
//! to a [`ContextMatcher`](super::context::ContextMatcher).
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | primary
//! primary := "(" or ")" | key [ ("==" | "!=") value | "=~" /regex/flags ]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::WhenParseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WhenClause {
    /// The key is set to a truthy value
    Defined(String),
    /// The key is unset or falsy
    Not(String),
    Equals(String, String),
    NotEquals(String, String),
    Regex {
        key: String,
        pattern: String,
        ignore_case: bool,
    },
    NotRegex {
        key: String,
        pattern: String,
        ignore_case: bool,
    },
    And(Vec<WhenClause>),
    Or(Vec<WhenClause>),
}

impl WhenClause {
    pub fn defined(key: impl Into<String>) -> Self {
        WhenClause::Defined(key.into())
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        WhenClause::Equals(key.into(), value.into())
    }

    /// Parse a when-clause expression
    pub fn parse(input: &str) -> Result<WhenClause, WhenParseError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let clause = parser.or_expr()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(clause)
    }

    /// The logical negation, pushed down to the leaves
    pub fn negate(self) -> WhenClause {
        match self {
            WhenClause::Defined(key) => WhenClause::Not(key),
            WhenClause::Not(key) => WhenClause::Defined(key),
            WhenClause::Equals(key, value) => WhenClause::NotEquals(key, value),
            WhenClause::NotEquals(key, value) => WhenClause::Equals(key, value),
            WhenClause::Regex {
                key,
                pattern,
                ignore_case,
            } => WhenClause::NotRegex {
                key,
                pattern,
                ignore_case,
            },
            WhenClause::NotRegex {
                key,
                pattern,
                ignore_case,
            } => WhenClause::Regex {
                key,
                pattern,
                ignore_case,
            },
            WhenClause::And(terms) => {
                WhenClause::Or(terms.into_iter().map(WhenClause::negate).collect())
            }
            WhenClause::Or(terms) => {
                WhenClause::And(terms.into_iter().map(WhenClause::negate).collect())
            }
        }
    }

    /// Canonical string form, used for all equality comparisons
    pub fn normalize(&self) -> String {
        self.to_string()
    }
}

/// Compare two optional when-clauses by their canonical form
pub fn when_equal(a: Option<&WhenClause>, b: Option<&WhenClause>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.normalize() == b.normalize(),
        _ => false,
    }
}

impl PartialEq for WhenClause {
    fn eq(&self, other: &Self) -> bool {
        self.normalize() == other.normalize()
    }
}

impl Eq for WhenClause {}

impl fmt::Display for WhenClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhenClause::Defined(key) => write!(f, "{}", key),
            WhenClause::Not(key) => write!(f, "!{}", key),
            WhenClause::Equals(key, value) => write!(f, "{} == {}", key, quote(value)),
            WhenClause::NotEquals(key, value) => write!(f, "{} != {}", key, quote(value)),
            WhenClause::Regex {
                key,
                pattern,
                ignore_case,
            } => write!(
                f,
                "{} =~ /{}/{}",
                key,
                pattern,
                if *ignore_case { "i" } else { "" }
            ),
            WhenClause::NotRegex {
                key,
                pattern,
                ignore_case,
            } => write!(
                f,
                "!{} =~ /{}/{}",
                key,
                pattern,
                if *ignore_case { "i" } else { "" }
            ),
            WhenClause::And(terms) => {
                let parts: Vec<String> = terms
                    .iter()
                    .map(|term| match term {
                        WhenClause::Or(_) => format!("({})", term),
                        _ => term.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" && "))
            }
            WhenClause::Or(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", parts.join(" || "))
            }
        }
    }
}

/// Quote a value so the tokenizer reads it back unchanged
///
/// Single quotes are preferred. A value holding `'` but no `"` is wrapped in
/// double quotes; otherwise the quote and backslash characters are escaped.
fn quote(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value.replace('\\', "\\\\"));
    }
    if !value.contains('"') {
        return format!("\"{}\"", value.replace('\\', "\\\\"));
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

impl FromStr for WhenClause {
    type Err = WhenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WhenClause::parse(s)
    }
}

impl TryFrom<String> for WhenClause {
    type Error = WhenParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WhenClause::parse(&value)
    }
}

impl From<WhenClause> for String {
    fn from(clause: WhenClause) -> Self {
        clause.normalize()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Regex { pattern: String, ignore_case: bool },
    Bang,
    Eq,
    NotEq,
    Match,
    And,
    Or,
    LParen,
    RParen,
}

fn is_ident_char(c: char) -> bool {
    !c.is_whitespace() && !"()!=&|'\"~".contains(c)
}

fn tokenize(input: &str) -> Result<Vec<Token>, WhenParseError> {
    let error = |reason: &str| WhenParseError {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::NotEq);
                i += 2;
            }
            '!' => {
                tokens.push(Token::Bang);
                i += 1;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Eq);
                i += 2;
            }
            '=' if next == Some('~') => {
                tokens.push(Token::Match);
                i += 2;
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                if chars.get(i) != Some(&'/') {
                    return Err(error("expected /regex/ after =~"));
                }
                i += 1;
                let mut pattern = String::new();
                loop {
                    match chars.get(i) {
                        None => return Err(error("unterminated regex")),
                        Some('\\') => {
                            pattern.push('\\');
                            if let Some(escaped) = chars.get(i + 1) {
                                pattern.push(*escaped);
                            }
                            i += 2;
                        }
                        Some('/') => {
                            i += 1;
                            break;
                        }
                        Some(other) => {
                            pattern.push(*other);
                            i += 1;
                        }
                    }
                }
                let mut ignore_case = false;
                while let Some(flag) = chars.get(i).filter(|c| c.is_ascii_alphabetic()) {
                    ignore_case |= *flag == 'i';
                    i += 1;
                }
                tokens.push(Token::Regex {
                    pattern,
                    ignore_case,
                });
            }
            '\'' | '"' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(error("unterminated string")),
                        // Only `\\` and an escaped quote are escapes
                        Some('\\')
                            if matches!(chars.get(i + 1), Some(&n) if n == quote || n == '\\') =>
                        {
                            value.push(chars[i + 1]);
                            i += 2;
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            value.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if is_ident_char(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(error(&format!("unexpected character `{}`", other))),
        }
    }

    if tokens.is_empty() {
        return Err(error("empty expression"));
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> WhenParseError {
        WhenParseError {
            input: self.input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn or_expr(&mut self) -> Result<WhenClause, WhenParseError> {
        let mut terms = vec![self.and_expr()?];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            terms.push(self.and_expr()?);
        }
        Ok(combine(terms, false))
    }

    fn and_expr(&mut self) -> Result<WhenClause, WhenParseError> {
        let mut terms = vec![self.unary()?];
        while self.peek() == Some(&Token::And) {
            self.advance();
            terms.push(self.unary()?);
        }
        Ok(combine(terms, true))
    }

    fn unary(&mut self) -> Result<WhenClause, WhenParseError> {
        if self.peek() == Some(&Token::Bang) {
            self.advance();
            return Ok(self.unary()?.negate());
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<WhenClause, WhenParseError> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                if self.advance() != Some(Token::RParen) {
                    return Err(self.error("expected `)`"));
                }
                Ok(inner)
            }
            Some(Token::Ident(key)) => match self.peek() {
                Some(Token::Eq) => {
                    self.advance();
                    Ok(WhenClause::Equals(key, self.value()?))
                }
                Some(Token::NotEq) => {
                    self.advance();
                    Ok(WhenClause::NotEquals(key, self.value()?))
                }
                Some(Token::Match) => {
                    self.advance();
                    match self.advance() {
                        Some(Token::Regex {
                            pattern,
                            ignore_case,
                        }) => Ok(WhenClause::Regex {
                            key,
                            pattern,
                            ignore_case,
                        }),
                        _ => Err(self.error("expected regex")),
                    }
                }
                _ => Ok(WhenClause::Defined(key)),
            },
            Some(_) => Err(self.error("expected context key")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn value(&mut self) -> Result<String, WhenParseError> {
        match self.advance() {
            Some(Token::Ident(value)) | Some(Token::Str(value)) => Ok(value),
            _ => Err(self.error("expected value")),
        }
    }
}

/// Collapse a term list into a single clause, flattening nested operators of the same kind
fn combine(mut terms: Vec<WhenClause>, conjunction: bool) -> WhenClause {
    if terms.len() == 1 {
        return terms.remove(0);
    }
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            WhenClause::And(inner) if conjunction => flat.extend(inner),
            WhenClause::Or(inner) if !conjunction => flat.extend(inner),
            term => flat.push(term),
        }
    }
    if conjunction {
        WhenClause::And(flat)
    } else {
        WhenClause::Or(flat)
    }
}
