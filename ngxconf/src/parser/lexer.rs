//! Lexer for nginx configuration files
//!
//! Key features:
//! - Whitespace (including newlines) only separates words
//! - `{`, `}` and `;` are always tokens of their own
//! - `"..."` and `'...'` quoted strings, which may span lines
//! - `#` starts a comment that runs to the end of the line

use crate::parser::ast::{Quoted, QuoteStyle};
use logos::{Lexer, Logos, Span};
use std::fmt;
use thiserror::Error;

/// Byte range of a token in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

/// 1-based line and column; columns count characters, not bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A token with its location in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Location,
    pub position: Position,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: impl Into<Location>, position: Position) -> Self {
        Self {
            value,
            span: span.into(),
            position,
        }
    }
}

/// Lexing failures reported by logos callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    UnexpectedChar,
    UnterminatedQuote,
}

/// Token types for nginx configuration syntax
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("{")]
    BlockOpen,

    #[token("}")]
    BlockClose,

    #[token(";")]
    Semicolon,

    /// Comment text without the leading `#`
    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].trim_end_matches('\r').to_string())]
    Comment(String),

    /// Quoted string with escapes resolved
    #[token("\"", |lex| lex_quoted(lex, QuoteStyle::Double))]
    #[token("'", |lex| lex_quoted(lex, QuoteStyle::Single))]
    Quoted(Quoted),

    /// Bare word. A `#` or quote only has meaning at the start of a word.
    #[regex(r#"[^ \t\r\n\f{};#"'][^ \t\r\n\f{};]*"#, |lex| lex.slice().to_string())]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::BlockOpen => write!(f, "{{"),
            Token::BlockClose => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comment(s) => write!(f, "#{}", s),
            Token::Quoted(q) => {
                let d = q.style.delimiter();
                write!(f, "{}{}{}", d, q.value, d)
            }
            Token::Word(s) => write!(f, "{}", s),
        }
    }
}

/// Scans the body of a quoted string after its opening delimiter.
///
/// `\<delimiter>` and `\\` are unescaped, every other backslash sequence is
/// kept as written so regular expressions pass through untouched.
fn lex_quoted(lex: &mut Lexer<'_, Token>, style: QuoteStyle) -> Result<Quoted, LexErrorKind> {
    let delimiter = style.delimiter();
    let mut value = String::new();
    let mut chars = lex.remainder().char_indices();

    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            lex.bump(i + c.len_utf8());
            return Ok(Quoted { value, style });
        }
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some((_, next)) if next == delimiter || next == '\\' => value.push(next),
            Some((_, next)) => {
                value.push('\\');
                value.push(next);
            }
            None => break,
        }
    }

    lex.bump(lex.remainder().len());
    Err(LexErrorKind::UnterminatedQuote)
}

/// Syntax errors raised while tokenizing or building the tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected character at {position}")]
    UnexpectedChar { position: Position, span: Location },

    #[error("unterminated quoted string starting at {position}")]
    UnterminatedQuote { position: Position, span: Location },

    #[error("unexpected \"}}\" at {position}")]
    UnmatchedClose { position: Position, span: Location },

    #[error("unexpected end of input, block opened at {position} is not closed")]
    UnclosedBlock { position: Position, span: Location },

    #[error("blocks nested deeper than {limit} levels at {position}")]
    TooDeep {
        limit: usize,
        position: Position,
        span: Location,
    },

    #[error("directive without a name at {position}")]
    EmptyDirective { position: Position, span: Location },

    #[error("directive \"{name}\" at {position} is not terminated by \";\" or \"{{\"")]
    UnterminatedDirective {
        name: String,
        position: Position,
        span: Location,
    },
}

impl SyntaxError {
    /// Where the offending construct starts
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedChar { position, .. }
            | Self::UnterminatedQuote { position, .. }
            | Self::UnmatchedClose { position, .. }
            | Self::UnclosedBlock { position, .. }
            | Self::TooDeep { position, .. }
            | Self::EmptyDirective { position, .. }
            | Self::UnterminatedDirective { position, .. } => *position,
        }
    }

    /// Byte range of the offending construct
    pub fn span(&self) -> Location {
        match self {
            Self::UnexpectedChar { span, .. }
            | Self::UnterminatedQuote { span, .. }
            | Self::UnmatchedClose { span, .. }
            | Self::UnclosedBlock { span, .. }
            | Self::TooDeep { span, .. }
            | Self::EmptyDirective { span, .. }
            | Self::UnterminatedDirective { span, .. } => *span,
        }
    }
}

/// Maps increasing byte offsets to line/column positions
struct LineCursor<'a> {
    source: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> LineCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position { line: 1, column: 1 },
        }
    }

    /// Advance to `offset`, which must not be behind the previous one
    fn position(&mut self, offset: usize) -> Position {
        debug_assert!(offset >= self.offset, "offsets must not go backwards");
        for c in self.source[self.offset..offset].chars() {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
        self.offset = offset;
        self.position
    }
}

/// Lexer result type
pub type LexResult = Result<Vec<Spanned<Token>>, SyntaxError>;

/// Tokenize nginx configuration source
pub fn tokenize(source: &str) -> LexResult {
    let mut lines = LineCursor::new(source);
    let mut tokens = Vec::new();
    let mut open = Vec::new();
    let mut unmatched = false;

    for (result, span) in Token::lexer(source).spanned() {
        let span = Location::from(span);
        let position = lines.position(span.start);

        match result {
            Ok(token) => {
                match token {
                    Token::BlockOpen => open.push((span, position)),
                    Token::BlockClose => unmatched |= open.pop().is_none(),
                    _ => {}
                }
                tokens.push(Spanned::new(token, span, position));
            }
            Err(LexErrorKind::UnterminatedQuote) => {
                return Err(SyntaxError::UnterminatedQuote { position, span });
            }
            Err(LexErrorKind::UnexpectedChar) => {
                return Err(SyntaxError::UnexpectedChar { position, span });
            }
        }
    }

    // A stray "}" is reported by the tree builder at its own position.
    if !unmatched {
        if let Some((span, position)) = open.pop() {
            return Err(SyntaxError::UnclosedBlock { position, span });
        }
    }

    Ok(tokens)
}
