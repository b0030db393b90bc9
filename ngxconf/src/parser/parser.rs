//! Tree builder
//!
//! Single left-to-right pass over the token stream. An explicit stack holds
//! the blocks still being filled. Blocks may nest at most [`MAX_DEPTH`]
//! levels deep; anything deeper is rejected with [`SyntaxError::TooDeep`].

use crate::parser::ast::*;
use crate::parser::lexer::{tokenize, Location, Position, Spanned, SyntaxError, Token};

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest block nesting accepted from source text
pub const MAX_DEPTH: usize = 128;

/// Directive whose name and parameters have been read but not its terminator
struct Pending {
    name: Parameter,
    parameters: Vec<Parameter>,
    span: Location,
    position: Position,
}

/// Block between its `{` and the matching `}`
struct OpenBlock {
    header: Directive,
    span: Location,
    position: Position,
    directives: Vec<Directive>,
}

/// Builds a [`Document`] from tokens
#[derive(Default)]
pub struct TreeBuilder {
    root: Vec<Directive>,
    stack: Vec<OpenBlock>,
    pending: Option<Pending>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one token
    pub fn feed(&mut self, token: Spanned<Token>) -> ParseResult<()> {
        let Spanned {
            value,
            span,
            position,
        } = token;

        match value {
            Token::Comment(_) => {}
            Token::Word(word) => self.push_word(
                Parameter {
                    value: word,
                    style: None,
                },
                span,
                position,
            ),
            Token::Quoted(quoted) => self.push_word(quoted.into(), span, position),
            Token::Semicolon => {
                let directive = self.take_header(span, position)?;
                self.current().push(directive);
            }
            Token::BlockOpen => {
                if self.stack.len() >= MAX_DEPTH {
                    return Err(SyntaxError::TooDeep {
                        limit: MAX_DEPTH,
                        position,
                        span,
                    });
                }
                let header = self.take_header(span, position)?;
                self.stack.push(OpenBlock {
                    header,
                    span,
                    position,
                    directives: Vec::new(),
                });
            }
            Token::BlockClose => {
                if let Some(pending) = self.pending.take() {
                    return Err(pending.unterminated());
                }
                let open = self
                    .stack
                    .pop()
                    .ok_or(SyntaxError::UnmatchedClose { position, span })?;
                let directive = open.header.with_block(Block::new(open.directives));
                self.current().push(directive);
            }
        }

        Ok(())
    }

    /// Finish the document; fails if a directive or block is left open
    pub fn finish(mut self) -> ParseResult<Document> {
        if let Some(pending) = self.pending.take() {
            return Err(pending.unterminated());
        }
        if let Some(open) = self.stack.pop() {
            return Err(SyntaxError::UnclosedBlock {
                position: open.position,
                span: open.span,
            });
        }
        Ok(Document::new(self.root))
    }

    fn push_word(&mut self, word: Parameter, span: Location, position: Position) {
        match &mut self.pending {
            Some(pending) => {
                pending.parameters.push(word);
                pending.span.end = span.end;
            }
            None => {
                self.pending = Some(Pending {
                    name: word,
                    parameters: Vec::new(),
                    span,
                    position,
                });
            }
        }
    }

    /// Close the pending directive at a `;` or `{`
    fn take_header(&mut self, span: Location, position: Position) -> ParseResult<Directive> {
        let pending = self
            .pending
            .take()
            .ok_or(SyntaxError::EmptyDirective { position, span })?;
        Ok(Directive {
            name: pending.name.value,
            name_style: pending.name.style,
            parameters: pending.parameters,
            block: None,
        })
    }

    fn current(&mut self) -> &mut Vec<Directive> {
        match self.stack.last_mut() {
            Some(open) => &mut open.directives,
            None => &mut self.root,
        }
    }
}

impl Pending {
    fn unterminated(self) -> SyntaxError {
        SyntaxError::UnterminatedDirective {
            name: self.name.value,
            position: self.position,
            span: self.span,
        }
    }
}

/// Build a document from an already tokenized source
pub fn parse_tokens(tokens: impl IntoIterator<Item = Spanned<Token>>) -> ParseResult<Document> {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.feed(token)?;
    }
    builder.finish()
}

/// Parse nginx configuration text
pub fn parse(source: &str) -> ParseResult<Document> {
    let document = parse_tokens(tokenize(source)?)?;
    tracing::debug!(
        top_level = document.directives.len(),
        directives = count(&document.directives),
        "parsed configuration"
    );
    Ok(document)
}

fn count(directives: &[Directive]) -> usize {
    directives
        .iter()
        .map(|d| 1 + count(d.children()))
        .sum()
}
