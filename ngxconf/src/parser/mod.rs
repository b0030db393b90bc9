//! Parser module for nginx configuration
//!
//! This module provides the lexer, document tree, and tree builder.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::{tokenize, LexResult, Location, Position, Spanned, SyntaxError, Token};
pub use parser::{parse, parse_tokens, TreeBuilder, MAX_DEPTH};
