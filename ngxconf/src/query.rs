//! Dotted path queries
//!
//! `server.listen` names a `listen` directive directly inside a top-level
//! `server` block. Every segment but the last must name a block directive;
//! a branch that runs into a simple directive early just stops matching.

use crate::error::{Error, Result};
use crate::parser::{Directive, Document};
use std::fmt;
use std::str::FromStr;

/// A parsed query path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPath {
    segments: Vec<String>,
}

impl QueryPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name matched by the last segment
    pub fn leaf(&self) -> &str {
        // Construction guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    /// Every segment but the last; empty for a single-segment path
    pub fn parent(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl FromStr for QueryPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Collect every match below `directives`, in document order
pub(crate) fn collect<'a>(
    directives: &'a [Directive],
    segments: &[String],
    out: &mut Vec<&'a Directive>,
) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    for directive in directives.iter().filter(|d| d.name == *head) {
        if rest.is_empty() {
            out.push(directive);
        } else {
            collect(directive.children(), rest, out);
        }
    }
}

/// First match in document order
pub(crate) fn first<'a>(directives: &'a [Directive], segments: &[String]) -> Option<&'a Directive> {
    let (head, rest) = segments.split_first()?;
    directives
        .iter()
        .filter(|d| d.name == *head)
        .find_map(|d| {
            if rest.is_empty() {
                Some(d)
            } else {
                first(d.children(), rest)
            }
        })
}

pub(crate) fn collect_mut<'a>(
    directives: &'a mut [Directive],
    segments: &[String],
    out: &mut Vec<&'a mut Directive>,
) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    for directive in directives.iter_mut().filter(|d| d.name == *head) {
        if rest.is_empty() {
            out.push(directive);
        } else if let Some(block) = directive.block.as_mut() {
            collect_mut(&mut block.directives, rest, out);
        }
    }
}

pub(crate) fn first_mut<'a>(
    directives: &'a mut [Directive],
    segments: &[String],
) -> Option<&'a mut Directive> {
    let (head, rest) = segments.split_first()?;
    for directive in directives.iter_mut().filter(|d| d.name == *head) {
        if rest.is_empty() {
            return Some(directive);
        }
        if let Some(found) = directive
            .block
            .as_mut()
            .and_then(|b| first_mut(&mut b.directives, rest))
        {
            return Some(found);
        }
    }
    None
}

impl Document {
    /// Every directive matching `path`, in document order; empty if none match
    pub fn find(&self, path: &str) -> Result<Vec<&Directive>> {
        let path: QueryPath = path.parse()?;
        Ok(self.resolve(&path))
    }

    /// First directive matching `path` in document order
    pub fn find_one(&self, path: &str) -> Result<&Directive> {
        let query: QueryPath = path.parse()?;
        first(&self.directives, query.segments()).ok_or_else(|| Error::not_found(path))
    }

    /// Mutable access to every directive matching `path`
    pub fn find_mut(&mut self, path: &str) -> Result<Vec<&mut Directive>> {
        let path: QueryPath = path.parse()?;
        let mut out = Vec::new();
        collect_mut(&mut self.directives, path.segments(), &mut out);
        Ok(out)
    }

    /// Resolve an already parsed path
    pub fn resolve(&self, path: &QueryPath) -> Vec<&Directive> {
        let mut out = Vec::new();
        collect(&self.directives, path.segments(), &mut out);
        out
    }

    /// `find_one` for callers that treat absence as normal
    pub(crate) fn lookup(&self, path: &str) -> Option<&Directive> {
        match self.find_one(path) {
            Ok(directive) => Some(directive),
            Err(e) => {
                debug_assert!(e.is_not_found(), "built-in query path rejected: {e}");
                None
            }
        }
    }
}

impl Directive {
    /// Directives matching `path` inside this directive's block
    pub fn find(&self, path: &str) -> Result<Vec<&Directive>> {
        let path: QueryPath = path.parse()?;
        let mut out = Vec::new();
        collect(self.children(), path.segments(), &mut out);
        Ok(out)
    }

    /// First directive matching `path` inside this directive's block
    pub fn find_one(&self, path: &str) -> Result<&Directive> {
        let query: QueryPath = path.parse()?;
        first(self.children(), query.segments()).ok_or_else(|| Error::not_found(path))
    }
}
