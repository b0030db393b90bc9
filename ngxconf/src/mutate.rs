//! In-place editing of a parsed document
//!
//! Edits address directives with the same dotted paths as queries. Order of
//! the surrounding directives is always preserved.

use crate::error::{Error, Result};
use crate::parser::{Block, Directive, Document};
use crate::query::{collect_mut, first_mut, QueryPath};

impl Document {
    /// Replace the directives named by the last segment of `path`.
    ///
    /// Only the first block matched by the parent segments is edited. The
    /// replacements take the place of the first existing match, or are
    /// appended when there was none. An empty `directives` removes them.
    pub fn set(&mut self, path: &str, directives: Vec<Directive>) -> Result<()> {
        let query: QueryPath = path.parse()?;
        let count = directives.len();
        let target = self
            .parent_block_mut(query.parent())
            .ok_or_else(|| Error::not_found(query.parent().join(".")))?;
        replace(target, query.leaf(), directives);
        tracing::debug!(path, count, "set directives");
        Ok(())
    }

    /// Remove every directive matching `path`; returns how many were removed
    pub fn remove(&mut self, path: &str) -> Result<usize> {
        self.remove_where(path, |_| true)
    }

    /// Remove the directives matching `path` that satisfy `predicate`
    pub fn remove_where<F>(&mut self, path: &str, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Directive) -> bool,
    {
        let query: QueryPath = path.parse()?;
        let leaf = query.leaf();
        let mut removed = 0;

        let mut strip = |directives: &mut Vec<Directive>| {
            let before = directives.len();
            directives.retain(|d| d.name != leaf || !predicate(d));
            removed += before - directives.len();
        };

        if query.parent().is_empty() {
            strip(&mut self.directives);
        } else {
            let mut parents = Vec::new();
            collect_mut(&mut self.directives, query.parent(), &mut parents);
            for parent in parents {
                if let Some(block) = parent.block.as_mut() {
                    strip(&mut block.directives);
                }
            }
        }

        if removed > 0 {
            tracing::debug!(path, removed, "removed directives");
        }
        Ok(removed)
    }

    /// Append `directive` to the first block matched by `parent`.
    ///
    /// An empty `parent` appends at the top level. A simple directive used as
    /// parent is turned into a block directive.
    pub fn append(&mut self, parent: &str, directive: Directive) -> Result<()> {
        let segments = if parent.is_empty() {
            Vec::new()
        } else {
            parent.parse::<QueryPath>()?.segments().to_vec()
        };
        self.parent_block_mut(&segments)
            .ok_or_else(|| Error::not_found(parent))?
            .push(directive);
        Ok(())
    }

    pub(crate) fn parent_block_mut(&mut self, parent: &[String]) -> Option<&mut Vec<Directive>> {
        if parent.is_empty() {
            return Some(&mut self.directives);
        }
        let directive = first_mut(&mut self.directives, parent)?;
        Some(&mut directive.block.get_or_insert_with(Block::default).directives)
    }
}

/// Put `replacements` where the first `name` was, dropping the rest
pub(crate) fn replace(directives: &mut Vec<Directive>, name: &str, replacements: Vec<Directive>) {
    let at = directives.iter().position(|d| d.name == name);
    directives.retain(|d| d.name != name);
    let at = at.unwrap_or(directives.len());
    directives.splice(at..at, replacements);
}
