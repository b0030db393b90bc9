//! Document tree for nginx configuration
//!
//! - A [`Document`] is the ordered list of top-level directives
//! - A [`Directive`] is a name, its parameters, and an optional [`Block`]
//! - A [`Block`] is the ordered list of directives between `{` and `}`

use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Delimiter a parameter was quoted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn delimiter(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// Quoted string as produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted {
    pub value: String,
    pub style: QuoteStyle,
}

/// A single directive parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Parameter {
    pub value: String,

    /// Set when the parameter was written quoted, or must be to stay one word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<QuoteStyle>,
}

impl Parameter {
    /// Bare parameter; values that cannot be written bare are double-quoted
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let style = needs_quoting(&value).then_some(QuoteStyle::Double);
        Self { value, style }
    }

    pub fn quoted(value: impl Into<String>, style: QuoteStyle) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_quoted(&self) -> bool {
        self.style.is_some()
    }
}

/// True when `value` would not survive as a single bare word
pub fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.starts_with(['#', '"', '\''])
        || value.contains(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | ';'))
}

impl Deref for Parameter {
    type Target = str;

    fn deref(&self) -> &str {
        &self.value
    }
}

impl PartialEq<str> for Parameter {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for Parameter {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Quoted> for Parameter {
    fn from(q: Quoted) -> Self {
        Self::quoted(q.value, q.style)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Directive {
    /// Directive name (e.g. "server", "listen", "if")
    pub name: String,

    /// Quotes the name was written with, as for a `map` key like `'~*bot'`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_style: Option<QuoteStyle>,

    /// Parameters following the name, in source order
    pub parameters: Vec<Parameter>,

    /// Optional block { ... }
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Block {
    pub directives: Vec<Directive>,
}

/// A parsed configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Document {
    pub directives: Vec<Directive>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        let Parameter { value, style } = Parameter::new(name);
        Self {
            name: value,
            name_style: style,
            parameters: Vec::new(),
            block: None,
        }
    }

    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        self.parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn set_params<I, P>(&mut self, params: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        self.parameters = params.into_iter().map(Into::into).collect();
    }

    /// Parameter values as plain strings
    pub fn params(&self) -> Vec<&str> {
        self.parameters.iter().map(Parameter::as_str).collect()
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(Parameter::as_str)
    }

    pub fn has_param(&self, value: &str) -> bool {
        self.parameters.iter().any(|p| p == value)
    }

    pub fn is_block(&self) -> bool {
        self.block.is_some()
    }

    /// Directives of the owned block; empty for simple directives
    pub fn children(&self) -> &[Directive] {
        self.block
            .as_ref()
            .map(|b| b.directives.as_slice())
            .unwrap_or_default()
    }
}

impl Block {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }
}

impl Document {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_quoting_detection() {
        assert_eq!(Parameter::new("80").style, None);
        assert_eq!(Parameter::new("a b").style, Some(QuoteStyle::Double));
        assert_eq!(Parameter::new("").style, Some(QuoteStyle::Double));
        assert_eq!(Parameter::new("#x").style, Some(QuoteStyle::Double));
        assert_eq!(Parameter::new("a#b").style, None);
        assert_eq!(Parameter::new("{x}").style, Some(QuoteStyle::Double));
    }

    #[test]
    fn test_directive_builders() {
        let d = Directive::new("location")
            .with_params(["/"])
            .with_block(Block::new(vec![Directive::new("root").with_params(["/srv"])]));
        assert!(d.is_block());
        assert_eq!(d.params(), vec!["/"]);
        assert_eq!(d.children()[0].param(0), Some("/srv"));
        assert!(Directive::new("listen").children().is_empty());
    }

    #[test]
    fn test_parameter_compares_with_str() {
        let d = Directive::new("ssl_stapling").with_params(["on"]);
        assert!(d.has_param("on"));
        assert!(d.parameters[0] == "on");
        assert_eq!(d.param(1), None);
    }

    #[test]
    fn test_directive_name_quoting() {
        assert_eq!(Directive::new("listen").name_style, None);
        assert_eq!(Directive::new("a b").name_style, Some(QuoteStyle::Double));
    }
}
