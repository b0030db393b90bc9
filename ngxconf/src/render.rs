//! Serializer
//!
//! Indentation is regenerated from the nesting depth. Parameters keep the
//! quotes they were written with and gain double quotes only when they
//! could not be read back as a single word.

use crate::parser::{needs_quoting, Directive, Document, Parameter, QuoteStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output formatting options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Spaces per nesting level
    pub indent: usize,

    /// Indent with one tab per level instead of spaces
    pub use_tabs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            use_tabs: false,
        }
    }
}

impl RenderOptions {
    fn unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent)
        }
    }
}

/// Render with default options
pub fn render(doc: &Document) -> String {
    render_with(doc, &RenderOptions::default())
}

pub fn render_with(doc: &Document, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_directives(&mut out, &doc.directives, 0, &options.unit());
    out
}

/// Render one directive, including its block, as if it were top-level
pub fn render_directive(directive: &Directive, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_directives(&mut out, std::slice::from_ref(directive), 0, &options.unit());
    out
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

fn write_directives(out: &mut String, directives: &[Directive], depth: usize, unit: &str) {
    for (i, directive) in directives.iter().enumerate() {
        // Separate top-level blocks from their neighbours.
        if depth == 0 && i > 0 && (directive.is_block() || directives[i - 1].is_block()) {
            out.push('\n');
        }

        push_indent(out, depth, unit);
        write_word(out, &directive.name, directive.name_style);
        for param in &directive.parameters {
            out.push(' ');
            write_param(out, param);
        }

        match &directive.block {
            None => out.push_str(";\n"),
            Some(block) => {
                out.push_str(" {\n");
                write_directives(out, &block.directives, depth + 1, unit);
                push_indent(out, depth, unit);
                out.push_str("}\n");
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize, unit: &str) {
    for _ in 0..depth {
        out.push_str(unit);
    }
}

fn write_param(out: &mut String, param: &Parameter) {
    write_word(out, &param.value, param.style);
}

fn write_word(out: &mut String, value: &str, style: Option<QuoteStyle>) {
    match style.or_else(|| needs_quoting(value).then_some(QuoteStyle::Double)) {
        None => out.push_str(value),
        Some(style) => write_quoted(out, value, style),
    }
}

/// Escape so that the lexer reads back exactly `value`
fn write_quoted(out: &mut String, value: &str, style: QuoteStyle) {
    let delimiter = style.delimiter();
    out.push(delimiter);

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == delimiter {
            out.push('\\');
            out.push(c);
        } else if c == '\\' && chars.peek().is_none_or(|&n| n == delimiter || n == '\\') {
            out.push_str("\\\\");
        } else {
            out.push(c);
        }
    }

    out.push(delimiter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Block};

    #[test]
    fn test_render_layout() {
        let doc = parse(
            "user nginx; worker_processes auto;\nevents{worker_connections 1024;}\nhttp { server { listen 80; location / { root /srv; } } }",
        )
        .unwrap();
        let expected = "\
user nginx;
worker_processes auto;

events {
    worker_connections 1024;
}

http {
    server {
        listen 80;
        location / {
            root /srv;
        }
    }
}
";
        assert_eq!(render(&doc), expected);
    }

    #[test]
    fn test_render_preserves_quotes() {
        let doc = parse(r#"add_header X-Test 'single' "double" bare;"#).unwrap();
        assert_eq!(render(&doc), "add_header X-Test 'single' \"double\" bare;\n");
    }

    #[test]
    fn test_render_quotes_when_required() {
        let directive = Directive::new("server_name").with_params([
            Parameter {
                value: "a b".to_string(),
                style: None,
            },
            Parameter::new(""),
            Parameter::new("x;y"),
        ]);
        let doc = Document::new(vec![directive]);
        assert_eq!(render(&doc), "server_name \"a b\" \"\" \"x;y\";\n");
    }

    #[test]
    fn test_render_keeps_quoted_names() {
        let doc = parse("map $http_user_agent $bot { default 0; '~*bot' 1; \"~crawl\" 1; }").unwrap();
        assert_eq!(
            render(&doc),
            "map $http_user_agent $bot {\n    default 0;\n    '~*bot' 1;\n    \"~crawl\" 1;\n}\n"
        );
    }

    #[test]
    fn test_render_escapes() {
        let doc = parse(r#"set $re "\d+ \"quoted\" end\\";"#).unwrap();
        assert_eq!(doc.directives[0].parameters[1], r#"\d+ "quoted" end\"#);
        let text = render(&doc);
        assert_eq!(text, "set $re \"\\d+ \\\"quoted\\\" end\\\\\";\n");
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_render_tricky_backslashes_round_trip() {
        for value in [r"\", r"\\", r"a\", r#"\""#, r"\\d", r"\'"] {
            for style in [QuoteStyle::Double, QuoteStyle::Single] {
                let doc = Document::new(vec![
                    Directive::new("set").with_params([Parameter::quoted(value, style)]),
                ]);
                assert_eq!(parse(&render(&doc)).unwrap(), doc, "value {value:?} {style:?}");
            }
        }
    }

    #[test]
    fn test_render_empty_block_and_options() {
        let doc = Document::new(vec![
            Directive::new("events").with_block(Block::default()),
            Directive::new("http").with_block(Block::new(vec![Directive::new("sendfile").with_params(["on"])])),
        ]);
        let options = RenderOptions {
            indent: 2,
            use_tabs: false,
        };
        assert_eq!(render_with(&doc, &options), "events {\n}\n\nhttp {\n  sendfile on;\n}\n");

        let tabs = RenderOptions {
            use_tabs: true,
            ..RenderOptions::default()
        };
        assert_eq!(render_with(&doc, &tabs), "events {\n}\n\nhttp {\n\tsendfile on;\n}\n");
    }

    #[test]
    fn test_render_directive() {
        let doc = parse("server { if ($scheme = http) { return 301 https://$host$request_uri; } }").unwrap();
        let redirect = doc.find_one("server.if").unwrap();
        assert_eq!(
            render_directive(redirect, &RenderOptions::default()),
            "if ($scheme = http) {\n    return 301 https://$host$request_uri;\n}\n"
        );
    }

    #[test]
    fn test_display_matches_render() {
        let doc = parse("events { worker_connections 512; }").unwrap();
        assert_eq!(doc.to_string(), render(&doc));
    }
}
