//! Human-readable syntax error reports

use crate::parser::SyntaxError;
use ariadne::{Config, Label, Report, ReportKind, Source};

impl SyntaxError {
    fn label(&self) -> &'static str {
        match self {
            Self::UnexpectedChar { .. } => "not valid here",
            Self::UnterminatedQuote { .. } => "quote opened here is never closed",
            Self::UnmatchedClose { .. } => "no block to close",
            Self::UnclosedBlock { .. } => "block opened here",
            Self::TooDeep { .. } => "one block too many",
            Self::EmptyDirective { .. } => "expected a directive name before this",
            Self::UnterminatedDirective { .. } => "add \";\" or a block after this directive",
        }
    }

    /// Render an annotated report pointing into `source`
    pub fn report(&self, source_name: &str, source: &str) -> String {
        let span = self.span();
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        let range = start..end;

        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (source_name, range.clone()))
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new((source_name, range)).with_message(self.label()))
            .finish()
            .write((source_name, Source::from(source)), &mut out);

        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("{source_name}: {self}"),
        }
    }
}
