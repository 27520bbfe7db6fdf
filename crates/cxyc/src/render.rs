//! `ariadne`-backed pretty rendering of parse errors, for human-facing
//! output (the `demos/compile_demo.rs` binary). This is deliberately
//! separate from [`cxy_common::diagnostics::ConsoleSink`]: that sink
//! produces the plain `<file>:<row>:<col>: <severity>: <msg>` plus
//! caret-line format asserted on directly in tests, while this renderer is
//! the fancier multi-line/underline presentation meant for a terminal.

use ariadne::{Label, Report, ReportKind, Source};

use cxy_parser::ParseError;

/// Render every parse error in `errors` to stderr using `ariadne`, labeling
/// each with its byte-offset span in `source`. Returns `true` iff at least
/// one error was rendered.
pub fn render_parse_errors(filename: &str, source: &str, errors: &[ParseError]) -> bool {
    let mut rendered_any = false;
    for error in errors {
        rendered_any = true;
        let start = error.location.start.byte_offset as usize;
        let end = (error.location.end.byte_offset as usize).max(start + 1).min(source.len().max(start + 1));
        let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
            .with_message(format!("{}: {}", error.kind.name(), error.message))
            .with_label(Label::new(start..end).with_message(&error.message))
            .finish()
            .eprint(Source::from(source));
        let _ = filename;
    }
    rendered_any
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxy_common::{Location, Position, TokenKind};
    use std::sync::Arc;

    #[test]
    fn render_reports_presence_of_errors() {
        let loc = Location::new(Arc::from("a.cxy"), Position::new(1, 1, 0), Position::new(1, 4, 3));
        let errors = vec![ParseError::new(
            cxy_parser::ParseErrorKind::MissingToken,
            loc,
            "expected ')'",
            TokenKind::Eof,
        )];
        assert!(render_parse_errors("a.cxy", "foo", &errors));
        assert!(!render_parse_errors("a.cxy", "foo", &[]));
    }
}
