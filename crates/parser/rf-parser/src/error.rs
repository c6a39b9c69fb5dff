//! Syntax diagnostics
//!
//! Note: the struct fields are read by miette's `#[derive(Diagnostic)]` macro
//! for rich error output, which the unused-assignment lint cannot see through.

#![allow(unused_assignments)]

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::ops::Range;
use thiserror::Error;

/// A syntax error in a source unit
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// Text the grammar cannot place
    #[error("unexpected `{text}` in {context}")]
    #[diagnostic(code(parser::unexpected))]
    Unexpected {
        /// First line of the offending text
        text: String,
        /// The construct being parsed, in words
        context: String,
        /// The offending text
        #[label("not valid here")]
        span: SourceSpan,
        /// Source unit
        #[source_code]
        src: NamedSource<String>,
    },

    /// A token the grammar requires is absent
    #[error("missing `{expected}`")]
    #[diagnostic(code(parser::missing), help("insert `{expected}`"))]
    Missing {
        /// The absent token
        expected: String,
        /// Where the token belongs
        #[label("expected `{expected}` here")]
        span: SourceSpan,
        /// Source unit
        #[source_code]
        src: NamedSource<String>,
    },

    /// A bracket, brace or parenthesis is never closed
    #[error("unclosed `{delimiter}`")]
    #[diagnostic(code(parser::unclosed))]
    Unclosed {
        /// The opening delimiter
        delimiter: char,
        /// The opening delimiter's location
        #[label("opened here")]
        opening: SourceSpan,
        /// Where the closing delimiter was expected
        #[label("closing delimiter expected")]
        end: SourceSpan,
        /// Source unit
        #[source_code]
        src: NamedSource<String>,
    },

    /// The grammar could not be loaded
    #[error("TypeScript grammar unavailable: {reason}")]
    #[diagnostic(code(parser::grammar))]
    GrammarUnavailable {
        /// Why loading failed
        reason: String,
    },
}

impl ParseError {
    /// Location of the error, if it has one
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::Unexpected { span, .. } | Self::Missing { span, .. } => Some(*span),
            Self::Unclosed { end, .. } => Some(*end),
            Self::GrammarUnavailable { .. } => None,
        }
    }

    /// Render as a codespan diagnostic against file `file_id`
    pub fn to_codespan_diagnostic(&self, file_id: usize) -> CodespanDiagnostic<usize> {
        let diagnostic = CodespanDiagnostic::error().with_message(self.to_string());
        match self {
            Self::Unexpected { span, .. } => diagnostic
                .with_labels(vec![Label::primary(file_id, range(*span)).with_message("not valid here")]),
            Self::Missing { expected, span, .. } => diagnostic
                .with_labels(vec![
                    Label::primary(file_id, range(*span)).with_message(format!("expected `{expected}` here")),
                ])
                .with_notes(vec![format!("insert `{expected}`")]),
            Self::Unclosed { opening, end, .. } => diagnostic.with_labels(vec![
                Label::primary(file_id, range(*end)).with_message("closing delimiter expected"),
                Label::secondary(file_id, range(*opening)).with_message("opened here"),
            ]),
            Self::GrammarUnavailable { .. } => diagnostic,
        }
    }
}

fn range(span: SourceSpan) -> Range<usize> {
    span.offset()..span.offset() + span.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> NamedSource<String> {
        NamedSource::new("handler.ts", "reflect((a) => { a );".to_string())
    }

    #[test]
    fn test_unexpected_label_covers_span() {
        let error = ParseError::Unexpected {
            text: ")".to_string(),
            context: "block".to_string(),
            span: (19, 1).into(),
            src: src(),
        };

        let diagnostic = error.to_codespan_diagnostic(0);
        assert_eq!(diagnostic.message, "unexpected `)` in block");
        assert_eq!(diagnostic.labels[0].range, 19..20);
        assert_eq!(error.span(), Some((19, 1).into()));
    }

    #[test]
    fn test_unclosed_points_at_both_ends() {
        let error = ParseError::Unclosed {
            delimiter: '{',
            opening: (15, 1).into(),
            end: (20, 1).into(),
            src: src(),
        };

        let diagnostic = error.to_codespan_diagnostic(3);
        assert_eq!(diagnostic.message, "unclosed `{`");
        assert_eq!(diagnostic.labels.len(), 2);
        assert_eq!(diagnostic.labels[1].range, 15..16);
        assert_eq!(diagnostic.labels[1].file_id, 3);
    }

    #[test]
    fn test_grammar_failure_has_no_location() {
        let error = ParseError::GrammarUnavailable {
            reason: "incompatible ABI".to_string(),
        };
        assert_eq!(error.span(), None);
        assert!(error.to_codespan_diagnostic(0).labels.is_empty());
    }
}
