//! Miette diagnostic wrapper for dictionary parse errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![expect(unused_assignments)]

use std::fs::read;
use std::path::Path;

use anyletters::{EngineError, LoadError, ParseError};
use miette::{miette, Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into an `.aff` or `.dic` file.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(anyletters::dictionary))]
pub struct DictionaryDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl DictionaryDiagnostic {
    /// Create a diagnostic from a ParseError with source context.
    pub fn from_parse_error(path: &Path, content: &str, err: &ParseError) -> Self {
        let line = err.line().unwrap_or(1);

        // Sum of (line_length + 1) for lines before the error line.
        let offset = content
            .lines()
            .take(line.saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>();
        let width = content
            .lines()
            .nth(line.saturating_sub(1))
            .map_or(1, |l| l.len().max(1));

        // Clamp to content length to avoid miette panic on out-of-bounds
        let offset = offset.min(content.len());
        let width = width.min(content.len() - offset).max(1);

        DictionaryDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, width).into(),
            message: err.to_string(),
            help: help_for(err),
        }
    }
}

fn help_for(err: &ParseError) -> Option<String> {
    match err {
        ParseError::RuleCountMismatch { flag, found, .. } => Some(format!(
            "set the count in the '{flag}' header to {found} or add the missing rules"
        )),
        ParseError::InvalidFlags { .. } => {
            Some("check the FLAG directive of the affix file".into())
        }
        ParseError::UnsupportedEncoding { .. } => {
            Some("supported encodings are UTF-8, ISO8859-1 and ISO8859-15".into())
        }
        ParseError::Syntax { .. } | ParseError::InvalidEncoding { .. } => None,
    }
}

/// Convert an engine error into a report, rendering dictionary parse
/// failures against the offending file.
pub fn engine_report(err: EngineError) -> Report {
    if let EngineError::DictionaryUnavailable {
        source: LoadError::Parse { path, source },
        ..
    } = &err
    {
        if let Ok(bytes) = read(path) {
            let content = String::from_utf8_lossy(&bytes);
            return DictionaryDiagnostic::from_parse_error(path, &content, source).into();
        }
    }
    miette!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyletters::Flag;

    #[test]
    fn span_covers_offending_line() {
        let content = "SET UTF-8\nSFX A Y 2\nSFX A 0 s .\n";
        let err = ParseError::RuleCountMismatch {
            line: 2,
            flag: Flag::from("A"),
            declared: 2,
            found: 1,
        };

        let diagnostic = DictionaryDiagnostic::from_parse_error(Path::new("en/index.aff"), content, &err);

        assert_eq!(diagnostic.span.offset(), 10);
        assert_eq!(diagnostic.span.len(), 9);
        assert!(diagnostic.help.is_some());
    }

    #[test]
    fn errors_without_line_point_at_start() {
        let err = ParseError::UnsupportedEncoding {
            name: "KOI8-R".into(),
        };

        let diagnostic = DictionaryDiagnostic::from_parse_error(Path::new("ru/index.aff"), "SET KOI8-R\n", &err);

        assert_eq!(diagnostic.span.offset(), 0);
        assert_eq!(diagnostic.message, "unsupported encoding 'KOI8-R'");
    }
}
