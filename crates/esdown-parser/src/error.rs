//! Diagnostics produced while parsing and resolving a module.

use std::fmt;

use thiserror::Error;

use crate::span::{LineIndex, Position, Span};

/// A positioned syntax or resolution error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({position})")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub position: Position,
}

impl ParseError {
    /// Create an error, deriving its line/column from `lines`.
    pub fn new(message: impl Into<String>, span: Span, lines: &LineIndex) -> Self {
        Self {
            message: message.into(),
            span,
            position: lines.position(span.start),
        }
    }
}

/// Every error reported for one file, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ErrorList {
    pub filename: String,
    pub errors: Vec<ParseError>,
}

impl ErrorList {
    pub fn new(filename: impl Into<String>, mut errors: Vec<ParseError>) -> Self {
        errors.sort_by_key(|error| error.span.start);
        Self { filename: filename.into(), errors }
    }

    /// The first (earliest) error.
    #[must_use]
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}:{}: {}", self.filename, error.position, error.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_position() {
        let lines = LineIndex::new("let a;\nlet b = ;");
        let error = ParseError::new("Unexpected token ;", Span::new(15, 16), &lines);
        assert_eq!(error.position, Position { line: 2, column: 9 });
        assert_eq!(error.to_string(), "Unexpected token ; (2:9)");
    }

    #[test]
    fn test_error_list_display_sorted() {
        let lines = LineIndex::new("a\nb");
        let list = ErrorList::new(
            "input.js",
            vec![
                ParseError::new("second", Span::new(2, 3), &lines),
                ParseError::new("first", Span::new(0, 1), &lines),
            ],
        );
        assert_eq!(list.first().map(|e| e.message.as_str()), Some("first"));
        assert_eq!(list.to_string(), "input.js:1:1: first\ninput.js:2:1: second");
    }
}
