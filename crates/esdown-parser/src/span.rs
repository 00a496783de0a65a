//! Source location tracking.
//!
//! Every token and AST node carries a `Span` of byte offsets. Line and
//! column numbers are derived on demand through a [`LineIndex`], which is
//! only built when a diagnostic needs a human-readable position.

use std::fmt;

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub const fn empty(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start { self.start } else { other.start },
            end: if self.end > other.end { self.end } else { other.end },
        }
    }

    /// Check if this span contains a byte offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check if `other` lies entirely inside this span.
    #[inline]
    pub const fn encloses(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// A 1-based line/column pair for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert line/column to byte offset and vice versa.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index from source code.
    ///
    /// `\n`, `\r\n`, lone `\r`, U+2028 and U+2029 all terminate a line.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        for (i, c) in source.char_indices() {
            match c {
                '\n' => line_starts.push((i + 1) as u32),
                '\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push((i + 1) as u32),
                '\u{2028}' | '\u{2029}' => line_starts.push((i + c.len_utf8()) as u32),
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to line and column (both 0-indexed).
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let col = offset - self.line_starts[line];
        (line as u32, col)
    }

    /// Convert a byte offset to a 1-based [`Position`].
    pub fn position(&self, offset: u32) -> Position {
        let (line, column) = self.line_col(offset);
        Position { line: line + 1, column: column + 1 }
    }

    /// Convert line and column (both 0-indexed) to byte offset.
    pub fn offset(&self, line: u32, col: u32) -> u32 {
        self.line_starts.get(line as usize).copied().unwrap_or(0) + col
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self { line_starts: vec![0] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        assert_eq!(a.merge(b), Span::new(5, 15));
        assert!(a.merge(b).encloses(a));
        assert!(!a.encloses(b));
    }

    #[test]
    fn test_line_index() {
        let source = "line1\nline2\nline3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_col(0), (0, 0));
        assert_eq!(index.line_col(5), (0, 5));
        assert_eq!(index.line_col(6), (1, 0));
        assert_eq!(index.line_col(12), (2, 0));
        assert_eq!(index.position(7), Position { line: 2, column: 2 });
    }

    #[test]
    fn test_line_index_crlf() {
        let index = LineIndex::new("a\r\nb\rc");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(3), (1, 0));
        assert_eq!(index.line_col(5), (2, 0));
    }
}
