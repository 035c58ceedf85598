//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, nodes and errors occur in source code.

use std::fmt;

/// A span of source code.
///
/// Carries the byte range (for exact merging) together with the
/// line:column of its first byte (for display).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: u32,
    /// Length in bytes.
    pub len: u32,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(offset: u32, len: u32, line: u32, col: u32) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(offset: u32, line: u32, col: u32) -> Self {
        Self::new(offset, 0, line, col)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Byte offset one past the last byte.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// The position (line/col) is taken from whichever span starts first.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (first, _) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let end = self.end().max(other.end());
        Span {
            offset: first.offset,
            len: end - first.offset,
            line: first.line,
            col: first.col,
        }
    }

    /// The source text this span covers, if it lies within `source`.
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.offset as usize..self.end() as usize)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(4, 10, 1, 5);
        assert_eq!(span.len(), 10);
        assert_eq!(span.end(), 14);
        assert!(!span.is_empty());

        let empty = Span::point(4, 1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(40, 5, 3, 15);
        assert_eq!(format!("{}", span), "3:15");
    }

    #[test]
    fn span_merge_same_line() {
        let foo = Span::new(4, 3, 1, 5);
        let bar = Span::new(9, 3, 1, 10);
        let merged = foo.merge(bar);

        assert_eq!(merged.offset, 4);
        assert_eq!(merged.len, 8);
        assert_eq!(merged.col, 5);
    }

    #[test]
    fn span_merge_across_lines_is_exact() {
        let first = Span::new(0, 6, 1, 1);
        let second = Span::new(20, 4, 3, 2);
        let merged = second.merge(first);

        assert_eq!(merged.offset, 0);
        assert_eq!(merged.len, 24);
        assert_eq!(merged.line, 1);
    }

    #[test]
    fn span_merge_contained() {
        let outer = Span::new(0, 20, 1, 1);
        let inner = Span::new(5, 2, 1, 6);
        assert_eq!(outer.merge(inner), outer);
    }

    #[test]
    fn span_text() {
        let source = "int x = 1;";
        let span = Span::new(4, 1, 1, 5);
        assert_eq!(span.text(source), Some("x"));
        assert_eq!(Span::new(8, 10, 1, 9).text(source), None);
    }
}
