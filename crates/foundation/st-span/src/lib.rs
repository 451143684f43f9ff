//! Source locations shared by the source tree and the IR tree

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Identifies one source file within a module
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[display("#{_0}")]
pub struct FileId(pub u32);

impl FileId {
    /// Wrap a raw file index
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A half-open byte range `start..end` in a source file
#[derive(Copy, Clone, Debug, Display, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{start}..{end}")]
pub struct Span {
    /// First byte covered by the node (comments skipped)
    pub start: u32,
    /// One past the last byte covered by the node
    pub end: u32,
}

impl Span {
    /// Create a span; `end` is clamped so the span is never inverted
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Byte range usable for slicing the file text
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Number of bytes covered
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no bytes (synthetic nodes)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `other` lies entirely inside `self`
    pub fn contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A span anchored to its file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{file}@{span}")]
pub struct FileSpan {
    /// Owning file
    pub file: FileId,
    /// Offsets inside the file
    pub span: Span,
}

impl FileSpan {
    /// Anchor `span` to `file`
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    /// Byte range inside the owning file
    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_span_is_clamped() {
        let span = Span::new(10, 4);
        assert_eq!(span.start, 10);
        assert!(span.is_empty());
    }

    #[test]
    fn test_cover_and_contains() {
        let outer = Span::new(2, 5).cover(Span::new(8, 12));
        assert_eq!(outer, Span::new(2, 12));
        assert!(outer.contains(Span::new(3, 9)));
        assert!(!outer.contains(Span::new(0, 3)));
    }

    #[test]
    fn test_display() {
        let span = FileSpan::new(FileId(3), Span::new(1, 7));
        assert_eq!(span.to_string(), "#3@1..7");
        assert_eq!(span.range(), 1..7);
    }
}
