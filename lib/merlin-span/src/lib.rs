use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Identifies one compilation unit's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// A region of a compilation unit: start offset and length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub source: SourceId,
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(source: SourceId, start: usize, len: usize) -> Self {
        Self { source, start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Spans from different sources do not merge; `self` is returned unchanged.
    pub fn to(&self, other: Span) -> Span {
        if self.source != other.source {
            return *self;
        }
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span::new(self.source, start, end - start)
    }

    /// Ordering key used when presenting diagnostics in source order.
    pub fn sort_key(&self) -> (SourceId, usize) {
        (self.source, self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let span = Span::new(SourceId(0), 4, 2);
        assert_eq!(span.end(), 6);
        assert_eq!(span.range(), 4..6);
    }

    #[test]
    fn test_merge_same_source() {
        let a = Span::new(SourceId(0), 10, 3);
        let b = Span::new(SourceId(0), 2, 4);
        assert_eq!(a.to(b), Span::new(SourceId(0), 2, 11));
    }

    #[test]
    fn test_merge_different_sources_keeps_left() {
        let a = Span::new(SourceId(0), 10, 3);
        let b = Span::new(SourceId(1), 2, 4);
        assert_eq!(a.to(b), a);
    }

    #[test]
    fn test_sort_key_orders_by_source_then_offset() {
        let mut spans = vec![
            Span::new(SourceId(1), 0, 1),
            Span::new(SourceId(0), 9, 1),
            Span::new(SourceId(0), 3, 1),
        ];
        spans.sort_by_key(|s| s.sort_key());
        assert_eq!(spans[0].start, 3);
        assert_eq!(spans[1].start, 9);
        assert_eq!(spans[2].source, SourceId(1));
    }
}
