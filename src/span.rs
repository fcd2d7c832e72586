//! Half-open character-offset intervals.
//!
//! Every annotation in a [`Document`](crate::Document) is located by a
//! [`Span`]: `[begin, end)` in character offsets (Unicode scalar values, as
//! counted by `str::chars`), never bytes. See [`crate::offset`] for the
//! conversion used when slicing text.
//!
//! Spans carry no global non-overlap constraint. Two spans may nest, overlap
//! partially, or be disjoint; callers decide how to interpret overlaps.
//!
//! ```rust
//! use anno_cas::Span;
//!
//! let sentence = Span::new(0, 27);
//! let token = Span::new(7, 12);
//! assert!(sentence.covers(&token));
//! assert!(!token.covers(&sentence));
//! assert_eq!(token.len(), 5);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A half-open `[begin, end)` interval over document character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start offset (inclusive)
    pub begin: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span without validation.
    ///
    /// Validation against a document happens when the span is committed to a
    /// store (see [`Span::check`]).
    #[must_use]
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Validate this span against a text of `text_len` characters.
    ///
    /// Fails with [`Error::InvalidSpan`] if `begin > end` or `end > text_len`.
    pub fn check(&self, text_len: usize) -> Result<()> {
        if self.begin > self.end || self.end > text_len {
            return Err(Error::invalid_span(self.begin, self.end, text_len));
        }
        Ok(())
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Check if the span covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this span contains `other` (`self.begin <= other.begin` and
    /// `other.end <= self.end`). Every span covers itself.
    #[must_use]
    pub const fn covers(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Whether the two spans share at least one character.
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Whether the character at `offset` falls inside this span.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.begin <= offset && offset < self.end
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.begin.min(other.begin), self.end.max(other.end))
    }

    /// Ordering key used by covering queries: begin, then length.
    #[must_use]
    pub(crate) const fn covering_key(&self) -> (usize, usize) {
        (self.begin, self.len())
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.begin..span.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}
