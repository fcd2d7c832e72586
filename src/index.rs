//! Span index for range queries over one annotation type.
//!
//! Spans are appended as they are committed. Queries run against a sorted
//! snapshot built lazily on first query after a write: entries ordered by
//! `begin`, plus a max-segment tree over their ends.
//!
//! ```text
//! sorted by begin:  [0,27) [0,12) [7,12) [21,26)
//! leaf ends:          27     12     12     26
//! max_end tree:           27            26
//!                                27
//! ```
//!
//! A containing query for `target` is the prefix with `begin <= target.begin`,
//! descending only into subtrees whose max end reaches `target.end`.
//!
//! - Snapshot build: O(n log n), once per batch of writes
//! - Query: O(log n + k log n), k = result count
//!
//! Stages write in bulk and query afterwards, so one rebuild per stage.

use std::sync::OnceLock;

use crate::{AnnotationId, Span};

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: AnnotationId,
    span: Span,
}

#[derive(Debug, Clone)]
struct Snapshot {
    /// Entries ordered by (begin, insertion)
    entries: Vec<Entry>,
    /// Max-segment tree over `entries[i].span.end`, 1-based heap layout
    max_end: Vec<usize>,
    width: usize,
}

impl Snapshot {
    fn build(entries: &[Entry]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by_key(|e| (e.span.begin, e.id));

        let width = entries.len().next_power_of_two();
        let mut max_end = vec![0usize; 2 * width];
        for (i, e) in entries.iter().enumerate() {
            max_end[width + i] = e.span.end;
        }
        for node in (1..width).rev() {
            max_end[node] = max_end[2 * node].max(max_end[2 * node + 1]);
        }

        Self {
            entries,
            max_end,
            width,
        }
    }

    /// Number of entries with `begin <= offset`.
    fn prefix_through(&self, offset: usize) -> usize {
        self.entries.partition_point(|e| e.span.begin <= offset)
    }

    /// Number of entries with `begin < offset`.
    fn prefix_before(&self, offset: usize) -> usize {
        self.entries.partition_point(|e| e.span.begin < offset)
    }

    /// Collect entries among the first `prefix` whose end is at least `min_end`.
    fn collect_reaching(&self, prefix: usize, min_end: usize, out: &mut Vec<AnnotationId>) {
        if prefix == 0 {
            return;
        }
        let mut stack = vec![(1usize, 0usize, self.width)];
        while let Some((node, lo, hi)) = stack.pop() {
            if lo >= prefix || self.max_end[node] < min_end {
                continue;
            }
            if hi - lo == 1 {
                out.push(self.entries[lo].id);
                continue;
            }
            let mid = (lo + hi) / 2;
            stack.push((2 * node + 1, mid, hi));
            stack.push((2 * node, lo, mid));
        }
    }
}

/// Span index for one annotation type.
#[derive(Debug, Clone, Default)]
pub struct SpanIndex {
    entries: Vec<Entry>,
    snapshot: OnceLock<Snapshot>,
}

impl SpanIndex {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a span. Invalidates the query snapshot.
    pub fn insert(&mut self, id: AnnotationId, span: Span) {
        self.entries.push(Entry { id, span });
        self.snapshot = OnceLock::new();
    }

    fn snapshot(&self) -> &Snapshot {
        self.snapshot.get_or_init(|| Snapshot::build(&self.entries))
    }

    /// Annotations whose span contains `target`.
    ///
    /// Ordered by begin, then insertion; callers apply their own tie-breaks.
    #[must_use]
    pub fn query_containing(&self, target: Span) -> Vec<AnnotationId> {
        let snap = self.snapshot();
        let mut results = Vec::new();
        snap.collect_reaching(snap.prefix_through(target.begin), target.end, &mut results);
        results
    }

    /// Annotations whose span lies within `range`.
    #[must_use]
    pub fn query_contained_in(&self, range: Span) -> Vec<AnnotationId> {
        let snap = self.snapshot();
        let lo = snap.prefix_before(range.begin);
        let hi = snap.prefix_through(range.end);
        snap.entries[lo..hi.max(lo)]
            .iter()
            .filter(|e| e.span.end <= range.end)
            .map(|e| e.id)
            .collect()
    }

    /// Annotations sharing at least one character with `range`.
    #[must_use]
    pub fn query_overlap(&self, range: Span) -> Vec<AnnotationId> {
        let snap = self.snapshot();
        let mut results = Vec::new();
        snap.collect_reaching(snap.prefix_before(range.end), range.begin.saturating_add(1), &mut results);
        results
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
