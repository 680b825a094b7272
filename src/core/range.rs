//! Interval algebra over inclusive, seqid-aware ranges.

use serde::{Deserialize, Serialize};

/// An inclusive interval on a named sequence
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub seqid: String,
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)] // Inclusive ranges always cover at least one base
impl Range {
    /// Create a range, swapping the coordinates if they are reversed
    pub fn new(seqid: impl Into<String>, start: u64, end: u64) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            seqid: seqid.into(),
            start,
            end,
        }
    }

    /// Number of bases covered (inclusive)
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Total number of bases covered by the union of `ranges`.
///
/// Two ranges on the same seqid are merged when the second starts at or
/// before the end of the first.
///
/// ```
/// use genokit::core::range::{range_union, Range};
///
/// let ranges = vec![Range::new("1", 45, 70), Range::new("1", 45, 55), Range::new("1", 25, 65)];
/// assert_eq!(range_union(&ranges), 46);
/// ```
#[must_use]
pub fn range_union(ranges: &[Range]) -> u64 {
    range_merge(ranges, 0).iter().map(Range::len).sum()
}

/// Merge ranges on the same seqid that overlap or lie within `dist` bases
/// of each other (`dist = 0` merges overlapping ranges only).
///
/// The result is sorted by `(seqid, start)`.
#[must_use]
pub fn range_merge(ranges: &[Range], dist: u64) -> Vec<Range> {
    let mut sorted: Vec<&Range> = ranges.iter().collect();
    sorted.sort();

    let mut merged: Vec<Range> = Vec::new();
    for r in sorted {
        match merged.last_mut() {
            Some(cur) if cur.seqid == r.seqid && r.start <= cur.end.saturating_add(dist) => {
                cur.end = cur.end.max(r.end);
            }
            _ => merged.push(r.clone()),
        }
    }
    merged
}

/// A range with a strand, used for distance computations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrandedRange<'a> {
    pub seqid: &'a str,
    pub start: i64,
    pub end: i64,
    pub strand: char,
}

/// Gap between two stranded ranges and their orientation pair.
///
/// Ranges on different seqids have distance `-1`. The ranges are ordered
/// by start before measuring, and overlapping ranges give a negative
/// distance.
///
/// ```
/// use genokit::core::range::{range_distance, StrandedRange};
///
/// let a = StrandedRange { seqid: "1", start: 30, end: 45, strand: '+' };
/// let b = StrandedRange { seqid: "1", start: 57, end: 68, strand: '-' };
/// assert_eq!(range_distance(&a, &b), (11, "+-".to_string()));
/// assert_eq!(range_distance(&b, &a), (11, "+-".to_string()));
/// ```
#[must_use]
pub fn range_distance(a: &StrandedRange, b: &StrandedRange) -> (i64, String) {
    let (first, second) = if a.start > b.start { (b, a) } else { (a, b) };

    let dist = if a.seqid == b.seqid {
        second.start - first.end - 1
    } else {
        -1
    };

    (dist, format!("{}{}", first.strand, second.strand))
}

/// Disjoint-set clustering over item indices.
///
/// Items are joined pairwise; [`Grouper::groups`] lists every cluster with
/// members in ascending index order, clusters ordered by their smallest
/// member.
#[derive(Debug, Clone)]
pub struct Grouper {
    parent: Vec<usize>,
}

impl Grouper {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub fn join(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: std::collections::BTreeMap<usize, Vec<usize>> =
            std::collections::BTreeMap::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }
        by_root.into_values().collect()
    }
}
