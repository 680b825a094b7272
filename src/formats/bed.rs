//! BED intervals (0-based start, exclusive end).

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::range::{range_merge, range_union, Range};
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;
use crate::utils::text::count_to_f64;

/// One BED row; columns past the sixth are carried through verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedLine {
    pub seqid: String,
    pub start: u64,
    pub end: u64,
    pub accn: Option<String>,
    pub score: Option<String>,
    pub strand: Option<String>,
    pub extra: Vec<String>,
}

impl BedLine {
    pub fn new(seqid: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            seqid: seqid.into(),
            start,
            end,
            accn: None,
            score: None,
            strand: None,
            extra: Vec::new(),
        }
    }

    /// Parse a tab-delimited BED row
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` when fewer than 3 columns are
    /// present, coordinates are not integers, or `start > end`.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() < 3 {
            return Err(ParseError::at_line(line_num, "fewer than 3 fields"));
        }

        let start: u64 = parse_field(fields[1], "start", line_num)?;
        let end: u64 = parse_field(fields[2], "end", line_num)?;
        if start > end {
            return Err(ParseError::at_line(
                line_num,
                format!("start {start} is after end {end}"),
            ));
        }

        let column = |i: usize| fields.get(i).map(|s| (*s).to_string());
        Ok(Self {
            seqid: fields[0].to_string(),
            start,
            end,
            accn: column(3),
            score: column(4),
            strand: column(5),
            extra: fields.iter().skip(6).map(|s| (*s).to_string()).collect(),
        })
    }

    #[must_use]
    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    /// Inclusive 1-based range covering the same bases; `None` for
    /// zero-length features
    #[must_use]
    pub fn range(&self) -> Option<Range> {
        (self.end > self.start).then(|| Range::new(self.seqid.clone(), self.start + 1, self.end))
    }
}

impl std::fmt::Display for BedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.seqid, self.start, self.end)?;
        for column in [&self.accn, &self.score, &self.strand] {
            match column {
                Some(value) => write!(f, "\t{value}")?,
                None => return Ok(()),
            }
        }
        for value in &self.extra {
            write!(f, "\t{value}")?;
        }
        Ok(())
    }
}

/// Named features mapped to their rank in position order and their row
pub type BedOrder<'a> = HashMap<&'a str, (usize, &'a BedLine)>;

/// All rows of a BED file
#[derive(Debug, Clone, Default)]
pub struct Bed {
    pub lines: Vec<BedLine>,
}

impl Bed {
    /// Parse BED rows, skipping blank, `#`, `track` and `browser` lines
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` naming the first malformed line.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if is_skippable(&line) || line.starts_with("track") || line.starts_with("browser") {
                continue;
            }
            lines.push(BedLine::parse(&line, i + 1)?);
        }
        Ok(Self { lines })
    }

    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or the errors of
    /// [`Bed::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        Self::parse(open_input(path)?)
    }

    /// Sort by `(seqid, start, end)`
    pub fn sort_by_position(&mut self) {
        self.lines
            .sort_by(|a, b| (&a.seqid, a.start, a.end).cmp(&(&b.seqid, b.start, b.end)));
    }

    /// Sort by accession, then position
    pub fn sort_by_accn(&mut self) {
        self.lines.sort_by(|a, b| {
            (&a.accn, &a.seqid, a.start).cmp(&(&b.accn, &b.seqid, b.start))
        });
    }

    /// Distinct sequence names, sorted
    #[must_use]
    pub fn seqids(&self) -> Vec<&str> {
        let mut seqids: Vec<&str> = self.lines.iter().map(|b| b.seqid.as_str()).collect();
        seqids.sort_unstable();
        seqids.dedup();
        seqids
    }

    /// Rank of every named feature once sorted by position; a repeated
    /// name keeps its last rank
    #[must_use]
    pub fn order(&self) -> BedOrder<'_> {
        let mut sorted: Vec<&BedLine> = self.lines.iter().collect();
        sorted.sort_by(|a, b| (&a.seqid, a.start, a.end).cmp(&(&b.seqid, b.start, b.end)));

        sorted
            .into_iter()
            .enumerate()
            .filter_map(|(rank, b)| b.accn.as_deref().map(|accn| (accn, (rank, b))))
            .collect()
    }

    /// Merge intervals whose gap is at most `dist` bases; book-ended
    /// intervals are merged with `dist = 0`.
    ///
    /// Merging works on the half-open coordinates as written, so
    /// zero-length features come out unchanged.
    #[must_use]
    pub fn merge(&self, dist: u64) -> Vec<BedLine> {
        let spans: Vec<Range> = self
            .lines
            .iter()
            .map(|b| Range::new(b.seqid.clone(), b.start, b.end))
            .collect();
        range_merge(&spans, dist)
            .into_iter()
            .map(|r| BedLine::new(r.seqid, r.start, r.end))
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> BedSummary {
        let total_bases: u64 = self.lines.iter().map(BedLine::span).sum();
        let ranges: Vec<Range> = self.lines.iter().filter_map(BedLine::range).collect();

        BedSummary {
            features: self.lines.len(),
            seqids: self.seqids().len(),
            total_bases,
            covered_bases: range_union(&ranges),
            mean_size: if self.lines.is_empty() {
                0.0
            } else {
                count_to_f64(total_bases) / count_to_f64(self.lines.len() as u64)
            },
        }
    }

    /// # Errors
    ///
    /// Returns an IO error if writing fails.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(w, "{line}")?;
        }
        Ok(())
    }
}

/// Feature counts and coverage for a BED file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedSummary {
    pub features: usize,
    pub seqids: usize,
    /// Sum of feature spans, overlaps counted repeatedly
    pub total_bases: u64,
    /// Bases covered by at least one feature
    pub covered_bases: u64,
    pub mean_size: f64,
}
