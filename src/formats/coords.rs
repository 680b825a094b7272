//! NUCMER alignments as printed by `show-coords -rcl`.
//!
//! A row looks like (on one line):
//!
//! ```text
//! 2953 4450 | 525 2023 | 1498 1499 | 98.07 | 8046 2023 | 18.62 74.10 | AC182814.30 contig_100476
//! ```
//!
//! Side 1 is the reference, side 2 the query. Rows that do not split into
//! 13 or 17 fields (headers, separators) are skipped.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::core::range::Range;
use crate::formats::bed::BedLine;
use crate::formats::blast::AlignmentStats;
use crate::formats::{parse_field, ParseError};
use crate::utils::io::open_input;
use crate::utils::text::{count_to_f64, format_float, format_general};

/// How two aligned sequences overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    None,
    /// Dovetail, `a` before `b`
    AThenB,
    /// Dovetail, `b` before `a`
    BThenA,
    AInB,
    BInA,
}

impl Overlap {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Overlap::None => "none",
            Overlap::AThenB => "a ~ b",
            Overlap::BThenA => "b ~ a",
            Overlap::AInB => "a in b",
            Overlap::BInA => "b in a",
        }
    }
}

impl std::fmt::Display for Overlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alignment row
#[derive(Debug, Clone, PartialEq)]
pub struct CoordsLine {
    pub start1: u64,
    pub end1: u64,
    pub start2: u64,
    pub end2: u64,
    pub orientation: char,
    pub len1: u64,
    pub len2: u64,
    pub identity: f64,
    pub reflen: u64,
    pub querylen: u64,
    /// Fraction of the reference covered, `0..=1`
    pub refcov: f64,
    /// Fraction of the query covered, `0..=1`
    pub querycov: f64,
    pub reference: String,
    pub query: String,
    raw: String,
}

impl CoordsLine {
    /// Parse a row; `Ok(None)` for rows that are not alignments
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` when an alignment row holds a
    /// non-numeric coordinate, length or percentage.
    pub fn parse(line: &str, line_num: usize) -> Result<Option<Self>, ParseError> {
        let row = line.replace(" | ", "");
        let atoms: Vec<&str> = row.split_whitespace().collect();
        if atoms.len() != 13 && atoms.len() != 17 {
            return Ok(None);
        }

        let mut start2: u64 = parse_field(atoms[2], "start2", line_num)?;
        let mut end2: u64 = parse_field(atoms[3], "end2", line_num)?;
        let orientation = if start2 > end2 {
            std::mem::swap(&mut start2, &mut end2);
            '-'
        } else {
            '+'
        };

        let refcov: f64 = parse_field(atoms[9], "refcov", line_num)?;
        let querycov: f64 = parse_field(atoms[10], "querycov", line_num)?;

        Ok(Some(Self {
            start1: parse_field(atoms[0], "start1", line_num)?,
            end1: parse_field(atoms[1], "end1", line_num)?,
            start2,
            end2,
            orientation,
            len1: parse_field(atoms[4], "len1", line_num)?,
            len2: parse_field(atoms[5], "len2", line_num)?,
            identity: parse_field(atoms[6], "identity", line_num)?,
            reflen: parse_field(atoms[7], "reflen", line_num)?,
            querylen: parse_field(atoms[8], "querylen", line_num)?,
            refcov: refcov / 100.0,
            querycov: querycov / 100.0,
            reference: atoms[11].to_string(),
            query: atoms[12].to_string(),
            raw: line.trim_end().to_string(),
        }))
    }

    /// The row as it was read, trailing whitespace removed
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Identity times query coverage
    #[must_use]
    pub fn quality(&self) -> f64 {
        self.identity * self.querycov
    }

    /// Approximate number of identical bases on the reference side
    #[must_use]
    pub fn score(&self) -> u64 {
        let score = (self.identity * count_to_f64(self.len1) / 100.0).floor();
        // Non-negative, bounded by len1
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            score as u64
        }
    }

    fn bed_score(&self, pctid: bool) -> String {
        if pctid {
            format_float(self.identity)
        } else {
            self.score().to_string()
        }
    }

    /// Reference interval as BED, query as the name
    #[must_use]
    pub fn bedline(&self, pctid: bool) -> BedLine {
        BedLine {
            seqid: self.reference.clone(),
            start: self.start1.saturating_sub(1),
            end: self.end1,
            accn: Some(self.query.clone()),
            score: Some(self.bed_score(pctid)),
            strand: Some(self.orientation.to_string()),
            extra: Vec::new(),
        }
    }

    /// Query interval as BED, reference as the name
    #[must_use]
    pub fn qbedline(&self, pctid: bool) -> BedLine {
        BedLine {
            seqid: self.query.clone(),
            start: self.start2.saturating_sub(1),
            end: self.end2,
            accn: Some(self.reference.clone()),
            score: Some(self.bed_score(pctid)),
            strand: Some(self.orientation.to_string()),
            extra: Vec::new(),
        }
    }

    /// Tabular BLAST row with the query as BLAST query.
    ///
    /// Reverse alignments keep the query ascending and flip the reference
    /// coordinates. The e-value is estimated from the score as
    /// `3e9 * 2^-score`.
    #[must_use]
    pub fn blast_row(&self) -> String {
        let hitlen = self.len1.max(self.len2);
        let score = self.score();
        let mismatch = (count_to_f64(self.len1) * (1.0 - self.identity / 100.0)).floor();
        let evalue = 3.0e9 * (-count_to_f64(score) * std::f64::consts::LN_2).exp();

        let (sstart, sstop) = if self.orientation == '-' {
            (self.end1, self.start1)
        } else {
            (self.start1, self.end1)
        };

        format!(
            "{}\t{}\t{}\t{hitlen}\t{mismatch}\t0\t{}\t{}\t{sstart}\t{sstop}\t{}\t{score}",
            self.query,
            self.reference,
            format_float(self.identity),
            self.start2,
            self.end2,
            format_general(evalue, 1),
        )
    }

    /// Overlap type of the two aligned sequences, allowing up to `max_hang`
    /// unaligned bases in total at the relevant ends
    #[must_use]
    pub fn overlap(&self, max_hang: u64) -> Overlap {
        let a_left = self.start1.saturating_sub(1);
        let a_right = self.reflen.saturating_sub(self.end1);
        let mut b_left = self.start2.saturating_sub(1);
        let mut b_right = self.querylen.saturating_sub(self.end2);
        if self.orientation == '-' {
            std::mem::swap(&mut b_left, &mut b_right);
        }

        if a_left + b_right < max_hang {
            Overlap::BThenA
        } else if a_right + b_left < max_hang {
            Overlap::AThenB
        } else if a_left + a_right < max_hang {
            Overlap::AInB
        } else if b_left + b_right < max_hang {
            Overlap::BInA
        } else {
            Overlap::None
        }
    }
}

/// Parse alignment rows, skipping headers
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first malformed
/// alignment row.
pub fn parse_coords<R: BufRead>(reader: R) -> Result<Vec<CoordsLine>, ParseError> {
    let mut coords = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(c) = CoordsLine::parse(&line?, i + 1)? {
            coords.push(c);
        }
    }
    Ok(coords)
}

/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_coords`].
pub fn read_coords(path: &Path) -> Result<Vec<CoordsLine>, ParseError> {
    parse_coords(open_input(path)?)
}

/// Covered reference and query bases, identity weighted by reference span
#[must_use]
pub fn alignment_stats(coords: &[CoordsLine]) -> AlignmentStats {
    let alignments: Vec<(Range, Range, f64)> = coords
        .iter()
        .map(|c| {
            (
                Range::new(c.query.clone(), c.start2, c.end2),
                Range::new(c.reference.clone(), c.start1, c.end1),
                c.identity,
            )
        })
        .collect();
    AlignmentStats::from_alignments(&alignments)
}

/// Summed query coverage per query, highest first, stopping at the first
/// query below `cutoff`
#[must_use]
pub fn query_coverage(coords: &[CoordsLine], cutoff: f64) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for c in coords {
        *sums.entry(c.query.as_str()).or_default() += c.querycov;
    }

    let mut coverages: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(query, cov)| (query.to_string(), cov))
        .collect();
    coverages.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    coverages
        .into_iter()
        .take_while(|(_, cov)| *cov >= cutoff)
        .collect()
}
