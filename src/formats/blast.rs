//! Tabular BLAST output (`-m 8` in legacy BLAST, `-outfmt 6` in BLAST+).
//!
//! Columns: `query subject pctid hitlen nmismatch ngaps qstart qstop
//! sstart sstop evalue score`. Subject coordinates are stored with
//! `sstart <= sstop`; a hit on the reverse strand has orientation `-` and is
//! printed back in its original column order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;

use crate::core::range::{range_distance, range_union, Grouper, Range, StrandedRange};
use crate::formats::bed::{BedLine, BedOrder};
use crate::formats::coords::Overlap;
use crate::formats::sizes::Sizes;
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;
use crate::utils::text::{count_to_f64, format_float, gene_name};

/// One tabular BLAST hit (HSP)
#[derive(Debug, Clone, PartialEq)]
pub struct BlastLine {
    pub query: String,
    pub subject: String,
    pub pctid: f64,
    pub hitlen: u64,
    pub nmismatch: u64,
    pub ngaps: u64,
    pub qstart: u64,
    pub qstop: u64,
    pub sstart: u64,
    pub sstop: u64,
    pub evalue: f64,
    pub score: f64,
    pub orientation: char,
    raw: Option<String>,
}

impl BlastLine {
    /// Parse a tab-delimited BLAST row
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for rows with fewer than 12
    /// columns or unparseable numbers.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let line = line.trim_end_matches('\r');
        let f: Vec<&str> = line.split('\t').collect();
        if f.len() < 12 {
            return Err(ParseError::at_line(
                line_num,
                format!("expected 12 columns, found {}", f.len()),
            ));
        }

        let mut sstart: u64 = parse_field(f[8], "sstart", line_num)?;
        let mut sstop: u64 = parse_field(f[9], "sstop", line_num)?;
        let orientation = if sstart > sstop {
            std::mem::swap(&mut sstart, &mut sstop);
            '-'
        } else {
            '+'
        };

        Ok(Self {
            query: f[0].to_string(),
            subject: f[1].to_string(),
            pctid: parse_field(f[2], "pctid", line_num)?,
            hitlen: parse_field(f[3], "hitlen", line_num)?,
            nmismatch: parse_field(f[4], "nmismatch", line_num)?,
            ngaps: parse_field(f[5], "ngaps", line_num)?,
            qstart: parse_field(f[6], "qstart", line_num)?,
            qstop: parse_field(f[7], "qstop", line_num)?,
            sstart,
            sstop,
            evalue: parse_field(f[10], "evalue", line_num)?,
            score: parse_field(f[11], "score", line_num)?,
            orientation,
            raw: Some(line.to_string()),
        })
    }

    /// The row as it was read, or the formatted row for derived hits
    #[must_use]
    pub fn raw(&self) -> String {
        self.raw.clone().unwrap_or_else(|| self.to_string())
    }

    /// Swap query and subject, keeping the orientation
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            query: self.subject.clone(),
            subject: self.query.clone(),
            qstart: self.sstart,
            qstop: self.sstop,
            sstart: self.qstart,
            sstop: self.qstop,
            raw: None,
            ..self.clone()
        }
    }

    /// Subject interval as BED, query as the name
    #[must_use]
    pub fn bedline(&self) -> BedLine {
        BedLine {
            seqid: self.subject.clone(),
            start: self.sstart.saturating_sub(1),
            end: self.sstop,
            accn: Some(self.query.clone()),
            score: Some(format_float(self.score)),
            strand: Some(self.orientation.to_string()),
            extra: Vec::new(),
        }
    }

    /// Overlap type of query and subject given both sequence sizes.
    ///
    /// The four hang sums are compared in the order `a ~ b`, `b ~ a`,
    /// `a in b`, `b in a`; the first smallest wins, and a smallest sum above
    /// `max_hang` means no overlap.
    #[must_use]
    pub fn overlap(&self, qsize: u64, ssize: u64, max_hang: u64) -> Overlap {
        let a_left = self.qstart.saturating_sub(1);
        let a_right = qsize.saturating_sub(self.qstop);
        let mut b_left = self.sstart.saturating_sub(1);
        let mut b_right = ssize.saturating_sub(self.sstop);
        if self.orientation == '-' {
            std::mem::swap(&mut b_left, &mut b_right);
        }

        let sums = [
            (a_right + b_left, Overlap::AThenB),
            (a_left + b_right, Overlap::BThenA),
            (a_left + a_right, Overlap::AInB),
            (b_left + b_right, Overlap::BInA),
        ];
        let mut best = sums[0];
        for sum in &sums[1..] {
            if sum.0 < best.0 {
                best = *sum;
            }
        }

        if best.0 > max_hang {
            Overlap::None
        } else {
            best.1
        }
    }

    fn query_range(&self) -> StrandedRange<'_> {
        StrandedRange {
            seqid: "0",
            start: to_i64(self.qstart),
            end: to_i64(self.qstop),
            strand: self.orientation,
        }
    }

    fn subject_range(&self) -> StrandedRange<'_> {
        StrandedRange {
            seqid: "0",
            start: to_i64(self.sstart),
            end: to_i64(self.sstop),
            strand: self.orientation,
        }
    }
}

fn to_i64(x: u64) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

impl std::fmt::Display for BlastLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sstart, sstop) = if self.orientation == '-' {
            (self.sstop, self.sstart)
        } else {
            (self.sstart, self.sstop)
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query,
            self.subject,
            format_float(self.pctid),
            self.hitlen,
            self.nmismatch,
            self.ngaps,
            self.qstart,
            self.qstop,
            sstart,
            sstop,
            format_float(self.evalue),
            format_float(self.score)
        )
    }
}

/// Parse BLAST rows, skipping blank and `#` lines
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first malformed line.
pub fn parse_blast<R: BufRead>(reader: R) -> Result<Vec<BlastLine>, ParseError> {
    let mut hits = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }
        hits.push(BlastLine::parse(&line, i + 1)?);
    }
    Ok(hits)
}

/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_blast`].
pub fn read_blast(path: &Path) -> Result<Vec<BlastLine>, ParseError> {
    parse_blast(open_input(path)?)
}

/// Cutoffs for `blast filter`
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub score: f64,
    pub pctid: f64,
    pub hitlen: u64,
    pub evalue: f64,
    pub noself: bool,
    pub ids: Option<HashSet<String>>,
    pub inverse: bool,
}

impl FilterOptions {
    /// Whether a hit survives the cutoffs
    #[must_use]
    pub fn keep(&self, b: &BlastLine) -> bool {
        let outside_ids = self
            .ids
            .as_ref()
            .is_some_and(|ids| !(ids.contains(&b.query) && ids.contains(&b.subject)));

        let mut remove = b.score < self.score
            || b.pctid < self.pctid
            || b.hitlen < self.hitlen
            || b.evalue > self.evalue
            || outside_ids;

        if self.inverse {
            remove = !remove;
        }

        remove = remove || (self.noself && b.query == b.subject);
        !remove
    }
}

/// Group hits by a key, groups in first-appearance order
fn group_by<'a, F>(hits: &'a [BlastLine], key: F) -> Vec<Vec<&'a BlastLine>>
where
    F: Fn(&BlastLine) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&BlastLine>> = Vec::new();
    for hit in hits {
        let k = key(hit);
        match index.get(k) {
            Some(&i) => groups[i].push(hit),
            None => {
                index.insert(k, groups.len());
                groups.push(vec![hit]);
            }
        }
    }
    groups
}

fn by_score_desc(a: &&BlastLine, b: &&BlastLine) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

/// Top `n` hits per query (or per subject).
///
/// Within a group hits are ranked by descending score, ties keep file
/// order. With `hsps`, every HSP of the first `n` distinct partners is
/// kept instead of the first `n` HSPs.
#[must_use]
pub fn best_hits(hits: &[BlastLine], n: usize, hsps: bool, by_subject: bool) -> Vec<&BlastLine> {
    let groups = if by_subject {
        group_by(hits, |b| b.subject.as_str())
    } else {
        group_by(hits, |b| b.query.as_str())
    };

    let mut best = Vec::new();
    for mut group in groups {
        group.sort_by(by_score_desc);
        if hsps {
            let mut partners: HashSet<&str> = HashSet::new();
            for b in group {
                let partner = if by_subject { &b.query } else { &b.subject };
                if partners.contains(partner.as_str()) || partners.len() < n {
                    partners.insert(partner.as_str());
                    best.push(b);
                }
            }
        } else {
            best.extend(group.into_iter().take(n));
        }
    }
    best
}

/// Reciprocal best hits between `A vs B` and `B vs A` searches.
///
/// Pairs are reported in the order queries first appear in `ab`.
#[must_use]
pub fn reciprocal_best_hits(ab: &[BlastLine], ba: &[BlastLine]) -> Vec<(String, String)> {
    let ba_best: HashMap<&str, &str> = best_hits(ba, 1, false, false)
        .into_iter()
        .map(|b| (b.query.as_str(), b.subject.as_str()))
        .collect();

    best_hits(ab, 1, false, false)
        .into_iter()
        .filter(|b| ba_best.get(b.subject.as_str()) == Some(&b.query.as_str()))
        .map(|b| (b.query.clone(), b.subject.clone()))
        .collect()
}

/// How to order a BLAST file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    /// Query, then score descending
    QueryScore,
    /// Query, then query start
    Query,
    /// Subject, then subject start
    Ref,
    /// Subject, then score descending
    RefScore,
}

/// Stable sort of hits in the given order
pub fn sort_hits(hits: &mut [BlastLine], order: SortOrder) {
    let score_desc = |a: &BlastLine, b: &BlastLine| {
        b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
    };
    match order {
        SortOrder::QueryScore => {
            hits.sort_by(|a, b| a.query.cmp(&b.query).then_with(|| score_desc(a, b)));
        }
        SortOrder::Query => {
            hits.sort_by(|a, b| (&a.query, a.qstart).cmp(&(&b.query, b.qstart)));
        }
        SortOrder::Ref => {
            hits.sort_by(|a, b| (&a.subject, a.sstart).cmp(&(&b.subject, b.sstart)));
        }
        SortOrder::RefScore => {
            hits.sort_by(|a, b| a.subject.cmp(&b.subject).then_with(|| score_desc(a, b)));
        }
    }
}

/// Covered bases on both sides of an alignment set and the mean identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentStats {
    pub query_covered: u64,
    pub ref_covered: u64,
    /// Identity weighted by aligned reference span
    pub identity_pct: f64,
}

impl AlignmentStats {
    /// Aggregate `(query range, ref range, identity %)` triples
    #[must_use]
    pub fn from_alignments(alignments: &[(Range, Range, f64)]) -> Self {
        let mut identicals = 0.0;
        let mut alignlen = 0u64;
        for (_, r, identity) in alignments {
            let alen = r.end - r.start;
            alignlen += alen;
            identicals += identity / 100.0 * count_to_f64(alen);
        }

        let query: Vec<Range> = alignments.iter().map(|(q, _, _)| q.clone()).collect();
        let reference: Vec<Range> = alignments.iter().map(|(_, r, _)| r.clone()).collect();

        Self {
            query_covered: range_union(&query),
            ref_covered: range_union(&reference),
            identity_pct: if alignlen == 0 {
                0.0
            } else {
                identicals * 100.0 / count_to_f64(alignlen)
            },
        }
    }
}

/// Coverage and identity summary of a BLAST file
#[must_use]
pub fn alignment_stats(hits: &[BlastLine]) -> AlignmentStats {
    let alignments: Vec<(Range, Range, f64)> = hits
        .iter()
        .map(|b| {
            (
                Range::new(b.query.clone(), b.qstart, b.qstop),
                Range::new(b.subject.clone(), b.sstart, b.sstop),
                b.pctid,
            )
        })
        .collect();
    AlignmentStats::from_alignments(&alignments)
}

/// Most frequent subjects as `(count, subject)`, count descending then name
#[must_use]
pub fn top_subjects(hits: &[BlastLine], top: usize) -> Vec<(usize, String)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for b in hits {
        *counts.entry(b.subject.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(usize, String)> = counts
        .into_iter()
        .map(|(subject, count)| (count, subject.to_string()))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    ranked.truncate(top);
    ranked
}

/// Identity and coverage of one query in `blast covfilter`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryCoverage {
    pub id: String,
    pub identity: f64,
    pub coverage: f64,
    pub valid: bool,
}

/// Result of `blast covfilter`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub queries: Vec<QueryCoverage>,
    pub mismatches: u64,
    pub gaps: u64,
    pub alignlen: u64,
    pub covered: u64,
    pub total_size: u64,
    pub total_seqs: usize,
}

impl CoverageReport {
    #[must_use]
    pub fn valid_ids(&self) -> HashSet<&str> {
        self.queries
            .iter()
            .filter(|q| q.valid)
            .map(|q| q.id.as_str())
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&QueryCoverage> {
        self.queries.iter().find(|q| q.id == id)
    }

    /// Multi-line report in the shape printed by `blast covfilter`
    #[must_use]
    pub fn message(&self, pctid: f64, pctcov: f64) -> String {
        let mapped = self.queries.len() as u64;
        let valid = self.queries.iter().filter(|q| q.valid).count() as u64;
        let total = self.total_seqs as u64;
        let pct = |a: u64, b: u64| {
            if b == 0 {
                0.0
            } else {
                count_to_f64(a) * 100.0 / count_to_f64(b)
            }
        };
        let avg_id = if self.alignlen == 0 {
            0.0
        } else {
            100.0 - count_to_f64(self.mismatches + self.gaps) * 100.0 / count_to_f64(self.alignlen)
        };

        [
            format!(
                "Identity: {} mismatches, {} gaps, {} alignlen",
                self.mismatches, self.gaps, self.alignlen
            ),
            format!("Total mapped: {mapped} ({:.1}% of {total})", pct(mapped, total)),
            format!(
                "Total valid (id={pctid}% cov={pctcov}%): {valid} ({:.1}% of {total})",
                pct(valid, total)
            ),
            format!("Average id = {avg_id:.2}%"),
            format!(
                "Coverage: {} covered, {} total",
                self.covered, self.total_size
            ),
            format!(
                "Average coverage = {:.2}%",
                pct(self.covered, self.total_size)
            ),
        ]
        .join("\n")
    }
}

/// Per-query identity and coverage filter.
///
/// HSPs below `pctid` are ignored. Identity is computed from mismatches
/// and gaps over the aligned length; coverage is the union of the query (or
/// subject with `subject_coverage`) intervals over the sequence size.
///
/// # Errors
///
/// Returns `ParseError::MissingId` when a covered sequence has no size.
pub fn coverage_filter(
    hits: &[BlastLine],
    sizes: &Sizes,
    pctid: f64,
    pctcov: f64,
    subject_coverage: bool,
) -> Result<CoverageReport, ParseError> {
    let mut report = CoverageReport {
        queries: Vec::new(),
        mismatches: 0,
        gaps: 0,
        alignlen: 0,
        covered: 0,
        total_size: sizes.total_size(),
        total_seqs: sizes.len(),
    };

    for group in group_by(hits, |b| b.query.as_str()) {
        let query = group[0].query.clone();
        let mut covered_ranges = Vec::new();
        let (mut alignlen, mut mismatches, mut gaps) = (0, 0, 0);
        let mut cov_id = "";

        for b in &group {
            let (seqid, start, stop) = if subject_coverage {
                (b.subject.as_str(), b.sstart, b.sstop)
            } else {
                (b.query.as_str(), b.qstart, b.qstop)
            };
            cov_id = seqid;

            if b.pctid < pctid {
                continue;
            }
            alignlen += b.hitlen;
            mismatches += b.nmismatch;
            gaps += b.ngaps;
            covered_ranges.push(Range::new("1", start, stop));
        }

        let identity = if covered_ranges.is_empty() || alignlen == 0 {
            0.0
        } else {
            100.0 - count_to_f64(mismatches + gaps) * 100.0 / count_to_f64(alignlen)
        };
        let covered = range_union(&covered_ranges);
        let size = sizes
            .get_size(cov_id)
            .ok_or_else(|| ParseError::MissingId(cov_id.to_string()))?;
        let coverage = if size == 0 {
            0.0
        } else {
            count_to_f64(covered) * 100.0 / count_to_f64(size)
        };

        report.queries.push(QueryCoverage {
            id: query,
            identity,
            coverage,
            valid: identity >= pctid && coverage >= pctcov,
        });
        report.covered += covered;
        report.mismatches += mismatches;
        report.gaps += gaps;
        report.alignlen += alignlen;
    }

    Ok(report)
}

/// Merge HSPs of one query-subject pair into a single hit
///
/// # Panics
///
/// Panics if `hsps` is empty.
#[must_use]
pub fn combine_hsps(hsps: &[&BlastLine]) -> BlastLine {
    let mut m = hsps[0].clone();
    m.raw = None;
    if hsps.len() == 1 {
        return m;
    }

    for b in &hsps[1..] {
        m.hitlen += b.hitlen;
        m.nmismatch += b.nmismatch;
        m.ngaps += b.ngaps;
        m.qstart = m.qstart.min(b.qstart);
        m.qstop = m.qstop.max(b.qstop);
        m.sstart = m.sstart.min(b.sstart);
        m.sstop = m.sstop.max(b.sstop);
        m.score += b.score;
    }

    m.pctid = if m.hitlen == 0 {
        0.0
    } else {
        100.0 - count_to_f64(m.nmismatch + m.ngaps) * 100.0 / count_to_f64(m.hitlen)
    };
    m
}

fn sort_combined(mut combined: Vec<BlastLine>) -> Vec<BlastLine> {
    sort_hits(&mut combined, SortOrder::QueryScore);
    combined
}

/// Chain same-orientation HSPs of each query-subject pair whose gaps on
/// both axes are at most `dist`; clusters are formed transitively.
#[must_use]
pub fn chain_hsps(hits: &[BlastLine], dist: i64) -> Vec<BlastLine> {
    let mut pairs: Vec<Vec<&BlastLine>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for b in hits {
        let key = (b.query.as_str(), b.subject.as_str());
        match index.get(&key) {
            Some(&i) => pairs[i].push(b),
            None => {
                index.insert(key, pairs.len());
                pairs.push(vec![b]);
            }
        }
    }

    let mut combined = Vec::new();
    for points in &mut pairs {
        points.sort_by_key(|b| (b.qstart, b.qstop, b.sstart, b.sstop));

        let mut clusters = Grouper::new(points.len());
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let (a, b) = (points[i], points[j]);
                if a.orientation != b.orientation {
                    continue;
                }
                let (dx, _) = range_distance(&a.query_range(), &b.query_range());
                if dx.abs() > dist {
                    continue;
                }
                let (dy, _) = range_distance(&a.subject_range(), &b.subject_range());
                if dy.abs() > dist {
                    continue;
                }
                clusters.join(i, j);
            }
        }

        for group in clusters.groups() {
            let members: Vec<&BlastLine> = group.into_iter().map(|i| points[i]).collect();
            combined.push(combine_hsps(&members));
        }
    }

    sort_combined(combined)
}

/// Combine all HSPs sharing query, subject and orientation
#[must_use]
pub fn condense_hsps(hits: &[BlastLine]) -> Vec<BlastLine> {
    let mut clusters: Vec<Vec<&BlastLine>> = Vec::new();
    let mut index: HashMap<(&str, &str, char), usize> = HashMap::new();
    for b in hits {
        let key = (b.query.as_str(), b.subject.as_str(), b.orientation);
        match index.get(&key) {
            Some(&i) => clusters[i].push(b),
            None => {
                index.insert(key, clusters.len());
                clusters.push(vec![b]);
            }
        }
    }

    sort_combined(clusters.iter().map(|c| combine_hsps(c)).collect())
}

/// Summed score per query over the hits whose subject is in `ids`
#[must_use]
pub fn query_scores<'a>(hits: &'a [BlastLine], ids: &HashSet<String>) -> HashMap<&'a str, f64> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for b in hits.iter().filter(|b| ids.contains(&b.subject)) {
        *scores.entry(b.query.as_str()).or_default() += b.score;
    }
    scores
}

/// How much of its subject the alignments of one query span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub query: String,
    pub subject: String,
    /// Unaligned subject bases before the first aligned base
    pub nterm: u64,
    /// Unaligned subject bases after the last aligned base
    pub cterm: u64,
    /// Percent of the subject between the outermost aligned bases, rounded
    /// down
    pub covered: u64,
}

impl Completeness {
    /// Covered percent a query must exceed to count as complete
    pub const CUTOFF: u64 = 50;

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.covered > Self::CUTOFF
    }
}

/// Alignment extent of every query on its best subject, the subject of its
/// first hit.
///
/// Queries are reported in first-appearance order. Only hits against that
/// subject count towards the extent.
///
/// # Errors
///
/// Returns `ParseError::MissingId` when a subject has no size.
pub fn completeness(hits: &[BlastLine], sizes: &Sizes) -> Result<Vec<Completeness>, ParseError> {
    let mut rows = Vec::new();
    for group in group_by(hits, |b| b.query.as_str()) {
        let first = group[0];
        let size = sizes
            .get_size(&first.subject)
            .ok_or_else(|| ParseError::MissingId(first.subject.clone()))?;

        let on_subject = group.iter().filter(|b| b.subject == first.subject);
        let rmin = on_subject.clone().map(|b| b.sstart).min().unwrap_or(first.sstart);
        let rmax = on_subject.map(|b| b.sstop).max().unwrap_or(first.sstop);

        let covered = if size == 0 {
            0
        } else {
            (rmax - rmin + 1) * 100 / size
        };
        rows.push(Completeness {
            query: first.query.clone(),
            subject: first.subject.clone(),
            nterm: rmin.saturating_sub(1),
            cterm: size.saturating_sub(rmax),
            covered,
        });
    }
    Ok(rows)
}

/// Hits whose query and subject features lie on the selected sequences.
///
/// Hit names are looked up in the feature orders of both sides. With
/// `convert`, names become `<seqid>_<rank>`, the rank zero-padded to five
/// digits.
///
/// # Errors
///
/// Returns `ParseError::MissingId` for a hit name absent from its BED file.
pub fn subset_hits(
    hits: &[BlastLine],
    qorder: &BedOrder<'_>,
    sorder: &BedOrder<'_>,
    qchrs: &HashSet<&str>,
    schrs: &HashSet<&str>,
    convert: bool,
) -> Result<Vec<BlastLine>, ParseError> {
    let mut kept = Vec::new();
    for b in hits {
        let (qrank, qbed) = lookup(qorder, &b.query)?;
        let (srank, sbed) = lookup(sorder, &b.subject)?;
        if !qchrs.contains(qbed.seqid.as_str()) || !schrs.contains(sbed.seqid.as_str()) {
            continue;
        }

        let mut hit = b.clone();
        if convert {
            hit.query = format!("{}_{qrank:05}", qbed.seqid);
            hit.subject = format!("{}_{srank:05}", sbed.seqid);
            hit.raw = None;
        }
        kept.push(hit);
    }
    Ok(kept)
}

fn lookup<'b>(order: &BedOrder<'b>, name: &str) -> Result<(usize, &'b BedLine), ParseError> {
    order
        .get(name)
        .copied()
        .ok_or_else(|| ParseError::MissingId(name.to_string()))
}

/// One reported pair of `blast cscore`
#[derive(Debug, Clone, PartialEq)]
pub struct CScore<'a> {
    pub query: String,
    pub subject: String,
    pub cscore: f64,
    pub hit: &'a BlastLine,
}

/// C-score of every pair: `score(A,B) / max(best(A), best(B))`.
///
/// A C-score of one means a reciprocal best hit. Only pairs above `cutoff`
/// are reported, keeping the highest C-score per pair, sorted by pair.
/// With `strip_names`, alternative-splicing suffixes are removed first.
#[must_use]
pub fn cscores(hits: &[BlastLine], cutoff: f64, strip_names: bool) -> Vec<CScore<'_>> {
    let names = |b: &BlastLine| -> (String, String) {
        if strip_names {
            (gene_name(&b.query).to_string(), gene_name(&b.subject).to_string())
        } else {
            (b.query.clone(), b.subject.clone())
        }
    };

    let mut best_score: HashMap<String, f64> = HashMap::new();
    for b in hits {
        let (q, s) = names(b);
        for id in [q, s] {
            let best = best_score.entry(id).or_insert(0.0);
            if b.score > *best {
                *best = b.score;
            }
        }
    }

    let mut pairs: HashMap<(String, String), CScore> = HashMap::new();
    for b in hits {
        let (q, s) = names(b);
        let denom = best_score[&q].max(best_score[&s]);
        if denom <= 0.0 {
            continue;
        }
        let c = b.score / denom;
        if c <= cutoff {
            continue;
        }
        let key = (q.clone(), s.clone());
        if pairs.get(&key).map_or(true, |existing| c > existing.cscore) {
            pairs.insert(
                key,
                CScore {
                    query: q,
                    subject: s,
                    cscore: c,
                    hit: b,
                },
            );
        }
    }

    let mut result: Vec<CScore> = pairs.into_values().collect();
    result.sort_by(|a, b| (&a.query, &a.subject).cmp(&(&b.query, &b.subject)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::bed::Bed;

    const BLAST: &str = "\
# comment
q1\ts1\t99.0\t100\t1\t0\t1\t100\t201\t300\t1e-50\t180.0
q1\ts2\t95.0\t100\t5\t0\t1\t100\t500\t401\t1e-30\t150
q1\ts1\t90.0\t50\t5\t0\t150\t199\t351\t400\t1e-10\t80
q2\ts2\t100.0\t200\t0\t0\t1\t200\t1\t200\t0.0\t400
q3\tq3\t100.0\t300\t0\t0\t1\t300\t1\t300\t0.0\t600
";

    fn hits() -> Vec<BlastLine> {
        parse_blast(BLAST.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_orientation() {
        let h = hits();
        assert_eq!(h.len(), 5);
        assert_eq!(h[1].orientation, '-');
        assert_eq!((h[1].sstart, h[1].sstop), (401, 500));
        assert_eq!(h[1].to_string(), "q1\ts2\t95.0\t100\t5\t0\t1\t100\t500\t401\t1e-30\t150.0");
        assert_eq!(h[1].raw(), "q1\ts2\t95.0\t100\t5\t0\t1\t100\t500\t401\t1e-30\t150");
    }

    #[test]
    fn test_parse_short_row() {
        let err = parse_blast("q\ts\t99\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_swapped() {
        let h = hits();
        let s = h[1].swapped();
        assert_eq!(s.query, "s2");
        assert_eq!(s.subject, "q1");
        assert_eq!(s.orientation, '-');
        assert_eq!(s.to_string(), "s2\tq1\t95.0\t100\t5\t0\t401\t500\t100\t1\t1e-30\t150.0");
        assert_eq!(s.swapped().to_string(), h[1].to_string());
    }

    #[test]
    fn test_bedline() {
        let h = hits();
        assert_eq!(h[1].bedline().to_string(), "s2\t400\t500\tq1\t150.0\t-");
    }

    #[test]
    fn test_filter() {
        let h = hits();
        let mut opts = FilterOptions {
            score: 0.0,
            pctid: 95.0,
            hitlen: 100,
            evalue: 0.01,
            noself: false,
            ids: None,
            inverse: false,
        };
        let kept: Vec<bool> = h.iter().map(|b| opts.keep(b)).collect();
        assert_eq!(kept, vec![true, true, false, true, true]);

        opts.noself = true;
        opts.inverse = true;
        let kept: Vec<bool> = h.iter().map(|b| opts.keep(b)).collect();
        assert_eq!(kept, vec![false, false, true, false, false]);

        opts.inverse = false;
        opts.noself = false;
        opts.ids = Some(["q1", "s1"].iter().map(ToString::to_string).collect());
        let kept: Vec<bool> = h.iter().map(|b| opts.keep(b)).collect();
        assert_eq!(kept, vec![true, false, false, false, false]);
    }

    #[test]
    fn test_best_hits() {
        let h = hits();
        let best: Vec<(&str, &str)> = best_hits(&h, 1, false, false)
            .iter()
            .map(|b| (b.query.as_str(), b.subject.as_str()))
            .collect();
        assert_eq!(best, vec![("q1", "s1"), ("q2", "s2"), ("q3", "q3")]);

        // All HSPs of the single best partner
        let best = best_hits(&h, 1, true, false);
        assert_eq!(best.len(), 4);
        assert!((best[1].score - 80.0).abs() < 1e-9);

        let by_subject = best_hits(&h, 1, false, true);
        assert_eq!(by_subject[1].subject, "s2");
        assert_eq!(by_subject[1].query, "q2");
    }

    #[test]
    fn test_reciprocal_best_hits() {
        let ab = parse_blast(
            "a1\tb1\t99\t100\t0\t0\t1\t100\t1\t100\t0\t200\n\
             a2\tb1\t99\t100\t0\t0\t1\t100\t1\t100\t0\t100\n\
             a3\tb3\t99\t100\t0\t0\t1\t100\t1\t100\t0\t100\n"
                .as_bytes(),
        )
        .unwrap();
        let ba = parse_blast(
            "b1\ta1\t99\t100\t0\t0\t1\t100\t1\t100\t0\t200\n\
             b3\ta2\t99\t100\t0\t0\t1\t100\t1\t100\t0\t100\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(
            reciprocal_best_hits(&ab, &ba),
            vec![("a1".to_string(), "b1".to_string())]
        );
    }

    #[test]
    fn test_sort_hits() {
        let mut h = hits();
        sort_hits(&mut h, SortOrder::RefScore);
        let order: Vec<(&str, f64)> = h.iter().map(|b| (b.subject.as_str(), b.score)).collect();
        assert_eq!(
            order,
            vec![("q3", 600.0), ("s1", 180.0), ("s1", 80.0), ("s2", 400.0), ("s2", 150.0)]
        );

        sort_hits(&mut h, SortOrder::Query);
        assert_eq!(h[0].qstart, 1);
        assert_eq!(h[2].qstart, 150);
    }

    #[test]
    fn test_alignment_stats() {
        let h = parse_blast(
            "q\ts\t100\t10\t0\t0\t1\t10\t1\t11\t0\t20\n\
             q\ts\t50\t10\t0\t0\t6\t15\t21\t31\t0\t20\n"
                .as_bytes(),
        )
        .unwrap();
        let stats = alignment_stats(&h);
        assert_eq!(stats.query_covered, 15);
        assert_eq!(stats.ref_covered, 22);
        assert!((stats.identity_pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_subjects() {
        let top = top_subjects(&hits(), 2);
        assert_eq!(top, vec![(2, "s1".to_string()), (2, "s2".to_string())]);
    }

    #[test]
    fn test_coverage_filter() {
        let sizes = Sizes::from_entries(vec![
            ("q1".to_string(), 400),
            ("q2".to_string(), 200),
            ("q3".to_string(), 300),
            ("q4".to_string(), 100),
        ]);
        let report = coverage_filter(&hits(), &sizes, 95.0, 50.0, false).unwrap();
        assert_eq!(report.queries.len(), 3);

        let q1 = report.get("q1").unwrap();
        // two HSPs above 95%, both covering 1-100 of 400
        assert!((q1.coverage - 25.0).abs() < 1e-9);
        assert!((q1.identity - 97.0).abs() < 1e-9);
        assert!(!q1.valid);
        assert!(report.get("q2").unwrap().valid);

        let valid = report.valid_ids();
        assert!(valid.contains("q3"));
        assert_eq!(report.total_seqs, 4);
        assert!(report.message(95.0, 50.0).contains("Total mapped: 3 (75.0% of 4)"));
    }

    #[test]
    fn test_coverage_filter_missing_size() {
        let sizes = Sizes::from_entries(vec![("q1".to_string(), 400)]);
        let err = coverage_filter(&hits(), &sizes, 95.0, 50.0, false).unwrap_err();
        assert!(matches!(err, ParseError::MissingId(id) if id == "q2"));
    }

    #[test]
    fn test_chain_hsps() {
        let h = parse_blast(
            "q\ts\t100\t100\t0\t0\t1\t100\t1\t100\t0\t100\n\
             q\ts\t90\t100\t10\t0\t150\t249\t160\t259\t0\t80\n\
             q\ts\t90\t100\t10\t0\t1000\t1099\t1000\t1099\t0\t50\n"
                .as_bytes(),
        )
        .unwrap();

        let chained = chain_hsps(&h, 100);
        assert_eq!(chained.len(), 2);
        assert_eq!((chained[0].qstart, chained[0].qstop), (1, 249));
        assert_eq!((chained[0].sstart, chained[0].sstop), (1, 259));
        assert!((chained[0].score - 180.0).abs() < 1e-9);
        assert_eq!(chained[0].hitlen, 200);
        assert!((chained[0].pctid - 95.0).abs() < 1e-9);
        assert!((chained[1].score - 50.0).abs() < 1e-9);

        assert_eq!(chain_hsps(&h, 10).len(), 3);
    }

    /// Chained hits with equal scores come out in first-appearance order
    #[test]
    fn test_chain_hsps_tied_order() {
        let rows: String = (0..20)
            .map(|i| format!("q\ts{i}\t100\t100\t0\t0\t1\t100\t1\t100\t0\t100\n"))
            .collect();
        let h = parse_blast(rows.as_bytes()).unwrap();

        let subjects: Vec<String> = chain_hsps(&h, 100).into_iter().map(|b| b.subject).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("s{i}")).collect();
        assert_eq!(subjects, expected);
    }

    #[test]
    fn test_condense_hsps() {
        let condensed = condense_hsps(&hits());
        assert_eq!(condensed.len(), 4);
        assert_eq!(condensed[0].query, "q1");
        assert_eq!(condensed[0].subject, "s1");
        assert!((condensed[0].score - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_cscores() {
        let h = hits();
        let scores = cscores(&h, 0.9999, false);
        let pairs: Vec<(&str, &str)> = scores
            .iter()
            .map(|c| (c.query.as_str(), c.subject.as_str()))
            .collect();
        assert_eq!(pairs, vec![("q1", "s1"), ("q2", "s2"), ("q3", "q3")]);

        let all = cscores(&h, 0.0, false);
        let q1s2 = all.iter().find(|c| c.query == "q1" && c.subject == "s2").unwrap();
        assert!((q1s2.cscore - 150.0 / 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_classes() {
        // q 1-100 of 100 against s 401-500 of 1000: a in b
        let b = BlastLine::parse("q\ts\t99\t100\t1\t0\t1\t100\t401\t500\t0\t180", 1).unwrap();
        assert_eq!(b.overlap(100, 1000, 10), Overlap::AInB);

        // q tail aligns to the s head: a ~ b
        let b = BlastLine::parse("q\ts\t99\t100\t1\t0\t901\t1000\t1\t100\t0\t180", 1).unwrap();
        assert_eq!(b.overlap(1000, 1000, 10), Overlap::AThenB);
        assert_eq!(b.overlap(1000, 1000, 10).to_string(), "a ~ b");

        // Same hit on the reverse strand swaps the subject hangs
        let b = BlastLine::parse("q\ts\t99\t100\t1\t0\t901\t1000\t1000\t901\t0\t180", 1).unwrap();
        assert_eq!(b.overlap(1000, 1000, 10), Overlap::AThenB);

        let b = BlastLine::parse("q\ts\t99\t100\t1\t0\t401\t500\t401\t500\t0\t180", 1).unwrap();
        assert_eq!(b.overlap(1000, 1000, 500), Overlap::None);
    }

    #[test]
    fn test_query_scores() {
        let h = hits();
        let ids: HashSet<String> = ["s1".to_string()].into_iter().collect();
        let scores = query_scores(&h, &ids);
        assert_eq!(scores.len(), 1);
        assert!((scores["q1"] - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_completeness() {
        let sizes = Sizes::from_entries(vec![
            ("s1".to_string(), 400),
            ("s2".to_string(), 600),
            ("q3".to_string(), 300),
        ]);
        let rows = completeness(&hits(), &sizes).unwrap();
        assert_eq!(rows.len(), 3);
        // q1 hits s1 at 201-300 and 351-400
        assert_eq!(
            rows[0],
            Completeness {
                query: "q1".to_string(),
                subject: "s1".to_string(),
                nterm: 200,
                cterm: 0,
                covered: 50,
            }
        );
        assert!(!rows[0].is_complete());
        assert_eq!(rows[1].covered, 33);
        assert!(rows[2].is_complete());

        let missing = Sizes::from_entries(vec![("s1".to_string(), 400)]);
        assert!(matches!(
            completeness(&hits(), &missing),
            Err(ParseError::MissingId(id)) if id == "s2"
        ));
    }

    #[test]
    fn test_subset_hits() {
        let genes = Bed::parse(
            "chr1\t0\t100\tq1\nchr1\t200\t300\tq2\n\
             chrA\t0\t100\ts1\nchrB\t0\t100\ts2\n"
                .as_bytes(),
        )
        .unwrap();
        let order = genes.order();
        let h: Vec<BlastLine> = hits().into_iter().filter(|b| b.query != "q3").collect();

        let qchrs: HashSet<&str> = ["chr1"].into_iter().collect();
        let schrs: HashSet<&str> = ["chrA"].into_iter().collect();
        let kept = subset_hits(&h, &order, &order, &qchrs, &schrs, false).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].raw(), h[0].raw());

        let converted = subset_hits(&h, &order, &order, &qchrs, &schrs, true).unwrap();
        assert_eq!(converted[0].query, "chr1_00000");
        assert_eq!(converted[0].subject, "chrA_00002");
        assert!(converted[0].raw().starts_with("chr1_00000\tchrA_00002\t"));

        let err = subset_hits(&hits(), &order, &order, &qchrs, &schrs, false).unwrap_err();
        assert!(matches!(err, ParseError::MissingId(id) if id == "q3"));
    }
}
