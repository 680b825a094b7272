//! btab alignment reports, the tab-delimited output of WU-BLAST and
//! NUCMER wrappers.
//!
//! A row has at least 20 columns. The ones read here (0-based):
//!
//! | Column | Field |
//! |--------|-------|
//! | 0  | query (first word kept) |
//! | 5  | subject |
//! | 6, 7 | query start and stop |
//! | 8, 9 | subject start and stop |
//! | 10 | percent identity |
//! | 13 | score |
//! | 15 | subject description |
//! | 17 | query strand, `Plus` or `Minus` |
//! | 19 | e-value |

use std::io::BufRead;
use std::path::Path;

use crate::formats::blast::BlastLine;
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;
use crate::utils::text::format_general;

const MIN_COLUMNS: usize = 20;

/// One btab alignment row
#[derive(Debug, Clone, PartialEq)]
pub struct BtabLine {
    pub query: String,
    pub subject: String,
    pub description: String,
    pub qstart: u64,
    pub qstop: u64,
    pub sstart: u64,
    pub sstop: u64,
    pub pctid: f64,
    pub score: f64,
    pub evalue: f64,
    pub qstrand: char,
}

impl BtabLine {
    /// Parse a tab-delimited btab row.
    ///
    /// Subject coordinates are swapped for hits on the minus strand of the
    /// query, so a converted row carries the strand in its column order.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for rows with fewer than 20
    /// columns or unparseable numbers.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let f: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if f.len() < MIN_COLUMNS {
            return Err(ParseError::at_line(
                line_num,
                format!("expected {MIN_COLUMNS} columns, found {}", f.len()),
            ));
        }

        let qstrand = if f[17] == "Minus" { '-' } else { '+' };
        let mut sstart: u64 = parse_field(f[8], "sstart", line_num)?;
        let mut sstop: u64 = parse_field(f[9], "sstop", line_num)?;
        if qstrand == '-' {
            std::mem::swap(&mut sstart, &mut sstop);
        }

        Ok(Self {
            query: f[0].split_whitespace().next().unwrap_or_default().to_string(),
            subject: f[5].to_string(),
            description: f[15].to_string(),
            qstart: parse_field(f[6], "qstart", line_num)?,
            qstop: parse_field(f[7], "qstop", line_num)?,
            sstart,
            sstop,
            pctid: parse_field(f[10], "pctid", line_num)?,
            score: parse_field(f[13], "score", line_num)?,
            evalue: parse_field(f[19], "evalue", line_num)?,
            qstrand,
        })
    }

    /// Tabular BLAST row; mismatches, gaps and alignment length are not
    /// part of btab and are written as zeros
    #[must_use]
    pub fn blast_row(&self) -> String {
        format!(
            "{}\t{} {}\t{:.2}\t0\t0\t0\t{}\t{}\t{}\t{}\t{}\t{:.1}",
            self.query,
            self.subject,
            self.description,
            self.pctid,
            self.qstart,
            self.qstop,
            self.sstart,
            self.sstop,
            format_general(self.evalue, 1),
            self.score
        )
    }

    /// The converted row parsed back as a BLAST hit
    ///
    /// # Errors
    ///
    /// Propagates parse errors of the generated row.
    pub fn to_blast(&self, line_num: usize) -> Result<BlastLine, ParseError> {
        BlastLine::parse(&self.blast_row(), line_num)
    }
}

/// Parse btab rows, skipping blank and `#` lines
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first malformed line.
pub fn parse_btab<R: BufRead>(reader: R) -> Result<Vec<(usize, BtabLine)>, ParseError> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }
        rows.push((i + 1, BtabLine::parse(&line, i + 1)?));
    }
    Ok(rows)
}

/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_btab`].
pub fn read_btab(path: &Path) -> Result<Vec<(usize, BtabLine)>, ParseError> {
    parse_btab(open_input(path)?)
}
