//! SAM/BAM headers (through noodles), SAM alignment lines and
//! `genomeCoverageBed` histograms.

use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;
use crate::utils::text::count_to_f64;

/// Reference sequence names and lengths from a SAM or BAM header.
///
/// BAM is chosen by the `.bam` extension; anything else (including `-` for
/// stdin and gzipped SAM) is read as SAM text.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read,
/// `ParseError::Noodles` if the header cannot be parsed, or
/// `ParseError::InvalidFormat` if the header has no `@SQ` lines.
pub fn read_header_sizes(path: &Path) -> Result<Vec<(String, u64)>, ParseError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let header = match extension.as_deref() {
        Some("bam") => read_bam_header(path)?,
        _ => read_sam_header(path)?,
    };

    let sizes = header_sizes(&header);
    if sizes.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "No @SQ lines found in `{}`",
            path.display()
        )));
    }
    debug!("Found {} reference sequences in `{}`", sizes.len(), path.display());
    Ok(sizes)
}

fn read_sam_header(path: &Path) -> Result<noodles::sam::Header, ParseError> {
    use noodles::sam;

    let mut reader = sam::io::Reader::new(open_input(path)?);
    reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))
}

fn read_bam_header(path: &Path) -> Result<noodles::sam::Header, ParseError> {
    use noodles::bam;

    let mut reader = std::fs::File::open(path).map(bam::io::Reader::new)?;
    reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))
}

fn header_sizes(header: &noodles::sam::Header) -> Vec<(String, u64)> {
    header
        .reference_sequences()
        .iter()
        .map(|(name, map)| (name.to_string(), map.length().get() as u64))
        .collect()
}

/// The mandatory columns of one SAM alignment line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamLine {
    pub qname: String,
    pub flag: u16,
    pub rname: String,
    pub pos: u64,
    pub mapq: u8,
    pub cigar: String,
    pub rnext: String,
    pub pnext: u64,
    pub tlen: i64,
    pub seq: String,
    pub qual: String,
}

impl SamLine {
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for lines with fewer than 11
    /// columns or non-numeric fields.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let f: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if f.len() < 11 {
            return Err(ParseError::at_line(
                line_num,
                format!("expected 11 columns, found {}", f.len()),
            ));
        }

        Ok(Self {
            qname: f[0].to_string(),
            flag: parse_field(f[1], "flag", line_num)?,
            rname: f[2].to_string(),
            pos: parse_field(f[3], "pos", line_num)?,
            mapq: parse_field(f[4], "mapq", line_num)?,
            cigar: f[5].to_string(),
            rnext: f[6].to_string(),
            pnext: parse_field(f[7], "pnext", line_num)?,
            tlen: parse_field(f[8], "tlen", line_num)?,
            seq: f[9].to_string(),
            qual: f[10].to_string(),
        })
    }

    /// `qname:qpos<TAB>rname:pos`, where `qpos` is the CIGAR text before the
    /// first hard clip
    #[must_use]
    pub fn pairline(&self) -> String {
        let qpos = self.cigar.split('H').next().unwrap_or("");
        format!("{}:{qpos}\t{}:{}", self.qname, self.rname, self.pos)
    }
}

/// Parse alignment lines, skipping `@` header lines
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first malformed line.
pub fn parse_alignments<R: BufRead>(reader: R) -> Result<Vec<SamLine>, ParseError> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('@') || line.trim().is_empty() {
            continue;
        }
        lines.push(SamLine::parse(&line, i + 1)?);
    }
    Ok(lines)
}

/// One row of `genomeCoverageBed` output: `seqid depth positions length
/// fraction`
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeCoverageLine {
    pub seqid: String,
    pub depth: u64,
    pub positions: u64,
    pub length: u64,
    pub fraction: f64,
}

impl GenomeCoverageLine {
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for rows with fewer than 5
    /// columns or non-numeric fields.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let f: Vec<&str> = line.split_whitespace().collect();
        if f.len() < 5 {
            return Err(ParseError::at_line(
                line_num,
                format!("expected 5 columns, found {}", f.len()),
            ));
        }
        Ok(Self {
            seqid: f[0].to_string(),
            depth: parse_field(f[1], "depth", line_num)?,
            positions: parse_field(f[2], "positions", line_num)?,
            length: parse_field(f[3], "length", line_num)?,
            fraction: parse_field(f[4], "fraction", line_num)?,
        })
    }
}

/// Mean depth per seqid over consecutive rows; the `genome` summary rows are
/// skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first malformed row.
pub fn mean_coverage<R: BufRead>(reader: R) -> Result<Vec<(String, f64)>, ParseError> {
    let mut means: Vec<(String, f64)> = Vec::new();
    let mut current: Option<(String, u64, u64)> = None;

    let finish = |group: Option<(String, u64, u64)>, means: &mut Vec<(String, f64)>| {
        if let Some((seqid, counts, length)) = group {
            let mean = if length == 0 {
                0.0
            } else {
                count_to_f64(counts) / count_to_f64(length)
            };
            means.push((seqid, mean));
        }
    };

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }
        let row = GenomeCoverageLine::parse(&line, i + 1)?;
        if row.seqid == "genome" {
            continue;
        }

        if let Some((seqid, counts, _)) = current.as_mut() {
            if *seqid == row.seqid {
                *counts += row.depth * row.positions;
                continue;
            }
        }
        finish(current.take(), &mut means);
        current = Some((row.seqid, row.depth * row.positions, row.length));
    }
    finish(current, &mut means);

    Ok(means)
}
