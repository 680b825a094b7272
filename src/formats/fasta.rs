//! FASTA reading with noodles, plus writing and sequence helpers.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.fas` (uncompressed)
//! - the same with `.gz` or `.bgz` appended (compressed)

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;

use noodles::fasta;
use serde::Serialize;

use crate::core::stats::n50;
use crate::formats::ParseError;
use crate::utils::io::open_input;
use crate::utils::text::count_to_f64;

/// Default line width for FASTA output
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    for ext in [".fa", ".fasta", ".fna", ".fas"] {
        for comp in [".gz", ".bgz"] {
            if path_str.ends_with(&format!("{ext}{comp}")) {
                return true;
            }
        }
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna" | "fas")
    )
}

/// A single FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First word of the definition line
    pub name: String,
    /// Rest of the definition line, if any
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// MD5 of the upper-cased sequence (standard convention)
    #[must_use]
    pub fn md5(&self) -> String {
        let uppercase: Vec<u8> = self.sequence.iter().map(u8::to_ascii_uppercase).collect();
        format!("{:x}", md5::compute(&uppercase))
    }

    /// Write the record wrapped at `width` columns (`0` for a single line)
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing fails.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W, width: usize) -> std::io::Result<()> {
        match &self.description {
            Some(desc) => writeln!(w, ">{} {}", self.name, desc)?,
            None => writeln!(w, ">{}", self.name)?,
        }

        if width == 0 {
            w.write_all(&self.sequence)?;
            writeln!(w)?;
        } else {
            for chunk in self.sequence.chunks(width) {
                w.write_all(chunk)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

impl From<fasta::Record> for FastaRecord {
    fn from(record: fasta::Record) -> Self {
        Self {
            name: String::from_utf8_lossy(record.name()).to_string(),
            description: record
                .description()
                .map(|d| String::from_utf8_lossy(d).to_string()),
            sequence: record.sequence().as_ref().to_vec(),
        }
    }
}

/// Stream every record of a FASTA file through `visit`.
///
/// Returns the number of records read. The callback's error type only
/// needs a conversion from [`ParseError`], so CLI handlers can use
/// `anyhow::Error` directly.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if a record is malformed, or any error returned by `visit`.
pub fn visit_records<F, E>(path: &Path, mut visit: F) -> Result<usize, E>
where
    F: FnMut(FastaRecord) -> Result<(), E>,
    E: From<ParseError>,
{
    let reader = open_input(path)?;
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut count = 0;

    for result in fasta_reader.records() {
        let record = result.map_err(|e| {
            ParseError::Noodles(format!("Failed to parse FASTA record: {e}"))
        })?;
        count += 1;
        visit(record.into())?;
    }

    Ok(count)
}

/// Read all records of a FASTA file into memory
///
/// # Errors
///
/// Returns the same errors as [`visit_records`].
pub fn read_records(path: &Path) -> Result<Vec<FastaRecord>, ParseError> {
    let mut records = Vec::new();
    visit_records(path, |r| {
        records.push(r);
        Ok::<(), ParseError>(())
    })?;
    Ok(records)
}

/// Read all sequences keyed by record name
///
/// # Errors
///
/// Returns the same errors as [`visit_records`].
pub fn read_sequences(path: &Path) -> Result<HashMap<String, Vec<u8>>, ParseError> {
    Ok(read_records(path)?
        .into_iter()
        .map(|r| (r.name, r.sequence))
        .collect())
}

/// Name and length of every record, in file order.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` when the file holds no sequences, or
/// the errors of [`visit_records`].
pub fn read_sizes(path: &Path) -> Result<Vec<(String, u64)>, ParseError> {
    let mut sizes = Vec::new();
    visit_records(path, |r| {
        sizes.push((r.name.clone(), r.len() as u64));
        Ok::<(), ParseError>(())
    })?;

    if sizes.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }
    Ok(sizes)
}

/// Reverse complement of a nucleotide sequence, keeping case and IUPAC codes
#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            b'a' => b't',
            b't' => b'a',
            b'c' => b'g',
            b'g' => b'c',
            b'R' => b'Y',
            b'Y' => b'R',
            b'K' => b'M',
            b'M' => b'K',
            b'B' => b'V',
            b'V' => b'B',
            b'D' => b'H',
            b'H' => b'D',
            b'r' => b'y',
            b'y' => b'r',
            b'k' => b'm',
            b'm' => b'k',
            b'b' => b'v',
            b'v' => b'b',
            b'd' => b'h',
            b'h' => b'd',
            other => other,
        })
        .collect()
}

/// Runs of `N`/`n` at least `mingap` long, as 0-based half-open intervals
#[must_use]
pub fn find_gaps(seq: &[u8], mingap: usize) -> Vec<(usize, usize)> {
    let mut gaps = Vec::new();
    let mut run_start = None;

    for (i, &b) in seq.iter().enumerate() {
        let is_gap = b == b'N' || b == b'n';
        match (is_gap, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if i - start >= mingap {
                    gaps.push((start, i));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if seq.len() - start >= mingap {
            gaps.push((start, seq.len()));
        }
    }

    gaps
}

/// Composition and length statistics for a FASTA file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FastaSummary {
    pub filename: String,
    pub records: usize,
    pub total_bases: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub n50: u64,
    pub l50: usize,
    /// GC percentage among unambiguous A/C/G/T bases
    pub gc_pct: f64,
    pub n_count: u64,
}

/// Accumulates a [`FastaSummary`] one record at a time
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    lengths: Vec<u64>,
    gc: u64,
    acgt: u64,
    n_count: u64,
}

impl SummaryBuilder {
    pub fn add(&mut self, record: &FastaRecord) {
        self.lengths.push(record.len() as u64);
        for &b in &record.sequence {
            match b.to_ascii_uppercase() {
                b'G' | b'C' => {
                    self.gc += 1;
                    self.acgt += 1;
                }
                b'A' | b'T' => self.acgt += 1,
                b'N' => self.n_count += 1,
                _ => {}
            }
        }
    }

    /// Finish the summary, `None` when no records were added
    #[must_use]
    pub fn finish(self, filename: impl Into<String>) -> Option<FastaSummary> {
        let (n50, l50) = n50(&self.lengths).unwrap_or((0, 0));
        let total: u64 = self.lengths.iter().sum();
        let records = self.lengths.len();

        if records == 0 {
            return None;
        }

        Some(FastaSummary {
            filename: filename.into(),
            records,
            total_bases: total,
            min: self.lengths.iter().copied().min().unwrap_or(0),
            max: self.lengths.iter().copied().max().unwrap_or(0),
            mean: count_to_f64(total) / count_to_f64(records as u64),
            n50,
            l50,
            gc_pct: if self.acgt == 0 {
                0.0
            } else {
                count_to_f64(self.gc) * 100.0 / count_to_f64(self.acgt)
            },
            n_count: self.n_count,
        })
    }
}

/// Summarize a FASTA file
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` when the file holds no sequences, or
/// the errors of [`visit_records`].
pub fn summarize(path: &Path) -> Result<FastaSummary, ParseError> {
    let mut builder = SummaryBuilder::default();
    visit_records(path, |r| {
        builder.add(&r);
        Ok::<(), ParseError>(())
    })?;

    builder
        .finish(path.display().to_string())
        .ok_or_else(|| ParseError::InvalidFormat("No sequences found in FASTA file".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn fasta_file(content: &[u8]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Reference.FA")));

        assert!(!is_fasta_file(Path::new("test.sizes")));
        assert!(!is_fasta_file(Path::new("test.fai")));
    }

    #[test]
    fn test_read_records() {
        let temp = fasta_file(b">chr1 description\nACGTACGT\nACGT\n>chr2\nGGGG\n");

        let records = read_records(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].description.as_deref(), Some("description"));
        assert_eq!(records[0].len(), 12);
        assert_eq!(records[1].sequence, b"GGGG");
    }

    #[test]
    fn test_read_sizes_empty() {
        let temp = fasta_file(b"");
        assert!(read_sizes(temp.path()).is_err());
    }

    #[test]
    fn test_md5_uppercase() {
        // "ACGT" uppercase -> MD5 = f1f8f4bf413b16ad135722aa4591043e
        let record = FastaRecord::new("chr1", b"acgt".to_vec());
        assert_eq!(record.md5(), "f1f8f4bf413b16ad135722aa4591043e");
    }

    #[test]
    fn test_write_wrapped() {
        let record = FastaRecord::new("s", b"ACGTACGTAC".to_vec());
        let mut out = Vec::new();
        record.write(&mut out, 4).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">s\nACGT\nACGT\nAC\n");

        let mut out = Vec::new();
        record.write(&mut out, 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">s\nACGTACGTAC\n");
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"AACGTn"), b"nACGTT".to_vec());
    }

    #[test]
    fn test_find_gaps() {
        let seq = b"ACNNNNGTnnAC NNN".to_vec();
        let seq: Vec<u8> = seq.into_iter().filter(|b| *b != b' ').collect();
        assert_eq!(find_gaps(&seq, 3), vec![(2, 6), (12, 15)]);
        assert_eq!(find_gaps(&seq, 2), vec![(2, 6), (8, 10), (12, 15)]);
        assert!(find_gaps(b"ACGT", 1).is_empty());
    }

    #[test]
    fn test_summarize() {
        let temp = fasta_file(b">a\nGGCCAATT\n>b\nNNAT\n>c\nGC\n");
        let summary = summarize(temp.path()).unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.total_bases, 14);
        assert_eq!(summary.min, 2);
        assert_eq!(summary.max, 8);
        assert_eq!(summary.n50, 8);
        assert_eq!(summary.l50, 1);
        assert_eq!(summary.n_count, 2);
        // 6 GC out of 12 ACGT bases
        assert!((summary.gc_pct - 50.0).abs() < 1e-9);
    }
}
