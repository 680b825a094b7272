//! GFF3 and GFF2 feature annotations.
//!
//! In GFF3 the ninth column reads `ID=cds00002;Parent=mRNA00002`, values
//! may be comma separated lists and are percent-encoded. In GFF2 it reads
//! `Gene 22240.t000374; Note "Carbonic anhydrase"`.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use tracing::{error, warn};

use crate::formats::bed::BedLine;
use crate::formats::fasta::{reverse_complement, FastaRecord};
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;

pub const VALID_STRANDS: [&str; 4] = ["+", "-", "?", "."];
pub const VALID_PHASES: [&str; 4] = ["0", "1", "2", "."];

/// Attribute dialect of the ninth column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Gff3,
    Gff2,
}

/// One feature row (1-based inclusive coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GffLine {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: String,
    pub phase: String,
    /// Attributes in file order, each with one or more values
    pub attributes: Vec<(String, Vec<String>)>,
}

impl GffLine {
    /// Parse a tab-delimited feature row
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for rows with fewer than 8
    /// columns, non-integer coordinates, or an invalid strand or phase.
    pub fn parse(line: &str, line_num: usize, dialect: Dialect) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() < 8 {
            return Err(ParseError::at_line(
                line_num,
                format!("expected at least 8 columns, found {}", fields.len()),
            ));
        }

        let strand = fields[6];
        if !VALID_STRANDS.contains(&strand) {
            return Err(ParseError::at_line(
                line_num,
                format!("strand must be one of {VALID_STRANDS:?}, found '{strand}'"),
            ));
        }
        let phase = fields[7];
        if !VALID_PHASES.contains(&phase) {
            return Err(ParseError::at_line(
                line_num,
                format!("phase must be one of {VALID_PHASES:?}, found '{phase}'"),
            ));
        }

        let attributes_text = fields.get(8).copied().unwrap_or("");
        let attributes = match dialect {
            Dialect::Gff3 => parse_gff3_attributes(attributes_text),
            Dialect::Gff2 => parse_gff2_attributes(attributes_text),
        };

        Ok(Self {
            seqid: fields[0].to_string(),
            source: fields[1].to_string(),
            feature_type: fields[2].to_string(),
            start: parse_field(fields[3], "start", line_num)?,
            end: parse_field(fields[4], "end", line_num)?,
            score: fields[5].to_string(),
            strand: strand.to_string(),
            phase: phase.to_string(),
            attributes,
        })
    }

    /// All values of an attribute
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value of the attribute `key`
    #[must_use]
    pub fn accn(&self, key: &str) -> Option<&str> {
        self.attribute(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// BED row named by attribute `key`; a `.` score becomes `1000`
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingId` when the feature lacks `key`.
    pub fn bedline(&self, key: &str) -> Result<BedLine, ParseError> {
        let accn = self.accn(key).ok_or_else(|| {
            ParseError::MissingId(format!(
                "{key} of {} feature at {}:{}",
                self.feature_type, self.seqid, self.start
            ))
        })?;
        let score = if self.score == "." { "1000" } else { &self.score };

        Ok(BedLine {
            seqid: self.seqid.clone(),
            start: self.start.saturating_sub(1),
            end: self.end,
            accn: Some(accn.to_string()),
            score: Some(score.to_string()),
            strand: Some(self.strand.clone()),
            extra: Vec::new(),
        })
    }
}

fn push_value(attributes: &mut Vec<(String, Vec<String>)>, key: &str, value: String) {
    match attributes.iter_mut().find(|(k, _)| k == key) {
        Some((_, values)) => values.push(value),
        None => attributes.push((key.to_string(), vec![value])),
    }
}

fn parse_gff3_attributes(text: &str) -> Vec<(String, Vec<String>)> {
    let mut attributes = Vec::new();
    for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, values)) = pair.split_once('=') else {
            continue;
        };
        for value in values.split(',') {
            let decoded = urlencoding::decode(value)
                .map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned);
            push_value(&mut attributes, key.trim(), decoded);
        }
    }
    attributes
}

fn parse_gff2_attributes(text: &str) -> Vec<(String, Vec<String>)> {
    let mut attributes = Vec::new();
    for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once(' ').unwrap_or((pair, ""));
        push_value(&mut attributes, key, value.trim().replace('"', ""));
    }
    attributes
}

/// All features of a GFF file
#[derive(Debug, Clone, Default)]
pub struct Gff {
    pub lines: Vec<GffLine>,
}

impl Gff {
    /// Parse feature rows, skipping blank and `#` lines and stopping at an
    /// embedded `##FASTA` section
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` naming the first malformed line.
    pub fn parse<R: BufRead>(reader: R, dialect: Dialect) -> Result<Self, ParseError> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with("##FASTA") {
                break;
            }
            if is_skippable(&line) {
                continue;
            }
            lines.push(GffLine::parse(&line, i + 1, dialect)?);
        }
        Ok(Self { lines })
    }

    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or the errors of
    /// [`Gff::parse`].
    pub fn from_file(path: &Path, dialect: Dialect) -> Result<Self, ParseError> {
        Self::parse(open_input(path)?, dialect)
    }

    /// BED rows for every feature of `feature_type`, sorted by position.
    ///
    /// Duplicate accessions are reported but kept.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingId` for a feature without `key`.
    pub fn to_bed(&self, feature_type: &str, key: &str) -> Result<Vec<BedLine>, ParseError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut bed = Vec::new();

        for g in self.lines.iter().filter(|g| g.feature_type == feature_type) {
            let b = g.bedline(key)?;
            if let Some(accn) = &b.accn {
                if !seen.insert(accn.clone()) {
                    error!("Duplicate name `{accn}` found");
                }
            }
            bed.push(b);
        }

        bed.sort_by(|a, b| (&a.seqid, a.start, a.end).cmp(&(&b.seqid, b.start, b.end)));
        Ok(bed)
    }

    /// Concatenated child sequences of every parent feature.
    ///
    /// Children of each parent are ordered by start, and reversed for
    /// parents on the `-` strand. Each child sequence is reverse
    /// complemented when the child itself is on `-`. Parents without
    /// children are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingId` when a child lies on a sequence that
    /// is not in `sequences`, and `ParseError::InvalidFormat` when it runs
    /// past the end of that sequence.
    pub fn load_features(
        &self,
        sequences: &HashMap<String, Vec<u8>>,
        parents: &[&str],
        children: &[&str],
    ) -> Result<Vec<FastaRecord>, ParseError> {
        let mut by_parent: HashMap<&str, Vec<&GffLine>> = HashMap::new();
        for child in self
            .lines
            .iter()
            .filter(|g| children.contains(&g.feature_type.as_str()))
        {
            for parent_id in child.attribute("Parent").unwrap_or_default() {
                by_parent.entry(parent_id.as_str()).or_default().push(child);
            }
        }

        let mut records = Vec::new();
        for parent in self
            .lines
            .iter()
            .filter(|g| parents.contains(&g.feature_type.as_str()))
        {
            let Some(id) = parent.accn("ID") else {
                warn!(
                    "{} feature at {}:{} has no ID",
                    parent.feature_type, parent.seqid, parent.start
                );
                continue;
            };

            let Some(kids) = by_parent.get_mut(id) else {
                warn!("{id} has no children with type {}", children.join(","));
                continue;
            };

            kids.sort_by_key(|c| c.start);
            if parent.strand == "-" {
                kids.reverse();
            }

            let mut sequence = Vec::new();
            for child in kids.iter() {
                sequence.extend(child_sequence(child, sequences)?);
            }
            records.push(FastaRecord::new(id, sequence));
        }

        Ok(records)
    }
}

fn child_sequence(
    child: &GffLine,
    sequences: &HashMap<String, Vec<u8>>,
) -> Result<Vec<u8>, ParseError> {
    let seq = sequences
        .get(&child.seqid)
        .ok_or_else(|| ParseError::MissingId(child.seqid.clone()))?;

    let start = usize::try_from(child.start.saturating_sub(1)).unwrap_or(usize::MAX);
    let end = usize::try_from(child.end).unwrap_or(usize::MAX);
    let slice = seq.get(start..end).ok_or_else(|| {
        ParseError::InvalidFormat(format!(
            "{}:{}-{} is outside the sequence ({} bp)",
            child.seqid,
            child.start,
            child.end,
            seq.len()
        ))
    })?;

    Ok(if child.strand == "-" {
        reverse_complement(slice)
    } else {
        slice.to_vec()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFF3: &str = "\
##gff-version 3
chr1\tsrc\tgene\t1\t12\t.\t+\t.\tID=gene1;Name=Alpha%20one
chr1\tsrc\tmRNA\t1\t12\t.\t+\t.\tID=mRNA1;Parent=gene1
chr1\tsrc\tCDS\t7\t9\t.\t+\t0\tID=cds2;Parent=mRNA1
chr1\tsrc\tCDS\t1\t3\t.\t+\t0\tID=cds1;Parent=mRNA1
chr2\tsrc\tgene\t2\t5\t12.5\t-\t.\tID=gene2
chr2\tsrc\tmRNA\t2\t5\t.\t-\t.\tID=mRNA2;Parent=gene2
chr2\tsrc\tCDS\t2\t3\t.\t-\t0\tParent=mRNA2,mRNA3
chr2\tsrc\tCDS\t4\t5\t.\t-\t0\tParent=mRNA2
chr2\tsrc\tmRNA\t2\t5\t.\t-\t.\tID=mRNA3;Parent=gene2
##FASTA
>chr1
ACGT
";

    fn gff() -> Gff {
        Gff::parse(GFF3.as_bytes(), Dialect::Gff3).unwrap()
    }

    #[test]
    fn test_parse_stops_at_fasta() {
        assert_eq!(gff().lines.len(), 9);
    }

    #[test]
    fn test_gff3_attributes() {
        let g = gff();
        assert_eq!(g.lines[0].accn("Name"), Some("Alpha one"));
        assert_eq!(
            g.lines[6].attribute("Parent"),
            Some(&["mRNA2".to_string(), "mRNA3".to_string()][..])
        );
        assert_eq!(g.lines[6].accn("ID"), None);
    }

    #[test]
    fn test_gff2_attributes() {
        let line = "chr1\tsrc\tgene\t1\t10\t.\t+\t.\tGene 22240.t000374; Note \"Carbonic anhydrase\"";
        let g = GffLine::parse(line, 1, Dialect::Gff2).unwrap();
        assert_eq!(g.accn("Gene"), Some("22240.t000374"));
        assert_eq!(g.accn("Note"), Some("Carbonic anhydrase"));
    }

    #[test]
    fn test_invalid_strand_and_phase() {
        let bad_strand = "chr1\tsrc\tgene\t1\t10\t.\tx\t.\tID=a";
        assert!(GffLine::parse(bad_strand, 3, Dialect::Gff3)
            .unwrap_err()
            .to_string()
            .contains("line 3"));
        let bad_phase = "chr1\tsrc\tgene\t1\t10\t.\t+\t5\tID=a";
        assert!(GffLine::parse(bad_phase, 1, Dialect::Gff3).is_err());
    }

    #[test]
    fn test_to_bed() {
        let bed = gff().to_bed("gene", "ID").unwrap();
        let rows: Vec<String> = bed.iter().map(ToString::to_string).collect();
        assert_eq!(
            rows,
            vec!["chr1\t0\t12\tgene1\t1000\t+", "chr2\t1\t5\tgene2\t12.5\t-"]
        );

        // CDS rows on chr2 lack an ID
        assert!(matches!(
            gff().to_bed("CDS", "ID"),
            Err(ParseError::MissingId(_))
        ));
    }

    #[test]
    fn test_load_features() {
        let mut sequences = HashMap::new();
        sequences.insert("chr1".to_string(), b"AAACCCGGGTTT".to_vec());
        sequences.insert("chr2".to_string(), b"TACGTA".to_vec());

        let records = gff().load_features(&sequences, &["mRNA"], &["CDS"]).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["mRNA1", "mRNA2", "mRNA3"]);

        assert_eq!(records[0].sequence, b"AAAGGG".to_vec());
        // chr2 4-5 is "GT" -> "AC", then 2-3 "AC" -> "GT"
        assert_eq!(records[1].sequence, b"ACGT".to_vec());
        assert_eq!(records[2].sequence, b"GT".to_vec());
    }

    #[test]
    fn test_load_features_missing_sequence() {
        let sequences = HashMap::new();
        let err = gff()
            .load_features(&sequences, &["mRNA"], &["CDS"])
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingId(id) if id == "chr1"));
    }
}
