//! AGP v2 golden-path files.
//!
//! Each row places either a component (a sequenced piece) or a gap on an
//! object (a scaffold or chromosome):
//!
//! | Column | Component row (`W`, `A`, `D`, `F`, `G`, `O`, `P`) | Gap row (`N`, `U`) |
//! |--------|-----------------|--------------|
//! | 1-5    | object, object_beg, object_end, part_number, component_type | same |
//! | 6      | component_id    | gap_length   |
//! | 7      | component_beg   | gap_type     |
//! | 8      | component_end   | linkage      |
//! | 9      | orientation     | evidence     |

use std::io::{BufRead, Write};
use std::path::Path;

use serde::Serialize;

use crate::formats::bed::BedLine;
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;

const COMPONENT_TYPES: &[&str] = &["A", "D", "F", "G", "O", "P", "W"];
const GAP_TYPES: &[&str] = &["N", "U"];
const VALID_ORIENTATIONS: &[&str] = &["+", "-", "?", "0", "na"];

/// What a row places on its object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgpPart {
    Component {
        id: String,
        beg: u64,
        end: u64,
        orientation: String,
    },
    Gap {
        length: u64,
        gap_type: String,
        linkage: String,
        evidence: String,
    },
}

/// One AGP row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgpLine {
    pub object: String,
    pub object_beg: u64,
    pub object_end: u64,
    pub part_number: u64,
    pub component_type: String,
    pub part: AgpPart,
}

impl AgpLine {
    /// Parse a tab-delimited AGP row
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for short rows, non-integer
    /// coordinates, or unknown component types.
    pub fn parse(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() < 8 {
            return Err(ParseError::at_line(
                line_num,
                format!("expected at least 8 columns, found {}", fields.len()),
            ));
        }
        // Evidence may be left empty on gap rows written by older tools
        let ninth = fields.get(8).copied().unwrap_or("");

        let component_type = fields[4].to_string();
        let part = if COMPONENT_TYPES.contains(&component_type.as_str()) {
            AgpPart::Component {
                id: fields[5].to_string(),
                beg: parse_field(fields[6], "component_beg", line_num)?,
                end: parse_field(fields[7], "component_end", line_num)?,
                orientation: ninth.to_string(),
            }
        } else if GAP_TYPES.contains(&component_type.as_str()) {
            AgpPart::Gap {
                length: parse_field(fields[5], "gap_length", line_num)?,
                gap_type: fields[6].to_string(),
                linkage: fields[7].to_string(),
                evidence: ninth.to_string(),
            }
        } else {
            return Err(ParseError::at_line(
                line_num,
                format!("unknown component type '{component_type}'"),
            ));
        };

        Ok(Self {
            object: fields[0].to_string(),
            object_beg: parse_field(fields[1], "object_beg", line_num)?,
            object_end: parse_field(fields[2], "object_end", line_num)?,
            part_number: parse_field(fields[3], "part_number", line_num)?,
            component_type,
            part,
        })
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self.part, AgpPart::Gap { .. })
    }

    /// Number of object bases this row covers
    #[must_use]
    pub fn object_span(&self) -> u64 {
        (self.object_end + 1).saturating_sub(self.object_beg)
    }

    /// Component rows as BED in object coordinates
    #[must_use]
    pub fn component_bed(&self) -> Option<BedLine> {
        match &self.part {
            AgpPart::Component { id, orientation, .. } => Some(BedLine {
                seqid: self.object.clone(),
                start: self.object_beg.saturating_sub(1),
                end: self.object_end,
                accn: Some(id.clone()),
                score: Some("0".to_string()),
                strand: Some(orientation.clone()),
                extra: Vec::new(),
            }),
            AgpPart::Gap { .. } => None,
        }
    }

    /// Gap rows as BED in object coordinates, gap length as score
    #[must_use]
    pub fn gap_bed(&self) -> Option<BedLine> {
        match &self.part {
            AgpPart::Gap {
                length, gap_type, ..
            } => Some(BedLine {
                seqid: self.object.clone(),
                start: self.object_beg.saturating_sub(1),
                end: self.object_end,
                accn: Some(gap_type.clone()),
                score: Some(length.to_string()),
                strand: None,
                extra: Vec::new(),
            }),
            AgpPart::Component { .. } => None,
        }
    }
}

impl std::fmt::Display for AgpLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t",
            self.object, self.object_beg, self.object_end, self.part_number, self.component_type
        )?;
        match &self.part {
            AgpPart::Component {
                id,
                beg,
                end,
                orientation,
            } => write!(f, "{id}\t{beg}\t{end}\t{orientation}"),
            AgpPart::Gap {
                length,
                gap_type,
                linkage,
                evidence,
            } => write!(f, "{length}\t{gap_type}\t{linkage}\t{evidence}"),
        }
    }
}

/// All rows of an AGP file, in file order
#[derive(Debug, Clone, Default)]
pub struct Agp {
    pub lines: Vec<AgpLine>,
}

impl Agp {
    /// Parse AGP rows, skipping blank and `#` comment lines
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` naming the first malformed line.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if is_skippable(&line) {
                continue;
            }
            lines.push(AgpLine::parse(&line, i + 1)?);
        }
        Ok(Self { lines })
    }

    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or the errors of
    /// [`Agp::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        Self::parse(open_input(path)?)
    }

    /// Rows grouped by object, objects in first-appearance order
    #[must_use]
    pub fn objects(&self) -> Vec<(&str, Vec<&AgpLine>)> {
        let mut groups: Vec<(&str, Vec<&AgpLine>)> = Vec::new();
        let mut index = std::collections::HashMap::new();
        for line in &self.lines {
            let i = *index.entry(line.object.as_str()).or_insert_with(|| {
                groups.push((line.object.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[i].1.push(line);
        }
        groups
    }

    /// Check the per-object layout rules and return every violation found
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (object, rows) in self.objects() {
            let mut previous_end = 0;
            for (k, row) in rows.iter().enumerate() {
                let expected_part = k as u64 + 1;
                let at = format!("{object}:{}-{}", row.object_beg, row.object_end);

                if row.object_beg > row.object_end {
                    problems.push(format!("{at}: object_beg is after object_end"));
                }
                if row.part_number != expected_part {
                    problems.push(format!(
                        "{at}: part number {} should be {expected_part}",
                        row.part_number
                    ));
                }
                if row.object_beg != previous_end + 1 {
                    problems.push(format!("{at}: expected to start at {}", previous_end + 1));
                }

                match &row.part {
                    AgpPart::Component {
                        id,
                        beg,
                        end,
                        orientation,
                    } => {
                        if beg > end {
                            problems.push(format!("{at}: component {id} begins after it ends"));
                        } else if end - beg + 1 != row.object_span() {
                            problems.push(format!(
                                "{at}: component {id} span {} differs from object span {}",
                                end - beg + 1,
                                row.object_span()
                            ));
                        }
                        if !VALID_ORIENTATIONS.contains(&orientation.as_str()) {
                            problems.push(format!("{at}: invalid orientation '{orientation}'"));
                        }
                    }
                    AgpPart::Gap { length, .. } => {
                        if *length != row.object_span() {
                            problems.push(format!(
                                "{at}: gap length {length} differs from object span {}",
                                row.object_span()
                            ));
                        }
                    }
                }

                previous_end = row.object_end;
            }
        }

        problems
    }

    /// Per-object component and gap counts
    #[must_use]
    pub fn summary(&self) -> Vec<ObjectSummary> {
        self.objects()
            .into_iter()
            .map(|(object, rows)| {
                let mut summary = ObjectSummary {
                    object: object.to_string(),
                    ..ObjectSummary::default()
                };
                for row in rows {
                    if row.is_gap() {
                        summary.gaps += 1;
                        summary.gap_bases += row.object_span();
                    } else {
                        summary.components += 1;
                    }
                    summary.length = summary.length.max(row.object_end);
                }
                summary
            })
            .collect()
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

/// Layout counts for one AGP object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub object: String,
    pub components: usize,
    pub gaps: usize,
    pub gap_bases: u64,
    pub length: u64,
}

/// An ordered list of objects, each made of oriented contigs.
///
/// Writing produces one AGP row per contig, contigs of an object laid end
/// to end.
#[derive(Debug, Clone, Default)]
pub struct ObjectOrder {
    objects: Vec<(String, Vec<(String, u64, char)>)>,
}

impl ObjectOrder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contig to an object, creating the object if needed
    pub fn add(&mut self, object: &str, contig: &str, size: u64, orientation: char) {
        match self.objects.iter_mut().find(|(name, _)| name == object) {
            Some((_, contigs)) => contigs.push((contig.to_string(), size, orientation)),
            None => self.objects.push((
                object.to_string(),
                vec![(contig.to_string(), size, orientation)],
            )),
        }
    }

    #[must_use]
    pub fn to_agp(&self) -> Agp {
        let mut lines = Vec::new();

        for (object, contigs) in &self.objects {
            let mut pos = 0;
            for (part_number, (contig, size, orientation)) in (1u64..).zip(contigs) {
                lines.push(AgpLine {
                    object: object.clone(),
                    object_beg: pos + 1,
                    object_end: pos + size,
                    part_number,
                    component_type: "W".to_string(),
                    part: AgpPart::Component {
                        id: contig.clone(),
                        beg: 1,
                        end: *size,
                        orientation: orientation.to_string(),
                    },
                });
                pos += size;
            }
        }

        Agp { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGP: &str = "\
# AGP-version 2.0
scaffold1\t1\t100\t1\tW\tctg1\t1\t100\t+
scaffold1\t101\t150\t2\tN\t50\tscaffold\tyes\tpaired-ends
scaffold1\t151\t180\t3\tW\tctg2\t11\t40\t-
scaffold2\t1\t70\t1\tW\tctg3\t1\t70\t+
";

    #[test]
    fn test_parse_agp() {
        let agp = Agp::parse(AGP.as_bytes()).unwrap();
        assert_eq!(agp.lines.len(), 4);
        assert!(agp.lines[1].is_gap());
        assert_eq!(
            agp.lines[2].part,
            AgpPart::Component {
                id: "ctg2".to_string(),
                beg: 11,
                end: 40,
                orientation: "-".to_string()
            }
        );
        assert_eq!(agp.lines[0].to_string(), "scaffold1\t1\t100\t1\tW\tctg1\t1\t100\t+");
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = Agp::parse("s\t1\t10\t1\tX\tc\t1\t10\t+\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(err.to_string().contains("unknown component type"));
    }

    /// Gap rows written without the evidence column still parse
    #[test]
    fn test_parse_gap_without_evidence() {
        let agp = Agp::parse(
            "chr1\t1\t100\t1\tW\tctg1\t1\t100\t+\nchr1\t101\t150\t2\tN\t50\tscaffold\tyes\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(
            agp.lines[1].part,
            AgpPart::Gap {
                length: 50,
                gap_type: "scaffold".to_string(),
                linkage: "yes".to_string(),
                evidence: String::new(),
            }
        );
        assert!(agp.validate().is_empty());

        let err = Agp::parse("chr1\t1\t100\t1\tW\tctg1\t1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("expected at least 8 columns"));
    }

    #[test]
    fn test_validate_clean() {
        let agp = Agp::parse(AGP.as_bytes()).unwrap();
        assert!(agp.validate().is_empty());
    }

    #[test]
    fn test_validate_problems() {
        let bad = "\
s1\t1\t100\t1\tW\tctg1\t1\t90\t+
s1\t102\t150\t3\tN\t40\tscaffold\tyes\tmap
s1\t151\t160\t4\tW\tctg2\t1\t10\tx
";
        let problems = Agp::parse(bad.as_bytes()).unwrap().validate();
        assert_eq!(problems.len(), 6, "{problems:?}");
        assert!(problems.iter().any(|p| p.contains("span 90")));
        assert!(problems.iter().any(|p| p.contains("expected to start at 101")));
        assert!(problems.iter().any(|p| p.contains("gap length 40")));
        assert!(problems.iter().any(|p| p.contains("invalid orientation")));
    }

    #[test]
    fn test_summary() {
        let agp = Agp::parse(AGP.as_bytes()).unwrap();
        let summary = agp.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0],
            ObjectSummary {
                object: "scaffold1".to_string(),
                components: 2,
                gaps: 1,
                gap_bases: 50,
                length: 180,
            }
        );
        assert_eq!(summary[1].length, 70);
    }

    #[test]
    fn test_object_order_end_to_end() {
        let mut oo = ObjectOrder::new();
        oo.add("chr1", "ctgA", 500, '+');
        oo.add("chr1", "ctgB", 300, '-');
        oo.add("chr2", "ctgC", 50, '+');

        let agp = oo.to_agp();
        assert_eq!(agp.lines.len(), 3);
        assert_eq!(agp.lines[1].object_beg, 501);
        assert_eq!(agp.lines[1].object_end, 800);
        assert_eq!(agp.lines[1].part_number, 2);
        assert_eq!(agp.lines[2].object, "chr2");
        assert_eq!(agp.lines[2].part_number, 1);
        assert!(agp.validate().is_empty());
    }

    #[test]
    fn test_component_bed() {
        let agp = Agp::parse(AGP.as_bytes()).unwrap();
        let bed = agp.lines[2].component_bed().unwrap();
        assert_eq!(bed.to_string(), "scaffold1\t150\t180\tctg2\t0\t-");
        assert!(agp.lines[1].component_bed().is_none());
        assert_eq!(
            agp.lines[1].gap_bed().unwrap().to_string(),
            "scaffold1\t100\t150\tscaffold\t50"
        );
    }
}
