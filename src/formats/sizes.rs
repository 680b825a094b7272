//! Two-column `.sizes` files (`name size`), often produced by
//! `faSize -detailed`.
//!
//! A FASTA file can stand in for a sizes file; sizes are then computed
//! from the sequences.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::formats::fasta::{is_fasta_file, read_sizes};
use crate::formats::{is_skippable, parse_field, ParseError};
use crate::utils::io::open_input;

/// Ordered contig sizes with cumulative offsets
#[derive(Debug, Clone, Default)]
pub struct Sizes {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    /// `cumsizes[i]` is the total size of all contigs before contig `i`;
    /// the last element is the total size.
    cumsizes: Vec<u64>,
}

impl Sizes {
    /// Build from `(name, size)` pairs, keeping input order
    #[must_use]
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        let mut cumsizes = Vec::with_capacity(entries.len() + 1);
        let mut total = 0;
        cumsizes.push(total);
        for (_, size) in &entries {
            total += size;
            cumsizes.push(total);
        }

        Self {
            entries,
            index,
            cumsizes,
        }
    }

    /// Load sizes from a sizes file or a FASTA file.
    ///
    /// With `select`, only contigs at least that long are kept.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or
    /// `ParseError::InvalidFormat` on malformed rows or when no contigs are
    /// found.
    pub fn from_file(path: &Path, select: Option<u64>) -> Result<Self, ParseError> {
        let mut entries = if is_fasta_file(path) {
            debug!("Computing sizes from FASTA `{}`", path.display());
            read_sizes(path)?
        } else {
            let reader = open_input(path)?;
            parse_sizes(reader)?
        };

        if let Some(min) = select {
            entries.retain(|(_, size)| *size >= min);
        }

        if entries.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "No sizes found in `{}`",
                path.display()
            )));
        }

        Ok(Self::from_entries(entries))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get_size(&self, ctg: &str) -> Option<u64> {
        self.index.get(ctg).map(|&i| self.entries[i].1)
    }

    /// Offset of a contig when all contigs are laid end to end
    #[must_use]
    pub fn get_cumsize(&self, ctg: &str) -> Option<u64> {
        self.index.get(ctg).map(|&i| self.cumsizes[i])
    }

    /// Position on the concatenated layout, `None` for unknown contigs
    #[must_use]
    pub fn get_position(&self, ctg: &str, pos: u64) -> Option<u64> {
        self.get_cumsize(ctg).map(|offset| offset + pos)
    }

    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.cumsizes.last().copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, size)| (name.as_str(), *size))
    }

    /// `(name, start, end)` of every contig on the concatenated layout
    pub fn iter_breaks(&self) -> impl Iterator<Item = (&str, u64, u64)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), self.cumsizes[i], self.cumsizes[i + 1]))
    }

    /// Write as `name<TAB>size` lines
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing fails.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        for (name, size) in self.iter() {
            writeln!(w, "{name}\t{size}")?;
        }
        Ok(())
    }

    /// Write trivial liftUp lines: `0 ctg size ctg size`
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing fails.
    pub fn write_lft<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        for (name, size) in self.iter() {
            writeln!(w, "0\t{name}\t{size}\t{name}\t{size}")?;
        }
        Ok(())
    }
}

/// Parse `name size` rows (whitespace separated, extra columns ignored)
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for rows with fewer than 2 fields or
/// a non-integer size.
pub fn parse_sizes<R: BufRead>(reader: R) -> Result<Vec<(String, u64)>, ParseError> {
    let mut entries = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }

        let line_num = i + 1;
        let mut fields = line.split_whitespace();
        let (Some(name), Some(size)) = (fields.next(), fields.next()) else {
            return Err(ParseError::at_line(line_num, "fewer than 2 fields"));
        };

        entries.push((name.to_string(), parse_field(size, "size", line_num)?));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sizes() -> Sizes {
        Sizes::from_entries(vec![
            ("chr1".to_string(), 100),
            ("chr2".to_string(), 50),
            ("chr3".to_string(), 10),
        ])
    }

    #[test]
    fn test_cumulative_sizes() {
        let s = sizes();
        assert_eq!(s.len(), 3);
        assert_eq!(s.total_size(), 160);
        assert_eq!(s.get_size("chr2"), Some(50));
        assert_eq!(s.get_cumsize("chr1"), Some(0));
        assert_eq!(s.get_cumsize("chr3"), Some(150));
        assert_eq!(s.get_position("chr2", 5), Some(105));
        assert_eq!(s.get_position("chrUn", 5), None);
    }

    #[test]
    fn test_iter_breaks() {
        let s = sizes();
        let breaks: Vec<_> = s.iter_breaks().collect();
        assert_eq!(
            breaks,
            vec![("chr1", 0, 100), ("chr2", 100, 150), ("chr3", 150, 160)]
        );
    }

    #[test]
    fn test_parse_sizes_bad_row() {
        let err = parse_sizes("chr1 100\nchr2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = parse_sizes("chr1 ten\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid size"));
    }

    #[test]
    fn test_from_file_with_select() {
        let mut temp = NamedTempFile::with_suffix(".sizes").unwrap();
        temp.write_all(b"ctg1\t500\nctg2\t20\nctg3 300\n").unwrap();
        temp.flush().unwrap();

        let s = Sizes::from_file(temp.path(), Some(100)).unwrap();
        let names: Vec<&str> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ctg1", "ctg3"]);
    }

    #[test]
    fn test_from_fasta_file() {
        let mut temp = NamedTempFile::with_suffix(".fasta").unwrap();
        temp.write_all(b">a\nACGT\nAC\n>b\nA\n").unwrap();
        temp.flush().unwrap();

        let s = Sizes::from_file(temp.path(), None).unwrap();
        assert_eq!(s.get_size("a"), Some(6));
        assert_eq!(s.get_size("b"), Some(1));
    }

    #[test]
    fn test_write_lft() {
        let mut out = Vec::new();
        sizes().write_lft(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next(), Some("0\tchr1\t100\tchr1\t100"));
    }
}
