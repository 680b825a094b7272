//! Input/output plumbing shared by all actions.
//!
//! Inputs may be plain text or gzip/bgzip compressed, and `-` stands for
//! stdin. Outputs go to a file when a path is given, stdout otherwise.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::formats::ParseError;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// True for the `-` path standing for stdin or stdout
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Open a path for buffered reading, decompressing `.gz`/`.bgz` files.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open a buffered writer on `path`, or on stdout when `path` is `None` or `-`.
///
/// # Errors
///
/// Returns an IO error if the file cannot be created.
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_stdio(p) => {
            debug!("Writing to `{}`", p.display());
            Ok(Box::new(BufWriter::new(File::create(p)?)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Replace everything after the last `.` of the file name with `ext`.
///
/// `"a/b.sizes"` with `"agp"` becomes `"a/b.agp"`; a name without a dot
/// gets the extension appended.
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Keep the file name up to its first `.` and add `ext`.
///
/// `"a/b.fasta.sizes"` with `"lft"` becomes `"a/b.lft"`.
pub fn replace_all_extensions(path: &Path, ext: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = name.split('.').next().unwrap_or_default();
    path.with_file_name(format!("{prefix}.{ext}"))
}

/// Append a literal suffix to a path, e.g. `hits.blast` + `.best`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Read IDs from a file, one or more per line.
///
/// Blank lines and lines starting with `#` are skipped. When
/// `split_commas` is set, commas are treated as separators as well.
/// Order of first appearance is kept; duplicates are dropped.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read.
pub fn read_ids(path: &Path, split_commas: bool) -> Result<Vec<String>, ParseError> {
    let reader = open_input(path)?;
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = if split_commas {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .collect()
        } else {
            line.split_whitespace().take(1).collect()
        };

        for token in tokens {
            if seen.insert(token.to_string()) {
                ids.push(token.to_string());
            }
        }
    }

    Ok(ids)
}

/// Read a two-column mapping file (`key value`), first occurrence wins.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a line has fewer than 2 fields.
pub fn read_mapping(
    path: &Path,
) -> Result<std::collections::HashMap<String, String>, ParseError> {
    let reader = open_input(path)?;
    let mut mapping = std::collections::HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            return Err(ParseError::InvalidFormat(format!(
                "Line {} of {} has fewer than 2 fields",
                i + 1,
                path.display()
            )));
        };
        mapping
            .entry(key.trim().to_string())
            .or_insert_with(|| value.trim().to_string());
    }

    Ok(mapping)
}
