//! Record types, parsers and writers for the supported text formats.
//!
//! | Module | Format |
//! |--------|--------|
//! | [`fasta`]  | FASTA sequences (plain, gzip or bgzip) |
//! | [`sizes`]  | Two-column `name size` files |
//! | [`agp`]    | AGP v2 golden-path assembly layouts |
//! | [`bed`]    | BED intervals (0-based, half-open) |
//! | [`blast`]  | Tabular BLAST (`-m8` / `-outfmt 6`) |
//! | [`btab`]   | btab alignment reports |
//! | [`coords`] | NUCMER `show-coords -rcl` output |
//! | [`gff`]    | GFF3 and GFF2 annotations |
//! | [`sam`]    | SAM/BAM headers and alignment lines |
//!
//! Every parser reports the 1-based line number of a malformed row.

use thiserror::Error;

pub mod agp;
pub mod bed;
pub mod blast;
pub mod btab;
pub mod coords;
pub mod fasta;
pub mod gff;
pub mod sam;
pub mod sizes;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("ID `{0}` not found")]
    MissingId(String),
}

impl ParseError {
    /// Build an `InvalidFormat` error for a 1-based line number
    pub(crate) fn at_line(line_num: usize, msg: impl std::fmt::Display) -> Self {
        Self::InvalidFormat(format!("line {line_num}: {msg}"))
    }
}

/// Parse a numeric column, naming the column and line on failure
pub(crate) fn parse_field<T: std::str::FromStr>(
    value: &str,
    column: &str,
    line_num: usize,
) -> Result<T, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::at_line(line_num, format!("invalid {column} '{value}'")))
}

/// True for lines every tabular parser skips: blank and `#` comments
pub(crate) fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
