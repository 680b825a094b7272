//! Command-line interface for genokit.
//!
//! Every format module is a sub-command holding its own actions:
//!
//! - **fasta**: sizes, filtering, extraction, reformatting and gaps
//! - **sizes**: `.sizes` lookups and conversions to AGP and liftUp
//! - **agp**: validation, summary and BED conversion of AGP files
//! - **bed**: sorting, merging and summarizing intervals
//! - **blast**: filtering, best hits, chaining and scoring tabular BLAST
//! - **btab**: btab reports to tabular BLAST or BED
//! - **coords**: conversions and filters for NUCMER `show-coords`
//! - **gff**: GFF to BED and feature sequence extraction
//! - **sam**: header sizes, read pairs and coverage
//!
//! ## Usage
//!
//! ```text
//! # List modules, then the actions of one module
//! genokit
//! genokit blast
//!
//! # Run an action
//! genokit fasta sizes genome.fasta --md5
//! genokit blast filter hits.blast --pctid 98 -o hits.filtered
//!
//! # JSON output for report-style actions
//! genokit fasta summary genome.fasta --format json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::utils::io::is_stdio;

pub mod agp;
pub mod bed;
pub mod blast;
pub mod btab;
pub mod coords;
pub mod fasta;
pub mod gff;
pub mod sam;
pub mod sizes;

#[derive(Parser)]
#[command(name = "genokit")]
#[command(author = "Fulcrum Genomics")]
#[command(version, propagate_version = true)]
#[command(about = "Self-describing actions for common genomics text formats")]
#[command(long_about = concat!(
    "genokit bundles small, composable actions over FASTA, sizes, AGP, BED, BLAST, btab, ",
    "NUCMER coords, GFF and SAM files.\n\n",
    "Run `genokit <module>` to list the actions of a module, and `genokit <module> <action>` ",
    "to see what an action expects."
))]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for report-style actions
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// FASTA sequences: sizes, filter, some, summary, format, gaps
    Fasta(fasta::FastaArgs),

    /// Two-column sizes files: extract, agp, lft
    Sizes(sizes::SizesArgs),

    /// AGP golden-path files: validate, summary, bed
    Agp(agp::AgpArgs),

    /// BED intervals: sort, merge, summary
    Bed(bed::BedArgs),

    /// Tabular BLAST hits: filter, best, swap, chain, cscore and more
    Blast(blast::BlastArgs),

    /// btab alignment reports: blast, bed
    Btab(btab::BtabArgs),

    /// NUCMER show-coords output: blast, bed, filter, summary, coverage, annotate
    Coords(coords::CoordsArgs),

    /// GFF annotations: bed, load
    Gff(gff::GffArgs),

    /// SAM/BAM files: sizes, pair, coverage
    Sam(sam::SamArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Open the output of an action and log where it goes
pub(crate) fn create_output(path: Option<&Path>) -> anyhow::Result<Box<dyn std::io::Write>> {
    use anyhow::Context;

    crate::utils::io::open_output(path).with_context(|| match path {
        Some(p) => format!("Failed to create `{}`", p.display()),
        None => "Failed to open stdout".to_string(),
    })
}

/// The output path of an action that writes next to its input.
///
/// An explicit `-o` wins. Otherwise the path is derived from the input,
/// which is impossible when the input is stdin.
pub(crate) fn default_output<F>(
    output: Option<PathBuf>,
    input: &Path,
    derive: F,
) -> anyhow::Result<PathBuf>
where
    F: FnOnce() -> PathBuf,
{
    match output {
        Some(path) => Ok(path),
        None if is_stdio(input) => {
            anyhow::bail!("`-o` is required when reading from stdin")
        }
        None => Ok(derive()),
    }
}

/// Log a finished output file; stdout is not reported
pub(crate) fn written(path: Option<&PathBuf>) {
    if let Some(p) = path {
        debug!("File written to `{}`", p.display());
    }
}
