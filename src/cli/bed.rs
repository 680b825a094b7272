use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::bed::Bed;
use crate::utils::text::{percentage, thousands};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct BedArgs {
    #[command(subcommand)]
    pub command: BedCommands,
}

#[derive(Subcommand)]
pub enum BedCommands {
    /// Sort by position, or by accession
    #[command(arg_required_else_help = true)]
    Sort {
        /// BED file
        bed: PathBuf,

        /// Sort by accession (fourth column) first
        #[arg(long)]
        accn: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge overlapping or nearby intervals
    #[command(arg_required_else_help = true)]
    Merge {
        /// BED file
        bed: PathBuf,

        /// Merge intervals separated by at most this many bases
        #[arg(long, default_value = "0")]
        dist: u64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count features and covered bases
    #[command(arg_required_else_help = true)]
    Summary {
        /// BED file
        bed: PathBuf,
    },
}

fn load_bed(path: &Path) -> anyhow::Result<Bed> {
    Bed::from_file(path).with_context(|| format!("Failed to parse BED `{}`", path.display()))
}

pub fn run(args: BedArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        BedCommands::Sort { bed, accn, output } => {
            let mut parsed = load_bed(&bed)?;
            if accn {
                parsed.sort_by_accn();
            } else {
                parsed.sort_by_position();
            }

            let mut out = create_output(output.as_deref())?;
            parsed.write(&mut out)?;
            out.flush()?;
            written(output.as_ref());
        }

        BedCommands::Merge { bed, dist, output } => {
            let parsed = load_bed(&bed)?;
            let merged = parsed.merge(dist);
            info!(
                "Merged {} features into {} intervals",
                parsed.lines.len(),
                merged.len()
            );

            let mut out = create_output(output.as_deref())?;
            for line in &merged {
                writeln!(out, "{line}")?;
            }
            out.flush()?;
            written(output.as_ref());
        }

        BedCommands::Summary { bed } => {
            let summary = load_bed(&bed)?.summary();
            match format {
                OutputFormat::Text => {
                    println!("Features: {}", thousands(summary.features as u64));
                    println!("Seqids: {}", summary.seqids);
                    println!("Total bases: {}", thousands(summary.total_bases));
                    println!(
                        "Covered bases: {}",
                        percentage(summary.covered_bases, summary.total_bases)
                    );
                    println!("Mean feature size: {:.1}", summary.mean_size);
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Tsv => {
                    println!("features\tseqids\ttotal_bases\tcovered_bases\tmean_size");
                    println!(
                        "{}\t{}\t{}\t{}\t{:.1}",
                        summary.features,
                        summary.seqids,
                        summary.total_bases,
                        summary.covered_bases,
                        summary.mean_size
                    );
                }
            }
        }
    }

    Ok(())
}
