use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::sam::{mean_coverage, read_header_sizes, SamLine};
use crate::utils::io::open_input;

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct SamArgs {
    #[command(subcommand)]
    pub command: SamCommands,
}

#[derive(Subcommand)]
pub enum SamCommands {
    /// Print reference names and lengths from the header
    #[command(arg_required_else_help = true)]
    Sizes {
        /// SAM or BAM file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print query and reference positions of every alignment
    #[command(arg_required_else_help = true)]
    Pair {
        /// SAM file (`-` for stdin)
        sam: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mean depth per sequence from a `genomeCoverageBed` histogram
    #[command(arg_required_else_help = true)]
    Coverage {
        /// `genomeCoverageBed` output
        genomecov: PathBuf,
    },
}

pub fn run(args: SamArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        SamCommands::Sizes { input, output } => {
            let sizes = read_header_sizes(&input)
                .with_context(|| format!("Failed to read header of `{}`", input.display()))?;

            let mut out = create_output(output.as_deref())?;
            for (name, length) in &sizes {
                writeln!(out, "{name}\t{length}")?;
            }
            out.flush()?;

            info!("Found {} reference sequences", sizes.len());
            written(output.as_ref());
        }

        SamCommands::Pair { sam, output } => {
            let reader =
                open_input(&sam).with_context(|| format!("Failed to open `{}`", sam.display()))?;

            let mut out = create_output(output.as_deref())?;
            for (i, line) in reader.lines().enumerate() {
                let line = line?;
                if line.starts_with('@') || line.trim().is_empty() {
                    continue;
                }
                let record = SamLine::parse(&line, i + 1)
                    .with_context(|| format!("Failed to parse SAM `{}`", sam.display()))?;
                writeln!(out, "{}", record.pairline())?;
            }
            out.flush()?;
            written(output.as_ref());
        }

        SamCommands::Coverage { genomecov } => {
            let reader = open_input(&genomecov)
                .with_context(|| format!("Failed to open `{}`", genomecov.display()))?;
            let means = mean_coverage(reader)
                .with_context(|| format!("Failed to parse `{}`", genomecov.display()))?;

            let mut out = create_output(None)?;
            for (seqid, mean) in &means {
                writeln!(out, "{seqid}\t{mean}")?;
            }
            out.flush()?;
        }
    }

    Ok(())
}
