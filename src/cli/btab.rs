use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::btab::{read_btab, BtabLine};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct BtabArgs {
    #[command(subcommand)]
    pub command: BtabCommands,
}

#[derive(Subcommand)]
pub enum BtabCommands {
    /// Convert to tabular BLAST
    #[command(arg_required_else_help = true)]
    Blast {
        /// btab file (`-` for stdin)
        btab: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert subject intervals to BED
    #[command(arg_required_else_help = true)]
    Bed {
        /// btab file (`-` for stdin)
        btab: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_btab(path: &Path) -> anyhow::Result<Vec<(usize, BtabLine)>> {
    read_btab(path).with_context(|| format!("Failed to parse btab `{}`", path.display()))
}

pub fn run(args: BtabArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        BtabCommands::Blast { btab, output } => {
            let rows = load_btab(&btab)?;
            let mut out = create_output(output.as_deref())?;
            for (_, row) in &rows {
                writeln!(out, "{}", row.blast_row())?;
            }
            out.flush()?;

            info!("Converted {} btab rows", rows.len());
            written(output.as_ref());
        }

        BtabCommands::Bed { btab, output } => {
            let rows = load_btab(&btab)?;
            let mut out = create_output(output.as_deref())?;
            for (line_num, row) in &rows {
                let hit = row
                    .to_blast(*line_num)
                    .with_context(|| format!("Failed to convert `{}`", btab.display()))?;
                writeln!(out, "{}", hit.bedline())?;
            }
            out.flush()?;
            written(output.as_ref());
        }
    }

    Ok(())
}
