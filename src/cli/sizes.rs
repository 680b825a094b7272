use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::cli::{create_output, default_output, written, OutputFormat};
use crate::formats::agp::ObjectOrder;
use crate::formats::sizes::Sizes;
use crate::utils::io::{read_ids, replace_all_extensions, replace_extension};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct SizesArgs {
    #[command(subcommand)]
    pub command: SizesCommands,
}

#[derive(Subcommand)]
pub enum SizesCommands {
    /// Print the sizes of the listed IDs, in list order
    #[command(arg_required_else_help = true)]
    Extract {
        /// File with one ID per line
        ids: PathBuf,

        /// Sizes file or FASTA file
        sizes: PathBuf,
    },

    /// Write a trivial AGP with one object per contig
    #[command(arg_required_else_help = true)]
    Agp {
        /// Sizes file or FASTA file
        sizes: PathBuf,

        /// Output file (default: sizes path with `.agp` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write trivial liftUp lines for every contig
    #[command(arg_required_else_help = true)]
    Lft {
        /// Sizes file or FASTA file
        sizes: PathBuf,

        /// Output file (default: file name prefix with `.lft`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_sizes(path: &Path) -> anyhow::Result<Sizes> {
    Sizes::from_file(path, None)
        .with_context(|| format!("Failed to load sizes from `{}`", path.display()))
}

pub fn run(args: SizesArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        SizesCommands::Extract { ids, sizes } => {
            let ids = read_ids(&ids, false)
                .with_context(|| format!("Failed to read IDs from `{}`", ids.display()))?;
            let sizes = load_sizes(&sizes)?;

            let mut out = create_output(None)?;
            for id in &ids {
                let size = sizes
                    .get_size(id)
                    .with_context(|| format!("ID `{id}` not found in sizes file"))?;
                writeln!(out, "{id}\t{size}")?;
            }
            out.flush()?;
        }

        SizesCommands::Agp { sizes, output } => {
            let output = default_output(output, &sizes, || replace_extension(&sizes, "agp"))?;
            let s = load_sizes(&sizes)?;

            let mut order = ObjectOrder::new();
            for (name, size) in s.iter() {
                order.add(name, name, size, '+');
            }

            let mut out = create_output(Some(output.as_path()))?;
            order.to_agp().write(&mut out)?;
            out.flush()?;
            written(Some(&output));
        }

        SizesCommands::Lft { sizes, output } => {
            let output =
                default_output(output, &sizes, || replace_all_extensions(&sizes, "lft"))?;
            let s = load_sizes(&sizes)?;

            let mut out = create_output(Some(output.as_path()))?;
            s.write_lft(&mut out)?;
            out.flush()?;
            written(Some(&output));
        }
    }

    Ok(())
}
