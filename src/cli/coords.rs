use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::{debug, info};

use crate::cli::blast::print_alignment_stats;
use crate::cli::{create_output, default_output, written, OutputFormat};
use crate::formats::coords::{alignment_stats, query_coverage, read_coords, CoordsLine, Overlap};
use crate::utils::io::{append_suffix, open_input, replace_extension};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct CoordsArgs {
    #[command(subcommand)]
    pub command: CoordsCommands,
}

#[derive(Subcommand)]
pub enum CoordsCommands {
    /// Convert alignments to tabular BLAST
    #[command(arg_required_else_help = true)]
    Blast {
        /// `show-coords -rcl` output
        coords: PathBuf,

        /// Output file (default: coords path with `.blast` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write reference (or query) intervals as BED
    #[command(arg_required_else_help = true)]
    Bed {
        /// `show-coords -rcl` output
        coords: PathBuf,

        /// Write query intervals instead
        #[arg(long)]
        query: bool,

        /// Use percent identity as the score column
        #[arg(long)]
        pctid: bool,

        /// Minimum quality (identity times query coverage)
        #[arg(long, default_value = "0")]
        cutoff: f64,
    },

    /// Keep alignments passing identity and length cutoffs
    #[command(arg_required_else_help = true)]
    Filter {
        /// `show-coords -rcl` output
        coords: PathBuf,

        /// Minimum percent identity
        #[arg(long, default_value = "0")]
        pctid: f64,

        /// Minimum query alignment length
        #[arg(long, default_value = "0")]
        hitlen: u64,

        /// Keep only overlapping alignments and append the overlap type
        #[arg(long)]
        overlap: bool,

        /// Output file (default: `<prefix>.P<pctid>L<hitlen>.<suffix>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report covered bases and mean identity
    #[command(arg_required_else_help = true)]
    Summary {
        /// `show-coords -rcl` output
        coords: PathBuf,
    },

    /// Sum query coverage per query
    #[command(arg_required_else_help = true)]
    Coverage {
        /// `show-coords -rcl` output
        coords: PathBuf,

        /// Stop at the first query below this coverage fraction
        #[arg(short, long, default_value = "0.5")]
        cutoff: f64,
    },

    /// Classify how the aligned sequences overlap
    #[command(arg_required_else_help = true)]
    Annotate {
        /// `show-coords -rcl` output
        coords: PathBuf,

        /// Maximum unaligned bases at the overlapping ends
        #[arg(long, default_value = "100")]
        maxhang: u64,

        /// Also report alignments without overlap
        #[arg(long)]
        all: bool,
    },
}

fn load_coords(path: &Path) -> anyhow::Result<Vec<CoordsLine>> {
    let coords = read_coords(path)
        .with_context(|| format!("Failed to parse coords `{}`", path.display()))?;
    debug!("Read {} alignments from `{}`", coords.len(), path.display());
    Ok(coords)
}

/// Stream alignment rows, skipping headers
fn for_each_row<F>(path: &Path, mut visit: F) -> anyhow::Result<usize>
where
    F: FnMut(&CoordsLine) -> anyhow::Result<()>,
{
    let reader =
        open_input(path).with_context(|| format!("Failed to open `{}`", path.display()))?;
    let mut count = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let row = CoordsLine::parse(&line, i + 1)
            .with_context(|| format!("Failed to parse coords `{}`", path.display()))?;
        if let Some(row) = row {
            visit(&row)?;
            count += 1;
        }
    }
    Ok(count)
}

fn filtered_path(coords: &Path, pctid: f64, hitlen: u64) -> PathBuf {
    #[allow(clippy::cast_possible_truncation)] // Percentages fit easily
    let tag = format!("P{}L{hitlen}", pctid.trunc() as i64);
    match coords.extension().and_then(|e| e.to_str()) {
        Some(ext) => replace_extension(coords, &format!("{tag}.{ext}")),
        None => append_suffix(coords, &format!(".{tag}")),
    }
}

pub fn run(args: CoordsArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CoordsCommands::Blast { coords, output } => {
            let output = default_output(output, &coords, || replace_extension(&coords, "blast"))?;
            let mut out = create_output(Some(output.as_path()))?;
            for_each_row(&coords, |c| {
                writeln!(out, "{}", c.blast_row())?;
                Ok(())
            })?;
            out.flush()?;
            written(Some(&output));
        }

        CoordsCommands::Bed {
            coords,
            query,
            pctid,
            cutoff,
        } => {
            let mut out = create_output(None)?;
            for_each_row(&coords, |c| {
                if c.quality() < cutoff {
                    return Ok(());
                }
                let bed = if query {
                    c.qbedline(pctid)
                } else {
                    c.bedline(pctid)
                };
                writeln!(out, "{bed}")?;
                Ok(())
            })?;
            out.flush()?;
        }

        CoordsCommands::Filter {
            coords,
            pctid,
            hitlen,
            overlap,
            output,
        } => {
            let output =
                default_output(output, &coords, || filtered_path(&coords, pctid, hitlen))?;
            let mut out = create_output(Some(output.as_path()))?;
            let mut kept = 0usize;
            let total = for_each_row(&coords, |c| {
                if c.identity < pctid || c.len2 < hitlen {
                    return Ok(());
                }
                if overlap {
                    let ov = c.overlap(100);
                    if ov == Overlap::None {
                        return Ok(());
                    }
                    writeln!(out, "{}\t{ov}", c.raw())?;
                } else {
                    writeln!(out, "{}", c.raw())?;
                }
                kept += 1;
                Ok(())
            })?;
            out.flush()?;

            info!("Kept {kept} of {total} alignments");
            written(Some(&output));
        }

        CoordsCommands::Summary { coords } => {
            let stats = alignment_stats(&load_coords(&coords)?);
            print_alignment_stats(&stats, format)?;
        }

        CoordsCommands::Coverage { coords, cutoff } => {
            let mut out = create_output(None)?;
            for (query, cov) in query_coverage(&load_coords(&coords)?, cutoff) {
                writeln!(out, "{query}\t{cov:.2}")?;
            }
            out.flush()?;
        }

        CoordsCommands::Annotate {
            coords,
            maxhang,
            all,
        } => {
            let mut out = create_output(None)?;
            for_each_row(&coords, |c| {
                let ov = c.overlap(maxhang);
                if ov != Overlap::None || all {
                    writeln!(out, "{}\t{ov}", c.raw())?;
                }
                Ok(())
            })?;
            out.flush()?;
        }
    }

    Ok(())
}
