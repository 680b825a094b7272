use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::bed::BedLine;
use crate::formats::fasta::{
    find_gaps, summarize, visit_records, FastaSummary, DEFAULT_LINE_WIDTH,
};
use crate::utils::io::read_ids;
use crate::utils::text::{human_size, percentage, thousands};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct FastaArgs {
    #[command(subcommand)]
    pub command: FastaCommands,
}

#[derive(Subcommand)]
pub enum FastaCommands {
    /// Report the length of every sequence
    #[command(arg_required_else_help = true)]
    Sizes {
        /// FASTA file (`-` for stdin)
        fasta: PathBuf,

        /// Append the MD5 of the upper-cased sequence
        #[arg(long)]
        md5: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep sequences at least (or at most) a given length
    #[command(arg_required_else_help = true)]
    Filter {
        /// FASTA file (`-` for stdin)
        fasta: PathBuf,

        /// Length cutoff in bases
        cutoff: usize,

        /// Keep sequences no longer than the cutoff instead
        #[arg(long)]
        less: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the sequences listed in an IDs file
    #[command(arg_required_else_help = true)]
    Some {
        /// FASTA file (`-` for stdin)
        fasta: PathBuf,

        /// File with one ID per line (first word used)
        ids: PathBuf,

        /// Write the sequences NOT in the list
        #[arg(long)]
        exclude: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count records and bases, with N50 and GC content
    #[command(arg_required_else_help = true)]
    Summary {
        /// One or more FASTA files
        #[arg(required = true)]
        fastas: Vec<PathBuf>,
    },

    /// Rewrap, upper-case or length-filter sequences
    #[command(arg_required_else_help = true)]
    Format {
        /// FASTA file (`-` for stdin)
        fasta: PathBuf,

        /// Line width, 0 for single-line sequences
        #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
        width: usize,

        /// Convert sequences to upper case
        #[arg(long)]
        upper: bool,

        /// Drop sequences shorter than this
        #[arg(long)]
        minlen: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report runs of Ns as BED
    #[command(arg_required_else_help = true)]
    Gaps {
        /// FASTA file (`-` for stdin)
        fasta: PathBuf,

        /// Minimum run length to report
        #[arg(long, default_value = "100")]
        mingap: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: FastaArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        FastaCommands::Sizes { fasta, md5, output } => {
            let mut out = create_output(output.as_deref())?;
            let count = visit_records(&fasta, |r| {
                if md5 {
                    writeln!(out, "{}\t{}\t{}", r.name, r.len(), r.md5())?;
                } else {
                    writeln!(out, "{}\t{}", r.name, r.len())?;
                }
                Ok::<(), anyhow::Error>(())
            })
            .with_context(|| format!("Failed to read `{}`", fasta.display()))?;
            out.flush()?;

            if count == 0 {
                anyhow::bail!("No sequences found in `{}`", fasta.display());
            }
            written(output.as_ref());
        }

        FastaCommands::Filter {
            fasta,
            cutoff,
            less,
            output,
        } => {
            let mut out = create_output(output.as_deref())?;
            let mut kept = 0u64;
            let total = visit_records(&fasta, |r| {
                let pass = if less {
                    r.len() <= cutoff
                } else {
                    r.len() >= cutoff
                };
                if pass {
                    kept += 1;
                    r.write(&mut out, DEFAULT_LINE_WIDTH)?;
                }
                Ok::<(), anyhow::Error>(())
            })
            .with_context(|| format!("Failed to read `{}`", fasta.display()))?;
            out.flush()?;

            let direction = if less { "<=" } else { ">=" };
            info!(
                "Kept {} records with length {direction} {cutoff}",
                percentage(kept, total as u64)
            );
            written(output.as_ref());
        }

        FastaCommands::Some {
            fasta,
            ids,
            exclude,
            output,
        } => {
            let wanted: HashSet<String> = read_ids(&ids, false)
                .with_context(|| format!("Failed to read IDs from `{}`", ids.display()))?
                .into_iter()
                .collect();

            let mut out = create_output(output.as_deref())?;
            let mut seen: HashSet<String> = HashSet::new();
            visit_records(&fasta, |r| {
                let listed = wanted.contains(&r.name);
                if listed {
                    seen.insert(r.name.clone());
                }
                if listed != exclude {
                    r.write(&mut out, DEFAULT_LINE_WIDTH)?;
                }
                Ok::<(), anyhow::Error>(())
            })
            .with_context(|| format!("Failed to read `{}`", fasta.display()))?;
            out.flush()?;

            let mut missing: Vec<&String> = wanted.difference(&seen).collect();
            missing.sort();
            for id in missing {
                warn!("{id} not found in `{}`", fasta.display());
            }
            written(output.as_ref());
        }

        FastaCommands::Summary { fastas } => {
            let mut summaries = Vec::with_capacity(fastas.len());
            for fasta in &fastas {
                let summary = summarize(fasta)
                    .with_context(|| format!("Failed to summarize `{}`", fasta.display()))?;
                summaries.push(summary);
            }

            match format {
                OutputFormat::Text => print_summary_text(&summaries),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
                OutputFormat::Tsv => print_summary_tsv(&summaries),
            }
        }

        FastaCommands::Format {
            fasta,
            width,
            upper,
            minlen,
            output,
        } => {
            let mut out = create_output(output.as_deref())?;
            visit_records(&fasta, |mut r| {
                if minlen.is_some_and(|min| r.len() < min) {
                    return Ok(());
                }
                if upper {
                    r.sequence.make_ascii_uppercase();
                }
                r.write(&mut out, width)?;
                Ok::<(), anyhow::Error>(())
            })
            .with_context(|| format!("Failed to read `{}`", fasta.display()))?;
            out.flush()?;
            written(output.as_ref());
        }

        FastaCommands::Gaps {
            fasta,
            mingap,
            output,
        } => {
            let mut out = create_output(output.as_deref())?;
            let mut total_gaps = 0usize;
            visit_records(&fasta, |r| {
                let gaps = find_gaps(&r.sequence, mingap.max(1));
                for (k, (start, end)) in gaps.into_iter().enumerate() {
                    let mut bed = BedLine::new(r.name.clone(), start as u64, end as u64);
                    bed.accn = Some(format!("{}_gap{}", r.name, k + 1));
                    writeln!(out, "{bed}")?;
                    total_gaps += 1;
                }
                Ok::<(), anyhow::Error>(())
            })
            .with_context(|| format!("Failed to read `{}`", fasta.display()))?;
            out.flush()?;

            info!("Found {total_gaps} gaps of at least {mingap} bases");
            written(output.as_ref());
        }
    }

    Ok(())
}

fn print_summary_text(summaries: &[FastaSummary]) {
    for s in summaries {
        println!("{}", s.filename);
        println!("  Records:      {}", thousands(s.records as u64));
        println!(
            "  Total bases:  {} ({})",
            thousands(s.total_bases),
            human_size(s.total_bases, false, 1, None)
        );
        println!("  Min length:   {}", thousands(s.min));
        println!("  Max length:   {}", thousands(s.max));
        println!("  Mean length:  {:.1}", s.mean);
        println!("  N50:          {}", thousands(s.n50));
        println!("  L50:          {}", s.l50);
        println!("  GC:           {:.2}%", s.gc_pct);
        println!("  N bases:      {}", thousands(s.n_count));
    }
}

fn print_summary_tsv(summaries: &[FastaSummary]) {
    println!("filename\trecords\ttotal_bases\tmin\tmax\tmean\tn50\tl50\tgc_pct\tn_count");
    for s in summaries {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.1}\t{}\t{}\t{:.2}\t{}",
            s.filename,
            s.records,
            s.total_bases,
            s.min,
            s.max,
            s.mean,
            s.n50,
            s.l50,
            s.gc_pct,
            s.n_count
        );
    }
}
