use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::agp::{Agp, ObjectSummary};
use crate::utils::text::thousands;

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct AgpArgs {
    #[command(subcommand)]
    pub command: AgpCommands,
}

#[derive(Subcommand)]
pub enum AgpCommands {
    /// Check object coordinates, part numbers and spans
    #[command(arg_required_else_help = true)]
    Validate {
        /// AGP file
        agp: PathBuf,
    },

    /// Count components, gaps and bases per object
    #[command(arg_required_else_help = true)]
    Summary {
        /// AGP file
        agp: PathBuf,
    },

    /// Write components (or gaps) as BED in object coordinates
    #[command(arg_required_else_help = true)]
    Bed {
        /// AGP file
        agp: PathBuf,

        /// Write gap rows instead of components
        #[arg(long)]
        gaps: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_agp(path: &Path) -> anyhow::Result<Agp> {
    Agp::from_file(path).with_context(|| format!("Failed to parse AGP `{}`", path.display()))
}

pub fn run(args: AgpArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        AgpCommands::Validate { agp } => {
            let parsed = load_agp(&agp)?;
            let problems = parsed.validate();
            for problem in &problems {
                println!("{problem}");
            }

            if !problems.is_empty() {
                anyhow::bail!(
                    "`{}` failed validation with {} problem(s)",
                    agp.display(),
                    problems.len()
                );
            }
            info!(
                "`{}` is valid: {} rows in {} objects",
                agp.display(),
                parsed.lines.len(),
                parsed.objects().len()
            );
        }

        AgpCommands::Summary { agp } => {
            let summaries = load_agp(&agp)?.summary();
            match format {
                OutputFormat::Text => print_summary_text(&summaries),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
                OutputFormat::Tsv => print_summary_tsv(&summaries),
            }
        }

        AgpCommands::Bed { agp, gaps, output } => {
            let parsed = load_agp(&agp)?;
            let mut out = create_output(output.as_deref())?;
            for line in &parsed.lines {
                let bed = if gaps {
                    line.gap_bed()
                } else {
                    line.component_bed()
                };
                if let Some(bed) = bed {
                    writeln!(out, "{bed}")?;
                }
            }
            out.flush()?;
            written(output.as_ref());
        }
    }

    Ok(())
}

fn totals(summaries: &[ObjectSummary]) -> ObjectSummary {
    summaries.iter().fold(
        ObjectSummary {
            object: "Total".to_string(),
            ..ObjectSummary::default()
        },
        |mut acc, s| {
            acc.components += s.components;
            acc.gaps += s.gaps;
            acc.gap_bases += s.gap_bases;
            acc.length += s.length;
            acc
        },
    )
}

fn print_summary_text(summaries: &[ObjectSummary]) {
    println!(
        "{:<20} {:>10} {:>6} {:>14} {:>16}",
        "Object", "Components", "Gaps", "Gap bases", "Length"
    );
    println!("{}", "-".repeat(70));
    for s in summaries.iter().chain(std::iter::once(&totals(summaries))) {
        println!(
            "{:<20} {:>10} {:>6} {:>14} {:>16}",
            s.object,
            s.components,
            s.gaps,
            thousands(s.gap_bases),
            thousands(s.length)
        );
    }
}

fn print_summary_tsv(summaries: &[ObjectSummary]) {
    println!("object\tcomponents\tgaps\tgap_bases\tlength");
    for s in summaries.iter().chain(std::iter::once(&totals(summaries))) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            s.object, s.components, s.gaps, s.gap_bases, s.length
        );
    }
}
