use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::{create_output, written, OutputFormat};
use crate::formats::fasta::{read_sequences, DEFAULT_LINE_WIDTH};
use crate::formats::gff::{Dialect, Gff};
use crate::utils::text::split_list;

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct GffArgs {
    /// Parse attributes as GFF2 (`key "value"; ...`)
    #[arg(long, global = true)]
    pub gff2: bool,

    #[command(subcommand)]
    pub command: GffCommands,
}

#[derive(Subcommand)]
pub enum GffCommands {
    /// Write features of one type as BED
    #[command(arg_required_else_help = true)]
    Bed {
        /// GFF file
        gff: PathBuf,

        /// Feature type to convert
        #[arg(long = "type", default_value = "gene")]
        feature_type: String,

        /// Attribute used as the BED name
        #[arg(long, default_value = "ID")]
        key: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the joined child sequences of parent features
    #[command(arg_required_else_help = true)]
    Load {
        /// GFF file
        gff: PathBuf,

        /// FASTA file with the annotated sequences
        fasta: PathBuf,

        /// Parent feature types, comma separated
        #[arg(long, default_value = "mRNA")]
        parents: String,

        /// Child feature types, comma separated
        #[arg(long, default_value = "CDS")]
        children: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_gff(path: &Path, dialect: Dialect) -> anyhow::Result<Gff> {
    Gff::from_file(path, dialect)
        .with_context(|| format!("Failed to parse GFF `{}`", path.display()))
}

pub fn run(args: GffArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let dialect = if args.gff2 { Dialect::Gff2 } else { Dialect::Gff3 };

    match args.command {
        GffCommands::Bed {
            gff,
            feature_type,
            key,
            output,
        } => {
            let bed = load_gff(&gff, dialect)?
                .to_bed(&feature_type, &key)
                .with_context(|| format!("Failed to convert `{}` to BED", gff.display()))?;

            let mut out = create_output(output.as_deref())?;
            for line in &bed {
                writeln!(out, "{line}")?;
            }
            out.flush()?;

            info!("Converted {} {feature_type} features", bed.len());
            written(output.as_ref());
        }

        GffCommands::Load {
            gff,
            fasta,
            parents,
            children,
            output,
        } => {
            let features = load_gff(&gff, dialect)?;
            let sequences = read_sequences(&fasta)
                .with_context(|| format!("Failed to read `{}`", fasta.display()))?;

            let records = features
                .load_features(&sequences, &split_list(&parents), &split_list(&children))
                .with_context(|| format!("Failed to extract features of `{}`", gff.display()))?;

            let mut out = create_output(output.as_deref())?;
            for record in &records {
                record.write(&mut out, DEFAULT_LINE_WIDTH)?;
            }
            out.flush()?;

            info!("Extracted {} sequences", records.len());
            written(output.as_ref());
        }
    }

    Ok(())
}
