use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::{debug, info};

use crate::cli::{create_output, default_output, written, OutputFormat};
use crate::core::stats::SummaryStats;
use crate::formats::bed::Bed;
use crate::formats::blast::{
    alignment_stats, best_hits, chain_hsps, completeness, condense_hsps, coverage_filter,
    cscores, query_scores, read_blast, reciprocal_best_hits, sort_hits, subset_hits,
    top_subjects, AlignmentStats, BlastLine, Completeness, FilterOptions, SortOrder,
};
use crate::formats::coords::Overlap;
use crate::formats::is_skippable;
use crate::formats::sizes::Sizes;
use crate::utils::io::{
    append_suffix, is_gzipped, is_stdio, open_input, read_ids, read_mapping, replace_extension,
};
use crate::utils::text::{format_float, percentage_short, split_list, thousands};

#[derive(Args)]
#[command(arg_required_else_help = true)]
pub struct BlastArgs {
    #[command(subcommand)]
    pub command: BlastCommands,
}

#[derive(Subcommand)]
pub enum BlastCommands {
    /// Keep hits passing score, identity, length and e-value cutoffs
    #[command(arg_required_else_help = true)]
    Filter {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Minimum bit score
        #[arg(long, default_value = "0")]
        score: f64,

        /// Minimum percent identity
        #[arg(long, default_value = "95")]
        pctid: f64,

        /// Minimum alignment length
        #[arg(long, default_value = "100")]
        hitlen: u64,

        /// Maximum e-value
        #[arg(long, default_value = "0.01")]
        evalue: f64,

        /// Remove self hits
        #[arg(long)]
        noself: bool,

        /// Keep only hits where query and subject are both listed
        #[arg(long)]
        ids: Option<PathBuf>,

        /// Keep the hits that fail the cutoffs instead
        #[arg(long)]
        inverse: bool,

        /// Output file (default: `<blast>.P<pctid>L<hitlen>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep the best hits of every query (or subject)
    #[command(arg_required_else_help = true)]
    Best {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Number of hits to keep per group
        #[arg(short = 'n', long, default_value = "1")]
        number: usize,

        /// Keep all HSPs of the best partners
        #[arg(long)]
        hsps: bool,

        /// Group by subject instead of query
        #[arg(long)]
        subject: bool,

        /// Output file (default: `<blast>.best`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Swap query and subject columns
    #[command(arg_required_else_help = true)]
    Swap {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Output file (default: `<blast>.swapped`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert subject (or query) intervals to BED
    #[command(arg_required_else_help = true)]
    Bed {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Write query intervals instead
        #[arg(long)]
        swap: bool,

        /// Output file (default: blast path with `.bed` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find reciprocal best hits from the searches in both directions
    #[command(arg_required_else_help = true)]
    Rbbh {
        /// Hits of A against B
        ab: PathBuf,

        /// Hits of B against A
        ba: PathBuf,
    },

    /// Report covered bases and mean identity
    #[command(arg_required_else_help = true)]
    Summary {
        /// Tabular BLAST file
        blast: PathBuf,
    },

    /// Sort hits, in place unless an output is given
    #[command(arg_required_else_help = true)]
    Sort {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Sort by query, then query start
        #[arg(long, group = "order")]
        query: bool,

        /// Sort by subject, then subject start
        #[arg(long = "ref", group = "order")]
        reference: bool,

        /// Sort by subject, then score descending
        #[arg(long, group = "order")]
        refscore: bool,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count the most frequent subjects
    #[command(arg_required_else_help = true)]
    Top10 {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Number of subjects to report
        #[arg(long, default_value = "10")]
        top: usize,

        /// Two-column file mapping subject IDs to display names
        #[arg(long)]
        ids: Option<PathBuf>,
    },

    /// Filter queries on overall identity and coverage
    #[command(arg_required_else_help = true)]
    Covfilter {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Sizes of the covered sequences (sizes or FASTA file)
        sizes: PathBuf,

        /// Minimum percent identity
        #[arg(long, default_value = "95")]
        pctid: f64,

        /// Minimum percent coverage
        #[arg(long, default_value = "50")]
        pctcov: f64,

        /// Compute coverage on the subject instead of the query
        #[arg(long)]
        scov: bool,

        /// Write the IDs of valid queries to this file
        #[arg(long)]
        ids: Option<PathBuf>,

        /// Print identity and coverage of every sized sequence
        #[arg(long)]
        list: bool,

        /// Write the hits of valid queries to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Chain nearby HSPs of the same query and subject
    #[command(arg_required_else_help = true)]
    Chain {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Maximum distance between chained HSPs
        #[arg(long, default_value = "100")]
        dist: i64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine all HSPs of the same query, subject and orientation
    #[command(arg_required_else_help = true)]
    Condense {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute C-scores, score relative to the best hit of either side
    #[command(arg_required_else_help = true)]
    Cscore {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Minimum C-score to report
        #[arg(long, default_value = "0.9999")]
        cutoff: f64,

        /// Append percent identity as the last column
        #[arg(long)]
        pct: bool,

        /// Strip alternative splicing suffixes from names
        #[arg(long)]
        strip_names: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sum the scores of every sequence against a set of subjects
    #[command(arg_required_else_help = true)]
    Score {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Sequences to report (sizes or FASTA file)
        sizes: PathBuf,

        /// Subjects whose hits are counted, one per line
        ids: PathBuf,
    },

    /// Keep hits between features on selected sequences
    #[command(arg_required_else_help = true)]
    #[command(group(clap::ArgGroup::new("chrs").required(true).multiple(true)))]
    Subset {
        /// Tabular BLAST file
        blast: PathBuf,

        /// BED file naming the query features
        qbed: PathBuf,

        /// BED file naming the subject features
        sbed: PathBuf,

        /// Query sequences to keep, comma separated (default: all)
        #[arg(long, group = "chrs")]
        qchrs: Option<String>,

        /// Subject sequences to keep, comma separated (default: all)
        #[arg(long, group = "chrs")]
        schrs: Option<String>,

        /// Rename features to `<seqid>_<rank>`
        #[arg(long)]
        convert: bool,

        /// Output file (default: `<blast>.<qchrs>.<schrs>.blast`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print query and subject of every hit, optionally renamed
    #[command(arg_required_else_help = true)]
    Annotation {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Two-column file mapping query IDs to names
        #[arg(long)]
        queryids: Option<PathBuf>,

        /// Two-column file mapping subject IDs to names
        #[arg(long)]
        subjectids: Option<PathBuf>,
    },

    /// Report how much of its best subject every query spans
    #[command(arg_required_else_help = true)]
    Completeness {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Subject sizes (sizes or FASTA file)
        sizes: PathBuf,

        /// Write the IDs of queries spanning more than half their subject
        #[arg(long)]
        ids: Option<PathBuf>,
    },

    /// Classify how query and subject overlap
    #[command(arg_required_else_help = true)]
    Annotate {
        /// Tabular BLAST file
        blast: PathBuf,

        /// Query sizes (sizes or FASTA file)
        qsizes: PathBuf,

        /// Subject sizes (sizes or FASTA file)
        ssizes: PathBuf,

        /// Minimum percent identity
        #[arg(long, default_value = "94")]
        pctid: f64,

        /// Minimum alignment length
        #[arg(long, default_value = "500")]
        hitlen: u64,

        /// Maximum unaligned bases at the overlapping ends
        #[arg(long, default_value = "500")]
        hang: u64,
    },
}

fn load_sizes(path: &Path) -> anyhow::Result<Sizes> {
    Sizes::from_file(path, None)
        .with_context(|| format!("Failed to load sizes from `{}`", path.display()))
}

fn load_names(path: Option<&Path>) -> anyhow::Result<Option<HashMap<String, String>>> {
    path.map(|p| read_mapping(p).with_context(|| format!("Failed to read `{}`", p.display())))
        .transpose()
}

/// Display name of an ID, the ID itself when unmapped
fn renamed(names: Option<&HashMap<String, String>>, id: &str) -> String {
    names
        .and_then(|m| m.get(id))
        .map_or_else(|| id.to_string(), Clone::clone)
}

/// Sequences named in a comma-separated list, or every sequence of `bed`
fn selected<'a>(list: Option<&'a str>, bed: &'a Bed) -> HashSet<&'a str> {
    match list {
        Some(list) => split_list(list).into_iter().collect(),
        None => bed.seqids().into_iter().collect(),
    }
}

fn load_blast(path: &Path) -> anyhow::Result<Vec<BlastLine>> {
    let hits =
        read_blast(path).with_context(|| format!("Failed to parse BLAST `{}`", path.display()))?;
    debug!("Read {} hits from `{}`", hits.len(), path.display());
    Ok(hits)
}

/// Stream hits one at a time, skipping blank and `#` lines
fn for_each_hit<F>(path: &Path, mut visit: F) -> anyhow::Result<usize>
where
    F: FnMut(&BlastLine) -> anyhow::Result<()>,
{
    let reader =
        open_input(path).with_context(|| format!("Failed to open `{}`", path.display()))?;
    let mut count = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }
        let hit = BlastLine::parse(&line, i + 1)
            .with_context(|| format!("Failed to parse BLAST `{}`", path.display()))?;
        visit(&hit)?;
        count += 1;
    }
    Ok(count)
}

fn write_hits<'a, I>(hits: I, output: Option<&Path>, raw: bool) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a BlastLine>,
{
    let mut out = create_output(output)?;
    for hit in hits {
        if raw {
            writeln!(out, "{}", hit.raw())?;
        } else {
            writeln!(out, "{hit}")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[allow(clippy::too_many_lines)] // One arm per action
pub fn run(args: BlastArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.command {
        BlastCommands::Filter {
            blast,
            score,
            pctid,
            hitlen,
            evalue,
            noself,
            ids,
            inverse,
            output,
        } => {
            let ids: Option<HashSet<String>> = match ids {
                Some(path) => Some(
                    read_ids(&path, true)
                        .with_context(|| format!("Failed to read IDs from `{}`", path.display()))?
                        .into_iter()
                        .collect(),
                ),
                None => None,
            };
            let options = FilterOptions {
                score,
                pctid,
                hitlen,
                evalue,
                noself,
                ids,
                inverse,
            };

            let output = default_output(output, &blast, || {
                #[allow(clippy::cast_possible_truncation)] // Percentages fit easily
                let suffix = format!(".P{}L{hitlen}", pctid.trunc() as i64);
                let path = append_suffix(&blast, &suffix);
                if inverse {
                    append_suffix(&path, ".inverse")
                } else {
                    path
                }
            })?;

            let mut out = create_output(Some(output.as_path()))?;
            let mut kept = 0usize;
            let total = for_each_hit(&blast, |hit| {
                if options.keep(hit) {
                    writeln!(out, "{}", hit.raw())?;
                    kept += 1;
                }
                Ok(())
            })?;
            out.flush()?;

            info!("Kept {kept} of {total} hits");
            written(Some(&output));
        }

        BlastCommands::Best {
            blast,
            number,
            hsps,
            subject,
            output,
        } => {
            let output = default_output(output, &blast, || {
                append_suffix(&blast, if subject { ".subject.best" } else { ".best" })
            })?;
            let hits = load_blast(&blast)?;
            let best = best_hits(&hits, number, hsps, subject);

            write_hits(best, Some(output.as_path()), true)?;
            written(Some(&output));
        }

        BlastCommands::Swap { blast, output } => {
            let output = default_output(output, &blast, || append_suffix(&blast, ".swapped"))?;
            let mut swapped: Vec<BlastLine> =
                load_blast(&blast)?.iter().map(BlastLine::swapped).collect();
            sort_hits(&mut swapped, SortOrder::QueryScore);

            write_hits(&swapped, Some(output.as_path()), false)?;
            written(Some(&output));
        }

        BlastCommands::Bed {
            blast,
            swap,
            output,
        } => {
            let output = default_output(output, &blast, || replace_extension(&blast, "bed"))?;
            let mut out = create_output(Some(output.as_path()))?;
            for_each_hit(&blast, |hit| {
                let bed = if swap {
                    hit.swapped().bedline()
                } else {
                    hit.bedline()
                };
                writeln!(out, "{bed}")?;
                Ok(())
            })?;
            out.flush()?;
            written(Some(&output));
        }

        BlastCommands::Rbbh { ab, ba } => {
            let pairs = reciprocal_best_hits(&load_blast(&ab)?, &load_blast(&ba)?);
            let mut out = create_output(None)?;
            for (a, b) in &pairs {
                writeln!(out, "{a}\t{b}")?;
            }
            out.flush()?;
            info!("Found {} reciprocal best hits", pairs.len());
        }

        BlastCommands::Summary { blast } => {
            let stats = alignment_stats(&load_blast(&blast)?);
            print_alignment_stats(&stats, format)?;
        }

        BlastCommands::Sort {
            blast,
            query,
            reference,
            refscore,
            output,
        } => {
            let order = if query {
                SortOrder::Query
            } else if reference {
                SortOrder::Ref
            } else if refscore {
                SortOrder::RefScore
            } else {
                SortOrder::QueryScore
            };

            if output.is_none() && is_gzipped(&blast) {
                anyhow::bail!(
                    "Cannot sort `{}` in place because it is compressed; give `-o`",
                    blast.display()
                );
            }
            let output = default_output(output, &blast, || blast.clone())?;

            let mut hits = load_blast(&blast)?;
            sort_hits(&mut hits, order);

            write_hits(&hits, Some(output.as_path()), true)?;
            written(Some(&output));
        }

        BlastCommands::Top10 { blast, top, ids } => {
            let names = load_names(ids.as_deref())?;

            let mut out = create_output(None)?;
            for (count, subject) in top_subjects(&load_blast(&blast)?, top) {
                writeln!(out, "{count}\t{}", renamed(names.as_ref(), &subject))?;
            }
            out.flush()?;
        }

        BlastCommands::Covfilter {
            blast,
            sizes,
            pctid,
            pctcov,
            scov,
            ids,
            list,
            output,
        } => {
            let hits = load_blast(&blast)?;
            let sizes = load_sizes(&sizes)?;
            let report = coverage_filter(&hits, &sizes, pctid, pctcov, scov)
                .with_context(|| format!("Failed to compute coverage of `{}`", blast.display()))?;

            if list {
                let mut out = create_output(None)?;
                for (id, _) in sizes.iter() {
                    let (identity, coverage) = report
                        .get(id)
                        .map_or((0.0, 0.0), |q| (q.identity, q.coverage));
                    writeln!(out, "{id}\t{identity:.1}\t{coverage:.1}")?;
                }
                out.flush()?;
            }

            let message = report.message(pctid, pctcov);
            eprintln!("{message}");
            if !is_stdio(&blast) {
                let logfile = append_suffix(&blast, ".covfilter.log");
                std::fs::write(&logfile, format!("{message}\n"))
                    .with_context(|| format!("Failed to write `{}`", logfile.display()))?;
                written(Some(&logfile));
            }

            let valid = report.valid_ids();
            if let Some(ids) = ids {
                let mut out = create_output(Some(ids.as_path()))?;
                for q in report.queries.iter().filter(|q| q.valid) {
                    writeln!(out, "{}", q.id)?;
                }
                out.flush()?;
                info!(
                    "Queries beyond cutoffs (id={pctid}% cov={pctcov}%) written to `{}`",
                    ids.display()
                );
            }

            if let Some(output) = output {
                let kept = hits.iter().filter(|h| valid.contains(h.query.as_str()));
                write_hits(kept, Some(output.as_path()), true)?;
                written(Some(&output));
            }
        }

        BlastCommands::Chain {
            blast,
            dist,
            output,
        } => {
            let hits = load_blast(&blast)?;
            let chained = chain_hsps(&hits, dist);
            info!("Chained {} HSPs into {}", hits.len(), chained.len());
            write_hits(&chained, output.as_deref(), false)?;
            written(output.as_ref());
        }

        BlastCommands::Condense { blast, output } => {
            let hits = load_blast(&blast)?;
            let condensed = condense_hsps(&hits);
            info!("Condensed {} HSPs into {}", hits.len(), condensed.len());
            write_hits(&condensed, output.as_deref(), false)?;
            written(output.as_ref());
        }

        BlastCommands::Cscore {
            blast,
            cutoff,
            pct,
            strip_names,
            output,
        } => {
            let hits = load_blast(&blast)?;
            let mut out = create_output(output.as_deref())?;
            for c in cscores(&hits, cutoff, strip_names) {
                if pct {
                    writeln!(
                        out,
                        "{}\t{}\t{:.2}\t{:.1}",
                        c.query, c.subject, c.cscore, c.hit.pctid
                    )?;
                } else {
                    writeln!(out, "{}\t{}\t{:.2}", c.query, c.subject, c.cscore)?;
                }
            }
            out.flush()?;
            written(output.as_ref());
        }

        BlastCommands::Score { blast, sizes, ids } => {
            let ids: HashSet<String> = read_ids(&ids, false)
                .with_context(|| format!("Failed to read IDs from `{}`", ids.display()))?
                .into_iter()
                .collect();
            debug!("Loaded {} subject IDs", ids.len());

            let hits = load_blast(&blast)?;
            let scores = query_scores(&hits, &ids);
            let mut out = create_output(None)?;
            for (id, _) in load_sizes(&sizes)?.iter() {
                let score = scores.get(id).copied().unwrap_or_default();
                writeln!(out, "{id}\t{}", format_float(score))?;
            }
            out.flush()?;
        }

        BlastCommands::Subset {
            blast,
            qbed,
            sbed,
            qchrs,
            schrs,
            convert,
            output,
        } => {
            let output = default_output(output, &blast, || {
                let mut suffix = String::from(".");
                if let Some(q) = &qchrs {
                    suffix.push_str(&split_list(q).join(","));
                    suffix.push('.');
                }
                if let Some(s) = &schrs {
                    let same = qbed == sbed
                        && qchrs.as_deref().map(split_list) == Some(split_list(s));
                    if !same {
                        suffix.push_str(&split_list(s).join(","));
                        suffix.push('.');
                    }
                }
                suffix.push_str("blast");
                append_suffix(&blast, &suffix)
            })?;

            let qfeatures = Bed::from_file(&qbed)
                .with_context(|| format!("Failed to parse BED `{}`", qbed.display()))?;
            let sfeatures = Bed::from_file(&sbed)
                .with_context(|| format!("Failed to parse BED `{}`", sbed.display()))?;
            let qset = selected(qchrs.as_deref(), &qfeatures);
            let sset = selected(schrs.as_deref(), &sfeatures);

            let hits = load_blast(&blast)?;
            let kept = subset_hits(
                &hits,
                &qfeatures.order(),
                &sfeatures.order(),
                &qset,
                &sset,
                convert,
            )
            .with_context(|| format!("Failed to subset `{}`", blast.display()))?;

            write_hits(&kept, Some(output.as_path()), true)?;
            info!("Kept {} of {} hits", kept.len(), hits.len());
            written(Some(&output));
        }

        BlastCommands::Annotation {
            blast,
            queryids,
            subjectids,
        } => {
            let qnames = load_names(queryids.as_deref())?;
            let snames = load_names(subjectids.as_deref())?;

            let mut out = create_output(None)?;
            for_each_hit(&blast, |hit| {
                writeln!(
                    out,
                    "{}\t{}",
                    renamed(qnames.as_ref(), &hit.query),
                    renamed(snames.as_ref(), &hit.subject)
                )?;
                Ok(())
            })?;
            out.flush()?;
        }

        BlastCommands::Completeness { blast, sizes, ids } => {
            let rows = completeness(&load_blast(&blast)?, &load_sizes(&sizes)?)
                .with_context(|| format!("Failed to measure `{}`", blast.display()))?;

            let mut out = create_output(None)?;
            for r in &rows {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    r.query, r.subject, r.nterm, r.cterm, r.covered
                )?;
            }
            out.flush()?;

            let valid: Vec<&Completeness> = rows.iter().filter(|r| r.is_complete()).collect();
            eprintln!(
                "Total: {}, Coverage > {}%: {}",
                rows.len(),
                Completeness::CUTOFF,
                percentage_short(valid.len() as u64, rows.len() as u64)
            );
            let columns: [(&str, fn(&Completeness) -> u64); 3] = [
                ("N-terminal", |r| r.nterm),
                ("C-terminal", |r| r.cterm),
                ("Coverage", |r| r.covered),
            ];
            for (title, column) in columns {
                let values: Vec<u64> = rows.iter().map(column).collect();
                if let Some(stats) = SummaryStats::new(&values) {
                    eprintln!("{}", stats.with_title(title));
                }
            }

            if let Some(ids) = ids {
                let mut out = create_output(Some(ids.as_path()))?;
                for r in &valid {
                    writeln!(out, "{}", r.query)?;
                }
                out.flush()?;
                info!(
                    "{} queries (cov > {}%) written to `{}`",
                    valid.len(),
                    Completeness::CUTOFF,
                    ids.display()
                );
            }
        }

        BlastCommands::Annotate {
            blast,
            qsizes,
            ssizes,
            pctid,
            hitlen,
            hang,
        } => {
            let qsizes = load_sizes(&qsizes)?;
            let ssizes = load_sizes(&ssizes)?;
            debug!("Cutoffs: pctid={pctid} hitlen={hitlen} hang={hang}");

            let mut out = create_output(None)?;
            for_each_hit(&blast, |hit| {
                if hit.query == hit.subject || hit.pctid < pctid || hit.hitlen < hitlen {
                    return Ok(());
                }
                let qsize = qsizes
                    .get_size(&hit.query)
                    .with_context(|| format!("No size for query `{}`", hit.query))?;
                let ssize = ssizes
                    .get_size(&hit.subject)
                    .with_context(|| format!("No size for subject `{}`", hit.subject))?;

                let ov = hit.overlap(qsize, ssize, hang);
                if ov != Overlap::None {
                    writeln!(out, "{}\t{ov}", hit.raw())?;
                }
                Ok(())
            })?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Print coverage and identity in the requested format
pub(crate) fn print_alignment_stats(
    stats: &AlignmentStats,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Reference coverage: {} bp", thousands(stats.ref_covered));
            println!("Query coverage: {} bp", thousands(stats.query_covered));
            println!("Identity: {:.2}%", stats.identity_pct);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(stats)?),
        OutputFormat::Tsv => {
            println!("ref_covered\tquery_covered\tidentity_pct");
            println!(
                "{}\t{}\t{:.2}",
                stats.ref_covered, stats.query_covered, stats.identity_pct
            );
        }
    }
    Ok(())
}
