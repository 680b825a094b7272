use clap::Parser;
use tracing_subscriber::EnvFilter;

use genokit::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("genokit=debug,info")
    } else {
        EnvFilter::new("genokit=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Fasta(args) => cli::fasta::run(args, cli.format, cli.verbose)?,
        cli::Commands::Sizes(args) => cli::sizes::run(args, cli.format, cli.verbose)?,
        cli::Commands::Agp(args) => cli::agp::run(args, cli.format, cli.verbose)?,
        cli::Commands::Bed(args) => cli::bed::run(args, cli.format, cli.verbose)?,
        cli::Commands::Blast(args) => cli::blast::run(args, cli.format, cli.verbose)?,
        cli::Commands::Btab(args) => cli::btab::run(args, cli.format, cli.verbose)?,
        cli::Commands::Coords(args) => cli::coords::run(args, cli.format, cli.verbose)?,
        cli::Commands::Gff(args) => cli::gff::run(args, cli.format, cli.verbose)?,
        cli::Commands::Sam(args) => cli::sam::run(args, cli.format, cli.verbose)?,
    }

    Ok(())
}
