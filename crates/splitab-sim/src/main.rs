use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{
    admin::{self, BucketArgs, ForceArgs, ReportArgs, ResetArgs},
    record::{self, RecordArgs},
    Context,
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "splitab", about = "Drive A/B experiments against a shared SQLite store")]
struct Cli {
    /// YAML catalog describing the experiments.
    #[arg(long)]
    catalog: PathBuf,
    /// SQLite database holding participation and conversion tallies.
    #[arg(long)]
    store: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign an identity, record its participation and print the value.
    Choose(RecordArgs),
    /// Record a conversion and print the alternative id it was credited to.
    Convert(RecordArgs),
    /// Force (or clear) the alternative stored in a session file.
    Force(ForceArgs),
    /// Print the hashed alternative index without recording anything.
    Bucket(BucketArgs),
    /// Print JSON reports for one or all experiments.
    Report(ReportArgs),
    /// Clear the tallies of an experiment.
    Reset(ResetArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::open(&cli.catalog, &cli.store)?;
    match cli.command {
        Command::Choose(args) => record::choose(&ctx, &args),
        Command::Convert(args) => record::convert(&ctx, &args),
        Command::Force(args) => admin::force(&ctx, &args),
        Command::Bucket(args) => admin::bucket(&ctx, &args),
        Command::Report(args) => admin::report(&ctx, &args),
        Command::Reset(args) => admin::reset(&ctx, &args),
    }
}
