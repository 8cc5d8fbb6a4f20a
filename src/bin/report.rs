//! Report Binary
//!
//! Averages a designated field per key across a measures file, joins
//! the averages with a directory file, and prints the top entries.
//!
//! Options: --field, --top

use anyhow::Context;
use clap::Parser;
use granary::report;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-delimited measures file; the first field is the key.
    measures: PathBuf,
    /// Comma-delimited directory file; the first field is the key.
    directory: PathBuf,
    /// Index of the averaged field, counting after the key.
    #[arg(long, default_value_t = report::SCORE_FIELD)]
    field: usize,
    /// How many ranked entries to print.
    #[arg(long, default_value_t = report::TOP)]
    top: usize,
}

fn main() -> anyhow::Result<()> {
    granary::log();
    let args = Args::parse();
    let measures = File::open(&args.measures)
        .with_context(|| format!("open {}", args.measures.display()))?;
    let directory = File::open(&args.directory)
        .with_context(|| format!("open {}", args.directory.display()))?;
    let measures = report::records(measures)?;
    let directory = report::records(directory)?;
    log::info!("averaging {} measure records", measures.len());
    let scores = report::averages(measures, args.field);
    let ranked = report::rank(&scores, directory);
    log::info!("ranked {} joined keys", ranked.len());
    for entry in ranked.iter().take(args.top) {
        println!("{:?}", (&entry.key, (entry.score, &entry.fields)));
    }
    Ok(())
}
