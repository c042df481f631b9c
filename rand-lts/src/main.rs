use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;


/// Writes a random LTS in Aldebaran format.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Output file.
    #[arg(value_name = "AUT")]
    out: PathBuf,

    /// Number of states.
    #[arg(value_name = "INT")]
    states: usize,

    /// Number of distinct transitions leaving each state.
    #[arg(value_name = "INT")]
    transitions: usize,

    /// Number of labels.
    #[arg(value_name = "INT")]
    labels: usize,

    /// Seed for reproducible output, random if missing.
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,
}

fn check_args(args: &Cli) -> Result<()> {
    ensure!(args.states > 0, "States count must be positive");
    // An overflowing product leaves room for any count.
    ensure!(
        args.states.checked_mul(args.labels).map_or(true, |max| args.transitions <= max),
        "Cannot have {} distinct transitions per state with {} states and {} labels",
        args.transitions,
        args.states,
        args.labels
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    check_args(&args)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let lts = aut::random_lts(&mut rng, args.states, args.transitions, args.labels);

    let out = File::create(&args.out).context("Cannot create output file")?;
    let mut out = BufWriter::new(out);
    write!(out, "{lts}").context("Failed to write output file")?;
    out.flush()?;

    Ok(())
}
