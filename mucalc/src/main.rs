use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use aut::{parse_aut, StateId, WeakLts};
use clap::Parser;
use mucalc::{parse_formula, FixType, FormulaSet, MuCalcBuilder};
use simplelog::LevelFilter;
use solver::index::AsIndex;
use solver::{solve_local, solve_local_bounded, DgNodeId, Marking};

/// Checks a mu-calculus formula against a state of an LTS.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// LTS in Aldebaran format.
    #[arg(value_name = "AUT")]
    aut: PathBuf,

    /// File containing the formula.
    #[arg(value_name = "MCF")]
    formula: PathBuf,

    /// State to check, defaults to the initial state.
    #[arg(long, value_name = "INT")]
    state: Option<usize>,

    /// Give up after this many solver steps.
    #[arg(long, value_name = "INT")]
    max_steps: Option<usize>,

    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let now = std::time::Instant::now();

    let aut_file = std::fs::read_to_string(&args.aut)
        .with_context(|| format!("Failed to read {}", args.aut.display()))?;
    let mucalc_file = std::fs::read_to_string(&args.formula)
        .with_context(|| format!("Failed to read {}", args.formula.display()))?;

    let lts = parse_aut(&aut_file).context("Failed to parse aut file")?;
    let formula = parse_formula(&mucalc_file)?;
    let formulas = FormulaSet::new(&formula)?;

    let state = args.state.map_or(lts.first_state, StateId);
    ensure!(state.to_usize() < lts.state_count(), "State {state} doesn't exist");

    let weak = WeakLts::new(&lts);
    let mut builder =
        MuCalcBuilder::new(FixType::Min, &lts, &weak, &formulas, state, Rc::new(formula));

    println!("Preprocessing took {:?}", now.elapsed());

    let now = std::time::Instant::now();

    let marking = match args.max_steps {
        Some(max_steps) => solve_local_bounded(&mut builder, DgNodeId::ROOT, max_steps)?,
        None => solve_local(&mut builder, DgNodeId::ROOT),
    };
    let is_valid = marking.is_true(DgNodeId::ROOT);

    println!("Solve took {:?}", now.elapsed());
    println!("The formula {} satisfied", if is_valid { "is" } else { "is not" });

    Ok(())
}
