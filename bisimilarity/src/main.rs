use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use aut::{parse_aut, Lts, StateId, SuccessorGenerator, WeakLts};
use bisimilarity::{
    bisimulation_collapse_of, distinguishing_formula, is_trace_included, BisimulationBuilder,
};
use clap::Parser;
use simplelog::LevelFilter;
use solver::index::AsIndex;
use solver::{solve_levels, DgNodeId, Marking};

/// Compares two LTSs for bisimilarity.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// First LTS in Aldebaran format.
    #[arg(value_name = "AUT")]
    left: PathBuf,

    /// Second LTS in Aldebaran format.
    #[arg(value_name = "AUT")]
    right: PathBuf,

    /// State of the first LTS to compare, defaults to its initial state.
    #[arg(long, value_name = "INT")]
    left_state: Option<usize>,

    /// State of the second LTS to compare, defaults to its initial state.
    #[arg(long, value_name = "INT")]
    right_state: Option<usize>,

    /// Answer moves with weak transitions, checking weak bisimilarity.
    #[arg(long)]
    weak: bool,

    /// Also check trace inclusion in both directions.
    #[arg(long)]
    traces: bool,

    /// Print the bisimilarity classes of all the states of both LTSs.
    #[arg(long)]
    collapse: bool,

    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn read_lts(path: &Path) -> Result<Lts> {
    let file = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_aut(&file).with_context(|| format!("Failed to parse {}", path.display()))
}

fn pick_state(lts: &Lts, state: Option<usize>) -> Result<StateId> {
    let state = state.map_or(lts.first_state, StateId);
    ensure!(state.to_usize() < lts.state_count(), "State {state} doesn't exist");
    Ok(state)
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

    let lts1 = read_lts(&args.left)?;
    let lts2 = read_lts(&args.right)?;
    let init1 = pick_state(&lts1, args.left_state)?;
    let init2 = pick_state(&lts2, args.right_state)?;

    // Both processes live in the same LTS, the second one shifted after the first.
    let (lts, _) = lts1.union(&lts2);
    let init2 = StateId(init2.to_usize() + lts1.state_count());

    println!("Preprocessing took {:?}", now.elapsed());

    if args.weak {
        let weak = WeakLts::new(&lts);
        run(&args, &lts, &weak, init1, init2)
    } else {
        run(&args, &lts, &lts, init1, init2)
    }
}

fn run<D>(args: &Cli, lts: &Lts, defend: &D, left: StateId, right: StateId) -> Result<()>
where
    D: SuccessorGenerator + ?Sized,
{
    let now = std::time::Instant::now();

    let mut builder = BisimulationBuilder::new(lts, defend, left, right);
    let marking = solve_levels(&mut builder);
    let is_bisimilar = !marking.is_true(DgNodeId::ROOT);

    println!("Solve took {:?}", now.elapsed());
    println!("The processes {} bisimilar", if is_bisimilar { "are" } else { "are not" });

    if !is_bisimilar {
        let formula = distinguishing_formula(&mut builder, &marking)?;
        println!("Distinguishing formula: {formula}");
    }

    if args.traces {
        let included = is_trace_included(lts, defend, left, right);
        let including = is_trace_included(lts, defend, right, left);
        println!("Traces of the first included in the second: {included}");
        println!("Traces of the second included in the first: {including}");
    }

    if args.collapse {
        if let Some(collapse) = bisimulation_collapse_of(lts, defend, lts.states()) {
            for (repr, class) in collapse.classes() {
                let members = class.iter().map(|s| s.to_string()).collect::<Vec<_>>();
                println!("{repr}: {{{}}}", members.join(", "));
            }
        }
    }

    Ok(())
}
