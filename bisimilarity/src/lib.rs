mod bisim;
mod collapse;
mod distinguish;
mod trace;

#[cfg(test)]
mod test;

use anyhow::Result;
use aut::{StateId, SuccessorGenerator};
use mucalc::MuCalc;
use solver::{solve_global, solve_levels, solve_local, DgNodeId, Marking};

pub use bisim::{AttackerOption, BisimulationBuilder, DefenderOption, Side};
pub use collapse::Collapse;
pub use distinguish::distinguishing_formula;
pub use trace::TraceInclusionBuilder;

/// Checks whether `left` and `right` are bisimilar. Passing a weak successor
/// generator as `defend` checks weak bisimilarity instead.
pub fn is_bisimilar<A, D>(attack: &A, defend: &D, left: StateId, right: StateId) -> bool
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    let mut builder = BisimulationBuilder::new(attack, defend, left, right);
    // The graph encodes non-bisimilarity.
    !solve_local(&mut builder, DgNodeId::ROOT).is_true(DgNodeId::ROOT)
}

/// Checks whether every trace of `left` is also a trace of `right`.
pub fn is_trace_included<A, D>(attack: &A, defend: &D, left: StateId, right: StateId) -> bool
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    let mut builder = TraceInclusionBuilder::new(attack, defend, left, right);
    !solve_local(&mut builder, DgNodeId::ROOT).is_true(DgNodeId::ROOT)
}

/// Partitions the processes reachable in the game between `left` and
/// `right`. Processes in the same class are bisimilar.
pub fn bisimulation_collapse<A, D>(
    attack: &A,
    defend: &D,
    left: StateId,
    right: StateId,
) -> Collapse
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    let mut builder = BisimulationBuilder::new(attack, defend, left, right);
    let marking = solve_global(&mut builder);
    Collapse::new(&builder, &marking)
}

/// Partitions `states` into their bisimilarity classes. Every pair of them is
/// part of the game, so two of them share a class iff they are bisimilar.
/// Returns `None` if `states` is empty.
pub fn bisimulation_collapse_of<A, D>(
    attack: &A,
    defend: &D,
    states: impl IntoIterator<Item = StateId>,
) -> Option<Collapse>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    let states = states.into_iter().collect::<Vec<_>>();
    let &first = states.first()?;

    let mut builder = BisimulationBuilder::new(attack, defend, first, first);
    for &left in &states {
        for &right in &states {
            builder.add_pair(left, right);
        }
    }

    let marking = solve_global(&mut builder);
    Some(Collapse::new(&builder, &marking))
}

/// Finds a formula telling `left` apart from `right`, failing if they are
/// bisimilar. Only strong modalities are produced.
pub fn find_distinguishing_formula<A, D>(
    attack: &A,
    defend: &D,
    left: StateId,
    right: StateId,
) -> Result<MuCalc>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    let mut builder = BisimulationBuilder::new(attack, defend, left, right);
    let marking = solve_levels(&mut builder);
    distinguishing_formula(&mut builder, &marking)
}
