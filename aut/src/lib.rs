mod random;
mod weak;

#[cfg(test)]
mod test;

use std::fmt;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use log::debug;
use solver::index::{AsIndex as _, IndexedVec};
use solver::new_index;

pub use random::random_lts;
pub use weak::WeakLts;

new_index!(pub index StateId);

pub type Label = Rc<str>;

/// The label of internal, unobservable moves.
pub const TAU: &str = "tau";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub label: Label,
    pub target: StateId,
}

impl Transition {
    pub fn new(label: impl Into<Label>, target: StateId) -> Self {
        Self { label: label.into(), target }
    }

    pub fn is_tau(&self) -> bool {
        &*self.label == TAU
    }
}

/// Produces the outgoing transitions of a state. Must be deterministic and
/// finitely branching.
pub trait SuccessorGenerator {
    fn successors(&self, state: StateId) -> &[Transition];
}

impl<G: SuccessorGenerator + ?Sized> SuccessorGenerator for &G {
    fn successors(&self, state: StateId) -> &[Transition] {
        (**self).successors(state)
    }
}

#[derive(Clone, Debug)]
pub struct Lts {
    pub first_state: StateId,
    pub transitions: IndexedVec<StateId, Vec<Transition>>,
}

impl Lts {
    /// Builds an LTS from `(source, label, target)` triples over `state_count` states.
    pub fn from_edges<'a>(
        first_state: StateId,
        state_count: usize,
        edges: impl IntoIterator<Item = (usize, &'a str, usize)>,
    ) -> Self {
        let mut transitions = IndexedVec::from(vec![Vec::new(); state_count]);
        for (source, label, target) in edges {
            transitions[StateId(source)].push(Transition::new(label, StateId(target)));
        }
        Self { first_state, transitions }
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + DoubleEndedIterator {
        self.transitions.indexes()
    }

    /// Places `other` after the states of `self`, returning the combined LTS
    /// and the position of `other`'s first state in it.
    pub fn union(&self, other: &Lts) -> (Lts, StateId) {
        let offset = self.state_count();
        let shift = |s: StateId| StateId(s.to_usize() + offset);

        let mut transitions = self.transitions.clone();
        for trans in other.transitions.iter() {
            let shifted = trans.iter().map(|t| Transition::new(t.label.clone(), shift(t.target)));
            transitions.push(shifted.collect());
        }

        (Lts { first_state: self.first_state, transitions }, shift(other.first_state))
    }
}

impl SuccessorGenerator for Lts {
    fn successors(&self, state: StateId) -> &[Transition] {
        &self.transitions[state]
    }
}

/// Writes the LTS in Aldebaran format.
impl fmt::Display for Lts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, trans, states) =
            (self.first_state, self.transition_count(), self.state_count());
        writeln!(f, "des ({first},{trans},{states})")?;
        for (state, trans) in self.transitions.enumerate() {
            for t in trans {
                writeln!(f, "({},\"{}\",{})", state, t.label, t.target)?;
            }
        }
        Ok(())
    }
}

// aut_header        ::=  'des (' first_state ',' nr_of_transitions ',' nr_of_states ')'
// aut_edge          ::=  '(' start_state ',' label ',' end_state ')'
// label             ::=  '"' string '"' | string
pub fn parse_aut(source: &str) -> Result<Lts> {
    let mut lines = source.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().context("File is empty")?.trim();
    let header = header.strip_prefix("des").context("Expected 'des'")?;
    let header = header.trim().strip_prefix('(').context("Expected '('")?;
    let (first_state, header) = header.split_once(',').context("Expected first state")?;
    let (trans_count, header) = header.split_once(',').context("Expected trans count")?;
    let state_count = header.trim_end().strip_suffix(')').context("Expected state count")?;

    let first_state = first_state.trim().parse().context("Expected first state to be a number")?;
    let trans_count = trans_count.trim().parse().context("Expected trans count to be a number")?;
    let state_count = state_count.trim().parse().context("Expected state count to be a number")?;

    if first_state >= state_count {
        bail!("First state {first_state} doesn't exist")
    }
    let first_state = StateId(first_state);

    let mut transitions = IndexedVec::from(vec![Vec::new(); state_count]);
    let mut transitions_count = 0usize;

    for line in lines {
        let line = line.trim().strip_prefix('(').context("Expected '('")?;
        let (start_state, line) = line.split_once(',').context("Expected start state")?;
        let (label, line) = match line.trim_start().strip_prefix('"') {
            Some(line) => {
                let (label, line) = line.split_once('"').context("Expected label '\"'")?;
                let line = line.trim_start().strip_prefix(',').context("Expected label ','")?;
                (label, line)
            }
            None => line.split_once(',').context("Expected label")?,
        };
        let end_state = line.trim_end().strip_suffix(')').context("Expected end state")?;

        let start_state = start_state.trim().parse().context("Start state is not a number")?;
        let end_state = end_state.trim().parse().context("End state is not a number")?;

        if start_state >= state_count {
            bail!("Start state {start_state} doesn't exist")
        }
        if end_state >= state_count {
            bail!("End state {end_state} doesn't exist")
        }

        transitions[StateId(start_state)].push(Transition::new(label.trim(), StateId(end_state)));
        transitions_count += 1;
    }

    if transitions_count != trans_count {
        bail!("Wrong number of transitions: got {transitions_count}, expected {trans_count}");
    }

    debug!("parsed LTS with {state_count} states and {trans_count} transitions");

    Ok(Lts { first_state, transitions })
}
