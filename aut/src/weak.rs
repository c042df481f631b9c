use std::cell::OnceCell;

use log::trace;
use solver::index::IndexedVec;
use solver::Set;

use crate::{Lts, StateId, SuccessorGenerator, Transition, TAU};

/// Weak transitions of an LTS, computed on demand and cached per state.
///
/// `s =tau=> s'` iff `s -tau->* s'` (zero steps included), and for any other
/// label `s =a=> s'` iff `s -tau->* -a-> -tau->* s'`.
pub struct WeakLts<'a> {
    lts: &'a Lts,
    cache: IndexedVec<StateId, OnceCell<Vec<Transition>>>,
}

impl<'a> WeakLts<'a> {
    pub fn new(lts: &'a Lts) -> Self {
        let cache = lts.states().map(|_| OnceCell::new()).collect();
        Self { lts, cache }
    }

    /// States reachable with zero or more tau moves, in discovery order.
    fn tau_closure(&self, state: StateId) -> Set<StateId> {
        let mut seen = Set::default();
        seen.insert(state);
        let mut queue = vec![state];
        while let Some(s) = queue.pop() {
            let taus = self.lts.successors(s).iter().filter(|t| t.is_tau());
            queue.extend(taus.map(|t| t.target).filter(|&t| seen.insert(t)));
        }
        seen
    }

    fn compute(&self, state: StateId) -> Vec<Transition> {
        let before = self.tau_closure(state);
        let tau = crate::Label::from(TAU);

        let mut weak = before.iter().map(|&s| Transition::new(tau.clone(), s)).collect::<Set<_>>();
        for &s in &before {
            for t in self.lts.successors(s).iter().filter(|t| !t.is_tau()) {
                for after in self.tau_closure(t.target) {
                    weak.insert(Transition::new(t.label.clone(), after));
                }
            }
        }

        trace!("state {state} has {} weak transitions", weak.len());
        weak.into_iter().collect()
    }
}

impl SuccessorGenerator for WeakLts<'_> {
    fn successors(&self, state: StateId) -> &[Transition] {
        self.cache[state].get_or_init(|| self.compute(state))
    }
}
