use std::iter;

use aut::{StateId, SuccessorGenerator};
use either::Either;
use log::debug;
use solver::index::{IndexedSet, IndexedVec};
use solver::{new_index, Map, Marking, Set, Status};

use crate::BisimulationBuilder;

new_index!(index Slot);

/// Disjoint sets over dense slots, with union by rank and path compression.
#[derive(Default)]
struct UnionFind {
    parent: IndexedVec<Slot, Slot>,
    rank: IndexedVec<Slot, u8>,
}

impl UnionFind {
    fn add(&mut self) -> Slot {
        let slot = Slot(self.parent.len());
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    fn find(&mut self, slot: Slot) -> Slot {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    fn union(&mut self, a: Slot, b: Slot) {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }

        match self.rank[a].cmp(&self.rank[b]) {
            std::cmp::Ordering::Less => self.parent[a] = b,
            std::cmp::Ordering::Greater => self.parent[b] = a,
            std::cmp::Ordering::Equal => {
                self.parent[b] = a;
                self.rank[a] += 1;
            }
        }
    }
}

/// Partition of the processes seen by a bisimulation builder into classes of
/// bisimilar processes.
#[derive(Clone, Debug)]
pub struct Collapse {
    states: IndexedSet<Slot, StateId>,
    representatives: IndexedVec<Slot, StateId>,
    classes: Map<StateId, Vec<StateId>>,
}

impl Collapse {
    /// Unions every pair node of `builder` that `marking` leaves unsatisfied,
    /// that is every pair found bisimilar. The marking must be complete over
    /// the builder's pair nodes, as the one computed by the global solver.
    pub fn new<A, D, M>(builder: &BisimulationBuilder<'_, A, D>, marking: &M) -> Self
    where
        A: SuccessorGenerator + ?Sized,
        D: SuccessorGenerator + ?Sized,
        M: Marking + ?Sized,
    {
        let mut states = IndexedSet::<Slot, StateId>::default();
        let mut sets = UnionFind::default();

        for (node, left, right) in builder.pairs() {
            let [left, right] = [left, right].map(|s| {
                let (slot, is_new) = states.insert_full(s);
                if is_new {
                    sets.add();
                }
                slot
            });
            if marking.status(node) == Status::False {
                sets.union(left, right);
            }
        }

        let representatives: IndexedVec<Slot, StateId> =
            states.indexes().map(|slot| states[sets.find(slot)]).collect();
        let mut classes = Map::<StateId, Vec<StateId>>::default();
        for (slot, &repr) in representatives.enumerate() {
            classes.entry(repr).or_default().push(states[slot]);
        }

        debug!("collapsed {} processes into {} classes", states.len(), classes.len());

        Self { states, representatives, classes }
    }

    /// The representative of the class of `state`. Processes never seen by
    /// the builder are their own representative.
    pub fn representative(&self, state: StateId) -> StateId {
        match self.states.get_index_of(&state) {
            Some(slot) => self.representatives[slot],
            None => state,
        }
    }

    /// All the processes bisimilar to `state`, in discovery order.
    pub fn equivalence_class(&self, state: StateId) -> impl Iterator<Item = StateId> + '_ {
        match self.classes.get(&self.representative(state)) {
            Some(class) if self.states.contains(&state) => Either::Left(class.iter().copied()),
            _ => Either::Right(iter::once(state)),
        }
    }

    /// Every class, each listed once through its representative.
    pub fn classes(&self) -> impl Iterator<Item = (StateId, &[StateId])> + '_ {
        let mut seen = Set::default();
        self.representatives
            .iter()
            .filter(move |&&repr| seen.insert(repr))
            .map(move |&repr| (repr, self.classes[&repr].as_slice()))
    }

    /// Number of processes seen by the builder.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}
