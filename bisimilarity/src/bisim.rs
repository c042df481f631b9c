use anyhow::{bail, Result};
use aut::{Label, StateId, SuccessorGenerator};
use log::trace;
use solver::graph::{construct_all, LazyNodes};
use solver::index::AsIndex as _;
use solver::{DependencyGraph, DgNodeId, FullDependencyGraph, Hyperedge, Map};

/// Which process the attacker moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub(crate) enum Record {
    /// The attacker picks a move of either process.
    Pair(StateId, StateId),
    /// One side moved with `label` to `target`, the other side, still in
    /// `other`, has to answer.
    Move { side: Side, label: Label, target: StateId, other: StateId },
}

/// A move available to the attacker from a pair node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackerOption {
    pub side: Side,
    pub label: Label,
    pub target: StateId,
    pub next: DgNodeId,
}

/// An answer available to the defender after an attacker move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefenderOption {
    pub target: StateId,
    pub next: DgNodeId,
}

/// Dependency graph of the bisimulation game between two processes.
///
/// Bisimilarity is a maximal fixpoint, so the graph encodes its complement:
/// a pair node is satisfied iff the attacker wins, that is iff the pair is
/// *not* bisimilar. Attacker moves are generated by `attack` and defender
/// answers by `defend`, which allows weak bisimilarity by passing a weak
/// successor generator as `defend`.
pub struct BisimulationBuilder<'a, A: ?Sized, D: ?Sized> {
    attack: &'a A,
    defend: &'a D,
    nodes: LazyNodes<Record>,
    pairs: Map<(StateId, StateId), DgNodeId>,
}

impl<'a, A, D> BisimulationBuilder<'a, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    pub fn new(attack: &'a A, defend: &'a D, left: StateId, right: StateId) -> Self {
        let nodes = LazyNodes::new(Record::Pair(left, right));
        let mut pairs = Map::default();
        pairs.insert((left, right), DgNodeId::ROOT);
        Self { attack, defend, nodes, pairs }
    }

    /// The pair node for `(left, right)`, allocated if not seen yet.
    pub fn add_pair(&mut self, left: StateId, right: StateId) -> DgNodeId {
        let nodes = &mut self.nodes;
        *self.pairs.entry((left, right)).or_insert_with(|| nodes.push(Record::Pair(left, right)))
    }

    /// The processes compared by a pair node, `None` for move nodes.
    pub fn pair_of(&self, node: DgNodeId) -> Option<(StateId, StateId)> {
        match self.record(node)? {
            Record::Pair(left, right) => Some((*left, *right)),
            Record::Move { .. } => None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every pair node allocated so far.
    pub fn pairs(&self) -> impl Iterator<Item = (DgNodeId, StateId, StateId)> + '_ {
        self.nodes.records().filter_map(|(node, record)| match record {
            Record::Pair(left, right) => Some((node, *left, *right)),
            Record::Move { .. } => None,
        })
    }

    pub(crate) fn record(&self, node: DgNodeId) -> Option<&Record> {
        (node.to_usize() < self.nodes.len()).then(|| self.nodes.record(node))
    }

    pub fn attacker_options(&mut self, node: DgNodeId) -> Result<Vec<AttackerOption>> {
        match self.record(node) {
            Some(Record::Pair(..)) => {}
            Some(Record::Move { .. }) => bail!("Node {node} is not a pair node"),
            None => bail!("Node {node} doesn't exist"),
        }

        let options = self
            .hyperedges(node)
            .into_iter()
            .map(|edge| match self.nodes.record(edge[0]) {
                Record::Move { side, label, target, .. } => AttackerOption {
                    side: *side,
                    label: label.clone(),
                    target: *target,
                    next: edge[0],
                },
                Record::Pair(..) => unreachable!("pair nodes only point to move nodes"),
            })
            .collect();
        Ok(options)
    }

    pub fn defender_options(&mut self, node: DgNodeId) -> Result<Vec<DefenderOption>> {
        let side = match self.record(node) {
            Some(Record::Move { side, .. }) => *side,
            Some(Record::Pair(..)) => bail!("Node {node} is not a move node"),
            None => bail!("Node {node} doesn't exist"),
        };

        let edges = self.hyperedges(node);
        let options = edges[0]
            .iter()
            .map(|&next| {
                let Record::Pair(left, right) = *self.nodes.record(next) else {
                    unreachable!("move nodes only point to pair nodes")
                };
                // The defender answers with the side the attacker did not move.
                let target = match side {
                    Side::Left => right,
                    Side::Right => left,
                };
                DefenderOption { target, next }
            })
            .collect();
        Ok(options)
    }

    fn attacker_moves(&mut self, left: StateId, right: StateId) -> Vec<Hyperedge> {
        // Left moves first, then right moves, each in successor order.
        let mut records = Vec::new();
        for (side, from, other) in [(Side::Left, left, right), (Side::Right, right, left)] {
            for t in self.attack.successors(from) {
                let label = t.label.clone();
                records.push(Record::Move { side, label, target: t.target, other });
            }
        }
        records.into_iter().map(|record| vec![self.nodes.push(record)]).collect()
    }

    fn defender_answers(
        &mut self,
        side: Side,
        label: &Label,
        target: StateId,
        other: StateId,
    ) -> Vec<Hyperedge> {
        let answers = self.defend.successors(other).iter().filter(|t| t.label == *label);
        let pairs = answers
            .map(|t| match side {
                Side::Left => (target, t.target),
                Side::Right => (t.target, target),
            })
            .collect::<Vec<_>>();

        // A single conjunction: the attacker wins iff every answer loses.
        vec![pairs.into_iter().map(|(l, r)| self.add_pair(l, r)).collect()]
    }
}

impl<A, D> DependencyGraph for BisimulationBuilder<'_, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    fn hyperedges(&mut self, node: DgNodeId) -> Vec<Hyperedge> {
        if let Some(edges) = self.nodes.cached(node) {
            return edges.to_vec();
        }

        let edges = match self.nodes.record(node).clone() {
            Record::Pair(left, right) => {
                trace!("constructing pair node {node}: ({left}, {right})");
                self.attacker_moves(left, right)
            }
            Record::Move { side, label, target, other } => {
                trace!("constructing {side:?} move node {node}: {label} to {target}");
                self.defender_answers(side, &label, target, other)
            }
        };
        self.nodes.store(node, edges).to_vec()
    }
}

impl<A, D> FullDependencyGraph for BisimulationBuilder<'_, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    fn all_hyperedges(&mut self) -> Vec<(DgNodeId, Vec<Hyperedge>)> {
        construct_all(self, |builder| builder.nodes.len())
    }
}
