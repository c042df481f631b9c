use aut::{StateId, SuccessorGenerator};
use log::trace;
use solver::graph::construct_all;
use solver::index::{IndexedSet, IndexedVec};
use solver::{DependencyGraph, DgNodeId, FullDependencyGraph, Hyperedge};

/// Dependency graph for trace inclusion of a left process in a right one.
///
/// Each node pairs a left state with the set of right states reachable by
/// the same trace, kept sorted and deduplicated. A node is satisfied iff the
/// left side can perform a trace that no right state can follow, so the left
/// process is trace-included iff the root is *not* satisfied.
pub struct TraceInclusionBuilder<'a, A: ?Sized, D: ?Sized> {
    attack: &'a A,
    defend: &'a D,
    nodes: IndexedSet<DgNodeId, (StateId, Vec<StateId>)>,
    edges: IndexedVec<DgNodeId, Option<Vec<Hyperedge>>>,
}

impl<'a, A, D> TraceInclusionBuilder<'a, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    pub fn new(attack: &'a A, defend: &'a D, left: StateId, right: StateId) -> Self {
        let mut builder =
            Self { attack, defend, nodes: IndexedSet::default(), edges: IndexedVec::new() };
        builder.node(left, vec![right]);
        builder
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The left state and right set of a node.
    pub fn state_of(&self, node: DgNodeId) -> (StateId, &[StateId]) {
        let (left, rights) = &self.nodes[node];
        (*left, rights)
    }

    fn node(&mut self, left: StateId, rights: Vec<StateId>) -> DgNodeId {
        let (node, is_new) = self.nodes.insert_full((left, rights));
        if is_new {
            self.edges.push(None);
        }
        node
    }

    fn construct(&mut self, left: StateId, rights: &[StateId]) -> Vec<Hyperedge> {
        let (attack, defend) = (self.attack, self.defend);
        let mut edges = Vec::new();
        for t in attack.successors(left) {
            let mut matched = rights
                .iter()
                .flat_map(|&right| defend.successors(right))
                .filter(|u| u.label == t.label)
                .map(|u| u.target)
                .collect::<Vec<_>>();

            // Nothing on the right can follow: the left side wins right away.
            if matched.is_empty() {
                edges.push(Vec::new());
                continue;
            }

            matched.sort_unstable();
            matched.dedup();
            edges.push(vec![self.node(t.target, matched)]);
        }
        edges
    }
}

impl<A, D> DependencyGraph for TraceInclusionBuilder<'_, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    fn hyperedges(&mut self, node: DgNodeId) -> Vec<Hyperedge> {
        if let Some(edges) = &self.edges[node] {
            return edges.clone();
        }

        let (left, rights) = self.nodes[node].clone();
        trace!("constructing trace node {node}: {left} against {rights:?}");
        let edges = self.construct(left, &rights);
        self.edges[node] = Some(edges.clone());
        edges
    }
}

impl<A, D> FullDependencyGraph for TraceInclusionBuilder<'_, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    fn all_hyperedges(&mut self) -> Vec<(DgNodeId, Vec<Hyperedge>)> {
        construct_all(self, |builder| builder.nodes.len())
    }
}
