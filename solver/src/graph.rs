use crate::index::IndexedVec;
use crate::new_index;

new_index!(pub index DgNodeId);

impl DgNodeId {
    /// The node encoding the question being asked.
    pub const ROOT: DgNodeId = DgNodeId(0);
}

/// A conjunction of target nodes. Order is kept for deterministic witness selection.
pub type Hyperedge = Vec<DgNodeId>;

/// A possibly infinite hypergraph whose nodes encode boolean equations: a node
/// is satisfied iff all the targets of at least one of its hyperedges are.
pub trait DependencyGraph {
    /// Returns a copy of the hyperedges of `node`, constructing them on first access.
    fn hyperedges(&mut self, node: DgNodeId) -> Vec<Hyperedge>;
}

/// A dependency graph that can be enumerated exhaustively, needed by the global solvers.
pub trait FullDependencyGraph: DependencyGraph {
    /// Constructs every node reachable so far (including those created while
    /// constructing) and returns a snapshot of all of them in id order.
    fn all_hyperedges(&mut self) -> Vec<(DgNodeId, Vec<Hyperedge>)>;
}

/// Arena of lazily constructed nodes, each carrying the builder-private record
/// describing how to expand it.
pub struct LazyNodes<D> {
    records: IndexedVec<DgNodeId, D>,
    edges: IndexedVec<DgNodeId, Option<Vec<Hyperedge>>>,
}

impl<D> LazyNodes<D> {
    pub fn new(root: D) -> Self {
        let mut nodes = Self { records: IndexedVec::new(), edges: IndexedVec::new() };
        nodes.push(root);
        nodes
    }

    /// Allocates the next id for a node to be expanded later.
    pub fn push(&mut self, record: D) -> DgNodeId {
        self.edges.push(None);
        self.records.push(record)
    }

    /// Allocates a node whose hyperedges are already known.
    pub fn push_constructed(&mut self, record: D, edges: Vec<Hyperedge>) -> DgNodeId {
        self.edges.push(Some(edges));
        self.records.push(record)
    }

    pub fn record(&self, node: DgNodeId) -> &D {
        &self.records[node]
    }

    pub fn cached(&self, node: DgNodeId) -> Option<&[Hyperedge]> {
        self.edges[node].as_deref()
    }

    pub fn store(&mut self, node: DgNodeId, edges: Vec<Hyperedge>) -> &[Hyperedge] {
        debug_assert!(self.edges[node].is_none(), "node {node} constructed twice");
        self.edges[node].insert(edges).as_slice()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> impl Iterator<Item = (DgNodeId, &D)> {
        self.records.enumerate()
    }
}

/// Shared implementation of `all_hyperedges`: constructs nodes in id order,
/// re-checking the length since construction may allocate more nodes.
pub fn construct_all<G: DependencyGraph>(
    graph: &mut G,
    len: impl Fn(&G) -> usize,
) -> Vec<(DgNodeId, Vec<Hyperedge>)> {
    let mut all = Vec::new();
    let mut next = 0;
    while next < len(graph) {
        let node = DgNodeId(next);
        all.push((node, graph.hyperedges(node)));
        next += 1;
    }
    all
}

/// A fully materialised dependency graph.
#[derive(Clone, Debug, Default)]
pub struct ExplicitGraph {
    nodes: IndexedVec<DgNodeId, Vec<Hyperedge>>,
}

impl ExplicitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, edges: Vec<Hyperedge>) -> DgNodeId {
        self.nodes.push(edges)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl From<Vec<Vec<Vec<usize>>>> for ExplicitGraph {
    fn from(nodes: Vec<Vec<Vec<usize>>>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|edges| {
                edges.into_iter().map(|edge| edge.into_iter().map(DgNodeId).collect()).collect()
            })
            .collect();
        Self { nodes }
    }
}

impl DependencyGraph for ExplicitGraph {
    fn hyperedges(&mut self, node: DgNodeId) -> Vec<Hyperedge> {
        self.nodes[node].clone()
    }
}

impl FullDependencyGraph for ExplicitGraph {
    fn all_hyperedges(&mut self) -> Vec<(DgNodeId, Vec<Hyperedge>)> {
        self.nodes.enumerate().map(|(n, edges)| (n, edges.clone())).collect()
    }
}
