use std::fmt;

use log::debug;

use crate::graph::{DependencyGraph, DgNodeId, Hyperedge};
use crate::index::IndexedVec;
use crate::marking::{Status, StatusMarking};

/// A hyperedge waiting to be proven, together with the node it belongs to.
/// Targets are consumed from the back as they become true.
type Entry = (DgNodeId, Hyperedge);

/// Returned when a bounded solve runs out of steps before reaching a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inconclusive {
    pub steps: usize,
}

impl fmt::Display for Inconclusive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no verdict after {} solver steps", self.steps)
    }
}

impl std::error::Error for Inconclusive {}

/// Computes the minimal fixpoint status of `root`, exploring the graph on demand.
///
/// Nodes not needed to decide `root` are left `Unexplored`. The status of
/// `root` is exact: `True` if it is satisfied, `False` otherwise.
pub fn solve_local<G: DependencyGraph + ?Sized>(graph: &mut G, root: DgNodeId) -> StatusMarking {
    let mut solver = LocalSolver::new(graph, root);
    while solver.step(graph) {}
    solver.finish()
}

/// Like [`solve_local`], but gives up after processing `max_steps` work entries.
pub fn solve_local_bounded<G: DependencyGraph + ?Sized>(
    graph: &mut G,
    root: DgNodeId,
    max_steps: usize,
) -> Result<StatusMarking, Inconclusive> {
    let mut solver = LocalSolver::new(graph, root);
    while !solver.work.is_empty() {
        if solver.steps >= max_steps {
            debug!("local solve from {root} inconclusive after {} steps", solver.steps);
            return Err(Inconclusive { steps: solver.steps });
        }
        solver.step(graph);
    }
    Ok(solver.finish())
}

struct LocalSolver {
    root: DgNodeId,
    status: IndexedVec<DgNodeId, Status>,
    deps: IndexedVec<DgNodeId, Vec<Entry>>,
    work: Vec<Entry>,
    steps: usize,
    explored: usize,
}

impl LocalSolver {
    fn new<G: DependencyGraph + ?Sized>(graph: &mut G, root: DgNodeId) -> Self {
        let mut solver = Self {
            root,
            status: IndexedVec::new(),
            deps: IndexedVec::new(),
            work: Vec::new(),
            steps: 0,
            explored: 0,
        };
        solver.explore(graph, root, Vec::new());
        solver
    }

    fn status(&self, node: DgNodeId) -> Status {
        self.status.get(node).copied().unwrap_or(Status::Unexplored)
    }

    fn set_status(&mut self, node: DgNodeId, status: Status) {
        *self.status.ensure_with(node, || Status::Unexplored) = status;
    }

    /// Marks `node` as provisionally false and schedules all its hyperedges.
    fn explore<G: DependencyGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        node: DgNodeId,
        waiting: Vec<Entry>,
    ) {
        self.set_status(node, Status::False);
        *self.deps.ensure_with(node, Vec::new) = waiting;
        self.explored += 1;

        // Pushed in reverse so that the first hyperedge is processed first.
        let edges = graph.hyperedges(node);
        self.work.extend(edges.into_iter().rev().map(|edge| (node, edge)));
    }

    /// Processes one work entry. Returns `false` once there is nothing left to do.
    fn step<G: DependencyGraph + ?Sized>(&mut self, graph: &mut G) -> bool {
        let Some((source, mut targets)) = self.work.pop() else { return false };
        self.steps += 1;

        // Stale entry, the source has already been proven.
        if self.status(source) != Status::False {
            return true;
        }

        while let Some(&last) = targets.last() {
            if self.status(last) != Status::True {
                break;
            }
            targets.pop();
        }

        let Some(&head) = targets.last() else {
            self.set_status(source, Status::True);
            let waiting = self.deps.get_mut(source).map(std::mem::take).unwrap_or_default();
            self.work.extend(waiting);
            return true;
        };

        match self.status(head) {
            Status::False => self.deps[head].push((source, targets)),
            Status::Unexplored => self.explore(graph, head, vec![(source, targets)]),
            Status::True => unreachable!("true targets were just removed"),
        }

        true
    }

    fn finish(self) -> StatusMarking {
        debug!(
            "local solve from {}: {:?} after exploring {} nodes in {} steps",
            self.root,
            self.status(self.root),
            self.explored,
            self.steps
        );
        StatusMarking::new(self.status)
    }
}
