use log::debug;

use crate::graph::{DgNodeId, FullDependencyGraph, Hyperedge};
use crate::index::IndexedVec;
use crate::marking::{Status, StatusMarking};

/// Computes the minimal fixpoint status of every node of the graph.
///
/// Uses the same propagation as the local solver, but starts from a complete
/// snapshot of the graph, so no node is left `Unexplored`.
pub fn solve_global<G: FullDependencyGraph + ?Sized>(graph: &mut G) -> StatusMarking {
    let all = graph.all_hyperedges();

    let mut status: IndexedVec<DgNodeId, Status> = vec![Status::False; all.len()].into();
    let mut deps: IndexedVec<DgNodeId, Vec<(DgNodeId, Hyperedge)>> =
        IndexedVec::from(vec![Vec::new(); all.len()]);
    let mut work = all
        .into_iter()
        .flat_map(|(source, edges)| edges.into_iter().map(move |edge| (source, edge)))
        .collect::<Vec<(DgNodeId, Hyperedge)>>();
    let mut steps = 0usize;

    while let Some((source, mut targets)) = work.pop() {
        steps += 1;
        if status[source] != Status::False {
            continue;
        }

        while let Some(&last) = targets.last() {
            if status[last] != Status::True {
                break;
            }
            targets.pop();
        }

        match targets.last() {
            Some(&head) => deps[head].push((source, targets)),
            None => {
                status[source] = Status::True;
                work.append(&mut deps[source]);
            }
        }
    }

    debug!(
        "global solve: {} of {} nodes true after {} steps",
        status.iter().filter(|&&s| s == Status::True).count(),
        status.len(),
        steps
    );

    StatusMarking::new(status)
}
