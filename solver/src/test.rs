use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_log::test;

use crate::graph::{DgNodeId, ExplicitGraph, Hyperedge};
use crate::level::{Choice, Goal, Level};
use crate::{solve_global, solve_levels, solve_local, solve_local_bounded, Marking, Status};

fn graph(nodes: Vec<Vec<Vec<usize>>>) -> ExplicitGraph {
    ExplicitGraph::from(nodes)
}

fn random_graph(rng: &mut StdRng, nodes: usize) -> ExplicitGraph {
    let nodes = (0..nodes)
        .map(|_| {
            let edge_count = rng.gen_range(0..4);
            (0..edge_count)
                .map(|_| {
                    let len = rng.gen_range(0..3);
                    (0..len).map(|_| rng.gen_range(0..nodes)).collect_vec()
                })
                .collect_vec()
        })
        .collect_vec();
    ExplicitGraph::from(nodes)
}

#[test]
fn conjunction_of_true_nodes() {
    let mut g = graph(vec![vec![vec![1, 2]], vec![vec![]], vec![vec![]]]);
    let marking = solve_local(&mut g, DgNodeId::ROOT);
    assert_eq!(marking.status(DgNodeId::ROOT), Status::True);
}

#[test]
fn conjunction_with_false_node() {
    let mut g = graph(vec![vec![vec![1, 2]], vec![vec![]], vec![]]);
    assert_eq!(solve_local(&mut g, DgNodeId::ROOT).status(DgNodeId::ROOT), Status::False);
    assert_eq!(solve_global(&mut g).status(DgNodeId::ROOT), Status::False);
}

#[test]
fn disjunction_needs_one_edge() {
    let mut g = graph(vec![vec![vec![1], vec![2]], vec![], vec![vec![]]]);
    assert!(solve_local(&mut g, DgNodeId::ROOT).is_true(DgNodeId::ROOT));
    assert!(solve_global(&mut g).is_true(DgNodeId::ROOT));
}

#[test]
fn cycles_are_false_in_minimal_fixpoint() {
    let mut g = graph(vec![vec![vec![1]], vec![vec![0]]]);
    let local = solve_local(&mut g, DgNodeId::ROOT);
    assert_eq!(local.status(DgNodeId(0)), Status::False);
    assert_eq!(local.status(DgNodeId(1)), Status::False);

    let global = solve_global(&mut g);
    assert_eq!(global.status(DgNodeId(0)), Status::False);
    assert_eq!(global.status(DgNodeId(1)), Status::False);
}

#[test]
fn cycle_with_escape_is_true() {
    let mut g = graph(vec![vec![vec![1]], vec![vec![0], vec![2]], vec![vec![]]]);
    let local = solve_local(&mut g, DgNodeId::ROOT);
    assert!(local.is_true(DgNodeId(0)));
    assert!(local.is_true(DgNodeId(1)));
}

#[test]
fn unreachable_nodes_stay_unexplored() {
    // Nodes 2 and 3 are true, but not reachable from the root.
    let mut g = graph(vec![vec![vec![1]], vec![], vec![vec![3]], vec![vec![]]]);

    let local = solve_local(&mut g, DgNodeId::ROOT);
    assert_eq!(local.status(DgNodeId(0)), Status::False);
    assert_eq!(local.status(DgNodeId(1)), Status::False);
    assert_eq!(local.status(DgNodeId(2)), Status::Unexplored);
    assert_eq!(local.status(DgNodeId(3)), Status::Unexplored);
    assert!(!local.is_true(DgNodeId(2)));
    assert_eq!(local.explored_count(), 2);

    let global = solve_global(&mut g);
    assert_eq!(global.status(DgNodeId(2)), Status::True);
    assert_eq!(global.status(DgNodeId(3)), Status::True);
}

#[test]
fn local_solve_stops_early() {
    // Once the first hyperedge of the root is proven the second one is never explored.
    let mut g = graph(vec![vec![vec![1], vec![2]], vec![vec![]], vec![vec![3]], vec![vec![]]]);
    let local = solve_local(&mut g, DgNodeId::ROOT);
    assert!(local.is_true(DgNodeId::ROOT));
    assert_eq!(local.status(DgNodeId(3)), Status::Unexplored);
}

#[test]
fn bounded_solve_gives_up() {
    // A long chain ending in a true node.
    let len = 100;
    let mut nodes = (1..len).map(|i| vec![vec![i]]).collect_vec();
    nodes.push(vec![vec![]]);
    let mut g = graph(nodes);

    let err = solve_local_bounded(&mut g, DgNodeId::ROOT, 10).unwrap_err();
    assert_eq!(err.steps, 10);

    let marking = solve_local_bounded(&mut g, DgNodeId::ROOT, 10_000).unwrap();
    assert!(marking.is_true(DgNodeId::ROOT));
}

#[test]
fn levels_pick_shortest_derivation() {
    let mut g = graph(vec![
        vec![vec![1], vec![2, 3]],
        vec![vec![2]],
        vec![vec![]],
        vec![vec![]],
        vec![vec![4]],
    ]);
    let marking = solve_levels(&mut g);

    assert_eq!(marking.level(DgNodeId(2)), Level::Finite(1));
    assert_eq!(marking.level(DgNodeId(3)), Level::Finite(1));
    assert_eq!(marking.level(DgNodeId(1)), Level::Finite(2));
    assert_eq!(marking.level(DgNodeId(0)), Level::Finite(2));
    assert_eq!(marking.level(DgNodeId(4)), Level::Infinite);
    assert_eq!(marking.status(DgNodeId(4)), Status::False);

    let edges: Vec<Hyperedge> = vec![vec![DgNodeId(1)], vec![DgNodeId(2), DgNodeId(3)]];
    assert_eq!(marking.minimax_edge(&edges), Some(1));
    assert_eq!(
        marking.best_choice(&edges, Goal::Minimize),
        Some(Choice { edge: 1, target: Some(DgNodeId(2)) })
    );
    assert_eq!(
        marking.best_choice(&edges, Goal::Maximize),
        Some(Choice { edge: 0, target: Some(DgNodeId(1)) })
    );
    assert_eq!(marking.best_choice(&[], Goal::Minimize), None);
}

#[test]
fn solvers_agree_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(0xd9);
    for _ in 0..200 {
        let size = rng.gen_range(1..12);
        let mut g = random_graph(&mut rng, size);

        let global = solve_global(&mut g);
        let levels = solve_levels(&mut g);
        for n in (0..g.node_count()).map(DgNodeId) {
            assert_eq!(global.status(n), levels.status(n), "node {n} in {g:?}");
        }

        let local = solve_local(&mut g, DgNodeId::ROOT);
        assert_eq!(local.status(DgNodeId::ROOT), global.status(DgNodeId::ROOT), "{g:?}");
    }
}
