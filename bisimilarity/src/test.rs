use itertools::Itertools;
use mucalc::{check, parse_formula, Act, MuCalc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use solver::{solve_global, solve_levels, solve_local, DependencyGraph, DgNodeId, Goal, Marking};
use test_log::test;

use aut::{random_lts, Lts, StateId, WeakLts};

use crate::{
    bisimulation_collapse, bisimulation_collapse_of, distinguishing_formula,
    find_distinguishing_formula, is_bisimilar, is_trace_included, BisimulationBuilder, Side,
    TraceInclusionBuilder,
};

fn lts(states: usize, edges: &[(usize, &str, usize)]) -> Lts {
    Lts::from_edges(StateId(0), states, edges.iter().copied())
}

/// `a.0 + b.0` in state 0 and `a.0` in state 3.
fn choice_vs_single() -> Lts {
    lts(5, &[(0, "a", 1), (0, "b", 2), (3, "a", 4)])
}

#[test]
fn equal_processes_are_bisimilar() {
    let lts = lts(4, &[(0, "a", 1), (2, "a", 3)]);
    assert!(is_bisimilar(&lts, &lts, StateId(0), StateId(2)));
    assert!(is_trace_included(&lts, &lts, StateId(0), StateId(2)));
    assert!(is_trace_included(&lts, &lts, StateId(2), StateId(0)));
}

#[test]
fn extra_branch_breaks_bisimilarity() {
    let lts = choice_vs_single();
    assert!(!is_bisimilar(&lts, &lts, StateId(0), StateId(3)));
    assert!(is_trace_included(&lts, &lts, StateId(3), StateId(0)));
    assert!(!is_trace_included(&lts, &lts, StateId(0), StateId(3)));
}

#[test]
fn distinguishing_formula_picks_shortest_move() {
    let lts = choice_vs_single();
    let formula = find_distinguishing_formula(&lts, &lts, StateId(0), StateId(3)).unwrap();

    assert_eq!(formula, MuCalc::diamond(Act::Label("b".to_string()), MuCalc::True));
    assert_eq!(formula.to_string(), "<b>tt");
    assert!(check(&formula, &lts, StateId(0)).unwrap());
    assert!(!check(&formula, &lts, StateId(3)).unwrap());
}

#[test]
fn distinguishing_formula_needs_box_for_right_moves() {
    // `a.(b.0 + c.0)` against `a.b.0 + a.c.0`.
    let edges = [
        (0, "a", 1),
        (1, "b", 2),
        (1, "c", 3),
        (4, "a", 5),
        (5, "b", 6),
        (4, "a", 7),
        (7, "c", 8),
    ];
    let lts = lts(9, &edges);
    assert!(is_trace_included(&lts, &lts, StateId(0), StateId(4)));
    assert!(is_trace_included(&lts, &lts, StateId(4), StateId(0)));

    let formula = find_distinguishing_formula(&lts, &lts, StateId(0), StateId(4)).unwrap();
    assert!(check(&formula, &lts, StateId(0)).unwrap(), "{formula}");
    assert!(!check(&formula, &lts, StateId(4)).unwrap(), "{formula}");

    let reversed = find_distinguishing_formula(&lts, &lts, StateId(4), StateId(0)).unwrap();
    assert!(check(&reversed, &lts, StateId(4)).unwrap(), "{reversed}");
    assert!(!check(&reversed, &lts, StateId(0)).unwrap(), "{reversed}");
}

#[test]
fn distinguishing_formula_parses_back() {
    let lts = lts(6, &[(0, "send(1, 2)", 1), (2, "send(1, 3)", 3), (4, "true", 5)]);

    for (p, q) in [(0, 2), (4, 2)] {
        let (p, q) = (StateId(p), StateId(q));
        let formula = find_distinguishing_formula(&lts, &lts, p, q).unwrap();
        let parsed = parse_formula(&formula.to_string()).unwrap();
        assert_eq!(parsed, formula);
        assert!(check(&parsed, &lts, p).unwrap(), "{parsed}");
        assert!(!check(&parsed, &lts, q).unwrap(), "{parsed}");
    }
}

#[test]
fn bisimilar_processes_have_no_distinguishing_formula() {
    let lts = lts(4, &[(0, "a", 1), (2, "a", 3)]);
    let mut builder = BisimulationBuilder::new(&lts, &lts, StateId(0), StateId(2));
    let marking = solve_levels(&mut builder);
    let err = distinguishing_formula(&mut builder, &marking).unwrap_err();
    assert_eq!(err.to_string(), "Processes are bisimilar");
}

#[test]
fn game_options() {
    let lts = choice_vs_single();
    let mut builder = BisimulationBuilder::new(&lts, &lts, StateId(0), StateId(3));

    let attacks = builder.attacker_options(DgNodeId::ROOT).unwrap();
    let moves = attacks.iter().map(|o| (o.side, &*o.label, o.target)).collect_vec();
    assert_eq!(
        moves,
        vec![
            (Side::Left, "a", StateId(1)),
            (Side::Left, "b", StateId(2)),
            (Side::Right, "a", StateId(4)),
        ]
    );

    let answers = builder.defender_options(attacks[0].next).unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].target, StateId(4));
    assert_eq!(builder.pair_of(answers[0].next), Some((StateId(1), StateId(4))));

    assert!(builder.defender_options(attacks[1].next).unwrap().is_empty());

    let answers = builder.defender_options(attacks[2].next).unwrap();
    assert_eq!(answers[0].target, StateId(1));
    assert_eq!(builder.pair_of(answers[0].next), Some((StateId(1), StateId(4))));
    // The pair reached by both answers is shared.
    assert_eq!(answers[0].next, builder.add_pair(StateId(1), StateId(4)));
}

#[test]
fn optimal_attacker_choice() {
    let lts = choice_vs_single();
    let mut builder = BisimulationBuilder::new(&lts, &lts, StateId(0), StateId(3));
    let marking = solve_levels(&mut builder);

    let edges = builder.hyperedges(DgNodeId::ROOT);
    let choice = marking.best_choice(&edges, Goal::Minimize).unwrap();
    assert_eq!(choice.edge, 1);
    assert_eq!(choice.target, Some(edges[1][0]));
}

#[test]
fn game_contract_violations() {
    let lts = choice_vs_single();
    let mut builder = BisimulationBuilder::new(&lts, &lts, StateId(0), StateId(3));

    assert!(builder.defender_options(DgNodeId::ROOT).is_err());
    let attacks = builder.attacker_options(DgNodeId::ROOT).unwrap();
    assert!(builder.attacker_options(attacks[0].next).is_err());
    assert!(builder.attacker_options(DgNodeId(1000)).is_err());
    assert_eq!(builder.pair_of(attacks[0].next), None);
}

#[test]
fn trace_without_match_fails_immediately() {
    let lts = lts(3, &[(0, "a", 1)]);
    let mut builder = TraceInclusionBuilder::new(&lts, &lts, StateId(0), StateId(2));
    assert_eq!(builder.hyperedges(DgNodeId::ROOT), vec![Vec::<DgNodeId>::new()]);
    assert!(!is_trace_included(&lts, &lts, StateId(0), StateId(2)));
    assert!(is_trace_included(&lts, &lts, StateId(2), StateId(0)));
}

#[test]
fn trace_sets_are_shared() {
    // Nondeterministic `a` on the right reaching two states with the same future.
    let lts = lts(6, &[(0, "a", 0), (1, "a", 2), (1, "a", 3), (2, "a", 1), (3, "a", 1)]);
    let mut builder = TraceInclusionBuilder::new(&lts, &lts, StateId(0), StateId(1));
    assert!(!solve_global(&mut builder).is_true(DgNodeId::ROOT));

    assert_eq!(builder.state_of(DgNodeId(1)), (StateId(0), &[StateId(2), StateId(3)][..]));
    assert_eq!(builder.node_count(), 2);
}

#[test]
fn weak_bisimilarity_ignores_tau() {
    // `tau.a.0` against `a.0`.
    let lts = lts(5, &[(0, "tau", 1), (1, "a", 2), (3, "a", 4)]);
    let weak = WeakLts::new(&lts);

    assert!(!is_bisimilar(&lts, &lts, StateId(0), StateId(3)));
    assert!(is_bisimilar(&lts, &weak, StateId(0), StateId(3)));
    assert!(is_bisimilar(&lts, &weak, StateId(3), StateId(0)));
}

#[test]
fn collapse_of_game() {
    let lts = lts(4, &[(0, "a", 1), (2, "a", 3)]);
    let collapse = bisimulation_collapse(&lts, &lts, StateId(0), StateId(2));

    assert_eq!(collapse.representative(StateId(0)), collapse.representative(StateId(2)));
    assert_eq!(collapse.representative(StateId(1)), collapse.representative(StateId(3)));
    assert_ne!(collapse.representative(StateId(0)), collapse.representative(StateId(1)));
    assert_eq!(collapse.equivalence_class(StateId(0)).sorted().collect_vec(), [0, 2].map(StateId));
    assert_eq!(collapse.classes().count(), 2);
}

#[test]
fn collapse_of_unknown_state() {
    let lts = lts(4, &[(0, "a", 1), (2, "a", 3)]);
    let collapse = bisimulation_collapse(&lts, &lts, StateId(0), StateId(2));

    assert_eq!(collapse.representative(StateId(99)), StateId(99));
    assert_eq!(collapse.equivalence_class(StateId(99)).collect_vec(), vec![StateId(99)]);
    assert!(bisimulation_collapse_of(&lts, &lts, []).is_none());
}

#[test]
fn random_trace_inclusion_solvers_agree() {
    let mut rng = StdRng::seed_from_u64(0x7ace);

    for _ in 0..20 {
        let lts = random_lts(&mut rng, 6, 2, 2);
        let states = lts.states().collect_vec();

        for (&p, &q) in states.iter().cartesian_product(&states) {
            let mut builder = TraceInclusionBuilder::new(&lts, &lts, p, q);
            let local = solve_local(&mut builder, DgNodeId::ROOT).is_true(DgNodeId::ROOT);
            let global = solve_global(&mut builder).is_true(DgNodeId::ROOT);
            assert_eq!(local, global, "{p} {q}\n{lts}");
            assert_eq!(!local, is_trace_included(&lts, &lts, p, q), "{p} {q}\n{lts}");
        }
    }
}

#[test]
fn random_bisimilarity_properties() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..20 {
        let lts = random_lts(&mut rng, 6, 2, 2);
        let states = lts.states().collect_vec();
        let collapse = bisimulation_collapse_of(&lts, &lts, states.iter().copied()).unwrap();
        assert_eq!(collapse.state_count(), states.len());

        for &p in &states {
            assert!(is_bisimilar(&lts, &lts, p, p), "{p} not bisimilar to itself\n{lts}");
        }

        for (&p, &q) in states.iter().tuple_combinations() {
            let bisimilar = is_bisimilar(&lts, &lts, p, q);
            assert_eq!(bisimilar, is_bisimilar(&lts, &lts, q, p), "{p} {q}\n{lts}");

            let same_class = collapse.representative(p) == collapse.representative(q);
            assert_eq!(bisimilar, same_class, "{p} {q}\n{lts}");

            let mut builder = BisimulationBuilder::new(&lts, &lts, p, q);
            let local = solve_local(&mut builder, DgNodeId::ROOT).is_true(DgNodeId::ROOT);
            let global = solve_global(&mut builder).is_true(DgNodeId::ROOT);
            assert_eq!(local, global, "{p} {q}\n{lts}");

            if bisimilar {
                assert!(is_trace_included(&lts, &lts, p, q), "{p} {q}\n{lts}");
                assert!(is_trace_included(&lts, &lts, q, p), "{p} {q}\n{lts}");
            } else {
                let formula = find_distinguishing_formula(&lts, &lts, p, q).unwrap();
                assert!(check(&formula, &lts, p).unwrap(), "{formula} at {p}\n{lts}");
                assert!(!check(&formula, &lts, q).unwrap(), "{formula} at {q}\n{lts}");
            }
        }
    }
}
