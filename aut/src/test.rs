use rand::rngs::StdRng;
use rand::SeedableRng;
use test_log::test;

use crate::{parse_aut, random_lts, Lts, StateId, SuccessorGenerator, Transition, WeakLts};

const VENDING: &str = r#"des (0,4,3)
(0,"coin",1)
(1,"coffee",0)
(1,"tau",2)
(2,tea,0)
"#;

fn targets(transitions: &[Transition], label: &str) -> Vec<StateId> {
    transitions.iter().filter(|t| &*t.label == label).map(|t| t.target).collect()
}

#[test]
fn parse_vending_machine() {
    let lts = parse_aut(VENDING).unwrap();
    assert_eq!(lts.first_state, StateId(0));
    assert_eq!(lts.state_count(), 3);
    assert_eq!(lts.transition_count(), 4);
    assert_eq!(lts.successors(StateId(1)).len(), 2);
    assert_eq!(targets(lts.successors(StateId(2)), "tea"), vec![StateId(0)]);
}

#[test]
fn parse_errors() {
    assert!(parse_aut("").is_err());
    assert!(parse_aut("des (3,0,3)\n").is_err());
    assert!(parse_aut("des (0,1,1)\n(0,\"a\",1)\n").is_err());
    assert!(parse_aut("des (0,2,2)\n(0,\"a\",1)\n").is_err());
    let err = parse_aut("des (0,1,2)\n(5,\"a\",1)\n").unwrap_err();
    assert_eq!(err.to_string(), "Start state 5 doesn't exist");
}

#[test]
fn display_parses_back() {
    let lts = parse_aut(VENDING).unwrap();
    let reparsed = parse_aut(&lts.to_string()).unwrap();
    assert_eq!(reparsed.first_state, lts.first_state);
    assert_eq!(*reparsed.transitions, *lts.transitions);
}

#[test]
fn union_shifts_second_lts() {
    let left = Lts::from_edges(StateId(0), 2, [(0, "a", 1)]);
    let right = Lts::from_edges(StateId(1), 2, [(1, "b", 0)]);
    let (lts, right_first) = left.union(&right);

    assert_eq!(lts.state_count(), 4);
    assert_eq!(right_first, StateId(3));
    assert_eq!(targets(lts.successors(StateId(0)), "a"), vec![StateId(1)]);
    assert_eq!(targets(lts.successors(StateId(3)), "b"), vec![StateId(2)]);
}

#[test]
fn weak_transitions_skip_taus() {
    // 0 -tau-> 1 -a-> 2 -tau-> 3
    let lts =
        Lts::from_edges(StateId(0), 4, [(0, "tau", 1), (1, "a", 2), (2, "tau", 3), (3, "b", 0)]);
    let weak = WeakLts::new(&lts);

    assert_eq!(targets(weak.successors(StateId(0)), "tau"), vec![StateId(0), StateId(1)]);
    assert_eq!(targets(weak.successors(StateId(0)), "a"), vec![StateId(2), StateId(3)]);
    assert!(targets(weak.successors(StateId(0)), "b").is_empty());
    assert_eq!(targets(weak.successors(StateId(2)), "b"), vec![StateId(0), StateId(1)]);
}

#[test]
fn random_lts_has_requested_shape() {
    let mut rng = StdRng::seed_from_u64(7);
    let lts = random_lts(&mut rng, 10, 3, 2);
    assert_eq!(lts.state_count(), 10);
    assert_eq!(lts.transition_count(), 30);
    assert!(lts.states().all(|s| lts.successors(s).len() == 3));
}
