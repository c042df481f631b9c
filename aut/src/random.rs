use rand::Rng;
use solver::Set;

use crate::{Lts, StateId, Transition};

/// Generates an LTS with `transitions` distinct outgoing transitions per
/// state, labelled `0..labels`, starting in state 0.
///
/// `transitions` must not exceed `states * labels`.
pub fn random_lts(rng: &mut impl Rng, states: usize, transitions: usize, labels: usize) -> Lts {
    assert!(states > 0, "an LTS needs at least its first state");
    assert!(transitions <= states * labels, "not enough distinct transitions available");

    let transitions = (0..states)
        .map(|_| {
            let mut state_trans = Set::default();
            while state_trans.len() < transitions {
                let target = rng.gen_range(0..states);
                let label = rng.gen_range(0..labels);
                state_trans.insert((label, target));
            }
            state_trans
                .into_iter()
                .map(|(label, target)| Transition::new(label.to_string(), StateId(target)))
                .collect()
        })
        .collect();

    Lts { first_state: StateId(0), transitions }
}
