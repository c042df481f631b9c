use std::rc::Rc;

use anyhow::{bail, ensure, Context, Result};
use aut::SuccessorGenerator;
use log::debug;
use mucalc::{Act, MuCalc};
use solver::{DependencyGraph, DgNodeId, LevelMarking, Map, Marking};

use crate::bisim::{Record, Side};
use crate::BisimulationBuilder;

/// Extracts a formula satisfied by the left process of the root pair and
/// refuted by the right one.
///
/// `marking` must be the level marking of `builder`, in which the root is
/// satisfied, that is the processes are not bisimilar. At each pair node the
/// attacker move with the smallest `(level, length)` is followed, which keeps
/// the formula as shallow as possible.
pub fn distinguishing_formula<A, D>(
    builder: &mut BisimulationBuilder<'_, A, D>,
    marking: &LevelMarking,
) -> Result<MuCalc>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    ensure!(marking.is_true(DgNodeId::ROOT), "Processes are bisimilar");

    let mut extractor = Extractor { builder, marking, memo: Map::default() };
    let formula = extractor.formula(DgNodeId::ROOT)?;
    debug!("distinguishing formula: {formula}");

    Ok(Rc::try_unwrap(formula).unwrap_or_else(|shared| (*shared).clone()))
}

struct Extractor<'b, 'a, A: ?Sized, D: ?Sized> {
    builder: &'b mut BisimulationBuilder<'a, A, D>,
    marking: &'b LevelMarking,
    memo: Map<DgNodeId, Rc<MuCalc>>,
}

impl<A, D> Extractor<'_, '_, A, D>
where
    A: SuccessorGenerator + ?Sized,
    D: SuccessorGenerator + ?Sized,
{
    fn formula(&mut self, node: DgNodeId) -> Result<Rc<MuCalc>> {
        if let Some(formula) = self.memo.get(&node) {
            return Ok(formula.clone());
        }

        let record = self.builder.record(node).cloned().context("Unknown node")?;
        let edges = self.builder.hyperedges(node);

        let formula = match record {
            Record::Pair(..) => {
                let Some(edge) = self.marking.minimax_edge(&edges) else {
                    bail!("Pair node {node} has no attacker move")
                };
                let target = edges[edge].iter().copied().min_by_key(|&n| self.marking.level(n));
                self.formula(target.context("Attacker move without target")?)?
            }
            Record::Move { side, label, .. } => {
                let act = Act::Label(label.to_string());
                let answers = edges.first().map(Vec::as_slice).unwrap_or_default();
                let children =
                    answers.iter().map(|&answer| self.formula(answer)).collect::<Result<_>>()?;
                let formula = match side {
                    // Left moved: no answer of the right side satisfies all of these.
                    Side::Left => MuCalc::Diamond(act, join(children, MuCalc::And, MuCalc::True)),
                    // Right moved: every answer of the left side satisfies one of these.
                    Side::Right => MuCalc::Box(act, join(children, MuCalc::Or, MuCalc::False)),
                };
                Rc::new(formula)
            }
        };

        self.memo.insert(node, formula.clone());
        Ok(formula)
    }
}

fn join(
    mut children: Vec<Rc<MuCalc>>,
    op: fn(Vec<Rc<MuCalc>>) -> MuCalc,
    neutral: MuCalc,
) -> Rc<MuCalc> {
    if children.len() > 1 {
        return Rc::new(op(children));
    }
    children.pop().unwrap_or_else(|| Rc::new(neutral))
}
