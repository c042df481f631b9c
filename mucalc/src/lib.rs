mod builder;
mod display;
mod formula_set;
mod parser;


use std::rc::Rc;

use anyhow::Result;
use aut::{Lts, StateId, SuccessorGenerator, WeakLts};
use solver::{solve_local, DgNodeId, Marking};

pub use builder::{MuCalcBuilder, FALSE_NODE, TRUE_NODE};
pub use formula_set::FormulaSet;
pub use parser::{parse_formula, parse_mucalc};

/// Selects the transitions a modality looks at.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Act {
    True,
    Label(String),
    NotLabel(String),
}

impl Act {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Act::True => true,
            Act::Label(x) => x == label,
            Act::NotLabel(x) => x != label,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Var(pub String);

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum MuCalc {
    True,
    False,
    Var(Var),
    Diamond(Act, Rc<MuCalc>),
    Box(Act, Rc<MuCalc>),
    WeakDiamond(Act, Rc<MuCalc>),
    WeakBox(Act, Rc<MuCalc>),
    And(Vec<Rc<MuCalc>>),
    Or(Vec<Rc<MuCalc>>),
    Mu(Var, Rc<MuCalc>),
    Nu(Var, Rc<MuCalc>),
}

impl MuCalc {
    /// Conjunction, collapsing the trivial cases.
    pub fn and(children: impl IntoIterator<Item = MuCalc>) -> MuCalc {
        let mut children = children.into_iter().fuse();
        match (children.next(), children.next()) {
            (None, _) => MuCalc::True,
            (Some(only), None) => only,
            (Some(a), Some(b)) => {
                MuCalc::And([a, b].into_iter().chain(children).map(Rc::new).collect())
            }
        }
    }

    /// Disjunction, collapsing the trivial cases.
    pub fn or(children: impl IntoIterator<Item = MuCalc>) -> MuCalc {
        let mut children = children.into_iter().fuse();
        match (children.next(), children.next()) {
            (None, _) => MuCalc::False,
            (Some(only), None) => only,
            (Some(a), Some(b)) => {
                MuCalc::Or([a, b].into_iter().chain(children).map(Rc::new).collect())
            }
        }
    }

    pub fn diamond(act: Act, body: MuCalc) -> MuCalc {
        MuCalc::Diamond(act, Rc::new(body))
    }

    pub fn boxx(act: Act, body: MuCalc) -> MuCalc {
        MuCalc::Box(act, Rc::new(body))
    }

    /// Whether `x` occurs free in the formula.
    pub fn mentions(&self, x: &Var) -> bool {
        match self {
            MuCalc::True | MuCalc::False => false,
            MuCalc::Var(y) => x == y,
            MuCalc::Diamond(_, e)
            | MuCalc::Box(_, e)
            | MuCalc::WeakDiamond(_, e)
            | MuCalc::WeakBox(_, e) => e.mentions(x),
            MuCalc::And(es) | MuCalc::Or(es) => es.iter().any(|e| e.mentions(x)),
            MuCalc::Mu(y, e) | MuCalc::Nu(y, e) => x != y && e.mentions(x),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixType {
    Min,
    Max,
}

impl FixType {
    pub fn dual(self) -> FixType {
        match self {
            FixType::Min => FixType::Max,
            FixType::Max => FixType::Min,
        }
    }
}

/// Checks whether `state` satisfies `formula`, whose variables are bound in `formulas`.
pub fn solve_mucalc<S, W>(
    formulas: &FormulaSet,
    formula: &MuCalc,
    strong: &S,
    weak: &W,
    state: StateId,
) -> bool
where
    S: SuccessorGenerator + ?Sized,
    W: SuccessorGenerator + ?Sized,
{
    let formula = Rc::new(formula.clone());
    let mut builder = MuCalcBuilder::new(FixType::Min, strong, weak, formulas, state, formula);
    solve_local(&mut builder, DgNodeId::ROOT).is_true(DgNodeId::ROOT)
}

/// Validates a closed formula and checks it against `state` of `lts`, using
/// its tau-saturation for weak modalities.
pub fn check(formula: &MuCalc, lts: &Lts, state: StateId) -> Result<bool> {
    let formulas = FormulaSet::new(formula)?;
    let weak = WeakLts::new(lts);
    Ok(solve_mucalc(&formulas, formula, lts, &weak, state))
}
