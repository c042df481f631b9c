use std::collections::hash_map::Entry;
use std::rc::Rc;

use aut::{StateId, SuccessorGenerator};
use log::{debug, trace};
use solver::graph::{construct_all, LazyNodes};
use solver::{
    solve_local, DependencyGraph, DgNodeId, FullDependencyGraph, Hyperedge, Map, Marking,
};

use crate::{Act, FixType, FormulaSet, MuCalc, Var};

/// Node with a single empty hyperedge, always satisfied.
pub const TRUE_NODE: DgNodeId = DgNodeId(1);
/// Node without hyperedges, never satisfied.
pub const FALSE_NODE: DgNodeId = DgNodeId(2);

#[derive(Clone)]
enum Record {
    Sentinel,
    Check(StateId, Rc<MuCalc>),
}

/// Dependency graph for "does `state` satisfy `formula`".
///
/// When seeking the minimal fixpoint a node is satisfied iff the formula holds.
/// When seeking the maximal fixpoint the graph is dualised: a node is
/// satisfied iff the formula fails, so that the maximal solution can still be
/// computed as a minimal one. Fixpoints of the opposite kind are solved by a
/// nested builder and collapsed to one of the sentinel nodes.
pub struct MuCalcBuilder<'a, S: ?Sized, W: ?Sized> {
    seeking: FixType,
    strong: &'a S,
    weak: &'a W,
    formulas: &'a FormulaSet,
    nodes: LazyNodes<Record>,
    variables: Map<(StateId, Var), DgNodeId>,
}

impl<'a, S, W> MuCalcBuilder<'a, S, W>
where
    S: SuccessorGenerator + ?Sized,
    W: SuccessorGenerator + ?Sized,
{
    pub fn new(
        seeking: FixType,
        strong: &'a S,
        weak: &'a W,
        formulas: &'a FormulaSet,
        state: StateId,
        formula: Rc<MuCalc>,
    ) -> Self {
        let mut nodes = LazyNodes::new(Record::Check(state, formula));
        nodes.push_constructed(Record::Sentinel, vec![Vec::new()]);
        nodes.push_constructed(Record::Sentinel, Vec::new());

        Self { seeking, strong, weak, formulas, nodes, variables: Map::default() }
    }

    /// The state and formula a node checks, `None` for the sentinels.
    pub fn check_of(&self, node: DgNodeId) -> Option<(StateId, &Rc<MuCalc>)> {
        match self.nodes.record(node) {
            Record::Sentinel => None,
            Record::Check(state, formula) => Some((*state, formula)),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn check(&mut self, state: StateId, formula: Rc<MuCalc>) -> DgNodeId {
        self.nodes.push(Record::Check(state, formula))
    }

    fn sentinel(&self, node: DgNodeId) -> Vec<Hyperedge> {
        self.nodes.cached(node).map(<[_]>::to_vec).unwrap_or_default()
    }

    fn any_of(children: Vec<DgNodeId>) -> Vec<Hyperedge> {
        children.into_iter().map(|child| vec![child]).collect()
    }

    fn all_of(children: Vec<DgNodeId>) -> Vec<Hyperedge> {
        vec![children]
    }

    /// Disjunctive in the seeking-minimal graph, conjunctive in the dual one.
    fn exists(&self, children: Vec<DgNodeId>) -> Vec<Hyperedge> {
        match self.seeking {
            FixType::Min => Self::any_of(children),
            FixType::Max => Self::all_of(children),
        }
    }

    fn forall(&self, children: Vec<DgNodeId>) -> Vec<Hyperedge> {
        match self.seeking {
            FixType::Min => Self::all_of(children),
            FixType::Max => Self::any_of(children),
        }
    }

    fn modal_children<G>(
        &mut self,
        succ: &G,
        state: StateId,
        act: &Act,
        body: &Rc<MuCalc>,
    ) -> Vec<DgNodeId>
    where
        G: SuccessorGenerator + ?Sized,
    {
        succ.successors(state)
            .iter()
            .filter(|t| act.matches(&t.label))
            .map(|t| self.check(t.target, body.clone()))
            .collect()
    }

    fn variable(&mut self, state: StateId, x: &Var) -> DgNodeId {
        match self.variables.entry((state, x.clone())) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let definition = self
                    .formulas
                    .definition(x)
                    .unwrap_or_else(|| panic!("Variable {} was not declared", x.0));
                *entry.insert(self.nodes.push(Record::Check(state, definition.clone())))
            }
        }
    }

    /// Solves a fixpoint of the opposite kind with its own builder and
    /// returns the hyperedges of the sentinel matching the verdict.
    fn nested(&mut self, state: StateId, formula: &Rc<MuCalc>) -> Vec<Hyperedge> {
        let dual = self.seeking.dual();
        let mut builder =
            MuCalcBuilder::new(dual, self.strong, self.weak, self.formulas, state, formula.clone());
        let marking = solve_local(&mut builder, DgNodeId::ROOT);

        // In both directions a satisfied nested root means the opposite verdict here.
        let verdict = if marking.is_true(DgNodeId::ROOT) { FALSE_NODE } else { TRUE_NODE };
        debug!(
            "nested {dual:?} solve of {formula} at state {state}: {} nodes, resolved to {verdict}",
            builder.node_count()
        );
        self.sentinel(verdict)
    }

    fn construct(&mut self, state: StateId, formula: &Rc<MuCalc>) -> Vec<Hyperedge> {
        let (strong, weak) = (self.strong, self.weak);
        match (&**formula, self.seeking) {
            (MuCalc::True, FixType::Min) | (MuCalc::False, FixType::Max) => {
                self.sentinel(TRUE_NODE)
            }
            (MuCalc::True, FixType::Max) | (MuCalc::False, FixType::Min) => {
                self.sentinel(FALSE_NODE)
            }
            (MuCalc::Var(x), _) => vec![vec![self.variable(state, x)]],
            (MuCalc::Or(fs), _) => {
                let children = fs.iter().map(|f| self.check(state, f.clone())).collect();
                self.exists(children)
            }
            (MuCalc::And(fs), _) => {
                let children = fs.iter().map(|f| self.check(state, f.clone())).collect();
                self.forall(children)
            }
            (MuCalc::Diamond(act, body), _) => {
                let children = self.modal_children(strong, state, act, body);
                self.exists(children)
            }
            (MuCalc::Box(act, body), _) => {
                let children = self.modal_children(strong, state, act, body);
                self.forall(children)
            }
            (MuCalc::WeakDiamond(act, body), _) => {
                let children = self.modal_children(weak, state, act, body);
                self.exists(children)
            }
            (MuCalc::WeakBox(act, body), _) => {
                let children = self.modal_children(weak, state, act, body);
                self.forall(children)
            }
            // Fixpoints of the kind being sought unfold in place.
            (MuCalc::Mu(_, body), FixType::Min) | (MuCalc::Nu(_, body), FixType::Max) => {
                self.construct(state, body)
            }
            (MuCalc::Mu(..), FixType::Max) | (MuCalc::Nu(..), FixType::Min) => {
                self.nested(state, formula)
            }
        }
    }
}

impl<S, W> DependencyGraph for MuCalcBuilder<'_, S, W>
where
    S: SuccessorGenerator + ?Sized,
    W: SuccessorGenerator + ?Sized,
{
    fn hyperedges(&mut self, node: DgNodeId) -> Vec<Hyperedge> {
        if let Some(edges) = self.nodes.cached(node) {
            return edges.to_vec();
        }

        let Record::Check(state, formula) = self.nodes.record(node).clone() else {
            unreachable!("sentinel nodes are constructed eagerly")
        };
        trace!("constructing node {node}: state {state} against {formula}");
        let edges = self.construct(state, &formula);
        self.nodes.store(node, edges).to_vec()
    }
}

impl<S, W> FullDependencyGraph for MuCalcBuilder<'_, S, W>
where
    S: SuccessorGenerator + ?Sized,
    W: SuccessorGenerator + ?Sized,
{
    fn all_hyperedges(&mut self) -> Vec<(DgNodeId, Vec<Hyperedge>)> {
        construct_all(self, |builder| builder.nodes.len())
    }
}
