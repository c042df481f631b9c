use crate::graph::DgNodeId;
use crate::index::IndexedVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Never reached by the solver.
    Unexplored,
    /// Not proven to be satisfied. Provisional while a local solve is running.
    False,
    True,
}

pub trait Marking {
    fn status(&self, node: DgNodeId) -> Status;

    fn is_true(&self, node: DgNodeId) -> bool {
        self.status(node) == Status::True
    }
}

/// The result of a solver run, mapping every node to its status.
#[derive(Clone, Debug, Default)]
pub struct StatusMarking {
    status: IndexedVec<DgNodeId, Status>,
}

impl StatusMarking {
    pub(crate) fn new(status: IndexedVec<DgNodeId, Status>) -> Self {
        Self { status }
    }

    /// Number of nodes that were given a status other than `Unexplored`.
    pub fn explored_count(&self) -> usize {
        self.status.iter().filter(|&&s| s != Status::Unexplored).count()
    }
}

impl Marking for StatusMarking {
    fn status(&self, node: DgNodeId) -> Status {
        self.status.get(node).copied().unwrap_or(Status::Unexplored)
    }
}
