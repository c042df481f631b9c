use log::debug;

use crate::graph::{DgNodeId, FullDependencyGraph, Hyperedge};
use crate::index::{AsIndex, IndexedVec};
use crate::marking::{Marking, Status};

/// Minimal derivation depth of a satisfied node. Unsatisfied nodes are `Infinite`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Finite(usize),
    Infinite,
}

impl Level {
    fn succ(self) -> Level {
        match self {
            Level::Finite(level) => Level::Finite(level + 1),
            Level::Infinite => Level::Infinite,
        }
    }
}

/// Which player is picking: the one trying to win quickly or the one delaying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    Minimize,
    Maximize,
}

impl Goal {
    fn is_better(self, new: Level, old: Level) -> bool {
        match self {
            Goal::Minimize => new < old,
            Goal::Maximize => new > old,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    /// Index of the selected hyperedge.
    pub edge: usize,
    /// Selected target inside the hyperedge, `None` if it is empty.
    pub target: Option<DgNodeId>,
}

#[derive(Clone, Debug, Default)]
pub struct LevelMarking {
    levels: IndexedVec<DgNodeId, Level>,
}

impl LevelMarking {
    pub fn level(&self, node: DgNodeId) -> Level {
        self.levels.get(node).copied().unwrap_or(Level::Infinite)
    }

    /// The level a hyperedge would give to its source: the highest among its targets.
    pub fn edge_level(&self, edge: &[DgNodeId]) -> Level {
        edge.iter().map(|&n| self.level(n)).max().unwrap_or(Level::Finite(0))
    }

    /// Index of the hyperedge with the lowest `(edge level, length)`, the
    /// shortest and most decisive derivation.
    pub fn minimax_edge(&self, edges: &[Hyperedge]) -> Option<usize> {
        (0..edges.len()).min_by_key(|&i| (self.edge_level(&edges[i]), edges[i].len()))
    }

    /// Optimal play: picks the hyperedge and then the target with the best
    /// level according to `goal`. Ties keep the earliest candidate.
    pub fn best_choice(&self, edges: &[Hyperedge], goal: Goal) -> Option<Choice> {
        let mut best: Option<(usize, Level)> = None;
        for (i, edge) in edges.iter().enumerate() {
            let level = self.edge_level(edge);
            if best.map_or(true, |(_, best)| goal.is_better(level, best)) {
                best = Some((i, level));
            }
        }
        let (edge, _) = best?;

        let mut target: Option<(DgNodeId, Level)> = None;
        for &n in &edges[edge] {
            let level = self.level(n);
            if target.map_or(true, |(_, best)| goal.is_better(level, best)) {
                target = Some((n, level));
            }
        }

        Some(Choice { edge, target: target.map(|(n, _)| n) })
    }
}

impl Marking for LevelMarking {
    fn status(&self, node: DgNodeId) -> Status {
        match self.level(node) {
            Level::Finite(_) => Status::True,
            Level::Infinite => Status::False,
        }
    }
}

/// Computes for every node the minimal level `1 + min over hyperedges of the
/// max level of the targets`, where an empty hyperedge gives level 1.
pub fn solve_levels<G: FullDependencyGraph + ?Sized>(graph: &mut G) -> LevelMarking {
    let all = graph.all_hyperedges();
    debug_assert!(all.iter().enumerate().all(|(i, (n, _))| n.to_usize() == i));

    let edges: IndexedVec<DgNodeId, Vec<Hyperedge>> =
        all.into_iter().map(|(_, edges)| edges).collect();
    let mut levels: IndexedVec<DgNodeId, Level> = vec![Level::Infinite; edges.len()].into();

    // For each node, the (source, hyperedge index) pairs mentioning it.
    let mut deps: IndexedVec<DgNodeId, Vec<(DgNodeId, usize)>> =
        IndexedVec::from(vec![Vec::new(); edges.len()]);
    let mut work = Vec::new();
    for (source, source_edges) in edges.enumerate() {
        for (i, edge) in source_edges.iter().enumerate() {
            for &target in edge {
                deps[target].push((source, i));
            }
            work.push((source, i));
        }
    }

    let mut steps = 0usize;
    while let Some((source, i)) = work.pop() {
        steps += 1;
        let edge = &edges[source][i];
        let candidate = edge
            .iter()
            .map(|&n| levels[n])
            .max()
            .unwrap_or(Level::Finite(0))
            .succ();

        // Levels only decrease, so every node improves finitely many times.
        if candidate < levels[source] {
            levels[source] = candidate;
            work.extend(deps[source].iter().copied());
        }
    }

    debug!("level solve: {} nodes, {} steps", levels.len(), steps);

    LevelMarking { levels }
}
