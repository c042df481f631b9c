pub mod global;
pub mod graph;
pub mod index;
pub mod level;
pub mod local;
pub mod marking;

#[cfg(test)]
mod test;

pub use global::solve_global;
pub use graph::{DependencyGraph, DgNodeId, FullDependencyGraph, Hyperedge};
pub use level::{solve_levels, Choice, Goal, Level, LevelMarking};
pub use local::{solve_local, solve_local_bounded, Inconclusive};
pub use marking::{Marking, Status, StatusMarking};

pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;
