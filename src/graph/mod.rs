//! Concept graph data structures and construction

mod builder;
mod concept_graph;
mod edge;
mod reduction;


pub use builder::{BuildReport, GraphBuild, GraphBuilder};
pub use concept_graph::{ConceptGraph, GraphNode};
pub use edge::{Edge, SignalKind};
pub use reduction::{break_cycles, find_cycle, transitive_reduction};
