//! reachgraph-materialize: Attack graph materialization.
//!
//! Walks the solver's persisted graph from the attacker's starting fact and
//! builds an in-memory graph of permission states and the rules between
//! them, memoizing nodes by permission text.

pub mod error;
pub mod export;
pub mod graph;
pub mod materializer;
pub mod scoring;

pub use error::MaterializeError;
pub use export::GraphExport;
pub use graph::{AttackGraph, GraphStats, Node, NodeId, Rule};
pub use materializer::Materializer;
pub use scoring::EasinessTable;
