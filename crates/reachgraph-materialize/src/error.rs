//! Error types for the reachgraph-materialize crate.

use thiserror::Error;

use reachgraph_graph::StoreId;

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Graph error: {0}")]
    Graph(#[from] reachgraph_graph::GraphError),

    #[error("No fact starting with {predicate} in the store")]
    NoAttackerStart { predicate: String },

    #[error("{count} facts start with {predicate}; expected exactly one")]
    AmbiguousAttackerStart { predicate: String, count: usize },

    #[error("Rule {rule} leads to no permission")]
    MissingPermission { rule: StoreId },

    #[error("Materialization exceeded {limit} nodes")]
    NodeLimitExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, MaterializeError>;
