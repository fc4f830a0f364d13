use thiserror::Error;

/// Top-level error type for reachgraph.
#[derive(Error, Debug)]
pub enum ReachgraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
