//! Configuration management for reachgraph services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (REACHGRAPH__ prefix, `__` separator)
//! 2. Config file (reachgraph.toml)
//! 3. Defaults

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ReachgraphError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReachgraphConfig {
    #[serde(default)]
    pub neo4j: Neo4jSection,
    #[serde(default)]
    pub compile: CompileSection,
    #[serde(default)]
    pub materialize: MaterializeSection,
}

/// `[neo4j]` connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSection {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
}

/// `[compile]` settings for the topology compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileSection {
    /// Where the attacker starts (default: "internet").
    #[serde(default = "default_attacker_location")]
    pub attacker_location: String,

    /// Goal predicate argument for `attackGoal(...)`. Omitted when `None`.
    #[serde(default = "default_attack_goal")]
    pub attack_goal: Option<String>,
}

/// `[materialize]` settings for the attack graph materializer.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterializeSection {
    /// Upper bound on distinct permission nodes per build.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Text prefix of the fact that seeds the root node.
    #[serde(default = "default_start_predicate")]
    pub start_predicate: String,

    /// Rule-text substring → easiness score.
    #[serde(default)]
    pub easiness: BTreeMap<String, u32>,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "reachgraph-dev".to_string()
}

fn default_attacker_location() -> String {
    "internet".to_string()
}

fn default_attack_goal() -> Option<String> {
    Some("execCode(_,_)".to_string())
}

fn default_max_nodes() -> usize {
    100_000
}

fn default_start_predicate() -> String {
    "attackerLocated".to_string()
}

impl Default for Neo4jSection {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
        }
    }
}

impl Default for CompileSection {
    fn default() -> Self {
        Self {
            attacker_location: default_attacker_location(),
            attack_goal: default_attack_goal(),
        }
    }
}

impl Default for MaterializeSection {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            start_predicate: default_start_predicate(),
            easiness: BTreeMap::new(),
        }
    }
}

impl ReachgraphConfig {
    /// Load from `<file_prefix>.{toml,yaml,json}` (optional) overlaid with
    /// `REACHGRAPH__SECTION__KEY` environment variables. Missing keys take
    /// their defaults; a value of the wrong type is an error.
    pub fn load(file_prefix: &str) -> Result<Self, ReachgraphError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("REACHGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: ReachgraphConfig = cfg.try_deserialize()?;
        tracing::debug!(
            uri = %loaded.neo4j.uri,
            max_nodes = loaded.materialize.max_nodes,
            "Loaded configuration"
        );
        Ok(loaded)
    }
}
