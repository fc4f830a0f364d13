//! reachgraph-core: Shared types, configuration, and error handling for reachgraph.
//!
//! This crate provides the foundational types used across all reachgraph components:
//! - Topology types (Machine, Router, FirewallRule, Link) describing the network
//! - Fact lines handed to the external logic solver
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod facts;
pub mod types;

pub use config::ReachgraphConfig;
pub use error::ReachgraphError;
pub use facts::{Fact, FactSet, Hacl};
pub use types::{
    Account, Clause, Direction, FirewallRule, Link, Machine, Program, Router, Service, Topology,
    Vulnerability, WILDCARD,
};
