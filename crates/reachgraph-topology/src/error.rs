//! Error types for the reachgraph-topology crate.

use thiserror::Error;

/// Malformed topology. Every variant is fatal to the compile.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Link {source_name} <-> {dest} joins two machines; machines must attach to a router")]
    MachineToMachineLink { source_name: String, dest: String },

    #[error("Link endpoint {name} is neither a router nor a declared machine")]
    UnknownEndpoint { name: String },

    #[error("Machine {machine} is not linked to any router")]
    OrphanMachine { machine: String },

    #[error("Machine {machine} is linked to both {first} and {second}")]
    MachineOnMultipleRouters {
        machine: String,
        first: String,
        second: String,
    },

    #[error("Router {router} has no subnet assigned")]
    MissingSubnet { router: String },

    #[error("Rule on router {router} targets {dest}, which sits behind no router")]
    UnknownDestination { router: String, dest: String },

    #[error("Router {name} is declared more than once")]
    DuplicateRouter { name: String },

    #[error("Empty {entity} name")]
    EmptyName { entity: &'static str },
}

pub type Result<T> = std::result::Result<T, TopologyError>;
