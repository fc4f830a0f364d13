//! reachgraph-topology: Topology reachability compiler.
//!
//! Partitions the router graph into connected components, assigns every
//! machine to its router's subnet, evaluates firewall rules with wildcard
//! matching, and emits the `hacl`/`inSubnet` facts consumed by the solver.

pub mod compiler;
pub mod components;
pub mod error;
pub mod evaluate;
pub mod subnets;
pub mod wildcard;

pub use compiler::TopologyCompiler;
pub use components::RouterComponents;
pub use error::TopologyError;
pub use subnets::SubnetMap;
