//! reachgraph-graph: Graph store adapter.
//!
//! The materializer only ever talks to the [`GraphStore`] trait. Two stores
//! implement it: [`GraphClient`] over Neo4j and [`MemoryStore`] for tests and
//! offline use. Both are populated from the solver's vertex/arc tables.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;
pub mod tables;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryStore;
pub use store::{GraphStore, NodeKind, StoreId, TO};
pub use tables::{ArcRow, ResultTables, VertexRow};
