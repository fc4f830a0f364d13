//! Write operations for the persisted attack graph.
//!
//! A solver run always replaces the previous graph wholesale; nothing is
//! patched incrementally.

use neo4rs::query;

use crate::client::{GraphClient, GraphError};
use crate::store::TO;
use crate::tables::ResultTables;

impl GraphClient {
    /// Delete every node and relationship.
    pub async fn flush(&self) -> Result<(), GraphError> {
        self.run(query("MATCH (n) DETACH DELETE n")).await
    }

    /// Replace the stored graph with one solver run, in a single transaction.
    pub async fn replace_graph(&self, tables: &ResultTables) -> Result<(), GraphError> {
        tables.validate()?;

        let mut txn = self.start_txn().await?;
        txn.run(query("MATCH (n) DETACH DELETE n")).await?;

        for v in &tables.vertices {
            let label = v.node_kind().label();
            let cypher = format!(
                "CREATE (:{label} {{node_id: $id, text: $text, type: $kind, bool: $flag}})"
            );
            let q = query(&cypher)
                .param("id", v.id)
                .param("text", v.text.clone())
                .param("kind", v.kind.clone())
                .param("flag", v.flag);
            txn.run(q).await?;
        }

        let rel = TO;
        for a in &tables.arcs {
            let cypher = format!(
                "MATCH (dst {{node_id: $dst}})
                 MATCH (src {{node_id: $src}})
                 CREATE (src)-[:{rel} {{step: $step}}]->(dst)"
            );
            let q = query(&cypher)
                .param("dst", a.dst)
                .param("src", a.src)
                .param("step", a.step);
            txn.run(q).await?;
        }

        txn.commit().await?;
        tracing::info!(
            vertices = tables.vertices.len(),
            arcs = tables.arcs.len(),
            "Replaced attack graph in Neo4j"
        );
        Ok(())
    }
}
