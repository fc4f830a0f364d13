//! Read operations: the [`GraphStore`] implementation over Neo4j.
//!
//! Vertices carry a `node_id` property holding the solver id; the node label
//! is the vertex kind (`Fact`, `Rule`, `Permission`).

use async_trait::async_trait;
use neo4rs::query;

use crate::client::{GraphClient, GraphError};
use crate::store::{strip_quotes, validate_label, GraphStore, NodeKind, StoreId};

#[async_trait]
impl GraphStore for GraphClient {
    async fn node_text(&self, id: StoreId) -> Result<String, GraphError> {
        let q = query("MATCH (n {node_id: $id}) RETURN n.text AS text").param("id", id);

        match self.query_one(q).await? {
            Some(row) => {
                let text: String = row.get("text").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize text: {e}"))
                })?;
                Ok(strip_quotes(&text))
            }
            None => Err(GraphError::NotFound { id }),
        }
    }

    async fn outbound_targets(
        &self,
        id: StoreId,
        edge_label: &str,
        target: NodeKind,
    ) -> Result<Vec<StoreId>, GraphError> {
        let rel = validate_label(edge_label)?;
        let label = target.label();
        let cypher = format!(
            "MATCH (s {{node_id: $id}})-[:{rel}]->(t:{label})
             RETURN DISTINCT t.node_id AS id
             ORDER BY id"
        );

        let rows = self.query_rows(query(&cypher).param("id", id)).await?;
        rows_to_ids(rows)
    }

    async fn find_by_text_prefix(&self, prefix: &str) -> Result<Vec<StoreId>, GraphError> {
        let q = query(
            "MATCH (n)
             WHERE n.text STARTS WITH $prefix
                OR n.text STARTS WITH '\"' + $prefix
             RETURN n.node_id AS id
             ORDER BY id",
        )
        .param("prefix", prefix.to_string());

        let rows = self.query_rows(q).await?;
        rows_to_ids(rows)
    }
}

fn rows_to_ids(rows: Vec<neo4rs::Row>) -> Result<Vec<StoreId>, GraphError> {
    rows.iter()
        .map(|row| {
            row.get::<i64>("id").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node_id: {e}"))
            })
        })
        .collect()
}
