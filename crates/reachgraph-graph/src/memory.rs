//! In-memory [`GraphStore`] built from the solver's result tables.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::GraphError;
use crate::store::{strip_quotes, GraphStore, NodeKind, StoreId, TO};
use crate::tables::ResultTables;

#[derive(Debug, Clone)]
struct MemNode {
    text: String,
    kind: NodeKind,
}

/// A process-local attack graph store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: HashMap<StoreId, MemNode>,
    /// Source id → (relationship type, target id).
    edges: HashMap<StoreId, Vec<(String, StoreId)>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both tables; each arc becomes a `To` edge from `src` to `dst`.
    pub fn from_tables(tables: &ResultTables) -> Result<Self, GraphError> {
        tables.validate()?;
        let mut store = Self::new();
        for v in &tables.vertices {
            store.add_node(v.id, v.node_kind(), &v.text);
        }
        for a in &tables.arcs {
            store.add_edge(a.src, TO, a.dst);
        }
        tracing::debug!(
            nodes = store.node_count(),
            edges = tables.arcs.len(),
            "Loaded in-memory graph"
        );
        Ok(store)
    }

    pub fn add_node(&mut self, id: StoreId, kind: NodeKind, text: &str) {
        self.nodes.insert(
            id,
            MemNode {
                text: text.to_string(),
                kind,
            },
        );
    }

    pub fn add_edge(&mut self, src: StoreId, label: &str, dst: StoreId) {
        self.edges
            .entry(src)
            .or_default()
            .push((label.to_string(), dst));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of store operations served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn node_text(&self, id: StoreId) -> Result<String, GraphError> {
        self.record_query();
        self.nodes
            .get(&id)
            .map(|n| strip_quotes(&n.text))
            .ok_or(GraphError::NotFound { id })
    }

    async fn outbound_targets(
        &self,
        id: StoreId,
        edge_label: &str,
        target: NodeKind,
    ) -> Result<Vec<StoreId>, GraphError> {
        self.record_query();
        let mut out: Vec<StoreId> = self
            .edges
            .get(&id)
            .into_iter()
            .flatten()
            .filter(|(label, dst)| {
                label == edge_label && self.nodes.get(dst).is_some_and(|n| n.kind == target)
            })
            .map(|(_, dst)| *dst)
            .collect();
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    async fn find_by_text_prefix(&self, prefix: &str) -> Result<Vec<StoreId>, GraphError> {
        self.record_query();
        let mut out: Vec<StoreId> = self
            .nodes
            .iter()
            .filter(|(_, n)| strip_quotes(&n.text).starts_with(prefix))
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ArcRow, VertexRow};

    fn vertex(id: StoreId, text: &str, kind: &str) -> VertexRow {
        VertexRow {
            id,
            text: text.to_string(),
            kind: kind.to_string(),
            flag: 0.0,
        }
    }

    fn sample() -> MemoryStore {
        let tables = ResultTables {
            vertices: vec![
                vertex(1, "\"attackerLocated(internet)\"", "LEAF"),
                vertex(2, "RULE 6 (direct network access)", "AND"),
                vertex(3, "netAccess(web,tcp,80)", "OR"),
                vertex(4, "hacl(internet,web,tcp,80)", "LEAF"),
            ],
            arcs: vec![
                ArcRow { dst: 2, src: 1, step: -1 },
                ArcRow { dst: 2, src: 4, step: -1 },
                ArcRow { dst: 3, src: 2, step: -1 },
            ],
        };
        MemoryStore::from_tables(&tables).unwrap()
    }

    #[tokio::test]
    async fn test_node_text_strips_quotes() {
        let store = sample();
        assert_eq!(store.node_text(1).await.unwrap(), "attackerLocated(internet)");
        assert!(matches!(
            store.node_text(99).await,
            Err(GraphError::NotFound { id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_outbound_targets_filter_by_kind() {
        let store = sample();
        assert_eq!(store.outbound_targets(1, TO, NodeKind::Rule).await.unwrap(), vec![2]);
        assert_eq!(
            store.outbound_targets(2, TO, NodeKind::Permission).await.unwrap(),
            vec![3]
        );
        assert!(store
            .outbound_targets(2, TO, NodeKind::Rule)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .outbound_targets(1, "Other", NodeKind::Rule)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_by_text_prefix() {
        let store = sample();
        assert_eq!(store.find_by_text_prefix("attackerLocated").await.unwrap(), vec![1]);
        assert_eq!(store.find_by_text_prefix("hacl").await.unwrap(), vec![4]);
        assert!(store.find_by_text_prefix("nope").await.unwrap().is_empty());
        assert_eq!(store.query_count(), 3);
    }
}
