//! Attack graph materialization.
//!
//! Starting from the attacker-location fact, the materializer repeatedly
//! expands a node's store id into `(rule text, destination permission)` pairs
//! and resolves each destination through the graph's permission cache. A node
//! is inserted into the cache before it is queued for expansion, so a rule
//! chain that loops back to a node already materialized (or still pending)
//! reuses it instead of expanding it again.
//!
//! Store queries for sibling rules are issued concurrently; all cache reads and
//! writes happen on the single task that owns the [`AttackGraph`].

use std::collections::VecDeque;

use futures::future::try_join_all;

use reachgraph_core::config::MaterializeSection;
use reachgraph_graph::{GraphStore, NodeKind, StoreId, TO};

use crate::error::{MaterializeError, Result};
use crate::graph::{AttackGraph, NodeId, Rule};
use crate::scoring::EasinessTable;

/// One outbound transition as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transition {
    rule_text: String,
    permission_id: StoreId,
    permission_text: String,
}

/// Builds an [`AttackGraph`] from any [`GraphStore`].
pub struct Materializer<'s, S: GraphStore + ?Sized> {
    store: &'s S,
    max_nodes: usize,
    start_predicate: String,
    easiness: EasinessTable,
}

impl<'s, S: GraphStore + ?Sized> Materializer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::from_config(store, &MaterializeSection::default())
    }

    pub fn from_config(store: &'s S, config: &MaterializeSection) -> Self {
        Self {
            store,
            max_nodes: config.max_nodes,
            start_predicate: config.start_predicate.clone(),
            easiness: EasinessTable::new(&config.easiness),
        }
    }

    /// Cap on nodes in the built graph, root included.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_easiness(mut self, easiness: EasinessTable) -> Self {
        self.easiness = easiness;
        self
    }

    /// Materialize the full graph reachable from the attacker's start fact.
    ///
    /// Each call builds a fresh cache; a regenerated store needs a new build.
    pub async fn build(&self) -> Result<AttackGraph> {
        let start = self.locate_start().await?;
        let mut graph = AttackGraph::new();

        let mut pending: VecDeque<(NodeId, StoreId)> = VecDeque::from([(NodeId(0), start)]);

        while let Some((node, store_id)) = pending.pop_front() {
            for t in self.expand(store_id).await? {
                let (dest, created) = graph.materialize(&t.permission_text);
                if created {
                    if graph.len() > self.max_nodes {
                        return Err(MaterializeError::NodeLimitExceeded {
                            limit: self.max_nodes,
                        });
                    }
                    tracing::debug!(
                        node = dest.0,
                        permission = %t.permission_text,
                        "Materialized node"
                    );
                    pending.push_back((dest, t.permission_id));
                }

                let easiness = self.easiness.score(&t.rule_text);
                let added = graph.add_rule(
                    node,
                    Rule {
                        text: t.rule_text,
                        dest,
                        easiness,
                    },
                );
                if !added {
                    tracing::warn!(node = node.0, "Dropped rule with duplicate text and destination");
                }
            }
        }

        let stats = graph.stats();
        tracing::info!(
            nodes = stats.total_nodes,
            rules = stats.total_rules,
            permissions = stats.distinct_permissions,
            "Materialized attack graph"
        );
        Ok(graph)
    }

    /// The unique fact whose text starts with the start predicate.
    async fn locate_start(&self) -> Result<StoreId> {
        let found = self
            .store
            .find_by_text_prefix(&self.start_predicate)
            .await?;
        match found.as_slice() {
            [id] => Ok(*id),
            [] => Err(MaterializeError::NoAttackerStart {
                predicate: self.start_predicate.clone(),
            }),
            many => Err(MaterializeError::AmbiguousAttackerStart {
                predicate: self.start_predicate.clone(),
                count: many.len(),
            }),
        }
    }

    /// Outbound rules of `store_id`, each paired with its destination permission.
    async fn expand(&self, store_id: StoreId) -> Result<Vec<Transition>> {
        let rules = self
            .store
            .outbound_targets(store_id, TO, NodeKind::Rule)
            .await?;
        try_join_all(rules.into_iter().map(|rule| self.transition(rule))).await
    }

    async fn transition(&self, rule: StoreId) -> Result<Transition> {
        let rule_text = self.store.node_text(rule).await?;
        let permissions = self
            .store
            .outbound_targets(rule, TO, NodeKind::Permission)
            .await?;

        let permission_id = match permissions.as_slice() {
            [] => return Err(MaterializeError::MissingPermission { rule }),
            [only] => *only,
            [first, ..] => {
                tracing::warn!(
                    rule,
                    count = permissions.len(),
                    "Rule leads to several permissions; using the first"
                );
                *first
            }
        };

        Ok(Transition {
            rule_text,
            permission_id,
            permission_text: self.store.node_text(permission_id).await?,
        })
    }
}
