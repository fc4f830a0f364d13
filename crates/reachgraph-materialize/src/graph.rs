//! The materialized attack graph.
//!
//! Nodes live in an arena indexed by a synthetic sequential [`NodeId`]; the
//! root is always `NodeId(0)` with text `"start"`. Every other node is keyed
//! by its permission text in an explicit cache, so a permission reached along
//! several rule chains is one node.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Text of the synthetic root node.
pub const ROOT_TEXT: &str = "start";

/// Synthetic node identifier, assigned in materialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A transition to another permission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub text: String,
    pub dest: NodeId,
    /// Lower-is-harder score; `None` when no easiness entry matched.
    pub easiness: Option<u32>,
}

/// An attacker-reachable state.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub permission: String,
    rules: Vec<Rule>,
}

impl Node {
    /// Outbound rules, unique by `(text, dest)`, in discovery order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Node/rule counts of a materialized graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_rules: usize,
    pub distinct_permissions: usize,
}

/// Root node plus the full `NodeId → Node` arena.
#[derive(Debug, Clone)]
pub struct AttackGraph {
    nodes: Vec<Node>,
    by_permission: HashMap<String, NodeId>,
}

impl Default for AttackGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AttackGraph {
    /// A graph holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                id: NodeId(0),
                permission: ROOT_TEXT.to_string(),
                rules: Vec::new(),
            }],
            by_permission: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look a permission up in the cache.
    pub fn find(&self, permission: &str) -> Option<NodeId> {
        self.by_permission.get(permission).copied()
    }

    /// Insert-if-absent keyed by permission text. Returns the node and whether
    /// it was created by this call.
    pub fn materialize(&mut self, permission: &str) -> (NodeId, bool) {
        if let Some(id) = self.find(permission) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            permission: permission.to_string(),
            rules: Vec::new(),
        });
        self.by_permission.insert(permission.to_string(), id);
        (id, true)
    }

    /// Attach a rule to `from`. A rule with the same text and destination as
    /// one the node already carries is dropped; returns whether it was added.
    /// Same-text rules leading to different permissions are all kept.
    pub fn add_rule(&mut self, from: NodeId, rule: Rule) -> bool {
        let Some(node) = self.nodes.get_mut(from.0) else {
            return false;
        };
        if node
            .rules
            .iter()
            .any(|r| r.text == rule.text && r.dest == rule.dest)
        {
            return false;
        }
        node.rules.push(rule);
        true
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.nodes.len(),
            total_rules: self.nodes.iter().map(|n| n.rules.len()).sum(),
            distinct_permissions: self.by_permission.len(),
        }
    }

    /// Nodes reachable from the root, root included.
    pub fn reachable_from_root(&self) -> usize {
        let mut seen = HashSet::new();
        self.walk(|node| {
            seen.insert(node.id);
        });
        seen.len()
    }

    /// Visit every node reachable from the root once, breadth-first, with its
    /// id, label, and outbound rules.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(NodeId, &str, &[Rule]),
    {
        self.walk(|node| f(node.id, &node.permission, &node.rules));
    }

    fn walk<F: FnMut(&Node)>(&self, mut f: F) {
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(self.nodes.len());
        let mut queue: VecDeque<NodeId> = VecDeque::from([NodeId(0)]);
        seen.insert(NodeId(0));

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.node(id) else {
                continue;
            };
            f(node);
            for rule in &node.rules {
                if seen.insert(rule.dest) {
                    queue.push_back(rule.dest);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(text: &str, dest: NodeId) -> Rule {
        Rule {
            text: text.to_string(),
            dest,
            easiness: None,
        }
    }

    #[test]
    fn test_new_graph_has_root() {
        let graph = AttackGraph::new();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.root().permission, "start");
        assert_eq!(graph.find("start"), None);
    }

    #[test]
    fn test_materialize_is_insert_if_absent() {
        let mut graph = AttackGraph::new();
        let (a, created) = graph.materialize("execCode(web,root)");
        assert!(created);
        assert_eq!(a, NodeId(1));

        let (again, created) = graph.materialize("execCode(web,root)");
        assert!(!created);
        assert_eq!(again, a);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_add_rule_dedups_by_text_and_dest() {
        let mut graph = AttackGraph::new();
        let (a, _) = graph.materialize("a");
        let (b, _) = graph.materialize("b");

        assert!(graph.add_rule(NodeId(0), rule("RULE 1", a)));
        assert!(!graph.add_rule(NodeId(0), rule("RULE 1", a)));
        assert!(graph.add_rule(NodeId(0), rule("RULE 1", b)));
        assert!(graph.add_rule(NodeId(0), rule("RULE 2", b)));
        assert!(!graph.add_rule(NodeId(42), rule("RULE 3", b)));

        let dests: Vec<NodeId> = graph.root().rules().iter().map(|r| r.dest).collect();
        assert_eq!(dests, vec![a, b, b]);
        assert_eq!(graph.reachable_from_root(), graph.len());
    }

    #[test]
    fn test_visit_follows_rules_once() {
        let mut graph = AttackGraph::new();
        let (a, _) = graph.materialize("a");
        let (b, _) = graph.materialize("b");
        let (_orphan, _) = graph.materialize("orphan");
        graph.add_rule(NodeId(0), rule("r1", a));
        graph.add_rule(a, rule("r2", b));
        graph.add_rule(b, rule("r3", a));

        let mut labels = Vec::new();
        graph.visit(|_, label, _| labels.push(label.to_string()));
        assert_eq!(labels, vec!["start", "a", "b"]);
        assert_eq!(graph.reachable_from_root(), 3);

        let stats = graph.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.total_rules, 3);
        assert_eq!(stats.distinct_permissions, 3);
    }
}
