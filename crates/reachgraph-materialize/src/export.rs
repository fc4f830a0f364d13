//! Renderer-facing export of a materialized graph.
//!
//! Node ids are `n<id>`, edge ids `e<k>` in visit order. Each node lists the
//! machines its permission talks about.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{AttackGraph, GraphStats};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportNode {
    pub id: String,
    pub label: String,
    pub machines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easiness: Option<u32>,
}

/// Flat `{nodes, edges}` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
    pub stats: GraphStats,
}

impl AttackGraph {
    /// Export the part of the graph reachable from the root.
    pub fn export(&self) -> GraphExport {
        self.export_with_hosts(None)
    }

    /// Like [`AttackGraph::export`], but node machines are restricted to
    /// `hosts` (the topology's machine names) when given.
    pub fn export_with_hosts(&self, hosts: Option<&BTreeSet<String>>) -> GraphExport {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        self.visit(|id, label, rules| {
            nodes.push(ExportNode {
                id: format!("n{}", id.0),
                label: label.to_string(),
                machines: permission_machines(label, hosts),
            });
            for rule in rules {
                edges.push(ExportEdge {
                    id: format!("e{}", edges.len()),
                    source: format!("n{}", id.0),
                    target: format!("n{}", rule.dest.0),
                    label: rule.text.clone(),
                    easiness: rule.easiness,
                });
            }
        });

        GraphExport {
            nodes,
            edges,
            stats: self.stats(),
        }
    }
}

/// Machines named in a permission such as `execCode(web,root)`.
///
/// With a host list, every argument naming a known host is returned once, in
/// argument order. Without one, the first argument is taken as the host.
pub fn permission_machines(permission: &str, hosts: Option<&BTreeSet<String>>) -> Vec<String> {
    let args = match (permission.find('('), permission.rfind(')')) {
        (Some(open), Some(close)) if open < close => &permission[open + 1..close],
        _ => return Vec::new(),
    };
    let mut args = args
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty() && *a != "_");

    match hosts {
        Some(hosts) => {
            let mut out: Vec<String> = Vec::new();
            for arg in args {
                if hosts.contains(arg) && !out.iter().any(|m| m == arg) {
                    out.push(arg.to_string());
                }
            }
            out
        }
        None => args.next().map(|a| vec![a.to_string()]).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::permission_machines;
    use crate::graph::{AttackGraph, NodeId, Rule};

    #[test]
    fn test_export_shape() {
        let mut graph = AttackGraph::new();
        let (a, _) = graph.materialize("netAccess(web,tcp,80)");
        let (b, _) = graph.materialize("execCode(web,root)");
        graph.add_rule(
            NodeId(0),
            Rule {
                text: "RULE 6".into(),
                dest: a,
                easiness: None,
            },
        );
        graph.add_rule(
            a,
            Rule {
                text: "RULE 2".into(),
                dest: b,
                easiness: Some(4),
            },
        );

        let export = graph.export();
        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.nodes[0].label, "start");
        assert_eq!(export.edges.len(), 2);
        assert_eq!(export.edges[1].id, "e1");
        assert_eq!(export.edges[1].source, "n1");
        assert_eq!(export.edges[1].target, "n2");
        assert!(export.nodes[0].machines.is_empty());
        assert_eq!(export.nodes[2].machines, vec!["web"]);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["edges"][0].get("easiness").is_none());
        assert_eq!(json["edges"][1]["easiness"], 4);
        assert_eq!(json["stats"]["total_nodes"], 3);
    }

    #[test]
    fn test_permission_machines() {
        assert_eq!(permission_machines("execCode(web,root)", None), vec!["web"]);
        assert_eq!(permission_machines("netAccess(db,tcp,5432)", None), vec!["db"]);
        assert!(permission_machines("start", None).is_empty());
        assert!(permission_machines("broken(", None).is_empty());

        let hosts: BTreeSet<String> = ["web", "db"].iter().map(|h| h.to_string()).collect();
        assert_eq!(
            permission_machines("hacl(web,db,tcp,5432)", Some(&hosts)),
            vec!["web", "db"]
        );
        assert_eq!(permission_machines("execCode(db,db)", Some(&hosts)), vec!["db"]);
        assert!(permission_machines("execCode(mail,root)", Some(&hosts)).is_empty());
    }

    #[test]
    fn test_export_with_hosts() {
        let mut graph = AttackGraph::new();
        let (a, _) = graph.materialize("canAccessFile(root,fileServer,write,_)");
        graph.add_rule(
            NodeId(0),
            Rule {
                text: "RULE 10".into(),
                dest: a,
                easiness: None,
            },
        );

        let hosts: BTreeSet<String> = ["fileServer".to_string()].into();
        let export = graph.export_with_hosts(Some(&hosts));
        assert_eq!(export.nodes[1].machines, vec!["fileServer"]);
        assert_eq!(graph.export().nodes[1].machines, vec!["root"]);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["nodes"][1]["machines"][0], "fileServer");
    }
}
