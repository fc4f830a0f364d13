//! The narrow store interface consumed by the materializer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::GraphError;

/// Identifier the solver assigned to a vertex.
pub type StoreId = i64;

/// Relationship type of every solver arc.
pub const TO: &str = "To";

/// What a solver vertex represents in the attack graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A ground input fact (solver `LEAF`).
    Fact,
    /// A derivation step (solver `AND`).
    Rule,
    /// An attacker-reachable condition (solver `OR`).
    Permission,
}

impl NodeKind {
    /// Classify a vertex by the solver's kind column.
    pub fn from_vertex_kind(kind: &str) -> Self {
        match kind {
            "AND" => Self::Rule,
            "OR" => Self::Permission,
            _ => Self::Fact,
        }
    }

    /// The node label used in the store.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fact => "Fact",
            Self::Rule => "Rule",
            Self::Permission => "Permission",
        }
    }
}

/// Read access to a persisted attack graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Text of a vertex with quoting stripped.
    async fn node_text(&self, id: StoreId) -> Result<String, GraphError>;

    /// Targets of `id`'s outbound `edge_label` edges whose kind is `target`,
    /// ascending by id.
    async fn outbound_targets(
        &self,
        id: StoreId,
        edge_label: &str,
        target: NodeKind,
    ) -> Result<Vec<StoreId>, GraphError>;

    /// Every vertex whose text starts with `prefix`, ascending by id.
    async fn find_by_text_prefix(&self, prefix: &str) -> Result<Vec<StoreId>, GraphError>;
}

/// Drop every double quote the solver wraps around vertex text.
pub fn strip_quotes(text: &str) -> String {
    text.replace('"', "")
}

/// Relationship types are spliced into Cypher, so only identifiers pass.
pub fn validate_label(label: &str) -> Result<&str, GraphError> {
    let valid = !label.is_empty()
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !label.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(label)
    } else {
        Err(GraphError::InvalidLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vertex_kind() {
        assert_eq!(NodeKind::from_vertex_kind("AND"), NodeKind::Rule);
        assert_eq!(NodeKind::from_vertex_kind("OR"), NodeKind::Permission);
        assert_eq!(NodeKind::from_vertex_kind("LEAF"), NodeKind::Fact);
        assert_eq!(NodeKind::from_vertex_kind(""), NodeKind::Fact);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"execCode(web,root)\""), "execCode(web,root)");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("To").is_ok());
        assert!(validate_label("LEADS_TO").is_ok());
        assert!(validate_label("").is_err());
        assert!(validate_label("1To").is_err());
        assert!(validate_label("To]->(x) DETACH DELETE x //").is_err());
    }
}
