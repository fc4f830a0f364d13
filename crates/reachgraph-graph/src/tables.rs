//! The solver's two result tables.
//!
//! `vertices` rows are `id, text, kind, flag`; `arcs` rows are
//! `dst, src, step`. Rows may arrive typed (JSON objects) or as the raw
//! string matrices the solver writes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::client::GraphError;
use crate::store::{NodeKind, StoreId};

/// One solver vertex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VertexRow {
    pub id: StoreId,
    pub text: String,
    /// `AND`, `OR`, or `LEAF`.
    pub kind: String,
    #[serde(default)]
    pub flag: f64,
}

impl VertexRow {
    pub fn node_kind(&self) -> NodeKind {
        NodeKind::from_vertex_kind(&self.kind)
    }

    fn from_fields(row: usize, fields: &[String]) -> Result<Self, GraphError> {
        let [id, text, kind, rest @ ..] = fields else {
            return Err(GraphError::MalformedRow {
                table: "vertices",
                row,
                reason: format!("expected at least 3 columns, got {}", fields.len()),
            });
        };
        let flag = match rest.first() {
            Some(raw) => parse_field::<f64>("vertices", row, "flag", raw)?,
            None => 0.0,
        };
        Ok(Self {
            id: parse_field("vertices", row, "id", id)?,
            text: text.clone(),
            kind: kind.trim().to_string(),
            flag,
        })
    }
}

/// One solver arc: `src` derives from / leads to `dst`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArcRow {
    pub dst: StoreId,
    pub src: StoreId,
    #[serde(default)]
    pub step: i64,
}

impl ArcRow {
    fn from_fields(row: usize, fields: &[String]) -> Result<Self, GraphError> {
        let [dst, src, rest @ ..] = fields else {
            return Err(GraphError::MalformedRow {
                table: "arcs",
                row,
                reason: format!("expected at least 2 columns, got {}", fields.len()),
            });
        };
        let step = match rest.first() {
            Some(raw) => parse_field("arcs", row, "step", raw)?,
            None => 0,
        };
        Ok(Self {
            dst: parse_field("arcs", row, "dst", dst)?,
            src: parse_field("arcs", row, "src", src)?,
            step,
        })
    }
}

/// A tables document in either of its two accepted shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum TablesDocument {
    Typed(ResultTables),
    Raw {
        vertices: Vec<Vec<String>>,
        #[serde(default)]
        arcs: Vec<Vec<String>>,
    },
}

/// Both tables of one solver run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultTables {
    pub vertices: Vec<VertexRow>,
    pub arcs: Vec<ArcRow>,
}

impl ResultTables {
    /// Parse the raw string matrices.
    pub fn from_rows(vertices: &[Vec<String>], arcs: &[Vec<String>]) -> Result<Self, GraphError> {
        let tables = Self {
            vertices: vertices
                .iter()
                .enumerate()
                .map(|(i, r)| VertexRow::from_fields(i, r))
                .collect::<Result<_, _>>()?,
            arcs: arcs
                .iter()
                .enumerate()
                .map(|(i, r)| ArcRow::from_fields(i, r))
                .collect::<Result<_, _>>()?,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Parse `{vertices, arcs}` holding either row objects or raw string rows.
    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        let document: TablesDocument =
            serde_json::from_str(input).map_err(|e| GraphError::Serialization(e.to_string()))?;
        match document {
            TablesDocument::Typed(tables) => {
                tables.validate()?;
                Ok(tables)
            }
            TablesDocument::Raw { vertices, arcs } => Self::from_rows(&vertices, &arcs),
        }
    }

    /// Vertex ids are unique and every arc joins two known vertices.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut ids = HashSet::with_capacity(self.vertices.len());
        for (row, v) in self.vertices.iter().enumerate() {
            if !ids.insert(v.id) {
                return Err(GraphError::MalformedRow {
                    table: "vertices",
                    row,
                    reason: format!("duplicate id {}", v.id),
                });
            }
        }
        for (row, a) in self.arcs.iter().enumerate() {
            for end in [a.src, a.dst] {
                if !ids.contains(&end) {
                    return Err(GraphError::MalformedRow {
                        table: "arcs",
                        row,
                        reason: format!("unknown vertex {end}"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(
    table: &'static str,
    row: usize,
    column: &str,
    raw: &str,
) -> Result<T, GraphError> {
    raw.trim().parse().map_err(|_| GraphError::MalformedRow {
        table,
        row,
        reason: format!("{column} is not numeric: {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_from_rows() {
        let vertices = vec![
            row(&["1", "execCode(web,root)", "OR", "0"]),
            row(&["2", "RULE 2 (remote exploit of a server program)", "AND", "0"]),
            row(&["3", "attackerLocated(internet)", "LEAF", "1"]),
        ];
        let arcs = vec![row(&["2", "3", "-1"]), row(&["1", "2", "-1"])];

        let tables = ResultTables::from_rows(&vertices, &arcs).unwrap();
        assert_eq!(tables.vertices.len(), 3);
        assert_eq!(tables.vertices[1].node_kind(), NodeKind::Rule);
        assert_eq!(tables.vertices[2].flag, 1.0);
        assert_eq!(tables.arcs[0], ArcRow { dst: 2, src: 3, step: -1 });
    }

    #[test]
    fn test_short_row_rejected() {
        let err = ResultTables::from_rows(&[row(&["1", "x"])], &[]).unwrap_err();
        assert!(matches!(err, GraphError::MalformedRow { table: "vertices", row: 0, .. }));
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        let err = ResultTables::from_rows(&[row(&["one", "x", "OR"])], &[]).unwrap_err();
        assert!(matches!(err, GraphError::MalformedRow { .. }));
    }

    #[test]
    fn test_dangling_arc_rejected() {
        let err =
            ResultTables::from_rows(&[row(&["1", "x", "OR"])], &[row(&["1", "9"])]).unwrap_err();
        assert!(matches!(err, GraphError::MalformedRow { table: "arcs", .. }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "vertices": [{"id": 1, "text": "a", "kind": "OR"}, {"id": 2, "text": "b", "kind": "AND"}],
            "arcs": [{"dst": 1, "src": 2}]
        }"#;
        let tables = ResultTables::from_json(json).unwrap();
        assert_eq!(tables.vertices[0].flag, 0.0);
        assert_eq!(tables.arcs[0].step, 0);
    }

    #[test]
    fn test_from_json_raw_rows() {
        let json = r#"{
            "vertices": [["1", "\"execCode(web,root)\"", "OR", "0"], ["2", "RULE 2", "AND"]],
            "arcs": [["1", "2", "-1"]]
        }"#;
        let tables = ResultTables::from_json(json).unwrap();
        assert_eq!(tables.vertices[0].text, "\"execCode(web,root)\"");
        assert_eq!(tables.vertices[1].node_kind(), NodeKind::Rule);
        assert_eq!(tables.arcs[0], ArcRow { dst: 1, src: 2, step: -1 });
    }

    #[test]
    fn test_from_json_raw_rows_malformed() {
        let err = ResultTables::from_json(r#"{"vertices": [["x", "a", "OR"]]}"#).unwrap_err();
        assert!(matches!(err, GraphError::MalformedRow { table: "vertices", row: 0, .. }));
    }
}
