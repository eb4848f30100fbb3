// graphrestore/src/model.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::RestoreError;

/// The kinds of object a dump directory can hold.
///
/// The tag doubles as the dump file name (or prefix) and as the JSON key
/// wrapping the records on every dump line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreType {
    PropertyKey,
    VertexLabel,
    EdgeLabel,
    IndexLabel,
    Vertex,
    Edge,
}

impl RestoreType {
    /// Every type, in an order that satisfies schema and graph dependencies.
    pub const ALL: [RestoreType; 6] = [
        RestoreType::PropertyKey,
        RestoreType::VertexLabel,
        RestoreType::EdgeLabel,
        RestoreType::IndexLabel,
        RestoreType::Vertex,
        RestoreType::Edge,
    ];

    pub const SCHEMA: [RestoreType; 4] = [
        RestoreType::PropertyKey,
        RestoreType::VertexLabel,
        RestoreType::EdgeLabel,
        RestoreType::IndexLabel,
    ];

    pub const DATA: [RestoreType; 2] = [RestoreType::Vertex, RestoreType::Edge];

    pub fn tag(self) -> &'static str {
        match self {
            RestoreType::PropertyKey => "propertykey",
            RestoreType::VertexLabel => "vertexlabel",
            RestoreType::EdgeLabel => "edgelabel",
            RestoreType::IndexLabel => "indexlabel",
            RestoreType::Vertex => "vertex",
            RestoreType::Edge => "edge",
        }
    }

    /// Vertices and edges are sharded across many files and restored in bulk.
    pub fn is_graph_object(self) -> bool {
        matches!(self, RestoreType::Vertex | RestoreType::Edge)
    }

    /// Stable slot used by the counters.
    pub(crate) fn index(self) -> usize {
        match self {
            RestoreType::PropertyKey => 0,
            RestoreType::VertexLabel => 1,
            RestoreType::EdgeLabel => 2,
            RestoreType::IndexLabel => 3,
            RestoreType::Vertex => 4,
            RestoreType::Edge => 5,
        }
    }
}

impl fmt::Display for RestoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for RestoreType {
    type Err = RestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        RestoreType::ALL
            .into_iter()
            .find(|t| t.tag() == normalized)
            .ok_or_else(|| RestoreError::InvalidInput(format!("Unknown restore type: '{}'", s)))
    }
}

/// Expands the configured type names into the ordered list handed to the
/// orchestrator. Group keywords expand in place; explicit names keep the
/// order the caller wrote them in.
pub fn parse_restore_types<S: AsRef<str>>(names: &[S]) -> Result<Vec<RestoreType>, RestoreError> {
    let mut types = Vec::new();
    for name in names {
        match name.as_ref().trim().to_ascii_lowercase().as_str() {
            "all" => types.extend(RestoreType::ALL),
            "schema" => types.extend(RestoreType::SCHEMA),
            "data" => types.extend(RestoreType::DATA),
            _ => types.push(name.as_ref().parse()?),
        }
    }
    if types.is_empty() {
        return Err(RestoreError::InvalidInput(
            "No restore types were given".to_string(),
        ));
    }
    Ok(types)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyKey {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexLabel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_strategy: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VertexLabel {
    /// True when the store derives vertex ids from primary key values.
    pub fn uses_primary_key_id(&self) -> bool {
        self.id_strategy
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("PRIMARY_KEY"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexLabel {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub label: String,
    #[serde(rename = "outV")]
    pub out_v: Value,
    #[serde(rename = "inV")]
    pub in_v: Value,
    #[serde(rename = "outVLabel", default, skip_serializing_if = "Option::is_none")]
    pub out_v_label: Option<String>,
    #[serde(rename = "inVLabel", default, skip_serializing_if = "Option::is_none")]
    pub in_v_label: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
