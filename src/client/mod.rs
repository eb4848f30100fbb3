// graphrestore/src/client/mod.rs
pub(crate) mod rest;

use async_trait::async_trait;

use crate::errors::Result;
use crate::model::{Edge, EdgeLabel, IndexLabel, PropertyKey, Vertex, VertexLabel};

pub use rest::RestClient;

/// The slice of the graph server's API that a restore needs.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Succeeds when the target graph is reachable.
    async fn ping(&self) -> Result<()>;

    async fn get_vertex_labels(&self) -> Result<Vec<VertexLabel>>;

    async fn add_property_key(&self, property_key: &PropertyKey) -> Result<()>;

    async fn add_vertex_label(&self, vertex_label: &VertexLabel) -> Result<()>;

    async fn add_edge_label(&self, edge_label: &EdgeLabel) -> Result<()>;

    async fn add_index_label(&self, index_label: &IndexLabel) -> Result<()>;

    async fn add_vertices(&self, vertices: &[Vertex]) -> Result<()>;

    /// With `check_vertex` off the server does not look up edge endpoints.
    async fn add_edges(&self, edges: &[Edge], check_vertex: bool) -> Result<()>;
}
