// graphrestore/src/client/rest.rs
//! HTTP client for the graph server's REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::GraphClient;
use crate::config::GraphConnection;
use crate::errors::{RestoreError, Result};
use crate::model::{Edge, EdgeLabel, IndexLabel, PropertyKey, Vertex, VertexLabel};

#[derive(Debug, Deserialize)]
struct VertexLabelList {
    vertexlabels: Vec<VertexLabel>,
}

pub struct RestClient {
    client: Client,
    graph_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl RestClient {
    pub fn new(connection: &GraphConnection) -> Result<Self> {
        let client = Client::builder()
            .timeout(connection.timeout)
            .build()
            .map_err(|e| RestoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let graph_url = format!(
            "{}/graphs/{}",
            connection.url.as_str().trim_end_matches('/'),
            connection.graph
        );

        Ok(Self {
            client,
            graph_url,
            username: connection.username.clone(),
            password: connection.password.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RestoreError::Remote {
            operation: operation.to_string(),
            status: Some(status.as_u16()),
            message: body,
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, operation: &str, path: &str, body: &T) -> Result<()> {
        let url = format!("{}/{}", self.graph_url, path);
        debug!(%url, operation, "POST");
        self.send(operation, self.client.post(&url).json(body)).await?;
        Ok(())
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> RestoreError {
    RestoreError::Remote {
        operation: operation.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

#[async_trait]
impl GraphClient for RestClient {
    async fn ping(&self) -> Result<()> {
        self.send("checking graph", self.client.get(&self.graph_url))
            .await?;
        Ok(())
    }

    async fn get_vertex_labels(&self) -> Result<Vec<VertexLabel>> {
        let operation = "listing vertex labels";
        let url = format!("{}/schema/vertexlabels", self.graph_url);
        let response = self.send(operation, self.client.get(&url)).await?;
        let list: VertexLabelList = response
            .json()
            .await
            .map_err(|e| transport_error(operation, e))?;
        Ok(list.vertexlabels)
    }

    async fn add_property_key(&self, property_key: &PropertyKey) -> Result<()> {
        self.post("adding property key", "schema/propertykeys", property_key)
            .await
    }

    async fn add_vertex_label(&self, vertex_label: &VertexLabel) -> Result<()> {
        self.post("adding vertex label", "schema/vertexlabels", vertex_label)
            .await
    }

    async fn add_edge_label(&self, edge_label: &EdgeLabel) -> Result<()> {
        self.post("adding edge label", "schema/edgelabels", edge_label)
            .await
    }

    async fn add_index_label(&self, index_label: &IndexLabel) -> Result<()> {
        self.post("adding index label", "schema/indexlabels", index_label)
            .await
    }

    async fn add_vertices(&self, vertices: &[Vertex]) -> Result<()> {
        self.post("adding vertices", "graph/vertices/batch", vertices)
            .await
    }

    async fn add_edges(&self, edges: &[Edge], check_vertex: bool) -> Result<()> {
        let path = format!("graph/edges/batch?check_vertex={}", check_vertex);
        self.post("adding edges", &path, edges).await
    }
}
