// graphrestore/src/restore/schema.rs
//! Schema objects: one file per type, replayed record by record.
//!
//! Unlike vertices and edges these calls are neither batched nor retried:
//! the first failed creation ends the type's restore.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::counters::RestoreCounters;
use super::decoder::read_list;
use super::strategy::RestoreStrategy;
use crate::client::GraphClient;
use crate::errors::{RestoreError, Result};
use crate::model::{EdgeLabel, IndexLabel, PropertyKey, RestoreType, VertexLabel};

/// A schema record that knows which creation call it needs.
#[async_trait]
pub trait SchemaRecord: DeserializeOwned + Send + Sync {
    async fn create(&self, client: &dyn GraphClient) -> Result<()>;
}

#[async_trait]
impl SchemaRecord for PropertyKey {
    async fn create(&self, client: &dyn GraphClient) -> Result<()> {
        client.add_property_key(self).await
    }
}

#[async_trait]
impl SchemaRecord for VertexLabel {
    async fn create(&self, client: &dyn GraphClient) -> Result<()> {
        client.add_vertex_label(self).await
    }
}

#[async_trait]
impl SchemaRecord for EdgeLabel {
    async fn create(&self, client: &dyn GraphClient) -> Result<()> {
        client.add_edge_label(self).await
    }
}

#[async_trait]
impl SchemaRecord for IndexLabel {
    async fn create(&self, client: &dyn GraphClient) -> Result<()> {
        client.add_index_label(self).await
    }
}

pub struct SchemaStrategy {
    client: Arc<dyn GraphClient>,
    counters: Arc<RestoreCounters>,
}

impl SchemaStrategy {
    pub fn new(client: Arc<dyn GraphClient>, counters: Arc<RestoreCounters>) -> Self {
        Self { client, counters }
    }

    async fn restore_file<T: SchemaRecord>(&self, restore_type: RestoreType, path: &Path) -> Result<()> {
        let file = open_dump_file(path).await?;
        let mut lines = BufReader::new(file).lines();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| RestoreError::io(path, e))?
        {
            if line.trim().is_empty() {
                continue;
            }
            let records: Vec<T> = read_list(restore_type.tag(), &line)?;
            for record in &records {
                record.create(self.client.as_ref()).await?;
                self.counters.increment(restore_type);
            }
            debug!(restore_type = %restore_type, records = records.len(), "Restored dump line");
        }
        Ok(())
    }
}

/// Opens the schema dump, reporting anything that is not a readable
/// regular file as invalid input.
async fn open_dump_file(path: &Path) -> Result<File> {
    let invalid = || {
        RestoreError::InvalidInput(format!(
            "Need to specify a readable dump file rather than: {}",
            path.display()
        ))
    };
    let metadata = tokio::fs::metadata(path).await.map_err(|_| invalid())?;
    if !metadata.is_file() {
        return Err(invalid());
    }
    File::open(path).await.map_err(|_| invalid())
}

#[async_trait]
impl RestoreStrategy for SchemaStrategy {
    async fn restore(&self, restore_type: RestoreType, directory: &Path) -> Result<()> {
        let path = directory.join(restore_type.tag());
        info!(restore_type = %restore_type, file = %path.display(), "Restoring schema dump");

        match restore_type {
            RestoreType::PropertyKey => self.restore_file::<PropertyKey>(restore_type, &path).await,
            RestoreType::VertexLabel => self.restore_file::<VertexLabel>(restore_type, &path).await,
            RestoreType::EdgeLabel => self.restore_file::<EdgeLabel>(restore_type, &path).await,
            RestoreType::IndexLabel => self.restore_file::<IndexLabel>(restore_type, &path).await,
            RestoreType::Vertex | RestoreType::Edge => Err(RestoreError::InvalidInput(format!(
                "Bad restore type for schema restore: {}",
                restore_type
            ))),
        }
    }
}
