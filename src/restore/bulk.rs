// graphrestore/src/restore/bulk.rs
//! Vertices and edges: many files, restored concurrently in batches.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use super::counters::RestoreCounters;
use super::decoder::read_list;
use super::locator::files_with_prefix;
use super::retry::RetryPolicy;
use super::strategy::RestoreStrategy;
use crate::client::GraphClient;
use crate::errors::{RestoreError, Result};
use crate::model::{Edge, RestoreType, Vertex};

/// Largest number of records sent in one upload call.
pub const BATCH_SIZE: usize = 500;

/// Splits a decoded line into upload batches, preserving order.
pub fn split_batches<T>(records: &mut [T]) -> std::slice::ChunksMut<'_, T> {
    records.chunks_mut(BATCH_SIZE)
}

/// Drops client-side ids of vertices whose label derives ids from primary
/// keys; the server recomputes them.
pub fn sanitize_vertices(vertices: &mut [Vertex], primary_key_labels: &HashSet<String>) {
    for vertex in vertices {
        if primary_key_labels.contains(&vertex.label) {
            vertex.id = None;
        }
    }
}

/// What a unit does with each decoded line.
enum BulkPlan {
    Vertices { primary_key_labels: HashSet<String> },
    Edges,
}

pub struct BulkStrategy {
    client: Arc<dyn GraphClient>,
    counters: Arc<RestoreCounters>,
    retry: RetryPolicy,
    workers: usize,
}

impl BulkStrategy {
    pub fn new(
        client: Arc<dyn GraphClient>,
        counters: Arc<RestoreCounters>,
        retry: RetryPolicy,
        workers: usize,
    ) -> Self {
        Self {
            client,
            counters,
            retry,
            workers: workers.max(1),
        }
    }

    /// Snapshot of the labels whose vertex ids come from primary keys. Taken
    /// once per vertex restore, before any file is read.
    async fn primary_key_labels(&self) -> Result<HashSet<String>> {
        let labels = self.client.get_vertex_labels().await?;
        Ok(labels
            .into_iter()
            .filter(|label| label.uses_primary_key_id())
            .map(|label| label.name)
            .collect())
    }

    async fn restore_file(
        &self,
        restore_type: RestoreType,
        path: &Path,
        plan: &BulkPlan,
    ) -> Result<u64> {
        let file = File::open(path)
            .await
            .map_err(|e| RestoreError::io(path, e))?;
        let mut lines = BufReader::new(file).lines();
        let mut restored = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| RestoreError::io(path, e))?
        {
            if line.trim().is_empty() {
                continue;
            }
            restored += match plan {
                BulkPlan::Vertices { primary_key_labels } => {
                    self.restore_vertex_line(&line, primary_key_labels).await?
                }
                BulkPlan::Edges => self.restore_edge_line(&line).await?,
            };
        }

        debug!(restore_type = %restore_type, file = %path.display(), restored, "Finished dump file");
        Ok(restored)
    }

    async fn restore_vertex_line(
        &self,
        line: &str,
        primary_key_labels: &HashSet<String>,
    ) -> Result<u64> {
        let mut vertices: Vec<Vertex> = read_list(RestoreType::Vertex.tag(), line)?;
        let mut restored = 0;
        for batch in split_batches(&mut vertices) {
            sanitize_vertices(batch, primary_key_labels);
            let batch: &[Vertex] = batch;
            let client = &self.client;
            self.retry
                .run("restoring vertices", move || client.add_vertices(batch))
                .await?;
            self.counters.add(RestoreType::Vertex, batch.len() as u64);
            restored += batch.len() as u64;
        }
        Ok(restored)
    }

    async fn restore_edge_line(&self, line: &str) -> Result<u64> {
        let mut edges: Vec<Edge> = read_list(RestoreType::Edge.tag(), line)?;
        let mut restored = 0;
        for batch in split_batches(&mut edges) {
            let batch: &[Edge] = batch;
            let client = &self.client;
            self.retry
                .run("restoring edges", move || client.add_edges(batch, false))
                .await?;
            self.counters.add(RestoreType::Edge, batch.len() as u64);
            restored += batch.len() as u64;
        }
        Ok(restored)
    }
}

/// Dump files for a graph object type. The tag is only a prefix, so the
/// schema dumps sharing it (`vertexlabel` for `vertex`, `edgelabel` for
/// `edge`) are left out.
fn graph_object_files(directory: &Path, restore_type: RestoreType) -> Vec<PathBuf> {
    files_with_prefix(directory, restore_type.tag())
        .into_iter()
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !RestoreType::SCHEMA
                .iter()
                .any(|schema| name.starts_with(schema.tag()))
        })
        .collect()
}

#[async_trait]
impl RestoreStrategy for BulkStrategy {
    async fn restore(&self, restore_type: RestoreType, directory: &Path) -> Result<()> {
        let plan = match restore_type {
            RestoreType::Vertex => BulkPlan::Vertices {
                primary_key_labels: self.primary_key_labels().await?,
            },
            RestoreType::Edge => BulkPlan::Edges,
            other => {
                return Err(RestoreError::InvalidInput(format!(
                    "Bad restore type for bulk restore: {}",
                    other
                )));
            }
        };

        let files = graph_object_files(directory, restore_type);
        info!(
            restore_type = %restore_type,
            files = files.len(),
            workers = self.workers,
            "Restoring dump files"
        );

        let plan = &plan;
        let outcomes: Vec<(PathBuf, Result<u64>)> = stream::iter(files)
            .map(move |path| async move {
                let outcome = self.restore_file(restore_type, &path, plan).await;
                (path, outcome)
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(restored) => {
                    info!(restore_type = %restore_type, file = %path.display(), restored, "Restored dump file");
                }
                Err(e) => {
                    error!(restore_type = %restore_type, file = %path.display(), error = %e, "Failed to restore dump file");
                    failures.push((path, e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RestoreError::UnitsFailed {
                restore_type,
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingClient;
    use crate::config::RetryConfig;
    use crate::model::VertexLabel;
    use serde_json::json;
    use std::fs;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tempfile::TempDir;

    fn vertex(id: Option<&str>, label: &str) -> Vertex {
        Vertex {
            id: id.map(|i| json!(i)),
            label: label.to_string(),
            properties: Default::default(),
            extra: Default::default(),
        }
    }

    fn pk_label(name: &str) -> VertexLabel {
        VertexLabel {
            name: name.to_string(),
            id_strategy: Some("PRIMARY_KEY".to_string()),
            extra: Default::default(),
        }
    }

    fn strategy(client: Arc<RecordingClient>, workers: usize) -> (BulkStrategy, Arc<RestoreCounters>) {
        let counters = Arc::new(RestoreCounters::default());
        let retry = RetryPolicy::new(&RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        });
        (
            BulkStrategy::new(client, Arc::clone(&counters), retry, workers),
            counters,
        )
    }

    fn vertex_line(start: usize, count: usize) -> String {
        let vertices: Vec<_> = (start..start + count)
            .map(|i| json!({"id": format!("2:{}", i), "label": "software", "properties": {}}))
            .collect();
        json!({ "vertex": vertices }).to_string()
    }

    fn edge_line(count: usize) -> String {
        let edges: Vec<_> = (0..count)
            .map(|i| json!({"label": "knows", "outV": format!("1:{}", i), "inV": "1:hub"}))
            .collect();
        json!({ "edge": edges }).to_string()
    }

    #[test]
    fn test_split_batches_sizes_and_order() {
        for n in [0usize, 1, 499, 500, 501, 1000, 1234] {
            let mut records: Vec<usize> = (0..n).collect();
            let batches: Vec<Vec<usize>> = split_batches(&mut records).map(|b| b.to_vec()).collect();
            assert_eq!(batches.len(), n.div_ceil(BATCH_SIZE));
            if let Some((last, full)) = batches.split_last() {
                assert!(full.iter().all(|b| b.len() == BATCH_SIZE));
                assert!(!last.is_empty() && last.len() <= BATCH_SIZE);
            }
            let rejoined: Vec<usize> = batches.concat();
            assert_eq!(rejoined, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_sanitize_clears_only_primary_key_labels() {
        let labels: HashSet<String> = ["person".to_string()].into();
        let mut vertices = vec![
            vertex(Some("1:marko"), "person"),
            vertex(Some("lop"), "software"),
            vertex(None, "person"),
        ];
        sanitize_vertices(&mut vertices, &labels);
        assert_eq!(vertices[0].id, None);
        assert_eq!(vertices[1].id, Some(json!("lop")));
        assert_eq!(vertices[2].id, None);
    }

    #[test]
    fn test_graph_object_files_skip_schema_dumps() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        for name in ["vertex", "vertex-1", "vertexlabel", "edge", "edgelabel", "edge-7"] {
            fs::write(dir.path().join(name), "")?;
        }
        let vertex_files = graph_object_files(dir.path(), RestoreType::Vertex);
        let edge_files = graph_object_files(dir.path(), RestoreType::Edge);
        assert_eq!(vertex_files, vec![dir.path().join("vertex"), dir.path().join("vertex-1")]);
        assert_eq!(edge_files, vec![dir.path().join("edge"), dir.path().join("edge-7")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_primary_key_vertex_is_sent_without_id() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("vertex-a"),
            r#"{"vertex":[{"id":"1:x","label":"person","properties":{}}]}"#,
        )?;
        let client = Arc::new(RecordingClient::with_vertex_labels(vec![pk_label("person")]));
        let (bulk, counters) = strategy(Arc::clone(&client), 2);

        bulk.restore(RestoreType::Vertex, dir.path()).await?;

        let uploaded = client.uploaded_vertices();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].id, None);
        assert!(serde_json::to_value(&uploaded[0])?.get("id").is_none());
        assert_eq!(counters.get(RestoreType::Vertex), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_edges_upload_in_two_batches_without_vertex_check() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("edge"), edge_line(501))?;
        let client = Arc::new(RecordingClient::default());
        let (bulk, counters) = strategy(Arc::clone(&client), 2);

        bulk.restore(RestoreType::Edge, dir.path()).await?;

        let batches = client.edge_batches.lock().unwrap();
        let sizes: Vec<usize> = batches.iter().map(|(edges, _)| edges.len()).collect();
        assert_eq!(sizes, vec![500, 1]);
        assert!(batches.iter().all(|(_, check_vertex)| !check_vertex));
        assert_eq!(batches[1].0[0].out_v, json!("1:500"));
        assert_eq!(counters.get(RestoreType::Edge), 501);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_files_count_exactly() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut expected = 0;
        for file in 0..6 {
            let sizes = [250 + file * 37, 501 + file, 17];
            let lines: Vec<String> = sizes
                .iter()
                .enumerate()
                .map(|(line, &count)| vertex_line(file * 10_000 + line * 1_000, count))
                .collect();
            expected += sizes.iter().sum::<usize>();
            fs::write(dir.path().join(format!("vertex-{:04}", file)), lines.join("\n"))?;
        }
        let client = Arc::new(RecordingClient::default());
        let (bulk, counters) = strategy(Arc::clone(&client), 4);

        bulk.restore(RestoreType::Vertex, dir.path()).await?;

        assert_eq!(counters.get(RestoreType::Vertex), expected as u64);
        assert_eq!(client.uploaded_vertices().len(), expected);
        // Ids of non primary key labels pass through untouched.
        assert!(client.uploaded_vertices().iter().all(|v| v.id.is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("edge-1"), edge_line(10))?;
        let client = Arc::new(RecordingClient::default());
        client.transient_failures.store(2, Ordering::SeqCst);
        let (bulk, counters) = strategy(Arc::clone(&client), 1);

        bulk.restore(RestoreType::Edge, dir.path()).await?;

        assert_eq!(client.edge_batches.lock().unwrap().len(), 1);
        assert_eq!(counters.get(RestoreType::Edge), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_the_unit() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("edge-1"), edge_line(10))?;
        let client = Arc::new(RecordingClient::default());
        client.transient_failures.store(3, Ordering::SeqCst);
        let (bulk, counters) = strategy(Arc::clone(&client), 1);

        let err = bulk.restore(RestoreType::Edge, dir.path()).await.unwrap_err();

        match err {
            RestoreError::UnitsFailed { failures, .. } => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(failures[0].1, RestoreError::RetriesExhausted { attempts: 3, .. }));
            }
            other => panic!("expected UnitsFailed, got {:?}", other),
        }
        assert_eq!(counters.get(RestoreType::Edge), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_file_does_not_stop_siblings() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("vertex-1"), vertex_line(0, 3))?;
        fs::write(dir.path().join("vertex-2"), format!("{}\n{{\"vertex\": [", vertex_line(10, 2)))?;
        fs::write(dir.path().join("vertex-3"), vertex_line(20, 4))?;
        let client = Arc::new(RecordingClient::default());
        let (bulk, counters) = strategy(Arc::clone(&client), 3);

        let err = bulk.restore(RestoreType::Vertex, dir.path()).await.unwrap_err();

        match err {
            RestoreError::UnitsFailed {
                restore_type,
                failures,
            } => {
                assert_eq!(restore_type, RestoreType::Vertex);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, dir.path().join("vertex-2"));
                assert!(matches!(failures[0].1, RestoreError::Decode { .. }));
            }
            other => panic!("expected UnitsFailed, got {:?}", other),
        }
        // The first line of the bad file was uploaded before the failure.
        assert_eq!(counters.get(RestoreType::Vertex), 9);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_files_is_a_no_op() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let client = Arc::new(RecordingClient::default());
        let (bulk, counters) = strategy(Arc::clone(&client), 2);

        bulk.restore(RestoreType::Edge, dir.path()).await?;
        assert_eq!(counters.get(RestoreType::Edge), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_type_is_rejected() {
        let client = Arc::new(RecordingClient::default());
        let (bulk, _) = strategy(client, 1);
        let result = bulk.restore(RestoreType::PropertyKey, Path::new("/tmp")).await;
        assert!(matches!(result, Err(RestoreError::InvalidInput(_))));
    }
}
