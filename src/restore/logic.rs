// graphrestore/src/restore/logic.rs
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use super::bulk::BulkStrategy;
use super::counters::{RestoreCounters, RestoreSummary};
use super::retry::RetryPolicy;
use super::schema::SchemaStrategy;
use super::strategy::RestoreStrategy;
use crate::client::GraphClient;
use crate::errors::Result;
use crate::model::RestoreType;

/// Replays a dump directory into a graph, one restore type at a time.
///
/// Types run in exactly the order given. Callers must list schema types
/// before the graph objects that use them, and vertices before edges; the
/// manager does not reorder or validate this.
///
/// Restoring is not idempotent: replaying the same dump twice creates
/// duplicate objects unless the server deduplicates by id.
pub struct RestoreManager {
    bulk: BulkStrategy,
    schema: SchemaStrategy,
    counters: Arc<RestoreCounters>,
}

impl RestoreManager {
    pub fn new(client: Arc<dyn GraphClient>, retry: RetryPolicy, workers: usize) -> Self {
        let counters = Arc::new(RestoreCounters::default());
        Self {
            bulk: BulkStrategy::new(Arc::clone(&client), Arc::clone(&counters), retry, workers),
            schema: SchemaStrategy::new(client, Arc::clone(&counters)),
            counters,
        }
    }

    fn strategy_for(&self, restore_type: RestoreType) -> &dyn RestoreStrategy {
        if restore_type.is_graph_object() {
            &self.bulk
        } else {
            &self.schema
        }
    }

    pub fn counters(&self) -> &RestoreCounters {
        &self.counters
    }

    /// Restores every type in `types` from `input_dir`, stopping at the
    /// first type that fails. The summary is printed either way.
    pub async fn restore(&self, types: &[RestoreType], input_dir: &Path) -> Result<RestoreSummary> {
        let start = Instant::now();
        info!(
            input_dir = %input_dir.display(),
            types = ?types.iter().map(|t| t.tag()).collect::<Vec<_>>(),
            "Starting restore"
        );

        let mut outcome = Ok(());
        for &restore_type in types {
            info!(restore_type = %restore_type, "Restoring");
            if let Err(e) = self.strategy_for(restore_type).restore(restore_type, input_dir).await {
                error!(restore_type = %restore_type, error = %e, "Restore failed");
                outcome = Err(e);
                break;
            }
            info!(
                restore_type = %restore_type,
                restored = self.counters.get(restore_type),
                "Finished restoring"
            );
        }

        let summary = self.counters.summary(start.elapsed());
        info!(
            elapsed_secs = summary.elapsed.as_secs_f64(),
            succeeded = outcome.is_ok(),
            "Restore finished"
        );
        println!("{}", summary);
        outcome.map(|_| summary)
    }
}
