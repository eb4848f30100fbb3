// Pre-flight checks against the target graph
use tracing::{error, info};

use crate::client::GraphClient;

pub async fn check_graph_connection(client: &dyn GraphClient, graph: &str) -> bool {
    match client.ping().await {
        Ok(_) => {
            info!(graph, "Successfully connected to graph");
            true
        }
        Err(e) => {
            error!(graph, error = %e, "Failed to connect to graph");
            false
        }
    }
}
