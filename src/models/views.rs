use chrono::{DateTime, Utc};
use serde::Serialize;

use super::resources::SnapshotState;

/// Last failure recorded by the store, kept for an error banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub operation: String,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorInfo {
    pub fn new(operation: &str, err: &impl std::fmt::Display) -> Self {
        Self {
            operation: operation.to_string(),
            message: format!("Failed to {}: {}", operation.replace('_', " "), err),
            occurred_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterSummary {
    pub cluster: Option<String>,
    pub namespace: String,
    pub pod_count: usize,
    pub running_pods: usize,
    pub deployment_count: usize,
    pub service_count: usize,
    pub node_count: usize,
    pub ready_nodes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub selected_cluster: Option<String>,
    pub selected_namespace: String,
    pub search_term: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_display: String,
    pub snapshot_state: SnapshotState,
    pub last_error: Option<ErrorInfo>,
    pub using_fallback_data: bool,
    pub refreshing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterList {
    pub clusters: Vec<String>,
    pub selected: Option<String>,
}
