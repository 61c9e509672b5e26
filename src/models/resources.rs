use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

// Flattened resource records, one row per object, as the dashboard backend
// reports them. Keys without a typed field are kept in `extra` and written
// back out with the row. A null value reads as the field's default.

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

pub trait ClusterResource {
    fn name(&self) -> &str;

    /// `None` for cluster-scoped kinds.
    fn namespace(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pods,
    Deployments,
    Services,
    Nodes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Pods,
        ResourceKind::Deployments,
        ResourceKind::Services,
        ResourceKind::Nodes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pods => "pods",
            ResourceKind::Deployments => "deployments",
            ResourceKind::Services => "services",
            ResourceKind::Nodes => "nodes",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pods" | "pod" => Ok(ResourceKind::Pods),
            "deployments" | "deployment" => Ok(ResourceKind::Deployments),
            "services" | "service" => Ok(ResourceKind::Services),
            "nodes" | "node" => Ok(ResourceKind::Nodes),
            _ => Err(StoreError::UnknownKind(s.to_string())),
        }
    }
}

// --- Pod ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PodRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub restarts: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_usage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_usage: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PodRecord {
    pub fn is_running(&self) -> bool {
        self.status == "Running"
    }
}

impl ClusterResource for PodRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }
}

// --- Deployment ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeploymentRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desired_replicas: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_replicas: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready_replicas: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterResource for DeploymentRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }
}

// --- Service ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterResource for ServiceRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }
}

// --- Node ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instance_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_capacity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_capacity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_percent: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_percent: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    pub fn is_ready(&self) -> bool {
        self.status == "Ready"
    }
}

impl ClusterResource for NodeRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        None
    }
}

// --- Record ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceRecord {
    Pod(PodRecord),
    Deployment(DeploymentRecord),
    Service(ServiceRecord),
    Node(NodeRecord),
}

impl ClusterResource for ResourceRecord {
    fn name(&self) -> &str {
        match self {
            ResourceRecord::Pod(r) => r.name(),
            ResourceRecord::Deployment(r) => r.name(),
            ResourceRecord::Service(r) => r.name(),
            ResourceRecord::Node(r) => r.name(),
        }
    }

    fn namespace(&self) -> Option<&str> {
        match self {
            ResourceRecord::Pod(r) => r.namespace(),
            ResourceRecord::Deployment(r) => r.namespace(),
            ResourceRecord::Service(r) => r.namespace(),
            ResourceRecord::Node(r) => r.namespace(),
        }
    }
}

// --- Snapshot ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceSnapshot {
    #[serde(default)]
    pub pods: Vec<PodRecord>,
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Completion time of the fetch that produced this snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ResourceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
            && self.deployments.is_empty()
            && self.services.is_empty()
            && self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    NeverFetched,
    Empty,
    Populated,
}

impl SnapshotState {
    pub fn of(snapshot: &ResourceSnapshot) -> Self {
        if snapshot.timestamp.is_none() {
            SnapshotState::NeverFetched
        } else if snapshot.is_empty() {
            SnapshotState::Empty
        } else {
            SnapshotState::Populated
        }
    }
}
