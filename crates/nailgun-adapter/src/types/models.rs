/*
[INPUT]:  Nailgun API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ClusterStatus, NodeStatus, ReleaseState, TaskGroup, TaskName, TaskStatus};

/// Default BGP AS number for a fresh contrail configuration
pub const DEFAULT_AS_NUMBER: u32 = 64512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: TaskName,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Task {
    pub fn group(&self) -> Option<TaskGroup> {
        self.name.group()
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Release the task refers to.
    ///
    /// Release setup tasks report it under `result.release_info.release_id`.
    pub fn release_id(&self) -> Option<u64> {
        self.release.or_else(|| {
            self.result
                .as_ref()?
                .get("release_info")?
                .get("release_id")?
                .as_u64()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub status: NodeStatus,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub pending_addition: bool,
    #[serde(default)]
    pub pending_deletion: bool,
    #[serde(default)]
    pub cluster: Option<u64>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub pending_roles: Vec<String>,
}

impl Node {
    pub fn has_pending_changes(&self) -> bool {
        self.pending_addition || self.pending_deletion
    }
}

/// Pending change recorded on a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterChange {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    pub name: String,
    pub status: ClusterStatus,
    pub release_id: u64,
    #[serde(default)]
    pub is_customized: bool,
    #[serde(default)]
    pub changes: Vec<ClusterChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_provider: Option<String>,
}

impl Cluster {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub state: ReleaseState,
    #[serde(default = "default_deployable")]
    pub is_deployable: bool,
}

fn default_deployable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WanGateway {
    pub hostname: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrailAttributes {
    #[serde(default = "default_as_number")]
    pub as_number: u32,
    #[serde(default)]
    pub wan_gateways: Vec<WanGateway>,
}

impl Default for ContrailAttributes {
    fn default() -> Self {
        Self {
            as_number: DEFAULT_AS_NUMBER,
            wan_gateways: Vec::new(),
        }
    }
}

fn default_as_number() -> u32 {
    DEFAULT_AS_NUMBER
}

/// Body of the cluster contrail endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrailSettings {
    pub editable: ContrailAttributes,
}
