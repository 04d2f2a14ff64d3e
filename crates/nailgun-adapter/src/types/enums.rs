/*
[INPUT]:  Nailgun API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new task names are added
*/

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Ready,
    Error,
}

impl TaskStatus {
    pub fn is_running(self) -> bool {
        self == TaskStatus::Running
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TaskStatus::Running => "running",
            TaskStatus::Ready => "ready",
            TaskStatus::Error => "error",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskName {
    Deploy,
    Deployment,
    Provision,
    StopDeployment,
    ResetEnvironment,
    Update,
    VerifyNetworks,
    CheckNetworks,
    CheckBeforeDeployment,
    ReleaseSetup,
    #[serde(other)]
    Unknown,
}

impl TaskName {
    /// Group a task name belongs to, if any
    pub fn group(self) -> Option<TaskGroup> {
        match self {
            TaskName::Deploy
            | TaskName::StopDeployment
            | TaskName::ResetEnvironment
            | TaskName::Update => Some(TaskGroup::Deployment),
            TaskName::VerifyNetworks | TaskName::CheckNetworks => Some(TaskGroup::Network),
            TaskName::ReleaseSetup => Some(TaskGroup::ReleaseSetup),
            TaskName::Deployment
            | TaskName::Provision
            | TaskName::CheckBeforeDeployment
            | TaskName::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Deploy => "deploy",
            TaskName::Deployment => "deployment",
            TaskName::Provision => "provision",
            TaskName::StopDeployment => "stop_deployment",
            TaskName::ResetEnvironment => "reset_environment",
            TaskName::Update => "update",
            TaskName::VerifyNetworks => "verify_networks",
            TaskName::CheckNetworks => "check_networks",
            TaskName::CheckBeforeDeployment => "check_before_deployment",
            TaskName::ReleaseSetup => "release_setup",
            TaskName::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task groups used by the dashboard to decide what to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskGroup {
    Deployment,
    Network,
    ReleaseSetup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    New,
    Deployment,
    Stopped,
    Operational,
    Error,
    Remove,
    Update,
    UpdateError,
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ClusterStatus::New => "new",
            ClusterStatus::Deployment => "deployment",
            ClusterStatus::Stopped => "stopped",
            ClusterStatus::Operational => "operational",
            ClusterStatus::Error => "error",
            ClusterStatus::Remove => "remove",
            ClusterStatus::Update => "update",
            ClusterStatus::UpdateError => "update_error",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    NotAvailable,
    Downloading,
    Error,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Discover,
    Provisioning,
    Provisioned,
    Deploying,
    Ready,
    Error,
    #[serde(other)]
    Unknown,
}
