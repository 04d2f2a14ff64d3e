/*
[INPUT]:  Dashboard requests for remote cluster state
[OUTPUT]: Async trait seam implemented by NailgunClient (and test fakes)
[POS]:    API abstraction - what the dashboard core consumes
[UPDATE]: When the dashboard needs a new remote operation
*/

use async_trait::async_trait;

use crate::http::{NailgunClient, Result};
use crate::types::{Cluster, ContrailSettings, Node, NodeUpdate, Release, Task};

/// Remote operations the cluster page depends on.
///
/// Every call either resolves with fresh attributes or fails with a
/// transport/API error; none of them block.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn get_task(&self, task_id: u64) -> Result<Task>;

    async fn list_tasks(&self, cluster_id: Option<u64>) -> Result<Vec<Task>>;

    /// Idempotent: deleting an already deleted task succeeds
    async fn delete_task(&self, task_id: u64) -> Result<()>;

    async fn get_cluster(&self, cluster_id: u64) -> Result<Cluster>;

    async fn list_nodes(&self, cluster_id: u64) -> Result<Vec<Node>>;

    async fn update_nodes(&self, updates: &[NodeUpdate]) -> Result<Vec<Node>>;

    async fn get_release(&self, release_id: u64) -> Result<Release>;

    async fn deploy_changes(&self, cluster_id: u64) -> Result<Task>;

    async fn stop_deployment(&self, cluster_id: u64) -> Result<Task>;

    async fn get_contrail_settings(&self, cluster_id: u64) -> Result<ContrailSettings>;

    async fn update_contrail_settings(
        &self,
        cluster_id: u64,
        settings: &ContrailSettings,
    ) -> Result<ContrailSettings>;

    async fn get_contrail_defaults(&self, cluster_id: u64) -> Result<ContrailSettings>;
}

#[async_trait]
impl ClusterApi for NailgunClient {
    async fn get_task(&self, task_id: u64) -> Result<Task> {
        NailgunClient::get_task(self, task_id).await
    }

    async fn list_tasks(&self, cluster_id: Option<u64>) -> Result<Vec<Task>> {
        NailgunClient::list_tasks(self, cluster_id).await
    }

    async fn delete_task(&self, task_id: u64) -> Result<()> {
        NailgunClient::delete_task(self, task_id).await
    }

    async fn get_cluster(&self, cluster_id: u64) -> Result<Cluster> {
        NailgunClient::get_cluster(self, cluster_id).await
    }

    async fn list_nodes(&self, cluster_id: u64) -> Result<Vec<Node>> {
        NailgunClient::list_nodes(self, cluster_id).await
    }

    async fn update_nodes(&self, updates: &[NodeUpdate]) -> Result<Vec<Node>> {
        NailgunClient::update_nodes(self, updates).await
    }

    async fn get_release(&self, release_id: u64) -> Result<Release> {
        NailgunClient::get_release(self, release_id).await
    }

    async fn deploy_changes(&self, cluster_id: u64) -> Result<Task> {
        NailgunClient::deploy_changes(self, cluster_id).await
    }

    async fn stop_deployment(&self, cluster_id: u64) -> Result<Task> {
        NailgunClient::stop_deployment(self, cluster_id).await
    }

    async fn get_contrail_settings(&self, cluster_id: u64) -> Result<ContrailSettings> {
        NailgunClient::get_contrail_settings(self, cluster_id).await
    }

    async fn update_contrail_settings(
        &self,
        cluster_id: u64,
        settings: &ContrailSettings,
    ) -> Result<ContrailSettings> {
        NailgunClient::update_contrail_settings(self, cluster_id, settings).await
    }

    async fn get_contrail_defaults(&self, cluster_id: u64) -> Result<ContrailSettings> {
        NailgunClient::get_contrail_defaults(self, cluster_id).await
    }
}
