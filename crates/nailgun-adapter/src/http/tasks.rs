/*
[INPUT]:  Task and cluster identifiers
[OUTPUT]: Task records, deletion results, and tasks spawned by deploy/stop
[POS]:    HTTP layer - background task endpoints
[UPDATE]: When adding task endpoints or changing deletion semantics
*/

use crate::http::{NailgunClient, Result};
use crate::types::Task;
use reqwest::Method;
use tracing::debug;

impl NailgunClient {
    /// Fetch a single task
    ///
    /// GET /api/tasks/{id}
    pub async fn get_task(&self, task_id: u64) -> Result<Task> {
        let endpoint = format!("/api/tasks/{}", task_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// List tasks, optionally scoped to a cluster
    ///
    /// GET /api/tasks?cluster_id={cluster_id}
    pub async fn list_tasks(&self, cluster_id: Option<u64>) -> Result<Vec<Task>> {
        let endpoint = match cluster_id {
            Some(id) => format!("/api/tasks?cluster_id={}", id),
            None => "/api/tasks".to_string(),
        };
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// Delete a task record
    ///
    /// DELETE /api/tasks/{id}
    /// Deleting a task that no longer exists succeeds.
    pub async fn delete_task(&self, task_id: u64) -> Result<()> {
        let endpoint = format!("/api/tasks/{}", task_id);
        let builder = self.request(Method::DELETE, &endpoint)?;
        match self.send_empty(&endpoint, builder).await {
            Err(err) if err.is_not_found() => {
                debug!(task_id, "task already deleted");
                Ok(())
            }
            other => other,
        }
    }

    /// Start deployment of the pending cluster changes
    ///
    /// PUT /api/clusters/{id}/changes
    pub async fn deploy_changes(&self, cluster_id: u64) -> Result<Task> {
        let endpoint = format!("/api/clusters/{}/changes", cluster_id);
        let builder = self.request(Method::PUT, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// Stop a running deployment
    ///
    /// PUT /api/clusters/{id}/stop_deployment
    pub async fn stop_deployment(&self, cluster_id: u64) -> Result<Task> {
        let endpoint = format!("/api/clusters/{}/stop_deployment", cluster_id);
        let builder = self.request(Method::PUT, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }
}
