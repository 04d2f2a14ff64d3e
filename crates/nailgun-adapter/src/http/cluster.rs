/*
[INPUT]:  Cluster, release, and node identifiers
[OUTPUT]: Cluster attributes, node lists, release records
[POS]:    HTTP layer - cluster aggregate endpoints
[UPDATE]: When adding cluster-scoped endpoints
*/

use crate::http::{NailgunClient, Result};
use crate::types::{Cluster, Node, NodeUpdate, Release};
use reqwest::Method;

impl NailgunClient {
    /// Fetch cluster attributes
    ///
    /// GET /api/clusters/{id}
    pub async fn get_cluster(&self, cluster_id: u64) -> Result<Cluster> {
        let endpoint = format!("/api/clusters/{}", cluster_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// List nodes assigned to a cluster
    ///
    /// GET /api/nodes?cluster_id={cluster_id}
    pub async fn list_nodes(&self, cluster_id: u64) -> Result<Vec<Node>> {
        let endpoint = format!("/api/nodes?cluster_id={}", cluster_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// Bulk update nodes
    ///
    /// PUT /api/nodes
    pub async fn update_nodes(&self, updates: &[NodeUpdate]) -> Result<Vec<Node>> {
        let endpoint = "/api/nodes";
        let builder = self.request(Method::PUT, endpoint)?.json(updates);
        self.send_json(endpoint, builder).await
    }

    /// Fetch release attributes
    ///
    /// GET /api/releases/{id}
    pub async fn get_release(&self, release_id: u64) -> Result<Release> {
        let endpoint = format!("/api/releases/{}", release_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }
}
