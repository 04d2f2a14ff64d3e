/*
[INPUT]:  Node modifications requested by the dashboard
[OUTPUT]: Serializable request bodies
[POS]:    Data layer - request payloads
[UPDATE]: When adding new write endpoints
*/

use serde::{Deserialize, Serialize};

use super::models::Node;

/// Partial node update sent to `PUT /api/nodes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub id: u64,
    pub cluster_id: Option<u64>,
    pub pending_addition: bool,
    pub pending_deletion: bool,
    pub pending_roles: Vec<String>,
}

impl NodeUpdate {
    /// Update that reverts whatever the node has pending.
    ///
    /// Nodes pending addition leave the cluster; nodes pending deletion stay.
    pub fn discard_pending(node: &Node) -> Option<Self> {
        if node.pending_addition {
            Some(Self {
                id: node.id,
                cluster_id: None,
                pending_addition: false,
                pending_deletion: false,
                pending_roles: Vec::new(),
            })
        } else if node.pending_deletion {
            Some(Self {
                id: node.id,
                cluster_id: node.cluster,
                pending_addition: false,
                pending_deletion: false,
                pending_roles: node.pending_roles.clone(),
            })
        } else {
            None
        }
    }
}
