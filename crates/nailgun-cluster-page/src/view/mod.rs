/*
[INPUT]:  Cluster model and routed reactions
[OUTPUT]: Sub-views of the cluster page and the aggregate page snapshot
[POS]:    View layer
[UPDATE]: When adding a sub-view
*/

pub mod contrail;
pub mod customization;
pub mod deployment;
pub mod progress;
pub mod tabs;

use nailgun_adapter::ClusterStatus;

pub use contrail::{ContrailSnapshot, ContrailTab, ControlState};
pub use customization::CustomizationMessageView;
pub use deployment::{
    DeploymentControlSnapshot, DeploymentControlView, DeploymentResultSnapshot,
    DeploymentResultView,
};
pub use progress::{MIN_VISIBLE_PROGRESS, ProgressDisplay};
pub use tabs::{TabKind, TabSnapshot, TabView};

/// Everything the page currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub cluster_id: u64,
    pub title: String,
    pub cluster_status: ClusterStatus,
    pub tabs: Vec<TabKind>,
    pub active_tab: TabKind,
    pub customization_message: Option<&'static str>,
    pub deployment_result: Option<DeploymentResultSnapshot>,
    pub deployment_control: DeploymentControlSnapshot,
    pub tab: TabSnapshot,
}
