/*
[INPUT]:  Tab name from navigation, cluster model
[OUTPUT]: TabKind closed set and the active tab view
[POS]:    View - tab registry of the cluster page
[UPDATE]: When adding a tab
*/

use std::fmt;
use std::str::FromStr;

use nailgun_adapter::NodeStatus;
use thiserror::Error;

use crate::events::{Binding, Topic, ViewAction, ViewSlot};
use crate::model::ClusterModel;
use crate::view::contrail::{ContrailSnapshot, ContrailTab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    Nodes,
    Network,
    Contrail,
    Settings,
    Logs,
    HealthCheck,
    Actions,
}

impl TabKind {
    /// Navigation order
    pub const ALL: [TabKind; 7] = [
        TabKind::Nodes,
        TabKind::Network,
        TabKind::Contrail,
        TabKind::Settings,
        TabKind::Logs,
        TabKind::HealthCheck,
        TabKind::Actions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TabKind::Nodes => "nodes",
            TabKind::Network => "network",
            TabKind::Contrail => "contrail",
            TabKind::Settings => "settings",
            TabKind::Logs => "logs",
            TabKind::HealthCheck => "healthcheck",
            TabKind::Actions => "actions",
        }
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tab: {0}")]
pub struct UnknownTab(pub String);

impl FromStr for TabKind {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TabKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub id: u64,
    pub name: String,
    pub status: NodeStatus,
    pub online: bool,
    pub pending: Option<&'static str>,
}

/// Node list of the cluster
#[derive(Debug, Default)]
pub struct NodesTab {
    rows: Vec<NodeRow>,
    render_count: usize,
}

impl NodesTab {
    fn bindings(model: &ClusterModel) -> Vec<Binding> {
        let mut bindings = vec![
            Binding::new(Topic::NodesResized, ViewSlot::ActiveTab, ViewAction::Render),
            Binding::new(Topic::NodeAdded, ViewSlot::ActiveTab, ViewAction::OnNewNode),
        ];
        bindings.extend(model.nodes().iter().map(|node| Self::node_binding(node.id)));
        bindings
    }

    fn node_binding(node_id: u64) -> Binding {
        Binding::new(Topic::NodePending(node_id), ViewSlot::ActiveTab, ViewAction::Render)
    }

    fn render(&mut self, model: &ClusterModel) {
        self.rows = model
            .nodes()
            .iter()
            .map(|node| NodeRow {
                id: node.id,
                name: node.name.clone(),
                status: node.status,
                online: node.online,
                pending: if node.pending_addition {
                    Some("pending addition")
                } else if node.pending_deletion {
                    Some("pending deletion")
                } else {
                    None
                },
            })
            .collect();
        self.render_count += 1;
    }
}

/// Tab whose forms are not handled here
#[derive(Debug)]
pub struct PassiveTab {
    kind: TabKind,
    render_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabSnapshot {
    Nodes(Vec<NodeRow>),
    Contrail(ContrailSnapshot),
    Passive(TabKind),
}

#[derive(Debug)]
pub enum TabView {
    Nodes(NodesTab),
    Contrail(ContrailTab),
    Passive(PassiveTab),
}

impl TabView {
    pub fn build(kind: TabKind, model: &ClusterModel) -> Self {
        match kind {
            TabKind::Nodes => TabView::Nodes(NodesTab::default()),
            TabKind::Contrail => TabView::Contrail(ContrailTab::new(model)),
            TabKind::Network
            | TabKind::Settings
            | TabKind::Logs
            | TabKind::HealthCheck
            | TabKind::Actions => TabView::Passive(PassiveTab { kind, render_count: 0 }),
        }
    }

    pub fn kind(&self) -> TabKind {
        match self {
            TabView::Nodes(_) => TabKind::Nodes,
            TabView::Contrail(_) => TabKind::Contrail,
            TabView::Passive(tab) => tab.kind,
        }
    }

    pub fn bindings(&self, model: &ClusterModel) -> Vec<Binding> {
        match self {
            TabView::Nodes(_) => NodesTab::bindings(model),
            TabView::Contrail(_) => ContrailTab::bindings(model),
            TabView::Passive(_) => Vec::new(),
        }
    }

    pub fn render(&mut self, model: &ClusterModel) {
        match self {
            TabView::Nodes(tab) => tab.render(model),
            TabView::Contrail(tab) => tab.render(model),
            TabView::Passive(tab) => tab.render_count += 1,
        }
    }

    pub fn on_new_task(&mut self, model: &ClusterModel, task_id: u64) -> Vec<Binding> {
        match self {
            TabView::Contrail(tab) => tab.on_new_task(model, task_id),
            _ => Vec::new(),
        }
    }

    pub fn on_new_node(&mut self, model: &ClusterModel, node_id: u64) -> Vec<Binding> {
        match self {
            TabView::Nodes(tab) => {
                tab.render(model);
                vec![NodesTab::node_binding(node_id)]
            }
            _ => Vec::new(),
        }
    }

    pub fn has_changes(&self) -> bool {
        match self {
            TabView::Contrail(tab) => tab.has_changes(),
            _ => false,
        }
    }

    pub fn revert_changes(&mut self, model: &ClusterModel) {
        if let TabView::Contrail(tab) = self {
            tab.revert_changes(model);
        }
    }

    pub fn snapshot(&self) -> TabSnapshot {
        match self {
            TabView::Nodes(tab) => TabSnapshot::Nodes(tab.rows.clone()),
            TabView::Contrail(tab) => TabSnapshot::Contrail(tab.snapshot().clone()),
            TabView::Passive(tab) => TabSnapshot::Passive(tab.kind),
        }
    }

    pub fn render_count(&self) -> usize {
        match self {
            TabView::Nodes(tab) => tab.render_count,
            TabView::Contrail(tab) => tab.render_count(),
            TabView::Passive(tab) => tab.render_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cluster, node};
    use rstest::rstest;

    #[rstest]
    #[case("nodes", TabKind::Nodes)]
    #[case("contrail", TabKind::Contrail)]
    #[case("HealthCheck", TabKind::HealthCheck)]
    #[case(" actions ", TabKind::Actions)]
    fn test_parse_tab(#[case] name: &str, #[case] expected: TabKind) {
        assert_eq!(name.parse::<TabKind>(), Ok(expected));
    }

    #[test]
    fn test_unknown_tab_rejected() {
        assert_eq!("vmware".parse::<TabKind>(), Err(UnknownTab("vmware".to_string())));
    }

    #[test]
    fn test_build_matches_kind() {
        let model = ClusterModel::new(cluster(1));
        for kind in TabKind::ALL {
            assert_eq!(TabView::build(kind, &model).kind(), kind);
        }
    }

    #[test]
    fn test_nodes_tab_lists_pending_state() {
        let mut model = ClusterModel::new(cluster(1));
        model.apply_nodes(vec![node(1, true, false), node(2, false, true), node(3, false, false)]);
        let mut tab = TabView::build(TabKind::Nodes, &model);
        tab.render(&model);

        let TabSnapshot::Nodes(rows) = tab.snapshot() else {
            panic!("expected node rows");
        };
        let pending: Vec<_> = rows.iter().map(|row| row.pending).collect();
        assert_eq!(pending, vec![Some("pending addition"), Some("pending deletion"), None]);
        assert!(!tab.has_changes());
    }
}
