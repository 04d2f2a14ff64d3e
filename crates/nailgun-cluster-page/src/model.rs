/*
[INPUT]:  Cluster, node, release, task, and contrail records fetched from the API
[OUTPUT]: Cluster aggregate with change detection and qualifying-task queries
[POS]:    Model layer - single source of truth for the cluster page
[UPDATE]: When views need new derived state or new change events
*/

use nailgun_adapter::{
    Cluster, ContrailSettings, Node, Release, Task, TaskGroup, TaskName, TaskStatus,
};

use crate::events::{ClusterAttribute, ModelEvent};
use crate::task_store::{TaskFilter, TaskStore};

/// Cluster aggregate as last seen from the server.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    cluster: Cluster,
    release: Option<Release>,
    nodes: Vec<Node>,
    tasks: TaskStore,
    all_tasks: TaskStore,
    contrail: Option<ContrailSettings>,
}

impl ClusterModel {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            release: None,
            nodes: Vec::new(),
            tasks: TaskStore::new(),
            all_tasks: TaskStore::new(),
            contrail: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.cluster.id
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn release(&self) -> Option<&Release> {
        self.release.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Tasks of this cluster
    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Every task known to the dashboard, including release setup tasks
    pub fn all_tasks(&self) -> &TaskStore {
        &self.all_tasks
    }

    pub fn contrail(&self) -> Option<&ContrailSettings> {
        self.contrail.as_ref()
    }

    pub fn set_contrail(&mut self, settings: ContrailSettings) {
        self.contrail = Some(settings);
    }

    pub fn task(&self, filter: &TaskFilter) -> Option<&Task> {
        self.tasks.find_task(filter)
    }

    pub fn running_task(&self, group: TaskGroup) -> Option<&Task> {
        self.task(&TaskFilter::group(group).status(TaskStatus::Running))
    }

    pub fn running_task_named(&self, name: TaskName) -> Option<&Task> {
        self.task(&TaskFilter::name(name).status(TaskStatus::Running))
    }

    /// Release setup task for this cluster's release in the given status
    pub fn release_setup_task(&self, status: TaskStatus) -> Option<&Task> {
        let filter = TaskFilter::group(TaskGroup::ReleaseSetup)
            .status(status)
            .release(self.cluster.release_id);
        self.all_tasks.find_task(&filter)
    }

    /// Whether the poll scheduler should stay armed
    pub fn has_qualifying_task(&self) -> bool {
        let running = TaskFilter::groups([TaskGroup::Deployment, TaskGroup::Network])
            .status(TaskStatus::Running);
        self.task(&running).is_some() || self.release_setup_task(TaskStatus::Running).is_some()
    }

    pub fn pending_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.has_pending_changes())
    }

    pub fn apply_cluster(&mut self, cluster: Cluster) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        let old = &self.cluster;
        if old.name != cluster.name {
            events.push(cluster_event(ClusterAttribute::Name));
        }
        if old.status != cluster.status {
            events.push(cluster_event(ClusterAttribute::Status));
        }
        if old.is_customized != cluster.is_customized {
            events.push(cluster_event(ClusterAttribute::IsCustomized));
        }
        if old.changes != cluster.changes {
            events.push(cluster_event(ClusterAttribute::Changes));
        }
        self.cluster = cluster;
        events
    }

    pub fn apply_nodes(&mut self, nodes: Vec<Node>) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        for node in &nodes {
            match self.nodes.iter().find(|existing| existing.id == node.id) {
                Some(existing) => {
                    if existing.pending_addition != node.pending_addition
                        || existing.pending_deletion != node.pending_deletion
                    {
                        events.push(ModelEvent::NodePendingChanged { node_id: node.id });
                    }
                }
                None => events.push(ModelEvent::NodeAdded { node_id: node.id }),
            }
        }
        if nodes.len() != self.nodes.len() {
            events.push(ModelEvent::NodesResized { count: nodes.len() });
        }
        self.nodes = nodes;
        events
    }

    pub fn apply_release(&mut self, release: Release) -> Vec<ModelEvent> {
        let changed = self
            .release
            .as_ref()
            .is_none_or(|old| old.state != release.state);
        self.release = Some(release);
        if changed {
            vec![ModelEvent::ReleaseStateChanged]
        } else {
            Vec::new()
        }
    }

    /// Apply a single fetched task to whichever collections track it
    pub fn apply_task(&mut self, task: Task) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        if self.tasks.contains(task.id) || task.cluster == Some(self.cluster.id) {
            merge(&mut events, self.tasks.upsert(task.clone()));
        }
        if self.all_tasks.contains(task.id) {
            merge(&mut events, self.all_tasks.upsert(task));
        }
        events
    }

    pub fn apply_cluster_tasks(&mut self, tasks: Vec<Task>) -> Vec<ModelEvent> {
        self.tasks.replace_all(tasks)
    }

    pub fn apply_all_tasks(&mut self, tasks: Vec<Task>) -> Vec<ModelEvent> {
        self.all_tasks.replace_all(tasks)
    }

    /// Forget a task everywhere, emitting a single removal event
    pub fn remove_task(&mut self, task_id: u64) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        if let Some((_, event)) = self.tasks.remove(task_id) {
            merge(&mut events, vec![event]);
        }
        if let Some((_, event)) = self.all_tasks.remove(task_id) {
            merge(&mut events, vec![event]);
        }
        events
    }

    /// Take finished cluster tasks matching the filter out of the model
    pub fn take_finished_tasks(&mut self, filter: &TaskFilter, silent: bool) -> (Vec<Task>, Vec<ModelEvent>) {
        self.tasks.take_finished(filter, silent)
    }
}

fn cluster_event(attribute: ClusterAttribute) -> ModelEvent {
    ModelEvent::ClusterChanged { attribute }
}

fn merge(into: &mut Vec<ModelEvent>, events: Vec<ModelEvent>) {
    for event in events {
        if !into.contains(&event) {
            into.push(event);
        }
    }
}
