/*
[INPUT]:  Cluster model (tasks, nodes, release, pending changes)
[OUTPUT]: Deployment result banner and deployment control (progress / deploy button)
[POS]:    View - deployment area of the cluster page
[UPDATE]: When changing which tasks drive the deployment area
*/

use nailgun_adapter::{ReleaseState, Task, TaskGroup, TaskName, TaskStatus};

use crate::events::{Binding, ClusterAttribute, Topic, ViewAction, ViewSlot};
use crate::model::ClusterModel;
use crate::task_store::TaskFilter;
use crate::view::progress::ProgressDisplay;

/// Deployment tasks and release setup tasks of this cluster's release drive the area
fn drives_deployment_area(model: &ClusterModel, task: &Task) -> bool {
    match task.group() {
        Some(TaskGroup::Deployment) => true,
        Some(TaskGroup::ReleaseSetup) => task.release_id() == Some(model.cluster().release_id),
        _ => false,
    }
}

fn find_task(model: &ClusterModel, task_id: u64) -> Option<&Task> {
    model
        .tasks()
        .get(task_id)
        .or_else(|| model.all_tasks().get(task_id))
}

fn tracked_tasks(model: &ClusterModel) -> impl Iterator<Item = &Task> {
    model
        .tasks()
        .iter()
        .chain(model.all_tasks().iter().filter(|task| !model.tasks().contains(task.id)))
        .filter(|task| drives_deployment_area(model, task))
}

/// Human readable list of what a deploy would apply
pub fn change_summary(model: &ClusterModel) -> Vec<String> {
    let mut changes = Vec::new();
    let added = model.nodes().iter().filter(|node| node.pending_addition).count();
    let deleted = model.nodes().iter().filter(|node| node.pending_deletion).count();
    if added > 0 {
        changes.push(format!("{added} node(s) to add"));
    }
    if deleted > 0 {
        changes.push(format!("{deleted} node(s) to delete"));
    }
    for change in &model.cluster().changes {
        if change.node_id.is_none() && !changes.contains(&change.name) {
            changes.push(change.name.clone());
        }
    }
    changes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResultSnapshot {
    pub task_id: u64,
    pub task_name: TaskName,
    pub status: TaskStatus,
    pub message: Option<String>,
}

/// Outcome banner of the last deployment or failed release setup.
#[derive(Debug, Default)]
pub struct DeploymentResultView {
    snapshot: Option<DeploymentResultSnapshot>,
    render_count: usize,
}

impl DeploymentResultView {
    pub fn bindings(model: &ClusterModel) -> Vec<Binding> {
        let mut bindings = vec![
            Binding::new(Topic::TaskAdded, ViewSlot::DeploymentResult, ViewAction::OnNewTask),
            Binding::new(Topic::TaskRemoved, ViewSlot::DeploymentResult, ViewAction::Render),
        ];
        for task in tracked_tasks(model) {
            bindings.extend(Self::task_bindings(model, task));
        }
        bindings
    }

    pub fn task_bindings(model: &ClusterModel, task: &Task) -> Vec<Binding> {
        if !drives_deployment_area(model, task) {
            return Vec::new();
        }
        vec![Binding::new(
            Topic::TaskStatus(task.id),
            ViewSlot::DeploymentResult,
            ViewAction::Render,
        )]
    }

    /// Task shown in the banner: the deployment task, else an errored release setup
    pub fn displayed_task(model: &ClusterModel) -> Option<&Task> {
        model
            .task(&TaskFilter::group(TaskGroup::Deployment))
            .or_else(|| model.release_setup_task(TaskStatus::Error))
    }

    /// Bindings for a newly added task, rendering when it concerns this view
    pub fn on_new_task(&mut self, model: &ClusterModel, task_id: u64) -> Vec<Binding> {
        let Some(task) = find_task(model, task_id) else {
            return Vec::new();
        };
        let bindings = Self::task_bindings(model, task);
        if !bindings.is_empty() {
            self.render(model);
        }
        bindings
    }

    pub fn render(&mut self, model: &ClusterModel) {
        self.snapshot = Self::displayed_task(model)
            .filter(|task| !task.is_running())
            .map(|task| DeploymentResultSnapshot {
                task_id: task.id,
                task_name: task.name,
                status: task.status,
                message: task.message.clone(),
            });
        self.render_count += 1;
    }

    pub fn snapshot(&self) -> Option<&DeploymentResultSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentControlSnapshot {
    InProgress {
        task_id: u64,
        task_name: TaskName,
        progress: ProgressDisplay,
        stoppable: bool,
    },
    Idle {
        changes: Vec<String>,
        deploy_enabled: bool,
        release_state: Option<ReleaseState>,
    },
}

/// Progress bar while a deployment runs, deploy button otherwise.
#[derive(Debug)]
pub struct DeploymentControlView {
    snapshot: DeploymentControlSnapshot,
    render_count: usize,
    progress_updates: usize,
}

impl Default for DeploymentControlView {
    fn default() -> Self {
        Self {
            snapshot: DeploymentControlSnapshot::Idle {
                changes: Vec::new(),
                deploy_enabled: false,
                release_state: None,
            },
            render_count: 0,
            progress_updates: 0,
        }
    }
}

impl DeploymentControlView {
    pub fn bindings(model: &ClusterModel) -> Vec<Binding> {
        let slot = ViewSlot::DeploymentControl;
        let mut bindings = vec![
            Binding::new(Topic::Cluster(ClusterAttribute::Changes), slot, ViewAction::Render),
            Binding::new(Topic::Cluster(ClusterAttribute::Status), slot, ViewAction::Render),
            Binding::new(Topic::ReleaseState, slot, ViewAction::Render),
            Binding::new(Topic::NodesResized, slot, ViewAction::Render),
            Binding::new(Topic::NodeAdded, slot, ViewAction::OnNewNode),
            Binding::new(Topic::TaskAdded, slot, ViewAction::OnNewTask),
        ];
        for node in model.nodes() {
            bindings.push(Self::node_binding(node.id));
        }
        for task in tracked_tasks(model) {
            bindings.extend(Self::task_bindings(model, task));
        }
        bindings
    }

    pub fn task_bindings(model: &ClusterModel, task: &Task) -> Vec<Binding> {
        if !drives_deployment_area(model, task) {
            return Vec::new();
        }
        vec![
            Binding::new(Topic::TaskStatus(task.id), ViewSlot::DeploymentControl, ViewAction::Render),
            Binding::new(
                Topic::TaskProgress(task.id),
                ViewSlot::DeploymentControl,
                ViewAction::UpdateProgress,
            ),
        ]
    }

    fn node_binding(node_id: u64) -> Binding {
        Binding::new(Topic::NodePending(node_id), ViewSlot::DeploymentControl, ViewAction::Render)
    }

    /// Task whose progress is shown
    pub fn running_task(model: &ClusterModel) -> Option<&Task> {
        model
            .running_task(TaskGroup::Deployment)
            .or_else(|| model.release_setup_task(TaskStatus::Running))
    }

    pub fn on_new_task(&mut self, model: &ClusterModel, task_id: u64) -> Vec<Binding> {
        let Some(task) = find_task(model, task_id) else {
            return Vec::new();
        };
        let bindings = Self::task_bindings(model, task);
        if !bindings.is_empty() {
            self.render(model);
        }
        bindings
    }

    pub fn on_new_node(&mut self, model: &ClusterModel, node_id: u64) -> Vec<Binding> {
        self.render(model);
        vec![Self::node_binding(node_id)]
    }

    pub fn render(&mut self, model: &ClusterModel) {
        self.snapshot = match Self::running_task(model) {
            Some(task) => DeploymentControlSnapshot::InProgress {
                task_id: task.id,
                task_name: task.name,
                progress: ProgressDisplay::new(task.progress),
                stoppable: task.name == TaskName::Deploy,
            },
            None => {
                let changes = change_summary(model);
                let release_ready = model
                    .release()
                    .is_none_or(|release| release.is_deployable && release.state == ReleaseState::Available);
                DeploymentControlSnapshot::Idle {
                    deploy_enabled: !changes.is_empty() && release_ready,
                    changes,
                    release_state: model.release().map(|release| release.state),
                }
            }
        };
        self.render_count += 1;
    }

    /// Move the progress bar without a full render
    pub fn update_progress(&mut self, model: &ClusterModel) {
        if let DeploymentControlSnapshot::InProgress { task_id, progress, .. } = &mut self.snapshot
            && let Some(task) = find_task(model, *task_id)
        {
            *progress = ProgressDisplay::new(task.progress);
            self.progress_updates += 1;
        }
    }

    pub fn snapshot(&self) -> &DeploymentControlSnapshot {
        &self.snapshot
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn progress_updates(&self) -> usize {
        self.progress_updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cluster, node, release, task};
    use nailgun_adapter::ClusterChange;

    fn model_with(tasks: Vec<Task>) -> ClusterModel {
        let mut model = ClusterModel::new(cluster(1));
        model.apply_cluster_tasks(tasks);
        model
    }

    #[test]
    fn test_result_hidden_while_running() {
        let model = model_with(vec![task(7, TaskName::Deploy, TaskStatus::Running, 10)]);
        let mut view = DeploymentResultView::default();
        view.render(&model);
        assert!(view.snapshot().is_none());

        let model = model_with(vec![task(7, TaskName::Deploy, TaskStatus::Error, 60)]);
        view.render(&model);
        assert_eq!(view.snapshot().map(|s| s.status), Some(TaskStatus::Error));
        assert_eq!(view.render_count(), 2);
    }

    #[test]
    fn test_control_shows_progress_of_running_deployment() {
        let model = model_with(vec![task(7, TaskName::Deploy, TaskStatus::Running, 0)]);
        let mut view = DeploymentControlView::default();
        view.render(&model);

        match view.snapshot() {
            DeploymentControlSnapshot::InProgress { task_id, progress, stoppable, .. } => {
                assert_eq!(*task_id, 7);
                assert_eq!(progress.bar_width, 3);
                assert_eq!(progress.text(), "0%");
                assert!(*stoppable);
            }
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[test]
    fn test_update_progress_only_touches_bar() {
        let mut model = model_with(vec![task(7, TaskName::Deploy, TaskStatus::Running, 10)]);
        let mut view = DeploymentControlView::default();
        view.render(&model);

        model.apply_task(task(7, TaskName::Deploy, TaskStatus::Running, 47));
        view.update_progress(&model);

        assert_eq!(view.render_count(), 1);
        assert_eq!(view.progress_updates(), 1);
        assert!(matches!(
            view.snapshot(),
            DeploymentControlSnapshot::InProgress { progress, .. } if progress.text() == "47%"
        ));
    }

    #[test]
    fn test_deploy_enabled_with_changes_and_available_release() {
        let mut model = ClusterModel::new(cluster(1));
        model.apply_nodes(vec![node(1, true, false), node(2, false, false)]);
        model.apply_release(release(2, ReleaseState::Available));
        let mut view = DeploymentControlView::default();
        view.render(&model);
        assert!(matches!(
            view.snapshot(),
            DeploymentControlSnapshot::Idle { deploy_enabled: true, changes, .. } if changes == &vec!["1 node(s) to add".to_string()]
        ));

        model.apply_release(release(2, ReleaseState::Downloading));
        view.render(&model);
        assert!(matches!(
            view.snapshot(),
            DeploymentControlSnapshot::Idle { deploy_enabled: false, .. }
        ));
    }

    #[test]
    fn test_change_summary_skips_node_scoped_changes() {
        let mut updated = cluster(1);
        updated.changes = vec![
            ClusterChange { name: "attributes".to_string(), node_id: None },
            ClusterChange { name: "disks".to_string(), node_id: Some(3) },
            ClusterChange { name: "attributes".to_string(), node_id: None },
        ];
        let model = ClusterModel::new(updated);
        assert_eq!(change_summary(&model), vec!["attributes".to_string()]);
    }

    #[test]
    fn test_only_deployment_area_tasks_are_bound() {
        let mut setup = task(9, TaskName::ReleaseSetup, TaskStatus::Running, 5);
        setup.cluster = None;
        setup.release = Some(2);
        let mut model = model_with(vec![
            task(7, TaskName::Deploy, TaskStatus::Running, 10),
            task(8, TaskName::VerifyNetworks, TaskStatus::Running, 0),
        ]);
        model.apply_all_tasks(vec![setup]);

        let bindings = DeploymentResultView::bindings(&model);
        let status_topics: Vec<Topic> = bindings
            .iter()
            .map(|binding| binding.topic)
            .filter(|topic| matches!(topic, Topic::TaskStatus(_)))
            .collect();
        assert_eq!(status_topics, vec![Topic::TaskStatus(7), Topic::TaskStatus(9)]);
    }
}
