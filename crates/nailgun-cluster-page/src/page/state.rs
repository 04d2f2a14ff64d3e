/*
[INPUT]:  Model events from fetch reconciliation, navigation requests
[OUTPUT]: Page state: model, subscriptions, sub-views, active tab
[POS]:    Page layer - state guarded by the page mutex
[UPDATE]: When adding sub-views or reaction kinds
*/

use nailgun_adapter::{ContrailSettings, TaskGroup, TaskStatus};
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::events::{EventRouter, ModelEvent, Reaction, Topic, ViewAction, ViewSlot};
use crate::model::ClusterModel;
use crate::task_store::TaskFilter;
use crate::view::{
    ContrailTab, CustomizationMessageView, DeploymentControlView, DeploymentResultView,
    PageSnapshot, TabKind, TabView,
};

/// Model plus the views rendered from it.
///
/// Views only learn about model changes through the router; every mutation of
/// the model goes through [`PageState::update`] so the resulting events reach
/// the subscribed views.
#[derive(Debug)]
pub struct PageState {
    model: ClusterModel,
    router: EventRouter,
    customization: CustomizationMessageView,
    deployment_result: DeploymentResultView,
    deployment_control: DeploymentControlView,
    tab: TabView,
    disposed: bool,
}

impl PageState {
    pub fn new(model: ClusterModel, active_tab: TabKind) -> Self {
        let tab = TabView::build(active_tab, &model);
        let mut state = Self {
            model,
            router: EventRouter::new(),
            customization: CustomizationMessageView::default(),
            deployment_result: DeploymentResultView::default(),
            deployment_control: DeploymentControlView::default(),
            tab,
            disposed: false,
        };
        state.render();
        state
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn tab(&self) -> &TabView {
        &self.tab
    }

    pub fn active_tab(&self) -> TabKind {
        self.tab.kind()
    }

    pub fn customization(&self) -> &CustomizationMessageView {
        &self.customization
    }

    pub fn deployment_result(&self) -> &DeploymentResultView {
        &self.deployment_result
    }

    pub fn deployment_control(&self) -> &DeploymentControlView {
        &self.deployment_control
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Rebuild subscriptions and render every sub-view.
    ///
    /// Running it twice leaves the same bindings and the same snapshot.
    pub fn render(&mut self) {
        if self.disposed {
            return;
        }
        self.router.clear();
        self.router.bind_all(CustomizationMessageView::bindings());
        self.router.bind_all(DeploymentResultView::bindings(&self.model));
        self.router.bind_all(DeploymentControlView::bindings(&self.model));
        self.router.bind_all(self.tab.bindings(&self.model));

        self.customization.render(&self.model);
        self.deployment_result.render(&self.model);
        self.deployment_control.render(&self.model);
        self.tab.render(&self.model);

        self.suspend_during(TaskGroup::Deployment);
    }

    /// Mutate the model and dispatch the resulting events
    pub fn update<T>(&mut self, f: impl FnOnce(&mut ClusterModel) -> (T, Vec<ModelEvent>)) -> T {
        let (value, events) = f(&mut self.model);
        self.dispatch(events);
        value
    }

    pub fn apply(&mut self, f: impl FnOnce(&mut ClusterModel) -> Vec<ModelEvent>) {
        self.update(|model| ((), f(model)));
    }

    fn dispatch(&mut self, events: Vec<ModelEvent>) {
        if self.disposed {
            return;
        }
        for event in events {
            for reaction in self.router.route(&event) {
                self.react(reaction);
            }
        }
    }

    fn react(&mut self, reaction: Reaction) {
        let model = &self.model;
        let subject = reaction.event.subject_id();
        let bindings = match (reaction.slot, reaction.action) {
            (ViewSlot::CustomizationMessage, _) => {
                self.customization.render(model);
                Vec::new()
            }
            (ViewSlot::DeploymentResult, ViewAction::OnNewTask) => subject
                .map(|task_id| self.deployment_result.on_new_task(model, task_id))
                .unwrap_or_default(),
            (ViewSlot::DeploymentResult, _) => {
                self.deployment_result.render(model);
                Vec::new()
            }
            (ViewSlot::DeploymentControl, ViewAction::OnNewTask) => subject
                .map(|task_id| self.deployment_control.on_new_task(model, task_id))
                .unwrap_or_default(),
            (ViewSlot::DeploymentControl, ViewAction::OnNewNode) => subject
                .map(|node_id| self.deployment_control.on_new_node(model, node_id))
                .unwrap_or_default(),
            (ViewSlot::DeploymentControl, ViewAction::UpdateProgress) => {
                self.deployment_control.update_progress(model);
                Vec::new()
            }
            (ViewSlot::DeploymentControl, ViewAction::Render) => {
                self.deployment_control.render(model);
                Vec::new()
            }
            (ViewSlot::ActiveTab, ViewAction::OnNewTask) => subject
                .map(|task_id| self.tab.on_new_task(model, task_id))
                .unwrap_or_default(),
            (ViewSlot::ActiveTab, ViewAction::OnNewNode) => subject
                .map(|node_id| self.tab.on_new_node(model, node_id))
                .unwrap_or_default(),
            (ViewSlot::ActiveTab, _) => {
                self.tab.render(model);
                Vec::new()
            }
        };
        self.router.bind_all(bindings);
    }

    fn running_task_id(&self, group: TaskGroup) -> Option<u64> {
        match group {
            TaskGroup::ReleaseSetup => self.model.release_setup_task(TaskStatus::Running),
            _ => self.model.running_task(group),
        }
        .map(|task| task.id)
    }

    /// Detach status-driven renders of the running task of `group` so that
    /// progress updates are not interrupted by full re-renders.
    pub fn suspend_during(&mut self, group: TaskGroup) -> usize {
        let Some(task_id) = self.running_task_id(group) else {
            return 0;
        };
        let removed = self.router.unbind_where(|binding| {
            binding.topic == Topic::TaskStatus(task_id)
                && binding.action == ViewAction::Render
                && matches!(binding.slot, ViewSlot::DeploymentResult | ViewSlot::DeploymentControl)
        });
        if removed > 0 {
            debug!(task_id, removed, "Suspended status renders while task runs");
        }
        removed
    }

    /// Re-attach what `suspend_during` detached, rendering both views
    pub fn rebind_after(&mut self, group: TaskGroup) -> usize {
        let filter = match group {
            TaskGroup::ReleaseSetup => {
                TaskFilter::group(group).release(self.model.cluster().release_id)
            }
            _ => TaskFilter::group(group),
        };
        let task_id = match group {
            TaskGroup::ReleaseSetup => self.model.all_tasks().find_task(&filter),
            _ => self.model.task(&filter),
        }
        .map(|task| task.id);
        let Some(task_id) = task_id else {
            return 0;
        };

        let mut bindings = self.deployment_result.on_new_task(&self.model, task_id);
        bindings.extend(self.deployment_control.on_new_task(&self.model, task_id));
        let count = bindings.len();
        self.router.bind_all(bindings);
        debug!(task_id, count, "Rebound status renders");
        count
    }

    /// Replace the active tab; the old tab's subscriptions go away with it
    pub fn switch_tab(&mut self, kind: TabKind) {
        if self.disposed || self.tab.kind() == kind {
            return;
        }
        self.router.unbind_slot(ViewSlot::ActiveTab);
        self.tab = TabView::build(kind, &self.model);
        self.router.bind_all(self.tab.bindings(&self.model));
        self.tab.render(&self.model);
    }

    pub fn revert_tab_changes(&mut self) {
        self.tab.revert_changes(&self.model);
    }

    /// Active contrail tab together with the model it renders from
    pub fn contrail(&mut self) -> PageResult<(&mut ContrailTab, &ClusterModel)> {
        match &mut self.tab {
            TabView::Contrail(tab) => Ok((tab, &self.model)),
            _ => Err(PageError::TabNotActive {
                expected: TabKind::Contrail,
            }),
        }
    }

    /// Store freshly fetched contrail settings as last-synced
    pub fn contrail_loaded(&mut self, settings: ContrailSettings) {
        self.model.set_contrail(settings.clone());
        if let TabView::Contrail(tab) = &mut self.tab {
            tab.set_initial_data(settings.editable);
            tab.render(&self.model);
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let cluster = self.model.cluster();
        PageSnapshot {
            cluster_id: cluster.id,
            title: cluster.name.clone(),
            cluster_status: cluster.status,
            tabs: TabKind::ALL.to_vec(),
            active_tab: self.tab.kind(),
            customization_message: self.customization.message(),
            deployment_result: self.deployment_result.snapshot().cloned(),
            deployment_control: self.deployment_control.snapshot().clone(),
            tab: self.tab.snapshot(),
        }
    }

    /// Drop every subscription; later events reach no view
    pub fn dispose(&mut self) {
        self.router.clear();
        self.disposed = true;
    }
}
