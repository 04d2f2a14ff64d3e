/*
[INPUT]:  ClusterApi, Dialogs, cluster id, user actions
[OUTPUT]: ClusterPage - entry points of the cluster page, published snapshots
[POS]:    Page layer - composition root of the cluster page core
[UPDATE]: When adding user-facing page operations
*/

mod state;

pub use state::PageState;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join4;
use nailgun_adapter::{ClusterApi, NodeUpdate, TaskGroup, TaskStatus, WanGateway};
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dialogs::{ConfirmPrompt, Dialogs, UNSAVED_CHANGES_MESSAGE};
use crate::error::{PageError, PageResult};
use crate::model::ClusterModel;
use crate::scheduler::{DEFAULT_UPDATE_INTERVAL, PollPhase, PollScheduler};
use crate::sync::{PageNotification, SyncCoordinator};
use crate::task_store::{self, TaskFilter};
use crate::view::deployment::change_summary;
use crate::view::{ContrailTab, PageSnapshot, TabKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub update_interval: Duration,
    pub active_tab: TabKind,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            active_tab: TabKind::Nodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Started { task_id: u64 },
    Cancelled,
}

/// Cluster page: model, views, poll timer and the user operations on them.
pub struct ClusterPage {
    cluster_id: u64,
    api: Arc<dyn ClusterApi>,
    dialogs: Arc<dyn Dialogs>,
    state: Arc<Mutex<PageState>>,
    coordinator: Arc<SyncCoordinator>,
    scheduler: PollScheduler,
    shutdown: CancellationToken,
}

impl ClusterPage {
    /// Load the cluster, render the page and arm polling if something runs
    pub async fn open(
        api: Arc<dyn ClusterApi>,
        dialogs: Arc<dyn Dialogs>,
        cluster_id: u64,
        options: PageOptions,
    ) -> PageResult<Self> {
        let (cluster, nodes, tasks, all_tasks) = join4(
            api.get_cluster(cluster_id),
            api.list_nodes(cluster_id),
            api.list_tasks(Some(cluster_id)),
            api.list_tasks(None),
        )
        .await;
        let cluster = cluster?;
        let release = api.get_release(cluster.release_id).await?;

        let mut model = ClusterModel::new(cluster);
        model.apply_nodes(nodes?);
        model.apply_cluster_tasks(tasks?);
        model.apply_all_tasks(all_tasks?);
        model.apply_release(release);

        let state = PageState::new(model, options.active_tab);
        let snapshot = state.snapshot();
        let state = Arc::new(Mutex::new(state));
        let shutdown = CancellationToken::new();
        let coordinator = Arc::new(SyncCoordinator::new(
            cluster_id,
            Arc::clone(&api),
            Arc::clone(&state),
            snapshot,
            shutdown.clone(),
        ));
        let page = Self {
            cluster_id,
            api,
            dialogs,
            state,
            coordinator,
            scheduler: PollScheduler::new(options.update_interval, shutdown.clone()),
            shutdown,
        };
        page.load_tab_data().await?;
        let phase = page.schedule_update().await;
        info!(cluster_id, tab = %options.active_tab, ?phase, "Cluster page opened");
        Ok(page)
    }

    pub fn cluster_id(&self) -> u64 {
        self.cluster_id
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<PageSnapshot> {
        self.coordinator.subscribe_snapshots()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<PageNotification> {
        self.coordinator.subscribe_notifications()
    }

    pub fn subscribe_poll_phase(&self) -> watch::Receiver<PollPhase> {
        self.scheduler.subscribe_phase()
    }

    pub fn poll_phase(&self) -> PollPhase {
        self.scheduler.phase()
    }

    pub fn cycles(&self) -> u64 {
        self.scheduler.cycles()
    }

    pub fn update_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub async fn snapshot(&self) -> PageSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Re-render every sub-view and publish the result
    pub async fn render(&self) -> PageSnapshot {
        let mut state = self.state.lock().await;
        state.render();
        self.coordinator.publish(&state);
        state.snapshot()
    }

    pub async fn schedule_update(&self) -> PollPhase {
        self.scheduler.schedule_update(&self.coordinator).await
    }

    /// Run one refresh cycle right away, outside of the timer
    pub async fn refresh_now(&self) -> PageResult<()> {
        self.ensure_live()?;
        self.coordinator.refresh_all().await?;
        self.schedule_update().await;
        Ok(())
    }

    fn ensure_live(&self) -> PageResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(PageError::Disposed);
        }
        Ok(())
    }

    async fn load_tab_data(&self) -> PageResult<()> {
        let needs_contrail = {
            let mut state = self.state.lock().await;
            state.contrail().map(|(tab, _)| tab.needs_load()).unwrap_or(false)
        };
        if !needs_contrail {
            return Ok(());
        }
        let settings = self.api.get_contrail_settings(self.cluster_id).await?;
        let mut state = self.state.lock().await;
        if state.is_disposed() {
            return Err(PageError::Disposed);
        }
        state.contrail_loaded(settings);
        self.coordinator.publish(&state);
        Ok(())
    }

    /// Ask before dropping unsaved tab edits; `true` means go ahead
    async fn guard_unsaved_changes(&self) -> PageResult<bool> {
        let (has_changes, verification_running) = {
            let state = self.state.lock().await;
            let running_network = TaskFilter::group(TaskGroup::Network).status(TaskStatus::Running);
            (
                state.tab().has_changes(),
                !state.model().tasks().filter(&running_network).is_empty(),
            )
        };
        if !has_changes {
            return Ok(true);
        }
        if !self
            .dialogs
            .confirm(ConfirmPrompt::DiscardSettingsChanges { verification_running })
            .await
        {
            return Ok(false);
        }
        let mut state = self.state.lock().await;
        if state.is_disposed() {
            return Err(PageError::Disposed);
        }
        state.revert_tab_changes();
        self.coordinator.publish(&state);
        Ok(true)
    }

    async fn report_failure(&self, title: &str, err: PageError) -> PageError {
        warn!(cluster_id = self.cluster_id, error = %err, "{title} failed");
        self.dialogs.show_error(title, &err.to_string()).await;
        err
    }

    pub async fn on_deploy_request(&self) -> PageResult<DeployOutcome> {
        self.ensure_live()?;
        if !self.guard_unsaved_changes().await? {
            return Ok(DeployOutcome::Cancelled);
        }
        let changes = {
            let state = self.state.lock().await;
            change_summary(state.model())
        };
        if !self.dialogs.confirm(ConfirmPrompt::DeployChanges { changes }).await {
            return Ok(DeployOutcome::Cancelled);
        }

        let task = match self.api.deploy_changes(self.cluster_id).await {
            Ok(task) => task,
            Err(err) => return Err(self.report_failure("Deployment", err.into()).await),
        };
        info!(cluster_id = self.cluster_id, task_id = task.id, "Deployment started");
        self.coordinator.deployment_started().await;
        self.schedule_update().await;
        Ok(DeployOutcome::Started { task_id: task.id })
    }

    pub async fn stop_deployment(&self) -> PageResult<bool> {
        self.ensure_live()?;
        if !self.dialogs.confirm(ConfirmPrompt::StopDeployment).await {
            return Ok(false);
        }
        let task = match self.api.stop_deployment(self.cluster_id).await {
            Ok(task) => task,
            Err(err) => return Err(self.report_failure("Stop deployment", err.into()).await),
        };
        info!(cluster_id = self.cluster_id, task_id = task.id, "Deployment stop requested");
        self.coordinator.deployment_started().await;
        self.schedule_update().await;
        Ok(true)
    }

    /// Remove the shown deployment result (or failed release setup)
    pub async fn dismiss_task_result(&self) -> PageResult<Option<u64>> {
        self.ensure_live()?;
        let task_id = {
            let state = self.state.lock().await;
            let model = state.model();
            model
                .task(&TaskFilter::group(TaskGroup::Deployment))
                .or_else(|| model.release_setup_task(TaskStatus::Error))
                .map(|task| task.id)
        };
        let Some(task_id) = task_id else {
            return Ok(None);
        };
        self.coordinator.destroy_task(task_id).await?;
        Ok(Some(task_id))
    }

    /// Revert pending node additions and deletions
    pub async fn discard_changes(&self) -> PageResult<bool> {
        self.ensure_live()?;
        let updates: Vec<NodeUpdate> = {
            let state = self.state.lock().await;
            state
                .model()
                .pending_nodes()
                .filter_map(NodeUpdate::discard_pending)
                .collect()
        };
        let prompt = ConfirmPrompt::DiscardChanges {
            pending_nodes: updates.len(),
        };
        if !self.dialogs.confirm(prompt).await {
            return Ok(false);
        }
        if !updates.is_empty()
            && let Err(err) = self.api.update_nodes(&updates).await
        {
            return Err(self.report_failure("Discard changes", err.into()).await);
        }
        self.coordinator.refresh_cluster_and_nodes().await?;
        info!(cluster_id = self.cluster_id, nodes = updates.len(), "Pending changes discarded");
        Ok(true)
    }

    /// Switch tabs; `false` when the user kept unsaved edits
    pub async fn navigate_to_tab(&self, kind: TabKind) -> PageResult<bool> {
        self.ensure_live()?;
        if self.state.lock().await.active_tab() == kind {
            return Ok(true);
        }
        if !self.guard_unsaved_changes().await? {
            return Ok(false);
        }
        {
            let mut state = self.state.lock().await;
            if state.is_disposed() {
                return Err(PageError::Disposed);
            }
            state.switch_tab(kind);
            self.coordinator.publish(&state);
        }
        debug!(cluster_id = self.cluster_id, tab = %kind, "Tab switched");
        self.load_tab_data().await?;
        Ok(true)
    }

    /// Warning to show when leaving with unsaved edits
    pub async fn before_unload(&self) -> Option<&'static str> {
        let state = self.state.lock().await;
        state.tab().has_changes().then_some(UNSAVED_CHANGES_MESSAGE)
    }

    /// Drop finished tasks (network group by default), then delete them remotely
    pub async fn remove_finished_tasks(&self, filter: Option<TaskFilter>, silent: bool) -> PageResult<usize> {
        self.ensure_live()?;
        let filter = filter.unwrap_or_else(|| TaskFilter::group(TaskGroup::Network));
        let tasks = self
            .coordinator
            .apply_with(|model| model.take_finished_tasks(&filter, silent))
            .await?;
        task_store::delete_remote(self.api.as_ref(), &tasks).await?;
        Ok(tasks.len())
    }

    async fn with_contrail<T>(
        &self,
        f: impl FnOnce(&mut ContrailTab, &ClusterModel) -> PageResult<T>,
    ) -> PageResult<T> {
        self.ensure_live()?;
        let mut state = self.state.lock().await;
        if state.is_disposed() {
            return Err(PageError::Disposed);
        }
        let value = {
            let (tab, model) = state.contrail()?;
            f(tab, model)
        };
        self.coordinator.publish(&state);
        value
    }

    pub async fn add_gateway(&self, hostname: &str, ip: &str) -> PageResult<()> {
        self.with_contrail(|tab, model| tab.add_gateway(model, hostname, ip)).await
    }

    pub async fn delete_gateway(&self, index: usize) -> PageResult<WanGateway> {
        self.with_contrail(|tab, model| tab.delete_gateway(model, index)).await
    }

    pub async fn set_as_number(&self, as_number: u32) -> PageResult<()> {
        self.with_contrail(|tab, model| tab.set_as_number(model, as_number)).await
    }

    pub async fn revert_contrail_changes(&self) -> PageResult<()> {
        self.with_contrail(|tab, model| {
            tab.revert_changes(model);
            Ok(())
        })
        .await
    }

    /// Save the contrail working copy
    pub async fn apply_contrail_changes(&self) -> PageResult<()> {
        let body = self.with_contrail(|tab, model| tab.begin_apply(model)).await?;
        let result = self.api.update_contrail_settings(self.cluster_id, &body).await;

        {
            let mut state = self.state.lock().await;
            if state.is_disposed() {
                return Err(PageError::Disposed);
            }
            if let Ok(saved) = &result {
                state.contrail_loaded(saved.clone());
            } else if let Ok((tab, model)) = state.contrail() {
                tab.finish_apply(model, None);
            }
            self.coordinator.publish(&state);
        }
        if let Err(err) = self.coordinator.refresh_cluster().await {
            warn!(cluster_id = self.cluster_id, error = %err, "Cluster refresh after save failed");
        }

        match result {
            Ok(_) => {
                info!(cluster_id = self.cluster_id, "Contrail settings saved");
                Ok(())
            }
            Err(err) => Err(self.report_failure("Contrail settings", err.into()).await),
        }
    }

    /// Replace the working copy with server defaults
    pub async fn load_contrail_defaults(&self) -> PageResult<()> {
        self.with_contrail(|tab, model| tab.begin_load_defaults(model)).await?;
        let result = self.api.get_contrail_defaults(self.cluster_id).await;
        self.with_contrail(|tab, model| {
            tab.finish_load_defaults(model, result.as_ref().ok());
            Ok(())
        })
        .await?;
        result.map(|_| ()).map_err(|err| {
            warn!(cluster_id = self.cluster_id, error = %err, "Loading contrail defaults failed");
            err.into()
        })
    }

    /// Stop polling and drop every subscription. Idempotent.
    pub async fn dispose(&self) {
        self.scheduler.cancel();
        self.shutdown.cancel();
        let mut state = self.state.lock().await;
        if !state.is_disposed() {
            state.dispose();
            info!(cluster_id = self.cluster_id, "Cluster page disposed");
        }
    }
}

impl Drop for ClusterPage {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}
