/*
[INPUT]:  Page state (which tasks qualify), ClusterApi
[OUTPUT]: Refresh cycles, finished notifications, published page snapshots
[POS]:    Sync layer - one refresh cycle per poll tick
[UPDATE]: When adding refresh branches or page notifications
*/

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::{join, join3};
use nailgun_adapter::{ClusterApi, NailgunError, Task, TaskGroup, TaskStatus};
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PageError, PageResult};
use crate::events::ModelEvent;
use crate::model::ClusterModel;
use crate::page::PageState;
use crate::view::PageSnapshot;

const NOTIFICATION_CAPACITY: usize = 64;

/// Side effects of a refresh cycle other than view updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNotification {
    /// Cluster list / navbar counters are stale
    NavbarRefresh,
    DeploymentFinished { task_id: u64, status: TaskStatus },
    SetupFinished { task_id: u64, status: TaskStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    Running,
    Finished,
    /// Task no longer reported by the server
    Gone,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub deployment: Option<BranchOutcome>,
    pub verification: Option<BranchOutcome>,
    pub release_setup: Option<BranchOutcome>,
    /// Fetches of the cycle that failed (logged, treated as settled)
    pub failures: usize,
    pub synced_at: DateTime<Utc>,
}

impl CycleReport {
    fn empty() -> Self {
        Self {
            deployment: None,
            verification: None,
            release_setup: None,
            failures: 0,
            synced_at: Utc::now(),
        }
    }

    /// No branch qualified
    pub fn is_empty(&self) -> bool {
        self.deployment.is_none() && self.verification.is_none() && self.release_setup.is_none()
    }
}

/// Tasks a cycle will poll, captured under the lock before any fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CyclePlan {
    deployment: Option<u64>,
    verification: Option<u64>,
    release_setup: Option<u64>,
}

impl CyclePlan {
    fn from_model(model: &ClusterModel) -> Self {
        Self {
            deployment: model.running_task(TaskGroup::Deployment).map(|task| task.id),
            verification: model.running_task(TaskGroup::Network).map(|task| task.id),
            release_setup: model
                .release_setup_task(TaskStatus::Running)
                .map(|task| task.id),
        }
    }
}

#[derive(Debug, Default)]
struct Branch {
    outcome: Option<BranchOutcome>,
    failures: usize,
    finished: Option<Task>,
}

/// Runs refresh cycles against the API and applies results to the page.
///
/// The page mutex is only taken to read the plan and to apply settled
/// results, never across a request.
pub struct SyncCoordinator {
    cluster_id: u64,
    api: Arc<dyn ClusterApi>,
    state: Arc<Mutex<PageState>>,
    snapshots: watch::Sender<PageSnapshot>,
    notifications: broadcast::Sender<PageNotification>,
    shutdown: CancellationToken,
}

impl SyncCoordinator {
    pub fn new(
        cluster_id: u64,
        api: Arc<dyn ClusterApi>,
        state: Arc<Mutex<PageState>>,
        initial: PageSnapshot,
        shutdown: CancellationToken,
    ) -> Self {
        let (snapshots, _) = watch::channel(initial);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            cluster_id,
            api,
            state,
            snapshots,
            notifications,
            shutdown,
        }
    }

    pub fn cluster_id(&self) -> u64 {
        self.cluster_id
    }

    pub fn api(&self) -> &dyn ClusterApi {
        self.api.as_ref()
    }

    pub fn state(&self) -> &Arc<Mutex<PageState>> {
        &self.state
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<PageSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<PageNotification> {
        self.notifications.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Whether a poll timer should be armed
    pub async fn should_poll(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let state = self.state.lock().await;
        !state.is_disposed() && state.model().has_qualifying_task()
    }

    pub(crate) fn publish(&self, state: &PageState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn notify(&self, notification: PageNotification) {
        debug!(cluster_id = self.cluster_id, ?notification, "Page notification");
        // No subscriber is fine
        let _ = self.notifications.send(notification);
    }

    /// Apply settled results; skipped once the page is torn down
    pub(crate) async fn apply_with<T>(
        &self,
        f: impl FnOnce(&mut ClusterModel) -> (T, Vec<ModelEvent>),
    ) -> PageResult<T> {
        if self.is_cancelled() {
            return Err(PageError::Disposed);
        }
        let mut state = self.state.lock().await;
        if state.is_disposed() {
            return Err(PageError::Disposed);
        }
        let value = state.update(f);
        self.publish(&state);
        Ok(value)
    }

    pub(crate) async fn apply(&self, f: impl FnOnce(&mut ClusterModel) -> Vec<ModelEvent>) -> bool {
        self.apply_with(|model| ((), f(model))).await.is_ok()
    }

    /// One refresh cycle: every qualifying branch fetches concurrently, the
    /// cycle completes when all of them settled, then finished notifications run.
    pub async fn run_cycle(&self) -> CycleReport {
        if self.is_cancelled() {
            return CycleReport::empty();
        }
        let plan = {
            let state = self.state.lock().await;
            if state.is_disposed() {
                return CycleReport::empty();
            }
            CyclePlan::from_model(state.model())
        };
        debug!(cluster_id = self.cluster_id, ?plan, "Starting refresh cycle");

        let (deployment, verification, release_setup) = join3(
            self.deployment_branch(plan.deployment),
            self.verification_branch(plan.verification),
            self.release_setup_branch(plan.release_setup),
        )
        .await;

        let report = CycleReport {
            deployment: deployment.outcome,
            verification: verification.outcome,
            release_setup: release_setup.outcome,
            failures: deployment.failures + verification.failures + release_setup.failures,
            synced_at: Utc::now(),
        };

        if self.is_cancelled() {
            return report;
        }
        if let Some(task) = deployment.finished {
            self.deployment_finished(task.id, task.status).await;
        }
        if let Some(task) = release_setup.finished {
            self.setup_finished(task).await;
        }
        report
    }

    async fn deployment_branch(&self, task_id: Option<u64>) -> Branch {
        let Some(task_id) = task_id else {
            return Branch::default();
        };
        let (task, nodes) = join(
            self.api.get_task(task_id),
            self.api.list_nodes(self.cluster_id),
        )
        .await;

        let mut branch = Branch::default();
        match task {
            Ok(task) => {
                let running = task.is_running();
                branch.outcome = Some(if running {
                    BranchOutcome::Running
                } else {
                    BranchOutcome::Finished
                });
                if !running {
                    branch.finished = Some(task.clone());
                }
                self.apply(|model| model.apply_task(task)).await;
            }
            Err(err) => {
                self.fetch_failed("deployment task", Some(task_id), &err);
                branch.outcome = Some(BranchOutcome::Failed);
                branch.failures += 1;
            }
        }
        match nodes {
            Ok(nodes) => {
                self.apply(|model| model.apply_nodes(nodes)).await;
            }
            Err(err) => {
                self.fetch_failed("nodes", None, &err);
                branch.failures += 1;
            }
        }
        branch
    }

    async fn verification_branch(&self, task_id: Option<u64>) -> Branch {
        let Some(task_id) = task_id else {
            return Branch::default();
        };
        match self.api.get_task(task_id).await {
            Ok(task) => {
                let outcome = if task.is_running() {
                    BranchOutcome::Running
                } else {
                    BranchOutcome::Finished
                };
                self.apply(|model| model.apply_task(task)).await;
                Branch {
                    outcome: Some(outcome),
                    ..Branch::default()
                }
            }
            Err(err) => {
                self.fetch_failed("verification task", Some(task_id), &err);
                Branch {
                    outcome: Some(BranchOutcome::Failed),
                    failures: 1,
                    finished: None,
                }
            }
        }
    }

    async fn release_setup_branch(&self, task_id: Option<u64>) -> Branch {
        let Some(task_id) = task_id else {
            return Branch::default();
        };
        match self.api.list_tasks(None).await {
            Ok(tasks) => {
                let found = tasks.iter().find(|task| task.id == task_id).cloned();
                self.apply(|model| model.apply_all_tasks(tasks)).await;
                match found {
                    Some(task) if task.is_running() => Branch {
                        outcome: Some(BranchOutcome::Running),
                        ..Branch::default()
                    },
                    Some(task) => Branch {
                        outcome: Some(BranchOutcome::Finished),
                        failures: 0,
                        finished: Some(task),
                    },
                    None => Branch {
                        outcome: Some(BranchOutcome::Gone),
                        ..Branch::default()
                    },
                }
            }
            Err(err) => {
                self.fetch_failed("task collection", Some(task_id), &err);
                Branch {
                    outcome: Some(BranchOutcome::Failed),
                    failures: 1,
                    finished: None,
                }
            }
        }
    }

    fn fetch_failed(&self, what: &str, task_id: Option<u64>, err: &NailgunError) {
        warn!(
            cluster_id = self.cluster_id,
            task_id,
            retryable = err.is_retryable(),
            error = %err,
            "Failed to refresh {what}, will retry next cycle"
        );
    }

    /// Fetch cluster, nodes and cluster tasks together and apply what arrived
    pub async fn refresh_all(&self) -> PageResult<()> {
        let (cluster, nodes, tasks) = join3(
            self.api.get_cluster(self.cluster_id),
            self.api.list_nodes(self.cluster_id),
            self.api.list_tasks(Some(self.cluster_id)),
        )
        .await;

        let mut first_error = None;
        let cluster = settled(cluster, &mut first_error);
        let nodes = settled(nodes, &mut first_error);
        let tasks = settled(tasks, &mut first_error);

        self.apply(|model| {
            let mut events = Vec::new();
            if let Some(cluster) = cluster {
                events.extend(model.apply_cluster(cluster));
            }
            if let Some(nodes) = nodes {
                events.extend(model.apply_nodes(nodes));
            }
            if let Some(tasks) = tasks {
                events.extend(model.apply_cluster_tasks(tasks));
            }
            events
        })
        .await;

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub async fn refresh_cluster(&self) -> PageResult<()> {
        let cluster = self.api.get_cluster(self.cluster_id).await?;
        self.apply(|model| model.apply_cluster(cluster)).await;
        Ok(())
    }

    pub async fn refresh_cluster_and_nodes(&self) -> PageResult<()> {
        let (cluster, nodes) = join(
            self.api.get_cluster(self.cluster_id),
            self.api.list_nodes(self.cluster_id),
        )
        .await;
        let (cluster, nodes) = (cluster?, nodes?);
        self.apply(|model| {
            let mut events = model.apply_cluster(cluster);
            events.extend(model.apply_nodes(nodes));
            events
        })
        .await;
        Ok(())
    }

    /// A deployment (or stop) was requested: refresh and detach status renders
    /// of the running deployment task. The caller arms the scheduler.
    pub async fn deployment_started(&self) {
        match self.refresh_all().await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                if !state.is_disposed() {
                    state.suspend_during(TaskGroup::Deployment);
                    self.publish(&state);
                }
            }
            Err(err) => warn!(
                cluster_id = self.cluster_id,
                error = %err,
                "Refresh after deployment start failed"
            ),
        }
    }

    async fn deployment_finished(&self, task_id: u64, status: TaskStatus) {
        info!(cluster_id = self.cluster_id, task_id, %status, "Deployment finished");
        if let Err(err) = self.refresh_all().await {
            warn!(
                cluster_id = self.cluster_id,
                task_id,
                error = %err,
                "Refresh after deployment failed, rebinding with stale data"
            );
        }
        {
            let mut state = self.state.lock().await;
            if state.is_disposed() || self.is_cancelled() {
                return;
            }
            state.rebind_after(TaskGroup::Deployment);
            self.publish(&state);
        }
        self.notify(PageNotification::NavbarRefresh);
        self.notify(PageNotification::DeploymentFinished { task_id, status });
    }

    async fn setup_finished(&self, task: Task) {
        info!(
            cluster_id = self.cluster_id,
            task_id = task.id,
            status = %task.status,
            "Release setup finished"
        );
        self.notify(PageNotification::NavbarRefresh);

        let release_id = {
            let state = self.state.lock().await;
            state.model().cluster().release_id
        };
        match self.api.get_release(release_id).await {
            Ok(release) => {
                self.apply(|model| model.apply_release(release)).await;
            }
            Err(err) => warn!(release_id, error = %err, "Failed to refresh release"),
        }

        if task.status == TaskStatus::Ready
            && let Err(err) = self.destroy_task(task.id).await
        {
            warn!(task_id = task.id, error = %err, "Failed to remove finished setup task");
        }
        self.notify(PageNotification::SetupFinished {
            task_id: task.id,
            status: task.status,
        });
    }

    /// Drop a task from the model, then delete it on the server
    pub async fn destroy_task(&self, task_id: u64) -> PageResult<()> {
        self.apply_with(|model| ((), model.remove_task(task_id))).await?;
        self.api.delete_task(task_id).await?;
        debug!(task_id, "Task removed");
        Ok(())
    }
}

/// Keep a successful value, remembering the first failure
fn settled<T>(result: Result<T, NailgunError>, first_error: &mut Option<NailgunError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            first_error.get_or_insert(err);
            None
        }
    }
}
