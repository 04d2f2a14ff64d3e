//! Test doubles and fixtures shared by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use nailgun_adapter::{
    Cluster, ClusterApi, ClusterStatus, ContrailSettings, NailgunError, Node, NodeStatus,
    NodeUpdate, Release, ReleaseState, Result, Task, TaskName, TaskStatus,
};

use crate::dialogs::{ConfirmPrompt, Dialogs};

pub fn cluster(id: u64) -> Cluster {
    Cluster {
        id,
        name: format!("env-{id}"),
        status: ClusterStatus::New,
        release_id: 2,
        is_customized: false,
        changes: Vec::new(),
        mode: Some("multinode".to_string()),
        net_provider: Some("neutron".to_string()),
    }
}

pub fn node(id: u64, pending_addition: bool, pending_deletion: bool) -> Node {
    Node {
        id,
        name: format!("node-{id}"),
        status: NodeStatus::Discover,
        online: true,
        pending_addition,
        pending_deletion,
        cluster: Some(1),
        roles: Vec::new(),
        pending_roles: Vec::new(),
    }
}

pub fn task(id: u64, name: TaskName, status: TaskStatus, progress: u8) -> Task {
    Task {
        id,
        name,
        status,
        progress,
        message: None,
        cluster: Some(1),
        release: None,
        uuid: None,
        result: None,
    }
}

pub fn release(id: u64, state: ReleaseState) -> Release {
    Release {
        id,
        name: "Icehouse on Ubuntu".to_string(),
        version: "2014.1.1-5.1".to_string(),
        state,
        is_deployable: true,
    }
}

#[derive(Debug)]
struct FakeState {
    cluster: Cluster,
    release: Release,
    nodes: Vec<Node>,
    tasks: Vec<Task>,
    contrail: ContrailSettings,
    defaults: ContrailSettings,
    delays: HashMap<&'static str, Duration>,
    failing: HashSet<&'static str>,
    failing_deletes: HashSet<u64>,
    deleted: Vec<u64>,
    calls: Vec<&'static str>,
    settled: Vec<&'static str>,
    deploy_task: Task,
}

/// In-memory Nailgun with per-operation latency and failure switches.
#[derive(Debug)]
pub struct FakeClusterApi {
    state: Mutex<FakeState>,
}

impl FakeClusterApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                cluster: cluster(1),
                release: release(2, ReleaseState::Available),
                nodes: Vec::new(),
                tasks: Vec::new(),
                contrail: ContrailSettings::default(),
                defaults: ContrailSettings::default(),
                delays: HashMap::new(),
                failing: HashSet::new(),
                failing_deletes: HashSet::new(),
                deleted: Vec::new(),
                calls: Vec::new(),
                settled: Vec::new(),
                deploy_task: task(100, TaskName::Deploy, TaskStatus::Running, 0),
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().expect("fake api lock");
        f(&mut state)
    }

    pub fn set_cluster(&self, cluster: Cluster) {
        self.with_state(|state| state.cluster = cluster);
    }

    pub fn set_release(&self, release: Release) {
        self.with_state(|state| state.release = release);
    }

    pub fn set_nodes(&self, nodes: Vec<Node>) {
        self.with_state(|state| state.nodes = nodes);
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.with_state(|state| state.tasks = tasks);
    }

    /// Insert or replace one server-side task
    pub fn put_task(&self, task: Task) {
        self.with_state(|state| match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => state.tasks.push(task),
        });
    }

    pub fn set_contrail(&self, settings: ContrailSettings) {
        self.with_state(|state| state.contrail = settings);
    }

    pub fn contrail(&self) -> ContrailSettings {
        self.with_state(|state| state.contrail.clone())
    }

    pub fn set_defaults(&self, settings: ContrailSettings) {
        self.with_state(|state| state.defaults = settings);
    }

    pub fn set_deploy_task(&self, task: Task) {
        self.with_state(|state| state.deploy_task = task);
    }

    pub fn set_delay(&self, op: &'static str, delay: Duration) {
        self.with_state(|state| {
            state.delays.insert(op, delay);
        });
    }

    pub fn fail(&self, op: &'static str) {
        self.with_state(|state| {
            state.failing.insert(op);
        });
    }

    pub fn recover(&self, op: &'static str) {
        self.with_state(|state| {
            state.failing.remove(op);
        });
    }

    pub fn fail_delete(&self, task_id: u64) {
        self.with_state(|state| {
            state.failing_deletes.insert(task_id);
        });
    }

    pub fn deleted_tasks(&self) -> Vec<u64> {
        self.with_state(|state| state.deleted.clone())
    }

    pub fn calls(&self, op: &str) -> usize {
        self.with_state(|state| state.calls.iter().filter(|call| **call == op).count())
    }

    pub fn settled_order(&self) -> Vec<&'static str> {
        self.with_state(|state| state.settled.clone())
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        let delay = self.with_state(|state| {
            state.calls.push(op);
            state.delays.get(op).copied()
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.with_state(|state| {
            state.settled.push(op);
            if state.failing.contains(op) {
                Err(NailgunError::Api {
                    code: 503,
                    message: format!("{op} unavailable"),
                })
            } else {
                Ok(())
            }
        })
    }
}

#[async_trait]
impl ClusterApi for FakeClusterApi {
    async fn get_task(&self, task_id: u64) -> Result<Task> {
        self.enter("get_task").await?;
        self.with_state(|state| {
            state
                .tasks
                .iter()
                .find(|task| task.id == task_id)
                .cloned()
                .ok_or_else(|| NailgunError::NotFound {
                    resource: format!("/api/tasks/{task_id}"),
                })
        })
    }

    async fn list_tasks(&self, cluster_id: Option<u64>) -> Result<Vec<Task>> {
        self.enter("list_tasks").await?;
        Ok(self.with_state(|state| {
            state
                .tasks
                .iter()
                .filter(|task| cluster_id.is_none() || task.cluster == cluster_id)
                .cloned()
                .collect()
        }))
    }

    async fn delete_task(&self, task_id: u64) -> Result<()> {
        self.enter("delete_task").await?;
        self.with_state(|state| {
            if state.failing_deletes.contains(&task_id) {
                return Err(NailgunError::Api {
                    code: 500,
                    message: "delete failed".to_string(),
                });
            }
            state.tasks.retain(|task| task.id != task_id);
            state.deleted.push(task_id);
            Ok(())
        })
    }

    async fn get_cluster(&self, _cluster_id: u64) -> Result<Cluster> {
        self.enter("get_cluster").await?;
        Ok(self.with_state(|state| state.cluster.clone()))
    }

    async fn list_nodes(&self, _cluster_id: u64) -> Result<Vec<Node>> {
        self.enter("list_nodes").await?;
        Ok(self.with_state(|state| state.nodes.clone()))
    }

    async fn update_nodes(&self, updates: &[NodeUpdate]) -> Result<Vec<Node>> {
        self.enter("update_nodes").await?;
        Ok(self.with_state(|state| {
            for update in updates {
                if let Some(node) = state.nodes.iter_mut().find(|node| node.id == update.id) {
                    node.cluster = update.cluster_id;
                    node.pending_addition = update.pending_addition;
                    node.pending_deletion = update.pending_deletion;
                    node.pending_roles = update.pending_roles.clone();
                }
            }
            state.nodes.retain(|node| node.cluster.is_some());
            state.cluster.changes.clear();
            state.nodes.clone()
        }))
    }

    async fn get_release(&self, _release_id: u64) -> Result<Release> {
        self.enter("get_release").await?;
        Ok(self.with_state(|state| state.release.clone()))
    }

    async fn deploy_changes(&self, _cluster_id: u64) -> Result<Task> {
        self.enter("deploy_changes").await?;
        Ok(self.with_state(|state| {
            let task = state.deploy_task.clone();
            state.tasks.retain(|existing| existing.id != task.id);
            state.tasks.push(task.clone());
            state.cluster.status = ClusterStatus::Deployment;
            task
        }))
    }

    async fn stop_deployment(&self, cluster_id: u64) -> Result<Task> {
        self.enter("stop_deployment").await?;
        Ok(self.with_state(|state| {
            let mut stop = task(101, TaskName::StopDeployment, TaskStatus::Running, 0);
            stop.cluster = Some(cluster_id);
            state.tasks.push(stop.clone());
            stop
        }))
    }

    async fn get_contrail_settings(&self, _cluster_id: u64) -> Result<ContrailSettings> {
        self.enter("get_contrail_settings").await?;
        Ok(self.contrail())
    }

    async fn update_contrail_settings(
        &self,
        _cluster_id: u64,
        settings: &ContrailSettings,
    ) -> Result<ContrailSettings> {
        self.enter("update_contrail_settings").await?;
        self.set_contrail(settings.clone());
        Ok(settings.clone())
    }

    async fn get_contrail_defaults(&self, _cluster_id: u64) -> Result<ContrailSettings> {
        self.enter("get_contrail_defaults").await?;
        Ok(self.with_state(|state| state.defaults.clone()))
    }
}

/// Dialogs answering from a script; unanswered prompts are declined.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<ConfirmPrompt>>,
    errors: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors lock").clone()
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        self.prompts.lock().expect("prompts lock").push(prompt);
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or(false)
    }

    async fn show_error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .expect("errors lock")
            .push(format!("{title}: {message}"));
    }
}
