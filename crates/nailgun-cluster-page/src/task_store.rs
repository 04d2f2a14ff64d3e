/*
[INPUT]:  Task lists fetched from the API, lookup filters
[OUTPUT]: Ordered task storage, first-match lookup, change events, finished-task cleanup
[POS]:    Model layer - background task bookkeeping
[UPDATE]: When changing task matching rules or reconciliation events
*/

use futures_util::future::join_all;
use nailgun_adapter::{ClusterApi, NailgunError, Task, TaskGroup, TaskName, TaskStatus};
use tracing::{debug, warn};

use crate::events::ModelEvent;

/// Task lookup criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    groups: Vec<TaskGroup>,
    names: Vec<TaskName>,
    status: Option<TaskStatus>,
    release: Option<u64>,
}

impl TaskFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn group(group: TaskGroup) -> Self {
        Self::groups([group])
    }

    pub fn groups(groups: impl IntoIterator<Item = TaskGroup>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn name(name: TaskName) -> Self {
        Self {
            names: vec![name],
            ..Self::default()
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn release(mut self, release_id: u64) -> Self {
        self.release = Some(release_id);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.groups.is_empty() && !task.group().is_some_and(|g| self.groups.contains(&g)) {
            return false;
        }
        if !self.names.is_empty() && !self.names.contains(&task.name) {
            return false;
        }
        if self.status.is_some_and(|status| status != task.status) {
            return false;
        }
        if let Some(release) = self.release {
            if task.release_id() != Some(release) {
                return false;
            }
        }
        true
    }
}

/// Tasks in server order.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, task_id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn contains(&self, task_id: u64) -> bool {
        self.get(task_id).is_some()
    }

    /// First task matching the filter, in stored order
    pub fn find_task(&self, filter: &TaskFilter) -> Option<&Task> {
        self.tasks.iter().find(|task| filter.matches(task))
    }

    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    /// Replace the whole collection, reporting what changed.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Vec<ModelEvent> {
        let mut events = Vec::new();

        for old in &self.tasks {
            if !tasks.iter().any(|task| task.id == old.id) {
                events.push(ModelEvent::TaskRemoved { task_id: old.id });
            }
        }
        for task in &tasks {
            match self.get(task.id) {
                Some(old) => events.extend(diff_task(old, task)),
                None => events.push(ModelEvent::TaskAdded { task_id: task.id }),
            }
        }

        self.tasks = tasks;
        events
    }

    /// Insert or update a single task; new tasks go to the end.
    pub fn upsert(&mut self, task: Task) -> Vec<ModelEvent> {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                let events = diff_task(existing, &task);
                *existing = task;
                events
            }
            None => {
                let task_id = task.id;
                self.tasks.push(task);
                vec![ModelEvent::TaskAdded { task_id }]
            }
        }
    }

    pub fn remove(&mut self, task_id: u64) -> Option<(Task, ModelEvent)> {
        let index = self.tasks.iter().position(|task| task.id == task_id)?;
        let task = self.tasks.remove(index);
        Some((task, ModelEvent::TaskRemoved { task_id }))
    }

    /// Take matching non-running tasks out of the store.
    ///
    /// With `silent` the tasks stay in the store and no events are produced;
    /// the returned list is still what should be deleted remotely.
    pub fn take_finished(&mut self, filter: &TaskFilter, silent: bool) -> (Vec<Task>, Vec<ModelEvent>) {
        let finished: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task) && !task.is_running())
            .cloned()
            .collect();

        let mut events = Vec::new();
        if !silent {
            for task in &finished {
                if let Some((_, event)) = self.remove(task.id) {
                    events.push(event);
                }
            }
        }
        (finished, events)
    }
}

fn diff_task(old: &Task, new: &Task) -> Vec<ModelEvent> {
    let mut events = Vec::new();
    if old.status != new.status {
        events.push(ModelEvent::TaskStatusChanged {
            task_id: new.id,
            status: new.status,
        });
    }
    if old.progress != new.progress {
        events.push(ModelEvent::TaskProgressChanged {
            task_id: new.id,
            progress: new.progress,
        });
    }
    events
}

/// Delete tasks remotely, waiting for every request to settle.
///
/// Reports the first failure after all deletions completed.
pub async fn delete_remote(api: &dyn ClusterApi, tasks: &[Task]) -> Result<(), NailgunError> {
    let results = join_all(tasks.iter().map(|task| api.delete_task(task.id))).await;

    let mut first_error = None;
    for (task, result) in tasks.iter().zip(results) {
        match result {
            Ok(()) => debug!(task_id = task.id, "task deleted"),
            Err(err) => {
                warn!(task_id = task.id, error = %err, "failed to delete task");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClusterApi, task};
    use rstest::rstest;

    fn release_task(id: u64, status: TaskStatus, release: u64) -> Task {
        let mut task = task(id, TaskName::ReleaseSetup, status, 0);
        task.release = Some(release);
        task
    }

    #[rstest]
    #[case(TaskFilter::group(TaskGroup::Deployment), Some(2))]
    #[case(TaskFilter::group(TaskGroup::Network).status(TaskStatus::Running), Some(3))]
    #[case(TaskFilter::group(TaskGroup::Network).status(TaskStatus::Error), None)]
    #[case(TaskFilter::groups([TaskGroup::Deployment, TaskGroup::Network]).status(TaskStatus::Running), Some(2))]
    #[case(TaskFilter::name(TaskName::VerifyNetworks), Some(1))]
    #[case(TaskFilter::group(TaskGroup::ReleaseSetup).release(8), Some(4))]
    #[case(TaskFilter::group(TaskGroup::ReleaseSetup).release(9), None)]
    fn test_find_task(#[case] filter: TaskFilter, #[case] expected: Option<u64>) {
        let store = TaskStore::from_tasks(vec![
            task(1, TaskName::VerifyNetworks, TaskStatus::Ready, 100),
            task(2, TaskName::Deploy, TaskStatus::Running, 10),
            task(3, TaskName::CheckNetworks, TaskStatus::Running, 0),
            release_task(4, TaskStatus::Running, 8),
        ]);

        assert_eq!(store.find_task(&filter).map(|task| task.id), expected);
    }

    #[test]
    fn test_find_task_independent_of_order_for_unique_running_tasks() {
        let tasks = vec![
            task(1, TaskName::Deploy, TaskStatus::Running, 10),
            task(2, TaskName::VerifyNetworks, TaskStatus::Running, 0),
            release_task(3, TaskStatus::Running, 2),
            release_task(4, TaskStatus::Running, 5),
            task(5, TaskName::Deploy, TaskStatus::Ready, 100),
        ];
        let filters = [
            TaskFilter::group(TaskGroup::Deployment).status(TaskStatus::Running),
            TaskFilter::group(TaskGroup::Network).status(TaskStatus::Running),
            TaskFilter::group(TaskGroup::ReleaseSetup).status(TaskStatus::Running).release(2),
            TaskFilter::group(TaskGroup::ReleaseSetup).status(TaskStatus::Running).release(5),
        ];

        let reference = TaskStore::from_tasks(tasks.clone());
        for rotation in 0..tasks.len() {
            let mut permuted = tasks.clone();
            permuted.rotate_left(rotation);
            permuted.reverse();
            let store = TaskStore::from_tasks(permuted);
            for filter in &filters {
                assert_eq!(
                    store.find_task(filter).map(|task| task.id),
                    reference.find_task(filter).map(|task| task.id),
                );
            }
        }
    }

    #[test]
    fn test_replace_all_reports_changes() {
        let mut store = TaskStore::from_tasks(vec![
            task(1, TaskName::Deploy, TaskStatus::Running, 10),
            task(2, TaskName::VerifyNetworks, TaskStatus::Ready, 100),
        ]);

        let events = store.replace_all(vec![
            task(1, TaskName::Deploy, TaskStatus::Ready, 100),
            task(3, TaskName::CheckNetworks, TaskStatus::Running, 0),
        ]);

        assert_eq!(
            events,
            vec![
                ModelEvent::TaskRemoved { task_id: 2 },
                ModelEvent::TaskStatusChanged { task_id: 1, status: TaskStatus::Ready },
                ModelEvent::TaskProgressChanged { task_id: 1, progress: 100 },
                ModelEvent::TaskAdded { task_id: 3 },
            ]
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_unchanged_task_is_quiet() {
        let mut store = TaskStore::from_tasks(vec![task(1, TaskName::Deploy, TaskStatus::Running, 10)]);
        let events = store.upsert(task(1, TaskName::Deploy, TaskStatus::Running, 10));
        assert!(events.is_empty());
    }

    #[test]
    fn test_take_finished_skips_running() {
        let mut store = TaskStore::from_tasks(vec![
            task(1, TaskName::VerifyNetworks, TaskStatus::Ready, 100),
            task(2, TaskName::VerifyNetworks, TaskStatus::Running, 30),
            task(3, TaskName::CheckNetworks, TaskStatus::Error, 100),
            task(4, TaskName::Deploy, TaskStatus::Error, 100),
        ]);

        let (finished, events) = store.take_finished(&TaskFilter::group(TaskGroup::Network), false);

        let ids: Vec<u64> = finished.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(events.len(), 2);
        assert!(store.contains(2));
        assert!(store.contains(4));
        assert!(!store.contains(1));
    }

    #[test]
    fn test_take_finished_silent_keeps_tasks() {
        let mut store = TaskStore::from_tasks(vec![task(1, TaskName::VerifyNetworks, TaskStatus::Ready, 100)]);
        let (finished, events) = store.take_finished(&TaskFilter::group(TaskGroup::Network), true);
        assert_eq!(finished.len(), 1);
        assert!(events.is_empty());
        assert!(store.contains(1));
    }

    #[tokio::test]
    async fn test_delete_remote_waits_for_all_and_reports_failure() {
        let api = FakeClusterApi::new();
        api.fail_delete(2);
        let tasks = vec![
            task(1, TaskName::VerifyNetworks, TaskStatus::Ready, 100),
            task(2, TaskName::VerifyNetworks, TaskStatus::Error, 100),
            task(3, TaskName::CheckNetworks, TaskStatus::Ready, 100),
        ];

        let result = delete_remote(&api, &tasks).await;

        assert!(result.is_err());
        assert_eq!(api.deleted_tasks(), vec![1, 3]);
    }
}
