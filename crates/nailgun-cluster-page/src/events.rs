/*
[INPUT]:  Model change events produced by fetch reconciliation
[OUTPUT]: Explicit subscription registry routing events to view reactions
[POS]:    Event layer - replaces namespaced global listeners
[UPDATE]: When adding event kinds, view slots, or view reactions
*/

use std::fmt;

use nailgun_adapter::TaskStatus;
use uuid::Uuid;

/// Cluster attributes views can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterAttribute {
    Name,
    Status,
    IsCustomized,
    Changes,
}

/// Something changed in the cluster model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    TaskAdded { task_id: u64 },
    TaskRemoved { task_id: u64 },
    TaskStatusChanged { task_id: u64, status: TaskStatus },
    TaskProgressChanged { task_id: u64, progress: u8 },
    NodeAdded { node_id: u64 },
    NodesResized { count: usize },
    NodePendingChanged { node_id: u64 },
    ClusterChanged { attribute: ClusterAttribute },
    ReleaseStateChanged,
}

impl ModelEvent {
    pub fn topic(&self) -> Topic {
        match self {
            ModelEvent::TaskAdded { .. } => Topic::TaskAdded,
            ModelEvent::TaskRemoved { .. } => Topic::TaskRemoved,
            ModelEvent::TaskStatusChanged { task_id, .. } => Topic::TaskStatus(*task_id),
            ModelEvent::TaskProgressChanged { task_id, .. } => Topic::TaskProgress(*task_id),
            ModelEvent::NodeAdded { .. } => Topic::NodeAdded,
            ModelEvent::NodesResized { .. } => Topic::NodesResized,
            ModelEvent::NodePendingChanged { node_id } => Topic::NodePending(*node_id),
            ModelEvent::ClusterChanged { attribute } => Topic::Cluster(*attribute),
            ModelEvent::ReleaseStateChanged => Topic::ReleaseState,
        }
    }

    /// Task or node the event is about, used by `OnNewTask`/`OnNewNode` reactions
    pub fn subject_id(&self) -> Option<u64> {
        match self {
            ModelEvent::TaskAdded { task_id }
            | ModelEvent::TaskRemoved { task_id }
            | ModelEvent::TaskStatusChanged { task_id, .. }
            | ModelEvent::TaskProgressChanged { task_id, .. } => Some(*task_id),
            ModelEvent::NodeAdded { node_id } | ModelEvent::NodePendingChanged { node_id } => {
                Some(*node_id)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    TaskAdded,
    TaskRemoved,
    TaskStatus(u64),
    TaskProgress(u64),
    NodeAdded,
    NodesResized,
    NodePending(u64),
    Cluster(ClusterAttribute),
    ReleaseState,
}

/// Sub-views of the cluster page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewSlot {
    CustomizationMessage,
    DeploymentResult,
    DeploymentControl,
    ActiveTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewAction {
    Render,
    UpdateProgress,
    OnNewTask,
    OnNewNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub topic: Topic,
    pub slot: ViewSlot,
    pub action: ViewAction,
}

impl Binding {
    pub fn new(topic: Topic, slot: ViewSlot, action: ViewAction) -> Self {
        Self { topic, slot, action }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A reaction a view must run for a dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub slot: ViewSlot,
    pub action: ViewAction,
    pub event: ModelEvent,
}

/// Subscriptions owned by one page, in registration order.
#[derive(Debug, Default)]
pub struct EventRouter {
    bindings: Vec<(SubscriptionId, Binding)>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding. Binding the same thing twice returns the existing id.
    pub fn bind(&mut self, binding: Binding) -> SubscriptionId {
        if let Some((id, _)) = self.bindings.iter().find(|(_, existing)| *existing == binding) {
            return *id;
        }
        let id = SubscriptionId(Uuid::new_v4());
        self.bindings.push((id, binding));
        id
    }

    pub fn bind_all(&mut self, bindings: impl IntoIterator<Item = Binding>) -> Vec<SubscriptionId> {
        bindings.into_iter().map(|binding| self.bind(binding)).collect()
    }

    pub fn unbind(&mut self, id: SubscriptionId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|(existing, _)| *existing != id);
        before != self.bindings.len()
    }

    /// Remove every binding the predicate selects, returning how many went away
    pub fn unbind_where(&mut self, mut predicate: impl FnMut(&Binding) -> bool) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(_, binding)| !predicate(binding));
        before - self.bindings.len()
    }

    pub fn unbind_slot(&mut self, slot: ViewSlot) -> usize {
        self.unbind_where(|binding| binding.slot == slot)
    }

    pub fn is_bound(&self, binding: &Binding) -> bool {
        self.bindings.iter().any(|(_, existing)| existing == binding)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().map(|(_, binding)| binding)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Reactions for one event, in registration order
    pub fn route(&self, event: &ModelEvent) -> Vec<Reaction> {
        let topic = event.topic();
        self.bindings
            .iter()
            .filter(|(_, binding)| binding.topic == topic)
            .map(|(_, binding)| Reaction {
                slot: binding.slot,
                action: binding.action,
                event: event.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_is_idempotent() {
        let mut router = EventRouter::new();
        let binding = Binding::new(Topic::TaskAdded, ViewSlot::DeploymentResult, ViewAction::OnNewTask);

        let first = router.bind(binding);
        let second = router.bind(binding);

        assert_eq!(first, second);
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_route_matches_topic_only() {
        let mut router = EventRouter::new();
        router.bind(Binding::new(Topic::TaskStatus(1), ViewSlot::DeploymentResult, ViewAction::Render));
        router.bind(Binding::new(Topic::TaskStatus(2), ViewSlot::DeploymentResult, ViewAction::Render));
        router.bind(Binding::new(Topic::TaskProgress(1), ViewSlot::DeploymentControl, ViewAction::UpdateProgress));

        let reactions = router.route(&ModelEvent::TaskStatusChanged {
            task_id: 1,
            status: TaskStatus::Ready,
        });

        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].slot, ViewSlot::DeploymentResult);
        assert_eq!(reactions[0].action, ViewAction::Render);
    }

    #[test]
    fn test_unbind_where_and_clear() {
        let mut router = EventRouter::new();
        let id = router.bind(Binding::new(Topic::NodeAdded, ViewSlot::DeploymentControl, ViewAction::OnNewNode));
        router.bind(Binding::new(Topic::TaskStatus(5), ViewSlot::DeploymentControl, ViewAction::Render));
        router.bind(Binding::new(Topic::TaskStatus(5), ViewSlot::DeploymentResult, ViewAction::Render));

        let removed = router.unbind_where(|binding| binding.topic == Topic::TaskStatus(5));
        assert_eq!(removed, 2);
        assert!(router.unbind(id));
        assert!(!router.unbind(id));

        router.bind(Binding::new(Topic::ReleaseState, ViewSlot::DeploymentControl, ViewAction::Render));
        router.clear();
        assert!(router.is_empty());
    }
}
