/*
[INPUT]:  Contrail settings from the API, gateway edits from the user
[OUTPUT]: Working copy vs last-synced settings, control enablement, lock state
[POS]:    View - contrail tab (the only editable tab)
[UPDATE]: When contrail settings gain new editable fields
*/

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use nailgun_adapter::{
    ClusterStatus, ContrailAttributes, ContrailSettings, TaskName, WanGateway,
};
use regex::Regex;

use crate::error::{PageError, PageResult, ValidationError};
use crate::events::{Binding, ClusterAttribute, Topic, ViewAction, ViewSlot};
use crate::model::ClusterModel;

const MAX_HOSTNAME_LEN: usize = 253;

// RFC 1123 labels separated by dots
static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("hostname pattern is valid")
});

/// Validate user input for a new WAN gateway.
pub fn validate_gateway(hostname: &str, ip: &str) -> Result<WanGateway, ValidationError> {
    let hostname = hostname.trim();
    let ip = ip.trim();
    if hostname.is_empty() {
        return Err(ValidationError::EmptyField { field: "hostname" });
    }
    if ip.is_empty() {
        return Err(ValidationError::EmptyField { field: "ip" });
    }
    if hostname.len() > MAX_HOSTNAME_LEN || !HOSTNAME_RE.is_match(hostname) {
        return Err(ValidationError::InvalidHostname(hostname.to_string()));
    }
    let addr: Ipv4Addr = ip
        .parse()
        .map_err(|_| ValidationError::InvalidIp(ip.to_string()))?;
    Ok(WanGateway {
        hostname: hostname.to_string(),
        ip: addr.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub inputs_enabled: bool,
    pub apply_enabled: bool,
    pub revert_enabled: bool,
    pub load_defaults_enabled: bool,
}

impl ControlState {
    /// Everything disabled while a request is in flight
    pub fn disabled() -> Self {
        Self {
            inputs_enabled: false,
            apply_enabled: false,
            revert_enabled: false,
            load_defaults_enabled: false,
        }
    }

    pub fn for_changes(has_changes: bool) -> Self {
        Self {
            inputs_enabled: true,
            apply_enabled: has_changes,
            revert_enabled: has_changes,
            load_defaults_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContrailSnapshot {
    pub loaded: bool,
    pub locked: bool,
    pub as_number: Option<u32>,
    pub gateways: Vec<WanGateway>,
    pub controls: ControlState,
}

impl Default for ContrailSnapshot {
    fn default() -> Self {
        Self {
            loaded: false,
            locked: false,
            as_number: None,
            gateways: Vec::new(),
            controls: ControlState::disabled(),
        }
    }
}

#[derive(Debug)]
pub struct ContrailTab {
    working: Option<ContrailAttributes>,
    synced: Option<ContrailAttributes>,
    controls: ControlState,
    snapshot: ContrailSnapshot,
    render_count: usize,
}

impl ContrailTab {
    pub fn new(model: &ClusterModel) -> Self {
        let mut tab = Self {
            working: None,
            synced: None,
            controls: ControlState::for_changes(false),
            snapshot: ContrailSnapshot::default(),
            render_count: 0,
        };
        if let Some(settings) = model.contrail() {
            tab.set_initial_data(settings.editable.clone());
        }
        tab
    }

    /// Lock state follows cluster status and deploy tasks
    pub fn bindings(model: &ClusterModel) -> Vec<Binding> {
        let mut bindings = vec![
            Binding::new(
                Topic::Cluster(ClusterAttribute::Status),
                ViewSlot::ActiveTab,
                ViewAction::Render,
            ),
            Binding::new(Topic::TaskAdded, ViewSlot::ActiveTab, ViewAction::OnNewTask),
        ];
        bindings.extend(
            model
                .tasks()
                .iter()
                .filter(|task| task.name == TaskName::Deploy)
                .map(|task| Self::task_binding(task.id)),
        );
        bindings
    }

    fn task_binding(task_id: u64) -> Binding {
        Binding::new(Topic::TaskStatus(task_id), ViewSlot::ActiveTab, ViewAction::Render)
    }

    pub fn on_new_task(&mut self, model: &ClusterModel, task_id: u64) -> Vec<Binding> {
        match model.tasks().get(task_id) {
            Some(task) if task.name == TaskName::Deploy => {
                self.render(model);
                vec![Self::task_binding(task_id)]
            }
            _ => Vec::new(),
        }
    }

    pub fn is_locked(model: &ClusterModel) -> bool {
        model.cluster().status != ClusterStatus::New
            || model.running_task_named(TaskName::Deploy).is_some()
    }

    pub fn needs_load(&self) -> bool {
        self.synced.is_none()
    }

    /// Record server-confirmed settings as both working copy and last-synced
    pub fn set_initial_data(&mut self, attributes: ContrailAttributes) {
        self.synced = Some(attributes.clone());
        self.working = Some(attributes);
        self.check_for_changes();
    }

    pub fn working(&self) -> Option<&ContrailAttributes> {
        self.working.as_ref()
    }

    pub fn synced(&self) -> Option<&ContrailAttributes> {
        self.synced.as_ref()
    }

    pub fn has_changes(&self) -> bool {
        match (&self.working, &self.synced) {
            (Some(working), Some(synced)) => working != synced,
            _ => false,
        }
    }

    fn check_for_changes(&mut self) {
        self.controls = ControlState::for_changes(self.has_changes());
    }

    fn ensure_editable(&self, model: &ClusterModel) -> PageResult<()> {
        if Self::is_locked(model) {
            return Err(PageError::Locked);
        }
        if self.working.is_none() {
            return Err(PageError::NotLoaded);
        }
        Ok(())
    }

    pub fn add_gateway(&mut self, model: &ClusterModel, hostname: &str, ip: &str) -> PageResult<()> {
        self.ensure_editable(model)?;
        let gateway = validate_gateway(hostname, ip)?;
        if let Some(working) = self.working.as_mut() {
            working.wan_gateways.push(gateway);
        }
        self.check_for_changes();
        self.render(model);
        Ok(())
    }

    pub fn delete_gateway(&mut self, model: &ClusterModel, index: usize) -> PageResult<WanGateway> {
        self.ensure_editable(model)?;
        let Some(working) = self.working.as_mut() else {
            return Err(PageError::NotLoaded);
        };
        let len = working.wan_gateways.len();
        if index >= len {
            return Err(ValidationError::GatewayIndex { index, len }.into());
        }
        let removed = working.wan_gateways.remove(index);
        self.check_for_changes();
        self.render(model);
        Ok(removed)
    }

    pub fn set_as_number(&mut self, model: &ClusterModel, as_number: u32) -> PageResult<()> {
        self.ensure_editable(model)?;
        if let Some(working) = self.working.as_mut() {
            working.as_number = as_number;
        }
        self.check_for_changes();
        self.render(model);
        Ok(())
    }

    pub fn revert_changes(&mut self, model: &ClusterModel) {
        self.working = self.synced.clone();
        self.check_for_changes();
        self.render(model);
    }

    /// Disable controls and hand out the body to save
    pub fn begin_apply(&mut self, model: &ClusterModel) -> PageResult<ContrailSettings> {
        self.ensure_editable(model)?;
        let editable = self.working.clone().ok_or(PageError::NotLoaded)?;
        self.controls = ControlState::disabled();
        self.render(model);
        Ok(ContrailSettings { editable })
    }

    /// `saved` is `None` when the save failed; controls come back either way
    pub fn finish_apply(&mut self, model: &ClusterModel, saved: Option<&ContrailSettings>) {
        match saved {
            Some(settings) => self.set_initial_data(settings.editable.clone()),
            None => self.check_for_changes(),
        }
        self.render(model);
    }

    pub fn begin_load_defaults(&mut self, model: &ClusterModel) -> PageResult<()> {
        self.ensure_editable(model)?;
        self.controls = ControlState::disabled();
        self.render(model);
        Ok(())
    }

    /// Defaults replace the working copy only, so they show up as changes
    pub fn finish_load_defaults(&mut self, model: &ClusterModel, defaults: Option<&ContrailSettings>) {
        if let Some(defaults) = defaults {
            self.working = Some(defaults.editable.clone());
        }
        self.check_for_changes();
        self.render(model);
    }

    pub fn render(&mut self, model: &ClusterModel) {
        let locked = Self::is_locked(model);
        self.snapshot = ContrailSnapshot {
            loaded: self.working.is_some(),
            locked,
            as_number: self.working.as_ref().map(|working| working.as_number),
            gateways: self
                .working
                .as_ref()
                .map(|working| working.wan_gateways.clone())
                .unwrap_or_default(),
            controls: if locked || self.working.is_none() {
                ControlState::disabled()
            } else {
                self.controls
            },
        };
        self.render_count += 1;
    }

    pub fn snapshot(&self) -> &ContrailSnapshot {
        &self.snapshot
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }
}
