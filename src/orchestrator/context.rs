use crate::controller::ControllerSession;
use crate::models::{DeploymentRecord, DeviceInventory, DeviceRecord, StatusResponse, TemplateIdentity};

use super::state::WorkflowState;

/// Everything one operator's workflow knows between requests.
///
/// Passed by `&mut` through the orchestrator and persisted by a
/// [`WorkflowStore`](crate::session::WorkflowStore) after each request.
#[derive(Debug, Clone)]
pub struct WorkflowSession {
    pub id: String,
    pub state: WorkflowState,
    pub server: Option<String>,
    /// Operator login name; template author and name suffix
    pub author: Option<String>,
    /// Session used for every controller call after login
    pub controller: Option<ControllerSession>,
    pub devices: DeviceInventory,
    /// Management IP of the selected device
    pub target_device: Option<String>,
    pub template_payload: Option<String>,
    pub template: Option<TemplateIdentity>,
    pub deployment: Option<DeploymentRecord>,
    /// Last template cleanup failure; never shown as the deployment result
    pub cleanup_warning: Option<String>,
}

impl WorkflowSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: WorkflowState::Idle,
            server: None,
            author: None,
            controller: None,
            devices: DeviceInventory::new(),
            target_device: None,
            template_payload: None,
            template: None,
            deployment: None,
            cleanup_warning: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state != WorkflowState::Idle && self.controller.is_some()
    }

    pub fn target(&self) -> Option<&DeviceRecord> {
        self.target_device.as_ref().and_then(|ip| self.devices.get(ip))
    }

    /// Drop everything about the previous submission
    pub fn clear_submission(&mut self) {
        self.template_payload = None;
        self.template = None;
        self.deployment = None;
        self.cleanup_warning = None;
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            state: self.state.name().to_string(),
            status: self.deployment.as_ref().map(|d| d.status),
            error: self.deployment.as_ref().and_then(|d| d.error.clone()),
            deployed_config: self.template_payload.clone(),
        }
    }
}
