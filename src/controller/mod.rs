pub mod client;
pub mod facade;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

pub use client::ControllerClient;
pub use facade::{ControllerFacade, PollOutcome};
use types::*;

/// Errors from the controller, classified by how the workflow must react
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Timeouts, connection resets, 5xx and 429
    #[error("controller temporarily unavailable: {0}")]
    Transient(String),
    #[error("controller error: {0}")]
    Remote(String),
    /// The deploy call succeeded at the transport level but the deployment
    /// id field carried something other than a UUID (typically an error).
    #[error("deployment rejected: {0}")]
    DeployRejected(String),
    #[error("{resource} not found: {name}")]
    NotFound { resource: &'static str, name: String },
}

impl ControllerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ControllerError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

/// An authenticated handle to one controller
#[derive(Clone, PartialEq, Eq)]
pub struct ControllerSession {
    pub base_url: String,
    pub username: String,
    pub access_token: String,
}

impl std::fmt::Debug for ControllerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerSession")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Raw controller operations, one REST call each.
///
/// [`ControllerFacade`] layers the workflow policies (settle delays, id
/// validation, error swallowing) on top of this trait.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Returns the access token
    async fn authenticate(&self, base_url: &str, username: &str, password: &str) -> Result<String>;

    async fn list_devices(&self, session: &ControllerSession, family: &str, hostname: &str) -> Result<Vec<NetworkDevice>>;

    async fn device_detail(&self, session: &ControllerSession, device_id: &str) -> Result<DeviceDetail>;

    async fn device_interfaces(&self, session: &ControllerSession, device_id: &str) -> Result<Vec<DeviceInterface>>;

    async fn list_projects(&self, session: &ControllerSession, name: &str) -> Result<Vec<Project>>;

    async fn list_templates(&self, session: &ControllerSession, project_id: &str) -> Result<Vec<TemplateSummary>>;

    async fn create_template(&self, session: &ControllerSession, project_id: &str, body: &TemplateBody) -> Result<()>;

    async fn update_template(&self, session: &ControllerSession, body: &TemplateBody) -> Result<()>;

    async fn version_template(&self, session: &ControllerSession, template_id: &str, comments: &str) -> Result<()>;

    /// Returns the raw deployment id field, unvalidated
    async fn deploy_template(&self, session: &ControllerSession, template_id: &str, device_id: &str) -> Result<String>;

    async fn deployment_status(&self, session: &ControllerSession, deployment_id: &str) -> Result<DeploymentStatusReport>;

    async fn delete_template(&self, session: &ControllerSession, template_id: &str) -> Result<()>;
}
