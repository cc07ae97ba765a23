use serde::{Deserialize, Serialize};

/// Canonical deployment status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStatus {
    InProgress,
    Success,
    Fail,
}

/// DeploymentRecord tracks one template push to one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    pub status: DeploymentStatus,
    /// Failure detail, or the controller's latest message while in progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeploymentRecord {
    pub fn in_progress(deployment_id: Option<String>) -> Self {
        Self {
            deployment_id,
            status: DeploymentStatus::InProgress,
            error: None,
        }
    }
}

/// StatusResponse is what the status page renders
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_config: Option<String>,
}
