use serde::{Deserialize, Serialize};

// --- Catalyst Center API types ---

/// Most intent API responses wrap their payload in `{"response": ...}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: T,
}

#[derive(Debug, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "Token")]
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    #[serde(default)]
    pub management_ip_address: Option<String>,
    #[serde(default)]
    pub instance_uuid: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub reachability_status: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub last_update_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceDetail {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInterface {
    pub id: String,
    #[serde(default)]
    pub port_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub name: String,
    pub template_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDevice {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "detailedStatusMessage")]
    pub detailed_status_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeploymentDevice>,
}

impl DeploymentStatusReport {
    /// First device's detailed message, or the whole report when absent
    pub fn detail(&self) -> String {
        self.devices
            .first()
            .and_then(|d| d.detailed_status_message.clone())
            .unwrap_or_else(|| serde_json::to_string(self).unwrap_or_default())
    }
}

// --- Request types ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceType {
    pub product_family: String,
    pub product_series: String,
}

/// Body for both template create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub project_id: String,
    pub author: String,
    pub software_type: String,
    pub device_types: Vec<DeviceType>,
    pub template_content: String,
    pub version: String,
    pub language: String,
}

impl TemplateBody {
    pub fn ios_xe(
        name: &str,
        project_id: &str,
        author: &str,
        device_types: Vec<DeviceType>,
        content: &str,
    ) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            project_id: project_id.to_string(),
            author: author.to_string(),
            software_type: "IOS-XE".to_string(),
            device_types,
            template_content: content.to_string(),
            version: "2".to_string(),
            language: "VELOCITY".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VersionRequest {
    pub template_id: String,
    pub comments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployRequest {
    pub template_id: String,
    pub target_info: Vec<TargetInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployResponse {
    #[serde(default)]
    pub deployment_id: Option<String>,
}
