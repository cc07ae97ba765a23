use serde::{Deserialize, Serialize};

/// Comment attached to every template commit
pub const COMMIT_COMMENT: &str = "Commit via API";

/// VlanEntry is one row of the VLAN provisioning form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlanEntry {
    pub vlan_id: String,
    pub vlan_name: String,
    /// Newline-delimited port names
    pub ports: String,
}

impl VlanEntry {
    pub fn new(vlan_id: impl Into<String>, vlan_name: impl Into<String>, ports: impl Into<String>) -> Self {
        Self {
            vlan_id: vlan_id.into(),
            vlan_name: vlan_name.into(),
            ports: ports.into(),
        }
    }
}

/// TemplateIdentity names the controller template owned by one operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateIdentity {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// Template name for an operator: `<prefix>-<operator>`.
///
/// Distinct operators never share a name. The same operator logged in twice
/// does, and the two sessions will overwrite each other's template.
pub fn template_name(prefix: &str, operator: &str) -> String {
    format!("{}-{}", prefix, operator)
}
