use std::sync::OnceLock;
use std::time::Duration;

use crate::models::{DeviceInventory, DeviceRecord, InterfaceMap, PortName, COMMIT_COMMENT, SWITCH_FAMILY};

use super::types::*;
use super::{ControllerApi, ControllerError, ControllerSession, Result};

/// Result of a single deployment status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Success,
    Failure(String),
    InProgress(String),
    /// The query itself failed; status is unknown, try again later
    Unknown(String),
}

fn switch_port_re() -> &'static regex_lite::Regex {
    static RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    // First-module front-panel ports only. Slot 0 is the management port;
    // NIM (x/1/x) and uplink modules are skipped, as are TenGig/AppGig.
    RE.get_or_init(|| regex_lite::Regex::new(r"^GigabitEthernet[1-9]/0/\d+$").expect("static regex"))
}

fn uuid_shape_re() -> &'static regex_lite::Regex {
    static RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex_lite::Regex::new(
            r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$",
        )
        .expect("static regex")
    })
}

/// Whether a port may be offered for VLAN assignment
pub fn is_assignable_port(name: &str) -> bool {
    switch_port_re().is_match(name)
}

/// Keep assignable ports only, mapping port name to interface id
pub fn filter_switch_ports(interfaces: Vec<DeviceInterface>) -> InterfaceMap {
    interfaces
        .into_iter()
        .filter_map(|iface| {
            let name = iface.port_name?;
            is_assignable_port(&name).then_some((PortName::from(name), iface.id))
        })
        .collect()
}

/// Extract the deployment UUID from the controller's deploymentId field.
///
/// The controller reports deploy errors inside this field, so anything that
/// is not UUID-shaped after the last `:` is a rejection.
pub fn parse_deployment_id(raw: &str) -> Option<String> {
    let candidate = raw.rsplit(':').next().unwrap_or(raw).trim();
    uuid_shape_re()
        .is_match(candidate)
        .then(|| candidate.to_string())
}

fn format_last_update(epoch_ms: Option<i64>) -> String {
    epoch_ms
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|ts| ts.format("%b %d %Y, %I:%M%p").to_string())
        .unwrap_or_default()
}

fn to_record(device: NetworkDevice) -> Option<DeviceRecord> {
    Some(DeviceRecord {
        management_ip: device.management_ip_address?,
        id: device.instance_uuid?,
        hostname: device.hostname.unwrap_or_default(),
        platform: device.platform_id.unwrap_or_default(),
        software_version: device.software_version.unwrap_or_default(),
        reachability: device.reachability_status.unwrap_or_default(),
        family: device.family.unwrap_or_default(),
        series: device.series.unwrap_or_default(),
        last_update: format_last_update(device.last_update_time),
        location: None,
        interfaces: None,
    })
}

/// Workflow-facing view of the controller.
///
/// Owns no state besides the raw client and the settle delay; every call
/// takes the session it should run under.
pub struct ControllerFacade<A> {
    api: A,
    settle_delay: Duration,
}

impl<A: ControllerApi> ControllerFacade<A> {
    pub fn new(api: A, settle_delay: Duration) -> Self {
        Self { api, settle_delay }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The controller gives no read-after-write guarantee after mutations
    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    pub async fn authenticate(&self, base_url: &str, username: &str, password: &str) -> Result<ControllerSession> {
        let token = self.api.authenticate(base_url, username, password).await?;
        if token.is_empty() {
            return Err(ControllerError::Auth("Invalid DNAC access token".to_string()));
        }
        Ok(ControllerSession {
            base_url: base_url.to_string(),
            username: username.to_string(),
            access_token: token,
        })
    }

    /// Switches whose hostname contains `filter` (case sensitive), with location
    pub async fn list_devices(&self, session: &ControllerSession, filter: &str) -> Result<DeviceInventory> {
        let hostname = format!(".*{}.*", filter);
        let devices = self.api.list_devices(session, SWITCH_FAMILY, &hostname).await?;

        let mut inventory = DeviceInventory::new();
        for device in devices {
            let Some(mut record) = to_record(device) else {
                tracing::debug!("Skipping device without management IP or instance id");
                continue;
            };
            record.location = self.api.device_detail(session, &record.id).await?.location;
            inventory.insert(record.management_ip.clone(), record);
        }

        tracing::info!("Found {} devices matching '{}'", inventory.len(), filter);
        Ok(inventory)
    }

    pub async fn get_interfaces(&self, session: &ControllerSession, device_id: &str) -> Result<InterfaceMap> {
        let interfaces = self.api.device_interfaces(session, device_id).await?;
        Ok(filter_switch_ports(interfaces))
    }

    pub async fn find_project(&self, session: &ControllerSession, name: &str) -> Result<String> {
        let projects = self.api.list_projects(session, name).await?;
        let project = projects
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ControllerError::NotFound {
                resource: "project",
                name: name.to_string(),
            })?;
        tracing::info!("Found project ID: {}", project.id);
        Ok(project.id)
    }

    pub async fn find_template(&self, session: &ControllerSession, project_id: &str, name: &str) -> Result<Option<String>> {
        let templates = self.api.list_templates(session, project_id).await?;
        let found = templates
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.template_id);
        match &found {
            Some(id) => tracing::info!("Found template ID: {}", id),
            None => tracing::info!("No template named {}", name),
        }
        Ok(found)
    }

    /// Create the template, or update it in place when `existing` is set.
    /// Returns the template id; the content is not deployable until committed.
    pub async fn write_template(
        &self,
        session: &ControllerSession,
        existing: Option<&str>,
        mut body: TemplateBody,
    ) -> Result<String> {
        tracing::info!("Uploading template {}...", body.name);
        match existing {
            Some(id) => {
                body.id = Some(id.to_string());
                self.api.update_template(session, &body).await?;
                self.settle().await;
                tracing::info!("Template updated.");
                Ok(id.to_string())
            }
            None => {
                self.api.create_template(session, &body.project_id, &body).await?;
                self.settle().await;
                tracing::info!("Template created.");
                self.find_template(session, &body.project_id, &body.name)
                    .await?
                    .ok_or_else(|| ControllerError::NotFound {
                        resource: "template",
                        name: body.name.clone(),
                    })
            }
        }
    }

    /// Version the template's current content so it can be deployed
    pub async fn commit_template(&self, session: &ControllerSession, template_id: &str) -> Result<()> {
        tracing::info!("Committing new template version...");
        self.api.version_template(session, template_id, COMMIT_COMMENT).await?;
        self.settle().await;
        tracing::info!("Template committed.");
        Ok(())
    }

    /// Create-or-update followed by a commit, on either path
    pub async fn upsert_template(
        &self,
        session: &ControllerSession,
        existing: Option<&str>,
        body: TemplateBody,
    ) -> Result<String> {
        let template_id = self.write_template(session, existing, body).await?;
        self.commit_template(session, &template_id).await?;
        Ok(template_id)
    }

    pub async fn deploy(&self, session: &ControllerSession, template_id: &str, device_id: &str) -> Result<String> {
        let raw = self.api.deploy_template(session, template_id, device_id).await?;
        parse_deployment_id(&raw).ok_or(ControllerError::DeployRejected(raw))
    }

    /// Never fails: query errors come back as [`PollOutcome::Unknown`]
    pub async fn poll_status(&self, session: &ControllerSession, deployment_id: &str) -> PollOutcome {
        let report = match self.api.deployment_status(session, deployment_id).await {
            Ok(report) => report,
            Err(e) if e.is_transient() => {
                tracing::warn!("Error checking deployment status: {}", e);
                return PollOutcome::Unknown(e.to_string());
            }
            Err(e) => {
                tracing::error!("Error checking deployment status: {}", e);
                return PollOutcome::Unknown(e.to_string());
            }
        };

        let status = report.status.clone().unwrap_or_default();
        tracing::info!("Deployment status: {}", status);
        match status.as_str() {
            "SUCCESS" => PollOutcome::Success,
            "FAILURE" => PollOutcome::Failure(report.detail()),
            _ => PollOutcome::InProgress(report.detail()),
        }
    }

    /// Best-effort delete. Returns the failure message instead of an error so
    /// a cleanup problem can never change the deployment outcome.
    pub async fn delete_template(&self, session: &ControllerSession, template_id: &str) -> Option<String> {
        tracing::info!("Deleting template {}...", template_id);
        match self.api.delete_template(session, template_id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Failed to delete template {}: {}", template_id, e);
                Some(e.to_string())
            }
        }
    }
}
