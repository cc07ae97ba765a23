//! In-memory controller that records every call, for workflow tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use super::types::*;
use super::{ControllerApi, ControllerError, ControllerSession, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate { username: String },
    ListDevices { family: String, hostname: String },
    DeviceDetail(String),
    DeviceInterfaces(String),
    ListProjects(String),
    ListTemplates(String),
    CreateTemplate(String),
    UpdateTemplate(String),
    VersionTemplate(String),
    DeployTemplate { template_id: String, device_id: String },
    DeploymentStatus(String),
    DeleteTemplate(String),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    token: Option<String>,
    rejected_users: HashSet<String>,
    projects: Vec<Project>,
    templates: Vec<TemplateSummary>,
    template_seq: u32,
    devices: Vec<(NetworkDevice, String)>,
    interfaces: HashMap<String, Vec<DeviceInterface>>,
    deploy_response: Option<Result<String>>,
    statuses: VecDeque<Result<DeploymentStatusReport>>,
    delete_error: Option<ControllerError>,
    failures: HashMap<&'static str, ControllerError>,
    last_tokens: Vec<String>,
}

#[derive(Default)]
pub struct MockController {
    state: Mutex<MockState>,
}

impl MockController {
    pub fn with_project(id: &str, name: &str) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
        });
        mock
    }

    pub fn report(status: &str, detail: Option<&str>) -> DeploymentStatusReport {
        DeploymentStatusReport {
            status: Some(status.to_string()),
            devices: vec![DeploymentDevice {
                status: Some(status.to_string()),
                detailed_status_message: detail.map(str::to_string),
            }],
        }
    }

    pub fn set_token(&self, token: &str) {
        self.state.lock().unwrap().token = Some(token.to_string());
    }

    pub fn reject_login(&self, username: &str) {
        self.state.lock().unwrap().rejected_users.insert(username.to_string());
    }

    pub fn add_device(&self, ip: &str, id: &str, hostname: &str, location: &str) {
        let device = NetworkDevice {
            management_ip_address: Some(ip.to_string()),
            instance_uuid: Some(id.to_string()),
            hostname: Some(hostname.to_string()),
            platform_id: Some("C9300-48P".to_string()),
            software_version: Some("17.9.4".to_string()),
            reachability_status: Some("Reachable".to_string()),
            family: Some("Switches and Hubs".to_string()),
            series: Some("Cisco Catalyst 9300 Series Switches".to_string()),
            last_update_time: Some(1_700_000_000_000),
        };
        self.state.lock().unwrap().devices.push((device, location.to_string()));
    }

    pub fn set_interfaces(&self, device_id: &str, ports: &[(&str, &str)]) {
        let ifaces = ports
            .iter()
            .map(|(name, id)| DeviceInterface {
                id: id.to_string(),
                port_name: Some(name.to_string()),
            })
            .collect();
        self.state.lock().unwrap().interfaces.insert(device_id.to_string(), ifaces);
    }

    pub fn add_template(&self, project_id: &str, name: &str, template_id: &str) {
        self.state.lock().unwrap().templates.push(TemplateSummary {
            name: name.to_string(),
            template_id: template_id.to_string(),
            project_id: Some(project_id.to_string()),
        });
    }

    pub fn set_deploy_response(&self, response: Result<String>) {
        self.state.lock().unwrap().deploy_response = Some(response);
    }

    pub fn push_status(&self, status: Result<DeploymentStatusReport>) {
        self.state.lock().unwrap().statuses.push_back(status);
    }

    pub fn fail_delete(&self, err: ControllerError) {
        self.state.lock().unwrap().delete_error = Some(err);
    }

    /// Make every call to `operation` fail with `err`
    pub fn fail_on(&self, operation: &'static str, err: ControllerError) {
        self.state.lock().unwrap().failures.insert(operation, err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn template_count(&self) -> usize {
        self.state.lock().unwrap().templates.len()
    }

    /// Access tokens seen on template-programmer calls, in order
    pub fn tokens_used(&self) -> Vec<String> {
        self.state.lock().unwrap().last_tokens.clone()
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn note_token(&self, session: &ControllerSession) {
        self.state.lock().unwrap().last_tokens.push(session.access_token.clone());
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn authenticate(&self, _base_url: &str, username: &str, _password: &str) -> Result<String> {
        self.record(Call::Authenticate { username: username.to_string() }, "authenticate")?;
        let state = self.state.lock().unwrap();
        if state.rejected_users.contains(username) {
            return Err(ControllerError::Auth("401 Unauthorized".to_string()));
        }
        Ok(state.token.clone().unwrap_or_else(|| format!("token-{}", username)))
    }

    async fn list_devices(&self, _session: &ControllerSession, family: &str, hostname: &str) -> Result<Vec<NetworkDevice>> {
        self.record(
            Call::ListDevices { family: family.to_string(), hostname: hostname.to_string() },
            "list_devices",
        )?;
        let needle = hostname.trim_start_matches(".*").trim_end_matches(".*");
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .filter(|(d, _)| d.hostname.as_deref().unwrap_or_default().contains(needle))
            .map(|(d, _)| d.clone())
            .collect())
    }

    async fn device_detail(&self, _session: &ControllerSession, device_id: &str) -> Result<DeviceDetail> {
        self.record(Call::DeviceDetail(device_id.to_string()), "device_detail")?;
        let state = self.state.lock().unwrap();
        let location = state
            .devices
            .iter()
            .find(|(d, _)| d.instance_uuid.as_deref() == Some(device_id))
            .map(|(_, loc)| loc.clone());
        Ok(DeviceDetail { location })
    }

    async fn device_interfaces(&self, _session: &ControllerSession, device_id: &str) -> Result<Vec<DeviceInterface>> {
        self.record(Call::DeviceInterfaces(device_id.to_string()), "device_interfaces")?;
        let state = self.state.lock().unwrap();
        Ok(state.interfaces.get(device_id).cloned().unwrap_or_default())
    }

    async fn list_projects(&self, session: &ControllerSession, name: &str) -> Result<Vec<Project>> {
        self.note_token(session);
        self.record(Call::ListProjects(name.to_string()), "list_projects")?;
        let state = self.state.lock().unwrap();
        Ok(state.projects.iter().filter(|p| p.name == name).cloned().collect())
    }

    async fn list_templates(&self, _session: &ControllerSession, project_id: &str) -> Result<Vec<TemplateSummary>> {
        self.record(Call::ListTemplates(project_id.to_string()), "list_templates")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .templates
            .iter()
            .filter(|t| t.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect())
    }

    async fn create_template(&self, _session: &ControllerSession, project_id: &str, body: &TemplateBody) -> Result<()> {
        self.record(Call::CreateTemplate(body.name.clone()), "create_template")?;
        let mut state = self.state.lock().unwrap();
        state.template_seq += 1;
        let template_id = format!("tmpl-{}", state.template_seq);
        state.templates.push(TemplateSummary {
            name: body.name.clone(),
            template_id,
            project_id: Some(project_id.to_string()),
        });
        Ok(())
    }

    async fn update_template(&self, _session: &ControllerSession, body: &TemplateBody) -> Result<()> {
        let id = body.id.clone().unwrap_or_default();
        self.record(Call::UpdateTemplate(id.clone()), "update_template")?;
        let state = self.state.lock().unwrap();
        if state.templates.iter().any(|t| t.template_id == id) {
            Ok(())
        } else {
            Err(ControllerError::Remote(format!("404 Not Found: template {}", id)))
        }
    }

    async fn version_template(&self, _session: &ControllerSession, template_id: &str, _comments: &str) -> Result<()> {
        self.record(Call::VersionTemplate(template_id.to_string()), "version_template")
    }

    async fn deploy_template(&self, _session: &ControllerSession, template_id: &str, device_id: &str) -> Result<String> {
        self.record(
            Call::DeployTemplate { template_id: template_id.to_string(), device_id: device_id.to_string() },
            "deploy_template",
        )?;
        let state = self.state.lock().unwrap();
        state
            .deploy_response
            .clone()
            .unwrap_or_else(|| Ok("0f4b2a3c-1d2e-4f5a-8b9c-0d1e2f3a4b5c".to_string()))
    }

    async fn deployment_status(&self, _session: &ControllerSession, deployment_id: &str) -> Result<DeploymentStatusReport> {
        self.record(Call::DeploymentStatus(deployment_id.to_string()), "deployment_status")?;
        let mut state = self.state.lock().unwrap();
        state
            .statuses
            .pop_front()
            .unwrap_or_else(|| Ok(Self::report("IN_PROGRESS", None)))
    }

    async fn delete_template(&self, _session: &ControllerSession, template_id: &str) -> Result<()> {
        self.record(Call::DeleteTemplate(template_id.to_string()), "delete_template")?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.delete_error.clone() {
            return Err(err);
        }
        state.templates.retain(|t| t.template_id != template_id);
        Ok(())
    }
}
