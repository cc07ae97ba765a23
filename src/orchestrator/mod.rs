//! Template lifecycle state machine.
//!
//! A submission walks `TemplateRendered -> TemplateUpserting ->
//! TemplateVersioned -> Deploying -> Polling`, one guarded transition at a
//! time. Any controller failure on the way settles the workflow in
//! `Deployed(Fail)` with the error text; nothing is retried automatically.
//! Polling is driven by the operator and ends in `Deployed(Success)` (after
//! the template is deleted) or `Deployed(Fail)` (template kept for inspection).

mod context;
mod state;

pub use context::WorkflowSession;
pub use state::{DeploymentOutcome, WorkflowState};

use crate::config::{AuthMode, ServerEntry, TemplateSettings};
use crate::controller::types::{DeviceType, TemplateBody};
use crate::controller::{ControllerApi, ControllerError, ControllerFacade, ControllerSession, PollOutcome};
use crate::models::{
    template_name, DeploymentRecord, DeploymentStatus, DeviceInventory, DeviceRecord, InterfaceMap, TemplateIdentity,
    VlanEntry,
};
use crate::render::{self, ConfigRenderer, ValidationError};

/// Errors returned to the caller. Controller failures during a submission
/// are not errors: they settle the workflow into `Deployed(Fail)`.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("cannot {operation} while {state}")]
    InvalidState { operation: &'static str, state: String },
    #[error("no device selected")]
    NoDeviceSelected,
    #[error("unknown device: {0}")]
    UnknownDevice(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to log in: {0}")]
    Auth(ControllerError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Drives one operator's workflow against the controller
pub struct Orchestrator<A> {
    facade: ControllerFacade<A>,
    renderer: ConfigRenderer,
    auth_mode: AuthMode,
    templates: TemplateSettings,
}

impl<A: ControllerApi> Orchestrator<A> {
    pub fn new(
        facade: ControllerFacade<A>,
        renderer: ConfigRenderer,
        auth_mode: AuthMode,
        templates: TemplateSettings,
    ) -> Self {
        Self {
            facade,
            renderer,
            auth_mode,
            templates,
        }
    }

    #[cfg(test)]
    pub fn facade(&self) -> &ControllerFacade<A> {
        &self.facade
    }

    fn controller<'a>(&self, ctx: &'a WorkflowSession) -> Result<&'a ControllerSession, WorkflowError> {
        if !ctx.is_authenticated() {
            return Err(WorkflowError::NotAuthenticated);
        }
        ctx.controller.as_ref().ok_or(WorkflowError::NotAuthenticated)
    }

    // --- Idle -> Authenticated ---

    /// Check the operator's credentials against the controller.
    ///
    /// On failure the session is left logged out.
    pub async fn login(
        &self,
        ctx: &mut WorkflowSession,
        server_key: &str,
        server: &ServerEntry,
        username: &str,
        password: &str,
    ) -> Result<(), WorkflowError> {
        let base_url = server.base_url();
        *ctx = WorkflowSession::new(ctx.id.clone());

        let operator = self
            .facade
            .authenticate(&base_url, username, password)
            .await
            .map_err(WorkflowError::Auth)?;

        let session = match &self.auth_mode {
            AuthMode::Single => operator,
            AuthMode::Dual { username: write_user, password: write_pass } => self
                .facade
                .authenticate(&base_url, write_user, write_pass)
                .await
                .map_err(WorkflowError::Auth)?,
        };

        ctx.server = Some(server_key.to_string());
        ctx.author = Some(username.to_string());
        ctx.controller = Some(session);
        ctx.state = WorkflowState::Authenticated;
        tracing::info!("Operator {} logged in to {}", username, server_key);
        Ok(())
    }

    pub fn logout(&self, ctx: &mut WorkflowSession) {
        if let Some(author) = &ctx.author {
            tracing::info!("Operator {} logged out", author);
        }
        *ctx = WorkflowSession::new(ctx.id.clone());
    }

    // --- Device inventory and selection ---

    /// Replace the inventory with switches whose hostname contains `filter`
    pub async fn search_devices<'a>(
        &self,
        ctx: &'a mut WorkflowSession,
        filter: &str,
    ) -> Result<&'a DeviceInventory, WorkflowError> {
        let session = self.controller(ctx)?;
        let devices = self.facade.list_devices(session, filter).await?;
        ctx.devices = devices;

        // The selected device may have dropped out of the new results
        if ctx.target_device.is_some() && ctx.target().is_none() {
            ctx.target_device = None;
            if ctx.state == WorkflowState::DeviceSelected {
                ctx.state = WorkflowState::Authenticated;
            }
        }
        Ok(&ctx.devices)
    }

    /// Choose the provisioning target. Abandons any deployment being polled
    /// (the controller-side deployment keeps running).
    pub fn select_device(&self, ctx: &mut WorkflowSession, management_ip: &str) -> Result<(), WorkflowError> {
        self.controller(ctx)?;
        if !ctx.devices.contains_key(management_ip) {
            return Err(WorkflowError::UnknownDevice(management_ip.to_string()));
        }
        ctx.clear_submission();
        ctx.target_device = Some(management_ip.to_string());
        ctx.state = WorkflowState::DeviceSelected;
        Ok(())
    }

    /// The selected device, loading its port map on first access
    pub async fn target_device(&self, ctx: &mut WorkflowSession) -> Result<DeviceRecord, WorkflowError> {
        let session = self.controller(ctx)?.clone();
        let ip = ctx.target_device.clone().ok_or(WorkflowError::NoDeviceSelected)?;
        let device = ctx
            .devices
            .get_mut(&ip)
            .ok_or_else(|| WorkflowError::UnknownDevice(ip.clone()))?;

        if device.interfaces.is_none() {
            let ports = self.facade.get_interfaces(&session, &device.id).await?;
            tracing::info!("Loaded {} assignable ports for {}", ports.len(), device.hostname);
            device.interfaces = Some(ports);
        }
        Ok(device.clone())
    }

    // --- Submission ---

    /// Render the form and push it to the selected device.
    ///
    /// Form errors are returned before any controller call, and ports the
    /// device does not offer are rejected before any template call. Once the
    /// payload is rendered the result is always a deployment record: either
    /// in progress (poll for the outcome) or failed.
    pub async fn submit(
        &self,
        ctx: &mut WorkflowSession,
        entries: &[VlanEntry],
    ) -> Result<DeploymentRecord, WorkflowError> {
        self.controller(ctx)?;
        if !ctx.state.accepts_submission() {
            return Err(WorkflowError::InvalidState {
                operation: "submit",
                state: ctx.state.to_string(),
            });
        }
        if ctx.target_device.is_none() {
            return Err(WorkflowError::NoDeviceSelected);
        }

        tracing::info!("Generating template...");
        let payload = self.renderer.render(entries)?;
        let device = self.target_device(ctx).await?;
        render::check_ports(entries, device.interfaces.as_ref().unwrap_or(&InterfaceMap::new()))?;

        ctx.clear_submission();
        ctx.template_payload = Some(payload);
        ctx.state = WorkflowState::TemplateRendered;

        while !ctx.state.is_resting() {
            match self.step(ctx, &device).await {
                Ok(next) => {
                    tracing::debug!("Workflow {} -> {}", ctx.state, next);
                    ctx.state = next;
                }
                Err(e) => self.settle_failure(ctx, e.to_string()),
            }
        }

        ctx.deployment.clone().ok_or(WorkflowError::InvalidState {
            operation: "submit",
            state: ctx.state.to_string(),
        })
    }

    /// Perform the transition out of the current in-flight state
    async fn step(&self, ctx: &mut WorkflowSession, device: &DeviceRecord) -> Result<WorkflowState, ControllerError> {
        let session = ctx.controller.clone().ok_or_else(|| ControllerError::Auth("session lost".into()))?;

        match &ctx.state {
            WorkflowState::TemplateRendered => {
                // The controller is the source of truth; never reuse ids
                // from an earlier submission.
                let project_id = self.facade.find_project(&session, &self.templates.project).await?;
                let name = template_name(&self.templates.template, ctx.author.as_deref().unwrap_or_default());
                let template_id = self.facade.find_template(&session, &project_id, &name).await?;
                ctx.template = Some(TemplateIdentity {
                    project_id,
                    name,
                    template_id,
                });
                Ok(WorkflowState::TemplateUpserting)
            }
            WorkflowState::TemplateUpserting => {
                let identity = ctx.template.as_mut().ok_or_else(|| missing("template identity"))?;
                let body = TemplateBody::ios_xe(
                    &identity.name,
                    &identity.project_id,
                    ctx.author.as_deref().unwrap_or_default(),
                    vec![DeviceType {
                        product_family: device.family.clone(),
                        product_series: device.series.clone(),
                    }],
                    ctx.template_payload.as_deref().unwrap_or_default(),
                );

                let template_id = self
                    .facade
                    .upsert_template(&session, identity.template_id.as_deref(), body)
                    .await?;
                identity.template_id = Some(template_id);
                Ok(WorkflowState::TemplateVersioned)
            }
            WorkflowState::TemplateVersioned => {
                tracing::info!("Deploying template to {}.", device.hostname);
                ctx.deployment = Some(DeploymentRecord::in_progress(None));
                Ok(WorkflowState::Deploying)
            }
            WorkflowState::Deploying => {
                let template_id = ctx
                    .template
                    .as_ref()
                    .and_then(|t| t.template_id.clone())
                    .ok_or_else(|| missing("template id"))?;
                let deployment_id = self.facade.deploy(&session, &template_id, &device.id).await?;
                tracing::info!("Deployment {} started", deployment_id);
                ctx.deployment = Some(DeploymentRecord::in_progress(Some(deployment_id)));
                Ok(WorkflowState::Polling)
            }
            other => Err(ControllerError::Remote(format!("no transition out of {}", other))),
        }
    }

    fn settle_failure(&self, ctx: &mut WorkflowSession, detail: String) {
        tracing::error!("Error deploying template: {}", detail);
        let deployment_id = ctx.deployment.as_ref().and_then(|d| d.deployment_id.clone());
        ctx.deployment = Some(DeploymentRecord {
            deployment_id,
            status: DeploymentStatus::Fail,
            error: Some(detail.clone()),
        });
        ctx.state = WorkflowState::Deployed(DeploymentOutcome::Fail { detail });
    }

    // --- Polling ---

    /// Query the deployment once and apply the terminal rule.
    ///
    /// Settled workflows return their record without contacting the controller.
    pub async fn poll(&self, ctx: &mut WorkflowSession) -> Result<DeploymentRecord, WorkflowError> {
        let session = self.controller(ctx)?.clone();
        match &ctx.state {
            WorkflowState::Polling => {}
            WorkflowState::Deployed(_) => {
                return ctx.deployment.clone().ok_or(WorkflowError::InvalidState {
                    operation: "poll",
                    state: ctx.state.to_string(),
                });
            }
            other => {
                return Err(WorkflowError::InvalidState {
                    operation: "poll",
                    state: other.to_string(),
                })
            }
        }

        let deployment_id = ctx
            .deployment
            .as_ref()
            .and_then(|d| d.deployment_id.clone())
            .ok_or(WorkflowError::InvalidState {
                operation: "poll",
                state: ctx.state.to_string(),
            })?;

        tracing::info!("Checking template deployment status...");
        match self.facade.poll_status(&session, &deployment_id).await {
            PollOutcome::Success => {
                tracing::info!("Deployment complete!");
                self.cleanup(ctx, &session).await;
                ctx.deployment = Some(DeploymentRecord {
                    deployment_id: Some(deployment_id),
                    status: DeploymentStatus::Success,
                    error: None,
                });
                ctx.state = WorkflowState::Deployed(DeploymentOutcome::Success);
            }
            PollOutcome::Failure(detail) => {
                tracing::info!("Deployment Failed! {}", detail);
                ctx.deployment = Some(DeploymentRecord {
                    deployment_id: Some(deployment_id),
                    status: DeploymentStatus::Fail,
                    error: Some(detail.clone()),
                });
                ctx.state = WorkflowState::Deployed(DeploymentOutcome::Fail { detail });
            }
            PollOutcome::InProgress(detail) => {
                ctx.deployment = Some(DeploymentRecord {
                    deployment_id: Some(deployment_id),
                    status: DeploymentStatus::InProgress,
                    error: Some(detail),
                });
            }
            PollOutcome::Unknown(reason) => {
                tracing::debug!("Deployment status unknown, will retry on next poll: {}", reason);
                ctx.deployment = Some(DeploymentRecord {
                    deployment_id: Some(deployment_id),
                    status: DeploymentStatus::InProgress,
                    error: Some(reason),
                });
            }
        }

        ctx.deployment.clone().ok_or(WorkflowError::InvalidState {
            operation: "poll",
            state: ctx.state.to_string(),
        })
    }

    /// Delete the one-shot template after a successful deployment
    async fn cleanup(&self, ctx: &mut WorkflowSession, session: &ControllerSession) {
        let Some(template_id) = ctx.template.as_mut().and_then(|t| t.template_id.take()) else {
            return;
        };
        ctx.cleanup_warning = self.facade.delete_template(session, &template_id).await;
    }

    // --- Reset ---

    /// Forget the last submission, keeping login, inventory and target
    pub fn reset(&self, ctx: &mut WorkflowSession) -> Result<(), WorkflowError> {
        self.controller(ctx)?;
        ctx.clear_submission();
        ctx.state = if ctx.target().is_some() {
            WorkflowState::DeviceSelected
        } else {
            ctx.target_device = None;
            WorkflowState::Authenticated
        };
        Ok(())
    }
}

fn missing(what: &str) -> ControllerError {
    ControllerError::Remote(format!("{} missing from workflow", what))
}
