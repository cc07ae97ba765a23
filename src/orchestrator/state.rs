use serde::{Deserialize, Serialize};

/// How a deployment ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Success,
    Fail { detail: String },
}

/// Position of one operator's workflow in the template lifecycle.
///
/// `TemplateRendered` through `Deploying` only exist while a submission is
/// being driven; a stored session is always in one of the other states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Authenticated,
    DeviceSelected,
    TemplateRendered,
    TemplateUpserting,
    TemplateVersioned,
    Deploying,
    Polling,
    Deployed(DeploymentOutcome),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Authenticated => "authenticated",
            WorkflowState::DeviceSelected => "device_selected",
            WorkflowState::TemplateRendered => "template_rendered",
            WorkflowState::TemplateUpserting => "template_upserting",
            WorkflowState::TemplateVersioned => "template_versioned",
            WorkflowState::Deploying => "deploying",
            WorkflowState::Polling => "polling",
            WorkflowState::Deployed(DeploymentOutcome::Success) => "deployed_success",
            WorkflowState::Deployed(DeploymentOutcome::Fail { .. }) => "deployed_fail",
        }
    }

    /// States a submission stops in: waiting on the operator to poll, or done
    pub fn is_resting(&self) -> bool {
        matches!(self, WorkflowState::Polling | WorkflowState::Deployed(_))
    }

    /// A new form submission may start from here
    pub fn accepts_submission(&self) -> bool {
        matches!(
            self,
            WorkflowState::DeviceSelected | WorkflowState::Polling | WorkflowState::Deployed(_)
        )
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(WorkflowState::Polling).unwrap();
        assert_eq!(json, serde_json::json!({"state": "polling"}));

        let failed = WorkflowState::Deployed(DeploymentOutcome::Fail { detail: "boom".into() });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "deployed", "outcome": {"result": "fail", "detail": "boom"}})
        );
        let back: WorkflowState = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_state_classes() {
        assert!(WorkflowState::DeviceSelected.accepts_submission());
        assert!(!WorkflowState::Authenticated.accepts_submission());
        assert!(WorkflowState::Deployed(DeploymentOutcome::Success).is_resting());
        assert!(!WorkflowState::Deploying.is_resting());
        assert!(WorkflowState::Polling.is_resting());
        assert_eq!(
            WorkflowState::Deployed(DeploymentOutcome::Fail { detail: String::new() }).to_string(),
            "deployed_fail"
        );
    }
}
