pub mod auth;
pub mod devices;
pub mod provision;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthSession;
use crate::orchestrator::{WorkflowError, WorkflowSession};
use crate::AppState;

/// Error response - {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", resource),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::NotAuthenticated | WorkflowError::Auth(_) => Self::unauthorized(err.to_string()),
            WorkflowError::InvalidState { .. } | WorkflowError::NoDeviceSelected => Self::conflict(err.to_string()),
            WorkflowError::UnknownDevice(ip) => Self::not_found(&format!("device {}", ip)),
            WorkflowError::Validation(_) => Self::bad_request(err.to_string()),
            WorkflowError::Controller(_) => Self::bad_gateway(err.to_string()),
        }
    }
}

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Healthcheck endpoint - returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "switchport-provisioner",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Load the caller's workflow; a token whose session has idled out is a 401
pub async fn load_session(state: &AppState, auth: &AuthSession) -> Result<WorkflowSession, ApiError> {
    state
        .store
        .get(auth.session_id())
        .await
        .ok_or_else(|| ApiError::unauthorized("Session expired, please log in again"))
}
