use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{issue_token, AuthSession};
use crate::models::{LoginRequest, LoginResponse, ServerListResponse, ServerOption};
use crate::orchestrator::WorkflowSession;
use crate::AppState;

use super::{ApiError, MessageResponse};

/// GET /api/servers
pub async fn list_servers(State(state): State<Arc<AppState>>) -> Json<ServerListResponse> {
    let servers = state
        .config
        .catalog
        .servers
        .iter()
        .map(|(key, entry)| ServerOption {
            key: key.clone(),
            name: entry.name.clone().unwrap_or_else(|| key.clone()),
            address: entry.address.clone(),
        })
        .collect();

    Json(ServerListResponse {
        customer_name: state.config.customer_name.clone(),
        servers,
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }
    let server = state
        .config
        .catalog
        .servers
        .get(&req.server)
        .ok_or_else(|| ApiError::not_found(&format!("server {}", req.server)))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut ctx = WorkflowSession::new(session_id.clone());
    state
        .orchestrator
        .login(&mut ctx, &req.server, server, &req.username, &req.password)
        .await?;
    state.store.set(&session_id, ctx).await;

    let token = issue_token(&session_id, &req.username, state.config.session_idle, &state.config.jwt_secret)
        .map_err(|e| ApiError::internal(format!("token generation error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        username: req.username,
        server: req.server,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Json<MessageResponse> {
    if let Some(mut ctx) = state.store.get(auth.session_id()).await {
        state.orchestrator.logout(&mut ctx);
    }
    state.store.clear(auth.session_id()).await;
    MessageResponse::new("Logged out")
}
