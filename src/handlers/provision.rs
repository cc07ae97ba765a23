use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AuthSession;
use crate::models::{StatusResponse, VlanEntry};
use crate::AppState;

use super::{load_session, ApiError};

/// POST /api/provision
///
/// Runs the whole submission; the response is the resulting workflow status
/// (polling or settled as failed). Form errors are a 400 and change nothing.
pub async fn submit(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Json(entries): Json<Vec<VlanEntry>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    let result = state.orchestrator.submit(&mut ctx, &entries).await;
    let status = ctx.status();
    state.store.set(auth.session_id(), ctx).await;
    result?;
    Ok(Json(status))
}

/// GET /api/status
pub async fn get_status(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let ctx = load_session(&state, &auth).await?;
    Ok(Json(ctx.status()))
}

/// POST /api/status/refresh
pub async fn refresh_status(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    let result = state.orchestrator.poll(&mut ctx).await;
    let status = ctx.status();
    state.store.set(auth.session_id(), ctx).await;
    result?;
    Ok(Json(status))
}

/// POST /api/reset
pub async fn reset(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    state.orchestrator.reset(&mut ctx)?;
    let status = ctx.status();
    state.store.set(auth.session_id(), ctx).await;
    Ok(Json(status))
}
