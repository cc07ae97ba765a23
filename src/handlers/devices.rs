use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AuthSession;
use crate::models::{DeviceRecord, DeviceSearchRequest, SelectDeviceRequest};
use crate::AppState;

use super::{load_session, ApiError};

/// POST /api/devices/search
pub async fn search_devices(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeviceSearchRequest>,
) -> Result<Json<Vec<DeviceRecord>>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    let result = state
        .orchestrator
        .search_devices(&mut ctx, &req.filter)
        .await
        .map(|devices| devices.values().cloned().collect::<Vec<_>>());
    state.store.set(auth.session_id(), ctx).await;
    Ok(Json(result?))
}

/// POST /api/devices/select
pub async fn select_device(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectDeviceRequest>,
) -> Result<Json<DeviceRecord>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    state.orchestrator.select_device(&mut ctx, &req.management_ip)?;
    let result = state.orchestrator.target_device(&mut ctx).await;
    state.store.set(auth.session_id(), ctx).await;
    Ok(Json(result?))
}

/// GET /api/devices/selected
pub async fn get_selected_device(
    auth: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeviceRecord>, ApiError> {
    let mut ctx = load_session(&state, &auth).await?;
    let result = state.orchestrator.target_device(&mut ctx).await;
    state.store.set(auth.session_id(), ctx).await;
    Ok(Json(result?))
}
