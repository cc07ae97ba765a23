use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>, frontend_dir: &str) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Login page
        .route("/api/servers", get(handlers::auth::list_servers))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Device inventory
        .route("/api/devices/search", post(handlers::devices::search_devices))
        .route("/api/devices/select", post(handlers::devices::select_device))
        .route("/api/devices/selected", get(handlers::devices::get_selected_device))
        // Provisioning workflow
        .route("/api/provision", post(handlers::provision::submit))
        .route("/api/status", get(handlers::provision::get_status))
        .route("/api/status/refresh", post(handlers::provision::refresh_status))
        .route("/api/reset", post(handlers::provision::reset))
        // Static files (frontend)
        .nest_service("/assets", ServeDir::new(format!("{}/assets", frontend_dir)))
        .fallback_service(
            ServeDir::new(frontend_dir).fallback(ServeFile::new(format!("{}/index.html", frontend_dir))),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
