mod auth;
mod config;
mod controller;
mod handlers;
mod models;
mod orchestrator;
mod render;
mod router;
mod session;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use controller::{ControllerClient, ControllerFacade};
use orchestrator::Orchestrator;
use render::ConfigRenderer;
use session::{MemoryStore, WorkflowStore};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn WorkflowStore>,
    pub orchestrator: Orchestrator<ControllerClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchport_provisioner=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut cfg = Config::load()?;
    if cfg.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET not set - generating random secret (sessions will be invalidated on restart)");
        cfg.jwt_secret = uuid::Uuid::new_v4().to_string();
    }
    tracing::info!("Starting switchport provisioner for {}", cfg.customer_name);
    tracing::info!("Servers: {} ({} configured)", cfg.servers_file, cfg.catalog.servers.len());
    tracing::info!("Auth mode: {:?}", cfg.auth_mode);
    tracing::info!("Listen: {}", cfg.listen_addr);
    if !cfg.verify_tls {
        tracing::warn!("Controller TLS certificates are not verified (CONTROLLER_VERIFY_TLS=false)");
    }

    // Build the workflow engine
    let renderer = ConfigRenderer::from_dir(&cfg.config_templates_dir)?;
    let client = ControllerClient::new(cfg.verify_tls)?;
    let facade = ControllerFacade::new(client, cfg.settle_delay);
    let orchestrator = Orchestrator::new(facade, renderer, cfg.auth_mode.clone(), cfg.catalog.templates.clone());

    let store = MemoryStore::new(cfg.session_idle);

    // Start session cleanup task (drops workflows idle past SESSION_IDLE_SECS)
    {
        let store_cleanup = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let count = store_cleanup.purge_expired().await;
                if count > 0 {
                    tracing::info!("Cleaned up {} expired sessions", count);
                }
            }
        });
    }

    // Create app state
    let state = Arc::new(AppState {
        config: cfg.clone(),
        store: Arc::new(store),
        orchestrator,
    });

    // Build router
    let app = router::build(state, &cfg.frontend_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Switchport provisioner listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Switchport provisioner shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
