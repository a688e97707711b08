// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::dashboard_store::DashboardStore;
use crate::application::loading_service::LoadingService;
use crate::application::refresh_loop::{RefreshControl, RefreshLoop, RefreshSession};
use crate::application::theme_service::ThemeService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_repository::HttpTelemetryRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sensor_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    let metrics = config.metric_settings();

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpTelemetryRepository::new(&config.api, metrics.clone())?);

    // Create services (application layer)
    let themes = ThemeService::new(config.theme.resolve()?, config.theme.active)?;
    let loading = LoadingService::new();
    let control = RefreshControl::new(config.refresh.enabled);
    let store = Arc::new(DashboardStore::new(metrics, themes.current()));

    let refresh = RefreshLoop::new(repository, store.clone(), loading.clone(), control.clone());
    let session = RefreshSession::spawn(refresh, config.refresh.interval(), themes.subscribe());

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service: DashboardService::new(store, loading, themes, control),
    });

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        %addr,
        api = %config.api.base_url,
        interval_secs = config.refresh.interval_secs,
        "Starting sensor-dashboard"
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    session.shutdown().await;
    Ok(())
}
