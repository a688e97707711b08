// Presentation layer - HTTP surface
pub mod app_state;
pub mod handlers;

use app_state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    disable_refresh, enable_refresh, get_chart, health_check, list_charts, loading_state,
    set_theme, status_cards, stream_events,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    // Compression is handled in the JSON response builder, so no CompressionLayer here
    Router::new()
        .route("/healthz", get(health_check))
        .route("/charts", get(list_charts))
        .route("/charts/:metric", get(get_chart))
        .route("/status-cards", get(status_cards))
        .route("/loading", get(loading_state))
        .route("/events", get(stream_events))
        .route("/theme/:name", post(set_theme))
        .route("/refresh/enable", post(enable_refresh))
        .route("/refresh/disable", post(disable_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
