// HTTP request handlers
use crate::domain::reading::Metric;
use crate::domain::theme::ThemeName;
use crate::infrastructure::chunked_json::stream_response;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingStatus {
    pub loading: bool,
    pub auto_refresh: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Rendered options for every chart loaded so far
pub async fn list_charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let charts = state.dashboard_service.charts().await;
    match json_response(&charts, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Rendered options for one metric's chart
pub async fn get_chart(
    Path(metric): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let metric = match metric.parse::<Metric>() {
        Ok(metric) => metric,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    let Some(chart) = state.dashboard_service.chart(metric).await else {
        // Not loaded yet
        return StatusCode::NO_CONTENT.into_response();
    };

    match json_response(&chart, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Status cards for the active theme
pub async fn status_cards(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.status_cards())
}

pub async fn loading_state(State(state): State<Arc<AppState>>) -> Json<LoadingStatus> {
    Json(LoadingStatus {
        loading: state.dashboard_service.is_loading(),
        auto_refresh: state.dashboard_service.auto_refresh(),
    })
}

/// Stream dashboard events as newline-delimited JSON
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_response(state.dashboard_service.events())
}

pub async fn set_theme(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = name
        .parse::<ThemeName>()
        .and_then(|theme| state.dashboard_service.set_theme(theme));

    match result {
        Ok(cards) => Json(cards).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

pub async fn enable_refresh(State(state): State<Arc<AppState>>) -> Json<LoadingStatus> {
    state.dashboard_service.set_auto_refresh(true);
    loading_state(State(state)).await
}

pub async fn disable_refresh(State(state): State<Arc<AppState>>) -> Json<LoadingStatus> {
    state.dashboard_service.set_auto_refresh(false);
    loading_state(State(state)).await
}
