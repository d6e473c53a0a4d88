//! HTTP route handlers.

use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{debug, error};

use crate::pipeline::RefreshOutcome;

use super::dto::{ErrorResponse, SnapshotResponse};
use super::state::AppState;
use super::templates::{IndexTemplate, render_station_list};

/// Create the application router.
///
/// The artifact directory is only mounted when capture is enabled.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/stations", get(station_list))
        .route("/api/snapshot", get(snapshot))
        .route("/refresh", post(trigger_refresh))
        .nest_service("/static", ServeDir::new(&state.static_dir));

    if let Some(dir) = &state.artifact_dir {
        router = router.nest_service("/artifacts", ServeDir::new(dir));
    }

    router.with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Map and listing page.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = IndexTemplate {
        refresh_secs: state.refresh_interval.as_secs(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Station listing fragment, or a failure notice.
async fn station_list(State(state): State<AppState>) -> impl IntoResponse {
    let latest = state.scheduler.latest().await;
    Html(listing_html(latest.as_deref()))
}

/// Latest refresh as JSON.
async fn snapshot(State(state): State<AppState>) -> Json<SnapshotResponse> {
    let latest = state.scheduler.latest().await;
    Json(snapshot_of(latest.as_deref()))
}

/// Snapshot and listing built from the same outcome.
fn snapshot_of(outcome: Option<&RefreshOutcome>) -> SnapshotResponse {
    let response = match outcome {
        Some(outcome) => SnapshotResponse::from_outcome(outcome),
        None => SnapshotResponse::pending(),
    };
    response.with_listing(listing_html(outcome))
}

fn listing_html(outcome: Option<&RefreshOutcome>) -> String {
    render_station_list(outcome).unwrap_or_else(|e| format!("Template error: {}", e))
}

/// Run a refresh now, unless one is already running.
///
/// The refresh runs on its own task so a client hanging up cannot cancel
/// it half way.
async fn trigger_refresh(State(state): State<AppState>) -> Response {
    let scheduler = Arc::clone(&state.scheduler);
    let triggered = tokio::spawn(async move { scheduler.trigger().await }).await;

    match triggered {
        Ok(Some(outcome)) => Json(snapshot_of(Some(&outcome))).into_response(),
        Err(e) => {
            error!(error = %e, "manual refresh task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "refresh task failed".to_string(),
                }),
            )
                .into_response()
        }
        Ok(None) => {
            debug!("manual refresh rejected, refresh in flight");
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "a refresh is already in progress".to_string(),
                }),
            )
                .into_response()
        }
    }
}
