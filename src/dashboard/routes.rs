//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::render::{render, LeagueCard};
use crate::engine::orchestrator::AggregationOrchestrator;
use crate::types::CycleStatus;
use crate::window::TimeWindow;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub orchestrator: Arc<AggregationOrchestrator>,
    pub window: TimeWindow,
}

impl DashboardState {
    pub fn new(orchestrator: Arc<AggregationOrchestrator>, window: TimeWindow) -> Self {
        Self { orchestrator, window }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: CycleStatus,
    pub in_flight: bool,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle_id: Option<Uuid>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub status: CycleStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub leagues: Vec<LeagueCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let cycle = state.orchestrator.snapshot().await;
    Json(StatusResponse {
        status: cycle.status,
        in_flight: state.orchestrator.is_in_flight(),
        cycles_completed: cycle.cycles_completed,
        cycles_failed: cycle.cycles_failed,
        last_cycle_id: cycle.last_cycle_id,
        last_updated: cycle.view.as_ref().map(|v| v.completed_at),
        error: cycle.error,
    })
}

/// GET /api/view
///
/// The window is evaluated against the wall clock at request time.
pub async fn get_view(
    State(state): State<AppState>,
) -> Result<Json<ViewResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cycle = state.orchestrator.snapshot().await;

    if cycle.status == CycleStatus::Error {
        let error = cycle.error.unwrap_or_else(|| "Failed to load data".to_string());
        return Err((StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error })));
    }

    let leagues = cycle
        .view
        .as_deref()
        .map(|v| render(v, &state.window, Utc::now()))
        .unwrap_or_default();

    Ok(Json(ViewResponse {
        status: cycle.status,
        updated_at: cycle.view.as_ref().map(|v| v.completed_at),
        leagues,
    }))
}

/// POST /api/refresh
pub async fn post_refresh(State(state): State<AppState>) -> StatusCode {
    if state.orchestrator.spawn_refresh() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
