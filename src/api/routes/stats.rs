use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::coordinator::UpdateStatus;
use crate::api::state::AppState;
use crate::models::StatsSnapshot;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: StatsSnapshot,
    pub update_status: String,
    pub cooldown_ends_at: Option<DateTime<Utc>>,
}

/// Cached stats. Waits for a running update so readers never see a
/// half-finished run.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    state.coordinator.wait_until_settled().await;

    let stats = state
        .cache
        .load()
        .unwrap_or_else(StatsSnapshot::placeholder);
    let status = state.coordinator.status();

    Json(StatsResponse {
        stats,
        cooldown_ends_at: status.cooldown_ends_at(),
        update_status: status.message,
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<UpdateStatus> {
    Json(state.coordinator.status())
}
