use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::coordinator::BeginError;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::RiotId;

pub const MISSING_PLAYER_INFO: &str = "Missing player information";
pub const ALREADY_UP_TO_DATE: &str = "Stats are already up to date!";
pub const UPDATED: &str = "Stats successfully updated!";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub player1_name: Option<String>,
    pub player1_tag: Option<String>,
    pub player2_name: Option<String>,
    pub player2_tag: Option<String>,
    pub server: Option<String>,
}

/// A fully specified update request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub player1: RiotId,
    pub player2: RiotId,
    pub server: String,
}

impl UpdateParams {
    /// Every field present and non-blank, or `None`.
    pub fn into_request(self) -> Option<UpdateRequest> {
        let field = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(UpdateRequest {
            player1: RiotId::new(field(self.player1_name)?, field(self.player1_tag)?),
            player2: RiotId::new(field(self.player2_name)?, field(self.player2_tag)?),
            server: field(self.server)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated,
    Unchanged,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub outcome: UpdateOutcome,
    pub message: String,
}

pub async fn run_update(
    State(state): State<AppState>,
    Query(params): Query<UpdateParams>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let request = params
        .into_request()
        .ok_or_else(|| ApiError::BadRequest(MISSING_PLAYER_INFO.to_string()))?;

    let guard = state.coordinator.try_begin().map_err(|e| match e {
        BeginError::Busy => ApiError::Conflict(e.to_string()),
        BeginError::CoolingDown { .. } => ApiError::TooManyRequests(e.to_string()),
    })?;

    info!(
        "Updating stats for {} and {} on {}",
        request.player1, request.player2, request.server
    );
    let previous = state.cache.load();
    let run = state.tracker.correlate_and_aggregate(
        &request.player1,
        &request.player2,
        &request.server,
    );

    let (outcome, message) = match tokio::time::timeout(state.update_deadline, run).await {
        Err(_) => {
            error!("Update exceeded {:?}", state.update_deadline);
            (
                UpdateOutcome::Failed,
                format!(
                    "Error updating: no result after {}s",
                    state.update_deadline.as_secs()
                ),
            )
        }
        Ok(Err(e)) => {
            warn!("Update failed: {}", e);
            (UpdateOutcome::Failed, e.to_string())
        }
        Ok(Ok(snapshot)) if previous.as_ref() == Some(&snapshot) => {
            (UpdateOutcome::Unchanged, ALREADY_UP_TO_DATE.to_string())
        }
        Ok(Ok(snapshot)) => match state.cache.save(&snapshot) {
            Ok(()) => (UpdateOutcome::Updated, UPDATED.to_string()),
            Err(e) => {
                error!("Failed to save snapshot: {}", e);
                (UpdateOutcome::Failed, format!("Error updating: {}", e))
            }
        },
    };

    guard.finish(message.clone());
    Ok(Json(UpdateResponse { outcome, message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, setup_test_state};
    use crate::fetch::mock::MockTransport;
    use crate::tracker::tests::script_happy_path;
    use axum::http::StatusCode;
    use std::sync::Arc;
    use std::time::Duration;

    const UPDATE_URI: &str =
        "/api/update?player1Name=Alpha&player1Tag=NA1&player2Name=Beta&player2Tag=NA1&server=NA";

    #[test]
    fn test_into_request() {
        let params = UpdateParams {
            player1_name: Some(" Alpha ".into()),
            player1_tag: Some("NA1".into()),
            player2_name: Some("Beta".into()),
            player2_tag: Some("NA1".into()),
            server: Some("na".into()),
        };
        let request = params.into_request().unwrap();
        assert_eq!(request.player1, RiotId::new("Alpha", "NA1"));
        assert_eq!(request.server, "na");
    }

    #[test]
    fn test_into_request_blank_field() {
        let params = UpdateParams {
            player1_name: Some("Alpha".into()),
            player1_tag: Some("NA1".into()),
            player2_name: Some("Beta".into()),
            player2_tag: Some("   ".into()),
            server: Some("NA".into()),
        };
        assert!(params.into_request().is_none());
        assert!(UpdateParams::default().into_request().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        let state = setup_test_state(dir.path(), transport.clone());

        let (status, json) = get_json(
            build_router(state.clone()),
            "/api/update?player1Name=Alpha&player1Tag=NA1",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"]["message"],
            "Bad request: Missing player information"
        );
        assert!(transport.calls().is_empty());
        // No run was started, so no cooldown either.
        assert!(state.coordinator.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_update_saves_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        script_happy_path(&transport);
        let state = setup_test_state(dir.path(), transport);

        let (status, json) = get_json(build_router(state.clone()), UPDATE_URI).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "updated");
        assert_eq!(json["message"], UPDATED);

        let cached = state.cache.load().unwrap();
        assert_eq!(cached.total_games, 2);
        assert_eq!(cached.player1.name, "Alpha");

        let (_, json) = get_json(build_router(state), "/api/stats").await;
        assert_eq!(json["stats"]["total_games"], 2);
        assert_eq!(json["update_status"], UPDATED);
        assert!(json["cooldown_ends_at"].is_string());
    }

    #[tokio::test]
    async fn test_update_unchanged_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        script_happy_path(&transport);
        script_happy_path(&transport);
        let mut state = setup_test_state(dir.path(), transport);
        state.coordinator = Arc::new(crate::api::coordinator::UpdateCoordinator::new(
            Duration::ZERO,
        ));

        let (_, first) = get_json(build_router(state.clone()), UPDATE_URI).await;
        assert_eq!(first["outcome"], "updated");

        let (status, second) = get_json(build_router(state), UPDATE_URI).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["outcome"], "unchanged");
        assert_eq!(second["message"], ALREADY_UP_TO_DATE);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.push("/riot/account/v1/accounts/by-riot-id/Alpha/NA1", 403, "");
        let state = setup_test_state(dir.path(), transport);
        let mut previous = crate::models::StatsSnapshot::placeholder();
        previous.total_games = 9;
        state.cache.save(&previous).unwrap();

        let (status, json) = get_json(build_router(state.clone()), UPDATE_URI).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "failed");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("Expired/Invalid API key."));
        assert_eq!(state.cache.load().unwrap().total_games, 9);
        assert_eq!(state.coordinator.status().message, json["message"]);
    }

    #[tokio::test]
    async fn test_update_conflict_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        let state = setup_test_state(dir.path(), transport.clone());
        let guard = state.coordinator.try_begin().unwrap();

        let (status, json) = get_json(build_router(state.clone()), UPDATE_URI).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert!(transport.calls().is_empty());
        guard.finish("done");
    }

    #[tokio::test]
    async fn test_update_rejected_during_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        script_happy_path(&transport);
        let state = setup_test_state(dir.path(), transport);

        let (status, _) = get_json(build_router(state.clone()), UPDATE_URI).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get_json(build_router(state), UPDATE_URI).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "TOO_MANY_REQUESTS");
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        // Rate limited forever: the fetcher keeps backing off.
        for _ in 0..100 {
            transport.push("/riot/account/v1/accounts/by-riot-id/Alpha/NA1", 429, "");
        }
        let mut state = setup_test_state(dir.path(), transport);
        state.update_deadline = Duration::from_secs(12);

        let (status, json) = get_json(build_router(state.clone()), UPDATE_URI).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["message"], "Error updating: no result after 12s");
        assert!(state.cache.load().is_none());
    }
}
