//! Single-flight coordination of update runs.
//!
//! At most one update runs at a time, and each finished run is followed by a
//! cooldown window. The state lives in a `watch` channel so that every
//! transition is a single atomic update and readers can wait for a running
//! update to settle without polling.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum UpdatePhase {
    Idle,
    Running,
    CoolingDown { until: DateTime<Utc> },
}

/// Phase plus the message left by the last run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatus {
    #[serde(flatten)]
    pub phase: UpdatePhase,
    pub message: String,
}

impl UpdateStatus {
    pub fn cooldown_ends_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            UpdatePhase::CoolingDown { until } => Some(until),
            _ => None,
        }
    }
}

/// Why an update could not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeginError {
    #[error("An update is already running")]
    Busy,

    #[error("Updates are cooling down until {until}")]
    CoolingDown { until: DateTime<Utc> },
}

/// Message recorded when a run ends without reporting its result.
pub const INTERRUPTED_MESSAGE: &str = "Update interrupted";

/// Message shown while an update is running.
pub const RUNNING_MESSAGE: &str = "Be Patient :)";

pub struct UpdateCoordinator {
    state: watch::Sender<UpdateStatus>,
    cooldown: Duration,
}

impl UpdateCoordinator {
    pub fn new(cooldown: Duration) -> Self {
        let (state, _) = watch::channel(UpdateStatus {
            phase: UpdatePhase::Idle,
            message: String::new(),
        });
        Self { state, cooldown }
    }

    /// Current status, with an elapsed cooldown reported as idle.
    pub fn status(&self) -> UpdateStatus {
        let mut status = self.state.borrow().clone();
        status.phase = settle(status.phase, Utc::now());
        status
    }

    /// Claim the single update slot.
    pub fn try_begin(&self) -> Result<UpdateGuard<'_>, BeginError> {
        let now = Utc::now();
        let mut refused = None;
        self.state.send_if_modified(|status| match settle(status.phase, now) {
            UpdatePhase::Running => {
                refused = Some(BeginError::Busy);
                false
            }
            UpdatePhase::CoolingDown { until } => {
                refused = Some(BeginError::CoolingDown { until });
                false
            }
            UpdatePhase::Idle => {
                status.phase = UpdatePhase::Running;
                status.message = RUNNING_MESSAGE.to_string();
                true
            }
        });

        match refused {
            Some(reason) => Err(reason),
            None => {
                info!("Update started");
                Ok(UpdateGuard {
                    coordinator: self,
                    finished: false,
                })
            }
        }
    }

    /// Wait until no update is running.
    pub async fn wait_until_settled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|status| status.phase != UpdatePhase::Running).await;
    }

    fn finish(&self, message: String) {
        let until = Utc::now()
            + chrono::Duration::from_std(self.cooldown).unwrap_or(chrono::Duration::zero());
        info!("Update finished: {}", message);
        self.state.send_modify(|status| {
            status.phase = UpdatePhase::CoolingDown { until };
            status.message = message;
        });
    }
}

/// Held by the one running update. Finishing (or dropping) it starts the
/// cooldown.
pub struct UpdateGuard<'a> {
    coordinator: &'a UpdateCoordinator,
    finished: bool,
}

impl UpdateGuard<'_> {
    pub fn finish(mut self, message: impl Into<String>) {
        self.finished = true;
        self.coordinator.finish(message.into());
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Update dropped before finishing");
            self.coordinator.finish(INTERRUPTED_MESSAGE.to_string());
        }
    }
}

fn settle(phase: UpdatePhase, now: DateTime<Utc>) -> UpdatePhase {
    match phase {
        UpdatePhase::CoolingDown { until } if now >= until => UpdatePhase::Idle,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_idle() {
        let coordinator = UpdateCoordinator::new(Duration::from_secs(120));
        let status = coordinator.status();
        assert_eq!(status.phase, UpdatePhase::Idle);
        assert!(status.message.is_empty());
        assert!(status.cooldown_ends_at().is_none());
    }

    #[test]
    fn test_second_begin_is_busy() {
        let coordinator = UpdateCoordinator::new(Duration::from_secs(120));
        let guard = coordinator.try_begin().unwrap();

        assert_eq!(coordinator.try_begin().err(), Some(BeginError::Busy));
        assert_eq!(coordinator.status().phase, UpdatePhase::Running);
        assert_eq!(coordinator.status().message, RUNNING_MESSAGE);

        guard.finish("Stats successfully updated!");
    }

    #[test]
    fn test_finish_starts_cooldown() {
        let coordinator = UpdateCoordinator::new(Duration::from_secs(120));
        coordinator
            .try_begin()
            .unwrap()
            .finish("Stats successfully updated!");

        let status = coordinator.status();
        assert!(matches!(status.phase, UpdatePhase::CoolingDown { .. }));
        assert_eq!(status.message, "Stats successfully updated!");
        assert!(status.cooldown_ends_at().unwrap() > Utc::now());
        assert!(matches!(
            coordinator.try_begin().err(),
            Some(BeginError::CoolingDown { .. })
        ));
    }

    #[test]
    fn test_elapsed_cooldown_allows_next_run() {
        let coordinator = UpdateCoordinator::new(Duration::ZERO);
        coordinator.try_begin().unwrap().finish("done");

        assert_eq!(coordinator.status().phase, UpdatePhase::Idle);
        assert!(coordinator.try_begin().is_ok());
    }

    #[test]
    fn test_dropped_guard_records_interruption() {
        let coordinator = UpdateCoordinator::new(Duration::from_secs(60));
        drop(coordinator.try_begin().unwrap());

        let status = coordinator.status();
        assert!(matches!(status.phase, UpdatePhase::CoolingDown { .. }));
        assert_eq!(status.message, INTERRUPTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_wait_until_settled_returns_immediately_when_idle() {
        let coordinator = UpdateCoordinator::new(Duration::from_secs(60));
        tokio::time::timeout(Duration::from_secs(1), coordinator.wait_until_settled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_until_settled_waits_for_running_update() {
        let coordinator = Arc::new(UpdateCoordinator::new(Duration::from_secs(60)));
        let guard = coordinator.try_begin().unwrap();

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator.wait_until_settled().await;
                coordinator.status().message
            })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        guard.finish("Stats are already up to date!");
        let message = waiter.await.unwrap();
        assert_eq!(message, "Stats are already up to date!");
    }

    #[test]
    fn test_status_serialization() {
        let status = UpdateStatus {
            phase: UpdatePhase::Running,
            message: RUNNING_MESSAGE.to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["message"], RUNNING_MESSAGE);
    }
}
