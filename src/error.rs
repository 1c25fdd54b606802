//! Error taxonomy for the correlation core.

use thiserror::Error;

use crate::models::PlayerSlot;

/// Errors surfaced by identity resolution and match correlation.
///
/// Rate limiting never appears here: the fetcher absorbs every 429.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid server: {0}")]
    InvalidServer(String),

    #[error("{riot_id} on {server} not found")]
    PlayerNotFound { riot_id: String, server: String },

    #[error("Expired/Invalid API key.")]
    InvalidCredential,

    #[error("{}: {context}", status_label(.status))]
    Upstream {
        context: String,
        status: Option<u16>,
    },

    #[error("Unreadable upstream payload: {0}")]
    Decode(String),

    #[error("{}", describe_failures(.0))]
    PlayerResolution(Vec<PlayerFailure>),
}

/// One player's resolution failure.
#[derive(Debug)]
pub struct PlayerFailure {
    pub slot: PlayerSlot,
    pub error: TrackerError,
}

impl TrackerError {
    /// Upstream status code behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::InvalidCredential => Some(403),
            TrackerError::PlayerNotFound { .. } => Some(404),
            TrackerError::Upstream { status, .. } => *status,
            TrackerError::PlayerResolution(failures) => {
                failures.iter().find_map(|f| f.error.status())
            }
            TrackerError::InvalidServer(_) | TrackerError::Decode(_) => None,
        }
    }

    pub fn upstream(context: impl Into<String>, status: Option<u16>) -> Self {
        TrackerError::Upstream {
            context: context.into(),
            status,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "transport failure".to_string(),
    }
}

fn describe_failures(failures: &[PlayerFailure]) -> String {
    failures
        .iter()
        .map(|f| f.error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
