//! # Duo Tracker
//!
//! Partner statistics for two Teamfight Tactics players who queue Double Up
//! together.
//!
//! ## Architecture
//!
//! - **fetch**: Rate-limited HTTP access behind a `Transport` seam
//! - **riot**: Upstream endpoints and payload DTOs
//! - **identity**: Riot ID to account, summoner and rank
//! - **correlate**: Shared-game discovery across two match histories
//! - **composition**: Trait naming and per-game team summaries
//! - **calculate**: Win rate, streaks and favorite traits
//! - **tracker**: The end-to-end `correlate_and_aggregate` run
//! - **storage**: The cached snapshot on disk
//! - **api**: REST API endpoints and update coordination
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod composition;
pub mod config;
pub mod correlate;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod models;
pub mod riot;
pub mod storage;
pub mod tracker;

pub use error::TrackerError;
pub use models::*;
pub use tracker::StatsTracker;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "2m", "15m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
