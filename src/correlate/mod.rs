//! Match correlation.
//!
//! Walks player 1's match history for the season and keeps the Double Up
//! games player 2 was also in. One bad match never aborts the scan: fetch
//! failures, other game modes, missing partners and inconsistent participant
//! data each skip just that match.

use chrono::{DateTime, Local, TimeZone};
use tracing::{error, info, warn};

use crate::calculate::{team_placement, INDIVIDUAL_PLACEMENTS};
use crate::composition::{format_top, TraitCatalog};
use crate::error::TrackerError;
use crate::models::CorrelatedGame;
use crate::riot::dto::MatchDto;
use crate::riot::{decode, RiotApi, SeasonRules};

/// Why a match was left out of the correlated history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed(Option<u16>),
    Unreadable,
    OtherMode(Option<u32>),
    PartnerAbsent,
    MissingParticipant,
    BadPlacement(u32),
}

/// Finds the shared games of two players.
pub struct MatchCorrelator<'a> {
    api: &'a RiotApi,
    catalog: &'a TraitCatalog,
    rules: &'a SeasonRules,
}

impl<'a> MatchCorrelator<'a> {
    pub fn new(api: &'a RiotApi, catalog: &'a TraitCatalog, rules: &'a SeasonRules) -> Self {
        Self {
            api,
            catalog,
            rules,
        }
    }

    /// Shared games of the target mode, newest first.
    ///
    /// An empty or missing match history is not an error; any other failure
    /// of the history lookup is.
    pub async fn correlate(
        &self,
        puuid1: &str,
        puuid2: &str,
    ) -> Result<Vec<CorrelatedGame>, TrackerError> {
        let outcome = self.api.match_ids(puuid1, self.rules).await;
        if outcome.is_missing() {
            info!("Player 1 has no TFT matches");
            return Ok(Vec::new());
        }
        let status = outcome.status;
        let Some(payload) = outcome.into_data() else {
            error!("{:?}: Failed to get match history for player 1", status);
            return Err(TrackerError::upstream("Err getting match history", status));
        };
        let match_ids: Vec<String> = decode(payload)?;

        info!("Analyzing {} matches for Double Up games...", match_ids.len());
        let mut found: Vec<(i64, CorrelatedGame)> = Vec::new();
        for match_id in &match_ids {
            match self.correlate_one(match_id, puuid1, puuid2).await {
                Ok(entry) => {
                    info!(
                        "Found Double Up game with player 2: Match {}, Placement {}",
                        match_id, entry.1.placement
                    );
                    found.push(entry);
                }
                Err(reason) => log_skip(match_id, &reason),
            }
        }

        // Stable, so equal timestamps keep discovery order.
        found.sort_by(|a, b| b.0.cmp(&a.0));
        info!("{} Double Up games with partner found", found.len());
        Ok(found.into_iter().map(|(_, game)| game).collect())
    }

    /// Fetch one match and build its correlated record, keyed by start time.
    async fn correlate_one(
        &self,
        match_id: &str,
        puuid1: &str,
        puuid2: &str,
    ) -> Result<(i64, CorrelatedGame), SkipReason> {
        let outcome = self.api.match_detail(match_id).await;
        let status = outcome.status;
        let payload = outcome
            .into_data()
            .ok_or(SkipReason::FetchFailed(status))?;
        let detail: MatchDto = decode(payload).map_err(|_| SkipReason::Unreadable)?;

        self.build_game(match_id, &detail, puuid1, puuid2)
    }

    /// Apply the mode and partner filters to a fetched match.
    pub fn build_game(
        &self,
        match_id: &str,
        detail: &MatchDto,
        puuid1: &str,
        puuid2: &str,
    ) -> Result<(i64, CorrelatedGame), SkipReason> {
        if detail.info.queue_id != Some(self.rules.queue_id) {
            return Err(SkipReason::OtherMode(detail.info.queue_id));
        }
        if !detail.features(puuid2) {
            return Err(SkipReason::PartnerAbsent);
        }

        let (Some(player1), Some(player2)) = (detail.participant(puuid1), detail.participant(puuid2))
        else {
            return Err(SkipReason::MissingParticipant);
        };
        if !INDIVIDUAL_PLACEMENTS.contains(&player1.placement) {
            return Err(SkipReason::BadPlacement(player1.placement));
        }

        let played_at = detail.info.game_datetime;
        let game = CorrelatedGame {
            match_id: match_id.to_string(),
            datetime: format_game_time(played_at, &Local),
            placement: team_placement(player1.placement),
            player1_traits: format_top(&self.catalog.extract_active(player1)),
            player2_traits: format_top(&self.catalog.extract_active(player2)),
        };
        Ok((played_at, game))
    }
}

/// Render a millisecond timestamp as `YYYY-MM-DD HH:MM` in `tz`.
pub fn format_game_time<Tz: TimeZone>(millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

fn log_skip(match_id: &str, reason: &SkipReason) {
    match reason {
        SkipReason::FetchFailed(status) => {
            error!("{:?}: Match details fetch err: {}", status, match_id)
        }
        SkipReason::Unreadable => warn!("Match {} has an unreadable payload", match_id),
        SkipReason::OtherMode(_) => info!("Match {} is not a Double Up game", match_id),
        SkipReason::PartnerAbsent => info!("Match {} did not feature player 2", match_id),
        SkipReason::MissingParticipant => warn!(
            "Match {} lists both players but lacks a participant record",
            match_id
        ),
        SkipReason::BadPlacement(placement) => warn!(
            "Match {} reports an impossible placement {}",
            match_id, placement
        ),
    }
}
