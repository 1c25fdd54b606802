//! Identity and rank resolution.
//!
//! Turns a Riot ID into a puuid, then the puuid into a summoner id and the
//! summoner's ranked Double Up standing.

use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{PlayerIdentity, PlayerSlot, RankSummary, RiotId, ServerCode};
use crate::riot::dto::{AccountDto, LeagueEntryDto, SummonerDto};
use crate::riot::{decode, RiotApi, SeasonRules};

/// A player with identity and rank resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlayer {
    pub identity: PlayerIdentity,
    pub rank: RankSummary,
}

/// Resolves players on one server.
pub struct IdentityResolver<'a> {
    api: &'a RiotApi,
    server: ServerCode,
    rules: &'a SeasonRules,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(api: &'a RiotApi, server: ServerCode, rules: &'a SeasonRules) -> Self {
        Self { api, server, rules }
    }

    /// Riot ID to puuid.
    pub async fn resolve_identity(
        &self,
        riot_id: &RiotId,
        slot: PlayerSlot,
    ) -> Result<PlayerIdentity, TrackerError> {
        let outcome = self.api.account_by_riot_id(riot_id).await;
        if outcome.is_missing() {
            return Err(self.not_found(riot_id));
        }
        let status = outcome.status;
        let Some(payload) = outcome.into_data() else {
            return Err(match status {
                Some(400) => self.not_found(riot_id),
                Some(403) => TrackerError::InvalidCredential,
                _ => TrackerError::upstream(format!("Err getting acc info for {}", slot), status),
            });
        };

        let account: AccountDto = decode(payload)?;
        Ok(PlayerIdentity {
            riot_id: riot_id.clone(),
            puuid: account.puuid,
        })
    }

    /// puuid to platform summoner id.
    pub async fn resolve_summoner_id(
        &self,
        identity: &PlayerIdentity,
        slot: PlayerSlot,
    ) -> Result<String, TrackerError> {
        let outcome = self.api.summoner_by_puuid(&identity.puuid).await;
        if outcome.is_missing() {
            return Err(self.not_found(&identity.riot_id));
        }
        let status = outcome.status;
        let Some(payload) = outcome.into_data() else {
            return Err(match status {
                Some(400) => self.not_found(&identity.riot_id),
                Some(403) => TrackerError::InvalidCredential,
                _ => TrackerError::upstream(format!("Err getting smnr data for {}", slot), status),
            });
        };

        let summoner: SummonerDto = decode(payload)?;
        Ok(summoner.id)
    }

    /// Ranked standing in the target queue.
    ///
    /// No entry for the queue, an empty list and a 404 all mean unranked.
    /// Other failures are reported in the summary rather than as an error.
    pub async fn resolve_rank(&self, summoner_id: &str) -> RankSummary {
        let outcome = self.api.league_entries(summoner_id).await;
        if outcome.is_missing() {
            return RankSummary::Unranked;
        }
        let status = outcome.status;
        let Some(payload) = outcome.into_data() else {
            warn!("Rank lookup failed with status {:?}", status);
            return RankSummary::Unavailable { status };
        };

        let entries: Vec<LeagueEntryDto> = match decode(payload) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Unreadable league entries: {}", e);
                return RankSummary::Unavailable { status };
            }
        };

        select_rank(&entries, &self.rules.ranked_queue_type)
    }

    /// Identity, summoner and rank for one player.
    pub async fn resolve(
        &self,
        riot_id: &RiotId,
        slot: PlayerSlot,
    ) -> Result<ResolvedPlayer, TrackerError> {
        let identity = self.resolve_identity(riot_id, slot).await?;
        let summoner_id = self.resolve_summoner_id(&identity, slot).await?;
        let rank = self.resolve_rank(&summoner_id).await;
        info!("Resolved {} as {}", riot_id, rank);
        Ok(ResolvedPlayer { identity, rank })
    }

    fn not_found(&self, riot_id: &RiotId) -> TrackerError {
        TrackerError::PlayerNotFound {
            riot_id: riot_id.to_string(),
            server: self.server.to_string(),
        }
    }
}

/// Pick the entry for `queue_type` out of a summoner's league entries.
pub fn select_rank(entries: &[LeagueEntryDto], queue_type: &str) -> RankSummary {
    entries
        .iter()
        .find(|entry| entry.queue_type == queue_type)
        .map(|entry| RankSummary::Ranked {
            tier: entry.tier.clone(),
            division: entry.division.clone(),
            league_points: entry.league_points,
        })
        .unwrap_or(RankSummary::Unranked)
}
