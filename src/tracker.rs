//! Entry point of the correlation core.

use tracing::info;

use crate::calculate::{favorite_traits, summarize};
use crate::composition::TraitCatalog;
use crate::correlate::MatchCorrelator;
use crate::error::{PlayerFailure, TrackerError};
use crate::fetch::Fetcher;
use crate::identity::{IdentityResolver, ResolvedPlayer};
use crate::models::{
    FavoriteTrait, PlayerSlot, PlayerSummary, RiotId, ServerCode, StatsSnapshot,
};
use crate::riot::{RiotApi, SeasonRules};

/// Builds partner statistics for two players.
///
/// Holds no per-request state; callers should still run one correlation at
/// a time, since concurrent runs share the credential's rate limit.
#[derive(Clone)]
pub struct StatsTracker {
    fetcher: Fetcher,
    catalog: TraitCatalog,
    rules: SeasonRules,
}

impl StatsTracker {
    pub fn new(fetcher: Fetcher, catalog: TraitCatalog, rules: SeasonRules) -> Self {
        Self {
            fetcher,
            catalog,
            rules,
        }
    }

    /// Resolve both players, find their shared games and aggregate them.
    ///
    /// Both players are always resolved, so a failure report covers each
    /// player that could not be found.
    pub async fn correlate_and_aggregate(
        &self,
        player1: &RiotId,
        player2: &RiotId,
        server: &str,
    ) -> Result<StatsSnapshot, TrackerError> {
        let server: ServerCode = server.parse()?;
        let api = RiotApi::new(self.fetcher.clone(), server.profile())?;

        let resolver = IdentityResolver::new(&api, server, &self.rules);
        let first = resolver.resolve(player1, PlayerSlot::One).await;
        let second = resolver.resolve(player2, PlayerSlot::Two).await;
        let (first, second) = match (first, second) {
            (Ok(first), Ok(second)) => (first, second),
            (first, second) => {
                let failures = [(PlayerSlot::One, first.err()), (PlayerSlot::Two, second.err())]
                    .into_iter()
                    .filter_map(|(slot, error)| error.map(|error| PlayerFailure { slot, error }))
                    .collect();
                return Err(TrackerError::PlayerResolution(failures));
            }
        };

        let history = MatchCorrelator::new(&api, &self.catalog, &self.rules)
            .correlate(&first.identity.puuid, &second.identity.puuid)
            .await?;
        if history.is_empty() {
            info!("No Double Up games together found");
        }

        let totals = summarize(&history);
        Ok(StatsSnapshot {
            player1: player_summary(&first, favorite_traits(&history, PlayerSlot::One)),
            player2: player_summary(&second, favorite_traits(&history, PlayerSlot::Two)),
            total_games: totals.total_games,
            wins: totals.wins,
            win_rate: totals.win_rate,
            best_streak: totals.best_streak,
            match_history: history,
        })
    }
}

fn player_summary(
    player: &ResolvedPlayer,
    favorite_traits: Vec<FavoriteTrait>,
) -> PlayerSummary {
    PlayerSummary {
        name: player.identity.riot_id.name.clone(),
        tag: player.identity.riot_id.tag.clone(),
        rank: Some(player.rank.to_string()),
        favorite_traits,
    }
}
