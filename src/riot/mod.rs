//! Riot Games API endpoints used by the tracker.
//!
//! Account and match lookups go to the regional cluster; summoner and league
//! lookups go to the platform host. Every call returns the fetcher's raw
//! [`FetchOutcome`] so callers can classify status codes.

pub mod dto;

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

use crate::error::TrackerError;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::models::{RiotId, ServerProfile};

/// Queue id of ranked and normal Double Up games.
pub const DOUBLE_UP_QUEUE_ID: u32 = 1160;

/// League entry queue type for ranked Double Up.
pub const DOUBLE_UP_RANKED_QUEUE: &str = "RANKED_TFT_DOUBLE_UP";

/// Season-specific constants for match history lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRules {
    /// First day of the current set, UTC
    pub season_start: NaiveDate,

    /// Game mode the correlator keeps
    pub queue_id: u32,

    /// League queue the rank is read from
    pub ranked_queue_type: String,

    /// Upper bound passed to the match id lookup
    pub match_count: u32,
}

impl Default for SeasonRules {
    fn default() -> Self {
        Self {
            season_start: NaiveDate::from_ymd_opt(2024, 11, 20).unwrap_or(NaiveDate::MIN),
            queue_id: DOUBLE_UP_QUEUE_ID,
            ranked_queue_type: DOUBLE_UP_RANKED_QUEUE.to_string(),
            match_count: 9999,
        }
    }
}

impl SeasonRules {
    /// Season start as Unix seconds.
    pub fn start_timestamp(&self) -> i64 {
        self.season_start.and_time(NaiveTime::MIN).and_utc().timestamp()
    }
}

/// Endpoint client for one server.
#[derive(Clone)]
pub struct RiotApi {
    fetcher: Fetcher,
    regional_base: Url,
    platform_base: Url,
}

impl RiotApi {
    pub fn new(fetcher: Fetcher, profile: ServerProfile) -> Result<Self, TrackerError> {
        Ok(Self {
            fetcher,
            regional_base: base_url(profile.region)?,
            platform_base: base_url(profile.platform)?,
        })
    }

    /// Look up an account by Riot ID; the payload carries the puuid.
    pub async fn account_by_riot_id(&self, riot_id: &RiotId) -> FetchOutcome {
        info!("Looking up player: {}", riot_id);
        let url = endpoint(
            &self.regional_base,
            &[
                "riot",
                "account",
                "v1",
                "accounts",
                "by-riot-id",
                &riot_id.name,
                &riot_id.tag,
            ],
        );
        self.fetcher.fetch(&url, &[]).await
    }

    /// Look up the platform summoner record for a puuid.
    pub async fn summoner_by_puuid(&self, puuid: &str) -> FetchOutcome {
        info!("Looking up summoner data...");
        let url = endpoint(
            &self.platform_base,
            &["tft", "summoner", "v1", "summoners", "by-puuid", puuid],
        );
        self.fetcher.fetch(&url, &[]).await
    }

    /// League entries (one per ranked queue) for a summoner.
    pub async fn league_entries(&self, summoner_id: &str) -> FetchOutcome {
        info!("Looking up TFT league data...");
        let url = endpoint(
            &self.platform_base,
            &["tft", "league", "v1", "entries", "by-summoner", summoner_id],
        );
        self.fetcher.fetch(&url, &[]).await
    }

    /// Every match id for `puuid` since the season started.
    pub async fn match_ids(&self, puuid: &str, rules: &SeasonRules) -> FetchOutcome {
        info!("Fetching TFT match history since {}...", rules.season_start);
        let url = endpoint(
            &self.regional_base,
            &["tft", "match", "v1", "matches", "by-puuid", puuid, "ids"],
        );
        let query = [
            ("start", "0".to_string()),
            ("count", rules.match_count.to_string()),
            ("startTime", rules.start_timestamp().to_string()),
        ];
        self.fetcher.fetch(&url, &query).await
    }

    pub async fn match_detail(&self, match_id: &str) -> FetchOutcome {
        info!("Fetching TFT match details for {}...", match_id);
        let url = endpoint(
            &self.regional_base,
            &["tft", "match", "v1", "matches", match_id],
        );
        self.fetcher.fetch(&url, &[]).await
    }
}

/// Decode a fetched payload into an upstream DTO.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, TrackerError> {
    serde_json::from_value(value).map_err(|e| TrackerError::Decode(e.to_string()))
}

fn base_url(host: &str) -> Result<Url, TrackerError> {
    Url::parse(&format!("https://{}.api.riotgames.com/", host))
        .map_err(|_| TrackerError::InvalidServer(host.to_string()))
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
