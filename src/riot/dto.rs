//! Upstream payload shapes.
//!
//! Only the fields the tracker reads are modelled; everything else in the
//! Riot payloads is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummonerDto {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    #[serde(default)]
    pub queue_type: String,
    #[serde(default)]
    pub tier: String,
    /// Division within the tier ("I" through "IV")
    #[serde(default, rename = "rank")]
    pub division: String,
    #[serde(default)]
    pub league_points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadataDto,
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchMetadataDto {
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchInfoDto {
    #[serde(default)]
    pub queue_id: Option<u32>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub game_datetime: i64,
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantDto {
    pub puuid: String,
    /// Individual finish, 1 through 8
    pub placement: u32,
    #[serde(default)]
    pub traits: Vec<TraitDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitDto {
    pub name: String,
    #[serde(default)]
    pub num_units: u32,
    #[serde(default)]
    pub tier_current: i32,
}

impl MatchDto {
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    pub fn features(&self, puuid: &str) -> bool {
        self.metadata.participants.iter().any(|p| p == puuid)
    }
}
