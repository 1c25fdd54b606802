//! Player identity models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A human-entered Riot ID (`name#tag`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotId {
    pub name: String,
    pub tag: String,
}

impl RiotId {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

impl FromStr for RiotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('#') {
            Some((name, tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {
                Ok(RiotId::new(name.trim(), tag.trim()))
            }
            _ => Err(format!("expected NAME#TAG, got {:?}", s)),
        }
    }
}

/// Which of the two players a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn number(&self) -> u8 {
        match self {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// A Riot ID resolved to its stable player id (puuid).
///
/// The puuid is the join key for every downstream lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub riot_id: RiotId,
    pub puuid: String,
}

/// Ranked standing in the target queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankSummary {
    Ranked {
        tier: String,
        division: String,
        league_points: i64,
    },
    Unranked,
    /// The rank lookup failed with a status other than "no record".
    Unavailable { status: Option<u16> },
}

impl fmt::Display for RankSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankSummary::Ranked {
                tier,
                division,
                league_points,
            } => write!(f, "{} {} ({} LP)", title_case(tier), division, league_points),
            RankSummary::Unranked => f.write_str("Unranked"),
            RankSummary::Unavailable { status } => match status {
                Some(code) => write!(f, "{}: Error getting information about rank", code),
                None => f.write_str("Error getting information about rank"),
            },
        }
    }
}

/// Title-case each whitespace separated word ("GRANDMASTER" -> "Grandmaster").
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
