//! Aggregate statistics models.

use serde::{Deserialize, Serialize};

use super::CorrelatedGame;

/// A trait name and the number of games it was a player's dominant trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteTrait {
    pub name: String,
    pub count: u32,
}

/// Per-player section of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub tag: String,

    /// Rendered rank, `None` only in the placeholder snapshot
    pub rank: Option<String>,

    #[serde(default)]
    pub favorite_traits: Vec<FavoriteTrait>,
}

impl PlayerSummary {
    fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: String::new(),
            rank: None,
            favorite_traits: Vec::new(),
        }
    }
}

/// Everything shown for a pair of players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub player1: PlayerSummary,
    pub player2: PlayerSummary,
    pub total_games: u32,
    pub wins: u32,

    /// Percentage rounded to one decimal place
    pub win_rate: f64,

    pub best_streak: u32,

    /// Newest first
    pub match_history: Vec<CorrelatedGame>,
}

impl StatsSnapshot {
    /// Snapshot shown before any update has been cached.
    pub fn placeholder() -> Self {
        Self {
            player1: PlayerSummary::placeholder("Player 1"),
            player2: PlayerSummary::placeholder("Player 2"),
            total_games: 0,
            wins: 0,
            win_rate: 0.0,
            best_streak: 0,
            match_history: Vec::new(),
        }
    }
}
