//! Statistics calculation engine.
//!
//! Computes the partner statistics shown for a pair of players:
//! - Team placement from individual finish
//! - Win rate and best win streak
//! - Each player's most frequently dominant traits

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::composition::BUILT_DIFFERENT;
use crate::models::{CorrelatedGame, FavoriteTrait, PlayerSlot};

/// How many favorite traits are reported per player.
pub const FAVORITE_TRAIT_LIMIT: usize = 3;

/// Totals over a match history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameTotals {
    pub total_games: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub best_streak: u32,
}

/// Individual finishes in an eight-player lobby.
pub const INDIVIDUAL_PLACEMENTS: std::ops::RangeInclusive<u32> = 1..=8;

/// Double Up pairs the eight players into four teams: finishes 1-2 are the
/// first team, 3-4 the second and so on.
pub fn team_placement(individual_placement: u32) -> u32 {
    individual_placement.div_ceil(2)
}

/// Win percentage rounded to one decimal place, 0 for no games.
pub fn calculate_win_rate(wins: u32, total_games: u32) -> f64 {
    if total_games == 0 {
        0.0
    } else {
        (wins as f64 / total_games as f64 * 1000.0).round() / 10.0
    }
}

/// Longest run of consecutive wins.
pub fn best_streak(history: &[CorrelatedGame]) -> u32 {
    let mut current = 0;
    let mut best = 0;
    for game in history {
        if game.is_win() {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

pub fn summarize(history: &[CorrelatedGame]) -> GameTotals {
    let total_games = history.len() as u32;
    let wins = history.iter().filter(|g| g.is_win()).count() as u32;
    GameTotals {
        total_games,
        wins,
        win_rate: calculate_win_rate(wins, total_games),
        best_streak: best_streak(history),
    }
}

fn segment_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d+) (.+)$").ok())
        .as_ref()
}

/// Parse a rendered trait summary ("6 Black Rose, 4 Sorcerer") back into
/// `(units, name)` pairs.
///
/// The sentinel parses as a single one-unit trait. Segments that do not
/// match `<count> <name>` are ignored.
pub fn parse_trait_summary(summary: &str) -> Vec<(u32, String)> {
    summary
        .split(", ")
        .filter_map(|segment| {
            if segment == BUILT_DIFFERENT {
                return Some((1, BUILT_DIFFERENT.to_string()));
            }
            let caps = segment_pattern()?.captures(segment)?;
            let count = caps[1].parse().ok()?;
            Some((count, caps[2].to_string()))
        })
        .collect()
}

/// Most frequently dominant traits for one player.
///
/// Each game gives one vote to every trait tied for that game's highest
/// unit count. Ranked by votes, then name, top three.
pub fn favorite_traits(history: &[CorrelatedGame], slot: PlayerSlot) -> Vec<FavoriteTrait> {
    let mut votes: HashMap<String, u32> = HashMap::new();

    for game in history {
        let summary = match slot {
            PlayerSlot::One => &game.player1_traits,
            PlayerSlot::Two => &game.player2_traits,
        };
        let traits = parse_trait_summary(summary);
        let Some(max_count) = traits.iter().map(|(count, _)| *count).max() else {
            continue;
        };
        for (count, name) in traits {
            if count == max_count {
                *votes.entry(name).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<FavoriteTrait> = votes
        .into_iter()
        .map(|(name, count)| FavoriteTrait { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(FAVORITE_TRAIT_LIMIT);
    ranked
}
