//! Per-match models produced by the correlator.

use serde::{Deserialize, Serialize};

/// An active composition trait for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRecord {
    /// Display name after prefix stripping and alias mapping
    pub name: String,

    /// Units contributing to the trait
    pub unit_count: u32,

    /// Activated tier (always > 0 once extracted)
    pub tier: u32,
}

/// One Double Up game both players shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedGame {
    pub match_id: String,

    /// Local time the game started, `YYYY-MM-DD HH:MM`
    pub datetime: String,

    /// Team finish, 1 through 4
    pub placement: u32,

    pub player1_traits: String,
    pub player2_traits: String,
}

impl CorrelatedGame {
    /// Top two teams out of four count as a win.
    pub fn is_win(&self) -> bool {
        self.placement <= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(placement: u32) -> CorrelatedGame {
        CorrelatedGame {
            match_id: "NA1_1".to_string(),
            datetime: "2024-12-01 20:15".to_string(),
            placement,
            player1_traits: "Built Different".to_string(),
            player2_traits: "Built Different".to_string(),
        }
    }

    #[test]
    fn test_is_win() {
        assert!(game(1).is_win());
        assert!(game(2).is_win());
        assert!(!game(3).is_win());
        assert!(!game(4).is_win());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(game(1)).unwrap();
        assert_eq!(json["match_id"], "NA1_1");
        assert_eq!(json["placement"], 1);
        assert_eq!(json["player2_traits"], "Built Different");
    }
}
