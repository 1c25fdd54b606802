//! Team composition traits.
//!
//! Riot keeps internal codenames in the API between sets, so trait names are
//! stripped of their set prefix and mapped through an alias table before
//! display.

use std::collections::HashMap;

use crate::models::TraitRecord;
use crate::riot::dto::ParticipantDto;

/// Rendered when a board has no active traits worth showing.
pub const BUILT_DIFFERENT: &str = "Built Different";

/// Set 13 codename to in-game name.
const SET_13_ALIASES: &[(&str, &str)] = &[
    ("Academy", "Academy"),
    ("Ambassador", "Emissary"),
    ("Ambusher", "Ambusher"),
    ("BloodHunter", "Blood Hunter"),
    ("Bruiser", "Bruiser"),
    ("Cabal", "Black Rose"),
    ("Crime", "Chem-Baron"),
    ("FormSwapper", "Form Swapper"),
    ("Hextech", "Automata"),
    ("HighRoller", "High Roller"),
    ("Infused", "Dominator"),
    ("Invoker", "Visionary"),
    ("JunkerKing", "Junker King"),
    ("MachineHerald", "Machine Herald"),
    ("Martialist", "Artillerist"),
    ("MissMageTrait", "Banished Mage"),
    ("Pugilist", "Pit Fighter"),
    ("Squad", "Enforcer"),
    ("Titan", "Sentinel"),
    ("Watcher", "Watcher"),
    ("Warband", "Conqueror"),
    ("Hoverboard", "Family"),
];

/// Prefix and alias table for one set. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct TraitCatalog {
    prefix: String,
    aliases: HashMap<String, String>,
}

impl TraitCatalog {
    pub fn new<'a>(
        prefix: impl Into<String>,
        aliases: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            aliases: aliases
                .into_iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }

    pub fn set_13() -> Self {
        Self::new("TFT13_", SET_13_ALIASES.iter().copied())
    }

    /// Strip the set prefix and resolve the alias; unknown names pass through.
    pub fn display_name(&self, raw: &str) -> String {
        let code = raw.strip_prefix(self.prefix.as_str()).unwrap_or(raw);
        self.aliases
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Active traits for one participant, most units first.
    ///
    /// Traits with equal unit counts keep their upstream order.
    pub fn extract_active(&self, participant: &ParticipantDto) -> Vec<TraitRecord> {
        let mut traits: Vec<TraitRecord> = participant
            .traits
            .iter()
            .filter(|t| t.tier_current > 0)
            .map(|t| TraitRecord {
                name: self.display_name(&t.name),
                unit_count: t.num_units,
                tier: t.tier_current.unsigned_abs(),
            })
            .collect();
        traits.sort_by(|a, b| b.unit_count.cmp(&a.unit_count));
        traits
    }
}

impl Default for TraitCatalog {
    fn default() -> Self {
        Self::set_13()
    }
}

/// Render the headline traits of a board.
///
/// Shows every trait with 3+ units, falling back to 2+ units. A board with
/// nothing at 2+ units renders as [`BUILT_DIFFERENT`], same as an empty one.
pub fn format_top(traits: &[TraitRecord]) -> String {
    let with_at_least = |units: u32| -> Vec<&TraitRecord> {
        traits.iter().filter(|t| t.unit_count >= units).collect()
    };

    let mut top = with_at_least(3);
    if top.is_empty() {
        top = with_at_least(2);
    }
    if top.is_empty() {
        return BUILT_DIFFERENT.to_string();
    }

    top.iter()
        .map(|t| format!("{} {}", t.unit_count, t.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riot::dto::TraitDto;
    use pretty_assertions::assert_eq;

    fn raw(name: &str, num_units: u32, tier_current: i32) -> TraitDto {
        TraitDto {
            name: name.to_string(),
            num_units,
            tier_current,
        }
    }

    fn participant(traits: Vec<TraitDto>) -> ParticipantDto {
        ParticipantDto {
            puuid: "p".to_string(),
            placement: 1,
            traits,
        }
    }

    fn record(name: &str, unit_count: u32, tier: u32) -> TraitRecord {
        TraitRecord {
            name: name.to_string(),
            unit_count,
            tier,
        }
    }

    #[test]
    fn test_extract_active_traits() {
        let player = participant(vec![
            raw("TFT13_Ambassador", 2, 1),
            raw("TFT13_Cabal", 4, 2),
            raw("TFT13_Invoker", 1, 0),
        ]);

        let result = TraitCatalog::set_13().extract_active(&player);

        assert_eq!(
            result,
            vec![record("Black Rose", 4, 2), record("Emissary", 2, 1)]
        );
    }

    #[test]
    fn test_extract_drops_inactive_and_negative_tiers() {
        let player = participant(vec![raw("TFT13_Invoker", 1, 0), raw("TFT13_Titan", 3, -1)]);
        assert!(TraitCatalog::set_13().extract_active(&player).is_empty());
        assert!(TraitCatalog::set_13()
            .extract_active(&participant(vec![]))
            .is_empty());
    }

    #[test]
    fn test_extract_keeps_upstream_order_on_ties() {
        let player = participant(vec![
            raw("TFT13_Squad", 2, 1),
            raw("TFT13_Titan", 4, 1),
            raw("TFT13_Crime", 2, 1),
            raw("TFT13_Academy", 2, 1),
        ]);

        let names: Vec<String> = TraitCatalog::set_13()
            .extract_active(&player)
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["Sentinel", "Enforcer", "Chem-Baron", "Academy"]);
    }

    #[test]
    fn test_display_name_passthrough() {
        let catalog = TraitCatalog::set_13();
        assert_eq!(catalog.display_name("TFT13_Experiment"), "Experiment");
        assert_eq!(catalog.display_name("TFT14_Cabal"), "TFT14_Cabal");
        assert_eq!(catalog.display_name("Hoverboard"), "Family");
    }

    #[test]
    fn test_format_three_plus_units() {
        let traits = vec![
            record("Black Rose", 4, 2),
            record("Emissary", 3, 1),
            record("Strategist", 2, 1),
        ];
        assert_eq!(format_top(&traits), "4 Black Rose, 3 Emissary");
    }

    #[test]
    fn test_format_two_plus_units() {
        let traits = vec![
            record("Emissary", 2, 1),
            record("Strategist", 2, 1),
            record("Invoker", 1, 1),
        ];
        assert_eq!(format_top(&traits), "2 Emissary, 2 Strategist");
    }

    #[test]
    fn test_format_built_different() {
        assert_eq!(format_top(&[]), "Built Different");
    }

    #[test]
    fn test_format_single_unit_traits_fall_back_to_sentinel() {
        let traits = vec![record("Banished Mage", 1, 1), record("High Roller", 1, 1)];
        assert_eq!(format_top(&traits), BUILT_DIFFERENT);
    }
}
