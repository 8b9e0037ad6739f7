//! Deterministic identifiers for players and leagues.
//!
//! Identifiers are recomputed on every load and never read from the feed, so
//! the persisted follow set stays meaningful across reloads. Normalisation
//! lower-cases and swaps literal spaces for underscores; punctuation and any
//! other characters pass through untouched.

/// Normalise free text into an identifier fragment.
pub fn normalize_identifier(input: &str) -> String {
    input.replace(' ', "_").to_lowercase()
}

/// Derive the identifier of a player from its league, name and team.
pub fn derive_player_id(league: &str, name: &str, team: &str) -> String {
    normalize_identifier(&format!("{league}_{name}_{team}"))
}

/// Derive the identifier of a league from its display name.
pub fn derive_league_id(name: &str) -> String {
    normalize_identifier(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_player_identifier() {
        assert_eq!(
            derive_player_id("Premier League", "Lionel Messi", "Barcelona"),
            "premier_league_lionel_messi_barcelona"
        );
    }

    #[test]
    fn punctuation_passes_through() {
        assert_eq!(
            derive_player_id("Ligue 1", "N'Golo Kanté", "Paris Saint-Germain"),
            "ligue_1_n'golo_kanté_paris_saint-germain"
        );
    }

    #[test]
    fn only_literal_spaces_are_replaced() {
        assert_eq!(normalize_identifier("La\tLiga  B"), "la\tliga__b");
    }

    #[test]
    fn derives_league_identifier() {
        assert_eq!(derive_league_id("La Liga"), "la_liga");
    }

    #[test]
    fn derivation_is_reproducible() {
        let first = derive_player_id("Serie A", "Paulo Dybala", "Juventus");
        let second = derive_player_id("Serie A", "Paulo Dybala", "Juventus");
        assert_eq!(first, second);
    }
}
