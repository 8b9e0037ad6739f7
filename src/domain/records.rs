//! Wire records returned by the remote roster feed.
//!
//! The feed is an ordered array of leagues, each carrying its ordered player
//! list. Field names follow the feed's camelCase JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueFeedRecord {
    pub league: LeagueRecord,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRecord {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub total_matches: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub team: TeamRecord,
    #[serde(default)]
    pub total_goal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    #[serde(default)]
    pub rank: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_feed() {
        let json = r#"[
            {
                "league": {"name": "Premier League", "country": "England", "rank": 1, "totalMatches": 380},
                "players": [
                    {"name": "Harry Kane", "team": {"name": "Tottenham", "rank": 5}, "totalGoal": 23}
                ]
            }
        ]"#;

        let feed: Vec<LeagueFeedRecord> = serde_json::from_str(json).expect("feed decodes");

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].league.total_matches, 380);
        assert_eq!(feed[0].players[0].total_goal, 23);
        assert_eq!(feed[0].players[0].team.rank, 5);
    }

    #[test]
    fn missing_players_default_to_empty() {
        let json = r#"{"league": {"name": "Serie A"}}"#;
        let record: LeagueFeedRecord = serde_json::from_str(json).expect("record decodes");

        assert!(record.players.is_empty());
        assert_eq!(record.league.country, "");
    }
}
