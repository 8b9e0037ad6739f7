//! Conversion from remote feed records into domain entities.

use std::collections::HashMap;

use crate::domain::entities::{League, Player, Team};
use crate::domain::error::DomainError;
use crate::domain::identity::{derive_league_id, derive_player_id};
use crate::domain::records::LeagueFeedRecord;

/// Flatten the league feed into players, preserving feed order.
///
/// Follow flags start cleared; the cache re-derives them from the follow set.
/// Two distinct feed entries that derive the same identifier are rejected.
pub fn map_players(feed: &[LeagueFeedRecord]) -> Result<Vec<Player>, DomainError> {
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
    let mut players = Vec::with_capacity(feed.iter().map(|entry| entry.players.len()).sum());

    for (league_pos, entry) in feed.iter().enumerate() {
        for (player_pos, record) in entry.players.iter().enumerate() {
            let id = derive_player_id(&entry.league.name, &record.name, &record.team.name);

            if let Some((first_league, first_player)) = seen.get(&id) {
                return Err(DomainError::invariant(format!(
                    "player id `{id}` derived for feed entries [{first_league}][{first_player}] and [{league_pos}][{player_pos}]"
                )));
            }
            seen.insert(id.clone(), (league_pos, player_pos));

            players.push(Player {
                id,
                name: record.name.clone(),
                team: Team {
                    name: record.team.name.clone(),
                    rank: record.team.rank,
                },
                total_goals: record.total_goal,
                league: entry.league.name.clone(),
                followed: false,
            });
        }
    }

    Ok(players)
}

/// Extract league descriptors in feed order.
pub fn to_leagues(feed: &[LeagueFeedRecord]) -> Vec<League> {
    feed.iter()
        .map(|entry| League {
            id: derive_league_id(&entry.league.name),
            name: entry.league.name.clone(),
            country: entry.league.country.clone(),
            rank: entry.league.rank,
            total_matches: entry.league.total_matches,
        })
        .collect()
}
