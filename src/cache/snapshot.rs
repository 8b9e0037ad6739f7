//! Immutable roster snapshot.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{League, Player};
use crate::domain::error::DomainError;

/// Full in-memory copy of the roster at one point in time.
///
/// Snapshots are never mutated once built; a toggle produces a fresh one with
/// every follow flag re-derived from the follow set. That rebuild is O(n) in
/// the roster size, which is fine for feeds of a few thousand players.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    players: Vec<Player>,
    leagues: Vec<League>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Build the first snapshot of a load from freshly mapped players.
    pub fn build(
        players: Vec<Player>,
        leagues: Vec<League>,
        follows: &BTreeSet<String>,
    ) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(players.len());
        for (position, player) in players.iter().enumerate() {
            if index.insert(player.id.clone(), position).is_some() {
                return Err(DomainError::invariant(format!(
                    "player id `{}` appears more than once in snapshot",
                    player.id
                )));
            }
        }

        let players = players
            .into_iter()
            .map(|player| {
                let followed = follows.contains(&player.id);
                Player { followed, ..player }
            })
            .collect();

        Ok(Self {
            version: 0,
            players,
            leagues,
            index,
        })
    }

    /// Derive the successor snapshot with flags taken from `follows`.
    pub fn rederive(&self, follows: &BTreeSet<String>) -> Self {
        Self {
            version: self.version + 1,
            players: self
                .players
                .iter()
                .map(|player| player.with_followed(follows.contains(&player.id)))
                .collect(),
            leagues: self.leagues.clone(),
            index: self.index.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.index
            .get(player_id)
            .and_then(|position| self.players.get(*position))
    }

    /// Followed players in snapshot order.
    pub fn followed(&self) -> Vec<Player> {
        self.players.iter().filter(|p| p.followed).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Team;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_uppercase(),
            team: Team {
                name: "Team".to_string(),
                rank: 1,
            },
            total_goals: 1,
            league: "League".to_string(),
            followed: false,
        }
    }

    fn follows(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn build_applies_follow_set() {
        let snapshot = Snapshot::build(
            vec![player("a"), player("b"), player("c")],
            Vec::new(),
            &follows(&["b", "unknown"]),
        )
        .expect("snapshot");

        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.get("b").expect("b").followed);
        assert!(!snapshot.get("a").expect("a").followed);
        assert_eq!(snapshot.followed().len(), 1);
    }

    #[test]
    fn build_rejects_duplicate_ids() {
        let err = Snapshot::build(vec![player("a"), player("a")], Vec::new(), &BTreeSet::new())
            .expect_err("duplicate rejected");
        assert!(matches!(err, DomainError::Invariant { .. }));
    }

    #[test]
    fn rederive_replaces_flags_and_bumps_version() {
        let first = Snapshot::build(
            vec![player("a"), player("b")],
            Vec::new(),
            &follows(&["a"]),
        )
        .expect("snapshot");

        let second = first.rederive(&follows(&["b"]));

        assert_eq!(second.version(), first.version() + 1);
        assert!(!second.get("a").expect("a").followed);
        assert!(second.get("b").expect("b").followed);
        assert!(first.get("a").expect("a").followed);
        assert_eq!(
            second.players().iter().map(|p| &p.id).collect::<Vec<_>>(),
            first.players().iter().map(|p| &p.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_feed_builds_empty_snapshot() {
        let snapshot =
            Snapshot::build(Vec::new(), Vec::new(), &follows(&["a"])).expect("snapshot");
        assert!(snapshot.is_empty());
        assert!(snapshot.get("a").is_none());
        assert!(snapshot.followed().is_empty());
    }
}
