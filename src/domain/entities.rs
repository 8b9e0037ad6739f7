//! Domain entities derived from the remote roster feed.

use serde::Serialize;

/// A player as presented to callers.
///
/// `followed` is the only field whose source of truth is local state; every
/// other field is recomputed from the remote feed on each load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub total_goals: i64,
    pub league: String,
    pub followed: bool,
}

impl Player {
    /// Returns a copy with the follow flag replaced.
    pub fn with_followed(&self, followed: bool) -> Self {
        Self {
            followed,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Team {
    pub name: String,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct League {
    pub id: String,
    pub name: String,
    pub country: String,
    pub rank: i64,
    pub total_matches: i64,
}
