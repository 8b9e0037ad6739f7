//! Shared domain enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort orders supported by paged player views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    NameAsc,
    NameDesc,
    GoalsAsc,
    GoalsDesc,
    TeamRankAsc,
    TeamRankDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::GoalsAsc,
        SortOption::GoalsDesc,
        SortOption::TeamRankAsc,
        SortOption::TeamRankDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::GoalsAsc => "goals-asc",
            SortOption::GoalsDesc => "goals-desc",
            SortOption::TeamRankAsc => "team-rank-asc",
            SortOption::TeamRankDesc => "team-rank-desc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sort option `{0}` (expected one of name-asc, name-desc, goals-asc, goals-desc, team-rank-asc, team-rank-desc)")]
pub struct ParseSortOptionError(String);

impl FromStr for SortOption {
    type Err = ParseSortOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == normalized)
            .ok_or_else(|| ParseSortOptionError(value.to_string()))
    }
}
