//! Sort-aware windowing over an in-memory player snapshot.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::entities::Player;
use crate::domain::types::SortOption;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One window of a sorted sequence plus its continuation markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn empty(page_index: usize) -> Self {
        Self {
            items: Vec::new(),
            page_index,
            has_prev: page_index > 0,
            has_next: false,
        }
    }

    pub fn prev_key(&self) -> Option<usize> {
        self.has_prev.then(|| self.page_index - 1)
    }

    pub fn next_key(&self) -> Option<usize> {
        self.has_next.then(|| self.page_index + 1)
    }
}

fn compare(sort: SortOption, a: &Player, b: &Player) -> Ordering {
    match sort {
        SortOption::NameAsc => a.name.cmp(&b.name),
        SortOption::NameDesc => b.name.cmp(&a.name),
        SortOption::GoalsAsc => a.total_goals.cmp(&b.total_goals),
        SortOption::GoalsDesc => b.total_goals.cmp(&a.total_goals),
        SortOption::TeamRankAsc => a.team.rank.cmp(&b.team.rank),
        SortOption::TeamRankDesc => b.team.rank.cmp(&a.team.rank),
    }
}

/// Sort `players` by `sort` (stable, ties keep snapshot order).
pub fn sorted<'a>(players: &'a [Player], sort: SortOption) -> Vec<&'a Player> {
    let mut ordered: Vec<&Player> = players.iter().collect();
    ordered.sort_by(|a, b| compare(sort, a, b));
    ordered
}

/// Cut page `page_index` of `page_size` items out of the sorted snapshot.
///
/// The ordering is rebuilt on every call. A page past the end is empty and
/// carries no next key.
pub fn window(
    players: &[Player],
    sort: SortOption,
    page_index: usize,
    page_size: usize,
) -> Page<Player> {
    let page_size = page_size.max(1);
    let ordered = sorted(players, sort);

    let start = match page_index.checked_mul(page_size) {
        Some(start) if start < ordered.len() => start,
        _ => return Page::empty(page_index),
    };
    let end = start.saturating_add(page_size).min(ordered.len());

    Page {
        items: ordered[start..end].iter().map(|p| (*p).clone()).collect(),
        page_index,
        has_prev: page_index > 0,
        has_next: end < ordered.len(),
    }
}

/// Page index that contains the item at `anchor`, used to resume paging near
/// a consumer's scroll position after a restart.
pub fn refresh_page_index(anchor: Option<usize>, page_size: usize) -> Option<usize> {
    anchor.map(|position| position / page_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Team;

    fn player(name: &str, goals: i64, team_rank: i64, league: &str) -> Player {
        Player {
            id: format!("{league}_{name}").to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            team: Team {
                name: format!("{name} FC"),
                rank: team_rank,
            },
            total_goals: goals,
            league: league.to_string(),
            followed: false,
        }
    }

    fn roster() -> Vec<Player> {
        vec![
            player("Mbappe", 28, 1, "Ligue 1"),
            player("Kane", 23, 5, "Premier League"),
            player("Haaland", 36, 1, "Premier League"),
            player("Salah", 23, 2, "Premier League"),
            player("Lewandowski", 35, 3, "Bundesliga"),
            player("Benzema", 19, 2, "La Liga"),
            player("Osimhen", 26, 4, "Serie A"),
            player("Vlahovic", 14, 7, "Serie A"),
            player("Nkunku", 17, 6, "Bundesliga"),
        ]
    }

    fn names(page: &Page<Player>) -> Vec<&str> {
        page.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn metric_descending_scenario() {
        let players = vec![
            player("Low", 5, 3, "Serie A"),
            player("High", 30, 1, "La Liga"),
            player("Mid", 12, 2, "Serie A"),
        ];

        let first = window(&players, SortOption::GoalsDesc, 0, 2);
        assert_eq!(names(&first), ["High", "Mid"]);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let second = window(&players, SortOption::GoalsDesc, 1, 2);
        assert_eq!(names(&second), ["Low"]);
        assert!(second.has_prev);
        assert!(!second.has_next);
    }

    #[test]
    fn ties_keep_snapshot_order_in_both_directions() {
        let players = roster();

        let asc = window(&players, SortOption::GoalsAsc, 0, players.len());
        let kane = names(&asc).iter().position(|n| *n == "Kane");
        let salah = names(&asc).iter().position(|n| *n == "Salah");
        assert!(kane < salah);

        let desc = window(&players, SortOption::GoalsDesc, 0, players.len());
        let kane = names(&desc).iter().position(|n| *n == "Kane");
        let salah = names(&desc).iter().position(|n| *n == "Salah");
        assert!(kane < salah);

        let by_rank = window(&players, SortOption::TeamRankAsc, 0, 2);
        assert_eq!(names(&by_rank), ["Mbappe", "Haaland"]);
    }

    #[test]
    fn name_sort_is_lexicographic() {
        let players = roster();
        let asc = window(&players, SortOption::NameAsc, 0, 3);
        assert_eq!(names(&asc), ["Benzema", "Haaland", "Kane"]);

        let desc = window(&players, SortOption::NameDesc, 0, 3);
        assert_eq!(names(&desc), ["Vlahovic", "Salah", "Osimhen"]);
    }

    #[test]
    fn windowing_is_deterministic() {
        let players = roster();
        for sort in SortOption::ALL {
            for page_index in 0..4 {
                assert_eq!(
                    window(&players, sort, page_index, 4),
                    window(&players, sort, page_index, 4)
                );
            }
        }
    }

    #[test]
    fn concatenated_pages_reproduce_sorted_snapshot() {
        let players = roster();
        for sort in SortOption::ALL {
            let expected: Vec<Player> = sorted(&players, sort).into_iter().cloned().collect();

            for page_size in [1, 7, players.len()] {
                let mut collected = Vec::new();
                let mut page_index = 0;
                loop {
                    let page = window(&players, sort, page_index, page_size);
                    collected.extend(page.items.iter().cloned());
                    match page.next_key() {
                        Some(next) => page_index = next,
                        None => break,
                    }
                }
                assert_eq!(collected, expected, "sort {sort} page size {page_size}");
            }
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let players = roster();
        let page = window(&players, SortOption::NameAsc, 10, 5);

        assert!(page.items.is_empty());
        assert!(page.has_prev);
        assert!(!page.has_next);
        assert_eq!(page.next_key(), None);
    }

    #[test]
    fn empty_snapshot_yields_single_empty_page() {
        let page = window(&[], SortOption::GoalsDesc, 0, DEFAULT_PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.prev_key(), None);
        assert_eq!(page.next_key(), None);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let page = window(&roster(), SortOption::NameAsc, usize::MAX, 2);
        assert!(page.items.is_empty());
    }

    #[test]
    fn refresh_index_points_at_containing_page() {
        assert_eq!(refresh_page_index(None, 20), None);
        assert_eq!(refresh_page_index(Some(0), 20), Some(0));
        assert_eq!(refresh_page_index(Some(39), 20), Some(1));
        assert_eq!(refresh_page_index(Some(40), 20), Some(2));
    }
}
