//! Player store façade and paging sessions.

use std::sync::{Arc, Weak};

use async_stream::stream;
use futures::Stream;
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::application::error::StoreError;
use crate::application::pagination::{Page, window};
use crate::application::repos::{FollowPrefs, PlayerSource};
use crate::cache::{
    FollowStore, LoadStatus, PlayerCache, SessionFlag, SessionRegistry, StoreConfig,
};
use crate::domain::entities::{League, Player};
use crate::domain::types::SortOption;

const METRIC_FOLLOW_TOGGLE_TOTAL: &str = "roster_follow_toggle_total";
const METRIC_SESSIONS_INVALIDATED_TOTAL: &str = "roster_sessions_invalidated_total";

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Followed,
    Unfollowed,
    /// The id is not part of the loaded roster. Nothing was changed.
    Unknown,
}

impl ToggleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ToggleOutcome::Followed => "followed",
            ToggleOutcome::Unfollowed => "unfollowed",
            ToggleOutcome::Unknown => "unknown",
        }
    }
}

struct StoreInner {
    cache: Arc<PlayerCache>,
    follows: Arc<FollowStore>,
    registry: SessionRegistry,
    config: StoreConfig,
}

/// Entry point for reading the roster and managing follows.
///
/// Cheap to clone; clones share the same cache, follow set and sessions.
#[derive(Clone)]
pub struct PlayerStore {
    inner: Arc<StoreInner>,
}

impl PlayerStore {
    pub fn new(source: Arc<dyn PlayerSource>, follows: FollowStore, config: StoreConfig) -> Self {
        let follows = Arc::new(follows);
        Self {
            inner: Arc::new(StoreInner {
                cache: Arc::new(PlayerCache::new(source, Arc::clone(&follows))),
                follows,
                registry: SessionRegistry::new(),
                config,
            }),
        }
    }

    /// Build a store, reading the persisted follow set on a blocking worker.
    pub async fn open(
        source: Arc<dyn PlayerSource>,
        prefs: Arc<dyn FollowPrefs>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        let follows = tokio::task::spawn_blocking(move || FollowStore::open(prefs))
            .await
            .map_err(|err| StoreError::worker(format!("failed to read follow set: {err}")))?;
        Ok(Self::new(source, follows, config))
    }

    /// Start a paging session over the roster ordered by `sort`.
    ///
    /// Does not load anything until the first page is requested.
    pub fn paged_view(&self, sort: SortOption) -> PagingSession {
        let flag = self.inner.registry.register();
        debug!(sort = %sort, "Opened paging session");
        PagingSession {
            sort,
            page_size: self.inner.config.page_size.get(),
            flag,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Followed players, re-emitted after every published snapshot.
    ///
    /// Emits nothing until some other call has loaded the roster. The stream
    /// ends when the store is dropped.
    pub fn followed_view(&self) -> impl Stream<Item = Vec<Player>> + Send + 'static {
        let mut receiver = self.inner.cache.subscribe();
        stream! {
            loop {
                let followed = receiver
                    .borrow_and_update()
                    .as_ref()
                    .map(|snapshot| snapshot.followed());
                if let Some(followed) = followed {
                    yield followed;
                }
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// Followed players in roster order, loading the roster if needed.
    pub async fn followed(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.inner.cache.snapshot().await?.followed())
    }

    pub async fn leagues(&self) -> Result<Vec<League>, StoreError> {
        Ok(self.inner.cache.snapshot().await?.leagues().to_vec())
    }

    /// Flip the follow state of `player_id`.
    ///
    /// Loads the roster first. Unknown ids are ignored. Otherwise the new
    /// follow set is persisted, the snapshot is rebuilt and every open paging
    /// session is invalidated before this returns. Once started, the update
    /// runs to completion even if the caller stops waiting.
    #[instrument(skip(self))]
    pub async fn toggle_follow(&self, player_id: &str) -> Result<ToggleOutcome, StoreError> {
        let snapshot = self.inner.cache.snapshot().await?;
        let Some(player) = snapshot.get(player_id) else {
            counter!(METRIC_FOLLOW_TOGGLE_TOTAL, "result" => ToggleOutcome::Unknown.as_str())
                .increment(1);
            debug!(player_id, "Ignoring follow toggle for unknown player");
            return Ok(ToggleOutcome::Unknown);
        };
        debug!(
            player_id,
            name = %player.name,
            was_followed = player.followed,
            "Toggling follow state"
        );

        let inner = Arc::clone(&self.inner);
        let id = player_id.to_string();
        let update = tokio::spawn(async move {
            let follows = Arc::clone(&inner.follows);
            let (followed, ids) = tokio::task::spawn_blocking(move || follows.toggle(&id))
                .await
                .map_err(|err| StoreError::worker(format!("failed to persist follow set: {err}")))?;

            let (published, invalidated) = inner
                .registry
                .invalidate_after(|| inner.cache.apply_follow_toggle());

            counter!(METRIC_SESSIONS_INVALIDATED_TOTAL).increment(invalidated as u64);
            info!(
                followed,
                follow_count = ids.len(),
                invalidated,
                version = published.map(|snapshot| snapshot.version()),
                "Follow state changed"
            );

            Ok::<_, StoreError>(followed)
        });

        let followed = update
            .await
            .map_err(|err| StoreError::worker(format!("follow toggle task failed: {err}")))??;

        let outcome = if followed {
            ToggleOutcome::Followed
        } else {
            ToggleOutcome::Unfollowed
        };
        counter!(METRIC_FOLLOW_TOGGLE_TOTAL, "result" => outcome.as_str()).increment(1);
        Ok(outcome)
    }

    /// Number of paging sessions that are alive and still valid.
    pub fn active_sessions(&self) -> usize {
        self.inner.registry.active_count()
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.cache.status()
    }

    pub fn page_size(&self) -> usize {
        self.inner.config.page_size.get()
    }
}

/// A paging cursor bound to one sort order.
///
/// Pages are cut from the snapshot current at each request. After a follow
/// toggle the session is invalid for good; open a new one with
/// [`PlayerStore::paged_view`].
pub struct PagingSession {
    sort: SortOption,
    page_size: usize,
    flag: Arc<SessionFlag>,
    store: Weak<StoreInner>,
}

impl PagingSession {
    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_invalid(&self) -> bool {
        self.flag.is_invalid()
    }

    /// Load page `page_index`, fetching the roster first if needed.
    pub async fn load(&self, page_index: usize) -> Result<Page<Player>, StoreError> {
        if self.is_invalid() {
            return Err(StoreError::SessionInvalidated);
        }

        let cache = match self.store.upgrade() {
            Some(inner) => Arc::clone(&inner.cache),
            None => return Err(StoreError::Closed),
        };
        let snapshot = cache.snapshot().await?;

        // A toggle may have landed while the snapshot was loading.
        if self.is_invalid() {
            return Err(StoreError::SessionInvalidated);
        }

        Ok(window(
            snapshot.players(),
            self.sort,
            page_index,
            self.page_size,
        ))
    }

    /// Walk every page from the first until there is no next page.
    ///
    /// The stream ends after yielding the first error.
    pub fn pages(&self) -> impl Stream<Item = Result<Page<Player>, StoreError>> + Send + '_ {
        stream! {
            let mut page_index = 0;
            loop {
                match self.load(page_index).await {
                    Ok(page) => {
                        let next = page.next_key();
                        yield Ok(page);
                        match next {
                            Some(next) => page_index = next,
                            None => break,
                        }
                    }
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for PagingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingSession")
            .field("sort", &self.sort)
            .field("page_size", &self.page_size)
            .field("invalid", &self.is_invalid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::StreamExt;

    use super::*;
    use crate::application::error::TransportError;
    use crate::domain::records::{LeagueFeedRecord, LeagueRecord, PlayerRecord, TeamRecord};

    #[derive(Default)]
    struct MemoryFollows(Mutex<BTreeSet<String>>);

    impl FollowPrefs for MemoryFollows {
        fn get_string_set(&self, _key: &str) -> BTreeSet<String> {
            self.0.lock().expect("prefs lock").clone()
        }

        fn put_string_set(&self, _key: &str, values: &BTreeSet<String>) {
            *self.0.lock().expect("prefs lock") = values.clone();
        }
    }

    struct FixedSource(usize);

    #[async_trait]
    impl PlayerSource for FixedSource {
        async fn fetch(&self) -> Result<Vec<LeagueFeedRecord>, TransportError> {
            let players = (0..self.0)
                .map(|n| PlayerRecord {
                    name: format!("Player {n:02}"),
                    team: TeamRecord {
                        name: "Team".to_string(),
                        rank: (n % 3) as i64,
                    },
                    total_goal: n as i64,
                })
                .collect();
            Ok(vec![LeagueFeedRecord {
                league: LeagueRecord {
                    name: "League".to_string(),
                    country: "Country".to_string(),
                    rank: 1,
                    total_matches: 10,
                },
                players,
            }])
        }
    }

    fn store(players: usize, page_size: usize) -> PlayerStore {
        let follows = FollowStore::open(Arc::new(MemoryFollows::default()));
        PlayerStore::new(
            Arc::new(FixedSource(players)),
            follows,
            StoreConfig::with_page_size(NonZeroUsize::new(page_size).expect("non-zero page size")),
        )
    }

    #[tokio::test]
    async fn pages_walk_the_sorted_roster() {
        let store = store(5, 2);
        let session = store.paged_view(SortOption::GoalsDesc);

        let pages: Vec<_> = session.pages().collect().await;
        assert_eq!(pages.len(), 3);

        let goals: Vec<i64> = pages
            .into_iter()
            .flat_map(|page| page.expect("page").items)
            .map(|player| player.total_goals)
            .collect();
        assert_eq!(goals, [4, 3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn toggle_invalidates_open_sessions() {
        let store = store(3, 2);
        let session = store.paged_view(SortOption::NameAsc);
        let first = session.load(0).await.expect("first page");
        assert_eq!(store.active_sessions(), 1);

        let id = first.items[0].id.clone();
        let outcome = store.toggle_follow(&id).await.expect("toggle");
        assert_eq!(outcome, ToggleOutcome::Followed);

        assert!(session.is_invalid());
        assert_eq!(
            session.load(1).await,
            Err(StoreError::SessionInvalidated)
        );
        assert_eq!(store.active_sessions(), 0);

        let fresh = store.paged_view(SortOption::NameAsc);
        let page = fresh.load(0).await.expect("fresh page");
        assert!(page.items[0].followed);
    }

    #[tokio::test]
    async fn unknown_toggle_leaves_sessions_alone() {
        let store = store(3, 2);
        let session = store.paged_view(SortOption::NameAsc);

        let outcome = store.toggle_follow("nobody").await.expect("toggle");

        assert_eq!(outcome, ToggleOutcome::Unknown);
        assert!(!session.is_invalid());
        assert!(store.followed().await.expect("followed").is_empty());
    }

    #[tokio::test]
    async fn session_outliving_store_is_closed() {
        let store = store(3, 2);
        let session = store.paged_view(SortOption::NameAsc);
        drop(store);

        assert_eq!(session.load(0).await, Err(StoreError::Closed));
    }

    #[tokio::test]
    async fn followed_view_tracks_toggles() {
        let store = store(3, 10);
        let mut view = Box::pin(store.followed_view());

        let players = store.paged_view(SortOption::NameAsc).load(0).await.expect("page");
        assert_eq!(view.next().await, Some(Vec::new()));

        store.toggle_follow(&players.items[1].id).await.expect("toggle");
        let followed = view.next().await.expect("update");
        assert_eq!(followed.len(), 1);
        assert_eq!(followed[0].id, players.items[1].id);

        drop(store);
        assert_eq!(view.next().await, None);
    }
}
