//! Single-flight roster cache.
//!
//! The remote feed is fetched at most once per successful load. Concurrent
//! callers that arrive while a fetch is in flight share its outcome; a failed
//! load is remembered but retried by the next caller.

use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::{counter, histogram};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::follows::FollowStore;
use super::lock::mutex_lock;
use super::snapshot::Snapshot;
use crate::application::error::StoreError;
use crate::application::mapping::{map_players, to_leagues};
use crate::application::repos::PlayerSource;
use crate::domain::entities::{League, Player};

const METRIC_REMOTE_FETCH_TOTAL: &str = "roster_remote_fetch_total";
const METRIC_REMOTE_FETCH_FAILED_TOTAL: &str = "roster_remote_fetch_failed_total";
const METRIC_REMOTE_FETCH_MS: &str = "roster_remote_fetch_ms";

type LoadResult = Result<Arc<Snapshot>, StoreError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

enum LoadState {
    NotLoaded,
    Loading { generation: u64, pending: SharedLoad },
    Loaded(Arc<Snapshot>),
    Failed(StoreError),
}

struct CacheState {
    load: LoadState,
    generation: u64,
}

/// Observable summary of the cache's load state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    NotLoaded,
    Loading,
    Loaded { version: u64, players: usize },
    Failed(StoreError),
}

pub struct PlayerCache {
    source: Arc<dyn PlayerSource>,
    follows: Arc<FollowStore>,
    state: Mutex<CacheState>,
    published: watch::Sender<Option<Arc<Snapshot>>>,
}

impl PlayerCache {
    pub fn new(source: Arc<dyn PlayerSource>, follows: Arc<FollowStore>) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            source,
            follows,
            state: Mutex::new(CacheState {
                load: LoadState::NotLoaded,
                generation: 0,
            }),
            published,
        }
    }

    /// Return the loaded snapshot, fetching it first if needed.
    ///
    /// Must be called from within a Tokio runtime. The fetch runs on its own
    /// task, so dropping the returned future does not cancel the load for
    /// other waiters.
    pub async fn snapshot(self: &Arc<Self>) -> LoadResult {
        let pending = {
            let mut state = mutex_lock(&self.state, "cache::players", "snapshot");
            let in_flight = match &state.load {
                LoadState::Loaded(snapshot) => return Ok(Arc::clone(snapshot)),
                LoadState::Loading { pending, .. } => Some(pending.clone()),
                LoadState::NotLoaded | LoadState::Failed(_) => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => self.start_load(&mut state),
            }
        };

        pending.await
    }

    /// Current snapshot without triggering a load.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match &mutex_lock(&self.state, "cache::players", "current").load {
            LoadState::Loaded(snapshot) => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match &mutex_lock(&self.state, "cache::players", "status").load {
            LoadState::NotLoaded => LoadStatus::NotLoaded,
            LoadState::Loading { .. } => LoadStatus::Loading,
            LoadState::Loaded(snapshot) => LoadStatus::Loaded {
                version: snapshot.version(),
                players: snapshot.len(),
            },
            LoadState::Failed(error) => LoadStatus::Failed(error.clone()),
        }
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.published.subscribe()
    }

    /// Replace the loaded snapshot with one whose follow flags match the
    /// current follow set. Returns `None` when nothing is loaded yet.
    pub fn apply_follow_toggle(&self) -> Option<Arc<Snapshot>> {
        let mut state = mutex_lock(&self.state, "cache::players", "apply_follow_toggle");
        let LoadState::Loaded(current) = &state.load else {
            return None;
        };

        let next = Arc::new(current.rederive(&self.follows.followed()));
        state.load = LoadState::Loaded(Arc::clone(&next));
        self.published.send_replace(Some(Arc::clone(&next)));
        debug!(version = next.version(), "Published rebuilt roster snapshot");
        Some(next)
    }

    fn start_load(self: &Arc<Self>, state: &mut CacheState) -> SharedLoad {
        state.generation += 1;
        let generation = state.generation;

        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move { cache.run_load(generation).await });

        let weak: Weak<Self> = Arc::downgrade(self);
        let pending = async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => {
                    let error = StoreError::worker(format!("roster load task failed: {err}"));
                    match weak.upgrade() {
                        Some(cache) => cache.settle(generation, Err(error)),
                        None => Err(error),
                    }
                }
            }
        }
        .boxed()
        .shared();

        state.load = LoadState::Loading {
            generation,
            pending: pending.clone(),
        };
        pending
    }

    #[instrument(skip(self))]
    async fn run_load(&self, generation: u64) -> LoadResult {
        let started_at = Instant::now();
        counter!(METRIC_REMOTE_FETCH_TOTAL).increment(1);

        let fetched = self.fetch_roster().await;

        let outcome = if fetched.is_ok() { "ok" } else { "error" };
        histogram!(METRIC_REMOTE_FETCH_MS, "outcome" => outcome)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        self.settle(generation, fetched)
    }

    async fn fetch_roster(&self) -> Result<(Vec<Player>, Vec<League>), StoreError> {
        let feed = self.source.fetch().await?;
        let players = map_players(&feed)?;
        Ok((players, to_leagues(&feed)))
    }

    fn settle(
        &self,
        generation: u64,
        fetched: Result<(Vec<Player>, Vec<League>), StoreError>,
    ) -> LoadResult {
        let mut state = mutex_lock(&self.state, "cache::players", "settle");
        let owns_load = matches!(
            &state.load,
            LoadState::Loading { generation: current, .. } if *current == generation
        );

        let result = fetched.and_then(|(players, leagues)| {
            Snapshot::build(players, leagues, &self.follows.followed())
                .map(Arc::new)
                .map_err(StoreError::from)
        });

        if !owns_load {
            return result;
        }

        match &result {
            Ok(snapshot) => {
                info!(
                    generation,
                    players = snapshot.len(),
                    leagues = snapshot.leagues().len(),
                    "Roster loaded"
                );
                if snapshot.is_empty() {
                    warn!(generation, "Roster feed contained no players");
                }
                state.load = LoadState::Loaded(Arc::clone(snapshot));
                self.published.send_replace(Some(Arc::clone(snapshot)));
            }
            Err(error) => {
                counter!(METRIC_REMOTE_FETCH_FAILED_TOTAL).increment(1);
                warn!(generation, error = %error, "Roster load failed");
                state.load = LoadState::Failed(error.clone());
            }
        }

        result
    }
}
