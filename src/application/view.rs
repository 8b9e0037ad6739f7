//! Paged roster view for a single sort selection.
//!
//! Drives one [`PagingSession`] at a time and accumulates the pages it has
//! loaded. The view moves `Loading -> Success | Error`; only the first page
//! of a cycle can move it to `Error`, later page failures are returned to the
//! caller and leave the view in `Success`.

use tracing::{debug, warn};

use crate::application::error::StoreError;
use crate::application::pagination::{Page, refresh_page_index};
use crate::application::store::{PagingSession, PlayerStore};
use crate::domain::entities::Player;
use crate::domain::types::SortOption;

/// Reload attempts made by one [`PlayersView::load_more`] call after its
/// session was invalidated.
pub const MAX_RESUME_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Success { pages: usize, has_next: bool },
    Error(StoreError),
}

/// Outcome of [`PlayersView::load_more`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page was appended with this many players.
    Appended(usize),
    /// Every page has already been loaded.
    Exhausted,
    /// The session was invalidated and the view reloaded up to the page the
    /// caller had reached. Holds the number of players now loaded.
    Restarted { items: usize },
}

pub struct PlayersView {
    store: PlayerStore,
    sort: SortOption,
    session: PagingSession,
    items: Vec<Player>,
    pages: usize,
    next_page: Option<usize>,
    state: ViewState,
}

impl PlayersView {
    /// Create a view with the default sort. Nothing is fetched until the
    /// first [`load_more`](Self::load_more) or [`select_sort`](Self::select_sort).
    pub fn new(store: PlayerStore) -> Self {
        let sort = SortOption::default();
        let session = store.paged_view(sort);
        Self {
            store,
            sort,
            session,
            items: Vec::new(),
            pages: 0,
            next_page: None,
            state: ViewState::Loading,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn items(&self) -> &[Player] {
        &self.items
    }

    /// Switch to `sort` and load its first page.
    pub async fn select_sort(&mut self, sort: SortOption) -> &ViewState {
        self.sort = sort;
        self.restart().await;
        &self.state
    }

    /// Leave `Error` by reloading the first page with the same sort.
    ///
    /// Has no effect in any other state.
    pub async fn retry(&mut self) -> &ViewState {
        if matches!(self.state, ViewState::Error(_)) {
            debug!(sort = %self.sort, "Retrying roster view");
            self.restart().await;
        }
        &self.state
    }

    /// Load the next page.
    ///
    /// In `Loading` this fetches the first page. In `Error` it returns the
    /// recorded error without fetching; call [`retry`](Self::retry) instead.
    pub async fn load_more(&mut self) -> Result<LoadMore, StoreError> {
        if matches!(self.state, ViewState::Loading) {
            self.restart().await;
            return match &self.state {
                ViewState::Error(err) => Err(err.clone()),
                _ => Ok(LoadMore::Appended(self.items.len())),
            };
        }
        if let ViewState::Error(err) = &self.state {
            return Err(err.clone());
        }

        let Some(next) = self.next_page else {
            return Ok(LoadMore::Exhausted);
        };

        match self.session.load(next).await {
            Ok(page) => {
                let appended = page.items.len();
                self.accept(page);
                Ok(LoadMore::Appended(appended))
            }
            Err(StoreError::SessionInvalidated) => self.resume().await,
            Err(err) => {
                warn!(
                    sort = %self.sort,
                    page = next,
                    retryable = err.is_retryable(),
                    error = %err,
                    "Failed to load roster page"
                );
                Err(err)
            }
        }
    }

    async fn restart(&mut self) {
        self.session = self.store.paged_view(self.sort);
        self.items.clear();
        self.pages = 0;
        self.next_page = None;
        self.state = ViewState::Loading;

        match self.session.load(0).await {
            Ok(page) => self.accept(page),
            Err(err) => {
                warn!(
                    sort = %self.sort,
                    retryable = err.is_retryable(),
                    error = %err,
                    "Failed to load roster view"
                );
                self.state = ViewState::Error(err);
            }
        }
    }

    /// Restart after invalidation and reload up to the page holding the last
    /// item the caller had seen. A session invalidated again while reloading
    /// is replaced, at most [`MAX_RESUME_ATTEMPTS`] times.
    async fn resume(&mut self) -> Result<LoadMore, StoreError> {
        let anchor = self.items.len().checked_sub(1);
        let target = refresh_page_index(anchor, self.session.page_size()).unwrap_or(0);

        let mut attempt = 1;
        loop {
            debug!(sort = %self.sort, target, attempt, "Paging session invalidated, reloading");
            match self.reload_through(target).await {
                Ok(()) => {
                    return Ok(LoadMore::Restarted {
                        items: self.items.len(),
                    });
                }
                Err(StoreError::SessionInvalidated) if attempt < MAX_RESUME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn reload_through(&mut self, target: usize) -> Result<(), StoreError> {
        self.restart().await;
        if let ViewState::Error(err) = &self.state {
            return Err(err.clone());
        }

        while self.pages <= target {
            let Some(next) = self.next_page else {
                break;
            };
            let page = self.session.load(next).await?;
            self.accept(page);
        }
        Ok(())
    }

    fn accept(&mut self, page: Page<Player>) {
        self.next_page = page.next_key();
        self.pages += 1;
        self.items.extend(page.items);
        self.state = ViewState::Success {
            pages: self.pages,
            has_next: self.next_page.is_some(),
        };
    }
}
