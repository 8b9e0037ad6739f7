//! Durable set of followed player ids.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::lock::{rw_read, rw_write};
use crate::application::repos::FollowPrefs;

/// Preference key under which the follow set is persisted.
pub const FOLLOWED_PLAYERS_KEY: &str = "followed_players";

/// In-memory follow set mirrored to a [`FollowPrefs`] backend.
///
/// The set is read once at construction. Every toggle writes the full set
/// back while the write lock is held, so the persisted value always matches
/// the last toggle observed by readers.
pub struct FollowStore {
    prefs: Arc<dyn FollowPrefs>,
    ids: RwLock<BTreeSet<String>>,
}

impl FollowStore {
    /// Load the persisted set. Blocks on the backend.
    pub fn open(prefs: Arc<dyn FollowPrefs>) -> Self {
        let ids = prefs.get_string_set(FOLLOWED_PLAYERS_KEY);
        debug!(count = ids.len(), "Loaded follow set");
        Self {
            prefs,
            ids: RwLock::new(ids),
        }
    }

    pub fn is_followed(&self, player_id: &str) -> bool {
        rw_read(&self.ids, "cache::follows", "is_followed").contains(player_id)
    }

    pub fn followed(&self) -> BTreeSet<String> {
        rw_read(&self.ids, "cache::follows", "followed").clone()
    }

    /// Flip membership of `player_id` and persist. Blocks on the backend.
    ///
    /// Returns whether the id is followed afterwards together with the
    /// updated set.
    pub fn toggle(&self, player_id: &str) -> (bool, BTreeSet<String>) {
        let mut ids = rw_write(&self.ids, "cache::follows", "toggle");
        let followed = if ids.remove(player_id) {
            false
        } else {
            ids.insert(player_id.to_string());
            true
        };

        self.prefs.put_string_set(FOLLOWED_PLAYERS_KEY, &ids);
        debug!(player_id, followed, count = ids.len(), "Persisted follow set");

        (followed, ids.clone())
    }
}
