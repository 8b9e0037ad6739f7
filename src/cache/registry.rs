//! Paging session registry.
//!
//! Tracks every live paging session so that a follow toggle can invalidate
//! all of them in the same step that publishes the rebuilt snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::lock::mutex_lock;

/// Shared invalidation flag owned by a paging session.
///
/// Invalidation is one-way: once set the flag never clears.
#[derive(Debug, Default)]
pub struct SessionFlag {
    invalid: AtomicBool,
}

impl SessionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid.load(Ordering::Acquire)
    }
}

/// Weakly tracks the flags of live sessions.
///
/// Sessions dropped by their consumer fall out on the next registration or
/// invalidation; the registry never keeps a session alive.
pub struct SessionRegistry {
    sessions: Mutex<Vec<Weak<SessionFlag>>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Create and track the flag for a new session.
    pub fn register(&self) -> Arc<SessionFlag> {
        let flag = Arc::new(SessionFlag::new());
        let mut sessions = mutex_lock(&self.sessions, "cache::registry", "register");
        sessions.retain(|weak| weak.upgrade().is_some_and(|live| !live.is_invalid()));
        sessions.push(Arc::downgrade(&flag));
        flag
    }

    /// Run `publish`, then invalidate every tracked session, as one step.
    ///
    /// The registry lock is held across both, so no session can be registered
    /// between the new snapshot becoming visible and the old sessions being
    /// marked. A session created after this returns sees the new snapshot.
    /// Returns the publish result and the number of sessions invalidated.
    pub fn invalidate_after<T>(&self, publish: impl FnOnce() -> T) -> (T, usize) {
        let mut sessions = mutex_lock(&self.sessions, "cache::registry", "invalidate_after");
        let published = publish();

        let mut invalidated = 0;
        for flag in sessions.drain(..).filter_map(|weak| weak.upgrade()) {
            if !flag.is_invalid() {
                flag.invalidate();
                invalidated += 1;
            }
        }

        (published, invalidated)
    }

    /// Number of tracked sessions that are still alive and valid.
    pub fn active_count(&self) -> usize {
        mutex_lock(&self.sessions, "cache::registry", "active_count")
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|flag| !flag.is_invalid())
            .count()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
