//! Collaborator traits describing the remote feed and preference adapters.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::application::error::TransportError;
use crate::domain::records::LeagueFeedRecord;

/// Remote source of the authoritative roster.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    /// Fetch the full, ordered league feed.
    async fn fetch(&self) -> Result<Vec<LeagueFeedRecord>, TransportError>;
}

/// Durable key/value store for string sets.
///
/// Calls block until the data is durable and never fail from the caller's
/// point of view: adapters log their own I/O errors. Callers run these on a
/// blocking worker.
pub trait FollowPrefs: Send + Sync {
    fn get_string_set(&self, key: &str) -> BTreeSet<String>;

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>);
}
