//! Store configuration.

use std::num::NonZeroUsize;

use crate::application::pagination::DEFAULT_PAGE_SIZE;

const DEFAULT_STORE_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(DEFAULT_PAGE_SIZE) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Players per page handed out by paging sessions.
    pub page_size: NonZeroUsize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_STORE_PAGE_SIZE,
        }
    }
}

impl From<&crate::config::PagingSettings> for StoreConfig {
    fn from(settings: &crate::config::PagingSettings) -> Self {
        Self::with_page_size(settings.page_size)
    }
}

impl StoreConfig {
    pub fn with_page_size(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }
}
