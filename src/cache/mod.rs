//! Roster cache layer.
//!
//! - **Snapshot**: immutable copy of the roster, rebuilt wholesale on each
//!   follow toggle
//! - **Player cache**: single-flight loader that owns the current snapshot
//! - **Follow store**: durable set of followed player ids
//! - **Session registry**: tracks paging sessions for invalidation
//!
//! Lock order is registry, then player cache state, then follow set.

mod config;
mod follows;
mod lock;
mod players;
mod registry;
mod snapshot;

pub use config::StoreConfig;
pub use follows::{FOLLOWED_PLAYERS_KEY, FollowStore};
pub use players::{LoadStatus, PlayerCache};
pub use registry::{SessionFlag, SessionRegistry};
pub use snapshot::Snapshot;
