//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod prefs;
pub mod remote;
pub mod telemetry;
