//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod identity;
pub mod records;
pub mod types;
