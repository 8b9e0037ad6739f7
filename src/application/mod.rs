//! Application services layer.

pub mod error;
pub mod mapping;
pub mod pagination;
pub mod repos;
pub mod store;
pub mod view;
