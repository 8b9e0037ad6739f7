//! Player roster with a single-fetch cache, sorted paging and durable follows.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
