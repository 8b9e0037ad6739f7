use std::fmt;

use thiserror::Error;

use crate::{config::LoadError, domain::error::DomainError, infra::error::InfraError};

/// Failure category reported by a remote player source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    NoConnection,
    Io,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::NoConnection => "no_connection",
            TransportErrorKind::Io => "io",
            TransportErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised at the transport boundary. Always retryable by the caller.
///
/// Cloneable so that every waiter on a shared load observes the same failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn no_connection(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NoConnection, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Io, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }
}

/// Errors surfaced by the player store and its paging sessions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("roster invariant violated: {0}")]
    Invariant(String),
    #[error("paging session was invalidated; restart from the first page")]
    SessionInvalidated,
    #[error("player store is no longer available")]
    Closed,
    #[error("background worker failed: {0}")]
    Worker(String),
}

impl StoreError {
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Transport failures are retried on explicit caller action; everything
    /// else needs a code or data fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Transport(_) | StoreError::SessionInvalidated | StoreError::Worker(_)
        )
    }
}

impl From<DomainError> for StoreError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Invariant { message } => StoreError::Invariant(message),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_includes_kind() {
        let err = TransportError::timeout("no response after 20s");
        assert_eq!(
            err.to_string(),
            "transport error (timeout): no response after 20s"
        );
    }

    #[test]
    fn domain_invariant_maps_to_store_invariant() {
        let err: StoreError = DomainError::invariant("duplicate player id `x`").into();
        assert_eq!(err, StoreError::Invariant("duplicate player id `x`".to_string()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_failures_are_retryable() {
        let err: StoreError = TransportError::no_connection("dns lookup failed").into();
        assert!(err.is_retryable());
    }
}
