//! Domain error types.

use thiserror::Error;

/// Errors produced by domain logic itself.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A subscription or matching run is misconfigured (bad recurrence
    /// rule, group size below two). Fatal to that single item only.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A referenced subscription or spec is missing.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors surfaced by storage collaborators.
///
/// Persistence adapters translate their backend errors into this type so
/// the orchestrator can distinguish idempotency conflicts from real
/// failures without depending on database crates.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint fired (e.g. a concurrent writer already
    /// created the spec for this week).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Error from a notification dispatch attempt.
#[derive(Debug, Error)]
#[error("Notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Union of the failures a single batch item can hit.
///
/// Batch operations isolate these per item: the error is logged and the
/// remaining items continue.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
