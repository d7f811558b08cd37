//! Domain errors.

use thiserror::Error;

/// Feed operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("notification '{0}' not found")]
    NotificationNotFound(String),

    #[error("invalid id '{0}'")]
    InvalidId(String),
}

/// Session fan-out errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("user '{0}' has no open session")]
    NoSession(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}
