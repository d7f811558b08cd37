//! Error types for the notification presence client.

use thiserror::Error;

/// Client-specific errors
///
/// None of these is fatal to the host application: the worst outcome is a
/// temporarily stale unread count.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transient transport failure; triggers backoff and retry
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected the session credential; retrying cannot help
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed frame from the server; the frame is dropped
    #[error("Parse error: {0}")]
    Parse(String),

    /// A read acknowledgment could not be delivered
    #[error("Acknowledgment error: {0}")]
    Acknowledgment(String),

    /// The authoritative snapshot could not be fetched
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// The client could not be constructed from its configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
