//! Domain types and pure decision logic for the presence client.
//!
//! Everything here is free of I/O so it can be tested without a server.

mod backoff;
mod credential;
mod notification;
mod reconnect;
mod status;

pub use backoff::BackoffPolicy;
pub use credential::Credential;
pub use notification::{Notification, NotificationId, NotificationKind, ServerSnapshot};
pub use reconnect::{should_attempt_reconnect, should_stop_immediately};
pub use status::{ConnectionStatus, TransportEvent};
