//! Notification presence client.
//!
//! Keeps an unread-notification count and the live-channel status current for
//! any number of UI subscribers, over one shared WebSocket push channel with
//! REST resync and read acknowledgments.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod presentation;
pub mod service;
pub mod store;
pub mod subscription;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, IdlePolicy};
pub use domain::{ConnectionStatus, Credential, Notification, NotificationId};
pub use error::ClientError;
pub use service::NotificationService;
pub use store::PresenceSnapshot;
pub use subscription::Subscription;
