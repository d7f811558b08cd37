//! SessionPusher trait 定義
//!
//! Fan-out of feed changes to every open push session of a user. The UI layer
//! creates the channels; implementations only deliver.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Notification, NotificationId, PushError, SessionId, UserId};

/// Outbound text channel of one WebSocket session
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// A change to a user's feed that open sessions must learn about.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Created(Notification),
    Read(NotificationId),
    ReadAll,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionPusher: Send + Sync {
    async fn register_session(&self, user: UserId, session: SessionId, sender: PusherChannel);

    async fn unregister_session(&self, user: &UserId, session: SessionId);

    /// Number of open sessions of `user`
    async fn session_count(&self, user: &UserId) -> usize;

    /// Deliver `event` to every session of `user`.
    ///
    /// Returns the number of sessions reached; `NoSession` if the user has
    /// none open.
    async fn push_to_user(&self, user: &UserId, event: &FeedEvent) -> Result<usize, PushError>;
}
