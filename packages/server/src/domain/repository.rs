//! FeedRepository trait 定義
//!
//! Storage port for per-user feeds. Implementations live in the
//! infrastructure layer.

use async_trait::async_trait;

use super::{FeedError, Notification, NotificationId, UserId};

#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Append a notification to the user's feed, creating the feed on first use.
    async fn insert(&self, user: &UserId, notification: Notification) -> Result<(), FeedError>;

    /// The `limit` most recent notifications (oldest first) and the
    /// user's total unread count.
    async fn recent(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<(Vec<Notification>, u64), FeedError>;

    /// Returns whether the notification was unread before.
    async fn mark_read(&self, user: &UserId, id: &NotificationId) -> Result<bool, FeedError>;

    /// Returns how many notifications changed.
    async fn mark_all_read(&self, user: &UserId) -> Result<usize, FeedError>;
}
