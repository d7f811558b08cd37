//! InMemory Feed Repository 実装
//!
//! Feeds are kept in a `HashMap` keyed by user and lost on restart, which is
//! all a development server needs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Feed, FeedError, FeedRepository, Notification, NotificationId, UserId};

#[derive(Default)]
pub struct InMemoryFeedRepository {
    feeds: Mutex<HashMap<UserId, Feed>>,
}

impl InMemoryFeedRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn insert(&self, user: &UserId, notification: Notification) -> Result<(), FeedError> {
        let mut feeds = self.feeds.lock().await;
        feeds
            .entry(user.clone())
            .or_insert_with(|| Feed::new(user.clone()))
            .insert(notification);
        Ok(())
    }

    async fn recent(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<(Vec<Notification>, u64), FeedError> {
        let feeds = self.feeds.lock().await;
        Ok(feeds
            .get(user)
            .map(|feed| (feed.recent(limit), feed.unread_count()))
            .unwrap_or_default())
    }

    async fn mark_read(&self, user: &UserId, id: &NotificationId) -> Result<bool, FeedError> {
        let mut feeds = self.feeds.lock().await;
        feeds
            .get_mut(user)
            .ok_or_else(|| FeedError::NotificationNotFound(id.as_str().to_string()))?
            .mark_read(id)
    }

    async fn mark_all_read(&self, user: &UserId) -> Result<usize, FeedError> {
        let mut feeds = self.feeds.lock().await;
        Ok(feeds.get_mut(user).map_or(0, Feed::mark_all_read))
    }
}
