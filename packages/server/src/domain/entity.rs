//! Entities.

use super::{FeedError, NotificationId, UserId};

/// A notification stored in a user's feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: String,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
    pub read: bool,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(
        id: NotificationId,
        kind: String,
        created_at: i64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            kind,
            created_at,
            read: false,
            payload,
        }
    }
}

/// All notifications of one user, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub owner: UserId,
    notifications: Vec<Notification>,
}

impl Feed {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            notifications: Vec::new(),
        }
    }

    pub fn insert(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Mark one notification read.
    ///
    /// Returns whether it was unread before.
    pub fn mark_read(&mut self, id: &NotificationId) -> Result<bool, FeedError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| FeedError::NotificationNotFound(id.as_str().to_string()))?;

        let was_unread = !notification.read;
        notification.read = true;
        Ok(was_unread)
    }

    /// Mark everything read; returns how many notifications changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    pub fn unread_count(&self) -> u64 {
        self.notifications.iter().filter(|n| !n.read).count() as u64
    }

    /// The `limit` most recent notifications, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        let start = self.notifications.len().saturating_sub(limit);
        self.notifications[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
