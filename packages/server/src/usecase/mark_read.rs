//! UseCase: read acknowledgments.

use std::sync::Arc;

use crate::domain::{FeedError, FeedEvent, FeedRepository, NotificationId, SessionPusher, UserId};

use super::notify_sessions;

pub struct MarkReadUseCase {
    repository: Arc<dyn FeedRepository>,
    pusher: Arc<dyn SessionPusher>,
}

impl MarkReadUseCase {
    pub fn new(repository: Arc<dyn FeedRepository>, pusher: Arc<dyn SessionPusher>) -> Self {
        Self { repository, pusher }
    }

    /// Mark one notification read. Other sessions of the user are told only
    /// when the notification was unread.
    pub async fn execute(&self, user: &UserId, id: NotificationId) -> Result<bool, FeedError> {
        let changed = self.repository.mark_read(user, &id).await?;
        if changed {
            notify_sessions(self.pusher.as_ref(), user, &FeedEvent::Read(id)).await;
        }
        Ok(changed)
    }

    /// Mark every notification of the user read.
    pub async fn execute_all(&self, user: &UserId) -> Result<usize, FeedError> {
        let changed = self.repository.mark_all_read(user).await?;
        if changed > 0 {
            notify_sessions(self.pusher.as_ref(), user, &FeedEvent::ReadAll).await;
        }
        Ok(changed)
    }
}
