//! UseCase: publish a notification to a user.

use std::sync::Arc;

use storebell_shared::time::Clock;

use crate::domain::{
    FeedError, FeedEvent, FeedRepository, Notification, NotificationIdFactory, SessionPusher,
    UserId,
};

use super::notify_sessions;

pub struct PublishNotificationUseCase {
    repository: Arc<dyn FeedRepository>,
    pusher: Arc<dyn SessionPusher>,
    clock: Arc<dyn Clock>,
}

impl PublishNotificationUseCase {
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        pusher: Arc<dyn SessionPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            pusher,
            clock,
        }
    }

    /// Store a new unread notification and push it to the user's open
    /// sessions.
    pub async fn execute(
        &self,
        user: &UserId,
        kind: String,
        payload: serde_json::Value,
    ) -> Result<Notification, FeedError> {
        let notification = Notification::new(
            NotificationIdFactory::generate(),
            kind,
            self.clock.now_millis(),
            payload,
        );

        self.repository.insert(user, notification.clone()).await?;
        tracing::info!(
            "Published {} notification {} to '{}'",
            notification.kind,
            notification.id.as_str(),
            user
        );

        notify_sessions(
            self.pusher.as_ref(),
            user,
            &FeedEvent::Created(notification.clone()),
        )
        .await;

        Ok(notification)
    }
}
