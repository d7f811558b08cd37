//! UseCase layer.

mod connect_session;
mod list_notifications;
mod mark_read;
mod publish_notification;

pub use connect_session::ConnectSessionUseCase;
pub use list_notifications::{ListNotificationsUseCase, PAGE_SIZE};
pub use mark_read::MarkReadUseCase;
pub use publish_notification::PublishNotificationUseCase;

use crate::domain::{FeedEvent, PushError, SessionPusher, UserId};

/// Fan `event` out to the user's open sessions. Delivery problems are logged,
/// never returned: the feed change already happened.
async fn notify_sessions(pusher: &dyn SessionPusher, user: &UserId, event: &FeedEvent) {
    match pusher.push_to_user(user, event).await {
        Ok(_) => {}
        Err(PushError::NoSession(_)) => {
            tracing::debug!("No open session for '{}', change stays in feed", user);
        }
        Err(e) => {
            tracing::warn!("Failed to notify sessions of '{}': {}", user, e);
        }
    }
}
