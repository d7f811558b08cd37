//! Domain layer: notification feeds and the ports the use cases depend on.

mod entity;
mod error;
mod pusher;
mod repository;
mod value_object;

pub use entity::{Feed, Notification};
pub use error::{FeedError, PushError};
pub use pusher::{FeedEvent, PusherChannel, SessionPusher};
pub use repository::FeedRepository;
pub use value_object::{NotificationId, NotificationIdFactory, SessionId, UserId};

#[cfg(test)]
pub use pusher::MockSessionPusher;
