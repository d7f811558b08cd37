//! Application-lifetime listener.

use crate::{service::NotificationService, subscription::Subscription};

/// Invisible subscriber mounted once at application start.
///
/// Holding it keeps the subscriber count above zero, so the push channel stays
/// up regardless of which visible components are mounted.
pub struct NotificationListener {
    _subscription: Subscription,
}

impl NotificationListener {
    pub fn mount(service: &NotificationService) -> Self {
        let subscription = service.subscribe(|snapshot| {
            tracing::trace!(
                "Presence: {} unread, {}",
                snapshot.unread_count,
                snapshot.status.as_str()
            );
        });
        Self {
            _subscription: subscription,
        }
    }
}
