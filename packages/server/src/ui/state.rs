//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectSessionUseCase, ListNotificationsUseCase, MarkReadUseCase, PublishNotificationUseCase,
};

/// Shared application state
pub struct AppState {
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    pub list_notifications_usecase: Arc<ListNotificationsUseCase>,
    pub publish_notification_usecase: Arc<PublishNotificationUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    /// Interval between heartbeat frames on every push session
    pub heartbeat_interval: Duration,
}
