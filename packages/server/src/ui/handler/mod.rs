//! Request handlers.

mod http;
mod websocket;

pub use http::{health_check, list_notifications, mark_all_read, mark_read, publish_notification};
pub use websocket::websocket_handler;
