//! SessionPusher implementations.

pub mod websocket;

pub use websocket::WebSocketSessionPusher;
