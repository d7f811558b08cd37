//! Transport connection.
//!
//! Owns the one logical push channel of a session: opens it, feeds inbound
//! frames to the store, and reconnects with backoff when it drops.

mod connector;
mod frame;
mod runner;
mod session;

pub use connector::{PushConnector, PushMessage, PushStream, WebSocketConnector};
pub use frame::{InboundFrame, parse_frame};
pub(crate) use runner::{TransportContext, run_transport};
