//! Development push server for the Storebell notification bell.
//!
//! Serves the notifications REST API and the WebSocket push channel that the
//! presence client consumes, backed by in-memory feeds.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
