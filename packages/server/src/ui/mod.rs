//! UI layer: axum routes for the REST API and the push channel.

mod auth;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
