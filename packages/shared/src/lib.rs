//! Code shared by the Storebell push server and the presence client.
//!
//! - `dto`: wire formats of the push channel and the notifications REST API
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and timestamp formatting

pub mod dto;
pub mod logger;
pub mod time;
