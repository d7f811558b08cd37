//! Infrastructure layer: adapters for the domain ports.

pub mod dto;
pub mod repository;
pub mod session_pusher;
