//! Presentation components built on `NotificationService::subscribe`.

mod badge;
mod listener;

pub use badge::{Badge, badge_label, render_badge};
pub use listener::NotificationListener;
