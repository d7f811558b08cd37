//! Bell badge.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    domain::ConnectionStatus, service::NotificationService, store::PresenceSnapshot,
    subscription::Subscription,
};

const BELL: &str = "🔔";
const BADGE_CAP: u64 = 99;

/// Text shown on the badge, or `None` when it should be hidden.
///
/// ```
/// use storebell_client::presentation::badge_label;
///
/// assert_eq!(badge_label(0), None);
/// assert_eq!(badge_label(7).as_deref(), Some("7"));
/// assert_eq!(badge_label(120).as_deref(), Some("99+"));
/// ```
pub fn badge_label(count: u64) -> Option<String> {
    match count {
        0 => None,
        n if n <= BADGE_CAP => Some(n.to_string()),
        _ => Some(format!("{}+", BADGE_CAP)),
    }
}

fn status_dot(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "●",
        ConnectionStatus::Connecting | ConnectionStatus::Reconnecting => "◌",
        ConnectionStatus::Disconnected => "○",
    }
}

/// One-line rendering of a snapshot, e.g. `🔔 3 ●` or `🔔 ○`.
pub fn render_badge(snapshot: &PresenceSnapshot) -> String {
    let dot = status_dot(snapshot.status);
    match badge_label(snapshot.unread_count) {
        Some(label) => format!("{} {} {}", BELL, label, dot),
        None => format!("{} {}", BELL, dot),
    }
}

/// Subscribed badge that keeps its rendered line current.
pub struct Badge {
    line: Arc<Mutex<String>>,
    _subscription: Subscription,
}

impl Badge {
    pub fn mount(service: &NotificationService) -> Self {
        Self::mount_with(service, |_| {})
    }

    /// Mount a badge that calls `on_change` with the new line whenever the
    /// rendering changes, starting with the initial rendering.
    pub fn mount_with<F>(service: &NotificationService, on_change: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let line = Arc::new(Mutex::new(String::new()));
        let sink = line.clone();
        let subscription = service.subscribe(move |snapshot| {
            let rendered = render_badge(snapshot);
            {
                let mut current = sink.lock();
                if *current == rendered {
                    return;
                }
                current.clone_from(&rendered);
            }
            on_change(&rendered);
        });

        Self {
            line,
            _subscription: subscription,
        }
    }

    /// The current rendering.
    pub fn line(&self) -> String {
        self.line.lock().clone()
    }
}
