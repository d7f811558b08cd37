//! One connection lifetime: open, resync, apply frames until the channel drops.
//! While open, the unread count is resynced periodically.

use futures_util::StreamExt;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::TransportEvent,
    error::ClientError,
    store::NotificationStore,
};

use super::{
    connector::PushMessage,
    frame::{InboundFrame, parse_frame},
    runner::TransportContext,
};

/// How a session ended.
#[derive(Debug)]
pub(crate) struct SessionEnd {
    /// Whether the channel was open at some point
    pub opened: bool,
    pub error: ClientError,
}

impl SessionEnd {
    fn before_open(error: ClientError) -> Self {
        Self {
            opened: false,
            error,
        }
    }

    fn after_open(error: ClientError) -> Self {
        Self {
            opened: true,
            error,
        }
    }
}

/// Run a session until the channel fails.
///
/// Never returns on its own while the channel is healthy; the caller cancels
/// it by dropping the future.
pub(crate) async fn run_session(ctx: &TransportContext, cancel: &CancellationToken) -> SessionEnd {
    let mut stream = match ctx.connector.connect(&ctx.credential).await {
        Ok(stream) => stream,
        Err(e) => return SessionEnd::before_open(e),
    };

    ctx.store.transition(TransportEvent::Opened);
    tracing::info!("Notification channel connected");

    // Live frames queue up in the stream while the snapshot is fetched, and
    // anything already in the snapshot is deduplicated by id afterwards.
    resync_from_server(ctx).await;

    let mut resync = interval_at(Instant::now() + ctx.resync_interval, ctx.resync_interval);
    resync.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut deadline = Instant::now() + ctx.heartbeat_timeout;

    loop {
        let message = tokio::select! {
            next = stream.next() => match next {
                None => {
                    return SessionEnd::after_open(ClientError::Connection(
                        "channel ended".to_string(),
                    ));
                }
                Some(Err(e)) => return SessionEnd::after_open(e),
                Some(Ok(message)) => message,
            },
            _ = sleep_until(deadline) => {
                return SessionEnd::after_open(ClientError::Connection(format!(
                    "no traffic for {:?}",
                    ctx.heartbeat_timeout
                )));
            }
            _ = resync.tick() => {
                resync_from_server(ctx).await;
                continue;
            }
        };
        deadline = Instant::now() + ctx.heartbeat_timeout;

        if cancel.is_cancelled() {
            return SessionEnd::after_open(ClientError::Connection("cancelled".to_string()));
        }

        match message {
            PushMessage::Text(text) => match parse_frame(&text) {
                Ok(frame) => apply_frame(&ctx.store, frame),
                Err(e) => tracing::warn!("Dropping malformed frame: {}", e),
            },
            PushMessage::Liveness => tracing::trace!("Liveness traffic"),
        }
    }
}

/// Replace the local state with the server's view. A failed fetch keeps the
/// local state; the next tick or reconnect tries again.
async fn resync_from_server(ctx: &TransportContext) {
    match ctx.api.fetch_snapshot().await {
        Ok(snapshot) => {
            tracing::debug!(
                "Resynced with server: {} unread, {} in backlog",
                snapshot.unread_count,
                snapshot.notifications.len()
            );
            ctx.store.resync(snapshot);
        }
        Err(e) => tracing::warn!("Resync skipped, keeping local state: {}", e),
    }
}

/// Forward a frame to the store. Control frames from other sessions are
/// applied locally only; they are never acknowledged back.
fn apply_frame(store: &NotificationStore, frame: InboundFrame) {
    match frame {
        InboundFrame::Notification(notification) => {
            let id = notification.id.clone();
            if store.apply_incoming(notification) {
                tracing::debug!("Applied notification '{}'", id);
            } else {
                tracing::debug!("Ignored duplicate notification '{}'", id);
            }
        }
        InboundFrame::Heartbeat { timestamp } => {
            tracing::trace!("Heartbeat at {}", timestamp);
        }
        InboundFrame::Read(id) => {
            if store.mark_read(&id) {
                tracing::debug!("Notification '{}' read in another session", id);
            }
        }
        InboundFrame::ReadAll => {
            if store.mark_all_read() {
                tracing::debug!("All notifications read in another session");
            }
        }
    }
}
