//! WebSocket を使った SessionPusher 実装
//!
//! The UI layer accepts the socket and creates the `UnboundedSender`; this
//! type keeps the senders per user and serializes feed events into push
//! frames.

use std::collections::HashMap;

use async_trait::async_trait;
use storebell_shared::dto::PushFrame;
use tokio::sync::Mutex;

use crate::{
    domain::{FeedEvent, PushError, PusherChannel, SessionId, SessionPusher, UserId},
    infrastructure::dto::encode_frame,
};

#[derive(Default)]
pub struct WebSocketSessionPusher {
    /// Open sessions per user
    sessions: Mutex<HashMap<UserId, HashMap<SessionId, PusherChannel>>>,
}

impl WebSocketSessionPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPusher for WebSocketSessionPusher {
    async fn register_session(&self, user: UserId, session: SessionId, sender: PusherChannel) {
        let mut sessions = self.sessions.lock().await;
        let count = {
            let user_sessions = sessions.entry(user.clone()).or_default();
            user_sessions.insert(session, sender);
            user_sessions.len()
        };
        tracing::debug!(
            "Session {} of '{}' registered ({} open)",
            session,
            user,
            count
        );
    }

    async fn unregister_session(&self, user: &UserId, session: SessionId) {
        let mut sessions = self.sessions.lock().await;
        if let Some(user_sessions) = sessions.get_mut(user) {
            user_sessions.remove(&session);
            if user_sessions.is_empty() {
                sessions.remove(user);
            }
        }
        tracing::debug!("Session {} of '{}' unregistered", session, user);
    }

    async fn session_count(&self, user: &UserId) -> usize {
        self.sessions.lock().await.get(user).map_or(0, HashMap::len)
    }

    async fn push_to_user(&self, user: &UserId, event: &FeedEvent) -> Result<usize, PushError> {
        let content = encode_frame(&PushFrame::from(event))
            .map_err(|e| PushError::PushFailed(e.to_string()))?;

        let sessions = self.sessions.lock().await;
        let user_sessions = sessions
            .get(user)
            .ok_or_else(|| PushError::NoSession(user.as_str().to_string()))?;

        let mut delivered = 0;
        for (session, sender) in user_sessions {
            // 一部のセッションへの送信失敗は許容
            if let Err(e) = sender.send(content.clone()) {
                tracing::warn!("Failed to push to session {} of '{}': {}", session, user, e);
            } else {
                delivered += 1;
            }
        }
        tracing::debug!("Pushed frame to {} session(s) of '{}'", delivered, user);

        Ok(delivered)
    }
}
