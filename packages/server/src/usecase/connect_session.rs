//! UseCase: push session lifecycle.

use std::sync::Arc;

use crate::domain::{PusherChannel, SessionId, SessionPusher, UserId};

pub struct ConnectSessionUseCase {
    pusher: Arc<dyn SessionPusher>,
}

impl ConnectSessionUseCase {
    pub fn new(pusher: Arc<dyn SessionPusher>) -> Self {
        Self { pusher }
    }

    /// Register a new session for `user`; frames for the user are sent to `sender`.
    pub async fn connect(&self, user: UserId, sender: PusherChannel) -> SessionId {
        let session = SessionId::generate();
        self.pusher.register_session(user, session, sender).await;
        session
    }

    pub async fn disconnect(&self, user: &UserId, session: SessionId) {
        self.pusher.unregister_session(user, session).await;
    }
}
