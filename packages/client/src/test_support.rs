//! Test doubles shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{
    domain::{BackoffPolicy, Credential},
    error::ClientError,
    transport::{PushConnector, PushMessage, PushStream},
};

pub(crate) type Script = VecDeque<Result<PushStream, ClientError>>;

/// `PushConnector` that replays scripted outcomes, one per attempt, and
/// refuses once the script is exhausted.
pub(crate) struct ScriptedConnector {
    script: Mutex<Script>,
    attempts: AtomicUsize,
}

impl ScriptedConnector {
    pub(crate) fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            attempts: AtomicUsize::new(0),
        })
    }

    pub(crate) fn push(&self, outcome: Result<PushStream, ClientError>) {
        self.script.lock().push_back(outcome);
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushConnector for ScriptedConnector {
    async fn connect(&self, _credential: &Credential) -> Result<PushStream, ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(refused)
    }
}

pub(crate) type FrameSender = mpsc::UnboundedSender<Result<PushMessage, ClientError>>;

/// A push stream fed by the returned sender.
pub(crate) fn channel_stream() -> (FrameSender, PushStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    (tx, Box::pin(stream))
}

pub(crate) fn refused() -> Result<PushStream, ClientError> {
    Err(ClientError::Connection("refused".to_string()))
}

pub(crate) fn text(frame: &str) -> Result<PushMessage, ClientError> {
    Ok(PushMessage::Text(frame.to_string()))
}

pub(crate) fn notification_frame(id: &str) -> Result<PushMessage, ClientError> {
    text(&format!(
        r#"{{"type":"notification","id":"{}","kind":"promo","createdAt":1,"read":false}}"#,
        id
    ))
}

pub(crate) fn fast_backoff(max_consecutive_failures: u32) -> BackoffPolicy {
    BackoffPolicy {
        initial_delay_ms: 5,
        multiplier: 2,
        max_delay_ms: 20,
        jitter: 0.0,
        max_consecutive_failures,
    }
}

/// Poll `condition` until it holds; panics after 3 seconds.
pub(crate) async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
