//! Client configuration.

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{domain::BackoffPolicy, error::ClientError};

/// What to do with the connection when the last subscriber goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdlePolicy {
    /// Keep the channel open; avoids reconnect churn when subscribers come
    /// and go
    #[default]
    KeepWarm,
    /// Close the channel and reset the state
    Disconnect,
}

/// Configuration of a `NotificationService`.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use storebell_client::config::ClientConfig;
///
/// let config: ClientConfig =
///     serde_json::from_str(r#"{"api_url": "http://shop.local:8080"}"#).unwrap();
/// assert_eq!(config.api_url, "http://shop.local:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket URL of the push channel
    pub ws_url: String,
    /// Base URL of the notifications REST API
    pub api_url: String,
    pub backoff: BackoffPolicy,
    /// A channel silent for longer than this is considered dropped
    /// (milliseconds)
    pub heartbeat_timeout_ms: u64,
    /// While connected, the unread count is re-fetched from the server this
    /// often (milliseconds)
    pub resync_interval_ms: u64,
    pub idle_policy: IdlePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:8080/notifications/ws".to_string(),
            api_url: "http://127.0.0.1:8080".to_string(),
            backoff: BackoffPolicy::default(),
            heartbeat_timeout_ms: 45_000,
            resync_interval_ms: 300_000,
            idle_policy: IdlePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| ClientError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    /// Never zero; `tokio::time::interval` rejects a zero period.
    pub fn resync_interval(&self) -> Duration {
        Duration::from_millis(self.resync_interval_ms.max(1))
    }
}
