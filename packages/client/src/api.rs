//! REST calls consumed by the presence client.
//!
//! - `GET /notifications`: backlog page and authoritative unread count
//! - `POST /notifications/{id}/read`
//! - `POST /notifications/read-all`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use storebell_shared::dto::SnapshotDto;

use crate::{
    domain::{Credential, NotificationId, ServerSnapshot},
    error::ClientError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifications REST API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Fetch the authoritative snapshot used by a resync
    async fn fetch_snapshot(&self) -> Result<ServerSnapshot, ClientError>;

    /// Acknowledge one notification as read
    async fn mark_read(&self, id: &NotificationId) -> Result<(), ClientError>;

    /// Acknowledge every notification as read
    async fn mark_all_read(&self) -> Result<(), ClientError>;
}

/// `NotificationApi` over HTTP with reqwest.
pub struct HttpNotificationApi {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl HttpNotificationApi {
    /// Create a client for the API rooted at `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_ack(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| ClientError::Acknowledgment(e.to_string()))?;

        check_status(response.status(), ClientError::Acknowledgment)
    }
}

/// Map a non-success status to an error built by `wrap`; 401/403 become
/// `Unauthorized`.
fn check_status(
    status: StatusCode,
    wrap: impl FnOnce(String) -> ClientError,
) -> Result<(), ClientError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized(format!("server answered {}", status)));
    }
    Err(wrap(format!("server answered {}", status)))
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn fetch_snapshot(&self) -> Result<ServerSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url("/notifications"))
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| ClientError::Snapshot(e.to_string()))?;

        check_status(response.status(), ClientError::Snapshot)?;

        let dto: SnapshotDto = response
            .json()
            .await
            .map_err(|e| ClientError::Snapshot(e.to_string()))?;

        Ok(ServerSnapshot::from(dto))
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), ClientError> {
        self.post_ack(&format!("/notifications/{}/read", id.as_str()))
            .await
    }

    async fn mark_all_read(&self) -> Result<(), ClientError> {
        self.post_ack("/notifications/read-all").await
    }
}
