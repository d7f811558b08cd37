//! Notification entities and their conversion from wire DTOs.

use std::fmt;

use storebell_shared::dto::{NotificationDto, SnapshotDto};

use crate::error::ClientError;

/// Server-assigned notification identifier.
///
/// Non-empty, and safe to embed as a single URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: String) -> Result<Self, ClientError> {
        if id.is_empty() {
            return Err(ClientError::Parse("notification id is empty".to_string()));
        }
        if id
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(ClientError::Parse(format!(
                "notification id '{}' contains reserved characters",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NotificationId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NotificationId {
    type Error = ClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category tag of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    OrderUpdate,
    Promo,
    System,
    /// A tag this client does not know yet; kept verbatim
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrderUpdate => "order-update",
            Self::Promo => "promo",
            Self::System => "system",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(tag: &str) -> Self {
        match tag {
            "order-update" => Self::OrderUpdate,
            "promo" => Self::Promo,
            "system" => Self::System,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A notification known to the client.
///
/// Only the `read` flag ever changes after receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
    pub read: bool,
    pub payload: serde_json::Value,
}

impl TryFrom<NotificationDto> for Notification {
    type Error = ClientError;

    fn try_from(dto: NotificationDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::new(dto.id)?,
            kind: NotificationKind::from(dto.kind.as_str()),
            created_at: dto.created_at,
            read: dto.read,
            payload: dto.payload,
        })
    }
}

/// Authoritative server state used by a resync.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSnapshot {
    /// Backlog page, oldest first
    pub notifications: Vec<Notification>,
    /// Authoritative unread count
    pub unread_count: u64,
}

impl From<SnapshotDto> for ServerSnapshot {
    /// Entries with an invalid id are skipped; the unread count is kept as
    /// reported since it is authoritative anyway.
    fn from(dto: SnapshotDto) -> Self {
        let notifications = dto
            .notifications
            .into_iter()
            .filter_map(|entry| match Notification::try_from(entry) {
                Ok(notification) => Some(notification),
                Err(e) => {
                    tracing::warn!("Skipping snapshot entry: {}", e);
                    None
                }
            })
            .collect();

        Self {
            notifications,
            unread_count: dto.unread_count,
        }
    }
}
