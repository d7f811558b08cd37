//! Value objects.

use std::fmt;

use uuid::Uuid;

use super::FeedError;

const MAX_ID_LENGTH: usize = 128;

fn validate_id(raw: &str) -> Result<(), FeedError> {
    if raw.is_empty() || raw.len() > MAX_ID_LENGTH {
        return Err(FeedError::InvalidId(raw.to_string()));
    }
    if raw
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(FeedError::InvalidId(raw.to_string()));
    }
    Ok(())
}

/// Owner of a feed. The development server takes the bearer token as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: String) -> Result<Self, FeedError> {
        validate_id(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification identifier, unique per server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(raw: String) -> Result<Self, FeedError> {
        validate_id(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NotificationId {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Generates fresh `NotificationId`s.
pub struct NotificationIdFactory;

impl NotificationIdFactory {
    pub fn generate() -> NotificationId {
        NotificationId(Uuid::new_v4().to_string())
    }
}

/// One WebSocket session. A user may hold several (tabs, devices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
