//! Inbound frame parsing.

use storebell_shared::dto::PushFrame;

use crate::{
    domain::{Notification, NotificationId},
    error::ClientError,
};

/// A validated frame from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Data frame
    Notification(Notification),
    /// Liveness only
    Heartbeat { timestamp: i64 },
    /// Another session of this user read `id`
    Read(NotificationId),
    /// Another session of this user read everything
    ReadAll,
}

/// Parse a text frame.
///
/// # Errors
///
/// `ClientError::Parse` for malformed JSON, unknown frame types, or invalid
/// ids. Callers drop such frames.
pub fn parse_frame(text: &str) -> Result<InboundFrame, ClientError> {
    let frame: PushFrame =
        serde_json::from_str(text).map_err(|e| ClientError::Parse(e.to_string()))?;

    let frame = match frame {
        PushFrame::Notification(dto) => InboundFrame::Notification(Notification::try_from(dto)?),
        PushFrame::Heartbeat { timestamp } => InboundFrame::Heartbeat { timestamp },
        PushFrame::Read { id } => InboundFrame::Read(NotificationId::new(id)?),
        PushFrame::ReadAll => InboundFrame::ReadAll,
    };

    Ok(frame)
}
