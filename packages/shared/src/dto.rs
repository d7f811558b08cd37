//! Data Transfer Objects exchanged between the push server and the client.
//!
//! Push channel frames are JSON objects tagged by `type`:
//!
//! ```text
//! {"type":"notification","id":"…","kind":"order-update","createdAt":1700000000000,"read":false,"payload":{…}}
//! {"type":"heartbeat","timestamp":1700000000000}
//! {"type":"read","id":"…"}
//! {"type":"read-all"}
//! ```
//!
//! REST bodies use camelCase field names.

use serde::{Deserialize, Serialize};

/// A notification as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    /// Category tag, e.g. `order-update`, `promo`, `system`
    pub kind: String,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
    pub read: bool,
    /// Opaque display data
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Server → client frame on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PushFrame {
    /// A new notification for the authenticated user
    Notification(NotificationDto),
    /// Liveness signal, carries the server time (milliseconds)
    Heartbeat { timestamp: i64 },
    /// Another session of the same user marked `id` as read
    Read { id: String },
    /// Another session of the same user marked everything as read
    ReadAll,
}

/// Body of `GET /notifications`.
///
/// `unread_count` is authoritative and may count notifications that are not
/// part of `notifications` (the backlog is a page, oldest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDto {
    pub notifications: Vec<NotificationDto>,
    pub unread_count: u64,
}

/// Body of `POST /notifications` (development server only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_frame_wire_shape() {
        // テスト項目: notification フレームが type タグ付きの camelCase JSON になる
        // given (前提条件):
        let frame = PushFrame::Notification(NotificationDto {
            id: "n-1".to_string(),
            kind: "order-update".to_string(),
            created_at: 1000,
            read: false,
            payload: json!({"orderId": 42}),
        });

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "type": "notification",
                "id": "n-1",
                "kind": "order-update",
                "createdAt": 1000,
                "read": false,
                "payload": {"orderId": 42}
            })
        );
    }

    #[test]
    fn test_control_frames_parse() {
        // テスト項目: 制御フレーム（heartbeat / read / read-all）がパースできる
        // given (前提条件):
        let heartbeat = r#"{"type":"heartbeat","timestamp":5}"#;
        let read = r#"{"type":"read","id":"n-9"}"#;
        let read_all = r#"{"type":"read-all"}"#;

        // when (操作):
        let heartbeat: PushFrame = serde_json::from_str(heartbeat).unwrap();
        let read: PushFrame = serde_json::from_str(read).unwrap();
        let read_all: PushFrame = serde_json::from_str(read_all).unwrap();

        // then (期待する結果):
        assert_eq!(heartbeat, PushFrame::Heartbeat { timestamp: 5 });
        assert_eq!(
            read,
            PushFrame::Read {
                id: "n-9".to_string()
            }
        );
        assert_eq!(read_all, PushFrame::ReadAll);
    }

    #[test]
    fn test_notification_frame_without_payload() {
        // テスト項目: payload が省略された notification フレームは null payload になる
        // given (前提条件):
        let text = r#"{"type":"notification","id":"n-2","kind":"promo","createdAt":7,"read":true}"#;

        // when (操作):
        let frame: PushFrame = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        match frame {
            PushFrame::Notification(dto) => {
                assert_eq!(dto.id, "n-2");
                assert!(dto.read);
                assert!(dto.payload.is_null());
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        // テスト項目: 未知の type を持つフレームはエラーになる
        // given (前提条件):
        let text = r#"{"type":"typing","id":"x"}"#;

        // when (操作):
        let result = serde_json::from_str::<PushFrame>(text);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        // テスト項目: スナップショットの未読数が unreadCount として出力される
        // given (前提条件):
        let snapshot = SnapshotDto {
            notifications: vec![],
            unread_count: 5,
        };

        // when (操作):
        let value = serde_json::to_value(&snapshot).unwrap();

        // then (期待する結果):
        assert_eq!(value, json!({"notifications": [], "unreadCount": 5}));
    }
}
