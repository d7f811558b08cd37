//! Conversion between domain entities and the shared wire DTOs.

use storebell_shared::dto::{NotificationDto, PushFrame, SnapshotDto};

use crate::domain::{FeedEvent, Notification};

impl From<Notification> for NotificationDto {
    fn from(model: Notification) -> Self {
        Self {
            id: model.id.into_string(),
            kind: model.kind,
            created_at: model.created_at,
            read: model.read,
            payload: model.payload,
        }
    }
}

impl From<&FeedEvent> for PushFrame {
    fn from(event: &FeedEvent) -> Self {
        match event {
            FeedEvent::Created(notification) => {
                PushFrame::Notification(NotificationDto::from(notification.clone()))
            }
            FeedEvent::Read(id) => PushFrame::Read {
                id: id.as_str().to_string(),
            },
            FeedEvent::ReadAll => PushFrame::ReadAll,
        }
    }
}

/// Build the body of `GET /notifications`.
pub fn snapshot_dto(notifications: Vec<Notification>, unread_count: u64) -> SnapshotDto {
    SnapshotDto {
        notifications: notifications.into_iter().map(NotificationDto::from).collect(),
        unread_count,
    }
}

/// Serialize a frame for the push channel.
pub fn encode_frame(frame: &PushFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationId;
    use serde_json::json;

    fn notification() -> Notification {
        Notification::new(
            NotificationId::new("n-1".to_string()).unwrap(),
            "order-update".to_string(),
            1_700_000_000_000,
            json!({"orderId": 7}),
        )
    }

    #[test]
    fn test_created_event_becomes_notification_frame() {
        // テスト項目: 作成イベントが notification フレームに変換される
        // given (前提条件):
        let event = FeedEvent::Created(notification());

        // when (操作):
        let json = encode_frame(&PushFrame::from(&event)).unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "notification");
        assert_eq!(value["id"], "n-1");
        assert_eq!(value["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(value["read"], false);
        assert_eq!(value["payload"]["orderId"], 7);
    }

    #[test]
    fn test_read_events_become_control_frames() {
        // テスト項目: 既読イベントが read / read-all フレームに変換される
        // given (前提条件):
        let read = FeedEvent::Read(NotificationId::new("n-1".to_string()).unwrap());
        let read_all = FeedEvent::ReadAll;

        // when (操作):
        let read = encode_frame(&PushFrame::from(&read)).unwrap();
        let read_all = encode_frame(&PushFrame::from(&read_all)).unwrap();

        // then (期待する結果):
        assert_eq!(read, r#"{"type":"read","id":"n-1"}"#);
        assert_eq!(read_all, r#"{"type":"read-all"}"#);
    }

    #[test]
    fn test_snapshot_dto_keeps_order_and_count() {
        // テスト項目: スナップショット DTO が順序と未読数を保持する
        // given (前提条件):
        let notifications = vec![notification()];

        // when (操作):
        let dto = snapshot_dto(notifications, 12);

        // then (期待する結果):
        assert_eq!(dto.unread_count, 12);
        assert_eq!(dto.notifications[0].id, "n-1");
    }
}
