//! UseCase: notification backlog and unread count.

use std::sync::Arc;

use crate::domain::{FeedError, FeedRepository, Notification, UserId};

/// Maximum number of notifications returned by one listing
pub const PAGE_SIZE: usize = 50;

pub struct ListNotificationsUseCase {
    repository: Arc<dyn FeedRepository>,
}

impl ListNotificationsUseCase {
    pub fn new(repository: Arc<dyn FeedRepository>) -> Self {
        Self { repository }
    }

    /// The most recent page of the user's feed, oldest first, and the
    /// authoritative unread count over the whole feed.
    pub async fn execute(&self, user: &UserId) -> Result<(Vec<Notification>, u64), FeedError> {
        self.repository.recent(user, PAGE_SIZE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::NotificationIdFactory, infrastructure::repository::InMemoryFeedRepository,
    };

    #[tokio::test]
    async fn test_listing_is_capped_at_page_size() {
        // テスト項目: 一覧はページサイズで打ち切られ、未読数は全件を数える
        // given (前提条件):
        let repository = Arc::new(InMemoryFeedRepository::new());
        let alice = UserId::new("alice".to_string()).unwrap();
        for i in 0..(PAGE_SIZE + 3) {
            repository
                .insert(
                    &alice,
                    Notification::new(
                        NotificationIdFactory::generate(),
                        "promo".to_string(),
                        i as i64,
                        serde_json::Value::Null,
                    ),
                )
                .await
                .unwrap();
        }
        let usecase = ListNotificationsUseCase::new(repository);

        // when (操作):
        let (page, unread) = usecase.execute(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(page[0].created_at, 3);
        assert_eq!(unread, (PAGE_SIZE + 3) as u64);
    }
}
