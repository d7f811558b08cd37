//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use storebell_shared::dto::{NotificationDto, PublishRequest, SnapshotDto};

use crate::{
    domain::{FeedError, NotificationId},
    infrastructure::dto::snapshot_dto,
    ui::{auth::authenticate, state::AppState},
};

fn feed_error_status(error: &FeedError) -> StatusCode {
    match error {
        FeedError::NotificationNotFound(_) => StatusCode::NOT_FOUND,
        FeedError::InvalidId(_) => StatusCode::BAD_REQUEST,
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /notifications`
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SnapshotDto>, StatusCode> {
    let user = authenticate(&headers)?;

    let (notifications, unread_count) = state
        .list_notifications_usecase
        .execute(&user)
        .await
        .map_err(|e| feed_error_status(&e))?;

    Ok(Json(snapshot_dto(notifications, unread_count)))
}

/// `POST /notifications` (development only)
pub async fn publish_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<PublishRequest>,
) -> Result<(StatusCode, Json<NotificationDto>), StatusCode> {
    let user = authenticate(&headers)?;

    if request.kind.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let notification = state
        .publish_notification_usecase
        .execute(&user, request.kind, request.payload)
        .await
        .map_err(|e| feed_error_status(&e))?;

    Ok((StatusCode::CREATED, Json(NotificationDto::from(notification))))
}

/// `POST /notifications/{id}/read`
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let user = authenticate(&headers)?;
    let id = NotificationId::try_from(id).map_err(|e| feed_error_status(&e))?;

    match state.mark_read_usecase.execute(&user, id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::debug!("mark_read for '{}' failed: {}", user, e);
            Err(feed_error_status(&e))
        }
    }
}

/// `POST /notifications/read-all`
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    let user = authenticate(&headers)?;

    let changed = state
        .mark_read_usecase
        .execute_all(&user)
        .await
        .map_err(|e| feed_error_status(&e))?;
    tracing::debug!("'{}' marked {} notification(s) read", user, changed);

    Ok(StatusCode::NO_CONTENT)
}
