/// Notification endpoints
///
/// The in-app notification feed. Notifications are created by other
/// workflows (tracked email added / verified); these endpoints only read
/// them and flip the read flag.
///
/// # Endpoints
///
/// - `GET /v1/notifications` - Unread notifications, newest first
/// - `GET /v1/notifications/count` - Unread count
/// - `POST /v1/notifications/{id}/read` - Mark one read
/// - `POST /v1/notifications/read-all` - Mark all read

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use mailwatch_shared::{auth::middleware::AuthContext, models::notification::Notification};
use serde::Serialize;
use uuid::Uuid;

/// Notification as returned to clients
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    /// Notification ID
    pub id: String,

    /// Message text
    pub message: String,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id.to_string(),
            message: n.message,
            created_at: n.created_at,
        }
    }
}

/// Unread count response
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Number of unread notifications
    pub count: i64,
}

/// Bulk mark-read response
#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    /// Number of notifications marked read
    pub marked: u64,
}

/// Message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable result
    pub message: String,
}

/// Lists the user's unread notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let notifications = Notification::list_unread(&state.db, auth.user_id).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Returns the unread notification count
pub async fn notification_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CountResponse>> {
    let count = Notification::unread_count(&state.db, auth.user_id).await?;

    Ok(Json(CountResponse { count }))
}

/// Marks one notification read
///
/// # Errors
///
/// - `404 Not Found`: No such notification, or owned by another user
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let updated = Notification::mark_read(&state.db, id, auth.user_id).await?;
    if !updated {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Notification marked as read".to_string(),
    }))
}

/// Marks all of the user's unread notifications read
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MarkAllResponse>> {
    let marked = Notification::mark_all_read(&state.db, auth.user_id).await?;

    Ok(Json(MarkAllResponse { marked }))
}
