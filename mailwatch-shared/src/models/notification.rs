/// Notification model and database operations
///
/// Short per-user messages with read/unread state, created as side effects
/// of other workflows (tracked email added, tracked email verified). Rows
/// are never edited except to flip `is_read`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     message TEXT NOT NULL,
///     is_read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user-facing message with read/unread state
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient user
    pub user_id: Uuid,

    /// Message text
    pub message: String,

    /// Whether the user has acknowledged the notification
    pub is_read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification for a user
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        message: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING id, user_id, message, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(pool)
        .await
    }

    /// Counts a user's unread notifications
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists a user's unread notifications, newest first
    pub async fn list_unread(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND NOT is_read
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Marks one notification read, scoped to its owner
    ///
    /// Returns true if a row was updated.
    pub async fn mark_read(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks all of a user's unread notifications read
    ///
    /// Returns the number of rows updated.
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes() {
        let n = Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            message: "you@example.com has been verified.".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["message"], "you@example.com has been verified.");
        assert_eq!(json["is_read"], false);
    }

    // Database operations are covered by integration tests against a live pool
}
