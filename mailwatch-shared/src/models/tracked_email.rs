/// Tracked email model and database operations
///
/// A tracked email is a secondary address a user registers to monitor. Each
/// entry starts unverified with a random one-time token; following the
/// mailed verification link flips `verified` and clears the token.
///
/// # Invariants
///
/// - `(user_id, email)` is unique (database constraint)
/// - Verification tokens are unique and random; a verified entry has no token
/// - At most two entries per user, enforced in the add handler rather than
///   the schema
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tracked_emails (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     email VARCHAR(255) NOT NULL,
///     nickname VARCHAR(100) NOT NULL DEFAULT '',
///     verified BOOLEAN NOT NULL DEFAULT FALSE,
///     verification_token VARCHAR(100) UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, email)
/// );
/// ```

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum number of tracked emails per user
pub const MAX_TRACKED_EMAILS: i64 = 2;

/// A secondary email address monitored by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrackedEmail {
    /// Unique entry ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// The monitored address
    pub email: String,

    /// Optional display label (empty string when unset)
    pub nickname: String,

    /// Whether the address has been confirmed via the mailed link
    pub verified: bool,

    /// One-time verification token; None once verified
    pub verification_token: Option<String>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

/// Input for adding a tracked email
#[derive(Debug, Clone)]
pub struct CreateTrackedEmail {
    /// Owning user
    pub user_id: Uuid,

    /// Address to monitor
    pub email: String,

    /// Optional display label
    pub nickname: String,
}

/// Generates a fresh verification token
///
/// 32 random bytes, hex encoded (64 characters), from the OS RNG. Uniqueness
/// is additionally backed by the database's unique constraint on the column.
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

const TRACKED_EMAIL_COLUMNS: &str =
    "id, user_id, email, nickname, verified, verification_token, created_at";

impl TrackedEmail {
    /// Creates a tracked email entry with a fresh verification token
    ///
    /// # Errors
    ///
    /// Returns an error if the user already tracks this address (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateTrackedEmail) -> Result<Self, sqlx::Error> {
        let token = generate_verification_token();

        sqlx::query_as::<_, TrackedEmail>(&format!(
            r#"
            INSERT INTO tracked_emails (user_id, email, nickname, verification_token)
            VALUES ($1, $2, $3, $4)
            RETURNING {TRACKED_EMAIL_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.email)
        .bind(data.nickname)
        .bind(token)
        .fetch_one(pool)
        .await
    }

    /// Finds an entry by ID, scoped to its owner
    pub async fn find_by_id_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrackedEmail>(&format!(
            "SELECT {TRACKED_EMAIL_COLUMNS} FROM tracked_emails WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an entry by its verification token
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrackedEmail>(&format!(
            "SELECT {TRACKED_EMAIL_COLUMNS} FROM tracked_emails WHERE verification_token = $1"
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's tracked emails, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrackedEmail>(&format!(
            "SELECT {TRACKED_EMAIL_COLUMNS} FROM tracked_emails WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Counts a user's tracked emails
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tracked_emails WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Updates the nickname of an entry
    pub async fn update_nickname(
        pool: &PgPool,
        id: Uuid,
        nickname: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrackedEmail>(&format!(
            "UPDATE tracked_emails SET nickname = $2 WHERE id = $1 RETURNING {TRACKED_EMAIL_COLUMNS}"
        ))
        .bind(id)
        .bind(nickname)
        .fetch_optional(pool)
        .await
    }

    /// Changes the monitored address
    ///
    /// Resets `verified` and issues a fresh verification token; the caller
    /// is expected to re-send the verification mail.
    pub async fn change_address(
        pool: &PgPool,
        id: Uuid,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = generate_verification_token();

        sqlx::query_as::<_, TrackedEmail>(&format!(
            r#"
            UPDATE tracked_emails
            SET email = $2, verified = FALSE, verification_token = $3
            WHERE id = $1
            RETURNING {TRACKED_EMAIL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(email)
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Marks an entry verified and clears its token
    ///
    /// Returns the updated entry, or None if the token was unknown or
    /// already used.
    pub async fn mark_verified(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrackedEmail>(&format!(
            r#"
            UPDATE tracked_emails
            SET verified = TRUE, verification_token = NULL
            WHERE verification_token = $1
            RETURNING {TRACKED_EMAIL_COLUMNS}
            "#,
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an entry, scoped to its owner
    ///
    /// Returns true if a row was deleted.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tracked_emails WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_verification_token_format() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_verification_token_unique() {
        let a = generate_verification_token();
        let b = generate_verification_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_max_tracked_emails() {
        assert_eq!(MAX_TRACKED_EMAILS, 2);
    }
}
