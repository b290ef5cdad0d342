/// User model and database operations
///
/// A user owns profile fields (bio, social links, avatar), a subscription
/// flag, and through foreign keys their tracked emails and notifications.
/// Deleting a user cascades to both.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(150),
///     last_name VARCHAR(150),
///     bio TEXT NOT NULL DEFAULT 'This is my bio.',
///     social_twitter TEXT NOT NULL DEFAULT '',
///     social_facebook TEXT NOT NULL DEFAULT '',
///     social_instagram TEXT NOT NULL DEFAULT '',
///     avatar_path VARCHAR(512),
///     subscribed BOOLEAN NOT NULL DEFAULT FALSE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account with profile fields
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
/// `avatar_path` is a path relative to the media root (e.g. `avatars/{id}.png`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Primary email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Free-form biography shown on the profile page
    pub bio: String,

    /// Twitter profile URL (empty string when unset)
    pub social_twitter: String,

    /// Facebook profile URL (empty string when unset)
    pub social_facebook: String,

    /// Instagram profile URL (empty string when unset)
    pub social_instagram: String,

    /// Stored avatar path relative to the media root, None when unset
    pub avatar_path: Option<String>,

    /// Newsletter/updates subscription flag
    pub subscribed: bool,

    /// Deactivated accounts cannot log in
    pub is_active: bool,

    /// Registration date
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Primary email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,
}

/// Profile fields to update; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New first name (Some(None) clears it)
    pub first_name: Option<Option<String>>,

    /// New last name (Some(None) clears it)
    pub last_name: Option<Option<String>>,

    /// New biography
    pub bio: Option<String>,

    /// New Twitter URL
    pub social_twitter: Option<String>,

    /// New Facebook URL
    pub social_facebook: Option<String>,

    /// New Instagram URL
    pub social_instagram: Option<String>,

    /// New subscription flag
    pub subscribed: Option<bool>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, bio, \
     social_twitter, social_facebook, social_instagram, avatar_path, subscribed, is_active, \
     created_at, updated_at, last_login_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by login name
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by primary email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Updates profile fields
    ///
    /// Only non-None fields of `data` are written; `updated_at` is bumped.
    /// Returns the updated user, or None if the user doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET clause dynamically from the fields that are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.bio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bio = ${}", bind_count));
        }
        if data.social_twitter.is_some() {
            bind_count += 1;
            query.push_str(&format!(", social_twitter = ${}", bind_count));
        }
        if data.social_facebook.is_some() {
            bind_count += 1;
            query.push_str(&format!(", social_facebook = ${}", bind_count));
        }
        if data.social_instagram.is_some() {
            bind_count += 1;
            query.push_str(&format!(", social_instagram = ${}", bind_count));
        }
        if data.subscribed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", subscribed = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }
        if let Some(twitter) = data.social_twitter {
            q = q.bind(twitter);
        }
        if let Some(facebook) = data.social_facebook {
            q = q.bind(facebook);
        }
        if let Some(instagram) = data.social_instagram {
            q = q.bind(instagram);
        }
        if let Some(subscribed) = data.subscribed {
            q = q.bind(subscribed);
        }

        q.fetch_optional(pool).await
    }

    /// Sets or clears the stored avatar path
    ///
    /// Returns true if the user existed.
    pub async fn set_avatar_path(
        pool: &PgPool,
        id: Uuid,
        avatar_path: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET avatar_path = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(avatar_path)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user account
    ///
    /// Tracked emails and notifications are removed by ON DELETE CASCADE.
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create = CreateUser {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        };

        assert_eq!(create.username, "jdoe");
        assert_eq!(create.email, "jdoe@example.com");
    }

    #[test]
    fn test_update_profile_default_is_empty() {
        let update = UpdateProfile::default();
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
        assert!(update.bio.is_none());
        assert!(update.social_twitter.is_none());
        assert!(update.social_facebook.is_none());
        assert!(update.social_instagram.is_none());
        assert!(update.subscribed.is_none());
    }

    // Database operations are covered by integration tests against a live pool
}
