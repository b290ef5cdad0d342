/// Database models for MailWatch
///
/// # Models
///
/// - `user`: User accounts with profile fields and avatar path
/// - `tracked_email`: Secondary addresses gated by one-time verification tokens
/// - `notification`: Per-user read/unread message feed
///
/// # Example
///
/// ```no_run
/// use mailwatch_shared::models::user::{CreateUser, User};
/// use mailwatch_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         username: "jdoe".to_string(),
///         email: "jdoe@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         first_name: Some("John".to_string()),
///         last_name: Some("Doe".to_string()),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod notification;
pub mod tracked_email;
pub mod user;
