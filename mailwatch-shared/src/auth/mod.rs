/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Request auth context for axum handlers
///
/// # Example
///
/// ```no_run
/// use mailwatch_shared::auth::password::{hash_password, verify_password};
/// use mailwatch_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
