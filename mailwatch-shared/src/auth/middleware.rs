/// Authentication context for axum handlers
///
/// The API crate's middleware layer validates the Bearer token and inserts
/// an [`AuthContext`] into the request extensions; handlers extract it with
/// axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use mailwatch_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions after JWT validation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_jwt() {
        let user_id = Uuid::new_v4();
        let ctx = AuthContext::from_jwt(user_id);
        assert_eq!(ctx.user_id, user_id);
    }
}
