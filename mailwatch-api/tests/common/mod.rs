/// Common test utilities for integration tests
///
/// Builds the full router against a lazily-connected pool, a log-only
/// mailer, and a throwaway media directory. Endpoints that never touch the
/// database (QR, auth middleware, validation, contact relay) are exercised
/// without any infrastructure; tests that need real rows connect eagerly and
/// are skipped when `TEST_DATABASE_URL` is unset.

use mailwatch_api::app::{build_router, AppState};
use mailwatch_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, MailConfig, MediaConfig};
use mailwatch_shared::auth::jwt::{create_token, Claims, TokenType};
use mailwatch_shared::mail::Mailer;
use mailwatch_shared::media::store::AvatarStore;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context holding the router and a pre-authenticated user identity
pub struct TestContext {
    pub app: axum::Router,
    pub user_id: Uuid,
    pub jwt_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            // Never connected to by the database-free tests; the pool is lazy
            url: "postgresql://localhost:1/mailwatch_unreachable".to_string(),
            max_connections: 2,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        mail: MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: "no-reply@mailwatch.test".to_string(),
            owner_address: None,
            base_url: "http://localhost:8080".to_string(),
        },
        media: MediaConfig {
            root: std::env::temp_dir()
                .join(format!("mailwatch-test-media-{}", Uuid::new_v4()))
                .to_string_lossy()
                .to_string(),
        },
    }
}

impl TestContext {
    /// Builds the app without connecting to anything
    ///
    /// The pool is created lazily, so handlers that never run a query work
    /// against it; handlers that do will fail, which the relevant tests
    /// assert on directly where it matters.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        // Short acquire timeout so queries against the unreachable database
        // fail fast instead of waiting out the default 30 seconds
        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(std::time::Duration::from_millis(500))
            .connect_lazy(&config.database.url)?;

        let mailer = Mailer::log_only(&config.mail.from_address, &config.mail.base_url);
        let avatars = AvatarStore::new(&config.media.root);

        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db, config, mailer, avatars);
        let app = build_router(state);

        Ok(TestContext {
            app,
            user_id,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }
}
