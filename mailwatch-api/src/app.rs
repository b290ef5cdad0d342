/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use mailwatch_api::{app::{build_router, AppState}, config::Config};
/// use mailwatch_shared::{mail::Mailer, media::store::AvatarStore};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = Mailer::from_config(&config.mailer_config())?;
/// let avatars = AvatarStore::new(&config.media.root);
/// let state = AppState::new(pool, config, mailer, avatars);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use mailwatch_shared::{
    auth::{jwt, middleware::AuthContext},
    mail::Mailer,
    media::store::AvatarStore,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Maximum accepted avatar upload size (bytes)
const AVATAR_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Shared application state
///
/// Cloned for each request handler via axum's `State` extractor; the inner
/// pieces are `Arc`s or pools, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound mailer
    pub mailer: Arc<Mailer>,

    /// Avatar file storage
    pub avatars: Arc<AvatarStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Mailer, avatars: AvatarStore) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer: Arc::new(mailer),
            avatars: Arc::new(avatars),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register           # public
///     │   ├── POST /login              # public
///     │   ├── POST /refresh            # public
///     │   └── POST /logout             # authenticated
///     ├── DELETE /account              # authenticated
///     ├── /profile                     # GET / PATCH (authenticated)
///     │   └── /avatar                  # GET / POST multipart / DELETE
///     │       └── POST /gravatar       # fetch from Gravatar
///     ├── POST /contact                # relay to site owner
///     ├── /emails                      # GET / POST, PATCH/DELETE /:id
///     │   └── GET /verify/:token       # public one-time link
///     ├── /notifications               # GET list, GET /count,
///     │                                # POST /:id/read, POST /read-all
///     └── GET /qr?data=...             # public, PNG response
/// ```
///
/// # Middleware
///
/// tower-http TraceLayer, CORS (permissive unless origins are configured),
/// and the security-headers layer; JWT auth is applied per route group.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let public_v1 = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/emails/verify/:token", get(routes::emails::verify_email))
        .route("/qr", get(routes::qr::generate_qr));

    // Authenticated routes; route_layer keeps unknown paths answering 404
    // instead of 401
    let private_v1 = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/account", delete(routes::auth::delete_account))
        .route(
            "/profile",
            get(routes::profile::get_profile).patch(routes::profile::update_profile),
        )
        .route(
            "/profile/avatar",
            get(routes::profile::get_avatar)
                .post(routes::profile::upload_avatar)
                .delete(routes::profile::reset_avatar),
        )
        .route(
            "/profile/avatar/gravatar",
            post(routes::profile::gravatar_avatar),
        )
        .route("/contact", post(routes::profile::contact))
        .route(
            "/emails",
            get(routes::emails::list_emails).post(routes::emails::add_email),
        )
        .route(
            "/emails/:id",
            patch(routes::emails::update_email).delete(routes::emails::remove_email),
        )
        .route(
            "/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/notifications/count",
            get(routes::notifications::notification_count),
        )
        .route(
            "/notifications/:id/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .layer(DefaultBodyLimit::max(AVATAR_UPLOAD_LIMIT))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = public_v1.merge(private_v1);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_jwt(claims.sub));

    Ok(next.run(req).await)
}
