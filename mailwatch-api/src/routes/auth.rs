/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login (by username)
/// - Token refresh
/// - Logout
/// - Account deletion
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/logout` - Logout (authenticated)
/// - `DELETE /v1/account` - Delete the authenticated account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use mailwatch_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(
        min = 3,
        max = 150,
        message = "Username must be between 3 and 150 characters"
    ))]
    pub username: String,

    /// Primary email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional first name
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,

    /// Optional last name
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Message-only response for logout and deletion
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable result
    pub message: String,
}

/// Register a new user
///
/// Creates a user account and returns a token pair so the client is logged
/// in immediately.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "email": "jdoe@example.com",
///   "password": "SecureP@ss123",
///   "first_name": "John",
///   "last_name": "Doe"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Username or email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    let access_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Access), state.jwt_secret())?;
    let refresh_token = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Refresh),
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// Authenticates a user by username and password and returns JWT tokens.
/// The error message is the same for an unknown username and a wrong
/// password, so the endpoint cannot be used to enumerate accounts.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Invalid credentials or deactivated account
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Access), state.jwt_secret())?;
    let refresh_token = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Refresh),
        state.jwt_secret(),
    )?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Logout endpoint
///
/// Tokens are stateless, so logout is an acknowledgement: the client is
/// expected to discard its tokens. The event is logged for auditing.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/logout
/// Authorization: Bearer <access_token>
/// ```
pub async fn logout(Extension(auth): Extension<AuthContext>) -> ApiResult<Json<MessageResponse>> {
    tracing::info!(user_id = %auth.user_id, "User logged out");

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// Account deletion endpoint
///
/// Permanently deletes the authenticated user. Tracked emails, notifications,
/// and the stored avatar file are removed as well.
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/account
/// Authorization: Bearer <access_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account already deleted
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if let Some(avatar_path) = &user.avatar_path {
        state.avatars.remove(avatar_path).await?;
    }

    let deleted = User::delete(&state.db, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "Account deleted");

    Ok(Json(MessageResponse {
        message: "Account deleted".to_string(),
    }))
}
