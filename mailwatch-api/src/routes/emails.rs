/// Tracked email endpoints
///
/// Secondary addresses a user monitors. Every address starts unverified;
/// following the mailed one-time link flips it to verified.
///
/// # Endpoints
///
/// - `GET /v1/emails` - List the user's tracked emails
/// - `POST /v1/emails` - Add an address (sends a verification mail)
/// - `PATCH /v1/emails/{id}` - Edit nickname or address
/// - `DELETE /v1/emails/{id}` - Remove an entry
/// - `GET /v1/emails/verify/{token}` - Public verification link

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use mailwatch_shared::{
    auth::middleware::AuthContext,
    models::{
        notification::Notification,
        tracked_email::{CreateTrackedEmail, TrackedEmail, MAX_TRACKED_EMAILS},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tracked email as returned to clients; the verification token never leaves
/// the server except inside the mailed link
#[derive(Debug, Serialize)]
pub struct TrackedEmailResponse {
    /// Entry ID
    pub id: String,

    /// The monitored address
    pub email: String,

    /// Display label (empty when unset)
    pub nickname: String,

    /// Whether the address has been confirmed
    pub verified: bool,

    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

impl From<TrackedEmail> for TrackedEmailResponse {
    fn from(entry: TrackedEmail) -> Self {
        Self {
            id: entry.id.to_string(),
            email: entry.email,
            nickname: entry.nickname,
            verified: entry.verified,
            created_at: entry.created_at,
        }
    }
}

/// Add request
#[derive(Debug, Deserialize, Validate)]
pub struct AddEmailRequest {
    /// Address to monitor
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional display label
    #[validate(length(max = 100, message = "Nickname must be at most 100 characters"))]
    pub nickname: Option<String>,
}

/// Update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmailRequest {
    /// New address; resets verification and re-sends the mail
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New display label
    #[validate(length(max = 100, message = "Nickname must be at most 100 characters"))]
    pub nickname: Option<String>,
}

/// Message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable result
    pub message: String,
}

/// Lists the user's tracked emails, oldest first
pub async fn list_emails(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TrackedEmailResponse>>> {
    let entries = TrackedEmail::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Adds a tracked email
///
/// Generates a verification token, mails the verification link, and records
/// a notification. A mail delivery failure is logged but does not fail the
/// request; the mail can be re-sent by editing the entry's address.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `400 Bad Request`: The address is the account's primary email, or the
///   two-entry limit is reached
/// - `409 Conflict`: The address is already tracked
pub async fn add_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AddEmailRequest>,
) -> ApiResult<Json<TrackedEmailResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if req.email.eq_ignore_ascii_case(&user.email) {
        return Err(ApiError::BadRequest(
            "Your primary email cannot be tracked".to_string(),
        ));
    }

    let count = TrackedEmail::count_by_user(&state.db, auth.user_id).await?;
    if count >= MAX_TRACKED_EMAILS {
        return Err(ApiError::BadRequest(format!(
            "You can track at most {} email addresses",
            MAX_TRACKED_EMAILS
        )));
    }

    let entry = TrackedEmail::create(
        &state.db,
        CreateTrackedEmail {
            user_id: auth.user_id,
            email: req.email,
            nickname: req.nickname.unwrap_or_default(),
        },
    )
    .await?;

    send_verification_mail(&state, &entry).await;

    Notification::create(
        &state.db,
        auth.user_id,
        &format!("{} was added. Check its inbox to verify it.", entry.email),
    )
    .await?;

    Ok(Json(entry.into()))
}

/// Edits a tracked email
///
/// Changing the nickname is a plain update. Changing the address resets the
/// verified flag, issues a fresh token, and re-sends the verification mail.
///
/// # Errors
///
/// - `404 Not Found`: No such entry, or owned by another user
/// - `400 Bad Request`: The new address is the account's primary email
/// - `409 Conflict`: The new address is already tracked
pub async fn update_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmailRequest>,
) -> ApiResult<Json<TrackedEmailResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let mut entry = TrackedEmail::find_by_id_for_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tracked email not found".to_string()))?;

    if let Some(nickname) = &req.nickname {
        entry = TrackedEmail::update_nickname(&state.db, entry.id, nickname)
            .await?
            .ok_or_else(|| ApiError::NotFound("Tracked email not found".to_string()))?;
    }

    if let Some(email) = &req.email {
        if !email.eq_ignore_ascii_case(&entry.email) {
            let user = User::find_by_id(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

            if email.eq_ignore_ascii_case(&user.email) {
                return Err(ApiError::BadRequest(
                    "Your primary email cannot be tracked".to_string(),
                ));
            }

            entry = TrackedEmail::change_address(&state.db, entry.id, email)
                .await?
                .ok_or_else(|| ApiError::NotFound("Tracked email not found".to_string()))?;

            send_verification_mail(&state, &entry).await;
        }
    }

    Ok(Json(entry.into()))
}

/// Removes a tracked email
///
/// # Errors
///
/// - `404 Not Found`: No such entry, or owned by another user
pub async fn remove_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = TrackedEmail::delete_for_user(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Tracked email not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Tracked email removed".to_string(),
    }))
}

/// Verifies a tracked email via its one-time token
///
/// Public: the link lands in the tracked address's inbox, whose owner may
/// not be logged in. The token is consumed on success and a notification is
/// recorded for the account owner.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or already-used token
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let entry = TrackedEmail::mark_verified(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired verification link".to_string()))?;

    Notification::create(
        &state.db,
        entry.user_id,
        &format!("{} has been verified.", entry.email),
    )
    .await?;

    tracing::info!(user_id = %entry.user_id, email = %entry.email, "Tracked email verified");

    Ok(Json(MessageResponse {
        message: format!("{} has been verified.", entry.email),
    }))
}

/// Sends the verification mail for an entry, logging failures instead of
/// propagating them
async fn send_verification_mail(state: &AppState, entry: &TrackedEmail) {
    let Some(token) = &entry.verification_token else {
        return;
    };

    if let Err(e) = state
        .mailer
        .send_verification(&entry.email, &entry.nickname, token)
        .await
    {
        tracing::warn!(
            email = %entry.email,
            error = %e,
            "Failed to send verification mail"
        );
    }
}
