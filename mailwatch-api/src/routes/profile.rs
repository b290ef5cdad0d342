/// Profile endpoints
///
/// Profile fields, avatar management, and the contact form.
///
/// # Endpoints
///
/// - `GET /v1/profile` - Current user's profile
/// - `PATCH /v1/profile` - Partial profile update
/// - `GET /v1/profile/avatar` - Serve the stored avatar PNG
/// - `POST /v1/profile/avatar` - Upload a new avatar (multipart)
/// - `POST /v1/profile/avatar/gravatar` - Adopt the user's Gravatar
/// - `DELETE /v1/profile/avatar` - Reset the avatar
/// - `POST /v1/contact` - Relay a message to the site owner

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use mailwatch_shared::{
    auth::middleware::AuthContext,
    media::{avatar, gravatar::gravatar_url},
    models::user::{UpdateProfile, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID
    pub user_id: String,

    /// Login name
    pub username: String,

    /// Primary email address
    pub email: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Biography
    pub bio: String,

    /// Twitter profile URL (empty when unset)
    pub social_twitter: String,

    /// Facebook profile URL (empty when unset)
    pub social_facebook: String,

    /// Instagram profile URL (empty when unset)
    pub social_instagram: String,

    /// Newsletter subscription flag
    pub subscribed: bool,

    /// Where the avatar can be fetched; null when unset
    pub avatar_url: Option<String>,

    /// Registration date
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    fn from_user(user: User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            social_twitter: user.social_twitter,
            social_facebook: user.social_facebook,
            social_instagram: user.social_instagram,
            subscribed: user.subscribed,
            avatar_url: user.avatar_path.map(|_| "/v1/profile/avatar".to_string()),
            created_at: user.created_at,
        }
    }
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New first name (empty string clears it)
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,

    /// New last name (empty string clears it)
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,

    /// New biography
    #[validate(length(max = 5000, message = "Bio must be at most 5000 characters"))]
    pub bio: Option<String>,

    /// New Twitter URL (empty string clears it)
    pub social_twitter: Option<String>,

    /// New Facebook URL (empty string clears it)
    pub social_facebook: Option<String>,

    /// New Instagram URL (empty string clears it)
    pub social_instagram: Option<String>,

    /// New subscription flag
    pub subscribed: Option<bool>,
}

/// Contact form request
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    /// Sender's display name
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    /// Reply-to address shown to the site owner
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Mail subject
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,

    /// Message body
    #[validate(length(min = 1, max = 10000, message = "Message is required"))]
    pub message: String,
}

/// Message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable result
    pub message: String,
}

/// Social links must be http(s) URLs; an empty string clears the field
fn validate_social_links(req: &UpdateProfileRequest) -> Result<(), ApiError> {
    let links = [
        ("social_twitter", &req.social_twitter),
        ("social_facebook", &req.social_facebook),
        ("social_instagram", &req.social_instagram),
    ];

    let errors: Vec<ValidationErrorDetail> = links
        .iter()
        .filter_map(|(field, value)| match value {
            Some(v)
                if !v.is_empty()
                    && !v.starts_with("http://")
                    && !v.starts_with("https://") =>
            {
                Some(ValidationErrorDetail {
                    field: field.to_string(),
                    message: "Must be an http(s) URL".to_string(),
                })
            }
            _ => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(errors))
    }
}

async fn current_user(state: &AppState, auth: &AuthContext) -> ApiResult<User> {
    User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
}

/// Returns the authenticated user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = current_user(&state, &auth).await?;

    Ok(Json(ProfileResponse::from_user(user)))
}

/// Partially updates the authenticated user's profile
///
/// Only fields present in the request body are written.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed (e.g. a social link that
///   is not an http(s) URL)
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate().map_err(ApiError::from_validation)?;
    validate_social_links(&req)?;

    // An empty string clears an optional name
    let clear_when_empty = |v: String| if v.is_empty() { None } else { Some(v) };

    let update = UpdateProfile {
        first_name: req.first_name.map(clear_when_empty),
        last_name: req.last_name.map(clear_when_empty),
        bio: req.bio,
        social_twitter: req.social_twitter,
        social_facebook: req.social_facebook,
        social_instagram: req.social_instagram,
        subscribed: req.subscribed,
    };

    let user = User::update_profile(&state.db, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(ProfileResponse::from_user(user)))
}

/// Serves the stored avatar PNG
///
/// # Errors
///
/// - `404 Not Found`: No avatar is set
pub async fn get_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    let user = current_user(&state, &auth).await?;

    let avatar_path = user
        .avatar_path
        .ok_or_else(|| ApiError::NotFound("No avatar set".to_string()))?;

    let png = match state.avatars.load(&avatar_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // Database says there is an avatar but the file is gone
            tracing::warn!(user_id = %auth.user_id, path = %avatar_path, "Avatar file missing");
            return Err(ApiError::NotFound("No avatar set".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Uploads a new avatar
///
/// Accepts a multipart body with a file field. The image is decoded, resized
/// to fit within 800x800 (aspect preserved), re-encoded as PNG, and stored
/// under the media root.
///
/// # Errors
///
/// - `400 Bad Request`: No file field, or the payload is not a decodable image
/// - `413 Payload Too Large`: Body over the upload limit
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        // Take the first field carrying file data
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if !bytes.is_empty() {
            upload = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = upload.ok_or_else(|| ApiError::BadRequest("No image uploaded".to_string()))?;

    store_avatar(&state, &auth, &bytes).await?;

    Ok(Json(MessageResponse {
        message: "Avatar updated".to_string(),
    }))
}

/// Adopts the user's Gravatar as their avatar
///
/// Fetches the Gravatar image for the primary email address and runs it
/// through the same processing pipeline as an upload.
///
/// # Errors
///
/// - `404 Not Found`: The address has no Gravatar
/// - `502 Bad Gateway`: Gravatar could not be reached
pub async fn gravatar_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let user = current_user(&state, &auth).await?;

    let url = gravatar_url(&user.email, avatar::MAX_DIMENSION);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| ApiError::BadGateway(format!("Gravatar request failed: {}", e)))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(
            "No Gravatar exists for this address".to_string(),
        ));
    }
    if !response.status().is_success() {
        return Err(ApiError::BadGateway(format!(
            "Gravatar returned {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::BadGateway(format!("Gravatar response failed: {}", e)))?;

    store_avatar(&state, &auth, &bytes).await?;

    Ok(Json(MessageResponse {
        message: "Avatar updated from Gravatar".to_string(),
    }))
}

async fn store_avatar(state: &AppState, auth: &AuthContext, bytes: &[u8]) -> ApiResult<()> {
    let png = avatar::process_avatar(bytes)?;

    let relative = state.avatars.save(auth.user_id, &png).await?;

    let updated = User::set_avatar_path(&state.db, auth.user_id, Some(&relative)).await?;
    if !updated {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "Avatar stored");

    Ok(())
}

/// Resets the avatar
///
/// Removes the stored file and clears the avatar column; the profile falls
/// back to the client-side default image.
pub async fn reset_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let user = current_user(&state, &auth).await?;

    if let Some(avatar_path) = &user.avatar_path {
        state.avatars.remove(avatar_path).await?;
    }

    User::set_avatar_path(&state.db, auth.user_id, None).await?;

    Ok(Json(MessageResponse {
        message: "Avatar reset".to_string(),
    }))
}

/// Relays a contact-form message to the site owner
///
/// # Errors
///
/// - `503 Service Unavailable`: No site-owner address is configured
/// - `502 Bad Gateway`: Mail delivery failed
pub async fn contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let owner = state.config.mail.owner_address.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Contact form is not configured".to_string())
    })?;

    state
        .mailer
        .send_contact_message(owner, &req.name, &req.email, &req.subject, &req.message)
        .await?;

    tracing::info!(user_id = %auth.user_id, "Contact message relayed");

    Ok(Json(MessageResponse {
        message: "Message sent".to_string(),
    }))
}
