/// QR code endpoint
///
/// Stateless: renders the `data` query parameter as a QR code PNG. Touches
/// neither the database nor the authenticated user.
///
/// # Endpoint
///
/// ```text
/// GET /v1/qr?data=https%3A%2F%2Fexample.com
/// ```

use crate::error::{ApiError, ApiResult};
use axum::{extract::Query, http::header, response::IntoResponse};
use mailwatch_shared::media::qr;
use serde::Deserialize;

/// QR query parameters
#[derive(Debug, Deserialize)]
pub struct QrQuery {
    /// Text to encode
    #[serde(default)]
    pub data: String,
}

/// Renders the query data as a QR code PNG
///
/// # Errors
///
/// - `400 Bad Request`: Missing or empty `data`, or data exceeding QR capacity
pub async fn generate_qr(Query(query): Query<QrQuery>) -> ApiResult<impl IntoResponse> {
    if query.data.is_empty() {
        return Err(ApiError::BadRequest("Missing data parameter".to_string()));
    }

    let png = qr::generate_png(&query.data)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
