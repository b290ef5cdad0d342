/// Integration tests for the MailWatch API
///
/// These run against the full router with no external infrastructure: the
/// database pool is lazy and never connected, outbound mail goes to the log
/// transport, and avatars write to a throwaway temp directory. Covered here:
/// - QR code generation (stateless)
/// - Health reporting when the database is unreachable
/// - Authentication middleware behavior
/// - Request validation
/// - Contact relay configuration handling
/// - Security headers and unknown-route handling

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_qr_returns_png() {
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(get("/v1/qr?data=https%3A%2F%2Fexample.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let img = image::load_from_memory(&bytes).expect("response should be a decodable image");

    assert_eq!(img.width(), img.height());
    assert!(img.width() > 0);
}

#[tokio::test]
async fn test_qr_missing_data_is_rejected() {
    let ctx = TestContext::new().unwrap();

    for uri in ["/v1/qr", "/v1/qr?data="] {
        let response = ctx.app.clone().call(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");

        let json = body_json(response).await;
        assert_eq!(json["message"], "Missing data parameter");
    }
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::new().unwrap();

    let response = ctx.app.clone().call(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "disconnected");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_protected_route_requires_auth_header() {
    let ctx = TestContext::new().unwrap();

    let response = ctx.app.clone().call(get("/v1/profile")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_non_bearer_auth_header_is_rejected() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .uri("/v1/notifications/count")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let ctx = TestContext::new().unwrap();

    let request = Request::builder()
        .uri("/v1/emails")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let ctx = TestContext::new().unwrap();

    let claims = mailwatch_shared::auth::jwt::Claims::new(
        ctx.user_id,
        mailwatch_shared::auth::jwt::TokenType::Access,
    );
    let forged =
        mailwatch_shared::auth::jwt::create_token(&claims, "a-different-32-byte-secret-here!")
            .unwrap();

    let request = Request::builder()
        .uri("/v1/profile")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_cannot_be_used_as_access_token() {
    let ctx = TestContext::new().unwrap();

    let claims = mailwatch_shared::auth::jwt::Claims::new(
        ctx.user_id,
        mailwatch_shared::auth::jwt::TokenType::Refresh,
    );
    let refresh =
        mailwatch_shared::auth::jwt::create_token(&claims, common::TEST_JWT_SECRET).unwrap();

    let request = Request::builder()
        .uri("/v1/profile")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_token_fails() {
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/auth/refresh",
            None,
            json!({ "refresh_token": "garbage" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_failures() {
    let ctx = TestContext::new().unwrap();

    // Bad email and short password never reach the database
    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/auth/register",
            None,
            json!({
                "username": "jdoe",
                "email": "not-an-email",
                "password": "short"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");

    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let ctx = TestContext::new().unwrap();

    // Long enough, but no special character
    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/auth/register",
            None,
            json!({
                "username": "jdoe",
                "email": "jdoe@example.com",
                "password": "NoSpecial123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_login_requires_username() {
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/auth/login",
            None,
            json!({ "username": "", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/auth/logout",
            Some(&ctx.auth_header()),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Logged out");
}

#[tokio::test]
async fn test_contact_unconfigured_returns_503() {
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/contact",
            Some(&ctx.auth_header()),
            json!({
                "name": "Jamie",
                "email": "jamie@example.com",
                "subject": "Hello",
                "message": "Is anyone there?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_contact_relays_when_configured() {
    let mut config = common::test_config();
    config.mail.owner_address = Some("owner@mailwatch.test".to_string());
    let ctx = TestContext::with_config(config).unwrap();

    // The log-only transport always succeeds
    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/contact",
            Some(&ctx.auth_header()),
            json!({
                "name": "Jamie",
                "email": "jamie@example.com",
                "subject": "Hello",
                "message": "Is anyone there?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Message sent");
}

#[tokio::test]
async fn test_contact_validates_reply_address() {
    let mut config = common::test_config();
    config.mail.owner_address = Some("owner@mailwatch.test".to_string());
    let ctx = TestContext::with_config(config).unwrap();

    let response = ctx
        .app
        .clone()
        .call(post_json(
            "/v1/contact",
            Some(&ctx.auth_header()),
            json!({
                "name": "Jamie",
                "email": "not-an-address",
                "subject": "Hello",
                "message": "Hi"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new().unwrap();

    let response = ctx.app.clone().call(get("/health")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("Content-Security-Policy").is_some());
    // HSTS is off outside production mode
    assert!(headers.get("Strict-Transport-Security").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new().unwrap();

    let response = ctx.app.clone().call(get("/v1/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_email_verification_link_shape() {
    // The public verify route accepts any token-shaped path segment; with no
    // database it cannot succeed, but the route must exist (not 404 at the
    // router level vs. 405 or 401).
    let ctx = TestContext::new().unwrap();

    let response = ctx
        .app
        .clone()
        .call(get("/v1/emails/verify/0123456789abcdef"))
        .await
        .unwrap();

    // Route matched and reached the handler; the lazy pool fails the query,
    // which surfaces as a 500 rather than an auth or routing error.
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
