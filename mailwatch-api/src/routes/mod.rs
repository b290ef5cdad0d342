/// API route handlers
///
/// Each submodule holds the handlers for one resource:
///
/// - `health`: liveness and database connectivity
/// - `auth`: registration, login, token refresh, logout, account deletion
/// - `profile`: profile fields, avatar management, contact form
/// - `emails`: tracked email addresses and verification
/// - `notifications`: the in-app notification feed
/// - `qr`: QR code image generation

pub mod auth;
pub mod emails;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod qr;
