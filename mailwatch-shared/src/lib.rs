//! # MailWatch Shared Library
//!
//! This crate contains the types, database access, and business logic shared
//! by the MailWatch API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, JWT tokens, and request auth context
//! - `db`: Connection pool and migration utilities
//! - `mail`: Outbound email (verification links, contact relay)
//! - `media`: Avatar processing, Gravatar URLs, QR rendering, avatar storage

pub mod auth;
pub mod db;
pub mod mail;
pub mod media;
pub mod models;

/// Current version of the MailWatch shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
