/// Gravatar URL construction
///
/// Gravatar identifies an account by the MD5 digest of the trimmed,
/// lowercased email address. `d=404` makes the service answer 404 instead of
/// a generated placeholder when no Gravatar exists, so the caller can tell
/// the difference.

use md5::{Digest, Md5};

/// Builds the Gravatar image URL for an email address
///
/// # Example
///
/// ```
/// use mailwatch_shared::media::gravatar::gravatar_url;
///
/// let url = gravatar_url(" MyEmailAddress@example.com ", 800);
/// assert_eq!(
///     url,
///     "https://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=800&d=404"
/// );
/// ```
pub fn gravatar_url(email: &str, size: u32) -> String {
    let digest = Md5::digest(email.trim().to_lowercase().as_bytes());

    format!(
        "https://www.gravatar.com/avatar/{}?s={}&d=404",
        hex::encode(digest),
        size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // Reference hash from the Gravatar documentation
        let url = gravatar_url("myemailaddress@example.com", 80);
        assert_eq!(
            url,
            "https://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=80&d=404"
        );
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            gravatar_url("  User@Example.COM ", 800),
            gravatar_url("user@example.com", 800)
        );
    }
}
