/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind (default: 0.0.0.0)
/// - `API_PORT`: port to bind (default: 8080)
/// - `API_CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `API_PRODUCTION`: enable HSTS and strict CORS (default: false)
/// - `JWT_SECRET`: HS256 signing key, at least 32 characters (required)
/// - `PUBLIC_BASE_URL`: base URL for verification links (default: http://localhost:8080)
/// - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD`: outbound
///   mail relay; without `SMTP_HOST` mail is logged instead of sent
/// - `MAIL_FROM`: sender address (default: no-reply@localhost)
/// - `SITE_OWNER_EMAIL`: recipient for contact-form relays (optional)
/// - `MEDIA_ROOT`: directory for uploaded avatars (default: ./media)
///
/// # Example
///
/// ```no_run
/// use mailwatch_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("listening on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use mailwatch_shared::mail::MailerConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Outbound mail configuration
    pub mail: MailConfig,

    /// Media storage configuration
    pub media: MediaConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` selects permissive CORS
    pub cors_origins: Vec<String>,

    /// Production mode enables HSTS
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing key; must be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Outbound mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host; None logs mail instead of sending
    pub smtp_host: Option<String>,

    /// SMTP port (STARTTLS)
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: Option<String>,

    /// SMTP password
    pub smtp_password: Option<String>,

    /// Sender address
    pub from_address: String,

    /// Contact-form recipient; None disables the contact endpoint
    pub owner_address: Option<String>,

    /// Public base URL used in verification links
    pub base_url: String,
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded avatars are stored under
    pub root: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("API_CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("API_PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST").ok(),
                smtp_port,
                smtp_username: env::var("SMTP_USERNAME").ok(),
                smtp_password: env::var("SMTP_PASSWORD").ok(),
                from_address: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@localhost".to_string()),
                owner_address: env::var("SITE_OWNER_EMAIL").ok(),
                base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            },
            media: MediaConfig {
                root: env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Converts the mail section into the shared mailer configuration
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            smtp_host: self.mail.smtp_host.clone(),
            smtp_port: self.mail.smtp_port,
            smtp_username: self.mail.smtp_username.clone(),
            smtp_password: self.mail.smtp_password.clone(),
            from_address: self.mail.from_address.clone(),
            base_url: self.mail.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            mail: MailConfig {
                smtp_host: None,
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                from_address: "no-reply@localhost".to_string(),
                owner_address: None,
                base_url: "http://localhost:8080".to_string(),
            },
            media: MediaConfig {
                root: "./media".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_mailer_config_mapping() {
        let mailer = test_config().mailer_config();
        assert!(mailer.smtp_host.is_none());
        assert_eq!(mailer.base_url, "http://localhost:8080");
    }
}
