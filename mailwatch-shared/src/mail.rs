/// Outbound email
///
/// Delivers tracked-email verification links and contact-form relays over
/// SMTP. When no SMTP host is configured the mailer falls back to a log-only
/// transport that writes the would-be message to the log, which keeps
/// development and tests free of mail infrastructure.
///
/// # Example
///
/// ```no_run
/// use mailwatch_shared::mail::{Mailer, MailerConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = Mailer::from_config(&MailerConfig {
///     smtp_host: Some("email-smtp.us-east-1.amazonaws.com".to_string()),
///     smtp_port: 587,
///     smtp_username: Some("user".to_string()),
///     smtp_password: Some("pass".to_string()),
///     from_address: "MailWatch <no-reply@mailwatch.example>".to_string(),
///     base_url: "https://mailwatch.example".to_string(),
/// })?;
///
/// mailer
///     .send_verification("you@example.com", "work inbox", "deadbeef")
///     .await?;
/// # Ok(())
/// # }
/// ```

use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

/// Error type for mail operations
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// An address could not be parsed
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be built
    #[error("Failed to build message: {0}")]
    BuildError(String),

    /// SMTP transport construction failed
    #[error("Failed to configure SMTP transport: {0}")]
    TransportError(String),

    /// Delivery failed
    #[error("Failed to send email: {0}")]
    SendError(String),
}

/// Mailer configuration, loaded from environment variables by the API crate
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP relay host; None selects the log-only transport
    pub smtp_host: Option<String>,

    /// SMTP port (STARTTLS, typically 587)
    pub smtp_port: u16,

    /// SMTP username, if the relay requires authentication
    pub smtp_username: Option<String>,

    /// SMTP password, if the relay requires authentication
    pub smtp_password: Option<String>,

    /// Sender address, e.g. `MailWatch <no-reply@mailwatch.example>`
    pub from_address: String,

    /// Public base URL used to build verification links
    pub base_url: String,
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Log,
}

/// Sends application email over SMTP or, unconfigured, to the log
pub struct Mailer {
    transport: Transport,
    from: Mailbox,
    base_url: String,
}

impl Mailer {
    /// Builds a mailer from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address is invalid or the SMTP
    /// transport cannot be constructed.
    pub fn from_config(config: &MailerConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.from_address.clone()))?;

        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| MailError::TransportError(e.to_string()))?
                    .port(config.smtp_port);

                if let (Some(username), Some(password)) =
                    (&config.smtp_username, &config.smtp_password)
                {
                    builder =
                        builder.credentials(Credentials::new(username.clone(), password.clone()));
                }

                Transport::Smtp(builder.build())
            }
            None => {
                info!("No SMTP host configured; outbound mail will be logged only");
                Transport::Log
            }
        };

        Ok(Self {
            transport,
            from,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a log-only mailer (for tests and local development)
    pub fn log_only(from_address: &str, base_url: &str) -> Self {
        Self {
            transport: Transport::Log,
            from: from_address.parse().expect("valid from address"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The verification link mailed for a given token
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/v1/emails/verify/{}", self.base_url, token)
    }

    /// Sends a tracked-email verification message
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient address is invalid or delivery fails
    pub async fn send_verification(
        &self,
        to: &str,
        nickname: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.verification_link(token);
        let label = if nickname.is_empty() { to } else { nickname };

        let body = format!(
            "Hello,\n\n\
             This address was added to a MailWatch account as \"{label}\".\n\
             To confirm it, open the link below:\n\n\
             {link}\n\n\
             If you did not request this, you can ignore this message.\n"
        );

        self.send(to, "Verify your tracked email address", body).await
    }

    /// Relays a contact-form message to the site owner
    ///
    /// # Errors
    ///
    /// Returns an error if an address is invalid or delivery fails
    pub async fn send_contact_message(
        &self,
        owner: &str,
        sender_name: &str,
        reply_to: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), MailError> {
        let body = format!("sender: {sender_name} - {reply_to}\nmessage:\n{message}\n");

        self.send(owner, subject, body).await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.to_string()))?;

        match &self.transport {
            Transport::Smtp(transport) => {
                let message = Message::builder()
                    .from(self.from.clone())
                    .to(to)
                    .subject(subject)
                    .body(body)
                    .map_err(|e| MailError::BuildError(e.to_string()))?;

                transport
                    .send(message)
                    .await
                    .map_err(|e| MailError::SendError(e.to_string()))?;

                Ok(())
            }
            Transport::Log => {
                info!(to = %to, subject, body, "Outbound mail (log transport)");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link() {
        let mailer = Mailer::log_only("no-reply@mailwatch.example", "https://mailwatch.example/");
        assert_eq!(
            mailer.verification_link("abc123"),
            "https://mailwatch.example/v1/emails/verify/abc123"
        );
    }

    #[tokio::test]
    async fn test_log_transport_sends() {
        let mailer = Mailer::log_only("no-reply@mailwatch.example", "http://localhost:8080");

        mailer
            .send_verification("you@example.com", "", "deadbeef")
            .await
            .expect("log transport should always succeed");
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let mailer = Mailer::log_only("no-reply@mailwatch.example", "http://localhost:8080");

        let result = mailer.send_verification("not-an-address", "", "tok").await;
        assert!(matches!(result, Err(MailError::InvalidAddress(_))));
    }

    #[test]
    fn test_from_config_without_smtp_host() {
        let mailer = Mailer::from_config(&MailerConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: "no-reply@mailwatch.example".to_string(),
            base_url: "http://localhost:8080".to_string(),
        })
        .expect("log-only mailer should build");

        assert!(matches!(mailer.transport, Transport::Log));
    }

    #[test]
    fn test_from_config_invalid_sender() {
        let result = Mailer::from_config(&MailerConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: "nonsense".to_string(),
            base_url: "http://localhost:8080".to_string(),
        });

        assert!(matches!(result, Err(MailError::InvalidAddress(_))));
    }
}
