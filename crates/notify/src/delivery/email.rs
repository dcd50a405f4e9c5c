//! Email delivery with a pluggable transport.
//!
//! Three transports implement the same [`EmailTransport`] contract, selected
//! by configuration:
//!
//! - [`ConsoleTransport`] — logs the rendered message, no network I/O. The
//!   default outside production.
//! - [`SmtpTransport`] — authenticated STARTTLS relay via the `lettre` async
//!   transport.
//! - [`RelayTransport`] — delegates to an external HTTP endpoint, for
//!   deployments without direct SMTP egress.
//!
//! Missing settings for a non-console provider are a configuration error
//! surfaced at construction, not at send time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use shopfloor_core::channels::CHANNEL_EMAIL;

use crate::audience::Recipient;
use crate::delivery::DeliveryOutcome;

/// HTTP request timeout for a single relay delivery attempt.
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `EMAIL_FROM_ADDRESS` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@shopfloor.local";

/// Default sender display name.
const DEFAULT_FROM_NAME: &str = "Shopfloor";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email configuration and delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The transport selection or its settings are invalid.
    #[error("Email configuration error: {0}")]
    Config(String),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The relay HTTP request failed (network, DNS, timeout, etc.).
    #[error("Relay request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay endpoint returned a non-2xx status code.
    #[error("Relay returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which transport delivers outbound email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Console,
    Smtp,
    ApiRelay,
}

impl EmailProvider {
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s {
            "console" => Ok(EmailProvider::Console),
            "smtp" => Ok(EmailProvider::Smtp),
            "api-relay" => Ok(EmailProvider::ApiRelay),
            other => Err(EmailError::Config(format!(
                "unknown email provider \"{other}\" (expected console, smtp, or api-relay)"
            ))),
        }
    }
}

/// Email transport configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// "From" display name.
    pub from_name: String,
    /// SMTP server hostname (required for the `smtp` provider).
    pub smtp_host: Option<String>,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// HTTP endpoint (required for the `api-relay` provider).
    pub relay_endpoint: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable               | Required | Default                     |
    /// |------------------------|----------|-----------------------------|
    /// | `EMAIL_PROVIDER`       | no       | `console`                   |
    /// | `EMAIL_FROM_ADDRESS`   | no       | `noreply@shopfloor.local`   |
    /// | `EMAIL_FROM_NAME`      | no       | `Shopfloor`                 |
    /// | `SMTP_HOST`            | smtp     | —                           |
    /// | `SMTP_PORT`            | no       | `587`                       |
    /// | `SMTP_USER`            | no       | —                           |
    /// | `SMTP_PASSWORD`        | no       | —                           |
    /// | `EMAIL_RELAY_ENDPOINT` | api-relay| —                           |
    ///
    /// An unknown provider name is a configuration error; missing provider
    /// settings are reported by [`build_transport`], not here.
    pub fn from_env() -> Result<Self, EmailError> {
        let provider = match std::env::var("EMAIL_PROVIDER") {
            Ok(value) => EmailProvider::parse(&value)?,
            Err(_) => EmailProvider::Console,
        };
        Ok(Self {
            provider,
            from_address: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            relay_endpoint: std::env::var("EMAIL_RELAY_ENDPOINT").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Transport contract
// ---------------------------------------------------------------------------

/// A fully rendered outbound email.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// The contract every transport implements.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}

/// Construct the transport selected by `config`, validating its settings.
pub fn build_transport(config: &EmailConfig) -> Result<Arc<dyn EmailTransport>, EmailError> {
    match config.provider {
        EmailProvider::Console => Ok(Arc::new(ConsoleTransport)),
        EmailProvider::Smtp => Ok(Arc::new(SmtpTransport::new(config)?)),
        EmailProvider::ApiRelay => Ok(Arc::new(RelayTransport::new(config)?)),
    }
}

// ---------------------------------------------------------------------------
// Console transport
// ---------------------------------------------------------------------------

/// Logs rendered emails instead of sending them.
pub struct ConsoleTransport;

#[async_trait]
impl EmailTransport for ConsoleTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to_address,
            subject = %email.subject,
            body = %email.text,
            "Email (console transport)"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SMTP transport
// ---------------------------------------------------------------------------

/// Sends email via an authenticated STARTTLS SMTP relay.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| EmailError::Config("SMTP_HOST is required for the smtp provider".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from: sender_mailbox(config)?,
        })
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let to = Mailbox::new(
            non_empty(&email.to_name),
            email.to_address.parse()?,
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

/// Build the sender mailbox from configuration.
fn sender_mailbox(config: &EmailConfig) -> Result<Mailbox, EmailError> {
    Ok(Mailbox::new(
        non_empty(&config.from_name),
        config.from_address.parse()?,
    ))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// HTTP relay transport
// ---------------------------------------------------------------------------

/// Delegates delivery to an external HTTP endpoint.
pub struct RelayTransport {
    client: reqwest::Client,
    endpoint: String,
    from_address: String,
    from_name: String,
}

impl RelayTransport {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let endpoint = config.relay_endpoint.clone().ok_or_else(|| {
            EmailError::Config(
                "EMAIL_RELAY_ENDPOINT is required for the api-relay provider".to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .map_err(EmailError::Request)?;

        Ok(Self {
            client,
            endpoint,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl EmailTransport for RelayTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let payload = serde_json::json!({
            "to": email.to_address,
            "toName": email.to_name,
            "subject": email.subject,
            "html": email.html,
            "text": email.text,
            "fromAddress": self.from_address,
            "fromName": self.from_name,
        });

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(EmailError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Email delivery for one recipient through the configured transport.
#[derive(Clone)]
pub struct EmailSink {
    transport: Arc<dyn EmailTransport>,
}

impl EmailSink {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }

    /// Send a rendered email to `recipient`.
    ///
    /// A missing or malformed address is a non-fatal skip; a transport
    /// failure is logged with recipient context and reported as
    /// [`DeliveryOutcome::Failed`].
    pub async fn deliver(
        &self,
        recipient: &Recipient,
        subject: String,
        html: String,
        text: String,
    ) -> DeliveryOutcome {
        let address = recipient.user.email.trim();
        if address.is_empty() || !address.contains('@') {
            tracing::debug!(
                user_id = recipient.user.id,
                "Recipient has no usable email address, skipping"
            );
            return DeliveryOutcome::Skipped;
        }

        let email = OutboundEmail {
            to_address: address.to_string(),
            to_name: recipient.user.display_name.clone(),
            subject,
            html,
            text,
        };

        match self.transport.send(&email).await {
            Ok(()) => {
                tracing::debug!(
                    user_id = recipient.user.id,
                    to = %email.to_address,
                    "Notification email sent"
                );
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(
                    user_id = recipient.user.id,
                    to = %email.to_address,
                    channel = CHANNEL_EMAIL,
                    error = %e,
                    "Failed to send notification email"
                );
                DeliveryOutcome::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audience::test_support::recipient;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    fn base_config(provider: EmailProvider) -> EmailConfig {
        EmailConfig {
            provider,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            relay_endpoint: None,
        }
    }

    #[test]
    fn provider_parse_accepts_known_names() {
        assert_eq!(EmailProvider::parse("console").unwrap(), EmailProvider::Console);
        assert_eq!(EmailProvider::parse("smtp").unwrap(), EmailProvider::Smtp);
        assert_eq!(
            EmailProvider::parse("api-relay").unwrap(),
            EmailProvider::ApiRelay
        );
    }

    #[test]
    fn provider_parse_rejects_unknown_names() {
        let err = EmailProvider::parse("carrier-pigeon").unwrap_err();
        assert_matches!(err, EmailError::Config(_));
        assert!(err.to_string().contains("unknown email provider"));
    }

    #[test]
    fn smtp_without_host_fails_fast() {
        let err = match build_transport(&base_config(EmailProvider::Smtp)) {
            Ok(_) => panic!("expected build_transport to fail"),
            Err(e) => e,
        };
        assert_matches!(err, EmailError::Config(_));
        assert!(err.to_string().contains("SMTP_HOST"));
    }

    #[test]
    fn relay_without_endpoint_fails_fast() {
        let err = match build_transport(&base_config(EmailProvider::ApiRelay)) {
            Ok(_) => panic!("expected build_transport to fail"),
            Err(e) => e,
        };
        assert_matches!(err, EmailError::Config(_));
        assert!(err.to_string().contains("EMAIL_RELAY_ENDPOINT"));
    }

    #[test]
    fn console_transport_builds_without_settings() {
        assert!(build_transport(&base_config(EmailProvider::Console)).is_ok());
    }

    struct RecordingTransport {
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl EmailTransport for RecordingTransport {
        async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn malformed_address_is_skipped_not_failed() {
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        let sink = EmailSink::new(transport.clone());

        let mut target = recipient(1, "assembler");
        target.user.email = "not-an-address".to_string();

        let outcome = sink
            .deliver(&target, "s".into(), "<p>h</p>".into(), "t".into())
            .await;
        assert_eq!(outcome, DeliveryOutcome::Skipped);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_address_reaches_the_transport() {
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        let sink = EmailSink::new(transport.clone());

        let outcome = sink
            .deliver(
                &recipient(1, "assembler"),
                "Deadline approaching: Widget".into(),
                "<p>2 days</p>".into(),
                "2 days".into(),
            )
            .await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address, "user-1@plant.example");
        assert_eq!(sent[0].subject, "Deadline approaching: Widget");
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
