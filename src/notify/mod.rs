pub mod templates;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::submission::Submission;

/// SMTP reply codes that mean the relay refused our credentials.
const AUTH_REJECTED_CODES: [&str; 4] = ["530", "534", "535", "538"];

#[derive(Debug, Clone, PartialEq)]
pub enum NotifyError {
    Config(String),
    Auth(String),
    Protocol(String),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::Config(msg) => write!(f, "SMTP configuration error: {msg}"),
            NotifyError::Auth(msg) => write!(f, "SMTP authentication failed: {msg}"),
            NotifyError::Protocol(msg) => write!(f, "SMTP error: {msg}"),
        }
    }
}

/// Delivers a notification for a new submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, submission: &Submission) -> Result<(), NotifyError>;
}

pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// With `secure` set the relay must offer STARTTLS; either way it must
    /// offer AUTH, since credentials are always attached.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let creds = Credentials::new(self.config.user.clone(), self.config.pass.clone());

        let transport = if self.config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| NotifyError::Config(format!("Invalid SMTP host: {e}")))?
                .port(self.config.port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
                .port(self.config.port)
                .credentials(creds)
                .build()
        };

        Ok(transport)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, submission: &Submission) -> Result<(), NotifyError> {
        if !self.config.is_complete() {
            return Err(NotifyError::Config(
                "SMTP host, user and password are required".to_string(),
            ));
        }

        let message = build_message(submission, &self.config.from, &self.config.recipient)?;
        let transport = self.transport()?;

        transport.send(message).await.map_err(classify)?;
        tracing::info!(
            "Notification sent for {} via {}:{}",
            submission.email,
            self.config.host,
            self.config.port
        );

        Ok(())
    }
}

pub fn build_message(submission: &Submission, from: &str, to: &str) -> Result<Message, NotifyError> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| NotifyError::Config(format!("Invalid from address: {e}")))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| NotifyError::Config(format!("Invalid recipient address: {e}")))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(templates::subject(submission));

    if let Ok(reply_to) = submission.email.parse::<Mailbox>() {
        builder = builder.reply_to(reply_to);
    }

    let html = templates::render_html(submission)
        .map_err(|e| NotifyError::Protocol(format!("Failed to render email: {e}")))?;

    builder
        .multipart(MultiPart::alternative_plain_html(
            templates::render_text(submission),
            html,
        ))
        .map_err(|e| NotifyError::Protocol(format!("Failed to build email: {e}")))
}

fn classify(err: lettre::transport::smtp::Error) -> NotifyError {
    let code = err.status().map(|c| c.to_string());

    if code
        .as_deref()
        .is_some_and(|c| AUTH_REJECTED_CODES.contains(&c))
    {
        NotifyError::Auth(err.to_string())
    } else {
        NotifyError::Protocol(err.to_string())
    }
}
