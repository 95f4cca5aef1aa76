//! Outbound mail transport.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use lettre::message::{Mailbox, MultiPart};
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

/// A rendered email, plain-text and HTML alternatives included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Mail transport seam. Production uses SMTP; tests record.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// SMTP mailer over `lettre`.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build from an `smtp(s)://` URL and a sender address like
    /// `Talent Bridge <noreply@talentbridge.example>`.
    pub fn new(smtp_url: &str, from: &str) -> Result<Self, MailError> {
        let transport = SmtpTransport::from_url(smtp_url)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .build();
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidMessage(format!("sender address: {e}")))?;
        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidMessage(format!("recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

/// Dev mailer: logs the rendered email instead of sending it.
///
/// Used when no SMTP transport is configured, so local runs still show what
/// would have gone out.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text_body,
            "outbound email (no SMTP transport configured)"
        );
        Ok(())
    }
}

/// Test mailer: records every send, optionally failing the first N attempts.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failures_remaining: AtomicU32,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` sends with a transport error, then succeed.
    pub fn with_failures(n: u32) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures_remaining: AtomicU32::new(n),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            // saturating: u32::MAX means "always fail"
            if remaining != u32::MAX {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(MailError::Transport("simulated outage".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
